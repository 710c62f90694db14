// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: MIT

use libc::{c_long, c_void, pollfd, ppoll, sigset_t, time_t, timespec, POLLIN};
use std::fmt;
use std::fs::File;
use std::os::unix::io::AsRawFd;
use std::ptr;
use std::time::Duration;

/// Check if the file has an event available to read.
///
/// Never blocks.
#[inline]
pub fn has_event(f: &File) -> Result<bool> {
    wait_event(f, Some(Duration::ZERO))
}

/// Wait for the file to have an event available to read.
///
/// * `f` - The request file.
/// * `timeout` - The maximum time to wait.
///   `None` waits indefinitely, a zero duration polls without blocking.
///
/// Returns true if an event is available, or false if the timeout expired.
pub fn wait_event(f: &File, timeout: Option<Duration>) -> Result<bool> {
    let mut pfd = pollfd {
        fd: f.as_raw_fd(),
        events: POLLIN,
        revents: 0,
    };
    let ts = timeout.map(|d| timespec {
        tv_sec: time_t::try_from(d.as_secs()).unwrap_or(time_t::MAX),
        tv_nsec: d.subsec_nanos() as c_long,
    });
    let tsp = match ts.as_ref() {
        Some(t) => t as *const timespec,
        None => ptr::null(),
    };
    // SAFETY: pfd and ts outlive the call.
    match unsafe { ppoll(&mut pfd, 1, tsp, ptr::null::<sigset_t>()) } {
        -1 => Err(Error::from_errno()),
        0 => Ok(false),
        _ => Ok(true),
    }
}

/// Read events from the file into a `u64` buffer.
///
/// The buffer is `u64` to satisfy the alignment requirements of the event structs.
///
/// Blocks if no events are available, unless the file is non-blocking.
///
/// Returns the number of u64 words read.
pub fn read_event(f: &File, buf: &mut [u64]) -> Result<usize> {
    // SAFETY: the read is bounded by the size of buf.
    let n = unsafe {
        libc::read(
            f.as_raw_fd(),
            buf.as_mut_ptr() as *mut c_void,
            std::mem::size_of_val(buf),
        )
    };
    if n < 0 {
        return Err(Error::from_errno());
    }
    let n = n as usize;
    if n % 8 != 0 {
        return Err(Error::from(UnderReadError::new(
            "event",
            (n / 8 + 1) * 8,
            n,
        )));
    }
    Ok(n / 8)
}

pub(crate) const IOCTL_MAGIC: u8 = 0xb4;

/// Build a read/write ioctl request code for a uAPI struct.
macro_rules! iorw {
    ($nr:expr, $dty:ty) => {
        ioctl_sys::iorw!(
            $crate::common::IOCTL_MAGIC,
            $nr,
            std::mem::size_of::<$dty>()
        ) as _
    };
}
pub(crate) use iorw;

/// The result returned by [`gpioline_uapi`] functions.
///
/// [`gpioline_uapi`]: crate
pub type Result<T> = std::result::Result<T, Error>;

/// Result returned by struct validators.
pub type ValidationResult = std::result::Result<(), ValidationError>;

/// Errors returned by [`gpioline_uapi`] functions.
///
/// [`gpioline_uapi`]: crate
#[derive(Clone, Debug, thiserror::Error, Eq, PartialEq)]
pub enum Error {
    /// An error returned from an underlying system call.
    #[error(transparent)]
    Os(Errno),

    /// An error indicating insufficient data read for the expected object.
    #[error(transparent)]
    UnderRead(#[from] UnderReadError),

    /// An error validating an data structure retuned from the kernel
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl Error {
    /// Create an error from the current errno value.
    #[inline]
    pub fn from_errno() -> Error {
        Error::Os(Errno(std::io::Error::last_os_error().raw_os_error().unwrap_or(0)))
    }
}

/// A failure to read sufficient bytes to construct an object.
//
// This should never happen - but is checked to be safe.
#[derive(Clone, Debug, thiserror::Error, Eq, PartialEq)]
#[error("Reading {obj} returned {found} bytes, expected {expected}.")]
pub struct UnderReadError {
    /// The struct being read
    pub obj: &'static str,
    /// The number of bytes expected.
    pub expected: usize,
    /// The number of bytes read.
    pub found: usize,
}

impl UnderReadError {
    /// Create an UnderReadError.
    pub(crate) fn new(obj: &'static str, expected: usize, found: usize) -> UnderReadError {
        UnderReadError {
            obj,
            expected,
            found,
        }
    }
}

/// A failure to validate a struct returned from a system call.
//
// Should only be seen if a kernel update adds an enum value we are unaware of.
#[derive(Clone, Debug, thiserror::Error, Eq, PartialEq)]
#[error("Kernel returned invalid {field}: {msg}")]
pub struct ValidationError {
    /// The field with the invalid value.
    pub field: String,
    /// The details of the invalid value.
    pub msg: String,
}

impl ValidationError {
    /// Create a ValidationError.
    pub fn new<S: Into<String>, T: Into<String>>(field: S, msg: T) -> ValidationError {
        ValidationError {
            field: field.into(),
            msg: msg.into(),
        }
    }
}

/// A system error code, as returned in errno.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Errno(pub i32);

impl std::error::Error for Errno {}

impl fmt::Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", std::io::Error::from_raw_os_error(self.0))
    }
}

impl From<&std::io::Error> for Errno {
    fn from(e: &std::io::Error) -> Self {
        Errno(e.raw_os_error().unwrap_or(0))
    }
}

/// An identifier for a line on a particular chip.
pub type Offset = u32;

/// The maximum number of lines that may be requested in a single request.
///
/// This is also the width of the bitmaps exchanged with the kernel.
pub const NUM_LINES_MAX: usize = 64;

/// A collection of line offsets.
///
/// Typically used to identify the lines belonging to a particular request.
#[repr(C)]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Offsets([Offset; NUM_LINES_MAX]);

impl Offsets {
    /// Create offsets from an iterable list.
    ///
    /// Any offsets beyond [`NUM_LINES_MAX`] are ignored.
    pub fn from_slice(s: &[u32]) -> Self {
        let mut n: Offsets = Default::default();
        for (src, dst) in s.iter().zip(n.0.iter_mut()) {
            *dst = *src;
        }
        n
    }

    /// The first `len` offsets as a slice.
    #[inline]
    pub fn as_slice(&self, len: usize) -> &[Offset] {
        &self.0[..len.min(NUM_LINES_MAX)]
    }
}

impl Default for Offsets {
    fn default() -> Self {
        Offsets([0; NUM_LINES_MAX])
    }
}

/// Space reserved for future use.
///
/// Sized in multiples of u32 words.
#[repr(C)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[doc(hidden)]
pub struct Padding<const SIZE: usize>([u32; SIZE]);

impl<const SIZE: usize> Default for Padding<SIZE> {
    fn default() -> Self {
        Padding([0; SIZE])
    }
}

/// The trigger identifier for a [`LineEdgeEvent`].
///
/// [`LineEdgeEvent`]: crate::v2::LineEdgeEvent
#[repr(u32)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LineEdgeEventKind {
    /// Indicates the line transitioned from *inactive* to *active*.
    RisingEdge = 1,
    /// Indicates the line transitioned from *active* to *inactive*.
    FallingEdge = 2,
}

impl TryFrom<u32> for LineEdgeEventKind {
    type Error = String;

    fn try_from(v: u32) -> std::result::Result<Self, Self::Error> {
        use LineEdgeEventKind::*;
        match v {
            x if x == RisingEdge as u32 => Ok(RisingEdge),
            x if x == FallingEdge as u32 => Ok(FallingEdge),
            _ => Err(format!("invalid value: {v}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    #[test]
    fn errno_display() {
        let e = Errno(libc::ENOTTY);
        assert_eq!(
            format!("{e}"),
            format!("{}", std::io::Error::from_raw_os_error(libc::ENOTTY))
        );
    }

    #[test]
    fn line_edge_event_kind_try_from() {
        assert_eq!(
            LineEdgeEventKind::try_from(1),
            Ok(LineEdgeEventKind::RisingEdge)
        );
        assert_eq!(
            LineEdgeEventKind::try_from(2),
            Ok(LineEdgeEventKind::FallingEdge)
        );
        assert_eq!(
            LineEdgeEventKind::try_from(0).unwrap_err(),
            "invalid value: 0"
        );
        assert_eq!(
            LineEdgeEventKind::try_from(3).unwrap_err(),
            "invalid value: 3"
        );
    }

    #[test]
    fn offsets_from_slice() {
        let mut x = [0u32; NUM_LINES_MAX];
        x[0] = 1;
        x[1] = 2;
        x[2] = 3;
        x[3] = 0;
        x[4] = 5;
        x[5] = 6;
        let a = Offsets::from_slice(&[1, 2, 3, 0, 5, 6]);
        assert_eq!(a.0, x);
        assert_eq!(a.as_slice(3), &[1, 2, 3]);
        assert_eq!(a.as_slice(5)[4], 5);

        let long: Vec<u32> = (0..70).collect();
        let a = Offsets::from_slice(&long);
        assert_eq!(a.as_slice(100).len(), NUM_LINES_MAX);
        assert_eq!(a.as_slice(100)[NUM_LINES_MAX - 1], 63);
    }

    #[test]
    fn offsets_default() {
        assert_eq!(Offsets::default().0, [0u32; NUM_LINES_MAX]);
    }

    #[test]
    fn size_offsets() {
        assert_eq!(
            size_of::<Offsets>(),
            256usize,
            concat!("Size of: ", stringify!(Offsets))
        );
    }

    #[test]
    fn size_padding() {
        assert_eq!(
            size_of::<Padding<1>>(),
            4usize,
            concat!("Size of: ", stringify!(Padding<1>))
        );
        assert_eq!(
            size_of::<Padding<5>>(),
            20usize,
            concat!("Size of: ", stringify!(Padding<5>))
        );
    }
}
