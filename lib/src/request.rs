// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

mod config;
pub use self::config::Config;

mod edge_event_buffer;
pub use self::edge_event_buffer::{EdgeEventBuffer, DEFAULT_CAPACITY, MAX_CAPACITY};

mod handle;
pub use self::handle::Handle;

use crate::line::{EdgeEvent, Offset, Value};
use crate::{Error, Result, UapiCall};
use gpioline_uapi::{v2, Offsets, NUM_LINES_MAX};
use log::{debug, trace};
use std::fs::File;
use std::os::unix::prelude::{AsRawFd, RawFd};
use std::time::Duration;

/// An active request of a set of lines.
///
/// The request owns the file returned by the kernel when the lines were
/// requested, and the offsets of those lines.  The position of an offset in
/// the request offsets is the bit used for that line in all exchanges with
/// the kernel, and is fixed for the life of the request.
///
/// # Lifetime
///
/// The request file is closed by [`release`], or when the request is dropped.
/// Once released every other operation returns [`Error::Released`].
///
/// The value of an output line is only guaranteed while the request is held.
///
/// # Edge Events
///
/// Waiting for and reading edge events are separate operations.
/// [`wait_edge_event`] is the only operation that blocks, while
/// [`read_edge_events`] only returns events already buffered by the kernel.
/// The file descriptor from [`fd`] may be used to multiplex several requests
/// in an external event loop.
///
/// # Reading Output Values
///
/// Reading back output values is dependent on driver and hardware support
/// and so cannot be guaranteed to work, though frequently it does.
///
/// [`fd`]: #method.fd
/// [`read_edge_events`]: #method.read_edge_events
/// [`release`]: #method.release
/// [`wait_edge_event`]: #method.wait_edge_event
#[derive(Debug)]
pub struct Request<H: Handle = File> {
    /// The request file, or None once released.
    handle: Option<H>,

    /// The offsets of the requested lines, in bit order.
    offsets: Offsets,

    /// The number of valid entries in `offsets`.
    num_lines: usize,
}

impl<H: Handle> Request<H> {
    /// Take ownership of the file for a set of lines accepted by the kernel.
    ///
    /// * `handle` - The request file.
    /// * `offsets` - The offsets of the requested lines, in the order they
    ///   were requested.
    ///
    /// The offsets must be non-empty, unique, and no more than 64.
    ///
    /// # Examples
    /// ```no_run
    /// # fn example(f: std::fs::File) -> Result<(), gpioline::Error> {
    /// let req = gpioline::Request::new(f, &[3, 7])?;
    /// assert_eq!(req.num_lines(), 2);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(handle: H, offsets: &[Offset]) -> Result<Self> {
        if offsets.is_empty() {
            return Err(Error::InvalidArgument("No lines requested.".into()));
        }
        if offsets.len() > NUM_LINES_MAX {
            return Err(Error::InvalidArgument(format!(
                "{} lines requested, at most {NUM_LINES_MAX} are supported.",
                offsets.len()
            )));
        }
        for (idx, offset) in offsets.iter().enumerate() {
            if offsets[..idx].contains(offset) {
                return Err(Error::InvalidArgument(format!(
                    "Offset {offset} requested more than once."
                )));
            }
        }
        debug!(
            "request for lines {:?} on fd {}",
            offsets,
            handle.as_raw_fd()
        );
        Ok(Request {
            handle: Some(handle),
            offsets: Offsets::from_slice(offsets),
            num_lines: offsets.len(),
        })
    }

    /// The number of lines in the request.
    #[inline]
    pub fn num_lines(&self) -> usize {
        self.num_lines
    }

    /// The offsets of the requested lines, in bit order.
    #[inline]
    pub fn offsets(&self) -> &[Offset] {
        self.offsets.as_slice(self.num_lines)
    }

    /// The file descriptor of the request.
    ///
    /// The descriptor remains owned by the request, so it must not be closed,
    /// nor used after the request is released.
    pub fn fd(&self) -> Result<RawFd> {
        Ok(self.handle()?.as_raw_fd())
    }

    /// Get the value of one line in the request.
    ///
    /// # Examples
    /// ```no_run
    /// # fn example(f: std::fs::File) -> Result<(), gpioline::Error> {
    /// let req = gpioline::Request::new(f, &[3, 7])?;
    /// let v7 = req.value(7)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn value(&self, offset: Offset) -> Result<Value> {
        let mut value = [Value::Inactive];
        self.values_subset(&[offset], &mut value)?;
        Ok(value[0])
    }

    /// Get the values of all the lines in the request.
    ///
    /// The values are returned in the order of [`offsets`], so `values` must be
    /// the same length as the request.
    ///
    /// [`offsets`]: #method.offsets
    pub fn values(&self, values: &mut [Value]) -> Result<()> {
        let handle = self.handle()?;
        if values.len() != self.num_lines {
            return Err(self.length_mismatch("values", values.len()));
        }
        let mut lv = v2::LineValues::from_mask(self.full_mask());
        handle
            .get_line_values(&mut lv)
            .map_err(|e| Error::Uapi(UapiCall::GetLineValues, e))?;
        for (idx, value) in values.iter_mut().enumerate() {
            *value = bit_value(&lv, idx);
        }
        Ok(())
    }

    /// Get the values of a subset of the lines in the request.
    ///
    /// * `offsets` - The lines to read, in any order.
    ///   An offset may be repeated, and each repeat gets the same value.
    /// * `values` - Where to return the values, in the same order as `offsets`.
    ///
    /// If any offset is not part of the request then [`Error::NotFound`] is
    /// returned without reading any line, and `values` is left untouched.
    ///
    /// # Examples
    /// ```no_run
    /// # fn example(f: std::fs::File) -> Result<(), gpioline::Error> {
    /// # use gpioline::line::Value;
    /// let req = gpioline::Request::new(f, &[3, 5, 6, 8])?;
    /// let mut values = [Value::Inactive; 2];
    /// req.values_subset(&[8, 5], &mut values)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn values_subset(&self, offsets: &[Offset], values: &mut [Value]) -> Result<()> {
        let handle = self.handle()?;
        if offsets.len() != values.len() {
            return Err(Error::InvalidArgument(format!(
                "{} offsets provided with space for {} values.",
                offsets.len(),
                values.len()
            )));
        }
        let mut lv = v2::LineValues::from_mask(self.subset_mask(offsets)?);
        handle
            .get_line_values(&mut lv)
            .map_err(|e| Error::Uapi(UapiCall::GetLineValues, e))?;
        for (value, offset) in values.iter_mut().zip(offsets) {
            *value = bit_value(&lv, self.bit(*offset)?);
        }
        Ok(())
    }

    /// Set the value of one line in the request.
    ///
    /// Other lines in the request are unaffected.
    ///
    /// # Examples
    /// ```no_run
    /// # fn example(f: std::fs::File) -> Result<(), gpioline::Error> {
    /// # use gpioline::line::Value;
    /// let req = gpioline::Request::new(f, &[5, 6])?;
    /// req.set_value(5, Value::Active)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn set_value(&self, offset: Offset, value: Value) -> Result<()> {
        self.set_values_subset(&[offset], &[value])
    }

    /// Set the values of all the lines in the request.
    ///
    /// The values are applied in the order of [`offsets`], so `values` must be
    /// the same length as the request.
    ///
    /// [`offsets`]: #method.offsets
    pub fn set_values(&self, values: &[Value]) -> Result<()> {
        let handle = self.handle()?;
        if values.len() != self.num_lines {
            return Err(self.length_mismatch("values", values.len()));
        }
        let mut lv = v2::LineValues::default();
        for (idx, value) in values.iter().enumerate() {
            lv.set(idx, (*value).into());
        }
        handle
            .set_line_values(&lv)
            .map_err(|e| Error::Uapi(UapiCall::SetLineValues, e))
    }

    /// Set the values of a subset of the lines in the request.
    ///
    /// * `offsets` - The lines to set, in any order.
    /// * `values` - The values to set, in the same order as `offsets`.
    ///
    /// Lines not in `offsets` are unaffected.
    /// If an offset is repeated the last value for it is applied.
    ///
    /// If any offset is not part of the request then [`Error::NotFound`] is
    /// returned without setting any line.
    ///
    /// # Examples
    /// ```no_run
    /// # fn example(f: std::fs::File) -> Result<(), gpioline::Error> {
    /// # use gpioline::line::Value::{Active, Inactive};
    /// let req = gpioline::Request::new(f, &[3, 5, 6, 8])?;
    /// req.set_values_subset(&[5, 6], &[Inactive, Active])?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn set_values_subset(&self, offsets: &[Offset], values: &[Value]) -> Result<()> {
        let handle = self.handle()?;
        if offsets.len() != values.len() {
            return Err(Error::InvalidArgument(format!(
                "{} offsets provided with {} values.",
                offsets.len(),
                values.len()
            )));
        }
        if offsets.is_empty() {
            return Err(no_offsets());
        }
        let mut lv = v2::LineValues::default();
        for (offset, value) in offsets.iter().zip(values) {
            lv.set(self.bit(*offset)?, (*value).into());
        }
        handle
            .set_line_values(&lv)
            .map_err(|e| Error::Uapi(UapiCall::SetLineValues, e))
    }

    /// Apply a new configuration to the lines in the request.
    ///
    /// The set of lines is unchanged, and any lines in the config that are
    /// not part of the request are ignored.
    ///
    /// The kernel applies the whole configuration or none of it, so on error
    /// the previous configuration remains in effect.
    ///
    /// # Examples
    /// ```no_run
    /// # fn example(f: std::fs::File) -> Result<(), gpioline::Error> {
    /// # use gpioline::line::Value;
    /// # use gpioline::request::Config;
    /// let req = gpioline::Request::new(f, &[3, 5])?;
    /// let mut cfg = Config::default();
    /// cfg.as_input().with_line(5).as_output(Value::Active);
    /// req.reconfigure(&cfg)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn reconfigure(&self, config: &Config) -> Result<()> {
        let handle = self.handle()?;
        let lc = config.to_v2(self.offsets())?;
        debug!(
            "reconfigure lines {:?} on fd {}: {:?}",
            self.offsets(),
            handle.as_raw_fd(),
            lc
        );
        handle
            .set_line_config(lc)
            .map_err(|e| Error::Uapi(UapiCall::SetLineConfig, e))
    }

    /// Returns true if an edge event is available to read.
    ///
    /// Never blocks.
    pub fn has_edge_event(&self) -> Result<bool> {
        self.handle()?
            .has_event()
            .map_err(|e| Error::Uapi(UapiCall::HasEvent, e))
    }

    /// Wait for an edge event to be available to read.
    ///
    /// * `timeout` - The maximum time to wait.
    ///   `None` waits indefinitely, while a zero duration polls without blocking.
    ///
    /// Returns true if an event is available, or false if the timeout expired.
    ///
    /// The request must not be released from elsewhere, e.g. by closing the
    /// descriptor returned by [`fd`], while a wait is in progress.
    ///
    /// [`fd`]: #method.fd
    pub fn wait_edge_event(&self, timeout: Option<Duration>) -> Result<bool> {
        self.handle()?
            .wait_event(timeout)
            .map_err(|e| Error::Uapi(UapiCall::WaitEvent, e))
    }

    /// Read the edge events currently available into a buffer.
    ///
    /// * `buf` - The buffer to read into.  Any previous contents are discarded.
    /// * `max_events` - The maximum number of events to read.
    ///   Limited to the capacity of the buffer.
    ///
    /// Returns the number of events read, which may be zero if no events
    /// are available.
    ///
    /// If any event in the batch read from the kernel cannot be decoded then
    /// the whole batch is discarded, leaving `buf` empty.
    ///
    /// Never blocks.  Use [`wait_edge_event`] to wait for events.
    ///
    /// # Examples
    /// ```no_run
    /// # fn example(f: std::fs::File) -> Result<(), gpioline::Error> {
    /// # use gpioline::request::EdgeEventBuffer;
    /// let req = gpioline::Request::new(f, &[3])?;
    /// let mut buf = EdgeEventBuffer::new(16);
    /// while req.wait_edge_event(None)? {
    ///     req.read_edge_events(&mut buf, 16)?;
    ///     for event in &buf {
    ///         println!("{:?}", event);
    ///     }
    /// }
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// [`wait_edge_event`]: #method.wait_edge_event
    pub fn read_edge_events(&self, buf: &mut EdgeEventBuffer, max_events: usize) -> Result<usize> {
        let handle = self.handle()?;
        buf.clear();
        if max_events == 0 {
            return Ok(0);
        }
        if !handle
            .has_event()
            .map_err(|e| Error::Uapi(UapiCall::HasEvent, e))?
        {
            return Ok(0);
        }
        let words = handle
            .read_event(buf.raw_mut(max_events))
            .map_err(|e| Error::Uapi(UapiCall::ReadEvent, e))?;
        if let Err(e) = decode_events(buf, words) {
            buf.clear();
            return Err(e);
        }
        trace!(
            "read {} edge events from fd {}",
            buf.len(),
            handle.as_raw_fd()
        );
        Ok(buf.len())
    }

    /// Release the request, closing the request file.
    ///
    /// Releasing a request that has already been released returns
    /// [`Error::Released`].
    pub fn release(&mut self) -> Result<()> {
        let handle = self.handle.take().ok_or(Error::Released)?;
        debug!(
            "release lines {:?} on fd {}",
            self.offsets(),
            handle.as_raw_fd()
        );
        drop(handle);
        Ok(())
    }

    #[inline]
    fn handle(&self) -> Result<&H> {
        self.handle.as_ref().ok_or(Error::Released)
    }

    /// The bit for a line in the request.
    #[inline]
    fn bit(&self, offset: Offset) -> Result<usize> {
        self.offsets()
            .iter()
            .position(|o| *o == offset)
            .ok_or(Error::NotFound(offset))
    }

    /// The mask selecting every line in the request.
    #[inline]
    fn full_mask(&self) -> u64 {
        u64::MAX >> (NUM_LINES_MAX - self.num_lines)
    }

    /// The mask selecting a subset of lines.
    fn subset_mask(&self, offsets: &[Offset]) -> Result<u64> {
        if offsets.is_empty() {
            return Err(no_offsets());
        }
        let mut mask = 0;
        for offset in offsets {
            mask |= 0x01 << self.bit(*offset)?;
        }
        Ok(mask)
    }

    fn length_mismatch(&self, what: &str, len: usize) -> Error {
        Error::InvalidArgument(format!(
            "{len} {what} provided for a request of {} lines.",
            self.num_lines
        ))
    }
}

/// Decode the raw events read into the buffer.
fn decode_events(buf: &mut EdgeEventBuffer, words: usize) -> Result<()> {
    let ees = v2::LineEdgeEvent::u64_size();
    let mut start = 0;
    while start < words {
        let end = words.min(start + ees);
        let event = {
            let le = v2::LineEdgeEvent::from_slice(&buf.raw(words)[start..end])
                .map_err(|e| Error::Uapi(UapiCall::LEEFromBuf, e))?;
            EdgeEvent::try_from(le)?
        };
        buf.push(event);
        start = end;
    }
    Ok(())
}

fn no_offsets() -> Error {
    Error::InvalidArgument("No offsets provided.".into())
}

/// The value of a line from its bit, ignoring the mask.
#[inline]
fn bit_value(lv: &v2::LineValues, idx: usize) -> Value {
    Value::from(lv.bits & (0x01 << idx) != 0)
}
