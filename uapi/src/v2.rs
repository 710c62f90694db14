// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use bitflags::bitflags;
use std::fmt;
use std::fs::File;
use std::mem::size_of;
use std::os::unix::prelude::AsRawFd;
use std::time::Duration;

use super::common::{iorw, ValidationResult};
pub use super::common::*;

#[repr(u8)]
enum Ioctl {
    SetLineConfig = 0xD,
    GetLineValues = 0xE,
    SetLineValues = 0xF,
}

bitflags! {
    /// Flags indicating the configuration of a line.
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    pub struct LineFlags: u64 {
        /// The line is in use and is not available for request.
        const USED = 1;

        /// The line active state corresponds to a physical low.
        const ACTIVE_LOW = 2;

        /// The line is an input.
        const INPUT = 4;

        /// The line is an output.
        const OUTPUT = 8;

        /// The line detects rising (*inactive* to *active*) edges.
        const EDGE_RISING = 16;

        /// The line detects falling (*active* to *inactive*) edges.
        const EDGE_FALLING = 32;

        /// The line is an open drain output.
        const OPEN_DRAIN = 64;

        /// The line is an open source output.
        const OPEN_SOURCE = 128;

        /// The line has pull-up bias enabled.
        const BIAS_PULL_UP = 256;

        /// The line has pull-down bias enabled.
        const BIAS_PULL_DOWN = 512;

        /// The line has bias disabled.
        const BIAS_DISABLED = 1024;

        /// The line events contain **CLOCK_REALTIME** timestamps.
        const EVENT_CLOCK_REALTIME = 2048;

        /// The line events contain **HTE** timestamps.
        const EVENT_CLOCK_HTE = 4096;
    }
}

/// The bitmap pair exchanged when getting or setting line values.
///
/// Bit `n` of each field corresponds to the line at index `n` of the offsets
/// of the request, so the first requested line is bit 0.
///
/// The `bits` are only meaningful where the corresponding `mask` bit is set.
/// On a get the kernel leaves the unmasked bits unspecified.
/// On a set the kernel leaves the unmasked lines untouched.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LineValues {
    /// The value of the lines, set to 1 for *active* and 0 for *inactive*.
    pub bits: u64,

    /// The lines in a request to access, set to 1 to access and 0 to ignore.
    pub mask: u64,
}

impl LineValues {
    /// Create values with the given bits selected, but no values set.
    pub fn from_mask(mask: u64) -> Self {
        LineValues { bits: 0, mask }
    }

    /// Select a line and set its value.
    ///
    /// The value is not applied to hardware until passed to [`set_line_values`].
    ///
    /// * `idx` - The index of the line in the request offsets.
    /// * `active` - The logical state of the line to be set.
    #[inline]
    pub fn set(&mut self, idx: usize, active: bool) {
        debug_assert!(idx < NUM_LINES_MAX);
        let mask = 0x01 << idx;
        self.mask |= mask;
        if active {
            self.bits |= mask;
        } else {
            self.bits &= !mask;
        }
    }
}

/// Read the values of the lines selected by `lv.mask`.
///
/// * `lf` - The request file.
/// * `lv` - The line values, with the mask selecting the lines to read.
///   The bits are populated on return.
#[inline]
pub fn get_line_values(lf: &File, lv: &mut LineValues) -> Result<()> {
    // SAFETY: the returned struct is plain bitmaps, so any value is valid.
    match unsafe { libc::ioctl(lf.as_raw_fd(), iorw!(Ioctl::GetLineValues, LineValues), lv) } {
        0 => Ok(()),
        _ => Err(Error::from_errno()),
    }
}

/// Set the values of the lines selected by `lv.mask`.
///
/// Setting the value of an input line is an error.
///
/// * `lf` - The request file.
/// * `lv` - The line values to be set.
#[inline]
pub fn set_line_values(lf: &File, lv: &LineValues) -> Result<()> {
    let mut lv = *lv;
    // SAFETY: lv is a local copy so any modification by the kernel is discarded.
    match unsafe {
        libc::ioctl(
            lf.as_raw_fd(),
            iorw!(Ioctl::SetLineValues, LineValues),
            &mut lv,
        )
    } {
        0 => Ok(()),
        _ => Err(Error::from_errno()),
    }
}

/// An identifier for which field of the [`LineAttributeValueUnion`] is in use.
#[repr(u32)]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LineAttributeKind {
    /// The attribute is *inactive* - no fields are in use.
    #[default]
    Unused = 0,

    /// The flags field is in use.
    Flags = 1,

    /// The values field is in use.
    Values = 2,

    /// The debounce_period_us field is in use.
    Debounce = 3,
}

/// A configurable attribute of a line.
#[repr(C)]
#[derive(Clone, Copy, Default)]
pub struct LineAttribute {
    /// The type of attribute stored in `value`.
    pub kind: LineAttributeKind,

    /// Reserved for future use and must be zero filled.
    #[doc(hidden)]
    pub padding: Padding<1>,

    /// The attribute value.
    pub value: LineAttributeValueUnion,
}

impl LineAttribute {
    /// Set the attribute as debounce period.
    pub fn set_debounce_period_us(&mut self, debounce_period_us: u32) {
        self.kind = LineAttributeKind::Debounce;
        self.value.debounce_period_us = debounce_period_us;
    }

    /// Set the attribute as flags.
    pub fn set_flags(&mut self, flags: LineFlags) {
        self.kind = LineAttributeKind::Flags;
        self.value.flags = flags;
    }

    /// Set the attribute as output values.
    pub fn set_values(&mut self, values: u64) {
        self.kind = LineAttributeKind::Values;
        self.value.values = values;
    }

    /// Get the contained value.
    ///
    /// Converts the kind/union pair into a safe enum.
    pub fn to_value(&self) -> Option<LineAttributeValue> {
        // SAFETY: kind identifies the active union field.
        unsafe {
            Some(match self.kind {
                LineAttributeKind::Unused => return None,
                LineAttributeKind::Flags => LineAttributeValue::Flags(self.value.flags),
                LineAttributeKind::Values => LineAttributeValue::Values(self.value.values),
                LineAttributeKind::Debounce => LineAttributeValue::DebouncePeriod(
                    Duration::from_micros(self.value.debounce_period_us as u64),
                ),
            })
        }
    }
}

impl fmt::Debug for LineAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_value() {
            None => write!(f, "unused"),
            Some(LineAttributeValue::Flags(flags)) => write!(f, "flags: {flags:?}"),
            Some(LineAttributeValue::Values(values)) => write!(f, "values: {values:016x}"),
            Some(LineAttributeValue::DebouncePeriod(dp)) => {
                write!(f, "debounce_period_us: {}", dp.as_micros())
            }
        }
    }
}

impl PartialEq for LineAttribute {
    fn eq(&self, other: &Self) -> bool {
        self.to_value() == other.to_value()
    }
}
impl Eq for LineAttribute {}

/// The value of a particular line attribute.
#[repr(C)]
#[derive(Clone, Copy)]
pub union LineAttributeValueUnion {
    /// The line configuration flags.
    pub flags: LineFlags,

    /// The values to which the lines will be set, with each bit number
    /// corresponding to the index of the line in the request offsets.
    pub values: u64,

    /// The debounce period, in microseconds.
    pub debounce_period_us: u32,
}

impl Default for LineAttributeValueUnion {
    fn default() -> Self {
        LineAttributeValueUnion { values: 0 }
    }
}

/// The attribute value contained within a [`LineAttribute`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LineAttributeValue {
    /// The debounce period attribute as a Duration.
    DebouncePeriod(Duration),

    /// The configuration flags.
    Flags(LineFlags),

    /// The line values.
    Values(u64),
}

/// A configuration attribute associated with one or more of the requested lines.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LineConfigAttribute {
    /// The configurable attribute.
    pub attr: LineAttribute,

    /// The lines to which the attribute applies, with each bit number
    /// corresponding to the index of the line in the request offsets.
    pub mask: u64,
}

/// The capacity of the [`LineConfigAttributes`] array.
pub const NUM_ATTRS_MAX: usize = 10;

/// The set of additional configuration attributes for a line request.
///
/// [`LineConfig.num_attrs`] specifies the number of entries in use.
///
/// If an attribute is associated with a line multiple times then the
/// first occurrence (i.e. lowest index) has precedence.
///
/// [`LineConfig.num_attrs`]: struct@LineConfig
#[repr(C)]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LineConfigAttributes(pub [LineConfigAttribute; NUM_ATTRS_MAX]);

/// Configuration for a set of requested lines.
#[repr(C)]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LineConfig {
    /// Flags for the GPIO lines.  This is the default for all requested lines but
    /// may be overridden for particular lines using `attrs`.
    pub flags: LineFlags,

    /// The number of attributes active in `attrs`.
    pub num_attrs: u32,

    /// Reserved for future use and must be zero filled.
    #[doc(hidden)]
    pub padding: Padding<5>,

    /// The configuration attributes associated with the requested lines.
    ///
    /// The number of active attributes in the array is specified by `num_attrs`.
    pub attrs: LineConfigAttributes,
}

impl LineConfig {
    /// The active attributes.
    pub fn active_attrs(&self) -> &[LineConfigAttribute] {
        &self.attrs.0[..(self.num_attrs as usize).min(NUM_ATTRS_MAX)]
    }

    /// Claim the next free attribute, if any.
    fn next_attr(&mut self) -> Option<&mut LineConfigAttribute> {
        let idx = self.num_attrs as usize;
        if idx >= NUM_ATTRS_MAX {
            return None;
        }
        self.num_attrs += 1;
        Some(&mut self.attrs.0[idx])
    }

    /// Add a debounce attribute to the config.
    ///
    /// Returns false if the attributes are already full.
    pub fn add_debounce(&mut self, period_us: u32, mask: u64) -> bool {
        self.next_attr()
            .map(|lca| {
                lca.mask = mask;
                lca.attr.set_debounce_period_us(period_us);
            })
            .is_some()
    }

    /// Add a flags attribute to the config.
    ///
    /// Returns false if the attributes are already full.
    pub fn add_flags(&mut self, flags: LineFlags, mask: u64) -> bool {
        self.next_attr()
            .map(|lca| {
                lca.mask = mask;
                lca.attr.set_flags(flags);
            })
            .is_some()
    }

    /// Add a line values attribute to the config.
    ///
    /// Returns false if the attributes are already full.
    pub fn add_values(&mut self, values: &LineValues) -> bool {
        self.next_attr()
            .map(|lca| {
                lca.mask = values.mask;
                lca.attr.set_values(values.bits);
            })
            .is_some()
    }
}

/// Update the configuration of an existing line request.
///
/// The kernel applies the whole configuration or none of it.
///
/// * `lf` - The request file.
/// * `lc` - The configuration to be applied.
#[inline]
pub fn set_line_config(lf: &File, mut lc: LineConfig) -> Result<()> {
    // SAFETY: lc is consumed.
    match unsafe {
        libc::ioctl(
            lf.as_raw_fd(),
            iorw!(Ioctl::SetLineConfig, LineConfig),
            &mut lc,
        )
    } {
        0 => Ok(()),
        _ => Err(Error::from_errno()),
    }
}

/// Information about an edge event on a requested line.
#[repr(C)]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LineEdgeEvent {
    /// The best estimate of time of event occurrence, in nanoseconds.
    ///
    /// By default the timestamp is read from **CLOCK_MONOTONIC** and is
    /// intended to allow the accurate measurement of the time between events.
    /// It does not provide the wall-clock time.
    ///
    /// If the [`LineFlags::EVENT_CLOCK_REALTIME`] flag is set then the
    /// timestamp is read from **CLOCK_REALTIME**.
    pub timestamp_ns: u64,

    /// The event trigger identifier, a [`LineEdgeEventKind`].
    ///
    /// Kept raw as the kernel is the source of the value.
    pub kind: u32,

    /// The offset of the line that triggered the event.
    pub offset: Offset,

    /// The sequence number for this event in the sequence of events for all
    /// the lines in this line request.
    pub seqno: u32,

    /// The sequence number for this event in the sequence of events on this
    /// particular line.
    pub line_seqno: u32,

    /// Reserved for future use.
    #[doc(hidden)]
    pub padding: Padding<6>,
}

impl LineEdgeEvent {
    /// Read an edge event from a buffer.
    ///
    /// The buffer is assumed to have been populated by a read of the request File,
    /// so the content is validated before being returned.
    #[inline]
    pub fn from_slice(d: &[u64]) -> Result<&LineEdgeEvent> {
        let len = d.len() * 8;
        if len < size_of::<LineEdgeEvent>() {
            return Err(Error::from(UnderReadError::new(
                "LineEdgeEvent",
                size_of::<LineEdgeEvent>(),
                len,
            )));
        }
        // SAFETY: the slice is u64 aligned and large enough, and every field
        // is a plain integer so any bit pattern is valid.
        let le = unsafe { &*(d.as_ptr() as *const LineEdgeEvent) };
        le.validate().map(|_| le).map_err(Error::from)
    }

    /// Check that a LineEdgeEvent read from the kernel is valid in Rust.
    fn validate(&self) -> ValidationResult {
        LineEdgeEventKind::try_from(self.kind)
            .map(|_| ())
            .map_err(|e| ValidationError::new("kind", e))
    }

    /// The event as the raw u64 words read from the kernel.
    pub fn as_words(&self) -> &[u64] {
        // SAFETY: the struct is repr(C), u64 aligned and a multiple of 8 bytes.
        unsafe {
            std::slice::from_raw_parts(
                self as *const LineEdgeEvent as *const u64,
                LineEdgeEvent::u64_size(),
            )
        }
    }

    /// The number of u64 words required to store a LineEdgeEvent.
    pub const fn u64_size() -> usize {
        size_of::<LineEdgeEvent>() / 8
    }
}
