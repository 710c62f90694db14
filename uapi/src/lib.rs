// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: MIT

//! A thin but safe Rust layer around the request side of the Linux GPIO uAPI.
//!
//! Covers the calls made on an already requested set of lines: reading and
//! writing values, reconfiguring, and waiting for and reading edge events.

pub(crate) mod common;

pub use common::{
    has_event, read_event, wait_event, Errno, Error, LineEdgeEventKind, Offset, Offsets, Result,
    UnderReadError, ValidationError, NUM_LINES_MAX,
};

/// GPIO ABI v2, released in Linux v5.10.
pub mod v2;
