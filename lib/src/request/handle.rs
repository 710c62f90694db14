// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use gpioline_uapi::{self as uapi, v2};
use std::fs::File;
use std::os::unix::prelude::AsRawFd;
use std::time::Duration;

/// The exchanges a [`Request`] makes with the kernel over its request file.
///
/// Implemented for [`File`], which performs the uAPI calls directly.
/// Alternate implementations may stand in for the kernel, e.g. to simulate
/// a set of lines.
///
/// [`Request`]: super::Request
pub trait Handle: AsRawFd {
    /// Read the values of the lines selected by `lv.mask` into `lv.bits`.
    fn get_line_values(&self, lv: &mut v2::LineValues) -> uapi::Result<()>;

    /// Set the values of the lines selected by `lv.mask`.
    fn set_line_values(&self, lv: &v2::LineValues) -> uapi::Result<()>;

    /// Apply a new configuration to all the lines.
    fn set_line_config(&self, lc: v2::LineConfig) -> uapi::Result<()>;

    /// Wait for an edge event to be available to read.
    ///
    /// `None` waits indefinitely.
    fn wait_event(&self, timeout: Option<Duration>) -> uapi::Result<bool>;

    /// Check if an edge event is available to read, without blocking.
    fn has_event(&self) -> uapi::Result<bool> {
        self.wait_event(Some(Duration::ZERO))
    }

    /// Read as many whole events as are available and fit in `buf`.
    ///
    /// Returns the number of u64 words read.
    fn read_event(&self, buf: &mut [u64]) -> uapi::Result<usize>;
}

impl Handle for File {
    fn get_line_values(&self, lv: &mut v2::LineValues) -> uapi::Result<()> {
        v2::get_line_values(self, lv)
    }

    fn set_line_values(&self, lv: &v2::LineValues) -> uapi::Result<()> {
        v2::set_line_values(self, lv)
    }

    fn set_line_config(&self, lc: v2::LineConfig) -> uapi::Result<()> {
        v2::set_line_config(self, lc)
    }

    fn wait_event(&self, timeout: Option<Duration>) -> uapi::Result<bool> {
        uapi::wait_event(self, timeout)
    }

    fn has_event(&self) -> uapi::Result<bool> {
        uapi::has_event(self)
    }

    fn read_event(&self, buf: &mut [u64]) -> uapi::Result<usize> {
        uapi::read_event(self, buf)
    }
}
