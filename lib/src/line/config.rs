// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::{Bias, Direction, Drive, EdgeDetection, EventClock, Value};
use gpioline_uapi::v2::LineFlags;
#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};
use std::time::Duration;

/// The configuration settings for a single line.
///
// The offset is deliberately absent so one Config can be shared by many lines.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// The direction setting for the line.
    pub direction: Option<Direction>,

    /// The active low setting for the line.
    pub active_low: bool,

    /// The bias setting for the line.
    pub bias: Option<Bias>,

    /// The drive setting for the line.
    ///
    /// Only relevant for output lines.
    pub drive: Option<Drive>,

    /// The edge detection setting for the line.
    ///
    /// Only relevant for input lines.
    pub edge_detection: Option<EdgeDetection>,

    /// The source clock for edge event timestamps.
    ///
    /// Only relevant for input lines with edge detection enabled.
    pub event_clock: Option<EventClock>,

    /// The debounce period.
    ///
    /// Edges occurring at a rate faster than the period are filtered.
    ///
    /// Only relevant for input lines.
    pub debounce_period: Option<Duration>,

    /// The logical value to be applied to the line if it is an output.
    pub value: Option<Value>,
}

impl Config {
    /// The output value to apply, if the line is an output.
    pub(crate) fn output_value(&self) -> Option<Value> {
        match self.direction {
            Some(Direction::Output) => Some(self.value.unwrap_or_default()),
            _ => None,
        }
    }

    /// The debounce period in whole microseconds, rounded up.
    ///
    /// Zero and unset periods, and output lines, have no debounce.
    pub(crate) fn debounce_us(&self) -> Option<u32> {
        if self.direction == Some(Direction::Output) {
            return None;
        }
        let period = self.debounce_period?;
        if period.is_zero() {
            return None;
        }
        let us = (period.as_nanos() + 999) / 1000;
        Some(u32::try_from(us).unwrap_or(u32::MAX))
    }
}

impl From<&Config> for LineFlags {
    fn from(cfg: &Config) -> LineFlags {
        let mut flags = LineFlags::empty();
        flags.set(LineFlags::ACTIVE_LOW, cfg.active_low);
        if let Some(bias) = cfg.bias {
            flags |= bias.flags();
        }
        let Some(direction) = cfg.direction else {
            return flags;
        };
        flags |= direction.flags();
        match direction {
            Direction::Output => {
                flags |= cfg.drive.unwrap_or_default().flags();
            }
            Direction::Input => {
                if let Some(edges) = cfg.edge_detection {
                    flags |= edges.flags();
                    flags |= cfg.event_clock.unwrap_or_default().flags();
                }
            }
        }
        flags
    }
}
