// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

mod config;
pub use self::config::Config;

mod event;
pub use self::event::{EdgeEvent, EdgeKind};

mod value;
pub use self::value::Value;

use gpioline_uapi::v2::LineFlags;
#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};

/// An identifier for a line on a particular chip.
///
/// Within a request each offset is mapped to the bit at its position in
/// the request offsets.
pub use gpioline_uapi::Offset;

/// The direction of a line.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// The line is an input.
    #[default]
    Input,

    /// The line is an output.
    Output,
}

impl Direction {
    pub(crate) fn flags(self) -> LineFlags {
        match self {
            Direction::Input => LineFlags::INPUT,
            Direction::Output => LineFlags::OUTPUT,
        }
    }
}

/// The bias settings for a line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Bias {
    /// The line has pull-up enabled.
    PullUp,

    /// The line has pull-down enabled.
    PullDown,

    /// The line has bias disabled and will float unless externally driven.
    Disabled,
}

impl Bias {
    pub(crate) fn flags(self) -> LineFlags {
        match self {
            Bias::PullUp => LineFlags::BIAS_PULL_UP,
            Bias::PullDown => LineFlags::BIAS_PULL_DOWN,
            Bias::Disabled => LineFlags::BIAS_DISABLED,
        }
    }
}

/// The drive policy settings for an output line.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Drive {
    /// The line is driven when both active and inactive.
    #[default]
    PushPull,

    /// The line is driven when low and set high impedance when high.
    OpenDrain,

    /// The line is driven when high and set high impedance when low.
    OpenSource,
}

impl Drive {
    pub(crate) fn flags(self) -> LineFlags {
        match self {
            Drive::PushPull => LineFlags::empty(),
            Drive::OpenDrain => LineFlags::OPEN_DRAIN,
            Drive::OpenSource => LineFlags::OPEN_SOURCE,
        }
    }
}

/// The edge detection options for an input line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EdgeDetection {
    /// Only rising edges, inactive to active, are detected.
    RisingEdge,

    /// Only falling edges, active to inactive, are detected.
    FallingEdge,

    /// Both rising and falling edges are detected.
    BothEdges,
}

impl EdgeDetection {
    pub(crate) fn flags(self) -> LineFlags {
        match self {
            EdgeDetection::RisingEdge => LineFlags::EDGE_RISING,
            EdgeDetection::FallingEdge => LineFlags::EDGE_FALLING,
            EdgeDetection::BothEdges => LineFlags::EDGE_RISING | LineFlags::EDGE_FALLING,
        }
    }
}

/// The available clock sources for [`EdgeEvent`] timestamps.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EventClock {
    /// **CLOCK_MONOTONIC**, the kernel default.
    #[default]
    Monotonic,

    /// **CLOCK_REALTIME**.
    Realtime,

    /// The hardware timestamp engine.
    ///
    /// Requires Linux 5.19 or later with CONFIG_HTE and supporting hardware.
    Hte,
}

impl EventClock {
    pub(crate) fn flags(self) -> LineFlags {
        match self {
            EventClock::Monotonic => LineFlags::empty(),
            EventClock::Realtime => LineFlags::EVENT_CLOCK_REALTIME,
            EventClock::Hte => LineFlags::EVENT_CLOCK_HTE,
        }
    }
}
