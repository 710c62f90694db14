// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::line::{self, Bias, Direction, Drive, EdgeDetection, EventClock, Offset, Value};
use crate::{Error, Result};
use gpioline_uapi::v2::{self, LineFlags, LineValues, NUM_ATTRS_MAX};
use nohash_hasher::IntMap;
#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};
use std::time::Duration;

/// The configuration to apply to the lines of a [`Request`].
///
/// Settings are applied by the mutators to the selected lines.
/// With no lines selected the mutators update the base configuration,
/// which applies to every line without a configuration of its own.
///
/// Selecting a line with [`with_line`] or [`with_lines`] gives it its own
/// configuration, a copy of the base configuration at the time of selection.
///
/// Offsets that are not part of the request being reconfigured are ignored.
///
/// # Examples
/// ```
/// # use gpioline::line::{EdgeDetection, Value};
/// # use gpioline::request::Config;
/// let mut cfg = Config::default();
/// cfg.as_input()
///     .with_edge_detection(EdgeDetection::BothEdges)
///     .with_line(5)
///     .as_output(Value::Active);
/// ```
///
/// [`Request`]: super::Request
/// [`with_line`]: #method.with_line
/// [`with_lines`]: #method.with_lines
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// The configuration for lines without their own.
    base: line::Config,

    /// The lines with their own configuration.
    lcfg: IntMap<Offset, line::Config>,

    /// The lines updated by the mutators.
    ///
    /// If empty the base is updated.
    #[cfg_attr(feature = "serde", serde(skip))]
    selected: Vec<Offset>,
}

impl Config {
    /// Set the selected lines to input.
    ///
    /// This is a short form of [`with_direction(Input)`].
    ///
    /// This setting overrides any output specific settings.
    ///
    /// [`with_direction(Input)`]: #method.with_direction
    pub fn as_input(&mut self) -> &mut Self {
        self.with_direction(Direction::Input)
    }

    /// Set the selected lines to output with the given value.
    ///
    /// This setting overrides any input specific settings.
    pub fn as_output(&mut self, value: Value) -> &mut Self {
        self.with_direction(Direction::Output).with_value(value)
    }

    /// Do not set the direction of the selected lines.
    ///
    /// This clears any direction specific settings.
    pub fn as_is(&mut self) -> &mut Self {
        self.update_selected(|cfg| {
            cfg.direction = None;
            cfg.drive = None;
            cfg.value = None;
            cfg.edge_detection = None;
            cfg.debounce_period = None;
        })
    }

    /// Set the selected lines to active low.
    pub fn as_active_low(&mut self) -> &mut Self {
        self.update_selected(|cfg| cfg.active_low = true)
    }

    /// Set the selected lines to active high.
    ///
    /// This is the default active level.
    pub fn as_active_high(&mut self) -> &mut Self {
        self.update_selected(|cfg| cfg.active_low = false)
    }

    /// Set the bias setting for the selected lines.
    pub fn with_bias<B: Into<Option<Bias>>>(&mut self, bias: B) -> &mut Self {
        let bias = bias.into();
        self.update_selected(|cfg| cfg.bias = bias)
    }

    /// Set the debounce period for the selected lines.
    ///
    /// A zero value removes any existing debounce.
    ///
    /// This setting implies the lines are inputs.
    pub fn with_debounce_period(&mut self, period: Duration) -> &mut Self {
        let period = if period.is_zero() { None } else { Some(period) };
        self.as_input()
            .update_selected(|cfg| cfg.debounce_period = period)
    }

    /// Set the direction of the selected lines.
    ///
    /// Settings specific to the other direction are cleared.
    pub fn with_direction(&mut self, direction: Direction) -> &mut Self {
        self.update_selected(|cfg| {
            cfg.direction = Some(direction);
            match direction {
                Direction::Input => {
                    cfg.drive = None;
                    cfg.value = None;
                }
                Direction::Output => {
                    cfg.edge_detection = None;
                    cfg.debounce_period = None;
                }
            }
        })
    }

    /// Set the drive setting for the selected lines.
    ///
    /// This setting implies the lines are outputs.
    pub fn with_drive(&mut self, drive: Drive) -> &mut Self {
        self.with_direction(Direction::Output)
            .update_selected(|cfg| cfg.drive = Some(drive))
    }

    /// Set the edge detection for the selected lines.
    ///
    /// This setting implies the lines are inputs.
    pub fn with_edge_detection<E: Into<Option<EdgeDetection>>>(&mut self, edge: E) -> &mut Self {
        let edge = edge.into();
        self.as_input()
            .update_selected(|cfg| cfg.edge_detection = edge)
    }

    /// Set the clock source for edge event timestamps on the selected lines.
    pub fn with_event_clock(&mut self, event_clock: EventClock) -> &mut Self {
        self.update_selected(|cfg| cfg.event_clock = Some(event_clock))
    }

    /// Set the output value for the selected lines.
    ///
    /// Only relevant for output lines.
    pub fn with_value(&mut self, value: Value) -> &mut Self {
        self.update_selected(|cfg| cfg.value = Some(value))
    }

    /// Replace the configuration of the selected lines.
    pub fn from_line_config(&mut self, lc: &line::Config) -> &mut Self {
        self.update_selected(|cfg| *cfg = lc.clone())
    }

    /// Select a line to be updated by subsequent mutators.
    ///
    /// If the line has no configuration of its own it is given a copy of
    /// the base configuration.
    pub fn with_line(&mut self, offset: Offset) -> &mut Self {
        self.selected.clear();
        self.select_line(offset);
        self
    }

    /// Select a set of lines to be updated by subsequent mutators.
    pub fn with_lines(&mut self, offsets: &[Offset]) -> &mut Self {
        self.selected.clear();
        for offset in offsets {
            self.select_line(*offset);
        }
        self
    }

    /// Remove the configuration specific to a line.
    ///
    /// The line reverts to the base configuration.
    pub fn without_line(&mut self, offset: Offset) -> &mut Self {
        self.lcfg.remove(&offset);
        self.selected.retain(|x| *x != offset);
        self
    }

    /// Select the base configuration to be updated by subsequent mutators.
    pub fn with_base(&mut self) -> &mut Self {
        self.selected.clear();
        self
    }

    /// The configuration that applies to a line.
    pub fn line_config(&self, offset: Offset) -> &line::Config {
        self.lcfg.get(&offset).unwrap_or(&self.base)
    }

    /// The base configuration.
    pub fn base_config(&self) -> &line::Config {
        &self.base
    }

    fn select_line(&mut self, offset: Offset) {
        if !self.lcfg.contains_key(&offset) {
            self.lcfg.insert(offset, self.base.clone());
        }
        if !self.selected.contains(&offset) {
            self.selected.push(offset);
        }
    }

    fn update_selected<F: Fn(&mut line::Config)>(&mut self, f: F) -> &mut Self {
        if self.selected.is_empty() {
            f(&mut self.base);
        } else {
            for offset in &self.selected {
                if let Some(cfg) = self.lcfg.get_mut(offset) {
                    f(cfg);
                }
            }
        }
        self
    }

    /// Build the uAPI configuration for a request.
    ///
    /// Bit `n` of every mask corresponds to `offsets[n]`.
    ///
    /// Lines sharing the same flags share an attribute, with the most common
    /// flags becoming the default flags for the request.
    pub(crate) fn to_v2(&self, offsets: &[Offset]) -> Result<v2::LineConfig> {
        // attribute value to the lines using it, in order of first use
        let mut flags: Vec<(LineFlags, u64)> = Vec::new();
        let mut debounced: Vec<(u32, u64)> = Vec::new();
        let mut values = LineValues::default();
        for (idx, offset) in offsets.iter().enumerate() {
            let lcfg = self.line_config(*offset);
            let mask = 0x01 << idx;
            let lflags = LineFlags::from(lcfg);
            match flags.iter_mut().find(|(f, _)| *f == lflags) {
                Some((_, bits)) => *bits |= mask,
                None => flags.push((lflags, mask)),
            }
            if let Some(dp_us) = lcfg.debounce_us() {
                match debounced.iter_mut().find(|(dp, _)| *dp == dp_us) {
                    Some((_, bits)) => *bits |= mask,
                    None => debounced.push((dp_us, mask)),
                }
            }
            if let Some(value) = lcfg.output_value() {
                values.set(idx, value.into());
            }
        }
        // the kernel defaults output values to inactive, so only active
        // values need an attribute
        let with_values = values.bits != 0;
        let required = flags.len().saturating_sub(1) + debounced.len() + usize::from(with_values);
        if required > NUM_ATTRS_MAX {
            return Err(Error::InvalidArgument(format!(
                "configuration requires {required} attributes, the uAPI supports {NUM_ATTRS_MAX}."
            )));
        }

        let mut base_flags = LineFlags::default();
        let mut base_count = 0;
        for (flg, mask) in &flags {
            if mask.count_ones() > base_count {
                base_count = mask.count_ones();
                base_flags = *flg;
            }
        }
        let mut lc = v2::LineConfig {
            flags: base_flags,
            ..Default::default()
        };
        for (flg, mask) in flags.iter().filter(|(f, _)| *f != base_flags) {
            lc.add_flags(*flg, *mask);
        }
        if with_values {
            lc.add_values(&values);
        }
        for (dp_us, mask) in &debounced {
            lc.add_debounce(*dp_us, *mask);
        }
        Ok(lc)
    }
}
