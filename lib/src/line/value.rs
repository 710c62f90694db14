// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// The logical level of a line.
///
/// The mapping between logical and physical levels depends on the
/// active-low setting of the line:
///
/// |                 | Physical Low | Physical High |
/// |-----------------|--------------|---------------|
/// | **Active-High** | Inactive     | Active        |
/// | **Active-Low**  | Active       | Inactive      |
///
/// On the wire a value is a single bit, set for [`Value::Active`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Value {
    /// The line is inactive.
    #[default]
    Inactive,

    /// The line is active.
    Active,
}

impl Value {
    /// The value opposite the current value.
    pub fn not(&self) -> Value {
        match self {
            Value::Active => Value::Inactive,
            Value::Inactive => Value::Active,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Value::Active => "active",
            Value::Inactive => "inactive",
        })
    }
}

impl From<Value> for bool {
    fn from(v: Value) -> bool {
        v == Value::Active
    }
}

impl From<Value> for u8 {
    fn from(v: Value) -> u8 {
        u8::from(bool::from(v))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Value {
        if b {
            Value::Active
        } else {
            Value::Inactive
        }
    }
}

impl From<u8> for Value {
    fn from(i: u8) -> Value {
        Value::from(i != 0)
    }
}
