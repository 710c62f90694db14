// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: MIT

//! A library for accessing requested GPIO lines on Linux platforms
//! using the GPIO character device.
//!
//! A [`Request`] wraps the file returned by the kernel when a set of lines
//! is requested, and provides access to the values, configuration and edge
//! events of those lines.
//!
//! Lines are identified by their offset on the chip.  Within a request each
//! line is also identified by its position in the requested offsets, which
//! is the bit used for that line in the bitmaps exchanged with the kernel.
//!
//! [`Request`]: request::Request

use gpioline_uapi as uapi;
use std::fmt;

/// Types specific to lines.
pub mod line;
use line::Offset;

/// Types and functions related to requested lines.
///
/// The [`Request`] accesses and manipulates a set of lines, and returns edge
/// events via the [`EdgeEventBuffer`].
///
/// The line configuration can be updated using a [`Config`].
///
/// To read the values of the lines of an existing request:
/// ```no_run
/// # use gpioline::Result;
/// use gpioline::line::Value;
/// use gpioline::request::Request;
/// use std::fs::File;
///
/// # fn example(f: File) -> Result<()> {
/// let req = Request::new(f, &[3, 7])?;
/// let mut values = [Value::Inactive; 2];
/// req.values(&mut values)?;
/// let v7 = req.value(7)?;
/// # Ok(())
/// # }
/// ```
///
/// [`Config`]: request::Config
/// [`EdgeEventBuffer`]: request::EdgeEventBuffer
/// [`Request`]: request::Request
pub mod request;
pub use request::Request;

/// Errors returned by [`gpioline`] functions.
///
/// [`gpioline`]: crate
#[derive(Clone, Debug, thiserror::Error, Eq, PartialEq)]
pub enum Error {
    /// An offset is not one of the requested lines.
    #[error("Offset {0} is not a requested line.")]
    NotFound(Offset),

    /// An error returned when there is a problem with an argument.
    #[error("{0}")]
    InvalidArgument(String),

    /// The request has been released.
    #[error("Request has been released.")]
    Released,

    /// An error returned from an underlying uAPI call.
    #[error("uAPI {0} returned: {1}")]
    Uapi(UapiCall, #[source] uapi::Error),

    /// The response to a uAPI command contained unexpected content.
    #[error("Kernel returned unexpected {0}: {1}.")]
    UnexpectedResponse(UapiField, String),
}

/// Identifiers for the underlying uAPI calls.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UapiCall {
    GetLineValues,
    HasEvent,
    LEEFromBuf,
    ReadEvent,
    SetLineConfig,
    SetLineValues,
    WaitEvent,
}

impl fmt::Display for UapiCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UapiCall::GetLineValues => "get_line_values",
            UapiCall::HasEvent => "has_event",
            UapiCall::LEEFromBuf => "LineEdgeEvent::from_slice",
            UapiCall::ReadEvent => "read_event",
            UapiCall::SetLineConfig => "set_line_config",
            UapiCall::SetLineValues => "set_line_values",
            UapiCall::WaitEvent => "wait_event",
        };
        write!(f, "{name}")
    }
}

/// Identifiers for uAPI struct fields.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UapiField {
    Kind,
}

impl fmt::Display for UapiField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UapiField::Kind => "kind",
        };
        write!(f, "{name}")
    }
}

/// The result for [`gpioline`] functions.
///
/// [`gpioline`]: crate
pub type Result<T> = std::result::Result<T, Error>;
