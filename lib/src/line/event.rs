// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::Offset;
use crate::{Error, UapiField};
use gpioline_uapi::v2::{LineEdgeEvent, LineEdgeEventKind};
#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};

/// The details of an edge detected on an input line.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EdgeEvent {
    /// The best estimate of time of event occurrence, in nanoseconds.
    ///
    /// The clock is determined by the line [`EventClock`](super::EventClock)
    /// so the value is left raw.
    pub timestamp_ns: u64,

    /// The event trigger identifier.
    pub kind: EdgeKind,

    /// The offset of the line that triggered the event.
    pub offset: Offset,

    /// The sequence number for this event in the sequence of events for all
    /// the lines in this line request.
    pub seqno: u32,

    /// The sequence number for this event in the sequence of events on this
    /// particular line.
    #[cfg_attr(feature = "serde", serde(rename = "lineSeqno"))]
    pub line_seqno: u32,
}

impl TryFrom<&LineEdgeEvent> for EdgeEvent {
    type Error = Error;

    fn try_from(le: &LineEdgeEvent) -> Result<Self, Self::Error> {
        let kind = LineEdgeEventKind::try_from(le.kind)
            .map_err(|_| Error::UnexpectedResponse(UapiField::Kind, le.kind.to_string()))?;
        Ok(EdgeEvent {
            timestamp_ns: le.timestamp_ns,
            kind: kind.into(),
            offset: le.offset,
            seqno: le.seqno,
            line_seqno: le.line_seqno,
        })
    }
}

/// The cause of an [`EdgeEvent`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EdgeKind {
    /// The line transitioned from inactive to active.
    #[default]
    Rising = 1,

    /// The line transitioned from active to inactive.
    Falling = 2,
}

impl From<LineEdgeEventKind> for EdgeKind {
    fn from(kind: LineEdgeEventKind) -> Self {
        match kind {
            LineEdgeEventKind::RisingEdge => EdgeKind::Rising,
            LineEdgeEventKind::FallingEdge => EdgeKind::Falling,
        }
    }
}
