// SPDX-FileCopyrightText: 2021 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::line::EdgeEvent;
use gpioline_uapi::v2::LineEdgeEvent;
use std::slice::Iter;

/// The number of events a buffer holds if no capacity is given.
pub const DEFAULT_CAPACITY: usize = 64;

/// The largest number of events a buffer may hold.
pub const MAX_CAPACITY: usize = 1024;

/// A user space buffer for reading edge events in bulk from a [`Request`].
///
/// The buffer is filled by [`Request::read_edge_events`], which replaces
/// any previous contents, and the decoded events are then available by index
/// or by iteration.
///
/// Storage for the raw and decoded events is allocated up front, so reads
/// do not allocate.
///
/// [`Request`]: super::Request
/// [`Request::read_edge_events`]: super::Request::read_edge_events
#[derive(Debug)]
pub struct EdgeEventBuffer {
    /// The raw events as read from the kernel.
    raw: Vec<u64>,

    /// The events decoded from the last read.
    events: Vec<EdgeEvent>,

    capacity: usize,
}

impl EdgeEventBuffer {
    /// Create a buffer able to hold `capacity` events.
    ///
    /// A capacity of 0 selects the default of 64, and the capacity is
    /// limited to 1024.
    pub fn new(capacity: usize) -> EdgeEventBuffer {
        let capacity = match capacity {
            0 => DEFAULT_CAPACITY,
            c => c.min(MAX_CAPACITY),
        };
        EdgeEventBuffer {
            raw: vec![0; capacity * LineEdgeEvent::u64_size()],
            events: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// The number of events that can be stored in the buffer.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of events stored by the last read.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if the last read stored no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The event at `idx`, if that many events are stored.
    pub fn event(&self, idx: usize) -> Option<&EdgeEvent> {
        self.events.get(idx)
    }

    /// Iterate over the stored events, in the order they were read.
    pub fn iter(&self) -> Iter<'_, EdgeEvent> {
        self.events.iter()
    }

    pub(crate) fn clear(&mut self) {
        self.events.clear();
    }

    /// The raw storage for up to `max_events` events.
    pub(crate) fn raw_mut(&mut self, max_events: usize) -> &mut [u64] {
        let words = max_events.min(self.capacity) * LineEdgeEvent::u64_size();
        &mut self.raw[..words]
    }

    pub(crate) fn raw(&self, words: usize) -> &[u64] {
        &self.raw[..words]
    }

    pub(crate) fn push(&mut self, event: EdgeEvent) {
        debug_assert!(self.events.len() < self.capacity);
        self.events.push(event);
    }
}

impl Default for EdgeEventBuffer {
    fn default() -> Self {
        EdgeEventBuffer::new(DEFAULT_CAPACITY)
    }
}

impl<'a> IntoIterator for &'a EdgeEventBuffer {
    type Item = &'a EdgeEvent;
    type IntoIter = Iter<'a, EdgeEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
