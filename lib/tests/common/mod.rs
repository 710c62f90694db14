// SPDX-FileCopyrightText: 2023 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

// A simulated bank of requested lines standing in for the kernel.

#![allow(dead_code)]

use gpioline::line::Offset;
use gpioline::request::{Handle, Request};
use gpioline_uapi::v2::{LineConfig, LineEdgeEvent, LineEdgeEventKind, LineValues};
use gpioline_uapi::{Errno, Error, Result};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::os::unix::io::{AsRawFd, RawFd};
use std::rc::Rc;
use std::time::Duration;

/// The fd reported by a simulated request.
pub const SIM_FD: RawFd = 42;

#[derive(Debug, Default)]
pub struct SimState {
    /// The line values, in request bit order.
    pub bits: u64,

    /// The last configuration applied.
    pub config: Option<LineConfig>,

    /// Events waiting to be read.
    pub events: VecDeque<LineEdgeEvent>,

    /// The errno to fail the next exchange with.
    pub fail: Option<i32>,

    /// Set once the request handle is dropped.
    pub closed: bool,

    pub gets: usize,
    pub sets: usize,
    pub configs: usize,
    pub waits: usize,
    pub reads: usize,
}

impl SimState {
    /// The total number of exchanges made with the simulator.
    pub fn exchanges(&self) -> usize {
        self.gets + self.sets + self.configs + self.waits + self.reads
    }

    fn check_fail(&mut self) -> Result<()> {
        match self.fail.take() {
            Some(errno) => Err(Error::Os(Errno(errno))),
            None => Ok(()),
        }
    }
}

/// The test side of a simulated request.
#[derive(Clone, Debug, Default)]
pub struct Sim(Rc<RefCell<SimState>>);

impl Sim {
    pub fn state(&self) -> std::cell::Ref<'_, SimState> {
        self.0.borrow()
    }

    pub fn state_mut(&self) -> std::cell::RefMut<'_, SimState> {
        self.0.borrow_mut()
    }

    /// Set the physical value of the line at bit `idx`.
    pub fn set_bit(&self, idx: usize, active: bool) {
        let mut s = self.0.borrow_mut();
        if active {
            s.bits |= 0x01 << idx;
        } else {
            s.bits &= !(0x01 << idx);
        }
    }

    pub fn bit(&self, idx: usize) -> bool {
        self.0.borrow().bits & (0x01 << idx) != 0
    }

    /// Fail the next exchange with the errno.
    pub fn fail_next(&self, errno: i32) {
        self.0.borrow_mut().fail = Some(errno);
    }

    /// Queue an edge event for the request to read.
    pub fn push_event(&self, kind: LineEdgeEventKind, offset: Offset, seqno: u32) {
        self.push_raw_event(LineEdgeEvent {
            timestamp_ns: 1_000 * seqno as u64,
            kind: kind as u32,
            offset,
            seqno,
            line_seqno: seqno,
            padding: Default::default(),
        });
    }

    pub fn push_raw_event(&self, le: LineEdgeEvent) {
        self.0.borrow_mut().events.push_back(le);
    }

    pub fn handle(&self) -> SimHandle {
        SimHandle(self.clone())
    }
}

/// The request side of a simulated request.
#[derive(Debug)]
pub struct SimHandle(Sim);

impl Drop for SimHandle {
    fn drop(&mut self) {
        self.0.state_mut().closed = true;
    }
}

impl AsRawFd for SimHandle {
    fn as_raw_fd(&self) -> RawFd {
        SIM_FD
    }
}

impl Handle for SimHandle {
    fn get_line_values(&self, lv: &mut LineValues) -> Result<()> {
        let mut s = self.0.state_mut();
        s.gets += 1;
        s.check_fail()?;
        // bits outside the mask are unspecified, so make them noisy
        lv.bits = (s.bits & lv.mask) | !lv.mask;
        Ok(())
    }

    fn set_line_values(&self, lv: &LineValues) -> Result<()> {
        let mut s = self.0.state_mut();
        s.sets += 1;
        s.check_fail()?;
        s.bits = (s.bits & !lv.mask) | (lv.bits & lv.mask);
        Ok(())
    }

    fn set_line_config(&self, lc: LineConfig) -> Result<()> {
        let mut s = self.0.state_mut();
        s.configs += 1;
        s.check_fail()?;
        s.config = Some(lc);
        Ok(())
    }

    fn wait_event(&self, _timeout: Option<Duration>) -> Result<bool> {
        let mut s = self.0.state_mut();
        s.waits += 1;
        s.check_fail()?;
        Ok(!s.events.is_empty())
    }

    fn read_event(&self, buf: &mut [u64]) -> Result<usize> {
        let mut s = self.0.state_mut();
        s.reads += 1;
        s.check_fail()?;
        assert!(!s.events.is_empty(), "read of empty sim would block");
        let ees = LineEdgeEvent::u64_size();
        let mut words = 0;
        while words + ees <= buf.len() {
            let Some(le) = s.events.pop_front() else {
                break;
            };
            buf[words..words + ees].copy_from_slice(le.as_words());
            words += ees;
        }
        Ok(words)
    }
}

/// Create a request of the offsets on a fresh simulator.
pub fn request(offsets: &[Offset]) -> (Request<SimHandle>, Sim) {
    let sim = Sim::default();
    let req = Request::new(sim.handle(), offsets).expect("request should be accepted");
    (req, sim)
}
