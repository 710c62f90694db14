// SPDX-FileCopyrightText: 2023 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

// Measures the offset to bit translation around the value exchanges,
// using a handle that completes every exchange immediately.

use criterion::{criterion_group, criterion_main, Bencher, Criterion};

use gpioline::line::{Offset, Value};
use gpioline::request::{Handle, Request};
use gpioline_uapi::v2::{LineConfig, LineValues};
use gpioline_uapi::Result;
use std::cell::Cell;
use std::os::unix::io::{AsRawFd, RawFd};
use std::time::Duration;

criterion_group!(benches, benchmarks);
criterion_main!(benches);

fn benchmarks(c: &mut Criterion) {
    c.bench_function("get one", get_one);
    c.bench_function("get ten", get_ten);
    c.bench_function("get maxlen", get_maxlen);
    c.bench_function("get subset", get_subset);
    c.bench_function("set one", set_one);
    c.bench_function("set ten", set_ten);
    c.bench_function("set maxlen", set_maxlen);
    c.bench_function("set subset", set_subset);
}

#[derive(Debug, Default)]
struct NullHandle {
    bits: Cell<u64>,
}

impl AsRawFd for NullHandle {
    fn as_raw_fd(&self) -> RawFd {
        -1
    }
}

impl Handle for NullHandle {
    fn get_line_values(&self, lv: &mut LineValues) -> Result<()> {
        lv.bits = self.bits.get() & lv.mask;
        Ok(())
    }

    fn set_line_values(&self, lv: &LineValues) -> Result<()> {
        self.bits
            .set((self.bits.get() & !lv.mask) | (lv.bits & lv.mask));
        Ok(())
    }

    fn set_line_config(&self, _lc: LineConfig) -> Result<()> {
        Ok(())
    }

    fn wait_event(&self, _timeout: Option<Duration>) -> Result<bool> {
        Ok(false)
    }

    fn read_event(&self, _buf: &mut [u64]) -> Result<usize> {
        Ok(0)
    }
}

fn null_request(num_lines: u32) -> Request<NullHandle> {
    // sparse and reversed, so lookups are not trivially the bit index
    let offsets: Vec<Offset> = (0..num_lines).rev().map(|o| o * 3).collect();
    Request::new(NullHandle::default(), &offsets).unwrap()
}

// determine time taken to get one line
fn get_one(b: &mut Bencher) {
    let req = null_request(10);
    b.iter(|| {
        let _value = req.value(3).unwrap();
    });
}

// determine time taken to get ten lines
fn get_ten(b: &mut Bencher) {
    let req = null_request(10);
    let mut values = [Value::Inactive; 10];
    b.iter(|| {
        req.values(&mut values).unwrap();
    });
}

// determine time taken to get all lines in a full request
fn get_maxlen(b: &mut Bencher) {
    let req = null_request(64);
    let mut values = [Value::Inactive; 64];
    b.iter(|| {
        req.values(&mut values).unwrap();
    });
}

// determine time taken to get a subset of lines, with the worst case lookup
fn get_subset(b: &mut Bencher) {
    let req = null_request(64);
    let offsets = [0, 3, 6, 9];
    let mut values = [Value::Inactive; 4];
    b.iter(|| {
        req.values_subset(&offsets, &mut values).unwrap();
    });
}

// determine time taken to set one line
fn set_one(b: &mut Bencher) {
    let req = null_request(10);
    b.iter(|| {
        req.set_value(3, Value::Active).unwrap();
    });
}

// determine time taken to set ten lines
fn set_ten(b: &mut Bencher) {
    let req = null_request(10);
    let values = [Value::Active; 10];
    b.iter(|| {
        req.set_values(&values).unwrap();
    });
}

// determine time taken to set all lines in a full request
fn set_maxlen(b: &mut Bencher) {
    let req = null_request(64);
    let values = [Value::Active; 64];
    b.iter(|| {
        req.set_values(&values).unwrap();
    });
}

// determine time taken to set a subset of lines, with the worst case lookup
fn set_subset(b: &mut Bencher) {
    let req = null_request(64);
    let offsets = [0, 3, 6, 9];
    let values = [Value::Active, Value::Inactive, Value::Active, Value::Inactive];
    b.iter(|| {
        req.set_values_subset(&offsets, &values).unwrap();
    });
}
