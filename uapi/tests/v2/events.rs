// SPDX-FileCopyrightText: 2023 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::*;
use gpioline_uapi::{has_event, read_event, wait_event};
use std::io::Write;
use std::time::Duration;

fn edge_event(kind: u32, offset: Offset, seqno: u32) -> LineEdgeEvent {
    LineEdgeEvent {
        timestamp_ns: 1000 * seqno as u64,
        kind,
        offset,
        seqno,
        line_seqno: seqno,
        padding: Default::default(),
    }
}

#[test]
fn wait_event_times_out() {
    let (req, _kernel) = file_pair();
    assert_eq!(wait_event(&req, Some(EVENT_WAIT_TIMEOUT)), Ok(false));
    assert_eq!(has_event(&req), Ok(false));
}

#[test]
fn wait_event_with_event() {
    let (req, mut kernel) = file_pair();
    let ev = edge_event(LineEdgeEventKind::RisingEdge as u32, 3, 1);
    write_words(&mut kernel, ev.as_words());

    assert_eq!(has_event(&req), Ok(true));
    assert_eq!(wait_event(&req, Some(EVENT_WAIT_TIMEOUT)), Ok(true));
    assert_eq!(wait_event(&req, None), Ok(true));
}

#[test]
fn wait_event_huge_timeout() {
    let (req, mut kernel) = file_pair();
    let ev = edge_event(LineEdgeEventKind::RisingEdge as u32, 3, 1);
    write_words(&mut kernel, ev.as_words());

    // seconds beyond time_t saturate rather than going negative
    assert_eq!(wait_event(&req, Some(Duration::MAX)), Ok(true));
    assert_eq!(
        wait_event(&req, Some(Duration::from_secs(u64::MAX - 1))),
        Ok(true)
    );
}

#[test]
fn read_event_single() {
    let (req, mut kernel) = file_pair();
    let ev = edge_event(LineEdgeEventKind::FallingEdge as u32, 7, 4);
    write_words(&mut kernel, ev.as_words());

    let mut buf = vec![0_u64; LineEdgeEvent::u64_size()];
    let n = read_event(&req, &mut buf).unwrap();
    assert_eq!(n, LineEdgeEvent::u64_size());

    let le = LineEdgeEvent::from_slice(&buf).unwrap();
    assert_eq!(le, &ev);
    assert_eq!(le.offset, 7);
    assert_eq!(le.seqno, 4);
    assert_eq!(has_event(&req), Ok(false));
}

#[test]
fn read_event_multiple() {
    let (req, mut kernel) = file_pair();
    let evs = [
        edge_event(LineEdgeEventKind::RisingEdge as u32, 3, 1),
        edge_event(LineEdgeEventKind::FallingEdge as u32, 3, 2),
        edge_event(LineEdgeEventKind::RisingEdge as u32, 5, 3),
    ];
    for ev in &evs {
        write_words(&mut kernel, ev.as_words());
    }

    let ees = LineEdgeEvent::u64_size();
    let mut buf = vec![0_u64; ees * 4];
    let n = read_event(&req, &mut buf).unwrap();
    assert_eq!(n, ees * 3);
    for (idx, chunk) in buf[..n].chunks_exact(ees).enumerate() {
        assert_eq!(LineEdgeEvent::from_slice(chunk).unwrap(), &evs[idx]);
    }
}

#[test]
fn read_event_partial_word() {
    let (req, mut kernel) = file_pair();
    kernel.write_all(&[1, 2, 3]).unwrap();

    let mut buf = vec![0_u64; LineEdgeEvent::u64_size()];
    assert_eq!(
        read_event(&req, &mut buf).unwrap_err().to_string(),
        "Reading event returned 3 bytes, expected 8."
    );
}

#[test]
fn read_event_invalid_kind() {
    let (req, mut kernel) = file_pair();
    let ev = edge_event(9, 1, 1);
    write_words(&mut kernel, ev.as_words());

    let mut buf = vec![0_u64; LineEdgeEvent::u64_size()];
    assert_eq!(read_event(&req, &mut buf), Ok(LineEdgeEvent::u64_size()));
    assert_eq!(
        LineEdgeEvent::from_slice(&buf).unwrap_err(),
        Error::Validation(ValidationError::new("kind", "invalid value: 9"))
    );
}
