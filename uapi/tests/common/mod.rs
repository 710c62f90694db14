// SPDX-FileCopyrightText: 2023 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::fs::File;
use std::io::Write;
use std::os::fd::OwnedFd;
use std::os::unix::net::UnixStream;
use std::time::Duration;

// max time to wait for an event - expected or not
pub const EVENT_WAIT_TIMEOUT: Duration = Duration::from_millis(25);

// A connected pair of files standing in for a line request.
//
// The first plays the request, the second plays the kernel side which
// writes events for the request to read.
pub fn file_pair() -> (File, File) {
    let (req, kernel) = UnixStream::pair().expect("socket pair should be created");
    (
        File::from(OwnedFd::from(req)),
        File::from(OwnedFd::from(kernel)),
    )
}

pub fn write_words(f: &mut File, words: &[u64]) {
    let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_ne_bytes()).collect();
    f.write_all(&bytes).expect("write should succeed");
}
