// SPDX-FileCopyrightText: 2023 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

// Without the GPIO character device available the ioctls can only be
// checked for the error path, where the errno must be passed through.

use super::*;

const NOT_A_REQUEST: Error = Error::Os(Errno(libc::ENOTTY));

#[test]
fn get_line_values_on_non_request() {
    let (req, _kernel) = file_pair();
    let mut lv = LineValues::from_mask(0x03);
    assert_eq!(get_line_values(&req, &mut lv), Err(NOT_A_REQUEST));
}

#[test]
fn set_line_values_on_non_request() {
    let (req, _kernel) = file_pair();
    let lv = LineValues {
        bits: 0x01,
        mask: 0x03,
    };
    assert_eq!(set_line_values(&req, &lv), Err(NOT_A_REQUEST));
}

#[test]
fn set_line_config_on_non_request() {
    let (req, _kernel) = file_pair();
    let mut lc = LineConfig {
        flags: LineFlags::OUTPUT,
        ..Default::default()
    };
    assert!(lc.add_values(&LineValues {
        bits: 0x01,
        mask: 0x01
    }));
    assert_eq!(set_line_config(&req, lc), Err(NOT_A_REQUEST));
}

#[test]
fn errno_display() {
    assert_eq!(
        NOT_A_REQUEST.to_string(),
        std::io::Error::from_raw_os_error(libc::ENOTTY).to_string()
    );
}
