// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Modbus RTU

use super::*;
use byteorder::LittleEndian;

pub mod client;
pub use crate::frame::rtu::*;

// [MODBUS over Serial Line Specification and Implementation Guide V1.02](http://modbus.org/docs/Modbus_over_serial_line_V1_02.pdf), page 13
// "The maximum size of a MODBUS RTU frame is 256 bytes."
pub const MAX_FRAME_LEN: usize = 256;

/// Number of CRC bytes at the end of every ADU.
pub const CRC_LEN: usize = 2;

/// Slave address and function code.
pub const RESPONSE_HDR_LEN: usize = 2;

/// Length of an exception response ADU.
pub const EXCEPTION_RESPONSE_LEN: usize = 5;

/// Length of a write response ADU (echoed address plus value or quantity).
pub const FIXED_RESPONSE_LEN: usize = 8;

const CRC_POLY: u16 = 0xA001;

/// Lookup table of the reflected Modbus CRC-16.
pub const CRC16_TABLE: [u16; 256] = crc16_table();

const fn crc16_table() -> [u16; 256] {
    let mut table = [0; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u16;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x0001 != 0 {
                (crc >> 1) ^ CRC_POLY
            } else {
                crc >> 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// Calculate the CRC (Cyclic Redundancy Check) sum.
///
/// The value goes on the wire in little-endian byte order.
#[must_use]
pub fn crc16(data: &[u8]) -> u16 {
    data.iter().fold(0xFFFF, |crc, x| {
        (crc >> 8) ^ CRC16_TABLE[usize::from((crc ^ u16::from(*x)) as u8)]
    })
}

/// Expected length of the response ADU in `adu_buf`.
///
/// Returns `None` as long as not enough bytes have been received to
/// tell. The length is inferred from the received function code:
///
/// - exception responses (high bit set) have a fixed length of 5 bytes
/// - read responses are prefixed with a byte count
/// - all other responses echo 4 bytes and have a fixed length of 8 bytes
#[must_use]
pub fn response_adu_len(adu_buf: &[u8]) -> Option<usize> {
    let &fn_code = adu_buf.get(1)?;
    if fn_code & EXCEPTION_BIAS != 0 {
        return Some(EXCEPTION_RESPONSE_LEN);
    }
    match FunctionCode::new(fn_code) {
        Some(function) if function.is_count_prefixed() => {
            let &byte_count = adu_buf.get(2)?;
            Some(RESPONSE_HDR_LEN + 1 + usize::from(byte_count) + CRC_LEN)
        }
        _ => Some(FIXED_RESPONSE_LEN),
    }
}

/// Check whether `adu_buf` holds a structurally complete response.
#[must_use]
pub fn is_complete_response(adu_buf: &[u8]) -> bool {
    response_adu_len(adu_buf).is_some_and(|len| adu_buf.len() >= len)
}

/// Validate a received response ADU and extract its data payload.
///
/// The checks are applied in this order: presence, CRC, slave address,
/// exception marker, function code and finally the length the function
/// code requires. The returned payload excludes the header (including
/// the byte count of read responses) and the CRC.
pub fn validate_response(
    adu_buf: &[u8],
    slave: SlaveId,
    function: FunctionCode,
) -> Result<&[u8]> {
    if adu_buf.is_empty() {
        return Err(Error::NoResponse);
    }
    if adu_buf.len() < RESPONSE_HDR_LEN + CRC_LEN {
        return Err(Error::UnexpectedLength(adu_buf.len()));
    }
    let (adu, crc_buf) = adu_buf.split_at(adu_buf.len() - CRC_LEN);
    let expected = crc16(adu);
    let actual = LittleEndian::read_u16(crc_buf);
    if expected != actual {
        return Err(Error::CrcMismatch { expected, actual });
    }
    if adu[0] != slave {
        return Err(Error::AddressMismatch {
            expected: slave,
            actual: adu[0],
        });
    }
    let fn_code = adu[1];
    if fn_code == function.exception_value() {
        let Some(&code) = adu.get(2) else {
            return Err(Error::UnexpectedLength(adu_buf.len()));
        };
        return Err(Error::SlaveException(Exception::new(code)));
    }
    if fn_code != function.value() {
        return Err(Error::FnCode(fn_code));
    }
    if function.is_count_prefixed() {
        let hdr_len = RESPONSE_HDR_LEN + 1;
        let Some(&byte_count) = adu.get(2) else {
            return Err(Error::UnexpectedLength(adu_buf.len()));
        };
        if adu.len() != hdr_len + usize::from(byte_count) {
            return Err(Error::UnexpectedLength(adu_buf.len()));
        }
        Ok(&adu[hdr_len..])
    } else {
        if adu_buf.len() != FIXED_RESPONSE_LEN {
            return Err(Error::UnexpectedLength(adu_buf.len()));
        }
        Ok(&adu[RESPONSE_HDR_LEN..])
    }
}
