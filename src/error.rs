// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::frame::Exception;

/// vanny-modbus Error
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A request parameter was rejected before any I/O took place
    #[error("Invalid parameter: {0}")]
    InvalidParameter(Parameter),
    /// Nothing (or nothing usable) was received before the read timed out
    #[error("No response from slave")]
    NoResponse,
    /// Invalid CRC
    #[error("Invalid CRC: expected = 0x{expected:0>4X}, actual = 0x{actual:0>4X}")]
    CrcMismatch { expected: u16, actual: u16 },
    /// The response was sent by another slave
    #[error("Wrong slave address: expected = {expected}, actual = {actual}")]
    AddressMismatch { expected: u8, actual: u8 },
    /// The slave rejected the request
    #[error("Slave returned exception: {0}")]
    SlaveException(Exception),
    /// Response is shorter or longer than its function code allows
    #[error("Unexpected response length: {0} byte(s)")]
    UnexpectedLength(usize),
    /// Invalid function code
    #[error("Invalid function code: 0x{0:0>2X}")]
    FnCode(u8),
    /// Invalid buffer size
    #[error("Invalid buffer size")]
    BufferSize,
    /// The serial port or direction signal adapter failed
    #[error("Serial transport failure")]
    Transport,
}

/// The request parameter that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Parameter {
    #[error("quantity {quantity} is out of range {min}..={max}")]
    Quantity {
        quantity: usize,
        min: usize,
        max: usize,
    },
    #[error("coil value 0x{0:0>4X} is neither 0x0000 nor 0xFF00")]
    CoilValue(u16),
    #[error("baud rate {0} is not supported")]
    BaudRate(u32),
}

impl From<Parameter> for Error {
    fn from(p: Parameter) -> Self {
        Self::InvalidParameter(p)
    }
}
