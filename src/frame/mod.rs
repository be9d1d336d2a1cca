// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use core::fmt;

mod coils;
mod data;
pub(crate) mod rtu;

pub use self::{coils::*, data::*};

/// A Modbus function code.
///
/// Only the function codes a polling master needs are supported.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionCode {
    /// Modbus Function Code: `01` (`0x01`).
    ReadCoils,

    /// Modbus Function Code: `02` (`0x02`).
    ReadDiscreteInputs,

    /// Modbus Function Code: `03` (`0x03`).
    ReadHoldingRegisters,

    /// Modbus Function Code: `04` (`0x04`).
    ReadInputRegisters,

    /// Modbus Function Code: `05` (`0x05`).
    WriteSingleCoil,

    /// Modbus Function Code: `06` (`0x06`).
    WriteSingleRegister,

    /// Modbus Function Code: `15` (`0x0F`).
    WriteMultipleCoils,

    /// Modbus Function Code: `16` (`0x10`).
    WriteMultipleRegisters,
}

/// Added to the function code of a response that carries an exception.
pub const EXCEPTION_BIAS: u8 = 0x80;

impl FunctionCode {
    /// Create a new [`FunctionCode`] with `value`.
    ///
    /// Returns `None` for codes outside the supported set.
    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        let code = match value {
            0x01 => Self::ReadCoils,
            0x02 => Self::ReadDiscreteInputs,
            0x03 => Self::ReadHoldingRegisters,
            0x04 => Self::ReadInputRegisters,
            0x05 => Self::WriteSingleCoil,
            0x06 => Self::WriteSingleRegister,
            0x0F => Self::WriteMultipleCoils,
            0x10 => Self::WriteMultipleRegisters,
            _ => return None,
        };
        Some(code)
    }

    /// Get the [`u8`] value of the current [`FunctionCode`].
    #[must_use]
    pub const fn value(self) -> u8 {
        match self {
            Self::ReadCoils => 0x01,
            Self::ReadDiscreteInputs => 0x02,
            Self::ReadHoldingRegisters => 0x03,
            Self::ReadInputRegisters => 0x04,
            Self::WriteSingleCoil => 0x05,
            Self::WriteSingleRegister => 0x06,
            Self::WriteMultipleCoils => 0x0F,
            Self::WriteMultipleRegisters => 0x10,
        }
    }

    /// The function code byte of an exception response to this function.
    #[must_use]
    pub const fn exception_value(self) -> u8 {
        self.value() + EXCEPTION_BIAS
    }

    /// Whether responses to this function start with a byte count.
    ///
    /// This is true for all read functions. Write functions echo fixed
    /// size fields instead.
    #[must_use]
    pub const fn is_count_prefixed(self) -> bool {
        matches!(
            self,
            Self::ReadCoils
                | Self::ReadDiscreteInputs
                | Self::ReadHoldingRegisters
                | Self::ReadInputRegisters
        )
    }
}

impl fmt::Display for FunctionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:0>2X}", self.value())
    }
}

/// Slave ID
pub type SlaveId = u8;

/// A Modbus address is represented by 16 bit (from `0` to `65535`).
pub type Address = u16;

/// A Coil represents a single bit.
///
/// - `true` is equivalent to `ON`, `1` and `0xFF00`.
/// - `false` is equivalent to `OFF`, `0` and `0x0000`.
pub type Coil = bool;

/// Modbus uses 16 bit for its data items (big-endian representation).
pub type Word = u16;

/// Number of items to process (`0` - `65535`).
pub type Quantity = u16;

/// Wire value of a coil that is switched on.
pub const COIL_ON: u16 = 0xFF00;

/// Wire value of a coil that is switched off.
pub const COIL_OFF: u16 = 0x0000;

/// Maximum number of coils or discrete inputs per read request.
pub const MAX_READ_COILS: usize = 2000;

/// Maximum number of holding or input registers per read request.
pub const MAX_READ_REGISTERS: usize = 125;

/// Maximum number of coils per write multiple coils request.
pub const MAX_WRITE_COILS: usize = 1968;

/// Maximum number of registers per write multiple registers request.
pub const MAX_WRITE_REGISTERS: usize = 123;

/// A request represents a message from the client (master) to the server (slave).
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request<'r> {
    ReadCoils(Address, Quantity),
    ReadDiscreteInputs(Address, Quantity),
    ReadHoldingRegisters(Address, Quantity),
    ReadInputRegisters(Address, Quantity),
    /// The raw wire value, which must be [`COIL_ON`] or [`COIL_OFF`].
    WriteSingleCoil(Address, u16),
    WriteSingleRegister(Address, Word),
    WriteMultipleCoils(Address, Coils<'r>),
    WriteMultipleRegisters(Address, Data<'r>),
}

/// The response data of a successful request.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response<'r> {
    ReadCoils(Coils<'r>),
    ReadDiscreteInputs(Coils<'r>),
    ReadHoldingRegisters(Data<'r>),
    ReadInputRegisters(Data<'r>),
    WriteSingleCoil(Address, u16),
    WriteSingleRegister(Address, Word),
    WriteMultipleCoils(Address, Quantity),
    WriteMultipleRegisters(Address, Quantity),
}

impl From<Request<'_>> for FunctionCode {
    fn from(r: Request<'_>) -> Self {
        use Request as R;

        match r {
            R::ReadCoils(_, _) => Self::ReadCoils,
            R::ReadDiscreteInputs(_, _) => Self::ReadDiscreteInputs,
            R::ReadHoldingRegisters(_, _) => Self::ReadHoldingRegisters,
            R::ReadInputRegisters(_, _) => Self::ReadInputRegisters,
            R::WriteSingleCoil(_, _) => Self::WriteSingleCoil,
            R::WriteSingleRegister(_, _) => Self::WriteSingleRegister,
            R::WriteMultipleCoils(_, _) => Self::WriteMultipleCoils,
            R::WriteMultipleRegisters(_, _) => Self::WriteMultipleRegisters,
        }
    }
}

impl From<Response<'_>> for FunctionCode {
    fn from(r: Response<'_>) -> Self {
        use Response as R;

        match r {
            R::ReadCoils(_) => Self::ReadCoils,
            R::ReadDiscreteInputs(_) => Self::ReadDiscreteInputs,
            R::ReadHoldingRegisters(_) => Self::ReadHoldingRegisters,
            R::ReadInputRegisters(_) => Self::ReadInputRegisters,
            R::WriteSingleCoil(_, _) => Self::WriteSingleCoil,
            R::WriteSingleRegister(_, _) => Self::WriteSingleRegister,
            R::WriteMultipleCoils(_, _) => Self::WriteMultipleCoils,
            R::WriteMultipleRegisters(_, _) => Self::WriteMultipleRegisters,
        }
    }
}

/// A server (slave) exception.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exception {
    IllegalFunction,
    IllegalDataAddress,
    IllegalDataValue,
    ServerDeviceFailure,
    Acknowledge,
    ServerDeviceBusy,
    MemoryParityError,
    GatewayPathUnavailable,
    GatewayTargetDevice,
    /// Vendor specific exception code.
    Custom(u8),
}

impl Exception {
    /// Create a new [`Exception`] from the exception code byte.
    #[must_use]
    pub const fn new(code: u8) -> Self {
        match code {
            0x01 => Self::IllegalFunction,
            0x02 => Self::IllegalDataAddress,
            0x03 => Self::IllegalDataValue,
            0x04 => Self::ServerDeviceFailure,
            0x05 => Self::Acknowledge,
            0x06 => Self::ServerDeviceBusy,
            0x08 => Self::MemoryParityError,
            0x0A => Self::GatewayPathUnavailable,
            0x0B => Self::GatewayTargetDevice,
            code => Self::Custom(code),
        }
    }

    /// The exception code byte.
    #[must_use]
    pub const fn value(self) -> u8 {
        match self {
            Self::IllegalFunction => 0x01,
            Self::IllegalDataAddress => 0x02,
            Self::IllegalDataValue => 0x03,
            Self::ServerDeviceFailure => 0x04,
            Self::Acknowledge => 0x05,
            Self::ServerDeviceBusy => 0x06,
            Self::MemoryParityError => 0x08,
            Self::GatewayPathUnavailable => 0x0A,
            Self::GatewayTargetDevice => 0x0B,
            Self::Custom(code) => code,
        }
    }

    const fn get_name(self) -> &'static str {
        match self {
            Self::IllegalFunction => "Illegal function",
            Self::IllegalDataAddress => "Illegal data address",
            Self::IllegalDataValue => "Illegal data value",
            Self::ServerDeviceFailure => "Server device failure",
            Self::Acknowledge => "Acknowledge",
            Self::ServerDeviceBusy => "Server device busy",
            Self::MemoryParityError => "Memory parity error",
            Self::GatewayPathUnavailable => "Gateway path unavailable",
            Self::GatewayTargetDevice => "Gateway target device failed to respond",
            Self::Custom(_) => "Custom exception",
        }
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Custom(code) => write!(f, "{} (0x{code:0>2X})", self.get_name()),
            _ => write!(f, "{}", self.get_name()),
        }
    }
}

#[cfg(all(feature = "defmt", target_os = "none"))]
impl defmt::Format for Exception {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}", self.get_name())
    }
}

impl Request<'_> {
    /// Number of bytes required for a serialized PDU frame.
    #[must_use]
    pub const fn pdu_len(&self) -> usize {
        match *self {
            Self::ReadCoils(_, _)
            | Self::ReadDiscreteInputs(_, _)
            | Self::ReadInputRegisters(_, _)
            | Self::ReadHoldingRegisters(_, _)
            | Self::WriteSingleRegister(_, _)
            | Self::WriteSingleCoil(_, _) => 5,
            Self::WriteMultipleCoils(_, coils) => 6 + coils.packed_len(),
            Self::WriteMultipleRegisters(_, words) => 6 + words.len() * 2,
        }
    }
}

impl Response<'_> {
    /// Check whether a write response echoes the fields of `request`.
    ///
    /// Read responses never acknowledge anything and return `false`.
    #[must_use]
    pub fn acknowledges(&self, request: &Request<'_>) -> bool {
        use Request as Req;
        use Response as Rsp;

        match (*self, *request) {
            (Rsp::WriteSingleCoil(addr, value), Req::WriteSingleCoil(req_addr, req_value))
            | (
                Rsp::WriteSingleRegister(addr, value),
                Req::WriteSingleRegister(req_addr, req_value),
            ) => addr == req_addr && value == req_value,
            (Rsp::WriteMultipleCoils(addr, quantity), Req::WriteMultipleCoils(req_addr, coils)) => {
                addr == req_addr && usize::from(quantity) == coils.len()
            }
            (
                Rsp::WriteMultipleRegisters(addr, quantity),
                Req::WriteMultipleRegisters(req_addr, words),
            ) => addr == req_addr && usize::from(quantity) == words.len(),
            _ => false,
        }
    }
}
