// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{error::*, frame::*, util::*};
use byteorder::{BigEndian, ByteOrder};

pub mod rtu;

type Result<T> = core::result::Result<T, Error>;

pub(crate) const fn check_quantity(quantity: usize, max: usize) -> Result<()> {
    if quantity < 1 || quantity > max {
        return Err(Error::InvalidParameter(Parameter::Quantity {
            quantity,
            min: 1,
            max,
        }));
    }
    Ok(())
}

impl Request<'_> {
    /// Check the request parameters against the protocol limits.
    pub fn validate(&self) -> Result<()> {
        use crate::frame::Request::*;

        match *self {
            ReadCoils(_, quantity) | ReadDiscreteInputs(_, quantity) => {
                check_quantity(quantity as usize, MAX_READ_COILS)
            }
            ReadHoldingRegisters(_, quantity) | ReadInputRegisters(_, quantity) => {
                check_quantity(quantity as usize, MAX_READ_REGISTERS)
            }
            WriteSingleCoil(_, value) => u16_coil_to_bool(value).map(|_| ()),
            WriteSingleRegister(_, _) => Ok(()),
            WriteMultipleCoils(_, coils) => {
                check_quantity(coils.len(), MAX_WRITE_COILS)?;
                if coils.data.len() < coils.packed_len() {
                    return Err(Error::BufferSize);
                }
                Ok(())
            }
            WriteMultipleRegisters(_, words) => {
                check_quantity(words.len(), MAX_WRITE_REGISTERS)?;
                if words.data.len() < words.len() * 2 {
                    return Err(Error::BufferSize);
                }
                Ok(())
            }
        }
    }

    /// Encode the request PDU into `buf`.
    ///
    /// The parameters are validated first, so nothing is written for an
    /// invalid request. Returns the number of bytes written.
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize> {
        use crate::frame::Request::*;

        self.validate()?;
        let len = self.pdu_len();
        if buf.len() < len {
            return Err(Error::BufferSize);
        }
        buf[0] = FunctionCode::from(*self).value();
        match *self {
            ReadCoils(address, quantity)
            | ReadDiscreteInputs(address, quantity)
            | ReadHoldingRegisters(address, quantity)
            | ReadInputRegisters(address, quantity) => {
                BigEndian::write_u16(&mut buf[1..], address);
                BigEndian::write_u16(&mut buf[3..], quantity);
            }
            WriteSingleCoil(address, value) | WriteSingleRegister(address, value) => {
                BigEndian::write_u16(&mut buf[1..], address);
                BigEndian::write_u16(&mut buf[3..], value);
            }
            WriteMultipleCoils(address, coils) => {
                let packed_len = coils.packed_len();
                BigEndian::write_u16(&mut buf[1..], address);
                BigEndian::write_u16(&mut buf[3..], coils.len() as u16);
                buf[5] = packed_len as u8;
                buf[6..6 + packed_len].copy_from_slice(&coils.data[..packed_len]);
            }
            WriteMultipleRegisters(address, words) => {
                BigEndian::write_u16(&mut buf[1..], address);
                BigEndian::write_u16(&mut buf[3..], words.len() as u16);
                buf[5] = (words.len() * 2) as u8;
                words.copy_to(&mut buf[6..]);
            }
        }
        Ok(len)
    }
}

impl<'r> TryFrom<&'r [u8]> for Request<'r> {
    type Error = Error;

    fn try_from(bytes: &'r [u8]) -> Result<Self> {
        use crate::frame::Request::*;
        use FunctionCode as f;

        let Some(&fn_code) = bytes.first() else {
            return Err(Error::BufferSize);
        };
        let Some(function) = FunctionCode::new(fn_code) else {
            return Err(Error::FnCode(fn_code));
        };
        if bytes.len() < min_request_pdu_len(function) {
            return Err(Error::BufferSize);
        }

        let address = BigEndian::read_u16(&bytes[1..3]);
        let value = BigEndian::read_u16(&bytes[3..5]);
        let req = match function {
            f::ReadCoils => ReadCoils(address, value),
            f::ReadDiscreteInputs => ReadDiscreteInputs(address, value),
            f::ReadHoldingRegisters => ReadHoldingRegisters(address, value),
            f::ReadInputRegisters => ReadInputRegisters(address, value),
            f::WriteSingleCoil => {
                u16_coil_to_bool(value)?;
                WriteSingleCoil(address, value)
            }
            f::WriteSingleRegister => WriteSingleRegister(address, value),
            f::WriteMultipleCoils => {
                let quantity = value as usize;
                let byte_count = bytes[5] as usize;
                if byte_count != packed_coils_len(quantity) {
                    return Err(Error::UnexpectedLength(byte_count));
                }
                if bytes.len() < 6 + byte_count {
                    return Err(Error::BufferSize);
                }
                let data = &bytes[6..6 + byte_count];
                WriteMultipleCoils(address, Coils { data, quantity })
            }
            f::WriteMultipleRegisters => {
                let quantity = value as usize;
                let byte_count = bytes[5] as usize;
                if byte_count != quantity * 2 {
                    return Err(Error::UnexpectedLength(byte_count));
                }
                if bytes.len() < 6 + byte_count {
                    return Err(Error::BufferSize);
                }
                let data = &bytes[6..6 + byte_count];
                WriteMultipleRegisters(address, Data { data, quantity })
            }
        };
        Ok(req)
    }
}

impl<'r> Response<'r> {
    /// Decode the payload of a validated response.
    ///
    /// `payload` is what remains after the slave address, the function
    /// code, the byte count (for read functions) and the CRC have been
    /// stripped.
    pub fn decode(function: FunctionCode, payload: &'r [u8]) -> Result<Self> {
        use crate::frame::Response::*;
        use FunctionCode as f;

        let rsp = match function {
            f::ReadCoils | f::ReadDiscreteInputs => {
                // The response does not carry the requested quantity,
                // so every bit of the packed bytes is exposed.
                let coils = Coils {
                    data: payload,
                    quantity: payload.len() * 8,
                };
                match function {
                    f::ReadCoils => ReadCoils(coils),
                    _ => ReadDiscreteInputs(coils),
                }
            }
            f::ReadHoldingRegisters | f::ReadInputRegisters => {
                if payload.len() % 2 != 0 {
                    return Err(Error::UnexpectedLength(payload.len()));
                }
                let data = Data {
                    data: payload,
                    quantity: payload.len() / 2,
                };
                match function {
                    f::ReadHoldingRegisters => ReadHoldingRegisters(data),
                    _ => ReadInputRegisters(data),
                }
            }
            f::WriteSingleCoil
            | f::WriteSingleRegister
            | f::WriteMultipleCoils
            | f::WriteMultipleRegisters => {
                if payload.len() != 4 {
                    return Err(Error::UnexpectedLength(payload.len()));
                }
                let address = BigEndian::read_u16(&payload[0..2]);
                let value = BigEndian::read_u16(&payload[2..4]);
                match function {
                    f::WriteSingleCoil => WriteSingleCoil(address, value),
                    f::WriteSingleRegister => WriteSingleRegister(address, value),
                    f::WriteMultipleCoils => WriteMultipleCoils(address, value),
                    _ => WriteMultipleRegisters(address, value),
                }
            }
        };
        Ok(rsp)
    }
}

const fn min_request_pdu_len(fn_code: FunctionCode) -> usize {
    use FunctionCode::*;
    match fn_code {
        ReadCoils | ReadDiscreteInputs | ReadInputRegisters | WriteSingleCoil
        | ReadHoldingRegisters | WriteSingleRegister => 5,
        WriteMultipleCoils | WriteMultipleRegisters => 6,
    }
}
