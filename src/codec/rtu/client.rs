// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Modbus RTU client (master) specific functions.
use super::*;

/// Encode an RTU request.
///
/// The request is validated before anything is written to `buf`.
pub fn encode_request(adu: RequestAdu<'_>, buf: &mut [u8]) -> Result<usize> {
    let RequestAdu { hdr, pdu } = adu;
    pdu.validate()?;
    if buf.len() < pdu.pdu_len() + 1 + CRC_LEN {
        return Err(Error::BufferSize);
    }
    let len = pdu.encode(&mut buf[1..])?;
    buf[0] = hdr.slave;
    let crc = crc16(&buf[0..=len]);
    LittleEndian::write_u16(&mut buf[len + 1..], crc);
    Ok(len + 1 + CRC_LEN)
}

/// Decode an RTU response to `request`.
pub fn decode_response<'r>(buf: &'r [u8], request: &RequestAdu<'_>) -> Result<ResponseAdu<'r>> {
    let slave = request.hdr.slave;
    let function = FunctionCode::from(request.pdu);
    let payload = validate_response(buf, slave, function)
        .inspect_err(|_err| {
            #[cfg(feature = "log")]
            log::warn!("Rejected response from slave {slave} to function {function}: {_err}");
        })?;
    let pdu = Response::decode(function, payload)?;
    Ok(ResponseAdu {
        hdr: Header { slave },
        pdu,
    })
}
