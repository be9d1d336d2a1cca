// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common helpers

use crate::{
    error::{Error, Parameter},
    frame::{COIL_OFF, COIL_ON, Coil},
};

/// Turn a bool into a u16 coil value
#[must_use]
pub const fn bool_to_u16_coil(state: bool) -> u16 {
    if state { COIL_ON } else { COIL_OFF }
}

/// Turn a u16 coil value into a boolean value.
pub const fn u16_coil_to_bool(coil: u16) -> Result<bool, Error> {
    match coil {
        COIL_ON => Ok(true),
        COIL_OFF => Ok(false),
        _ => Err(Error::InvalidParameter(Parameter::CoilValue(coil))),
    }
}

/// Calculate the number of bytes required for a given number of coils.
pub(crate) const fn packed_coils_len(bitcount: usize) -> usize {
    bitcount.div_ceil(8)
}

/// Pack coils into a byte array, 8 coils per byte starting at the
/// least significant bit. Unused bits of the last byte are zero.
///
/// It returns the number of bytes used to pack the coils.
pub(crate) fn pack_coils(coils: &[Coil], bytes: &mut [u8]) -> Result<usize, Error> {
    let packed_size = packed_coils_len(coils.len());
    if bytes.len() < packed_size {
        return Err(Error::BufferSize);
    }
    bytes[..packed_size].fill(0);
    coils.iter().enumerate().for_each(|(i, b)| {
        let v = if *b { 0b1 } else { 0b0 };
        bytes[i / 8] |= v << (i % 8);
    });
    Ok(packed_size)
}

/// Unpack `coils.len()` coils from a byte array.
pub(crate) fn unpack_coils(bytes: &[u8], coils: &mut [Coil]) -> Result<(), Error> {
    if bytes.len() < packed_coils_len(coils.len()) {
        return Err(Error::BufferSize);
    }
    coils.iter_mut().enumerate().for_each(|(i, c)| {
        *c = (bytes[i / 8] >> (i % 8)) & 0b1 > 0;
    });
    Ok(())
}
