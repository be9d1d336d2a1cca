// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::*;
use crate::{error::Error, util::*};

/// Packed coils
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coils<'c> {
    pub(crate) data: &'c [u8],
    pub(crate) quantity: usize,
}

impl<'c> Coils<'c> {
    /// Pack coils defined by an bool slice into a byte buffer.
    pub fn from_bools(bools: &[bool], target: &'c mut [u8]) -> Result<Self, Error> {
        let packed_len = pack_coils(bools, target)?;
        Ok(Coils {
            data: &target[..packed_len],
            quantity: bools.len(),
        })
    }
    /// Quantity of coils
    #[must_use]
    pub const fn len(&self) -> usize {
        self.quantity
    }
    ///  Returns `true` if the container has no items.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.quantity == 0
    }
    /// Number of bytes required to pack the coils.
    #[must_use]
    pub const fn packed_len(&self) -> usize {
        packed_coils_len(self.quantity)
    }
    /// Get a specific coil.
    #[must_use]
    pub fn get(&self, idx: usize) -> Option<Coil> {
        if idx >= self.quantity {
            return None;
        }
        let byte = self.data.get(idx / 8)?;
        Some((*byte >> (idx % 8)) & 0b1 > 0)
    }
    /// Unpack the first `target.len()` coils.
    pub fn copy_to(&self, target: &mut [Coil]) -> Result<(), Error> {
        if target.len() > self.quantity {
            return Err(Error::BufferSize);
        }
        unpack_coils(self.data, target)
    }
}

/// Coils iterator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoilsIter<'c> {
    cnt: usize,
    coils: Coils<'c>,
}

impl Iterator for CoilsIter<'_> {
    type Item = Coil;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.coils.get(self.cnt);
        self.cnt += 1;
        result
    }
}

impl<'c> IntoIterator for Coils<'c> {
    type Item = Coil;
    type IntoIter = CoilsIter<'c>;

    fn into_iter(self) -> Self::IntoIter {
        CoilsIter {
            cnt: 0,
            coils: self,
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn from_bool_slice() {
        let bools: &[bool] = &[true, false, true, true];
        let buff: &mut [u8] = &mut [0, 0];
        let coils = Coils::from_bools(bools, buff).unwrap();
        assert_eq!(coils.len(), 4);
        assert_eq!(coils.packed_len(), 1);
        assert_eq!(coils.data, &[0b1101]);
        let mut iter = coils.into_iter();
        assert_eq!(iter.next(), Some(true));
        assert_eq!(iter.next(), Some(false));
        assert_eq!(iter.next(), Some(true));
        assert_eq!(iter.next(), Some(true));
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn coils_empty() {
        let coils = Coils {
            data: &[0, 1, 2],
            quantity: 0,
        };
        assert!(coils.is_empty());
        assert_eq!(coils.packed_len(), 0);
    }

    #[test]
    fn coils_get() {
        let coils = Coils {
            data: &[0b01],
            quantity: 2,
        };
        assert_eq!(coils.get(0), Some(true));
        assert_eq!(coils.get(1), Some(false));
        assert_eq!(coils.get(2), None);

        let coils = Coils {
            data: &[0xff, 0b11],
            quantity: 10,
        };
        for i in 0..10 {
            assert_eq!(coils.get(i), Some(true));
        }
        assert_eq!(coils.get(11), None);
    }

    #[test]
    fn coils_get_beyond_data() {
        let coils = Coils {
            data: &[0xff],
            quantity: 16,
        };
        assert_eq!(coils.get(7), Some(true));
        assert_eq!(coils.get(8), None);
    }

    #[test]
    fn copy_coils_into_bool_slice() {
        let coils = Coils {
            data: &[0b1100_1101, 0b1],
            quantity: 16,
        };
        let target = &mut [false; 10];
        coils.copy_to(target).unwrap();
        assert_eq!(
            target,
            &[true, false, true, true, false, false, true, true, true, false]
        );
        assert_eq!(
            coils.copy_to(&mut [false; 17]).err().unwrap(),
            Error::BufferSize
        );
    }

    #[test]
    fn coils_into_iter() {
        let coils = Coils {
            data: &[0b0101_0011],
            quantity: 3,
        };
        let mut coils_iter = coils.into_iter();
        assert_eq!(coils_iter.next(), Some(true));
        assert_eq!(coils_iter.next(), Some(true));
        assert_eq!(coils_iter.next(), Some(false));
        assert_eq!(coils_iter.next(), None);
    }
}
