// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::*;
use crate::error::*;
use byteorder::{BigEndian, ByteOrder};

/// A 16 bit register value as seen by the caller.
///
/// The wire always carries the raw big-endian word; implementations only
/// decide how that word is interpreted. No scaling is applied.
pub trait Register: Copy {
    /// Interpret a raw register word.
    fn from_word(word: Word) -> Self;
    /// The raw register word.
    fn to_word(self) -> Word;
}

impl Register for u16 {
    fn from_word(word: Word) -> Self {
        word
    }
    fn to_word(self) -> Word {
        self
    }
}

impl Register for i16 {
    fn from_word(word: Word) -> Self {
        word as i16
    }
    fn to_word(self) -> Word {
        self as u16
    }
}

/// Modbus data (u16 values)
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Data<'d> {
    pub(crate) data: &'d [u8],
    pub(crate) quantity: usize,
}

impl<'d> Data<'d> {
    /// Pack words (u16 values) into a byte buffer.
    pub fn from_words(words: &[u16], target: &'d mut [u8]) -> Result<Self, Error> {
        Self::from_registers(words, target)
    }
    /// Pack register values into a byte buffer.
    pub fn from_registers<R: Register>(values: &[R], target: &'d mut [u8]) -> Result<Self, Error> {
        let len = values.len() * 2;
        if len > target.len() {
            return Err(Error::BufferSize);
        }
        for (i, v) in values.iter().enumerate() {
            BigEndian::write_u16(&mut target[i * 2..], v.to_word());
        }
        Ok(Data {
            data: &target[..len],
            quantity: values.len(),
        })
    }
    pub(crate) fn copy_to(&self, buf: &mut [u8]) {
        let cnt = self.quantity * 2;
        debug_assert!(buf.len() >= cnt);
        buf[..cnt].copy_from_slice(&self.data[..cnt]);
    }
    /// Quantity of words (u16 values)
    #[must_use]
    pub const fn len(&self) -> usize {
        self.quantity
    }
    ///  Returns `true` if the container has no items.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.quantity == 0
    }
    /// Get a specific word.
    #[must_use]
    pub fn get(&self, idx: usize) -> Option<Word> {
        if idx + 1 > self.quantity {
            return None;
        }
        let idx = idx * 2;
        let word = self.data.get(idx..idx + 2)?;
        Some(BigEndian::read_u16(word))
    }
    /// Get a specific word interpreted as `R`.
    #[must_use]
    pub fn get_as<R: Register>(&self, idx: usize) -> Option<R> {
        self.get(idx).map(R::from_word)
    }

    #[must_use]
    pub const fn payload(&self) -> &[u8] {
        self.data
    }
}

/// Data iterator
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataIter<'d> {
    cnt: usize,
    data: Data<'d>,
}

impl Iterator for DataIter<'_> {
    type Item = Word;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.data.get(self.cnt);
        self.cnt += 1;
        result
    }
}

impl<'d> IntoIterator for Data<'d> {
    type Item = Word;
    type IntoIter = DataIter<'d>;

    fn into_iter(self) -> Self::IntoIter {
        DataIter { cnt: 0, data: self }
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn from_word_slice() {
        let words: &[u16] = &[0xABCD, 0xEF00, 0x1234];
        let buff: &mut [u8] = &mut [0; 5];
        assert!(Data::from_words(words, buff).is_err());
        let buff: &mut [u8] = &mut [0; 8];
        let data = Data::from_words(words, buff).unwrap();
        assert_eq!(data.len(), 3);
        assert_eq!(data.payload(), &[0xAB, 0xCD, 0xEF, 0x00, 0x12, 0x34]);
        let mut iter = data.into_iter();
        assert_eq!(iter.next(), Some(0xABCD));
        assert_eq!(iter.next(), Some(0xEF00));
        assert_eq!(iter.next(), Some(0x1234));
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn from_signed_registers() {
        let buff: &mut [u8] = &mut [0; 4];
        let data = Data::from_registers(&[-2_i16, 7], buff).unwrap();
        assert_eq!(data.payload(), &[0xFF, 0xFE, 0x00, 0x07]);
        assert_eq!(data.get(0), Some(0xFFFE));
        assert_eq!(data.get_as::<i16>(0), Some(-2));
        assert_eq!(data.get_as::<i16>(1), Some(7));
    }

    #[test]
    fn register_word_conversion() {
        assert_eq!(i16::from_word(0x8000), i16::MIN);
        assert_eq!(i16::from_word(0x005F), 95);
        assert_eq!((-1_i16).to_word(), 0xFFFF);
        assert_eq!(u16::from_word(0xFFFF), 0xFFFF);
    }

    #[test]
    fn data_empty() {
        let data = Data {
            data: &[0, 1, 2],
            quantity: 0,
        };
        assert!(data.is_empty());
    }

    #[test]
    fn data_get() {
        let data = Data {
            data: &[0xAB, 0xBC, 0x12],
            quantity: 1,
        };
        assert_eq!(data.get(0), Some(0xABBC));
        assert_eq!(data.get(1), None);

        let data = Data {
            data: &[0xFF, 0xAB, 0xCD, 0xEF, 0x33],
            quantity: 2,
        };
        assert_eq!(data.get(0), Some(0xFFAB));
        assert_eq!(data.get(1), Some(0xCDEF));
        assert_eq!(data.get(2), None);
    }

    #[test]
    fn copy_data_to_buffer() {
        let data = Data {
            data: &[0x01, 0x02, 0x03, 0x04],
            quantity: 2,
        };
        let buf = &mut [0; 5];
        data.copy_to(buf);
        assert_eq!(buf, &[0x01, 0x02, 0x03, 0x04, 0x00]);
    }

    #[test]
    fn data_into_iter() {
        let data = Data {
            data: &[0x01, 0x02, 0x03, 0x04, 0xAA, 0xBB],
            quantity: 3,
        };
        let mut data_iter = data.into_iter();
        assert_eq!(data_iter.next(), Some(0x0102));
        assert_eq!(data_iter.next(), Some(0x0304));
        assert_eq!(data_iter.next(), Some(0xAABB));
        assert_eq!(data_iter.next(), None);
    }
}
