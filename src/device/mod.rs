// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Register maps of supported field devices.
//!
//! Both devices expose their live data as one block of holding registers
//! starting at [`REG_START`]. A `Snapshot` is decoded from a single read
//! of that block; its values stay in device units.

pub mod dcc50s;
pub mod rvr40;

use crate::frame::{Address, Word};

/// First register of the live data block.
pub const REG_START: Address = 0x100;

/// Define a bit flag word with named flags.
macro_rules! flags {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $(
                $(#[$flag_meta:meta])*
                const $flag:ident = $bit:expr;
            )*
        }
    ) => {
        $(#[$meta])*
        #[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
        #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
        pub struct $name(Word);

        impl $name {
            $(
                $(#[$flag_meta])*
                pub const $flag: Self = Self($bit);
            )*

            #[must_use]
            pub const fn from_bits(bits: Word) -> Self {
                Self(bits)
            }

            #[must_use]
            pub const fn bits(self) -> Word {
                self.0
            }

            #[must_use]
            pub const fn is_empty(self) -> bool {
                self.0 == 0
            }

            /// Whether all bits of `other` are set.
            #[must_use]
            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }
        }
    };
}

pub(crate) use flags;

/// Controller and battery temperature in °C.
///
/// Both share one register: the controller in the high byte and the
/// battery sensor in the low byte. Each byte carries the sign in bit 7.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Temperatures {
    pub controller: i8,
    pub battery: i8,
}

impl Temperatures {
    #[must_use]
    pub const fn from_word(word: Word) -> Self {
        let [high, low] = word.to_be_bytes();
        Self {
            controller: sign_magnitude(high),
            battery: sign_magnitude(low),
        }
    }
}

const fn sign_magnitude(byte: u8) -> i8 {
    let magnitude = (byte & 0x7F) as i8;
    if byte & 0x80 == 0 {
        magnitude
    } else {
        -magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperatures() {
        assert_eq!(
            Temperatures::from_word(0x150F),
            Temperatures {
                controller: 21,
                battery: 15
            }
        );
        assert_eq!(
            Temperatures::from_word(0x1985),
            Temperatures {
                controller: 25,
                battery: -5
            }
        );
    }
}
