// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::error::{Error, Parameter};

/// Number of data bits per character.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataBits {
    Seven,
    Eight,
}

/// Parity checking mode.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits per character.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBits {
    One,
    Two,
}

/// Serial line settings and receive timing.
///
/// The default matches the RS-485 field devices this crate was written
/// for: 9600 baud, 8 data bits, no parity, 2 stop bits.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
    /// Delay between two polls of the receive buffer.
    pub poll_interval_ms: u32,
    /// How long to wait for the first byte of a response.
    pub response_timeout_ms: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            baud_rate: 9600,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::Two,
            poll_interval_ms: 20,
            response_timeout_ms: 1000,
        }
    }
}

impl Config {
    /// Reject settings the transport cannot work with.
    pub const fn validate(&self) -> Result<(), Error> {
        if self.baud_rate == 0 {
            return Err(Error::InvalidParameter(Parameter::BaudRate(self.baud_rate)));
        }
        Ok(())
    }

    /// Bits on the wire per character, including start, parity and stop bits.
    #[must_use]
    pub const fn char_bits(&self) -> u32 {
        let data = match self.data_bits {
            DataBits::Seven => 7,
            DataBits::Eight => 8,
        };
        let parity = match self.parity {
            Parity::None => 0,
            Parity::Even | Parity::Odd => 1,
        };
        let stop = match self.stop_bits {
            StopBits::One => 1,
            StopBits::Two => 2,
        };
        1 + data + parity + stop
    }

    /// Time to transmit one character in whole milliseconds (at least 1).
    #[must_use]
    pub const fn char_time_ms(&self) -> u32 {
        let ms = (1000 * self.char_bits()).div_ceil(self.baud_rate);
        if ms == 0 { 1 } else { ms }
    }

    /// Silence after which a partially received frame is considered finished.
    ///
    /// This is 3.5 character times, but never shorter than one character
    /// time or one poll interval.
    #[must_use]
    pub const fn idle_timeout_ms(&self) -> u32 {
        let t3_5 = (7000 * self.char_bits() as u64).div_ceil(2 * self.baud_rate as u64) as u32;
        let char_time = self.char_time_ms();
        let floor = if char_time > self.poll_interval_ms {
            char_time
        } else {
            self.poll_interval_ms
        };
        if t3_5 > floor { t3_5 } else { floor }
    }
}
