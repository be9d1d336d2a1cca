// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Renogy DCC50S DC-DC charger with MPPT solar input.

use super::{REG_START, Temperatures, flags};
use crate::{
    error::Error,
    frame::{SlaveId, Word},
    master::Master,
    transport::{Clock, DirectionControl, SerialPort},
};

pub const REG_AUX_SOC: usize = 0;
pub const REG_AUX_V: usize = 1;
pub const REG_AUX_A: usize = 2;
pub const REG_TEMPERATURE: usize = 3;
pub const REG_ALT_V: usize = 4;
pub const REG_ALT_A: usize = 5;
pub const REG_ALT_W: usize = 6;
pub const REG_SOL_V: usize = 7;
pub const REG_SOL_A: usize = 8;
pub const REG_SOL_W: usize = 9;
pub const REG_DAY_MIN_V: usize = 11;
pub const REG_DAY_MAX_V: usize = 12;
pub const REG_DAY_MAX_A: usize = 13;
pub const REG_DAY_MAX_W: usize = 15;
pub const REG_DAY_TOTAL_AH: usize = 17;
pub const REG_DAY_COUNT: usize = 21;
pub const REG_CHARGE_STATE: usize = 32;
pub const REG_ERR_1: usize = 33;
pub const REG_ERR_2: usize = 34;

/// Number of registers in the live data block.
pub const REG_COUNT: usize = 35;

flags! {
    /// Active charging sources and stages.
    pub struct ChargeState {
        const SOLAR = 1 << 2;
        const EQUALIZE = 1 << 3;
        const BOOST = 1 << 4;
        const FLOAT = 1 << 5;
        const LIMITED = 1 << 6;
        const ALTERNATOR = 1 << 7;
    }
}

flags! {
    /// Faults reported in the first fault register.
    pub struct Faults1 {
        const ALT_OVER_AMP = 1 << 5;
        const ALT_OVER_VOLT = 1 << 8;
        const REVERSE_POLARITY = 1 << 9;
        const OVERCHARGE = 1 << 10;
        const TOO_COLD = 1 << 11;
    }
}

flags! {
    /// Faults reported in the second fault register.
    pub struct Faults2 {
        const AUX_DISCHARGED = 1 << 0;
        const AUX_OVER_VOLT = 1 << 1;
        const AUX_UNDER_VOLT = 1 << 2;
        const CTRL_OVERHEAT = 1 << 5;
        const AUX_OVERHEAT = 1 << 6;
        const SOL_OVER_AMP = 1 << 7;
        const SOL_OVER_VOLT = 1 << 9;
        const SOL_REVERSE_POLARITY = 1 << 12;
    }
}

/// Live data of one DCC50S.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    registers: [Word; REG_COUNT],
}

impl Snapshot {
    /// Read the live data block from `slave`.
    pub fn read<S, D, C>(master: &mut Master<S, D, C>, slave: SlaveId) -> Result<Self, Error>
    where
        S: SerialPort,
        D: DirectionControl,
        C: Clock,
    {
        let registers = master.read_holding_registers::<Word>(slave, REG_START, REG_COUNT as u16)?;
        Self::from_registers(&registers)
    }

    /// Decode the live data block.
    ///
    /// `registers` must hold exactly [`REG_COUNT`] values.
    pub fn from_registers(registers: &[Word]) -> Result<Self, Error> {
        let registers = registers.try_into().map_err(|_| Error::BufferSize)?;
        Ok(Self { registers })
    }

    /// Raw register at `offset` from [`REG_START`].
    #[must_use]
    pub fn register(&self, offset: usize) -> Option<Word> {
        self.registers.get(offset).copied()
    }

    /// Auxiliary battery state of charge in percent.
    #[must_use]
    pub const fn aux_soc(&self) -> Word {
        self.registers[REG_AUX_SOC]
    }

    /// Auxiliary battery voltage in 0.1 V.
    #[must_use]
    pub const fn aux_decivolts(&self) -> Word {
        self.registers[REG_AUX_V]
    }

    /// Auxiliary battery charge current in 0.01 A.
    #[must_use]
    pub const fn aux_centiamps(&self) -> Word {
        self.registers[REG_AUX_A]
    }

    #[must_use]
    pub const fn temperatures(&self) -> Temperatures {
        Temperatures::from_word(self.registers[REG_TEMPERATURE])
    }

    /// Alternator voltage in 0.1 V.
    #[must_use]
    pub const fn alternator_decivolts(&self) -> Word {
        self.registers[REG_ALT_V]
    }

    /// Alternator current in 0.01 A.
    #[must_use]
    pub const fn alternator_centiamps(&self) -> Word {
        self.registers[REG_ALT_A]
    }

    #[must_use]
    pub const fn alternator_watts(&self) -> Word {
        self.registers[REG_ALT_W]
    }

    /// Solar panel voltage in 0.1 V.
    #[must_use]
    pub const fn solar_decivolts(&self) -> Word {
        self.registers[REG_SOL_V]
    }

    /// Solar panel current in 0.01 A.
    #[must_use]
    pub const fn solar_centiamps(&self) -> Word {
        self.registers[REG_SOL_A]
    }

    #[must_use]
    pub const fn solar_watts(&self) -> Word {
        self.registers[REG_SOL_W]
    }

    /// Lowest auxiliary battery voltage of the day in 0.1 V.
    #[must_use]
    pub const fn day_min_aux_decivolts(&self) -> Word {
        self.registers[REG_DAY_MIN_V]
    }

    /// Highest auxiliary battery voltage of the day in 0.1 V.
    #[must_use]
    pub const fn day_max_aux_decivolts(&self) -> Word {
        self.registers[REG_DAY_MAX_V]
    }

    /// Highest charge current of the day in 0.01 A.
    #[must_use]
    pub const fn day_max_centiamps(&self) -> Word {
        self.registers[REG_DAY_MAX_A]
    }

    #[must_use]
    pub const fn day_max_watts(&self) -> Word {
        self.registers[REG_DAY_MAX_W]
    }

    #[must_use]
    pub const fn day_total_amp_hours(&self) -> Word {
        self.registers[REG_DAY_TOTAL_AH]
    }

    /// Number of days the charger has been running.
    #[must_use]
    pub const fn day_count(&self) -> Word {
        self.registers[REG_DAY_COUNT]
    }

    /// Active charge state (low byte of the register).
    #[must_use]
    pub const fn charge_state(&self) -> ChargeState {
        ChargeState::from_bits(self.registers[REG_CHARGE_STATE] & 0x00FF)
    }

    #[must_use]
    pub const fn faults(&self) -> (Faults1, Faults2) {
        (
            Faults1::from_bits(self.registers[REG_ERR_1]),
            Faults2::from_bits(self.registers[REG_ERR_2]),
        )
    }
}
