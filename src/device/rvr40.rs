// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Renogy Rover 20/30/40 A MPPT solar charge controller.

use super::{REG_START, Temperatures, flags};
use crate::{
    error::Error,
    frame::{SlaveId, Word},
    master::Master,
    transport::{Clock, DirectionControl, SerialPort},
};

pub const REG_AUX_SOC: usize = 0;
pub const REG_AUX_V: usize = 1;
pub const REG_CHG_A: usize = 2;
pub const REG_TEMPERATURE: usize = 3;
pub const REG_LOAD_V: usize = 4;
pub const REG_LOAD_A: usize = 5;
pub const REG_LOAD_W: usize = 6;
pub const REG_SOLAR_V: usize = 7;
pub const REG_SOLAR_A: usize = 8;
pub const REG_SOLAR_W: usize = 9;
pub const REG_DAY_MIN_V: usize = 11;
pub const REG_DAY_AUX_MAX_V: usize = 12;
pub const REG_DAY_CHG_MAX_A: usize = 13;
pub const REG_DAY_DCHG_MAX_A: usize = 14;
pub const REG_DAY_CHG_MAX_W: usize = 15;
pub const REG_DAY_DCHG_MAX_W: usize = 16;
pub const REG_DAY_CHG_AMPHRS: usize = 17;
pub const REG_DAY_DCHG_AMPHRS: usize = 18;
pub const REG_DAY_CHG_KWH: usize = 19;
pub const REG_DAY_DCHG_KWH: usize = 20;
pub const REG_DAY_COUNT: usize = 21;
pub const REG_OVER_DCHG_COUNT: usize = 22;
pub const REG_FULL_CHG_COUNT: usize = 23;
pub const REG_TOTAL_CHG_AMPHRS: usize = 24;
pub const REG_TOTAL_DCHG_AMPHRS: usize = 25;
pub const REG_CUMUL_CHG_KWH: usize = 26;
pub const REG_CUMUL_DCHG_KWH: usize = 27;
pub const REG_CHARGE_STATE: usize = 28;
pub const REG_ERR_1: usize = 29;
pub const REG_ERR_2: usize = 30;

/// Number of registers in the live data block.
pub const REG_COUNT: usize = 31;

flags! {
    /// Charging stage. No bit set means charging is deactivated.
    pub struct ChargeState {
        const ACTIVE = 1 << 1;
        const MPPT = 1 << 2;
        const EQUALIZE = 1 << 3;
        const BOOST = 1 << 4;
        const FLOAT = 1 << 5;
        const LIMITED = 1 << 6;
    }
}

flags! {
    /// Faults reported in the second fault register.
    pub struct Faults {
        const AUX_DISCHARGED = 1 << 0;
        const AUX_OVER_VOLT = 1 << 1;
        const AUX_UNDER_VOLT = 1 << 2;
        const LOAD_SHORT = 1 << 3;
        const LOAD_OVER_AMP = 1 << 4;
        const CTRL_OVERHEAT = 1 << 5;
        const AUX_OVERHEAT = 1 << 6;
        const IN_OVER_AMP = 1 << 7;
        const IN_SHORT = 1 << 8;
        const IN_OVER_VOLT = 1 << 9;
        const COUNTER_CURRENT = 1 << 10;
        const WP_OVER_VOLT = 1 << 11;
        const REVERSE_POLARITY = 1 << 12;
    }
}

/// Live data of one Rover controller.
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

    /// Battery state of charge in percent.
    #[must_use]
    pub const fn aux_soc(&self) -> Word {
        self.registers[REG_AUX_SOC]
    }

    /// Battery voltage in 0.1 V.
    #[must_use]
    pub const fn aux_decivolts(&self) -> Word {
        self.registers[REG_AUX_V]
    }

    /// Charge current in 0.01 A.
    #[must_use]
    pub const fn charge_centiamps(&self) -> Word {
        self.registers[REG_CHG_A]
    }

    #[must_use]
    pub const fn temperatures(&self) -> Temperatures {
        Temperatures::from_word(self.registers[REG_TEMPERATURE])
    }

    /// Load voltage in 0.1 V.
    #[must_use]
    pub const fn load_decivolts(&self) -> Word {
        self.registers[REG_LOAD_V]
    }

    /// Load current in 0.01 A.
    #[must_use]
    pub const fn load_centiamps(&self) -> Word {
        self.registers[REG_LOAD_A]
    }

    #[must_use]
    pub const fn load_watts(&self) -> Word {
        self.registers[REG_LOAD_W]
    }

    /// Solar panel voltage in 0.1 V.
    #[must_use]
    pub const fn solar_decivolts(&self) -> Word {
        self.registers[REG_SOLAR_V]
    }

    /// Solar panel current in 0.01 A.
    #[must_use]
    pub const fn solar_centiamps(&self) -> Word {
        self.registers[REG_SOLAR_A]
    }

    #[must_use]
    pub const fn solar_watts(&self) -> Word {
        self.registers[REG_SOLAR_W]
    }

    /// Lowest battery voltage of the day in 0.1 V.
    #[must_use]
    pub const fn day_min_aux_decivolts(&self) -> Word {
        self.registers[REG_DAY_MIN_V]
    }

    /// Highest battery voltage of the day in 0.1 V.
    #[must_use]
    pub const fn day_max_aux_decivolts(&self) -> Word {
        self.registers[REG_DAY_AUX_MAX_V]
    }

    /// Highest charge and discharge current of the day in 0.01 A.
    #[must_use]
    pub const fn day_max_centiamps(&self) -> (Word, Word) {
        (
            self.registers[REG_DAY_CHG_MAX_A],
            self.registers[REG_DAY_DCHG_MAX_A],
        )
    }

    /// Highest charge and discharge power of the day in W.
    #[must_use]
    pub const fn day_max_watts(&self) -> (Word, Word) {
        (
            self.registers[REG_DAY_CHG_MAX_W],
            self.registers[REG_DAY_DCHG_MAX_W],
        )
    }

    /// Charged and discharged amp hours of the day.
    #[must_use]
    pub const fn day_amp_hours(&self) -> (Word, Word) {
        (
            self.registers[REG_DAY_CHG_AMPHRS],
            self.registers[REG_DAY_DCHG_AMPHRS],
        )
    }

    /// Generated and consumed energy of the day in 0.1 Wh.
    #[must_use]
    pub const fn day_energy(&self) -> (Word, Word) {
        (
            self.registers[REG_DAY_CHG_KWH],
            self.registers[REG_DAY_DCHG_KWH],
        )
    }

    /// Number of days the controller has been running.
    #[must_use]
    pub const fn day_count(&self) -> Word {
        self.registers[REG_DAY_COUNT]
    }

    #[must_use]
    pub const fn over_discharge_count(&self) -> Word {
        self.registers[REG_OVER_DCHG_COUNT]
    }

    #[must_use]
    pub const fn full_charge_count(&self) -> Word {
        self.registers[REG_FULL_CHG_COUNT]
    }

    /// Total charged and discharged amp hours.
    #[must_use]
    pub const fn total_amp_hours(&self) -> (Word, Word) {
        (
            self.registers[REG_TOTAL_CHG_AMPHRS],
            self.registers[REG_TOTAL_DCHG_AMPHRS],
        )
    }

    /// Cumulative generated and consumed energy in 0.1 Wh (kWh / 10000).
    #[must_use]
    pub const fn cumulative_energy(&self) -> (Word, Word) {
        (
            self.registers[REG_CUMUL_CHG_KWH],
            self.registers[REG_CUMUL_DCHG_KWH],
        )
    }

    /// Charging stage (low byte of the register).
    #[must_use]
    pub const fn charge_state(&self) -> ChargeState {
        ChargeState::from_bits(self.registers[REG_CHARGE_STATE] & 0x00FF)
    }

    /// Raw value of the first fault register.
    #[must_use]
    pub const fn err_1(&self) -> Word {
        self.registers[REG_ERR_1]
    }

    #[must_use]
    pub const fn faults(&self) -> Faults {
        Faults::from_bits(self.registers[REG_ERR_2])
    }
}
