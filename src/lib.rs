// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

#![doc = include_str!("../README.md")]
#![cfg_attr(not(any(test, feature = "std")), no_std)]

mod codec;
mod error;
mod frame;
mod util;

pub mod device;
pub mod master;
pub mod transport;

#[cfg(test)]
mod sim;

pub use codec::rtu;
pub use error::*;
pub use frame::*;
pub use master::Master;
pub use util::{bool_to_u16_coil, u16_coil_to_bool};
