// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

#![doc = include_str!("../README.md")]
#![no_std]

#[cfg(any(test, feature = "std"))]
extern crate std;

mod codec;
mod error;
mod frame;
mod master;

pub use codec::rtu;
pub use error::*;
pub use frame::*;
pub use master::*;
