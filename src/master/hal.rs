// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::config::SerialConfig;
use core::fmt::Debug;
use core::time::Duration;

/// Byte oriented access to the serial line the master drives.
///
/// Reads and writes follow the `nb` convention: `WouldBlock` means "try
/// again later", it is never treated as an error by the engine.
pub trait Serial {
    /// Associated error type for communication errors.
    type Error: Debug;

    /// Apply baud rate and character format.
    fn configure(&mut self, config: &SerialConfig) -> Result<(), Self::Error>;

    /// Attempts to read a single received byte.
    ///
    /// Returns `Err(nb::Error::WouldBlock)` if no byte is available.
    fn read_byte(&mut self) -> nb::Result<u8, Self::Error>;

    /// Attempts to write a single byte.
    ///
    /// Returns `Err(nb::Error::WouldBlock)` if the transmit buffer is full.
    fn write_byte(&mut self, byte: u8) -> nb::Result<(), Self::Error>;

    /// Attempts to flush the transmit buffer.
    ///
    /// Returns `Err(nb::Error::WouldBlock)` while transmission is in progress.
    fn flush(&mut self) -> nb::Result<(), Self::Error>;
}

/// Monotonic time source.
pub trait Clock {
    /// Time elapsed since an arbitrary, fixed epoch.
    ///
    /// Must never decrease.
    fn now(&self) -> Duration;
}
