// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::error::Error;
use core::fmt;

mod coils;
mod data;
pub(crate) mod rtu;

pub use self::{coils::*, data::*};

/// A Modbus function code.
///
/// It is represented by an unsigned 8 bit integer. Only the function codes
/// the master engine can drive have a named variant.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionCode {
    /// Modbus Function Code: `01` (`0x01`).
    ReadCoils,

    /// Modbus Function Code: `02` (`0x02`), also known as "read input status".
    ReadDiscreteInputs,

    /// Modbus Function Code: `03` (`0x03`).
    ReadHoldingRegisters,

    /// Modbus Function Code: `04` (`0x04`).
    ReadInputRegisters,

    /// Modbus Function Code: `15` (`0x0F`).
    WriteMultipleCoils,

    /// Modbus Function Code: `16` (`0x10`).
    WriteMultipleRegisters,

    /// Any other function code.
    Custom(u8),
}

impl FunctionCode {
    /// Create a new [`FunctionCode`] with `value`.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        match value {
            0x01 => Self::ReadCoils,
            0x02 => Self::ReadDiscreteInputs,
            0x03 => Self::ReadHoldingRegisters,
            0x04 => Self::ReadInputRegisters,
            0x0F => Self::WriteMultipleCoils,
            0x10 => Self::WriteMultipleRegisters,
            code => Self::Custom(code),
        }
    }

    /// Get the [`u8`] value of the current [`FunctionCode`].
    #[must_use]
    pub const fn value(self) -> u8 {
        match self {
            Self::ReadCoils => 0x01,
            Self::ReadDiscreteInputs => 0x02,
            Self::ReadHoldingRegisters => 0x03,
            Self::ReadInputRegisters => 0x04,
            Self::WriteMultipleCoils => 0x0F,
            Self::WriteMultipleRegisters => 0x10,
            Self::Custom(code) => code,
        }
    }

    /// Number of register words needed to hold `quantity` items of this
    /// function.
    ///
    /// Coils are grouped 16 per word, registers take one word each.
    #[must_use = "the number of words is the only result"]
    pub const fn words_needed(self, quantity: Quantity) -> Result<usize, Error> {
        match self {
            Self::ReadCoils | Self::ReadDiscreteInputs | Self::WriteMultipleCoils => {
                Ok(coil_words(quantity))
            }
            Self::ReadHoldingRegisters
            | Self::ReadInputRegisters
            | Self::WriteMultipleRegisters => Ok(quantity as usize),
            Self::Custom(code) => Err(Error::FnCode(code)),
        }
    }
}

impl fmt::Display for FunctionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value().fmt(f)
    }
}

/// Bit that a slave sets in the echoed function code of an exception
/// response.
pub const EXCEPTION_FLAG: u8 = 0x80;

/// Slave address used for broadcast requests.
pub const BROADCAST: SlaveId = 0;

/// Highest assignable slave address.
pub const MAX_SLAVE_ID: SlaveId = 247;

/// Slave ID
pub type SlaveId = u8;

/// A Modbus address is represented by 16 bit (from `0` to `65535`).
pub type Address = u16;

/// Modbus uses 16 bit for its data items (big-endian representation).
pub type Word = u16;

/// Number of items to process (`0` - `65535`).
pub type Quantity = u16;

/// A server (slave) exception.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exception {
    IllegalFunction = 0x01,
    IllegalDataAddress = 0x02,
    IllegalDataValue = 0x03,
    ServerDeviceFailure = 0x04,
    Acknowledge = 0x05,
    ServerDeviceBusy = 0x06,
    MemoryParityError = 0x08,
    GatewayPathUnavailable = 0x0A,
    GatewayTargetDevice = 0x0B,
}

impl Exception {
    const fn get_name(self) -> &'static str {
        match self {
            Self::IllegalFunction => "Illegal function",
            Self::IllegalDataAddress => "Illegal data address",
            Self::IllegalDataValue => "Illegal data value",
            Self::ServerDeviceFailure => "Server device failure",
            Self::Acknowledge => "Acknowledge",
            Self::ServerDeviceBusy => "Server device busy",
            Self::MemoryParityError => "Memory parity error",
            Self::GatewayPathUnavailable => "Gateway path unavailable",
            Self::GatewayTargetDevice => "Gateway target device failed to respond",
        }
    }
}

impl TryFrom<u8> for Exception {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self, Error> {
        use Exception::*;
        let ex = match code {
            0x01 => IllegalFunction,
            0x02 => IllegalDataAddress,
            0x03 => IllegalDataValue,
            0x04 => ServerDeviceFailure,
            0x05 => Acknowledge,
            0x06 => ServerDeviceBusy,
            0x08 => MemoryParityError,
            0x0A => GatewayPathUnavailable,
            0x0B => GatewayTargetDevice,
            _ => {
                return Err(Error::FnCode(code));
            }
        };
        Ok(ex)
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.get_name())
    }
}

#[cfg(all(feature = "defmt", target_os = "none"))]
impl defmt::Format for Exception {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}", self.get_name())
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn function_code_into_u8() {
        let x: u8 = FunctionCode::WriteMultipleCoils.value();
        assert_eq!(x, 15);
        let x: u8 = FunctionCode::Custom(0xBB).value();
        assert_eq!(x, 0xBB);
    }

    #[test]
    fn function_code_from_u8() {
        assert_eq!(FunctionCode::new(15), FunctionCode::WriteMultipleCoils);
        assert_eq!(FunctionCode::new(16), FunctionCode::WriteMultipleRegisters);
        assert_eq!(FunctionCode::new(2), FunctionCode::ReadDiscreteInputs);
        // write single register is not driven by the master engine
        assert_eq!(FunctionCode::new(6), FunctionCode::Custom(6));
        assert_eq!(FunctionCode::new(0xBB), FunctionCode::Custom(0xBB));
    }

    #[test]
    fn words_needed_per_function() {
        use FunctionCode::*;
        assert_eq!(ReadCoils.words_needed(1), Ok(1));
        assert_eq!(ReadCoils.words_needed(16), Ok(1));
        assert_eq!(ReadDiscreteInputs.words_needed(17), Ok(2));
        assert_eq!(WriteMultipleCoils.words_needed(33), Ok(3));
        assert_eq!(ReadHoldingRegisters.words_needed(7), Ok(7));
        assert_eq!(ReadInputRegisters.words_needed(1), Ok(1));
        assert_eq!(WriteMultipleRegisters.words_needed(2), Ok(2));
        assert_eq!(Custom(0x06).words_needed(1), Err(Error::FnCode(0x06)));
    }

    #[test]
    fn exception_from_code() {
        assert_eq!(Exception::try_from(0x02), Ok(Exception::IllegalDataAddress));
        assert_eq!(Exception::try_from(0x0B), Ok(Exception::GatewayTargetDevice));
        assert!(Exception::try_from(0x07).is_err());
        assert!(Exception::try_from(0x00).is_err());
    }
}
