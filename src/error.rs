// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::frame::{Address, Exception, Quantity, SlaveId};
use core::fmt;

/// modbus-rtu-master Error
///
/// The variants fall into two groups: construction errors returned by
/// [`Config::validate`](crate::Config::validate) and
/// [`Transaction::new`](crate::Transaction::new), and per-attempt failures
/// that the engine records on the transaction.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Invalid buffer size
    BufferSize,
    /// Invalid or unsupported function code
    FnCode(u8),
    /// Slave id outside of `0..=247`
    InvalidSlaveId(u8),
    /// Quantity is zero or does not fit into a single frame
    InvalidQuantity(Quantity),
    /// Rejected configuration value
    InvalidConfig(&'static str),
    /// Invalid CRC
    Crc { expected: u16, actual: u16 },
    /// Byte count field of a reply does not match the request
    ByteCount { expected: usize, actual: u8 },
    /// Length Mismatch
    LengthMismatch(usize, usize),
    /// Echo of a write reply does not match the request
    EchoMismatch { address: Address, quantity: Quantity },
    /// Exception response from the slave
    Exception {
        function: u8,
        code: u8,
    },
    /// Reply came from another slave
    UnexpectedSlaveId { expected: SlaveId, actual: SlaveId },
    /// Fewer bytes than the smallest valid reply arrived in time
    ReceiveTooShort(usize),
    /// More bytes arrived than a frame can hold
    ReceiveOverflow,
    /// Serial port reported an error
    Serial,
    /// Serial port did not accept the request in time
    SendTimeout,
}

impl Error {
    /// Whether this is an exception response reported by the slave.
    #[must_use]
    pub const fn is_exception(&self) -> bool {
        matches!(self, Self::Exception { .. })
    }

    /// The decoded exception of an exception response, if it is a known one.
    #[must_use]
    pub fn exception(&self) -> Option<Exception> {
        match *self {
            Self::Exception { code, .. } => Exception::try_from(code).ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Error::*;

        match self {
            BufferSize => write!(f, "Invalid buffer size"),
            FnCode(fn_code) => write!(f, "Invalid function code: 0x{fn_code:0>2X}"),
            InvalidSlaveId(id) => write!(f, "Invalid slave id: {id}"),
            InvalidQuantity(quantity) => write!(f, "Invalid quantity: {quantity}"),
            InvalidConfig(reason) => write!(f, "Invalid configuration: {reason}"),
            Crc { expected, actual } => write!(
                f,
                "Invalid CRC: expected = 0x{expected:0>4X}, actual = 0x{actual:0>4X}"
            ),
            ByteCount { expected, actual } => write!(
                f,
                "Invalid byte count: expected = {expected}, actual = {actual}"
            ),
            LengthMismatch(length_field, frame_len) => write!(
                f,
                "Length Mismatch: Length Field: {length_field}, Frame Len: {frame_len}"
            ),
            EchoMismatch { address, quantity } => write!(
                f,
                "Echo mismatch: address = 0x{address:0>4X}, quantity = {quantity}"
            ),
            Self::Exception { function, code } => match crate::frame::Exception::try_from(*code) {
                Ok(ex) => write!(f, "Exception response to 0x{function:0>2X}: {ex}"),
                Err(_) => write!(
                    f,
                    "Exception response to 0x{function:0>2X}: code 0x{code:0>2X}"
                ),
            },
            UnexpectedSlaveId { expected, actual } => write!(
                f,
                "Unexpected slave id: expected = {expected}, actual = {actual}"
            ),
            ReceiveTooShort(len) => write!(f, "Reply too short: {len} byte(s)"),
            ReceiveOverflow => write!(f, "Reply overflowed the frame buffer"),
            Serial => write!(f, "Serial port error"),
            SendTimeout => write!(f, "Timed out sending request"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
