// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{error::Error, frame::CoilByteCount};
use core::time::Duration;

/// Above this baud rate the character timings are fixed.
const FIXED_TIMING_BAUD_RATE: u32 = 19_200;

// 1.5 and 3.5 characters of 11 bits in microseconds, times the baud rate
const T1_5_BAUD_US: u64 = 16_500_000;
const T3_5_BAUD_US: u64 = 38_500_000;

const T1_5_FIXED: Duration = Duration::from_micros(750);
const T3_5_FIXED: Duration = Duration::from_micros(1750);

/// Parity bit setting.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Line settings handed to [`Serial::configure`](crate::Serial::configure).
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialConfig {
    pub baud_rate: u32,
    pub data_bits: u8,
    pub parity: Parity,
    pub stop_bits: u8,
}

impl SerialConfig {
    /// 8 data bits, even parity and 1 stop bit.
    #[must_use]
    pub const fn rtu(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            data_bits: 8,
            parity: Parity::Even,
            stop_bits: 1,
        }
    }
}

/// Inter-character (T1.5) and inter-frame (T3.5) timeouts of a baud rate.
///
/// The engine does not wait for these; they are derived for reporting and
/// for serial drivers that implement frame gaps themselves.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharTiming {
    pub t1_5: Duration,
    pub t3_5: Duration,
}

impl CharTiming {
    /// Derive the timings from the baud rate.
    ///
    /// Above 19200 baud the fixed values of 750 µs and 1750 µs apply.
    #[must_use]
    pub const fn from_baud_rate(baud_rate: u32) -> Self {
        if baud_rate > FIXED_TIMING_BAUD_RATE || baud_rate == 0 {
            return Self {
                t1_5: T1_5_FIXED,
                t3_5: T3_5_FIXED,
            };
        }
        let baud_rate = baud_rate as u64;
        Self {
            t1_5: Duration::from_micros(T1_5_BAUD_US / baud_rate),
            t3_5: Duration::from_micros(T3_5_BAUD_US / baud_rate),
        }
    }
}

/// Master configuration.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Line speed.
    pub baud_rate: u32,
    /// Time to wait for a complete reply after sending a request.
    pub response_timeout: Duration,
    /// Pause after every transaction before the bus is used again.
    pub turnaround_delay: Duration,
    /// Consecutive failures after which a transaction is deactivated.
    pub max_retries: u8,
    /// Byte count rule of coil requests and replies.
    pub coil_byte_count: CoilByteCount,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            baud_rate: 9600,
            response_timeout: Duration::from_millis(1000),
            turnaround_delay: Duration::from_millis(200),
            max_retries: 10,
            coil_byte_count: CoilByteCount::Standard,
        }
    }
}

impl Config {
    /// Check the values the engine relies on.
    pub const fn validate(&self) -> Result<(), Error> {
        if self.baud_rate == 0 {
            return Err(Error::InvalidConfig("baud rate must not be zero"));
        }
        if self.max_retries == 0 {
            return Err(Error::InvalidConfig("max retries must not be zero"));
        }
        if self.response_timeout.is_zero() {
            return Err(Error::InvalidConfig("response timeout must not be zero"));
        }
        Ok(())
    }

    /// Line settings for the configured baud rate.
    #[must_use]
    pub const fn serial(&self) -> SerialConfig {
        SerialConfig::rtu(self.baud_rate)
    }

    /// Character timings for the configured baud rate.
    #[must_use]
    pub const fn char_timing(&self) -> CharTiming {
        CharTiming::from_baud_rate(self.baud_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(Config::default().validate(), Ok(()));
    }

    #[test]
    fn reject_invalid_config() {
        let config = Config {
            baud_rate: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let config = Config {
            max_retries: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let config = Config {
            response_timeout: Duration::ZERO,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        // no turnaround delay is fine
        let config = Config {
            turnaround_delay: Duration::ZERO,
            ..Default::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rtu_serial_config() {
        let config = Config {
            baud_rate: 19_200,
            ..Default::default()
        };
        assert_eq!(
            config.serial(),
            SerialConfig {
                baud_rate: 19_200,
                data_bits: 8,
                parity: Parity::Even,
                stop_bits: 1,
            }
        );
    }

    #[test]
    fn char_timing_from_baud_rate() {
        let timing = CharTiming::from_baud_rate(9600);
        assert_eq!(timing.t1_5, Duration::from_micros(1718));
        assert_eq!(timing.t3_5, Duration::from_micros(4010));

        let timing = CharTiming::from_baud_rate(19_200);
        assert_eq!(timing.t1_5, Duration::from_micros(859));
        assert_eq!(timing.t3_5, Duration::from_micros(2005));

        let timing = CharTiming::from_baud_rate(115_200);
        assert_eq!(timing.t1_5, Duration::from_micros(750));
        assert_eq!(timing.t3_5, Duration::from_micros(1750));
    }
}
