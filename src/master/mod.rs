// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Blocking RTU master driving one transaction at a time.

mod config;
mod hal;
mod receive;
mod transaction;

pub use self::{config::*, hal::*, transaction::*};

use self::receive::{FrameBuffer, receive};
use crate::{
    codec::rtu::client::{decode_response, encode_request},
    error::Error,
};
use core::{fmt::Debug, time::Duration};

/// Modbus RTU master on a serial line.
///
/// Each call of [`Master::run`] performs exactly one request/reply exchange
/// for a single [`Transaction`] and updates its counters. Keeping the list
/// of transactions and deciding what to run next is up to the caller.
#[derive(Debug)]
pub struct Master<S, C> {
    serial: S,
    clock: C,
    config: Config,
    char_timing: CharTiming,
    frame: FrameBuffer,
    dispatched: u32,
}

impl<S, C> Master<S, C>
where
    S: Serial,
    C: Clock,
{
    /// Validate `config` and configure the serial line accordingly.
    pub fn new(mut serial: S, clock: C, config: Config) -> Result<Self, Error> {
        config.validate()?;
        let serial_config = config.serial();
        serial.configure(&serial_config).map_err(|_err| {
            #[cfg(feature = "log")]
            log::error!("Failed to configure serial port: {_err:?}");
            Error::Serial
        })?;
        let char_timing = config.char_timing();
        #[cfg(feature = "log")]
        log::info!(
            "RTU master at {} baud: T1.5 = {} µs, T3.5 = {} µs",
            serial_config.baud_rate,
            char_timing.t1_5.as_micros(),
            char_timing.t3_5.as_micros()
        );
        Ok(Self {
            serial,
            clock,
            config,
            char_timing,
            frame: FrameBuffer::new(),
            dispatched: 0,
        })
    }

    /// Run a single attempt of `tx`, then wait for the turnaround delay.
    ///
    /// The outcome is recorded in the transaction: its counters,
    /// [`Transaction::last_error`] and, once `max_retries` consecutive
    /// attempts failed, [`Transaction::connection_active`].
    pub fn run(&mut self, tx: &mut Transaction<'_>) {
        match self.attempt(tx) {
            Ok(()) => tx.record_success(),
            Err(err) => {
                #[cfg(feature = "log")]
                log::warn!(
                    "Request {} to slave {} failed: {err}",
                    tx.function(),
                    tx.slave()
                );
                if tx.record_failure(err, self.config.max_retries) {
                    #[cfg(feature = "log")]
                    log::error!(
                        "Slave {} deactivated after {} failed attempts",
                        tx.slave(),
                        self.config.max_retries
                    );
                }
            }
        }
        self.turnaround();
        self.dispatched = self.dispatched.wrapping_add(1);
    }

    fn attempt(&mut self, tx: &mut Transaction<'_>) -> Result<(), Error> {
        tx.begin_attempt();
        let adu = tx.adu();
        let packing = self.config.coil_byte_count;
        let timeout = self.config.response_timeout;

        let data = tx.registers();
        self.frame.fill(|buf| encode_request(adu, data, packing, buf))?;
        #[cfg(feature = "log")]
        log::debug!("Sending {:02X?}", self.frame.as_slice());
        let sent = transmit(&mut self.serial, &self.clock, self.frame.as_slice(), timeout);

        // No slave answers a broadcast, so it counts as done once attempted.
        if tx.is_broadcast() {
            if let Err(_err) = sent {
                #[cfg(feature = "log")]
                log::warn!("Broadcast {} not sent completely: {_err}", tx.function());
            }
            return Ok(());
        }
        sent?;

        receive(
            &mut self.serial,
            &self.clock,
            &mut self.frame,
            tx.slave(),
            timeout,
        )?;
        #[cfg(feature = "log")]
        log::debug!("Received {:02X?}", self.frame.as_slice());
        let received = decode_response(self.frame.as_slice(), adu, packing, tx.registers_mut())?;
        tx.set_received(received);
        Ok(())
    }

    fn turnaround(&self) {
        #[cfg(feature = "log")]
        log::debug!(
            "Turnaround delay of {} ms",
            self.config.turnaround_delay.as_millis()
        );
        let start = self.clock.now();
        while self.clock.now().saturating_sub(start) < self.config.turnaround_delay {
            core::hint::spin_loop();
        }
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Character timings derived from the configured baud rate.
    #[must_use]
    pub const fn char_timing(&self) -> CharTiming {
        self.char_timing
    }

    /// Number of completed [`Master::run`] calls, wrapping on overflow.
    #[must_use]
    pub const fn dispatched(&self) -> u32 {
        self.dispatched
    }

    #[must_use]
    pub const fn serial(&self) -> &S {
        &self.serial
    }

    pub fn serial_mut(&mut self) -> &mut S {
        &mut self.serial
    }

    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Give back the serial line and the clock.
    pub fn release(self) -> (S, C) {
        (self.serial, self.clock)
    }
}

/// Write all `bytes` and wait for them to leave the transmit buffer.
fn transmit<S, C>(serial: &mut S, clock: &C, bytes: &[u8], timeout: Duration) -> Result<(), Error>
where
    S: Serial,
    C: Clock,
{
    let start = clock.now();
    for &byte in bytes {
        poll_with_timeout(clock, start, timeout, || serial.write_byte(byte))?;
    }
    poll_with_timeout(clock, start, timeout, || serial.flush())
}

fn poll_with_timeout<C, F, T, E>(
    clock: &C,
    start: Duration,
    timeout: Duration,
    mut f: F,
) -> Result<T, Error>
where
    C: Clock,
    F: FnMut() -> nb::Result<T, E>,
    E: Debug,
{
    loop {
        match f() {
            Ok(result) => return Ok(result),
            Err(nb::Error::WouldBlock) => {
                if clock.now().saturating_sub(start) >= timeout {
                    return Err(Error::SendTimeout);
                }
                core::hint::spin_loop();
            }
            Err(nb::Error::Other(_err)) => {
                #[cfg(feature = "log")]
                log::warn!("Failed to write to serial port: {_err:?}");
                return Err(Error::Serial);
            }
        }
    }
}
