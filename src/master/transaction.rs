// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    codec::rtu::{Header, Request, RequestAdu, request_adu_len, response_adu_len},
    error::Error,
    frame::*,
};

/// Cumulative counters of a [`Transaction`].
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Requests sent.
    pub requests: u32,
    /// Attempts that ended with a valid reply, or any sent broadcast.
    pub successful_requests: u32,
    /// Attempts that failed for any reason.
    pub failed_requests: u32,
    /// Failed attempts answered with an exception response.
    pub exception_errors: u32,
    /// Consecutive failures since the last success or deactivation.
    pub retries: u8,
    /// Points received by the most recent successful attempt.
    pub received: Quantity,
}

/// A request against a range of coils or registers of one slave, together
/// with its result buffer and counters.
///
/// The register slice is borrowed from the caller. Read functions store
/// their results in it; write functions take their values from it. Coils
/// are packed 16 per word, the first coil in the least significant bit.
#[derive(Debug)]
pub struct Transaction<'r> {
    adu: RequestAdu,
    registers: &'r mut [Word],
    stats: Stats,
    connection_active: bool,
    last_error: Option<Error>,
}

impl<'r> Transaction<'r> {
    /// Create an active transaction.
    ///
    /// Fails if the slave id is out of range, the quantity is zero or does
    /// not fit into a single RTU frame, the function is not supported, or
    /// `registers` is too short to hold `quantity` items.
    pub fn new(
        slave: SlaveId,
        function: FunctionCode,
        address: Address,
        quantity: Quantity,
        registers: &'r mut [Word],
    ) -> Result<Self, Error> {
        if slave > MAX_SLAVE_ID {
            return Err(Error::InvalidSlaveId(slave));
        }
        if quantity == 0 {
            return Err(Error::InvalidQuantity(quantity));
        }
        if registers.len() < function.words_needed(quantity)? {
            return Err(Error::BufferSize);
        }
        let pdu = Request {
            function,
            address,
            quantity,
        };
        // The standard coil byte count is never smaller than the legacy one,
        // so this bound holds for both.
        request_adu_len(&pdu, CoilByteCount::Standard)?;
        response_adu_len(&pdu, CoilByteCount::Standard)?;
        Ok(Self {
            adu: RequestAdu {
                hdr: Header { slave },
                pdu,
            },
            registers,
            stats: Stats::default(),
            connection_active: true,
            last_error: None,
        })
    }

    #[must_use]
    pub const fn slave(&self) -> SlaveId {
        self.adu.hdr.slave
    }

    #[must_use]
    pub const fn function(&self) -> FunctionCode {
        self.adu.pdu.function
    }

    #[must_use]
    pub const fn address(&self) -> Address {
        self.adu.pdu.address
    }

    #[must_use]
    pub const fn quantity(&self) -> Quantity {
        self.adu.pdu.quantity
    }

    /// Whether this transaction is sent to all slaves.
    #[must_use]
    pub const fn is_broadcast(&self) -> bool {
        self.adu.hdr.slave == BROADCAST
    }

    /// Register words read by the last successful read, or the values to be
    /// written.
    #[must_use]
    pub fn registers(&self) -> &[Word] {
        &*self.registers
    }

    /// Update the values to be written by the next attempt.
    pub fn registers_mut(&mut self) -> &mut [Word] {
        &mut *self.registers
    }

    #[must_use]
    pub const fn stats(&self) -> Stats {
        self.stats
    }

    /// `false` once the retry limit was hit.
    ///
    /// The engine keeps driving an inactive transaction when asked to;
    /// skipping it is up to the caller.
    #[must_use]
    pub const fn connection_active(&self) -> bool {
        self.connection_active
    }

    /// Failure of the most recent attempt, `None` after a success.
    #[must_use]
    pub const fn last_error(&self) -> Option<Error> {
        self.last_error
    }

    /// Mark a deactivated transaction as active again.
    pub fn reactivate(&mut self) {
        self.connection_active = true;
    }

    pub(crate) const fn adu(&self) -> RequestAdu {
        self.adu
    }

    pub(crate) fn begin_attempt(&mut self) {
        self.stats.received = 0;
        self.stats.requests = self.stats.requests.saturating_add(1);
    }

    pub(crate) fn set_received(&mut self, received: Quantity) {
        self.stats.received = received;
    }

    pub(crate) fn record_success(&mut self) {
        self.stats.successful_requests = self.stats.successful_requests.saturating_add(1);
        self.stats.retries = 0;
        self.last_error = None;
    }

    /// Count a failed attempt.
    ///
    /// Returns `true` if this failure deactivated the transaction.
    pub(crate) fn record_failure(&mut self, err: Error, max_retries: u8) -> bool {
        self.stats.retries = self.stats.retries.saturating_add(1);
        self.stats.failed_requests = self.stats.failed_requests.saturating_add(1);
        if err.is_exception() {
            self.stats.exception_errors = self.stats.exception_errors.saturating_add(1);
        }
        self.last_error = Some(err);
        if self.stats.retries >= max_retries {
            self.connection_active = false;
            self.stats.retries = 0;
            return true;
        }
        false
    }
}
