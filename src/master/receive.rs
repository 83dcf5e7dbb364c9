// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gathering reply bytes from the serial line.

use super::hal::{Clock, Serial};
use crate::{
    codec::rtu::{MAX_FRAME_LEN, MIN_FRAME_LEN, crc_matches},
    error::Error,
    frame::SlaveId,
};
use core::time::Duration;

/// Polls before the receive loop starts looking for a complete frame.
pub(crate) const EARLY_CHECK_POLLS: u32 = 20;

/// Frame buffer shared by sending and receiving.
#[derive(Debug)]
pub(crate) struct FrameBuffer {
    buf: [u8; MAX_FRAME_LEN],
    len: usize,
    overflow: bool,
}

impl FrameBuffer {
    pub(crate) const fn new() -> Self {
        Self {
            buf: [0; MAX_FRAME_LEN],
            len: 0,
            overflow: false,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.len = 0;
        self.overflow = false;
    }

    /// Append a received byte; once full, further bytes only mark an
    /// overflow.
    pub(crate) fn push(&mut self, byte: u8) {
        if self.len == self.buf.len() {
            self.overflow = true;
            return;
        }
        self.buf[self.len] = byte;
        self.len += 1;
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn overflowed(&self) -> bool {
        self.overflow
    }

    pub(crate) fn as_slice(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Hand the whole buffer to an encoder and keep the first `len` bytes
    /// it reports.
    pub(crate) fn fill<E>(
        &mut self,
        encode: impl FnOnce(&mut [u8]) -> Result<usize, E>,
    ) -> Result<usize, E> {
        self.clear();
        let len = encode(&mut self.buf)?;
        self.len = len.min(self.buf.len());
        Ok(self.len)
    }
}

/// Collect a reply from `expected` into `frame`.
///
/// Bytes are polled until `timeout` has elapsed. Once [`EARLY_CHECK_POLLS`]
/// polls have passed, a buffer that already ends in a valid CRC is taken as
/// complete and ends the wait early.
pub(crate) fn receive<S, C>(
    serial: &mut S,
    clock: &C,
    frame: &mut FrameBuffer,
    expected: SlaveId,
    timeout: Duration,
) -> Result<(), Error>
where
    S: Serial,
    C: Clock,
{
    frame.clear();
    let start = clock.now();
    let mut polls: u32 = 0;
    let mut checked_len = 0;

    loop {
        match serial.read_byte() {
            Ok(byte) => frame.push(byte),
            Err(nb::Error::WouldBlock) => {}
            Err(nb::Error::Other(_err)) => {
                #[cfg(feature = "log")]
                log::warn!("Failed to read from serial port: {_err:?}");
                return Err(Error::Serial);
            }
        }
        polls = polls.saturating_add(1);

        if polls > EARLY_CHECK_POLLS
            && frame.len() >= MIN_FRAME_LEN
            && frame.len() != checked_len
            && !frame.overflowed()
        {
            checked_len = frame.len();
            if crc_matches(frame.as_slice()) {
                #[cfg(feature = "log")]
                log::debug!("Frame complete after {polls} polls");
                break;
            }
        }

        if clock.now().saturating_sub(start) >= timeout {
            break;
        }
    }

    if frame.overflowed() {
        return Err(Error::ReceiveOverflow);
    }
    if frame.len() < MIN_FRAME_LEN {
        return Err(Error::ReceiveTooShort(frame.len()));
    }
    let actual = frame.as_slice()[0];
    if actual != expected {
        return Err(Error::UnexpectedSlaveId { expected, actual });
    }
    Ok(())
}
