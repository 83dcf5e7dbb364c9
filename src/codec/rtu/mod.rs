// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Modbus RTU

use super::*;

pub mod client;
pub use crate::frame::rtu::*;

// [MODBUS over Serial Line Specification and Implementation Guide V1.02](http://modbus.org/docs/Modbus_over_serial_line_V1_02.pdf), page 13
// "The maximum size of a MODBUS RTU frame is 256 bytes."
pub const MAX_FRAME_LEN: usize = 256;

/// Smallest valid reply: slave id, function code, one data or exception
/// byte and the CRC.
pub const MIN_FRAME_LEN: usize = 5;

/// Number of trailing CRC bytes.
pub const CRC_LEN: usize = 2;

// slave id, function code, address and quantity
const REQUEST_HEADER_LEN: usize = 6;

// slave id, function code and byte count
const REPLY_HEADER_LEN: usize = 3;

// slave id, function code, address and quantity echo
const ECHO_LEN: usize = REQUEST_HEADER_LEN + CRC_LEN;

/// An extracted RTU PDU frame.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedFrame<'a> {
    pub slave: SlaveId,
    pub pdu: &'a [u8],
}

/// Verify the trailing CRC of a complete frame and split it into
/// slave id and PDU.
pub fn extract_frame(buf: &[u8]) -> Result<DecodedFrame<'_>> {
    if buf.len() < MIN_FRAME_LEN {
        return Err(Error::ReceiveTooShort(buf.len()));
    }
    let (adu_buf, crc_buf) = buf.split_at(buf.len() - CRC_LEN);
    // The CRC is the only field sent low byte first
    let expected = LittleEndian::read_u16(crc_buf);
    let actual = crc16(adu_buf);
    if expected != actual {
        return Err(Error::Crc { expected, actual });
    }
    let (slave_id, pdu) = adu_buf.split_at(1);
    Ok(DecodedFrame {
        slave: slave_id[0],
        pdu,
    })
}

/// Whether `buf` holds at least a minimal frame ending in a valid CRC.
#[must_use]
pub fn crc_matches(buf: &[u8]) -> bool {
    extract_frame(buf).is_ok()
}

/// Calculate the CRC (Cyclic Redundancy Check) sum.
///
/// The result is the plain CRC register; on the wire it goes low byte first.
#[must_use]
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc = 0xFFFF;
    for x in data {
        crc ^= u16::from(*x);
        for _ in 0..8 {
            // if we followed clippy's suggestion to move out the crc >>= 1, the condition may not be met any more
            // the recommended action therefore makes no sense and it is better to allow this lint
            #[allow(clippy::branches_sharing_code)]
            if (crc & 0x0001) != 0 {
                crc >>= 1;
                crc ^= 0xA001;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

fn byte_count_field(count: usize, quantity: Quantity) -> Result<usize> {
    if count > usize::from(u8::MAX) {
        return Err(Error::InvalidQuantity(quantity));
    }
    Ok(count)
}

fn within_frame(len: usize, quantity: Quantity) -> Result<usize> {
    if len > MAX_FRAME_LEN {
        return Err(Error::InvalidQuantity(quantity));
    }
    Ok(len)
}

/// Number of bytes of the encoded request ADU, CRC included.
pub fn request_adu_len(req: &Request, packing: CoilByteCount) -> Result<usize> {
    use FunctionCode as f;
    let quantity = req.quantity;
    let payload = match req.function {
        f::ReadCoils | f::ReadDiscreteInputs | f::ReadHoldingRegisters | f::ReadInputRegisters => 0,
        f::WriteMultipleCoils => 1 + byte_count_field(packing.byte_count(quantity), quantity)?,
        f::WriteMultipleRegisters => 1 + byte_count_field(usize::from(quantity) * 2, quantity)?,
        f::Custom(code) => return Err(Error::FnCode(code)),
    };
    within_frame(REQUEST_HEADER_LEN + payload + CRC_LEN, quantity)
}

/// Number of bytes of a regular (non-exception) reply ADU, CRC included.
pub fn response_adu_len(req: &Request, packing: CoilByteCount) -> Result<usize> {
    use FunctionCode as f;
    let quantity = req.quantity;
    let len = match req.function {
        f::ReadCoils | f::ReadDiscreteInputs => {
            REPLY_HEADER_LEN + byte_count_field(packing.byte_count(quantity), quantity)? + CRC_LEN
        }
        f::ReadHoldingRegisters | f::ReadInputRegisters => {
            REPLY_HEADER_LEN + byte_count_field(usize::from(quantity) * 2, quantity)? + CRC_LEN
        }
        f::WriteMultipleCoils | f::WriteMultipleRegisters => ECHO_LEN,
        f::Custom(code) => return Err(Error::FnCode(code)),
    };
    within_frame(len, quantity)
}
