// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Modbus RTU client (master) specific functions.
use super::*;

/// Encode an RTU request.
///
/// `data` supplies the values of write requests: register values for
/// function 16, coils packed 16 per word for function 15. It is ignored for
/// reads.
pub fn encode_request(
    adu: RequestAdu,
    data: &[Word],
    packing: CoilByteCount,
    buf: &mut [u8],
) -> Result<usize> {
    let RequestAdu { hdr, pdu } = adu;
    let len = request_adu_len(&pdu, packing)?;
    if buf.len() < len {
        return Err(Error::BufferSize);
    }
    buf[0] = hdr.slave;
    buf[1] = pdu.function.value();
    BigEndian::write_u16(&mut buf[2..4], pdu.address);
    // For functions 1 & 2 this is the number of points,
    // for 3, 4 & 16 the number of registers and for 15 the number of coils
    BigEndian::write_u16(&mut buf[4..6], pdu.quantity);

    let payload = &mut buf[REQUEST_HEADER_LEN..len - CRC_LEN];
    match pdu.function {
        FunctionCode::WriteMultipleRegisters => {
            let quantity = usize::from(pdu.quantity);
            if data.len() < quantity {
                return Err(Error::BufferSize);
            }
            payload[0] = (quantity * 2) as u8;
            write_words(&data[..quantity], &mut payload[1..])?;
        }
        FunctionCode::WriteMultipleCoils => {
            let byte_count = packing.byte_count(pdu.quantity);
            payload[0] = byte_count as u8;
            pack_coil_words(data, byte_count, &mut payload[1..])?;
        }
        // all reads share the fixed 8 byte layout
        _ => {}
    }

    let crc = crc16(&buf[..len - CRC_LEN]);
    LittleEndian::write_u16(&mut buf[len - CRC_LEN..len], crc);
    Ok(len)
}

/// Decode an RTU response to `adu` into `registers`.
///
/// The reply is dispatched on the function code it carries. Read replies
/// fill `registers`, write replies must echo the requested address and
/// quantity. Nothing is written to `registers` unless the whole reply
/// is valid.
///
/// It returns the number of points received.
pub fn decode_response(
    buf: &[u8],
    adu: RequestAdu,
    packing: CoilByteCount,
    registers: &mut [Word],
) -> Result<Quantity> {
    let DecodedFrame { slave: _, pdu } = extract_frame(buf)?;
    let req = adu.pdu;
    let fn_code = pdu[0];

    if fn_code & EXCEPTION_FLAG != 0 {
        return Err(Error::Exception {
            function: fn_code & !EXCEPTION_FLAG,
            code: pdu[1],
        });
    }

    use FunctionCode as f;
    match FunctionCode::new(fn_code) {
        f::ReadCoils | f::ReadDiscreteInputs => {
            let data = byte_counted_data(pdu, packing.byte_count(req.quantity))?;
            unpack_coil_words(data, registers)?;
        }
        f::ReadHoldingRegisters | f::ReadInputRegisters => {
            let data = byte_counted_data(pdu, usize::from(req.quantity) * 2)?;
            read_words(data, registers)?;
        }
        f::WriteMultipleCoils | f::WriteMultipleRegisters => {
            // function code, address and quantity
            if pdu.len() != ECHO_LEN - 1 - CRC_LEN {
                return Err(Error::LengthMismatch(ECHO_LEN, buf.len()));
            }
            let address = BigEndian::read_u16(&pdu[1..3]);
            let quantity = BigEndian::read_u16(&pdu[3..5]);
            if address != req.address || quantity != req.quantity {
                return Err(Error::EchoMismatch { address, quantity });
            }
        }
        f::Custom(code) => return Err(Error::FnCode(code)),
    }
    Ok(req.quantity)
}

// Check the byte count field of a read reply and return the data bytes.
fn byte_counted_data(pdu: &[u8], expected: usize) -> Result<&[u8]> {
    let actual = pdu[1];
    if usize::from(actual) != expected {
        return Err(Error::ByteCount { expected, actual });
    }
    let data = &pdu[2..];
    if data.len() != expected {
        return Err(Error::LengthMismatch(expected, data.len()));
    }
    Ok(data)
}
