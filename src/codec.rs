//! Codec primitives.
//!
//! Conversions between text and bytes, buffering of readers, and the ASCII
//! armor used to move binary OpenPGP data through text-only channels
//! (RFC 4880 section 6).

use std::io::{BufReader, Cursor, Read};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use pgp::armor::Dearmor;

use crate::error::{Error, Result};

/// CRC-24 polynomial used for armor checksums
const CRC24_POLY: u32 = 0x0186_4CFB;
const CRC24_INIT: u32 = 0x00B7_04CE;

/// Base64 characters per armor line
const LINE_WIDTH: usize = 64;

const ARMOR_PREFIX: &[u8] = b"-----BEGIN PGP";

/// Encode text as UTF-8 bytes.
pub fn text_to_bytes(text: &str) -> Vec<u8> {
    text.as_bytes().to_vec()
}

/// Decode UTF-8 bytes into text.
///
/// # Errors
/// * [`Error::InvalidText`] - If the bytes are not valid UTF-8
pub fn bytes_to_text(bytes: Vec<u8>) -> Result<String> {
    Ok(String::from_utf8(bytes)?)
}

/// Read everything a reader yields into memory.
///
/// # Errors
/// * [`Error::UnreadableStream`] - If the reader fails before reaching its end
pub fn read_fully<R: Read>(mut reader: R) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader
        .read_to_end(&mut buf)
        .map_err(Error::UnreadableStream)?;
    Ok(buf)
}

/// Whether the data starts (after leading whitespace) with an armor header.
pub fn is_armored(data: &[u8]) -> bool {
    data.trim_ascii_start().starts_with(ARMOR_PREFIX)
}

/// Strip ASCII armor, checking the CRC-24 line when present.
pub fn dearmor(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let dearmor = Dearmor::new(Cursor::new(data));
    let mut buf = Vec::new();
    let mut reader = BufReader::new(dearmor);
    reader.read_to_end(&mut buf)?;
    Ok(buf)
}

/// Return the binary form of armored or binary input.
pub fn decode(data: &[u8]) -> std::io::Result<Vec<u8>> {
    if is_armored(data) {
        dearmor(data)
    } else {
        Ok(data.to_vec())
    }
}

/// Wrap binary message data in a `PGP MESSAGE` armor block.
pub fn armor(data: &[u8]) -> String {
    let body = STANDARD.encode(data);
    let mut out = String::with_capacity(body.len() + body.len() / LINE_WIDTH + 96);

    out.push_str("-----BEGIN PGP MESSAGE-----\n\n");

    let mut rest = body.as_str();
    while !rest.is_empty() {
        let (line, tail) = rest.split_at(rest.len().min(LINE_WIDTH));
        out.push_str(line);
        out.push('\n');
        rest = tail;
    }

    let checksum = crc24(data).to_be_bytes();
    out.push('=');
    out.push_str(&STANDARD.encode(&checksum[1..]));
    out.push('\n');
    out.push_str("-----END PGP MESSAGE-----\n");
    out
}

/// CRC-24 as used by OpenPGP armor.
pub fn crc24(data: &[u8]) -> u32 {
    let mut crc = CRC24_INIT;

    for &byte in data {
        crc ^= (byte as u32) << 16;
        for _ in 0..8 {
            crc <<= 1;
            if crc & 0x0100_0000 != 0 {
                crc ^= CRC24_POLY;
            }
        }
    }

    crc & 0x00FF_FFFF
}
