//! OpenPGP packet framing for the compressed-data layer.
//!
//! rpgp compresses only inside the encryption layer, so the compressed-data
//! packet wrapped around already encrypted packets is framed here
//! (RFC 4880 sections 4.2 and 5.6).

use std::io::Write;

use flate2::write::{DeflateEncoder, ZlibEncoder};

use crate::config::Compression;
use crate::error::{Error, Result};

/// Compressed Data Packet tag
pub(crate) const TAG_COMPRESSED_DATA: u8 = 8;

/// Encode a new-format packet header for a body of `length` bytes.
pub(crate) fn header(tag: u8, length: usize) -> Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(6);
    bytes.push(0xC0 | (tag & 0x3F));

    if length < 192 {
        bytes.push(length as u8);
    } else if length < 8384 {
        let encoded = length - 192;
        bytes.push(192 + (encoded >> 8) as u8);
        bytes.push((encoded & 0xFF) as u8);
    } else {
        let length = u32::try_from(length)
            .map_err(|_| Error::Crypto(format!("packet body too large: {} bytes", length)))?;
        bytes.push(0xFF);
        bytes.extend_from_slice(&length.to_be_bytes());
    }

    Ok(bytes)
}

/// Wrap `payload` (a complete packet sequence) in a compressed-data packet.
pub(crate) fn compressed_packet(compression: Compression, payload: &[u8]) -> Result<Vec<u8>> {
    let mut body = Vec::with_capacity(payload.len() / 2 + 16);
    body.push(compression.id());

    match compression {
        Compression::Uncompressed => body.extend_from_slice(payload),
        Compression::Zip => {
            let mut encoder = DeflateEncoder::new(body, flate2::Compression::default());
            encoder.write_all(payload).map_err(compression_failed)?;
            body = encoder.finish().map_err(compression_failed)?;
        }
        Compression::Zlib => {
            let mut encoder = ZlibEncoder::new(body, flate2::Compression::default());
            encoder.write_all(payload).map_err(compression_failed)?;
            body = encoder.finish().map_err(compression_failed)?;
        }
    }

    let mut packet = header(TAG_COMPRESSED_DATA, body.len())?;
    packet.extend_from_slice(&body);
    Ok(packet)
}

fn compression_failed(e: std::io::Error) -> Error {
    Error::Crypto(format!("compression failed: {}", e))
}
