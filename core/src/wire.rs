// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{Read, Write};
use thiserror::Error;

/// Upper bound on a single frame payload. Declared lengths above this are
/// rejected before any allocation takes place.
pub const MAX_PACKET_SIZE: usize = 100 * 1024 * 1024;

/// Errors on the framed socket.
///
/// `Io` covers transport failures (short reads/writes, EOF mid-frame);
/// `FrameLength` and `Codec` cover protocol violations. Both are fatal to
/// the session that observes them.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("i/o failure on framed socket: {0}")]
    Io(#[from] std::io::Error),
    #[error("frame length {0} outside allowed range (1..={MAX_PACKET_SIZE})")]
    FrameLength(usize),
    #[error("message codec failure: {0}")]
    Codec(#[from] bincode::Error),
}

/// Writes one frame: a u32 big-endian length prefix followed by the payload.
/// Either the whole frame is written or an error is returned.
pub fn send_frame<W: Write>(writer: &mut W, payload: &[u8]) -> Result<(), WireError> {
    if payload.is_empty() || payload.len() > MAX_PACKET_SIZE {
        return Err(WireError::FrameLength(payload.len()));
    }

    let len = payload.len() as u32;
    writer.write_all(&len.to_be_bytes())?;
    writer.write_all(payload)?;
    writer.flush()?;

    Ok(())
}

/// Reads one frame and returns its payload.
///
/// The length prefix is converted from network byte order and validated
/// against [`MAX_PACKET_SIZE`] before the payload buffer is allocated.
pub fn receive_frame<R: Read>(reader: &mut R) -> Result<Vec<u8>, WireError> {
    let mut len_bytes = [0u8; 4];
    reader.read_exact(&mut len_bytes)?;

    let len = u32::from_be_bytes(len_bytes) as usize;
    if len == 0 || len > MAX_PACKET_SIZE {
        return Err(WireError::FrameLength(len));
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload)?;

    Ok(payload)
}

/// Encodes one message value and ships it as a single frame.
///
/// There is no message-type tag on the wire: both endpoints know which
/// message shape they expect at every protocol step.
pub fn send_message<W: Write, T: Serialize>(writer: &mut W, message: &T) -> Result<(), WireError> {
    let payload = bincode::serialize(message)?;
    send_frame(writer, &payload)
}

/// Receives one frame and decodes it as a message of type `T`.
pub fn receive_message<R: Read, T: DeserializeOwned>(reader: &mut R) -> Result<T, WireError> {
    let payload = receive_frame(reader)?;
    let message = bincode::deserialize(&payload)?;
    Ok(message)
}
