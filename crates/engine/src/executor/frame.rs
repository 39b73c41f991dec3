// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Binary framing for the child-to-parent diagnostic pipe.
//!
//! One frame per report: `tag (1) | len (4, little-endian) | body (len)`.
//! `len` counts the body's trailing NUL, so the payload proper is `len - 1`
//! bytes. The writer emits a frame with a single `write_all`; the reader
//! runs against a non-blocking descriptor and distinguishes "nothing ready
//! yet" from a closed or misbehaving peer.

use std::fmt;
use std::fs::File;
use std::io::{self, ErrorKind, Read, Write};

/// Upper bound on `len`. Anything larger is treated as a framing error
/// rather than an allocation request.
pub(crate) const MAX_FRAME_LEN: u32 = 4 * 1024 * 1024;

/// Frame type tags. Values are stable within a build, not a wire contract
/// between versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum FrameTag {
    /// Plain program output.
    Out = 1,
    /// Serialized error-grade diagnostic.
    Err = 2,
    /// Serialized informational diagnostic.
    Info = 3,
    /// ASCII decimal result code; the worker's final frame.
    End = 4,
}

impl FrameTag {
    fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(FrameTag::Out),
            2 => Some(FrameTag::Err),
            3 => Some(FrameTag::Info),
            4 => Some(FrameTag::End),
            _ => None,
        }
    }
}

/// Outcome of one read attempt on the pipe.
#[derive(Debug)]
pub(crate) enum Frame {
    /// The descriptor had no data; try again after the next poll.
    NotReady,
    /// The write end is gone (or unreadable) without an `End` frame.
    Closed,
    Out(String),
    /// Payload is the serialized diagnostic; the sink decodes it.
    Err(String),
    Info(String),
    /// Payload is the worker's result code in ASCII decimal.
    End(String),
}

/// A protocol violation. Fatal for the whole batch.
#[derive(Debug)]
pub(crate) enum FrameError {
    BadTag(u8),
    BadLength(u32),
    ShortRead { wanted: usize, got: usize },
    BadEncoding,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::BadTag(byte) => write!(f, "unknown frame tag {byte}"),
            FrameError::BadLength(len) => write!(f, "implausible frame length {len}"),
            FrameError::ShortRead { wanted, got } => {
                write!(f, "short frame read: wanted {wanted} bytes, got {got}")
            }
            FrameError::BadEncoding => write!(f, "frame body is not valid UTF-8"),
        }
    }
}

/// Encode one frame into a buffer suitable for a single write.
pub(crate) fn encode_frame(tag: FrameTag, payload: &str) -> Vec<u8> {
    let len = (payload.len() + 1) as u32;
    let mut buf = Vec::with_capacity(payload.len() + 6);
    buf.push(tag as u8);
    buf.extend_from_slice(&len.to_le_bytes());
    buf.extend_from_slice(payload.as_bytes());
    buf.push(0);
    buf
}

/// Emit one frame atomically with respect to other frames from this worker.
pub(crate) fn write_frame(mut pipe: &File, tag: FrameTag, payload: &str) -> io::Result<()> {
    if payload.len() + 1 > MAX_FRAME_LEN as usize {
        return Err(io::Error::new(
            ErrorKind::InvalidData,
            format!("frame payload of {} bytes exceeds the frame cap", payload.len()),
        ));
    }
    pipe.write_all(&encode_frame(tag, payload))
}

/// Attempt to read one frame from a non-blocking pipe.
///
/// Once the tag byte has been consumed the rest of the frame must follow:
/// a short or would-block read past that point is a protocol violation, as
/// the writer emits whole frames.
pub(crate) fn read_frame(mut pipe: &File) -> Result<Frame, FrameError> {
    let mut tag_buf = [0u8; 1];
    match pipe.read(&mut tag_buf) {
        Ok(0) => return Ok(Frame::Closed),
        Ok(_) => {}
        Err(err) if err.kind() == ErrorKind::WouldBlock => return Ok(Frame::NotReady),
        // Any other read failure on the tag means this worker is done
        // producing; the reap path accounts for how it died.
        Err(_) => return Ok(Frame::Closed),
    }

    let tag = FrameTag::from_byte(tag_buf[0]).ok_or(FrameError::BadTag(tag_buf[0]))?;

    let mut len_buf = [0u8; 4];
    let got = pipe.read(&mut len_buf).unwrap_or(0);
    if got != len_buf.len() {
        return Err(FrameError::ShortRead { wanted: len_buf.len(), got });
    }
    let len = u32::from_le_bytes(len_buf);
    if len == 0 || len > MAX_FRAME_LEN {
        return Err(FrameError::BadLength(len));
    }

    let mut body = vec![0u8; len as usize];
    let got = pipe.read(&mut body).unwrap_or(0);
    if got != body.len() {
        return Err(FrameError::ShortRead { wanted: body.len(), got });
    }

    // Strip the NUL slot by length; the payload itself may contain NULs and
    // the writer is not trusted to have terminated it.
    body.truncate(len as usize - 1);
    let payload = String::from_utf8(body).map_err(|_| FrameError::BadEncoding)?;

    Ok(match tag {
        FrameTag::Out => Frame::Out(payload),
        FrameTag::Err => Frame::Err(payload),
        FrameTag::Info => Frame::Info(payload),
        FrameTag::End => Frame::End(payload),
    })
}

#[cfg(test)]
#[path = "frame_tests.rs"]
mod tests;
