// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Key/value message exchange over a polled byte stream.
//!
//! Each message is framed as
//!
//! ```text
//! {{key;value}}\n
//! ```
//!
//! Values are at most [`VALUE_LEN`] bytes. Received keys are at most `K`
//! bytes, where `K` defaults to [`KEY_LEN`]; a peer that has to read longer
//! keys (the host reading `timing_drift_check_start`) picks a larger
//! capacity with [`KvLink::with_key_capacity`]. Keys may not contain `{`,
//! `}`, `;` or a newline; values may not contain `{`, `}` or a newline.
//!
//! The receiver skips anything between frames. A frame that overflows one of
//! the buffers, contains a stray delimiter, or is not valid UTF-8 is dropped,
//! and parsing resumes at the next `{{`.

use core::cell::Cell;
use core::fmt::{self, Write};
use core::str;

use kernel::config::CONFIG;
use kernel::debug;
use kernel::hil::serial::PollingSerial;
use kernel::ErrorCode;

/// Default maximum length of a received key, in bytes.
pub const KEY_LEN: usize = 10;
/// Maximum value length in bytes.
pub const VALUE_LEN: usize = 127;

/// One received key/value pair.
#[derive(Clone, Copy)]
pub struct KvMessage<const K: usize = KEY_LEN> {
    key: [u8; K],
    key_len: usize,
    value: [u8; VALUE_LEN],
    value_len: usize,
}

impl<const K: usize> KvMessage<K> {
    const fn empty() -> Self {
        KvMessage {
            key: [0; K],
            key_len: 0,
            value: [0; VALUE_LEN],
            value_len: 0,
        }
    }

    pub fn key(&self) -> &str {
        str::from_utf8(&self.key[..self.key_len]).unwrap_or("")
    }

    pub fn value(&self) -> &str {
        str::from_utf8(&self.value[..self.value_len]).unwrap_or("")
    }

    fn is_valid(&self) -> bool {
        self.key_len > 0
            && str::from_utf8(&self.key[..self.key_len]).is_ok()
            && str::from_utf8(&self.value[..self.value_len]).is_ok()
    }
}

impl<const K: usize> fmt::Debug for KvMessage<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{{{};{}}}}}", self.key(), self.value())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ParseState {
    /// Between frames.
    Idle,
    /// Seen the first `{`.
    Open,
    Key,
    Value,
    /// Seen the first `}`.
    Close,
}

#[derive(Clone, Copy)]
struct Parser<const K: usize> {
    state: ParseState,
    message: KvMessage<K>,
}

impl<const K: usize> Parser<K> {
    const fn new() -> Self {
        Parser {
            state: ParseState::Idle,
            message: KvMessage::empty(),
        }
    }

    fn discard(&mut self, byte: u8) {
        if CONFIG.trace_kv {
            debug!("kv: dropped partial frame at {:#04x}", byte);
        }
        // A stray `{` may begin the next frame.
        self.state = if byte == b'{' {
            ParseState::Open
        } else {
            ParseState::Idle
        };
    }

    /// Feed one byte, returning a message when it completes a frame.
    fn push(&mut self, byte: u8) -> Option<KvMessage<K>> {
        match self.state {
            ParseState::Idle => {
                if byte == b'{' {
                    self.state = ParseState::Open;
                }
            }
            ParseState::Open => {
                if byte == b'{' {
                    self.message = KvMessage::empty();
                    self.state = ParseState::Key;
                } else {
                    self.state = ParseState::Idle;
                }
            }
            ParseState::Key => match byte {
                b';' => self.state = ParseState::Value,
                b'{' | b'}' | b'\n' => self.discard(byte),
                _ if self.message.key_len == K => self.discard(byte),
                _ => {
                    self.message.key[self.message.key_len] = byte;
                    self.message.key_len += 1;
                }
            },
            ParseState::Value => match byte {
                b'}' => self.state = ParseState::Close,
                b'{' | b'\n' => self.discard(byte),
                _ if self.message.value_len == VALUE_LEN => self.discard(byte),
                _ => {
                    self.message.value[self.message.value_len] = byte;
                    self.message.value_len += 1;
                }
            },
            ParseState::Close => {
                if byte != b'}' {
                    self.discard(byte);
                    return None;
                }
                self.state = ParseState::Idle;
                if self.message.is_valid() {
                    return Some(self.message);
                }
                if CONFIG.trace_kv {
                    debug!("kv: dropped malformed frame");
                }
            }
        }
        None
    }
}

/// Formats a value, refusing anything longer than `VALUE_LEN` or containing
/// a frame delimiter.
struct ValueWriter {
    buf: [u8; VALUE_LEN],
    len: usize,
    error: Option<ErrorCode>,
}

impl Write for ValueWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if s.bytes().any(|b| matches!(b, b'{' | b'}' | b'\n')) {
            self.error = Some(ErrorCode::INVAL);
            return Err(fmt::Error);
        }
        let end = self.len + s.len();
        if end > VALUE_LEN {
            self.error = Some(ErrorCode::SIZE);
            return Err(fmt::Error);
        }
        self.buf[self.len..end].copy_from_slice(s.as_bytes());
        self.len = end;
        Ok(())
    }
}

pub struct KvLink<'a, S: PollingSerial, const K: usize = KEY_LEN> {
    serial: &'a S,
    parser: Cell<Parser<K>>,
}

impl<'a, S: PollingSerial> KvLink<'a, S> {
    /// A link that accepts keys of up to `KEY_LEN` bytes.
    pub fn new(serial: &'a S) -> KvLink<'a, S> {
        KvLink::with_key_capacity(serial)
    }
}

impl<'a, S: PollingSerial, const K: usize> KvLink<'a, S, K> {
    /// A link that accepts keys of up to `K` bytes.
    pub fn with_key_capacity(serial: &'a S) -> KvLink<'a, S, K> {
        KvLink {
            serial,
            parser: Cell::new(Parser::new()),
        }
    }

    /// Send one `{{key;value}}` frame.
    ///
    /// Outgoing keys are not limited to `K`; that limit only bounds what
    /// this side accepts. Returns `Err(ErrorCode::SIZE)` if the
    /// formatted value is too long, `Err(ErrorCode::INVAL)` if the key is
    /// empty or either field contains a delimiter, and the transport error if
    /// a write fails. Nothing is written unless the whole frame is valid.
    pub fn send(&self, key: &str, value: impl fmt::Display) -> Result<(), ErrorCode> {
        if key.is_empty() || key.bytes().any(|b| matches!(b, b'{' | b'}' | b';' | b'\n')) {
            return Err(ErrorCode::INVAL);
        }

        let mut writer = ValueWriter {
            buf: [0; VALUE_LEN],
            len: 0,
            error: None,
        };
        if write!(writer, "{}", value).is_err() {
            return Err(writer.error.unwrap_or(ErrorCode::SIZE));
        }
        let value = &writer.buf[..writer.len];

        if CONFIG.trace_kv {
            debug!(
                "kv: > {{{{{};{}}}}}",
                key,
                str::from_utf8(value).unwrap_or("?")
            );
        }
        self.serial.write_bytes(b"{{")?;
        self.serial.write_bytes(key.as_bytes())?;
        self.serial.write_bytes(b";")?;
        self.serial.write_bytes(value)?;
        self.serial.write_bytes(b"}}\n")
    }

    /// Consume available input and return the next complete message, if
    /// any. Never blocks; a partially received frame is kept for the next
    /// call.
    pub fn receive(&self) -> Option<KvMessage<K>> {
        let mut parser = self.parser.get();
        let mut received = None;
        while let Some(byte) = self.serial.read_byte() {
            received = parser.push(byte);
            if received.is_some() {
                break;
            }
        }
        self.parser.set(parser);

        if CONFIG.trace_kv {
            if let Some(message) = received.as_ref() {
                debug!("kv: < {:?}", message);
            }
        }
        received
    }
}
