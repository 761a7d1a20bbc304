// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Key/value transport over the process's stdin and stdout.
//!
//! Reading stdin blocks, so a reader thread forwards bytes over a channel and
//! `read_byte` only ever polls the channel.

use std::io::{Read, Write};
use std::sync::mpsc::{self, Receiver};
use std::thread;

use kernel::hil::serial::PollingSerial;
use kernel::ErrorCode;

pub struct StdioSerial {
    rx: Receiver<u8>,
}

impl StdioSerial {
    /// Start the stdin reader thread.
    pub fn new() -> StdioSerial {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let stdin = std::io::stdin();
            for byte in stdin.lock().bytes() {
                match byte {
                    Ok(byte) => {
                        if tx.send(byte).is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
        });
        StdioSerial { rx }
    }
}

impl PollingSerial for StdioSerial {
    fn read_byte(&self) -> Option<u8> {
        self.rx.try_recv().ok()
    }

    fn write_bytes(&self, bytes: &[u8]) -> Result<(), ErrorCode> {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(bytes)
            .and_then(|()| stdout.flush())
            .map_err(|_| ErrorCode::FAIL)
    }
}
