// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Polled byte stream.
//!
//! A reliable, ordered byte stream used by foreground code that busy-polls
//! for input instead of waiting on a receive interrupt.

use crate::ErrorCode;

pub trait PollingSerial {
    /// Returns the next received byte, if one is available. Never blocks.
    fn read_byte(&self) -> Option<u8>;

    /// Writes all of `bytes` to the stream.
    fn write_bytes(&self, bytes: &[u8]) -> Result<(), ErrorCode>;
}
