// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Debug output on the host's stderr, keeping stdout for the key/value link.

use std::io::Write;

use kernel::debug::{self, DebugWriter, IoWrite};

struct Stderr;

impl IoWrite for Stderr {
    fn write(&self, buf: &[u8]) -> usize {
        let mut stderr = std::io::stderr().lock();
        match stderr.write_all(buf) {
            Ok(()) => buf.len(),
            Err(_) => 0,
        }
    }
}

static STDERR: Stderr = Stderr;
static DEBUG_WRITER: DebugWriter = DebugWriter::new(&STDERR);

/// Route `debug!` output to stderr.
pub fn init() {
    debug::set_debug_writer(&DEBUG_WRITER);
}
