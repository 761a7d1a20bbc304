// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Support for in-kernel debugging.
//!
//! For printing, boards register a single [`DebugWriter`] at startup with
//! [`set_debug_writer`]. Until then every print is silently dropped.
//!
//! Example
//! -------
//!
//! ```no_run
//! # use kernel::{debug, debug_verbose};
//! debug!("Yes the code gets here with value {}", 42);
//! debug_verbose!("got here"); // includes message count, file, and line
//! ```
//!
//! ```text
//! Yes the code gets here with value 42
//! TOCK_DEBUG(0): /tock/capsules/src/ticker_drift.rs:24: got here
//! ```

use core::fmt::{self, Write};
use core::ptr;
use core::sync::atomic::{AtomicPtr, AtomicUsize, Ordering};

/// Sink for debug output, usually a polled UART or the host's stderr.
pub trait IoWrite: Sync {
    /// Write `buf` completely, returning the number of bytes written.
    fn write(&self, buf: &[u8]) -> usize;
}

/// Wrapper around the board's `IoWrite` that counts messages.
pub struct DebugWriter {
    output: &'static dyn IoWrite,
    count: AtomicUsize,
}

impl DebugWriter {
    pub const fn new(output: &'static dyn IoWrite) -> DebugWriter {
        DebugWriter {
            output,
            count: AtomicUsize::new(0),
        }
    }

    fn increment_count(&self) -> usize {
        self.count.fetch_add(1, Ordering::Relaxed)
    }

    /// Number of messages printed so far.
    pub fn get_count(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }
}

impl Write for &DebugWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.output.write(s.as_bytes());
        Ok(())
    }
}

static DEBUG_WRITER: AtomicPtr<DebugWriter> = AtomicPtr::new(ptr::null_mut());

/// Register the writer used by `debug!`. Replaces any previous writer.
pub fn set_debug_writer(writer: &'static DebugWriter) {
    DEBUG_WRITER.store(writer as *const DebugWriter as *mut DebugWriter, Ordering::Release);
}

fn debug_writer() -> Option<&'static DebugWriter> {
    let writer = DEBUG_WRITER.load(Ordering::Acquire);
    // Only `&'static DebugWriter` values are ever stored.
    unsafe { writer.as_ref() }
}

pub fn debug_print(args: fmt::Arguments) {
    if let Some(mut writer) = debug_writer() {
        writer.increment_count();
        let _ = writer.write_fmt(args);
    }
}

pub fn debug_println(args: fmt::Arguments) {
    if let Some(mut writer) = debug_writer() {
        writer.increment_count();
        let _ = writer.write_fmt(args);
        let _ = writer.write_str("\r\n");
    }
}

pub fn debug_verbose_println(args: fmt::Arguments, file_line: &(&'static str, u32)) {
    if let Some(mut writer) = debug_writer() {
        let count = writer.increment_count();
        let (file, line) = *file_line;
        let _ = writer.write_fmt(format_args!("TOCK_DEBUG({}): {}:{}: ", count, file, line));
        let _ = writer.write_fmt(args);
        let _ = writer.write_str("\r\n");
    }
}

/// In-kernel `println()` debugging.
#[macro_export]
macro_rules! debug {
    () => ({
        // Allow an empty debug!() to print the location when hit
        $crate::debug!("")
    });
    ($msg:expr $(,)?) => ({
        $crate::debug::debug_println(format_args!($msg));
    });
    ($fmt:expr, $($arg:tt)+) => ({
        $crate::debug::debug_println(format_args!($fmt, $($arg)+));
    });
}

/// In-kernel `println()` debugging that includes the message count, file
/// name, and line number.
#[macro_export]
macro_rules! debug_verbose {
    () => ({
        // Allow an empty debug_verbose!() to print the location when hit
        $crate::debug_verbose!("")
    });
    ($msg:expr $(,)?) => ({
        $crate::debug::debug_verbose_println(format_args!($msg), {
            static _FILE_LINE: (&'static str, u32) = (file!(), line!());
            &_FILE_LINE
        })
    });
    ($fmt:expr, $($arg:tt)+) => ({
        $crate::debug::debug_verbose_println(format_args!($fmt, $($arg)+), {
            static _FILE_LINE: (&'static str, u32) = (file!(), line!());
            &_FILE_LINE
        })
    });
}
