// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! LEDs for a board that has none.
//!
//! State changes are printed to the debug output when the kernel is built
//! with `trace_ticker`; otherwise the LED only keeps its state.

use std::cell::Cell;

use kernel::config::CONFIG;
use kernel::debug;
use kernel::hil::led::Led;

pub struct LogLed {
    name: &'static str,
    lit: Cell<bool>,
}

impl LogLed {
    pub fn new(name: &'static str) -> LogLed {
        LogLed {
            name,
            lit: Cell::new(false),
        }
    }

    fn set(&self, lit: bool) {
        self.lit.set(lit);
        if CONFIG.trace_ticker {
            debug!("{}: {}", self.name, if lit { "on" } else { "off" });
        }
    }
}

impl Led for LogLed {
    fn init(&self) {
        self.set(false);
    }

    fn on(&self) {
        self.set(true);
    }

    fn off(&self) {
        self.set(false);
    }

    fn toggle(&self) {
        self.set(!self.lit.get());
    }

    fn read(&self) -> bool {
        self.lit.get()
    }
}
