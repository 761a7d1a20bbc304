// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! An LED that only remembers its state.

use core::cell::Cell;

use kernel::hil::led::Led;

#[derive(Default)]
pub struct SimLed {
    on: Cell<bool>,
    toggles: Cell<usize>,
}

impl SimLed {
    pub fn new() -> SimLed {
        SimLed::default()
    }

    /// Number of state changes since creation.
    pub fn toggles(&self) -> usize {
        self.toggles.get()
    }

    fn set(&self, on: bool) {
        if self.on.get() != on {
            self.toggles.set(self.toggles.get() + 1);
        }
        self.on.set(on);
    }
}

impl Led for SimLed {
    fn init(&self) {
        self.on.set(false);
    }

    fn on(&self) {
        self.set(true);
    }

    fn off(&self) {
        self.set(false);
    }

    fn toggle(&self) {
        self.set(!self.on.get());
    }

    fn read(&self) -> bool {
        self.on.get()
    }
}
