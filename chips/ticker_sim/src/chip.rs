// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Chip trait setup.

use kernel::hil::time::{Frequency, Ticks};
use kernel::platform::chip::Chip;

use crate::timer::SimTimer;

pub struct SimChip<'a, T: Ticks, F: Frequency> {
    pub timer: &'a SimTimer<'a, T, F>,
}

impl<'a, T: Ticks, F: Frequency> SimChip<'a, T, F> {
    pub fn new(timer: &'a SimTimer<'a, T, F>) -> SimChip<'a, T, F> {
        SimChip { timer }
    }
}

impl<T: Ticks, F: Frequency> Chip for SimChip<'_, T, F> {
    fn service_pending_interrupts(&self) {
        while self.has_pending_interrupts() {
            self.timer.handle_interrupt();
        }
    }

    fn has_pending_interrupts(&self) -> bool {
        self.timer.is_pending()
    }

    fn atomic<F2, R>(&self, f: F2) -> R
    where
        F2: FnOnce() -> R,
    {
        self.timer.mask();
        let r = f();
        self.timer.unmask();
        r
    }
}
