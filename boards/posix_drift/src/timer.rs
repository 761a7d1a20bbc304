// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Wall-clock alarm for the host.
//!
//! The counter is the number of microseconds since the timer was created,
//! truncated to 32 bits so it wraps like a hardware counter (about every
//! 71 minutes). There is no interrupt line: the alarm is pending once the
//! counter has reached the compare value, and the main loop delivers it
//! through [`PosixChip::service_pending_interrupts`].

use std::cell::Cell;
use std::time::Instant;

use kernel::hil::time::{Alarm, AlarmClient, Freq1MHz, Ticks, Ticks32, Time};
use kernel::platform::chip::Chip;
use kernel::ErrorCode;

pub struct PosixTimer<'a> {
    epoch: Instant,
    /// Counter value when the alarm was armed, and the compare value.
    armed: Cell<Option<(Ticks32, Ticks32)>>,
    client: Cell<Option<&'a dyn AlarmClient>>,
}

impl<'a> PosixTimer<'a> {
    pub fn new() -> PosixTimer<'a> {
        PosixTimer {
            epoch: Instant::now(),
            armed: Cell::new(None),
            client: Cell::new(None),
        }
    }

    /// Whether the armed compare value has been reached.
    pub fn is_pending(&self) -> bool {
        match self.armed.get() {
            Some((armed_at, expire)) => !self.now().within_range(armed_at, expire),
            None => false,
        }
    }

    /// Microseconds until the armed alarm is due, if one is armed.
    pub fn remaining_us(&self) -> Option<u32> {
        self.armed.get().map(|(_, expire)| {
            if self.is_pending() {
                0
            } else {
                expire.wrapping_sub(self.now()).into_u32()
            }
        })
    }

    pub fn handle_interrupt(&self) {
        if !self.is_pending() {
            return;
        }
        self.armed.set(None);
        if let Some(client) = self.client.get() {
            client.alarm();
        }
    }
}

impl Time for PosixTimer<'_> {
    type Frequency = Freq1MHz;
    type Ticks = Ticks32;

    fn now(&self) -> Ticks32 {
        Ticks32::from(self.epoch.elapsed().as_micros() as u32)
    }
}

impl<'a> Alarm<'a> for PosixTimer<'a> {
    fn set_alarm_client(&self, client: &'a dyn AlarmClient) {
        self.client.set(Some(client));
    }

    fn set_alarm(&self, reference: Ticks32, dt: Ticks32) {
        let mut expire = reference.wrapping_add(dt);
        let now = self.now();
        if !now.within_range(reference, expire) {
            expire = now;
        }

        if expire.wrapping_sub(now) < self.minimum_dt() {
            expire = now.wrapping_add(self.minimum_dt());
        }

        self.armed.set(Some((now, expire)));
    }

    fn get_alarm(&self) -> Ticks32 {
        self.armed
            .get()
            .map_or(Ticks32::from(0), |(_, expire)| expire)
    }

    fn disarm(&self) -> Result<(), ErrorCode> {
        self.armed.set(None);
        Ok(())
    }

    fn is_armed(&self) -> bool {
        self.armed.get().is_some()
    }

    fn minimum_dt(&self) -> Ticks32 {
        Ticks32::from(1)
    }
}

/// The host "chip": one alarm, serviced from the main loop.
pub struct PosixChip<'a> {
    timer: &'a PosixTimer<'a>,
}

impl<'a> PosixChip<'a> {
    pub fn new(timer: &'a PosixTimer<'a>) -> PosixChip<'a> {
        PosixChip { timer }
    }
}

impl Chip for PosixChip<'_> {
    fn service_pending_interrupts(&self) {
        while self.has_pending_interrupts() {
            self.timer.handle_interrupt();
        }
    }

    fn has_pending_interrupts(&self) -> bool {
        self.timer.is_pending()
    }

    fn atomic<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        // Interrupts are only delivered from `service_pending_interrupts`
        // on this thread, so nothing can preempt `f`.
        f()
    }
}
