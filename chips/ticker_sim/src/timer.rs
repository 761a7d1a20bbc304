// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Simulated free-running timer with one compare alarm.
//!
//! The register block follows a typical microcontroller timer: a counter
//! that wraps at the width of `T`, one alarm compare register that arms
//! itself when written and disarms itself when it fires, a raw interrupt
//! register and an interrupt enable register. Time only moves when the
//! test calls [`SimTimer::advance`], which stops exactly at the compare
//! value so every alarm fires on the tick it was set for.
//!
//! A fired alarm whose interrupt is masked (see [`SimTimer::mask`]) stays
//! pending in `INTR` until it is unmasked or serviced, like an interrupt
//! held off by a critical section.

use core::cell::Cell;
use core::marker::PhantomData;

use kernel::hil::time::{Alarm, AlarmClient, Frequency, Ticks, Time};
use kernel::utilities::registers::interfaces::{ReadWriteable, Readable, Writeable};
use kernel::utilities::registers::{register_bitfields, InMemoryRegister};
use kernel::ErrorCode;

register_bitfields![u32,
    ARMED [
        ALARM OFFSET(0) NUMBITS(1) []
    ],
    INTR [
        ALARM OFFSET(0) NUMBITS(1) []
    ],
    INTE [
        ALARM OFFSET(0) NUMBITS(1) []
    ]
];

struct SimTimerRegisters {
    /// Current counter value, masked to the tick width.
    counter: InMemoryRegister<u32>,
    /// Compare value. Writing it arms the alarm.
    alarm: InMemoryRegister<u32>,
    /// Alarm armed status. Cleared when the alarm fires.
    armed: InMemoryRegister<u32, ARMED::Register>,
    /// Raw interrupts.
    intr: InMemoryRegister<u32, INTR::Register>,
    /// Interrupt enable.
    inte: InMemoryRegister<u32, INTE::Register>,
}

pub struct SimTimer<'a, T: Ticks, F: Frequency> {
    registers: SimTimerRegisters,
    minimum_dt: T,
    /// Nesting depth of `mask()` calls.
    masked: Cell<usize>,
    elapsed: Cell<u64>,
    fired: Cell<usize>,
    client: Cell<Option<&'a dyn AlarmClient>>,
    _frequency: PhantomData<F>,
}

impl<'a, T: Ticks, F: Frequency> SimTimer<'a, T, F> {
    /// A timer whose counter starts at zero.
    pub fn new(minimum_dt: u32) -> SimTimer<'a, T, F> {
        Self::starting_at(0, minimum_dt)
    }

    /// A timer whose counter starts at `counter`, e.g. just below the wrap
    /// point. A `minimum_dt` of zero is raised to one tick.
    pub fn starting_at(counter: u32, minimum_dt: u32) -> SimTimer<'a, T, F> {
        SimTimer {
            registers: SimTimerRegisters {
                counter: InMemoryRegister::new(T::from(counter).into_u32()),
                alarm: InMemoryRegister::new(0),
                armed: InMemoryRegister::new(0),
                intr: InMemoryRegister::new(0),
                inte: InMemoryRegister::new(0),
            },
            minimum_dt: T::from(minimum_dt.max(1)),
            masked: Cell::new(0),
            elapsed: Cell::new(0),
            fired: Cell::new(0),
            client: Cell::new(None),
            _frequency: PhantomData,
        }
    }

    /// Total ticks advanced since creation, not wrapped.
    pub fn elapsed(&self) -> u64 {
        self.elapsed.get()
    }

    /// Number of times the alarm has fired.
    pub fn fired(&self) -> usize {
        self.fired.get()
    }

    /// Run the counter forward by `ticks`, firing the alarm each time the
    /// counter reaches an armed compare value.
    ///
    /// Must not be called from inside an alarm callback.
    pub fn advance(&self, ticks: u64) {
        let mut remaining = ticks;
        while self.registers.armed.is_set(ARMED::ALARM) {
            let now = self.now();
            let distance = T::from(self.registers.alarm.get())
                .wrapping_sub(now)
                .into_u64();
            if distance > remaining {
                break;
            }
            remaining -= distance;
            self.step(distance);
            self.fire();
        }
        self.step(remaining);
    }

    /// Run the counter forward by a number of microseconds.
    pub fn advance_us(&self, us: u64) {
        self.advance(us * u64::from(F::frequency()) / 1_000_000);
    }

    fn step(&self, ticks: u64) {
        let mut left = ticks;
        while left > 0 {
            let chunk = left.min(u64::from(u32::MAX));
            // `T::from` masks to the counter width, so the sum wraps there.
            let next = self.now().wrapping_add(T::from(chunk as u32));
            self.registers.counter.set(next.into_u32());
            left -= chunk;
        }
        self.elapsed.set(self.elapsed.get() + ticks);
    }

    fn fire(&self) {
        self.registers.armed.modify(ARMED::ALARM::CLEAR);
        self.registers.intr.modify(INTR::ALARM::SET);
        self.fired.set(self.fired.get() + 1);
        if self.masked.get() == 0 {
            self.handle_interrupt();
        }
    }

    /// Whether a raised interrupt is waiting to be serviced.
    pub fn is_pending(&self) -> bool {
        self.registers.intr.is_set(INTR::ALARM) && self.registers.inte.is_set(INTE::ALARM)
    }

    /// Defer interrupt delivery. Nests.
    pub fn mask(&self) {
        self.masked.set(self.masked.get() + 1);
    }

    /// Undo one `mask()`; the outermost one delivers a pending interrupt.
    pub fn unmask(&self) {
        let depth = self.masked.get().saturating_sub(1);
        self.masked.set(depth);
        if depth == 0 {
            self.handle_interrupt();
        }
    }

    /// Bottom half: acknowledge a pending interrupt and call the client.
    pub fn handle_interrupt(&self) {
        if !self.is_pending() {
            return;
        }
        self.registers.intr.modify(INTR::ALARM::CLEAR);
        self.registers.inte.modify(INTE::ALARM::CLEAR);
        if let Some(client) = self.client.get() {
            client.alarm();
        }
    }
}

impl<T: Ticks, F: Frequency> Time for SimTimer<'_, T, F> {
    type Frequency = F;
    type Ticks = T;

    fn now(&self) -> T {
        T::from(self.registers.counter.get())
    }
}

impl<'a, T: Ticks, F: Frequency> Alarm<'a> for SimTimer<'a, T, F> {
    fn set_alarm_client(&self, client: &'a dyn AlarmClient) {
        self.client.set(Some(client));
    }

    fn set_alarm(&self, reference: T, dt: T) {
        let mut expire = reference.wrapping_add(dt);
        let now = self.now();
        if !now.within_range(reference, expire) {
            expire = now;
        }

        if expire.wrapping_sub(now) < self.minimum_dt() {
            expire = now.wrapping_add(self.minimum_dt());
        }

        self.registers.intr.modify(INTR::ALARM::CLEAR);
        self.registers.alarm.set(expire.into_u32());
        self.registers.armed.write(ARMED::ALARM::SET);
        self.registers.inte.modify(INTE::ALARM::SET);
    }

    fn get_alarm(&self) -> T {
        T::from(self.registers.alarm.get())
    }

    fn disarm(&self) -> Result<(), ErrorCode> {
        self.registers.armed.write(ARMED::ALARM::CLEAR);
        self.registers.intr.modify(INTR::ALARM::CLEAR);
        self.registers.inte.modify(INTE::ALARM::CLEAR);
        Ok(())
    }

    fn is_armed(&self) -> bool {
        self.registers.armed.is_set(ARMED::ALARM)
    }

    fn minimum_dt(&self) -> T {
        self.minimum_dt
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use kernel::hil::time::{Freq1MHz, Ticks24, Ticks32};

    struct Count(Cell<usize>);

    impl AlarmClient for Count {
        fn alarm(&self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn fires_on_compare_match() {
        let timer = SimTimer::<Ticks32, Freq1MHz>::new(1);
        let count = Count(Cell::new(0));
        timer.set_alarm_client(&count);

        timer.set_alarm(Ticks32::from(0), Ticks32::from(100));
        assert!(timer.is_armed());
        timer.advance(99);
        assert_eq!(count.0.get(), 0);
        timer.advance(1);
        assert_eq!(count.0.get(), 1);
        assert!(!timer.is_armed());
        timer.advance(1000);
        assert_eq!(count.0.get(), 1);
        assert_eq!(timer.elapsed(), 1100);
    }

    #[test]
    fn past_reference_fires_after_minimum_dt() {
        let timer = SimTimer::<Ticks32, Freq1MHz>::new(5);
        let count = Count(Cell::new(0));
        timer.set_alarm_client(&count);

        timer.advance(1000);
        timer.set_alarm(Ticks32::from(0), Ticks32::from(10));
        assert_eq!(timer.get_alarm(), Ticks32::from(1005));
        timer.advance(5);
        assert_eq!(count.0.get(), 1);
    }

    #[test]
    fn masked_interrupt_stays_pending() {
        let timer = SimTimer::<Ticks32, Freq1MHz>::new(1);
        let count = Count(Cell::new(0));
        timer.set_alarm_client(&count);

        timer.set_alarm(timer.now(), Ticks32::from(10));
        timer.mask();
        timer.mask();
        timer.advance(50);
        assert!(timer.is_pending());
        timer.unmask();
        assert_eq!(count.0.get(), 0);
        timer.unmask();
        assert_eq!(count.0.get(), 1);
        assert!(!timer.is_pending());
    }

    #[test]
    fn disarm_drops_pending_interrupt() {
        let timer = SimTimer::<Ticks32, Freq1MHz>::new(1);
        let count = Count(Cell::new(0));
        timer.set_alarm_client(&count);

        timer.set_alarm(timer.now(), Ticks32::from(10));
        timer.mask();
        timer.advance(10);
        timer.disarm().unwrap();
        timer.unmask();
        assert_eq!(count.0.get(), 0);
    }

    #[test]
    fn counter_wraps_at_width() {
        let timer = SimTimer::<Ticks24, Freq1MHz>::starting_at(0xFF_FFF0, 1);
        let count = Count(Cell::new(0));
        timer.set_alarm_client(&count);

        timer.set_alarm(timer.now(), Ticks24::from(0x20));
        assert_eq!(timer.get_alarm(), Ticks24::from(0x10));
        timer.advance(0x20);
        assert_eq!(count.0.get(), 1);
        assert_eq!(timer.now(), Ticks24::from(0x10));

        timer.advance(0x100_0000);
        assert_eq!(timer.now(), Ticks24::from(0x10));
    }
}
