// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Virtualize one hardware alarm into any number of periodic tickers.
//!
//! `MuxTicker` owns the hardware alarm. Each `VirtualTicker` registered with
//! it is an independent periodic callback source implementing
//! [`Ticker`](kernel::hil::ticker::Ticker). The hardware compare value is
//! always programmed for the attached ticker that is due soonest; when the
//! alarm fires, every due ticker is dispatched before the hardware is armed
//! again, so tickers whose periods coincide share one interrupt.
//!
//! Usage
//! -----
//!
//! ```rust,ignore
//! # use kernel::static_init;
//! let mux = static_init!(MuxTicker<'static, Rtc>, MuxTicker::new(&rtc));
//! rtc.set_alarm_client(mux);
//!
//! let ticker = static_init!(
//!     VirtualTicker<'static, Rtc>,
//!     VirtualTicker::new(mux)
//! );
//! ticker.setup();
//! ticker.attach_us(client, 1000)?;
//! ```
//!
//! Timing
//! ------
//!
//! A ticker fires on a fixed grid: the n-th call is due at
//! `reference + n * period`, where `reference` is the attach instant.
//! Late dispatch never shifts the grid and never drops a period. If the
//! alarm was serviced late (interrupts disabled, a slow callback), the
//! missed periods are delivered back to back, one per dispatch round, until
//! the ticker is caught up. At most `MAX_DISPATCH_ROUNDS` rounds run per
//! interrupt; any remainder is delivered from an immediately re-armed alarm
//! so foreground code gets to run in between.
//!
//! All due-time comparisons are modular in the counter width, which is why
//! a period must be shorter than half the counter range.

use core::cell::Cell;

use kernel::collections::list::{List, ListLink, ListNode};
use kernel::config::CONFIG;
use kernel::debug;
use kernel::hil::ticker::{Ticker, TickerClient};
use kernel::hil::time::{self, Alarm, ConvertTicks, Ticks, Time};
use kernel::ErrorCode;

/// Maximum number of dispatch rounds serviced in one alarm interrupt.
pub const MAX_DISPATCH_ROUNDS: usize = 64;

/// Position of an attached ticker on its firing grid.
#[derive(Clone, Copy, Debug)]
struct Schedule<T: Ticks> {
    /// Counter value the current period started at.
    reference: T,
    /// Period length in ticks.
    dt: T,
}

impl<T: Ticks> Schedule<T> {
    fn expiration(&self) -> T {
        self.reference.wrapping_add(self.dt)
    }

    fn is_due(&self, now: T) -> bool {
        !now.within_range(self.reference, self.expiration())
    }

    fn remaining(&self, now: T) -> T {
        if self.is_due(now) {
            T::from(0)
        } else {
            self.expiration().wrapping_sub(now)
        }
    }

    fn advanced(self) -> Self {
        Schedule {
            reference: self.expiration(),
            dt: self.dt,
        }
    }
}

pub struct VirtualTicker<'a, A: Alarm<'a>> {
    mux: &'a MuxTicker<'a, A>,
    /// `Some` exactly while the ticker is attached.
    schedule: Cell<Option<Schedule<A::Ticks>>>,
    period_us: Cell<u32>,
    /// Bumped on every attach and detach so dispatch can tell whether a
    /// client re-scheduled its own ticker from inside `tick()`.
    epoch: Cell<usize>,
    registered: Cell<bool>,
    next: ListLink<'a, VirtualTicker<'a, A>>,
    client: Cell<Option<&'a dyn TickerClient>>,
}

impl<'a, A: Alarm<'a>> ListNode<'a, VirtualTicker<'a, A>> for VirtualTicker<'a, A> {
    fn next(&'a self) -> &'a ListLink<'a, VirtualTicker<'a, A>> {
        &self.next
    }
}

impl<'a, A: Alarm<'a>> VirtualTicker<'a, A> {
    /// After calling new, always call setup()
    pub fn new(mux_ticker: &'a MuxTicker<'a, A>) -> VirtualTicker<'a, A> {
        VirtualTicker {
            mux: mux_ticker,
            schedule: Cell::new(None),
            period_us: Cell::new(0),
            epoch: Cell::new(0),
            registered: Cell::new(false),
            next: ListLink::empty(),
            client: Cell::new(None),
        }
    }

    /// Call this method immediately after new() to link this to the mux,
    /// otherwise the ticker cannot be attached. Calling it again has no
    /// effect.
    pub fn setup(&'a self) {
        if !self.mux.tickers.contains(self) {
            self.mux.tickers.push_tail(self);
        }
        self.registered.set(true);
    }

    /// Invoke the client if this ticker is attached and due at `now`, then
    /// move it to its next period. Returns whether the client was called.
    fn dispatch(&self, now: A::Ticks) -> bool {
        // Checked right before the call: an earlier callback in this round
        // may have detached us.
        let schedule = match self.schedule.get() {
            Some(schedule) if schedule.is_due(now) => schedule,
            _ => return false,
        };
        let epoch = self.epoch.get();

        if let Some(client) = self.client.get() {
            client.tick();
        }

        // A client that detached or re-attached its own ticker has already
        // set the schedule it wants.
        if self.epoch.get() == epoch {
            self.schedule.set(Some(schedule.advanced()));
        }
        true
    }

    fn bump_epoch(&self) {
        self.epoch.set(self.epoch.get().wrapping_add(1));
    }
}

impl<'a, A: Alarm<'a>> Time for VirtualTicker<'a, A> {
    type Frequency = A::Frequency;
    type Ticks = A::Ticks;

    fn now(&self) -> Self::Ticks {
        self.mux.alarm.now()
    }
}

impl<'a, A: Alarm<'a>> Ticker<'a> for VirtualTicker<'a, A> {
    fn attach_from(
        &self,
        reference: Self::Ticks,
        client: &'a dyn TickerClient,
        period_us: u32,
    ) -> Result<(), ErrorCode> {
        if !self.registered.get() {
            return Err(ErrorCode::RESERVE);
        }
        let dt = self.mux.period_to_ticks(period_us)?;

        self.client.set(Some(client));
        self.period_us.set(period_us);
        self.bump_epoch();
        self.schedule.set(Some(Schedule { reference, dt }));
        if CONFIG.trace_ticker {
            debug!(
                "ticker: attach {}us ({:?} ticks) from {:?}",
                period_us, dt, reference
            );
        }

        self.mux.rearm();
        Ok(())
    }

    fn detach(&self) {
        if self.schedule.take().is_some() {
            self.bump_epoch();
            if CONFIG.trace_ticker {
                debug!("ticker: detach at {:?}", self.now());
            }
            self.mux.rearm();
        }
        self.client.set(None);
    }

    fn is_attached(&self) -> bool {
        self.schedule.get().is_some()
    }

    fn period_us(&self) -> Option<u32> {
        self.schedule.get().map(|_| self.period_us.get())
    }

    fn next_fire(&self) -> Option<Self::Ticks> {
        self.schedule.get().map(|schedule| schedule.expiration())
    }
}

/// Structure to control a set of periodic tickers multiplexed on top of a
/// single hardware alarm.
pub struct MuxTicker<'a, A: Alarm<'a>> {
    tickers: List<'a, VirtualTicker<'a, A>>,
    /// Set while callbacks are running; rearming is deferred to the end of
    /// the dispatch.
    dispatching: Cell<bool>,
    alarm: &'a A,
}

impl<'a, A: Alarm<'a>> MuxTicker<'a, A> {
    pub const fn new(alarm: &'a A) -> MuxTicker<'a, A> {
        MuxTicker {
            tickers: List::new(),
            dispatching: Cell::new(false),
            alarm,
        }
    }

    /// Number of tickers currently attached.
    pub fn attached_count(&self) -> usize {
        self.tickers
            .iter()
            .filter(|ticker| ticker.is_attached())
            .count()
    }

    fn period_to_ticks(&self, period_us: u32) -> Result<A::Ticks, ErrorCode> {
        if period_us == 0 {
            return Err(ErrorCode::INVAL);
        }
        let dt = self.alarm.ticks_from_us(period_us);
        if dt == A::Ticks::from(0) || dt < self.alarm.minimum_dt() {
            return Err(ErrorCode::NOSUPPORT);
        }
        if dt >= A::Ticks::half_max_value() {
            return Err(ErrorCode::SIZE);
        }
        Ok(dt)
    }

    /// Program the hardware for the attached ticker due soonest, or disarm
    /// it if nothing is attached.
    fn rearm(&self) {
        if self.dispatching.get() {
            return;
        }
        let now = self.alarm.now();
        let earliest = self
            .tickers
            .iter()
            .filter_map(|ticker| ticker.schedule.get())
            .min_by_key(|schedule| schedule.remaining(now));

        match earliest {
            // A reference in the past makes the hardware fire right away.
            Some(schedule) => self.alarm.set_alarm(schedule.reference, schedule.dt),
            None => {
                // An alarm that still slips through finds nothing due.
                let _ = self.alarm.disarm();
            }
        }
    }
}

impl<'a, A: Alarm<'a>> time::AlarmClient for MuxTicker<'a, A> {
    fn alarm(&self) {
        self.dispatching.set(true);

        let mut rounds = 0;
        loop {
            let now = self.alarm.now();
            let mut fired = 0;
            for ticker in self.tickers.iter() {
                if ticker.dispatch(now) {
                    fired += 1;
                }
            }
            rounds += 1;

            if fired == 0 {
                break;
            }
            if CONFIG.trace_ticker {
                debug!("ticker: round {} at {:?} fired {}", rounds, now, fired);
            }
            if rounds == MAX_DISPATCH_ROUNDS {
                if CONFIG.trace_ticker {
                    debug!("ticker: catch-up continues in next interrupt");
                }
                break;
            }
        }

        self.dispatching.set(false);
        self.rearm();
    }
}
