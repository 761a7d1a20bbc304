// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Ticker drift check running as a host process.
//!
//! The device side of the drift check talks key/value frames on stdin and
//! stdout; a host script on the other end of the pipe measures the drift
//! and returns the verdict. Debug output goes to stderr. The process exits
//! with a non-zero status if any scenario failed.

use std::cell::Cell;
use std::time::Duration;

use capsules_core::kv_link::KvLink;
use capsules_core::test::capsule_test::{CapsuleTest, CapsuleTestClient, CapsuleTestError};
use capsules_core::test::ticker_drift::{
    CountingClient, HandoffClient, TickerDriftTest, TriggerCounter,
};
use capsules_core::virtualizers::virtual_ticker::{MuxTicker, VirtualTicker};
use kernel::hil::led::Led;
use kernel::hil::time::Alarm;
use kernel::platform::chip::Chip;
use kernel::{debug, static_init};

mod io;
mod led;
mod serial;
mod timer;

use crate::led::LogLed;
use crate::serial::StdioSerial;
use crate::timer::{PosixChip, PosixTimer};

/// Ticker period for both scenarios.
const PERIOD_US: u32 = 1000;
/// Budget for one scenario, host exchange included.
const TEST_TIMEOUT_US: u32 = 240_000_000;
/// Longest the main loop sleeps between polls.
const MAX_IDLE: Duration = Duration::from_micros(200);

type Ticker = VirtualTicker<'static, PosixTimer<'static>>;
type DriftTest = TickerDriftTest<'static, Ticker, StdioSerial>;

//------------------------------------------------------------------------------
// TEST LAUNCHER FOR RUNNING TESTS
//------------------------------------------------------------------------------

struct TestLauncher {
    test_index: Cell<usize>,
    failures: Cell<usize>,
    tests: [&'static DriftTest; 2],
}

impl TestLauncher {
    fn new(tests: [&'static DriftTest; 2]) -> Self {
        Self {
            test_index: Cell::new(0),
            failures: Cell::new(0),
            tests,
        }
    }

    /// The scenario currently running, if any.
    fn current(&self) -> Option<&'static DriftTest> {
        self.test_index
            .get()
            .checked_sub(1)
            .and_then(|index| self.tests.get(index).copied())
    }

    fn finished(&self) -> bool {
        self.test_index.get() > self.tests.len()
    }

    fn next(&self) {
        let index = self.test_index.get();
        self.test_index.set(index + 1);
        match self.tests.get(index) {
            Some(test) => test.run(),
            None => debug!(
                "All tests finished: {} passed, {} failed.",
                self.tests.len() - self.failures.get(),
                self.failures.get()
            ),
        }
    }
}

impl CapsuleTestClient for TestLauncher {
    fn done(&self, result: Result<(), CapsuleTestError>) {
        if result.is_err() {
            self.failures.set(self.failures.get() + 1);
        }
        self.next();
    }
}

fn main() {
    io::init();

    // SAFETY: each static_init! below runs exactly once.
    let (launcher, chip, timer) = unsafe {
        let timer: &'static PosixTimer = static_init!(PosixTimer<'static>, PosixTimer::new());
        let chip: &'static PosixChip = static_init!(PosixChip<'static>, PosixChip::new(timer));
        let mux = static_init!(
            MuxTicker<'static, PosixTimer<'static>>,
            MuxTicker::new(timer)
        );
        timer.set_alarm_client(mux);

        let ticker1 = static_init!(Ticker, VirtualTicker::new(mux));
        ticker1.setup();
        let ticker2 = static_init!(Ticker, VirtualTicker::new(mux));
        ticker2.setup();

        let serial = static_init!(StdioSerial, StdioSerial::new());
        let link = static_init!(KvLink<'static, StdioSerial>, KvLink::new(serial));
        let counter = static_init!(TriggerCounter, TriggerCounter::new());

        // Timers: 1x ticker
        let counting = static_init!(CountingClient<'static>, CountingClient::new(counter));
        let one_ticker = static_init!(
            DriftTest,
            TickerDriftTest::new(
                "Timers: 1x ticker",
                link,
                counter,
                ticker1,
                counting,
                PERIOD_US,
                TEST_TIMEOUT_US,
            )
        );

        // Timers: 2x callbacks
        let led1: &'static LogLed = static_init!(LogLed, LogLed::new("led1"));
        let led2: &'static LogLed = static_init!(LogLed, LogLed::new("led2"));
        led1.init();
        led2.init();
        let switch_to_2 = static_init!(
            HandoffClient<'static, Ticker>,
            HandoffClient::new(counter, ticker1, ticker2, PERIOD_US, Some(led1))
        );
        let switch_to_1 = static_init!(
            HandoffClient<'static, Ticker>,
            HandoffClient::new(counter, ticker2, ticker1, PERIOD_US, Some(led2))
        );
        switch_to_2.set_next_client(switch_to_1);
        switch_to_1.set_next_client(switch_to_2);
        let two_tickers = static_init!(
            DriftTest,
            TickerDriftTest::new(
                "Timers: 2x callbacks",
                link,
                counter,
                ticker1,
                switch_to_2,
                PERIOD_US,
                TEST_TIMEOUT_US,
            )
        );
        two_tickers.set_partner(ticker2);
        two_tickers.set_handoff_clients(switch_to_2, switch_to_1);

        let launcher: &'static TestLauncher =
            static_init!(TestLauncher, TestLauncher::new([one_ticker, two_tickers]));
        one_ticker.set_client(launcher);
        two_tickers.set_client(launcher);

        (launcher, chip, timer)
    };

    launcher.next();
    while !launcher.finished() {
        chip.service_pending_interrupts();
        if let Some(test) = launcher.current() {
            test.poll();
        }
        let idle = timer
            .remaining_us()
            .map_or(MAX_IDLE, |us| MAX_IDLE.min(Duration::from_micros(u64::from(us))));
        std::thread::sleep(idle);
    }

    std::process::exit(if launcher.failures.get() == 0 { 0 } else { 1 });
}
