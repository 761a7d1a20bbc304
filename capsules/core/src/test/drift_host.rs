// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! The measuring side of the ticker drift check.
//!
//! `DriftHost` drives a [`TickerDriftTest`](super::ticker_drift) running on
//! the other end of a key/value link: it requests the two samples a
//! measurement window apart, compares the device-elapsed time with its own
//! clock and sends back the verdict. The caller supplies its wall-clock time
//! in microseconds on every poll.

use core::cell::Cell;

use crate::kv_link::KvLink;
use crate::test::ticker_drift::{BASE_TIME_KEY, FAIL_KEY, FINAL_TIME_KEY, PASS_KEY, START_KEY};
use kernel::debug;
use kernel::hil::serial::PollingSerial;
use kernel::ErrorCode;

/// Longest key the host accepts; fits every key the device sends.
pub const HOST_KEY_LEN: usize = 32;

/// The host's end of the link.
pub type HostLink<'a, S> = KvLink<'a, S, HOST_KEY_LEN>;

/// Difference between device-elapsed and wall-clock-elapsed time.
///
/// `base` and `final_` are device samples (`count * period`); their
/// difference is taken modulo 2^32 so a wrapped sample still yields the
/// right interval. `transport_delay_us` is subtracted from the wall-clock
/// measurement. Positive drift means the device ran fast.
pub fn drift_us(base: u32, final_: u32, wall_elapsed_us: u64, transport_delay_us: u64) -> i64 {
    let device = i64::from(final_.wrapping_sub(base));
    let wall = i64::try_from(wall_elapsed_us.saturating_sub(transport_delay_us)).unwrap_or(i64::MAX);
    device - wall
}

/// Verdict key for a drift: `"pass"` if `|drift| <= tolerance_us`.
pub fn verdict(drift: i64, tolerance_us: u64) -> &'static str {
    if drift.unsigned_abs() <= tolerance_us {
        PASS_KEY
    } else {
        FAIL_KEY
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriftHostState {
    AwaitingStart,
    AwaitingBaseSample,
    Measuring,
    AwaitingFinalSample,
    Done,
}

pub struct DriftHost<'a, S: PollingSerial> {
    link: &'a HostLink<'a, S>,
    window_us: u64,
    tolerance_us: u64,
    transport_delay_us: u64,
    state: Cell<DriftHostState>,
    base_sample: Cell<u32>,
    base_at: Cell<u64>,
    final_sample: Cell<Option<u32>>,
    drift: Cell<Option<i64>>,
}

impl<'a, S: PollingSerial> DriftHost<'a, S> {
    pub fn new(
        link: &'a HostLink<'a, S>,
        window_us: u64,
        tolerance_us: u64,
        transport_delay_us: u64,
    ) -> DriftHost<'a, S> {
        DriftHost {
            link,
            window_us,
            tolerance_us,
            transport_delay_us,
            state: Cell::new(DriftHostState::AwaitingStart),
            base_sample: Cell::new(0),
            base_at: Cell::new(0),
            final_sample: Cell::new(None),
            drift: Cell::new(None),
        }
    }

    pub fn state(&self) -> DriftHostState {
        self.state.get()
    }

    /// Drift measured in the last run, once the final sample arrived.
    pub fn drift(&self) -> Option<i64> {
        self.drift.get()
    }

    /// The `(base_time, final_time)` samples of the last run.
    pub fn samples(&self) -> Option<(u32, u32)> {
        self.final_sample
            .get()
            .map(|final_sample| (self.base_sample.get(), final_sample))
    }

    /// Wait for the next start message.
    pub fn reset(&self) {
        self.state.set(DriftHostState::AwaitingStart);
        self.final_sample.set(None);
        self.drift.set(None);
    }

    /// Advance the exchange. `now_us` is the host's wall clock.
    pub fn poll(&self, now_us: u64) -> Result<(), ErrorCode> {
        match self.state.get() {
            DriftHostState::AwaitingStart => {
                while let Some(message) = self.link.receive() {
                    if message.key() == START_KEY {
                        self.link.send(BASE_TIME_KEY, 0)?;
                        self.state.set(DriftHostState::AwaitingBaseSample);
                        break;
                    }
                }
            }
            DriftHostState::AwaitingBaseSample => {
                while let Some(message) = self.link.receive() {
                    if message.key() != BASE_TIME_KEY {
                        continue;
                    }
                    // An unreadable sample is dropped; the device cannot
                    // tell a verdict from a final request at this point.
                    if let Ok(sample) = message.value().parse::<u32>() {
                        self.base_sample.set(sample);
                        self.base_at.set(now_us);
                        self.state.set(DriftHostState::Measuring);
                        break;
                    }
                    debug!("drift host: dropping base sample {:?}", message);
                }
            }
            DriftHostState::Measuring => {
                if now_us.saturating_sub(self.base_at.get()) >= self.window_us {
                    self.link.send(FINAL_TIME_KEY, 0)?;
                    self.state.set(DriftHostState::AwaitingFinalSample);
                }
            }
            DriftHostState::AwaitingFinalSample => {
                while let Some(message) = self.link.receive() {
                    if message.key() != FINAL_TIME_KEY {
                        continue;
                    }
                    let key = match message.value().parse::<u32>() {
                        Ok(sample) => {
                            self.final_sample.set(Some(sample));
                            let wall = now_us.saturating_sub(self.base_at.get());
                            let drift = drift_us(
                                self.base_sample.get(),
                                sample,
                                wall,
                                self.transport_delay_us,
                            );
                            debug!(
                                "drift host: device {}us, wall {}us, drift {}us",
                                sample.wrapping_sub(self.base_sample.get()),
                                wall,
                                drift
                            );
                            self.drift.set(Some(drift));
                            verdict(drift, self.tolerance_us)
                        }
                        Err(_) => FAIL_KEY,
                    };
                    self.conclude(key)?;
                    break;
                }
            }
            DriftHostState::Done => {}
        }
        Ok(())
    }

    fn conclude(&self, key: &str) -> Result<(), ErrorCode> {
        self.state.set(DriftHostState::Done);
        self.link.send(key, 0)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use ticker_sim::serial::SimLink;

    #[test]
    fn drift_is_device_minus_wall() {
        assert_eq!(drift_us(1000, 11_000, 10_000, 0), 0);
        assert_eq!(drift_us(1000, 11_000, 10_250, 200), -50);
        assert_eq!(drift_us(0, 10_000, 9_000, 0), 1000);
        // Wrapped sample.
        assert_eq!(drift_us(u32::MAX - 499, 500, 1000, 0), 0);
    }

    #[test]
    fn verdict_applies_tolerance() {
        assert_eq!(verdict(0, 0), "pass");
        assert_eq!(verdict(-500, 500), "pass");
        assert_eq!(verdict(501, 500), "fail");
        assert_eq!(verdict(i64::MIN, u64::MAX), "pass");
    }

    #[test]
    fn malformed_base_sample_is_dropped() {
        let wire = SimLink::new();
        let device_port = wire.device();
        let host_port = wire.host();
        let device_link = KvLink::new(&device_port);
        let host_link = HostLink::with_key_capacity(&host_port);
        let host = DriftHost::new(&host_link, 1000, 100, 0);

        device_link.send(START_KEY, 0).unwrap();
        host.poll(0).unwrap();
        assert_eq!(host.state(), DriftHostState::AwaitingBaseSample);
        assert_eq!(device_link.receive().unwrap().key(), BASE_TIME_KEY);

        device_link.send(BASE_TIME_KEY, "12ab").unwrap();
        host.poll(10).unwrap();
        assert_eq!(host.state(), DriftHostState::AwaitingBaseSample);
        assert!(device_link.receive().is_none());

        device_link.send(BASE_TIME_KEY, 3000).unwrap();
        host.poll(20).unwrap();
        assert_eq!(host.state(), DriftHostState::Measuring);

        host.poll(1020).unwrap();
        assert_eq!(host.state(), DriftHostState::AwaitingFinalSample);
        assert_eq!(device_link.receive().unwrap().key(), FINAL_TIME_KEY);

        device_link.send(FINAL_TIME_KEY, 4000).unwrap();
        host.poll(1100).unwrap();
        assert_eq!(host.state(), DriftHostState::Done);
        assert_eq!(host.samples(), Some((3000, 4000)));
        assert_eq!(host.drift(), Some(-80));
        assert_eq!(device_link.receive().unwrap().key(), PASS_KEY);
    }
}
