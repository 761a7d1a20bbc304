// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Interface for periodic callbacks.
//!
//! A `Ticker` invokes its client once per elapsed period, indefinitely, until
//! it is detached. Callbacks are delivered from the interrupt bottom half of
//! the underlying alarm, so clients must be short and must not block.

use crate::hil::time::Time;
use crate::ErrorCode;

/// Receiver of periodic ticks.
pub trait TickerClient {
    /// Called once for every elapsed period.
    fn tick(&self);
}

/// A periodic callback source bound to a hardware alarm.
///
/// Tickers start out inert: no client and no schedule. `attach_us` activates
/// the ticker; it then stays active until `detach` is called. Re-attaching a
/// detached ticker (or an attached one) restarts its period from the new
/// reference.
pub trait Ticker<'a>: Time {
    /// Start invoking `client` every `period_us` microseconds, with the
    /// first call one period from now.
    ///
    /// Returns
    /// - `Err(ErrorCode::INVAL)` if `period_us` is zero,
    /// - `Err(ErrorCode::NOSUPPORT)` if the period is shorter than the
    ///   resolution of the underlying alarm,
    /// - `Err(ErrorCode::SIZE)` if the period is too long for the width of
    ///   the underlying counter,
    /// - `Err(ErrorCode::RESERVE)` if the ticker was never registered with
    ///   the component multiplexing the alarm.
    fn attach_us(&self, client: &'a dyn TickerClient, period_us: u32) -> Result<(), ErrorCode> {
        self.attach_from(self.now(), client, period_us)
    }

    /// Same as `attach_us`, except that the first call happens one period
    /// after `reference` rather than one period after now. A `reference`
    /// far enough in the past makes the first call immediate.
    fn attach_from(
        &self,
        reference: Self::Ticks,
        client: &'a dyn TickerClient,
        period_us: u32,
    ) -> Result<(), ErrorCode>;

    /// Stop invoking the client. Idempotent. Once this returns the client
    /// will not be called again until the ticker is re-attached.
    fn detach(&self);

    /// Whether the ticker is currently attached.
    fn is_attached(&self) -> bool;

    /// The period the ticker was attached with, if attached.
    fn period_us(&self) -> Option<u32>;

    /// The counter value at which the client is next due, if attached.
    ///
    /// While the client is being called this is the value that made the
    /// current call due.
    fn next_fire(&self) -> Option<Self::Ticks>;
}
