// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Interfaces for implementing microcontrollers in Tock.

/// Interface for individual MCUs.
///
/// Interrupts are handled in two halves. The top half only records that an
/// interrupt happened. The kernel loop later calls
/// `service_pending_interrupts`, which runs the bottom half, i.e. the
/// peripheral's `handle_interrupt` and the client callbacks above it. All
/// `AlarmClient` and `TickerClient` callbacks run from there, so they never
/// interleave with foreground code running outside of it.
pub trait Chip {
    /// Looks up which interrupts are pending and calls the relevant
    /// bottom-half handlers.
    fn service_pending_interrupts(&self);

    /// Returns `true` if any interrupts are pending that need to be
    /// serviced.
    fn has_pending_interrupts(&self) -> bool;

    /// Run a function with interrupt delivery deferred. Interrupts raised
    /// while `f` runs stay pending and are delivered once it returns.
    fn atomic<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R;
}
