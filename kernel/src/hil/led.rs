// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Interface for LEDs that abstract away polarity and pin.

pub trait Led {
    /// Initialize the LED. Must be called before the LED is used.
    fn init(&self);

    /// Turn the LED on.
    fn on(&self);

    /// Turn the LED off.
    fn off(&self);

    /// Toggle the LED.
    fn toggle(&self);

    /// Return the current state of the LED.
    fn read(&self) -> bool;
}
