// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! A simulated chip for exercising timer-driven capsules on the host.
//!
//! Time is virtual: it moves only when a test advances the timer, so runs
//! are exact and repeatable regardless of host load.

pub mod chip;
pub mod led;
pub mod serial;
pub mod timer;
