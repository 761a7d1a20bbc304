// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Core kernel for periodic timer callbacks.
//!
//! The kernel crate holds the Hardware Interface Layer (HIL) definitions
//! that chips implement and capsules build on (time and alarms, tickers,
//! polled serial links, LEDs), together with the shared infrastructure they
//! use: the error type, in-kernel debugging output, compile-time
//! configuration, intrusive collections, and the chip interface for
//! interrupt servicing.
//!
//! Most `unsafe` code is in this kernel crate.

#![warn(unreachable_pub)]
#![no_std]

pub mod collections;
pub mod config;
#[macro_use]
pub mod debug;
pub mod errorcode;
pub mod hil;
pub mod platform;
#[macro_use]
pub mod utilities;

pub use crate::errorcode::ErrorCode;
