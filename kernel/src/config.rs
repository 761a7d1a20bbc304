// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Data structure for storing compile-time configuration options in the kernel.
//!
//! Configuration lives in a typed `const` object rather than behind `#[cfg]`
//! attributes so that every code path is type-checked even when disabled.
//! After type-checking, the compiler folds the constants, so a disabled
//! option behaves like code that was never compiled in.
//!
//! The values are set from cargo features on the kernel crate. Only board
//! crates should enable them:
//!
//! ```toml
//! [dependencies]
//! kernel = { path = "../../kernel", features = ["trace_ticker"] }
//! ```

/// Data structure holding compile-time configuration options.
pub struct Config {
    /// Whether the ticker virtualizer should trace attach, detach and
    /// dispatch activity to the debug output.
    pub trace_ticker: bool,

    /// Whether the key/value link should trace every frame it sends,
    /// receives, or discards to the debug output.
    pub trace_kv: bool,
}

/// A unique instance of `Config` where compile-time configuration options are
/// defined. These options are available in the kernel crate to be used for
/// relevant configuration.
pub const CONFIG: Config = Config {
    trace_ticker: cfg!(feature = "trace_ticker"),
    trace_kv: cfg!(feature = "trace_kv"),
};
