// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Support for statically initializing objects in memory.

/// Allocates a global instance of `T` and initializes it with `e`.
///
/// Boards use this to build the long-lived peripherals, virtualizers and
/// capsules that reference each other with `'static` lifetimes, without a
/// heap. The returned reference is `&'static mut T`.
///
/// # Safety
///
/// Each expansion owns one static buffer. Executing the same expansion
/// twice (for example inside a loop) hands out a second mutable reference
/// to the same memory, so every call site must run at most once.
#[macro_export]
macro_rules! static_init {
    ($T:ty, $e:expr $(,)?) => {{
        let buf = $crate::static_buf!($T);
        buf.write($e)
    }};
}

/// Allocates a statically-sized global buffer for a `T` but does not
/// initialize it. Evaluates to `&'static mut MaybeUninit<T>`.
///
/// Must be used inside an `unsafe` block; see `static_init!` for the
/// requirements.
#[macro_export]
macro_rules! static_buf {
    ($T:ty $(,)?) => {{
        static mut BUF: core::mem::MaybeUninit<$T> = core::mem::MaybeUninit::uninit();
        &mut *core::ptr::addr_of_mut!(BUF)
    }};
}
