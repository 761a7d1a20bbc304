// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Hardware agnostic interfaces for time and alarms.
//!
//! A hardware timer is modeled as a free-running counter of some fixed bit
//! width, incremented at a known `Frequency`, with a single compare value
//! that raises an interrupt once the counter reaches it. Counter values are
//! `Ticks`, which always wrap at the counter width: never compare two `Ticks`
//! values with `<` to decide which one happens first, use
//! [`Ticks::within_range`] relative to a known reference instead.

use core::fmt;

use crate::ErrorCode;

/// An integer type defining the width of a time value.
///
/// All arithmetic on `Ticks` is modular in the counter width: `wrapping_add`
/// and `wrapping_sub` never panic and `from` masks off bits above the width.
pub trait Ticks: Clone + Copy + From<u32> + fmt::Debug + Ord + PartialOrd + Eq {
    /// Number of significant bits in this counter.
    fn width() -> u32;

    /// Converts the type into a `usize`, stripping the higher bits if it is
    /// larger than `usize`.
    fn into_usize(self) -> usize;

    /// Converts the type into a `u32`.
    fn into_u32(self) -> u32;

    /// Converts the type into a `u64`.
    fn into_u64(self) -> u64 {
        self.into_u32() as u64
    }

    /// Add two values, wrapping around on overflow using standard unsigned
    /// arithmetic.
    fn wrapping_add(self, other: Self) -> Self;

    /// Subtract two values, wrapping around on underflow using standard
    /// unsigned arithmetic.
    fn wrapping_sub(self, other: Self) -> Self;

    /// Returns whether the value is in the range of [`start, `end`) using
    /// unsigned arithmetic and considering wraparound. It returns `true`
    /// if, incrementing from `start`, the value will be reached before `end`.
    /// Put another way, it returns `(self - start) < (end - start)` in
    /// unsigned arithmetic.
    fn within_range(self, start: Self, end: Self) -> bool;

    /// Returns the maximum value of this type, which should be (2^width)-1.
    fn max_value() -> Self;

    /// Returns half the range of this type, which should be 2^(width-1).
    fn half_max_value() -> Self;

    /// Converts the specified val into this type if it fits, otherwise
    /// `max_value()` is returned.
    fn from_or_max(val: u64) -> Self;
}

macro_rules! masked_ticks {
    ($(#[$attr:meta])* $name:ident, $width:expr) => {
        $(#[$attr])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            const MASK: u32 = u32::MAX >> (32 - $width);

            pub const fn new(val: u32) -> Self {
                $name(val & Self::MASK)
            }
        }

        impl From<u32> for $name {
            fn from(val: u32) -> Self {
                $name::new(val)
            }
        }

        impl Ticks for $name {
            fn width() -> u32 {
                $width
            }

            fn into_usize(self) -> usize {
                self.0 as usize
            }

            fn into_u32(self) -> u32 {
                self.0
            }

            fn wrapping_add(self, other: Self) -> Self {
                $name::new(self.0.wrapping_add(other.0))
            }

            fn wrapping_sub(self, other: Self) -> Self {
                $name::new(self.0.wrapping_sub(other.0))
            }

            fn within_range(self, start: Self, end: Self) -> bool {
                self.wrapping_sub(start).0 < end.wrapping_sub(start).0
            }

            fn max_value() -> Self {
                $name(Self::MASK)
            }

            fn half_max_value() -> Self {
                $name(1 + (Self::MASK / 2))
            }

            fn from_or_max(val: u64) -> Self {
                if val < Self::MASK as u64 {
                    $name(val as u32)
                } else {
                    $name(Self::MASK)
                }
            }
        }
    };
}

masked_ticks!(
    /// 16-bit `Ticks`, as found on small general purpose timers.
    Ticks16,
    16
);
masked_ticks!(
    /// 24-bit `Ticks`, as found on RTCs and SysTick style counters.
    Ticks24,
    24
);
masked_ticks!(
    /// 32-bit `Ticks`.
    Ticks32,
    32
);

/// Represents a clock's frequency in Hz, allowing code to transform between
/// computer time units and wall clock time. It is typically an associated
/// type for an implementation of the `Time` trait.
pub trait Frequency {
    /// Returns frequency in Hz.
    fn frequency() -> u32;
}

/// 1MHz `Frequency`
#[derive(Debug)]
pub struct Freq1MHz;
impl Frequency for Freq1MHz {
    fn frequency() -> u32 {
        1_000_000
    }
}

/// 32KHz `Frequency`
#[derive(Debug)]
pub struct Freq32KHz;
impl Frequency for Freq32KHz {
    fn frequency() -> u32 {
        32768
    }
}

/// An abstraction of a free-running, wrapping counter.
pub trait Time {
    type Frequency: Frequency;
    type Ticks: Ticks;

    /// Returns the current value of the counter.
    fn now(&self) -> Self::Ticks;
}

/// Conversions between wall clock microseconds and native ticks.
///
/// Blanket-implemented for every `Time`. Intermediate results are computed
/// in 64 bits, so `us * frequency` cannot overflow; results that do not fit
/// the counter saturate to `Ticks::max_value()`.
pub trait ConvertTicks<T: Ticks> {
    /// Returns the number of ticks in the provided number of microseconds,
    /// rounding down.
    fn ticks_from_us(&self, us: u32) -> T;

    /// Returns the number of microseconds in the provided number of ticks,
    /// rounding down.
    fn ticks_to_us(&self, tick: T) -> u32;
}

impl<T: Time + ?Sized> ConvertTicks<<T as Time>::Ticks> for T {
    fn ticks_from_us(&self, us: u32) -> <T as Time>::Ticks {
        let hz = <T::Frequency as Frequency>::frequency() as u64;
        <T::Ticks as Ticks>::from_or_max(us as u64 * hz / 1_000_000)
    }

    fn ticks_to_us(&self, tick: <T as Time>::Ticks) -> u32 {
        let hz = <T::Frequency as Frequency>::frequency() as u64;
        let us = tick.into_u64() * 1_000_000 / hz;
        if us > u32::MAX as u64 {
            u32::MAX
        } else {
            us as u32
        }
    }
}

/// Callback handler for when an Alarm fires (a `Counter` reaches a specific
/// value).
pub trait AlarmClient {
    /// Callback indicating the alarm time has been reached. The alarm
    /// MUST be disabled when this is called. If a new alarm is needed,
    /// the client can call `Alarm::set_alarm`.
    fn alarm(&self);
}

/// Interface for receiving notification when a particular time
/// (`Counter` value) is reached.
///
/// Clients use the [`AlarmClient`](trait.AlarmClient.html) trait to
/// signal when the counter has reached a pre-specified value set in
/// [`set_alarm`](#tymethod.set_alarm). Alarms are intended for low-level
/// time needs that require precision (i.e., firing on a precise clock
/// tick). Software that needs more functionality but can tolerate
/// some jitter should use the `Ticker` trait instead.
pub trait Alarm<'a>: Time {
    /// Specify the callback for when the counter reaches the alarm
    /// value.
    fn set_alarm_client(&self, client: &'a dyn AlarmClient);

    /// Specify when the callback should be called and enable it. The
    /// callback will be enqueued when `Time::now() == reference + dt`. The
    /// callback itself may not run exactly at this time, due to delays.
    /// However, it it assured to execute *after* `reference + dt`: it can
    /// be delayed but will never fire early. The method takes `reference`
    /// and `dt` rather than a single value denoting the counter value so it
    /// can distinguish between alarms which have very recently already
    /// passed and those in the far far future (see #1651).
    ///
    /// A target that has already passed is not an error: the alarm fires as
    /// soon as possible. Any previously armed target is replaced.
    fn set_alarm(&self, reference: Self::Ticks, dt: Self::Ticks);

    /// Return the current alarm value. This is undefined at boot and
    /// otherwise returns `now + dt` from the last call to `set_alarm`.
    fn get_alarm(&self) -> Self::Ticks;

    /// Disable the alarm and stop it from firing in the future.
    /// Valid `Result<(), ErrorCode>` codes are:
    ///   - `Ok(())` no callback will be called
    ///   - `Err(ErrorCode::FAIL)` the underlying implementation
    ///     *may* still invoke the callback; callers must tolerate an
    ///     `alarm()` with nothing due.
    fn disarm(&self) -> Result<(), ErrorCode>;

    /// Returns whether the alarm is currently armed. Note that this
    /// does not reliably indicate whether there will be a future
    /// callback: it is possible that the alarm has triggered (and
    /// disarmed) and a callback is pending and has not been called yet.
    /// In this case it possible for `is_armed` to return false and
    /// receive a callback.
    fn is_armed(&self) -> bool;

    /// Return the minimum dt value that is supported. Any dt smaller than
    /// this will automatically be increased to this minimum value.
    fn minimum_dt(&self) -> Self::Ticks;
}

#[cfg(test)]
mod test {
    use super::*;

    struct Clock32K;

    impl Time for Clock32K {
        type Frequency = Freq32KHz;
        type Ticks = Ticks32;

        fn now(&self) -> Ticks32 {
            Ticks32::from(0)
        }
    }

    #[test]
    fn masks_to_width() {
        assert_eq!(Ticks24::from(0x0123_4567).into_u32(), 0x23_4567);
        assert_eq!(Ticks16::max_value().into_u32(), 0xffff);
        assert_eq!(Ticks32::max_value().into_u32(), u32::MAX);
        assert_eq!(Ticks24::half_max_value().into_u32(), 0x80_0000);
    }

    #[test]
    fn wrapping_arithmetic() {
        let near_top = Ticks24::from(0xff_fff0);
        let wrapped = near_top.wrapping_add(Ticks24::from(0x20));
        assert_eq!(wrapped.into_u32(), 0x10);
        assert_eq!(wrapped.wrapping_sub(near_top).into_u32(), 0x20);
        assert_eq!(Ticks16::from(3).wrapping_sub(Ticks16::from(5)).into_u32(), 0xfffe);
    }

    #[test]
    fn within_range_across_wrap() {
        let start = Ticks24::from(0xff_ff00);
        let end = start.wrapping_add(Ticks24::from(0x200));
        assert!(Ticks24::from(0xff_ff80).within_range(start, end));
        assert!(Ticks24::from(0x50).within_range(start, end));
        // `end` itself is outside the half-open range.
        assert!(!end.within_range(start, end));
        assert!(!Ticks24::from(0x200).within_range(start, end));
        // A value just before `start` is "far in the future" of the range.
        assert!(!Ticks24::from(0xff_fe00).within_range(start, end));
    }

    #[test]
    fn from_or_max_saturates() {
        assert_eq!(Ticks16::from_or_max(10).into_u32(), 10);
        assert_eq!(Ticks16::from_or_max(1 << 20).into_u32(), 0xffff);
    }

    #[test]
    fn converts_microseconds() {
        let clock = Clock32K;
        assert_eq!(clock.ticks_from_us(1_000_000).into_u32(), 32768);
        assert_eq!(clock.ticks_from_us(1000).into_u32(), 32);
        // Below one tick of resolution.
        assert_eq!(clock.ticks_from_us(10).into_u32(), 0);
        assert_eq!(clock.ticks_to_us(Ticks32::from(32768)), 1_000_000);
    }
}
