// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! Interface for running capsule tests.
//!
//! As Tock capsules are asynchronous, it is difficult for a test runner to
//! determine when a test has finished. This interface provides a `done()`
//! callback to notify when the test is done.
//!
//! A simple example of a test capsule using this interface:
//!
//! ```rust,ignore
//! pub struct TestSensorX<'a> {
//!     client: Cell<Option<&'a dyn CapsuleTestClient>>,
//! }
//!
//! impl<'a> CapsuleTest<'a> for TestSensorX<'a> {
//!     fn set_client(&self, client: &'a dyn CapsuleTestClient) {
//!         self.client.set(Some(client));
//!     }
//! }
//!
//! impl AsyncClient for TestSensorX<'_> {
//!     fn operation_complete(&self) {
//!         // Test has finished at this point.
//!         if let Some(client) = self.client.get() {
//!             client.done(Ok(()));
//!         }
//!     }
//! }
//! ```

use core::fmt;

use kernel::ErrorCode;

/// Reason a capsule test failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CapsuleTestError {
    /// The device under test produced a wrong result.
    IncorrectResult,
    /// An operation on the device under test returned an error.
    ErrorCode(ErrorCode),
    /// The test did not finish in its time budget.
    Timeout,
    /// The remote peer judging the test reported a failure.
    PeerVerdict,
}

impl From<ErrorCode> for CapsuleTestError {
    fn from(e: ErrorCode) -> Self {
        CapsuleTestError::ErrorCode(e)
    }
}

impl fmt::Display for CapsuleTestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapsuleTestError::IncorrectResult => write!(f, "device produced an incorrect result"),
            CapsuleTestError::ErrorCode(e) => write!(f, "device operation failed: {}", e),
            CapsuleTestError::Timeout => write!(f, "timed out waiting for the host"),
            CapsuleTestError::PeerVerdict => write!(f, "host side script reported a fail"),
        }
    }
}

/// Client for receiving test done events.
pub trait CapsuleTestClient {
    /// Called when the test is finished. If test was successful, `result` is
    /// `Ok(())`.
    fn done(&self, result: Result<(), CapsuleTestError>);
}

/// Identify a test as a capsule test. This is only used for setting the client
/// for test complete callbacks.
pub trait CapsuleTest<'a> {
    /// Set the client for the done callback.
    fn set_client(&self, client: &'a dyn CapsuleTestClient);
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display_names_the_failing_side() {
        struct Buf([u8; 64], usize);
        impl fmt::Write for Buf {
            fn write_str(&mut self, s: &str) -> fmt::Result {
                let end = self.1 + s.len();
                self.0[self.1..end].copy_from_slice(s.as_bytes());
                self.1 = end;
                Ok(())
            }
        }

        let mut buf = Buf([0; 64], 0);
        fmt::write(&mut buf, format_args!("{}", CapsuleTestError::PeerVerdict)).unwrap();
        assert_eq!(&buf.0[..buf.1], b"host side script reported a fail");

        let mut buf = Buf([0; 64], 0);
        fmt::write(
            &mut buf,
            format_args!("{}", CapsuleTestError::from(ErrorCode::SIZE)),
        )
        .unwrap();
        assert!(buf.0[..buf.1].starts_with(b"device operation failed: SIZE"));
    }
}
