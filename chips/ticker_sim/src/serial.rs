// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! In-memory byte link between a device and a host.
//!
//! Each direction is a FIFO. The device and host ends are both
//! `PollingSerial`, so the same protocol code can run on either side.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use kernel::hil::serial::PollingSerial;
use kernel::ErrorCode;

#[derive(Default)]
pub struct SimLink {
    to_device: RefCell<VecDeque<u8>>,
    to_host: RefCell<VecDeque<u8>>,
    broken: Cell<bool>,
}

impl SimLink {
    pub fn new() -> SimLink {
        SimLink::default()
    }

    /// The device's end of the link.
    pub fn device(&self) -> SimPort<'_> {
        SimPort {
            rx: &self.to_device,
            tx: &self.to_host,
            broken: &self.broken,
        }
    }

    /// The host's end of the link.
    pub fn host(&self) -> SimPort<'_> {
        SimPort {
            rx: &self.to_host,
            tx: &self.to_device,
            broken: &self.broken,
        }
    }

    /// Make every subsequent write fail.
    pub fn set_broken(&self, broken: bool) {
        self.broken.set(broken);
    }
}

pub struct SimPort<'a> {
    rx: &'a RefCell<VecDeque<u8>>,
    tx: &'a RefCell<VecDeque<u8>>,
    broken: &'a Cell<bool>,
}

impl SimPort<'_> {
    /// Bytes waiting to be read at this end.
    pub fn available(&self) -> usize {
        self.rx.borrow().len()
    }
}

impl PollingSerial for SimPort<'_> {
    fn read_byte(&self) -> Option<u8> {
        self.rx.borrow_mut().pop_front()
    }

    fn write_bytes(&self, bytes: &[u8]) -> Result<(), ErrorCode> {
        if self.broken.get() {
            return Err(ErrorCode::FAIL);
        }
        self.tx.borrow_mut().extend(bytes.iter().copied());
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn directions_are_independent() {
        let link = SimLink::new();
        let device = link.device();
        let host = link.host();

        device.write_bytes(b"up").unwrap();
        host.write_bytes(b"down").unwrap();
        assert_eq!(host.read_byte(), Some(b'u'));
        assert_eq!(host.read_byte(), Some(b'p'));
        assert_eq!(host.read_byte(), None);
        assert_eq!(device.available(), 4);
        assert_eq!(device.read_byte(), Some(b'd'));

        link.set_broken(true);
        assert_eq!(device.write_bytes(b"x"), Err(ErrorCode::FAIL));
    }
}
