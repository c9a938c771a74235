//! Host side translation between the status text and control transfers.
//!
//! The proxy holds no LED state of its own. Transfer failures are logged and
//! otherwise ignored: a read still produces text, a write still reports one
//! consumed byte.

use std::fmt;

use crate::link::{ControlTransport, Error};
use crate::protocol::{decode_digit, Led, StatusText, PING_CODE, REQ_GET, REQ_PING, REQ_SET};

/// One state byte as obtained by a read.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Fetch {
    /// The device answered with exactly one byte.
    Fetched(u8),
    /// The transfer failed or was short; the byte is whatever the buffer held.
    Stale(u8),
}

impl Fetch {
    pub fn byte(self) -> u8 {
        match self {
            Fetch::Fetched(byte) | Fetch::Stale(byte) => byte,
        }
    }

    pub fn is_stale(self) -> bool {
        matches!(self, Fetch::Stale(_))
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct StatusReport {
    pub green: Fetch,
    pub red: Fetch,
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = StatusText {
            green: self.green.byte(),
            red: self.red.byte(),
        };
        fmt::Display::fmt(&text, f)
    }
}

pub struct Proxy<T> {
    transport: T,
}

impl<T: ControlTransport> Proxy<T> {
    /// Wrap a device without touching it. The LEDs keep whatever state a
    /// previous session left them in.
    pub fn new(transport: T) -> Self {
        Proxy { transport }
    }

    /// Take ownership of a device and probe it with a ping.
    ///
    /// A failed or mismatching ping is logged, the device is attached anyway.
    pub fn attach(transport: T) -> Self {
        let mut proxy = Proxy { transport };

        log::info!("CrTreeStatus device now attached");
        log::debug!("CrTreeStatus ping");

        let code = match proxy.ping(PING_CODE) {
            Ok(code) => code,
            Err(err) => {
                log::warn!("CrTreeStatus ping error: {}", err);
                0
            }
        };

        if code != PING_CODE {
            log::warn!("CrTreeStatus invalid ping code: {}", code);
        }

        proxy
    }

    /// Release the device.
    pub fn detach(self) -> T {
        log::info!("CrTreeStatus device now disconnected");
        self.transport
    }

    /// Send PING with `code` and return the echoed byte.
    ///
    /// Besides echoing, the device turns both LEDs off.
    pub fn ping(&mut self, code: u8) -> Result<u8, Error> {
        let mut buf = [0u8; 1];
        self.transport
            .control_in(REQ_PING, u16::from(code), 0, &mut buf)?;
        Ok(buf[0])
    }

    pub fn read_status(&mut self) -> StatusReport {
        StatusReport {
            green: self.fetch(Led::Green),
            red: self.fetch(Led::Red),
        }
    }

    /// The attribute text, `Green: <STATE>\nRed: <STATE>\n`.
    pub fn read(&mut self) -> String {
        self.read_status().to_string()
    }

    /// Apply the first byte of `buf` and return how many bytes were consumed.
    pub fn write(&mut self, buf: &[u8]) -> usize {
        let byte = match buf.first() {
            Some(&byte) => byte,
            None => return 0,
        };

        let (index, value) = decode_digit(byte);
        log::debug!("Setting led {} to {}", index, value);
        match self.transport.control_out(REQ_SET, value, index) {
            Ok(0) => {}
            Ok(len) => log::warn!("CrTreeStatus set led status returned {} bytes", len),
            Err(err) => log::warn!("CrTreeStatus set led status failed: {}", err),
        }

        1
    }

    /// Keep calling [`Proxy::write`] until every byte has been consumed.
    pub fn write_all(&mut self, mut buf: &[u8]) {
        while !buf.is_empty() {
            let consumed = self.write(buf);
            buf = &buf[consumed..];
        }
    }

    fn fetch(&mut self, led: Led) -> Fetch {
        let mut buf = [0u8; 1];
        match self.transport.control_in(REQ_GET, 0, led as u16, &mut buf) {
            Ok(1) => Fetch::Fetched(buf[0]),
            Ok(len) => {
                log::warn!(
                    "CrTreeStatus get {} led status failed: {} bytes",
                    led.name().to_lowercase(),
                    len
                );
                Fetch::Stale(buf[0])
            }
            Err(err) => {
                log::warn!(
                    "CrTreeStatus get {} led status failed: {}",
                    led.name().to_lowercase(),
                    err
                );
                Fetch::Stale(buf[0])
            }
        }
    }
}
