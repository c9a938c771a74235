//! Wire contract shared by the firmware and the host.
//!
//! Every exchange is a single vendor control transfer carrying at most one
//! byte of payload:
//!
//! | Request | bRequest | wValue        | wIndex | Payload        |
//! |---------|----------|---------------|--------|----------------|
//! | PING    | 0        | echo byte     | 0      | 1 byte (IN)    |
//! | SET     | 1        | LED state     | LED id | none (OUT)     |
//! | GET     | 2        | 0             | LED id | 1 byte (IN)    |

use core::convert::TryFrom;
use core::fmt;

pub const VENDOR_ID: u16 = 0x6666;
pub const PRODUCT_ID: u16 = 0x5110;

/// Vendor request, host to device, device recipient.
pub const REQUEST_TYPE_OUT: u8 = 0x40;
/// Vendor request, device to host, device recipient.
pub const REQUEST_TYPE_IN: u8 = 0xc0;

pub const REQ_PING: u8 = 0;
pub const REQ_SET: u8 = 1;
pub const REQ_GET: u8 = 2;

/// Code the host sends with PING when probing a freshly attached device.
pub const PING_CODE: u8 = 86;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Led {
    Green = 0,
    Red = 1,
}

impl Led {
    pub const ALL: [Led; 2] = [Led::Green, Led::Red];

    /// Output register bit driving this LED.
    pub fn bit(self) -> u8 {
        1 << (self as u8)
    }

    pub fn name(self) -> &'static str {
        match self {
            Led::Green => "Green",
            Led::Red => "Red",
        }
    }
}

impl TryFrom<u8> for Led {
    type Error = u8;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        match index {
            0 => Ok(Led::Green),
            1 => Ok(Led::Red),
            other => Err(other),
        }
    }
}

/// State of one LED as stored by the firmware.
///
/// Any byte above `2` is kept verbatim as `Unknown` so that GET returns
/// exactly what the last SET delivered.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LedState {
    On,
    Off,
    Flash,
    Unknown(u8),
}

impl LedState {
    /// Text used by the status attribute. Only `0` and `1` have names of
    /// their own, everything else reads as flashing.
    pub fn label(byte: u8) -> &'static str {
        match byte {
            0 => "ON",
            1 => "OFF",
            _ => "FLASH",
        }
    }
}

impl From<u8> for LedState {
    fn from(byte: u8) -> Self {
        match byte {
            0 => LedState::On,
            1 => LedState::Off,
            2 => LedState::Flash,
            other => LedState::Unknown(other),
        }
    }
}

impl From<LedState> for u8 {
    fn from(state: LedState) -> u8 {
        match state {
            LedState::On => 0,
            LedState::Off => 1,
            LedState::Flash => 2,
            LedState::Unknown(byte) => byte,
        }
    }
}

/// A decoded vendor setup packet.
///
/// Only the low bytes of `wValue` and `wIndex` are meaningful to the device.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ControlRequest {
    Ping(u8),
    Set { index: u8, value: u8 },
    Get { index: u8 },
}

impl ControlRequest {
    /// Decode the fields of a setup packet. Unknown request codes yield `None`.
    pub fn from_setup(request: u8, value: u16, index: u16) -> Option<Self> {
        let value = value.to_le_bytes()[0];
        let index = index.to_le_bytes()[0];

        match request {
            REQ_PING => Some(ControlRequest::Ping(value)),
            REQ_SET => Some(ControlRequest::Set { index, value }),
            REQ_GET => Some(ControlRequest::Get { index }),
            _ => None,
        }
    }
}

/// `(wIndex, wValue)` of the SET request a single attribute byte encodes.
///
/// The host packs a LED id and a state into one ASCII digit,
/// `digit = '0' + index * 4 + value`. The arithmetic is done on signed
/// integers and truncated to 16 bits, so bytes below `'0'` wrap into large
/// indices the firmware does not recognise.
pub fn decode_digit(byte: u8) -> (u16, u16) {
    let code = i32::from(byte) - i32::from(b'0');
    let index = (code >> 2) as u16;
    let value = (code & 0x3) as u16;
    (index, value)
}

/// Inverse of [`decode_digit`] for the meaningful range.
pub fn encode_digit(led: Led, state: LedState) -> Option<u8> {
    match u8::from(state) {
        value @ 0..=3 => Some(b'0' + (led as u8) * 4 + value),
        _ => None,
    }
}

/// Formats `Green: <STATE>\nRed: <STATE>\n` from the two raw state bytes.
pub struct StatusText {
    pub green: u8,
    pub red: u8,
}

impl fmt::Display for StatusText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: {}", Led::Green.name(), LedState::label(self.green))?;
        writeln!(f, "{}: {}", Led::Red.name(), LedState::label(self.red))
    }
}
