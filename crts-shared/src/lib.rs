#![cfg_attr(not(any(test, feature = "utils")), no_std)]

#[cfg(feature = "device")]
pub mod class;
#[cfg(feature = "utils")]
pub mod link;
pub mod panel;
pub mod protocol;
#[cfg(feature = "utils")]
pub mod proxy;

#[cfg(feature = "device")]
pub use class::StatusClass;
#[cfg(feature = "utils")]
pub use link::{ControlTransport, Error, UsbLink};
pub use panel::{Panel, Ticker};
#[cfg(feature = "utils")]
pub use proxy::Proxy;
