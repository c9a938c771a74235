use std::time::Duration;

use rusb::{DeviceHandle, GlobalContext};

use crate::protocol::{REQUEST_TYPE_IN, REQUEST_TYPE_OUT};

/// Default timeout for control transfers in both directions.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no device {vid:04x}:{pid:04x} attached")]
    NotFound { vid: u16, pid: u16 },
    #[error("usb: {0}")]
    Usb(#[from] rusb::Error),
}

/// Issues vendor control transfers to one device.
///
/// Both calls block until the transfer completes or times out and return the
/// number of data bytes moved.
pub trait ControlTransport {
    fn control_in(&mut self, request: u8, value: u16, index: u16, buf: &mut [u8])
        -> Result<usize, Error>;

    fn control_out(&mut self, request: u8, value: u16, index: u16) -> Result<usize, Error>;
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct DeviceInfo {
    pub bus: u8,
    pub address: u8,
}

pub struct UsbLink {
    handle: DeviceHandle<GlobalContext>,
    timeout: Duration,
}

impl UsbLink {
    pub fn list_devices(vid: u16, pid: u16) -> Result<Vec<DeviceInfo>, Error> {
        let mut found = Vec::new();

        for device in rusb::devices()?.iter() {
            let desc = match device.device_descriptor() {
                Ok(desc) => desc,
                Err(err) => {
                    log::debug!(
                        "skipping bus {} address {}: {}",
                        device.bus_number(),
                        device.address(),
                        err
                    );
                    continue;
                }
            };

            if desc.vendor_id() == vid && desc.product_id() == pid {
                found.push(DeviceInfo {
                    bus: device.bus_number(),
                    address: device.address(),
                });
            }
        }

        Ok(found)
    }

    pub fn open(vid: u16, pid: u16, timeout: Duration) -> Result<Self, Error> {
        let handle =
            rusb::open_device_with_vid_pid(vid, pid).ok_or(Error::NotFound { vid, pid })?;

        log::debug!(
            "opened {:04x}:{:04x} at bus {} address {}",
            vid,
            pid,
            handle.device().bus_number(),
            handle.device().address(),
        );

        Ok(UsbLink { handle, timeout })
    }
}

impl ControlTransport for UsbLink {
    fn control_in(
        &mut self,
        request: u8,
        value: u16,
        index: u16,
        buf: &mut [u8],
    ) -> Result<usize, Error> {
        let len = self
            .handle
            .read_control(REQUEST_TYPE_IN, request, value, index, buf, self.timeout)?;
        Ok(len)
    }

    fn control_out(&mut self, request: u8, value: u16, index: u16) -> Result<usize, Error> {
        let len = self
            .handle
            .write_control(REQUEST_TYPE_OUT, request, value, index, &[], self.timeout)?;
        Ok(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusb::{Direction, Recipient, RequestType};

    #[test]
    fn request_types_are_vendor_device() {
        assert_eq!(
            rusb::request_type(Direction::Out, RequestType::Vendor, Recipient::Device),
            REQUEST_TYPE_OUT
        );
        assert_eq!(
            rusb::request_type(Direction::In, RequestType::Vendor, Recipient::Device),
            REQUEST_TYPE_IN
        );
    }

    #[test]
    fn not_found_names_the_ids() {
        let err = Error::NotFound {
            vid: 0x6666,
            pid: 0x5110,
        };
        assert_eq!(err.to_string(), "no device 6666:5110 attached");
    }
}
