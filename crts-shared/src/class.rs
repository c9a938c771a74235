use core::marker::PhantomData;

use embedded_hal::digital::v2::OutputPin;
use usb_device::class_prelude::*;
use usb_device::control::{Recipient, Request, RequestType};
use usb_device::Result;

use crate::panel::{Panel, Response};
use crate::protocol::Led;

const USB_CLASS_VENDOR: u8 = 0xff;

/// Vendor class exposing the two status LEDs over control transfers.
pub struct StatusClass<B, G, R> {
    iface: InterfaceNumber,
    panel: Panel,
    green: G,
    red: R,
    bus: PhantomData<B>,
}

impl<B, G, R> StatusClass<B, G, R>
where
    B: UsbBus,
    G: OutputPin,
    R: OutputPin,
{
    pub fn new(alloc: &UsbBusAllocator<B>, green: G, red: R) -> Self {
        let mut class = StatusClass {
            iface: alloc.interface(),
            panel: Panel::new(),
            green,
            red,
            bus: PhantomData,
        };
        class.update_pins();
        class
    }

    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    /// Advance the flash animation by one step.
    pub fn animate(&mut self) {
        self.panel.animate();
        self.update_pins();
    }

    fn update_pins(&mut self) {
        let port = self.panel.port();
        drive(&mut self.green, port & Led::Green.bit() != 0);
        drive(&mut self.red, port & Led::Red.bit() != 0);
    }

    fn handle(&mut self, req: &Request) -> Option<Response> {
        let response = route(&mut self.panel, req)?;
        self.update_pins();
        Some(response)
    }
}

fn drive<P: OutputPin>(pin: &mut P, high: bool) {
    if high {
        pin.set_high().ok();
    } else {
        pin.set_low().ok();
    }
}

fn is_ours(req: &Request) -> bool {
    req.request_type == RequestType::Vendor && req.recipient == Recipient::Device
}

/// Hand vendor device requests to the panel, leave everything else to
/// other classes.
fn route(panel: &mut Panel, req: &Request) -> Option<Response> {
    if !is_ours(req) {
        return None;
    }
    Some(panel.handle_setup(req.request, req.value, req.index))
}

/// IN data stage for a response. Everything but a byte answer is sent as a
/// zero-length stage.
fn payload(response: Response, buf: &mut [u8; 1]) -> &[u8] {
    match response {
        Response::Byte(byte) => {
            buf[0] = byte;
            &buf[..]
        }
        Response::Ack | Response::Unsupported => &buf[..0],
    }
}

impl<B, G, R> UsbClass<B> for StatusClass<B, G, R>
where
    B: UsbBus,
    G: OutputPin,
    R: OutputPin,
{
    fn get_configuration_descriptors(&self, writer: &mut DescriptorWriter) -> Result<()> {
        writer.interface(self.iface, USB_CLASS_VENDOR, 0, 0)
    }

    // Data from device
    fn control_in(&mut self, xfer: ControlIn<B>) {
        let req = *xfer.request();
        if let Some(response) = self.handle(&req) {
            let mut buf = [0u8; 1];
            xfer.accept_with(payload(response, &mut buf)).ok();
        }
    }

    // Data to device
    fn control_out(&mut self, xfer: ControlOut<B>) {
        let req = *xfer.request();
        if self.handle(&req).is_some() {
            xfer.accept().ok();
        }
    }
}
