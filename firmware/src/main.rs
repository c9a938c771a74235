#![no_main]
#![no_std]

use cortex_m::asm;
use cortex_m_rt::entry;
use panic_rtt_target as _;
use rtt_target::{rprintln, rtt_init_print};

use embedded_hal::digital::v2::OutputPin;
use stm32f1xx_hal::usb::{Peripheral, UsbBus};
use stm32f1xx_hal::{pac, prelude::*, watchdog::IndependentWatchdog};
use usb_device::prelude::*;

use crts_shared::panel::{Ticker, DEFAULT_TICKS};
use crts_shared::protocol::{PRODUCT_ID, VENDOR_ID};
use crts_shared::StatusClass;

/// Poll iterations per flash step. The flash rate follows from how long a
/// poll takes on this board.
const TICKS: u32 = DEFAULT_TICKS;

#[entry]
fn main() -> ! {
    rtt_init_print!();

    let device = pac::Peripherals::take().unwrap();
    let mut flash = device.FLASH.constrain();
    let mut rcc = device.RCC.constrain();

    let clocks = rcc
        .cfgr
        .use_hse(8.mhz())
        .sysclk(48.mhz())
        .pclk1(24.mhz())
        .freeze(&mut flash.acr);

    assert!(clocks.usbclk_valid());

    let mut watchdog = IndependentWatchdog::new(device.IWDG);
    watchdog.start(1000.ms());

    let mut gpioa = device.GPIOA.split(&mut rcc.apb2);
    let mut gpiob = device.GPIOB.split(&mut rcc.apb2);

    // Active low, PB0 green and PB1 red.
    let green = gpiob.pb0.into_push_pull_output(&mut gpiob.crl);
    let red = gpiob.pb1.into_push_pull_output(&mut gpiob.crl);

    // BluePill board has a pull-up resistor on the D+ line.
    // Pull the D+ pin down to send a RESET condition to the USB bus.
    let mut usb_dp = gpioa.pa12.into_push_pull_output(&mut gpioa.crh);
    OutputPin::set_low(&mut usb_dp).ok();
    asm::delay(clocks.sysclk().0 / 4);
    watchdog.feed();

    let usb = Peripheral {
        usb: device.USB,
        pin_dm: gpioa.pa11,
        pin_dp: usb_dp.into_floating_input(&mut gpioa.crh),
    };
    let usb_bus = UsbBus::new(usb);

    let mut status = StatusClass::new(&usb_bus, green, red);

    let mut usb_dev = UsbDeviceBuilder::new(&usb_bus, UsbVidPid(VENDOR_ID, PRODUCT_ID))
        .manufacturer("CrTreeStatus")
        .product("CrTreeStatus")
        .serial_number("0001")
        .device_class(0xff)
        .build();

    rprintln!("CrTreeStatus up, flashing every {} polls", TICKS);

    let mut ticker = Ticker::new(TICKS);
    loop {
        watchdog.feed();
        usb_dev.poll(&mut [&mut status]);

        if ticker.tick() {
            status.animate();
        }
    }
}
