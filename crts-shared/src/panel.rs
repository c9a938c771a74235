//! The device side state machine.
//!
//! `Panel` owns both LED states and a model of the output port. The port is
//! wired active low: a set bit leaves its LED dark, a cleared bit lights it.

use core::convert::TryFrom;

use crate::protocol::{ControlRequest, Led, LedState};

/// Poll iterations between two animation toggles on the original hardware.
pub const DEFAULT_TICKS: u32 = 65_535;

/// Bitmask of the LEDs whose state is `Flash`.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct AnimationMask(u8);

impl AnimationMask {
    pub fn from_states(green: LedState, red: LedState) -> Self {
        let mut mask = 0;
        if green == LedState::Flash {
            mask |= Led::Green.bit();
        }
        if red == LedState::Flash {
            mask |= Led::Red.bit();
        }
        AnimationMask(mask)
    }

    pub fn contains(self, led: Led) -> bool {
        self.0 & led.bit() != 0
    }

    pub fn bits(self) -> u8 {
        self.0
    }
}

/// Outcome of a control request.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Response {
    /// One byte data stage.
    Byte(u8),
    /// Accepted with no data.
    Ack,
    /// Unsupported request or LED index. Answered with a zero-length
    /// data stage since the transport has no error channel.
    Unsupported,
}

#[derive(Debug, Clone)]
pub struct Panel {
    green: LedState,
    red: LedState,
    animation: AnimationMask,
    port: u8,
}

impl Default for Panel {
    /// Power-on state: both LEDs flashing, starting lit.
    fn default() -> Self {
        Panel {
            green: LedState::Flash,
            red: LedState::Flash,
            animation: AnimationMask::from_states(LedState::Flash, LedState::Flash),
            port: 0,
        }
    }
}

impl Panel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, led: Led) -> LedState {
        match led {
            Led::Green => self.green,
            Led::Red => self.red,
        }
    }

    pub fn animation(&self) -> AnimationMask {
        self.animation
    }

    /// Raw output register, one bit per LED.
    pub fn port(&self) -> u8 {
        self.port
    }

    pub fn is_lit(&self, led: Led) -> bool {
        self.port & led.bit() == 0
    }

    pub fn handle(&mut self, request: ControlRequest) -> Response {
        match request {
            ControlRequest::Ping(code) => {
                self.ping();
                Response::Byte(code)
            }
            ControlRequest::Set { index, value } => match Led::try_from(index) {
                Ok(led) => {
                    self.set(led, LedState::from(value));
                    Response::Ack
                }
                Err(index) => {
                    log::debug!("SET for unknown led {}", index);
                    Response::Unsupported
                }
            },
            ControlRequest::Get { index } => match Led::try_from(index) {
                Ok(led) => Response::Byte(self.state(led).into()),
                Err(index) => {
                    log::debug!("GET for unknown led {}", index);
                    Response::Unsupported
                }
            },
        }
    }

    /// Decode and handle a raw setup packet.
    pub fn handle_setup(&mut self, request: u8, value: u16, index: u16) -> Response {
        match ControlRequest::from_setup(request, value, index) {
            Some(request) => self.handle(request),
            None => {
                log::debug!("unsupported request {}", request);
                Response::Unsupported
            }
        }
    }

    /// Toggle every flashing LED. Called once per tick period.
    pub fn animate(&mut self) {
        self.port ^= self.animation.bits();
    }

    fn ping(&mut self) {
        self.animation = AnimationMask::default();
        self.port |= Led::Green.bit() | Led::Red.bit();
        self.green = LedState::Off;
        self.red = LedState::Off;
    }

    fn set(&mut self, led: Led, state: LedState) {
        match led {
            Led::Green => self.green = state,
            Led::Red => self.red = state,
        }

        self.port |= Led::Green.bit() | Led::Red.bit();
        for &led in Led::ALL.iter() {
            if self.state(led) == LedState::On {
                self.port &= !led.bit();
            }
        }

        self.animation = AnimationMask::from_states(self.green, self.red);
    }
}

/// Counts poll iterations and reports when the animation should advance.
///
/// The resulting flash rate depends on how long a poll takes, it is not
/// tied to wall clock time.
#[derive(Debug, Clone)]
pub struct Ticker {
    period: u32,
    count: u32,
}

impl Default for Ticker {
    fn default() -> Self {
        Ticker::new(DEFAULT_TICKS)
    }
}

impl Ticker {
    pub fn new(period: u32) -> Self {
        Ticker {
            period: period.max(1),
            count: 0,
        }
    }

    /// Returns true once every `period` calls.
    pub fn tick(&mut self) -> bool {
        self.count += 1;
        if self.count >= self.period {
            self.count = 0;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{PING_CODE, REQ_GET, REQ_PING, REQ_SET};

    fn set(panel: &mut Panel, led: Led, value: u8) -> Response {
        panel.handle(ControlRequest::Set {
            index: led as u8,
            value,
        })
    }

    fn get(panel: &mut Panel, led: Led) -> Response {
        panel.handle(ControlRequest::Get { index: led as u8 })
    }

    #[test]
    fn power_on_state_flashes_both() {
        let panel = Panel::new();
        assert_eq!(panel.state(Led::Green), LedState::Flash);
        assert_eq!(panel.state(Led::Red), LedState::Flash);
        assert!(panel.animation().contains(Led::Green));
        assert!(panel.animation().contains(Led::Red));
        assert!(panel.is_lit(Led::Green));
        assert!(panel.is_lit(Led::Red));
    }

    #[test]
    fn set_then_get_round_trips() {
        let mut panel = Panel::new();
        for &led in Led::ALL.iter() {
            for value in 0..4u8 {
                assert_eq!(set(&mut panel, led, value), Response::Ack);
                assert_eq!(get(&mut panel, led), Response::Byte(value));
            }
        }
    }

    #[test]
    fn ping_echoes_and_resets() {
        let mut panel = Panel::new();
        set(&mut panel, Led::Green, 0);
        set(&mut panel, Led::Red, 2);

        assert_eq!(panel.handle(ControlRequest::Ping(PING_CODE)), Response::Byte(PING_CODE));
        assert_eq!(panel.state(Led::Green), LedState::Off);
        assert_eq!(panel.state(Led::Red), LedState::Off);
        assert_eq!(panel.animation().bits(), 0);
        assert!(!panel.is_lit(Led::Green));
        assert!(!panel.is_lit(Led::Red));
    }

    #[test]
    fn invalid_index_is_rejected_without_change() {
        let mut panel = Panel::new();
        set(&mut panel, Led::Green, 0);
        set(&mut panel, Led::Red, 1);
        let before = panel.clone();

        for index in 2..=255u8 {
            assert_eq!(
                panel.handle(ControlRequest::Set { index, value: 2 }),
                Response::Unsupported
            );
            assert_eq!(panel.handle(ControlRequest::Get { index }), Response::Unsupported);
        }

        assert_eq!(panel.state(Led::Green), before.state(Led::Green));
        assert_eq!(panel.state(Led::Red), before.state(Led::Red));
        assert_eq!(panel.port(), before.port());
        assert_eq!(panel.animation(), before.animation());
    }

    #[test]
    fn unknown_request_is_unsupported() {
        let mut panel = Panel::new();
        assert_eq!(panel.handle_setup(7, 0, 0), Response::Unsupported);
        assert_eq!(panel.handle_setup(REQ_PING, 0x1234, 0), Response::Byte(0x34));
        assert_eq!(panel.handle_setup(REQ_SET, 0, 0x0101), Response::Ack);
        assert_eq!(panel.handle_setup(REQ_GET, 0, 1), Response::Byte(0));
    }

    #[test]
    fn animation_tracks_latest_flash() {
        let mut panel = Panel::new();
        panel.handle(ControlRequest::Ping(0));

        set(&mut panel, Led::Green, 2);
        assert!(panel.animation().contains(Led::Green));
        assert!(!panel.animation().contains(Led::Red));

        set(&mut panel, Led::Red, 2);
        assert_eq!(panel.animation().bits(), Led::Green.bit() | Led::Red.bit());

        set(&mut panel, Led::Green, 1);
        assert!(!panel.animation().contains(Led::Green));
        assert!(panel.animation().contains(Led::Red));

        set(&mut panel, Led::Red, 3);
        assert_eq!(panel.animation().bits(), 0);
    }

    #[test]
    fn animate_toggles_only_flashing_leds() {
        let mut panel = Panel::new();
        set(&mut panel, Led::Green, 0);
        set(&mut panel, Led::Red, 2);

        assert!(panel.is_lit(Led::Green));
        assert!(!panel.is_lit(Led::Red));

        panel.animate();
        assert!(panel.is_lit(Led::Green));
        assert!(panel.is_lit(Led::Red));

        panel.animate();
        assert!(panel.is_lit(Led::Green));
        assert!(!panel.is_lit(Led::Red));
    }

    #[test]
    fn off_and_unknown_stay_dark() {
        let mut panel = Panel::new();
        set(&mut panel, Led::Green, 1);
        set(&mut panel, Led::Red, 9);
        panel.animate();
        assert!(!panel.is_lit(Led::Green));
        assert!(!panel.is_lit(Led::Red));
        assert_eq!(get(&mut panel, Led::Red), Response::Byte(9));
    }

    #[test]
    fn ticker_wraps_after_period() {
        let mut ticker = Ticker::new(3);
        assert!(!ticker.tick());
        assert!(!ticker.tick());
        assert!(ticker.tick());
        assert!(!ticker.tick());

        let mut every = Ticker::new(0);
        assert!(every.tick());
        assert!(every.tick());
    }
}
