//! Status LED task
//!
//! Lights the LED while a client is connected.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use esp_hal::gpio::Output;

/// What the LED should show
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LedState {
    /// No client; LED off
    Idle,
    /// Client connected; LED on
    Connected,
}

/// Type alias for the LED channel sender
pub type LedSender = Sender<'static, CriticalSectionRawMutex, LedState, 4>;

/// Type alias for the LED channel receiver
pub type LedReceiver = Receiver<'static, CriticalSectionRawMutex, LedState, 4>;

/// Channel for LED state changes
pub static LED_CHANNEL: Channel<CriticalSectionRawMutex, LedState, 4> = Channel::new();

/// Task that drives the LED from connection changes
pub async fn led_task(mut led: Output<'static>, receiver: LedReceiver) {
    loop {
        // Active low
        match receiver.receive().await {
            LedState::Connected => led.set_low(),
            LedState::Idle => led.set_high(),
        }
    }
}
