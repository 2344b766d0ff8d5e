//! Embassy tasks module
//!
//! Contains all async tasks for the firmware, organised by functionality.

pub mod admin;
pub mod ble;
pub mod led;

pub use admin::{admin_task, AdminCommand, AdminReceiver, AdminSender, ADMIN_CHANNEL};
pub use ble::ble_task;
pub use led::{led_task, LedReceiver, LedSender, LedState, LED_CHANNEL};
