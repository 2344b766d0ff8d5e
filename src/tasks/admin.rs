//! Admin task for system commands
//!
//! Restart requests from the profile are posted here so the BLE task can
//! finish replying to the client before the chip resets.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use embassy_time::{Duration, Timer};

/// Delay between a restart request and the reset
const REBOOT_DELAY_MS: u64 = 500;

/// Admin command types
#[derive(Clone, Copy, Debug)]
pub enum AdminCommand {
    /// Restart firmware
    Reboot,
}

/// Channel for admin commands
pub static ADMIN_CHANNEL: Channel<CriticalSectionRawMutex, AdminCommand, 4> = Channel::new();

/// Type alias for the admin command sender
pub type AdminSender = Sender<'static, CriticalSectionRawMutex, AdminCommand, 4>;

/// Type alias for the admin command receiver
pub type AdminReceiver = Receiver<'static, CriticalSectionRawMutex, AdminCommand, 4>;

fn reboot() -> ! {
    esp_hal::system::software_reset()
}

/// Admin task that handles system commands
pub async fn admin_task(receiver: AdminReceiver) {
    loop {
        match receiver.receive().await {
            AdminCommand::Reboot => {
                log::info!("Admin: rebooting in {} ms", REBOOT_DELAY_MS);
                // Let the GATT reply and the log line go out
                Timer::after(Duration::from_millis(REBOOT_DELAY_MS)).await;
                reboot();
            }
        }
    }
}
