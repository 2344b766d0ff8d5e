#![no_std]
#![no_main]

extern crate alloc;

// Required for ESP-IDF bootloader compatibility
// Use explicit parameters to ensure correct efuse block revision values
esp_bootloader_esp_idf::esp_app_desc!(
    env!("CARGO_PKG_VERSION"),  // version
    env!("CARGO_PKG_NAME"),     // project_name
    "00:00:00",                 // build_time
    "2025-01-01",               // build_date
    "0.0.0",                    // idf_ver (not using IDF)
    0x10000,                    // mmu_page_size (64KB)
    0,                          // min_efuse_blk_rev_full (accept all)
    u16::MAX                    // max_efuse_blk_rev_full (accept all)
);

use embassy_executor::Spawner;
use esp_backtrace as _;
use esp_hal::gpio::{Level, Output, OutputConfig};
use esp_hal::timer::timg::TimerGroup;
use embassy_embedded_hal::adapter::BlockingAsync;
use esp_storage::FlashStorage;
use static_cell::StaticCell;

use ble_config_firmware::config::storage::{EEPROM_SIZE, FLASH_RANGE};
use ble_config_firmware::record::ConfigRecord;
use ble_config_firmware::storage::{ConfigStore, FlashEeprom, LoadOutcome};
use ble_config_firmware::tasks::{
    admin_task, ble_task, led_task, AdminReceiver, LedReceiver, ADMIN_CHANNEL, LED_CHANNEL,
};

/// Configuration store on the emulated EEPROM area
type DeviceStore = ConfigStore<FlashEeprom<BlockingAsync<FlashStorage<'static>>, EEPROM_SIZE>>;

/// Type alias for the BLE controller
type BleController = trouble_host::prelude::ExternalController<
    esp_radio::ble::controller::BleConnector<'static>,
    10,
>;

/// Static executor for embassy
static EXECUTOR: StaticCell<esp_rtos::embassy::Executor> = StaticCell::new();

/// Static cell for esp-radio controller (needed for 'static lifetime)
static RADIO_CONTROLLER: StaticCell<esp_radio::Controller<'static>> = StaticCell::new();

#[esp_hal::main]
fn main() -> ! {
    // Initialise heap allocator for BLE support (64KB - BLE requires significant heap)
    esp_alloc::heap_allocator!(size: 64 * 1024);

    let peripherals = esp_hal::init(esp_hal::Config::default());
    esp_println::logger::init_logger(log::LevelFilter::Info);

    // Status LED off until a client connects (active low)
    let led = Output::new(peripherals.GPIO48, Level::High, OutputConfig::default());

    // Load the persisted configuration, falling back to factory defaults
    let flash = BlockingAsync::new(FlashStorage::new(peripherals.FLASH));
    let mut store: DeviceStore = ConfigStore::new(FlashEeprom::new(flash, FLASH_RANGE), EEPROM_SIZE);
    let record = match store.load() {
        Ok(LoadOutcome::Restored(record)) => record,
        Ok(LoadOutcome::NoValidData) => ConfigRecord::factory_default(),
        Err(e) => {
            log::warn!("Storage unavailable ({:?}), using factory defaults", e);
            ConfigRecord::factory_default()
        }
    };

    // Initialise the RTOS scheduler with timer - MUST be done before any async operations
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    // Random static address from the last 3 bytes of the eFuse MAC
    let mac = esp_hal::efuse::Efuse::read_base_mac_address();
    let address = [mac[3], mac[4], mac[5], 0x1E, 0x83, 0xE7];

    // Initialise esp-radio for BLE support (must be after esp_rtos::start)
    let radio_controller = RADIO_CONTROLLER.init(
        esp_radio::init().expect("Failed to initialize esp-radio")
    );

    // Create BLE connector (ownership is passed to ExternalController)
    let ble_connector = esp_radio::ble::controller::BleConnector::new(
        radio_controller,
        peripherals.BT,
        esp_radio::ble::Config::default(),
    ).expect("Failed to initialize BLE connector");

    // Wrap in ExternalController for trouble-host compatibility
    let controller: BleController = trouble_host::prelude::ExternalController::new(ble_connector);

    // Create and run the embassy executor
    let executor = EXECUTOR.init(esp_rtos::embassy::Executor::new());
    executor.run(|spawner| {
        spawner.must_spawn(async_main(spawner, led, controller, address, store, record));
    })
}

#[embassy_executor::task]
async fn async_main(
    spawner: Spawner,
    led: Output<'static>,
    controller: BleController,
    address: [u8; 6],
    store: DeviceStore,
    record: ConfigRecord,
) {
    spawner.must_spawn(admin_runner(ADMIN_CHANNEL.receiver()));
    spawner.must_spawn(led_runner(led, LED_CHANNEL.receiver()));
    spawner.must_spawn(ble_host_task(controller, address, store, record));
}

/// Task that executes admin commands (reboot)
#[embassy_executor::task]
async fn admin_runner(receiver: AdminReceiver) {
    admin_task(receiver).await;
}

/// Task that shows the connection state on the LED
#[embassy_executor::task]
async fn led_runner(led: Output<'static>, receiver: LedReceiver) {
    led_task(led, receiver).await;
}

/// Task that manages BLE connectivity and the configuration profile
#[embassy_executor::task]
async fn ble_host_task(
    controller: BleController,
    address: [u8; 6],
    store: DeviceStore,
    record: ConfigRecord,
) {
    ble_task(
        controller,
        address,
        store,
        record,
        ADMIN_CHANNEL.sender(),
        LED_CHANNEL.sender(),
    )
    .await;
}
