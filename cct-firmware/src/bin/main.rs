// Keine Standard-Bibliothek verwenden (Embedded System)
#![no_std]
// Kein normaler main() Einstiegspunkt (wird von esp_rtos bereitgestellt)
#![no_main]
// Verbiete mem::forget - gefährlich bei ESP HAL Types mit DMA-Buffern
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
// Verbiete große Stack-Frames (Stack ist auf Embedded Systemen begrenzt)
#![deny(clippy::large_stack_frames)]

// Heap Allocator (WiFi benötigt dynamischen Speicher)
extern crate alloc;

// Embassy Async Runtime
use embassy_executor::Spawner;
use embassy_net::{Config as NetConfig, Stack, StackResources};
use embassy_time::{Duration, Timer};

// ESP32-C6 HAL
use esp_hal::clock::CpuClock;
use esp_hal::gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull};
use esp_hal::rng::Rng;
use esp_hal::timer::timg::TimerGroup;

use defmt::{error, info};

// Backtrace bei Panic und println!() Support
use {esp_backtrace as _, esp_println as _};

// Projekt-Module und Konfiguration
use cct_light::config::{
    BUTTON_GPIO, EXTRA_HEAP_SIZE, HTTP_TASK_POOL_SIZE, LED_COLD_GPIO, LED_WARM_GPIO,
    NIGHT_LED_GPIO, PWM_FREQUENCY_HZ, WIFI_HEAP_SIZE,
};
use cct_light::hal::init_ledc;
use cct_light::tasks::{
    button_task, connection_task, dhcp_task, fade_worker_task, http_server_task, light_task,
    net_task, resync_task,
};
use cct_light::{
    CalibrationBounds, FadeRequestQueue, Light, LightEventChannel, LightStatusChannel,
    configured_bounds, default_light_state,
};

// ESP-IDF App Descriptor - erforderlich für den Bootloader!
// Ohne diesen schlägt das Flashen mit "ESP-IDF App Descriptor missing" fehl
esp_bootloader_esp_idf::esp_app_desc!();

/// Main Entry Point
///
/// Initialisiert PWM-Hardware, Fade-Engine, Licht-Zustand und WiFi,
/// spawnt alle Tasks und schläft danach.
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    // ESP32-C6 Konfiguration: CPU auf maximale Taktfrequenz (160 MHz)
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    // Heap Allocator initialisieren (WiFi braucht dynamischen Speicher!)
    esp_alloc::heap_allocator!(
        #[esp_hal::ram(reclaimed)]
        size: WIFI_HEAP_SIZE
    );
    esp_alloc::heap_allocator!(size: EXTRA_HEAP_SIZE);

    // Embassy Runtime initialisieren (Timer + Software Interrupt)
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    let sw_interrupt =
        esp_hal::interrupt::software::SoftwareInterruptControl::new(peripherals.SW_INTERRUPT);
    esp_rtos::start(timg0.timer0, sw_interrupt.software_interrupt0);

    info!("=== CCT Light ===");
    info!(
        "Hardware: warm GPIO{}, cold GPIO{}, night light GPIO{}, button GPIO{}, PWM {} Hz / 12 bit",
        LED_WARM_GPIO, LED_COLD_GPIO, NIGHT_LED_GPIO, BUTTON_GPIO, PWM_FREQUENCY_HZ
    );

    // ------------------------------------------------------------------------
    // PWM-Hardware und Fade-Engine (vor WiFi, Licht muss auch offline gehen)
    // ------------------------------------------------------------------------

    let fader = init_ledc(
        peripherals.LEDC,
        peripherals.GPIO4,
        peripherals.GPIO5,
        PWM_FREQUENCY_HZ,
    )
    .expect("Failed to configure LEDC");

    static FADE_QUEUE: static_cell::StaticCell<FadeRequestQueue> = static_cell::StaticCell::new();
    let fade_queue = &*FADE_QUEUE.init(FadeRequestQueue::new());

    spawner.spawn(fade_worker_task(fader, fade_queue)).unwrap();

    // ------------------------------------------------------------------------
    // Licht-Zustand, Nachtlicht und Button
    // ------------------------------------------------------------------------

    let bounds = configured_bounds();
    let light = match Light::new(fade_queue, bounds, default_light_state()) {
        Ok(light) => light,
        Err(e) => {
            error!("Light: Configured calibration invalid ({}), using defaults", e);
            Light::new(fade_queue, CalibrationBounds::default(), default_light_state())
                .expect("Default calibration is valid")
        }
    };
    info!("Light: Calibration {}", light.bounds());

    let night_led = Output::new(peripherals.GPIO6, Level::Low, OutputConfig::default());
    let button = Input::new(
        peripherals.GPIO9,
        InputConfig::default().with_pull(Pull::Up),
    );

    static EVENT_CHANNEL: static_cell::StaticCell<LightEventChannel> =
        static_cell::StaticCell::new();
    let event_channel = &*EVENT_CHANNEL.init(LightEventChannel::new());

    // PubSubChannel für Status-Broadcasts an die WebSocket-Clients
    static STATUS_CHANNEL: static_cell::StaticCell<LightStatusChannel> =
        static_cell::StaticCell::new();
    let status_channel = &*STATUS_CHANNEL.init(LightStatusChannel::new());
    let status_publisher = status_channel.publisher().unwrap();

    spawner
        .spawn(light_task(
            light,
            night_led,
            event_channel.receiver(),
            status_publisher,
        ))
        .unwrap();
    spawner
        .spawn(button_task(button, event_channel.sender()))
        .unwrap();
    spawner.spawn(resync_task(event_channel.sender())).unwrap();

    // ------------------------------------------------------------------------
    // WiFi und Web-Oberfläche
    // ------------------------------------------------------------------------

    static RADIO_INIT: static_cell::StaticCell<esp_radio::Controller> =
        static_cell::StaticCell::new();
    let radio_init =
        RADIO_INIT.init(esp_radio::init().expect("Failed to initialize Wi-Fi/BLE controller"));

    let (wifi_controller, wifi_interface) =
        esp_radio::wifi::new(radio_init, peripherals.WIFI, Default::default())
            .expect("Failed to initialize Wi-Fi");

    // Random seed für TCP/IP Stack (von Hardware RNG)
    let rng = Rng::new();
    let seed = (rng.random() as u64) << 32 | rng.random() as u64;

    // HTTP-Listener + WebSocket-Clients
    static RESOURCES: static_cell::StaticCell<StackResources<12>> = static_cell::StaticCell::new();
    let resources = RESOURCES.init(StackResources::new());

    let (stack, runner) = embassy_net::new(
        wifi_interface.sta,
        NetConfig::dhcpv4(Default::default()),
        resources,
        seed,
    );

    static STACK: static_cell::StaticCell<Stack<'static>> = static_cell::StaticCell::new();
    let stack = &*STACK.init(stack);

    spawner.spawn(connection_task(wifi_controller)).unwrap();
    spawner.spawn(net_task(runner)).unwrap();
    spawner.spawn(dhcp_task(stack)).unwrap();

    for task_id in 0..HTTP_TASK_POOL_SIZE {
        spawner
            .spawn(http_server_task(
                task_id,
                stack,
                status_channel,
                event_channel.sender(),
            ))
            .unwrap();
    }

    // Main-Loop: schläft (alle Arbeit läuft in Tasks)
    loop {
        Timer::after(Duration::from_secs(3600)).await;
    }
}
