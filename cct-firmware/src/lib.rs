// Library-Root: Wiederverwendbare Logik und Module
// Keine Standard-Bibliothek (Embedded System)
#![no_std]

// Module
pub mod config;
pub mod hal;
pub mod tasks;
pub mod web;

// Re-exports von cct-core
pub use cct_core::{
    CalibrationBounds, DutyPair, FADE_QUEUE_CAPACITY, FadeQueue, LightController, LightEvent,
    LightState, LightStatus, kelvin_to_mireds,
};

// Embassy Channel-Typen
use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, NoopRawMutex};
use embassy_sync::channel::{Channel, Receiver, Sender};
use embassy_sync::pubsub::{PubSubChannel, Publisher, Subscriber};

use crate::config::{
    COLOR_TEMP_COLD_KELVIN, COLOR_TEMP_WARM_KELVIN, DEFAULT_BRIGHTNESS,
    DEFAULT_COLOR_TEMP_KELVIN, DEFAULT_POWER, LIGHT_EVENT_QUEUE_SIZE, MAX_LEVEL, MIN_BRIGHTNESS,
};

// ============================================================================
// Startwerte aus der Konfiguration
// ============================================================================

/// Kalibrierung aus `config.rs`
pub fn configured_bounds() -> CalibrationBounds {
    CalibrationBounds::from_kelvin(
        COLOR_TEMP_WARM_KELVIN,
        COLOR_TEMP_COLD_KELVIN,
        MIN_BRIGHTNESS,
        MAX_LEVEL,
    )
}

/// Zustand nach dem Booten (ersetzt den wiederhergestellten Attribut-Speicher)
pub fn default_light_state() -> LightState {
    LightState {
        power: DEFAULT_POWER,
        brightness: DEFAULT_BRIGHTNESS,
        color_temperature_mireds: kelvin_to_mireds(DEFAULT_COLOR_TEMP_KELVIN),
    }
}

// ============================================================================
// Type-Aliase für Channel-Typen
// ============================================================================
//
// Fade-Queue und Event-Channel haben mehrere Producer (Button, HTTP, Resync),
// daher CriticalSectionRawMutex. Der Status-Broadcast läuft nur zwischen
// Tasks desselben Executors.

/// Fade-Request-Queue (Light Task → Fade Worker)
pub type FadeRequestQueue = FadeQueue<CriticalSectionRawMutex, FADE_QUEUE_CAPACITY>;

/// Licht-Fassade, die in die Fade-Queue schreibt
pub type Light = LightController<'static, CriticalSectionRawMutex, FADE_QUEUE_CAPACITY>;

/// Channel für Licht-Events (Button/HTTP/Resync → Light Task)
pub type LightEventChannel = Channel<CriticalSectionRawMutex, LightEvent, LIGHT_EVENT_QUEUE_SIZE>;

/// Sender für Licht-Events
pub type LightEventSender =
    Sender<'static, CriticalSectionRawMutex, LightEvent, LIGHT_EVENT_QUEUE_SIZE>;

/// Receiver für Licht-Events (nur der Light Task)
pub type LightEventReceiver =
    Receiver<'static, CriticalSectionRawMutex, LightEvent, LIGHT_EVENT_QUEUE_SIZE>;

/// PubSubChannel für Status-Broadcasts
/// - 2: Nachrichten-Kapazität im Queue
/// - 10: Maximale Anzahl Subscribers (WebSocket-Verbindungen)
/// - 1: Publisher (Light Task)
pub type LightStatusChannel = PubSubChannel<NoopRawMutex, LightStatus, 2, 10, 1>;

/// Publisher für Status-Broadcasts
pub type LightStatusPublisher = Publisher<'static, NoopRawMutex, LightStatus, 2, 10, 1>;

/// Subscriber für Status-Broadcasts
pub type LightStatusSubscriber = Subscriber<'static, NoopRawMutex, LightStatus, 2, 10, 1>;

// Host-Tests für alles ohne Hardware liegen in cct-core und cct-tests;
// dieses Crate kompiliert nur für riscv32imac-unknown-none-elf.
