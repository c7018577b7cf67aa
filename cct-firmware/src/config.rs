// Projekt-Konfiguration: Konstanten und Hardware-Zuordnungen

use cct_core::{DEFAULT_FADE_TIME_MS, MAX_BRIGHTNESS};

// ============================================================================
// LED / PWM Konfiguration
// ============================================================================

/// GPIO-Pin für den Warm-Kanal (LEDC Kanal 0)
pub const LED_WARM_GPIO: u8 = 4;

/// GPIO-Pin für den Kalt-Kanal (LEDC Kanal 1)
pub const LED_COLD_GPIO: u8 = 5;

/// GPIO-Pin für die Nachtlicht-LED (einfacher Ausgang)
pub const NIGHT_LED_GPIO: u8 = 6;

/// PWM-Frequenz der LEDC-Kanäle in Hz
/// 4 kHz bei 12 Bit Auflösung ist flimmerfrei und mit APB-Takt erreichbar
pub const PWM_FREQUENCY_HZ: u32 = 4_000;

/// Fade-Dauer in ms für einen Übergang über den vollen Duty-Bereich
pub const FADE_TIME_MS: u32 = DEFAULT_FADE_TIME_MS;

/// Poll-Intervall beim Warten auf das Fade-Ende
pub const FADE_POLL_INTERVAL_MS: u64 = 10;

// ============================================================================
// Kalibrierung & Startzustand
// ============================================================================

/// Wärmste darstellbare Farbtemperatur in Kelvin
pub const COLOR_TEMP_WARM_KELVIN: u32 = 2_700;

/// Kälteste darstellbare Farbtemperatur in Kelvin
pub const COLOR_TEMP_COLD_KELVIN: u32 = 6_500;

/// Minimale Helligkeit (> 0, sonst ist die Leuchte "aus")
pub const MIN_BRIGHTNESS: u8 = 1;

/// Maximale Helligkeit
pub const MAX_LEVEL: u8 = MAX_BRIGHTNESS;

/// Power-Zustand nach dem Booten
pub const DEFAULT_POWER: bool = true;

/// Helligkeit nach dem Booten (0-254)
pub const DEFAULT_BRIGHTNESS: u8 = 128;

/// Farbtemperatur nach dem Booten in Kelvin
pub const DEFAULT_COLOR_TEMP_KELVIN: u32 = 4_000;

/// Nachtlicht nach dem Booten (folgt dem Power-Default)
pub const DEFAULT_NIGHT_LIGHT: bool = DEFAULT_POWER;

// ============================================================================
// Button & Resync
// ============================================================================

/// GPIO-Pin für den Taster (active low, interner Pull-Up)
pub const BUTTON_GPIO: u8 = 9;

/// Wartezeit nach einer Flanke, bevor der Pegel geprüft wird
pub const BUTTON_SETTLE_MS: u64 = 50;

/// Intervall für den periodischen Resync der Duties in Sekunden
/// Heilt Fades, die wegen Hardware-Fehlern nicht angewendet wurden
pub const RESYNC_INTERVAL_SECS: u64 = 60;

/// Kapazität der Event-Queue zum Light-Task
pub const LIGHT_EVENT_QUEUE_SIZE: usize = 8;

// ============================================================================
// WiFi Konfiguration
// ============================================================================

/// WiFi SSID (Netzwerk-Name)
/// Wird zur Build-Zeit aus der Environment Variable WIFI_SSID geladen
/// Setze diese in .env file (siehe .env.example)
pub const WIFI_SSID: &str = env!(
    "WIFI_SSID",
    "WiFi SSID nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// WiFi Passwort
/// Wird zur Build-Zeit aus der Environment Variable WIFI_PASSWORD geladen
pub const WIFI_PASSWORD: &str = env!(
    "WIFI_PASSWORD",
    "WiFi Password nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// Wartezeit nach einem fehlgeschlagenen Verbindungsversuch
pub const WIFI_RETRY_DELAY_SECS: u64 = 5;

/// Heap-Größe für WiFi (Bytes)
/// WiFi benötigt dynamischen Speicher für Pakete
pub const WIFI_HEAP_SIZE: usize = 65536; // 64 KB

/// Zusätzliche Heap-Größe (Bytes)
pub const EXTRA_HEAP_SIZE: usize = 36864; // 36 KB

// ============================================================================
// HTTP Server Konfiguration
// ============================================================================

/// Anzahl paralleler HTTP-Server-Tasks
pub const HTTP_TASK_POOL_SIZE: usize = 4;

/// HTTP Buffer-Größe in Bytes
pub const HTTP_BUFFER_SIZE: usize = 1024;

/// TCP RX Buffer-Größe in Bytes
pub const TCP_RX_BUFFER_SIZE: usize = 1024;

/// TCP TX Buffer-Größe in Bytes
pub const TCP_TX_BUFFER_SIZE: usize = 1024;

/// WebSocket Message Buffer-Größe in Bytes
pub const WEBSOCKET_BUFFER_SIZE: usize = 512;

/// JSON Serialisierungs-Buffer für Server-Nachrichten
/// Größte Nachricht: {"type":"status","status":{...,"target":{"warm":..,"cold":..}},...}
pub const JSON_STATUS_BUFFER_SIZE: usize = 256;
