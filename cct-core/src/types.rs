//! Core Types für die CCT-Lichtsteuerung
//!
//! Datenstrukturen und Konstanten ohne Hardware-Dependencies

// ============================================================================
// Konstanten
// ============================================================================

/// Auflösung der PWM-Kanäle in Bit (LEDC 12 Bit)
pub const PWM_RESOLUTION_BITS: u32 = 12;

/// Anzahl der Duty-Stufen pro Kanal (`1 << PWM_RESOLUTION_BITS`)
pub const PWM_SCALE: u32 = 1 << PWM_RESOLUTION_BITS;

/// Größter erlaubter Duty-Wert, alle Duties liegen in `[0, PWM_SCALE)`
pub const PWM_MAX_DUTY: u32 = PWM_SCALE - 1;

/// Maximale Helligkeit (Level-Control Obergrenze)
pub const MAX_BRIGHTNESS: u8 = 254;

/// Verstärkung des Sekundär-Kanals bei der Farbmischung
///
/// Tunable: mit 2 leuchtet der schwächere Kanal am Neutralpunkt genauso hell
/// wie der Primär-Kanal und läuft erst am Rand des Bereichs auf 0 aus.
pub const MARGIN_FACTOR: u32 = 2;

/// Fade-Dauer in ms für einen Übergang über den vollen Duty-Bereich
pub const DEFAULT_FADE_TIME_MS: u32 = 1000;

/// Kapazität der Fade-Request-Queue
pub const FADE_QUEUE_CAPACITY: usize = 10;

/// Faktor für die Umrechnung Mired ↔ Kelvin
pub const MIRED_FACTOR: u32 = 1_000_000;

// ============================================================================
// Kalibrierung
// ============================================================================

/// Fehler beim Setzen der Kalibrierung
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Warm- und Kalt-Mired sind gleich (Division durch 0)
    EqualMireds,
    /// Warm-Mired ist kleiner als Kalt-Mired
    InvertedMireds,
    /// Minimale Helligkeit ist größer als die maximale
    InvertedBrightness,
}

/// Kalibrierte Grenzen der Leuchte
///
/// `warm_mireds` ist die wärmste (größter Mired-Wert), `cold_mireds` die
/// kälteste Farbtemperatur, die die LEDs physikalisch darstellen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationBounds {
    pub warm_mireds: u16,
    pub cold_mireds: u16,
    pub min_brightness: u8,
    pub max_brightness: u8,
}

impl CalibrationBounds {
    pub const fn new(
        warm_mireds: u16,
        cold_mireds: u16,
        min_brightness: u8,
        max_brightness: u8,
    ) -> Self {
        Self {
            warm_mireds,
            cold_mireds,
            min_brightness,
            max_brightness,
        }
    }

    /// Erstellt die Grenzen aus Farbtemperaturen in Kelvin
    pub fn from_kelvin(warm_kelvin: u32, cold_kelvin: u32, min: u8, max: u8) -> Self {
        Self::new(
            crate::logic::kelvin_to_mireds(warm_kelvin),
            crate::logic::kelvin_to_mireds(cold_kelvin),
            min,
            max,
        )
    }

    /// Prüft die Invarianten der Kalibrierung
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.warm_mireds == self.cold_mireds {
            return Err(ConfigError::EqualMireds);
        }
        if self.warm_mireds < self.cold_mireds {
            return Err(ConfigError::InvertedMireds);
        }
        if self.min_brightness > self.max_brightness {
            return Err(ConfigError::InvertedBrightness);
        }
        Ok(())
    }

    /// Mitte zwischen warm und kalt (ohne u16-Überlauf)
    pub fn neutral_mireds(&self) -> u32 {
        (u32::from(self.warm_mireds) + u32::from(self.cold_mireds)) / 2
    }

    /// Begrenzt eine Farbtemperatur auf den kalibrierten Bereich
    pub fn clamp_mireds(&self, mireds: u16) -> u16 {
        let low = self.cold_mireds.min(self.warm_mireds);
        let high = self.cold_mireds.max(self.warm_mireds);
        mireds.clamp(low, high)
    }

    /// Begrenzt eine Helligkeit > 0 auf `[min_brightness, max_brightness]`
    ///
    /// 0 bleibt 0, damit "aus" nicht auf die Minimal-Helligkeit angehoben wird.
    pub fn clamp_brightness(&self, brightness: u8) -> u8 {
        if brightness == 0 {
            return 0;
        }
        brightness
            .max(self.min_brightness)
            .min(self.max_brightness.max(self.min_brightness))
    }
}

impl Default for CalibrationBounds {
    /// 2700 K warm, 6500 K kalt, Helligkeit 1..=254
    fn default() -> Self {
        Self::new(370, 153, 1, MAX_BRIGHTNESS)
    }
}

// ============================================================================
// Licht-Zustand
// ============================================================================

/// Zuletzt bekannter Zustand der Leuchte
///
/// Gehört exklusiv zum `LightController`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LightState {
    pub power: bool,
    pub brightness: u8,
    pub color_temperature_mireds: u16,
}

impl LightState {
    /// Helligkeit für die Duty-Berechnung: 0 wenn ausgeschaltet
    pub fn effective_brightness(&self) -> u8 {
        if self.power { self.brightness } else { 0 }
    }
}

/// Duty-Werte beider Kanäle, jeweils in `[0, PWM_SCALE)`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DutyPair {
    pub warm: u32,
    pub cold: u32,
}

impl DutyPair {
    pub const OFF: Self = Self { warm: 0, cold: 0 };

    pub const fn new(warm: u32, cold: u32) -> Self {
        Self { warm, cold }
    }

    /// Duty eines einzelnen Kanals
    pub fn get(&self, channel: PwmChannel) -> u32 {
        match channel {
            PwmChannel::Warm => self.warm,
            PwmChannel::Cold => self.cold,
        }
    }
}

/// Physischer LED-Kanal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PwmChannel {
    Warm,
    Cold,
}

impl PwmChannel {
    /// Alle Kanäle in Start-Reihenfolge eines Fades
    pub const ALL: [PwmChannel; 2] = [PwmChannel::Warm, PwmChannel::Cold];

    /// Index für kanal-indizierte Arrays
    pub const fn index(self) -> usize {
        match self {
            PwmChannel::Warm => 0,
            PwmChannel::Cold => 1,
        }
    }
}

/// Zeitgesteuerter Übergang beider Kanäle
///
/// Beide Kanäle teilen sich immer dieselbe `fade_time_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FadeCommand {
    pub target: DutyPair,
    pub fade_time_ms: u32,
}

/// Register-Werte für einen LEDC Hardware-Fade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FadeSteps {
    pub duty_steps: u16,
    pub cycles_per_step: u16,
    pub duty_per_cycle: u16,
}

// ============================================================================
// Events
// ============================================================================

/// Endpoint, auf den sich eine Attribut-Änderung bezieht
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Die CCT-Leuchte (warm + kalt)
    Light,
    /// Die Nachtlicht-LED (nur an/aus)
    NightLight,
}

/// Geänderter Attribut-Wert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeChange {
    Power(bool),
    Brightness(u8),
    ColorTemperature(u16),
}

/// Attribut-Änderung von außen (Protokoll-Stack, Web-Oberfläche)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeEvent {
    pub endpoint: Endpoint,
    pub change: AttributeChange,
}

impl AttributeEvent {
    pub const fn light(change: AttributeChange) -> Self {
        Self {
            endpoint: Endpoint::Light,
            change,
        }
    }

    pub const fn night_light(on: bool) -> Self {
        Self {
            endpoint: Endpoint::NightLight,
            change: AttributeChange::Power(on),
        }
    }
}

/// Nachricht an den Light-Task
///
/// Wird von Button-, Resync- und HTTP-Tasks gesendet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightEvent {
    Attribute(AttributeEvent),
    /// Button: Power umschalten
    TogglePower,
    SetBounds(CalibrationBounds),
    /// Duties aus dem gecachten Zustand neu ableiten
    Resync,
}

/// Status-Snapshot für Broadcasts an die Web-Oberfläche
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LightStatus {
    pub power: bool,
    pub brightness: u8,
    pub mireds: u16,
    pub night_light: bool,
    pub target: DutyPair,
    pub dropped_fades: u32,
}

// ============================================================================
// defmt::Format Implementations (optional feature)
// ============================================================================

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            ConfigError::EqualMireds => defmt::write!(fmt, "warm and cold mireds are equal"),
            ConfigError::InvertedMireds => defmt::write!(fmt, "warm mireds below cold mireds"),
            ConfigError::InvertedBrightness => {
                defmt::write!(fmt, "min brightness above max brightness")
            }
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for CalibrationBounds {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "Bounds {{ warm: {}, cold: {}, brightness: {}..={} }}",
            self.warm_mireds,
            self.cold_mireds,
            self.min_brightness,
            self.max_brightness
        )
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for DutyPair {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "(warm: {}, cold: {})", self.warm, self.cold)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PwmChannel {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            PwmChannel::Warm => defmt::write!(fmt, "warm"),
            PwmChannel::Cold => defmt::write!(fmt, "cold"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for FadeCommand {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{} in {} ms", self.target, self.fade_time_ms)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for LightEvent {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            LightEvent::Attribute(AttributeEvent { endpoint, change }) => {
                let endpoint = match endpoint {
                    Endpoint::Light => "light",
                    Endpoint::NightLight => "night light",
                };
                match change {
                    AttributeChange::Power(on) => {
                        defmt::write!(fmt, "{} power: {}", endpoint, on)
                    }
                    AttributeChange::Brightness(level) => {
                        defmt::write!(fmt, "{} brightness: {}", endpoint, level)
                    }
                    AttributeChange::ColorTemperature(mireds) => {
                        defmt::write!(fmt, "{} temperature: {} mireds", endpoint, mireds)
                    }
                }
            }
            LightEvent::TogglePower => defmt::write!(fmt, "TogglePower"),
            LightEvent::SetBounds(bounds) => defmt::write!(fmt, "SetBounds {}", bounds),
            LightEvent::Resync => defmt::write!(fmt, "Resync"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bounds_are_valid() {
        assert_eq!(CalibrationBounds::default().validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_equal_mireds() {
        let bounds = CalibrationBounds::new(300, 300, 1, 254);
        assert_eq!(bounds.validate(), Err(ConfigError::EqualMireds));
    }

    #[test]
    fn test_validate_rejects_inverted_bounds() {
        let mireds = CalibrationBounds::new(153, 500, 1, 254);
        assert_eq!(mireds.validate(), Err(ConfigError::InvertedMireds));

        let brightness = CalibrationBounds::new(500, 153, 200, 100);
        assert_eq!(brightness.validate(), Err(ConfigError::InvertedBrightness));
    }

    #[test]
    fn test_neutral_mireds_does_not_overflow() {
        let bounds = CalibrationBounds::new(u16::MAX, u16::MAX - 2, 1, 254);
        assert_eq!(bounds.neutral_mireds(), u32::from(u16::MAX) - 1);
    }

    #[test]
    fn test_clamp_brightness_keeps_zero() {
        let bounds = CalibrationBounds::new(500, 153, 10, 200);
        assert_eq!(bounds.clamp_brightness(0), 0);
        assert_eq!(bounds.clamp_brightness(3), 10);
        assert_eq!(bounds.clamp_brightness(254), 200);
        assert_eq!(bounds.clamp_brightness(100), 100);
    }

    #[test]
    fn test_clamp_mireds() {
        let bounds = CalibrationBounds::new(500, 153, 1, 254);
        assert_eq!(bounds.clamp_mireds(100), 153);
        assert_eq!(bounds.clamp_mireds(600), 500);
        assert_eq!(bounds.clamp_mireds(250), 250);
    }

    #[test]
    fn test_effective_brightness_off() {
        let state = LightState {
            power: false,
            brightness: 120,
            color_temperature_mireds: 250,
        };
        assert_eq!(state.effective_brightness(), 0);
        assert_eq!(LightState { power: true, ..state }.effective_brightness(), 120);
    }
}
