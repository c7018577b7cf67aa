// WebSocket-Protokoll-Definitionen
// Definiert die JSON-Nachrichten für Client ↔ Server Kommunikation

use cct_core::{
    AttributeChange, AttributeEvent, CalibrationBounds, LightEvent, LightStatus,
    kelvin_to_mireds,
};
use serde::{Deserialize, Serialize};

/// Client → Server Nachrichten
/// Kommandos vom Browser an den ESP32
///
/// Flache Struktur mit optionalen Feldern, welches Feld gilt bestimmt `type`.
/// Beispiele:
/// - `{"type":"set_power","on":true}`
/// - `{"type":"set_brightness","brightness":128}`
/// - `{"type":"set_temperature","kelvin":4000}` oder `"mireds":250`
/// - `{"type":"set_night_light","on":false}`
/// - `{"type":"set_bounds","warm_kelvin":2700,"cold_kelvin":6500,"min_brightness":1,"max_brightness":254}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct WsClientMessage {
    #[serde(rename = "type")]
    pub msg_type: MessageType,
    #[serde(default)]
    pub on: Option<bool>,
    #[serde(default)]
    pub brightness: Option<u8>,
    #[serde(default)]
    pub mireds: Option<u16>,
    #[serde(default)]
    pub kelvin: Option<u32>,
    #[serde(default)]
    pub warm_kelvin: Option<u32>,
    #[serde(default)]
    pub cold_kelvin: Option<u32>,
    #[serde(default)]
    pub min_brightness: Option<u8>,
    #[serde(default)]
    pub max_brightness: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, defmt::Format)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    SetPower,
    SetBrightness,
    SetTemperature,
    SetNightLight,
    SetBounds,
}

/// Kommando ist gültiges JSON, aber unvollständig
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum ProtocolError {
    MissingField(&'static str),
}

impl ProtocolError {
    /// Text für die Error-Nachricht an den Browser
    pub fn message(self) -> &'static str {
        match self {
            ProtocolError::MissingField("on") => "missing field: on",
            ProtocolError::MissingField("brightness") => "missing field: brightness",
            ProtocolError::MissingField("temperature") => "missing field: kelvin or mireds",
            ProtocolError::MissingField(_) => "missing calibration field",
        }
    }
}

impl WsClientMessage {
    /// Übersetzt das Kommando in ein Event für den Light Task
    pub fn to_event(&self) -> Result<LightEvent, ProtocolError> {
        let event = match self.msg_type {
            MessageType::SetPower => {
                let on = self.on.ok_or(ProtocolError::MissingField("on"))?;
                LightEvent::Attribute(AttributeEvent::light(AttributeChange::Power(on)))
            }
            MessageType::SetBrightness => {
                let level = self
                    .brightness
                    .ok_or(ProtocolError::MissingField("brightness"))?;
                LightEvent::Attribute(AttributeEvent::light(AttributeChange::Brightness(level)))
            }
            MessageType::SetTemperature => {
                let mireds = match (self.mireds, self.kelvin) {
                    (Some(mireds), _) => mireds,
                    (None, Some(kelvin)) => kelvin_to_mireds(kelvin),
                    (None, None) => return Err(ProtocolError::MissingField("temperature")),
                };
                LightEvent::Attribute(AttributeEvent::light(AttributeChange::ColorTemperature(
                    mireds,
                )))
            }
            MessageType::SetNightLight => {
                let on = self.on.ok_or(ProtocolError::MissingField("on"))?;
                LightEvent::Attribute(AttributeEvent::night_light(on))
            }
            MessageType::SetBounds => {
                let warm = self
                    .warm_kelvin
                    .ok_or(ProtocolError::MissingField("warm_kelvin"))?;
                let cold = self
                    .cold_kelvin
                    .ok_or(ProtocolError::MissingField("cold_kelvin"))?;
                let min = self
                    .min_brightness
                    .ok_or(ProtocolError::MissingField("min_brightness"))?;
                let max = self
                    .max_brightness
                    .ok_or(ProtocolError::MissingField("max_brightness"))?;
                // Prüfung erfolgt im Light Task, ungültige Grenzen werden dort verworfen
                LightEvent::SetBounds(CalibrationBounds::from_kelvin(warm, cold, min, max))
            }
        };
        Ok(event)
    }
}

/// Server → Client Nachrichten
/// Status-Updates und Fehler vom ESP32 an den Browser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum WsServerMessage {
    #[serde(rename = "status")]
    Status {
        status: LightStatus,
        kelvin: u32,
        timestamp_ms: u64,
    },
    #[serde(rename = "error")]
    Error { message: &'static str },
}
