//! Hardware Abstraction Traits
//!
//! Diese Traits definieren Schnittstellen für Hardware-Zugriff
//! ohne konkrete Implementierung.

use crate::types::PwmChannel;

/// Fehler-Typ für PWM-Operationen (Hardware-Fehler)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PwmError {
    /// Duty liegt außerhalb der Kanal-Auflösung
    DutyOutOfRange,
    /// Der Treiber hat den Fade abgelehnt
    FadeRejected,
}

/// Trait für zwei-kanalige PWM-Hardware mit Fade-Unterstützung
///
/// Minimaler Vertrag, den die Fade-Engine von der Hardware braucht.
/// Wird ausschließlich vom Fade-Worker benutzt (Single Writer).
///
/// # Implementierungen
/// - **Production:** LedcFader (ESP32 LEDC Peripheral)
/// - **Testing:** MockPwmFader (in-memory Mock)
#[allow(async_fn_in_trait)]
pub trait PwmFader {
    /// Programmiert Ziel-Duty und Fade-Dauer eines Kanals (startet noch nicht)
    fn set_fade(
        &mut self,
        channel: PwmChannel,
        duty: u32,
        fade_time_ms: u32,
    ) -> Result<(), PwmError>;

    /// Startet den programmierten Fade, ohne auf das Ende zu warten
    fn fade_start(&mut self, channel: PwmChannel) -> Result<(), PwmError>;

    /// Wartet bis der Fade des Kanals abgeschlossen ist
    async fn fade_wait_done(&mut self, channel: PwmChannel) -> Result<(), PwmError>;
}

#[cfg(feature = "defmt")]
impl defmt::Format for PwmError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            PwmError::DutyOutOfRange => defmt::write!(fmt, "duty out of range"),
            PwmError::FadeRejected => defmt::write!(fmt, "fade rejected"),
        }
    }
}
