//! Licht-Zustand und Attribut-Verarbeitung
//!
//! Der `LightController` hält Power, Helligkeit und Farbtemperatur,
//! leitet bei jeder Änderung die Duties neu ab und reicht sie an die
//! Fade-Queue weiter. Er fasst nie selbst Hardware an.

use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::fade::FadeQueue;
use crate::logic::compute_duties;
use crate::types::{
    AttributeChange, AttributeEvent, CalibrationBounds, ConfigError, DutyPair, Endpoint,
    LightEvent, LightState, LightStatus, MAX_BRIGHTNESS,
};

/// Was der Aufrufer nach einem Event tun muss
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightOutcome {
    /// Ein Fade zu diesen Duties wurde angefordert
    Fade(DutyPair),
    /// Nachtlicht-GPIO auf diesen Pegel setzen
    NightLight(bool),
    /// Event betrifft nichts, was gesteuert wird
    Ignored,
}

/// Fassade über Licht-Zustand, Duty-Berechnung und Fade-Queue
pub struct LightController<'q, M: RawMutex, const N: usize> {
    queue: &'q FadeQueue<M, N>,
    bounds: CalibrationBounds,
    state: LightState,
    night_light: bool,
    target: DutyPair,
}

impl<'q, M: RawMutex, const N: usize> LightController<'q, M, N> {
    /// Erstellt den Controller mit geprüfter Kalibrierung
    ///
    /// Fordert noch keinen Fade an, siehe [`LightController::restore`].
    pub fn new(
        queue: &'q FadeQueue<M, N>,
        bounds: CalibrationBounds,
        state: LightState,
    ) -> Result<Self, ConfigError> {
        bounds.validate()?;
        let state = LightState {
            brightness: state.brightness.min(MAX_BRIGHTNESS),
            color_temperature_mireds: bounds.clamp_mireds(state.color_temperature_mireds),
            ..state
        };
        Ok(Self {
            queue,
            bounds,
            state,
            night_light: false,
            target: DutyPair::OFF,
        })
    }

    /// Fährt die Leuchte auf den gecachten Zustand (Boot)
    ///
    /// `night_light` ist der Nachtlicht-Zustand nach dem Booten.
    pub fn restore(&mut self, night_light: bool) -> DutyPair {
        self.night_light = night_light;
        self.refresh()
    }

    pub fn set_power(&mut self, power: bool) -> DutyPair {
        self.state.power = power;
        self.refresh()
    }

    pub fn toggle_power(&mut self) -> DutyPair {
        self.set_power(!self.state.power)
    }

    /// Setzt die Helligkeit; bleibt auch bei ausgeschalteter Leuchte gecacht
    pub fn set_brightness(&mut self, brightness: u8) -> DutyPair {
        self.state.brightness = brightness.min(MAX_BRIGHTNESS);
        self.refresh()
    }

    /// Setzt die Farbtemperatur, begrenzt auf den kalibrierten Bereich
    pub fn set_temperature(&mut self, mireds: u16) -> DutyPair {
        self.state.color_temperature_mireds = self.bounds.clamp_mireds(mireds);
        self.refresh()
    }

    /// Übernimmt neue Kalibrierung und leitet die Duties sofort neu ab
    ///
    /// Ungültige Grenzen werden abgelehnt, die alten bleiben aktiv.
    pub fn set_bounds(&mut self, bounds: CalibrationBounds) -> Result<DutyPair, ConfigError> {
        bounds.validate()?;
        self.bounds = bounds;
        self.state.color_temperature_mireds =
            bounds.clamp_mireds(self.state.color_temperature_mireds);
        Ok(self.refresh())
    }

    /// Nachtlicht gehört nicht zur Fade-Engine, der Pegel wird nur gecacht
    pub fn set_night_light(&mut self, on: bool) -> bool {
        self.night_light = on;
        on
    }

    /// Leitet die Duties aus dem Cache neu ab (periodischer Resync)
    pub fn resync(&mut self) -> DutyPair {
        self.refresh()
    }

    /// Einstiegspunkt für Attribut-Änderungen von außen
    pub fn on_attribute_changed(&mut self, event: AttributeEvent) -> LightOutcome {
        match (event.endpoint, event.change) {
            (Endpoint::Light, AttributeChange::Power(on)) => LightOutcome::Fade(self.set_power(on)),
            (Endpoint::Light, AttributeChange::Brightness(level)) => {
                LightOutcome::Fade(self.set_brightness(level))
            }
            (Endpoint::Light, AttributeChange::ColorTemperature(mireds)) => {
                LightOutcome::Fade(self.set_temperature(mireds))
            }
            (Endpoint::NightLight, AttributeChange::Power(on)) => {
                LightOutcome::NightLight(self.set_night_light(on))
            }
            (Endpoint::NightLight, _) => LightOutcome::Ignored,
        }
    }

    /// Verarbeitet ein Event aus der Light-Task Queue
    pub fn handle(&mut self, event: LightEvent) -> Result<LightOutcome, ConfigError> {
        match event {
            LightEvent::Attribute(attribute) => Ok(self.on_attribute_changed(attribute)),
            LightEvent::TogglePower => Ok(LightOutcome::Fade(self.toggle_power())),
            LightEvent::SetBounds(bounds) => self.set_bounds(bounds).map(LightOutcome::Fade),
            LightEvent::Resync => Ok(LightOutcome::Fade(self.resync())),
        }
    }

    pub fn state(&self) -> LightState {
        self.state
    }

    pub fn bounds(&self) -> CalibrationBounds {
        self.bounds
    }

    /// Zuletzt angeforderte Ziel-Duties
    pub fn target(&self) -> DutyPair {
        self.target
    }

    pub fn night_light(&self) -> bool {
        self.night_light
    }

    pub fn status(&self) -> LightStatus {
        LightStatus {
            power: self.state.power,
            brightness: self.state.brightness,
            mireds: self.state.color_temperature_mireds,
            night_light: self.night_light,
            target: self.target,
            dropped_fades: self.queue.overflow_count(),
        }
    }

    fn effective_brightness(&self) -> u8 {
        self.bounds.clamp_brightness(self.state.effective_brightness())
    }

    fn refresh(&mut self) -> DutyPair {
        let target = compute_duties(
            self.effective_brightness(),
            self.state.color_temperature_mireds,
            &self.bounds,
        );
        self.queue.request_fade(target);
        self.target = target;
        target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PWM_MAX_DUTY;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    type Queue = FadeQueue<NoopRawMutex, 16>;

    const BOUNDS: CalibrationBounds = CalibrationBounds::new(500, 153, 1, 254);

    fn initial() -> LightState {
        LightState {
            power: true,
            brightness: 254,
            color_temperature_mireds: 153,
        }
    }

    #[test]
    fn test_new_rejects_invalid_bounds() {
        let queue = Queue::new();
        let bounds = CalibrationBounds::new(200, 200, 1, 254);
        assert_eq!(
            LightController::new(&queue, bounds, initial()).err(),
            Some(ConfigError::EqualMireds)
        );
    }

    #[test]
    fn test_new_does_not_request_fade() {
        let queue = Queue::new();
        let _light = LightController::new(&queue, BOUNDS, initial()).unwrap();
        assert!(queue.is_empty());
    }

    #[test]
    fn test_restore_requests_cached_state() {
        let queue = Queue::new();
        let mut light = LightController::new(&queue, BOUNDS, initial()).unwrap();
        let target = light.restore(false);
        assert_eq!(target, DutyPair::new(0, PWM_MAX_DUTY));
        assert_eq!(queue.try_receive(), Some(target));
        assert!(!light.night_light());
    }

    #[test]
    fn test_restore_applies_boot_night_light() {
        let queue = Queue::new();
        let mut light = LightController::new(&queue, BOUNDS, initial()).unwrap();
        assert!(!light.night_light());

        let target = light.restore(true);
        assert!(light.night_light());
        assert!(light.status().night_light);
        // Nachtlicht ist ein GPIO, nur der PWM-Zustand wird gefadet
        assert_eq!(queue.try_receive(), Some(target));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_power_off_keeps_brightness() {
        let queue = Queue::new();
        let mut light = LightController::new(&queue, BOUNDS, initial()).unwrap();
        light.set_brightness(100);
        assert_eq!(light.set_power(false), DutyPair::OFF);
        assert_eq!(light.state().brightness, 100);
    }

    #[test]
    fn test_brightness_while_off_stays_dark() {
        let queue = Queue::new();
        let mut light = LightController::new(&queue, BOUNDS, initial()).unwrap();
        light.set_power(false);
        assert_eq!(light.set_brightness(200), DutyPair::OFF);
        assert_ne!(light.set_power(true), DutyPair::OFF);
    }

    #[test]
    fn test_brightness_is_clamped_to_bounds() {
        let queue = Queue::new();
        let bounds = CalibrationBounds::new(500, 153, 50, 200);
        let mut light = LightController::new(&queue, bounds, initial()).unwrap();

        let low = light.set_brightness(1);
        assert_eq!(low, compute_duties(50, 153, &bounds));
        assert_eq!(light.state().brightness, 1);

        let high = light.set_brightness(254);
        assert_eq!(high, compute_duties(200, 153, &bounds));
    }

    #[test]
    fn test_temperature_is_clamped() {
        let queue = Queue::new();
        let mut light = LightController::new(&queue, BOUNDS, initial()).unwrap();
        light.set_temperature(900);
        assert_eq!(light.state().color_temperature_mireds, 500);
    }

    #[test]
    fn test_invalid_bounds_keep_previous() {
        let queue = Queue::new();
        let mut light = LightController::new(&queue, BOUNDS, initial()).unwrap();
        let result = light.set_bounds(CalibrationBounds::new(153, 500, 1, 254));
        assert_eq!(result, Err(ConfigError::InvertedMireds));
        assert_eq!(light.bounds(), BOUNDS);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_valid_bounds_rederive() {
        let queue = Queue::new();
        let mut light = LightController::new(&queue, BOUNDS, initial()).unwrap();
        light.set_temperature(450);
        while queue.try_receive().is_some() {}

        let narrow = CalibrationBounds::new(400, 200, 1, 254);
        let target = light.set_bounds(narrow).unwrap();
        assert_eq!(light.state().color_temperature_mireds, 400);
        assert_eq!(target, compute_duties(254, 400, &narrow));
        assert_eq!(queue.try_receive(), Some(target));
    }

    #[test]
    fn test_night_light_does_not_fade() {
        let queue = Queue::new();
        let mut light = LightController::new(&queue, BOUNDS, initial()).unwrap();

        let outcome = light.on_attribute_changed(AttributeEvent::night_light(true));
        assert_eq!(outcome, LightOutcome::NightLight(true));
        assert!(light.night_light());
        assert!(queue.is_empty());

        let ignored = light.on_attribute_changed(AttributeEvent {
            endpoint: Endpoint::NightLight,
            change: AttributeChange::Brightness(10),
        });
        assert_eq!(ignored, LightOutcome::Ignored);
    }

    #[test]
    fn test_handle_toggle_power() {
        let queue = Queue::new();
        let mut light = LightController::new(&queue, BOUNDS, initial()).unwrap();
        assert_eq!(
            light.handle(LightEvent::TogglePower),
            Ok(LightOutcome::Fade(DutyPair::OFF))
        );
        assert!(!light.state().power);
    }

    #[test]
    fn test_status_snapshot() {
        let queue = Queue::new();
        let mut light = LightController::new(&queue, BOUNDS, initial()).unwrap();
        light.set_night_light(true);
        let target = light.set_temperature(500);

        let status = light.status();
        assert!(status.power);
        assert!(status.night_light);
        assert_eq!(status.mireds, 500);
        assert_eq!(status.target, target);
        assert_eq!(status.dropped_fades, 0);
    }
}
