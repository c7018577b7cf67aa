// Light Task - hält den Licht-Zustand und übersetzt Events in Fades
use cct_core::{LightOutcome, mireds_to_kelvin};
use defmt::{debug, error, info, warn};
use esp_hal::gpio::{Level, Output};

use crate::config::DEFAULT_NIGHT_LIGHT;
use crate::{Light, LightEvent, LightEventReceiver, LightStatusPublisher};

/// Light Task
///
/// Einziger Schreiber des Licht-Zustands:
/// - Fährt beim Start den Default-Zustand an
/// - Verarbeitet Events von Button, HTTP und Resync
/// - Schaltet das Nachtlicht direkt per GPIO
/// - Publiziert nach jeder Änderung einen Status-Snapshot
#[embassy_executor::task]
pub async fn light_task(
    mut light: Light,
    mut night_led: Output<'static>,
    events: LightEventReceiver,
    status: LightStatusPublisher,
) {
    let target = light.restore(DEFAULT_NIGHT_LIGHT);
    night_led.set_level(Level::from(light.night_light()));
    log_state(&light);
    info!("Light: Restored, target {}", target);
    status.publish_immediate(light.status());

    loop {
        let event = events.receive().await;
        if event == LightEvent::Resync {
            debug!("Light: Resync");
        } else {
            info!("Light: Event {}", event);
        }

        match light.handle(event) {
            Ok(LightOutcome::Fade(target)) => {
                if event != LightEvent::Resync {
                    log_state(&light);
                    info!("Light: Requested fade to {}", target);
                }
            }
            Ok(LightOutcome::NightLight(on)) => {
                night_led.set_level(Level::from(on));
                info!("Light: Night light {}", if on { "on" } else { "off" });
            }
            Ok(LightOutcome::Ignored) => {
                warn!("Light: Event has no effect, ignored");
                continue;
            }
            Err(e) => {
                error!("Light: Calibration rejected: {}", e);
                continue;
            }
        }

        status.publish_immediate(light.status());
    }
}

fn log_state(light: &Light) {
    let state = light.state();
    info!(
        "Light: power {}, brightness {}, temperature {} mireds ({} K)",
        state.power,
        state.brightness,
        state.color_temperature_mireds,
        mireds_to_kelvin(state.color_temperature_mireds)
    );
}
