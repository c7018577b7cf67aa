// Button Task - Taster schaltet die Leuchte ein/aus
use defmt::{info, warn};
use embassy_time::Timer;
use esp_hal::gpio::Input;

use crate::config::BUTTON_SETTLE_MS;
use crate::{LightEvent, LightEventSender};

/// Button Task
///
/// Taster ist active low (interner Pull-Up). Nach der fallenden Flanke
/// wird kurz gewartet und der Pegel erneut geprüft, erst dann wird
/// `TogglePower` gesendet. Danach wartet der Task auf das Loslassen.
#[embassy_executor::task]
pub async fn button_task(mut button: Input<'static>, events: LightEventSender) {
    info!("Button: Task started");

    loop {
        button.wait_for_falling_edge().await;
        Timer::after_millis(BUTTON_SETTLE_MS).await;

        if button.is_low() {
            info!("Button: Pressed, toggling power");
            // Nicht blockieren: bei voller Queue geht der Tastendruck verloren
            if events.try_send(LightEvent::TogglePower).is_err() {
                warn!("Button: Event queue full, press dropped");
            }
        }

        button.wait_for_high().await;
        Timer::after_millis(BUTTON_SETTLE_MS).await;
    }
}
