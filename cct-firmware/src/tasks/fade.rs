// Fade Worker Task - einziger Besitzer der LEDC-Hardware
use cct_core::{FadeWorker, PwmFader};
use defmt::{error, info};

use crate::FadeRequestQueue;
use crate::config::FADE_TIME_MS;
use crate::hal::LedcFader;

/// Fade Worker Task
///
/// Nimmt Ziel-Duties aus der Fade-Queue und wendet sie nacheinander an.
/// Ein Fade läuft immer vollständig durch, bevor der nächste startet.
#[embassy_executor::task]
pub async fn fade_worker_task(fader: LedcFader<'static>, queue: &'static FadeRequestQueue) {
    fade_worker_logic(FadeWorker::new(fader, FADE_TIME_MS), queue).await
}

/// Worker-Schleife, generisch über den Fader
///
/// Hardware-Fehler beenden die Schleife nicht; der Duty bleibt auf dem
/// letzten bekannten Stand und der nächste Request wird davon aus getimt.
pub async fn fade_worker_logic<P: PwmFader>(
    mut worker: FadeWorker<P>,
    queue: &'static FadeRequestQueue,
) -> ! {
    info!(
        "Fade: Worker started (fade time constant: {} ms)",
        worker.fade_time_constant_ms()
    );

    loop {
        let target = queue.receive().await;

        match worker.apply(target).await {
            Ok(command) => info!("Fade: Applied {}", command),
            Err(e) => error!(
                "Fade: Failed to apply {}: {} ({} faults so far)",
                target,
                e,
                worker.stats().faults
            ),
        }
    }
}
