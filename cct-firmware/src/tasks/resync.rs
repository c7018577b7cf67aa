// Resync Task - periodischer Abgleich der PWM-Duties
use defmt::{debug, info};
use embassy_time::{Duration, Ticker};

use crate::config::RESYNC_INTERVAL_SECS;
use crate::{LightEvent, LightEventSender};

/// Resync Task
///
/// Fordert in festem Intervall eine Neuberechnung der Duties aus dem
/// gecachten Zustand an. Identische Ziele ergeben einen Fade ohne Dauer.
#[embassy_executor::task]
pub async fn resync_task(events: LightEventSender) {
    info!("Light: Resync every {} s", RESYNC_INTERVAL_SECS);
    let mut ticker = Ticker::every(Duration::from_secs(RESYNC_INTERVAL_SECS));

    loop {
        ticker.next().await;
        if events.try_send(LightEvent::Resync).is_err() {
            debug!("Light: Event queue busy, resync skipped");
        }
    }
}
