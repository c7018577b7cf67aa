// WiFi Tasks - Station-Verbindung, Netzwerk-Stack und DHCP
use defmt::{Debug2Format, error, info, warn};
use embassy_net::{Runner, Stack};
use embassy_time::{Duration, Timer};
use esp_radio::wifi::{ClientConfig, ModeConfig, WifiController, WifiDevice, WifiEvent};

use crate::config::{WIFI_PASSWORD, WIFI_RETRY_DELAY_SECS, WIFI_SSID};

/// Schritt, an dem der Verbindungsaufbau gescheitert ist
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
enum WifiError {
    Configure,
    Start,
    Connect,
}

/// WiFi Connection Task
///
/// Startet den Station-Modus, verbindet mit dem konfigurierten Access Point
/// und baut nach einem Disconnect die Verbindung neu auf. Das Licht läuft
/// unabhängig davon weiter.
#[embassy_executor::task]
pub async fn connection_task(mut controller: WifiController<'static>) {
    info!("WiFi: Connection task started for '{}'", WIFI_SSID);

    loop {
        match connect(&mut controller).await {
            Ok(()) => {
                info!("WiFi: Connected");
                controller.wait_for_event(WifiEvent::StaDisconnected).await;
                warn!("WiFi: Disconnected from AP, reconnecting...");
            }
            Err(step) => {
                error!(
                    "WiFi: {} failed, retrying in {} s",
                    step, WIFI_RETRY_DELAY_SECS
                );
                Timer::after(Duration::from_secs(WIFI_RETRY_DELAY_SECS)).await;
            }
        }
    }
}

/// Konfiguriert und startet den Controller (falls nötig) und verbindet
async fn connect(controller: &mut WifiController<'static>) -> Result<(), WifiError> {
    if matches!(controller.is_started(), Ok(false)) {
        let client_config = ModeConfig::Client(
            ClientConfig::default()
                .with_ssid(WIFI_SSID.into())
                .with_password(WIFI_PASSWORD.into()),
        );
        controller.set_config(&client_config).map_err(|e| {
            warn!("WiFi: {}", Debug2Format(&e));
            WifiError::Configure
        })?;
        controller.start_async().await.map_err(|e| {
            warn!("WiFi: {}", Debug2Format(&e));
            WifiError::Start
        })?;
        info!("WiFi: Station started");
    }

    controller.connect_async().await.map_err(|e| {
        warn!("WiFi: {}", Debug2Format(&e));
        WifiError::Connect
    })
}

/// Network Task - prozessiert Pakete des embassy-net Stacks
#[embassy_executor::task]
pub async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) -> ! {
    runner.run().await
}

/// DHCP Task
///
/// Loggt die Netzwerk-Konfiguration, sobald eine IP-Adresse vorliegt,
/// damit die Web-Oberfläche gefunden werden kann.
#[embassy_executor::task]
pub async fn dhcp_task(stack: &'static Stack<'static>) {
    stack.wait_link_up().await;
    info!("WiFi: Link is up, waiting for IP address...");

    stack.wait_config_up().await;
    if let Some(config) = stack.config_v4() {
        info!(
            "WiFi: Web interface at http://{}/",
            Debug2Format(&config.address.address())
        );
        info!("  Gateway: {}", Debug2Format(&config.gateway));
    }
}
