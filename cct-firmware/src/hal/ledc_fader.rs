// LEDC PWM Fader für Warm- und Kalt-Kanal
//
// Setzt den PwmFader-Trait aus cct-core auf die Hardware-Fade-Einheit
// des ESP32-C6 LEDC Peripherals um.

use cct_core::{PWM_MAX_DUTY, PwmChannel, PwmError, PwmFader, fade_steps};
use embassy_time::Timer;
use esp_hal::gpio::DriveMode;
use esp_hal::ledc::channel::{self, ChannelHW, ChannelIFace};
use esp_hal::ledc::timer::{self, TimerIFace};
use esp_hal::ledc::{LSGlobalClkSource, Ledc, LowSpeed};
use esp_hal::peripherals::{GPIO4, GPIO5, LEDC};
use esp_hal::time::Rate;
use static_cell::StaticCell;

use crate::config::FADE_POLL_INTERVAL_MS;

/// Fehler beim Konfigurieren des LEDC Peripherals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedcInitError {
    Timer,
    Channel,
}

impl defmt::Format for LedcInitError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            LedcInitError::Timer => defmt::write!(fmt, "LEDC timer configuration failed"),
            LedcInitError::Channel => defmt::write!(fmt, "LEDC channel configuration failed"),
        }
    }
}

/// Geplanter Übergang eines Kanals (zwischen set_fade und fade_start)
#[derive(Clone, Copy, Default)]
struct PlannedFade {
    start: u32,
    target: u32,
    fade_time_ms: u32,
}

/// PWM Fader auf LEDC Low-Speed Kanal 0 (warm) und 1 (kalt)
///
/// Die Hardware meldet das Fade-Ende nur per Interrupt, daher wird in
/// `fade_wait_done` gepollt. Danach werden alle Kanäle exakt auf ihr Ziel
/// gesetzt, weil die Schrittweite ganzzahlig gerundet ist.
pub struct LedcFader<'a> {
    channels: [channel::Channel<'a, LowSpeed>; 2],
    planned: [PlannedFade; 2],
    duty: [u32; 2],
    frequency_hz: u32,
}

impl<'a> LedcFader<'a> {
    /// Übernimmt zwei bereits konfigurierte Kanäle (Duty 0)
    pub fn new(
        warm: channel::Channel<'a, LowSpeed>,
        cold: channel::Channel<'a, LowSpeed>,
        frequency_hz: u32,
    ) -> Self {
        Self {
            channels: [warm, cold],
            planned: [PlannedFade::default(); 2],
            duty: [0; 2],
            frequency_hz,
        }
    }
}

impl PwmFader for LedcFader<'_> {
    fn set_fade(
        &mut self,
        channel: PwmChannel,
        duty: u32,
        fade_time_ms: u32,
    ) -> Result<(), PwmError> {
        if duty > PWM_MAX_DUTY {
            return Err(PwmError::DutyOutOfRange);
        }
        let idx = channel.index();
        self.planned[idx] = PlannedFade {
            start: self.duty[idx],
            target: duty,
            fade_time_ms,
        };
        Ok(())
    }

    fn fade_start(&mut self, channel: PwmChannel) -> Result<(), PwmError> {
        let idx = channel.index();
        let fade = self.planned[idx];
        let hw = &mut self.channels[idx];

        // Darf nicht passieren, solange der Worker serialisiert
        if hw.is_duty_fade_running_hw() {
            return Err(PwmError::FadeRejected);
        }

        match fade_steps(fade.start, fade.target, fade.fade_time_ms, self.frequency_hz) {
            Some(steps) => hw.start_duty_fade_hw(
                fade.start,
                fade.target > fade.start,
                steps.duty_steps,
                steps.cycles_per_step,
                steps.duty_per_cycle,
            ),
            None => hw.set_duty_hw(fade.target),
        }
        self.duty[idx] = fade.target;
        Ok(())
    }

    async fn fade_wait_done(&mut self, channel: PwmChannel) -> Result<(), PwmError> {
        // Der gewartete Kanal zuerst, der andere ist bei gleicher Dauer
        // höchstens einen Schritt dahinter
        let order = match channel {
            PwmChannel::Warm => [PwmChannel::Warm, PwmChannel::Cold],
            PwmChannel::Cold => [PwmChannel::Cold, PwmChannel::Warm],
        };
        for ch in order {
            let idx = ch.index();
            while self.channels[idx].is_duty_fade_running_hw() {
                Timer::after_millis(FADE_POLL_INTERVAL_MS).await;
            }
            self.channels[idx].set_duty_hw(self.duty[idx]);
        }
        Ok(())
    }
}

/// Konfiguriert LEDC Timer 0 (12 Bit) und die Kanäle 0/1
///
/// Ledc und Timer müssen 'static sein, weil die Kanäle sie referenzieren.
pub fn init_ledc(
    ledc: LEDC<'static>,
    warm_pin: GPIO4<'static>,
    cold_pin: GPIO5<'static>,
    frequency_hz: u32,
) -> Result<LedcFader<'static>, LedcInitError> {
    static LEDC_DRIVER: StaticCell<Ledc<'static>> = StaticCell::new();
    static PWM_TIMER: StaticCell<timer::Timer<'static, LowSpeed>> = StaticCell::new();

    let ledc = LEDC_DRIVER.init(Ledc::new(ledc));
    ledc.set_global_slow_clock(LSGlobalClkSource::APBClk);

    let pwm_timer = PWM_TIMER.init(ledc.timer::<LowSpeed>(timer::Number::Timer0));
    pwm_timer
        .configure(timer::config::Config {
            duty: timer::config::Duty::Duty12Bit,
            clock_source: timer::LSClockSource::APBClk,
            frequency: Rate::from_hz(frequency_hz),
        })
        .map_err(|_| LedcInitError::Timer)?;
    let pwm_timer: &'static timer::Timer<'static, LowSpeed> = pwm_timer;

    let mut warm = ledc.channel(channel::Number::Channel0, warm_pin);
    let mut cold = ledc.channel(channel::Number::Channel1, cold_pin);
    for ch in [&mut warm, &mut cold] {
        ch.configure(channel::config::Config {
            timer: pwm_timer,
            duty_pct: 0,
            drive_mode: DriveMode::PushPull,
        })
        .map_err(|_| LedcInitError::Channel)?;
    }

    Ok(LedcFader::new(warm, cold, frequency_hz))
}
