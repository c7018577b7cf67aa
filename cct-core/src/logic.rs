//! Pure Business Logic Functions
//!
//! Funktionen ohne Hardware-Dependencies (testbar!)

use crate::types::{
    CalibrationBounds, DutyPair, FadeSteps, MARGIN_FACTOR, MAX_BRIGHTNESS, MIRED_FACTOR,
    PWM_MAX_DUTY, PWM_SCALE, PwmChannel,
};

/// Obergrenze der LEDC Fade-Registerfelder (10 Bit)
const LEDC_FADE_FIELD_MAX: u32 = 1023;

/// Erlaubte Abweichung der Fade-Dauer als Bruchteil (1/50 = 2 %)
const FADE_DURATION_TOLERANCE: u64 = 50;

/// Berechnet die Duties von Warm- und Kalt-Kanal
///
/// Der Primär-Kanal (warm oberhalb, kalt unterhalb des Neutralpunkts) folgt
/// der Helligkeit, der Sekundär-Kanal wird mit `MARGIN_FACTOR` gemischt.
/// Werte außerhalb der Kalibrierung werden gesättigt, die Funktion paniert nie.
///
/// # Beispiele
///
/// ```
/// # use cct_core::{CalibrationBounds, PWM_MAX_DUTY, compute_duties};
/// let bounds = CalibrationBounds::new(500, 153, 1, 254);
/// let duty = compute_duties(254, 153, &bounds); // voll kalt
/// assert_eq!(duty.cold, PWM_MAX_DUTY);
/// assert_eq!(duty.warm, 0);
/// ```
pub fn compute_duties(brightness: u8, mireds: u16, bounds: &CalibrationBounds) -> DutyPair {
    let warm_mireds = u32::from(bounds.warm_mireds);
    let cold_mireds = u32::from(bounds.cold_mireds);
    let mireds = u32::from(mireds);

    let span = warm_mireds.saturating_sub(cold_mireds);
    let temp_coeff = if span == 0 {
        0
    } else {
        mireds.saturating_sub(cold_mireds).min(span) * PWM_SCALE / span
    };
    let brightness_coeff = u32::from(brightness) * PWM_SCALE / u32::from(MAX_BRIGHTNESS);

    let (warm, cold) = if mireds >= bounds.neutral_mireds() {
        let cold = MARGIN_FACTOR * (PWM_SCALE - temp_coeff) * brightness_coeff / PWM_SCALE;
        (brightness_coeff, cold)
    } else {
        let warm = MARGIN_FACTOR * temp_coeff * brightness_coeff / PWM_SCALE;
        (warm, brightness_coeff)
    };

    DutyPair::new(warm.min(PWM_MAX_DUTY), cold.min(PWM_MAX_DUTY))
}

/// Fade-Dauer proportional zur größten Duty-Änderung
///
/// `fade_time_constant_ms` ist die Dauer für einen Übergang über `PWM_SCALE`.
pub fn fade_time_ms(current: DutyPair, target: DutyPair, fade_time_constant_ms: u32) -> u32 {
    PwmChannel::ALL
        .iter()
        .map(|&channel| {
            let delta = u64::from(current.get(channel).abs_diff(target.get(channel)));
            let time = delta * u64::from(fade_time_constant_ms) / u64::from(PWM_SCALE);
            u32::try_from(time).unwrap_or(u32::MAX)
        })
        .max()
        .unwrap_or(0)
}

/// Kodiert einen linearen Fade in die LEDC Fade-Register
///
/// Gibt `None` zurück wenn der Duty direkt gesetzt werden soll
/// (kein Delta oder keine Dauer). Gesucht wird die größte Schrittzahl, bei
/// der `duty_steps * cycles_per_step` höchstens `1 / FADE_DURATION_TOLERANCE`
/// von der angeforderten Dauer abweicht. Der Rest-Duty (höchstens ein
/// Schritt) wird nach dem Fade direkt gesetzt. Fades, die länger sind als
/// die Register erlauben, laufen entsprechend kürzer.
pub fn fade_steps(
    start: u32,
    target: u32,
    fade_time_ms: u32,
    pwm_frequency_hz: u32,
) -> Option<FadeSteps> {
    let delta = u64::from(start.abs_diff(target));
    if delta == 0 || fade_time_ms == 0 {
        return None;
    }

    let field_max = u64::from(LEDC_FADE_FIELD_MAX);
    let total_cycles = u64::from(pwm_frequency_hz) * u64::from(fade_time_ms) / 1000;
    let max_steps = delta.min(field_max).min(total_cycles);

    let mut best: Option<(u64, FadeSteps)> = None;
    for duty_steps in (1..=max_steps).rev() {
        let duty_per_cycle = delta / duty_steps;
        let remainder = delta - duty_steps * duty_per_cycle;
        if duty_per_cycle > field_max || remainder > duty_per_cycle {
            continue;
        }

        let cycles_per_step = ((total_cycles + duty_steps / 2) / duty_steps).clamp(1, field_max);
        let error = (duty_steps * cycles_per_step).abs_diff(total_cycles);
        if best.is_none_or(|(best_error, _)| error < best_error) {
            best = Some((
                error,
                FadeSteps {
                    duty_steps: duty_steps as u16,
                    cycles_per_step: cycles_per_step as u16,
                    duty_per_cycle: duty_per_cycle as u16,
                },
            ));
        }
        if error * FADE_DURATION_TOLERANCE <= total_cycles {
            break;
        }
    }

    best.map(|(_, steps)| steps)
}

/// Kelvin → Mired (`1_000_000 / K`, 0 K wird wie 1 K behandelt)
pub fn kelvin_to_mireds(kelvin: u32) -> u16 {
    let mireds = MIRED_FACTOR / kelvin.max(1);
    u16::try_from(mireds).unwrap_or(u16::MAX)
}

/// Mired → Kelvin (`1_000_000 / mired`, 0 wird wie 1 behandelt)
pub fn mireds_to_kelvin(mireds: u16) -> u32 {
    MIRED_FACTOR / u32::from(mireds.max(1))
}
