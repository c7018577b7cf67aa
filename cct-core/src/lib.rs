//! CCT Core - Platform-agnostic Logic, Traits und Fade-Engine
//!
//! Diese Crate enthält KEINE Hardware-Dependencies.
//! Sie definiert Typen, Traits, Pure Functions und die Fade-Engine,
//! die auf dem Host getestet werden können.

#![no_std]

pub mod fade;
pub mod light;
pub mod logic;
pub mod traits;
pub mod types;

// Re-exports für einfachen Zugriff
pub use fade::{EnqueueOutcome, FadeEngineState, FadeQueue, FadeStats, FadeWorker};
pub use light::{LightController, LightOutcome};
pub use logic::{compute_duties, fade_steps, fade_time_ms, kelvin_to_mireds, mireds_to_kelvin};
pub use traits::{PwmError, PwmFader};
pub use types::{
    AttributeChange, AttributeEvent, CalibrationBounds, ConfigError, DEFAULT_FADE_TIME_MS,
    DutyPair, Endpoint, FADE_QUEUE_CAPACITY, FadeCommand, FadeSteps, LightEvent, LightState,
    LightStatus, MARGIN_FACTOR, MAX_BRIGHTNESS, PWM_MAX_DUTY, PWM_RESOLUTION_BITS, PWM_SCALE,
    PwmChannel,
};
