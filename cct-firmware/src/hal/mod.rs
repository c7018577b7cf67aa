// Hardware Abstraction Layer (HAL) Module
//
// Die Fade-Engine in cct-core spricht nur den PwmFader-Trait an,
// hier liegt die Umsetzung auf das LEDC Peripheral.

pub mod ledc_fader;

pub use ledc_fader::{LedcFader, LedcInitError, init_ledc};
