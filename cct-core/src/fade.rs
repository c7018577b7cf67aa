//! Fade-Engine: Request-Queue und Fade-Worker
//!
//! Beliebig viele Producer legen Ziel-Duties in die `FadeQueue`,
//! genau ein `FadeWorker` entnimmt sie und fährt die Hardware.
//! Nur der Worker verändert den zuletzt angewendeten Duty.

use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::{Channel, TrySendError};

use crate::logic::fade_time_ms;
use crate::traits::{PwmError, PwmFader};
use crate::types::{DutyPair, FadeCommand, PwmChannel};

// ============================================================================
// Request-Queue (Producer-Seite)
// ============================================================================

/// Ergebnis eines Fade-Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// Request wurde hinten angehängt
    Queued,
    /// Queue war voll: der älteste Request wurde verworfen
    ReplacedOldest { dropped: DutyPair },
}

/// Begrenzte, geordnete Queue für Fade-Requests
///
/// Multi-Producer / Single-Consumer. Einreihen blockiert nie: ist die Queue
/// voll, wird der älteste Eintrag verworfen (neuester Wert gewinnt) und der
/// Überlauf gezählt. Eine Queue ohne Platz lässt sich nicht bauen:
///
/// ```compile_fail
/// use cct_core::{DutyPair, FadeQueue};
/// use embassy_sync::blocking_mutex::raw::NoopRawMutex;
///
/// let queue: FadeQueue<NoopRawMutex, 0> = FadeQueue::new();
/// queue.request_fade(DutyPair::OFF);
/// ```
pub struct FadeQueue<M: RawMutex, const N: usize> {
    channel: Channel<M, DutyPair, N>,
    overflows: AtomicU32,
}

impl<M: RawMutex, const N: usize> FadeQueue<M, N> {
    pub const fn new() -> Self {
        const { assert!(N > 0, "FadeQueue needs at least one slot") };
        Self {
            channel: Channel::new(),
            overflows: AtomicU32::new(0),
        }
    }

    /// Reiht ein Fade-Ziel ein, ohne zu blockieren
    pub fn request_fade(&self, target: DutyPair) -> EnqueueOutcome {
        let mut outcome = EnqueueOutcome::Queued;
        let mut pending = target;

        loop {
            match self.channel.try_send(pending) {
                Ok(()) => return outcome,
                Err(TrySendError::Full(rejected)) => {
                    pending = rejected;
                    if let Ok(dropped) = self.channel.try_receive() {
                        self.overflows.fetch_add(1, Ordering::Relaxed);
                        outcome = EnqueueOutcome::ReplacedOldest { dropped };
                    }
                }
            }
        }
    }

    /// Wartet auf das nächste Fade-Ziel
    pub async fn receive(&self) -> DutyPair {
        self.channel.receive().await
    }

    pub fn try_receive(&self) -> Option<DutyPair> {
        self.channel.try_receive().ok()
    }

    /// Anzahl wartender Requests
    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }

    /// Anzahl verworfener Requests seit dem Start
    pub fn overflow_count(&self) -> u32 {
        self.overflows.load(Ordering::Relaxed)
    }
}

impl<M: RawMutex, const N: usize> Default for FadeQueue<M, N> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Fade-Worker (Consumer-Seite)
// ============================================================================

/// Zuletzt erfolgreich angewendeter Duty
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FadeEngineState {
    pub current: DutyPair,
}

impl FadeEngineState {
    /// Plant den Übergang vom aktuellen Duty zum Ziel
    pub fn plan(&self, target: DutyPair, fade_time_constant_ms: u32) -> FadeCommand {
        FadeCommand {
            target,
            fade_time_ms: fade_time_ms(self.current, target, fade_time_constant_ms),
        }
    }

    /// Übernimmt ein erfolgreich angewendetes Kommando
    pub fn commit(&mut self, command: &FadeCommand) {
        self.current = command.target;
    }
}

/// Zähler des Fade-Workers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FadeStats {
    pub applied: u32,
    pub faults: u32,
}

/// Einziger Besitzer der PWM-Hardware
///
/// Wendet Fade-Ziele nacheinander an: beide Kanäle bekommen dieselbe Dauer,
/// der Warm-Kanal startet ohne Warten, auf den Kalt-Kanal wird gewartet.
/// Erst danach ist der Worker bereit für das nächste Ziel.
pub struct FadeWorker<P: PwmFader> {
    fader: P,
    state: FadeEngineState,
    fade_time_constant_ms: u32,
    stats: FadeStats,
}

impl<P: PwmFader> FadeWorker<P> {
    /// Erstellt den Worker; die Hardware muss bei Duty 0 stehen
    pub fn new(fader: P, fade_time_constant_ms: u32) -> Self {
        Self {
            fader,
            state: FadeEngineState::default(),
            fade_time_constant_ms,
            stats: FadeStats::default(),
        }
    }

    /// Fährt beide Kanäle zum Ziel und wartet auf das Ende des Fades
    ///
    /// Bei einem Hardware-Fehler bleibt der Zustand unverändert, damit der
    /// nächste Request vom letzten bekannten Duty aus getimt wird.
    pub async fn apply(&mut self, target: DutyPair) -> Result<FadeCommand, PwmError> {
        let command = self.state.plan(target, self.fade_time_constant_ms);

        match self.program(&command).await {
            Ok(()) => {
                self.state.commit(&command);
                self.stats.applied = self.stats.applied.wrapping_add(1);
                Ok(command)
            }
            Err(e) => {
                self.stats.faults = self.stats.faults.wrapping_add(1);
                Err(e)
            }
        }
    }

    async fn program(&mut self, command: &FadeCommand) -> Result<(), PwmError> {
        for channel in PwmChannel::ALL {
            self.fader
                .set_fade(channel, command.target.get(channel), command.fade_time_ms)?;
        }
        self.fader.fade_start(PwmChannel::Warm)?;
        self.fader.fade_start(PwmChannel::Cold)?;
        self.fader.fade_wait_done(PwmChannel::Cold).await
    }

    pub fn state(&self) -> FadeEngineState {
        self.state
    }

    pub fn stats(&self) -> FadeStats {
        self.stats
    }

    pub fn fade_time_constant_ms(&self) -> u32 {
        self.fade_time_constant_ms
    }

    pub fn fader(&self) -> &P {
        &self.fader
    }

    pub fn fader_mut(&mut self) -> &mut P {
        &mut self.fader
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    #[test]
    fn test_plan_times_from_current() {
        let mut state = FadeEngineState::default();
        let up = state.plan(DutyPair::new(2048, 0), 1000);
        assert_eq!(up.fade_time_ms, 500);

        state.commit(&up);
        let down = state.plan(DutyPair::OFF, 1000);
        assert_eq!(down.fade_time_ms, 500);
        assert_eq!(down.target, DutyPair::OFF);
    }

    #[test]
    fn test_queue_keeps_order() {
        let queue: FadeQueue<NoopRawMutex, 4> = FadeQueue::new();
        for warm in 1..=3 {
            assert_eq!(
                queue.request_fade(DutyPair::new(warm, 0)),
                EnqueueOutcome::Queued
            );
        }
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.try_receive(), Some(DutyPair::new(1, 0)));
        assert_eq!(queue.try_receive(), Some(DutyPair::new(2, 0)));
        assert_eq!(queue.try_receive(), Some(DutyPair::new(3, 0)));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_queue_overflow_drops_oldest() {
        let queue: FadeQueue<NoopRawMutex, 2> = FadeQueue::new();
        queue.request_fade(DutyPair::new(1, 0));
        queue.request_fade(DutyPair::new(2, 0));

        let outcome = queue.request_fade(DutyPair::new(3, 0));
        assert_eq!(
            outcome,
            EnqueueOutcome::ReplacedOldest {
                dropped: DutyPair::new(1, 0)
            }
        );
        assert_eq!(queue.overflow_count(), 1);
        assert_eq!(queue.try_receive(), Some(DutyPair::new(2, 0)));
        assert_eq!(queue.try_receive(), Some(DutyPair::new(3, 0)));
        assert_eq!(queue.try_receive(), None);
    }
}
