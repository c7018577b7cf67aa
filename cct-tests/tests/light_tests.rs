//! Integration Tests für Fade-Engine und Licht-Fassade
//!
//! Diese Tests laufen auf dem Host (x86_64) und nutzen MockPwmFader

use cct_core::{
    AttributeChange, AttributeEvent, CalibrationBounds, DutyPair, EnqueueOutcome, FadeQueue,
    FadeWorker, LightController, LightEvent, LightOutcome, LightState, PWM_MAX_DUTY, PwmChannel,
    PwmError, PwmFader, compute_duties,
};
use embassy_futures::block_on;
use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, NoopRawMutex};

// ============================================================================
// Mock PWM Fader
// ============================================================================

/// Ein aufgezeichneter Hardware-Aufruf
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeCall {
    SetFade {
        channel: PwmChannel,
        duty: u32,
        fade_time_ms: u32,
    },
    Start(PwmChannel),
    WaitDone(PwmChannel),
}

#[derive(Default)]
pub struct MockPwmFader {
    pub calls: Vec<FadeCall>,
    pub duty: [u32; 2],
    pub fail_next_set_fade: bool,
}

impl MockPwmFader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Alle programmierten Fades als (Kanal, Duty, Dauer)
    pub fn programmed(&self) -> Vec<(PwmChannel, u32, u32)> {
        self.calls
            .iter()
            .filter_map(|call| match *call {
                FadeCall::SetFade {
                    channel,
                    duty,
                    fade_time_ms,
                } => Some((channel, duty, fade_time_ms)),
                _ => None,
            })
            .collect()
    }
}

impl PwmFader for MockPwmFader {
    fn set_fade(
        &mut self,
        channel: PwmChannel,
        duty: u32,
        fade_time_ms: u32,
    ) -> Result<(), PwmError> {
        if self.fail_next_set_fade {
            self.fail_next_set_fade = false;
            return Err(PwmError::FadeRejected);
        }
        if duty > PWM_MAX_DUTY {
            return Err(PwmError::DutyOutOfRange);
        }
        self.calls.push(FadeCall::SetFade {
            channel,
            duty,
            fade_time_ms,
        });
        Ok(())
    }

    fn fade_start(&mut self, channel: PwmChannel) -> Result<(), PwmError> {
        let duty = self
            .programmed()
            .iter()
            .rev()
            .find(|(ch, _, _)| *ch == channel)
            .map(|&(_, duty, _)| duty)
            .ok_or(PwmError::FadeRejected)?;
        self.duty[channel.index()] = duty;
        self.calls.push(FadeCall::Start(channel));
        Ok(())
    }

    async fn fade_wait_done(&mut self, channel: PwmChannel) -> Result<(), PwmError> {
        self.calls.push(FadeCall::WaitDone(channel));
        Ok(())
    }
}

const BOUNDS: CalibrationBounds = CalibrationBounds::new(500, 153, 1, 254);

fn drain<const N: usize>(
    queue: &FadeQueue<NoopRawMutex, N>,
    worker: &mut FadeWorker<MockPwmFader>,
) {
    while let Some(target) = queue.try_receive() {
        block_on(worker.apply(target)).unwrap();
    }
}

// ============================================================================
// Tests: FadeWorker
// ============================================================================

#[test]
fn test_worker_call_order() {
    let mut worker = FadeWorker::new(MockPwmFader::new(), 1000);
    let command = block_on(worker.apply(DutyPair::new(2048, 1024))).unwrap();

    assert_eq!(command.fade_time_ms, 500);
    assert_eq!(
        worker.fader().calls,
        vec![
            FadeCall::SetFade {
                channel: PwmChannel::Warm,
                duty: 2048,
                fade_time_ms: 500
            },
            FadeCall::SetFade {
                channel: PwmChannel::Cold,
                duty: 1024,
                fade_time_ms: 500
            },
            FadeCall::Start(PwmChannel::Warm),
            FadeCall::Start(PwmChannel::Cold),
            FadeCall::WaitDone(PwmChannel::Cold),
        ]
    );
    assert_eq!(worker.fader().duty, [2048, 1024]);
    assert_eq!(worker.state().current, DutyPair::new(2048, 1024));
}

#[test]
fn test_worker_zero_delta_sets_directly() {
    let mut worker = FadeWorker::new(MockPwmFader::new(), 1000);
    let command = block_on(worker.apply(DutyPair::OFF)).unwrap();
    assert_eq!(command.fade_time_ms, 0);
    assert_eq!(worker.stats().applied, 1);
}

#[test]
fn test_worker_fades_down_from_previous_state() {
    let mut worker = FadeWorker::new(MockPwmFader::new(), 1000);
    block_on(worker.apply(DutyPair::new(0, PWM_MAX_DUTY))).unwrap();

    let off = block_on(worker.apply(DutyPair::OFF)).unwrap();
    assert_eq!(off.fade_time_ms, PWM_MAX_DUTY * 1000 / 4096);
    assert_eq!(worker.fader().duty, [0, 0]);
}

#[test]
fn test_worker_survives_hardware_fault() {
    let mut worker = FadeWorker::new(MockPwmFader::new(), 1000);
    block_on(worker.apply(DutyPair::new(1024, 0))).unwrap();

    worker.fader_mut().fail_next_set_fade = true;
    let result = block_on(worker.apply(DutyPair::new(4000, 0)));
    assert_eq!(result, Err(PwmError::FadeRejected));
    assert_eq!(worker.state().current, DutyPair::new(1024, 0));
    assert_eq!(worker.stats().faults, 1);

    // Nächster Request wird vom letzten bekannten Duty aus getimt
    let retry = block_on(worker.apply(DutyPair::new(4000, 0))).unwrap();
    assert_eq!(retry.fade_time_ms, (4000 - 1024) * 1000 / 4096);
    assert_eq!(worker.stats().applied, 2);
}

// ============================================================================
// Tests: LightController → FadeQueue → FadeWorker
// ============================================================================

#[test]
fn test_power_cycle_restores_duty() {
    let queue: FadeQueue<NoopRawMutex, 10> = FadeQueue::new();
    let mut worker = FadeWorker::new(MockPwmFader::new(), 1000);
    let state = LightState {
        power: true,
        brightness: 180,
        color_temperature_mireds: 280,
    };
    let mut light = LightController::new(&queue, BOUNDS, state).unwrap();

    let on = light.restore(false);
    drain(&queue, &mut worker);
    assert_eq!(worker.state().current, on);

    assert_eq!(light.set_power(false), DutyPair::OFF);
    drain(&queue, &mut worker);
    assert_eq!(worker.fader().duty, [0, 0]);

    assert_eq!(light.set_power(true), on);
    drain(&queue, &mut worker);
    assert_eq!(worker.state().current, on);
}

#[test]
fn test_attribute_events_drive_hardware() {
    let queue: FadeQueue<NoopRawMutex, 10> = FadeQueue::new();
    let mut worker = FadeWorker::new(MockPwmFader::new(), 1000);
    let state = LightState {
        power: false,
        brightness: 254,
        color_temperature_mireds: 500,
    };
    let mut light = LightController::new(&queue, BOUNDS, state).unwrap();

    light.on_attribute_changed(AttributeEvent::light(AttributeChange::Power(true)));
    light.on_attribute_changed(AttributeEvent::light(AttributeChange::ColorTemperature(153)));
    drain(&queue, &mut worker);

    assert_eq!(worker.fader().duty, [0, PWM_MAX_DUTY]);
    assert_eq!(worker.stats().applied, 2);
}

#[test]
fn test_neutral_is_idempotent() {
    let queue: FadeQueue<NoopRawMutex, 10> = FadeQueue::new();
    let state = LightState {
        power: true,
        brightness: 200,
        color_temperature_mireds: BOUNDS.neutral_mireds() as u16,
    };
    let mut light = LightController::new(&queue, BOUNDS, state).unwrap();

    let first = light.resync();
    for _ in 0..5 {
        assert_eq!(light.resync(), first);
    }
}

#[test]
fn test_set_bounds_event_rejected() {
    let queue: FadeQueue<NoopRawMutex, 10> = FadeQueue::new();
    let state = LightState {
        power: true,
        brightness: 200,
        color_temperature_mireds: 300,
    };
    let mut light = LightController::new(&queue, BOUNDS, state).unwrap();

    let bad = CalibrationBounds::new(153, 153, 1, 254);
    assert!(light.handle(LightEvent::SetBounds(bad)).is_err());
    assert_eq!(light.bounds(), BOUNDS);

    let good = CalibrationBounds::from_kelvin(2700, 6500, 1, 254);
    let outcome = light.handle(LightEvent::SetBounds(good)).unwrap();
    assert_eq!(outcome, LightOutcome::Fade(compute_duties(200, 300, &good)));
}

#[test]
fn test_overflow_coalesces_to_latest() {
    let queue: FadeQueue<NoopRawMutex, 10> = FadeQueue::new();
    let mut worker = FadeWorker::new(MockPwmFader::new(), 1000);
    let state = LightState {
        power: true,
        brightness: 1,
        color_temperature_mireds: 153,
    };
    let mut light = LightController::new(&queue, BOUNDS, state).unwrap();

    for level in 1..=30u8 {
        light.set_brightness(level * 8);
    }
    assert_eq!(queue.len(), 10);
    assert_eq!(queue.overflow_count(), 20);
    assert_eq!(light.status().dropped_fades, 20);

    drain(&queue, &mut worker);
    assert_eq!(worker.state().current, compute_duties(240, 153, &BOUNDS));
}

// ============================================================================
// Tests: Nebenläufige Producer
// ============================================================================

#[test]
fn test_concurrent_producers_keep_order() {
    const PRODUCERS: u32 = 4;
    const PER_PRODUCER: u32 = 8;

    let queue: FadeQueue<CriticalSectionRawMutex, 64> = FadeQueue::new();

    std::thread::scope(|scope| {
        for producer in 0..PRODUCERS {
            let queue = &queue;
            scope.spawn(move || {
                for seq in 0..PER_PRODUCER {
                    // warm = Producer, cold = Sequenznummer
                    let outcome = queue.request_fade(DutyPair::new(producer, seq));
                    assert_eq!(outcome, EnqueueOutcome::Queued);
                }
            });
        }
    });

    let mut worker = FadeWorker::new(MockPwmFader::new(), 1000);
    let mut next_seq = [0u32; PRODUCERS as usize];
    while let Some(target) = queue.try_receive() {
        let producer = target.warm as usize;
        assert_eq!(target.cold, next_seq[producer]);
        next_seq[producer] += 1;
        block_on(worker.apply(target)).unwrap();
    }
    assert_eq!(next_seq, [PER_PRODUCER; PRODUCERS as usize]);

    // Warm und Kalt eines Kommandos teilen sich immer die Fade-Dauer
    let programmed = worker.fader().programmed();
    assert_eq!(programmed.len(), (PRODUCERS * PER_PRODUCER * 2) as usize);
    for pair in programmed.chunks(2) {
        assert_eq!(pair[0].0, PwmChannel::Warm);
        assert_eq!(pair[1].0, PwmChannel::Cold);
        assert_eq!(pair[0].2, pair[1].2);
    }
}
