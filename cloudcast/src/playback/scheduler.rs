//! Timer-driven playback state machine.
//!
//! Phases: `Idle`, `Preloading`, `Playing`, `Paused`. While playing, a
//! spawned task advances the current step every frame interval and publishes
//! it on a watch channel; scrubbing goes through the same channel. Stopping
//! cancels the timer synchronously and no tick can land afterwards: the
//! advance task re-checks the phase under the state lock before every
//! mutation.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::speed::PlaybackSpeed;
use crate::timestep::TimeStep;

/// Animation driver state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackPhase {
    /// Not animating; no timer exists.
    #[default]
    Idle,
    /// Frames are being preloaded before playback starts.
    Preloading,
    /// The timer is advancing the current step.
    Playing,
    /// Animation suspended; the timer is cancelled.
    Paused,
}

impl fmt::Display for PlaybackPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Preloading => write!(f, "Preloading"),
            Self::Playing => write!(f, "Playing"),
            Self::Paused => write!(f, "Paused"),
        }
    }
}

struct SchedulerState {
    phase: PlaybackPhase,
    speed: PlaybackSpeed,
    current: TimeStep,
    timer: Option<CancellationToken>,
}

impl SchedulerState {
    fn cancel_timer(&mut self) {
        if let Some(token) = self.timer.take() {
            token.cancel();
        }
    }
}

/// Finite-state animation driver for the forecast time series.
pub struct PlaybackScheduler {
    state: Arc<Mutex<SchedulerState>>,
    step_tx: Arc<watch::Sender<TimeStep>>,
}

impl PlaybackScheduler {
    pub fn new() -> Self {
        let (step_tx, _) = watch::channel(TimeStep::ZERO);
        Self {
            state: Arc::new(Mutex::new(SchedulerState {
                phase: PlaybackPhase::Idle,
                speed: PlaybackSpeed::default(),
                current: TimeStep::ZERO,
                timer: None,
            })),
            step_tx: Arc::new(step_tx),
        }
    }

    /// Subscribe to requested-step changes (timer ticks and scrubbing).
    pub fn subscribe(&self) -> watch::Receiver<TimeStep> {
        self.step_tx.subscribe()
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.state.lock().phase
    }

    pub fn current_step(&self) -> TimeStep {
        self.state.lock().current
    }

    pub fn speed(&self) -> PlaybackSpeed {
        self.state.lock().speed
    }

    /// Change the frame interval. Takes effect on the next scheduled tick,
    /// not retroactively.
    pub fn set_speed(&self, speed: PlaybackSpeed) {
        self.state.lock().speed = speed;
    }

    /// Scrub directly to a step.
    pub fn set_step(&self, step: TimeStep) {
        self.state.lock().current = step;
        self.step_tx.send_replace(step);
    }

    /// Enter `Preloading` ahead of playback.
    ///
    /// Valid from `Idle` and `Paused`; returns whether the transition
    /// happened.
    pub fn begin_preload(&self) -> bool {
        let mut state = self.state.lock();
        match state.phase {
            PlaybackPhase::Idle | PlaybackPhase::Paused => {
                state.phase = PlaybackPhase::Preloading;
                true
            }
            _ => false,
        }
    }

    /// Complete a preload and start playing.
    ///
    /// Only fires from `Preloading`: a variable change that arrived
    /// mid-preload has already forced `Idle` and wins.
    pub fn finish_preload(&self) -> bool {
        if self.state.lock().phase != PlaybackPhase::Preloading {
            return false;
        }
        self.start_timer();
        true
    }

    /// Start playing immediately (all frames already cached).
    pub fn play(&self) {
        if self.state.lock().phase == PlaybackPhase::Playing {
            return;
        }
        self.start_timer();
    }

    /// Pause playback, cancelling the timer.
    pub fn pause(&self) {
        let mut state = self.state.lock();
        if state.phase == PlaybackPhase::Playing {
            state.cancel_timer();
            state.phase = PlaybackPhase::Paused;
            debug!("playback paused");
        }
    }

    /// Force a full stop (variable change or teardown): timer cancelled,
    /// phase back to `Idle`.
    pub fn stop(&self) {
        let mut state = self.state.lock();
        state.cancel_timer();
        state.phase = PlaybackPhase::Idle;
    }

    fn start_timer(&self) {
        let token = CancellationToken::new();
        {
            let mut state = self.state.lock();
            state.cancel_timer();
            state.phase = PlaybackPhase::Playing;
            state.timer = Some(token.clone());
        }
        debug!("playback timer started");

        let state = Arc::clone(&self.state);
        let step_tx = Arc::clone(&self.step_tx);
        tokio::spawn(async move {
            loop {
                let delay = {
                    let state = state.lock();
                    if state.phase != PlaybackPhase::Playing {
                        break;
                    }
                    // Read per iteration so a speed change applies to the
                    // next tick.
                    state.speed.frame_duration()
                };

                tokio::select! {
                    biased;

                    _ = token.cancelled() => break,

                    _ = tokio::time::sleep(delay) => {
                        let next = {
                            let mut state = state.lock();
                            // A stop (or a newer timer) may have raced the
                            // sleep; never tick after one.
                            if state.phase != PlaybackPhase::Playing || token.is_cancelled() {
                                break;
                            }
                            state.current = state.current.wrapping_next();
                            state.current
                        };
                        step_tx.send_replace(next);
                    }
                }
            }
        });
    }
}

impl Default for PlaybackScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PlaybackScheduler {
    fn drop(&mut self) {
        self.state.lock().cancel_timer();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestep::MAX_TIME_STEPS;
    use std::time::Duration;

    async fn sleep_ms(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_advance_step_modulo_horizon() {
        let scheduler = PlaybackScheduler::new();
        scheduler.set_step(TimeStep::new(10).unwrap());
        scheduler.play();

        // 4 ticks at the default 1000 ms: 10 -> 11 -> 0 -> 1 -> 2.
        sleep_ms(4 * 1000 + 500).await;
        assert_eq!(scheduler.current_step().index(), (10 + 4) % MAX_TIME_STEPS);
        assert_eq!(scheduler.phase(), PlaybackPhase::Playing);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_cancels_timer_completely() {
        let scheduler = PlaybackScheduler::new();
        scheduler.play();

        sleep_ms(2 * 1000 + 500).await;
        assert_eq!(scheduler.current_step().index(), 2);

        scheduler.pause();
        assert_eq!(scheduler.phase(), PlaybackPhase::Paused);

        // No tick may land after the pause, no matter how long we wait.
        sleep_ms(10_000).await;
        assert_eq!(scheduler.current_step().index(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_continues_from_paused_step() {
        let scheduler = PlaybackScheduler::new();
        scheduler.play();
        sleep_ms(1500).await;
        scheduler.pause();

        scheduler.play();
        sleep_ms(1500).await;
        assert_eq!(scheduler.current_step().index(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_speed_change_applies_on_next_tick() {
        let scheduler = PlaybackScheduler::new();
        scheduler.play();

        // Change speed mid-interval: the tick already scheduled at 1000 ms
        // keeps its deadline.
        sleep_ms(100).await;
        scheduler.set_speed(PlaybackSpeed::X4);
        sleep_ms(700).await;
        assert_eq!(scheduler.current_step().index(), 0);

        // First tick fires at the old interval...
        sleep_ms(250).await;
        assert_eq!(scheduler.current_step().index(), 1);

        // ...subsequent ticks run at 300 ms.
        sleep_ms(350).await;
        assert_eq!(scheduler.current_step().index(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_forces_idle_from_any_phase() {
        let scheduler = PlaybackScheduler::new();

        scheduler.play();
        sleep_ms(1500).await;
        scheduler.stop();
        assert_eq!(scheduler.phase(), PlaybackPhase::Idle);

        sleep_ms(5000).await;
        assert_eq!(scheduler.current_step().index(), 1);

        assert!(scheduler.begin_preload());
        scheduler.stop();
        assert_eq!(scheduler.phase(), PlaybackPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_preload_transitions() {
        let scheduler = PlaybackScheduler::new();

        assert!(scheduler.begin_preload());
        assert_eq!(scheduler.phase(), PlaybackPhase::Preloading);

        // Playing is not a valid origin for another preload.
        assert!(scheduler.finish_preload());
        assert_eq!(scheduler.phase(), PlaybackPhase::Playing);
        assert!(!scheduler.begin_preload());

        scheduler.pause();
        assert!(scheduler.begin_preload());
    }

    #[tokio::test(start_paused = true)]
    async fn test_finish_preload_loses_to_variable_change() {
        let scheduler = PlaybackScheduler::new();

        assert!(scheduler.begin_preload());
        // Variable changed while frames were loading.
        scheduler.stop();

        assert!(!scheduler.finish_preload());
        assert_eq!(scheduler.phase(), PlaybackPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scrub_publishes_on_watch_channel() {
        let scheduler = PlaybackScheduler::new();
        let mut rx = scheduler.subscribe();

        scheduler.set_step(TimeStep::new(7).unwrap());
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().index(), 7);
        assert_eq!(scheduler.current_step().index(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_publish_on_watch_channel() {
        let scheduler = PlaybackScheduler::new();
        let mut rx = scheduler.subscribe();

        scheduler.play();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().index(), 1);
    }
}
