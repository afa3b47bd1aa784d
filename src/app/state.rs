use image::DynamicImage;
use std::time::{Duration, Instant};

use crate::app::keys::KeyConfig;
use crate::player::PlayerError;
use crate::tracker::Tracker;
use crate::ui::theme::Theme;

/// Key-driven scrubs within this window form one slider gesture
pub const SCRUB_IDLE_TIMEOUT: Duration = Duration::from_millis(500);
/// Seconds moved per scrub key press
pub const SCRUB_STEP_SECS: f64 = 5.0;

const TOAST_DURATION: Duration = Duration::from_millis(2000);

pub enum ArtworkState {
    Idle,
    Loading,
    Loaded(DynamicImage),
    Failed,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub start_time: Instant,
    pub deadline: Instant,
}

/// An in-progress slider gesture driven by the scrub keys.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrubGesture {
    /// Slider value in [0, 1]
    pub value: f64,
    pub last_input: Instant,
}

pub struct App {
    pub tracker: Tracker,
    pub keys: KeyConfig,
    pub theme: Theme,
    pub artwork: ArtworkState,
    pub toast: Option<Toast>,
    pub scrub: Option<ScrubGesture>,
    pub volume_step: u8,
    pub is_running: bool,
}

impl App {
    pub fn new(tracker: Tracker, keys: KeyConfig, volume_step: u8) -> Self {
        Self {
            tracker,
            keys,
            theme: Theme::default(),
            artwork: ArtworkState::Idle,
            toast: None,
            scrub: None,
            volume_step,
            is_running: true,
        }
    }

    pub fn show_toast(&mut self, message: &str) {
        let now = Instant::now();
        let deadline = now + TOAST_DURATION;

        if let Some(ref mut current) = self.toast {
            // Keep start_time so rapid updates don't restart the entrance
            current.message = message.to_string();
            current.deadline = deadline;
        } else {
            self.toast = Some(Toast {
                message: message.to_string(),
                start_time: now,
                deadline,
            });
        }
    }

    /// Surfaces a failed player command.
    pub fn report(&mut self, result: Result<(), PlayerError>) {
        if let Err(e) = result {
            tracing::warn!(error = %e, "player command failed");
            self.show_toast(&format!("⚠ {e}"));
        }
    }

    /// Moves the scrub gesture by `delta_secs`, starting one if needed.
    pub fn scrub_by(&mut self, delta_secs: f64, now: Instant) {
        let duration = self.tracker.song().duration;
        if duration <= 0.0 {
            return;
        }
        let delta = delta_secs / duration;

        let result = match self.scrub {
            Some(ref mut gesture) => {
                gesture.value = (gesture.value + delta).clamp(0.0, 1.0);
                gesture.last_input = now;
                let value = gesture.value;
                self.tracker.touches_moved(value)
            }
            None => {
                let start = self.tracker.view().progress;
                let value = (start + delta).clamp(0.0, 1.0);
                self.scrub = Some(ScrubGesture {
                    value,
                    last_input: now,
                });
                self.tracker
                    .touches_began(start)
                    .and_then(|_| self.tracker.touches_moved(value))
            }
        };

        if result.is_err() {
            // Don't leave the player paused mid-gesture
            self.finish_scrub();
        }
        self.report(result);
    }

    fn finish_scrub(&mut self) {
        if let Some(gesture) = self.scrub.take() {
            let result = self.tracker.touches_ended(gesture.value);
            self.report(result);
        }
    }

    /// Called every UI tick.
    pub fn on_tick(&mut self, now: Instant) {
        if let Some(ref toast) = self.toast {
            if now > toast.deadline {
                self.toast = None;
            }
        }

        if let Some(gesture) = self.scrub {
            if now.duration_since(gesture.last_input) >= SCRUB_IDLE_TIMEOUT {
                self.finish_scrub();
            }
        }
    }
}
