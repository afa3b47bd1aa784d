use crossterm::event::KeyEvent;
use std::time::Instant;

use crate::app::state::{App, SCRUB_STEP_SECS};
use crate::now_playing::RemoteCommand;

pub fn handle_key(key: KeyEvent, app: &mut App) {
    handle_key_at(key, app, Instant::now());
}

pub fn handle_key_at(key: KeyEvent, app: &mut App, now: Instant) {
    let keys = app.keys.clone();

    if keys.matches(key, &keys.quit) {
        app.is_running = false;
        return;
    }

    // Control strip tap
    if keys.matches(key, &keys.play_pause) {
        let result = app.tracker.strip_tap();
        app.report(result);
        return;
    }

    // Control strip swipes
    if keys.matches(key, &keys.next_track) {
        let result = app.tracker.strip_swipe(1.0);
        app.report(result);
        return;
    }

    if keys.matches(key, &keys.prev_track) {
        let result = app.tracker.strip_swipe(-1.0);
        app.report(result);
        return;
    }

    if keys.matches(key, &keys.volume_up) || keys.matches(key, &keys.volume_down) {
        let step = app.volume_step as i16;
        let delta = if keys.matches(key, &keys.volume_up) { step } else { -step };
        let result = app.tracker.change_volume(delta);
        if result.is_ok() {
            let view = app.tracker.view();
            let message = format!("{} Volume: {}%", view.volume_level.glyph(), view.volume);
            app.show_toast(&message);
        }
        app.report(result);
        return;
    }

    if keys.matches(key, &keys.seek_forward) || keys.matches(key, &keys.seek_forward_alt) {
        app.scrub_by(SCRUB_STEP_SECS, now);
        return;
    }

    if keys.matches(key, &keys.seek_backward) || keys.matches(key, &keys.seek_backward_alt) {
        app.scrub_by(-SCRUB_STEP_SECS, now);
        return;
    }

    if keys.matches(key, &keys.shuffle) {
        let result = app.tracker.toggle_shuffle();
        app.report(result);
        return;
    }

    if keys.matches(key, &keys.repeat) {
        let result = app.tracker.toggle_repeat();
        app.report(result);
        return;
    }

    if keys.matches(key, &keys.like) {
        if !app.tracker.view().like.enabled {
            app.show_toast("♡ Liking isn't available for this player");
            return;
        }
        let result = app.tracker.toggle_like();
        app.report(result);
        return;
    }

    if keys.matches(key, &keys.title_artist) {
        app.tracker.swipe_title(-1.0);
        return;
    }

    if keys.matches(key, &keys.title_song) {
        app.tracker.swipe_title(1.0);
        return;
    }

    if keys.matches(key, &keys.show_player) {
        let result = app.tracker.show_player();
        app.report(result);
        return;
    }

    if keys.matches(key, &keys.wake) {
        app.tracker.handle_wake();
    }
}

pub fn handle_remote(command: RemoteCommand, app: &mut App) {
    let result = match command {
        RemoteCommand::Play => app.tracker.play(),
        RemoteCommand::Pause => app.tracker.pause(),
        RemoteCommand::Toggle => app.tracker.toggle_play_pause(),
        RemoteCommand::Next => app.tracker.next_track(),
        RemoteCommand::Previous => app.tracker.previous_track(),
        RemoteCommand::SetPosition(seconds) => app.tracker.seek_to(seconds),
        RemoteCommand::Raise => app.tracker.show_player(),
    };
    app.report(result);
}
