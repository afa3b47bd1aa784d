use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableFocusChange, EnableFocusChange, Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::{broadcast, mpsc};

use crate::app::auth;
use crate::app::cli::Args;
use crate::app::config::{AppConfig, StateFile};
use crate::app::events::AppEvent;
use crate::app::inputs;
use crate::app::lock::InstanceLock;
use crate::app::{App, ArtworkState};
use crate::artwork::{extract_palette, ArtworkRenderer};
use crate::notification::{NotificationCenter, PlayerNotification};
use crate::now_playing::NowPlaying;
use crate::player::{platform_helpers, PlayersManager};
use crate::spotify::SpotifyApi;
use crate::tracker::{Effect, Tracker, TrackerSettings};
use crate::ui::{self, theme::Theme};
use crate::watcher;

const PROGRESS_INTERVAL: Duration = Duration::from_secs(1);
const UI_TICK_INTERVAL: Duration = Duration::from_millis(100);
const WAKE_CHECK_INTERVAL: Duration = Duration::from_secs(2);
/// Wall-clock jump between checks that means the machine slept
const WAKE_GAP: Duration = Duration::from_secs(10);
/// Thumbnail kept for rendering; the panel never needs more
const THUMBNAIL_SIZE: u32 = 64;
/// Terminal width from which titles aren't truncated
const WIDE_LAYOUT_WIDTH: u16 = 90;

/// Executes tracker effects off the event loop.
struct EffectRunner {
    tx: mpsc::Sender<AppEvent>,
    center: NotificationCenter,
    spotify: Arc<SpotifyApi>,
    renderer: Arc<ArtworkRenderer>,
    authorization_requested: bool,
}

impl EffectRunner {
    fn perform(&mut self, effect: Effect, app: &mut App) {
        match effect {
            Effect::FetchArtwork { song_key, request } => {
                app.artwork = ArtworkState::Loading;
                let tx = self.tx.clone();
                let renderer = self.renderer.clone();
                tokio::spawn(async move {
                    let event = match renderer.resolve(&request).await {
                        Ok(resolved) => {
                            let url = resolved.url;
                            let processed = tokio::task::spawn_blocking(move || {
                                let palette = extract_palette(&resolved.image);
                                let thumb = resolved.image.thumbnail(THUMBNAIL_SIZE, THUMBNAIL_SIZE);
                                (thumb, palette)
                            })
                            .await;
                            match processed {
                                Ok((image, palette)) => AppEvent::ArtworkUpdate {
                                    song_key,
                                    image: Some(image),
                                    palette: Some(palette),
                                    url,
                                },
                                Err(_) => AppEvent::ArtworkUpdate {
                                    song_key,
                                    image: None,
                                    palette: None,
                                    url,
                                },
                            }
                        }
                        Err(e) => {
                            tracing::debug!(error = %e, "artwork unavailable");
                            AppEvent::ArtworkUpdate {
                                song_key,
                                image: None,
                                palette: None,
                                url: None,
                            }
                        }
                    };
                    let _ = tx.send(event).await;
                });
            }

            Effect::RefreshRemoteLike { song_key, track_uri } => {
                if !self.spotify.is_authorized() {
                    return;
                }
                let tx = self.tx.clone();
                let spotify = self.spotify.clone();
                tokio::spawn(async move {
                    match spotify.is_uri_saved(&track_uri).await {
                        Ok(liked) => {
                            let _ = tx.send(AppEvent::LikeUpdate { song_key, liked }).await;
                        }
                        Err(e) => tracing::warn!(error = %e, "failed to read saved status"),
                    }
                });
            }

            Effect::SetRemoteLike { track_uri, liked } => {
                let tx = self.tx.clone();
                let center = self.center.clone();
                let spotify = self.spotify.clone();
                tokio::spawn(async move {
                    match spotify.set_uri_saved(&track_uri, liked).await {
                        // Same path a local like takes
                        Ok(()) => center.post(PlayerNotification::Like(liked)),
                        Err(e) => {
                            tracing::warn!(error = %e, "failed to update saved status");
                            let _ = tx.send(AppEvent::Status(format!("⚠ {e}"))).await;
                        }
                    }
                });
            }

            Effect::AuthorizeSpotify => {
                if self.authorization_requested || !self.spotify.needs_authorization() {
                    return;
                }
                self.authorization_requested = true;
                match auth::open_authorization_page(&self.spotify) {
                    Ok(()) => app.show_toast("Authorise musebar in your browser"),
                    Err(e) => tracing::warn!(error = %e, "could not start Spotify authorisation"),
                }
            }
        }
    }
}

pub async fn run(args: Args) -> Result<()> {
    let (config, state) = AppConfig::load();
    let _lock = off_loop(|| InstanceLock::acquire(&AppConfig::get_lock_path()))?;
    let state_file = Arc::new(StateFile::new(AppConfig::get_state_path()));

    // Shared HTTP client
    let client = reqwest::Client::builder()
        .user_agent(concat!("musebar/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_default();

    let center = NotificationCenter::new();
    let default_id = args
        .player
        .or(state.last_player)
        .unwrap_or(config.default_player);
    let manager = Arc::new(PlayersManager::new(platform_helpers(&center), default_id));
    tracing::info!(default = %default_id, "starting");

    let tracker = Tracker::new(
        manager.clone(),
        TrackerSettings {
            title_max_len: config.title_length,
        },
    );
    let mut app = App::new(tracker, config.keys.clone(), config.volume_step);

    let (tx, mut rx) = mpsc::channel(100);
    let mut effects = EffectRunner {
        tx: tx.clone(),
        center: center.clone(),
        spotify: Arc::new(SpotifyApi::new(
            client.clone(),
            config.spotify.clone(),
            state_file.clone(),
        )),
        renderer: Arc::new(ArtworkRenderer::new(client)),
        authorization_requested: false,
    };

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // 1. Input
    let tx_input = tx.clone();
    tokio::spawn(async move {
        let mut reader = EventStream::new();
        while let Some(Ok(event)) = reader.next().await {
            if tx_input.send(AppEvent::Input(event)).await.is_err() {
                break;
            }
        }
    });

    // 2. Player polling
    watcher::spawn(
        manager.clone(),
        Duration::from_millis(config.poll_interval_ms.max(50)),
        tx.clone(),
    );

    // 3. Internal notifications
    let tx_player = tx.clone();
    let mut notifications = center.observe();
    tokio::spawn(async move {
        loop {
            match notifications.recv().await {
                Ok(event) => {
                    if tx_player.send(AppEvent::Player(event)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "notification observer lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    // 4. Timers
    spawn_interval(tx.clone(), PROGRESS_INTERVAL, || AppEvent::Progress);
    spawn_interval(tx.clone(), UI_TICK_INTERVAL, || AppEvent::Tick);

    // 5. Wake detection
    let tx_wake = tx.clone();
    tokio::spawn(async move {
        let mut last = SystemTime::now();
        loop {
            tokio::time::sleep(WAKE_CHECK_INTERVAL).await;
            let now = SystemTime::now();
            let gap = now.duration_since(last).unwrap_or_default();
            last = now;
            if gap > WAKE_GAP && tx_wake.send(AppEvent::Wake).await.is_err() {
                break;
            }
        }
    });

    // 6. SIGTERM from a newer instance
    let tx_term = tx.clone();
    tokio::spawn(async move {
        use tokio::signal::unix::{signal, SignalKind};
        if let Ok(mut term) = signal(SignalKind::terminate()) {
            term.recv().await;
            let _ = tx_term.send(AppEvent::Terminate).await;
        }
    });

    // 7. Media controls
    let (remote_tx, mut remote_rx) = mpsc::unbounded_channel();
    let mut now_playing = match NowPlaying::start(remote_tx) {
        Ok(now_playing) => Some(now_playing),
        Err(e) => {
            tracing::warn!(error = %e, "media controls unavailable");
            None
        }
    };
    let tx_remote = tx.clone();
    tokio::spawn(async move {
        while let Some(command) = remote_rx.recv().await {
            if tx_remote.send(AppEvent::Remote(command)).await.is_err() {
                break;
            }
        }
    });

    off_loop(|| app.tracker.refresh());
    let mut last_player = state.last_player;

    let result = event_loop(
        &mut terminal,
        &mut app,
        &mut rx,
        &mut effects,
        &mut now_playing,
        &state_file,
        &mut last_player,
    )
    .await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableFocusChange, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Runs `f`, which shells out to the players, without stalling the other
/// tasks on this worker.
fn off_loop<R>(f: impl FnOnce() -> R) -> R {
    tokio::task::block_in_place(f)
}

fn spawn_interval(
    tx: mpsc::Sender<AppEvent>,
    period: Duration,
    make: impl Fn() -> AppEvent + Send + 'static,
) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            if tx.send(make()).await.is_err() {
                break;
            }
        }
    });
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    rx: &mut mpsc::Receiver<AppEvent>,
    effects: &mut EffectRunner,
    now_playing: &mut Option<NowPlaying>,
    state_file: &StateFile,
    last_player: &mut Option<crate::player::PlayerId>,
) -> Result<()> {
    while app.is_running {
        let width = terminal.size().map(|s| s.width).unwrap_or_default();
        app.tracker.set_wide(width >= WIDE_LAYOUT_WIDTH);
        terminal
            .draw(|f| ui::ui(f, app))
            .context("failed to draw")?;

        let Some(event) = rx.recv().await else {
            break;
        };

        off_loop(|| dispatch(event, app, effects));

        app.theme = Theme::default().with_palette(app.tracker.view().palette.as_ref());

        if app.tracker.song().name.is_empty() {
            app.artwork = ArtworkState::Idle;
        }

        if let Some(info) = app.tracker.take_now_playing() {
            if let Some(now_playing) = now_playing.as_mut() {
                if let Err(e) = now_playing.publish(&info) {
                    tracing::debug!(error = %e, "now playing update failed");
                }
            }
        }

        let current = app.tracker.helper().id();
        if *last_player != Some(current) {
            off_loop(|| state_file.update(|s| s.last_player = Some(current)));
            *last_player = Some(current);
        }
    }

    Ok(())
}

/// Feeds one event to the tracker and runs the effects it asks for.
fn dispatch(event: AppEvent, app: &mut App, effects: &mut EffectRunner) {
    match event {
        AppEvent::Input(Event::Key(key)) if key.kind == KeyEventKind::Press => {
            inputs::handle_key(key, app);
        }
        AppEvent::Input(Event::FocusGained) => app.tracker.refresh(),
        AppEvent::Input(Event::FocusLost) => app.tracker.resign(),
        AppEvent::Input(_) => {}
        AppEvent::External(n) => app.tracker.handle_external_notification(&n),
        AppEvent::Player(event) => app.tracker.handle_player_notification(&event),
        AppEvent::Remote(command) => inputs::handle_remote(command, app),
        AppEvent::ArtworkUpdate {
            song_key,
            image,
            palette,
            url,
        } => {
            if song_key == app.tracker.song().key() {
                app.artwork = match image {
                    Some(image) => ArtworkState::Loaded(image),
                    None => ArtworkState::Failed,
                };
            }
            app.tracker.apply_artwork(&song_key, palette, url);
        }
        AppEvent::LikeUpdate { song_key, liked } => {
            app.tracker.apply_remote_like(&song_key, liked);
        }
        AppEvent::Status(message) => app.show_toast(&message),
        AppEvent::Progress => {
            if app.tracker.is_tracking() {
                app.tracker.tick();
            }
        }
        AppEvent::Tick => {
            let now = Instant::now();
            app.on_tick(now);
            app.tracker.expire_action(now);
        }
        AppEvent::Wake => app.tracker.handle_wake(),
        AppEvent::Terminate => {
            tracing::info!("terminated by another instance");
            app.is_running = false;
        }
    }

    for effect in app.tracker.take_effects() {
        effects.perform(effect, app);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_player_calls_leave_other_tasks_running() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();
        let ticker = tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_millis(10)).await;
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        // Stands in for a run of osascript calls on the only worker
        let during = tokio::spawn(async move {
            off_loop(|| {
                let before = ticks.load(Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(300));
                ticks.load(Ordering::SeqCst) - before
            })
        })
        .await
        .unwrap();

        ticker.abort();
        assert!(during > 5, "ticker stalled: {during} ticks");
    }
}
