use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};
use tokio::sync::{mpsc, Mutex};
use tracing::{info, warn};

use spark_core::post::PostCache;
use spark_core::signal::{dispatch, LogSink, SignalSink};
use spark_core::AppConfig;
use spark_tui::{
    app::{App, Effect, Screen},
    event::{AppEvent, EventHandler, LoadResult},
    input::handle_key_event,
    keymap::Keymap,
    widgets::{FeedListWidget, ReaderWidget, StatusBarWidget},
    Theme,
};

use super::open_source;

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

/// Which cache operation a background load performs
#[derive(Debug, Clone, Copy)]
enum Load {
    Initial,
    /// Move more queued posts on screen; carries the current list length
    More(usize),
    Refresh,
}

pub async fn run(config: Arc<AppConfig>, file: Option<&Path>) -> Result<()> {
    let keymap = Keymap::from_config(&config.keymap);
    let source = open_source(&config, file)?;
    info!(source = %source.name(), "Starting reader");
    let cache = Arc::new(Mutex::new(PostCache::new(source, config.feed.clone())));
    let sink: Arc<dyn SignalSink> = Arc::new(LogSink);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, SetTitle("Spark"))?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let app = App::new(config.clone(), Theme::default());
    let result = main_loop(&mut terminal, app, &keymap, cache, sink).await;

    // Restore terminal even when the loop failed
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn main_loop(
    terminal: &mut Tui,
    mut app: App,
    keymap: &Keymap,
    cache: Arc<Mutex<PostCache>>,
    sink: Arc<dyn SignalSink>,
) -> Result<()> {
    let event_handler = EventHandler::with_animation_fps(
        app.config.ui.tick_rate_ms,
        app.config.animation.animation_fps,
    );
    let batch = app.config.feed.fetch_batch_size;

    let (load_tx, mut load_rx) = mpsc::unbounded_channel::<LoadResult>();
    spawn_load(cache.clone(), Load::Initial, batch, load_tx.clone());

    let mut needs_fast_update = false;

    loop {
        // Process completed loads (non-blocking)
        while let Ok(result) = load_rx.try_recv() {
            match result {
                LoadResult::Loaded { posts, has_more } => app.set_posts(posts, has_more),
                LoadResult::Failed { error } => {
                    app.is_loading = false;
                    app.set_status(format!("Load failed: {}", error));
                }
            }
        }

        let now = Instant::now();
        app.tick(now);

        if app.wants_more() {
            app.is_loading = true;
            spawn_load(cache.clone(), Load::More(app.posts().len()), batch, load_tx.clone());
        }

        terminal.draw(|frame| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(1), Constraint::Length(1)])
                .split(frame.area());

            match app.screen {
                Screen::Feed => FeedListWidget::render(frame, chunks[0], &app),
                Screen::Reader => {
                    // The header height depends on the scroll position the body reports
                    let layout = ReaderWidget::layout(chunks[0], &app);
                    app.layout_reader(layout.body, now);
                    let layout = ReaderWidget::layout(chunks[0], &app);
                    ReaderWidget::render(frame, &layout, &app, now);
                }
            }
            StatusBarWidget::render(frame, chunks[1], &app);
        })?;

        let event = if needs_fast_update {
            event_handler.next_animation()?
        } else {
            event_handler.next()?
        };
        let now = Instant::now();
        if let Some(event) = event {
            match event {
                AppEvent::Key(key) => {
                    let action = handle_key_event(key, keymap);
                    if let Some(effect) = app.handle_action(action, now) {
                        apply_effect(&mut app, effect, &cache, batch, &load_tx);
                    }
                }
                AppEvent::Mouse(mouse) => app.handle_mouse(mouse, now),
                // Layout is recomputed on every draw
                AppEvent::Resize(_, _) => {}
                AppEvent::Tick => {}
            }
        }

        let signals = app.take_signals();
        if !signals.is_empty() {
            let sink = sink.clone();
            tokio::spawn(async move {
                dispatch(sink.as_ref(), signals).await;
            });
        }

        needs_fast_update = app.is_animating(Instant::now());

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn apply_effect(
    app: &mut App,
    effect: Effect,
    cache: &Arc<Mutex<PostCache>>,
    batch: usize,
    load_tx: &mpsc::UnboundedSender<LoadResult>,
) {
    match effect {
        Effect::Refresh => {
            app.signals.reset();
            spawn_load(cache.clone(), Load::Refresh, batch, load_tx.clone());
        }
        Effect::Like { post_id, liked, likes } => {
            let cache = cache.clone();
            tokio::spawn(async move {
                cache.lock().await.update_local_like(&post_id, liked, likes);
            });
        }
    }
}

/// Run a cache operation off the UI loop and report the new displayed list
fn spawn_load(
    cache: Arc<Mutex<PostCache>>,
    load: Load,
    batch: usize,
    tx: mpsc::UnboundedSender<LoadResult>,
) {
    tokio::spawn(async move {
        let mut cache = cache.lock().await;
        let outcome = match load {
            Load::Initial => cache.initialize().await,
            Load::Refresh => cache.refetch().await,
            Load::More(_) => {
                if cache.queued().next().is_none() {
                    cache.refill().await;
                }
                cache.consume_many(batch).await;
                Ok(())
            }
        };

        let result = match outcome {
            Ok(()) => {
                let posts = cache.displayed().to_vec();
                // A load that shows nothing new would be retried forever
                let has_more = match load {
                    Load::More(before) if posts.len() <= before => false,
                    _ => cache.has_more() || cache.queued().next().is_some(),
                };
                LoadResult::Loaded { posts, has_more }
            }
            Err(e) => {
                warn!(error = %e, ?load, "Feed load failed");
                LoadResult::Failed {
                    error: e.to_string(),
                }
            }
        };
        let _ = tx.send(result);
    });
}
