//! A terminal presentation page with a glowing pointer trail.
//!
//! Move the mouse to draw the trail; scroll to reveal sections.  Run with
//! `--write-config` to dump the current settings to the config file.

use std::io::{self, stderr, Stderr};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, widgets::Paragraph, Frame, Terminal};
use tokio::sync::mpsc;
use tracing::{debug, info};

use glowtrail::app::{
    event::{spawn_event_reader, spawn_page_ticker, AppEvent, TokioRefresh},
    handler,
    page::SECTIONS,
    state::AppState,
};
use glowtrail::config::AppConfig;
use glowtrail::core::device::{DeviceClass, DeviceProfile};
use glowtrail::core::scheduler::RefreshSignal;
use glowtrail::core::visibility::RootMargin;
use glowtrail::ui::{
    intro_widget::{HudWidget, IntroWidget},
    layout::{back_to_top_span, nav_brand, nav_spans},
    page_widget::PageWidget,
    theme::Theme,
    trail_widget::TrailWidget,
};

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "Pointer-trail presentation page for the terminal")]
struct Cli {
    /// Device class for the trail gate: auto, desktop, tablet or mobile.
    #[arg(long, default_value = "auto")]
    device: String,

    /// Skip the typewriter intro.
    #[arg(long)]
    no_intro: bool,

    /// Write logs to this file instead of stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Trail frame rate.
    #[arg(long)]
    fps: Option<f64>,

    /// Per-frame opacity decay, in (0, 1).
    #[arg(long)]
    decay: Option<f64>,

    /// Maximum number of trail points.
    #[arg(long)]
    capacity: Option<usize>,

    /// Minimum distance between recorded points.
    #[arg(long)]
    min_distance: Option<f64>,

    /// Share of an element that must be visible to reveal it.
    #[arg(long)]
    threshold: Option<f64>,

    /// Reveal margin, CSS shorthand (e.g. "0px 0px -100px 0px").
    #[arg(long)]
    root_margin: Option<String>,

    /// Save the effective settings to the config file and exit.
    #[arg(long)]
    write_config: bool,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded config.
    fn apply(&self, config: &mut AppConfig) -> Result<()> {
        let engine = &mut config.engine;
        if let Some(fps) = self.fps {
            engine.target_fps = fps;
        }
        if let Some(decay) = self.decay {
            engine.trail.decay = decay;
        }
        if let Some(capacity) = self.capacity {
            engine.trail.capacity = capacity;
        }
        if let Some(d) = self.min_distance {
            engine.trail.min_distance = d;
        }
        if let Some(t) = self.threshold {
            engine.observer.threshold = t;
        }
        if let Some(m) = &self.root_margin {
            engine.observer.margin = RootMargin::parse(m)?;
        }
        if self.no_intro {
            config.intro = false;
        }
        config
            .engine
            .validate()
            .context("invalid engine settings")?;
        Ok(())
    }

    fn device_class(&self) -> Result<DeviceClass> {
        if self.device.eq_ignore_ascii_case("auto") {
            return Ok(DeviceClass::detect());
        }
        self.device.parse().map_err(anyhow::Error::msg)
    }
}

// ───────────────────────────────────────── logging ───────────

fn init_tracing(log_file: Option<&PathBuf>) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr) // never pollute stdout
                .init();
        }
    }
    Ok(())
}

// ───────────────────────────────────────── drawing ───────────

fn draw<R: RefreshSignal>(frame: &mut Frame, state: &AppState<R>) {
    let layout = state.layout();

    frame.render_widget(
        PageWidget {
            layout: &state.page,
            scroll_rows: state.scroll_rows(),
            reveal: &state.reveal,
            revealed_at: &state.revealed_at,
            now: state.now,
            gradient_stop: state.progress.gradient_stop(),
            hover: &state.hover,
            metrics: state.metrics,
        },
        layout.page_area,
    );

    // ── navigation ─────────────────────────────────────────────
    let condensed = state.thresholds.nav_condensed;
    let nav = layout.nav_area;
    frame.render_widget(Paragraph::new("").style(Theme::nav_style(condensed)), nav);
    let buf = frame.buffer_mut();
    if !condensed {
        buf.set_string(nav.x + 1, nav.y, nav_brand(), Theme::brand_style());
    }
    for (section, x, _) in nav_spans(nav, condensed) {
        if let Some(s) = SECTIONS.get(section) {
            buf.set_string(x, nav.y, s.id, Theme::nav_style(condensed));
        }
    }

    // ── status bar ─────────────────────────────────────────────
    let hint = state.config.status_bar_hint();
    let status_text = state.status_message.as_deref().unwrap_or(&hint);
    frame.render_widget(
        Paragraph::new(status_text).style(Theme::status_bar_style()),
        layout.status_area,
    );
    if state.thresholds.show_back_to_top {
        let (label, x, _) = back_to_top_span(layout.status_area);
        frame
            .buffer_mut()
            .set_string(x, layout.status_area.y, label, Theme::back_to_top_style());
    }

    // ── overlays ───────────────────────────────────────────────
    frame.render_widget(TrailWidget::new(&state.trail, state.metrics), frame.area());

    if state.show_hud {
        let lines = state.hud_lines();
        let hud = HudWidget { lines: &lines };
        let area = hud.area(frame.area());
        frame.render_widget(hud, area);
    }

    if let Some(intro) = state.intro.as_ref().filter(|i| !i.is_done()) {
        frame.render_widget(
            IntroWidget {
                intro,
                now: state.now,
            },
            frame.area(),
        );
    }
}

// ───────────────────────────────────────── event loop ────────

fn dispatch<R: RefreshSignal>(state: &mut AppState<R>, event: AppEvent) {
    match event {
        AppEvent::Key(k) => handler::handle_key(state, k),
        AppEvent::Mouse(m) => handler::handle_mouse(state, m, Instant::now()),
        AppEvent::Resize(w, h) => handler::handle_resize(state, w, h),
        AppEvent::FocusGained => handler::handle_focus(state, true),
        AppEvent::FocusLost => handler::handle_focus(state, false),
        AppEvent::Tick(now) => handler::handle_tick(state, now),
        AppEvent::Refresh(now) => handler::handle_refresh(state, now),
    }
}

async fn run(
    terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    state: &mut AppState<TokioRefresh>,
    events: &mut mpsc::UnboundedReceiver<AppEvent>,
) -> Result<()> {
    loop {
        terminal.draw(|frame| draw(frame, state))?;

        let Some(event) = events.recv().await else {
            break;
        };
        dispatch(state, event);
        // Drain everything already queued before redrawing, so a burst of
        // mouse motion costs one draw.
        while let Ok(event) = events.try_recv() {
            dispatch(state, event);
        }

        if state.should_quit {
            break;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_ref())?;

    let mut user_config = AppConfig::load();
    cli.apply(&mut user_config)?;

    if cli.write_config {
        user_config.save()?;
        println!("settings written");
        return Ok(());
    }

    // ── device gate inputs, captured once ─────────────────────
    let (cols, rows) = crossterm::terminal::size()?;
    let viewport_width = match crossterm::terminal::window_size() {
        Ok(ws) if ws.width > 0 => ws.width as f64,
        _ => cols as f64 * user_config.cell_width,
    };
    let profile = DeviceProfile {
        class: cli.device_class()?,
        viewport_width,
    };

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    let mut stderr_handle = stderr();
    execute!(
        stderr_handle,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableFocusChange
    )?;
    let backend = CrosstermBackend::new(stderr());
    let mut terminal = Terminal::new(backend)?;

    // ── event sources ─────────────────────────────────────────
    let (tx, mut events) = mpsc::unbounded_channel::<AppEvent>();
    let reader = spawn_event_reader(tx.clone(), Duration::from_millis(50));
    let ticker = spawn_page_ticker(tx.clone(), user_config.refresh);
    let signal = TokioRefresh::new(tx, user_config.refresh);

    let mut state = AppState::new(
        user_config,
        profile,
        signal,
        ratatui::layout::Rect::new(0, 0, cols, rows),
        Instant::now(),
    );
    let status = state.engine.start();
    info!(?status, class = %profile.class, width = viewport_width, "trail engine started");

    let result = run(&mut terminal, &mut state, &mut events).await;

    // ── teardown ──────────────────────────────────────────────
    state.teardown();
    drop(ticker);
    drop(reader);
    debug!(frames = state.engine.frames(), "shutting down");

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableFocusChange
    )?;
    terminal.show_cursor()?;

    result
}
