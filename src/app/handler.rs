//! Input handling: maps terminal events to state mutations.
//!
//! Input callbacks only record state (pointer samples, scroll targets,
//! hover spots).  The page animates in [`handle_tick`], on the always-on
//! page tick; the trail advances in [`handle_refresh`], only while its
//! frame scheduler is subscribed to the refresh signal.

use std::time::Instant;

use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use kurbo::Point;
use ratatui::layout::Rect;
use tracing::debug;

use crate::config::Action;
use crate::core::engine::EngineStatus;
use crate::core::scheduler::RefreshSignal;
use crate::core::scroll::ScrollThresholds;
use crate::core::visibility::RevealState;
use crate::ui::layout::{back_to_top_span, nav_spans};

use super::page::ElementId;
use super::state::AppState;

/// Rows moved per arrow key or wheel notch.
const LINE_ROWS: f64 = 3.0;

/// Process a key event.
pub fn handle_key<R: RefreshSignal>(state: &mut AppState<R>, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    // Ctrl+c always quits.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return;
    }
    // Any key skips the intro.
    if state.intro_active() {
        skip_intro(state);
        return;
    }

    let Some(action) = state.config.match_key(key) else {
        return;
    };
    let line = state.metrics.rows_to_px(LINE_ROWS);
    let page = state
        .metrics
        .rows_to_px(state.layout().page_area.height.saturating_sub(2).max(1) as f64);

    match action {
        Action::ScrollUp => state.scroll.scroll_by(-line),
        Action::ScrollDown => state.scroll.scroll_by(line),
        Action::PageUp => state.scroll.scroll_by(-page),
        Action::PageDown => state.scroll.scroll_by(page),
        Action::Top => state.scroll.scroll_to(0.0),
        Action::Bottom => {
            let max = state.scroll.max();
            state.scroll.scroll_to(max);
        }
        Action::ToggleTrail => toggle_trail(state),
        Action::ToggleHud => state.show_hud = !state.show_hud,
        Action::Quit => state.should_quit = true,
    }
}

fn skip_intro<R: RefreshSignal>(state: &mut AppState<R>) {
    if let Some(intro) = state.intro.as_mut() {
        intro.skip();
    }
    state.intro = None;
}

fn toggle_trail<R: RefreshSignal>(state: &mut AppState<R>) {
    match state.engine.status() {
        EngineStatus::Running => {
            state.engine.stop();
            state.trail.clear();
            state.status_message = Some("trail off".into());
        }
        EngineStatus::Stopped => {
            state.engine.start();
            state.status_message = Some("trail on".into());
        }
        EngineStatus::Inert => {
            state.status_message =
                Some(format!("trail disabled on this device ({})", state.profile.class));
        }
    }
}

/// Process a mouse event.
pub fn handle_mouse<R: RefreshSignal>(state: &mut AppState<R>, mouse: MouseEvent, now: Instant) {
    if state.intro_active() {
        if matches!(mouse.kind, MouseEventKind::Down(_)) {
            skip_intro(state);
        }
        return;
    }

    match mouse.kind {
        MouseEventKind::Moved | MouseEventKind::Drag(_) => {
            let pos = state.metrics.cell_center(mouse.column, mouse.row);
            state.engine.pointer_move(now, pos);
            update_hover(state, pos, now);
        }
        MouseEventKind::ScrollDown => {
            let line = state.metrics.rows_to_px(LINE_ROWS);
            state.scroll.scroll_by(line);
        }
        MouseEventKind::ScrollUp => {
            let line = state.metrics.rows_to_px(LINE_ROWS);
            state.scroll.scroll_by(-line);
        }
        MouseEventKind::Down(MouseButton::Left) => handle_click(state, mouse.column, mouse.row),
        _ => {}
    }
}

fn handle_click<R: RefreshSignal>(state: &mut AppState<R>, col: u16, row: u16) {
    let layout = state.layout();
    if row == layout.nav_area.y {
        let target = nav_spans(layout.nav_area, state.thresholds.nav_condensed)
            .into_iter()
            .find(|&(_, start, end)| col >= start && col < end)
            .and_then(|(section, _, _)| state.section_offset_px(section));
        if let Some(offset) = target {
            state.scroll.scroll_to(offset);
        }
    } else if row == layout.status_area.y && state.thresholds.show_back_to_top {
        let (_, start, end) = back_to_top_span(layout.status_area);
        if col >= start && col < end {
            state.scroll.scroll_to(0.0);
        }
    }
}

/// Enter, move or leave each card's spotlight.
fn update_hover<R: RefreshSignal>(state: &mut AppState<R>, pos: Point, now: Instant) {
    let indices: Vec<usize> = state.hover.keys().copied().collect();
    for index in indices {
        let rect = state.card_screen_px(index);
        let Some(glow) = state.hover.get_mut(&index) else {
            continue;
        };
        match rect {
            Some(rect) if rect.contains(pos) => {
                if !glow.is_hovered() {
                    glow.on_enter();
                }
                glow.on_move(now, pos, rect);
            }
            _ => {
                if glow.is_hovered() {
                    glow.on_leave();
                }
            }
        }
    }
}

/// Terminal focus stands in for the pointer entering or leaving the page.
pub fn handle_focus<R: RefreshSignal>(state: &mut AppState<R>, gained: bool) {
    if gained {
        state.engine.pointer_enter();
    } else {
        state.engine.pointer_leave();
        for glow in state.hover.values_mut() {
            glow.on_leave();
        }
    }
}

/// The device gate is not re-evaluated on resize.
pub fn handle_resize<R: RefreshSignal>(state: &mut AppState<R>, width: u16, height: u16) {
    debug!(width, height, trail = ?state.engine.status(), "terminal resized");
    state.relayout(Rect::new(0, 0, width, height));
}

/// One page tick: intro, smooth scroll and observers.  Runs whether or
/// not the trail is running.
pub fn handle_tick<R: RefreshSignal>(state: &mut AppState<R>, now: Instant) {
    state.now = now;

    if let Some(intro) = state.intro.as_mut() {
        intro.tick(now, &mut state.rng);
        if intro.is_done() {
            debug!("intro finished");
            state.intro = None;
        }
    }

    state.scroll.tick();
    update_observers(state, now);
}

/// One tick of the trail's display-refresh signal.
pub fn handle_refresh<R: RefreshSignal>(state: &mut AppState<R>, now: Instant) {
    state.engine.on_refresh(now, Some(&mut state.trail));
}

/// Feed current geometry to the reveal tracker and scroll listeners.
fn update_observers<R: RefreshSignal>(state: &mut AppState<R>, now: Instant) {
    let viewport = state.viewport_px();
    let elements: Vec<ElementId> = state.page.elements().collect();
    for id in elements {
        let Some(rect) = state.element_px(id) else {
            continue;
        };
        match state.reveal.observe(&id, rect, viewport) {
            Some(RevealState::Visible) => {
                state.revealed_at.insert(id, now);
            }
            Some(RevealState::Hidden) => {
                state.revealed_at.remove(&id);
            }
            None => {}
        }
    }

    let geometry = state.tracked_geometry();
    state.progress.on_scroll(&geometry);

    let thresholds = ScrollThresholds::from_offset(state.scroll.offset());
    if thresholds != state.thresholds {
        debug!(?thresholds, "scroll thresholds changed");
        state.thresholds = thresholds;
    }
}
