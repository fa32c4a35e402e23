//! UI / rendering layer: everything that touches Ratatui widgets.
//!
//! This layer takes the *core* data structures and turns them into cells on
//! the terminal.  No engine state is mutated here, except through the
//! [`TrailSurface`](crate::core::engine::TrailSurface) the engine presents to.

pub mod intro_widget;
pub mod layout;
pub mod page_widget;
pub mod smooth_scroll;
pub mod theme;
pub mod trail_widget;
