//! Application orchestration: state management, event sources, input
//! handling and the inert page content.

pub mod event;
pub mod handler;
pub mod page;
pub mod state;
