//! The interactive admin console.
//!
//! Every widget here is a headless state machine (key events in, actions
//! out) so the whole console tests without a terminal; [`app::run`] is the
//! only place that touches the real one.

pub mod app;
pub mod filter;
pub mod form;
pub mod notify;
pub mod pane;

pub use app::run;
