//! In-console notifications: transient toasts plus a single confirmation slot.
//!
//! Only one confirmation can be pending at a time. A second request while the
//! slot is occupied is rejected outright rather than queued or silently
//! replacing the first, so the pending question on screen always matches the
//! action that will run.

use std::time::{Duration, Instant};

use ratatui::style::Color;

/// How long a toast stays on screen.
const NOTICE_TTL: Duration = Duration::from_secs(4);

/// Toast severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Error,
}

impl Level {
    pub const fn color(self) -> Color {
        match self {
            Self::Info => Color::Cyan,
            Self::Success => Color::Green,
            Self::Error => Color::Red,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub message: String,
    pub level: Level,
    shown_at: Instant,
}

/// A pending confirmation: the question shown plus the action to run on
/// accept.
#[derive(Debug, Clone)]
struct Confirm<A> {
    message: String,
    action: A,
}

/// Notification state owned by the TUI app.
#[derive(Debug)]
pub struct Notifier<A> {
    notice: Option<Notice>,
    confirm: Option<Confirm<A>>,
}

impl<A> Default for Notifier<A> {
    fn default() -> Self {
        Self {
            notice: None,
            confirm: None,
        }
    }
}

impl<A> Notifier<A> {
    /// Show a toast, replacing any current one.
    pub fn notify(&mut self, level: Level, message: impl Into<String>) {
        self.notice = Some(Notice {
            message: message.into(),
            level,
            shown_at: Instant::now(),
        });
    }

    /// The toast currently on screen, if any.
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Drop the toast once its time is up.
    pub fn tick(&mut self) {
        if let Some(notice) = &self.notice {
            if notice.shown_at.elapsed() >= NOTICE_TTL {
                self.notice = None;
            }
        }
    }

    /// Ask for confirmation. Returns `false` (and changes nothing) when a
    /// confirmation is already pending.
    pub fn request_confirm(&mut self, message: impl Into<String>, action: A) -> bool {
        if self.confirm.is_some() {
            tracing::debug!("confirmation slot busy, rejecting new request");
            return false;
        }
        self.confirm = Some(Confirm {
            message: message.into(),
            action,
        });
        true
    }

    /// The question awaiting an answer, if any.
    pub fn pending_confirm(&self) -> Option<&str> {
        self.confirm.as_ref().map(|c| c.message.as_str())
    }

    /// Answer the pending confirmation. Accepting yields the stored action;
    /// declining (or answering with none pending) yields `None`. Either way
    /// the slot is freed.
    pub fn resolve_confirm(&mut self, accepted: bool) -> Option<A> {
        let confirm = self.confirm.take()?;
        accepted.then_some(confirm.action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_confirm_request_is_rejected_and_first_kept() {
        let mut notifier: Notifier<&str> = Notifier::default();
        assert!(notifier.request_confirm("Delete A?", "a"));
        assert!(!notifier.request_confirm("Delete B?", "b"));
        assert_eq!(notifier.pending_confirm(), Some("Delete A?"));

        assert_eq!(notifier.resolve_confirm(true), Some("a"));
        assert!(notifier.pending_confirm().is_none());
    }

    #[test]
    fn declining_frees_the_slot_without_an_action() {
        let mut notifier: Notifier<&str> = Notifier::default();
        notifier.request_confirm("Delete A?", "a");
        assert_eq!(notifier.resolve_confirm(false), None);

        // Slot is free again.
        assert!(notifier.request_confirm("Delete B?", "b"));
    }

    #[test]
    fn resolve_with_nothing_pending_is_a_no_op() {
        let mut notifier: Notifier<&str> = Notifier::default();
        assert_eq!(notifier.resolve_confirm(true), None);
    }

    #[test]
    fn notify_replaces_current_toast() {
        let mut notifier: Notifier<()> = Notifier::default();
        notifier.notify(Level::Info, "first");
        notifier.notify(Level::Error, "second");
        let notice = notifier.notice().expect("toast");
        assert_eq!(notice.message, "second");
        assert_eq!(notice.level, Level::Error);
    }
}
