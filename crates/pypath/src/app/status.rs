//! Transient status messages shown by the host after a command runs.

use std::io::Write;
use std::time::{Duration, Instant};

const STATUS_TTL: Duration = Duration::from_secs(4);

/// Status message severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Success,
    Error,
}

/// A short-lived message for the host's status area.
#[derive(Debug, Clone)]
pub struct StatusMessage {
    level: StatusLevel,
    text: String,
    expires_at: Instant,
}

impl StatusMessage {
    pub fn new<S: Into<String>>(level: StatusLevel, text: S) -> Self {
        Self::with_ttl(level, text, STATUS_TTL)
    }

    /// Message that stays visible for `ttl` instead of the default four seconds.
    pub fn with_ttl<S: Into<String>>(level: StatusLevel, text: S, ttl: Duration) -> Self {
        Self {
            level,
            text: text.into(),
            expires_at: Instant::now() + ttl,
        }
    }

    pub fn info<S: Into<String>>(text: S) -> Self {
        Self::new(StatusLevel::Info, text)
    }

    pub fn success<S: Into<String>>(text: S) -> Self {
        Self::new(StatusLevel::Success, text)
    }

    pub fn error<S: Into<String>>(text: S) -> Self {
        Self::new(StatusLevel::Error, text)
    }

    pub fn level(&self) -> StatusLevel {
        self.level
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Host primitive that displays status messages.
pub trait StatusSink {
    fn show(&mut self, message: StatusMessage);
}

/// Keeps the messages that are still visible, dropping expired ones on every new message.
impl StatusSink for Vec<StatusMessage> {
    fn show(&mut self, message: StatusMessage) {
        self.retain(|existing| !existing.is_expired());
        self.push(message);
    }
}

/// Writes status messages as single lines, e.g. to stderr.
#[derive(Debug)]
pub struct StatusLine<W: Write> {
    writer: W,
    enabled: bool,
}

impl<W: Write> StatusLine<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            enabled: true,
        }
    }

    /// Silence the line while still accepting messages.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> StatusSink for StatusLine<W> {
    fn show(&mut self, message: StatusMessage) {
        if !self.enabled {
            return;
        }
        if message.is_expired() {
            tracing::debug!(text = message.text(), "dropping expired status message");
            return;
        }

        let result = match message.level() {
            StatusLevel::Error => writeln!(self.writer, "error: {}", message.text()),
            StatusLevel::Info | StatusLevel::Success => writeln!(self.writer, "{}", message.text()),
        };
        if let Err(err) = result {
            tracing::warn!(error = %err, "failed to write status message");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_line_renders_levels() {
        let mut line = StatusLine::new(Vec::new());
        line.show(StatusMessage::success("Copied python path pkg.mod"));
        line.show(StatusMessage::error("clipboard unavailable"));

        let rendered = String::from_utf8(line.into_inner()).unwrap();
        assert_eq!(
            rendered,
            "Copied python path pkg.mod\nerror: clipboard unavailable\n"
        );
    }

    #[test]
    fn disabled_status_line_writes_nothing() {
        let mut line = StatusLine::new(Vec::new()).with_enabled(false);
        line.show(StatusMessage::info("hidden"));
        assert!(line.into_inner().is_empty());
    }

    #[test]
    fn status_line_skips_expired_messages() {
        let mut line = StatusLine::new(Vec::new());
        line.show(StatusMessage::with_ttl(StatusLevel::Info, "stale", Duration::ZERO));
        line.show(StatusMessage::success("fresh"));

        let rendered = String::from_utf8(line.into_inner()).unwrap();
        assert_eq!(rendered, "fresh\n");
    }

    #[test]
    fn message_log_drops_expired_entries() {
        let mut log: Vec<StatusMessage> = Vec::new();
        log.show(StatusMessage::with_ttl(StatusLevel::Info, "stale", Duration::ZERO));
        log.show(StatusMessage::success("Copied python path pkg.mod"));

        assert_eq!(log.len(), 1);
        assert_eq!(log[0].text(), "Copied python path pkg.mod");
    }

    #[test]
    fn fresh_message_is_not_expired() {
        let message = StatusMessage::info("copied");
        assert!(!message.is_expired());
        assert_eq!(message.level(), StatusLevel::Info);
    }
}
