//! Clipboard integration utilities.

use std::io::Write;
use std::process::{Command, Stdio};
#[cfg(all(unix, not(target_os = "macos")))]
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};

/// How long a one-shot process keeps serving the selection when no clipboard utility took it.
#[cfg(all(unix, not(target_os = "macos")))]
const SELECTION_HANDOFF: Duration = Duration::from_secs(1);

/// Host primitive that receives copied text.
pub trait ClipboardSink {
    fn copy(&mut self, text: &str) -> Result<()>;
}

/// How long copied text has to outlive the process that copied it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClipboardLifetime {
    /// The host keeps running after the copy (an editor or TUI session).
    #[default]
    Session,
    /// The process exits right after the copy, as the CLI does.
    OneShot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Backend {
    System,
    Commands,
}

/// On X11 and Wayland the selection is served by the process that set it, so a one-shot
/// process hands the text to a clipboard utility that keeps serving it after we exit.
fn backend_order(lifetime: ClipboardLifetime, fallback_commands: bool) -> Vec<Backend> {
    let commands_first =
        cfg!(all(unix, not(target_os = "macos"))) && lifetime == ClipboardLifetime::OneShot;
    match (fallback_commands, commands_first) {
        (false, _) => vec![Backend::System],
        (true, true) => vec![Backend::Commands, Backend::System],
        (true, false) => vec![Backend::System, Backend::Commands],
    }
}

/// System clipboard with fallbacks to shell utilities for headless environments.
pub struct Clipboard {
    primary: Option<arboard::Clipboard>,
    lifetime: ClipboardLifetime,
    fallback_commands: bool,
}

impl Clipboard {
    /// Attempt to initialize the system clipboard. Shell fallbacks stay enabled.
    pub fn new(lifetime: ClipboardLifetime) -> Self {
        let primary = match arboard::Clipboard::new() {
            Ok(clipboard) => Some(clipboard),
            Err(err) => {
                tracing::debug!(error = %err, "system clipboard unavailable");
                None
            }
        };
        Self {
            primary,
            lifetime,
            fallback_commands: true,
        }
    }

    /// Enable or disable the shell-based fallbacks.
    pub fn with_fallbacks(mut self, fallback_commands: bool) -> Self {
        self.fallback_commands = fallback_commands;
        self
    }

    fn copy_system(&mut self, text: &str) -> Result<()> {
        let primary = self
            .primary
            .as_mut()
            .context("system clipboard unavailable")?;
        let result = set_system_text(primary, text, self.lifetime);
        if result.is_err() {
            self.primary = None;
        }
        result
    }
}

impl Default for Clipboard {
    fn default() -> Self {
        Self::new(ClipboardLifetime::default())
    }
}

impl ClipboardSink for Clipboard {
    /// Copy text to the clipboard, trying each backend in turn.
    fn copy(&mut self, text: &str) -> Result<()> {
        let mut last_error = None;
        for backend in backend_order(self.lifetime, self.fallback_commands) {
            let result = match backend {
                Backend::System => self.copy_system(text),
                Backend::Commands => fallback_copy(text),
            };
            match result {
                Ok(()) => return Ok(()),
                Err(err) => {
                    tracing::debug!(?backend, error = %err, "clipboard backend failed");
                    last_error = Some(err);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow!("no clipboard backend available")))
    }
}

#[cfg(all(unix, not(target_os = "macos")))]
fn set_system_text(
    clipboard: &mut arboard::Clipboard,
    text: &str,
    lifetime: ClipboardLifetime,
) -> Result<()> {
    use arboard::SetExtLinux;

    match lifetime {
        ClipboardLifetime::Session => clipboard.set_text(text.to_owned())?,
        ClipboardLifetime::OneShot => {
            tracing::warn!("holding the selection briefly for a clipboard manager");
            clipboard
                .set()
                .wait_until(Instant::now() + SELECTION_HANDOFF)
                .text(text.to_owned())?;
        }
    }
    Ok(())
}

#[cfg(not(all(unix, not(target_os = "macos"))))]
fn set_system_text(
    clipboard: &mut arboard::Clipboard,
    text: &str,
    _lifetime: ClipboardLifetime,
) -> Result<()> {
    clipboard.set_text(text.to_owned())?;
    Ok(())
}

/// Clipboard stand-in that writes copied text as a line, used for `--print-only`.
#[derive(Debug)]
pub struct PrintSink<W: Write> {
    writer: W,
}

impl<W: Write> PrintSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ClipboardSink for PrintSink<W> {
    fn copy(&mut self, text: &str) -> Result<()> {
        writeln!(self.writer, "{text}").context("failed to write python path")?;
        self.writer.flush().context("failed to flush python path")
    }
}

fn fallback_copy(text: &str) -> Result<()> {
    for command in fallback_commands() {
        match try_command_copy(command, text) {
            Ok(()) => return Ok(()),
            Err(err) => tracing::debug!(error = %err, "clipboard fallback failed"),
        }
    }

    Err(anyhow!(
        "failed to copy text to clipboard using available backends"
    ))
}

fn try_command_copy(command: &[&str], text: &str) -> Result<()> {
    let (program, args) = command
        .split_first()
        .context("clipboard command missing program")?;

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to spawn clipboard command: {program}"))?;

    if let Some(mut stdin) = child.stdin.take()
        && let Err(err) = stdin.write_all(text.as_bytes())
    {
        drop(stdin);
        let _ = child.kill();
        let _ = child.wait();
        return Err(err).context("failed to write clipboard contents");
    }

    let status = child
        .wait()
        .with_context(|| format!("clipboard command did not exit cleanly: {program}"))?;
    if status.success() {
        Ok(())
    } else {
        Err(anyhow!("clipboard command {program} exited with status {status}"))
    }
}

#[cfg(target_os = "macos")]
fn fallback_commands() -> &'static [&'static [&'static str]] {
    &[&["pbcopy"]]
}

#[cfg(all(unix, not(target_os = "macos")))]
fn fallback_commands() -> &'static [&'static [&'static str]] {
    &[
        &["wl-copy"],
        &["xclip", "-selection", "clipboard"],
        &["xsel", "--clipboard", "--input"],
    ]
}

#[cfg(target_os = "windows")]
fn fallback_commands() -> &'static [&'static [&'static str]] {
    &[&["powershell.exe", "-NoProfile", "-Command", "Set-Clipboard"]]
}

#[cfg(not(any(unix, target_os = "windows")))]
fn fallback_commands() -> &'static [&'static [&'static str]] {
    &[]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn print_sink_writes_one_line() -> Result<()> {
        let mut sink = PrintSink::new(Vec::new());
        sink.copy("pkg.sub.mod")?;
        assert_eq!(sink.into_inner(), b"pkg.sub.mod\n");
        Ok(())
    }

    #[test]
    fn one_shot_prefers_persistent_utilities_on_linux() {
        let order = backend_order(ClipboardLifetime::OneShot, true);
        if cfg!(all(unix, not(target_os = "macos"))) {
            assert_eq!(order, [Backend::Commands, Backend::System]);
        } else {
            assert_eq!(order, [Backend::System, Backend::Commands]);
        }
    }

    #[test]
    fn session_prefers_system_clipboard() {
        assert_eq!(
            backend_order(ClipboardLifetime::Session, true),
            [Backend::System, Backend::Commands]
        );
    }

    #[test]
    fn disabled_fallbacks_leave_only_system_clipboard() {
        assert_eq!(
            backend_order(ClipboardLifetime::OneShot, false),
            [Backend::System]
        );
    }

    #[cfg(unix)]
    #[test]
    fn command_that_stops_reading_is_reaped_with_error() {
        let contents = "pkg.mod\n".repeat(256 * 1024);
        let err = try_command_copy(&["true"], &contents).unwrap_err();
        assert!(err.to_string().contains("failed to write clipboard contents"));
    }

    #[test]
    fn empty_fallback_command_is_rejected() {
        let err = try_command_copy(&[], "pkg").unwrap_err();
        assert!(err.to_string().contains("missing program"));
    }
}
