//! Named commands invoked by a host with an explicit context.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use thiserror::Error;

use crate::app::resolver::PathResolver;
use crate::app::status::{StatusMessage, StatusSink};
use crate::infra::clipboard::ClipboardSink;

/// Everything a command may touch: the active file and the host's output primitives.
pub struct CommandContext<'a> {
    pub active_file: Option<&'a Path>,
    pub clipboard: &'a mut dyn ClipboardSink,
    pub status: &'a mut dyn StatusSink,
}

impl<'a> CommandContext<'a> {
    pub fn new(
        active_file: Option<&'a Path>,
        clipboard: &'a mut dyn ClipboardSink,
        status: &'a mut dyn StatusSink,
    ) -> Self {
        Self {
            active_file,
            clipboard,
            status,
        }
    }
}

/// Result of running a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The python path was handed to the clipboard.
    Copied(String),
    /// Nothing to do; no clipboard write and no status message.
    Skipped,
}

pub type EnabledFn = fn(&PathResolver, &CommandContext<'_>) -> bool;
pub type RunFn = fn(&PathResolver, &mut CommandContext<'_>) -> Result<CommandOutcome>;

/// A host-invocable action: an enablement predicate plus the action itself.
#[derive(Debug, Clone, Copy)]
pub struct Command {
    pub name: &'static str,
    pub description: &'static str,
    pub is_enabled: EnabledFn,
    pub run: RunFn,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command '{0}'")]
    Unknown(String),
    #[error("command '{name}' is not enabled for {path}")]
    Disabled { name: String, path: String },
}

pub const COPY_PYTHON_PATH: Command = Command {
    name: "copy_python_path",
    description: "Copy the dotted python path of the active file",
    is_enabled: copy_python_path_enabled,
    run: copy_python_path,
};

/// Commands keyed by name, sharing one resolver.
#[derive(Debug, Clone)]
pub struct CommandTable {
    resolver: PathResolver,
    commands: BTreeMap<&'static str, Command>,
}

impl CommandTable {
    pub fn new(resolver: PathResolver) -> Self {
        Self {
            resolver,
            commands: BTreeMap::new(),
        }
    }

    /// Table with every built-in command registered.
    pub fn with_defaults(resolver: PathResolver) -> Self {
        let mut table = Self::new(resolver);
        table.register(COPY_PYTHON_PATH);
        table
    }

    /// Register a command, returning any previous command with the same name.
    pub fn register(&mut self, command: Command) -> Option<Command> {
        self.commands.insert(command.name, command)
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.commands.values()
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Whether the host should offer `name` for the given context.
    pub fn is_enabled(&self, name: &str, ctx: &CommandContext<'_>) -> bool {
        self.get(name)
            .is_some_and(|command| (command.is_enabled)(&self.resolver, ctx))
    }

    /// Run `name` if it exists and is enabled for the context.
    pub fn invoke(&self, name: &str, ctx: &mut CommandContext<'_>) -> Result<CommandOutcome> {
        let command = self
            .get(name)
            .ok_or_else(|| CommandError::Unknown(name.to_owned()))?;

        if !(command.is_enabled)(&self.resolver, ctx) {
            let path = ctx
                .active_file
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "<no file>".to_owned());
            return Err(CommandError::Disabled {
                name: name.to_owned(),
                path,
            }
            .into());
        }

        tracing::debug!(command = name, "invoking command");
        (command.run)(&self.resolver, ctx)
    }
}

fn copy_python_path_enabled(resolver: &PathResolver, ctx: &CommandContext<'_>) -> bool {
    ctx.active_file
        .is_some_and(|active_file| resolver.is_enabled(active_file))
}

fn copy_python_path(resolver: &PathResolver, ctx: &mut CommandContext<'_>) -> Result<CommandOutcome> {
    let Some(active_file) = ctx.active_file else {
        return Ok(CommandOutcome::Skipped);
    };

    let Some(python_path) = resolver.resolve_python_path(active_file) else {
        tracing::debug!(file = %active_file.display(), "no python path segments found");
        return Ok(CommandOutcome::Skipped);
    };

    ctx.clipboard
        .copy(&python_path)
        .context("failed to copy python path to clipboard")?;
    ctx.status
        .show(StatusMessage::success(format!("Copied python path {python_path}")));

    Ok(CommandOutcome::Copied(python_path))
}
