//! Configuration management utilities.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs_next::config_dir;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::domain::model::StripMode;

static DEFAULT_CONFIG: Lazy<&'static str> =
    Lazy::new(|| include_str!("../../assets/default-config.toml"));
static DEFAULT_WORKSPACE_CONFIG_PATH: &str = ".pypath/config.toml";

const DEFAULT_EXTENSION: &str = ".py";

/// Layered configuration loaded from defaults, user, workspace, explicit file, and env.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub resolver: Resolver,
    #[serde(default)]
    pub clipboard: ClipboardSettings,
    #[serde(default)]
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Resolver {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    extensions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    strip_mode: Option<StripMode>,
}

impl Resolver {
    /// Recognized extensions, each with a leading dot.
    pub fn extensions(&self) -> Vec<String> {
        self.extensions
            .clone()
            .unwrap_or_else(|| vec![DEFAULT_EXTENSION.to_owned()])
    }

    pub fn strip_mode(&self) -> StripMode {
        self.strip_mode.unwrap_or_default()
    }

    pub fn set_extensions(&mut self, extensions: Vec<String>) {
        self.extensions = Some(extensions);
    }

    pub fn set_strip_mode(&mut self, strip_mode: StripMode) {
        self.strip_mode = Some(strip_mode);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ClipboardSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fallback_commands: Option<bool>,
}

impl ClipboardSettings {
    /// Whether shell utilities may stand in for the system clipboard.
    pub fn fallback_commands(&self) -> bool {
        self.fallback_commands.unwrap_or(true)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Status {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    show: Option<bool>,
}

impl Status {
    pub fn show(&self) -> bool {
        self.show.unwrap_or(true)
    }
}

/// Environment overrides for critical settings.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    extensions: Option<String>,
    strip_mode: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            extensions: env::var("PYPATH_EXTENSIONS").ok(),
            strip_mode: env::var("PYPATH_STRIP_MODE").ok(),
        }
    }

    #[cfg(test)]
    fn for_tests(extensions: Option<&str>, strip_mode: Option<&str>) -> Self {
        Self {
            extensions: extensions.map(str::to_owned),
            strip_mode: strip_mode.map(str::to_owned),
        }
    }
}

impl Config {
    /// Load configuration from defaults, user/global config, workspace config, an optional
    /// explicit file, and env overrides.
    ///
    /// The workspace layer is looked up from `anchor` (usually the active file's directory),
    /// falling back to the working directory.
    pub fn load(explicit: Option<&Path>, anchor: Option<&Path>) -> Result<Self> {
        let env = EnvOverrides::from_env();
        let global = global_config_path();
        let workspace = workspace_config_path(anchor)?;
        Self::load_with_layers(global, workspace, explicit, env)
    }

    fn load_with_layers(
        global: Option<PathBuf>,
        workspace: Option<PathBuf>,
        explicit: Option<&Path>,
        env_overrides: EnvOverrides,
    ) -> Result<Self> {
        let mut layers: Vec<Config> = Vec::new();

        layers.push(Self::from_str(&DEFAULT_CONFIG)?);

        if let Some(global_path) = global.filter(|path| path.exists()) {
            tracing::debug!(path = %global_path.display(), "loading global config");
            layers.push(Self::from_file(&global_path)?);
        }

        if let Some(workspace_path) = workspace.filter(|path| path.exists()) {
            tracing::debug!(path = %workspace_path.display(), "loading workspace config");
            layers.push(Self::from_file(&workspace_path)?);
        }

        if let Some(explicit_path) = explicit {
            layers.push(Self::from_file(explicit_path)?);
        }

        let merged = layers.into_iter().reduce(Config::merge).unwrap_or_default();
        let config = apply_env_overrides(merged, env_overrides)?.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&data)
            .with_context(|| format!("invalid config file: {}", path.display()))
    }

    fn from_str(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).with_context(|| "failed to parse TOML config".to_string())?;
        Ok(config)
    }

    fn merge(self, other: Self) -> Self {
        Self {
            resolver: merge_resolver(self.resolver, other.resolver),
            clipboard: ClipboardSettings {
                fallback_commands: other
                    .clipboard
                    .fallback_commands
                    .or(self.clipboard.fallback_commands),
            },
            status: Status {
                show: other.status.show.or(self.status.show),
            },
        }
    }

    /// Normalize extensions to carry a leading dot and reject empty sets.
    fn validate(mut self) -> Result<Self, DomainError> {
        let extensions = normalize_extensions(&self.resolver.extensions())?;
        self.resolver.extensions = Some(extensions);
        Ok(self)
    }

    /// Render every setting, defaults included, as TOML.
    pub fn to_toml(&self) -> Result<String> {
        let effective = Config {
            resolver: Resolver {
                extensions: Some(self.resolver.extensions()),
                strip_mode: Some(self.resolver.strip_mode()),
            },
            clipboard: ClipboardSettings {
                fallback_commands: Some(self.clipboard.fallback_commands()),
            },
            status: Status {
                show: Some(self.status.show()),
            },
        };
        toml::to_string(&effective).context("failed to render config as TOML")
    }
}

fn merge_resolver(mut base: Resolver, overlay: Resolver) -> Resolver {
    if let Some(extensions) = overlay.extensions {
        base.extensions = Some(extensions);
    }
    if let Some(strip_mode) = overlay.strip_mode {
        base.strip_mode = Some(strip_mode);
    }
    base
}

fn normalize_extensions(raw: &[String]) -> Result<Vec<String>, DomainError> {
    let mut extensions: Vec<String> = Vec::with_capacity(raw.len());
    for extension in raw {
        let trimmed = extension.trim();
        let bare = trimmed.strip_prefix('.').unwrap_or(trimmed);
        if bare.is_empty() || bare.contains(&['.', '/', '\\'][..]) {
            return Err(DomainError::InvalidExtension(extension.clone()));
        }
        let normalized = format!(".{bare}");
        if !extensions.contains(&normalized) {
            extensions.push(normalized);
        }
    }

    if extensions.is_empty() {
        return Err(DomainError::EmptyExtensionSet);
    }
    Ok(extensions)
}

fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|base| base.join("pypath/config.toml"))
}

fn workspace_config_path(anchor: Option<&Path>) -> Result<Option<PathBuf>> {
    let start = match anchor {
        Some(dir) => dir.to_path_buf(),
        None => env::current_dir()?,
    };
    let root = find_repo_root(&start).unwrap_or(start);
    Ok(Some(root.join(DEFAULT_WORKSPACE_CONFIG_PATH)))
}

fn find_repo_root(start: &Path) -> Option<PathBuf> {
    let mut current = start;
    loop {
        if current.join(".git").exists() {
            return Some(current.to_path_buf());
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Result<Config> {
    if let Some(extensions) = env.extensions {
        let list = extensions
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_owned)
            .collect();
        config.resolver.set_extensions(list);
    }
    if let Some(strip_mode) = env.strip_mode {
        let mode = strip_mode
            .parse::<StripMode>()
            .context("invalid PYPATH_STRIP_MODE")?;
        config.resolver.set_strip_mode(mode);
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_uses_defaults_when_no_files() {
        let config = Config::load_with_layers(None, None, None, EnvOverrides::default())
            .expect("load default config");
        assert_eq!(config.resolver.extensions(), [".py"]);
        assert_eq!(config.resolver.strip_mode(), StripMode::Legacy);
        assert!(config.clipboard.fallback_commands());
        assert!(config.status.show());
    }

    #[test]
    fn merge_global_workspace_and_explicit() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let global = temp.path().join("config.toml");
        fs::write(
            &global,
            r#"
[resolver]
strip_mode = "extension"
[status]
show = false
"#,
        )?;

        let workspace_dir = temp.path().join("repo");
        fs::create_dir_all(workspace_dir.join(".pypath"))?;
        fs::create_dir_all(workspace_dir.join(".git"))?;
        fs::write(
            workspace_dir.join(".pypath/config.toml"),
            r#"
[resolver]
extensions = ["py", ".pyi"]
"#,
        )?;

        let explicit = temp.path().join("explicit.toml");
        fs::write(
            &explicit,
            r#"
[clipboard]
fallback_commands = false
"#,
        )?;

        let config = Config::load_with_layers(
            Some(global),
            Some(workspace_dir.join(".pypath/config.toml")),
            Some(&explicit),
            EnvOverrides::default(),
        )?;

        assert_eq!(config.resolver.strip_mode(), StripMode::Extension);
        assert_eq!(config.resolver.extensions(), [".py", ".pyi"]);
        assert!(!config.clipboard.fallback_commands());
        assert!(!config.status.show());
        Ok(())
    }

    #[test]
    fn env_overrides_take_precedence() -> Result<()> {
        let overrides = EnvOverrides::for_tests(Some("py, pyw"), Some("extension"));
        let config = Config::load_with_layers(None, None, None, overrides)?;
        assert_eq!(config.resolver.extensions(), [".py", ".pyw"]);
        assert_eq!(config.resolver.strip_mode(), StripMode::Extension);
        Ok(())
    }

    #[test]
    fn invalid_strip_mode_override_is_rejected() {
        let overrides = EnvOverrides::for_tests(None, Some("suffix"));
        assert!(Config::load_with_layers(None, None, None, overrides).is_err());
    }

    #[test]
    fn empty_extension_list_is_rejected() {
        let overrides = EnvOverrides::for_tests(Some(" , "), None);
        let err = Config::load_with_layers(None, None, None, overrides).unwrap_err();
        assert_eq!(
            err.downcast_ref::<DomainError>(),
            Some(&DomainError::EmptyExtensionSet)
        );
    }

    #[test]
    fn missing_explicit_file_returns_error() {
        let temp = tempfile::tempdir().unwrap();
        let missing = temp.path().join("absent.toml");
        let result =
            Config::load_with_layers(None, None, Some(&missing), EnvOverrides::default());
        assert!(result.is_err());
    }

    #[test]
    fn workspace_config_follows_anchor_repository() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let repo = temp.path().join("other-project");
        fs::create_dir_all(repo.join(".git"))?;
        fs::create_dir_all(repo.join("src/pkg"))?;

        let found = workspace_config_path(Some(repo.join("src/pkg").as_path()))?;
        assert_eq!(found, Some(repo.join(".pypath/config.toml")));
        Ok(())
    }

    #[test]
    fn invalid_config_returns_error() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let file = temp.path().join("broken.toml");
        fs::write(&file, "this is not toml")?;
        let result = Config::from_file(&file);
        assert!(result.is_err());
        Ok(())
    }

    #[test]
    fn normalize_rejects_nested_extensions() {
        assert_eq!(
            normalize_extensions(&["tar.gz".into()]),
            Err(DomainError::InvalidExtension("tar.gz".into()))
        );
        assert_eq!(
            normalize_extensions(&[".py".into(), "py".into()]),
            Ok(vec![".py".to_owned()])
        );
    }

    #[test]
    fn rendered_config_includes_defaults() -> Result<()> {
        let rendered = Config::default().to_toml()?;
        let parsed = Config::from_str(&rendered)?;
        assert_eq!(parsed.resolver.extensions(), [".py"]);
        assert!(rendered.contains("strip_mode = \"legacy\""));
        Ok(())
    }
}
