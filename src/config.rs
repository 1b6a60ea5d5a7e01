//! Engine configuration

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::{Error, Result};

/// MathJax build loaded when no other script source is configured
pub const DEFAULT_MATHJAX_URL: &str =
    "https://cdn.jsdelivr.net/npm/mathjax@3.2.2/es5/tex-svg-full.js";

/// Where the engine script comes from
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptSource {
    /// Read from a local file
    Path(PathBuf),
    /// Fetched over HTTP(S)
    Url(String),
    /// Script text passed directly
    Inline(String),
}

impl ScriptSource {
    /// Interpret a command-line style argument: `http(s)://` URLs are fetched,
    /// anything else is a file path.
    pub fn parse(s: &str) -> Self {
        match url::Url::parse(s) {
            Ok(u) if matches!(u.scheme(), "http" | "https") => ScriptSource::Url(s.to_string()),
            _ => ScriptSource::Path(PathBuf::from(s)),
        }
    }

    /// Directory the script lives in, without a trailing slash. MathJax
    /// components are loaded relative to it. Inline scripts have none.
    pub fn component_base(&self) -> Option<String> {
        match self {
            ScriptSource::Url(u) => {
                let dir = url::Url::parse(u).ok()?.join(".").ok()?;
                Some(dir.as_str().trim_end_matches('/').to_string())
            }
            ScriptSource::Path(p) => match p.parent() {
                Some(dir) if !dir.as_os_str().is_empty() => Some(dir.display().to_string()),
                _ => Some(".".to_string()),
            },
            ScriptSource::Inline(_) => None,
        }
    }
}

impl Default for ScriptSource {
    fn default() -> Self {
        ScriptSource::Url(DEFAULT_MATHJAX_URL.to_string())
    }
}

impl fmt::Display for ScriptSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptSource::Path(p) => write!(f, "file {}", p.display()),
            ScriptSource::Url(u) => write!(f, "url {}", u),
            ScriptSource::Inline(code) => write!(f, "inline script ({} bytes)", code.len()),
        }
    }
}

/// Configuration for the typesetting engine
///
/// Every field has a default, so a config file only needs the keys it
/// changes. Unknown keys are rejected.
///
/// # Examples
///
/// ```
/// let cfg = maspace::EngineConfig::default();
/// assert_eq!(cfg.render_timeout_ms, 30000);
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Engine script to load
    pub script: ScriptSource,
    /// Where MathJax loads extra components from (the lite DOM adaptor).
    /// Defaults to the script's directory.
    pub component_base: Option<String>,
    /// User agent sent when fetching the script
    pub user_agent: String,
    /// HTTP timeout for fetching the script in milliseconds
    pub fetch_timeout_ms: u64,
    /// How long a caller waits for one engine step (0 => wait forever)
    pub render_timeout_ms: u64,
    /// Expressions longer than this are rejected before reaching the engine (0 => unlimited)
    pub max_expression_bytes: usize,
    /// Iterations a single script loop may run before Boa throws (0 => disabled)
    pub script_loop_iteration_limit: u64,
    /// Maximum recursion depth before Boa throws (usize::MAX => disabled)
    pub script_recursion_limit: usize,
    /// Job-queue drains and timer ticks allowed while waiting for a promise
    pub max_event_loop_turns: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            script: ScriptSource::default(),
            component_base: None,
            user_agent: concat!("maspace/", env!("CARGO_PKG_VERSION")).to_string(),
            fetch_timeout_ms: 30000,
            render_timeout_ms: 30000,
            max_expression_bytes: 64 * 1024,
            script_loop_iteration_limit: 1_000_000,
            script_recursion_limit: 2048,
            max_event_loop_turns: 1000,
        }
    }
}

impl EngineConfig {
    /// Load a JSON config file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigError(format!("{}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| Error::ConfigError(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_event_loop_turns == 0 {
            return Err(Error::ConfigError(
                "max_event_loop_turns must be at least 1".into(),
            ));
        }
        if self.user_agent.trim().is_empty() {
            return Err(Error::ConfigError("user_agent must not be empty".into()));
        }
        Ok(())
    }

    /// Component base handed to the MathJax loader, if any.
    pub fn component_base(&self) -> Option<String> {
        self.component_base
            .clone()
            .or_else(|| self.script.component_base())
    }

    pub fn render_timeout(&self) -> Option<Duration> {
        (self.render_timeout_ms > 0).then(|| Duration::from_millis(self.render_timeout_ms))
    }
}
