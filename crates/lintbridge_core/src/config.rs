//! Bridge configuration.

use std::fs;
use std::path::{Path, PathBuf};

use jsonc_parser::ParseOptions;
use lintbridge_engine::{CommandBackend, EngineKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::BridgeError;

use jsonschema::Validator;
use std::sync::OnceLock;

// Embed the schema
const SCHEMA_JSON: &str = include_str!("../../../schemas/v1/config.json");
static CONFIG_SCHEMA: OnceLock<Validator> = OnceLock::new();

/// Output framing protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framing {
    /// One aggregated envelope behind a `0x10` sentinel.
    Batch,
    /// A streamed JSON array of `[path, diagnostics]` tuples.
    Legacy,
}

impl Framing {
    /// The framing an engine's consumers expect when none is configured.
    pub fn default_for(engine: EngineKind) -> Self {
        match engine {
            EngineKind::Jslint => Framing::Legacy,
            _ => Framing::Batch,
        }
    }
}

/// Order in which per-file outcomes are emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ordering {
    /// As tasks finish.
    #[default]
    Completion,
    /// In input order, buffering early finishers.
    Input,
}

/// How the engine process is launched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandConfig {
    /// Program to run.
    pub program: String,

    /// Arguments placed before the paths and options.
    pub args: Vec<String>,

    /// Working directory, relative to the config file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            program: "node".to_string(),
            args: Vec::new(),
            cwd: None,
        }
    }
}

/// Configuration for a bridge run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LintbridgeConfig {
    /// Engine to run.
    #[serde(default)]
    pub engine: EngineKind,

    /// Output framing. `None` picks the engine default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framing: Option<Framing>,

    /// Emission order for per-file outcomes.
    #[serde(default)]
    pub ordering: Ordering,

    /// Whether autofixed source is written back.
    #[serde(default = "default_fix")]
    pub fix: bool,

    /// Engine process.
    #[serde(default)]
    pub command: CommandConfig,

    /// Engine options, forwarded verbatim.
    #[serde(default = "default_options")]
    pub options: Value,

    /// Directory containing the configuration file.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

fn default_fix() -> bool {
    true
}

fn default_options() -> Value {
    Value::Object(serde_json::Map::new())
}

impl LintbridgeConfig {
    /// Config file names looked up during discovery, in priority order.
    pub const CONFIG_FILES: [&'static str; 2] = [".lintbridge.jsonc", ".lintbridge.json"];

    /// Creates a configuration with every default.
    pub fn new() -> Self {
        Self {
            engine: EngineKind::default(),
            framing: None,
            ordering: Ordering::default(),
            fix: default_fix(),
            command: CommandConfig::default(),
            options: default_options(),
            base_dir: None,
        }
    }

    /// Finds the first config file present in `dir`.
    pub fn discover(dir: impl AsRef<Path>) -> Option<PathBuf> {
        let dir = dir.as_ref();
        Self::CONFIG_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    /// Loads configuration from a file.
    ///
    /// Comments and trailing commas are accepted.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, BridgeError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            BridgeError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let mut config = Self::from_jsonc(&content)?;

        if let Some(parent) = path.parent() {
            config.base_dir = Some(parent.to_path_buf());
        }

        Ok(config)
    }

    /// Parses configuration from a JSONC string with schema validation.
    pub fn from_jsonc(content: &str) -> Result<Self, BridgeError> {
        let value = jsonc_parser::parse_to_serde_value(content, &ParseOptions::default())
            .map_err(|e| BridgeError::config(format!("Invalid JSON: {}", e)))?
            .unwrap_or_else(default_options);

        // Initialize and check schema
        let schema = CONFIG_SCHEMA.get_or_init(|| {
            let schema_json: Value =
                serde_json::from_str(SCHEMA_JSON).expect("Invalid embedded config schema");
            Validator::new(&schema_json).expect("Invalid config schema compilation")
        });

        if let Err(e) = schema.validate(&value) {
            return Err(BridgeError::config(format!(
                "Config validation failed: {} at {}",
                e,
                e.instance_path()
            )));
        }

        serde_json::from_value(value)
            .map_err(|e| BridgeError::config(format!("Invalid config: {}", e)))
    }

    /// The framing in effect, falling back to the engine default.
    pub fn framing(&self) -> Framing {
        self.framing
            .unwrap_or_else(|| Framing::default_for(self.engine))
    }

    /// Builds the process backend described by `command`.
    pub fn backend(&self) -> CommandBackend {
        let mut backend =
            CommandBackend::new(&self.command.program).args(self.command.args.iter().cloned());

        if let Some(cwd) = &self.command.cwd {
            let cwd = match &self.base_dir {
                Some(base) if cwd.is_relative() => base.join(cwd),
                _ => cwd.clone(),
            };
            backend = backend.current_dir(cwd);
        }

        backend
    }
}

impl Default for LintbridgeConfig {
    fn default() -> Self {
        Self::new()
    }
}
