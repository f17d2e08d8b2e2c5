//! Compiler settings snapshot and the suppliers that produce it.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::Error;

/// Prefix the editor puts in front of every key in `settings.json`.
pub const SETTINGS_KEY_PREFIX: &str = "C_Cpp_Runner.";

/// Include path entries containing this marker are placeholders and are skipped.
pub const DEFAULT_INCLUDE_MARKER: &str = "$(default)";

pub const DEFAULT_MSVC_BATCH_PATH: &str =
    "C:/Program Files/Microsoft Visual Studio/2022/Community/VC/Auxiliary/Build/vcvarsall.bat";

/// Everything the flag assemblers read, captured once per synthesis call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompilerSettings {
    pub c_compiler_path: String,
    pub cpp_compiler_path: String,
    pub c_standard: String,
    pub cpp_standard: String,
    pub enable_warnings: bool,
    pub warnings: Vec<String>,
    pub msvc_warnings: Vec<String>,
    pub warnings_as_error: bool,
    pub include_paths: Vec<String>,
    pub compiler_args: Vec<String>,
    pub linker_args: Vec<String>,
    pub use_address_sanitizer: bool,
    pub use_undefined_sanitizer: bool,
    pub use_leak_sanitizer: bool,
    pub use_link_time_optimization: bool,
    pub show_compilation_time: bool,
    pub use_msvc: bool,
    pub msvc_batch_path: String,
    pub msvc_secure_no_warnings: bool,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        CompilerSettings {
            c_compiler_path: "gcc".to_string(),
            cpp_compiler_path: "g++".to_string(),
            c_standard: String::new(),
            cpp_standard: String::new(),
            enable_warnings: true,
            warnings: vec!["-Wall".to_string(), "-Wextra".to_string(), "-Wpedantic".to_string()],
            msvc_warnings: vec!["/W4".to_string(), "/permissive-".to_string()],
            warnings_as_error: false,
            include_paths: Vec::new(),
            compiler_args: Vec::new(),
            linker_args: Vec::new(),
            use_address_sanitizer: false,
            use_undefined_sanitizer: false,
            use_leak_sanitizer: false,
            use_link_time_optimization: false,
            show_compilation_time: false,
            use_msvc: false,
            msvc_batch_path: DEFAULT_MSVC_BATCH_PATH.to_string(),
            msvc_secure_no_warnings: false,
        }
    }
}

impl CompilerSettings {
    /// Parses a JSON settings document. Keys may carry the editor prefix.
    pub fn from_json_str(content: &str) -> Result<Self, Error> {
        let value: serde_json::Value =
            serde_json::from_str(content).map_err(|e| Error::Settings(format!("Invalid JSON settings: {}", e)))?;
        let object = value
            .as_object()
            .ok_or_else(|| Error::Settings("Settings JSON must be an object".to_string()))?;

        let mut stripped = serde_json::Map::new();
        for (key, value) in object {
            let key = key.strip_prefix(SETTINGS_KEY_PREFIX).unwrap_or(key);
            stripped.insert(key.to_string(), value.clone());
        }

        serde_json::from_value(serde_json::Value::Object(stripped))
            .map_err(|e| Error::Settings(format!("Invalid settings value: {}", e)))
    }

    pub fn from_toml_str(content: &str) -> Result<Self, Error> {
        toml::from_str(content).map_err(|e| Error::Settings(format!("Invalid TOML settings: {}", e)))
    }
}

/// Source of settings snapshots. Each call returns one consistent snapshot.
pub trait ConfigurationSupplier {
    fn snapshot(&self) -> Result<CompilerSettings, Error>;
}

impl ConfigurationSupplier for CompilerSettings {
    fn snapshot(&self) -> Result<CompilerSettings, Error> {
        Ok(self.clone())
    }
}

/// Reads a settings file from disk on every snapshot, so edits are picked up between calls.
#[derive(Debug, Clone)]
pub struct SettingsFile {
    path: PathBuf,
}

impl SettingsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SettingsFile { path: path.into() }
    }

    /// The editor's per-workspace settings file.
    pub fn for_workspace(workspace_folder: &Path) -> Self {
        SettingsFile::new(workspace_folder.join(".vscode").join("settings.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigurationSupplier for SettingsFile {
    fn snapshot(&self) -> Result<CompilerSettings, Error> {
        if !self.path.exists() {
            log::debug!("Settings file {:?} not found, using defaults", self.path);
            return Ok(CompilerSettings::default());
        }

        let content = fs::read_to_string(&self.path)?;
        let is_toml = self.path.extension().map_or(false, |ext| ext == "toml");
        let settings = if is_toml {
            CompilerSettings::from_toml_str(&content)?
        } else {
            CompilerSettings::from_json_str(&content)?
        };
        log::debug!("Loaded settings from {:?}: {:?}", self.path, settings);
        Ok(settings)
    }
}
