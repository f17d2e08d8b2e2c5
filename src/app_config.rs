use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::compiler::{Architecture, BuildMode, OperatingSystem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Operation {
    /// Compile and link the active folder
    Build,
    /// Emit assembly listings without linking
    Assemble,
    /// Remove the build directory of the current mode
    Clean,
    /// Run the built executable
    Run,
    /// Print the debug launch configuration
    Debug,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Synthesizes and runs C/C++/CUDA build commands", long_about = None)]
pub struct AppConfig {
    /// What to do
    #[arg(value_enum)]
    pub operation: Operation,

    /// Folder containing the sources to compile (defaults to the workspace)
    #[arg(short, long)]
    pub folder: Option<PathBuf>,

    /// Workspace root, holds `.vscode/settings.json` and `.vscode/launch.json`
    #[arg(short, long, default_value = ".")]
    pub workspace: PathBuf,

    /// Compile only this file (single-file mode)
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Build mode
    #[arg(short, long, value_enum, default_value_t = BuildMode::Debug)]
    pub mode: BuildMode,

    /// Target architecture, used by the MSVC environment script
    #[arg(short, long, value_enum, default_value_t = Architecture::X64)]
    pub arch: Architecture,

    /// Settings file (JSON or TOML); defaults to `<workspace>/.vscode/settings.json`
    #[arg(short, long)]
    pub settings: Option<PathBuf>,

    /// Arguments passed to the program by `run`
    #[arg(long, allow_hyphen_values = true)]
    pub args: Option<String>,

    /// Run command template with `${projectFolder}` and `${args}` placeholders
    #[arg(long)]
    pub template: Option<String>,

    /// Print the synthesized command instead of executing it
    #[arg(long)]
    pub dry_run: bool,

    /// Pretend to run on another host OS
    #[arg(long, value_enum)]
    pub os: Option<OperatingSystem>,
}

impl AppConfig {
    pub fn new() -> Self {
        AppConfig::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::try_parse_from(["c_cpp_runner", "build"]).unwrap();
        assert_eq!(config.operation, Operation::Build);
        assert_eq!(config.mode, BuildMode::Debug);
        assert_eq!(config.arch, Architecture::X64);
        assert_eq!(config.workspace, PathBuf::from("."));
        assert!(config.folder.is_none());
        assert!(!config.dry_run);
    }

    #[test]
    fn test_run_options() {
        let config = AppConfig::try_parse_from([
            "c_cpp_runner",
            "run",
            "--mode",
            "release",
            "--args",
            "-n 3",
            "--os",
            "windows",
        ])
        .unwrap();
        assert_eq!(config.operation, Operation::Run);
        assert_eq!(config.mode, BuildMode::Release);
        assert_eq!(config.args.as_deref(), Some("-n 3"));
        assert_eq!(config.os, Some(OperatingSystem::Windows));
    }

    #[test]
    fn test_unknown_operation_is_rejected() {
        assert!(AppConfig::try_parse_from(["c_cpp_runner", "deploy"]).is_err());
    }
}
