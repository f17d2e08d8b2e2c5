//! `c_cpp_runner` synthesizes shell command lines that build, assemble, clean, run and
//! debug C, C++ and CUDA projects without a build system. Given a project folder and a
//! settings snapshot it discovers the sources, decides on the dominant language,
//! assembles the flags for the selected toolchain (gcc/clang, MSVC or nvcc) and hands
//! the finished command to a task executor.
//!
//! ## Features
//! - Per-file compilation with a link step, or one wildcard invocation for larger folders.
//! - Debug and release modes, each with its own `build/<Mode>` output directory.
//! - Sanitizers, link-time optimization, warnings and compile-time reports from settings.
//! - MSVC command lines prefixed with the Visual Studio environment script.
//! - Settings read from the editor's `settings.json` or a plain TOML file.
//!
//! ## Usage (CLI)
//! ```bash
//! c_cpp_runner build --folder ./app --mode release
//! c_cpp_runner run --folder ./app --args "input.txt"
//! c_cpp_runner build --folder ./app --os windows --dry-run
//! ```

pub mod app_config;
pub mod compiler;
pub mod runner;
pub mod settings;
pub mod utils;
pub mod workspace;

use std::path::{Path, PathBuf};

use app_config::{AppConfig, Operation};
use compiler::OperatingSystem;
use runner::Runner;
use settings::SettingsFile;
use utils::command_runner::{DryRunExecutor, ShellExecutor, TaskExecutor, TaskOutcome};
use workspace::{ContextUpdate, WorkspaceContext};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Settings error: {0}")]
    Settings(String),
    #[error("Source discovery failed: {0}")]
    Discovery(String),
    #[error("Task execution failed: {0}")]
    Execution(String),
    #[error("File system operation failed: {0}")]
    FileSystem(String),
}

pub fn run() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init().ok();

    let config = AppConfig::new();
    log::debug!("Using configuration: {:?}", config);

    let context = workspace_context(&config)?;
    log::info!(
        "{:?} in {:?} ({} mode, {:?})",
        config.operation,
        context.active_folder(),
        context.build_mode(),
        context.operating_system()
    );

    if config.dry_run {
        execute(&config, &context, Runner::new(DryRunExecutor))
    } else {
        execute(&config, &context, Runner::new(ShellExecutor::new(context.operating_system())))
    }
}

/// Builds the context from the command line through [`ContextUpdate`]s only.
pub fn workspace_context(config: &AppConfig) -> Result<WorkspaceContext, Error> {
    if !config.workspace.is_dir() {
        return Err(Error::Config(format!(
            "Workspace {:?} does not exist or is not a directory.",
            config.workspace
        )));
    }
    let workspace = resolve(&config.workspace)?;
    let mut context = WorkspaceContext::new(&workspace);

    let active_file = match &config.file {
        Some(file) if !file.is_file() => {
            return Err(Error::Discovery(format!("Active file {:?} does not exist.", file)));
        }
        Some(file) => Some(resolve(file)?),
        None => None,
    };

    let folder = match (&config.folder, &active_file) {
        (Some(folder), _) => {
            let folder = absolute(folder, &workspace);
            if folder.is_file() {
                return Err(Error::FileSystem(format!("Active folder {:?} is a file, not a directory.", folder)));
            }
            Some(folder)
        }
        (None, Some(file)) => file.parent().map(Path::to_path_buf),
        (None, None) => None,
    };
    if let Some(folder) = folder {
        context.apply(ContextUpdate::ActiveFolder(folder));
    }

    context.apply(ContextUpdate::ActiveFile(active_file));
    context.apply(ContextUpdate::BuildMode(config.mode));
    context.apply(ContextUpdate::Architecture(config.arch));
    context.apply(ContextUpdate::OperatingSystem(config.os.unwrap_or_else(OperatingSystem::current)));
    Ok(context)
}

fn resolve(path: &Path) -> Result<PathBuf, Error> {
    path.canonicalize()
        .map_err(|e| Error::FileSystem(format!("Could not resolve {:?}: {}", path, e)))
}

fn absolute(path: &Path, base: &Path) -> PathBuf {
    let joined = if path.is_absolute() { path.to_path_buf() } else { base.join(path) };
    joined.canonicalize().unwrap_or(joined)
}

fn execute<E: TaskExecutor>(config: &AppConfig, context: &WorkspaceContext, runner: Runner<E>) -> Result<(), Error> {
    let supplier = match &config.settings {
        Some(path) => SettingsFile::new(path),
        None => SettingsFile::for_workspace(context.workspace_folder()),
    };
    let single_file = config.file.is_some();

    let outcome = match config.operation {
        Operation::Build => runner.build(&supplier, context, single_file)?,
        Operation::Assemble => runner.assemble(&supplier, context, single_file)?,
        Operation::Clean => runner.clean(context)?,
        Operation::Run => runner.run(context, config.args.as_deref(), config.template.as_deref())?,
        Operation::Debug => {
            match runner::debug_configuration(context) {
                Some(launch) => {
                    let pretty = serde_json::to_string_pretty(&launch)
                        .map_err(|e| Error::Config(format!("Could not render launch configuration: {}", e)))?;
                    println!("{}", pretty);
                }
                None => log::info!("No debug session to start."),
            }
            return Ok(());
        }
    };

    match outcome {
        Some(TaskOutcome { success: false, exit_code }) => Err(Error::Execution(match exit_code {
            Some(code) => format!("{:?} exited with code {}", config.operation, code),
            None => format!("{:?} was terminated", config.operation),
        })),
        Some(_) => Ok(()),
        None => {
            log::info!("Nothing to do.");
            Ok(())
        }
    }
}
