//! Hands synthesized commands to a [`TaskExecutor`].
//!
//! Each trigger takes a fresh settings snapshot, synthesizes at most one command and
//! executes it. When synthesis yields nothing, nothing is executed.

use std::fs;
use std::path::PathBuf;

use serde_json::Value;

use crate::compiler::synthesizer;
use crate::compiler::SynthesizedCommand;
use crate::settings::{CompilerSettings, ConfigurationSupplier};
use crate::utils::command_runner::{TaskExecutor, TaskOutcome};
use crate::workspace::WorkspaceContext;
use crate::Error;

/// Name of the launch configuration the debug trigger looks up.
pub const DEBUG_CONFIG_NAME: &str = "C/C++ Runner: Debug Session";

pub struct Runner<E: TaskExecutor> {
    executor: E,
}

impl<E: TaskExecutor> Runner<E> {
    pub fn new(executor: E) -> Self {
        Runner { executor }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn build(
        &self,
        supplier: &dyn ConfigurationSupplier,
        context: &WorkspaceContext,
        single_file: bool,
    ) -> Result<Option<TaskOutcome>, Error> {
        let Some(settings) = snapshot(supplier) else {
            return Ok(None);
        };
        self.dispatch(synthesizer::synthesize_build(&settings, context, single_file))
    }

    pub fn assemble(
        &self,
        supplier: &dyn ConfigurationSupplier,
        context: &WorkspaceContext,
        single_file: bool,
    ) -> Result<Option<TaskOutcome>, Error> {
        let Some(settings) = snapshot(supplier) else {
            return Ok(None);
        };
        self.dispatch(synthesizer::synthesize_assemble(&settings, context, single_file))
    }

    pub fn clean(&self, context: &WorkspaceContext) -> Result<Option<TaskOutcome>, Error> {
        self.dispatch(synthesizer::synthesize_clean(context))
    }

    pub fn run(
        &self,
        context: &WorkspaceContext,
        args: Option<&str>,
        template: Option<&str>,
    ) -> Result<Option<TaskOutcome>, Error> {
        self.dispatch(synthesizer::synthesize_run(context, args, template))
    }

    fn dispatch(&self, command: Option<SynthesizedCommand>) -> Result<Option<TaskOutcome>, Error> {
        match command {
            Some(command) => self.executor.execute(&command).map(Some),
            None => Ok(None),
        }
    }
}

/// A settings failure aborts the operation before anything is synthesized.
fn snapshot(supplier: &dyn ConfigurationSupplier) -> Option<CompilerSettings> {
    match supplier.snapshot() {
        Ok(settings) => {
            log::debug!("Settings snapshot: {:?}", settings);
            Some(settings)
        }
        Err(e) => {
            log::error!("Could not read settings, operation aborted: {}", e);
            None
        }
    }
}

pub fn launch_config_path(context: &WorkspaceContext) -> PathBuf {
    context.workspace_folder().join(".vscode").join("launch.json")
}

/// The debug session configuration from `.vscode/launch.json`, if the project has been
/// built in the current mode and the configuration exists.
pub fn debug_configuration(context: &WorkspaceContext) -> Option<Value> {
    if !context.mode_dir().is_dir() {
        log::warn!("Build directory {:?} not found, build the project first.", context.mode_dir());
        return None;
    }

    let path = launch_config_path(context);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) => {
            log::warn!("Could not read {:?}: {}", path, e);
            return None;
        }
    };
    let launch: Value = match serde_json::from_str(&content) {
        Ok(launch) => launch,
        Err(e) => {
            log::warn!("Malformed launch configuration {:?}: {}", path, e);
            return None;
        }
    };

    let found = launch
        .get("configurations")
        .and_then(Value::as_array)
        .and_then(|configs| {
            configs
                .iter()
                .find(|config| config.get("name").and_then(Value::as_str) == Some(DEBUG_CONFIG_NAME))
        })
        .cloned();
    if found.is_none() {
        log::warn!("No '{}' configuration in {:?}", DEBUG_CONFIG_NAME, path);
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::OperatingSystem;
    use crate::workspace::ContextUpdate;
    use std::cell::RefCell;
    use std::fs::File;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingExecutor {
        executed: RefCell<Vec<SynthesizedCommand>>,
    }

    impl TaskExecutor for RecordingExecutor {
        fn execute(&self, command: &SynthesizedCommand) -> Result<TaskOutcome, Error> {
            self.executed.borrow_mut().push(command.clone());
            Ok(TaskOutcome::succeeded())
        }
    }

    struct BrokenSettings;

    impl ConfigurationSupplier for BrokenSettings {
        fn snapshot(&self) -> Result<CompilerSettings, Error> {
            Err(Error::Settings("unreadable".to_string()))
        }
    }

    fn context(dir: &TempDir) -> WorkspaceContext {
        WorkspaceContext::new(dir.path()).with(ContextUpdate::OperatingSystem(OperatingSystem::Linux))
    }

    #[test]
    fn test_empty_folder_executes_nothing() {
        let dir = TempDir::new().unwrap();
        let runner = Runner::new(RecordingExecutor::default());
        let ctx = context(&dir);

        assert_eq!(runner.build(&CompilerSettings::default(), &ctx, false).unwrap(), None);
        assert_eq!(runner.assemble(&CompilerSettings::default(), &ctx, false).unwrap(), None);
        assert_eq!(runner.clean(&ctx).unwrap(), None);
        assert_eq!(runner.run(&ctx, None, None).unwrap(), None);
        assert!(runner.executor().executed.borrow().is_empty());
    }

    #[test]
    fn test_settings_failure_aborts_build() {
        let dir = TempDir::new().unwrap();
        File::create(dir.path().join("main.c")).unwrap();
        let runner = Runner::new(RecordingExecutor::default());

        assert_eq!(runner.build(&BrokenSettings, &context(&dir), false).unwrap(), None);
        assert!(runner.executor().executed.borrow().is_empty());
    }

    #[test]
    fn test_build_executes_one_command() {
        let dir = TempDir::new().unwrap();
        File::create(dir.path().join("main.cpp")).unwrap();
        let runner = Runner::new(RecordingExecutor::default());

        let outcome = runner.build(&CompilerSettings::default(), &context(&dir), false).unwrap();
        assert_eq!(outcome, Some(TaskOutcome::succeeded()));
        let executed = runner.executor().executed.borrow();
        assert_eq!(executed.len(), 1);
        assert!(executed[0].command_line.starts_with("g++ "));
    }

    #[test]
    fn test_debug_configuration_lookup() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        let vscode = dir.path().join(".vscode");
        fs::create_dir_all(&vscode).unwrap();
        fs::write(
            vscode.join("launch.json"),
            r#"{"version": "0.2.0", "configurations": [
                {"name": "Other", "type": "lldb"},
                {"name": "C/C++ Runner: Debug Session", "type": "cppdbg", "program": "outDebug"}
            ]}"#,
        )
        .unwrap();

        assert!(debug_configuration(&ctx).is_none());

        fs::create_dir_all(ctx.mode_dir()).unwrap();
        let config = debug_configuration(&ctx).unwrap();
        assert_eq!(config["type"], "cppdbg");
    }

    #[test]
    fn test_malformed_launch_json_is_ignored() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        fs::create_dir_all(ctx.mode_dir()).unwrap();
        fs::create_dir_all(dir.path().join(".vscode")).unwrap();
        fs::write(launch_config_path(&ctx), "{ configurations: ").unwrap();
        assert!(debug_configuration(&ctx).is_none());
    }
}
