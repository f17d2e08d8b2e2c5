use std::process::{Command, ExitStatus};

use crate::compiler::{OperatingSystem, SynthesizedCommand};
use crate::Error;

/// What came back from executing a synthesized command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskOutcome {
    pub success: bool,
    /// `None` when the process was terminated by a signal, or never spawned.
    pub exit_code: Option<i32>,
}

impl TaskOutcome {
    pub fn succeeded() -> Self {
        TaskOutcome { success: true, exit_code: Some(0) }
    }

    fn from_status(status: ExitStatus) -> Self {
        TaskOutcome { success: status.success(), exit_code: status.code() }
    }
}

/// The seam between synthesis and whatever actually runs the command line.
pub trait TaskExecutor {
    fn execute(&self, command: &SynthesizedCommand) -> Result<TaskOutcome, Error>;
}

/// Runs command lines through the host shell, stdio inherited.
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    operating_system: OperatingSystem,
}

impl ShellExecutor {
    pub fn new(operating_system: OperatingSystem) -> Self {
        ShellExecutor { operating_system }
    }

    /// `$SHELL -c` on Unix hosts (falls back to `/bin/bash`), `cmd.exe /d /c` on Windows.
    pub fn shell(&self) -> (String, &'static str) {
        if self.operating_system.is_windows() {
            ("cmd.exe".to_string(), "/d /c")
        } else {
            let shell = std::env::var("SHELL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "/bin/bash".to_string());
            (shell, "-c")
        }
    }

    fn build_process(&self, command: &SynthesizedCommand) -> Command {
        let (shell, switch) = self.shell();
        let mut cmd = Command::new(&shell);

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            // cmd.exe does its own quote parsing; hand it the line untouched.
            cmd.raw_arg(switch).raw_arg(&command.command_line);
        }
        #[cfg(not(windows))]
        {
            cmd.args(switch.split_whitespace()).arg(&command.command_line);
        }

        cmd.current_dir(&command.cwd);
        cmd
    }
}

impl TaskExecutor for ShellExecutor {
    fn execute(&self, command: &SynthesizedCommand) -> Result<TaskOutcome, Error> {
        let (shell, _) = self.shell();
        log::debug!(
            "Running task '{}' with {}: {} (in {:?})",
            command.name,
            shell,
            command.command_line,
            command.cwd
        );

        let status = self.build_process(command).status().map_err(|e| {
            Error::Execution(format!(
                "Failed to start '{}' for task '{}': {}. Is it installed and in your PATH?",
                shell, command.name, e
            ))
        })?;

        let outcome = TaskOutcome::from_status(status);
        if outcome.success {
            log::info!("Task '{}' finished successfully.", command.name);
        } else {
            let matcher = command.problem_matcher.map(|m| m.as_str()).unwrap_or("none");
            log::error!(
                "Task '{}' failed with status: {} (problem matcher: {})",
                command.name,
                status,
                matcher
            );
        }
        Ok(outcome)
    }
}

/// Prints command lines to stdout instead of running them.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunExecutor;

impl TaskExecutor for DryRunExecutor {
    fn execute(&self, command: &SynthesizedCommand) -> Result<TaskOutcome, Error> {
        log::info!("Dry run of task '{}' in {:?}", command.name, command.cwd);
        println!("{}", command.command_line);
        Ok(TaskOutcome::succeeded())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn command(line: &str, cwd: &std::path::Path) -> SynthesizedCommand {
        SynthesizedCommand {
            name: "Test".to_string(),
            command_line: line.to_string(),
            cwd: cwd.to_path_buf(),
            problem_matcher: None,
        }
    }

    #[test]
    fn test_windows_shell() {
        let (shell, switch) = ShellExecutor::new(OperatingSystem::Windows).shell();
        assert_eq!(shell, "cmd.exe");
        assert_eq!(switch, "/d /c");
    }

    #[test]
    fn test_unix_shell_is_never_empty() {
        let (shell, switch) = ShellExecutor::new(OperatingSystem::Linux).shell();
        assert!(!shell.is_empty());
        assert_eq!(switch, "-c");
    }

    #[cfg(unix)]
    #[test]
    fn test_execute_runs_in_cwd() {
        let dir = TempDir::new().unwrap();
        let executor = ShellExecutor::new(OperatingSystem::Linux);

        let outcome = executor.execute(&command("echo hi > marker.txt", dir.path())).unwrap();
        assert!(outcome.success);
        assert!(dir.path().join("marker.txt").is_file());

        let outcome = executor.execute(&command("exit 3", dir.path())).unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.exit_code, Some(3));
    }

    #[test]
    fn test_dry_run_reports_success() {
        let dir = TempDir::new().unwrap();
        let outcome = DryRunExecutor.execute(&command("gcc main.c", dir.path())).unwrap();
        assert_eq!(outcome, TaskOutcome::succeeded());
    }
}
