//! Entry points of the synthesis engine.
//!
//! Every function here reads one settings snapshot and one [`WorkspaceContext`] and either
//! returns a complete [`SynthesizedCommand`] or `None` when there is nothing to do. No
//! condition in here is an error for the caller: a missing source folder, a toolchain with
//! nothing to compile, or an absent build directory are all silent no-ops, logged only.

use std::path::PathBuf;

use super::cuda::attach_companions;
use super::discovery::discover;
use super::flags::FlagInputs;
use super::plan::{join_fragments, quote_if_needed, CompilePlan};
use super::{select_toolchain, SynthesizedCommand};
use crate::settings::CompilerSettings;
use crate::utils::file_system;
use crate::workspace::WorkspaceContext;

pub const BUILD_TASK_NAME: &str = "Build";
pub const ASSEMBLE_TASK_NAME: &str = "Assemble";
pub const CLEAN_TASK_NAME: &str = "Clean";
pub const RUN_TASK_NAME: &str = "Run";

/// Placeholders understood in externally provided run task templates.
pub const PROJECT_FOLDER_TOKEN: &str = "${projectFolder}";
pub const ARGS_TOKEN: &str = "${args}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Build,
    Assemble,
}

/// Compile and link the active folder (or the active file in single-file mode).
///
/// Creates `build/<Mode>` under the active folder as a side effect before returning.
pub fn synthesize_build(
    settings: &CompilerSettings,
    context: &WorkspaceContext,
    single_file: bool,
) -> Option<SynthesizedCommand> {
    synthesize(Operation::Build, settings, context, single_file)
}

/// Emit one assembly listing per source file into `build/<Mode>`, without linking.
pub fn synthesize_assemble(
    settings: &CompilerSettings,
    context: &WorkspaceContext,
    single_file: bool,
) -> Option<SynthesizedCommand> {
    synthesize(Operation::Assemble, settings, context, single_file)
}

fn synthesize(
    operation: Operation,
    settings: &CompilerSettings,
    context: &WorkspaceContext,
    single_file: bool,
) -> Option<SynthesizedCommand> {
    let folder = context.active_folder();
    let discovery = discover(folder, single_file, context.active_file());
    if discovery.is_empty() {
        log::warn!("No source files found in {:?}, nothing to do.", folder);
        return None;
    }

    if let Err(e) = file_system::ensure_dir_exists(&context.mode_dir()) {
        log::error!("{}", e);
        return None;
    }

    let toolchain = select_toolchain(context.operating_system(), settings, discovery.language);
    let mut plan = CompilePlan::new(context, &discovery, single_file);
    let inputs = FlagInputs::new(settings, context.build_mode(), discovery.language, single_file);
    log::info!(
        "Synthesizing {:?} for {} {} file(s) in {:?} with the {} toolchain",
        operation,
        plan.sources.len(),
        discovery.language,
        folder,
        toolchain.name()
    );

    let (name, command_line) = match operation {
        Operation::Build => {
            attach_companions(&mut plan, settings);
            let flags = toolchain.assemble_flags(&inputs);
            (BUILD_TASK_NAME, toolchain.build_command(&plan, &flags))
        }
        Operation::Assemble => {
            if !plan.cuda_sources.is_empty() {
                log::info!("Skipping {} CUDA file(s), no assembly listings for CUDA.", plan.cuda_sources.len());
            }
            let flags = toolchain.assemble_flags(&inputs.without_lto());
            (ASSEMBLE_TASK_NAME, toolchain.assembly_command(&plan, &flags))
        }
    };

    let Some(command_line) = command_line else {
        log::warn!("No {} sources left for the {} toolchain, nothing to do.", discovery.language, toolchain.name());
        return None;
    };
    log::debug!("{} command: {}", name, command_line);

    Some(SynthesizedCommand {
        name: name.to_string(),
        command_line,
        cwd: folder.to_path_buf(),
        problem_matcher: Some(toolchain.problem_matcher()),
    })
}

/// Removes `build/<Mode>` and returns a cosmetic echo for the executor, if there was
/// anything to remove.
pub fn synthesize_clean(context: &WorkspaceContext) -> Option<SynthesizedCommand> {
    let mode_dir = context.mode_dir();
    match file_system::remove_dir_if_exists(&mode_dir) {
        Ok(true) => {}
        Ok(false) => {
            log::info!("Nothing to clean, {:?} does not exist.", mode_dir);
            return None;
        }
        Err(e) => {
            log::error!("{}", e);
            return None;
        }
    }

    let shown = file_system::relative_display(&mode_dir, context.workspace_folder());
    Some(SynthesizedCommand {
        name: CLEAN_TASK_NAME.to_string(),
        command_line: format!("echo Cleaning {} ...", shown),
        cwd: context.active_folder().to_path_buf(),
        problem_matcher: None,
    })
}

/// `build/<Mode>/out<Mode>[.exe]` under the active folder, if it has been built.
pub fn resolve_executable_path(context: &WorkspaceContext) -> Option<PathBuf> {
    let executable = context.mode_dir().join(context.executable_name());
    if executable.is_file() {
        Some(executable)
    } else {
        log::warn!("Executable {:?} not found, build the project first.", executable);
        None
    }
}

/// Runs the built executable with optional program arguments.
///
/// With a `template`, `${projectFolder}` and `${args}` are substituted into it instead of
/// the default `./build/<Mode>/out<Mode> <args>` command line.
pub fn synthesize_run(
    context: &WorkspaceContext,
    args: Option<&str>,
    template: Option<&str>,
) -> Option<SynthesizedCommand> {
    resolve_executable_path(context)?;

    let args = args.map(|a| a.replace('"', "")).unwrap_or_default();
    let args = args.trim();

    let command_line = match template {
        Some(template) => {
            let folder = quote_if_needed(&context.active_folder().to_string_lossy());
            template
                .replace(PROJECT_FOLDER_TOKEN, &folder)
                .replace(ARGS_TOKEN, args)
                .trim()
                .to_string()
        }
        None => {
            let relative = format!("build/{}/{}", context.build_mode(), context.executable_name());
            let executable = if context.operating_system().is_windows() {
                format!(".\\{}", relative.replace('/', "\\"))
            } else {
                format!("./{}", relative)
            };
            join_fragments([quote_if_needed(&executable).as_str(), args])
        }
    };
    log::debug!("Run command: {}", command_line);

    Some(SynthesizedCommand {
        name: RUN_TASK_NAME.to_string(),
        command_line,
        cwd: context.active_folder().to_path_buf(),
        problem_matcher: None,
    })
}
