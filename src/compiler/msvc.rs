//! MSVC toolchain. Every command is prefixed with the environment batch script.

use super::flags::{self, apply_contributions, FlagContribution, FlagInputs, FlagSet};
use super::plan::{join_fragments, needs_quotes, quote_if_needed, CompilePlan, CompileStrategy};
use super::{BuildMode, Language, ProblemMatcher, Toolchain, APPEND_SYMBOL};
use crate::settings::CompilerSettings;

pub const MSVC_COMPILER_NAME: &str = "cl.exe";

/// C standards MSVC has no `/std:` switch for.
const OLD_C_STANDARDS: &[&str] = &["c89", "c99", "gnu89", "gnu99"];

pub const MSVC_FLAGS: &[FlagContribution] = &[
    FlagContribution { name: "warnings", contribute: warnings },
    FlagContribution { name: "sanitizers", contribute: sanitizers },
    FlagContribution { name: "compilation-time", contribute: compilation_time },
    FlagContribution { name: "standard", contribute: standard },
    FlagContribution { name: "secure-crt", contribute: secure_crt },
    FlagContribution { name: "optimization", contribute: optimization },
    FlagContribution { name: "exception-handling", contribute: exception_handling },
    FlagContribution { name: "include-paths", contribute: include_paths },
    FlagContribution { name: "compiler-args", contribute: flags::extra_compiler_args },
];

pub fn is_old_c_standard(standard: &str) -> bool {
    OLD_C_STANDARDS.contains(&standard.trim())
}

fn warnings(inputs: &FlagInputs) -> Vec<String> {
    let mut args = Vec::new();
    if inputs.settings.enable_warnings {
        args.extend(flags::verbatim(&inputs.settings.msvc_warnings));
    }
    if inputs.settings.warnings_as_error {
        args.push("/WX".to_string());
    }
    args
}

// MSVC only implements the address sanitizer.
fn sanitizers(inputs: &FlagInputs) -> Vec<String> {
    if inputs.mode == BuildMode::Debug && inputs.settings.use_address_sanitizer {
        flags::strings(&["/fsanitize=address"])
    } else {
        Vec::new()
    }
}

fn compilation_time(inputs: &FlagInputs) -> Vec<String> {
    if inputs.settings.show_compilation_time {
        flags::strings(&["/Bt", "/d2cgsummary"])
    } else {
        Vec::new()
    }
}

fn standard(inputs: &FlagInputs) -> Vec<String> {
    let standard = inputs.standard();
    if standard.is_empty() {
        return Vec::new();
    }
    if inputs.language == Language::C && is_old_c_standard(standard) {
        return Vec::new();
    }
    vec![format!("/std:{}", standard)]
}

/// Old C standards get the secure-CRT define in place of `/std:`; the setting forces it
/// for any language.
fn secure_crt(inputs: &FlagInputs) -> Vec<String> {
    let old_c = inputs.language == Language::C && is_old_c_standard(inputs.standard());
    if old_c || inputs.settings.msvc_secure_no_warnings {
        flags::strings(&["/D_CRT_SECURE_NO_WARNINGS"])
    } else {
        Vec::new()
    }
}

fn optimization(inputs: &FlagInputs) -> Vec<String> {
    match inputs.mode {
        BuildMode::Debug => flags::strings(&["/Od", "/Zi"]),
        BuildMode::Release => flags::strings(&["/Ox", "/GL", "/DNDEBUG"]),
    }
}

fn exception_handling(_inputs: &FlagInputs) -> Vec<String> {
    flags::strings(&["/EHsc"])
}

fn include_paths(inputs: &FlagInputs) -> Vec<String> {
    flags::include_paths("/I", &inputs.settings.include_paths)
}

/// `/link <user args> [/LTCG]`, or nothing at all.
fn linker_args(inputs: &FlagInputs) -> Vec<String> {
    let mut args = flags::verbatim(&inputs.settings.linker_args);
    if inputs.link_time_optimization {
        args.push("/LTCG".to_string());
    }
    if !args.is_empty() {
        args.insert(0, "/link".to_string());
    }
    args
}

pub struct MsvcToolchain {
    batch_path: String,
}

impl MsvcToolchain {
    pub fn new(settings: &CompilerSettings) -> Self {
        MsvcToolchain { batch_path: settings.msvc_batch_path.trim().to_string() }
    }

    /// `"<vcvarsall.bat>" <arch> && cd <folder> && `
    fn environment_prefix(&self, plan: &CompilePlan) -> String {
        let folder = plan.folder.to_string_lossy();
        format!(
            "\"{}\" {} {} cd {} {} ",
            self.batch_path,
            plan.architecture.as_str(),
            APPEND_SYMBOL,
            quote_if_needed(&folder),
            APPEND_SYMBOL
        )
    }

    /// The batch script invocation already carries one quote pair; any further quoting
    /// needs an outer pair so `cmd /c` keeps the inner ones.
    fn finish(&self, plan: &CompilePlan, flags: &FlagSet, command_line: String) -> String {
        let had_spaces = needs_quotes(&plan.folder.to_string_lossy())
            || plan.sources.iter().chain(&plan.cuda_sources).any(|source| needs_quotes(&source.file))
            || flags.compiler_args.iter().any(|arg| arg.contains('"'));
        if had_spaces {
            format!("\"{}\"", command_line)
        } else {
            command_line
        }
    }

    fn quoted_sources(plan: &CompilePlan) -> String {
        plan.sources
            .iter()
            .map(|source| quote_if_needed(&source.file))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Toolchain for MsvcToolchain {
    fn name(&self) -> &'static str {
        "msvc"
    }

    fn problem_matcher(&self) -> ProblemMatcher {
        ProblemMatcher::MsCompile
    }

    fn object_extension(&self) -> &'static str {
        "obj"
    }

    fn assemble_flags(&self, inputs: &FlagInputs) -> FlagSet {
        FlagSet {
            compiler_args: apply_contributions(MSVC_FLAGS, inputs),
            linker_args: linker_args(inputs),
        }
    }

    fn build_command(&self, plan: &CompilePlan, flags: &FlagSet) -> Option<String> {
        if plan.is_empty() {
            return None;
        }

        let mode_dir = plan.mode_dir_windows();
        let path_args = format!(
            "/Fd{} /Fo{} /Fe{}",
            mode_dir,
            mode_dir,
            quote_if_needed(&plan.executable_windows())
        );
        let inputs = match plan.strategy() {
            CompileStrategy::Wildcard => plan.wildcard_patterns().join(" "),
            CompileStrategy::PerFile => Self::quoted_sources(plan),
        };

        let compile = join_fragments([
            MSVC_COMPILER_NAME,
            flags.compiler_line().as_str(),
            path_args.as_str(),
            inputs.as_str(),
            plan.companions.object_line().as_str(),
            flags.linker_line().as_str(),
        ]);
        let mut clauses = plan.companions.clauses.clone();
        clauses.push(compile);
        let command_line = format!(
            "{}{}",
            self.environment_prefix(plan),
            clauses.join(&format!(" {} ", APPEND_SYMBOL))
        );
        Some(self.finish(plan, flags, command_line))
    }

    fn assembly_command(&self, plan: &CompilePlan, flags: &FlagSet) -> Option<String> {
        if plan.is_empty() {
            return None;
        }

        let mode_dir = plan.mode_dir_windows();
        let path_args = format!("/c /Fa{} /Fd{} /Fo{}", mode_dir, mode_dir, mode_dir);
        let compile = join_fragments([
            MSVC_COMPILER_NAME,
            flags.compiler_line().as_str(),
            path_args.as_str(),
            Self::quoted_sources(plan).as_str(),
        ]);
        let command_line = format!("{}{}", self.environment_prefix(plan), compile);
        Some(self.finish(plan, flags, command_line))
    }
}
