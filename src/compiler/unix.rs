//! gcc/clang style toolchain.

use super::flags::{self, apply_contributions, FlagContribution, FlagInputs, FlagSet};
use super::plan::{join_fragments, quote_if_needed, CompilePlan, CompileStrategy};
use super::{BuildMode, Language, ProblemMatcher, Toolchain, APPEND_SYMBOL};
use crate::settings::CompilerSettings;

/// Compiler argument order for gcc/clang. LTO sits right before the optimization level so
/// that it reaches every compile, wildcard and link invocation alike.
pub const UNIX_FLAGS: &[FlagContribution] = &[
    FlagContribution { name: "warnings", contribute: warnings },
    FlagContribution { name: "sanitizers", contribute: sanitizers },
    FlagContribution { name: "compilation-time", contribute: compilation_time },
    FlagContribution { name: "standard", contribute: standard },
    FlagContribution { name: "link-time-optimization", contribute: link_time_optimization },
    FlagContribution { name: "optimization", contribute: optimization },
    FlagContribution { name: "compiler-args", contribute: flags::extra_compiler_args },
    FlagContribution { name: "include-paths", contribute: include_paths },
];

fn warnings(inputs: &FlagInputs) -> Vec<String> {
    let mut args = Vec::new();
    if inputs.settings.enable_warnings {
        args.extend(flags::verbatim(&inputs.settings.warnings));
    }
    if inputs.settings.warnings_as_error {
        args.push("-Werror".to_string());
    }
    args
}

fn sanitizers(inputs: &FlagInputs) -> Vec<String> {
    if inputs.mode != BuildMode::Debug {
        return Vec::new();
    }
    let settings = inputs.settings;
    [
        (settings.use_address_sanitizer, "-fsanitize=address"),
        (settings.use_undefined_sanitizer, "-fsanitize=undefined"),
        (settings.use_leak_sanitizer, "-fsanitize=leak"),
    ]
    .iter()
    .filter(|(enabled, _)| *enabled)
    .map(|(_, flag)| flag.to_string())
    .collect()
}

fn compilation_time(inputs: &FlagInputs) -> Vec<String> {
    if inputs.settings.show_compilation_time {
        flags::strings(&["-ftime-report"])
    } else {
        Vec::new()
    }
}

fn standard(inputs: &FlagInputs) -> Vec<String> {
    match inputs.standard() {
        "" => Vec::new(),
        standard => vec![format!("--std={}", standard)],
    }
}

fn link_time_optimization(inputs: &FlagInputs) -> Vec<String> {
    if inputs.link_time_optimization {
        flags::strings(&["-flto"])
    } else {
        Vec::new()
    }
}

fn optimization(inputs: &FlagInputs) -> Vec<String> {
    match inputs.mode {
        BuildMode::Debug => flags::strings(&["-g3", "-O0"]),
        BuildMode::Release => flags::strings(&["-O3", "-DNDEBUG"]),
    }
}

fn include_paths(inputs: &FlagInputs) -> Vec<String> {
    flags::include_paths("-I", &inputs.settings.include_paths)
}

/// Strips a trailing `.exe` (MinGW installs) and quotes paths with spaces.
pub fn normalize_compiler_path(path: &str) -> String {
    let path = path.trim().trim_matches('"');
    let path = path.strip_suffix(".exe").unwrap_or(path);
    quote_if_needed(path)
}

/// Renders gcc/clang style command lines: `-c`/`-S` per file, `-o` outputs, `&&` chaining.
pub fn render_build(compiler: &str, object_extension: &str, plan: &CompilePlan, flags: &FlagSet) -> Option<String> {
    if plan.is_empty() {
        return None;
    }

    let compiler_args: &str = &flags.compiler_line();
    let linker_args: &str = &flags.linker_line();
    let executable: &str = &quote_if_needed(&plan.executable);

    let companion_objects: &str = &plan.companions.object_line();
    let mut clauses = plan.companions.clauses.clone();

    match plan.strategy() {
        CompileStrategy::Wildcard => {
            let patterns: &str = &plan.wildcard_patterns().join(" ");
            clauses.push(join_fragments([
                compiler,
                compiler_args,
                patterns,
                companion_objects,
                "-o",
                executable,
                linker_args,
            ]));
        }
        CompileStrategy::PerFile => {
            let mut objects = Vec::with_capacity(plan.sources.len());
            for source in &plan.sources {
                let object = quote_if_needed(&source.output_path(&plan.mode_dir, object_extension));
                let file = quote_if_needed(&source.file);
                clauses.push(join_fragments([compiler, compiler_args, "-c", file.as_str(), "-o", object.as_str()]));
                objects.push(object);
            }
            let objects: &str = &objects.join(" ");
            clauses.push(join_fragments([
                compiler,
                compiler_args,
                objects,
                companion_objects,
                "-o",
                executable,
                linker_args,
            ]));
        }
    }

    Some(clauses.join(&format!(" {} ", APPEND_SYMBOL)))
}

pub fn render_assembly(compiler: &str, plan: &CompilePlan, flags: &FlagSet) -> Option<String> {
    if plan.is_empty() {
        return None;
    }

    let compiler_args: &str = &flags.compiler_line();
    let clauses: Vec<String> = plan
        .sources
        .iter()
        .map(|source| {
            let listing = quote_if_needed(&source.output_path(&plan.mode_dir, "s"));
            let file = quote_if_needed(&source.file);
            join_fragments([compiler, compiler_args, "-S", file.as_str(), "-o", listing.as_str()])
        })
        .collect();

    Some(clauses.join(&format!(" {} ", APPEND_SYMBOL)))
}

/// gcc or clang, picked from the settings by language.
pub struct UnixToolchain {
    compiler: String,
}

impl UnixToolchain {
    pub fn new(settings: &CompilerSettings, language: Language) -> Self {
        let path = match language {
            Language::Cpp => &settings.cpp_compiler_path,
            Language::C | Language::Cuda => &settings.c_compiler_path,
        };
        UnixToolchain { compiler: normalize_compiler_path(path) }
    }

    pub fn compiler(&self) -> &str {
        &self.compiler
    }
}

impl Toolchain for UnixToolchain {
    fn name(&self) -> &'static str {
        "unix"
    }

    fn problem_matcher(&self) -> ProblemMatcher {
        ProblemMatcher::Gcc
    }

    fn assemble_flags(&self, inputs: &FlagInputs) -> FlagSet {
        FlagSet {
            compiler_args: apply_contributions(UNIX_FLAGS, inputs),
            linker_args: flags::verbatim(&inputs.settings.linker_args),
        }
    }

    fn build_command(&self, plan: &CompilePlan, flags: &FlagSet) -> Option<String> {
        render_build(&self.compiler, self.object_extension(), plan, flags)
    }

    fn assembly_command(&self, plan: &CompilePlan, flags: &FlagSet) -> Option<String> {
        render_assembly(&self.compiler, plan, flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags_for(settings: &CompilerSettings, mode: BuildMode, single_file: bool) -> FlagSet {
        let toolchain = UnixToolchain::new(settings, Language::Cpp);
        toolchain.assemble_flags(&FlagInputs::new(settings, mode, Language::Cpp, single_file))
    }

    #[test]
    fn test_flag_order() {
        let settings = CompilerSettings {
            warnings_as_error: true,
            use_address_sanitizer: true,
            use_undefined_sanitizer: true,
            use_leak_sanitizer: true,
            show_compilation_time: true,
            cpp_standard: "c++17".to_string(),
            compiler_args: vec!["-pthread".to_string()],
            include_paths: vec!["inc".to_string(), "my inc".to_string()],
            linker_args: vec!["-lm".to_string(), "".to_string()],
            ..CompilerSettings::default()
        };
        let flags = flags_for(&settings, BuildMode::Debug, false);
        assert_eq!(
            flags.compiler_line(),
            "-Wall -Wextra -Wpedantic -Werror -fsanitize=address -fsanitize=undefined -fsanitize=leak \
             -ftime-report --std=c++17 -g3 -O0 -pthread -Iinc -I\"my inc\""
        );
        assert_eq!(flags.linker_line(), "-lm");
    }

    #[test]
    fn test_release_drops_sanitizers_and_debug_symbols() {
        let settings = CompilerSettings {
            use_address_sanitizer: true,
            enable_warnings: false,
            ..CompilerSettings::default()
        };
        let flags = flags_for(&settings, BuildMode::Release, false);
        assert_eq!(flags.compiler_line(), "-O3 -DNDEBUG");
    }

    #[test]
    fn test_lto_precedes_optimization() {
        let settings = CompilerSettings {
            use_link_time_optimization: true,
            ..CompilerSettings::default()
        };
        assert!(flags_for(&settings, BuildMode::Release, false).compiler_line().contains("-flto -O3 -DNDEBUG"));
        assert!(!flags_for(&settings, BuildMode::Release, true).compiler_line().contains("-flto"));
        assert!(!flags_for(&settings, BuildMode::Debug, false).compiler_line().contains("-flto"));
    }

    #[test]
    fn test_compiler_path_normalization() {
        assert_eq!(normalize_compiler_path("gcc"), "gcc");
        assert_eq!(normalize_compiler_path("C:/mingw/bin/g++.exe"), "C:/mingw/bin/g++");
        assert_eq!(normalize_compiler_path("/opt/my tools/clang"), "\"/opt/my tools/clang\"");
        assert_eq!(normalize_compiler_path("\"C:/x y/g++.exe\""), "\"C:/x y/g++\"");
        assert_eq!(normalize_compiler_path(" \"clang\" "), "clang");
    }

    #[test]
    fn test_compiler_by_language() {
        let settings = CompilerSettings::default();
        assert_eq!(UnixToolchain::new(&settings, Language::Cpp).compiler(), "g++");
        assert_eq!(UnixToolchain::new(&settings, Language::C).compiler(), "gcc");
    }
}
