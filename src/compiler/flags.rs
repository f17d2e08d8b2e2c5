//! Flag assembly building blocks.
//!
//! Every toolchain describes its compiler arguments as an ordered table of
//! [`FlagContribution`]s. Each contribution is a pure function of the settings snapshot and
//! build mode, and the table order is the order the fragments appear on the command line.

use super::{BuildMode, Language};
use crate::settings::{CompilerSettings, DEFAULT_INCLUDE_MARKER};

/// Inputs shared by all flag contributions of one synthesis call.
#[derive(Debug, Clone, Copy)]
pub struct FlagInputs<'a> {
    pub settings: &'a CompilerSettings,
    pub mode: BuildMode,
    pub language: Language,
    /// Already gated on the setting, the build mode and the build scope.
    pub link_time_optimization: bool,
}

impl<'a> FlagInputs<'a> {
    pub fn new(settings: &'a CompilerSettings, mode: BuildMode, language: Language, single_file: bool) -> Self {
        FlagInputs {
            settings,
            mode,
            language,
            link_time_optimization: lto_enabled(settings, mode, single_file),
        }
    }

    /// Inputs for emitting assembly listings, where LTO bytecode would be useless.
    pub fn without_lto(mut self) -> Self {
        self.link_time_optimization = false;
        self
    }

    /// The configured standard for the language; CUDA follows the C++ standard.
    pub fn standard(&self) -> &'a str {
        match self.language {
            Language::C => self.settings.c_standard.trim(),
            Language::Cpp | Language::Cuda => self.settings.cpp_standard.trim(),
        }
    }
}

/// LTO applies only to multi-file release builds with the setting switched on.
pub fn lto_enabled(settings: &CompilerSettings, mode: BuildMode, single_file: bool) -> bool {
    settings.use_link_time_optimization && mode == BuildMode::Release && !single_file
}

/// One named, independently testable fragment of a compiler command line.
pub struct FlagContribution {
    pub name: &'static str,
    pub contribute: fn(&FlagInputs) -> Vec<String>,
}

pub fn apply_contributions(table: &[FlagContribution], inputs: &FlagInputs) -> Vec<String> {
    table
        .iter()
        .flat_map(|contribution| {
            let fragment = (contribution.contribute)(inputs);
            if !fragment.is_empty() {
                log::trace!("Flag contribution '{}': {:?}", contribution.name, fragment);
            }
            fragment
        })
        .collect()
}

/// Compiler and linker arguments produced by a toolchain's flag table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagSet {
    pub compiler_args: Vec<String>,
    pub linker_args: Vec<String>,
}

impl FlagSet {
    pub fn compiler_line(&self) -> String {
        self.compiler_args.join(" ")
    }

    pub fn linker_line(&self) -> String {
        self.linker_args.join(" ")
    }
}

/// Include directories with the given switch (`-I` or `/I`), quoted when they contain spaces.
pub fn include_paths(switch: &str, paths: &[String]) -> Vec<String> {
    paths
        .iter()
        .map(|path| path.trim())
        .filter(|path| !path.is_empty() && !path.contains(DEFAULT_INCLUDE_MARKER))
        .map(|path| {
            if path.contains(' ') {
                format!("{}\"{}\"", switch, path)
            } else {
                format!("{}{}", switch, path)
            }
        })
        .collect()
}

/// User supplied arguments, passed through verbatim minus empty entries.
pub fn verbatim(args: &[String]) -> Vec<String> {
    args.iter()
        .map(|arg| arg.trim())
        .filter(|arg| !arg.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn extra_compiler_args(inputs: &FlagInputs) -> Vec<String> {
    verbatim(&inputs.settings.compiler_args)
}

pub fn strings(flags: &[&str]) -> Vec<String> {
    flags.iter().map(|flag| flag.to_string()).collect()
}
