//! The `compiler` module contains the build command synthesis engine: source discovery,
//! the flag assemblers for the supported toolchain families, and the synthesizer that
//! turns a project folder into a shell command line for the task executor.

pub mod cuda;
pub mod discovery;
pub mod flags;
pub mod msvc;
pub mod plan;
pub mod synthesizer;
pub mod unix;

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::settings::CompilerSettings;
use flags::{FlagInputs, FlagSet};
use plan::CompilePlan;

/// Number of eligible source files from which a single wildcard invocation replaces
/// per-file compilation.
pub const WILDCARD_THRESHOLD: usize = 7;

/// Separator used to chain shell commands.
pub const APPEND_SYMBOL: &str = "&&";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    C,
    Cpp,
    Cuda,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::C => write!(f, "C"),
            Language::Cpp => write!(f, "Cpp"),
            Language::Cuda => write!(f, "Cuda"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum BuildMode {
    #[default]
    Debug,
    Release,
}

impl BuildMode {
    /// Name used for the output directory and executable (`build/Debug/outDebug`).
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildMode::Debug => "Debug",
            BuildMode::Release => "Release",
        }
    }

    pub fn is_debug(&self) -> bool {
        *self == BuildMode::Debug
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum Architecture {
    X86,
    #[default]
    X64,
    Arm64,
}

impl Architecture {
    /// Argument understood by the MSVC environment batch script.
    pub fn as_str(&self) -> &'static str {
        match self {
            Architecture::X86 => "x86",
            Architecture::X64 => "x64",
            Architecture::Arm64 => "arm64",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum OperatingSystem {
    Windows,
    Linux,
    MacOs,
}

impl OperatingSystem {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            OperatingSystem::Windows
        } else if cfg!(target_os = "macos") {
            OperatingSystem::MacOs
        } else {
            OperatingSystem::Linux
        }
    }

    pub fn is_windows(&self) -> bool {
        *self == OperatingSystem::Windows
    }

    pub fn executable_suffix(&self) -> &'static str {
        if self.is_windows() {
            ".exe"
        } else {
            ""
        }
    }
}

/// Command-line syntax family. CUDA sources always go through `nvcc` regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolchainFamily {
    Unix,
    Msvc,
}

impl ToolchainFamily {
    pub fn select(operating_system: OperatingSystem, use_msvc: bool) -> Self {
        if operating_system.is_windows() && use_msvc {
            ToolchainFamily::Msvc
        } else {
            ToolchainFamily::Unix
        }
    }
}

/// Tag telling the executor how to parse compiler diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemMatcher {
    Gcc,
    MsCompile,
}

impl ProblemMatcher {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProblemMatcher::Gcc => "$gcc",
            ProblemMatcher::MsCompile => "$msCompile",
        }
    }
}

/// A ready-to-run shell command line handed to the task executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedCommand {
    pub name: String,
    pub command_line: String,
    pub cwd: PathBuf,
    pub problem_matcher: Option<ProblemMatcher>,
}

/// A toolchain variant: its flag table and the way it renders command lines.
///
/// Exactly one implementation is selected per synthesis call (see [`select_toolchain`]).
pub trait Toolchain {
    /// Short name used in log output.
    fn name(&self) -> &'static str;

    fn problem_matcher(&self) -> ProblemMatcher;

    /// Extension of the intermediate object files this toolchain writes.
    fn object_extension(&self) -> &'static str {
        "o"
    }

    /// Produces the compiler and linker argument lists in their fixed order.
    fn assemble_flags(&self, inputs: &FlagInputs) -> FlagSet;

    /// Renders the compile-and-link command. `None` if nothing is left to compile.
    fn build_command(&self, plan: &CompilePlan, flags: &FlagSet) -> Option<String>;

    /// Renders the assembly listing command. `None` if the toolchain has nothing to emit.
    fn assembly_command(&self, plan: &CompilePlan, flags: &FlagSet) -> Option<String>;
}

/// Picks the toolchain variant for one synthesis call.
pub fn select_toolchain(
    operating_system: OperatingSystem,
    settings: &CompilerSettings,
    language: Language,
) -> Box<dyn Toolchain> {
    if language == Language::Cuda {
        return Box::new(cuda::CudaToolchain::new(operating_system));
    }
    match ToolchainFamily::select(operating_system, settings.use_msvc) {
        ToolchainFamily::Msvc => Box::new(msvc::MsvcToolchain::new(settings)),
        ToolchainFamily::Unix => Box::new(unix::UnixToolchain::new(settings, language)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_requires_windows_and_opt_in() {
        assert_eq!(ToolchainFamily::select(OperatingSystem::Windows, true), ToolchainFamily::Msvc);
        assert_eq!(ToolchainFamily::select(OperatingSystem::Windows, false), ToolchainFamily::Unix);
        assert_eq!(ToolchainFamily::select(OperatingSystem::Linux, true), ToolchainFamily::Unix);
        assert_eq!(ToolchainFamily::select(OperatingSystem::MacOs, false), ToolchainFamily::Unix);
    }

    #[test]
    fn test_cuda_always_uses_nvcc() {
        let settings = CompilerSettings { use_msvc: true, ..CompilerSettings::default() };
        let toolchain = select_toolchain(OperatingSystem::Windows, &settings, Language::Cuda);
        assert_eq!(toolchain.name(), "nvcc");
        assert_eq!(toolchain.problem_matcher(), ProblemMatcher::Gcc);

        let toolchain = select_toolchain(OperatingSystem::Windows, &settings, Language::Cpp);
        assert_eq!(toolchain.name(), "msvc");
        assert_eq!(toolchain.problem_matcher(), ProblemMatcher::MsCompile);

        let toolchain = select_toolchain(OperatingSystem::Linux, &settings, Language::C);
        assert_eq!(toolchain.name(), "unix");
    }
}
