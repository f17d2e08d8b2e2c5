//! nvcc toolchain. Uses gcc-style syntax on every host.

use super::flags::{self, apply_contributions, FlagContribution, FlagInputs, FlagSet};
use super::plan::{join_fragments, quote_if_needed, CompanionObjects, CompilePlan};
use super::unix::render_build;
use super::{BuildMode, Language, OperatingSystem, ProblemMatcher, Toolchain};
use crate::settings::CompilerSettings;

pub const CUDA_COMPILER_NAME: &str = "nvcc";

pub const CUDA_FLAGS: &[FlagContribution] = &[
    FlagContribution { name: "compilation-time", contribute: compilation_time },
    FlagContribution { name: "standard", contribute: standard },
    FlagContribution { name: "link-time-optimization", contribute: link_time_optimization },
    FlagContribution { name: "optimization", contribute: optimization },
    FlagContribution { name: "compiler-args", contribute: flags::extra_compiler_args },
    FlagContribution { name: "include-paths", contribute: include_paths },
];

fn compilation_time(inputs: &FlagInputs) -> Vec<String> {
    if inputs.settings.show_compilation_time {
        flags::strings(&["--time", "-"])
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
        flags::strings(&["--lto"])
    } else {
        Vec::new()
    }
}

fn optimization(inputs: &FlagInputs) -> Vec<String> {
    match inputs.mode {
        BuildMode::Debug => flags::strings(&["-g", "-O0"]),
        BuildMode::Release => flags::strings(&["-O3"]),
    }
}

fn include_paths(inputs: &FlagInputs) -> Vec<String> {
    flags::include_paths("-I", &inputs.settings.include_paths)
}

pub struct CudaToolchain {
    operating_system: OperatingSystem,
}

impl CudaToolchain {
    pub fn new(operating_system: OperatingSystem) -> Self {
        CudaToolchain { operating_system }
    }
}

impl Toolchain for CudaToolchain {
    fn name(&self) -> &'static str {
        CUDA_COMPILER_NAME
    }

    fn problem_matcher(&self) -> ProblemMatcher {
        ProblemMatcher::Gcc
    }

    fn object_extension(&self) -> &'static str {
        if self.operating_system.is_windows() {
            "obj"
        } else {
            "o"
        }
    }

    fn assemble_flags(&self, inputs: &FlagInputs) -> FlagSet {
        FlagSet {
            compiler_args: apply_contributions(CUDA_FLAGS, inputs),
            linker_args: flags::verbatim(&inputs.settings.linker_args),
        }
    }

    fn build_command(&self, plan: &CompilePlan, flags: &FlagSet) -> Option<String> {
        render_build(CUDA_COMPILER_NAME, self.object_extension(), plan, flags)
    }

    /// Device code has no host assembly listing; PTX inspection is left to the user.
    fn assembly_command(&self, plan: &CompilePlan, _flags: &FlagSet) -> Option<String> {
        log::warn!("Assembly listings are not supported for CUDA sources in {:?}", plan.folder);
        None
    }
}

/// Renders one compile-only `nvcc` clause per CUDA file set aside by the plan. The host
/// toolchain runs them first and links their objects. No LTO: the host linker could not
/// consume nvcc bitcode.
pub fn attach_companions(plan: &mut CompilePlan, settings: &CompilerSettings) {
    if plan.cuda_sources.is_empty() {
        return;
    }

    let toolchain = CudaToolchain::new(plan.operating_system);
    let inputs = FlagInputs::new(settings, plan.mode, Language::Cuda, plan.single_file).without_lto();
    let compiler_args = toolchain.assemble_flags(&inputs).compiler_line();

    let mut companions = CompanionObjects::default();
    for source in &plan.cuda_sources {
        let object = quote_if_needed(&source.output_path(&plan.mode_dir, toolchain.object_extension()));
        let file = quote_if_needed(&source.file);
        companions.clauses.push(join_fragments([
            CUDA_COMPILER_NAME,
            compiler_args.as_str(),
            "-c",
            file.as_str(),
            "-o",
            object.as_str(),
        ]));
        companions.objects.push(object);
    }
    log::info!("Compiling {} CUDA file(s) separately with {}", companions.objects.len(), CUDA_COMPILER_NAME);
    plan.companions = companions;
}
