//! What a single synthesis call is going to compile, and where the outputs go.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::discovery::Discovery;
use super::{Architecture, BuildMode, Language, OperatingSystem, WILDCARD_THRESHOLD};
use crate::utils::file_system;
use crate::workspace::WorkspaceContext;

/// C++ wildcard candidates, in the order they are emitted.
const CPP_WILDCARDS: &[(&str, &str)] = &[(".cpp", "*.cpp"), (".cc", "*.cc"), (".cxx", "*.cxx")];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileStrategy {
    /// One `-c` invocation per file, then one link invocation.
    PerFile,
    /// A single invocation over wildcard patterns.
    Wildcard,
}

/// A source file as it will appear on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedSource {
    /// Path relative to the active folder (the command's working directory), forward slashes.
    pub file: String,
    /// Output name for intermediate files. Spaces are removed and the name is unique
    /// within the plan, case-insensitively.
    pub stem: String,
}

impl PlannedSource {
    fn new(path: &Path, folder: &Path, taken: &mut HashSet<String>) -> Self {
        let file = match path.strip_prefix(folder) {
            Ok(rel) => file_system::to_forward_slashes(&rel.to_string_lossy()),
            Err(_) => file_system::to_forward_slashes(&path.to_string_lossy()),
        };
        let base = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().replace(' ', ""))
            .unwrap_or_default();
        let extension: String = path
            .extension()
            .map(|ext| ext.to_string_lossy().chars().filter(|c| c.is_ascii_alphanumeric()).collect())
            .unwrap_or_default();
        PlannedSource { file, stem: unique_stem(&base, &extension, taken) }
    }

    /// `<dir>/<stem>.<extension>`
    pub fn output_path(&self, dir: &str, extension: &str) -> String {
        format!("{}/{}.{}", dir, self.stem, extension)
    }
}

/// `util.cc` keeps `util`, a later `util.cpp` becomes `util_cpp`, then `util_cpp2` and so on.
fn unique_stem(base: &str, extension: &str, taken: &mut HashSet<String>) -> String {
    let mut candidate = base.to_string();
    let mut attempt = 1;
    while !taken.insert(candidate.to_lowercase()) {
        candidate = if attempt == 1 {
            format!("{}_{}", base, extension)
        } else {
            format!("{}_{}{}", base, extension, attempt)
        };
        attempt += 1;
    }
    candidate
}

/// Compile-only clauses for `.cu` files next to C++ sources, and the objects they leave
/// for the host link step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanionObjects {
    pub clauses: Vec<String>,
    pub objects: Vec<String>,
}

impl CompanionObjects {
    pub fn object_line(&self) -> String {
        self.objects.join(" ")
    }
}

#[derive(Debug, Clone)]
pub struct CompilePlan {
    pub folder: PathBuf,
    pub language: Language,
    pub mode: BuildMode,
    pub architecture: Architecture,
    pub operating_system: OperatingSystem,
    pub single_file: bool,
    pub sources: Vec<PlannedSource>,
    /// CUDA files of a folder whose dominant language is not CUDA.
    pub cuda_sources: Vec<PlannedSource>,
    /// Filled in by the CUDA toolchain for build commands.
    pub companions: CompanionObjects,
    /// Build-mode directory relative to the active folder, e.g. `./build/Debug`.
    pub mode_dir: String,
    /// Executable path relative to the active folder, e.g. `./build/Debug/outDebug`.
    pub executable: String,
}

impl CompilePlan {
    /// Keeps the discovered files matching the dominant language, and sets CUDA files
    /// aside when another language dominates.
    pub fn new(context: &WorkspaceContext, discovery: &Discovery, single_file: bool) -> Self {
        let folder = context.active_folder().to_path_buf();
        let mut taken = HashSet::new();
        let sources: Vec<PlannedSource> = discovery
            .files
            .iter()
            .filter(|source| source.language() == Some(discovery.language))
            .map(|source| PlannedSource::new(&source.path, &folder, &mut taken))
            .collect();
        let cuda_sources = if discovery.language == Language::Cuda {
            Vec::new()
        } else {
            discovery
                .files
                .iter()
                .filter(|source| source.language() == Some(Language::Cuda))
                .map(|source| PlannedSource::new(&source.path, &folder, &mut taken))
                .collect()
        };
        let mode_dir = file_system::relative_display(&context.mode_dir(), &folder);
        let executable = format!("{}/{}", mode_dir, context.executable_name());

        CompilePlan {
            language: discovery.language,
            mode: context.build_mode(),
            architecture: context.architecture(),
            operating_system: context.operating_system(),
            single_file,
            sources,
            cuda_sources,
            companions: CompanionObjects::default(),
            mode_dir,
            executable,
            folder,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn wildcard_patterns(&self) -> Vec<&'static str> {
        wildcard_patterns(self.language, self.sources.iter().map(|s| s.file.as_str()))
    }

    /// Wildcard compilation once the file count reaches the threshold, provided the
    /// patterns cover every planned source.
    pub fn strategy(&self) -> CompileStrategy {
        if self.sources.len() < WILDCARD_THRESHOLD {
            return CompileStrategy::PerFile;
        }
        let patterns = self.wildcard_patterns();
        let covered = |file: &str| {
            !file.contains('/')
                && patterns
                    .iter()
                    .any(|pattern| pattern.strip_prefix('*').map_or(false, |ext| file.ends_with(ext)))
        };
        if !patterns.is_empty() && self.sources.iter().all(|source| covered(&source.file)) {
            CompileStrategy::Wildcard
        } else {
            CompileStrategy::PerFile
        }
    }

    /// `mode_dir` with backslashes and a trailing separator, as MSVC output switches expect.
    pub fn mode_dir_windows(&self) -> String {
        format!("{}\\", self.mode_dir.replace('/', "\\"))
    }

    pub fn executable_windows(&self) -> String {
        self.executable.replace('/', "\\")
    }
}

/// Shell patterns covering `files` for the given language.
///
/// For C++ this is the present subset of `*.cpp`, `*.cc` and `*.cxx`, in that order,
/// which yields the seven possible combinations.
pub fn wildcard_patterns<'a>(language: Language, files: impl IntoIterator<Item = &'a str>) -> Vec<&'static str> {
    match language {
        Language::C => vec!["*.c"],
        Language::Cuda => vec!["*.cu"],
        Language::Cpp => {
            let files: Vec<&str> = files.into_iter().collect();
            CPP_WILDCARDS
                .iter()
                .filter(|(ext, _)| files.iter().any(|f| f.ends_with(ext)))
                .map(|(_, pattern)| *pattern)
                .collect()
        }
    }
}

pub fn needs_quotes(text: &str) -> bool {
    text.contains(' ') || text.contains('&')
}

/// Wraps `text` in double quotes if it contains a space or an ampersand.
/// Already quoted text is returned unchanged.
pub fn quote_if_needed(text: &str) -> String {
    let already_quoted = text.len() >= 2 && text.starts_with('"') && text.ends_with('"');
    if needs_quotes(text) && !already_quoted {
        format!("\"{}\"", text)
    } else {
        text.to_string()
    }
}

/// Joins non-empty fragments with single spaces.
pub fn join_fragments<I, S>(fragments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    fragments
        .into_iter()
        .filter(|fragment| !fragment.as_ref().trim().is_empty())
        .map(|fragment| fragment.as_ref().trim().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
