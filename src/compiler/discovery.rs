//! Finds the compilable sources of a folder (or the single active file) and decides the
//! folder's dominant language.

use std::path::{Path, PathBuf};

use super::Language;
use crate::utils::file_system;

const C_EXTENSIONS: &[&str] = &["c"];
const CPP_EXTENSIONS: &[&str] = &["cpp", "cc", "cxx", "c++", "cp", "ino", "ipp", "tcc"];
const CUDA_EXTENSIONS: &[&str] = &["cu"];
const EXTRA_HEADER_EXTENSIONS: &[&str] = &["inl", "idl", "cuh"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    C,
    Cpp,
    Cuda,
    Header,
    Other,
}

impl SourceKind {
    /// Classifies by extension only, case-insensitively.
    pub fn from_path(path: &Path) -> Self {
        let ext = match path.extension() {
            Some(ext) => ext.to_string_lossy().to_lowercase(),
            None => return SourceKind::Other,
        };

        if C_EXTENSIONS.contains(&ext.as_str()) {
            SourceKind::C
        } else if CPP_EXTENSIONS.contains(&ext.as_str()) {
            SourceKind::Cpp
        } else if CUDA_EXTENSIONS.contains(&ext.as_str()) {
            SourceKind::Cuda
        } else if ext.starts_with('h') || EXTRA_HEADER_EXTENSIONS.contains(&ext.as_str()) {
            SourceKind::Header
        } else {
            SourceKind::Other
        }
    }

    pub fn language(&self) -> Option<Language> {
        match self {
            SourceKind::C => Some(Language::C),
            SourceKind::Cpp => Some(Language::Cpp),
            SourceKind::Cuda => Some(Language::Cuda),
            SourceKind::Header | SourceKind::Other => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub kind: SourceKind,
}

impl SourceFile {
    pub fn new(path: PathBuf) -> Self {
        let kind = SourceKind::from_path(&path);
        SourceFile { path, kind }
    }

    pub fn language(&self) -> Option<Language> {
        self.kind.language()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    pub files: Vec<SourceFile>,
    pub language: Language,
}

impl Discovery {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Any C++ file makes the folder C++, otherwise any CUDA file makes it CUDA, otherwise C.
pub fn dominant_language<'a>(kinds: impl IntoIterator<Item = &'a SourceKind>) -> Language {
    let mut has_cuda = false;
    for kind in kinds {
        match kind {
            SourceKind::Cpp => return Language::Cpp,
            SourceKind::Cuda => has_cuda = true,
            _ => {}
        }
    }
    if has_cuda {
        Language::Cuda
    } else {
        Language::C
    }
}

/// Lists the compilable sources of `folder`, or resolves `active_file` in single-file mode.
///
/// Never fails: a missing folder, or a single-file request without a recognised source
/// file, produces an empty file list.
pub fn discover(folder: &Path, single_file: bool, active_file: Option<&Path>) -> Discovery {
    let files: Vec<SourceFile> = if single_file {
        match active_file {
            Some(file) => {
                let source = SourceFile::new(file.to_path_buf());
                if source.language().is_some() {
                    vec![source]
                } else {
                    log::debug!("Active file {:?} is not a compilable source file", file);
                    Vec::new()
                }
            }
            None => {
                log::debug!("Single file mode requested without an active file");
                Vec::new()
            }
        }
    } else {
        file_system::files_in_dir(folder)
            .into_iter()
            .map(SourceFile::new)
            .filter(|source| source.language().is_some())
            .collect()
    };

    let language = dominant_language(files.iter().map(|f| &f.kind));
    log::debug!("Discovered {} source file(s) in {:?}, language {}", files.len(), folder, language);

    Discovery { files, language }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn folder_with(names: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for name in names {
            File::create(dir.path().join(name)).unwrap();
        }
        dir
    }

    #[test]
    fn test_classification_by_extension() {
        assert_eq!(SourceKind::from_path(Path::new("main.c")), SourceKind::C);
        for name in ["a.cpp", "a.cc", "a.cxx", "a.c++", "a.cp", "a.ino", "a.ipp", "a.tcc", "A.CPP"] {
            assert_eq!(SourceKind::from_path(Path::new(name)), SourceKind::Cpp, "{}", name);
        }
        assert_eq!(SourceKind::from_path(Path::new("kernel.cu")), SourceKind::Cuda);
        for name in ["a.h", "a.hpp", "a.hh", "a.hxx", "a.inl", "a.idl", "a.cuh"] {
            assert_eq!(SourceKind::from_path(Path::new(name)), SourceKind::Header, "{}", name);
        }
        assert_eq!(SourceKind::from_path(Path::new("Makefile")), SourceKind::Other);
        assert_eq!(SourceKind::from_path(Path::new("notes.txt")), SourceKind::Other);
    }

    #[test]
    fn test_single_stray_cpp_file_flips_folder_to_cpp() {
        let dir = folder_with(&["a.c", "b.c", "c.c", "d.c", "kernel.cu", "stray.cpp"]);
        let discovery = discover(dir.path(), false, None);
        assert_eq!(discovery.language, Language::Cpp);
        assert_eq!(discovery.files.len(), 6);
    }

    #[test]
    fn test_cuda_beats_c_without_cpp() {
        let dir = folder_with(&["a.c", "b.c", "kernel.cu"]);
        assert_eq!(discover(dir.path(), false, None).language, Language::Cuda);
    }

    #[test]
    fn test_plain_c_folder() {
        let dir = folder_with(&["a.c", "b.h"]);
        let discovery = discover(dir.path(), false, None);
        assert_eq!(discovery.language, Language::C);
        assert_eq!(discovery.files.len(), 1);
    }

    #[test]
    fn test_headers_and_other_files_are_excluded() {
        let dir = folder_with(&["main.cpp", "main.hpp", "util.inl", "README.md"]);
        let discovery = discover(dir.path(), false, None);
        assert_eq!(discovery.files.len(), 1);
        assert_eq!(discovery.files[0].kind, SourceKind::Cpp);
    }

    #[test]
    fn test_missing_folder_is_empty() {
        let dir = TempDir::new().unwrap();
        let discovery = discover(&dir.path().join("missing"), false, None);
        assert!(discovery.is_empty());
        assert_eq!(discovery.language, Language::C);
    }

    #[test]
    fn test_single_file_mode() {
        let dir = folder_with(&["main.cpp", "other.c", "notes.txt"]);
        let discovery = discover(dir.path(), true, Some(&dir.path().join("other.c")));
        assert_eq!(discovery.files.len(), 1);
        assert_eq!(discovery.language, Language::C);

        assert!(discover(dir.path(), true, Some(&dir.path().join("notes.txt"))).is_empty());
        assert!(discover(dir.path(), true, None).is_empty());
    }

    #[test]
    fn test_dominant_language_priority() {
        use SourceKind::*;
        assert_eq!(dominant_language(&[C, C, Cuda, Cuda, Cpp]), Language::Cpp);
        assert_eq!(dominant_language(&[Cuda, C, C, C]), Language::Cuda);
        assert_eq!(dominant_language(&[C]), Language::C);
        assert_eq!(dominant_language(&[]), Language::C);
    }
}
