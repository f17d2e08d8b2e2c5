use std::path::{Path, PathBuf};

use crate::compiler::{Architecture, BuildMode, OperatingSystem};

/// The state a trigger supplies to synthesis: which folder, which file, which mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceContext {
    workspace_folder: PathBuf,
    active_folder: PathBuf,
    active_file: Option<PathBuf>,
    build_mode: BuildMode,
    architecture: Architecture,
    operating_system: OperatingSystem,
}

/// The only way to change a [`WorkspaceContext`] after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextUpdate {
    ActiveFolder(PathBuf),
    ActiveFile(Option<PathBuf>),
    BuildMode(BuildMode),
    Architecture(Architecture),
    OperatingSystem(OperatingSystem),
}

impl WorkspaceContext {
    /// Starts with the workspace root as the active folder, Debug mode, x64, host OS.
    pub fn new(workspace_folder: impl Into<PathBuf>) -> Self {
        let workspace_folder = workspace_folder.into();
        WorkspaceContext {
            active_folder: workspace_folder.clone(),
            workspace_folder,
            active_file: None,
            build_mode: BuildMode::default(),
            architecture: Architecture::default(),
            operating_system: OperatingSystem::current(),
        }
    }

    pub fn apply(&mut self, update: ContextUpdate) {
        log::debug!("Workspace context update: {:?}", update);
        match update {
            ContextUpdate::ActiveFolder(folder) => self.active_folder = folder,
            ContextUpdate::ActiveFile(file) => self.active_file = file,
            ContextUpdate::BuildMode(mode) => self.build_mode = mode,
            ContextUpdate::Architecture(architecture) => self.architecture = architecture,
            ContextUpdate::OperatingSystem(os) => self.operating_system = os,
        }
    }

    /// Builder-style variant of [`WorkspaceContext::apply`].
    pub fn with(mut self, update: ContextUpdate) -> Self {
        self.apply(update);
        self
    }

    pub fn workspace_folder(&self) -> &Path {
        &self.workspace_folder
    }

    pub fn active_folder(&self) -> &Path {
        &self.active_folder
    }

    pub fn active_file(&self) -> Option<&Path> {
        self.active_file.as_deref()
    }

    pub fn build_mode(&self) -> BuildMode {
        self.build_mode
    }

    pub fn architecture(&self) -> Architecture {
        self.architecture
    }

    pub fn operating_system(&self) -> OperatingSystem {
        self.operating_system
    }

    /// `<active folder>/build/<Mode>`
    pub fn mode_dir(&self) -> PathBuf {
        self.active_folder.join("build").join(self.build_mode.as_str())
    }

    /// `out<Mode>` plus the host executable suffix.
    pub fn executable_name(&self) -> String {
        format!("out{}{}", self.build_mode, self.operating_system.executable_suffix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_updates_go_through_apply() {
        let mut ctx = WorkspaceContext::new("/work");
        assert_eq!(ctx.active_folder(), Path::new("/work"));
        assert_eq!(ctx.build_mode(), BuildMode::Debug);

        ctx.apply(ContextUpdate::ActiveFolder(PathBuf::from("/work/app")));
        ctx.apply(ContextUpdate::BuildMode(BuildMode::Release));
        ctx.apply(ContextUpdate::Architecture(Architecture::X86));

        assert_eq!(ctx.workspace_folder(), Path::new("/work"));
        assert_eq!(ctx.mode_dir(), Path::new("/work/app/build/Release"));
        assert_eq!(ctx.architecture(), Architecture::X86);
    }

    #[test]
    fn test_executable_name_per_os() {
        let ctx = WorkspaceContext::new("/work").with(ContextUpdate::OperatingSystem(OperatingSystem::Linux));
        assert_eq!(ctx.executable_name(), "outDebug");

        let ctx = ctx
            .with(ContextUpdate::OperatingSystem(OperatingSystem::Windows))
            .with(ContextUpdate::BuildMode(BuildMode::Release));
        assert_eq!(ctx.executable_name(), "outRelease.exe");
    }
}
