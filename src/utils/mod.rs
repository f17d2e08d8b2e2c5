//! Helpers shared by the synthesizer and the runner: executing synthesized command
//! lines through the host shell, and the small file system operations around the
//! build directories.

pub mod command_runner;
pub mod file_system;
