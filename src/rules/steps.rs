// src/rules/steps.rs

//! The step vocabulary rules generate.
//!
//! Steps are descriptions, not actions: a rule's `build_steps` returns an
//! ordered list and the local step runner in [`crate::exec::local`] executes
//! them. Filesystem steps are executed directly; `Shell` steps run through
//! the platform shell.

use std::path::{Path, PathBuf};

/// One unit of local work generated by a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStep {
    /// Create a directory (and any missing parents).
    Mkdir { path: PathBuf },
    /// Delete and recreate a directory so its contents start empty.
    MakeCleanDirectory { path: PathBuf },
    /// Create the target's parent directories and symlink `source` at
    /// `target`.
    MkdirAndSymlinkFile { source: PathBuf, target: PathBuf },
    /// Run a shell command.
    Shell { description: String, command: String },
}

impl BuildStep {
    pub fn shell(description: impl Into<String>, command: impl Into<String>) -> Self {
        BuildStep::Shell {
            description: description.into(),
            command: command.into(),
        }
    }

    /// Short name for logs.
    pub fn short_name(&self) -> &str {
        match self {
            BuildStep::Mkdir { .. } => "mkdir",
            BuildStep::MakeCleanDirectory { .. } => "make_clean_dir",
            BuildStep::MkdirAndSymlinkFile { .. } => "symlink",
            BuildStep::Shell { description, .. } => description,
        }
    }
}

/// Render the `jar` invocation that packages `include_paths` into `output`.
///
/// - with a manifest file: `jar cfm <output> <manifest> …`
/// - with a main class and no manifest: `jar cfe <output> <main_class> …`
/// - otherwise: `jar cf <output> …`
///
/// Every include path is added with `-C <path> .` so entries are archived
/// relative to their own roots.
pub fn render_jar_command(
    output: &Path,
    include_paths: &[PathBuf],
    main_class: Option<&str>,
    manifest: Option<&Path>,
) -> String {
    let mut cmd = String::from("jar ");
    match (manifest, main_class) {
        (Some(manifest), _) => {
            cmd.push_str("cfm ");
            cmd.push_str(&output.display().to_string());
            cmd.push(' ');
            cmd.push_str(&manifest.display().to_string());
        }
        (None, Some(main_class)) => {
            cmd.push_str("cfe ");
            cmd.push_str(&output.display().to_string());
            cmd.push(' ');
            cmd.push_str(main_class);
        }
        (None, None) => {
            cmd.push_str("cf ");
            cmd.push_str(&output.display().to_string());
        }
    }
    for path in include_paths {
        cmd.push_str(" -C ");
        cmd.push_str(&path.display().to_string());
        cmd.push_str(" .");
    }
    cmd
}
