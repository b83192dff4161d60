// src/rules/jar_binary.rs

//! Executable jar packaging rule.

use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{FallbuildError, Result};
use crate::rules::key::{RuleKey, RuleKeyBuilder};
use crate::rules::steps::{render_jar_command, BuildStep};
use crate::rules::target::BuildTarget;
use crate::rules::{BuildRule, RuleType};

/// Packages classpath entries (and an optional META-INF directory) into a
/// single runnable jar.
///
/// Output layout under the generated-files root:
/// `<gen_dir>/<base_path>/<short_name>.jar`, with META-INF staging (when
/// configured) in a `meta_inf_staging` directory next to it.
#[derive(Debug, Clone)]
pub struct JarBinaryRule {
    target: BuildTarget,
    main_class: Option<String>,
    manifest_file: Option<PathBuf>,
    meta_inf_directory: Option<PathBuf>,
    classpath: Vec<PathBuf>,
}

impl JarBinaryRule {
    pub fn builder(target: BuildTarget) -> JarBinaryRuleBuilder {
        JarBinaryRuleBuilder {
            target,
            main_class: None,
            manifest_file: None,
            meta_inf_directory: None,
            classpath: Vec::new(),
        }
    }

    pub fn main_class(&self) -> Option<&str> {
        self.main_class.as_deref()
    }

    pub fn output_directory(&self, gen_dir: &Path) -> PathBuf {
        gen_dir.join(self.target.base_path())
    }

    pub fn output_file(&self, gen_dir: &Path) -> PathBuf {
        self.output_directory(gen_dir)
            .join(format!("{}.jar", self.target.short_name()))
    }

    /// The `java` command line that runs this binary.
    ///
    /// Requires a main class; packaging a jar without one is fine, running it
    /// is not.
    pub fn executable_command(&self, gen_dir: &Path, jvm_args: &[String]) -> Result<String> {
        let main_class = self.main_class.as_deref().ok_or_else(|| {
            FallbuildError::RuleError(format!(
                "must specify a main class for {} in order to run it",
                self.target
            ))
        })?;

        let mut cmd = String::from("java");
        for arg in jvm_args {
            cmd.push(' ');
            cmd.push_str(arg);
        }
        let mut classpath = vec![self.output_file(gen_dir).display().to_string()];
        classpath.extend(self.classpath.iter().map(|p| p.display().to_string()));
        cmd.push_str(&format!(" -classpath {} {}", classpath.join(":"), main_class));
        Ok(cmd)
    }

    /// META-INF file names in canonical (sorted) order, for the rule key.
    fn meta_inf_contents(&self) -> Result<Vec<String>> {
        let Some(dir) = &self.meta_inf_directory else {
            return Ok(Vec::new());
        };
        let mut files = Vec::new();
        collect_files(dir, &mut files)?;
        files.sort();
        Ok(files)
    }
}

fn collect_files(dir: &Path, out: &mut Vec<String>) -> Result<()> {
    if !dir.exists() {
        return Ok(());
    }
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, out)?;
        } else {
            out.push(path.display().to_string());
        }
    }
    Ok(())
}

impl BuildRule for JarBinaryRule {
    fn target(&self) -> &BuildTarget {
        &self.target
    }

    fn rule_type(&self) -> RuleType {
        RuleType::JarBinary
    }

    fn rule_key(&self) -> Result<RuleKey> {
        let meta_inf_files = self.meta_inf_contents()?;
        Ok(RuleKeyBuilder::new(self.rule_type().as_str())
            .set("target", &self.target.full_name())
            .set_opt("main_class", self.main_class.as_deref())
            .set_opt(
                "manifest_file",
                self.manifest_file.as_deref().and_then(Path::to_str),
            )
            .set_all("meta_inf_directory", &meta_inf_files)
            .set_all(
                "classpath",
                self.classpath.iter().map(|p| p.display().to_string()),
            )
            .build())
    }

    fn build_steps(&self, gen_dir: &Path) -> Result<Vec<BuildStep>> {
        let mut steps = Vec::new();

        let output_directory = self.output_directory(gen_dir);
        steps.push(BuildStep::Mkdir {
            path: output_directory.clone(),
        });

        let include_paths = if let Some(meta_inf) = &self.meta_inf_directory {
            let staging_root = output_directory.join("meta_inf_staging");
            let staging_target = staging_root.join("META-INF");

            steps.push(BuildStep::MakeCleanDirectory {
                path: staging_root.clone(),
            });
            steps.push(BuildStep::MkdirAndSymlinkFile {
                source: meta_inf.clone(),
                target: staging_target,
            });

            let mut paths = vec![staging_root];
            paths.extend(self.classpath.iter().cloned());
            paths
        } else {
            self.classpath.clone()
        };

        let jar_command = render_jar_command(
            &self.output_file(gen_dir),
            &include_paths,
            self.main_class.as_deref(),
            self.manifest_file.as_deref(),
        );
        steps.push(BuildStep::shell("jar", jar_command));

        Ok(steps)
    }
}

pub struct JarBinaryRuleBuilder {
    target: BuildTarget,
    main_class: Option<String>,
    manifest_file: Option<PathBuf>,
    meta_inf_directory: Option<PathBuf>,
    classpath: Vec<PathBuf>,
}

impl JarBinaryRuleBuilder {
    pub fn main_class(mut self, main_class: impl Into<String>) -> Self {
        self.main_class = Some(main_class.into());
        self
    }

    pub fn manifest_file(mut self, manifest: impl Into<PathBuf>) -> Self {
        self.manifest_file = Some(manifest.into());
        self
    }

    pub fn meta_inf_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.meta_inf_directory = Some(dir.into());
        self
    }

    pub fn classpath_entry(mut self, entry: impl Into<PathBuf>) -> Self {
        self.classpath.push(entry.into());
        self
    }

    pub fn build(self) -> JarBinaryRule {
        JarBinaryRule {
            target: self.target,
            main_class: self.main_class,
            manifest_file: self.manifest_file,
            meta_inf_directory: self.meta_inf_directory,
            classpath: self.classpath,
        }
    }
}
