// src/rules/java_test.rs

//! JVM test rules.

use std::path::{Path, PathBuf};

use crate::errors::{FallbuildError, Result};
use crate::rules::key::{RuleKey, RuleKeyBuilder};
use crate::rules::steps::BuildStep;
use crate::rules::target::BuildTarget;
use crate::rules::{BuildRule, RuleType};

/// Flavour of a JVM test rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestKind {
    /// Plain JUnit tests.
    Junit,
    /// Robolectric tests: JUnit on the JVM against Android API shadows.
    Robolectric,
}

/// Compiles test sources and describes how to run them.
///
/// The Robolectric flavour only differs in classification (it is an Android
/// rule) and rule type; sources, resources, and VM args are handled
/// identically.
#[derive(Debug, Clone)]
pub struct JavaTestRule {
    target: BuildTarget,
    kind: TestKind,
    srcs: Vec<PathBuf>,
    resources: Vec<PathBuf>,
    labels: Vec<String>,
    vm_args: Vec<String>,
    source_under_test: Vec<String>,
    classpath: Vec<PathBuf>,
}

impl JavaTestRule {
    pub fn builder(target: BuildTarget, kind: TestKind) -> JavaTestRuleBuilder {
        JavaTestRuleBuilder {
            rule: JavaTestRule {
                target,
                kind,
                srcs: Vec::new(),
                resources: Vec::new(),
                labels: Vec::new(),
                vm_args: Vec::new(),
                source_under_test: Vec::new(),
                classpath: Vec::new(),
            },
        }
    }

    pub fn kind(&self) -> TestKind {
        self.kind
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn source_under_test(&self) -> &[String] {
        &self.source_under_test
    }

    pub fn classes_directory(&self, gen_dir: &Path) -> PathBuf {
        gen_dir
            .join(self.target.base_path())
            .join(format!("{}__test_classes", self.target.short_name()))
    }

    /// The `java` invocation that runs the compiled tests.
    pub fn test_command(&self, gen_dir: &Path) -> Result<String> {
        if self.srcs.is_empty() {
            return Err(FallbuildError::RuleError(format!(
                "test rule {} has no sources to run",
                self.target
            )));
        }

        let mut cmd = String::from("java");
        for arg in &self.vm_args {
            cmd.push(' ');
            cmd.push_str(arg);
        }

        let mut classpath = vec![self.classes_directory(gen_dir).display().to_string()];
        classpath.extend(self.classpath.iter().map(|p| p.display().to_string()));
        cmd.push_str(&format!(" -classpath {}", classpath.join(":")));

        cmd.push_str(" org.junit.runner.JUnitCore");
        for class in self.test_class_names() {
            cmd.push(' ');
            cmd.push_str(&class);
        }
        Ok(cmd)
    }

    /// Test class names derived from source file stems.
    fn test_class_names(&self) -> Vec<String> {
        self.srcs
            .iter()
            .filter_map(|src| src.file_stem())
            .map(|stem| stem.to_string_lossy().into_owned())
            .collect()
    }
}

impl BuildRule for JavaTestRule {
    fn target(&self) -> &BuildTarget {
        &self.target
    }

    fn rule_type(&self) -> RuleType {
        match self.kind {
            TestKind::Junit => RuleType::JavaTest,
            TestKind::Robolectric => RuleType::RobolectricTest,
        }
    }

    fn rule_key(&self) -> Result<RuleKey> {
        Ok(RuleKeyBuilder::new(self.rule_type().as_str())
            .set("target", &self.target.full_name())
            .set_all("srcs", self.srcs.iter().map(|p| p.display().to_string()))
            .set_all(
                "resources",
                self.resources.iter().map(|p| p.display().to_string()),
            )
            .set_all("labels", &self.labels)
            .set_all("vm_args", &self.vm_args)
            .set_all("source_under_test", &self.source_under_test)
            .set_all(
                "classpath",
                self.classpath.iter().map(|p| p.display().to_string()),
            )
            .build())
    }

    fn build_steps(&self, gen_dir: &Path) -> Result<Vec<BuildStep>> {
        if self.srcs.is_empty() {
            return Err(FallbuildError::RuleError(format!(
                "test rule {} has no sources",
                self.target
            )));
        }

        let classes_dir = self.classes_directory(gen_dir);
        let mut steps = vec![BuildStep::Mkdir {
            path: classes_dir.clone(),
        }];

        let mut javac = format!("javac -d {}", classes_dir.display());
        if !self.classpath.is_empty() {
            let classpath: Vec<String> =
                self.classpath.iter().map(|p| p.display().to_string()).collect();
            javac.push_str(&format!(" -classpath {}", classpath.join(":")));
        }
        for src in &self.srcs {
            javac.push(' ');
            javac.push_str(&src.display().to_string());
        }
        steps.push(BuildStep::shell("javac", javac));

        // Resources are staged next to the compiled classes.
        for resource in &self.resources {
            let file_name = resource
                .file_name()
                .ok_or_else(|| {
                    FallbuildError::RuleError(format!(
                        "resource '{}' has no file name",
                        resource.display()
                    ))
                })?
                .to_owned();
            steps.push(BuildStep::MkdirAndSymlinkFile {
                source: resource.clone(),
                target: classes_dir.join(file_name),
            });
        }

        Ok(steps)
    }

    fn is_android_rule(&self) -> bool {
        self.kind == TestKind::Robolectric
    }
}

pub struct JavaTestRuleBuilder {
    rule: JavaTestRule,
}

impl JavaTestRuleBuilder {
    pub fn src(mut self, src: impl Into<PathBuf>) -> Self {
        self.rule.srcs.push(src.into());
        self
    }

    pub fn resource(mut self, resource: impl Into<PathBuf>) -> Self {
        self.rule.resources.push(resource.into());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.rule.labels.push(label.into());
        self
    }

    pub fn vm_arg(mut self, arg: impl Into<String>) -> Self {
        self.rule.vm_args.push(arg.into());
        self
    }

    pub fn source_under_test(mut self, rule: impl Into<String>) -> Self {
        self.rule.source_under_test.push(rule.into());
        self
    }

    pub fn classpath_entry(mut self, entry: impl Into<PathBuf>) -> Self {
        self.rule.classpath.push(entry.into());
        self
    }

    pub fn build(self) -> JavaTestRule {
        self.rule
    }
}
