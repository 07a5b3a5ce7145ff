//! Post-processing steps run over a generated package.
//!
//! A run invokes the derived-copy step once, on the controller package, and
//! the formatter twice, controller package first. Steps see the package as
//! `<base_dir>/<package>` and must fail loudly; the orchestrator aborts on the
//! first error.
//!
//! | step | kind |
//! |---|---|
//! | [`DeepCopyGen`] | in process, writes `<prefix>_deepcopy.rs` |
//! | [`PrettyPleaseFormatter`] | in process, rewrites prefixed files |
//! | [`CommandStep`] | external program, e.g. `rustfmt` |

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use proc_macro2::TokenStream;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::{Item, Token, Visibility};
use tracing::{debug, info};

use crate::errors::GeneratorError;
use crate::naming::{deep_copy_file_name, ident};
use crate::output::{GENERATED_HEADER, format_code, validate_code, write_atomic};

/// A step run against one generated package.
pub trait PostProcess {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    /// Runs the step on `<base_dir>/<package>`.
    fn run(&self, base_dir: &Path, package: &str) -> Result<(), GeneratorError>;
}

/// Prefixed `.rs` files of `dir`, sorted by name.
fn generated_files(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>, GeneratorError> {
    let entries = fs::read_dir(dir).map_err(|e| GeneratorError::ReadDir {
        path: dir.display().to_string(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| GeneratorError::ReadDir {
            path: dir.display().to_string(),
            source: e,
        })?;
        let path = entry.path();
        let is_generated = entry.file_name().to_string_lossy().starts_with(prefix)
            && path.extension().is_some_and(|ext| ext == "rs")
            && path.is_file();
        if is_generated {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn parse_file(step: &str, path: &Path) -> Result<(String, syn::File), GeneratorError> {
    let source = fs::read_to_string(path).map_err(|e| GeneratorError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    let file = syn::parse_file(&source).map_err(|e| GeneratorError::PostProcess {
        step: step.to_string(),
        message: format!("{}: {e}", path.display()),
    })?;
    Ok((source, file))
}

// ============================================================================
// Derived copy
// ============================================================================

/// Generates `deep_copy` helpers for every public, cloneable struct.
///
/// Only non-generic `pub` structs that derive `Clone` are covered. When the
/// package has none, no file is written.
#[derive(Debug, Clone)]
pub struct DeepCopyGen {
    prefix: String,
}

impl DeepCopyGen {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Collects the names of eligible structs from `file`.
    fn collect(file: &syn::File, names: &mut Vec<String>) {
        for item in &file.items {
            let Item::Struct(item) = item else { continue };

            let eligible = matches!(item.vis, Visibility::Public(_))
                && item.generics.params.is_empty()
                && derives_clone(&item.attrs);

            let name = item.ident.to_string();
            if eligible && !names.contains(&name) {
                names.push(name);
            }
        }
    }

    fn generate(&self, names: &[String]) -> Result<TokenStream, GeneratorError> {
        let impls = names
            .iter()
            .map(|name| {
                let ty = ident("deepcopy", name)?;
                Ok(quote! {
                    impl #ty {
                        /// Returns an independent copy of `self`.
                        pub fn deep_copy(&self) -> Self {
                            self.clone()
                        }

                        /// Overwrites `out` with a copy of `self`.
                        pub fn deep_copy_into(&self, out: &mut Self) {
                            out.clone_from(self);
                        }
                    }
                })
            })
            .collect::<Result<Vec<_>, GeneratorError>>()?;

        Ok(quote! {
            #[allow(unused_imports)]
            use super::*;

            #(#impls)*
        })
    }
}

fn derives_clone(attrs: &[syn::Attribute]) -> bool {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("derive"))
        .filter_map(|attr| {
            attr.parse_args_with(Punctuated::<syn::Path, Token![,]>::parse_terminated)
                .ok()
        })
        .any(|paths| paths.iter().any(|path| path.is_ident("Clone")))
}

impl PostProcess for DeepCopyGen {
    fn name(&self) -> &str {
        "deepcopy"
    }

    fn run(&self, base_dir: &Path, package: &str) -> Result<(), GeneratorError> {
        let dir = base_dir.join(package);
        let output = dir.join(deep_copy_file_name(&self.prefix));

        let mut names = Vec::new();
        for path in generated_files(&dir, &self.prefix)? {
            if path == output {
                continue;
            }
            let (_, file) = parse_file(self.name(), &path)?;
            Self::collect(&file, &mut names);
        }

        if names.is_empty() {
            info!(package, "No cloneable structs, skipping derived copies");
            return Ok(());
        }

        let tokens = self.generate(&names)?;
        let file = validate_code("deepcopy", &tokens)?;
        write_atomic(&output, &format_code(&file))?;
        info!(package, structs = names.len(), path = %output.display(), "Wrote derived copies");
        Ok(())
    }
}

// ============================================================================
// Formatting
// ============================================================================

/// Reformats every prefixed `.rs` file of a package with prettyplease.
///
/// prettyplease drops regular comments, so only generator-owned files are
/// touched and the generated header is restored. Files already in canonical
/// form are not rewritten.
#[derive(Debug, Clone)]
pub struct PrettyPleaseFormatter {
    prefix: String,
}

impl PrettyPleaseFormatter {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl PostProcess for PrettyPleaseFormatter {
    fn name(&self) -> &str {
        "prettyplease"
    }

    fn run(&self, base_dir: &Path, package: &str) -> Result<(), GeneratorError> {
        let dir = base_dir.join(package);
        for path in generated_files(&dir, &self.prefix)? {
            let (source, file) = parse_file(self.name(), &path)?;

            let formatted = if source.starts_with(GENERATED_HEADER) {
                format_code(&file)
            } else {
                prettyplease::unparse(&file)
            };

            if formatted != source {
                write_atomic(&path, &formatted)?;
                debug!(path = %path.display(), "Reformatted");
            }
        }
        info!(package, "Formatted package");
        Ok(())
    }
}

/// Runs an external program from the base source tree.
///
/// The package is passed as `./<package>`, or with `per_file` as one
/// invocation per prefixed `.rs` file (`./<package>/<file>`), for tools such
/// as `rustfmt` that do not accept directories. Output is inherited.
#[derive(Debug, Clone)]
pub struct CommandStep {
    name: String,
    program: String,
    args: Vec<String>,
    per_file: bool,
    prefix: String,
}

impl CommandStep {
    /// Creates a step from `command[0]` and its arguments.
    ///
    /// ## Errors
    ///
    /// Returns [`GeneratorError::ConfigError`] if `command` is empty.
    pub fn new(
        name: impl Into<String>,
        command: &[String],
        per_file: bool,
        prefix: impl Into<String>,
    ) -> Result<Self, GeneratorError> {
        let name = name.into();
        let Some((program, args)) = command.split_first() else {
            return Err(GeneratorError::ConfigError(format!(
                "step '{name}' has an empty command"
            )));
        };

        Ok(Self {
            name,
            program: program.clone(),
            args: args.to_vec(),
            per_file,
            prefix: prefix.into(),
        })
    }

    /// `rustfmt --edition 2024`, one file at a time.
    pub fn rustfmt(prefix: impl Into<String>) -> Self {
        Self {
            name: "rustfmt".to_string(),
            program: "rustfmt".to_string(),
            args: vec!["--edition".to_string(), "2024".to_string()],
            per_file: true,
            prefix: prefix.into(),
        }
    }

    fn invoke(&self, base_dir: &Path, operand: &str) -> Result<(), GeneratorError> {
        debug!(step = %self.name, program = %self.program, operand, "Running command");
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(operand)
            .current_dir(base_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| GeneratorError::Spawn {
                step: self.name.clone(),
                program: self.program.clone(),
                source: e,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(GeneratorError::PostProcess {
                step: self.name.clone(),
                message: format!("'{} {operand}' exited with {status}", self.program),
            })
        }
    }
}

impl PostProcess for CommandStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, base_dir: &Path, package: &str) -> Result<(), GeneratorError> {
        if !self.per_file {
            self.invoke(base_dir, &format!("./{package}"))?;
        } else {
            for path in generated_files(&base_dir.join(package), &self.prefix)? {
                let Some(file_name) = path.file_name() else { continue };
                self.invoke(
                    base_dir,
                    &format!("./{package}/{}", file_name.to_string_lossy()),
                )?;
            }
        }
        info!(step = %self.name, package, "Command step finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CONTROLLER: &str = r#"// Code generated by kinds-gen. DO NOT EDIT.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pod {
    pub host_name: String,
}

#[derive(Debug, Default)]
pub struct NotCloneable;

#[derive(Clone)]
struct Private;

#[derive(Clone)]
pub struct Wrapper<T>(T);

pub trait PodLister {}
"#;

    fn package() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("controllers")).unwrap();
        temp_dir
    }

    // === DeepCopyGen tests ===

    #[test]
    fn deep_copy_covers_public_cloneable_structs() {
        let base = package();
        let dir = base.path().join("controllers");
        fs::write(dir.join("zz_generated_pod_controller.rs"), CONTROLLER).unwrap();
        fs::write(dir.join("handwritten.rs"), "#[derive(Clone)] pub struct Manual;").unwrap();

        DeepCopyGen::new("zz_generated").run(base.path(), "controllers").unwrap();

        let code = fs::read_to_string(dir.join("zz_generated_deepcopy.rs")).unwrap();
        assert!(code.starts_with(GENERATED_HEADER));
        assert!(code.contains("impl Pod {"));
        assert!(code.contains("pub fn deep_copy(&self) -> Self"));
        assert!(code.contains("pub fn deep_copy_into(&self, out: &mut Self)"));
        assert!(!code.contains("NotCloneable"));
        assert!(!code.contains("Private"));
        assert!(!code.contains("Wrapper"));
        assert!(!code.contains("Manual"));
    }

    #[test]
    fn deep_copy_is_stable_across_reruns() {
        let base = package();
        let dir = base.path().join("controllers");
        fs::write(dir.join("zz_generated_pod_controller.rs"), CONTROLLER).unwrap();

        let step = DeepCopyGen::new("zz_generated");
        step.run(base.path(), "controllers").unwrap();
        let first = fs::read_to_string(dir.join("zz_generated_deepcopy.rs")).unwrap();
        step.run(base.path(), "controllers").unwrap();
        let second = fs::read_to_string(dir.join("zz_generated_deepcopy.rs")).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn deep_copy_skips_empty_package() {
        let base = package();

        DeepCopyGen::new("zz_generated").run(base.path(), "controllers").unwrap();

        assert!(!base.path().join("controllers/zz_generated_deepcopy.rs").exists());
    }

    #[test]
    fn deep_copy_reports_unparseable_files() {
        let base = package();
        let dir = base.path().join("controllers");
        fs::write(dir.join("zz_generated_broken.rs"), "pub struct {").unwrap();

        match DeepCopyGen::new("zz_generated").run(base.path(), "controllers") {
            Err(GeneratorError::PostProcess { step, message }) => {
                assert_eq!(step, "deepcopy");
                assert!(message.contains("zz_generated_broken.rs"));
            }
            other => panic!("Unexpected result: {:?}", other),
        }
    }

    // === PrettyPleaseFormatter tests ===

    #[test]
    fn formatter_rewrites_prefixed_files_only() {
        let base = package();
        let dir = base.path().join("controllers");
        let messy = "// Code generated by kinds-gen. DO NOT EDIT.\npub struct   Pod{pub a:i64}";
        fs::write(dir.join("zz_generated_pod.rs"), messy).unwrap();
        fs::write(dir.join("mod.rs"), "pub   mod x;").unwrap();

        PrettyPleaseFormatter::new("zz_generated")
            .run(base.path(), "controllers")
            .unwrap();

        let code = fs::read_to_string(dir.join("zz_generated_pod.rs")).unwrap();
        assert!(code.starts_with(GENERATED_HEADER));
        assert!(code.contains("pub struct Pod {\n    pub a: i64,\n}"));
        assert_eq!(fs::read_to_string(dir.join("mod.rs")).unwrap(), "pub   mod x;");
    }

    #[test]
    fn formatter_is_idempotent() {
        let base = package();
        let dir = base.path().join("controllers");
        fs::write(dir.join("zz_generated_pod_controller.rs"), CONTROLLER).unwrap();

        let step = PrettyPleaseFormatter::new("zz_generated");
        step.run(base.path(), "controllers").unwrap();
        let first = fs::read_to_string(dir.join("zz_generated_pod_controller.rs")).unwrap();
        step.run(base.path(), "controllers").unwrap();
        let second = fs::read_to_string(dir.join("zz_generated_pod_controller.rs")).unwrap();

        assert_eq!(first, second);
    }

    // === CommandStep tests ===

    #[test]
    fn command_step_rejects_empty_command() {
        match CommandStep::new("fmt", &[], false, "zz_generated") {
            Err(GeneratorError::ConfigError(message)) => assert!(message.contains("fmt")),
            other => panic!("Unexpected result: {:?}", other),
        }
    }

    #[test]
    fn command_step_reports_missing_program() {
        let base = package();
        let step = CommandStep::new(
            "fmt",
            &["kinds-gen-no-such-program".to_string()],
            false,
            "zz_generated",
        )
        .unwrap();

        match step.run(base.path(), "controllers") {
            Err(GeneratorError::Spawn { step, program, .. }) => {
                assert_eq!(step, "fmt");
                assert_eq!(program, "kinds-gen-no-such-program");
            }
            other => panic!("Unexpected result: {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn command_step_propagates_exit_status() {
        let base = package();
        let ok = CommandStep::new("ok", &["true".to_string()], false, "zz_generated").unwrap();
        let fail = CommandStep::new("fail", &["false".to_string()], false, "zz_generated").unwrap();

        assert!(ok.run(base.path(), "controllers").is_ok());
        assert!(matches!(
            fail.run(base.path(), "controllers"),
            Err(GeneratorError::PostProcess { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn command_step_runs_from_base_dir() {
        let base = package();
        let step = CommandStep::new(
            "touch",
            &["sh".to_string(), "-c".to_string(), "test -d \"$0\" && touch \"$0/ran\"".to_string()],
            false,
            "zz_generated",
        )
        .unwrap();

        step.run(base.path(), "controllers").unwrap();

        assert!(base.path().join("controllers/ran").exists());
    }

    #[cfg(unix)]
    #[test]
    fn per_file_command_runs_once_per_generated_file() {
        let base = package();
        let dir = base.path().join("controllers");
        fs::write(dir.join("zz_generated_a.rs"), "").unwrap();
        fs::write(dir.join("zz_generated_b.rs"), "").unwrap();
        fs::write(dir.join("mod.rs"), "").unwrap();
        let step = CommandStep::new(
            "mark",
            &["sh".to_string(), "-c".to_string(), "echo x >> \"$0\"".to_string()],
            true,
            "zz_generated",
        )
        .unwrap();

        step.run(base.path(), "controllers").unwrap();

        assert_eq!(fs::read_to_string(dir.join("zz_generated_a.rs")).unwrap(), "x\n");
        assert_eq!(fs::read_to_string(dir.join("zz_generated_b.rs")).unwrap(), "x\n");
        assert_eq!(fs::read_to_string(dir.join("mod.rs")).unwrap(), "");
    }
}
