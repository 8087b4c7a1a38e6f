//! External grammar installer.
//!
//! Building a grammar is left to an external program, `tree-sitter build` by
//! default. The manifest's `[installer]` table holds its argument vector; each
//! argument may contain placeholders filled in per grammar:
//!
//! | Placeholder | Value |
//! |---|---|
//! | `{grammar}` | grammar name |
//! | `{source}` | local source path, or the grammar's checkout under the sources directory |
//! | `{remote}` | git remote (empty for local sources) |
//! | `{rev}` | git revision (empty for local sources) |
//! | `{output}` | library path the installer must produce |
//! | `{lib_dir}` | directory holding installed libraries |
//!
//! ```toml
//! [installer]
//! command = ["my-grammar-build", "{remote}", "{rev}", "{output}"]
//! ```

use std::path::PathBuf;
use std::process::{Command, Stdio};

use serde::Deserialize;
use tracing::debug;

use crate::error::{GrammarError, Result};
use crate::manifest::{GrammarConfig, GrammarSource};
use crate::paths::RuntimeLayout;

/// Command run to install one grammar.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Installer {
	/// Program followed by its arguments, with placeholders.
	pub command: Vec<String>,
}

impl Default for Installer {
	fn default() -> Self {
		Self {
			command: ["tree-sitter", "build", "--output", "{output}", "{source}"]
				.map(String::from)
				.to_vec(),
		}
	}
}

impl Installer {
	pub fn program(&self) -> Result<&str> {
		self.command.first().map(String::as_str).ok_or(GrammarError::EmptyInstaller)
	}

	/// Resolves the installer program on `PATH`.
	pub fn locate(&self) -> Result<PathBuf> {
		let program = self.program()?;
		which::which(program).map_err(|error| GrammarError::InstallerNotFound {
			program: program.to_string(),
			error,
		})
	}

	/// The program and expanded arguments for `grammar`.
	pub fn invocation(&self, grammar: &GrammarConfig, layout: &RuntimeLayout) -> Result<(String, Vec<String>)> {
		let program = self.program()?.to_string();

		let (source, remote, rev) = match &grammar.source {
			GrammarSource::Local { path } => (path.clone(), "", ""),
			GrammarSource::Git {
				remote,
				revision,
				subpath,
			} => {
				let checkout = layout.sources_dir.join(&grammar.grammar_id);
				let source = match subpath {
					Some(sub) => checkout.join(sub),
					None => checkout,
				};
				(source, remote.as_str(), revision.as_str())
			}
		};
		let source = source.display().to_string();
		let output = layout.library_path(&grammar.grammar_id).display().to_string();
		let lib_dir = layout.lib_dir.display().to_string();

		let args = self.command[1..]
			.iter()
			.map(|arg| {
				arg.replace("{grammar}", &grammar.grammar_id)
					.replace("{source}", &source)
					.replace("{remote}", remote)
					.replace("{rev}", rev)
					.replace("{output}", &output)
					.replace("{lib_dir}", &lib_dir)
			})
			.collect();

		Ok((program, args))
	}

	/// Runs the installer for `grammar` and returns the produced library.
	///
	/// # Errors
	///
	/// Fails if the program cannot be started, exits unsuccessfully, or
	/// exits without writing the library.
	pub fn run(&self, grammar: &GrammarConfig, layout: &RuntimeLayout) -> Result<PathBuf> {
		std::fs::create_dir_all(&layout.lib_dir)?;
		let (program, args) = self.invocation(grammar, layout)?;
		debug!(grammar = %grammar.grammar_id, %program, ?args, "Running grammar installer");

		let output = Command::new(&program)
			.args(&args)
			.stdin(Stdio::null())
			.output()
			.map_err(|error| GrammarError::InstallerSpawn {
				program: program.clone(),
				error,
			})?;

		if !output.status.success() {
			return Err(GrammarError::InstallerFailed {
				grammar: grammar.grammar_id.clone(),
				status: output.status,
				stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
			});
		}

		let library = layout.library_path(&grammar.grammar_id);
		if !library.is_file() {
			return Err(GrammarError::MissingLibrary {
				grammar: grammar.grammar_id.clone(),
				path: library,
			});
		}
		Ok(library)
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::manifest::Manifest;

	fn manifest() -> Manifest {
		Manifest::parse(
			r#"
			[[grammar]]
			name = "markdown-inline"
			source = { git = "https://example.com/tree-sitter-markdown", rev = "split_parser", subpath = "inline" }

			[[grammar]]
			name = "demo"
			source = { path = "/src/demo" }
			"#,
		)
		.unwrap()
	}

	#[test]
	fn default_runs_tree_sitter_build() {
		let layout = RuntimeLayout::rooted("/rt");
		let manifest = manifest();
		let (program, args) = Installer::default()
			.invocation(manifest.grammar("demo").unwrap(), &layout)
			.unwrap();

		assert_eq!(program, "tree-sitter");
		assert_eq!(
			args,
			vec![
				"build".to_string(),
				"--output".into(),
				layout.library_path("demo").display().to_string(),
				"/src/demo".into(),
			]
		);
	}

	#[test]
	fn git_placeholders_expand_to_checkout() {
		let layout = RuntimeLayout::rooted("/rt");
		let manifest = manifest();
		let installer = Installer {
			command: ["fetch-and-build", "{grammar}", "{remote}@{rev}", "{source}", "{lib_dir}"]
				.map(String::from)
				.to_vec(),
		};
		let (_, args) = installer
			.invocation(manifest.grammar("markdown-inline").unwrap(), &layout)
			.unwrap();

		assert_eq!(
			args,
			vec![
				"markdown-inline".to_string(),
				"https://example.com/tree-sitter-markdown@split_parser".into(),
				layout.sources_dir.join("markdown-inline").join("inline").display().to_string(),
				layout.lib_dir.display().to_string(),
			]
		);
	}

	#[test]
	fn empty_command_is_rejected() {
		let installer = Installer { command: Vec::new() };
		assert!(matches!(installer.locate(), Err(GrammarError::EmptyInstaller)));
		let manifest = manifest();
		assert!(matches!(
			installer.invocation(manifest.grammar("demo").unwrap(), &RuntimeLayout::rooted("/rt")),
			Err(GrammarError::EmptyInstaller)
		));
	}

	#[test]
	fn missing_program_is_reported() {
		let installer = Installer {
			command: vec!["xeno-grammar-no-such-installer".into()],
		};
		assert!(matches!(
			installer.locate(),
			Err(GrammarError::InstallerNotFound { ref program, .. }) if program == "xeno-grammar-no-such-installer"
		));
	}
}
