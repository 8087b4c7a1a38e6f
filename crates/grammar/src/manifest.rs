//! Grammar manifest (`grammars.toml`).
//!
//! ```toml
//! [installer]
//! command = ["tree-sitter", "build", "--output", "{output}", "{source}"]
//!
//! [[grammar]]
//! name = "rust"
//! source = { git = "https://github.com/tree-sitter/tree-sitter-rust", rev = "master" }
//!
//! [[language]]
//! name = "rust"
//! extensions = ["rs"]
//! ```
//!
//! `[[grammar]]` entries say where a grammar's sources come from;
//! `[[language]]` entries map host filetypes and file extensions onto them.
//! The optional `[installer]` table names the external command that builds a
//! grammar (see [`Installer`]).

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{GrammarError, Result};
use crate::installer::Installer;

/// Manifest compiled into the binary.
const GRAMMARS_TOML: &str = include_str!("../grammars.toml");

/// A grammar and where to get its sources.
#[derive(Debug, Clone, Deserialize)]
pub struct GrammarConfig {
	/// The grammar name (used for the output library name).
	#[serde(rename = "name")]
	pub grammar_id: String,
	/// The source location for the grammar.
	pub source: GrammarSource,
}

/// Source location for a grammar.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum GrammarSource {
	/// A local checkout. Relative paths are resolved against the manifest's directory.
	Local { path: PathBuf },
	/// A git repository containing the grammar.
	Git {
		#[serde(rename = "git")]
		remote: String,
		#[serde(rename = "rev")]
		revision: String,
		/// Optional subdirectory within the repository.
		subpath: Option<String>,
	},
}

/// Filetype and extension associations for a language.
#[derive(Debug, Clone, Deserialize)]
pub struct LanguageEntry {
	pub name: String,
	/// Grammar used for this language, when it differs from `name`.
	#[serde(default)]
	pub grammar: Option<String>,
	/// Host filetypes that select this language.
	#[serde(default)]
	pub filetypes: Vec<String>,
	/// File extensions (without the dot) that select this language.
	#[serde(default)]
	pub extensions: Vec<String>,
}

impl LanguageEntry {
	pub fn grammar_name(&self) -> &str {
		self.grammar.as_deref().unwrap_or(&self.name)
	}
}

/// Parsed `grammars.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
	#[serde(default)]
	pub installer: Installer,
	#[serde(default, rename = "grammar")]
	pub grammars: Vec<GrammarConfig>,
	#[serde(default, rename = "language")]
	pub languages: Vec<LanguageEntry>,
}

impl Manifest {
	/// The manifest shipped with this crate.
	pub fn embedded() -> Result<Self> {
		Self::parse(GRAMMARS_TOML)
	}

	pub fn parse(input: &str) -> Result<Self> {
		Ok(toml::from_str(input)?)
	}

	/// Loads a manifest file, resolving relative local sources against its directory.
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let content = std::fs::read_to_string(path).map_err(|error| GrammarError::ManifestRead {
			path: path.to_path_buf(),
			error,
		})?;
		let mut manifest = Self::parse(&content)?;

		if let Some(base) = path.parent() {
			for grammar in &mut manifest.grammars {
				if let GrammarSource::Local { path: local } = &mut grammar.source
					&& local.is_relative()
				{
					*local = base.join(&*local);
				}
			}
		}

		Ok(manifest)
	}

	pub fn grammar(&self, name: &str) -> Option<&GrammarConfig> {
		self.grammars.iter().find(|g| g.grammar_id == name)
	}
}
