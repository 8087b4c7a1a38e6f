//! Filetype to grammar language inference.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use xeno_autoinstall::LanguageInference;

use crate::manifest::Manifest;

/// Filetypes whose grammar goes by another name.
const ALIASES: &[(&str, &str)] = &[
	("sh", "bash"),
	("zsh", "bash"),
	("javascriptreact", "javascript"),
	("typescriptreact", "tsx"),
	("md", "markdown"),
	("py", "python"),
	("rs", "rust"),
	("jsonc", "json"),
];

/// [`LanguageInference`] backed by manifest associations.
///
/// Lookup order: manifest `filetypes`, the built-in alias table, then the
/// filetype itself when a grammar of that name exists.
#[derive(Debug, Clone, Default)]
pub struct FiletypeMap {
	by_filetype: HashMap<String, String>,
	by_extension: HashMap<String, String>,
	grammars: HashSet<String>,
}

impl FiletypeMap {
	pub fn from_manifest(manifest: &Manifest) -> Self {
		let mut map = Self {
			grammars: manifest.grammars.iter().map(|g| g.grammar_id.clone()).collect(),
			..Default::default()
		};

		for language in &manifest.languages {
			let grammar = language.grammar_name().to_string();
			for filetype in &language.filetypes {
				map.by_filetype.insert(filetype.clone(), grammar.clone());
			}
			for extension in &language.extensions {
				map.by_extension.insert(extension.clone(), language.name.clone());
			}
		}

		map
	}

	/// Host filetype for `path`, from its extension.
	///
	/// Extensions listed in the manifest yield the owning language's name;
	/// anything else yields the bare extension.
	pub fn filetype_for_path(&self, path: &Path) -> Option<String> {
		let extension = path.extension()?.to_str()?;
		Some(
			self.by_extension
				.get(extension)
				.cloned()
				.unwrap_or_else(|| extension.to_string()),
		)
	}
}

impl LanguageInference for FiletypeMap {
	fn infer(&self, filetype: &str) -> Option<String> {
		if filetype.is_empty() {
			return None;
		}
		if let Some(grammar) = self.by_filetype.get(filetype) {
			return Some(grammar.clone());
		}
		if let Some((_, grammar)) = ALIASES.iter().find(|(alias, _)| *alias == filetype) {
			return Some(grammar.to_string());
		}
		self.grammars.contains(filetype).then(|| filetype.to_string())
	}
}
