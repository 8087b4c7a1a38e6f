//! Runtime directory layout.
//!
//! Git grammar checkouts belong under the cache directory since they can be
//! re-fetched at any time; installed libraries live in the runtime directory
//! (`~/.local/share/xeno/grammars`, or `$XENO_RUNTIME/grammars`). Helix's
//! runtime directories are searched as a fallback for users who already have
//! grammars built there.

use std::path::{Path, PathBuf};

/// Where grammar sources, libraries, and queries are read and written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeLayout {
	/// Git checkouts, one directory per grammar, handed to the installer as `{source}`.
	pub sources_dir: PathBuf,
	/// Destination for installed libraries.
	pub lib_dir: PathBuf,
	/// Directories searched for installed libraries, `lib_dir` first.
	pub grammar_dirs: Vec<PathBuf>,
	/// Directories searched for `<language>/<query>.scm` files.
	pub query_dirs: Vec<PathBuf>,
}

impl RuntimeLayout {
	/// Layout derived from the environment.
	pub fn detect() -> Self {
		let runtime = runtime_dir();
		let lib_dir = runtime.join("grammars");
		let sources_dir = cache_dir().unwrap_or_else(|| runtime.clone()).join("grammars").join("sources");

		let mut grammar_dirs = vec![lib_dir.clone()];
		let mut query_dirs = vec![runtime.join("queries")];
		for helix in helix_runtime_dirs() {
			grammar_dirs.push(helix.join("grammars"));
			query_dirs.push(helix.join("queries"));
		}

		Self {
			sources_dir,
			lib_dir,
			grammar_dirs,
			query_dirs,
		}
	}

	/// Self-contained layout under `root`, ignoring the environment.
	pub fn rooted(root: impl AsRef<Path>) -> Self {
		let root = root.as_ref();
		let lib_dir = root.join("grammars");
		Self {
			sources_dir: root.join("sources"),
			grammar_dirs: vec![lib_dir.clone()],
			lib_dir,
			query_dirs: vec![root.join("queries")],
		}
	}

	/// Path of the library for `grammar` in [`lib_dir`](Self::lib_dir).
	pub fn library_path(&self, grammar: &str) -> PathBuf {
		self.lib_dir.join(grammar_library_name(grammar))
	}

	/// First existing library for `grammar` across the search directories.
	pub fn find_library(&self, grammar: &str) -> Option<PathBuf> {
		let name = grammar_library_name(grammar);
		self.grammar_dirs.iter().map(|dir| dir.join(&name)).find(|path| path.is_file())
	}
}

/// Returns the primary runtime directory for Xeno: `~/.local/share/xeno/`.
pub fn runtime_dir() -> PathBuf {
	if let Ok(runtime) = std::env::var("XENO_RUNTIME") {
		return PathBuf::from(runtime);
	}

	data_local_dir().map(|d| d.join("xeno")).unwrap_or_else(|| PathBuf::from("."))
}

/// Returns the cache directory: `~/.cache/xeno/`.
pub fn cache_dir() -> Option<PathBuf> {
	#[cfg(unix)]
	{
		std::env::var_os("XDG_CACHE_HOME")
			.map(PathBuf::from)
			.or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".cache")))
			.map(|p| p.join("xeno"))
	}
	#[cfg(windows)]
	{
		std::env::var_os("LOCALAPPDATA").map(|p| PathBuf::from(p).join("xeno").join("cache"))
	}
	#[cfg(not(any(unix, windows)))]
	{
		None
	}
}

/// Returns the platform-specific library filename for a grammar.
pub fn grammar_library_name(name: &str) -> String {
	let safe_name = name.replace('-', "_");
	if cfg!(target_os = "windows") {
		format!("{safe_name}.{}", library_extension())
	} else {
		format!("lib{safe_name}.{}", library_extension())
	}
}

/// Inverse of [`grammar_library_name`], yielding the library's safe name.
pub(crate) fn grammar_name_from_library(file_name: &str) -> Option<&str> {
	let stem = file_name.strip_suffix(library_extension())?.strip_suffix('.')?;
	let name = if cfg!(target_os = "windows") {
		stem
	} else {
		stem.strip_prefix("lib")?
	};
	(!name.is_empty()).then_some(name)
}

/// Get the library file extension for the current platform.
pub fn library_extension() -> &'static str {
	if cfg!(target_os = "windows") {
		"dll"
	} else if cfg!(target_os = "macos") {
		"dylib"
	} else {
		"so"
	}
}

/// Returns the platform-specific local data directory.
fn data_local_dir() -> Option<PathBuf> {
	#[cfg(unix)]
	{
		std::env::var_os("XDG_DATA_HOME")
			.map(PathBuf::from)
			.or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".local").join("share")))
	}
	#[cfg(windows)]
	{
		std::env::var_os("LOCALAPPDATA").map(PathBuf::from)
	}
	#[cfg(not(any(unix, windows)))]
	{
		None
	}
}

/// Returns Helix runtime directories for fallback grammar/query lookup.
fn helix_runtime_dirs() -> Vec<PathBuf> {
	let mut dirs = Vec::new();

	if let Ok(runtime) = std::env::var("HELIX_RUNTIME") {
		dirs.push(PathBuf::from(runtime));
	}

	#[cfg(unix)]
	if let Some(config) = std::env::var_os("XDG_CONFIG_HOME")
		.map(PathBuf::from)
		.or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
	{
		let helix_runtime = config.join("helix").join("runtime");
		if helix_runtime.exists() {
			dirs.push(helix_runtime);
		}
	}

	dirs
}
