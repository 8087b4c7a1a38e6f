//! Filesystem-backed [`GrammarManager`].
//!
//! Installs run the manifest's [`Installer`](crate::Installer) on a worker
//! thread that reports back over a channel. The returned [`PendingInstall`]
//! waits on that channel with a timeout; a worker that outlives its wait
//! keeps running and its result is dropped with the receiver.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

use tracing::{info, warn};
use xeno_autoinstall::{GrammarManager, InstallError, PendingInstall};

use crate::error::{GrammarError, Result};
use crate::manifest::Manifest;
use crate::paths::{RuntimeLayout, grammar_name_from_library};

/// Grammars from a [`Manifest`], installed into a [`RuntimeLayout`].
#[derive(Debug, Clone)]
pub struct GrammarStore {
	manifest: Arc<Manifest>,
	layout: Arc<RuntimeLayout>,
}

impl GrammarStore {
	pub fn new(manifest: Manifest, layout: RuntimeLayout) -> Self {
		Self {
			manifest: Arc::new(manifest),
			layout: Arc::new(layout),
		}
	}

	pub fn manifest(&self) -> &Manifest {
		&self.manifest
	}

	pub fn layout(&self) -> &RuntimeLayout {
		&self.layout
	}

	/// Safe names of every library present in the search directories.
	fn scan_libraries(&self) -> HashSet<String> {
		let mut found = HashSet::new();
		for dir in &self.layout.grammar_dirs {
			let entries = match fs::read_dir(dir) {
				Ok(entries) => entries,
				Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
				Err(e) => {
					warn!(dir = %dir.display(), error = %e, "Failed to list grammar directory");
					continue;
				}
			};
			for entry in entries.flatten() {
				if let Some(name) = entry.file_name().to_str().and_then(grammar_name_from_library) {
					found.insert(name.to_string());
				}
			}
		}
		found
	}
}

impl GrammarManager for GrammarStore {
	fn check_ready(&self) -> std::result::Result<(), String> {
		self.manifest.installer.locate().map_err(|e| e.to_string())?;
		fs::create_dir_all(&self.layout.lib_dir)
			.map_err(|e| format!("cannot create {}: {e}", self.layout.lib_dir.display()))
	}

	fn list_available(&self) -> HashSet<String> {
		self.manifest.grammars.iter().map(|g| g.grammar_id.clone()).collect()
	}

	fn list_installed(&self) -> HashSet<String> {
		let mut libraries = self.scan_libraries();
		let mut installed = HashSet::new();
		for grammar in &self.manifest.grammars {
			if libraries.remove(&grammar.grammar_id.replace('-', "_")) {
				installed.insert(grammar.grammar_id.clone());
			}
		}
		installed.extend(libraries);
		installed
	}

	fn install(&self, language: &str) -> std::result::Result<Box<dyn PendingInstall>, InstallError> {
		let grammar = self
			.manifest
			.grammar(language)
			.cloned()
			.ok_or_else(|| InstallError::Failed(GrammarError::UnknownGrammar(language.to_string()).to_string()))?;
		let manifest = self.manifest.clone();
		let layout = self.layout.clone();
		let (tx, rx) = mpsc::channel();

		thread::Builder::new()
			.name(format!("grammar-install-{}", grammar.grammar_id))
			.spawn(move || {
				let result = manifest.installer.run(&grammar, &layout);
				match &result {
					Ok(library) => info!(grammar = %grammar.grammar_id, library = %library.display(), "Grammar install finished"),
					Err(e) => warn!(grammar = %grammar.grammar_id, error = %e, "Grammar install failed"),
				}
				let _ = tx.send(result);
			})
			.map_err(|e| InstallError::Failed(format!("cannot spawn install worker: {e}")))?;

		Ok(Box::new(ThreadedInstall {
			language: language.to_string(),
			rx,
		}))
	}
}

/// Handle to an install running on a worker thread.
struct ThreadedInstall {
	language: String,
	rx: mpsc::Receiver<Result<PathBuf>>,
}

impl PendingInstall for ThreadedInstall {
	fn wait(self: Box<Self>, timeout: Duration) -> std::result::Result<(), InstallError> {
		match self.rx.recv_timeout(timeout) {
			Ok(Ok(_)) => Ok(()),
			Ok(Err(e)) => Err(InstallError::Failed(e.to_string())),
			Err(mpsc::RecvTimeoutError::Timeout) => {
				warn!(grammar = %self.language, timeout_ms = timeout.as_millis() as u64, "Abandoning grammar install");
				Err(InstallError::Timeout(timeout))
			}
			Err(mpsc::RecvTimeoutError::Disconnected) => {
				Err(InstallError::Failed("install worker exited without reporting".into()))
			}
		}
	}
}
