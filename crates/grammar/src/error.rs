//! Errors for manifest loading and grammar installation.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Errors that can occur while loading the manifest or installing a grammar.
#[derive(Debug, Error)]
pub enum GrammarError {
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
	#[error("failed to read grammar manifest {path}: {error}")]
	ManifestRead { path: PathBuf, error: std::io::Error },
	#[error("failed to parse grammar manifest: {0}")]
	ManifestParse(#[from] toml::de::Error),
	#[error("installer command is empty")]
	EmptyInstaller,
	#[error("installer `{program}` not found: {error}")]
	InstallerNotFound { program: String, error: which::Error },
	#[error("failed to run installer `{program}`: {error}")]
	InstallerSpawn { program: String, error: std::io::Error },
	#[error("installer for '{grammar}' exited with {status}: {stderr}")]
	InstallerFailed {
		grammar: String,
		status: ExitStatus,
		/// Trimmed stderr of the installer.
		stderr: String,
	},
	#[error("installer for '{grammar}' finished without producing {path}")]
	MissingLibrary { grammar: String, path: PathBuf },
	#[error("no grammar named '{0}' in the manifest")]
	UnknownGrammar(String),
}

/// Result type for grammar operations.
pub type Result<T> = std::result::Result<T, GrammarError>;
