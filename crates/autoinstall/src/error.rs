//! Error types for configuration, setup, and install invocations.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when loading session configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error parsing TOML syntax.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// An unknown key was specified in config.
	#[error("unknown option: {key}")]
	UnknownOption {
		/// Dotted path of the unrecognized key.
		key: String,
	},

	/// A scalar option has the wrong type.
	#[error("type mismatch for option '{option}': expected {expected}, got {got}")]
	TypeMismatch {
		/// Dotted path of the option.
		option: String,
		/// The expected type name.
		expected: &'static str,
		/// The actual type name.
		got: &'static str,
	},
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Fatal errors raised while configuring a session.
#[derive(Debug, Error)]
pub enum SetupError {
	/// A required collaborator was not supplied.
	#[error("required collaborator missing: {0}")]
	MissingCollaborator(&'static str),

	/// The grammar manager reported that it cannot operate.
	#[error("grammar manager unavailable: {0}")]
	ManagerUnavailable(String),
}

/// Outcome of a failed install invocation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InstallError {
	/// The install did not finish within the configured timeout.
	#[error("install timed out after {}ms", .0.as_millis())]
	Timeout(Duration),

	/// The grammar manager reported a failure.
	#[error("install failed: {0}")]
	Failed(String),
}
