//! Collaborator interfaces consumed by the install coordinator and session.
//!
//! The core never touches the filesystem, the terminal, or document state
//! directly. Hosts provide these traits; `xeno-grammar` ships a filesystem
//! [`GrammarManager`] and [`LanguageInference`].

use std::collections::HashSet;
use std::rc::Rc;
use std::time::Duration;

use crate::error::InstallError;
use crate::injection::LanguageTree;
use crate::policy::DocumentId;

/// Enumerates and installs grammars.
pub trait GrammarManager {
	/// Verifies that the manager can operate at all (tools on PATH, writable
	/// directories). Called once when a session is configured.
	fn check_ready(&self) -> Result<(), String> {
		Ok(())
	}

	/// Every language the manager knows how to install.
	fn list_available(&self) -> HashSet<String>;

	/// Every language whose grammar is already installed.
	fn list_installed(&self) -> HashSet<String>;

	/// Starts installing `language`.
	fn install(&self, language: &str) -> Result<Box<dyn PendingInstall>, InstallError>;
}

/// An install that has been started but not yet observed.
pub trait PendingInstall {
	/// Blocks until the install finishes or `timeout` elapses.
	///
	/// A timed-out install is abandoned; whatever it eventually produces is
	/// discarded.
	fn wait(self: Box<Self>, timeout: Duration) -> Result<(), InstallError>;
}

/// Maps a host filetype to a grammar language.
pub trait LanguageInference {
	fn infer(&self, filetype: &str) -> Option<String>;
}

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
	Info,
	Warn,
	Error,
	Success,
}

/// Prompts and notifications shown to the user.
pub trait Interaction {
	/// Asks the user a question and returns the raw response.
	fn prompt(&self, text: &str) -> String;

	fn notify(&self, text: &str, level: Level);
}

/// Document-side effects of an activation.
pub trait DocumentHost {
	/// Attaches `doc` to the parse tree of `language`, returning the root
	/// layer when the host exposes one.
	fn attach(&mut self, doc: DocumentId, language: &str) -> Option<Rc<dyn LanguageTree>>;

	/// Switches the document to grammar-driven folding.
	fn enable_folding(&mut self, doc: DocumentId, start_unfolded: bool);

	/// Switches the document to grammar-driven indentation.
	fn enable_indent(&mut self, doc: DocumentId);

	/// Turns the host's own regex syntax display on or off.
	fn set_syntax(&mut self, doc: DocumentId, enabled: bool);
}
