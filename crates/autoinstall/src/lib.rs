// Prompts and notifications go through `Interaction`, diagnostics through tracing
#![deny(clippy::print_stderr)]

//! Grammar auto-install for editor sessions
//!
//! When a document gets a filetype, the session makes sure a grammar for its
//! language is installed (asking the user first unless configured otherwise),
//! attaches the document, and walks injected regions so that embedded
//! languages get the same treatment.
//!
//! # Architecture
//!
//! * [`policy`]: Enable/disable resolution for the governed modules
//! * [`config`]: Session options, defaults, and TOML loading
//! * [`cache`]: Per-session availability, installed, and attempt memo
//! * [`coordinator`]: The per-language install workflow
//! * [`injection`]: Discovery of injected languages in layer trees
//! * [`session`]: Setup and the activation entry point
//! * [`host`]: Collaborator traits implemented by the embedding editor
//!
//! Everything here is single-threaded; sessions are `!Send` and shared state
//! lives in `Rc`/`RefCell`.

pub mod cache;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod host;
pub mod injection;
pub mod policy;
pub mod session;

#[cfg(test)]
mod testing;

pub use config::{DEFAULT_TIMEOUT, FoldConfig, FoldOptions, ModuleOptions, SessionConfig, SessionOptions};
pub use coordinator::{Declined, InstallCoordinator};
pub use error::{ConfigError, InstallError, SetupError};
pub use host::{DocumentHost, GrammarManager, Interaction, LanguageInference, Level, PendingInstall};
pub use injection::{InjectionLayer, InjectionWalker, LanguageTree, TreeId};
pub use policy::{Check, Context, DocumentId, ModuleConfig, Predicate};
pub use session::{Session, SessionBuilder};
