// Install workers run while an editor UI owns the terminal; report through tracing
#![deny(clippy::print_stderr)]

//! Tree-sitter grammar management on the local filesystem
//!
//! Implements the collaborator traits of `xeno-autoinstall` against real
//! grammar sources: a TOML manifest of git (or local) grammars, an external
//! installer command that builds one of them into a shared library, and
//! discovery of what is already installed.
//!
//! * [`manifest`]: `grammars.toml` grammar sources and language associations
//! * [`paths`]: Runtime, cache, and search directories
//! * [`installer`]: The external command that builds a grammar
//! * [`store`]: [`GrammarStore`], the `GrammarManager` implementation
//! * [`inference`]: [`FiletypeMap`], the `LanguageInference` implementation
//! * [`query`]: Injection targets declared by `injections.scm`

pub mod error;
pub mod inference;
pub mod installer;
pub mod manifest;
pub mod paths;
pub mod query;
pub mod store;

pub use error::{GrammarError, Result};
pub use inference::FiletypeMap;
pub use installer::Installer;
pub use manifest::{GrammarConfig, GrammarSource, LanguageEntry, Manifest};
pub use paths::{RuntimeLayout, grammar_library_name};
pub use query::{injected_languages, read_injection_query};
pub use store::GrammarStore;
