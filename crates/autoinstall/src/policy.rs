//! Enable/disable policy resolution.
//!
//! Every governed module carries an `enable` and an optional `disable`
//! [`Check`]. A check is ranked by specificity:
//!
//! ```text
//! absent < boolean < per-key map < predicate
//! ```
//!
//! `enable` provides the base result. `disable` can only veto it when it is at
//! least as specific as `enable`; on equal specificity `disable` wins.
//!
//! Root, fold and indent modules are keyed by language, the syntax module is
//! keyed by filetype (see [`resolve_filetype`]).

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Identifies a document owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(pub u64);

/// Editing context a policy is evaluated against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
	/// Document the decision is made for.
	pub document: DocumentId,
	/// Filetype assigned to the document by the host, if any.
	pub filetype: Option<String>,
	/// Resolved grammar language, once known.
	pub language: Option<String>,
}

impl Context {
	pub fn new(document: DocumentId) -> Self {
		Self {
			document,
			filetype: None,
			language: None,
		}
	}

	pub fn with_filetype(mut self, filetype: impl Into<String>) -> Self {
		self.filetype = Some(filetype.into());
		self
	}

	pub fn with_language(mut self, language: impl Into<String>) -> Self {
		self.language = Some(language.into());
		self
	}
}

/// A context predicate attached to a [`Check`].
#[derive(Clone)]
pub struct Predicate(Arc<dyn Fn(&Context) -> bool + Send + Sync>);

impl Predicate {
	pub fn new(f: impl Fn(&Context) -> bool + Send + Sync + 'static) -> Self {
		Self(Arc::new(f))
	}

	pub fn eval(&self, ctx: &Context) -> bool {
		(self.0)(ctx)
	}
}

impl fmt::Debug for Predicate {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("Predicate(..)")
	}
}

/// One side of a module gate.
#[derive(Debug, Clone)]
pub enum Check {
	/// Applies to every context.
	Bool(bool),
	/// Applies to the keys marked `true`; unlisted keys are `false`.
	Map(HashMap<String, bool>),
	/// Evaluated against the full context.
	Predicate(Predicate),
	/// A configured value of an unsupported shape, holding the shape's name.
	/// Any module gated by one resolves to `true`.
	Malformed(&'static str),
}

impl Check {
	/// Builds a map check from `(key, value)` pairs.
	pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, bool)>) -> Self {
		Check::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
	}

	/// Builds a map check marking every key in `keys` as `true`.
	pub fn only<K: Into<String>>(keys: impl IntoIterator<Item = K>) -> Self {
		Check::map(keys.into_iter().map(|k| (k, true)))
	}

	pub fn predicate(f: impl Fn(&Context) -> bool + Send + Sync + 'static) -> Self {
		Check::Predicate(Predicate::new(f))
	}

	/// Evaluates this check for `key` in `ctx`.
	fn matches(&self, ctx: &Context, key: Option<&str>) -> bool {
		match self {
			Check::Bool(b) => *b,
			Check::Map(map) => key.is_some_and(|k| map.get(k).copied().unwrap_or(false)),
			Check::Predicate(p) => p.eval(ctx),
			Check::Malformed(_) => true,
		}
	}
}

/// Enable/disable gate shared by every module.
#[derive(Debug, Clone, Default)]
pub struct ModuleConfig {
	pub enable: Option<Check>,
	pub disable: Option<Check>,
}

impl ModuleConfig {
	pub fn enabled(enable: bool) -> Self {
		Self {
			enable: Some(Check::Bool(enable)),
			disable: None,
		}
	}

	/// Literal switch-off test used before a context is fully known.
	///
	/// Only `enable = false` or `disable = true` count; maps and predicates are
	/// left to [`resolve`].
	pub fn is_switched_off(&self) -> bool {
		matches!(self.enable, Some(Check::Bool(false))) || matches!(self.disable, Some(Check::Bool(true)))
	}

	fn resolve_key(&self, ctx: &Context, key: Option<&str>) -> bool {
		if matches!(self.enable, Some(Check::Malformed(_))) || matches!(self.disable, Some(Check::Malformed(_))) {
			return true;
		}

		let base = self.enable.as_ref().is_none_or(|e| e.matches(ctx, key));

		match (&self.enable, &self.disable) {
			(_, None) => base,
			(None | Some(Check::Bool(_)), Some(disable)) => base && !disable.matches(ctx, key),
			(Some(Check::Map(_)), Some(disable @ (Check::Map(_) | Check::Predicate(_)))) => {
				base && !disable.matches(ctx, key)
			}
			(Some(Check::Predicate(_)), Some(disable @ Check::Predicate(_))) => base && !disable.matches(ctx, key),
			// disable is less specific than enable
			(Some(_), Some(_)) => base,
		}
	}
}

/// Resolves a language-keyed module for `ctx`.
pub fn resolve(module: &ModuleConfig, ctx: &Context) -> bool {
	module.resolve_key(ctx, ctx.language.as_deref())
}

/// Resolves a filetype-keyed module for `ctx`.
pub fn resolve_filetype(module: &ModuleConfig, ctx: &Context) -> bool {
	module.resolve_key(ctx, ctx.filetype.as_deref())
}

#[cfg(test)]
mod tests;
