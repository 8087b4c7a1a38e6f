//! Per-session install state.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::host::GrammarManager;

/// Availability, installation, and attempt memo per language.
///
/// `attempt` is a tri-state by absence: no entry means the language has not
/// been looked at this session, `false` means it was looked at and is not
/// usable, `true` means it is usable. An entry is never re-evaluated until
/// [`InstallCache::clear`].
#[derive(Debug, Default)]
pub struct InstallCache {
	available: HashMap<String, bool>,
	installed: HashMap<String, bool>,
	attempt: HashMap<String, bool>,
}

impl InstallCache {
	/// Builds the cache, seeding `attempt` from the installed set so that
	/// grammars already on disk never prompt.
	pub fn build(manager: &dyn GrammarManager) -> Self {
		let mut cache = Self::default();
		cache.refresh(manager);
		cache.attempt = cache.installed.clone();
		cache
	}

	/// Re-queries the manager. `attempt` is left untouched.
	pub fn refresh(&mut self, manager: &dyn GrammarManager) {
		self.available = manager.list_available().into_iter().map(|l| (l, true)).collect();
		self.installed = manager.list_installed().into_iter().map(|l| (l, true)).collect();
		debug!(
			available = self.available.len(),
			installed = self.installed.len(),
			"Refreshed install cache"
		);
	}

	/// Refreshes, then forgets every attempt.
	pub fn clear(&mut self, manager: &dyn GrammarManager) {
		self.refresh(manager);
		self.attempt.clear();
	}

	pub fn is_available(&self, language: &str) -> bool {
		self.available.get(language).copied().unwrap_or(false)
	}

	pub fn is_installed(&self, language: &str) -> bool {
		self.installed.get(language).copied().unwrap_or(false)
	}

	/// Memoized outcome for `language`, if it was attempted this session.
	pub fn attempt(&self, language: &str) -> Option<bool> {
		self.attempt.get(language).copied()
	}

	pub(crate) fn mark(&mut self, language: &str, usable: bool) {
		self.attempt.insert(language.to_string(), usable);
	}

	/// Sorted copy of the attempt memo.
	pub fn snapshot(&self) -> BTreeMap<String, bool> {
		self.attempt.iter().map(|(k, v)| (k.clone(), *v)).collect()
	}
}
