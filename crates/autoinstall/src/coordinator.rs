//! Per-language install lifecycle.
//!
//! [`InstallCoordinator::ensure_installed`] walks a fixed sequence of gates
//! (global switch, filetype, language, policy, memo, availability, installed,
//! approval) before invoking the grammar manager. The attempt memo is written
//! as `false` before any work happens, so a re-entrant call for the same
//! language (for instance from injection discovery triggered while a prompt
//! is open) short-circuits instead of starting a second attempt.
//!
//! The cache lives in a `RefCell`; no borrow is held across a prompt or an
//! install call.

use std::cell::RefCell;
use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::cache::InstallCache;
use crate::config::SessionConfig;
use crate::error::InstallError;
use crate::host::{GrammarManager, Interaction, LanguageInference, Level};
use crate::policy::{self, Context};

/// Why [`InstallCoordinator::decide`] did not produce a usable language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declined {
	/// Root module is literally switched off.
	GloballyDisabled,
	/// The document has no filetype.
	NoFiletype,
	/// No language requested and none inferable from the filetype.
	Unresolved,
	/// Root module policy denies this context.
	PolicyDenied,
	/// An earlier attempt this session left the language unusable.
	Memoized,
	/// The grammar manager cannot install this language.
	Unavailable,
	/// The user answered the approval prompt with anything but `y`.
	DeniedByUser,
	/// The install invocation failed or timed out.
	InstallFailed(InstallError),
}

/// Drives the install workflow and owns the session's [`InstallCache`].
pub struct InstallCoordinator {
	config: SessionConfig,
	cache: RefCell<InstallCache>,
	manager: Box<dyn GrammarManager>,
	inference: Box<dyn LanguageInference>,
	ui: Box<dyn Interaction>,
}

impl InstallCoordinator {
	/// Creates a coordinator and builds its cache from `manager`.
	pub fn new(
		config: SessionConfig,
		manager: Box<dyn GrammarManager>,
		inference: Box<dyn LanguageInference>,
		ui: Box<dyn Interaction>,
	) -> Self {
		let cache = InstallCache::build(manager.as_ref());
		Self {
			config,
			cache: RefCell::new(cache),
			manager,
			inference,
			ui,
		}
	}

	pub fn config(&self) -> &SessionConfig {
		&self.config
	}

	/// Memoized outcome for `language`, if attempted.
	pub fn attempt(&self, language: &str) -> Option<bool> {
		self.cache.borrow().attempt(language)
	}

	pub fn cache_snapshot(&self) -> BTreeMap<String, bool> {
		self.cache.borrow().snapshot()
	}

	/// Re-queries the grammar manager without touching the attempt memo.
	pub fn refresh(&self) {
		self.cache.borrow_mut().refresh(self.manager.as_ref());
	}

	/// Refreshes and forgets every attempt, making each language eligible
	/// for evaluation again.
	pub fn clear_cache(&self) {
		self.cache.borrow_mut().clear(self.manager.as_ref());
		info!("Cleared install attempts");
	}

	/// Resolves the language for `ctx` and returns it when its grammar is
	/// usable. Without `requested`, the language is inferred from the filetype.
	pub fn ensure_installed(&self, ctx: &Context, requested: Option<&str>) -> Option<String> {
		match self.decide(ctx, requested) {
			Ok(language) => Some(language),
			Err(reason) => {
				debug!(doc = ctx.document.0, requested, ?reason, "No grammar for context");
				None
			}
		}
	}

	/// Like [`ensure_installed`](Self::ensure_installed), reporting why no
	/// language was produced.
	pub fn decide(&self, ctx: &Context, requested: Option<&str>) -> Result<String, Declined> {
		if self.config.install.is_switched_off() {
			return Err(Declined::GloballyDisabled);
		}

		let Some(filetype) = ctx.filetype.as_deref() else {
			return Err(Declined::NoFiletype);
		};

		let language = match requested {
			Some(lang) => lang.to_string(),
			None => self.inference.infer(filetype).ok_or(Declined::Unresolved)?,
		};

		let ctx = ctx.clone().with_language(language.as_str());
		if !policy::resolve(&self.config.install, &ctx) {
			return Err(Declined::PolicyDenied);
		}

		if let Some(usable) = self.attempt(&language) {
			return if usable { Ok(language) } else { Err(Declined::Memoized) };
		}

		self.cache.borrow_mut().mark(&language, false);

		let (available, installed) = {
			let cache = self.cache.borrow();
			(cache.is_available(&language), cache.is_installed(&language))
		};

		if !available {
			return Err(Declined::Unavailable);
		}

		if installed {
			self.finish(&language);
			return Ok(language);
		}

		if !self.config.skip_approval && !self.approved(&language) {
			self.ui
				.notify(&format!("Skipped installing grammar for '{language}'"), Level::Info);
			return Err(Declined::DeniedByUser);
		}

		self.ui.notify(&format!("Installing grammar for '{language}'"), Level::Info);
		info!(language = %language, timeout_ms = self.config.timeout.as_millis() as u64, "Installing grammar");

		let result = self
			.manager
			.install(&language)
			.and_then(|pending| pending.wait(self.config.timeout));

		if let Err(e) = result {
			warn!(language = %language, error = %e, "Grammar install failed");
			self.ui.notify(
				&format!("Failed to install grammar for '{language}': {e}"),
				Level::Error,
			);
			return Err(Declined::InstallFailed(e));
		}

		self.finish(&language);
		info!(language = %language, "Installed grammar");
		self.ui
			.notify(&format!("Installed grammar for '{language}'"), Level::Success);
		Ok(language)
	}

	fn approved(&self, language: &str) -> bool {
		let response = self.ui.prompt(&format!("Install grammar for '{language}'? [y/N] "));
		response.trim().eq_ignore_ascii_case("y")
	}

	fn finish(&self, language: &str) {
		let mut cache = self.cache.borrow_mut();
		cache.mark(language, true);
		cache.refresh(self.manager.as_ref());
	}
}
