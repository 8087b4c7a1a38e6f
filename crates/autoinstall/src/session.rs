//! Session setup and the activation entry point.

use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::{debug, info};

use crate::config::{SessionConfig, SessionOptions};
use crate::coordinator::InstallCoordinator;
use crate::error::SetupError;
use crate::host::{DocumentHost, GrammarManager, Interaction, LanguageInference};
use crate::injection::InjectionWalker;
use crate::policy::{self, Context, DocumentId};

/// Collects collaborators for [`Session`].
#[derive(Default)]
pub struct SessionBuilder {
	options: SessionOptions,
	manager: Option<Box<dyn GrammarManager>>,
	inference: Option<Box<dyn LanguageInference>>,
	interaction: Option<Box<dyn Interaction>>,
}

impl SessionBuilder {
	pub fn new(options: SessionOptions) -> Self {
		Self {
			options,
			..Default::default()
		}
	}

	pub fn grammar_manager(mut self, manager: impl GrammarManager + 'static) -> Self {
		self.manager = Some(Box::new(manager));
		self
	}

	pub fn inference(mut self, inference: impl LanguageInference + 'static) -> Self {
		self.inference = Some(Box::new(inference));
		self
	}

	pub fn interaction(mut self, interaction: impl Interaction + 'static) -> Self {
		self.interaction = Some(Box::new(interaction));
		self
	}

	/// Validates collaborators, merges options over the defaults, and builds
	/// the initial install cache.
	///
	/// # Errors
	///
	/// Returns [`SetupError::MissingCollaborator`] if a collaborator was not
	/// supplied, or [`SetupError::ManagerUnavailable`] if the grammar manager's
	/// readiness probe fails.
	pub fn build(self) -> Result<Session, SetupError> {
		let manager = self.manager.ok_or(SetupError::MissingCollaborator("grammar manager"))?;
		let inference = self
			.inference
			.ok_or(SetupError::MissingCollaborator("language inference"))?;
		let interaction = self
			.interaction
			.ok_or(SetupError::MissingCollaborator("user interaction"))?;

		manager.check_ready().map_err(SetupError::ManagerUnavailable)?;

		let config = SessionConfig::from_options(self.options);
		let coordinator = Rc::new(InstallCoordinator::new(config, manager, inference, interaction));
		info!(
			installed = coordinator.cache_snapshot().len(),
			"Grammar auto-install session configured"
		);

		Ok(Session {
			walker: InjectionWalker::new(coordinator.clone()),
			coordinator,
		})
	}
}

/// One auto-install session: configuration, install cache, and walker.
pub struct Session {
	coordinator: Rc<InstallCoordinator>,
	walker: InjectionWalker,
}

impl Session {
	pub fn builder(options: SessionOptions) -> SessionBuilder {
		SessionBuilder::new(options)
	}

	/// Configures a session from its options and collaborators.
	pub fn configure(
		options: SessionOptions,
		manager: impl GrammarManager + 'static,
		inference: impl LanguageInference + 'static,
		interaction: impl Interaction + 'static,
	) -> Result<Self, SetupError> {
		SessionBuilder::new(options)
			.grammar_manager(manager)
			.inference(inference)
			.interaction(interaction)
			.build()
	}

	pub fn config(&self) -> &SessionConfig {
		self.coordinator.config()
	}

	pub fn coordinator(&self) -> &Rc<InstallCoordinator> {
		&self.coordinator
	}

	pub fn walker(&self) -> &InjectionWalker {
		&self.walker
	}

	/// Handles a filetype assignment for `doc`.
	///
	/// Ensures the document's grammar, attaches the document to its tree,
	/// walks injections, and applies the fold, indent, and syntax modules.
	/// Returns the language the document was attached to, or `None` when
	/// nothing further should happen for this document.
	pub fn activate(&self, host: &mut dyn DocumentHost, doc: DocumentId, filetype: Option<&str>) -> Option<String> {
		let mut ctx = Context::new(doc);
		if let Some(filetype) = filetype {
			ctx = ctx.with_filetype(filetype);
		}

		let language = self.coordinator.ensure_installed(&ctx, None)?;
		let ctx = ctx.with_language(language.as_str());

		let tree = host.attach(doc, &language);
		if tree.is_none() {
			debug!(doc = doc.0, language = %language, "Host exposed no language tree");
		}
		self.walker.discover(&ctx, tree.as_ref());

		let config = self.coordinator.config();
		if policy::resolve(&config.fold.module, &ctx) {
			host.enable_folding(doc, config.fold.start_unfolded);
		}
		if policy::resolve(&config.indent, &ctx) {
			host.enable_indent(doc);
		}
		host.set_syntax(doc, policy::resolve_filetype(&config.syntax, &ctx));

		info!(doc = doc.0, language = %language, "Activated grammar");
		Some(language)
	}

	/// Forgets every install attempt so each language is evaluated again.
	pub fn clear_cache(&self) {
		self.coordinator.clear_cache();
	}

	pub fn cache_snapshot(&self) -> BTreeMap<String, bool> {
		self.coordinator.cache_snapshot()
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use pretty_assertions::assert_eq;

	use super::*;
	use crate::injection::{InjectionLayer, LanguageTree};
	use crate::policy::Check;
	use crate::testing::{FakeInference, FakeManager, ScriptedUi};

	#[derive(Debug, Clone, PartialEq, Eq)]
	enum Effect {
		Attach(String),
		Fold { start_unfolded: bool },
		Indent,
		Syntax(bool),
	}

	#[derive(Default)]
	struct RecordingHost {
		trees: HashMap<String, Rc<InjectionLayer>>,
		effects: Vec<Effect>,
	}

	impl DocumentHost for RecordingHost {
		fn attach(&mut self, _doc: DocumentId, language: &str) -> Option<Rc<dyn LanguageTree>> {
			self.effects.push(Effect::Attach(language.to_string()));
			self.trees.get(language).map(|t| t.clone() as Rc<dyn LanguageTree>)
		}

		fn enable_folding(&mut self, _doc: DocumentId, start_unfolded: bool) {
			self.effects.push(Effect::Fold { start_unfolded });
		}

		fn enable_indent(&mut self, _doc: DocumentId) {
			self.effects.push(Effect::Indent);
		}

		fn set_syntax(&mut self, _doc: DocumentId, enabled: bool) {
			self.effects.push(Effect::Syntax(enabled));
		}
	}

	fn session(options: SessionOptions, manager: &FakeManager, ui: &ScriptedUi) -> Session {
		Session::configure(options, manager.clone(), FakeInference::default(), ui.clone()).unwrap()
	}

	#[test]
	fn missing_collaborator_aborts_setup() {
		let result = Session::builder(SessionOptions::default())
			.grammar_manager(FakeManager::default())
			.interaction(ScriptedUi::default())
			.build();
		assert!(matches!(result, Err(SetupError::MissingCollaborator("language inference"))));
	}

	#[test]
	fn unready_manager_aborts_setup() {
		let manager = FakeManager::default();
		manager.set_unready("installer `tree-sitter` not found");
		let result = Session::configure(SessionOptions::default(), manager, FakeInference::default(), ScriptedUi::default());
		assert!(matches!(result, Err(SetupError::ManagerUnavailable(ref m)) if m.contains("tree-sitter")));
	}

	#[test]
	fn activation_applies_default_modules() {
		let manager = FakeManager::new(["lua"], ["lua"]);
		let ui = ScriptedUi::default();
		let session = session(SessionOptions::default(), &manager, &ui);
		let mut host = RecordingHost::default();

		assert_eq!(session.activate(&mut host, DocumentId(1), Some("lua")), Some("lua".to_string()));
		assert_eq!(
			host.effects,
			vec![
				Effect::Attach("lua".into()),
				Effect::Fold { start_unfolded: false },
				Effect::Syntax(false),
			]
		);
	}

	#[test]
	fn activation_honors_module_options() {
		let manager = FakeManager::new(["markdown", "lua"], ["markdown"]);
		let ui = ScriptedUi::default();
		let mut options = SessionOptions::default();
		options.skip_approval = Some(true);
		options.fold.module.disable = Some(Check::only(["markdown"]));
		options.indent.enable = Some(Check::Bool(true));
		options.syntax.enable = Some(Check::only(["markdown"]));
		let session = session(options, &manager, &ui);

		let mut host = RecordingHost::default();
		host.trees.insert("markdown".into(), InjectionLayer::new("markdown", ["lua"]));

		assert_eq!(
			session.activate(&mut host, DocumentId(4), Some("markdown")),
			Some("markdown".to_string())
		);
		assert_eq!(
			host.effects,
			vec![Effect::Attach("markdown".into()), Effect::Indent, Effect::Syntax(true)]
		);
		assert_eq!(manager.installs(), vec!["lua"]);
		assert_eq!(session.cache_snapshot().get("lua"), Some(&true));
	}

	#[test]
	fn failed_activation_touches_nothing() {
		let manager = FakeManager::new(["lua"], []);
		let ui = ScriptedUi::answering("n");
		let session = session(SessionOptions::default(), &manager, &ui);
		let mut host = RecordingHost::default();

		assert_eq!(session.activate(&mut host, DocumentId(1), Some("lua")), None);
		assert_eq!(session.activate(&mut host, DocumentId(2), None), None);
		assert!(host.effects.is_empty());
	}

	#[test]
	fn clear_cache_reprompts_through_session() {
		let manager = FakeManager::new(["lua"], []);
		let ui = ScriptedUi::answering("n");
		let session = session(SessionOptions::default(), &manager, &ui);
		let mut host = RecordingHost::default();

		session.activate(&mut host, DocumentId(1), Some("lua"));
		session.activate(&mut host, DocumentId(1), Some("lua"));
		assert_eq!(ui.prompts().len(), 1);

		session.clear_cache();
		session.activate(&mut host, DocumentId(1), Some("lua"));
		assert_eq!(ui.prompts().len(), 2);
	}
}
