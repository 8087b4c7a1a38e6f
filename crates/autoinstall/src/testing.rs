//! Recording collaborators for unit tests.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::time::Duration;

use crate::error::InstallError;
use crate::host::{GrammarManager, Interaction, LanguageInference, Level, PendingInstall};

/// How a [`FakeManager`] install finishes.
#[derive(Debug, Clone)]
pub enum InstallBehavior {
	Succeed,
	Fail(String),
	/// Never finishes; waiting always times out.
	Hang,
}

type InstallHook = Rc<dyn Fn(&str)>;

#[derive(Default)]
struct ManagerState {
	available: HashSet<String>,
	installed: HashSet<String>,
	behavior: HashMap<String, InstallBehavior>,
	installs: Vec<String>,
	ready: Option<String>,
	on_install: Option<InstallHook>,
}

/// In-memory grammar manager sharing its state across clones.
#[derive(Clone, Default)]
pub struct FakeManager(Rc<RefCell<ManagerState>>);

impl FakeManager {
	pub fn new<'a>(available: impl IntoIterator<Item = &'a str>, installed: impl IntoIterator<Item = &'a str>) -> Self {
		let manager = Self::default();
		{
			let mut state = manager.0.borrow_mut();
			state.available = available.into_iter().map(String::from).collect();
			state.installed = installed.into_iter().map(String::from).collect();
		}
		manager
	}

	pub fn set_installed<'a>(&self, installed: impl IntoIterator<Item = &'a str>) {
		self.0.borrow_mut().installed = installed.into_iter().map(String::from).collect();
	}

	pub fn set_behavior(&self, language: &str, behavior: InstallBehavior) {
		self.0.borrow_mut().behavior.insert(language.to_string(), behavior);
	}

	pub fn set_unready(&self, reason: &str) {
		self.0.borrow_mut().ready = Some(reason.to_string());
	}

	/// Runs `hook` synchronously inside every `install` call.
	pub fn on_install(&self, hook: impl Fn(&str) + 'static) {
		self.0.borrow_mut().on_install = Some(Rc::new(hook));
	}

	/// Languages passed to `install`, in call order.
	pub fn installs(&self) -> Vec<String> {
		self.0.borrow().installs.clone()
	}
}

impl GrammarManager for FakeManager {
	fn check_ready(&self) -> Result<(), String> {
		match &self.0.borrow().ready {
			Some(reason) => Err(reason.clone()),
			None => Ok(()),
		}
	}

	fn list_available(&self) -> HashSet<String> {
		self.0.borrow().available.clone()
	}

	fn list_installed(&self) -> HashSet<String> {
		self.0.borrow().installed.clone()
	}

	fn install(&self, language: &str) -> Result<Box<dyn PendingInstall>, InstallError> {
		let hook = {
			let mut state = self.0.borrow_mut();
			state.installs.push(language.to_string());
			state.on_install.clone()
		};
		if let Some(hook) = hook {
			hook(language);
		}
		let behavior = self
			.0
			.borrow()
			.behavior
			.get(language)
			.cloned()
			.unwrap_or(InstallBehavior::Succeed);
		Ok(Box::new(FakeInstall {
			manager: self.clone(),
			language: language.to_string(),
			behavior,
		}))
	}
}

struct FakeInstall {
	manager: FakeManager,
	language: String,
	behavior: InstallBehavior,
}

impl PendingInstall for FakeInstall {
	fn wait(self: Box<Self>, timeout: Duration) -> Result<(), InstallError> {
		let FakeInstall {
			manager,
			language,
			behavior,
		} = *self;
		match behavior {
			InstallBehavior::Succeed => {
				manager.0.borrow_mut().installed.insert(language);
				Ok(())
			}
			InstallBehavior::Fail(reason) => Err(InstallError::Failed(reason)),
			InstallBehavior::Hang => Err(InstallError::Timeout(timeout)),
		}
	}
}

/// Filetype inference from a fixed table, falling back to the filetype.
#[derive(Default)]
pub struct FakeInference(pub HashMap<String, String>);

impl LanguageInference for FakeInference {
	fn infer(&self, filetype: &str) -> Option<String> {
		if filetype.is_empty() {
			return None;
		}
		Some(self.0.get(filetype).cloned().unwrap_or_else(|| filetype.to_string()))
	}
}

#[derive(Default)]
struct UiState {
	response: String,
	prompts: Vec<String>,
	notifications: Vec<(Level, String)>,
}

/// Answers every prompt with a fixed response and records what it was shown.
#[derive(Clone, Default)]
pub struct ScriptedUi(Rc<RefCell<UiState>>);

impl ScriptedUi {
	pub fn answering(response: &str) -> Self {
		let ui = Self::default();
		ui.0.borrow_mut().response = response.to_string();
		ui
	}

	pub fn prompts(&self) -> Vec<String> {
		self.0.borrow().prompts.clone()
	}

	pub fn notifications(&self) -> Vec<(Level, String)> {
		self.0.borrow().notifications.clone()
	}

	pub fn levels(&self) -> Vec<Level> {
		self.0.borrow().notifications.iter().map(|(l, _)| *l).collect()
	}
}

impl Interaction for ScriptedUi {
	fn prompt(&self, text: &str) -> String {
		let mut state = self.0.borrow_mut();
		state.prompts.push(text.to_string());
		state.response.clone()
	}

	fn notify(&self, text: &str, level: Level) {
		self.0.borrow_mut().notifications.push((level, text.to_string()));
	}
}
