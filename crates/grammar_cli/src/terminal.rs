//! Terminal implementations of the session's host traits.

use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use dialoguer::Input;
use tracing::warn;
use xeno_autoinstall::{DocumentHost, DocumentId, InjectionLayer, Interaction, LanguageTree, Level};
use xeno_grammar::{RuntimeLayout, injected_languages, read_injection_query};

/// Prompts on the terminal and reports notifications on stderr.
pub struct TerminalUi;

impl Interaction for TerminalUi {
	fn prompt(&self, text: &str) -> String {
		Input::<String>::new()
			.with_prompt(text.trim_end())
			.allow_empty(true)
			.interact_text()
			.unwrap_or_else(|e| {
				warn!(error = %e, "Prompt unavailable, treating as declined");
				String::new()
			})
	}

	fn notify(&self, text: &str, level: Level) {
		let tag = match level {
			Level::Info => "info",
			Level::Warn => "warn",
			Level::Error => "error",
			Level::Success => "ok",
		};
		eprintln!("[{tag}] {text}");
	}
}

/// Settings a [`ReportHost`] was asked to apply.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Report {
	pub language: Option<String>,
	/// `Some(start_unfolded)` once folding is enabled.
	pub folding: Option<bool>,
	pub indent: bool,
	pub syntax: Option<bool>,
	/// Languages of every layer in the attached tree, depth first.
	pub layers: Vec<String>,
}

impl fmt::Display for Report {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let on_off = |b: bool| if b { "on" } else { "off" };
		writeln!(f, "language: {}", self.language.as_deref().unwrap_or("-"))?;
		match self.folding {
			Some(true) => writeln!(f, "folding:  on (start unfolded)")?,
			Some(false) => writeln!(f, "folding:  on")?,
			None => writeln!(f, "folding:  off")?,
		}
		writeln!(f, "indent:   {}", on_off(self.indent))?;
		writeln!(f, "syntax:   {}", on_off(self.syntax.unwrap_or(false)))?;
		write!(f, "layers:   {}", self.layers.join(" > "))
	}
}

/// Document host that builds layer trees from injection queries and records
/// what the session applies.
///
/// Without a parser there is no document content to inspect, so each layer
/// is given one child per language its query injects, each language appearing
/// once in the tree.
pub struct ReportHost {
	layout: RuntimeLayout,
	pub report: Report,
}

impl ReportHost {
	pub fn new(layout: RuntimeLayout) -> Self {
		Self {
			layout,
			report: Report::default(),
		}
	}

	fn build_layer(&mut self, language: &str, seen: &mut HashSet<String>) -> Rc<InjectionLayer> {
		let injections = read_injection_query(&self.layout, language)
			.map(|query| injected_languages(&query))
			.unwrap_or_default();

		self.report.layers.push(language.to_string());
		let layer = InjectionLayer::new(language, injections.iter().cloned());
		for child in injections {
			if seen.insert(child.clone()) {
				layer.add_child(self.build_layer(&child, seen));
			}
		}
		layer
	}
}

impl DocumentHost for ReportHost {
	fn attach(&mut self, _doc: DocumentId, language: &str) -> Option<Rc<dyn LanguageTree>> {
		self.report.language = Some(language.to_string());
		let mut seen = HashSet::from([language.to_string()]);
		let root = self.build_layer(language, &mut seen);
		Some(root as Rc<dyn LanguageTree>)
	}

	fn enable_folding(&mut self, _doc: DocumentId, start_unfolded: bool) {
		self.report.folding = Some(start_unfolded);
	}

	fn enable_indent(&mut self, _doc: DocumentId) {
		self.report.indent = true;
	}

	fn set_syntax(&mut self, _doc: DocumentId, enabled: bool) {
		self.report.syntax = Some(enabled);
	}
}
