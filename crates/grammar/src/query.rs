//! Injection query scanning.
//!
//! Reads `injections.scm` for a language from the query search paths and
//! extracts the fixed target languages it declares. Dynamic injections
//! (`@injection.language` captures) depend on document content and are not
//! reported.

use std::sync::LazyLock;

use regex::Regex;

use crate::paths::RuntimeLayout;

static SET_LANGUAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r#"\(#set!\s+injection\.language\s+"([^"]+)"\s*\)"#).expect("injection.language regex should be valid")
});

static INHERITS_RE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?m)^;+\s*inherits\s*:?\s*([a-z_,()\-]+)\s*$").expect("inherits regex should be valid"));

/// Target languages of every `(#set! injection.language "...")` in `source`,
/// in order of first appearance.
pub fn injected_languages(source: &str) -> Vec<String> {
	let mut languages: Vec<String> = Vec::new();
	for capture in SET_LANGUAGE_RE.captures_iter(source) {
		let language = &capture[1];
		if !languages.iter().any(|l| l == language) {
			languages.push(language.to_string());
		}
	}
	languages
}

/// Reads the injection query for `language`, following `; inherits:` lines.
///
/// Returns `None` when no `injections.scm` exists for the language.
pub fn read_injection_query(layout: &RuntimeLayout, language: &str) -> Option<String> {
	let mut visited = Vec::new();
	read_query(layout, language, "injections.scm", &mut visited)
}

fn read_query(layout: &RuntimeLayout, language: &str, filename: &str, visited: &mut Vec<String>) -> Option<String> {
	if visited.iter().any(|v| v == language) {
		return None;
	}
	visited.push(language.to_string());

	let source = layout
		.query_dirs
		.iter()
		.find_map(|dir| std::fs::read_to_string(dir.join(language).join(filename)).ok())?;

	let mut combined = String::new();
	if let Some(capture) = INHERITS_RE.captures(&source) {
		for parent in capture[1].split(',') {
			let parent = parent.trim_matches(|c| c == '(' || c == ')');
			if let Some(inherited) = read_query(layout, parent, filename, visited) {
				combined.push_str(&inherited);
				combined.push('\n');
			}
		}
	}
	combined.push_str(&source);
	Some(combined)
}
