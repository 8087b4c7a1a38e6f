use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;

fn ctx(language: &str) -> Context {
	Context::new(DocumentId(1)).with_filetype(language).with_language(language)
}

fn module(enable: Option<Check>, disable: Option<Check>) -> ModuleConfig {
	ModuleConfig { enable, disable }
}

#[test]
fn absent_enable_defaults_to_true() {
	assert!(resolve(&module(None, None), &ctx("lua")));
	assert!(resolve(&module(None, Some(Check::Bool(false))), &ctx("lua")));
	assert!(!resolve(&module(None, Some(Check::Bool(true))), &ctx("lua")));
}

#[test]
fn absent_enable_vetoed_by_map_and_predicate() {
	let by_map = module(None, Some(Check::only(["lua"])));
	assert!(!resolve(&by_map, &ctx("lua")));
	assert!(resolve(&by_map, &ctx("rust")));

	let by_predicate = module(None, Some(Check::predicate(|c| c.language.as_deref() == Some("rust"))));
	assert!(resolve(&by_predicate, &ctx("lua")));
	assert!(!resolve(&by_predicate, &ctx("rust")));
}

#[test]
fn boolean_enable_pairs() {
	let cases = [
		(true, false, true),
		(true, true, false),
		(false, false, false),
		(false, true, false),
	];
	for (enable, disable, expected) in cases {
		let m = module(Some(Check::Bool(enable)), Some(Check::Bool(disable)));
		assert_eq!(resolve(&m, &ctx("lua")), expected, "enable={enable} disable={disable}");
	}
}

#[test]
fn boolean_enable_vetoed_by_more_specific_disable() {
	let m = module(Some(Check::Bool(true)), Some(Check::map([("lua", true), ("vim", false)])));
	assert!(!resolve(&m, &ctx("lua")));
	assert!(resolve(&m, &ctx("vim")));
	assert!(resolve(&m, &ctx("rust")));

	let m = module(Some(Check::Bool(true)), Some(Check::predicate(|_| true)));
	assert!(!resolve(&m, &ctx("lua")));
}

#[test]
fn map_enable_lists_languages() {
	let m = module(Some(Check::only(["lua"])), None);
	assert!(resolve(&m, &ctx("lua")));
	assert!(!resolve(&m, &ctx("rust")));
}

#[test]
fn map_enable_ignores_boolean_disable() {
	let m = module(Some(Check::only(["lua"])), Some(Check::Bool(true)));
	assert!(resolve(&m, &ctx("lua")));
}

#[test]
fn map_enable_vetoed_by_map_or_predicate() {
	let m = module(Some(Check::only(["lua", "vim"])), Some(Check::only(["vim"])));
	assert!(resolve(&m, &ctx("lua")));
	assert!(!resolve(&m, &ctx("vim")));

	let m = module(Some(Check::only(["lua"])), Some(Check::predicate(|c| c.document == DocumentId(1))));
	assert!(!resolve(&m, &ctx("lua")));
}

#[test]
fn predicate_enable_only_vetoed_by_predicate() {
	let enable = Check::predicate(|c| c.language.as_deref() != Some("zig"));

	let m = module(Some(enable.clone()), Some(Check::Bool(true)));
	assert!(resolve(&m, &ctx("lua")));
	assert!(!resolve(&m, &ctx("zig")));

	let m = module(Some(enable.clone()), Some(Check::only(["lua"])));
	assert!(resolve(&m, &ctx("lua")));

	let m = module(Some(enable), Some(Check::predicate(|c| c.language.as_deref() == Some("lua"))));
	assert!(!resolve(&m, &ctx("lua")));
	assert!(resolve(&m, &ctx("rust")));
}

#[test]
fn map_lookup_without_key_is_false() {
	let m = module(Some(Check::only(["lua"])), None);
	let no_language = Context::new(DocumentId(1)).with_filetype("lua");
	assert!(!resolve(&m, &no_language));
	assert!(resolve_filetype(&m, &no_language));
}

#[test]
fn filetype_resolution_uses_filetype_key() {
	let m = module(Some(Check::only(["typescriptreact"])), None);
	let c = Context::new(DocumentId(3)).with_filetype("typescriptreact").with_language("tsx");
	assert!(resolve_filetype(&m, &c));
	assert!(!resolve(&m, &c));
}

#[test]
fn resolution_is_repeatable() {
	let calls = std::sync::Arc::new(AtomicUsize::new(0));
	let counter = calls.clone();
	let m = module(
		Some(Check::predicate(move |c| {
			counter.fetch_add(1, Ordering::SeqCst);
			c.language.as_deref() == Some("lua")
		})),
		None,
	);
	let first = resolve(&m, &ctx("lua"));
	let second = resolve(&m, &ctx("lua"));
	assert_eq!(first, second);
	assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn switched_off_is_literal() {
	assert!(ModuleConfig::enabled(false).is_switched_off());
	assert!(module(None, Some(Check::Bool(true))).is_switched_off());
	assert!(!module(Some(Check::only(["lua"])), Some(Check::only(["lua"]))).is_switched_off());
	assert!(!module(Some(Check::predicate(|_| false)), None).is_switched_off());
}

#[test]
fn malformed_check_resolves_to_true() {
	assert!(resolve(&module(Some(Check::Malformed("string")), None), &ctx("lua")));
	assert!(resolve(&module(Some(Check::Bool(false)), Some(Check::Malformed("array"))), &ctx("lua")));
	assert!(resolve(
		&module(Some(Check::Malformed("integer")), Some(Check::Bool(true))),
		&ctx("lua")
	));
	assert!(resolve_filetype(&module(Some(Check::Malformed("string")), None), &ctx("markdown")));
}
