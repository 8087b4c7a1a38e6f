//! Session configuration.
//!
//! [`SessionOptions`] holds what the user supplied, every field optional.
//! [`SessionConfig::from_options`] merges it over the defaults into the
//! immutable configuration a session runs with.
//!
//! Options can be written in TOML:
//!
//! ```toml
//! enable = true
//! skip_approval = false
//! timeout = 30000 # milliseconds
//!
//! [fold]
//! start_unfolded = true
//!
//! [indent]
//! enable = { lua = true, python = true }
//!
//! [syntax]
//! enable = { markdown = true }
//! ```
//!
//! Predicate checks cannot be expressed in a file and are attached
//! programmatically with [`Check::predicate`].

use std::path::Path;
use std::time::Duration;

use toml::{Table, Value};
use tracing::warn;

use crate::error::{ConfigError, Result};
use crate::policy::{Check, ModuleConfig};

/// Default wait for a single install invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Fold module configuration.
#[derive(Debug, Clone)]
pub struct FoldConfig {
	pub module: ModuleConfig,
	/// Open every fold when folding is applied.
	pub start_unfolded: bool,
}

/// Resolved configuration for one session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
	/// Root module gating installation itself.
	pub install: ModuleConfig,
	pub fold: FoldConfig,
	pub indent: ModuleConfig,
	/// Keyed by filetype rather than language.
	pub syntax: ModuleConfig,
	/// Install without asking the user first.
	pub skip_approval: bool,
	/// Upper bound on a single install invocation.
	pub timeout: Duration,
}

impl Default for SessionConfig {
	fn default() -> Self {
		Self {
			install: ModuleConfig::enabled(true),
			fold: FoldConfig {
				module: ModuleConfig::enabled(true),
				start_unfolded: false,
			},
			indent: ModuleConfig::enabled(false),
			syntax: ModuleConfig::enabled(false),
			skip_approval: false,
			timeout: DEFAULT_TIMEOUT,
		}
	}
}

impl SessionConfig {
	/// Merges `options` over the defaults.
	pub fn from_options(options: SessionOptions) -> Self {
		let mut config = Self::default();
		options.install.apply(&mut config.install);
		options.fold.module.apply(&mut config.fold.module);
		if let Some(start_unfolded) = options.fold.start_unfolded {
			config.fold.start_unfolded = start_unfolded;
		}
		options.indent.apply(&mut config.indent);
		options.syntax.apply(&mut config.syntax);
		if let Some(skip) = options.skip_approval {
			config.skip_approval = skip;
		}
		if let Some(timeout) = options.timeout {
			config.timeout = timeout;
		}
		config
	}
}

/// User-supplied gate for one module.
#[derive(Debug, Clone, Default)]
pub struct ModuleOptions {
	pub enable: Option<Check>,
	pub disable: Option<Check>,
}

impl ModuleOptions {
	fn apply(self, module: &mut ModuleConfig) {
		if self.enable.is_some() {
			module.enable = self.enable;
		}
		if self.disable.is_some() {
			module.disable = self.disable;
		}
	}

	fn merge(&mut self, other: ModuleOptions) {
		if other.enable.is_some() {
			self.enable = other.enable;
		}
		if other.disable.is_some() {
			self.disable = other.disable;
		}
	}
}

/// User-supplied fold options.
#[derive(Debug, Clone, Default)]
pub struct FoldOptions {
	pub module: ModuleOptions,
	pub start_unfolded: Option<bool>,
}

/// User-supplied session options.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
	/// Top-level `enable`/`disable`.
	pub install: ModuleOptions,
	pub fold: FoldOptions,
	pub indent: ModuleOptions,
	pub syntax: ModuleOptions,
	pub skip_approval: Option<bool>,
	pub timeout: Option<Duration>,
}

impl SessionOptions {
	/// Parses options from a TOML string.
	///
	/// # Errors
	///
	/// Returns [`ConfigError::UnknownOption`] for unrecognized keys and
	/// [`ConfigError::TypeMismatch`] for mistyped scalars. `enable`/`disable`
	/// values of an unsupported shape are not errors; see [`Check::Malformed`].
	pub fn parse(input: &str) -> Result<Self> {
		let table: Table = toml::from_str(input)?;
		let mut options = SessionOptions::default();

		for (key, value) in &table {
			match key.as_str() {
				"enable" => options.install.enable = Some(parse_check(key, value)),
				"disable" => options.install.disable = Some(parse_check(key, value)),
				"skip_approval" => options.skip_approval = Some(expect_bool(key, value)?),
				"timeout" => options.timeout = Some(parse_timeout(key, value)?),
				"fold" => options.fold = parse_fold(expect_table(key, value)?)?,
				"indent" => options.indent = parse_module("indent", expect_table(key, value)?, &[])?.0,
				"syntax" => options.syntax = parse_module("syntax", expect_table(key, value)?, &[])?.0,
				_ => return Err(ConfigError::UnknownOption { key: key.clone() }),
			}
		}

		Ok(options)
	}

	/// Loads options from a TOML file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let content = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::parse(&content)
	}

	/// Merges another set of options into this one.
	///
	/// Values present in `other` override values in `self`.
	pub fn merge(&mut self, other: SessionOptions) {
		self.install.merge(other.install);
		self.fold.module.merge(other.fold.module);
		if other.fold.start_unfolded.is_some() {
			self.fold.start_unfolded = other.fold.start_unfolded;
		}
		self.indent.merge(other.indent);
		self.syntax.merge(other.syntax);
		if other.skip_approval.is_some() {
			self.skip_approval = other.skip_approval;
		}
		if other.timeout.is_some() {
			self.timeout = other.timeout;
		}
	}
}

fn parse_fold(table: &Table) -> Result<FoldOptions> {
	let (module, rest) = parse_module("fold", table, &["start_unfolded"])?;
	let start_unfolded = rest
		.into_iter()
		.map(|(key, value)| expect_bool(&format!("fold.{key}"), value))
		.next()
		.transpose()?;
	Ok(FoldOptions { module, start_unfolded })
}

/// Parses `enable`/`disable` from a module table. Keys listed in `extra`
/// are handed back to the caller; anything else is rejected.
fn parse_module<'a>(name: &str, table: &'a Table, extra: &[&str]) -> Result<(ModuleOptions, Vec<(&'a str, &'a Value)>)> {
	let mut module = ModuleOptions::default();
	let mut rest = Vec::new();

	for (key, value) in table {
		let path = format!("{name}.{key}");
		match key.as_str() {
			"enable" => module.enable = Some(parse_check(&path, value)),
			"disable" => module.disable = Some(parse_check(&path, value)),
			k if extra.contains(&k) => rest.push((k, value)),
			_ => return Err(ConfigError::UnknownOption { key: path }),
		}
	}

	Ok((module, rest))
}

/// Values of an unsupported shape are kept as [`Check::Malformed`], which
/// resolves the module to enabled.
fn parse_check(option: &str, value: &Value) -> Check {
	let check = match value {
		Value::Boolean(b) => Some(Check::Bool(*b)),
		Value::Table(entries) => entries
			.iter()
			.map(|(key, v)| v.as_bool().map(|b| (key.clone(), b)))
			.collect::<Option<_>>()
			.map(Check::Map),
		_ => None,
	};

	check.unwrap_or_else(|| {
		let got = match value {
			Value::Table(entries) => entries.values().find(|v| !v.is_bool()).map_or("table", Value::type_str),
			other => other.type_str(),
		};
		warn!(option, got, "Unsupported enable/disable value, treating module as enabled");
		Check::Malformed(got)
	})
}

fn parse_timeout(option: &str, value: &Value) -> Result<Duration> {
	match value {
		Value::Integer(ms) if *ms >= 0 => Ok(Duration::from_millis(*ms as u64)),
		other => Err(ConfigError::TypeMismatch {
			option: option.to_string(),
			expected: "non-negative integer (milliseconds)",
			got: other.type_str(),
		}),
	}
}

fn expect_bool(option: &str, value: &Value) -> Result<bool> {
	value.as_bool().ok_or_else(|| ConfigError::TypeMismatch {
		option: option.to_string(),
		expected: "boolean",
		got: value.type_str(),
	})
}

fn expect_table<'a>(option: &str, value: &'a Value) -> Result<&'a Table> {
	value.as_table().ok_or_else(|| ConfigError::TypeMismatch {
		option: option.to_string(),
		expected: "table",
		got: value.type_str(),
	})
}
