use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use xeno_autoinstall::{ConfigError, SessionOptions};

#[derive(Parser, Debug)]
#[command(name = "xeno-grammar")]
#[command(about = "Install tree-sitter grammars on demand")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Session options file (TOML)
	#[arg(long, value_name = "PATH", global = true)]
	pub config: Option<PathBuf>,

	/// Grammar manifest to use instead of the built-in one
	#[arg(long, value_name = "PATH", global = true)]
	pub manifest: Option<PathBuf>,

	/// Install without asking for approval
	#[arg(long, short = 'y', global = true)]
	pub yes: bool,

	/// Upper bound on a single install, in milliseconds
	#[arg(long, value_name = "MS", global = true)]
	pub timeout: Option<u64>,

	/// Verbose logging
	#[arg(short, long, global = true)]
	pub verbose: bool,

	/// Subcommand to execute.
	#[command(subcommand)]
	pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
	/// List grammars known to the manifest
	List,
	/// Install grammars for the given languages
	Install {
		/// Grammar languages to install
		#[arg(required = true)]
		languages: Vec<String>,
	},
	/// Activate a file as an editor would when assigning its filetype
	Open {
		/// File to activate
		path: PathBuf,

		/// Filetype to assign (defaults to one derived from the extension)
		#[arg(long)]
		filetype: Option<String>,
	},
}

impl Cli {
	/// Options from `--config`, with `--yes` and `--timeout` layered on top.
	pub fn session_options(&self) -> Result<SessionOptions, ConfigError> {
		let mut options = match &self.config {
			Some(path) => SessionOptions::load(path)?,
			None => SessionOptions::default(),
		};

		options.merge(SessionOptions {
			skip_approval: self.yes.then_some(true),
			timeout: self.timeout.map(Duration::from_millis),
			..Default::default()
		});

		Ok(options)
	}
}
