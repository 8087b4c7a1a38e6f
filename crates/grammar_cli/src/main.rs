//! `xeno-grammar`: on-demand tree-sitter grammar installation from the terminal.

mod cli;
mod terminal;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, bail};
use clap::Parser;
use cli::{Cli, Command};
use terminal::{ReportHost, TerminalUi};
use tracing::info;
use xeno_autoinstall::{Context, DocumentId, GrammarManager, Session};
use xeno_grammar::{FiletypeMap, GrammarStore, Manifest, RuntimeLayout};

fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	setup_tracing(cli.verbose);

	let manifest = match &cli.manifest {
		Some(path) => Manifest::load(path).with_context(|| format!("loading manifest {}", path.display()))?,
		None => Manifest::embedded().context("parsing built-in grammar manifest")?,
	};
	let store = GrammarStore::new(manifest, RuntimeLayout::detect());

	match &cli.command {
		Command::List => {
			list(&store);
			Ok(())
		}
		Command::Install { languages } => install(&cli, store, languages),
		Command::Open { path, filetype } => open(&cli, store, path, filetype.as_deref()),
	}
}

fn session(cli: &Cli, store: GrammarStore) -> anyhow::Result<Session> {
	let options = cli.session_options()?;
	let inference = FiletypeMap::from_manifest(store.manifest());
	Ok(Session::configure(options, store, inference, TerminalUi)?)
}

fn list(store: &GrammarStore) {
	let installed = store.list_installed();
	let mut names: Vec<_> = store.list_available().into_iter().collect();
	names.sort();
	for name in names {
		let marker = if installed.contains(&name) { "*" } else { " " };
		println!("{marker} {name}");
	}
}

fn install(cli: &Cli, store: GrammarStore, languages: &[String]) -> anyhow::Result<()> {
	let session = session(cli, store)?;
	let mut failed = 0;

	for language in languages {
		let ctx = Context::new(DocumentId(0)).with_filetype(language.as_str());
		match session.coordinator().decide(&ctx, Some(language.as_str())) {
			Ok(language) => println!("{language}: ready"),
			Err(reason) => {
				failed += 1;
				println!("{language}: not installed ({reason:?})");
			}
		}
	}

	if failed > 0 {
		bail!("{failed} of {} grammars not installed", languages.len());
	}
	Ok(())
}

fn open(cli: &Cli, store: GrammarStore, path: &Path, filetype: Option<&str>) -> anyhow::Result<()> {
	let layout = store.layout().clone();
	let filetype = filetype
		.map(str::to_string)
		.or_else(|| FiletypeMap::from_manifest(store.manifest()).filetype_for_path(path));
	let session = session(cli, store)?;

	let mut host = ReportHost::new(layout);
	match session.activate(&mut host, DocumentId(1), filetype.as_deref()) {
		Some(language) => {
			info!(path = %path.display(), language = %language, "Opened file");
			println!("{}", host.report);
			Ok(())
		}
		None => bail!(
			"no grammar available for {} (filetype: {})",
			path.display(),
			filetype.as_deref().unwrap_or("none")
		),
	}
}

fn setup_tracing(verbose: bool) {
	use std::fs::OpenOptions;

	use tracing_subscriber::EnvFilter;
	use tracing_subscriber::prelude::*;

	let filter = || {
		EnvFilter::try_from_default_env().unwrap_or_else(|_| {
			if verbose {
				EnvFilter::new("xeno_autoinstall=debug,xeno_grammar=debug,info")
			} else {
				EnvFilter::new("warn")
			}
		})
	};

	// XENO_LOG_DIR keeps a full log alongside the terminal output
	if let Some(log_dir) = std::env::var("XENO_LOG_DIR").ok().map(PathBuf::from)
		&& std::fs::create_dir_all(&log_dir).is_ok()
	{
		let log_path = log_dir.join(format!("xeno-grammar.{}.log", std::process::id()));

		if let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_path) {
			let file_layer = tracing_subscriber::fmt::layer()
				.with_writer(file)
				.with_ansi(false)
				.with_target(true)
				.with_filter(EnvFilter::new("xeno_autoinstall=trace,xeno_grammar=trace,debug"));

			let stderr_layer = tracing_subscriber::fmt::layer()
				.with_writer(std::io::stderr)
				.with_filter(filter());

			tracing_subscriber::registry().with(file_layer).with(stderr_layer).init();

			tracing::info!(path = ?log_path, "Tracing initialized");
			return;
		}
	}

	tracing_subscriber::fmt()
		.with_env_filter(filter())
		.with_writer(std::io::stderr)
		.init();
}
