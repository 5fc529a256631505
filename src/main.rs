#![allow(missing_docs)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod cmd;

#[derive(Parser)]
#[command(name = "yydoc", about = "GameMaker .yy descriptor inspection tools")]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Validate and resolve every descriptor under a project root.
	Check {
		root: PathBuf,
		#[arg(long)]
		json: bool,
	},
	/// Print one descriptor's parsed tree in canonical form.
	Show {
		path: PathBuf,
		#[arg(long)]
		json: bool,
	},
	/// Reformat a descriptor file to the canonical style.
	Fmt {
		path: PathBuf,
		#[arg(long)]
		check: bool,
		#[arg(long)]
		write: bool,
	},
	/// List outbound references per descriptor, with resolution status.
	Refs {
		root: PathBuf,
		#[arg(long)]
		file: Option<String>,
		#[arg(long)]
		broken: bool,
	},
	/// Print the scanned project index.
	Index {
		root: PathBuf,
		#[arg(long)]
		json: bool,
	},
}

fn main() {
	tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.with_writer(std::io::stderr)
		.init();

	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run() -> yydoc::yy::Result<()> {
	let cli = Cli::parse();

	match cli.command {
		Commands::Check { root, json } => cmd::check::run(root, json),
		Commands::Show { path, json } => cmd::show::run(path, json),
		Commands::Fmt { path, check, write } => cmd::fmt::run(path, check, write),
		Commands::Refs { root, file, broken } => cmd::refs::run(root, file, broken),
		Commands::Index { root, json } => cmd::index_cmd::run(root, json),
	}
}
