use std::path::PathBuf;

use clap::builder::Styles;
use clap::builder::styling::AnsiColor;
use clap::{Parser, Subcommand};


fn cli_styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Yellow.on_default().bold())
		.usage(AnsiColor::Yellow.on_default().bold())
		.literal(AnsiColor::Green.on_default())
		.placeholder(AnsiColor::Blue.on_default())
}

#[derive(Parser, Debug)]
#[command(name = "jscomm")]
#[command(about = "Inspect and exercise host/page key-value channels")]
#[command(version)]
#[command(styles = cli_styles())]
pub struct Cli {
	/// Increase verbosity (-v debug for jscomm, -vv trace)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Namespace tag of the shared element (overrides the config file)
	#[arg(short, long, global = true, value_name = "TAG")]
	pub namespace: Option<String>,

	/// Load session config from a JSON file
	#[arg(short, long, global = true, value_name = "FILE")]
	pub config: Option<PathBuf>,

	/// Selector of the input inside the shared element (overrides the config file)
	#[arg(long, global = true, value_name = "SELECTOR")]
	pub input_selector: Option<String>,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Print the page-side scripts a session would inject
	#[command(subcommand)]
	Script(ScriptAction),

	/// Parse a raw channel value the way a session reads it
	Parse {
		/// Raw value; anything that is not a JSON object reads as empty
		raw: String,
	},

	/// Execute an operation script against an in-memory session
	Run {
		/// Script file (reads stdin when omitted)
		file: Option<PathBuf>,
		/// Continue after a failed operation
		#[arg(short, long)]
		keep_going: bool,
	},
}

#[derive(Subcommand, Debug)]
pub enum ScriptAction {
	/// Script that copies a snapshot into the embedded input
	Push {
		/// Document to push as JSON (defaults to an empty document)
		#[arg(short, long, value_name = "JSON")]
		document: Option<String>,
	},
	/// Script that installs the page-side listener
	Bind,
}
