//! Subcommand implementations.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use jscomm::runtime::js::{bind_listener_script, push_snapshot_script};
use jscomm::{CommConfig, Document, JsComm, MemoryHost};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use crate::cli::{Cli, Commands, ScriptAction};
use crate::error::{CliError, Result};
use crate::ops::Op;
use crate::output::write_result;

pub async fn dispatch(cli: Cli) -> Result<()> {
	let config = resolve_config(&cli)?;

	match cli.command {
		Commands::Script(action) => script(&config, action),
		Commands::Parse { raw } => parse(&raw),
		Commands::Run { file, keep_going } => {
			let failed = match file {
				Some(path) => {
					let file = tokio::fs::File::open(&path).await?;
					run(config, BufReader::new(file), keep_going).await?
				}
				None => run(config, BufReader::new(tokio::io::stdin()), keep_going).await?,
			};
			if failed > 0 {
				return Err(CliError::OpsFailed { failed });
			}
			Ok(())
		}
	}
}

/// Loads the config file if given, then applies command-line overrides.
pub fn resolve_config(cli: &Cli) -> Result<CommConfig> {
	let mut config = match &cli.config {
		Some(path) => load_config(path)?,
		None => CommConfig::default(),
	};
	if let Some(namespace) = &cli.namespace {
		config = config.with_namespace(namespace.clone());
	}
	if let Some(selector) = &cli.input_selector {
		config = config.with_input_selector(selector.clone());
	}
	Ok(config)
}

fn load_config(path: &Path) -> Result<CommConfig> {
	let load = || -> anyhow::Result<CommConfig> {
		let raw = std::fs::read_to_string(path).context("reading config file")?;
		CommConfig::from_json(&raw).context("parsing config JSON")
	};
	load().map_err(|source| CliError::Config {
		path: path.to_path_buf(),
		source,
	})
}

fn script(config: &CommConfig, action: ScriptAction) -> Result<()> {
	let script = match action {
		ScriptAction::Push { document } => {
			let doc: Document = match document {
				Some(raw) => serde_json::from_str(&raw)?,
				None => Document::new(),
			};
			push_snapshot_script(&config.namespace, &config.input_selector, &doc.serialize()?)
		}
		ScriptAction::Bind => bind_listener_script(&config.namespace, &config.input_selector),
	};
	println!("{}", script.source());
	Ok(())
}

fn parse(raw: &str) -> Result<()> {
	let doc = Document::parse(raw);
	println!("{}", serde_json::to_string_pretty(&doc)?);
	Ok(())
}

/// Binds an in-memory session and executes the script read from `input`.
///
/// Returns the number of failed operations.
pub async fn run<R>(config: CommConfig, input: R, keep_going: bool) -> Result<usize>
where
	R: AsyncBufRead + Unpin,
{
	let host = Arc::new(MemoryHost::new().with_input_selector(config.input_selector.clone()));
	let comm = JsComm::with_config(host, config).await?;
	info!(target = "jscomm.cli", namespace = %comm.namespace(), "session bound");

	let stdout = std::io::stdout();
	let mut out = stdout.lock();
	execute_lines(&comm, input, &mut out, keep_going).await
}

/// Executes operation lines from `input` against `comm`, writing one result
/// line per operation to `out`.
pub async fn execute_lines<R, W>(comm: &JsComm, input: R, out: &mut W, keep_going: bool) -> Result<usize>
where
	R: AsyncBufRead + Unpin,
	W: Write,
{
	let mut lines = input.lines();
	let mut line_no = 0;
	let mut failed = 0;

	while let Some(line) = lines.next_line().await? {
		line_no += 1;
		let Some(op) = Op::parse(&line, line_no)? else {
			continue;
		};

		let result = op.execute(comm).await;
		debug!(target = "jscomm.cli", line = line_no, op = op.name(), ok = result.ok, "executed");
		write_result(out, &result)?;

		if !result.ok {
			failed += 1;
			if !keep_going {
				break;
			}
		}
	}
	out.flush()?;
	Ok(failed)
}
