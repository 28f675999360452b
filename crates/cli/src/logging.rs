use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

/// Filter directives per `-v` count. `RUST_LOG` overrides them.
fn default_directives(verbosity: u8) -> &'static str {
	match verbosity {
		// Results go to stdout; stderr stays quiet unless something breaks.
		0 => "error",
		// Write-backs, pushes and registry claims.
		1 => "info,jscomm=debug,jscomm_runtime=debug",
		// Raw change notifications as well.
		_ => "trace",
	}
}

pub fn init_logging(verbosity: u8) {
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(verbosity)));

	tracing_subscriber::fmt()
		.with_env_filter(env_filter)
		.with_writer(std::io::stderr)
		.with_ansi(std::io::stderr().is_terminal())
		.with_target(true)
		.compact()
		.init();
}
