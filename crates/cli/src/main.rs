use clap::Parser;
use jscomm_cli::cli::Cli;
use jscomm_cli::error::CliError;
use jscomm_cli::{commands, logging, output};

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	if let Err(err) = commands::dispatch(cli).await {
		report(&err);
		std::process::exit(1);
	}
}

fn report(err: &CliError) {
	let mut message = err.to_string();
	let mut source = std::error::Error::source(err);
	while let Some(cause) = source {
		message.push_str(&format!(": {cause}"));
		source = cause.source();
	}
	output::print_error_stderr(err.code(), &message);
}
