use tracing_subscriber::EnvFilter;

/// Filter directives for a `-v` count. Third-party crates stay at `warn`.
pub fn directives(verbosity: u8) -> String {
	let level = match verbosity {
		0 => "info",
		1 => "debug",
		_ => "trace",
	};
	format!("warn,paideia={level},paideia_cli={level}")
}

/// Installs the global subscriber on stderr. `RUST_LOG` takes precedence
/// over the verbosity flags.
pub fn init_logging(verbosity: u8) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives(verbosity)));

	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(verbosity > 0)
		.try_init();
}
