use std::path::Path;

use tracing_subscriber::EnvFilter;

/// Sends `tracing` output to `log_file`. The terminal belongs to the UI, so
/// nothing is ever written to stdout.
pub fn enable_file_logging(log_file: &Path) {
	let directory = log_file
		.parent()
		.filter(|parent| !parent.as_os_str().is_empty())
		.unwrap_or_else(|| Path::new("."));
	let file_name = log_file
		.file_name()
		.map(|name| name.to_os_string())
		.unwrap_or_else(|| "pomodoro.log".into());

	let appender = tracing_appender::rolling::never(directory, file_name);
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		EnvFilter::new(format!("{}=info", env!("CARGO_PKG_NAME").replace('-', "_")))
	});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(appender)
		.with_ansi(false)
		.init();
}
