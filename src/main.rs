mod calendar;
mod domain;
mod logging;
mod settings;
mod storage;
mod ui;

use std::error::Error;
use std::path::PathBuf;

use chrono::Local;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use crate::calendar::{day_index, week_number, week_start};
use crate::domain::WeekStore;
use crate::logging::enable_file_logging;
use crate::settings::{Overrides, Settings};
use crate::storage::load_store;
use crate::ui::{App, Cursor, print_summary, run_dashboard};

#[derive(Debug, Parser)]
#[command(name = "pomodoro-tracker", about = "Weekly pomodoro tracker for the terminal")]
struct Cli {
	/// Week data file (default: pomodoro.json)
	#[arg(long)]
	file: Option<PathBuf>,
	/// Monday that starts week 1, as YYYY-MM-DD
	#[arg(long)]
	epoch: Option<String>,
	/// TOML config file (default: pomodoro.toml)
	#[arg(long)]
	config: Option<PathBuf>,
	/// Write logs to this file
	#[arg(long)]
	log: Option<PathBuf>,
	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
	Dashboard,
	Summary {
		#[arg(long)]
		week: Option<u32>,
	},
}

fn main() {
	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run() -> Result<(), Box<dyn Error>> {
	let cli = Cli::parse();
	let settings = Settings::resolve(Overrides {
		data_file: cli.file,
		epoch: cli.epoch,
		config: cli.config,
		log_file: cli.log,
	})?;

	if let Some(log_file) = &settings.log_file {
		enable_file_logging(log_file);
	}

	let (store, status) = match load_store(&settings.data_file) {
		Ok(store) => (store, None),
		Err(err) => {
			warn!(path = %settings.data_file.display(), error = %err, "falling back to empty store");
			(WeekStore::new(), Some(format!("Error loading data: {err}")))
		}
	};

	let today = Local::now().date_naive();
	let cursor = Cursor {
		week: week_number(settings.epoch, today),
		day: day_index(today),
	};

	match cli.command.unwrap_or(Command::Dashboard) {
		Command::Dashboard => {
			info!(week = cursor.week, day = cursor.day, epoch = %settings.epoch, "starting dashboard");
			let mut app = App::new(store, cursor);
			run_dashboard(&mut app, &settings.data_file, status)?;
		}
		Command::Summary { week } => {
			if let Some(message) = status {
				eprintln!("{message}");
			} else if store.is_empty() {
				eprintln!("no weeks recorded yet in {}", settings.data_file.display());
			}
			let week = week.unwrap_or(cursor.week).max(1);
			match week_start(settings.epoch, week) {
				Some(start) => println!("week of {}", start.format("%Y-%m-%d")),
				None => println!("week {week} (beyond the calendar)"),
			}
			print_summary(&store, Cursor { week, ..cursor });
		}
	}

	Ok(())
}
