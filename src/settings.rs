use std::env;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;

use crate::calendar::{default_epoch, is_monday};

pub const DEFAULT_DATA_FILE: &str = "pomodoro.json";
pub const DEFAULT_CONFIG_FILE: &str = "pomodoro.toml";
const DATA_FILE_ENV: &str = "POMODORO_FILE";
const LOG_FILE_ENV: &str = "POMODORO_LOG";

#[derive(Debug)]
pub enum SettingsError {
	Io(std::io::Error),
	TomlDecode(toml::de::Error),
	InvalidEpoch(String),
	EpochNotMonday(NaiveDate),
}

impl Display for SettingsError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			SettingsError::Io(err) => write!(f, "failed to read config: {err}"),
			SettingsError::TomlDecode(err) => write!(f, "failed to parse config: {err}"),
			SettingsError::InvalidEpoch(raw) => write!(f, "invalid epoch date (want YYYY-MM-DD): {raw}"),
			SettingsError::EpochNotMonday(date) => {
				write!(f, "epoch must be a Monday: {} is a {}", date, date.format("%A"))
			}
		}
	}
}

impl std::error::Error for SettingsError {}

/// Contents of the optional TOML config file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
	pub data_file: Option<PathBuf>,
	pub epoch: Option<String>,
}

/// Values given on the command line. They win over everything else.
#[derive(Debug, Default)]
pub struct Overrides {
	pub data_file: Option<PathBuf>,
	pub epoch: Option<String>,
	pub config: Option<PathBuf>,
	pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
	pub data_file: PathBuf,
	pub epoch: NaiveDate,
	pub log_file: Option<PathBuf>,
}

impl Settings {
	/// Command line, then environment, then config file, then built-in defaults.
	pub fn resolve(overrides: Overrides) -> Result<Self, SettingsError> {
		let config_path = overrides
			.config
			.clone()
			.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
		let file = load_file_config(&config_path)?;

		let data_file = overrides
			.data_file
			.or_else(|| non_empty_env(DATA_FILE_ENV))
			.or(file.data_file)
			.unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE));

		let epoch = match overrides.epoch.or(file.epoch) {
			Some(raw) => parse_epoch(&raw)?,
			None => default_epoch(),
		};

		let log_file = overrides.log_file.or_else(|| non_empty_env(LOG_FILE_ENV));

		Ok(Self {
			data_file,
			epoch,
			log_file,
		})
	}
}

pub fn load_file_config(path: &Path) -> Result<FileConfig, SettingsError> {
	let raw = match fs::read_to_string(path) {
		Ok(raw) => raw,
		Err(err) if err.kind() == ErrorKind::NotFound => return Ok(FileConfig::default()),
		Err(err) => return Err(SettingsError::Io(err)),
	};

	toml::from_str(&raw).map_err(SettingsError::TomlDecode)
}

pub fn parse_epoch(raw: &str) -> Result<NaiveDate, SettingsError> {
	let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
		.map_err(|_| SettingsError::InvalidEpoch(raw.to_string()))?;
	if !is_monday(date) {
		return Err(SettingsError::EpochNotMonday(date));
	}
	Ok(date)
}

fn non_empty_env(name: &str) -> Option<PathBuf> {
	env::var_os(name)
		.map(PathBuf::from)
		.filter(|path| !path.as_os_str().is_empty())
}
