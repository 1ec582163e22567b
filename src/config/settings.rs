/* Copyright © 2024-2025 Adam Train <adam@trainrelay.net>
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 */
use crate::config::config_file::Config;
use crate::parsing::filesystem::expand_home;
use crate::parsing::training_file::TrainingSource;
use crate::util::date::Date;
use crate::Cli;
use anyhow::{anyhow, bail, Error};
use std::path::PathBuf;

pub const DEFAULT_CURRENCY: &str = "£";
pub const DEFAULT_MAX_AGE: u32 = 180;
pub const DEFAULT_MIN_GROUP_SIZE: usize = 1;
pub const DEFAULT_SUGGESTIONS: usize = 3;

/// Everything a run needs, merged from the command line (first), the config
/// file, then built-in defaults.
#[derive(Debug)]
pub struct Settings {
	/// The account the statement belongs to
	pub account: String,
	pub currency: String,
	/// Ledger entries older than this many days are not learned from
	pub max_age: u32,
	pub min_group_size: usize,
	pub suggestions: usize,

	pub training: Option<TrainingSource>,
	pub new_training: Option<PathBuf>,

	pub input: Option<PathBuf>,
	pub output: Option<PathBuf>,
	pub has_headers: bool,
	pub batch: bool,
}

impl Settings {
	pub fn resolve(cli: &Cli, config: Config) -> Result<Self, Error> {
		let account = cli
			.account
			.clone()
			.or(config.account)
			.ok_or_else(|| anyhow!("No account specified (use -a or set account in config)"))?;

		let suggestions = cli
			.suggestions
			.or(config.suggestions)
			.unwrap_or(DEFAULT_SUGGESTIONS);
		if suggestions == 0 {
			bail!("At least one suggestion must be shown");
		}

		let training_config = config.training.unwrap_or_default();
		let training = cli
			.training_data
			.clone()
			.or(training_config.path)
			.map(|path| {
				let format = cli
					.training_format
					.or(training_config.format)
					.unwrap_or_default();
				TrainingSource::new(&path, format)
			});

		Ok(Self {
			account,
			currency: cli
				.currency
				.clone()
				.or(config.currency)
				.unwrap_or(DEFAULT_CURRENCY.to_string()),
			max_age: cli.max_age.or(config.max_age).unwrap_or(DEFAULT_MAX_AGE),
			min_group_size: cli
				.min_group_size
				.or(config.min_group_size)
				.unwrap_or(DEFAULT_MIN_GROUP_SIZE),
			suggestions,
			training,
			new_training: cli.new_training_data.as_deref().map(expand_home),
			input: cli.input.as_deref().map(expand_home),
			output: cli.output.as_deref().map(expand_home),
			has_headers: cli.has_headers,
			batch: cli.batch,
		})
	}

	/// The oldest date a training ledger entry may carry.
	pub fn training_begin(&self) -> Date {
		Date::today().days_before(self.max_age)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::parsing::training_file::TrainingFormat;
	use clap::Parser;

	fn cli(args: &[&str]) -> Cli {
		Cli::parse_from([&["ledgerfill"][..], args].concat())
	}

	#[test]
	fn test_defaults() {
		let settings =
			Settings::resolve(&cli(&["convert", "-a", "Assets:Bank"]), Config::default())
				.unwrap();

		assert_eq!(settings.account, "Assets:Bank");
		assert_eq!(settings.currency, DEFAULT_CURRENCY);
		assert_eq!(settings.max_age, DEFAULT_MAX_AGE);
		assert_eq!(settings.min_group_size, DEFAULT_MIN_GROUP_SIZE);
		assert_eq!(settings.suggestions, DEFAULT_SUGGESTIONS);
		assert!(settings.training.is_none());
		assert!(!settings.batch);
	}

	#[test]
	fn test_config_fills_gaps() {
		let config: Config = toml::from_str(
			r#"
			account = "Assets:Checking"
			currency = "$"
			max_age = 365

			[training]
			path = "/tmp/history.csv"
			format = "csv"
			"#,
		)
		.unwrap();

		let settings = Settings::resolve(&cli(&["evaluate"]), config).unwrap();
		assert_eq!(settings.account, "Assets:Checking");
		assert_eq!(settings.currency, "$");
		assert_eq!(settings.max_age, 365);
		assert_eq!(
			settings.training,
			Some(TrainingSource::new("/tmp/history.csv", TrainingFormat::Csv))
		);
	}

	#[test]
	fn test_cli_overrides_config() {
		let config: Config = toml::from_str(
			"account = \"Assets:Checking\"\nsuggestions = 5\n[training]\nformat = \"csv\"\n",
		)
		.unwrap();

		let settings = Settings::resolve(
			&cli(&[
				"convert",
				"-a",
				"Assets:Savings",
				"--suggestions",
				"2",
				"-t",
				"main.ledger",
				"--training-format",
				"ledger",
			]),
			config,
		)
		.unwrap();

		assert_eq!(settings.account, "Assets:Savings");
		assert_eq!(settings.suggestions, 2);
		assert_eq!(
			settings.training,
			Some(TrainingSource::new("main.ledger", TrainingFormat::Ledger))
		);
	}

	#[test]
	fn test_missing_account() {
		assert!(Settings::resolve(&cli(&["convert"]), Config::default()).is_err());
	}

	#[test]
	fn test_zero_suggestions() {
		let args = cli(&["convert", "-a", "Assets:Bank", "--suggestions", "0"]);
		assert!(Settings::resolve(&args, Config::default()).is_err());
	}

	#[test]
	fn test_training_begin() {
		let settings = Settings::resolve(
			&cli(&["convert", "-a", "Assets:Bank", "-m", "0"]),
			Config::default(),
		)
		.unwrap();
		assert_eq!(settings.training_begin(), Date::today());
	}
}
