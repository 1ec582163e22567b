/* Copyright © 2024-2025 Adam Train <adam@adamtrain.net>
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
use crate::parsing::training_file::TrainingFormat;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
	/// Currency symbol or code rendered on every amount
	pub currency: Option<String>,
	/// The account statements belong to, e.g. Assets:Bank:Current
	pub account: Option<String>,
	/// Maximum age, in days, of ledger entries used for training
	pub max_age: Option<u32>,
	pub min_group_size: Option<usize>,
	pub suggestions: Option<usize>,

	pub training: Option<Training>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Training {
	pub path: Option<String>,
	pub format: Option<TrainingFormat>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_empty_config() {
		let config: Config = toml::from_str("").unwrap();
		assert!(config.currency.is_none());
		assert!(config.training.is_none());
	}

	#[test]
	fn test_full_config() {
		let config: Config = toml::from_str(
			r#"
			currency = "$"
			account = "Assets:Checking"
			max_age = 365
			min_group_size = 5
			suggestions = 4

			[training]
			path = "~/ledger/main.ledger"
			format = "csv"
			"#,
		)
		.unwrap();

		assert_eq!(config.currency.as_deref(), Some("$"));
		assert_eq!(config.account.as_deref(), Some("Assets:Checking"));
		assert_eq!(config.max_age, Some(365));
		assert_eq!(config.min_group_size, Some(5));
		assert_eq!(config.suggestions, Some(4));

		let training = config.training.unwrap();
		assert_eq!(training.path.as_deref(), Some("~/ledger/main.ledger"));
		assert_eq!(training.format, Some(TrainingFormat::Csv));
	}

	#[test]
	fn test_unknown_key_rejected() {
		assert!(toml::from_str::<Config>("curency = \"$\"").is_err());
	}
}
