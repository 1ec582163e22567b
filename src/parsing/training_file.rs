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
use crate::model::training_set::{TrainingExample, TrainingSet};
use crate::parsing::filesystem::expand_home;
use crate::parsing::ledger_parser::LedgerParser;
use crate::util::date::Date;
use anyhow::{anyhow, Error};
use clap::ValueEnum;
use serde::Deserialize;
use std::io;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TrainingFormat {
	/// A ledger file; examples come from its simple two-sided entries
	#[default]
	Ledger,
	/// A headerless CSV of payee,account rows
	Csv,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TrainingSource {
	pub path: PathBuf,
	pub format: TrainingFormat,
}

impl TrainingSource {
	pub fn new(path: &str, format: TrainingFormat) -> Self {
		Self {
			path: expand_home(path),
			format,
		}
	}

	/// Reads the source. Ledger entries dated before begin are ignored;
	/// CSV rows carry no dates and are always used.
	pub fn load(&self, account: &str, begin: Date) -> Result<TrainingSet, Error> {
		match self.format {
			TrainingFormat::Ledger => {
				LedgerParser::new(account, begin).parse(&self.path)
			},
			TrainingFormat::Csv => {
				let file = std::fs::File::open(&self.path).map_err(|e| {
					anyhow!("Unable to open {}: {}", self.path.display(), e)
				})?;
				read_training_csv(file)
			},
		}
	}

	/// Like load, but training data is optional: failures are logged and
	/// yield an empty set so the import can go ahead without predictions.
	pub fn load_or_empty(&self, account: &str, begin: Date) -> TrainingSet {
		match self.load(account, begin) {
			Ok(set) => set,
			Err(e) => {
				log::warn!(
					"Ignoring training data in {}: {}",
					self.path.display(),
					e
				);
				TrainingSet::new()
			},
		}
	}
}

/// Reads payee,account rows. Rows that do not have exactly two non-empty
/// fields are skipped with a warning.
pub fn read_training_csv<R: io::Read>(reader: R) -> Result<TrainingSet, Error> {
	let mut csv_reader = csv::ReaderBuilder::new()
		.has_headers(false)
		.flexible(true)
		.trim(csv::Trim::All)
		.from_reader(reader);

	let mut set = TrainingSet::new();

	for (i, record) in csv_reader.records().enumerate() {
		let record = match record {
			Ok(record) => record,
			Err(e) => {
				log::warn!("Skipping training row {}: {}", i + 1, e);
				continue;
			},
		};

		match (record.len(), record.get(0), record.get(1)) {
			(2, Some(payee), Some(account))
				if !payee.is_empty() && !account.is_empty() =>
			{
				set.add_example(TrainingExample::new(payee, account))
			},
			_ => log::warn!("Skipping training row {}: expected payee,account", i + 1),
		}
	}

	Ok(set)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;

	#[test]
	fn test_read_training_csv() {
		let data = "TESCO STORES 123,Expenses:Food\n\
					\"SHELL, M4\",Expenses:Fuel\n";
		let set = read_training_csv(data.as_bytes()).unwrap();

		assert_eq!(
			set.examples(),
			&[
				TrainingExample::new("TESCO STORES 123", "Expenses:Food"),
				TrainingExample::new("SHELL, M4", "Expenses:Fuel"),
			]
		);
	}

	#[test]
	fn test_read_training_csv_skips_bad_rows() {
		let data = "TESCO,Expenses:Food\nmissing account\n,Expenses:Food\na,b,c\n";
		let set = read_training_csv(data.as_bytes()).unwrap();
		assert_eq!(set.len(), 1);
	}

	#[test]
	fn test_read_training_csv_skips_invalid_utf8() {
		let data: &[u8] = b"TESCO,Expenses:Food\n\
			SHELL,Expenses:Fuel\n\
			CAF\xc9 NERO,Expenses:Eating\n\
			NETFLIX,Expenses:Fun\n";
		let set = read_training_csv(data).unwrap();

		assert_eq!(
			set.examples(),
			&[
				TrainingExample::new("TESCO", "Expenses:Food"),
				TrainingExample::new("SHELL", "Expenses:Fuel"),
				TrainingExample::new("NETFLIX", "Expenses:Fun"),
			]
		);
	}

	#[test]
	fn test_load_csv_source() {
		let file = tempfile::NamedTempFile::new().unwrap();
		fs::write(file.path(), "NETFLIX,Expenses:Fun\n").unwrap();

		let source = TrainingSource::new(
			&file.path().to_string_lossy(),
			TrainingFormat::Csv,
		);
		let set = source.load("Assets:Bank", Date::today()).unwrap();
		assert_eq!(set.len(), 1);
	}

	#[test]
	fn test_missing_source_is_empty() {
		let source =
			TrainingSource::new("/no/such/file.ledger", TrainingFormat::Ledger);
		assert!(source.load("Assets:Bank", Date::min()).is_err());
		assert!(source.load_or_empty("Assets:Bank", Date::min()).is_empty());
	}

	#[test]
	fn test_malformed_ledger_is_empty() {
		let file = tempfile::NamedTempFile::new().unwrap();
		fs::write(file.path(), "2024-99-99 Broken\n\tAssets:Bank\n").unwrap();

		let source = TrainingSource::new(
			&file.path().to_string_lossy(),
			TrainingFormat::Ledger,
		);
		assert!(source.load_or_empty("Assets:Bank", Date::min()).is_empty());
	}
}
