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
use crate::gl::transaction::Transaction;
use crate::util::amount::Amount;
use crate::util::date::Date;
use anyhow::{anyhow, bail, Error};
use std::fs::File;
use std::io;
use std::path::Path;

/// Reads a statement CSV already normalized to date,payee,amount rows.
pub struct StatementReader {
	has_headers: bool,
	currency: String,
}

impl StatementReader {
	pub fn new(has_headers: bool, currency: &str) -> Self {
		Self {
			has_headers,
			currency: currency.to_string(),
		}
	}

	pub fn read_file(&self, path: &Path) -> Result<Vec<Transaction>, Error> {
		let file = File::open(path)
			.map_err(|e| anyhow!("Unable to open {}: {}", path.display(), e))?;
		self.read(file)
	}

	/// Reads every row. A malformed row is skipped with a warning; it never
	/// aborts the rest of the statement.
	pub fn read<R: io::Read>(&self, reader: R) -> Result<Vec<Transaction>, Error> {
		let mut csv_reader = csv::ReaderBuilder::new()
			.has_headers(self.has_headers)
			.flexible(true)
			.trim(csv::Trim::All)
			.from_reader(reader);

		let mut transactions = Vec::new();

		for (i, record) in csv_reader.records().enumerate() {
			let row = i + 1;
			let parsed = record
				.map_err(Error::from)
				.and_then(|r| self.parse_record(&r));

			match parsed {
				Ok(txn) => transactions.push(txn),
				Err(e) => log::warn!("Skipping statement row {}: {}", row, e),
			}
		}

		Ok(transactions)
	}

	fn parse_record(&self, record: &csv::StringRecord) -> Result<Transaction, Error> {
		if record.len() != 3 {
			bail!("expected date,payee,amount but found {} fields", record.len());
		}

		let date = Date::parse_flexible(&record[0])?;
		let payee = record[1].to_string();
		if payee.is_empty() {
			bail!("missing payee");
		}
		let amount = Amount::parse(&record[2], &self.currency)?;

		Ok(Transaction::new(date, payee, amount))
	}
}
