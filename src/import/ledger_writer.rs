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
use crate::gl::entry::Entry;
use anyhow::{anyhow, bail, Error};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

fn open_append(path: &Path) -> Result<File, Error> {
	OpenOptions::new()
		.read(true)
		.append(true)
		.create(true)
		.open(path)
		.map_err(|e| anyhow!("Unable to open {} for writing: {}", path.display(), e))
}

/// Appends entries to a ledger. Each entry goes out in a single write and is
/// flushed before the next, so an interrupted import leaves only complete
/// entries behind.
pub struct LedgerWriter<W: Write> {
	out: W,
	/// Written before the next entry so it is set off from whatever the
	/// file already held by one blank line
	separator: &'static str,
	written: usize,
}

impl LedgerWriter<File> {
	pub fn open(path: &Path) -> Result<Self, Error> {
		let mut file = open_append(path)?;
		let separator = separator_after(&mut file)
			.map_err(|e| anyhow!("Unable to read {}: {}", path.display(), e))?;

		let mut writer = LedgerWriter::new(file);
		writer.separator = separator;
		Ok(writer)
	}
}

/// Looks only at the last two bytes of what is already there.
fn separator_after<R: Read + Seek>(existing: &mut R) -> io::Result<&'static str> {
	let len = existing.seek(SeekFrom::End(0))?;
	existing.seek(SeekFrom::Start(len.saturating_sub(2)))?;

	let mut tail = Vec::with_capacity(2);
	existing.by_ref().take(2).read_to_end(&mut tail)?;

	Ok(match tail.as_slice() {
		[] | [b'\n', b'\n'] => "",
		[.., b'\n'] => "\n",
		_ => "\n\n",
	})
}

impl<W: Write> LedgerWriter<W> {
	pub fn new(out: W) -> Self {
		Self {
			out,
			separator: "",
			written: 0,
		}
	}

	pub fn append(&mut self, entry: &Entry) -> Result<(), Error> {
		if !entry.is_balanced() {
			bail!("Refusing to write unbalanced entry:\n{}", entry);
		}

		let block = format!("{}{}\n", self.separator, entry);

		self.out.write_all(block.as_bytes())?;
		self.out.flush()?;

		self.separator = "";
		self.written += 1;
		Ok(())
	}

	pub fn written(&self) -> usize {
		self.written
	}

	#[cfg(test)]
	pub fn get_ref(&self) -> &W {
		&self.out
	}
}

/// Appends payee,account rows to a training CSV, flushing each one.
pub struct TrainingWriter<W: Write> {
	out: csv::Writer<W>,
}

impl TrainingWriter<File> {
	pub fn open(path: &Path) -> Result<Self, Error> {
		Ok(TrainingWriter::new(open_append(path)?))
	}
}

impl<W: Write> TrainingWriter<W> {
	pub fn new(out: W) -> Self {
		Self {
			out: csv::WriterBuilder::new().has_headers(false).from_writer(out),
		}
	}

	pub fn append(&mut self, payee: &str, account: &str) -> Result<(), Error> {
		self.out.write_record([payee, account])?;
		self.out.flush()?;
		Ok(())
	}

	#[cfg(test)]
	pub fn get_ref(&self) -> &W {
		self.out.get_ref()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::gl::transaction::Transaction;
	use crate::util::amount::Amount;
	use crate::util::date::Date;
	use rust_decimal::Decimal;
	use std::fs;
	use std::io::Cursor;

	fn entry(payee: &str, cents: i64, account: &str) -> Entry {
		let txn = Transaction::new(
			Date::from_str("2024-03-02").unwrap(),
			payee.to_string(),
			Amount::new(Decimal::new(cents, 2), "£"),
		);
		Entry::from_transaction(&txn, "Assets:Bank", account).unwrap()
	}

	#[test]
	fn test_append_to_buffer() {
		let mut writer = LedgerWriter::new(Vec::new());
		writer.append(&entry("TESCO", -1250, "Expenses:Food")).unwrap();
		writer.append(&entry("SHELL", -4000, "Expenses:Fuel")).unwrap();

		assert_eq!(writer.written(), 2);
		let text = String::from_utf8(writer.get_ref().clone()).unwrap();
		assert_eq!(
			text,
			"2024-03-02 TESCO\n\
			 \tAssets:Bank    -£12.50\n\
			 \tExpenses:Food   £12.50\n\
			 \n\
			 2024-03-02 SHELL\n\
			 \tAssets:Bank    -£40.00\n\
			 \tExpenses:Fuel   £40.00\n\
			 \n"
		);
	}

	#[test]
	fn test_open_appends() {
		let file = tempfile::NamedTempFile::new().unwrap();
		fs::write(file.path(), "; existing ledger\n").unwrap();

		let mut writer = LedgerWriter::open(file.path()).unwrap();
		writer.append(&entry("TESCO", -1250, "Expenses:Food")).unwrap();
		drop(writer);

		let text = fs::read_to_string(file.path()).unwrap();
		assert!(text.starts_with("; existing ledger\n\n2024-03-02 TESCO\n"));
		assert!(text.ends_with("£12.50\n\n"));
	}

	#[test]
	fn test_open_separates_from_unterminated_text() {
		let file = tempfile::NamedTempFile::new().unwrap();
		fs::write(file.path(), "; no newline").unwrap();

		let mut writer = LedgerWriter::open(file.path()).unwrap();
		writer.append(&entry("TESCO", -1250, "Expenses:Food")).unwrap();

		let text = fs::read_to_string(file.path()).unwrap();
		assert!(text.starts_with("; no newline\n\n2024-03-02 TESCO\n"));
	}

	#[test]
	fn test_reopen_keeps_single_blank_line() {
		let file = tempfile::NamedTempFile::new().unwrap();
		for payee in ["TESCO", "SHELL"] {
			let mut writer = LedgerWriter::open(file.path()).unwrap();
			writer.append(&entry(payee, -1250, "Expenses:Food")).unwrap();
		}

		let text = fs::read_to_string(file.path()).unwrap();
		assert!(text.contains("£12.50\n\n2024-03-02 SHELL\n"));
		assert!(!text.contains("\n\n\n"));
	}

	#[test]
	fn test_separator_after() {
		for (existing, expected) in [
			("", ""),
			("\n", "\n"),
			("; a\n", "\n"),
			("; a\n\n", ""),
			("; a", "\n\n"),
			("x", "\n\n"),
		] {
			let mut cursor = Cursor::new(existing.as_bytes());
			assert_eq!(separator_after(&mut cursor).unwrap(), expected, "{:?}", existing);
		}
	}

	#[test]
	fn test_open_directory_fails() {
		let dir = tempfile::tempdir().unwrap();
		assert!(LedgerWriter::open(dir.path()).is_err());
	}

	#[test]
	fn test_open_creates() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("new.ledger");

		let mut writer = LedgerWriter::open(&path).unwrap();
		writer.append(&entry("TESCO", -1250, "Expenses:Food")).unwrap();

		let text = fs::read_to_string(&path).unwrap();
		assert!(text.starts_with("2024-03-02 TESCO\n"));
	}

	#[test]
	fn test_interrupted_run_leaves_complete_entries() {
		let file = tempfile::NamedTempFile::new().unwrap();
		{
			let mut writer = LedgerWriter::open(file.path()).unwrap();
			writer.append(&entry("TESCO", -1250, "Expenses:Food")).unwrap();
			writer.append(&entry("SHELL", -4000, "Expenses:Fuel")).unwrap();
			// dropped without any further cleanup
		}

		let text = fs::read_to_string(file.path()).unwrap();
		assert_eq!(text.matches("2024-03-02 ").count(), 2);
		assert_eq!(text.lines().filter(|l| l.starts_with('\t')).count(), 4);
	}

	#[test]
	fn test_training_writer() {
		let mut writer = TrainingWriter::new(Vec::new());
		writer.append("TESCO STORES 123", "Expenses:Food").unwrap();
		writer.append("ACME, LTD", "Income:Salary").unwrap();

		let text = String::from_utf8(writer.get_ref().clone()).unwrap();
		assert_eq!(
			text,
			"TESCO STORES 123,Expenses:Food\n\"ACME, LTD\",Income:Salary\n"
		);
	}
}
