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
use crate::model::training_set::{TrainingExample, TrainingSet};
use crate::parsing::filesystem::Filesystem;
use crate::util::date::Date;
use anyhow::{anyhow, bail, Error};
use regex::Regex;
use std::io;
use std::io::BufRead;
use std::path::Path;

/// Reads ledger files for training data. Only the account names of each
/// posting are inspected; amounts are never parsed, so the parser is
/// agnostic to commodities, costs and balance assertions.
pub struct LedgerParser {
	fs: Filesystem,
	header_regex: Regex,

	/// The account statements are imported into. Examples are taken from
	/// the other side of entries that touch it.
	account: String,
	/// Entries dated before this are ignored.
	begin: Date,

	current: Option<PendingEntry>,
	/// Set while inside a block whose indented lines are not postings we
	/// care about: periodic and automated transactions, directives, and
	/// entries outside the date range.
	skip_block: bool,
}

struct PendingEntry {
	payee: String,
	accounts: Vec<String>,
}

impl LedgerParser {
	pub fn new(account: &str, begin: Date) -> Self {
		let re = Regex::new(
			r"^(\d{4}[-/]\d{1,2}[-/]\d{1,2})(?:=\S+)?(?:\s+[*!])?(?:\s+\([^)]*\))?\s+(.+)$",
		)
		.unwrap();
		Self {
			fs: Filesystem::new(),
			header_regex: re,
			account: account.to_string(),
			begin,
			current: None,
			skip_block: false,
		}
	}

	/// Opens and parses the file at path, following includes, and returns
	/// the training examples found.
	pub fn parse(&mut self, path: &Path) -> Result<TrainingSet, Error> {
		let mut output = TrainingSet::new();
		self.parse_file(path, &mut output)?;
		Ok(output)
	}

	fn parse_file(
		&mut self,
		path: &Path,
		output: &mut TrainingSet,
	) -> Result<(), Error> {
		self.fs.declare_file(path)?;

		let reader = io::BufReader::new(self.fs.open(path)?);
		for (i, line) in reader.lines().enumerate() {
			self.parse_line(path, &line?, i + 1, output)?;
		}

		// Entries never span files
		self.finish_entry(output);
		self.skip_block = false;

		Ok(())
	}

	fn parse_line(
		&mut self,
		path: &Path,
		line: &str,
		line_no: usize,
		output: &mut TrainingSet,
	) -> Result<(), Error> {
		let line = line.trim_end();

		// If a line is blank, this entry is over (or we are not in one)
		if line.is_empty() {
			self.finish_entry(output);
			self.skip_block = false;
			return Ok(());
		}

		if line.starts_with(char::is_whitespace) {
			return self.parse_posting(line.trim(), line_no);
		}

		match line.chars().next() {
			Some(';' | '#' | '%' | '|' | '*') => Ok(()),
			Some('~' | '=') => {
				self.finish_entry(output);
				self.skip_block = true;
				Ok(())
			},
			Some(c) if c.is_ascii_digit() => {
				self.finish_entry(output);
				self.parse_header(line, line_no)
			},
			_ => {
				self.finish_entry(output);

				if let Some(target) = line.strip_prefix("include ") {
					let included = self.fs.resolve_include(path, target.trim());
					self.parse_file(&included, output)
						.map_err(|e| anyhow!("{} (line {})", e, line_no))?;
					return Ok(());
				}

				// Any other directive, along with its indented sub-lines
				self.skip_block = true;
				Ok(())
			},
		}
	}

	fn parse_header(&mut self, line: &str, line_no: usize) -> Result<(), Error> {
		let caps = self.header_regex.captures(line).ok_or_else(|| {
			anyhow!("Invalid entry header (line {}): {}", line_no, line)
		})?;

		let date = Date::from_str(&caps[1])
			.map_err(|e| anyhow!("{} (line {})", e, line_no))?;

		if date < self.begin {
			self.skip_block = true;
			return Ok(());
		}

		self.skip_block = false;
		self.current = Some(PendingEntry {
			payee: strip_note(&caps[2]).to_string(),
			accounts: vec![],
		});

		Ok(())
	}

	fn parse_posting(&mut self, line: &str, line_no: usize) -> Result<(), Error> {
		if self.skip_block || line.starts_with(';') {
			return Ok(());
		}

		let entry = match &mut self.current {
			Some(entry) => entry,
			None => bail!("Posting outside of an entry (line {})", line_no),
		};

		match posting_account(line) {
			Some(account) => entry.accounts.push(account),
			None => bail!("Invalid posting (line {}): {}", line_no, line),
		}

		Ok(())
	}

	/// Completes the pending entry, if any, recording its accounts and,
	/// when it is a simple two-sided transaction against the configured
	/// account, a training example.
	fn finish_entry(&mut self, output: &mut TrainingSet) {
		let entry = match self.current.take() {
			Some(entry) => entry,
			None => return,
		};

		for account in &entry.accounts {
			output.note_account(account);
		}

		let references_account = entry.accounts.iter().any(|a| *a == self.account);
		let mut others: Vec<&String> = entry
			.accounts
			.iter()
			.filter(|a| **a != self.account)
			.collect();
		others.sort();
		others.dedup();

		if references_account && others.len() == 1 {
			output.add_example(TrainingExample::new(&entry.payee, others[0]));
		}
	}
}

/// Cuts a trailing `; note` from an entry header.
fn strip_note(payee: &str) -> &str {
	let note = [payee.find("  ;"), payee.find("\t;")]
		.into_iter()
		.flatten()
		.min();
	match note {
		Some(i) => payee[..i].trim(),
		None => payee.trim(),
	}
}

/// Extracts the account name from a posting line. The name ends at the
/// first tab or double space; virtual account brackets are removed.
fn posting_account(line: &str) -> Option<String> {
	let line = match line.strip_prefix(['*', '!']) {
		Some(rest) => rest.trim_start(),
		None => line,
	};

	let end = [line.find("  "), line.find('\t')]
		.into_iter()
		.flatten()
		.min()
		.unwrap_or(line.len());
	let mut account = line[..end].trim();

	if (account.starts_with('(') && account.ends_with(')'))
		|| (account.starts_with('[') && account.ends_with(']'))
	{
		account = account[1..account.len() - 1].trim();
	}

	if account.is_empty() {
		None
	} else {
		Some(account.to_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;
	use tempfile::TempDir;

	const ACCOUNT: &str = "Assets:Bank";

	fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
		let path = dir.path().join(name);
		fs::write(&path, content).unwrap();
		path
	}

	fn parse(content: &str, begin: &str) -> Result<TrainingSet, Error> {
		let dir = TempDir::new().unwrap();
		let path = write(&dir, "main.ledger", content);
		LedgerParser::new(ACCOUNT, Date::from_str(begin).unwrap()).parse(&path)
	}

	#[test]
	fn test_simple_entries() {
		let set = parse(
			"2024-06-02 TESCO STORES 123\n\
			 \tExpenses:Food:Groceries   £12.50\n\
			 \tAssets:Bank\n\
			 \n\
			 2024-06-03 SHELL\n\
			 \tAssets:Bank  -£40.00\n\
			 \tExpenses:Fuel  £40.00\n",
			"2024-01-01",
		)
		.unwrap();

		assert_eq!(
			set.examples(),
			&[
				TrainingExample::new("TESCO STORES 123", "Expenses:Food:Groceries"),
				TrainingExample::new("SHELL", "Expenses:Fuel"),
			]
		);
	}

	#[test]
	fn test_entries_must_reference_account() {
		let set = parse(
			"2024-06-02 Transfer\n\
			 \tAssets:Savings   £100\n\
			 \tAssets:Cash\n",
			"2024-01-01",
		)
		.unwrap();

		assert!(set.is_empty());
		assert!(set.accounts().contains("Assets:Savings"));
		assert!(set.accounts().contains("Assets:Cash"));
	}

	#[test]
	fn test_split_entries_are_not_examples() {
		let set = parse(
			"2024-06-02 Supermarket\n\
			 \tExpenses:Food   £10\n\
			 \tExpenses:Household   £5\n\
			 \tAssets:Bank\n",
			"2024-01-01",
		)
		.unwrap();

		assert!(set.is_empty());
		assert!(set.accounts().contains("Expenses:Household"));
	}

	#[test]
	fn test_repeated_counterparty_is_one_side() {
		let set = parse(
			"2024-06-02 Supermarket\n\
			 \tExpenses:Food   £10\n\
			 \tExpenses:Food   £5\n\
			 \tAssets:Bank\n",
			"2024-01-01",
		)
		.unwrap();

		assert_eq!(set.len(), 1);
	}

	#[test]
	fn test_age_filter_straddling_cutoff() {
		let set = parse(
			"2024-05-31 SHELL\n\
			 \tExpenses:Fuel   £40\n\
			 \tAssets:Bank\n\
			 \n\
			 2024-06-01 TESCO\n\
			 \tExpenses:Food   £12\n\
			 \tAssets:Bank\n",
			"2024-06-01",
		)
		.unwrap();

		assert_eq!(set.examples(), &[TrainingExample::new("TESCO", "Expenses:Food")]);
		assert!(!set.accounts().contains("Expenses:Fuel"));
	}

	#[test]
	fn test_header_variants() {
		let set = parse(
			"2024/06/02=2024/06/04 * (1234) NETFLIX.COM  ; monthly\n\
			 \t(Expenses:Subscriptions)   $9.99\n\
			 \t* Assets:Bank  ; cleared\n\
			 \n\
			 2024-6-5 ! Gym\n\
			 \t[Expenses:Health]\t£30\n\
			 \tAssets:Bank\n",
			"2024-01-01",
		)
		.unwrap();

		assert_eq!(
			set.examples(),
			&[
				TrainingExample::new("NETFLIX.COM", "Expenses:Subscriptions"),
				TrainingExample::new("Gym", "Expenses:Health"),
			]
		);
	}

	#[test]
	fn test_account_names_with_single_spaces() {
		let set = parse(
			"2024-06-02 Corner shop\n\
			 \tExpenses:Food and Drink  £3\n\
			 \tAssets:Bank\n",
			"2024-01-01",
		)
		.unwrap();

		assert_eq!(set.examples()[0].account, "Expenses:Food and Drink");
	}

	#[test]
	fn test_comments_and_directives_are_skipped() {
		let set = parse(
			"; a comment\n\
			 # another\n\
			 account Expenses:Food\n\
			 \tnote Groceries and such\n\
			 commodity £\n\
			 \n\
			 ~ Monthly\n\
			 \tExpenses:Rent   £500\n\
			 \tAssets:Bank\n\
			 \n\
			 = expr true\n\
			 \t(Budget)   1\n\
			 \n\
			 2024-06-02 TESCO\n\
			 \t; a posting comment\n\
			 \tExpenses:Food   £12\n\
			 \tAssets:Bank\n",
			"2024-01-01",
		)
		.unwrap();

		assert_eq!(set.examples(), &[TrainingExample::new("TESCO", "Expenses:Food")]);
		assert!(!set.accounts().contains("Expenses:Rent"));
	}

	#[test]
	fn test_includes() {
		let dir = TempDir::new().unwrap();
		write(
			&dir,
			"2024.ledger",
			"2024-06-02 TESCO\n\tExpenses:Food   £12\n\tAssets:Bank\n",
		);
		let main = write(
			&dir,
			"main.ledger",
			"include 2024.ledger\n\n2024-06-03 SHELL\n\tExpenses:Fuel  £1\n\tAssets:Bank\n",
		);

		let set = LedgerParser::new(ACCOUNT, Date::min()).parse(&main).unwrap();
		assert_eq!(set.len(), 2);
	}

	#[test]
	fn test_circular_includes() {
		let dir = TempDir::new().unwrap();
		write(&dir, "a.ledger", "include b.ledger\n");
		let b = write(&dir, "b.ledger", "include a.ledger\n");

		assert!(LedgerParser::new(ACCOUNT, Date::min()).parse(&b).is_err());
	}

	#[test]
	fn test_missing_include() {
		assert!(parse("include nowhere.ledger\n", "2024-01-01").is_err());
	}

	#[test]
	fn test_invalid_date() {
		assert!(parse("2024-13-45 Nonsense\n\tAssets:Bank\n", "2024-01-01").is_err());
	}

	#[test]
	fn test_orphaned_posting() {
		assert!(parse("\tAssets:Bank   £3\n", "2024-01-01").is_err());
	}

	#[test]
	fn test_header_without_payee() {
		assert!(parse("2024-06-02\n\tAssets:Bank\n", "2024-01-01").is_err());
	}
}
