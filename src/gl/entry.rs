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
use crate::gl::transaction::Transaction;
use crate::util::amount::Amount;
use crate::util::date::Date;
use anyhow::{bail, Error};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fmt;

/// A resolved transaction, ready to be appended to a ledger file. Always
/// holds exactly two details: the statement's own account, carrying the
/// statement amount, and the counterparty, carrying its inverse.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Entry {
	date: Date,
	desc: String,
	details: Vec<Detail>,
}

impl Entry {
	pub fn from_transaction(
		txn: &Transaction,
		source_account: &str,
		destination_account: &str,
	) -> Result<Self, Error> {
		if source_account == destination_account {
			bail!("Entry cannot move money from {} to itself", source_account)
		}

		let mut entry = Self {
			date: *txn.date(),
			desc: clean_desc(txn.payee()),
			details: vec![],
		};

		entry.add_detail(source_account, txn.amount().clone())?;
		entry.add_detail(destination_account, -txn.amount().clone())?;

		Ok(entry)
	}

	fn add_detail(&mut self, account: &str, amount: Amount) -> Result<(), Error> {
		if account.is_empty() {
			bail!("Account is empty")
		}

		self.details.push(Detail::new(account, amount));

		Ok(())
	}

	#[cfg(test)]
	pub fn get_desc(&self) -> &String {
		&self.desc
	}

	#[cfg(test)]
	pub fn get_date(&self) -> &Date {
		&self.date
	}

	#[cfg(test)]
	pub fn details(&self) -> &Vec<Detail> {
		&self.details
	}

	/// True iff every currency in the entry nets to zero.
	pub fn is_balanced(&self) -> bool {
		let mut balances: BTreeMap<&str, Decimal> = BTreeMap::new();

		for detail in &self.details {
			*balances.entry(detail.currency()).or_insert(Decimal::ZERO) +=
				detail.value();
		}

		balances.values().all(|v| v.is_zero())
	}
}

/// Payees end up on the header line, so anything that would split it is
/// flattened to a single space.
fn clean_desc(payee: &str) -> String {
	payee.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl fmt::Display for Entry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "{} {}", self.date, self.desc)?;

		let account_width = self
			.details
			.iter()
			.map(|d| d.account.chars().count())
			.max()
			.unwrap_or(0);

		let amounts: Vec<String> =
			self.details.iter().map(|d| d.amount.to_string()).collect();
		let value_width =
			amounts.iter().map(|a| a.chars().count()).max().unwrap_or(0);

		for (detail, amount) in self.details.iter().zip(amounts) {
			writeln!(
				f,
				"\t{:<account_width$}  {:>value_width$}",
				detail.account,
				amount,
				account_width = account_width,
				value_width = value_width
			)?;
		}

		Ok(())
	}
}

/// A specific line item in an Entry, indicating a credit or debit and the
/// associated account.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Detail {
	account: String,
	amount: Amount,
}

impl Detail {
	pub fn new(account: &str, amount: Amount) -> Self {
		Self {
			account: account.to_string(),
			amount,
		}
	}

	#[cfg(test)]
	pub fn account(&self) -> &String {
		&self.account
	}

	pub fn currency(&self) -> &str {
		&self.amount.currency
	}

	pub fn value(&self) -> Decimal {
		self.amount.value
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn create_transaction(payee: &str, value: Decimal) -> Transaction {
		Transaction::new(
			Date::from_str("2024-03-02").unwrap(),
			payee.to_string(),
			Amount::new(value, "£"),
		)
	}

	#[test]
	fn test_entry_creation() {
		let txn = create_transaction("TESCO STORES 123", Decimal::new(-1250, 2));
		let entry =
			Entry::from_transaction(&txn, "Assets:Bank", "Expenses:Food")
				.unwrap();

		assert_eq!(entry.get_date(), txn.date());
		assert_eq!(entry.get_desc(), "TESCO STORES 123");
		assert_eq!(entry.details().len(), 2);
		assert_eq!(entry.details()[0].account(), "Assets:Bank");
		assert_eq!(entry.details()[0].value(), Decimal::new(-1250, 2));
		assert_eq!(entry.details()[1].account(), "Expenses:Food");
		assert_eq!(entry.details()[1].value(), Decimal::new(1250, 2));
	}

	#[test]
	fn test_entries_balance() {
		for value in [
			Decimal::new(-1250, 2),
			Decimal::new(99999, 3),
			Decimal::ZERO,
		] {
			let txn = create_transaction("Anything", value);
			let entry =
				Entry::from_transaction(&txn, "Assets:Bank", "Income:Misc")
					.unwrap();
			assert!(entry.is_balanced());
		}
	}

	#[test]
	fn test_empty_destination() {
		let txn = create_transaction("Anything", Decimal::ONE);
		assert!(Entry::from_transaction(&txn, "Assets:Bank", "").is_err());
	}

	#[test]
	fn test_same_account_on_both_sides() {
		let txn = create_transaction("Anything", Decimal::ONE);
		assert!(
			Entry::from_transaction(&txn, "Assets:Bank", "Assets:Bank")
				.is_err()
		);
	}

	#[test]
	fn test_multiline_payee_is_flattened() {
		let txn = create_transaction("  CARD PAYMENT\nTO  SHELL ", Decimal::ONE);
		let entry =
			Entry::from_transaction(&txn, "Assets:Bank", "Expenses:Fuel")
				.unwrap();
		assert_eq!(entry.get_desc(), "CARD PAYMENT TO SHELL");
	}

	#[test]
	fn test_display_aligns_amounts() {
		let txn = create_transaction("TESCO STORES 123", Decimal::new(-1250, 2));
		let entry = Entry::from_transaction(
			&txn,
			"Assets:Bank",
			"Expenses:Food:Groceries",
		)
		.unwrap();

		assert_eq!(
			entry.to_string(),
			"2024-03-02 TESCO STORES 123\n\
			 \tAssets:Bank              -£12.50\n\
			 \tExpenses:Food:Groceries   £12.50\n"
		);
	}
}
