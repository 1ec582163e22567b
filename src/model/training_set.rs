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
use std::collections::{BTreeMap, BTreeSet};

/// A payee description labeled with the account it was booked against.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TrainingExample {
	pub payee: String,
	pub account: String,
}

impl TrainingExample {
	pub fn new(payee: &str, account: &str) -> Self {
		Self {
			payee: payee.to_string(),
			account: account.to_string(),
		}
	}
}

/// Examples for fitting a model, plus every account name seen while
/// collecting them. The latter only feeds completion during manual entry;
/// prediction labels come from the examples alone.
#[derive(Debug, Default)]
pub struct TrainingSet {
	examples: Vec<TrainingExample>,
	accounts: BTreeSet<String>,
}

impl TrainingSet {
	pub fn new() -> Self {
		Default::default()
	}

	pub fn add_example(&mut self, example: TrainingExample) {
		self.accounts.insert(example.account.clone());
		self.examples.push(example);
	}

	pub fn note_account(&mut self, account: &str) {
		if !self.accounts.contains(account) {
			self.accounts.insert(account.to_string());
		}
	}

	pub fn examples(&self) -> &[TrainingExample] {
		&self.examples
	}

	#[cfg(test)]
	pub fn accounts(&self) -> &BTreeSet<String> {
		&self.accounts
	}

	pub fn take_accounts(self) -> BTreeSet<String> {
		self.accounts
	}

	pub fn len(&self) -> usize {
		self.examples.len()
	}

	#[cfg(test)]
	pub fn is_empty(&self) -> bool {
		self.examples.is_empty()
	}

	/// Drops examples of accounts with fewer than min_size examples, which
	/// are too rare to learn from. Returns the number of examples dropped.
	/// Dropped accounts stay known for completion.
	pub fn remove_small_groups(&mut self, min_size: usize) -> usize {
		let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
		for example in &self.examples {
			*counts.entry(example.account.as_str()).or_insert(0) += 1;
		}

		let keep: BTreeSet<String> = counts
			.into_iter()
			.filter(|(_, count)| *count >= min_size)
			.map(|(account, _)| account.to_string())
			.collect();

		let before = self.examples.len();
		self.examples.retain(|e| keep.contains(&e.account));
		before - self.examples.len()
	}
}
