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
use std::collections::BTreeSet;

/// Every account name seen in the training ledger or typed during the
/// session. Used for completion during manual entry.
#[derive(Debug, Default)]
pub struct KnownAccounts {
	accounts: BTreeSet<String>,
}

impl KnownAccounts {
	pub fn new(accounts: BTreeSet<String>) -> Self {
		Self { accounts }
	}

	pub fn insert(&mut self, account: &str) {
		if !self.accounts.contains(account) {
			self.accounts.insert(account.to_string());
		}
	}

	#[cfg(test)]
	pub fn contains(&self, account: &str) -> bool {
		self.accounts.contains(account)
	}

	#[cfg(test)]
	pub fn len(&self) -> usize {
		self.accounts.len()
	}

	/// Extends input as far as every matching account agrees, so a unique
	/// match completes fully and `Exp` completes to `Expenses:` when all
	/// matches share that prefix. None when nothing can be added.
	pub fn complete(&self, input: &str) -> Option<String> {
		let mut matches = self
			.accounts
			.range(input.to_string()..)
			.take_while(|a| a.starts_with(input));

		let first = matches.next()?;
		let mut common = first.len();

		for other in matches {
			common = first
				.char_indices()
				.zip(other.chars())
				.find(|((_, a), b)| a != b)
				.map(|((i, _), _)| i)
				.unwrap_or(common.min(other.len()))
				.min(common);
		}

		if common > input.len() {
			Some(first[..common].to_string())
		} else {
			None
		}
	}
}
