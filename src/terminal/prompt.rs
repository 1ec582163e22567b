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
use crate::import::known_accounts::KnownAccounts;
use crate::import::resolver::Prompter;
use anyhow::Error;
use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{BasicHistory, Completion, Input, Select};

/// Entries kept for recall with the arrow keys
pub const HISTORY_SIZE: usize = 100;

/// Interactive prompts on the controlling terminal.
pub struct TerminalPrompter {
	theme: ColorfulTheme,
	history: BasicHistory,
}

impl TerminalPrompter {
	pub fn new() -> Self {
		Self {
			theme: ColorfulTheme::default(),
			history: BasicHistory::new()
				.max_entries(HISTORY_SIZE)
				.no_duplicates(true),
		}
	}
}

impl Prompter for TerminalPrompter {
	fn select(
		&mut self,
		prompt: &str,
		items: &[String],
		default: usize,
	) -> Result<Option<usize>, Error> {
		Ok(Select::with_theme(&self.theme)
			.with_prompt(prompt)
			.items(items)
			.default(default)
			.interact_opt()?)
	}

	fn input(
		&mut self,
		prompt: &str,
		accounts: &KnownAccounts,
	) -> Result<String, Error> {
		Ok(Input::<String>::with_theme(&self.theme)
			.with_prompt(prompt)
			.allow_empty(true)
			.completion_with(accounts)
			.history_with(&mut self.history)
			.interact_text()?)
	}

	fn warn(&mut self, message: &str) {
		eprintln!("{}", style(message).yellow());
	}
}

impl Completion for KnownAccounts {
	fn get(&self, input: &str) -> Option<String> {
		self.complete(input)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_tab_completion() {
		let mut accounts = KnownAccounts::default();
		accounts.insert("Expenses:Food:Groceries");
		accounts.insert("Expenses:Fuel");

		let completion: &dyn Completion = &accounts;
		assert_eq!(completion.get("Exp").as_deref(), Some("Expenses:F"));
		assert_eq!(
			completion.get("Expenses:Fo").as_deref(),
			Some("Expenses:Food:Groceries")
		);
		assert_eq!(completion.get("Income"), None);
	}
}
