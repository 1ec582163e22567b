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
use crate::import::importer::PLACEHOLDER;
use crate::import::known_accounts::KnownAccounts;
use crate::model::predictor::Prediction;
use anyhow::{bail, Error};

pub const MANUAL_ENTRY: &str = "Enter account manually";
pub const QUIT: &str = "Quit";
/// Typed at the manual entry prompt to stop importing
pub const QUIT_COMMAND: &str = ":q";

/// The user-facing side of resolution. The terminal implementation prompts
/// interactively; batch mode answers every question itself.
pub trait Prompter {
	/// Picks one of items, or None if the user backed out.
	fn select(
		&mut self,
		prompt: &str,
		items: &[String],
		default: usize,
	) -> Result<Option<usize>, Error>;

	/// Reads a free-text account name.
	fn input(
		&mut self,
		prompt: &str,
		accounts: &KnownAccounts,
	) -> Result<String, Error>;

	fn warn(&mut self, message: &str);

	/// False when nobody is there to answer a retry differently.
	fn interactive(&self) -> bool {
		true
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum Resolution {
	Account(String),
	Quit,
}

/// Decides the counterparty account of each transaction, offering the
/// model's ranked predictions first and manual entry after that.
pub struct Resolver<P: Prompter> {
	prompter: P,
	accounts: KnownAccounts,
	/// How many ranked predictions are offered
	suggestions: usize,
}

impl<P: Prompter> Resolver<P> {
	pub fn new(prompter: P, accounts: KnownAccounts, suggestions: usize) -> Self {
		Self {
			prompter,
			accounts,
			suggestions: suggestions.max(1),
		}
	}

	#[cfg(test)]
	pub fn accounts(&self) -> &KnownAccounts {
		&self.accounts
	}

	pub fn warn(&mut self, message: &str) {
		self.prompter.warn(message);
	}

	pub fn interactive(&self) -> bool {
		self.prompter.interactive()
	}

	#[cfg(test)]
	pub fn prompter(&self) -> &P {
		&self.prompter
	}

	pub fn resolve(
		&mut self,
		txn: &Transaction,
		predictions: &[Prediction],
	) -> Result<Resolution, Error> {
		let header = txn.to_string();

		if predictions.is_empty() {
			return self.manual(&header);
		}

		let shown = &predictions[..predictions.len().min(self.suggestions)];
		let mut items: Vec<String> = shown.iter().map(|p| p.to_string()).collect();
		items.push(MANUAL_ENTRY.to_string());
		items.push(QUIT.to_string());

		match self.prompter.select(&header, &items, 0)? {
			Some(i) if i < shown.len() => {
				Ok(Resolution::Account(shown[i].account.clone()))
			},
			Some(i) if i == shown.len() => self.manual(&header),
			_ => Ok(Resolution::Quit),
		}
	}

	/// Prompts until a usable account name or the quit command is entered.
	fn manual(&mut self, header: &str) -> Result<Resolution, Error> {
		let prompt = format!("{} account ({} to quit)", header, QUIT_COMMAND);

		loop {
			let input = self.prompter.input(&prompt, &self.accounts)?;
			let account = input.trim();

			if account == QUIT_COMMAND {
				return Ok(Resolution::Quit);
			}

			match validate_account(account) {
				Ok(()) => {
					self.accounts.insert(account);
					return Ok(Resolution::Account(account.to_string()));
				},
				Err(e) => self.prompter.warn(&e.to_string()),
			}
		}
	}
}

pub fn validate_account(account: &str) -> Result<(), Error> {
	if account.is_empty() {
		bail!("Account name cannot be empty");
	}
	// ledger ends an account name at two spaces or a tab
	if account.contains("  ") || account.chars().any(|c| c.is_whitespace() && c != ' ') {
		bail!(
			"Account name cannot contain tabs or repeated spaces: {}",
			account
		);
	}
	Ok(())
}

/// Answers without asking: the top prediction if there is one, otherwise
/// the placeholder account for fixing up by hand later.
pub struct BatchPrompter;

impl Prompter for BatchPrompter {
	fn select(
		&mut self,
		_prompt: &str,
		_items: &[String],
		default: usize,
	) -> Result<Option<usize>, Error> {
		Ok(Some(default))
	}

	fn input(
		&mut self,
		prompt: &str,
		_accounts: &KnownAccounts,
	) -> Result<String, Error> {
		log::info!("{}: using {}", prompt, PLACEHOLDER);
		Ok(PLACEHOLDER.to_string())
	}

	fn warn(&mut self, message: &str) {
		log::warn!("{}", message);
	}

	fn interactive(&self) -> bool {
		false
	}
}
