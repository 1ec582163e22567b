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
use crate::config::settings::Settings;
use crate::gl::entry::Entry;
use crate::gl::transaction::Transaction;
use crate::import::known_accounts::KnownAccounts;
use crate::import::ledger_writer::{LedgerWriter, TrainingWriter};
use crate::import::resolver::{BatchPrompter, Prompter, Resolution, Resolver};
use crate::model::predictor::{Model, Prediction};
use crate::model::training_set::TrainingSet;
use crate::parsing::statement::StatementReader;
use crate::terminal::prompt::TerminalPrompter;
use anyhow::{anyhow, Error};
use std::fs::File;
use std::io::Write;

/// Counterparty used when no account could be decided, for fixing by hand
pub const PLACEHOLDER: &str = "Equity:PLACEHOLDER";

/// The entry point for conversion: reads the statement, learns from the
/// training data and writes one entry per transaction until the statement
/// runs out or the user quits.
pub fn import(settings: &Settings) -> Result<(), Error> {
	let input = settings
		.input
		.as_ref()
		.ok_or_else(|| anyhow!("No statement CSV specified"))?;
	let output = settings
		.output
		.as_ref()
		.ok_or_else(|| anyhow!("No output ledger specified (use -o)"))?;

	// make sure we can append to the destinations before asking anything
	let ledger = LedgerWriter::open(output)?;
	let training = settings
		.new_training
		.as_ref()
		.map(|path| TrainingWriter::open(path))
		.transpose()?;

	let transactions = StatementReader::new(settings.has_headers, &settings.currency)
		.read_file(input)?;

	let mut set = match &settings.training {
		Some(source) => {
			source.load_or_empty(&settings.account, settings.training_begin())
		},
		None => TrainingSet::new(),
	};
	let dropped = set.remove_small_groups(settings.min_group_size);
	log::info!(
		"Loaded {} training examples ({} dropped as too rare)",
		set.len(),
		dropped
	);

	let model = Model::train(set.examples());
	if model.is_none() {
		log::warn!("No training data; accounts must be entered manually");
	}
	let accounts = KnownAccounts::new(set.take_accounts());

	let written = if settings.batch {
		let resolver = Resolver::new(BatchPrompter, accounts, settings.suggestions);
		Importer::new(&settings.account, model, resolver, ledger, training)
			.run(&transactions)?
	} else {
		let resolver =
			Resolver::new(TerminalPrompter::new(), accounts, settings.suggestions);
		Importer::new(&settings.account, model, resolver, ledger, training)
			.run(&transactions)?
	};

	println!(
		"Wrote {} of {} transactions to {}",
		written,
		transactions.len(),
		output.display()
	);

	Ok(())
}

/// Resolves and writes transactions one at a time. Nothing is buffered:
/// every entry is on disk before the next transaction is looked at.
pub struct Importer<P: Prompter, W: Write = File, T: Write = File> {
	/// The account the statement belongs to
	account: String,
	model: Option<Model>,
	resolver: Resolver<P>,
	ledger: LedgerWriter<W>,
	training: Option<TrainingWriter<T>>,
}

impl<P: Prompter, W: Write, T: Write> Importer<P, W, T> {
	pub fn new(
		account: &str,
		model: Option<Model>,
		resolver: Resolver<P>,
		ledger: LedgerWriter<W>,
		training: Option<TrainingWriter<T>>,
	) -> Self {
		Self {
			account: account.to_string(),
			model,
			resolver,
			ledger,
			training,
		}
	}

	/// Returns the number of entries written.
	pub fn run(&mut self, transactions: &[Transaction]) -> Result<usize, Error> {
		for (i, txn) in transactions.iter().enumerate() {
			if !self.process(txn)? {
				log::info!(
					"Stopped at transaction {} of {}",
					i + 1,
					transactions.len()
				);
				break;
			}
		}

		Ok(self.ledger.written())
	}

	/// Returns false when the user quit.
	fn process(&mut self, txn: &Transaction) -> Result<bool, Error> {
		let predictions = self.predict(txn);

		loop {
			let account = match self.resolver.resolve(txn, &predictions)? {
				Resolution::Account(account) => account,
				Resolution::Quit => return Ok(false),
			};

			match Entry::from_transaction(txn, &self.account, &account) {
				Ok(entry) => {
					self.ledger.append(&entry)?;
					self.record(txn, &account)?;
					return Ok(true);
				},
				Err(e) if !self.resolver.interactive() => {
					return Err(e.context(format!("Cannot convert {}", txn)))
				},
				Err(e) => self.resolver.warn(&e.to_string()),
			}
		}
	}

	/// The model's ranking, minus the statement's own account.
	fn predict(&self, txn: &Transaction) -> Vec<Prediction> {
		match &self.model {
			Some(model) => model
				.predict(txn.payee())
				.into_iter()
				.filter(|p| p.account != self.account)
				.collect(),
			None => vec![],
		}
	}

	fn record(&mut self, txn: &Transaction, account: &str) -> Result<(), Error> {
		if account == PLACEHOLDER {
			return Ok(());
		}
		if let Some(training) = &mut self.training {
			training.append(txn.payee(), account)?;
		}
		Ok(())
	}
}
