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
use crate::parsing::filesystem::Filesystem;
use crate::parsing::training_file::TrainingFormat;
use anyhow::{bail, Error};
use clap::{Parser, ValueEnum};

mod config;
mod gl;
mod import;
mod model;
mod parsing;
mod reports;
mod terminal;
mod util;

#[derive(Parser)]
#[command(
	name = "ledgerfill",
	version,
	about = "Turns bank CSV statements into ledger entries, predicting accounts from ledger history"
)]
struct Cli {
	// ----------------
	// -- POSITIONAL --
	// ----------------
	/// The command to execute
	command: Directive,

	/// Statement CSV of date,payee,amount rows to convert
	#[arg(required = false)]
	input: Option<String>,

	// -----------
	// -- FLAGS --
	// -----------
	/// The account the statement belongs to, e.g. Assets:Bank:Current
	#[arg(short, long)]
	account: Option<String>,

	/// Ledger file to append the converted entries to
	#[arg(short, long)]
	output: Option<String>,

	/// Ledger file (or CSV of payee,account rows) to learn accounts from
	#[arg(short, long)]
	training_data: Option<String>,

	/// Format of the training data (default: ledger)
	#[arg(long, value_enum)]
	training_format: Option<TrainingFormat>,

	/// CSV file to append each payee and chosen account to
	#[arg(short, long)]
	new_training_data: Option<String>,

	/// Currency symbol or code for statement amounts (default: £)
	#[arg(short, long)]
	currency: Option<String>,

	/// Ignore training entries older than this many days (default: 180)
	#[arg(short, long)]
	max_age: Option<u32>,

	/// Ignore accounts with fewer training examples than this (default: 1)
	#[arg(long)]
	min_group_size: Option<usize>,

	/// Number of predicted accounts to offer (default: 3)
	#[arg(long)]
	suggestions: Option<usize>,

	/// The statement CSV starts with a header row
	#[arg(long)]
	has_headers: bool,

	/// Never prompt: take the best prediction, or a placeholder account
	#[arg(long)]
	batch: bool,

	/// Custom config file location (default: ~/.config/ledgerfill/config.toml)
	#[arg(long)]
	config: Option<String>,
}

impl Cli {
	/// Extra validations on top of what clap does
	fn validate(&self) -> Result<(), Error> {
		if self.command == Directive::Convert {
			if self.input.is_none() {
				bail!("No statement CSV specified");
			} else if self.output.is_none() {
				bail!("No output ledger specified (use -o)");
			}
		}

		if self.command == Directive::Evaluate && self.input.is_some() {
			bail!("Evaluate reads its examples from -t, not a statement");
		}

		Ok(())
	}
}

#[derive(ValueEnum, Clone, PartialEq)]
enum Directive {
	Convert,  // statement CSV to ledger entries
	Evaluate, // cross-validate the model on the training data
}

fn main() -> Result<(), Error> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
		.init();

	let args = Cli::parse();
	args.validate()?;

	let fs = Filesystem::new();
	let config = fs.get_config(args.config.as_ref())?;
	let settings = Settings::resolve(&args, config)?;

	match args.command {
		Directive::Convert => import::importer::import(&settings)?,
		Directive::Evaluate => model::evaluator::evaluate(&settings)?,
	}

	Ok(())
}
