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
use crate::model::classifier::SgdParams;
use crate::model::predictor::Model;
use crate::model::training_set::TrainingExample;
use crate::reports::table::Table;
use anyhow::{anyhow, bail, Error};
use console::style;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::BTreeMap;
use std::fmt::Write;

pub const DEFAULT_FOLDS: usize = 3;
pub const DEFAULT_SEED: u64 = 42;

/// Cross-validates the classifier on labeled examples.
pub struct Evaluator {
	folds: usize,
	seed: u64,
	params: SgdParams,
}

impl Default for Evaluator {
	fn default() -> Self {
		Self::new(DEFAULT_FOLDS, DEFAULT_SEED)
	}
}

impl Evaluator {
	pub fn new(folds: usize, seed: u64) -> Self {
		Self {
			folds,
			seed,
			params: SgdParams::default(),
		}
	}

	/// Predicts every example with a model fitted on the other folds.
	pub fn evaluate(
		&self,
		examples: &[TrainingExample],
	) -> Result<Evaluation, Error> {
		if examples.is_empty() {
			bail!("Nothing to classify");
		}

		let mut evaluation = Evaluation::new(examples);
		let truth: Vec<usize> = examples
			.iter()
			.map(|e| evaluation.index_of(&e.account))
			.collect::<Option<_>>()
			.ok_or_else(|| anyhow!("Unlabeled example"))?;

		let assignment = stratified_folds(&truth, self.folds, self.seed)?;

		for fold in 0..self.folds {
			let train: Vec<TrainingExample> = examples
				.iter()
				.zip(&assignment)
				.filter(|(_, f)| **f != fold)
				.map(|(e, _)| e.clone())
				.collect();

			let model = Model::train_with(&train, self.params)
				.ok_or_else(|| anyhow!("Fold {} has no training data", fold + 1))?;

			for (i, example) in examples.iter().enumerate() {
				if assignment[i] != fold {
					continue;
				}

				let predicted = model
					.predict(&example.payee)
					.first()
					.and_then(|p| evaluation.index_of(&p.account))
					.ok_or_else(|| anyhow!("No prediction for {}", example.payee))?;

				evaluation.record(truth[i], predicted);
			}
		}

		Ok(evaluation)
	}
}

/// Assigns each example a fold so that every label is spread as evenly as
/// possible across folds. Labels are shuffled within their group, then
/// dealt round-robin, continuing from one group to the next so that no
/// fold is left empty.
pub fn stratified_folds(
	labels: &[usize],
	folds: usize,
	seed: u64,
) -> Result<Vec<usize>, Error> {
	if folds < 2 {
		bail!("Cross-validation needs at least 2 folds");
	}
	if labels.len() < folds {
		bail!(
			"Need at least {} examples for {}-fold validation, found {}",
			folds,
			folds,
			labels.len()
		);
	}

	let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
	for (i, label) in labels.iter().enumerate() {
		groups.entry(*label).or_default().push(i);
	}

	let mut rng = StdRng::seed_from_u64(seed);
	let mut assignment = vec![0; labels.len()];
	let mut next = 0;

	for members in groups.values_mut() {
		members.shuffle(&mut rng);
		for &i in members.iter() {
			assignment[i] = next % folds;
			next += 1;
		}
	}

	Ok(assignment)
}

/// Confusion counts of a cross-validation run. Rows are true accounts,
/// columns predicted accounts, both in sorted account order.
#[derive(Debug)]
pub struct Evaluation {
	labels: Vec<String>,
	matrix: Vec<Vec<usize>>,
}

impl Evaluation {
	fn new(examples: &[TrainingExample]) -> Self {
		let mut labels: Vec<String> =
			examples.iter().map(|e| e.account.clone()).collect();
		labels.sort();
		labels.dedup();

		let n = labels.len();
		Self {
			labels,
			matrix: vec![vec![0; n]; n],
		}
	}

	fn index_of(&self, account: &str) -> Option<usize> {
		self.labels.binary_search_by(|l| l.as_str().cmp(account)).ok()
	}

	fn record(&mut self, truth: usize, predicted: usize) {
		self.matrix[truth][predicted] += 1;
	}

	#[cfg(test)]
	pub fn labels(&self) -> &[String] {
		&self.labels
	}

	#[cfg(test)]
	pub fn matrix(&self) -> &[Vec<usize>] {
		&self.matrix
	}

	pub fn total(&self) -> usize {
		self.matrix.iter().flatten().sum()
	}

	pub fn accuracy(&self) -> f64 {
		let correct: usize = (0..self.labels.len()).map(|i| self.matrix[i][i]).sum();
		ratio(correct, self.total())
	}

	pub fn support(&self, label: usize) -> usize {
		self.matrix[label].iter().sum()
	}

	pub fn precision(&self, label: usize) -> f64 {
		let predicted: usize = self.matrix.iter().map(|row| row[label]).sum();
		ratio(self.matrix[label][label], predicted)
	}

	pub fn recall(&self, label: usize) -> f64 {
		ratio(self.matrix[label][label], self.support(label))
	}

	pub fn f1(&self, label: usize) -> f64 {
		let (p, r) = (self.precision(label), self.recall(label));
		if p + r == 0.0 {
			0.0
		} else {
			2.0 * p * r / (p + r)
		}
	}

	/// The confusion matrix, columns headed by the first letter of each
	/// account's last segment. When colored, correct predictions are green,
	/// mistakes red and empty cells grey.
	pub fn render_matrix(&self, colored: bool) -> String {
		let max = self.matrix.iter().flatten().max().copied().unwrap_or(0);
		let cell = max.to_string().len() + 1;
		let label_width =
			self.labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);

		let mut out = " ".repeat(label_width);
		for label in &self.labels {
			let initial = label
				.rsplit(':')
				.next()
				.and_then(|leaf| leaf.chars().next())
				.unwrap_or(' ');
			let _ = write!(out, "{:>cell$}", initial, cell = cell);
		}
		out.push('\n');

		for (row, label) in self.labels.iter().enumerate() {
			let _ = write!(out, "{:>width$}", label, width = label_width);
			for (col, count) in self.matrix[row].iter().enumerate() {
				let text = format!("{:>cell$}", count, cell = cell);
				if !colored {
					out.push_str(&text);
				} else if row == col {
					let _ = write!(out, "{}", style(text).green());
				} else if *count > 0 {
					let _ = write!(out, "{}", style(text).red());
				} else {
					let _ = write!(out, "{}", style(text).dim());
				}
			}
			out.push('\n');
		}

		out
	}

	/// Per-account precision, recall, F1 and support, then the averages.
	pub fn render_report(&self) -> String {
		let mut table = Table::new(5);
		table.add_header(vec!["account", "precision", "recall", "f1-score", "support"]);
		table.add_separator();
		table.right_align(vec![1, 2, 3, 4]);

		for (i, label) in self.labels.iter().enumerate() {
			table.add_row(vec![
				label.clone(),
				format!("{:.2}", self.precision(i)),
				format!("{:.2}", self.recall(i)),
				format!("{:.2}", self.f1(i)),
				self.support(i).to_string(),
			]);
		}

		let total = self.total();
		table.add_separator();
		table.add_row(vec![
			"accuracy".to_string(),
			String::new(),
			String::new(),
			format!("{:.2}", self.accuracy()),
			total.to_string(),
		]);
		for (name, weighted) in [("macro avg", false), ("weighted avg", true)] {
			let (p, r, f) = self.averages(weighted);
			table.add_row(vec![
				name.to_string(),
				format!("{:.2}", p),
				format!("{:.2}", r),
				format!("{:.2}", f),
				total.to_string(),
			]);
		}

		table.render()
	}

	/// Mean precision, recall and F1 over accounts, optionally weighted by
	/// support.
	fn averages(&self, weighted: bool) -> (f64, f64, f64) {
		let mut sums = (0.0, 0.0, 0.0);
		let mut weights = 0.0;

		for i in 0..self.labels.len() {
			let w = if weighted { self.support(i) as f64 } else { 1.0 };
			sums.0 += w * self.precision(i);
			sums.1 += w * self.recall(i);
			sums.2 += w * self.f1(i);
			weights += w;
		}

		if weights == 0.0 {
			return (0.0, 0.0, 0.0);
		}
		(sums.0 / weights, sums.1 / weights, sums.2 / weights)
	}

	pub fn print(&self) {
		print!("{}", self.render_matrix(console::user_attended()));
		println!();
		print!("{}", self.render_report());
	}
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
	if denominator == 0 {
		0.0
	} else {
		numerator as f64 / denominator as f64
	}
}

/// Cross-validates the configured training source and prints the results.
/// Uses the same age filter and small-group removal as conversion.
pub fn evaluate(settings: &Settings) -> Result<(), Error> {
	let source = settings
		.training
		.as_ref()
		.ok_or_else(|| anyhow!("No training data specified (use -t)"))?;

	let mut set = source.load(&settings.account, settings.training_begin())?;
	let dropped = set.remove_small_groups(settings.min_group_size);
	if dropped > 0 {
		log::info!("Dropped {} examples of rare accounts", dropped);
	}
	log::info!("Evaluating {} examples", set.len());

	let evaluation = Evaluator::default().evaluate(set.examples())?;
	evaluation.print();
	Ok(())
}
