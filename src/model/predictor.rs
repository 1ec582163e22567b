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
use crate::model::classifier::{LinearClassifier, SgdParams};
use crate::model::features::NgramVectorizer;
use crate::model::training_set::TrainingExample;
use std::collections::BTreeSet;
use std::fmt;

/// A candidate counterparty account for a payee.
#[derive(Clone, Debug, PartialEq)]
pub struct Prediction {
	pub account: String,
	/// Share of the softmax over all decision scores, in [0, 1]
	pub confidence: f64,
}

impl fmt::Display for Prediction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} ({:.1}%)", self.account, self.confidence * 100.0)
	}
}

/// A fitted vectorizer and classifier. Built once per run from the
/// training data and read-only afterwards; it is never saved.
pub struct Model {
	vectorizer: NgramVectorizer,
	classifier: LinearClassifier,
	/// Class index to account name, sorted
	labels: Vec<String>,
}

impl Model {
	/// Fits a model, or returns None if there is nothing to learn from.
	pub fn train(examples: &[TrainingExample]) -> Option<Model> {
		Model::train_with(examples, SgdParams::default())
	}

	pub fn train_with(
		examples: &[TrainingExample],
		params: SgdParams,
	) -> Option<Model> {
		if examples.is_empty() {
			return None;
		}

		let labels: Vec<String> = examples
			.iter()
			.map(|e| e.account.clone())
			.collect::<BTreeSet<_>>()
			.into_iter()
			.collect();

		let payees: Vec<String> =
			examples.iter().map(|e| e.payee.clone()).collect();
		let mut vectorizer = NgramVectorizer::default();
		vectorizer.fit(&payees);

		let samples: Vec<_> = examples
			.iter()
			.filter_map(|e| {
				let class = labels.binary_search(&e.account).ok()?;
				Some((vectorizer.transform(&e.payee), class))
			})
			.collect();

		let classifier = LinearClassifier::fit(
			&samples,
			labels.len(),
			vectorizer.dimensions(),
			params,
		);

		log::info!(
			"Trained on {} examples for {} accounts ({} features)",
			examples.len(),
			labels.len(),
			vectorizer.dimensions()
		);

		Some(Model {
			vectorizer,
			classifier,
			labels,
		})
	}

	#[cfg(test)]
	pub fn labels(&self) -> &[String] {
		&self.labels
	}

	/// Ranks every known account for the payee, best first. Ties in score
	/// are ordered by account name so the ranking is stable.
	pub fn predict(&self, payee: &str) -> Vec<Prediction> {
		let x = self.vectorizer.transform(payee);
		let scores = self.classifier.decision_scores(&x);

		let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
		let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
		let total: f64 = exps.iter().sum();

		let mut ranked: Vec<(f64, Prediction)> = scores
			.iter()
			.zip(exps)
			.zip(&self.labels)
			.map(|((score, e), account)| {
				(
					*score,
					Prediction {
						account: account.clone(),
						confidence: e / total,
					},
				)
			})
			.collect();

		ranked.sort_by(|a, b| {
			b.0.total_cmp(&a.0)
				.then_with(|| a.1.account.cmp(&b.1.account))
		});

		ranked.into_iter().map(|(_, p)| p).collect()
	}
}
