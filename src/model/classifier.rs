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
use crate::model::features::SparseVector;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Training parameters for the linear classifier.
#[derive(Clone, Copy, Debug)]
pub struct SgdParams {
	/// Strength of the L2 penalty
	pub alpha: f64,
	/// Passes over the training data
	pub epochs: usize,
	/// Seed for the per-epoch shuffles
	pub seed: u64,
}

impl Default for SgdParams {
	fn default() -> Self {
		Self {
			alpha: 0.001,
			epochs: 4,
			seed: 42,
		}
	}
}

/// One-vs-rest linear classifier trained by stochastic gradient descent on
/// the hinge loss (a linear SVM). Each class gets its own weight vector,
/// and the class with the highest decision score wins.
#[derive(Clone, Debug)]
pub struct LinearClassifier {
	models: Vec<BinaryModel>,
}

/// Weights are stored as weights * scale, so the L2 shrink applied on every
/// step is O(1) instead of touching every feature.
#[derive(Clone, Debug)]
struct BinaryModel {
	weights: Vec<f64>,
	scale: f64,
	intercept: f64,
}

impl LinearClassifier {
	/// Fits one binary model per class. Samples are (features, class
	/// index) pairs, with class indices below class_count.
	pub fn fit(
		samples: &[(SparseVector, usize)],
		class_count: usize,
		dimensions: usize,
		params: SgdParams,
	) -> Self {
		let models = (0..class_count)
			.map(|class| BinaryModel::fit(samples, class, dimensions, params))
			.collect();

		Self { models }
	}

	#[cfg(test)]
	pub fn class_count(&self) -> usize {
		self.models.len()
	}

	/// The signed distance of x from each class's hyperplane, by class
	/// index.
	pub fn decision_scores(&self, x: &SparseVector) -> Vec<f64> {
		self.models.iter().map(|m| m.score(x)).collect()
	}
}

impl BinaryModel {
	fn fit(
		samples: &[(SparseVector, usize)],
		class: usize,
		dimensions: usize,
		params: SgdParams,
	) -> Self {
		let mut model = Self {
			weights: vec![0.0; dimensions],
			scale: 1.0,
			intercept: 0.0,
		};

		// The "optimal" schedule: eta = 1 / (alpha * (t0 + t)) for steps
		// t counted from zero, with t0 chosen so the first step has the
		// size of a typical weight.
		let typical_weight = (1.0 / params.alpha.sqrt()).sqrt();
		let t0 = 1.0 / (typical_weight * params.alpha);

		let mut order: Vec<usize> = (0..samples.len()).collect();
		let mut rng = StdRng::seed_from_u64(params.seed);
		let mut t = 0.0;

		for _ in 0..params.epochs {
			order.shuffle(&mut rng);

			for &i in &order {
				let (x, label) = &samples[i];
				let y = if *label == class { 1.0 } else { -1.0 };
				let eta = 1.0 / (params.alpha * (t0 + t));

				let margin = y * model.score(x);
				model.shrink(1.0 - eta * params.alpha);
				if margin <= 1.0 {
					model.add(x, eta * y);
				}

				t += 1.0;
			}
		}

		model.unscale();
		model
	}

	fn score(&self, x: &SparseVector) -> f64 {
		let dot: f64 = x
			.iter()
			.filter_map(|(i, v)| self.weights.get(*i).map(|w| w * v))
			.sum();
		dot * self.scale + self.intercept
	}

	fn shrink(&mut self, factor: f64) {
		self.scale *= factor.max(0.0);
		if self.scale < 1e-9 {
			self.unscale();
		}
	}

	fn add(&mut self, x: &SparseVector, step: f64) {
		for (i, v) in x {
			if let Some(w) = self.weights.get_mut(*i) {
				*w += step * v / self.scale;
			}
		}
		self.intercept += step;
	}

	fn unscale(&mut self) {
		if self.scale != 1.0 {
			let scale = self.scale;
			self.weights.iter_mut().for_each(|w| *w *= scale);
			self.scale = 1.0;
		}
	}
}
