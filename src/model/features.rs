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
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Feature index and weight pairs, sorted by index, zero weights omitted.
pub type SparseVector = Vec<(usize, f64)>;

pub const MIN_NGRAM: usize = 3;
pub const MAX_NGRAM: usize = 9;

/// Turns payee strings into L2-normalized counts of their character
/// n-grams. The vocabulary is fixed at fit time: n-grams never seen in
/// training carry no weight at prediction time.
#[derive(Clone, Debug)]
pub struct NgramVectorizer {
	min_n: usize,
	max_n: usize,
	vocabulary: HashMap<String, usize>,
	digits: Regex,
	whitespace: Regex,
}

impl NgramVectorizer {
	pub fn new(min_n: usize, max_n: usize) -> Self {
		Self {
			min_n: min_n.max(1),
			max_n: max_n.max(min_n.max(1)),
			vocabulary: HashMap::new(),
			digits: Regex::new(r"\d").unwrap(),
			whitespace: Regex::new(r"\s+").unwrap(),
		}
	}

	/// Normalizes a payee before n-grams are taken. Card numbers, store
	/// numbers and dates vary between otherwise identical payees, so every
	/// digit collapses to 0.
	pub fn clean(&self, payee: &str) -> String {
		let zeroed = self.digits.replace_all(payee, "0");
		let collapsed = self.whitespace.replace_all(zeroed.trim(), " ");
		collapsed.to_uppercase()
	}

	/// Builds the vocabulary from the given payees. Indices follow the
	/// sorted order of the n-grams so fitting is deterministic.
	pub fn fit(&mut self, payees: &[String]) {
		let mut grams = BTreeSet::new();
		for payee in payees {
			grams.extend(self.ngrams(&self.clean(payee)));
		}

		self.vocabulary = grams
			.into_iter()
			.enumerate()
			.map(|(i, gram)| (gram, i))
			.collect();
	}

	pub fn dimensions(&self) -> usize {
		self.vocabulary.len()
	}

	pub fn transform(&self, payee: &str) -> SparseVector {
		let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
		for gram in self.ngrams(&self.clean(payee)) {
			if let Some(&index) = self.vocabulary.get(&gram) {
				*counts.entry(index).or_insert(0.0) += 1.0;
			}
		}

		let norm = counts.values().map(|c| c * c).sum::<f64>().sqrt();
		if norm == 0.0 {
			return vec![];
		}

		counts.into_iter().map(|(i, c)| (i, c / norm)).collect()
	}

	/// Every substring of min_n to max_n characters. Strings shorter than
	/// min_n produce nothing.
	fn ngrams(&self, text: &str) -> Vec<String> {
		let chars: Vec<char> = text.chars().collect();
		let mut out = Vec::new();

		for n in self.min_n..=self.max_n.min(chars.len()) {
			for window in chars.windows(n) {
				out.push(window.iter().collect());
			}
		}

		out
	}
}

impl Default for NgramVectorizer {
	fn default() -> Self {
		Self::new(MIN_NGRAM, MAX_NGRAM)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn fitted(payees: &[&str]) -> NgramVectorizer {
		let mut vectorizer = NgramVectorizer::default();
		let payees: Vec<String> = payees.iter().map(|p| p.to_string()).collect();
		vectorizer.fit(&payees);
		vectorizer
	}

	#[test]
	fn test_clean() {
		let vectorizer = NgramVectorizer::default();
		assert_eq!(vectorizer.clean("  Tesco Stores 1234 "), "TESCO STORES 0000");
		assert_eq!(vectorizer.clean("card   ending\t99"), "CARD ENDING 00");
	}

	#[test]
	fn test_ngram_counts() {
		let vectorizer = NgramVectorizer::new(3, 4);
		let grams = vectorizer.ngrams("ABCDE");
		assert_eq!(grams, vec!["ABC", "BCD", "CDE", "ABCD", "BCDE"]);
	}

	#[test]
	fn test_short_strings_have_no_ngrams() {
		let vectorizer = NgramVectorizer::default();
		assert!(vectorizer.ngrams("AB").is_empty());
	}

	#[test]
	fn test_fit_is_case_and_digit_insensitive() {
		let vectorizer = fitted(&["tesco 12"]);
		assert_eq!(
			vectorizer.transform("TESCO 99"),
			vectorizer.transform("Tesco 31")
		);
	}

	#[test]
	fn test_transform_is_normalized() {
		let vectorizer = fitted(&["TESCO STORES", "SHELL GARAGE"]);
		let vector = vectorizer.transform("TESCO EXPRESS");
		let norm: f64 = vector.iter().map(|(_, v)| v * v).sum();
		assert!((norm - 1.0).abs() < 1e-9);
	}

	#[test]
	fn test_unknown_ngrams_are_ignored() {
		let vectorizer = fitted(&["TESCO"]);
		assert!(vectorizer.transform("QWXZ").is_empty());
	}

	#[test]
	fn test_transform_is_sorted() {
		let vectorizer = fitted(&["NETFLIX.COM", "AMAZON PRIME"]);
		let vector = vectorizer.transform("AMAZON NETFLIX");
		assert!(vector.windows(2).all(|w| w[0].0 < w[1].0));
	}
}
