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
use std::fmt::Write;

/// Plain table printer for the evaluation report: one line per account,
/// columns padded to the widest cell.
pub struct Table {
	column_count: usize,
	rows: Vec<Row>,
	right_align: Vec<bool>, // indicates columns by index
}

enum Row {
	Header(Vec<String>),
	Data(Vec<String>),
	Separator,
}

impl Table {
	pub fn new(column_count: usize) -> Self {
		Self {
			column_count,
			rows: Vec::new(),
			right_align: vec![false; column_count],
		}
	}

	pub fn add_header(&mut self, row: Vec<&str>) {
		self.rows.push(Row::Header(Table::owned(row)));
	}

	pub fn add_row(&mut self, row: Vec<String>) {
		self.rows.push(Row::Data(row));
	}

	pub fn add_separator(&mut self) {
		self.rows.push(Row::Separator);
	}

	/// Specifies columns that should be right-aligned by index.
	pub fn right_align(&mut self, cols: Vec<usize>) {
		for col in cols {
			if col < self.column_count {
				self.right_align[col] = true;
			}
		}
	}

	pub fn render(&self) -> String {
		let widths = self.column_widths();
		let mut out = String::new();

		for row in &self.rows {
			match row {
				Row::Header(cells) => {
					let centered: Vec<String> = cells
						.iter()
						.enumerate()
						.map(|(i, c)| Table::center_align(c, widths[i]))
						.collect();
					out.push_str(centered.join(" | ").trim_end());
				},
				Row::Data(cells) => {
					let padded: Vec<String> = cells
						.iter()
						.enumerate()
						.map(|(i, c)| self.pad(c, i, widths[i]))
						.collect();
					out.push_str(padded.join("   ").trim_end());
				},
				Row::Separator => {
					let total = widths.iter().sum::<usize>()
						+ 3 * self.column_count.saturating_sub(1);
					let _ = write!(out, "{:-<total$}", "", total = total);
				},
			}
			out.push('\n');
		}

		out
	}

	fn column_widths(&self) -> Vec<usize> {
		let mut widths = vec![0; self.column_count];
		for row in &self.rows {
			if let Row::Data(cells) | Row::Header(cells) = row {
				for (i, value) in cells.iter().enumerate().take(self.column_count)
				{
					widths[i] = widths[i].max(value.chars().count());
				}
			}
		}
		widths
	}

	fn pad(&self, value: &str, col: usize, width: usize) -> String {
		if self.right_align.get(col).copied().unwrap_or(false) {
			format!("{:>width$}", value, width = width)
		} else {
			format!("{:<width$}", value, width = width)
		}
	}

	fn center_align(value: &str, width: usize) -> String {
		let len = value.chars().count();
		if len >= width {
			return value.to_string();
		}
		let left = (width - len) / 2;
		let right = width - len - left;
		format!("{}{}{}", " ".repeat(left), value, " ".repeat(right))
	}

	fn owned(row: Vec<&str>) -> Vec<String> {
		row.into_iter().map(|s| s.to_string()).collect()
	}
}
