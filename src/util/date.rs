/* Copyright © 2024-2025 Adam Train <adam@adamtrain.net>
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

use anyhow::{bail, Error};
use chrono::{Datelike, Days, Local, NaiveDate};
use std::cmp::Ordering;
use std::fmt;

#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
pub struct Date {
	year: u32,
	month: u8,
	day: u8,
}

impl Date {
	/// Constructor to parse a string in the "YYYY-mm-dd" format. Slashes
	/// are accepted in place of dashes, as ledger files allow both.
	pub fn from_str(date_str: &str) -> Result<Date, Error> {
		let parts: Vec<&str> = date_str.split(['-', '/']).collect();
		if parts.len() != 3 || parts[0].len() != 4 {
			bail!("Date format must be YYYY-MM-DD");
		}

		Date::from_parts(parts[0], parts[1], parts[2])
	}

	/// Parses dates as found in bank exports. The year must have four
	/// digits; if it comes last, the day is assumed to come first, never
	/// the month.
	pub fn parse_flexible(date_str: &str) -> Result<Date, Error> {
		let trimmed = date_str.trim();
		let parts: Vec<&str> = trimmed.split(['-', '/', '.']).collect();
		if parts.len() != 3 {
			bail!("Date format not recognised: {}", trimmed);
		}

		if parts[0].len() == 4 {
			Date::from_parts(parts[0], parts[1], parts[2])
		} else if parts[2].len() == 4 {
			Date::from_parts(parts[2], parts[1], parts[0])
		} else {
			bail!("Date format not recognised: {}", trimmed)
		}
	}

	fn from_parts(year: &str, month: &str, day: &str) -> Result<Date, Error> {
		let year = year.parse::<u32>()?;
		let month = month.parse::<u8>()?;
		let day = day.parse::<u8>()?;

		if !Date::is_valid_date(year, month, day) {
			bail!("Invalid date");
		}

		Ok(Date { year, month, day })
	}

	pub fn min() -> Date {
		Date {
			year: 1,
			month: 1,
			day: 1,
		}
	}

	pub fn today() -> Date {
		Date::from_naive(Local::now().date_naive())
	}

	/// The date the given number of days before this one. Saturates at
	/// the minimum date.
	pub fn days_before(&self, days: u32) -> Date {
		self.to_naive()
			.and_then(|d| d.checked_sub_days(Days::new(days as u64)))
			.filter(|d| d.year() >= 1)
			.map(Date::from_naive)
			.unwrap_or_else(Date::min)
	}

	fn from_naive(date: NaiveDate) -> Date {
		Date {
			year: date.year() as u32,
			month: date.month() as u8,
			day: date.day() as u8,
		}
	}

	fn to_naive(self) -> Option<NaiveDate> {
		NaiveDate::from_ymd_opt(
			self.year as i32,
			self.month as u32,
			self.day as u32,
		)
	}

	fn is_leap_year(year: u32) -> bool {
		(year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
	}

	fn days_in_month(year: u32, month: u8) -> u8 {
		match month {
			1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
			4 | 6 | 9 | 11 => 30,
			2 => {
				if Date::is_leap_year(year) {
					29
				} else {
					28
				}
			},
			_ => 0, // Invalid month
		}
	}

	fn is_valid_date(year: u32, month: u8, day: u8) -> bool {
		if year == 0 || !(1..=12).contains(&month) {
			return false;
		}
		if day < 1 || day > Date::days_in_month(year, month) {
			return false;
		}
		true
	}
}

impl PartialOrd for Date {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for Date {
	fn cmp(&self, other: &Self) -> Ordering {
		(self.year, self.month, self.day).cmp(&(
			other.year,
			other.month,
			other.day,
		))
	}
}

impl fmt::Display for Date {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
	}
}
