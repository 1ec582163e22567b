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
use anyhow::{anyhow, bail, Error};
use rust_decimal::Decimal;
use std::fmt;
use std::ops::Neg;
use std::str::FromStr;

/// A decimal value with a currency. The currency is either a symbol such
/// as `£`, rendered in front of the value, or an alphabetic code such as
/// `USD`, rendered after it.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Amount {
	pub currency: String,
	pub value: Decimal,
}

impl Amount {
	pub fn new(value: Decimal, currency: &str) -> Self {
		Self {
			value,
			currency: currency.to_string(),
		}
	}

	/// Parses an amount from a statement column. Thousands separators, the
	/// currency's own symbol and any non-ASCII symbol are tolerated and
	/// dropped; the given currency is used regardless.
	pub fn parse(input: &str, currency: &str) -> Result<Self, Error> {
		let cleaned: String = input
			.trim()
			.chars()
			.filter(|c| {
				c.is_ascii()
					&& *c != ','
					&& !c.is_whitespace()
					&& !currency.contains(*c)
			})
			.collect();

		if cleaned.is_empty() {
			bail!("Missing amount");
		}

		let value = Decimal::from_str(&cleaned)
			.map_err(|e| anyhow!("Invalid amount {}: {}", input.trim(), e))?;

		Ok(Self::new(value, currency))
	}

	pub fn is_zero(&self) -> bool {
		self.value.is_zero()
	}

	fn is_code(&self) -> bool {
		!self.currency.is_empty()
			&& self.currency.chars().all(|c| c.is_ascii_alphabetic())
	}
}

impl Neg for Amount {
	type Output = Amount;
	fn neg(self) -> Self::Output {
		Self::Output {
			currency: self.currency.to_owned(),
			value: -self.value,
		}
	}
}

impl fmt::Display for Amount {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.is_code() {
			return write!(f, "{} {}", self.value, self.currency);
		}

		if self.value.is_sign_negative() && !self.is_zero() {
			write!(f, "-{}{}", self.currency, self.value.abs())
		} else {
			write!(f, "{}{}", self.currency, self.value.abs())
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_plain() {
		let amount = Amount::parse("-12.50", "£").unwrap();
		assert_eq!(amount.value, Decimal::new(-1250, 2));
		assert_eq!(amount.currency, "£");
	}

	#[test]
	fn test_parse_with_symbol_and_separators() {
		let amount = Amount::parse(" -£1,234.56 ", "£").unwrap();
		assert_eq!(amount.value, Decimal::new(-123456, 2));

		let amount = Amount::parse("£-3.00", "£").unwrap();
		assert_eq!(amount.value, Decimal::new(-300, 2));

		let amount = Amount::parse("$1,000", "$").unwrap();
		assert_eq!(amount.value, Decimal::new(1000, 0));
	}

	#[test]
	fn test_parse_failures() {
		assert!(Amount::parse("", "£").is_err());
		assert!(Amount::parse("twelve", "£").is_err());
		assert!(Amount::parse("12.50 GBP", "£").is_err());
	}

	#[test]
	fn test_display_symbol() {
		let amount = Amount::new(Decimal::new(-1250, 2), "£");
		assert_eq!(amount.to_string(), "-£12.50");
		assert_eq!((-amount).to_string(), "£12.50");
	}

	#[test]
	fn test_display_code() {
		let amount = Amount::new(Decimal::new(-1250, 2), "USD");
		assert_eq!(amount.to_string(), "-12.50 USD");
	}

	#[test]
	fn test_negative_zero_renders_unsigned() {
		let amount = -Amount::new(Decimal::new(0, 2), "$");
		assert!(amount.is_zero());
		assert_eq!(amount.to_string(), "$0.00");
	}
}
