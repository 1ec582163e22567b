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
use crate::util::amount::Amount;
use crate::util::date::Date;
use std::fmt;

/// One row of a bank statement. The amount is relative to the account the
/// statement belongs to: negative values left the account.
#[derive(Clone, Debug, PartialEq)]
pub struct Transaction {
	date: Date,
	payee: String,
	amount: Amount,
}

impl Transaction {
	pub fn new(date: Date, payee: String, amount: Amount) -> Self {
		Self {
			date,
			payee,
			amount,
		}
	}

	pub fn date(&self) -> &Date {
		&self.date
	}

	pub fn payee(&self) -> &str {
		&self.payee
	}

	pub fn amount(&self) -> &Amount {
		&self.amount
	}
}

impl fmt::Display for Transaction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "[{}] {} ({})", self.date, self.payee, self.amount)
	}
}
