//! # Money Module
//!
//! Provides the `Money` type used for every amount the ledger touches.
//!
//! ## Why Fixed-Point?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Splitting a dinner three ways in floating point:                       │
//! │    100.00 / 3 = 33.333333333333336                                      │
//! │    33.333333333333336 × 3 = 100.00000000000001  ❌ money appeared!      │
//! │                                                                         │
//! │  OUR SOLUTION: Integer units at 4 decimal places                        │
//! │    1_000_000 units / 3 → 333_334 + 333_333 + 333_333                    │
//! │    The leftover unit is handed out EXPLICITLY (see `allocate`)          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Four decimal places (one hundredth of a cent) keep intermediate shares
//! exact enough that repeated divisions never drift by a visible cent.
//! Amounts shown to people and transfers proposed to them are always
//! rounded to the minor unit (cents) with [`Money::round_to_minor`].
//!
//! ## Usage
//! ```rust
//! use tripledger_core::money::Money;
//!
//! let dinner: Money = "90.00".parse().unwrap();
//! let share = dinner.divide(3).unwrap();
//! assert_eq!(share, Money::from_minor(3000));
//!
//! let shares = Money::from_minor(10000).allocate(3).unwrap();
//! let total: Money = shares.iter().copied().sum();
//! assert_eq!(total, Money::from_minor(10000));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{LedgerError, LedgerResult, MoneyParseError};

/// Number of decimal places stored.
pub const SCALE: u32 = 4;

/// Internal units in one major currency unit (1.0000).
pub const UNITS_PER_MAJOR: i64 = 10_000;

/// Internal units in one minor currency unit (0.01).
pub const UNITS_PER_MINOR: i64 = 100;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount in the trip's base currency, stored as an integer
/// count of ten-thousandths.
///
/// ## Design Decisions
/// - **i64 (signed)**: net balances and pairwise debts are signed
/// - **Exact comparisons**: `Ord` compares integers, there is no epsilon
///   in here. "Effectively zero" is a caller decision, see [`Money::is_within`]
/// - **Serialized as the raw integer**: `12.34` travels as `123400`
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  LedgerEntry.cost ──► split_shares ──► net balances ──► Smart Route     │
/// │        │                    │                               │           │
/// │        │                    └──► pairwise debts              ▼           │
/// │        └──► paid / spent / received totals          Transfer.amount     │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from raw internal units (ten-thousandths).
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Money(units)
    }

    /// Creates a Money value from minor units (cents).
    ///
    /// ```rust
    /// use tripledger_core::money::Money;
    ///
    /// let coffee = Money::from_minor(350); // 3.50
    /// assert_eq!(coffee.units(), 35_000);
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor * UNITS_PER_MINOR)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// For negative amounts only the major unit carries the sign:
    /// `from_major_minor(-5, 50)` is -5.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * UNITS_PER_MAJOR - minor * UNITS_PER_MINOR)
        } else {
            Money(major * UNITS_PER_MAJOR + minor * UNITS_PER_MINOR)
        }
    }

    /// Parses a decimal string such as `"12.34"`, `"-0.5"` or `"7"`.
    ///
    /// At most [`SCALE`] fraction digits are accepted; anything finer would
    /// be silently lost, so it is rejected instead.
    pub fn parse(s: &str) -> Result<Self, MoneyParseError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(MoneyParseError::Empty);
        }

        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };

        let (whole, fraction) = match digits.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (digits, ""),
        };

        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction)
        {
            return Err(MoneyParseError::InvalidFormat(trimmed.to_string()));
        }

        if fraction.len() > SCALE as usize {
            return Err(MoneyParseError::TooManyFractionDigits {
                value: trimmed.to_string(),
                max: SCALE,
            });
        }

        let overflow = || MoneyParseError::Overflow(trimmed.to_string());

        let whole_units = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<i64>()
                .map_err(|_| overflow())?
                .checked_mul(UNITS_PER_MAJOR)
                .ok_or_else(overflow)?
        };

        // "5" in the first fraction place is 5000 units
        let fraction_units = if fraction.is_empty() {
            0
        } else {
            let padded = format!("{:0<width$}", fraction, width = SCALE as usize);
            padded.parse::<i64>().map_err(|_| overflow())?
        };

        let units = whole_units
            .checked_add(fraction_units)
            .ok_or_else(overflow)?;

        Ok(Money(if negative { -units } else { units }))
    }

    /// Returns the raw internal units.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0
    }

    /// Returns the value as a float. For display and charts only; never feed
    /// the result back into a calculation.
    #[inline]
    pub fn to_decimal(&self) -> f64 {
        self.0 as f64 / UNITS_PER_MAJOR as f64
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is exactly zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is greater than zero.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is less than zero.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value. `i64::MIN` saturates to `i64::MAX`.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.saturating_abs())
    }

    /// Named form of `+`.
    #[inline]
    pub const fn add(self, other: Money) -> Self {
        Money(self.0 + other.0)
    }

    /// Named form of `-`.
    #[inline]
    pub const fn subtract(self, other: Money) -> Self {
        Money(self.0 - other.0)
    }

    /// `self + other`, or `None` when the result leaves the i64 range.
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(units) => Some(Money(units)),
            None => None,
        }
    }

    /// `self - other`, or `None` when the result leaves the i64 range.
    #[inline]
    pub const fn checked_sub(self, other: Money) -> Option<Money> {
        match self.0.checked_sub(other.0) {
            Some(units) => Some(Money(units)),
            None => None,
        }
    }

    /// `self + other`, clamped to the i64 range.
    #[inline]
    pub const fn saturating_add(self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0))
    }

    /// `self - other`, clamped to the i64 range.
    #[inline]
    pub const fn saturating_sub(self, other: Money) -> Money {
        Money(self.0.saturating_sub(other.0))
    }

    /// Exact total of `amounts`, or `None` when it does not fit.
    ///
    /// Summed in i128, so intermediate overflow never matters and the
    /// result does not depend on iteration order.
    pub fn checked_sum<I>(amounts: I) -> Option<Money>
    where
        I: IntoIterator<Item = Money>,
    {
        i64::try_from(wide_total(amounts)).ok().map(Money)
    }

    /// Total of `amounts`, clamped to the i64 range.
    pub fn saturating_sum<I>(amounts: I) -> Money
    where
        I: IntoIterator<Item = Money>,
    {
        let total = wide_total(amounts).clamp(i64::MIN as i128, i64::MAX as i128);
        Money(total as i64)
    }

    #[inline]
    pub const fn greater_than(&self, other: Money) -> bool {
        self.0 > other.0
    }

    #[inline]
    pub const fn less_than(&self, other: Money) -> bool {
        self.0 < other.0
    }

    /// True when `|self| <= epsilon`.
    ///
    /// Callers use this to hide balances that are "effectively zero";
    /// `Money` itself never applies a tolerance.
    #[inline]
    pub const fn is_within(&self, epsilon: Money) -> bool {
        self.0.unsigned_abs() <= epsilon.0.unsigned_abs()
    }

    /// Divides by a positive integer, rounding half away from zero to the
    /// stored scale.
    ///
    /// ## Errors
    /// [`LedgerError::DivisionByZero`] when `by == 0`. The balance calculator
    /// never reaches that case because it floors participant counts at one.
    ///
    /// ```rust
    /// use tripledger_core::money::Money;
    ///
    /// let third = Money::from_minor(10000).divide(3).unwrap();
    /// assert_eq!(third.units(), 333_333);
    /// assert!(Money::from_minor(100).divide(0).is_err());
    /// ```
    pub fn divide(&self, by: u32) -> LedgerResult<Money> {
        if by == 0 {
            return Err(LedgerError::DivisionByZero);
        }
        Ok(Money(div_round_half_away(self.0, by as i64)))
    }

    /// Splits the amount into `parts` shares that sum back to exactly `self`.
    ///
    /// Each share is the truncated quotient; the leftover units are handed
    /// out one at a time to the first shares, so earlier shares are never
    /// smaller than later ones.
    ///
    /// ```rust
    /// use tripledger_core::money::Money;
    ///
    /// let shares = Money::from_minor(10000).allocate(3).unwrap();
    /// let units: Vec<i64> = shares.iter().map(|m| m.units()).collect();
    /// assert_eq!(units, vec![333_334, 333_333, 333_333]);
    /// ```
    pub fn allocate(&self, parts: usize) -> LedgerResult<Vec<Money>> {
        if parts == 0 {
            return Err(LedgerError::DivisionByZero);
        }

        let n = parts as i64;
        let base = self.0 / n;
        let leftover = self.0 - base * n;
        let step = leftover.signum();
        let extra = leftover.unsigned_abs() as usize;

        Ok((0..parts)
            .map(|i| if i < extra { Money(base + step) } else { Money(base) })
            .collect())
    }

    /// Rounds to the minor unit (cents), half away from zero.
    ///
    /// ```rust
    /// use tripledger_core::money::Money;
    ///
    /// assert_eq!(Money::from_units(333_350).round_to_minor(), Money::from_minor(3334));
    /// assert_eq!(Money::from_units(-333_349).round_to_minor(), Money::from_minor(-3333));
    /// ```
    pub fn round_to_minor(&self) -> Money {
        Money(div_round_half_away(self.0, UNITS_PER_MINOR) * UNITS_PER_MINOR)
    }
}

fn wide_total<I>(amounts: I) -> i128
where
    I: IntoIterator<Item = Money>,
{
    amounts.into_iter().map(|m| m.0 as i128).sum()
}

/// Integer division rounding half away from zero. `divisor` must be positive.
fn div_round_half_away(value: i64, divisor: i64) -> i64 {
    // i128 keeps `2 * remainder` from overflowing near i64::MAX
    let value = value as i128;
    let divisor = divisor as i128;
    let quotient = value / divisor;
    let remainder = value % divisor;

    if remainder.abs() * 2 >= divisor {
        (quotient + value.signum()) as i64
    } else {
        quotient as i64
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows the amount as a plain decimal without a currency symbol, rounded
/// to two places unless a precision is requested (`{:.4}` is exact).
///
/// Symbol placement is the presentation layer's job.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let places = f.precision().unwrap_or(2).min(SCALE as usize) as u32;
        let divisor = 10_i64.pow(SCALE - places);
        let scaled = div_round_half_away(self.0, divisor);
        let one = 10_i64.pow(places);

        let sign = if scaled < 0 { "-" } else { "" };
        let whole = (scaled / one).abs();
        if places == 0 {
            return write!(f, "{}{}", sign, whole);
        }
        let fraction = (scaled % one).abs();
        write!(
            f,
            "{}{}.{:0width$}",
            sign,
            whole,
            fraction,
            width = places as usize
        )
    }
}

impl FromStr for Money {
    type Err = MoneyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by an integer factor.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, factor: i64) -> Self {
        Money(self.0 * factor)
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
