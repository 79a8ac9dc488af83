use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

pub const ETB_CURRENCY_CODE: &str = "ETB";
pub const ETB_CURRENCY_CODE_LOWER: &str = "etb";

//--------------------------------------        Birr         ---------------------------------------------------------

/// An amount of Ethiopian Birr, stored as integer santim (1 Br = 100 santim).
///
/// All prices and totals in the system are `Birr`, including on the wire, so menu edits and
/// floating-point drift can never change what an order was charged.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Birr(i64);

op!(binary Birr, Add, add);
op!(binary Birr, Sub, sub);
op!(inplace Birr, SubAssign, sub_assign);
op!(unary Birr, Neg, neg);

impl Mul<i64> for Birr {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self::from(self.value() * rhs)
    }
}

impl Sum for Birr {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in santim: {0}")]
pub struct BirrConversionError(String);

impl From<i64> for Birr {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for Birr {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Birr {}

impl TryFrom<u64> for Birr {
    type Error = BirrConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(BirrConversionError(format!("Value {} is too large to convert to Birr", value)))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl Display for Birr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} Br", self.to_decimal_string())
    }
}

impl Birr {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn from_birr(birr: i64) -> Self {
        Self(birr * 100)
    }

    /// The amount as a plain decimal string, e.g. `"245.50"`. Payment gateways want this format.
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{sign}{}.{:02}", (self.0 / 100).abs(), (self.0 % 100).abs())
    }
}
