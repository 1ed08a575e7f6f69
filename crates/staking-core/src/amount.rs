//! 256-bit quantities.
//!
//! Contract amounts are `uint256`, so [`Amount`] wraps a `U256`. Running
//! balances and totals that the reducer is allowed to drive below zero
//! (see the withdraw and burn paths) are [`SignedAmount`] over `I256`.
//!
//! JSON encoding uses a **string** in decimal so that JS clients never lose
//! precision. Decoding also accepts `0x` hex strings and plain integers.

use alloy_primitives::{I256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ArithmeticError {
    #[error("256-bit overflow")]
    Overflow,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid amount {input:?}: {reason}")]
pub struct ParseAmountError {
    input: String,
    reason: String,
}

impl ParseAmountError {
    fn new(input: &str, reason: impl fmt::Display) -> Self {
        Self {
            input: input.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Unsigned 256-bit amount, as carried by events.
///
/// Signed accumulators hold at most `2^255 - 1`; applying an amount at or
/// above `2^255` to one fails with [`ArithmeticError::Overflow`] and aborts
/// the event.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(pub U256);

impl Amount {
    pub const ZERO: Self = Self(U256::ZERO);

    pub fn from_u64(v: u64) -> Self {
        Self(U256::from(v))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_add(self, rhs: Amount) -> Result<Amount, ArithmeticError> {
        self.0
            .checked_add(rhs.0)
            .map(Amount)
            .ok_or(ArithmeticError::Overflow)
    }
}

impl From<u64> for Amount {
    fn from(v: u64) -> Self {
        Self::from_u64(v)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for Amount {
    type Err = ParseAmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        let parsed = match t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
            Some(hex) => U256::from_str_radix(hex, 16),
            None => U256::from_str_radix(t, 10),
        };
        parsed.map(Amount).map_err(|e| ParseAmountError::new(s, e))
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct V;
        impl<'de> serde::de::Visitor<'de> for V {
            type Value = Amount;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a uint256 encoded as a decimal/hex string or an integer")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                v.parse::<Amount>().map_err(E::custom)
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(Amount::from_u64(v))
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                u64::try_from(v)
                    .map(Amount::from_u64)
                    .map_err(|_| E::custom(format!("negative amount: {v}")))
            }
        }
        deserializer.deserialize_any(V)
    }
}

/// Signed 256-bit running balance or total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SignedAmount(pub I256);

impl Default for SignedAmount {
    fn default() -> Self {
        Self::ZERO
    }
}

impl SignedAmount {
    pub const ZERO: Self = Self(I256::ZERO);

    /// Widen an unsigned amount. Values above `I256::MAX` do not fit.
    pub fn try_from_amount(a: Amount) -> Result<Self, ArithmeticError> {
        if a.0 > I256::MAX.into_raw() {
            return Err(ArithmeticError::Overflow);
        }
        Ok(Self(I256::from_raw(a.0)))
    }

    pub fn is_zero(&self) -> bool {
        self.0 == I256::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.0 < I256::ZERO
    }

    pub fn is_positive(&self) -> bool {
        self.0 > I256::ZERO
    }

    pub fn checked_add(self, rhs: SignedAmount) -> Result<SignedAmount, ArithmeticError> {
        self.0
            .checked_add(rhs.0)
            .map(SignedAmount)
            .ok_or(ArithmeticError::Overflow)
    }

    pub fn checked_sub(self, rhs: SignedAmount) -> Result<SignedAmount, ArithmeticError> {
        self.0
            .checked_sub(rhs.0)
            .map(SignedAmount)
            .ok_or(ArithmeticError::Overflow)
    }

    pub fn checked_add_amount(self, rhs: Amount) -> Result<SignedAmount, ArithmeticError> {
        self.checked_add(Self::try_from_amount(rhs)?)
    }

    pub fn checked_sub_amount(self, rhs: Amount) -> Result<SignedAmount, ArithmeticError> {
        self.checked_sub(Self::try_from_amount(rhs)?)
    }
}

impl fmt::Display for SignedAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for SignedAmount {
    type Err = ParseAmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        I256::from_dec_str(s.trim())
            .map(SignedAmount)
            .map_err(|e| ParseAmountError::new(s, e))
    }
}

impl Serialize for SignedAmount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SignedAmount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct V;
        impl<'de> serde::de::Visitor<'de> for V {
            type Value = SignedAmount;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an int256 encoded as a decimal string or an integer")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                v.parse::<SignedAmount>().map_err(E::custom)
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                self.visit_str(&v.to_string())
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                self.visit_str(&v.to_string())
            }
        }
        deserializer.deserialize_any(V)
    }
}
