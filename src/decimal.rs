//! Canonical decimal strings for prices, sizes and amounts
//!
//! The venue only accepts plain decimal strings: no exponent, no `NaN`. Floats
//! are rendered through their shortest round-trip scientific form and then
//! expanded, so the digits sent are exactly the digits of the input value.

use rust_decimal::Decimal;

use crate::error::{Error, Result};

/// A decimal-like input value
#[derive(Debug, Clone, PartialEq)]
pub enum DecimalValue {
    /// Already-canonical decimal string, passed through unchanged
    Text(String),
    /// Integer value
    Int(i128),
    /// Arbitrary-precision decimal
    Exact(Decimal),
    /// Floating point value; must be finite
    Float(f64),
}

impl DecimalValue {
    /// Render the value as the decimal string the venue accepts
    pub fn to_wire(&self) -> Result<String> {
        match self {
            DecimalValue::Text(text) => Ok(text.clone()),
            DecimalValue::Int(value) => Ok(value.to_string()),
            DecimalValue::Exact(value) => Ok(value.normalize().to_string()),
            DecimalValue::Float(value) => float_to_wire(*value),
        }
    }
}

impl From<&str> for DecimalValue {
    fn from(value: &str) -> Self {
        DecimalValue::Text(value.to_string())
    }
}

impl From<String> for DecimalValue {
    fn from(value: String) -> Self {
        DecimalValue::Text(value)
    }
}

impl From<Decimal> for DecimalValue {
    fn from(value: Decimal) -> Self {
        DecimalValue::Exact(value)
    }
}

impl From<f64> for DecimalValue {
    fn from(value: f64) -> Self {
        DecimalValue::Float(value)
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for DecimalValue {
                fn from(value: $ty) -> Self {
                    DecimalValue::Int(i128::from(value))
                }
            }
        )*
    };
}

impl_from_int!(i32, i64, u32, u64, i128);

/// Render a finite float without exponential notation
pub fn float_to_wire(value: f64) -> Result<String> {
    if !value.is_finite() {
        return Err(Error::NonFiniteValue(value));
    }
    if value == 0.0 {
        return Ok("0".to_string());
    }
    expand_exponent(&format!("{value:e}"))
}

/// Rewrite `<mantissa>e<exponent>` as a plain decimal string.
///
/// Strings without an exponent are returned with only leading/trailing zero
/// cleanup applied.
pub fn expand_exponent(rendered: &str) -> Result<String> {
    let (mantissa, exponent) = match rendered.find(['e', 'E']) {
        Some(pos) => {
            let exponent = rendered[pos + 1..].parse::<i64>().map_err(|e| {
                Error::InvalidParameter(format!("bad exponent in {rendered:?}: {e}"))
            })?;
            (&rendered[..pos], exponent)
        }
        None => (rendered, 0),
    };

    let (sign, unsigned) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa.strip_prefix('+').unwrap_or(mantissa)),
    };
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    if (int_part.is_empty() && frac_part.is_empty())
        || !int_part.chars().chain(frac_part.chars()).all(|c| c.is_ascii_digit())
    {
        return Err(Error::InvalidParameter(format!(
            "not a decimal number: {rendered:?}"
        )));
    }

    let digits = format!("{int_part}{frac_part}");
    let point = int_part.len() as i64 + exponent;
    let expanded = if point <= 0 {
        format!("0.{}{digits}", "0".repeat(point.unsigned_abs() as usize))
    } else if point as usize >= digits.len() {
        format!("{digits}{}", "0".repeat(point as usize - digits.len()))
    } else {
        let (whole, fraction) = digits.split_at(point as usize);
        format!("{whole}.{fraction}")
    };

    let trimmed = trim_zeros(&expanded);
    if trimmed == "0" {
        Ok(trimmed)
    } else {
        Ok(format!("{sign}{trimmed}"))
    }
}

fn trim_zeros(number: &str) -> String {
    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
    let whole = match whole.trim_start_matches('0') {
        "" => "0",
        rest => rest,
    };
    match fraction.trim_end_matches('0') {
        "" => whole.to_string(),
        fraction => format!("{whole}.{fraction}"),
    }
}
