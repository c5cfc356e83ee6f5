//! Arbitrary-precision decimal numbers.
//!
//! JSON numbers are kept as their textual literal plus an exact rational
//! view, so that comparison and equality do not depend on the surface
//! spelling: `4.2e-4` equals `0.00042`, and `1.0` equals `1`.
use fraction::{BigFraction, BigUint};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Exponents beyond this magnitude saturate: large ones to infinity, small
/// ones to zero. Keeps hostile literals like `1e999999999` from allocating.
const SCALE_LIMIT: i64 = 4096;

/// The literal could not be parsed as a JSON number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NumberError;

/// A decimal number, immutable once constructed.
#[derive(Debug, Clone)]
pub(crate) struct Number {
    literal: Box<str>,
    value: BigFraction,
}

impl Number {
    /// Parse a JSON number literal: `-?int(.frac)?([eE][+-]?digits)?`.
    pub(crate) fn parse(literal: &str) -> Result<Number, NumberError> {
        let bytes = literal.as_bytes();
        let mut pos = 0;
        let negative = bytes.first() == Some(&b'-');
        if negative {
            pos += 1;
        }
        let int_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        if pos == int_start {
            return Err(NumberError);
        }
        let mut digits = literal[int_start..pos].to_string();
        let mut scale: i64 = 0;
        if pos < bytes.len() && bytes[pos] == b'.' {
            pos += 1;
            let frac_start = pos;
            while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                pos += 1;
            }
            if pos == frac_start {
                return Err(NumberError);
            }
            digits.push_str(&literal[frac_start..pos]);
            scale -= (pos - frac_start) as i64;
        }
        if pos < bytes.len() && (bytes[pos] == b'e' || bytes[pos] == b'E') {
            pos += 1;
            let exp_negative = match bytes.get(pos) {
                Some(b'+') => {
                    pos += 1;
                    false
                }
                Some(b'-') => {
                    pos += 1;
                    true
                }
                _ => false,
            };
            let exp_start = pos;
            while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                pos += 1;
            }
            if pos == exp_start {
                return Err(NumberError);
            }
            let exp_digits = &literal[exp_start..pos];
            let exponent: i64 = if exp_digits.len() > 9 {
                // Saturates below either way.
                1_000_000_000
            } else {
                exp_digits.parse().map_err(|_| NumberError)?
            };
            scale += if exp_negative { -exponent } else { exponent };
        }
        if pos != bytes.len() {
            return Err(NumberError);
        }

        let value = if digits.bytes().all(|byte| byte == b'0') {
            zero()
        } else if scale > SCALE_LIMIT {
            if negative {
                -infinity()
            } else {
                infinity()
            }
        } else if scale < -SCALE_LIMIT {
            zero()
        } else {
            let mantissa = BigUint::from_str(&digits).map_err(|_| NumberError)?;
            let fraction = if scale >= 0 {
                BigFraction::new(mantissa * pow10(scale as u32), BigUint::from(1u8))
            } else {
                BigFraction::new(mantissa, pow10((-scale) as u32))
            };
            if negative {
                -fraction
            } else {
                fraction
            }
        };
        Ok(Number {
            literal: literal.into(),
            value,
        })
    }

    /// Convert a number from a parsed schema document.
    pub(crate) fn from_json(number: &serde_json::Number) -> Result<Number, NumberError> {
        Number::parse(&number.to_string())
    }

    /// Whether the value is a mathematical integer, regardless of spelling
    /// (`1.0` and `1e2` are integers).
    pub(crate) fn is_integer(&self) -> bool {
        matches!(self.value.denom(), Some(denom) if denom == &BigUint::from(1u8))
    }

    pub(crate) fn is_positive(&self) -> bool {
        self.value > zero()
    }

    /// Exact decimal division: whether `self / divisor` has no remainder.
    pub(crate) fn is_multiple_of(&self, divisor: &Number) -> bool {
        let quotient = self.value.clone() / divisor.value.clone();
        matches!(quotient.denom(), Some(denom) if denom == &BigUint::from(1u8))
    }

}

fn zero() -> BigFraction {
    BigFraction::new(BigUint::from(0u8), BigUint::from(1u8))
}

// A zero denominator is defined as infinity by the fraction crate.
fn infinity() -> BigFraction {
    BigFraction::new(BigUint::from(1u8), BigUint::from(0u8))
}

fn pow10(exponent: u32) -> BigUint {
    let ten = BigUint::from(10u8);
    let mut result = BigUint::from(1u8);
    for _ in 0..exponent {
        result *= &ten;
    }
    result
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for Number {}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.value.partial_cmp(&other.value)
    }
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> Ordering {
        self.partial_cmp(other)
            .expect("parsed numbers are totally ordered")
    }
}

impl Hash for Number {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match (self.value.numer(), self.value.denom()) {
            (Some(numer), Some(denom)) => {
                numer.hash(state);
                denom.hash(state);
            }
            _ => 0u8.hash(state),
        }
        (self.value < zero()).hash(state);
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.literal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("0", "0.0")]
    #[test_case("0", "-0")]
    #[test_case("1", "1.0")]
    #[test_case("1", "1.000")]
    #[test_case("4.2e-4", "0.00042")]
    #[test_case("42e2", "4200")]
    #[test_case("-3.5", "-35e-1")]
    #[test_case("0.1", "1e-1")]
    fn equal_across_spellings(a: &str, b: &str) {
        assert_eq!(Number::parse(a).unwrap(), Number::parse(b).unwrap());
    }

    #[test_case("1", "1.0000000001")]
    #[test_case("0.1", "0.2")]
    #[test_case("-1", "1")]
    fn unequal(a: &str, b: &str) {
        assert_ne!(Number::parse(a).unwrap(), Number::parse(b).unwrap());
    }

    #[test_case("1", "2")]
    #[test_case("-2", "-1")]
    #[test_case("0.00041", "4.2e-4")]
    #[test_case("-1e3", "1")]
    fn ordering(smaller: &str, larger: &str) {
        assert!(Number::parse(smaller).unwrap() < Number::parse(larger).unwrap());
    }

    #[test_case("1")]
    #[test_case("1.0")]
    #[test_case("-7")]
    #[test_case("1e3")]
    #[test_case("100e-2")]
    fn integers(literal: &str) {
        assert!(Number::parse(literal).unwrap().is_integer());
    }

    #[test_case("1.5")]
    #[test_case("-0.001")]
    #[test_case("1e-3")]
    fn not_integers(literal: &str) {
        assert!(!Number::parse(literal).unwrap().is_integer());
    }

    #[test_case("4", "2")]
    #[test_case("4.5", "1.5")]
    #[test_case("1.1", "0.1")]
    #[test_case("1.02", "0.02")]
    fn multiples(value: &str, divisor: &str) {
        let value = Number::parse(value).unwrap();
        let divisor = Number::parse(divisor).unwrap();
        assert!(value.is_multiple_of(&divisor));
    }

    #[test_case("7", "2")]
    #[test_case("4.55", "0.1")]
    #[test_case("4.5", "0.2")]
    fn not_multiples(value: &str, divisor: &str) {
        let value = Number::parse(value).unwrap();
        let divisor = Number::parse(divisor).unwrap();
        assert!(!value.is_multiple_of(&divisor));
    }

    #[test_case("" ; "empty")]
    #[test_case("-" ; "bare_minus")]
    #[test_case("1." ; "trailing_dot")]
    #[test_case(".5" ; "leading_dot")]
    #[test_case("1e" ; "dangling_exponent")]
    #[test_case("1x" ; "trailing_letter")]
    #[test_case("+1" ; "leading_plus")]
    fn rejected(literal: &str) {
        assert!(Number::parse(literal).is_err());
    }

    #[test]
    fn huge_exponents_saturate() {
        let huge = Number::parse("1e999999999").unwrap();
        let tiny = Number::parse("1e-999999999").unwrap();
        let one = Number::parse("1").unwrap();
        assert!(huge > one);
        assert!(tiny < one);
        assert!(!huge.is_integer());
    }

    #[test]
    fn hash_agrees_with_eq() {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};
        let hash = |n: &Number| {
            let mut hasher = DefaultHasher::new();
            n.hash(&mut hasher);
            hasher.finish()
        };
        let a = Number::parse("4.2e-4").unwrap();
        let b = Number::parse("0.00042").unwrap();
        assert_eq!(hash(&a), hash(&b));
    }
}
