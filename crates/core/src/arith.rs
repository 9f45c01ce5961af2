//! Arithmetic, bitwise and membership operations on `Value`.
//!
//! Integer arithmetic is checked; overflow and division by zero surface as
//! `Error::Evaluation` rather than wrapping or panicking. Mixing integers and
//! floats promotes to float. Division (`try_div`) always produces a float,
//! floor division and remainder follow the sign of the divisor.

use crate::error::{Error, Result};
use crate::value::Value;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

#[derive(Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn of(value: &Value) -> Option<Num> {
        match value {
            Value::Int64(i) => Some(Num::Int(*i)),
            Value::Float64(f) => Some(Num::Float(*f)),
            _ => None,
        }
    }

    fn float(self) -> f64 {
        match self {
            Num::Int(i) => i as f64,
            Num::Float(f) => f,
        }
    }
}

fn overflow(op: &str) -> Error {
    Error::evaluation(format!("integer overflow in {}", op))
}

fn division_by_zero() -> Error {
    Error::evaluation("division by zero")
}

fn unary_mismatch(op: &str, operand: &Value) -> Error {
    Error::evaluation(format!(
        "bad operand type for unary {}: {}",
        op,
        operand.type_name()
    ))
}

fn repeat<T: Clone>(items: &[T], times: i64) -> Result<Vec<T>> {
    let times = usize::try_from(times).unwrap_or(0);
    let len = items
        .len()
        .checked_mul(times)
        .filter(|len| {
            len.checked_mul(core::mem::size_of::<T>())
                .is_some_and(|bytes| bytes <= isize::MAX as usize)
        })
        .ok_or_else(|| overflow("*"))?;
    let mut out = Vec::new();
    out.try_reserve_exact(len)
        .map_err(|_| Error::evaluation(format!("repetition of {} items is too large", len)))?;
    for _ in 0..times {
        out.extend_from_slice(items);
    }
    Ok(out)
}

impl Value {
    /// Numeric addition, string concatenation or tuple concatenation.
    pub fn try_add(&self, rhs: &Value) -> Result<Value> {
        match (self, rhs) {
            (Value::String(a), Value::String(b)) => {
                let mut out = String::with_capacity(a.len() + b.len());
                out.push_str(a);
                out.push_str(b);
                Ok(Value::String(out))
            }
            (Value::Tuple(a), Value::Tuple(b)) => {
                let mut out = a.clone();
                out.extend(b.iter().cloned());
                Ok(Value::Tuple(out))
            }
            _ => match (Num::of(self), Num::of(rhs)) {
                (Some(Num::Int(a)), Some(Num::Int(b))) => a
                    .checked_add(b)
                    .map(Value::Int64)
                    .ok_or_else(|| overflow("+")),
                (Some(a), Some(b)) => Ok(Value::Float64(a.float() + b.float())),
                _ => Err(Error::type_mismatch("+", self.type_name(), rhs.type_name())),
            },
        }
    }

    /// Numeric subtraction.
    pub fn try_sub(&self, rhs: &Value) -> Result<Value> {
        match (Num::of(self), Num::of(rhs)) {
            (Some(Num::Int(a)), Some(Num::Int(b))) => a
                .checked_sub(b)
                .map(Value::Int64)
                .ok_or_else(|| overflow("-")),
            (Some(a), Some(b)) => Ok(Value::Float64(a.float() - b.float())),
            _ => Err(Error::type_mismatch("-", self.type_name(), rhs.type_name())),
        }
    }

    /// Numeric multiplication, or repetition of a string or tuple by an integer.
    pub fn try_mul(&self, rhs: &Value) -> Result<Value> {
        match (self, rhs) {
            (Value::String(s), Value::Int64(n)) | (Value::Int64(n), Value::String(s)) => {
                let chars: Vec<char> = s.chars().collect();
                Ok(Value::String(repeat(&chars, *n)?.into_iter().collect()))
            }
            (Value::Tuple(items), Value::Int64(n)) | (Value::Int64(n), Value::Tuple(items)) => {
                Ok(Value::Tuple(repeat(items, *n)?))
            }
            _ => match (Num::of(self), Num::of(rhs)) {
                (Some(Num::Int(a)), Some(Num::Int(b))) => a
                    .checked_mul(b)
                    .map(Value::Int64)
                    .ok_or_else(|| overflow("*")),
                (Some(a), Some(b)) => Ok(Value::Float64(a.float() * b.float())),
                _ => Err(Error::type_mismatch("*", self.type_name(), rhs.type_name())),
            },
        }
    }

    /// True division; always produces a float.
    pub fn try_div(&self, rhs: &Value) -> Result<Value> {
        match (Num::of(self), Num::of(rhs)) {
            (Some(a), Some(b)) => {
                let divisor = b.float();
                if divisor == 0.0 {
                    return Err(division_by_zero());
                }
                Ok(Value::Float64(a.float() / divisor))
            }
            _ => Err(Error::type_mismatch("/", self.type_name(), rhs.type_name())),
        }
    }

    /// Floor division, rounding toward negative infinity.
    pub fn try_floor_div(&self, rhs: &Value) -> Result<Value> {
        match (Num::of(self), Num::of(rhs)) {
            (Some(Num::Int(_)), Some(Num::Int(0))) => Err(division_by_zero()),
            (Some(Num::Int(a)), Some(Num::Int(b))) => {
                let q = a.checked_div(b).ok_or_else(|| overflow("//"))?;
                if a % b != 0 && ((a < 0) != (b < 0)) {
                    Ok(Value::Int64(q - 1))
                } else {
                    Ok(Value::Int64(q))
                }
            }
            (Some(a), Some(b)) => {
                let divisor = b.float();
                if divisor == 0.0 {
                    return Err(division_by_zero());
                }
                Ok(Value::Float64(libm::floor(a.float() / divisor)))
            }
            _ => Err(Error::type_mismatch("//", self.type_name(), rhs.type_name())),
        }
    }

    /// Remainder whose sign follows the divisor.
    pub fn try_rem(&self, rhs: &Value) -> Result<Value> {
        match (Num::of(self), Num::of(rhs)) {
            (Some(Num::Int(_)), Some(Num::Int(0))) => Err(division_by_zero()),
            (Some(Num::Int(a)), Some(Num::Int(b))) => {
                let r = a.checked_rem(b).ok_or_else(|| overflow("%"))?;
                if r != 0 && ((r < 0) != (b < 0)) {
                    Ok(Value::Int64(r + b))
                } else {
                    Ok(Value::Int64(r))
                }
            }
            (Some(a), Some(b)) => {
                let (a, b) = (a.float(), b.float());
                if b == 0.0 {
                    return Err(division_by_zero());
                }
                Ok(Value::Float64(a - b * libm::floor(a / b)))
            }
            _ => Err(Error::type_mismatch("%", self.type_name(), rhs.type_name())),
        }
    }

    /// Exponentiation. Stays integral for a non-negative integer exponent.
    pub fn try_pow(&self, rhs: &Value) -> Result<Value> {
        match (Num::of(self), Num::of(rhs)) {
            (Some(Num::Int(a)), Some(Num::Int(b))) if b >= 0 => {
                let exp = u32::try_from(b).map_err(|_| overflow("**"))?;
                a.checked_pow(exp)
                    .map(Value::Int64)
                    .ok_or_else(|| overflow("**"))
            }
            (Some(a), Some(b)) => Ok(Value::Float64(libm::pow(a.float(), b.float()))),
            _ => Err(Error::type_mismatch("**", self.type_name(), rhs.type_name())),
        }
    }

    /// Arithmetic negation.
    pub fn try_neg(&self) -> Result<Value> {
        match self {
            Value::Int64(i) => i.checked_neg().map(Value::Int64).ok_or_else(|| overflow("-")),
            Value::Float64(f) => Ok(Value::Float64(-f)),
            _ => Err(unary_mismatch("-", self)),
        }
    }

    /// Unary plus; only defined for numbers.
    pub fn try_pos(&self) -> Result<Value> {
        if self.is_numeric() {
            Ok(self.clone())
        } else {
            Err(unary_mismatch("+", self))
        }
    }

    /// Bitwise inversion of an integer.
    pub fn try_invert(&self) -> Result<Value> {
        match self {
            Value::Int64(i) => Ok(Value::Int64(!i)),
            _ => Err(unary_mismatch("~", self)),
        }
    }

    /// Bitwise and; logical and for two booleans.
    pub fn try_bit_and(&self, rhs: &Value) -> Result<Value> {
        match (self, rhs) {
            (Value::Int64(a), Value::Int64(b)) => Ok(Value::Int64(a & b)),
            (Value::Boolean(a), Value::Boolean(b)) => Ok(Value::Boolean(a & b)),
            _ => Err(Error::type_mismatch("&", self.type_name(), rhs.type_name())),
        }
    }

    /// Bitwise or; logical or for two booleans.
    pub fn try_bit_or(&self, rhs: &Value) -> Result<Value> {
        match (self, rhs) {
            (Value::Int64(a), Value::Int64(b)) => Ok(Value::Int64(a | b)),
            (Value::Boolean(a), Value::Boolean(b)) => Ok(Value::Boolean(a | b)),
            _ => Err(Error::type_mismatch("|", self.type_name(), rhs.type_name())),
        }
    }

    /// Bitwise exclusive or.
    pub fn try_bit_xor(&self, rhs: &Value) -> Result<Value> {
        match (self, rhs) {
            (Value::Int64(a), Value::Int64(b)) => Ok(Value::Int64(a ^ b)),
            (Value::Boolean(a), Value::Boolean(b)) => Ok(Value::Boolean(a ^ b)),
            _ => Err(Error::type_mismatch("^", self.type_name(), rhs.type_name())),
        }
    }

    /// Left shift; fails instead of dropping high bits.
    pub fn try_shl(&self, rhs: &Value) -> Result<Value> {
        match (self, rhs) {
            (Value::Int64(a), Value::Int64(b)) => {
                let shift = shift_amount(*b)?;
                let shifted = a.checked_shl(shift).ok_or_else(|| overflow("<<"))?;
                if shifted >> shift != *a {
                    return Err(overflow("<<"));
                }
                Ok(Value::Int64(shifted))
            }
            _ => Err(Error::type_mismatch("<<", self.type_name(), rhs.type_name())),
        }
    }

    /// Arithmetic right shift.
    pub fn try_shr(&self, rhs: &Value) -> Result<Value> {
        match (self, rhs) {
            (Value::Int64(a), Value::Int64(b)) => {
                let shift = shift_amount(*b)?.min(63);
                Ok(Value::Int64(a >> shift))
            }
            _ => Err(Error::type_mismatch(">>", self.type_name(), rhs.type_name())),
        }
    }

    /// Membership: element of a tuple, or substring of a string.
    pub fn try_contains(&self, item: &Value) -> Result<bool> {
        match (self, item) {
            (Value::Tuple(items), _) => Ok(items.contains(item)),
            (Value::String(haystack), Value::String(needle)) => {
                Ok(haystack.contains(needle.as_str()))
            }
            _ => Err(Error::type_mismatch("in", item.type_name(), self.type_name())),
        }
    }
}

fn shift_amount(count: i64) -> Result<u32> {
    if count < 0 {
        return Err(Error::evaluation("negative shift count"));
    }
    Ok(u32::try_from(count).unwrap_or(u32::MAX).min(64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn int(i: i64) -> Value {
        Value::Int64(i)
    }

    #[test]
    fn test_add_promotes_and_concatenates() {
        assert_eq!(int(1).try_add(&int(2)).unwrap(), int(3));
        assert_eq!(
            int(1).try_add(&Value::Float64(0.5)).unwrap(),
            Value::Float64(1.5)
        );
        assert_eq!(
            Value::from("ab").try_add(&Value::from("cd")).unwrap(),
            Value::from("abcd")
        );
        assert_eq!(
            Value::Tuple(vec![int(1)])
                .try_add(&Value::Tuple(vec![int(2)]))
                .unwrap(),
            Value::Tuple(vec![int(1), int(2)])
        );
        assert!(matches!(
            int(1).try_add(&Value::from("x")),
            Err(Error::TypeMismatch { op: "+", .. })
        ));
    }

    #[test]
    fn test_integer_overflow_is_an_error() {
        assert!(int(i64::MAX).try_add(&int(1)).is_err());
        assert!(int(i64::MIN).try_neg().is_err());
        assert!(int(2).try_pow(&int(64)).is_err());
        assert_eq!(int(1).try_shl(&int(62)).unwrap(), int(1 << 62));
        assert!(int(2).try_shl(&int(62)).is_err());
    }

    #[test]
    fn test_oversized_repetition_is_an_error() {
        let text = Value::from("ab");
        let err = text.try_mul(&int(i64::MAX)).unwrap_err();
        assert!(matches!(err, Error::Evaluation { .. }));
        assert!(int(i64::MAX).try_mul(&text).is_err());

        let items = Value::Tuple(vec![int(1), int(2)]);
        assert!(items.try_mul(&int(i64::MAX)).is_err());
        assert!(int(i64::MAX / 2).try_mul(&items).is_err());

        assert_eq!(text.try_mul(&int(2)).unwrap(), Value::from("abab"));
        assert_eq!(text.try_mul(&int(-1)).unwrap(), Value::from(""));
        assert_eq!(items.try_mul(&int(0)).unwrap(), Value::Tuple(vec![]));
    }

    #[test]
    fn test_division_family() {
        assert_eq!(int(7).try_div(&int(2)).unwrap(), Value::Float64(3.5));
        assert_eq!(int(-7).try_floor_div(&int(2)).unwrap(), int(-4));
        assert_eq!(int(7).try_floor_div(&int(2)).unwrap(), int(3));
        assert_eq!(int(-7).try_rem(&int(3)).unwrap(), int(2));
        assert_eq!(int(7).try_rem(&int(-3)).unwrap(), int(-2));
        assert_eq!(
            Value::Float64(-7.0).try_rem(&int(3)).unwrap(),
            Value::Float64(2.0)
        );
        assert!(int(1).try_div(&int(0)).is_err());
        assert!(int(1).try_floor_div(&int(0)).is_err());
        assert!(int(1).try_rem(&int(0)).is_err());
    }

    #[test]
    fn test_pow() {
        assert_eq!(int(2).try_pow(&int(10)).unwrap(), int(1024));
        assert_eq!(int(2).try_pow(&int(-1)).unwrap(), Value::Float64(0.5));
        assert_eq!(
            Value::Float64(9.0).try_pow(&Value::Float64(0.5)).unwrap(),
            Value::Float64(3.0)
        );
    }

    #[test]
    fn test_repetition() {
        assert_eq!(
            Value::from("ab").try_mul(&int(3)).unwrap(),
            Value::from("ababab")
        );
        assert_eq!(
            int(2).try_mul(&Value::Tuple(vec![int(0)])).unwrap(),
            Value::Tuple(vec![int(0), int(0)])
        );
        assert_eq!(Value::from("ab").try_mul(&int(-1)).unwrap(), Value::from(""));
    }

    #[test]
    fn test_bitwise() {
        assert_eq!(int(6).try_bit_and(&int(3)).unwrap(), int(2));
        assert_eq!(int(6).try_bit_or(&int(3)).unwrap(), int(7));
        assert_eq!(int(6).try_bit_xor(&int(3)).unwrap(), int(5));
        assert_eq!(int(0).try_invert().unwrap(), int(-1));
        assert_eq!(int(-8).try_shr(&int(1)).unwrap(), int(-4));
        assert!(int(1).try_shl(&int(-1)).is_err());
        assert_eq!(
            Value::Boolean(true).try_bit_and(&Value::Boolean(false)).unwrap(),
            Value::Boolean(false)
        );
    }

    #[test]
    fn test_contains() {
        let tuple = Value::Tuple(vec![int(1), int(2)]);
        assert!(tuple.try_contains(&Value::Float64(2.0)).unwrap());
        assert!(!tuple.try_contains(&int(3)).unwrap());
        assert!(Value::from("hello").try_contains(&Value::from("ell")).unwrap());
        assert!(int(3).try_contains(&int(3)).is_err());
    }
}
