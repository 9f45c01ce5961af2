//! The allow-listed functions and constants a formula may reference.
//!
//! Two namespaces exist: bare builtins (`max`, `min`, `sum`, `len`, `abs`,
//! `round`) and the `math` module (`math.sqrt`, `math.pi`, ...). Nothing else
//! is callable from a formula.

use alloc::format;
use core::cmp::Ordering;
use core::f64::consts;
use strata_core::{Error, Result, Value};

pub(crate) type NativeFn = fn(&[Value]) -> Result<Value>;

/// Accepted argument counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Arity {
    Exact(usize),
    Between(usize, usize),
    AtLeast(usize),
}

impl Arity {
    pub(crate) fn accepts(self, argc: usize) -> bool {
        match self {
            Arity::Exact(n) => argc == n,
            Arity::Between(lo, hi) => (lo..=hi).contains(&argc),
            Arity::AtLeast(n) => argc >= n,
        }
    }

    pub(crate) fn describe(self) -> alloc::string::String {
        match self {
            Arity::Exact(1) => "exactly one argument".into(),
            Arity::Exact(n) => format!("exactly {} arguments", n),
            Arity::Between(lo, hi) => format!("{} to {} arguments", lo, hi),
            Arity::AtLeast(n) => format!("at least {} argument(s)", n),
        }
    }
}

pub(crate) struct Builtin {
    pub(crate) name: &'static str,
    pub(crate) arity: Arity,
    pub(crate) function: NativeFn,
}

const fn builtin(name: &'static str, arity: Arity, function: NativeFn) -> Builtin {
    Builtin {
        name,
        arity,
        function,
    }
}

/// Modules a formula may reach into.
pub const MODULES: &[&str] = &["math"];

pub(crate) static BUILTINS: &[Builtin] = &[
    builtin("max", Arity::AtLeast(1), max),
    builtin("min", Arity::AtLeast(1), min),
    builtin("sum", Arity::Between(1, 2), sum),
    builtin("len", Arity::Exact(1), len),
    builtin("abs", Arity::Exact(1), abs),
    builtin("round", Arity::Between(1, 2), round),
];

pub(crate) static MATH: &[Builtin] = &[
    builtin("sqrt", Arity::Exact(1), sqrt),
    builtin("exp", Arity::Exact(1), exp),
    builtin("log", Arity::Between(1, 2), log),
    builtin("log10", Arity::Exact(1), log10),
    builtin("log2", Arity::Exact(1), log2),
    builtin("sin", Arity::Exact(1), sin),
    builtin("cos", Arity::Exact(1), cos),
    builtin("tan", Arity::Exact(1), tan),
    builtin("asin", Arity::Exact(1), asin),
    builtin("acos", Arity::Exact(1), acos),
    builtin("atan", Arity::Exact(1), atan),
    builtin("atan2", Arity::Exact(2), atan2),
    builtin("floor", Arity::Exact(1), floor),
    builtin("ceil", Arity::Exact(1), ceil),
    builtin("fabs", Arity::Exact(1), fabs),
    builtin("pow", Arity::Exact(2), pow),
    builtin("hypot", Arity::Exact(2), hypot),
];

pub(crate) static MATH_CONSTANTS: &[(&str, f64)] = &[
    ("pi", consts::PI),
    ("e", consts::E),
    ("tau", consts::TAU),
    ("inf", f64::INFINITY),
    ("nan", f64::NAN),
];

/// Names of the bare builtins.
pub fn builtin_names() -> impl Iterator<Item = &'static str> {
    BUILTINS.iter().map(|b| b.name)
}

pub(crate) fn find_builtin(name: &str) -> Option<&'static Builtin> {
    BUILTINS.iter().find(|b| b.name == name)
}

pub(crate) fn find_member(module: &str, member: &str) -> Option<&'static Builtin> {
    match module {
        "math" => MATH.iter().find(|b| b.name == member),
        _ => None,
    }
}

pub(crate) fn find_constant(module: &str, member: &str) -> Option<f64> {
    match module {
        "math" => MATH_CONSTANTS
            .iter()
            .find(|(name, _)| *name == member)
            .map(|(_, v)| *v),
        _ => None,
    }
}

/// Orders two values the way comparison operators see them.
///
/// Numbers compare across int and float, and a boolean counts as 0 or 1
/// against a number. Strings, booleans and tuples compare with their own
/// kind. `None` means unordered (a NaN was involved).
pub(crate) fn compare(op: &'static str, left: &Value, right: &Value) -> Result<Option<Ordering>> {
    match (left, right) {
        (Value::Boolean(b), other) if other.is_numeric() => {
            return compare(op, &Value::Int64(*b as i64), other)
        }
        (other, Value::Boolean(b)) if other.is_numeric() => {
            return compare(op, other, &Value::Int64(*b as i64))
        }
        _ => {}
    }
    match (left, right) {
        (Value::Float64(f), other) | (other, Value::Float64(f)) if other.is_numeric() => {
            if f.is_nan() || other.as_f64().is_some_and(f64::is_nan) {
                Ok(None)
            } else {
                Ok(Some(left.cmp(right)))
            }
        }
        (Value::Int64(_), Value::Int64(_))
        | (Value::Boolean(_), Value::Boolean(_))
        | (Value::String(_), Value::String(_))
        | (Value::Tuple(_), Value::Tuple(_)) => Ok(Some(left.cmp(right))),
        _ => Err(Error::type_mismatch(op, left.type_name(), right.type_name())),
    }
}

fn number(function: &str, value: &Value) -> Result<f64> {
    match value {
        Value::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
        other => other.as_f64().ok_or_else(|| {
            Error::evaluation(format!(
                "{}() expects a number, got {}",
                function,
                other.type_name()
            ))
        }),
    }
}

fn integer(function: &str, value: &Value) -> Result<i64> {
    match value {
        Value::Int64(i) => Ok(*i),
        Value::Boolean(b) => Ok(*b as i64),
        other => Err(Error::evaluation(format!(
            "{}() expects an integer, got {}",
            function,
            other.type_name()
        ))),
    }
}

fn domain_error() -> Error {
    Error::evaluation("math domain error")
}

fn to_integer(function: &str, value: f64) -> Result<Value> {
    if value.is_nan() {
        return Err(Error::evaluation(format!("{}() of nan", function)));
    }
    if value < i64::MIN as f64 || value >= i64::MAX as f64 {
        return Err(Error::evaluation(format!("{}() result out of integer range", function)));
    }
    Ok(Value::Int64(value as i64))
}

/// `max(a, b, ...)` or `max(tuple)`.
fn extreme(function: &'static str, args: &[Value], wanted: Ordering) -> Result<Value> {
    let items = match args {
        [Value::Tuple(items)] => items.as_slice(),
        [other] => {
            return Err(Error::evaluation(format!(
                "{}() expects a tuple, got {}",
                function,
                other.type_name()
            )))
        }
        _ => args,
    };
    let mut best = items
        .first()
        .ok_or_else(|| Error::evaluation(format!("{}() arg is an empty sequence", function)))?;
    for item in &items[1..] {
        if compare(function, item, best)? == Some(wanted) {
            best = item;
        }
    }
    Ok(best.clone())
}

fn max(args: &[Value]) -> Result<Value> {
    extreme("max", args, Ordering::Greater)
}

fn min(args: &[Value]) -> Result<Value> {
    extreme("min", args, Ordering::Less)
}

fn sum(args: &[Value]) -> Result<Value> {
    let items = args[0]
        .as_tuple()
        .ok_or_else(|| Error::evaluation(format!("sum() expects a tuple, got {}", args[0].type_name())))?;
    let start = args.get(1).cloned().unwrap_or(Value::Int64(0));
    items.iter().try_fold(start, |total, item| total.try_add(item))
}

fn len(args: &[Value]) -> Result<Value> {
    match &args[0] {
        Value::Tuple(items) => Ok(Value::from(items.len())),
        Value::String(s) => Ok(Value::from(s.chars().count())),
        other => Err(Error::evaluation(format!(
            "object of type {} has no len()",
            other.type_name()
        ))),
    }
}

fn abs(args: &[Value]) -> Result<Value> {
    match &args[0] {
        Value::Int64(i) => i
            .checked_abs()
            .map(Value::Int64)
            .ok_or_else(|| Error::evaluation("integer overflow in abs")),
        Value::Boolean(b) => Ok(Value::Int64(*b as i64)),
        other => Ok(Value::Float64(libm::fabs(number("abs", other)?))),
    }
}

fn round(args: &[Value]) -> Result<Value> {
    let digits = match args.get(1) {
        None | Some(Value::Null) => None,
        Some(n) => Some(integer("round", n)?),
    };
    match (&args[0], digits) {
        (Value::Int64(i), None) => Ok(Value::Int64(*i)),
        (Value::Int64(i), Some(d)) if d >= 0 => Ok(Value::Int64(*i)),
        (Value::Int64(i), Some(d)) => {
            let scale = libm::pow(10.0, -(d as f64));
            to_integer("round", libm::rint(*i as f64 / scale) * scale)
        }
        (other, None) => to_integer("round", libm::rint(number("round", other)?)),
        (other, Some(d)) => {
            let x = number("round", other)?;
            let scale = libm::pow(10.0, d as f64);
            Ok(Value::Float64(libm::rint(x * scale) / scale))
        }
    }
}

macro_rules! unary_math {
    ($name:ident, $label:literal, $f:path) => {
        fn $name(args: &[Value]) -> Result<Value> {
            Ok(Value::Float64($f(number($label, &args[0])?)))
        }
    };
}

unary_math!(exp, "exp", libm::exp);
unary_math!(sin, "sin", libm::sin);
unary_math!(cos, "cos", libm::cos);
unary_math!(tan, "tan", libm::tan);
unary_math!(atan, "atan", libm::atan);
unary_math!(fabs, "fabs", libm::fabs);

fn sqrt(args: &[Value]) -> Result<Value> {
    let x = number("sqrt", &args[0])?;
    if x < 0.0 {
        return Err(domain_error());
    }
    Ok(Value::Float64(libm::sqrt(x)))
}

fn positive(function: &str, value: &Value) -> Result<f64> {
    let x = number(function, value)?;
    if x <= 0.0 {
        return Err(domain_error());
    }
    Ok(x)
}

fn log(args: &[Value]) -> Result<Value> {
    let x = positive("log", &args[0])?;
    match args.get(1) {
        None => Ok(Value::Float64(libm::log(x))),
        Some(base) => {
            let base = positive("log", base)?;
            if base == 1.0 {
                return Err(Error::evaluation("division by zero"));
            }
            Ok(Value::Float64(libm::log(x) / libm::log(base)))
        }
    }
}

fn log10(args: &[Value]) -> Result<Value> {
    Ok(Value::Float64(libm::log10(positive("log10", &args[0])?)))
}

fn log2(args: &[Value]) -> Result<Value> {
    Ok(Value::Float64(libm::log2(positive("log2", &args[0])?)))
}

fn unit_interval(function: &str, value: &Value) -> Result<f64> {
    let x = number(function, value)?;
    if !(-1.0..=1.0).contains(&x) {
        return Err(domain_error());
    }
    Ok(x)
}

fn asin(args: &[Value]) -> Result<Value> {
    Ok(Value::Float64(libm::asin(unit_interval("asin", &args[0])?)))
}

fn acos(args: &[Value]) -> Result<Value> {
    Ok(Value::Float64(libm::acos(unit_interval("acos", &args[0])?)))
}

fn atan2(args: &[Value]) -> Result<Value> {
    let y = number("atan2", &args[0])?;
    let x = number("atan2", &args[1])?;
    Ok(Value::Float64(libm::atan2(y, x)))
}

fn floor(args: &[Value]) -> Result<Value> {
    match &args[0] {
        Value::Int64(i) => Ok(Value::Int64(*i)),
        other => to_integer("floor", libm::floor(number("floor", other)?)),
    }
}

fn ceil(args: &[Value]) -> Result<Value> {
    match &args[0] {
        Value::Int64(i) => Ok(Value::Int64(*i)),
        other => to_integer("ceil", libm::ceil(number("ceil", other)?)),
    }
}

fn pow(args: &[Value]) -> Result<Value> {
    let x = number("pow", &args[0])?;
    let y = number("pow", &args[1])?;
    Ok(Value::Float64(libm::pow(x, y)))
}

fn hypot(args: &[Value]) -> Result<Value> {
    let x = number("hypot", &args[0])?;
    let y = number("hypot", &args[1])?;
    Ok(Value::Float64(libm::hypot(x, y)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, args: &[Value]) -> Result<Value> {
        let builtin = find_builtin(name)
            .or_else(|| find_member("math", name))
            .unwrap();
        assert!(builtin.arity.accepts(args.len()));
        (builtin.function)(args)
    }

    fn tuple(values: &[i64]) -> Value {
        Value::Tuple(values.iter().map(|v| Value::Int64(*v)).collect())
    }

    #[test]
    fn test_max_min() {
        assert_eq!(call("max", &[tuple(&[3, 9, 2])]).unwrap(), Value::from(9));
        assert_eq!(
            call("min", &[Value::from(2.5), Value::from(1)]).unwrap(),
            Value::from(1)
        );
        assert!(call("max", &[tuple(&[])]).is_err());
        assert!(call("max", &[Value::from(1), Value::from("a")]).is_err());
    }

    #[test]
    fn test_sum_and_len() {
        assert_eq!(call("sum", &[tuple(&[1, 2, 3, 4])]).unwrap(), Value::from(10));
        assert_eq!(
            call("sum", &[tuple(&[1]), Value::from(0.5)]).unwrap(),
            Value::from(1.5)
        );
        assert_eq!(call("sum", &[tuple(&[])]).unwrap(), Value::from(0));
        assert_eq!(call("len", &[tuple(&[1, 2])]).unwrap(), Value::from(2));
        assert_eq!(call("len", &[Value::from("héllo")]).unwrap(), Value::from(5));
        assert!(call("len", &[Value::from(3)]).is_err());
    }

    #[test]
    fn test_round_half_even() {
        assert_eq!(call("round", &[Value::from(2.5)]).unwrap(), Value::from(2));
        assert_eq!(call("round", &[Value::from(3.5)]).unwrap(), Value::from(4));
        assert_eq!(
            call("round", &[Value::from(1.25), Value::from(1)]).unwrap(),
            Value::from(1.2)
        );
        assert_eq!(
            call("round", &[Value::from(1250), Value::from(-2)]).unwrap(),
            Value::from(1200)
        );
        assert!(call("round", &[Value::from(f64::NAN)]).is_err());
    }

    #[test]
    fn test_abs() {
        assert_eq!(call("abs", &[Value::from(-3)]).unwrap(), Value::from(3));
        assert_eq!(call("abs", &[Value::from(-0.5)]).unwrap(), Value::from(0.5));
        assert!(call("abs", &[Value::from(i64::MIN)]).is_err());
    }

    #[test]
    fn test_math_functions() {
        assert_eq!(call("sqrt", &[Value::from(16)]).unwrap(), Value::from(4.0));
        assert!(call("sqrt", &[Value::from(-1)]).is_err());
        let log8 = call("log", &[Value::from(8), Value::from(2)]).unwrap();
        assert!(libm::fabs(log8.as_f64().unwrap() - 3.0) < 1e-12);
        assert!(call("log", &[Value::from(0)]).is_err());
        assert_eq!(call("floor", &[Value::from(-1.5)]).unwrap(), Value::from(-2));
        assert_eq!(call("ceil", &[Value::from(1.2)]).unwrap(), Value::from(2));
        assert_eq!(
            call("hypot", &[Value::from(3), Value::from(4)]).unwrap(),
            Value::from(5.0)
        );
        assert!(call("acos", &[Value::from(2)]).is_err());
        assert!(call("sin", &[Value::from("x")]).is_err());
    }

    #[test]
    fn test_compare() {
        assert_eq!(
            compare("<", &Value::from(1), &Value::from(1.5)).unwrap(),
            Some(Ordering::Less)
        );
        assert_eq!(
            compare("<", &Value::from(f64::NAN), &Value::from(1)).unwrap(),
            None
        );
        assert!(compare("<", &Value::from("a"), &Value::from(1)).is_err());
        assert!(compare("<", &Value::Null, &Value::Null).is_err());
        assert_eq!(
            compare("<", &Value::from(true), &Value::from(2)).unwrap(),
            Some(Ordering::Less)
        );
        assert_eq!(
            compare(">=", &Value::from(0.5), &Value::from(false)).unwrap(),
            Some(Ordering::Greater)
        );
    }

    #[test]
    fn test_constants() {
        assert_eq!(find_constant("math", "pi"), Some(consts::PI));
        assert_eq!(find_constant("math", "sqrt"), None);
        assert_eq!(find_constant("os", "pi"), None);
        assert!(find_member("os", "system").is_none());
    }
}
