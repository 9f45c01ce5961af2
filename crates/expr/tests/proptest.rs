//! Property-based tests for strata-expr using proptest.

use proptest::prelude::*;
use strata_core::Value;
use strata_expr::Expression;

proptest! {
    /// Integer arithmetic agrees with checked native arithmetic.
    #[test]
    fn arithmetic_matches_native(a in -10_000i64..10_000, b in -10_000i64..10_000, c in 1i64..100) {
        let expr = Expression::compile("a * b + a - b // c").unwrap();
        let expected = a * b + a - b.div_euclid(c);
        let got = expr.call(&[Value::from(a), Value::from(b), Value::from(c)]).unwrap();
        prop_assert_eq!(got, Value::from(expected));
    }

    /// Comparisons agree with native ordering.
    #[test]
    fn comparisons_match_native(a in any::<i64>(), b in any::<i64>()) {
        let expr = Expression::compile("(a < b, a <= b, a == b, a != b, a >= b, a > b)").unwrap();
        let got = expr.call(&[Value::from(a), Value::from(b)]).unwrap();
        let expected = Value::Tuple(
            [a < b, a <= b, a == b, a != b, a >= b, a > b]
                .into_iter()
                .map(Value::from)
                .collect(),
        );
        prop_assert_eq!(got, expected);
    }

    /// Compiling twice yields expressions that agree on every input.
    #[test]
    fn compilation_is_deterministic(values in prop::collection::vec(-50i64..50, 1..20)) {
        let first = Expression::compile("sum(v) - max(v) + min(v) * len(v)").unwrap();
        let second = Expression::compile("sum(v) - max(v) + min(v) * len(v)").unwrap();
        let tuple = Value::Tuple(values.iter().copied().map(Value::from).collect());
        let expected: i64 = values.iter().sum::<i64>() - values.iter().max().unwrap()
            + values.iter().min().unwrap() * values.len() as i64;
        prop_assert_eq!(first.call(&[tuple.clone()]).unwrap(), Value::from(expected));
        prop_assert_eq!(second.call(&[tuple]).unwrap(), Value::from(expected));
    }

    /// Unknown dotted names never compile.
    #[test]
    fn unknown_modules_are_rejected(module in "[a-z]{1,8}", member in "[a-z]{1,8}") {
        prop_assume!(module != "math");
        let formula = format!("{}.{}(1)", module, member);
        prop_assert!(Expression::compile(&formula).is_err());
    }
}
