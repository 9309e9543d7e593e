//! Aggregate functions

use crate::ast::BinaryOperator;
use crate::error::{FormulaError, FormulaResult};
use crate::evaluator::{binary_op, compare_order};
use crate::value::Value;
use std::cmp::Ordering;

/// Items of a `max`/`min` call: one iterable argument, or the arguments
fn candidates<'d>(function: &str, args: &[Value<'d>]) -> FormulaResult<Vec<Value<'d>>> {
    let items = if args.len() == 1 {
        args[0].iter_values()?
    } else {
        args.to_vec()
    };

    if items.is_empty() {
        return Err(FormulaError::Argument(format!(
            "{}() arg is an empty sequence",
            function
        )));
    }
    Ok(items)
}

/// Pick the first item that no other item beats in the `wanted` direction
fn extreme<'d>(function: &str, args: &[Value<'d>], wanted: Ordering) -> FormulaResult<Value<'d>> {
    let mut items = candidates(function, args)?.into_iter();
    let mut best = match items.next() {
        Some(first) => first,
        None => return Err(FormulaError::Argument(format!("{}() arg is an empty sequence", function))),
    };

    for item in items {
        if compare_order(&item, &best)? == Some(wanted) {
            best = item;
        }
    }

    Ok(best)
}

/// max(iterable) or max(a, b, ...)
pub fn fn_max<'d>(args: &[Value<'d>]) -> FormulaResult<Value<'d>> {
    extreme("max", args, Ordering::Greater)
}

/// min(iterable) or min(a, b, ...)
pub fn fn_min<'d>(args: &[Value<'d>]) -> FormulaResult<Value<'d>> {
    extreme("min", args, Ordering::Less)
}

/// sum(iterable, [start])
pub fn fn_sum<'d>(args: &[Value<'d>]) -> FormulaResult<Value<'d>> {
    let mut total = args.get(1).cloned().unwrap_or(Value::Int(0));
    if matches!(total, Value::Str(_)) {
        return Err(FormulaError::Type(
            "sum() can't sum strings, use join() instead".into(),
        ));
    }

    for item in args[0].iter_values()? {
        total = binary_op(BinaryOperator::Add, &total, &item)?;
    }

    Ok(total)
}

/// sorted(iterable, [reverse])
///
/// The sort is stable in both directions.
pub fn fn_sorted<'d>(args: &[Value<'d>]) -> FormulaResult<Value<'d>> {
    let mut items = args[0].iter_values()?;
    let reverse = args.get(1).map_or(false, Value::is_truthy);

    let mut failure = None;
    items.sort_by(|a, b| {
        let (a, b) = if reverse { (b, a) } else { (a, b) };
        match compare_order(a, b) {
            Ok(ordering) => ordering.unwrap_or(Ordering::Equal),
            Err(err) => {
                failure.get_or_insert(err);
                Ordering::Equal
            }
        }
    });

    match failure {
        Some(err) => Err(err),
        None => Ok(Value::List(items)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ints(values: &[i64]) -> Value<'static> {
        Value::List(values.iter().map(|i| Value::Int(*i)).collect())
    }

    #[test]
    fn test_max_min() {
        assert_eq!(fn_max(&[ints(&[3, 9, 2])]).unwrap(), Value::Int(9));
        assert_eq!(fn_min(&[ints(&[3, 9, 2])]).unwrap(), Value::Int(2));
        assert_eq!(
            fn_max(&[Value::Int(1), Value::Float(2.5)]).unwrap(),
            Value::Float(2.5)
        );
        assert_eq!(
            fn_min(&[Value::from("b"), Value::from("a")]).unwrap(),
            Value::from("a")
        );
        assert!(fn_max(&[ints(&[])]).is_err());
        assert!(fn_max(&[Value::Int(1), Value::from("a")]).is_err());
    }

    #[test]
    fn test_sum() {
        assert_eq!(fn_sum(&[ints(&[1, 2, 3])]).unwrap(), Value::Int(6));
        assert_eq!(fn_sum(&[ints(&[])]).unwrap(), Value::Int(0));
        assert_eq!(
            fn_sum(&[ints(&[1, 2]), Value::Float(0.5)]).unwrap(),
            Value::Float(3.5)
        );
        assert!(fn_sum(&[Value::List(vec![Value::from("a")])]).is_err());
    }

    #[test]
    fn test_sorted() {
        assert_eq!(fn_sorted(&[ints(&[3, 1, 2])]).unwrap(), ints(&[1, 2, 3]));
        assert_eq!(
            fn_sorted(&[ints(&[3, 1, 2]), Value::Bool(true)]).unwrap(),
            ints(&[3, 2, 1])
        );
        assert!(fn_sorted(&[Value::List(vec![Value::Int(1), Value::from("a")])]).is_err());
    }
}
