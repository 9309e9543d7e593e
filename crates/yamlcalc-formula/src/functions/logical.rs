//! Logical functions

use crate::error::FormulaResult;
use crate::value::Value;

/// all(iterable), true when no item is falsy
pub fn fn_all<'d>(args: &[Value<'d>]) -> FormulaResult<Value<'d>> {
    let items = args[0].iter_values()?;
    Ok(Value::Bool(items.iter().all(Value::is_truthy)))
}

/// any(iterable), true when some item is truthy
pub fn fn_any<'d>(args: &[Value<'d>]) -> FormulaResult<Value<'d>> {
    let items = args[0].iter_values()?;
    Ok(Value::Bool(items.iter().any(Value::is_truthy)))
}

/// bool([x])
pub fn fn_bool<'d>(args: &[Value<'d>]) -> FormulaResult<Value<'d>> {
    Ok(Value::Bool(args.first().map_or(false, Value::is_truthy)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_any() {
        let mixed = Value::List(vec![Value::Int(1), Value::Int(0)]);
        assert_eq!(fn_all(&[mixed.clone()]).unwrap(), Value::Bool(false));
        assert_eq!(fn_any(&[mixed]).unwrap(), Value::Bool(true));

        let empty = Value::List(vec![]);
        assert_eq!(fn_all(&[empty.clone()]).unwrap(), Value::Bool(true));
        assert_eq!(fn_any(&[empty]).unwrap(), Value::Bool(false));

        assert!(fn_all(&[Value::Int(1)]).is_err());
    }

    #[test]
    fn test_bool() {
        assert_eq!(fn_bool(&[]).unwrap(), Value::Bool(false));
        assert_eq!(fn_bool(&[Value::from("x")]).unwrap(), Value::Bool(true));
        assert_eq!(fn_bool(&[Value::None]).unwrap(), Value::Bool(false));
    }
}
