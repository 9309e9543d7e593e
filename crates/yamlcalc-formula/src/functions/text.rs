//! Text functions

use super::str_arg;
use crate::error::FormulaResult;
use crate::value::Value;

/// str([x])
pub fn fn_str<'d>(args: &[Value<'d>]) -> FormulaResult<Value<'d>> {
    match args.first() {
        Some(v) => v.to_text().map(Value::Str),
        None => Ok(Value::Str(String::new())),
    }
}

/// lower(s)
pub fn fn_lower<'d>(args: &[Value<'d>]) -> FormulaResult<Value<'d>> {
    Ok(Value::Str(str_arg("lower", &args[0])?.to_lowercase()))
}

/// upper(s)
pub fn fn_upper<'d>(args: &[Value<'d>]) -> FormulaResult<Value<'d>> {
    Ok(Value::Str(str_arg("upper", &args[0])?.to_uppercase()))
}

/// join(iterable, [separator])
///
/// Items are converted as by `str`. The separator defaults to the empty
/// string.
pub fn fn_join<'d>(args: &[Value<'d>]) -> FormulaResult<Value<'d>> {
    let separator = match args.get(1) {
        Some(sep) => str_arg("join", sep)?,
        None => "",
    };

    let parts = args[0]
        .iter_values()?
        .iter()
        .map(Value::to_text)
        .collect::<FormulaResult<Vec<_>>>()?;

    Ok(Value::Str(parts.join(separator)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_str() {
        assert_eq!(fn_str(&[Value::Int(5)]).unwrap(), Value::from("5"));
        assert_eq!(fn_str(&[Value::Float(2.0)]).unwrap(), Value::from("2.0"));
        assert_eq!(fn_str(&[Value::None]).unwrap(), Value::from("None"));
        assert_eq!(fn_str(&[]).unwrap(), Value::from(""));
    }

    #[test]
    fn test_case() {
        assert_eq!(fn_lower(&[Value::from("AbC")]).unwrap(), Value::from("abc"));
        assert_eq!(fn_upper(&[Value::from("AbC")]).unwrap(), Value::from("ABC"));
        assert!(fn_upper(&[Value::Int(1)]).is_err());
    }

    #[test]
    fn test_join() {
        let items = Value::List(vec![Value::from("a"), Value::Int(1), Value::Float(0.5)]);
        assert_eq!(
            fn_join(&[items.clone(), Value::from(", ")]).unwrap(),
            Value::from("a, 1, 0.5")
        );
        assert_eq!(fn_join(&[items]).unwrap(), Value::from("a10.5"));
    }
}
