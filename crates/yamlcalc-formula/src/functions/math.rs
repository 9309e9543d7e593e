//! Math functions

use super::{float_to_int, number_arg};
use crate::ast::BinaryOperator;
use crate::error::{FormulaError, FormulaResult};
use crate::evaluator::binary_op;
use crate::value::Value;

/// abs(x)
pub fn fn_abs<'d>(args: &[Value<'d>]) -> FormulaResult<Value<'d>> {
    match &args[0] {
        Value::Float(f) => Ok(Value::Float(f.abs())),
        v => match v.as_int() {
            Some(i) => i
                .checked_abs()
                .map(Value::Int)
                .ok_or(FormulaError::Overflow("abs")),
            None => Err(FormulaError::Type(format!(
                "bad operand type for abs(): '{}'",
                v.type_name()
            ))),
        },
    }
}

/// ceil(x), smallest integer not below x
pub fn fn_ceil<'d>(args: &[Value<'d>]) -> FormulaResult<Value<'d>> {
    match &args[0] {
        Value::Float(f) => float_to_int("ceil", f.ceil()).map(Value::Int),
        v => number_arg("ceil", v).and_then(|n| float_to_int("ceil", n.ceil()).map(Value::Int)),
    }
}

/// floor(x), largest integer not above x
pub fn fn_floor<'d>(args: &[Value<'d>]) -> FormulaResult<Value<'d>> {
    match &args[0] {
        Value::Float(f) => float_to_int("floor", f.floor()).map(Value::Int),
        v => number_arg("floor", v).and_then(|n| float_to_int("floor", n.floor()).map(Value::Int)),
    }
}

/// float([x]), accepting numbers and numeric strings
pub fn fn_float<'d>(args: &[Value<'d>]) -> FormulaResult<Value<'d>> {
    let v = match args.first() {
        Some(v) => v,
        None => return Ok(Value::Float(0.0)),
    };

    match v {
        Value::Str(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| FormulaError::Argument(format!("could not convert string to float: '{}'", s))),
        v => number_arg("float", v).map(Value::Float),
    }
}

/// int([x]), truncating floats toward zero and parsing integer strings
pub fn fn_int<'d>(args: &[Value<'d>]) -> FormulaResult<Value<'d>> {
    let v = match args.first() {
        Some(v) => v,
        None => return Ok(Value::Int(0)),
    };

    match v {
        Value::Float(f) => float_to_int("int", f.trunc()).map(Value::Int),
        Value::Str(s) => s
            .trim()
            .replace('_', "")
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| {
                FormulaError::Argument(format!("invalid literal for int() with base 10: '{}'", s))
            }),
        v => v.as_int().map(Value::Int).ok_or_else(|| {
            FormulaError::Type(format!(
                "int() argument must be a string or a number, not '{}'",
                v.type_name()
            ))
        }),
    }
}

/// pow(base, exp), same as `base ** exp`
pub fn fn_pow<'d>(args: &[Value<'d>]) -> FormulaResult<Value<'d>> {
    binary_op(BinaryOperator::Power, &args[0], &args[1])
}

/// Round half to even
fn round_half_even(x: f64) -> f64 {
    let rounded = x.round();
    if (x - x.trunc()).abs() == 0.5 {
        2.0 * (x / 2.0).round()
    } else {
        rounded
    }
}

/// round(x, [ndigits])
///
/// Halves round to the even neighbour. Without `ndigits` the result is an
/// integer; with it, the result keeps the type of `x`.
pub fn fn_round<'d>(args: &[Value<'d>]) -> FormulaResult<Value<'d>> {
    let x = &args[0];
    let digits = match args.get(1) {
        None | Some(Value::None) => None,
        Some(d) => Some(d.as_int().ok_or_else(|| {
            FormulaError::Type(format!(
                "'{}' object cannot be interpreted as an integer",
                d.type_name()
            ))
        })?),
    };

    if let Some(i) = x.as_int() {
        return match digits {
            Some(d) if d < 0 => {
                let factor = 10f64.powi(i32::try_from(-d).unwrap_or(i32::MAX));
                float_to_int("round", round_half_even(i as f64 / factor) * factor).map(Value::Int)
            }
            _ => Ok(Value::Int(i)),
        };
    }

    let f = number_arg("round", x)?;
    match digits {
        None => float_to_int("round", round_half_even(f)).map(Value::Int),
        Some(d) => {
            let d = i32::try_from(d.clamp(-308, 308)).unwrap_or(0);
            let factor = 10f64.powi(d);
            let scaled = f * factor;
            if !scaled.is_finite() {
                return Ok(Value::Float(f));
            }
            Ok(Value::Float(round_half_even(scaled) / factor))
        }
    }
}

/// sqrt(x)
pub fn fn_sqrt<'d>(args: &[Value<'d>]) -> FormulaResult<Value<'d>> {
    let n = number_arg("sqrt", &args[0])?;
    if n < 0.0 {
        return Err(FormulaError::Argument("math domain error".into()));
    }
    Ok(Value::Float(n.sqrt()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn call(f: crate::functions::FunctionImpl, args: Vec<Value<'static>>) -> FormulaResult<Value<'static>> {
        f(&args)
    }

    #[test]
    fn test_abs() {
        assert_eq!(call(fn_abs, vec![Value::Int(-3)]).unwrap(), Value::Int(3));
        assert_eq!(call(fn_abs, vec![Value::Float(-1.5)]).unwrap(), Value::Float(1.5));
        assert!(call(fn_abs, vec![Value::from("x")]).is_err());
        assert!(call(fn_abs, vec![Value::Int(i64::MIN)]).is_err());
    }

    #[test]
    fn test_ceil_floor() {
        assert_eq!(call(fn_ceil, vec![Value::Float(1.2)]).unwrap(), Value::Int(2));
        assert_eq!(call(fn_floor, vec![Value::Float(-1.2)]).unwrap(), Value::Int(-2));
        assert_eq!(call(fn_floor, vec![Value::Int(4)]).unwrap(), Value::Int(4));
        assert!(call(fn_ceil, vec![Value::Float(f64::NAN)]).is_err());
    }

    #[test]
    fn test_conversions() {
        assert_eq!(call(fn_float, vec![Value::from(" 2.5 ")]).unwrap(), Value::Float(2.5));
        assert_eq!(call(fn_float, vec![Value::Int(2)]).unwrap(), Value::Float(2.0));
        assert_eq!(call(fn_float, vec![]).unwrap(), Value::Float(0.0));
        assert!(call(fn_float, vec![Value::from("abc")]).is_err());

        assert_eq!(call(fn_int, vec![Value::Float(-2.7)]).unwrap(), Value::Int(-2));
        assert_eq!(call(fn_int, vec![Value::from("42")]).unwrap(), Value::Int(42));
        assert_eq!(call(fn_int, vec![Value::Bool(true)]).unwrap(), Value::Int(1));
        assert!(call(fn_int, vec![Value::from("4.2")]).is_err());
    }

    #[test]
    fn test_round() {
        assert_eq!(call(fn_round, vec![Value::Float(2.5)]).unwrap(), Value::Int(2));
        assert_eq!(call(fn_round, vec![Value::Float(3.5)]).unwrap(), Value::Int(4));
        assert_eq!(call(fn_round, vec![Value::Float(-0.4)]).unwrap(), Value::Int(0));
        assert_eq!(
            call(fn_round, vec![Value::Float(3.14159), Value::Int(2)]).unwrap(),
            Value::Float(3.14)
        );
        assert_eq!(
            call(fn_round, vec![Value::Int(1234), Value::Int(-2)]).unwrap(),
            Value::Int(1200)
        );
        assert_eq!(call(fn_round, vec![Value::Int(7)]).unwrap(), Value::Int(7));
    }

    #[test]
    fn test_pow_and_sqrt() {
        assert_eq!(
            call(fn_pow, vec![Value::Int(2), Value::Int(8)]).unwrap(),
            Value::Int(256)
        );
        assert_eq!(call(fn_sqrt, vec![Value::Int(9)]).unwrap(), Value::Float(3.0));
        assert!(call(fn_sqrt, vec![Value::Int(-1)]).is_err());
    }
}
