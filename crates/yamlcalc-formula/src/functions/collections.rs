//! Collection functions

use crate::error::{FormulaError, FormulaResult};
use crate::value::{Value, MAX_SEQUENCE_LEN};
use yamlcalc_core::Result;

/// (key, value) pairs of a mapping, formula cells evaluated
fn mapping_entries<'d>(function: &str, value: &Value<'d>) -> FormulaResult<Vec<(String, Value<'d>)>> {
    match value {
        Value::Dict(map) => Ok(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
        Value::Map(map) => Ok(map
            .iter()
            .map(|(k, v)| v.map(|v| (k.to_string(), v)))
            .collect::<Result<Vec<_>>>()?),
        other => Err(FormulaError::Type(format!(
            "{}() argument must be a mapping, not '{}'",
            function,
            other.type_name()
        ))),
    }
}

/// enumerate(iterable, [start]) as a list of `[index, item]` pairs
pub fn fn_enumerate<'d>(args: &[Value<'d>]) -> FormulaResult<Value<'d>> {
    let start = match args.get(1) {
        Some(v) => v.as_int().ok_or_else(|| {
            FormulaError::Type(format!(
                "'{}' object cannot be interpreted as an integer",
                v.type_name()
            ))
        })?,
        None => 0,
    };

    let mut out = Vec::new();
    for (offset, item) in args[0].iter_values()?.into_iter().enumerate() {
        let index = i64::try_from(offset)
            .ok()
            .and_then(|o| start.checked_add(o))
            .ok_or(FormulaError::Overflow("enumerate"))?;
        out.push(Value::List(vec![Value::Int(index), item]));
    }

    Ok(Value::List(out))
}

/// items(mapping) as a list of `[key, value]` pairs
pub fn fn_items<'d>(args: &[Value<'d>]) -> FormulaResult<Value<'d>> {
    Ok(Value::List(
        mapping_entries("items", &args[0])?
            .into_iter()
            .map(|(k, v)| Value::List(vec![Value::Str(k), v]))
            .collect(),
    ))
}

/// keys(mapping)
pub fn fn_keys<'d>(args: &[Value<'d>]) -> FormulaResult<Value<'d>> {
    match &args[0] {
        Value::Dict(_) | Value::Map(_) => args[0].iter_values().map(Value::List),
        other => Err(FormulaError::Type(format!(
            "keys() argument must be a mapping, not '{}'",
            other.type_name()
        ))),
    }
}

/// values(mapping)
pub fn fn_values<'d>(args: &[Value<'d>]) -> FormulaResult<Value<'d>> {
    Ok(Value::List(
        mapping_entries("values", &args[0])?
            .into_iter()
            .map(|(_, v)| v)
            .collect(),
    ))
}

/// len(x)
pub fn fn_len<'d>(args: &[Value<'d>]) -> FormulaResult<Value<'d>> {
    let len = args[0].len()?;
    i64::try_from(len)
        .map(Value::Int)
        .map_err(|_| FormulaError::Overflow("len"))
}

/// list([iterable])
pub fn fn_list<'d>(args: &[Value<'d>]) -> FormulaResult<Value<'d>> {
    match args.first() {
        Some(v) => v.iter_values().map(Value::List),
        None => Ok(Value::List(Vec::new())),
    }
}

/// range(stop) or range(start, stop, [step])
pub fn fn_range<'d>(args: &[Value<'d>]) -> FormulaResult<Value<'d>> {
    let ints = args
        .iter()
        .map(|v| {
            v.as_int().ok_or_else(|| {
                FormulaError::Type(format!(
                    "'{}' object cannot be interpreted as an integer",
                    v.type_name()
                ))
            })
        })
        .collect::<FormulaResult<Vec<i64>>>()?;

    let (start, stop, step) = match ints.as_slice() {
        [stop] => (0, *stop, 1),
        [start, stop] => (*start, *stop, 1),
        [start, stop, step] => (*start, *stop, *step),
        _ => return Err(FormulaError::Argument("range() takes 1 to 3 arguments".into())),
    };

    if step == 0 {
        return Err(FormulaError::Argument("range() arg 3 must not be zero".into()));
    }

    // Number of items, computed in i128 to stay clear of overflow
    let span = if step > 0 {
        i128::from(stop) - i128::from(start)
    } else {
        i128::from(start) - i128::from(stop)
    };
    let step_abs = i128::from(step).abs();
    let count = if span <= 0 {
        0
    } else {
        (span + step_abs - 1) / step_abs
    };
    if count > MAX_SEQUENCE_LEN as i128 {
        return Err(FormulaError::Argument(format!(
            "range() of {} items is too large",
            count
        )));
    }

    let mut out = Vec::new();
    let mut current = i128::from(start);
    for _ in 0..count {
        out.push(Value::Int(current as i64));
        current += i128::from(step);
    }

    Ok(Value::List(out))
}

/// zip(a, b, ...) as a list of lists, as long as the shortest input
pub fn fn_zip<'d>(args: &[Value<'d>]) -> FormulaResult<Value<'d>> {
    let columns = args
        .iter()
        .map(Value::iter_values)
        .collect::<FormulaResult<Vec<_>>>()?;

    let len = columns.iter().map(Vec::len).min().unwrap_or(0);
    let rows = (0..len)
        .map(|i| Value::List(columns.iter().map(|c| c[i].clone()).collect()))
        .collect();

    Ok(Value::List(rows))
}
