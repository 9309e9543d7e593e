//! Formula evaluator
//!
//! Walks formula ASTs with dynamic typing and truthiness rules.

use crate::ast::{
    BinaryOperator, CompareOperator, ComprehensionClause, Expr, LogicalOperator, UnaryOperator,
};
use crate::error::{FormulaError, FormulaResult};
use crate::scope::{Overlay, Scope, STACK_GROW_SIZE, STACK_RED_ZONE};
use crate::value::{Callable, Value, ValueMap, MAX_SEQUENCE_LEN};
use std::cmp::Ordering;
use yamlcalc_core::{format_float, Error};

/// Evaluate a formula expression
pub fn evaluate<'d>(expr: &Expr, scope: &mut Scope<'_, 'd>) -> FormulaResult<Value<'d>> {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || evaluate_expr(expr, scope))
}

fn evaluate_expr<'d>(expr: &Expr, scope: &mut Scope<'_, 'd>) -> FormulaResult<Value<'d>> {
    match expr {
        // === Literals ===
        Expr::None => Ok(Value::None),
        Expr::Int(i) => Ok(Value::Int(*i)),
        Expr::Float(f) => Ok(Value::Float(*f)),
        Expr::Str(s) => Ok(Value::Str(s.clone())),
        Expr::Bool(b) => Ok(Value::Bool(*b)),

        // === Names ===
        Expr::Name(name) => scope.lookup(name),

        // === Collections ===
        Expr::List(items) => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                values.push(evaluate(item, scope)?);
            }
            Ok(Value::List(values))
        }

        Expr::Dict(entries) => {
            let mut map = ValueMap::with_capacity(entries.len());
            for (key, value) in entries {
                let key = dict_key(&evaluate(key, scope)?)?;
                let value = evaluate(value, scope)?;
                map.insert(key, value);
            }
            Ok(Value::Dict(map))
        }

        Expr::Comprehension { element, clauses } => {
            evaluate_comprehension(element, clauses, scope)
        }

        // === Operators ===
        Expr::BinaryOp { op, left, right } => {
            let left = evaluate(left, scope)?;
            let right = evaluate(right, scope)?;
            binary_op(*op, &left, &right)
        }

        Expr::UnaryOp { op, operand } => {
            let value = evaluate(operand, scope)?;
            unary_op(*op, &value)
        }

        Expr::Compare { first, rest } => {
            let mut left = evaluate(first, scope)?;
            for (op, right) in rest {
                let right = evaluate(right, scope)?;
                if !compare(*op, &left, &right)? {
                    return Ok(Value::Bool(false));
                }
                left = right;
            }
            Ok(Value::Bool(true))
        }

        Expr::Logical { op, left, right } => {
            // Both operators return one of their operands
            let left = evaluate(left, scope)?;
            match (op, left.is_truthy()) {
                (LogicalOperator::And, false) | (LogicalOperator::Or, true) => Ok(left),
                _ => evaluate(right, scope),
            }
        }

        Expr::Conditional {
            condition,
            body,
            orelse,
        } => {
            if evaluate(condition, scope)?.is_truthy() {
                evaluate(body, scope)
            } else {
                evaluate(orelse, scope)
            }
        }

        // === Access ===
        Expr::Subscript { target, index } => {
            let target = evaluate(target, scope)?;
            let index = evaluate(index, scope)?;
            subscript(&target, &index)
        }

        Expr::Slice { target, start, end } => {
            let target = evaluate(target, scope)?;
            let start = match start {
                Some(start) => evaluate(start, scope)?,
                None => Value::None,
            };
            let end = match end {
                Some(end) => evaluate(end, scope)?,
                None => Value::None,
            };
            slice(&target, &start, &end)
        }

        Expr::Attribute { target, name } => {
            let target = evaluate(target, scope)?;
            attribute(&target, name)
        }

        // === Function call ===
        Expr::Call { callee, args } => {
            let callee = evaluate(callee, scope)?;
            let func = match callee {
                Value::Function(func) => func,
                other => {
                    return Err(FormulaError::Type(format!(
                        "'{}' object is not callable",
                        other.type_name()
                    )))
                }
            };

            let mut evaluated_args = Vec::with_capacity(args.len());
            for arg in args {
                evaluated_args.push(evaluate(arg, scope)?);
            }

            call_function(&func, evaluated_args, scope)
        }
    }
}

/// Call a built-in or user-defined function with evaluated arguments
pub fn call_function<'d>(
    func: &Callable,
    args: Vec<Value<'d>>,
    scope: &Scope<'_, 'd>,
) -> FormulaResult<Value<'d>> {
    match func {
        Callable::Builtin(def) => {
            def.check_arity(args.len())?;
            (def.implementation)(&args)
        }
        Callable::User(func) => {
            if args.len() != func.params.len() {
                return Err(FormulaError::ArgumentCount {
                    function: func.name.clone(),
                    expected: func.params.len().to_string(),
                    actual: args.len(),
                });
            }

            let depth = scope.depth().enter()?;

            // Function bodies see their parameters, not the caller's locals
            let mut locals = Overlay::detached();
            for (param, arg) in func.params.iter().zip(args) {
                locals.set(param.clone(), arg);
            }
            let mut inner = Scope::new(scope.definitions(), depth, locals);
            evaluate(&func.body, &mut inner)
        }
    }
}

/// Evaluate a list comprehension
///
/// Loop variables are bound in the overlay only while the comprehension
/// runs; whatever they shadowed is put back afterwards, even on failure.
fn evaluate_comprehension<'d>(
    element: &Expr,
    clauses: &[ComprehensionClause],
    scope: &mut Scope<'_, 'd>,
) -> FormulaResult<Value<'d>> {
    let mut saved: Vec<(&str, Option<Value<'d>>)> = Vec::new();
    for clause in clauses {
        if let ComprehensionClause::For { targets, .. } = clause {
            for target in targets {
                if !saved.iter().any(|(name, _)| *name == target.as_str()) {
                    saved.push((target, scope.locals().local(target).cloned()));
                }
            }
        }
    }

    let mut out = Vec::new();
    let result = run_clauses(element, clauses, scope, &mut out);

    for (name, previous) in saved {
        match previous {
            Some(value) => {
                scope.locals_mut().set(name, value);
            }
            None => {
                scope.locals_mut().remove(name);
            }
        }
    }

    result.map(|()| Value::List(out))
}

fn run_clauses<'d>(
    element: &Expr,
    clauses: &[ComprehensionClause],
    scope: &mut Scope<'_, 'd>,
    out: &mut Vec<Value<'d>>,
) -> FormulaResult<()> {
    match clauses.split_first() {
        None => out.push(evaluate(element, scope)?),
        Some((ComprehensionClause::For { targets, iter }, rest)) => {
            let items = evaluate(iter, scope)?.iter_values()?;
            for item in items {
                bind_targets(targets, item, scope)?;
                run_clauses(element, rest, scope, out)?;
            }
        }
        Some((ComprehensionClause::If(condition), rest)) => {
            if evaluate(condition, scope)?.is_truthy() {
                run_clauses(element, rest, scope, out)?;
            }
        }
    }
    Ok(())
}

/// Bind one loop item, unpacking it when there are several names
fn bind_targets<'d>(targets: &[String], item: Value<'d>, scope: &mut Scope<'_, 'd>) -> FormulaResult<()> {
    if let [target] = targets {
        scope.locals_mut().set(target.as_str(), item);
        return Ok(());
    }

    let parts = item.iter_values()?;
    if parts.len() != targets.len() {
        return Err(FormulaError::Type(format!(
            "cannot unpack {} values into {} names",
            parts.len(),
            targets.len()
        )));
    }
    for (target, part) in targets.iter().zip(parts) {
        scope.locals_mut().set(target.as_str(), part);
    }
    Ok(())
}

/// Evaluate a binary operation
pub(crate) fn binary_op<'d>(
    op: BinaryOperator,
    left: &Value<'d>,
    right: &Value<'d>,
) -> FormulaResult<Value<'d>> {
    if left.is_numeric() && right.is_numeric() {
        return numeric_op(op, left, right);
    }

    match (op, left, right) {
        // Concatenation
        (BinaryOperator::Add, Value::Str(l), Value::Str(r)) => Ok(Value::Str(format!("{}{}", l, r))),
        (BinaryOperator::Add, l, r) if is_sequence(l) && is_sequence(r) => {
            let mut items = l.iter_values()?;
            items.extend(r.iter_values()?);
            Ok(Value::List(items))
        }

        // Repetition
        (BinaryOperator::Multiply, Value::Str(s), n) | (BinaryOperator::Multiply, n, Value::Str(s))
            if n.as_int().is_some() =>
        {
            let count = repeat_count(s.len(), n)?;
            Ok(Value::Str(s.repeat(count)))
        }
        (BinaryOperator::Multiply, seq, n) | (BinaryOperator::Multiply, n, seq)
            if is_sequence(seq) && n.as_int().is_some() =>
        {
            let items = seq.iter_values()?;
            let count = repeat_count(items.len(), n)?;
            let mut out = Vec::with_capacity(items.len() * count);
            for _ in 0..count {
                out.extend(items.iter().cloned());
            }
            Ok(Value::List(out))
        }

        _ => Err(FormulaError::Type(format!(
            "unsupported operand type(s) for {}: '{}' and '{}'",
            operator_symbol(op),
            left.type_name(),
            right.type_name()
        ))),
    }
}

fn is_sequence(value: &Value<'_>) -> bool {
    matches!(value, Value::List(_) | Value::Seq(_))
}

/// Number of copies to build when repeating `len` elements `n` times
///
/// Zero when there is nothing to repeat. The result never exceeds
/// [`MAX_SEQUENCE_LEN`] elements.
fn repeat_count(len: usize, n: &Value<'_>) -> FormulaResult<usize> {
    let n = n.as_int().unwrap_or(0);
    if len == 0 || n <= 0 {
        return Ok(0);
    }
    let count = usize::try_from(n).map_err(|_| FormulaError::Overflow("repetition"))?;
    match len.checked_mul(count) {
        Some(total) if total <= MAX_SEQUENCE_LEN => Ok(count),
        _ => Err(FormulaError::Overflow("repetition")),
    }
}

fn operator_symbol(op: BinaryOperator) -> &'static str {
    match op {
        BinaryOperator::Add => "+",
        BinaryOperator::Subtract => "-",
        BinaryOperator::Multiply => "*",
        BinaryOperator::Divide => "/",
        BinaryOperator::FloorDivide => "//",
        BinaryOperator::Modulo => "%",
        BinaryOperator::Power => "**",
    }
}

/// Arithmetic on two numeric operands
///
/// Integer operands stay integers (except for true division) and fail on
/// overflow; any float operand makes the operation a float operation.
fn numeric_op<'d>(
    op: BinaryOperator,
    left: &Value<'d>,
    right: &Value<'d>,
) -> FormulaResult<Value<'d>> {
    if let (Some(l), Some(r)) = (left.as_int(), right.as_int()) {
        return int_op(op, l, r);
    }

    let (l, r) = match (left.as_f64(), right.as_f64()) {
        (Some(l), Some(r)) => (l, r),
        _ => return Err(FormulaError::Type("Expected numbers".into())),
    };

    let result = match op {
        BinaryOperator::Add => l + r,
        BinaryOperator::Subtract => l - r,
        BinaryOperator::Multiply => l * r,
        BinaryOperator::Divide => {
            if r == 0.0 {
                return Err(FormulaError::ZeroDivision);
            }
            l / r
        }
        BinaryOperator::FloorDivide => {
            if r == 0.0 {
                return Err(FormulaError::ZeroDivision);
            }
            (l / r).floor()
        }
        BinaryOperator::Modulo => {
            if r == 0.0 {
                return Err(FormulaError::ZeroDivision);
            }
            let m = l % r;
            if m != 0.0 && (m < 0.0) != (r < 0.0) {
                m + r
            } else {
                m
            }
        }
        BinaryOperator::Power => float_power(l, r)?,
    };

    Ok(Value::Float(result))
}

fn int_op<'d>(op: BinaryOperator, l: i64, r: i64) -> FormulaResult<Value<'d>> {
    let result = match op {
        BinaryOperator::Add => l.checked_add(r).ok_or(FormulaError::Overflow("addition"))?,
        BinaryOperator::Subtract => l
            .checked_sub(r)
            .ok_or(FormulaError::Overflow("subtraction"))?,
        BinaryOperator::Multiply => l
            .checked_mul(r)
            .ok_or(FormulaError::Overflow("multiplication"))?,
        BinaryOperator::Divide => {
            if r == 0 {
                return Err(FormulaError::ZeroDivision);
            }
            return Ok(Value::Float(l as f64 / r as f64));
        }
        BinaryOperator::FloorDivide => {
            if r == 0 {
                return Err(FormulaError::ZeroDivision);
            }
            let q = l.checked_div(r).ok_or(FormulaError::Overflow("division"))?;
            // Round toward negative infinity
            if l % r != 0 && ((l < 0) != (r < 0)) {
                q - 1
            } else {
                q
            }
        }
        BinaryOperator::Modulo => {
            if r == 0 {
                return Err(FormulaError::ZeroDivision);
            }
            let m = l.checked_rem(r).ok_or(FormulaError::Overflow("modulo"))?;
            // Result takes the sign of the divisor
            if m != 0 && ((m < 0) != (r < 0)) {
                m + r
            } else {
                m
            }
        }
        BinaryOperator::Power => {
            if r < 0 {
                return float_power(l as f64, r as f64).map(Value::Float);
            }
            let exp = u32::try_from(r).map_err(|_| FormulaError::Overflow("power"))?;
            l.checked_pow(exp).ok_or(FormulaError::Overflow("power"))?
        }
    };

    Ok(Value::Int(result))
}

fn float_power(base: f64, exp: f64) -> FormulaResult<f64> {
    if base == 0.0 && exp < 0.0 {
        return Err(FormulaError::ZeroDivision);
    }
    let result = base.powf(exp);
    if result.is_nan() && !base.is_nan() && !exp.is_nan() {
        return Err(FormulaError::Argument("math domain error".into()));
    }
    Ok(result)
}

/// Evaluate a unary operation
fn unary_op<'d>(op: UnaryOperator, value: &Value<'d>) -> FormulaResult<Value<'d>> {
    match (op, value) {
        (UnaryOperator::Not, v) => Ok(Value::Bool(!v.is_truthy())),
        (UnaryOperator::Negate, Value::Float(f)) => Ok(Value::Float(-f)),
        (UnaryOperator::Plus, Value::Float(f)) => Ok(Value::Float(*f)),
        (UnaryOperator::Negate, v) if v.as_int().is_some() => v
            .as_int()
            .and_then(i64::checked_neg)
            .map(Value::Int)
            .ok_or(FormulaError::Overflow("negation")),
        (UnaryOperator::Plus, v) if v.as_int().is_some() => Ok(Value::Int(v.as_int().unwrap_or(0))),
        (op, v) => Err(FormulaError::Type(format!(
            "bad operand type for unary {}: '{}'",
            if op == UnaryOperator::Negate { "-" } else { "+" },
            v.type_name()
        ))),
    }
}

/// Evaluate one link of a comparison chain
fn compare<'d>(op: CompareOperator, left: &Value<'d>, right: &Value<'d>) -> FormulaResult<bool> {
    let ordering = match op {
        CompareOperator::Equal => return Ok(left == right),
        CompareOperator::NotEqual => return Ok(left != right),
        CompareOperator::In => return contains(right, left),
        CompareOperator::NotIn => return contains(right, left).map(|found| !found),
        _ => compare_order(left, right)?,
    };

    // Unordered values (NaN) fail every ordering comparison
    let ordering = match ordering {
        Some(ordering) => ordering,
        None => return Ok(false),
    };

    Ok(match op {
        CompareOperator::LessThan => ordering == Ordering::Less,
        CompareOperator::LessEqual => ordering != Ordering::Greater,
        CompareOperator::GreaterThan => ordering == Ordering::Greater,
        _ => ordering != Ordering::Less,
    })
}

/// Order two values for `<`, `sorted`, `min` and `max`
///
/// Numbers order numerically, strings lexicographically and sequences
/// element by element. Mixed kinds cannot be ordered.
pub(crate) fn compare_order<'d>(
    left: &Value<'d>,
    right: &Value<'d>,
) -> FormulaResult<Option<Ordering>> {
    if left.is_numeric() && right.is_numeric() {
        if let (Some(l), Some(r)) = (left.as_int(), right.as_int()) {
            return Ok(Some(l.cmp(&r)));
        }
        let l = left.as_f64().unwrap_or(f64::NAN);
        let r = right.as_f64().unwrap_or(f64::NAN);
        return Ok(l.partial_cmp(&r));
    }

    match (left, right) {
        (Value::Str(l), Value::Str(r)) => Ok(Some(l.cmp(r))),
        (l, r) if is_sequence(l) && is_sequence(r) => {
            let l = l.iter_values()?;
            let r = r.iter_values()?;
            for (a, b) in l.iter().zip(r.iter()) {
                if a != b {
                    return compare_order(a, b);
                }
            }
            Ok(Some(l.len().cmp(&r.len())))
        }
        _ => Err(FormulaError::Type(format!(
            "ordering not supported between instances of '{}' and '{}'",
            left.type_name(),
            right.type_name()
        ))),
    }
}

/// Membership test, `item in container`
fn contains<'d>(container: &Value<'d>, item: &Value<'d>) -> FormulaResult<bool> {
    match container {
        Value::List(items) => Ok(items.iter().any(|v| v == item)),
        Value::Seq(seq) => {
            for value in seq.iter() {
                if value? == *item {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Value::Str(s) => match item {
            Value::Str(needle) => Ok(s.contains(needle.as_str())),
            other => Err(FormulaError::Type(format!(
                "'in <string>' requires string as left operand, not {}",
                other.type_name()
            ))),
        },
        Value::Dict(map) => Ok(map.contains_key(&dict_key(item)?)),
        Value::Map(map) => Ok(map.contains_key(&dict_key(item)?)),
        other => Err(FormulaError::Type(format!(
            "argument of type '{}' is not iterable",
            other.type_name()
        ))),
    }
}

/// Key text for mapping access
///
/// Mapping keys are strings; scalar keys are converted to their text so
/// that `{1: 'a'}[1]` and `self[1]` behave as written.
pub(crate) fn dict_key(key: &Value<'_>) -> FormulaResult<String> {
    match key {
        Value::Str(s) => Ok(s.clone()),
        Value::Int(i) => Ok(i.to_string()),
        Value::Float(f) => Ok(format_float(*f)),
        Value::Bool(true) => Ok("True".into()),
        Value::Bool(false) => Ok("False".into()),
        Value::None => Ok("None".into()),
        other => Err(FormulaError::Type(format!(
            "unhashable type: '{}'",
            other.type_name()
        ))),
    }
}

/// Resolve a possibly negative index against a length
fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let index = if index < 0 { index + len } else { index };
    if (0..len).contains(&index) {
        usize::try_from(index).ok()
    } else {
        None
    }
}

fn int_index(index: &Value<'_>, what: &str) -> FormulaResult<i64> {
    index.as_int().ok_or_else(|| {
        FormulaError::Type(format!(
            "{} indices must be integers, not {}",
            what,
            index.type_name()
        ))
    })
}

fn out_of_range(index: i64, len: usize) -> FormulaError {
    FormulaError::Lookup(Error::IndexOutOfRange {
        index: usize::try_from(index.unsigned_abs()).unwrap_or(usize::MAX),
        len,
    })
}

/// Evaluate `target[index]`
fn subscript<'d>(target: &Value<'d>, index: &Value<'d>) -> FormulaResult<Value<'d>> {
    match target {
        Value::Map(map) => Ok(map.get(&dict_key(index)?)?),
        Value::Dict(map) => {
            let key = dict_key(index)?;
            map.get(&key)
                .cloned()
                .ok_or(FormulaError::Lookup(Error::KeyNotFound(key)))
        }
        Value::List(items) => {
            let i = int_index(index, "list")?;
            normalize_index(i, items.len())
                .map(|i| items[i].clone())
                .ok_or_else(|| out_of_range(i, items.len()))
        }
        Value::Seq(seq) => {
            let i = int_index(index, "list")?;
            match normalize_index(i, seq.len()) {
                Some(i) => Ok(seq.get(i)?),
                None => Err(out_of_range(i, seq.len())),
            }
        }
        Value::Str(s) => {
            let i = int_index(index, "string")?;
            let len = s.chars().count();
            normalize_index(i, len)
                .and_then(|i| s.chars().nth(i))
                .map(|c| Value::Str(c.to_string()))
                .ok_or_else(|| out_of_range(i, len))
        }
        other => Err(FormulaError::Type(format!(
            "'{}' object is not subscriptable",
            other.type_name()
        ))),
    }
}

/// Clamp a slice bound against a length
fn slice_bound(bound: &Value<'_>, len: usize, default: usize) -> FormulaResult<usize> {
    if bound.is_none() {
        return Ok(default);
    }
    let i = bound.as_int().ok_or_else(|| {
        FormulaError::Type("slice indices must be integers or None".into())
    })?;
    let len_i = i64::try_from(len).unwrap_or(i64::MAX);
    let i = if i < 0 { (i + len_i).max(0) } else { i.min(len_i) };
    Ok(usize::try_from(i).unwrap_or(0))
}

/// Evaluate `target[start:end]`
fn slice<'d>(target: &Value<'d>, start: &Value<'d>, end: &Value<'d>) -> FormulaResult<Value<'d>> {
    match target {
        Value::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            let from = slice_bound(start, chars.len(), 0)?;
            let to = slice_bound(end, chars.len(), chars.len())?;
            Ok(Value::Str(if from < to {
                chars[from..to].iter().collect()
            } else {
                String::new()
            }))
        }
        Value::List(items) => {
            let from = slice_bound(start, items.len(), 0)?;
            let to = slice_bound(end, items.len(), items.len())?;
            Ok(Value::List(if from < to {
                items[from..to].to_vec()
            } else {
                Vec::new()
            }))
        }
        Value::Seq(seq) => {
            let from = slice_bound(start, seq.len(), 0)?;
            let to = slice_bound(end, seq.len(), seq.len())?;
            let mut items = Vec::new();
            for i in from..to {
                items.push(seq.get(i)?);
            }
            Ok(Value::List(items))
        }
        other => Err(FormulaError::Type(format!(
            "'{}' object is not sliceable",
            other.type_name()
        ))),
    }
}

/// Evaluate `target.name`, sugar for `target['name']` on mappings
fn attribute<'d>(target: &Value<'d>, name: &str) -> FormulaResult<Value<'d>> {
    match target {
        Value::Map(_) | Value::Dict(_) => subscript(target, &Value::Str(name.to_string())),
        other => Err(FormulaError::Type(format!(
            "'{}' object has no attribute '{}'",
            other.type_name(),
            name
        ))),
    }
}
