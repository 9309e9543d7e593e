//! Built-in functions

pub mod collections;
pub mod logical;
pub mod math;
pub mod statistical;
pub mod text;

use crate::error::{FormulaError, FormulaResult};
use crate::value::Value;
use ahash::AHashMap;
use std::sync::OnceLock;

/// Function implementation signature
///
/// Arguments arrive evaluated. Document containers may be among them, so
/// the result can borrow from the same document.
pub type FunctionImpl = for<'d> fn(&[Value<'d>]) -> FormulaResult<Value<'d>>;

/// Function definition
pub struct FunctionDef {
    /// Function name, as written in formulas
    pub name: &'static str,
    /// Minimum arguments
    pub min_args: usize,
    /// Maximum arguments (None = unlimited)
    pub max_args: Option<usize>,
    /// Implementation
    pub implementation: FunctionImpl,
}

impl FunctionDef {
    /// Check an argument count against the declared arity
    pub fn check_arity(&self, count: usize) -> FormulaResult<()> {
        if count < self.min_args {
            return Err(FormulaError::ArgumentCount {
                function: self.name.to_string(),
                expected: format!("at least {}", self.min_args),
                actual: count,
            });
        }

        if let Some(max) = self.max_args {
            if count > max {
                return Err(FormulaError::ArgumentCount {
                    function: self.name.to_string(),
                    expected: format!("at most {}", max),
                    actual: count,
                });
            }
        }

        Ok(())
    }
}

/// Function registry
pub struct FunctionRegistry {
    functions: AHashMap<&'static str, FunctionDef>,
}

/// Global function registry (lazily initialized)
static FUNCTION_REGISTRY: OnceLock<FunctionRegistry> = OnceLock::new();

/// Look up a built-in function by name
pub fn lookup(name: &str) -> Option<&'static FunctionDef> {
    FUNCTION_REGISTRY.get_or_init(FunctionRegistry::new).get(name)
}

impl FunctionRegistry {
    /// Create a new registry with all built-in functions
    pub fn new() -> Self {
        let mut registry = Self {
            functions: AHashMap::new(),
        };

        registry.register_math_functions();
        registry.register_logical_functions();
        registry.register_statistical_functions();
        registry.register_collection_functions();
        registry.register_text_functions();

        registry
    }

    /// Look up a function by name
    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(name)
    }

    /// Names of all registered functions, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.functions.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Register a function
    pub fn register(&mut self, def: FunctionDef) {
        self.functions.insert(def.name, def);
    }

    fn add(&mut self, name: &'static str, min_args: usize, max_args: Option<usize>, f: FunctionImpl) {
        self.register(FunctionDef {
            name,
            min_args,
            max_args,
            implementation: f,
        });
    }

    fn register_math_functions(&mut self) {
        self.add("abs", 1, Some(1), math::fn_abs);
        self.add("ceil", 1, Some(1), math::fn_ceil);
        self.add("floor", 1, Some(1), math::fn_floor);
        self.add("float", 0, Some(1), math::fn_float);
        self.add("int", 0, Some(1), math::fn_int);
        self.add("pow", 2, Some(2), math::fn_pow);
        self.add("round", 1, Some(2), math::fn_round);
        self.add("sqrt", 1, Some(1), math::fn_sqrt);
    }

    fn register_logical_functions(&mut self) {
        self.add("all", 1, Some(1), logical::fn_all);
        self.add("any", 1, Some(1), logical::fn_any);
        self.add("bool", 0, Some(1), logical::fn_bool);
    }

    fn register_statistical_functions(&mut self) {
        self.add("max", 1, None, statistical::fn_max);
        self.add("min", 1, None, statistical::fn_min);
        self.add("sorted", 1, Some(2), statistical::fn_sorted);
        self.add("sum", 1, Some(2), statistical::fn_sum);
    }

    fn register_collection_functions(&mut self) {
        self.add("enumerate", 1, Some(2), collections::fn_enumerate);
        self.add("items", 1, Some(1), collections::fn_items);
        self.add("keys", 1, Some(1), collections::fn_keys);
        self.add("len", 1, Some(1), collections::fn_len);
        self.add("list", 0, Some(1), collections::fn_list);
        self.add("range", 1, Some(3), collections::fn_range);
        self.add("values", 1, Some(1), collections::fn_values);
        self.add("zip", 0, None, collections::fn_zip);
    }

    fn register_text_functions(&mut self) {
        self.add("join", 1, Some(2), text::fn_join);
        self.add("lower", 1, Some(1), text::fn_lower);
        self.add("str", 0, Some(1), text::fn_str);
        self.add("upper", 1, Some(1), text::fn_upper);
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Require a numeric argument
pub(crate) fn number_arg(function: &str, value: &Value<'_>) -> FormulaResult<f64> {
    value.as_f64().ok_or_else(|| {
        FormulaError::Type(format!(
            "{}() argument must be a number, not '{}'",
            function,
            value.type_name()
        ))
    })
}

/// Require a string argument
pub(crate) fn str_arg<'v>(function: &str, value: &'v Value<'_>) -> FormulaResult<&'v str> {
    value.as_str().ok_or_else(|| {
        FormulaError::Type(format!(
            "{}() argument must be a string, not '{}'",
            function,
            value.type_name()
        ))
    })
}

/// Convert a finite float to an integer value
pub(crate) fn float_to_int(function: &'static str, f: f64) -> FormulaResult<i64> {
    if !f.is_finite() {
        return Err(FormulaError::Argument(format!(
            "cannot convert {} to integer in {}()",
            f, function
        )));
    }
    if f < i64::MIN as f64 || f >= i64::MAX as f64 {
        return Err(FormulaError::Overflow(function));
    }
    Ok(f as i64)
}
