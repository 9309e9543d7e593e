//! Definitions namespace
//!
//! The definitions preamble is executed once, before any formula is
//! evaluated, and yields named constants and helper functions that every
//! formula can use.

use crate::ast::Statement;
use crate::error::FormulaResult;
use crate::evaluator::evaluate;
use crate::parser::parse_definitions;
use crate::scope::{DepthCounter, Overlay, Scope};
use crate::value::{Callable, UserFunction, Value};
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::debug;

/// Nesting allowed while a preamble runs, unless a caller says otherwise
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Read-only namespace of helpers built from the definitions preamble
#[derive(Debug, Clone, Default)]
pub struct Definitions {
    entries: IndexMap<String, Value<'static>>,
}

impl Definitions {
    /// Create an empty namespace
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and execute preamble source
    pub fn from_source(source: &str) -> FormulaResult<Self> {
        let statements = parse_definitions(source)?;
        Self::execute(&statements, DepthCounter::new(DEFAULT_MAX_DEPTH))
    }

    /// Execute preamble statements in order
    ///
    /// Constants are evaluated immediately and may use everything defined
    /// above them. Function bodies are kept unevaluated; they resolve names
    /// when called, so functions may refer to later definitions and to
    /// themselves.
    pub fn execute(statements: &[Statement], depth: DepthCounter) -> FormulaResult<Self> {
        let mut definitions = Self::new();

        for statement in statements {
            match statement {
                Statement::Assign { name, value } => {
                    let result = {
                        let mut scope = Scope::new(&definitions, depth, Overlay::detached());
                        evaluate(value, &mut scope)?.into_detached()?
                    };
                    definitions.insert(name.clone(), result);
                }
                Statement::Function { name, params, body } => {
                    let func = UserFunction {
                        name: name.clone(),
                        params: params.clone(),
                        body: body.clone(),
                    };
                    definitions.insert(name.clone(), Value::Function(Callable::User(Arc::new(func))));
                }
            }
        }

        debug!(names = definitions.len(), "executed definitions");
        Ok(definitions)
    }

    /// Look up a name
    pub fn get(&self, name: &str) -> Option<&Value<'static>> {
        self.entries.get(name)
    }

    /// Bind a name, returning what it replaced
    pub fn insert<S: Into<String>>(&mut self, name: S, value: Value<'static>) -> Option<Value<'static>> {
        self.entries.insert(name.into(), value)
    }

    /// Check if a name is bound
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Bound names in definition order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of bound names
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is bound
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormulaError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_constants_and_functions() {
        let source = "
VAT = 0.2
def gross(net): net * (1 + VAT)
LABELS = ['a', 'b']
";
        let definitions = Definitions::from_source(source).unwrap();
        assert_eq!(
            definitions.names().collect::<Vec<_>>(),
            vec!["VAT", "gross", "LABELS"]
        );
        assert_eq!(definitions.get("VAT"), Some(&Value::Float(0.2)));
        assert!(matches!(definitions.get("gross"), Some(Value::Function(_))));
    }

    #[test]
    fn test_constants_see_earlier_definitions() {
        let definitions = Definitions::from_source("a = 2\nb = a * 3\nc = max(a, b)").unwrap();
        assert_eq!(definitions.get("b"), Some(&Value::Int(6)));
        assert_eq!(definitions.get("c"), Some(&Value::Int(6)));
    }

    #[test]
    fn test_functions_resolve_names_late() {
        let source = "def area(r): PI * r * r\nPI = 3";
        let definitions = Definitions::from_source(source).unwrap();
        let mut scope = Scope::new(&definitions, DepthCounter::new(8), Overlay::detached());
        let call = crate::parser::parse_formula("=area(2)").unwrap();
        assert_eq!(evaluate(&call, &mut scope).unwrap(), Value::Int(12));
    }

    #[test]
    fn test_runtime_failure() {
        assert_eq!(
            Definitions::from_source("x = 1 / 0").unwrap_err(),
            FormulaError::ZeroDivision
        );
        assert_eq!(
            Definitions::from_source("x = y").unwrap_err(),
            FormulaError::Name("y".into())
        );
    }

    #[test]
    fn test_syntax_failure() {
        assert!(matches!(
            Definitions::from_source("def broken(:").unwrap_err(),
            FormulaError::Parse(_)
        ));
    }

    #[test]
    fn test_empty_source() {
        assert!(Definitions::from_source("").unwrap().is_empty());
    }
}
