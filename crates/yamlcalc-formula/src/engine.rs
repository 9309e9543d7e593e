//! Pluggable expression engine

use crate::definitions::{Definitions, DEFAULT_MAX_DEPTH};
use crate::error::FormulaResult;
use crate::evaluator::evaluate;
use crate::parser::{parse_definitions, parse_expression};
use crate::scope::{DepthCounter, Scope};
use crate::value::Value;

/// Evaluates formula payloads and executes definitions preambles
///
/// A session holds one engine for its whole lifetime and shares it between
/// every formula of the document.
pub trait ExpressionEngine: Send + Sync {
    /// Evaluate a formula payload (the text after the `=` marker)
    fn evaluate<'d>(&self, source: &str, scope: &mut Scope<'_, 'd>) -> FormulaResult<Value<'d>>;

    /// Execute a definitions preamble
    fn define(&self, source: &str) -> FormulaResult<Definitions>;
}

/// The built-in engine: recursive descent parser plus tree walker
#[derive(Debug, Clone, Copy)]
pub struct Interpreter {
    max_depth: usize,
}

impl Interpreter {
    /// Create an interpreter whose preamble runs nest at most `max_depth`
    /// function calls deep
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl ExpressionEngine for Interpreter {
    fn evaluate<'d>(&self, source: &str, scope: &mut Scope<'_, 'd>) -> FormulaResult<Value<'d>> {
        let expr = parse_expression(source)?;
        evaluate(&expr, scope)
    }

    fn define(&self, source: &str) -> FormulaResult<Definitions> {
        let statements = parse_definitions(source)?;
        Definitions::execute(&statements, DepthCounter::new(self.max_depth))
    }
}
