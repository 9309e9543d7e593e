//! Formula Abstract Syntax Tree types

/// Formula expression AST
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    // === Literals ===
    /// `None`
    None,
    /// Integer literal
    Int(i64),
    /// Float literal
    Float(f64),
    /// String literal
    Str(String),
    /// `True` / `False`
    Bool(bool),

    // === Names ===
    /// Bare name, resolved through the scope chain
    Name(String),

    // === Collections ===
    /// `[a, b, c]`
    List(Vec<Expr>),
    /// `{k: v, ...}`
    Dict(Vec<(Expr, Expr)>),
    /// `[element for x in xs if cond ...]`
    Comprehension {
        element: Box<Expr>,
        clauses: Vec<ComprehensionClause>,
    },

    // === Operators ===
    /// Binary operation
    BinaryOp {
        op: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Unary operation
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expr>,
    },
    /// Chained comparison, `a < b <= c`
    Compare {
        first: Box<Expr>,
        rest: Vec<(CompareOperator, Expr)>,
    },
    /// Short-circuiting `and` / `or`
    Logical {
        op: LogicalOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `body if condition else orelse`
    Conditional {
        condition: Box<Expr>,
        body: Box<Expr>,
        orelse: Box<Expr>,
    },

    // === Access ===
    /// `target[index]`
    Subscript { target: Box<Expr>, index: Box<Expr> },
    /// `target[start:end]`
    Slice {
        target: Box<Expr>,
        start: Option<Box<Expr>>,
        end: Option<Box<Expr>>,
    },
    /// `target.name`, sugar for `target['name']` on mappings
    Attribute { target: Box<Expr>, name: String },

    // === Function call ===
    Call { callee: Box<Expr>, args: Vec<Expr> },
}

/// One `for` or `if` clause of a comprehension
#[derive(Debug, Clone, PartialEq)]
pub enum ComprehensionClause {
    /// `for a in iter`, or `for a, b in iter` unpacking each item
    For { targets: Vec<String>, iter: Expr },
    If(Expr),
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    FloorDivide,
    Modulo,
    Power,
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOperator {
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
    In,
    NotIn,
}

/// Boolean connectives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Negate,
    Plus,
    Not,
}

/// A statement of the definitions preamble
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `name = expr`
    Assign { name: String, value: Expr },
    /// `def name(params): body`
    Function {
        name: String,
        params: Vec<String>,
        body: Expr,
    },
}
