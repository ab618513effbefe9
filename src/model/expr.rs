//! Expression AST nodes

use serde::{Deserialize, Serialize};

use super::span::{is_default_span, Span};
use super::TypeRef;

/// Expression node as handed over by the reference resolver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum Expr {
    Boolean {
        value: bool,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    Decimal {
        value: f64,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    Integer {
        value: i64,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    Text {
        value: String,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    Regex {
        pattern: String,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    /// Spreadsheet selector such as `A1:C4`, `row 2` or `column B`
    CellRange {
        selector: String,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    Collection {
        elements: Vec<Expr>,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    /// `"name" oftype T`
    ValuetypeAssignment {
        name: String,
        valuetype: TypeRef,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    ConstraintRef {
        name: String,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    TransformRef {
        name: String,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    /// `requires NAME`, only meaningful as a whole property value
    RuntimeParameter {
        name: String,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    Variable {
        name: String,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    /// The `value` keyword inside expression constraints
    ValueKeyword {
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    Unary {
        operator: UnaryOperator,
        operand: Box<Expr>,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    Binary {
        operator: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    Ternary {
        operator: TernaryOperator,
        first: Box<Expr>,
        second: Box<Expr>,
        third: Box<Expr>,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Boolean { span, .. }
            | Expr::Decimal { span, .. }
            | Expr::Integer { span, .. }
            | Expr::Text { span, .. }
            | Expr::Regex { span, .. }
            | Expr::CellRange { span, .. }
            | Expr::Collection { span, .. }
            | Expr::ValuetypeAssignment { span, .. }
            | Expr::ConstraintRef { span, .. }
            | Expr::TransformRef { span, .. }
            | Expr::RuntimeParameter { span, .. }
            | Expr::Variable { span, .. }
            | Expr::ValueKeyword { span }
            | Expr::Unary { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Ternary { span, .. } => *span,
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Expr::Text {
            value: value.into(),
            span: Span::default(),
        }
    }

    pub fn integer(value: i64) -> Self {
        Expr::Integer {
            value,
            span: Span::default(),
        }
    }

    pub fn decimal(value: f64) -> Self {
        Expr::Decimal {
            value,
            span: Span::default(),
        }
    }

    pub fn boolean(value: bool) -> Self {
        Expr::Boolean {
            value,
            span: Span::default(),
        }
    }

    pub fn collection(elements: Vec<Expr>) -> Self {
        Expr::Collection {
            elements,
            span: Span::default(),
        }
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Expr::Variable {
            name: name.into(),
            span: Span::default(),
        }
    }

    pub fn unary(operator: UnaryOperator, operand: Expr) -> Self {
        Expr::Unary {
            operator,
            operand: Box::new(operand),
            span: Span::default(),
        }
    }

    pub fn binary(operator: BinaryOperator, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            operator,
            left: Box::new(left),
            right: Box::new(right),
            span: Span::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOperator {
    #[serde(rename = "not")]
    Not,
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "-")]
    Minus,
    #[serde(rename = "sqrt")]
    Sqrt,
    #[serde(rename = "floor")]
    Floor,
    #[serde(rename = "ceil")]
    Ceil,
    #[serde(rename = "round")]
    Round,
    #[serde(rename = "lowercase")]
    Lowercase,
    #[serde(rename = "uppercase")]
    Uppercase,
    #[serde(rename = "asDecimal")]
    AsDecimal,
    #[serde(rename = "asInteger")]
    AsInteger,
    #[serde(rename = "asBoolean")]
    AsBoolean,
    #[serde(rename = "asText")]
    AsText,
}

impl UnaryOperator {
    pub fn token(self) -> &'static str {
        match self {
            UnaryOperator::Not => "not",
            UnaryOperator::Plus => "+",
            UnaryOperator::Minus => "-",
            UnaryOperator::Sqrt => "sqrt",
            UnaryOperator::Floor => "floor",
            UnaryOperator::Ceil => "ceil",
            UnaryOperator::Round => "round",
            UnaryOperator::Lowercase => "lowercase",
            UnaryOperator::Uppercase => "uppercase",
            UnaryOperator::AsDecimal => "asDecimal",
            UnaryOperator::AsInteger => "asInteger",
            UnaryOperator::AsBoolean => "asBoolean",
            UnaryOperator::AsText => "asText",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOperator {
    #[serde(rename = "pow")]
    Pow,
    #[serde(rename = "root")]
    Root,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
    #[serde(rename = "%")]
    Mod,
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "matches")]
    Matches,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "xor")]
    Xor,
    #[serde(rename = "and")]
    And,
    #[serde(rename = "or")]
    Or,
}

impl BinaryOperator {
    pub fn token(self) -> &'static str {
        match self {
            BinaryOperator::Pow => "pow",
            BinaryOperator::Root => "root",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Mod => "%",
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Matches => "matches",
            BinaryOperator::In => "in",
            BinaryOperator::Lt => "<",
            BinaryOperator::Le => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::Ge => ">=",
            BinaryOperator::Eq => "==",
            BinaryOperator::Ne => "!=",
            BinaryOperator::Xor => "xor",
            BinaryOperator::And => "and",
            BinaryOperator::Or => "or",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TernaryOperator {
    /// `replace <text> with <pattern> by <replacement>`
    #[serde(rename = "replace")]
    Replace,
}

impl TernaryOperator {
    pub fn token(self) -> &'static str {
        match self {
            TernaryOperator::Replace => "replace",
        }
    }
}
