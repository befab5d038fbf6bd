//! `Value` (expression) tree (spec §3), grounded in
//! `original_source/include/parser/value.h`.

use crate::token::Token;
use crate::types::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mult,
    Div,
    Modulo,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,

    Assignment,
    AddAssign,
    SubAssign,
    MultAssign,
    DivAssign,
    ModuloAssign,
    BitwiseAndAssign,
    BitwiseOrAssign,
    BitwiseXorAssign,
    LeftShiftAssign,
    RightShiftAssign,

    PostfixIncrement,
    PostfixDecrement,

    LogicalAnd,
    LogicalOr,

    BitwiseAnd,
    BitwiseOr,

    Equal,
    NotEqual,

    LogicalNot,
    BitwiseNot,

    Index,
    Dereference,
}

impl Operator {
    /// True for operators carried as `Value::Operator` with only `left` set
    /// (prefix/postfix unary forms); all others are binary.
    pub fn is_unary(self) -> bool {
        matches!(self, Operator::LogicalNot | Operator::BitwiseNot | Operator::Dereference | Operator::PostfixIncrement | Operator::PostfixDecrement)
    }
}

#[derive(Debug)]
pub enum FieldInitializerSegment {
    Field(Token),
    Index(Token),
}

#[derive(Debug)]
pub struct FieldInitializer<'a> {
    pub segments: Vec<FieldInitializerSegment>,
    pub value: &'a Value<'a>,
}

#[derive(Debug)]
pub enum Value<'a> {
    StaticValue(Token),
    SymbolReference(Token),
    Operator {
        left: &'a Value<'a>,
        right: Option<&'a Value<'a>>,
        op: Operator,
    },
    FunctionCall {
        name: Token,
        args: Vec<&'a Value<'a>>,
    },
    Dot {
        left: &'a Value<'a>,
        right: Token,
    },
    Arrow {
        left: &'a Value<'a>,
        right: Token,
    },
    AddressOf(&'a Value<'a>),
    StructInitializer(Vec<FieldInitializer<'a>>),
    ParensWrapped(&'a Value<'a>),
    Cast {
        cast_to: &'a Type<'a>,
        value: &'a Value<'a>,
    },
    Conditional {
        condition: &'a Value<'a>,
        on_true: &'a Value<'a>,
        on_false: &'a Value<'a>,
    },
    /// A type used as a value, e.g. the operand of `sizeof`.
    TypeRef(&'a Type<'a>),
}

/// Structural value equality, grounded in `original_source/src/parser/value.c`'s `Value_equal`.
pub fn value_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::StaticValue(x), Value::StaticValue(y)) => x.text == y.text,
        (Value::SymbolReference(x), Value::SymbolReference(y)) => x.text == y.text,
        (Value::Operator { left: l1, right: r1, op: o1 }, Value::Operator { left: l2, right: r2, op: o2 }) => {
            o1 == o2
                && value_equal(l1, l2)
                && match (r1, r2) {
                    (Some(x), Some(y)) => value_equal(x, y),
                    (None, None) => true,
                    _ => false,
                }
        }
        (Value::FunctionCall { name: n1, args: a1 }, Value::FunctionCall { name: n2, args: a2 }) => {
            n1.text == n2.text && a1.len() == a2.len() && a1.iter().zip(a2.iter()).all(|(x, y)| value_equal(x, y))
        }
        (Value::Dot { left: l1, right: r1 }, Value::Dot { left: l2, right: r2 }) => r1.text == r2.text && value_equal(l1, l2),
        (Value::Arrow { left: l1, right: r1 }, Value::Arrow { left: l2, right: r2 }) => r1.text == r2.text && value_equal(l1, l2),
        (Value::AddressOf(x), Value::AddressOf(y)) => value_equal(x, y),
        (Value::ParensWrapped(x), Value::ParensWrapped(y)) => value_equal(x, y),
        (Value::Cast { cast_to: t1, value: v1 }, Value::Cast { cast_to: t2, value: v2 }) => {
            crate::types::type_equal(t1, t2) && value_equal(v1, v2)
        }
        (
            Value::Conditional { condition: c1, on_true: t1, on_false: f1 },
            Value::Conditional { condition: c2, on_true: t2, on_false: f2 },
        ) => value_equal(c1, c2) && value_equal(t1, t2) && value_equal(f1, f2),
        (Value::TypeRef(x), Value::TypeRef(y)) => crate::types::type_equal(x, y),
        (Value::StructInitializer(xs), Value::StructInitializer(ys)) => {
            xs.len() == ys.len()
                && xs.iter().zip(ys.iter()).all(|(x, y)| {
                    x.segments.len() == y.segments.len()
                        && x.segments.iter().zip(y.segments.iter()).all(|(sx, sy)| match (sx, sy) {
                            (FieldInitializerSegment::Field(a), FieldInitializerSegment::Field(b)) => a.text == b.text,
                            (FieldInitializerSegment::Index(a), FieldInitializerSegment::Index(b)) => a.text == b.text,
                            _ => false,
                        })
                        && value_equal(x.value, y.value)
                })
        }
        _ => false,
    }
}
