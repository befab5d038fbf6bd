//! `Statement` (spec §3), grounded in
//! `original_source/include/parser/statement.h`.

use crate::scope::Scope;
use crate::symbol::{Symbol, SymbolDefinition};
use crate::token::Token;
use crate::value::Value;

#[derive(Debug)]
pub enum GotoTarget<'a> {
    Label(Token),
    /// Computed goto: `goto *expr;`
    Computed(&'a Value<'a>),
}

#[derive(Debug)]
pub enum Statement<'a> {
    Empty,
    FunctionDefinition {
        symbol: Symbol<'a>,
        body: &'a Scope<'a>,
    },
    SymbolDefinition(Vec<SymbolDefinition<'a>>),
    Return(Option<&'a Value<'a>>),
    Value(&'a Value<'a>),
    Block(&'a Scope<'a>),
    If {
        condition: &'a Value<'a>,
        body: &'a Statement<'a>,
        else_body: Option<&'a Statement<'a>>,
    },
    For {
        init: Option<&'a Statement<'a>>,
        condition: Option<&'a Value<'a>>,
        step: Option<&'a Value<'a>>,
        scope: &'a Scope<'a>,
    },
    While {
        condition: &'a Value<'a>,
        body: &'a Statement<'a>,
        do_while: bool,
    },
    Switch {
        condition: &'a Value<'a>,
        body: Vec<&'a Statement<'a>>,
    },
    SwitchCase(&'a Value<'a>),
    Break,
    Continue,
    Default,
    Goto(GotoTarget<'a>),
    Label(Token),
    Typedef(Vec<Symbol<'a>>),
}

/// Structural statement equality, grounded in
/// `original_source/src/parser/statement.c`'s `Statement_equal`.
pub fn statement_equal(a: &Statement, b: &Statement) -> bool {
    use Statement::*;
    match (a, b) {
        (Empty, Empty) | (Break, Break) | (Continue, Continue) | (Default, Default) => true,
        (Return(x), Return(y)) => opt_value_eq(*x, *y),
        (Value(x), Value(y)) => crate::value::value_equal(x, y),
        (SwitchCase(x), SwitchCase(y)) => crate::value::value_equal(x, y),
        (Label(x), Label(y)) => x.text == y.text,
        (Goto(GotoTarget::Label(x)), Goto(GotoTarget::Label(y))) => x.text == y.text,
        (Goto(GotoTarget::Computed(x)), Goto(GotoTarget::Computed(y))) => crate::value::value_equal(x, y),
        (If { condition: c1, body: b1, else_body: e1 }, If { condition: c2, body: b2, else_body: e2 }) => {
            crate::value::value_equal(c1, c2)
                && statement_equal(b1, b2)
                && match (e1, e2) {
                    (Some(x), Some(y)) => statement_equal(x, y),
                    (None, None) => true,
                    _ => false,
                }
        }
        (While { condition: c1, body: b1, do_while: d1 }, While { condition: c2, body: b2, do_while: d2 }) => {
            d1 == d2 && crate::value::value_equal(c1, c2) && statement_equal(b1, b2)
        }
        (Switch { condition: c1, body: b1 }, Switch { condition: c2, body: b2 }) => {
            crate::value::value_equal(c1, c2)
                && b1.len() == b2.len()
                && b1.iter().zip(b2.iter()).all(|(x, y)| statement_equal(x, y))
        }
        (SymbolDefinition(xs), SymbolDefinition(ys)) => {
            xs.len() == ys.len()
                && xs.iter().zip(ys.iter()).all(|(x, y)| {
                    crate::symbol::symbol_equal(&x.symbol, &y.symbol) && opt_value_eq(x.initializer, y.initializer)
                })
        }
        (Typedef(xs), Typedef(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys.iter()).all(|(x, y)| crate::symbol::symbol_equal(x, y))
        }
        _ => false,
    }
}

fn opt_value_eq(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (Some(x), Some(y)) => crate::value::value_equal(x, y),
        (None, None) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_break_are_self_equal_but_not_cross_equal() {
        assert!(statement_equal(&Statement::Empty, &Statement::Empty));
        assert!(statement_equal(&Statement::Break, &Statement::Break));
        assert!(!statement_equal(&Statement::Empty, &Statement::Break));
    }

    #[test]
    fn return_compares_inner_value() {
        use crate::token::{Token, TokenKind};
        use std::rc::Rc;
        let one = Value::StaticValue(Token::new(TokenKind::LiteralInteger, "1", Rc::from("<t>"), 0, 0));
        let two = Value::StaticValue(Token::new(TokenKind::LiteralInteger, "2", Rc::from("<t>"), 0, 0));
        assert!(statement_equal(&Statement::Return(Some(&one)), &Statement::Return(Some(&one))));
        assert!(!statement_equal(&Statement::Return(Some(&one)), &Statement::Return(Some(&two))));
        assert!(!statement_equal(&Statement::Return(None), &Statement::Return(Some(&one))));
    }
}
