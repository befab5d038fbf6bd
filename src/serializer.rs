//! Human-readable dumps of the AST (spec §4.6's `Serialization` stage),
//! grounded in `original_source/src/parser/type.c`'s `Type_asString` and
//! `statement.c`'s `Statement_asString`. The original declares but never
//! defines `Value_asString` (`include/parser/value.h:82`) despite both of
//! those functions calling it — `serialize_value` below fills that gap,
//! following the same terse, one-line-per-node convention the two
//! implemented functions use.

use std::fmt::Write;

use crate::scope::Scope;
use crate::statement::{GotoTarget, Statement};
use crate::symbol::{Symbol, SymbolKind};
use crate::types::{SizeModifier, Type, TypeKind};
use crate::value::{FieldInitializerSegment, Operator, Value};

fn indent(depth: usize) -> String {
    " ".repeat(depth * 4)
}

fn token_text(tok: &crate::token::Token) -> &str {
    &tok.text
}

/// Renders a type the way `Type_asString` does: qualifier prefixes, then
/// the kind's own text, unwrapping `Reference`/`Pointer`/`Array` in a loop
/// and stopping at the first kind that owns real content.
pub fn serialize_type(ty: &Type) -> String {
    let mut out = String::new();
    if ty.is_thread_local {
        out.push_str("thread_local ");
    }
    if ty.is_static {
        out.push_str("static ");
    }
    if ty.is_const {
        out.push_str("const ");
    }
    if ty.is_signed {
        out.push_str("signed ");
    }
    if ty.is_unsigned {
        out.push_str("unsigned ");
    }
    match ty.size_mod {
        SizeModifier::None => {}
        SizeModifier::Short => out.push_str("short "),
        SizeModifier::Long => out.push_str("long "),
        SizeModifier::LongLong => out.push_str("long long "),
    }

    let mut type_ref = ty;
    loop {
        match &type_ref.kind {
            TypeKind::Reference(inner) => {
                if let Some(name) = &type_ref.name {
                    write!(out, "{}", token_text(name)).unwrap();
                    return out;
                }
                type_ref = inner;
            }
            TypeKind::Pointer(inner) => {
                out.push('*');
                type_ref = inner;
            }
            TypeKind::Array { base, len, is_static } => {
                write!(out, "[{}{}] ", if *is_static { "static " } else { "" }, len.map(serialize_value).unwrap_or_default()).unwrap();
                type_ref = base;
            }
            TypeKind::Function { args, ret } => {
                write!(out, "function, return type is {}, with args (", serialize_type(ret)).unwrap();
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    write!(out, "{}", serialize_symbol(arg)).unwrap();
                }
                out.push(')');
                return out;
            }
            TypeKind::Struct { name, members } => {
                write!(out, "struct {}", name.as_ref().map(token_text).unwrap_or("<anonymous>")).unwrap();
                for member in members {
                    write!(out, "\n  member {} of type {}", member.name.as_ref().map(token_text).unwrap_or("<unnamed>"), member.type_.map(serialize_type).unwrap_or_default()).unwrap();
                }
                return out;
            }
            TypeKind::Union { name, members } => {
                write!(out, "union {}", name.as_ref().map(token_text).unwrap_or("<anonymous>")).unwrap();
                for member in members {
                    write!(out, "\n  member {} of type {}", member.name.as_ref().map(token_text).unwrap_or("<unnamed>"), member.type_.map(serialize_type).unwrap_or_default()).unwrap();
                }
                return out;
            }
            TypeKind::Enum { name, members } => {
                write!(out, "enum {}", name.as_ref().map(token_text).unwrap_or("<anonymous>")).unwrap();
                for variant in members {
                    write!(out, "\n  variant {}", token_text(&variant.name)).unwrap();
                    if let Some(value) = variant.value {
                        write!(out, " = {}", serialize_value(value)).unwrap();
                    }
                }
                return out;
            }
            TypeKind::TypeOf(inner) => {
                write!(out, "typeof {}", serialize_type(inner)).unwrap();
                return out;
            }
            TypeKind::Primitive => {
                write!(out, "{}", type_ref.name.as_ref().map(token_text).unwrap_or("<anonymous primitive>")).unwrap();
                return out;
            }
        }
    }
}

fn operator_text(op: Operator) -> &'static str {
    match op {
        Operator::Add => "+",
        Operator::Sub => "-",
        Operator::Mult => "*",
        Operator::Div => "/",
        Operator::Modulo => "%",
        Operator::LessThan => "<",
        Operator::GreaterThan => ">",
        Operator::LessThanOrEqual => "<=",
        Operator::GreaterThanOrEqual => ">=",
        Operator::Assignment => "=",
        Operator::AddAssign => "+=",
        Operator::SubAssign => "-=",
        Operator::MultAssign => "*=",
        Operator::DivAssign => "/=",
        Operator::ModuloAssign => "%=",
        Operator::BitwiseAndAssign => "&=",
        Operator::BitwiseOrAssign => "|=",
        Operator::BitwiseXorAssign => "^=",
        Operator::LeftShiftAssign => "<<=",
        Operator::RightShiftAssign => ">>=",
        Operator::PostfixIncrement => "++",
        Operator::PostfixDecrement => "--",
        Operator::LogicalAnd => "&&",
        Operator::LogicalOr => "||",
        Operator::BitwiseAnd => "&",
        Operator::BitwiseOr => "|",
        Operator::Equal => "==",
        Operator::NotEqual => "!=",
        Operator::LogicalNot => "!",
        Operator::BitwiseNot => "~",
        Operator::Index => "[]",
        Operator::Dereference => "*",
    }
}

/// Renders an expression tree as a flat, parenthesized-where-needed
/// one-liner. `original_source` calls this function from both
/// `Type_asString` (array lengths, enum variant values) and
/// `Statement_asString` (every value-carrying statement kind) but never
/// defines it; this follows their terse style rather than introducing a
/// separate convention.
pub fn serialize_value(value: &Value) -> String {
    match value {
        Value::StaticValue(tok) => token_text(tok).to_string(),
        Value::SymbolReference(tok) => token_text(tok).to_string(),
        Value::Operator { left, right, op } => match right {
            Some(right) => format!("({} {} {})", serialize_value(left), operator_text(*op), serialize_value(right)),
            None if op.is_unary() && matches!(op, Operator::PostfixIncrement | Operator::PostfixDecrement) => {
                format!("({}{})", serialize_value(left), operator_text(*op))
            }
            None => format!("({}{})", operator_text(*op), serialize_value(left)),
        },
        Value::FunctionCall { name, args } => {
            let args: Vec<String> = args.iter().map(|a| serialize_value(a)).collect();
            format!("{}({})", token_text(name), args.join(", "))
        }
        Value::Dot { left, right } => format!("{}.{}", serialize_value(left), token_text(right)),
        Value::Arrow { left, right } => format!("{}->{}", serialize_value(left), token_text(right)),
        Value::AddressOf(inner) => format!("(&{})", serialize_value(inner)),
        Value::StructInitializer(fields) => {
            let rendered: Vec<String> = fields
                .iter()
                .map(|field| {
                    let mut prefix = String::new();
                    for segment in &field.segments {
                        match segment {
                            FieldInitializerSegment::Field(tok) => write!(prefix, ".{}", token_text(tok)).unwrap(),
                            FieldInitializerSegment::Index(tok) => write!(prefix, "[{}]", token_text(tok)).unwrap(),
                        }
                    }
                    if prefix.is_empty() {
                        serialize_value(field.value)
                    } else {
                        format!("{}={}", prefix, serialize_value(field.value))
                    }
                })
                .collect();
            format!("{{{}}}", rendered.join(", "))
        }
        Value::ParensWrapped(inner) => format!("({})", serialize_value(inner)),
        Value::Cast { cast_to, value } => format!("(({}) {})", serialize_type(cast_to), serialize_value(value)),
        Value::Conditional { condition, on_true, on_false } => {
            format!("({} ? {} : {})", serialize_value(condition), serialize_value(on_true), serialize_value(on_false))
        }
        Value::TypeRef(ty) => serialize_type(ty),
    }
}

fn serialize_symbol(symbol: &Symbol) -> String {
    let type_text = symbol.type_.map(serialize_type).unwrap_or_default();
    match (&symbol.name, symbol.kind) {
        (_, SymbolKind::Vararg) => "...".to_string(),
        (Some(name), _) => format!("{} of type {}", token_text(name), type_text),
        (None, _) => format!("unnamed symbol of type {}", type_text),
    }
}

/// Renders a statement tree with the original's indented, recursive
/// layout: `depth*4` leading spaces per line, child statements recursing
/// at `depth + 1`.
pub fn serialize_statement(statement: &Statement, depth: usize) -> String {
    let pad = indent(depth);
    match statement {
        Statement::Empty => format!("{pad}empty statement\n"),
        Statement::Return(None) => format!("{pad}return\n"),
        Statement::Return(Some(value)) => format!("{pad}return {}\n", serialize_value(value)),
        Statement::Value(value) => format!("{pad}val {}\n", serialize_value(value)),
        Statement::Break => format!("{pad}break\n"),
        Statement::Continue => format!("{pad}continue\n"),
        Statement::Default => format!("{pad}default\n"),
        Statement::Label(tok) => format!("{pad}label {}:\n", token_text(tok)),
        Statement::SwitchCase(value) => format!("{pad}case {}:\n", serialize_value(value)),
        Statement::Goto(GotoTarget::Label(tok)) => format!("{pad}goto {}\n", token_text(tok)),
        Statement::Goto(GotoTarget::Computed(value)) => format!("{pad}goto {}\n", serialize_value(value)),
        Statement::FunctionDefinition { symbol, body } => {
            let mut out = format!("{pad}defined function {} of type {}", symbol.name.as_ref().map(token_text).unwrap_or("<unnamed>"), symbol.type_.map(serialize_type).unwrap_or_default());
            for stmt in body.statements() {
                write!(out, "\n-{}", serialize_statement(stmt, depth + 1)).unwrap();
            }
            out
        }
        Statement::SymbolDefinition(defs) => {
            let mut out = format!("{pad}symbols: ");
            for def in defs {
                write!(out, "\n{}", indent(depth + 1)).unwrap();
                match &def.symbol.name {
                    Some(name) => write!(out, "{} of type {}", token_text(name), def.symbol.type_.map(serialize_type).unwrap_or_default()).unwrap(),
                    None => write!(out, "unnamed symbol of type {}", def.symbol.type_.map(serialize_type).unwrap_or_default()).unwrap(),
                }
                if let Some(initializer) = def.initializer {
                    write!(out, " = {}", serialize_value(initializer)).unwrap();
                }
            }
            out
        }
        Statement::For { init, condition, step, scope } => {
            let mut out = format!("{pad}for loop\n");
            write!(out, "{}", indent(depth + 1)).unwrap();
            match init {
                Some(init) => write!(out, "init:\n{}", serialize_statement(init, depth + 1)).unwrap(),
                None => write!(out, "init:\nnone").unwrap(),
            }
            write!(out, "{}", indent(depth + 1)).unwrap();
            match condition {
                Some(condition) => write!(out, "condition:\n{}", serialize_value(condition)).unwrap(),
                None => write!(out, "condition:\nnone").unwrap(),
            }
            write!(out, "{}", indent(depth + 1)).unwrap();
            match step {
                Some(step) => write!(out, "step:\n{}", serialize_value(step)).unwrap(),
                None => write!(out, "step:\nnone").unwrap(),
            }
            for stmt in scope.statements() {
                write!(out, "{}", serialize_statement(stmt, depth + 1)).unwrap();
            }
            out
        }
        Statement::If { condition, body, else_body } => {
            let mut out = format!("{pad}if {}\n", serialize_value(condition));
            write!(out, "{}", serialize_statement(body, depth + 1)).unwrap();
            if let Some(else_body) = else_body {
                out.push_str("else\n");
                write!(out, "{}", serialize_statement(else_body, depth + 1)).unwrap();
            }
            out
        }
        Statement::While { condition, body, do_while } => {
            let mut out = if *do_while {
                format!("{pad}loop: do while ( {} )", serialize_value(condition))
            } else {
                format!("{pad}loop: while ( {} )", serialize_value(condition))
            };
            write!(out, "{}", serialize_statement(body, depth + 1)).unwrap();
            out
        }
        Statement::Switch { condition, body } => {
            let mut out = format!("{pad}switch {}", serialize_value(condition));
            for stmt in body {
                write!(out, "\n{}{}", pad, serialize_statement(stmt, depth + 1)).unwrap();
            }
            out
        }
        Statement::Block(scope) => {
            let mut out = format!("{pad}block:\n");
            for stmt in scope.statements() {
                write!(out, "{}", serialize_statement(stmt, depth + 1)).unwrap();
            }
            out
        }
        Statement::Typedef(symbols) => {
            let mut out = String::new();
            for symbol in symbols {
                write!(out, "{pad}").unwrap();
                match &symbol.name {
                    Some(name) => writeln!(out, "typedef {} : {}", token_text(name), symbol.type_.map(serialize_type).unwrap_or_default()).unwrap(),
                    None => writeln!(out, "typedef {}", symbol.type_.map(serialize_type).unwrap_or_default()).unwrap(),
                }
            }
            out
        }
    }
}

/// Renders every top-level statement in `scope`, concatenated in order —
/// the shape the CLI's `--parse-ast` dump produces.
pub fn serialize_scope(scope: &Scope) -> String {
    let mut out = String::new();
    for stmt in scope.statements() {
        out.push_str(&serialize_statement(stmt, 0));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Token, TokenKind};
    use std::rc::Rc;

    fn tok(text: &str) -> Token {
        Token::new(TokenKind::Symbol, text, Rc::from("<test>"), 0, 0)
    }

    #[test]
    fn serializes_primitive_and_pointer_type() {
        let int_ty = Type::primitive("int");
        assert_eq!(serialize_type(&int_ty), "int");
        let ptr = Type::new(TypeKind::Pointer(&int_ty));
        assert_eq!(serialize_type(&ptr), "*int");
    }

    #[test]
    fn serializes_const_qualifier_prefix() {
        let ty = Type { is_const: true, ..Type::primitive("int") };
        assert_eq!(serialize_type(&ty), "const int");
    }

    #[test]
    fn serializes_binary_and_unary_operator_values() {
        let one = Value::StaticValue(tok("1"));
        let two = Value::StaticValue(tok("2"));
        let add = Value::Operator { left: &one, right: Some(&two), op: Operator::Add };
        assert_eq!(serialize_value(&add), "(1 + 2)");

        let not = Value::Operator { left: &one, right: None, op: Operator::LogicalNot };
        assert_eq!(serialize_value(&not), "(!1)");

        let post_inc = Value::Operator { left: &one, right: None, op: Operator::PostfixIncrement };
        assert_eq!(serialize_value(&post_inc), "(1++)");
    }

    #[test]
    fn serializes_function_call_and_dot_access() {
        let x = Value::SymbolReference(tok("p"));
        let dot = Value::Dot { left: &x, right: tok("field") };
        assert_eq!(serialize_value(&dot), "p.field");

        let arg = Value::StaticValue(tok("1"));
        let call = Value::FunctionCall { name: tok("f"), args: vec![&arg] };
        assert_eq!(serialize_value(&call), "f(1)");
    }

    #[test]
    fn serializes_return_and_if_statement_with_indentation() {
        let cond = Value::StaticValue(tok("1"));
        let body = Statement::Return(None);
        let stmt = Statement::If { condition: &cond, body: &body, else_body: None };
        let rendered = serialize_statement(&stmt, 1);
        assert!(rendered.starts_with("    if 1\n"));
        assert!(rendered.contains("        return\n"));
    }
}
