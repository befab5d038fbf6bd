//! Call-arity and convertibility checking (spec §8 invariants 5–6),
//! grounded in `original_source/src/parser/stack.c`'s `Stack_validateValue`
//! and `Stack_ingestStatements`. The original declares but never defines a
//! `Value_getType` helper those functions call; `infer_type` below fills
//! that gap the same way `serializer::serialize_value` fills the missing
//! `Value_asString`.
//!
//! `Stack_ingestStatements` only recurses into `While`/`If` bodies — `For`,
//! `Switch`, `Block`, `Goto`, `Label`, `SwitchCase`, `Default` are explicit
//! no-op arms, not omissions (the `switch` has a `default: fatal(...)` for
//! genuinely unhandled kinds). `validate_statement` below preserves that
//! exact coverage rather than widening it.

use crate::arena::Arena;
use crate::error::{CompileError, ParseError};
use crate::scope::Scope;
use crate::statement::Statement;
use crate::symbol::{Symbol, SymbolKind};
use crate::token::TokenKind;
use crate::types::{is_convertible, Type, TypeKind};
use crate::value::{Operator, Value};

fn literal_type(tok: &crate::token::Token) -> Type<'static> {
    match tok.kind {
        TokenKind::LiteralInteger => Type::primitive("int"),
        TokenKind::LiteralFloat => Type::primitive("double"),
        TokenKind::LiteralChar => Type::primitive("char"),
        _ => Type::primitive("int"),
    }
}

fn find_member<'a>(ty: &'a Type<'a>, name: &crate::token::Token) -> Option<&'a Symbol<'a>> {
    match &ty.kind {
        TypeKind::Struct { members, .. } | TypeKind::Union { members, .. } => {
            members.iter().copied().find(|m| m.name.as_ref().map(|n| &*n.text) == Some(&*name.text))
        }
        TypeKind::Reference(inner) => find_member(inner, name),
        _ => None,
    }
}

/// Computes the type of an expression, allocating synthesized nodes
/// (literals, the result of `&expr`) into `arena` and borrowing through the
/// AST everywhere else.
pub fn infer_type<'a>(value: &'a Value<'a>, scope: &'a Scope<'a>, arena: &'a Arena<Type<'a>>) -> Option<&'a Type<'a>> {
    match value {
        Value::StaticValue(tok) if tok.kind == TokenKind::LiteralString => {
            let char_ty = arena.alloc(Type::primitive("char"));
            Some(arena.alloc(Type::new(TypeKind::Pointer(char_ty))))
        }
        Value::StaticValue(tok) => Some(arena.alloc(literal_type(tok))),
        Value::SymbolReference(tok) => scope.find_symbol(tok).and_then(|s| s.type_),
        Value::Operator { left, right, op } => match op {
            Operator::Dereference => match &infer_type(left, scope, arena)?.kind {
                TypeKind::Pointer(inner) => Some(inner),
                TypeKind::Array { base, .. } => Some(base),
                _ => None,
            },
            Operator::Index => match &infer_type(left, scope, arena)?.kind {
                TypeKind::Pointer(inner) => Some(inner),
                TypeKind::Array { base, .. } => Some(base),
                _ => None,
            },
            Operator::LessThan
            | Operator::GreaterThan
            | Operator::LessThanOrEqual
            | Operator::GreaterThanOrEqual
            | Operator::Equal
            | Operator::NotEqual
            | Operator::LogicalAnd
            | Operator::LogicalOr
            | Operator::LogicalNot => Some(arena.alloc(Type::primitive("int"))),
            _ => {
                let _ = right;
                infer_type(left, scope, arena)
            }
        },
        Value::FunctionCall { name, .. } => match &scope.find_symbol(name)?.type_?.kind {
            TypeKind::Function { ret, .. } => Some(ret),
            _ => None,
        },
        Value::Dot { left, right } => find_member(infer_type(left, scope, arena)?, right).and_then(|m| m.type_),
        Value::Arrow { left, right } => {
            let lt = infer_type(left, scope, arena)?;
            let inner = match &lt.kind {
                TypeKind::Pointer(inner) => inner,
                _ => return None,
            };
            find_member(inner, right).and_then(|m| m.type_)
        }
        Value::AddressOf(inner) => {
            let it = infer_type(inner, scope, arena)?;
            Some(arena.alloc(Type::new(TypeKind::Pointer(it))))
        }
        Value::ParensWrapped(inner) => infer_type(inner, scope, arena),
        Value::Cast { cast_to, .. } => Some(cast_to),
        Value::Conditional { on_true, .. } => infer_type(on_true, scope, arena),
        Value::TypeRef(ty) => Some(ty),
        Value::StructInitializer(_) => None,
    }
}

/// Validates the one thing the original's `Stack_validateValue` checks:
/// a `FunctionCall`'s argument count and per-argument convertibility
/// against the callee's declared parameters. Recurses into call arguments
/// and operator operands so a call nested inside a larger expression is
/// still checked.
pub fn validate_value<'a>(value: &'a Value<'a>, scope: &'a Scope<'a>, arena: &'a Arena<Type<'a>>) -> Result<(), CompileError> {
    match value {
        Value::FunctionCall { name, args } => {
            let callee = scope.find_symbol(name).ok_or_else(|| unknown_symbol(name))?;
            let fn_type = callee.type_.ok_or_else(|| unknown_symbol(name))?;
            let params = match &fn_type.kind {
                TypeKind::Function { args, .. } => args,
                _ => return Err(type_mismatch(name, "function", &serialize_or_unknown(fn_type))),
            };
            let has_vararg = params.last().map(|p| p.kind == SymbolKind::Vararg).unwrap_or(false);
            let fixed_count = if has_vararg { params.len() - 1 } else { params.len() };
            if has_vararg {
                if args.len() < fixed_count {
                    return Err(arity_mismatch(name, fixed_count, args.len()));
                }
            } else if args.len() != fixed_count {
                return Err(arity_mismatch(name, fixed_count, args.len()));
            }
            for (i, arg) in args.iter().enumerate() {
                validate_value(arg, scope, arena)?;
                if has_vararg && i >= fixed_count {
                    // extra vararg positions carry no declared parameter type to check against
                    continue;
                }
                let param = &params[i];
                let param_ty = match param.type_ {
                    Some(t) => t,
                    None => continue,
                };
                let arg_ty = infer_type(arg, scope, arena).ok_or_else(|| unknown_symbol(name))?;
                if !is_convertible(arg_ty, param_ty) {
                    return Err(type_mismatch(name, &serialize_or_unknown(param_ty), &serialize_or_unknown(arg_ty)));
                }
            }
            Ok(())
        }
        Value::Operator { left, right, .. } => {
            validate_value(left, scope, arena)?;
            if let Some(right) = right {
                validate_value(right, scope, arena)?;
            }
            Ok(())
        }
        Value::Dot { left, .. } | Value::Arrow { left, .. } | Value::AddressOf(left) | Value::ParensWrapped(left) => {
            validate_value(left, scope, arena)
        }
        Value::Cast { value, .. } => validate_value(value, scope, arena),
        Value::Conditional { condition, on_true, on_false } => {
            validate_value(condition, scope, arena)?;
            validate_value(on_true, scope, arena)?;
            validate_value(on_false, scope, arena)
        }
        Value::StaticValue(_) | Value::SymbolReference(_) | Value::TypeRef(_) | Value::StructInitializer(_) => Ok(()),
    }
}

/// Walks a function body (or the top-level scope) validating every
/// value-bearing statement, mirroring `Stack_ingestStatements`'s recursion
/// into `While`/`If` bodies only.
pub fn validate_statement<'a>(statement: &'a Statement<'a>, scope: &'a Scope<'a>, arena: &'a Arena<Type<'a>>) -> Result<(), CompileError> {
    match statement {
        Statement::Value(value) | Statement::Return(Some(value)) => validate_value(value, scope, arena),
        Statement::While { condition, body, .. } => {
            validate_value(condition, scope, arena)?;
            validate_statement(body, scope, arena)
        }
        Statement::If { condition, body, else_body } => {
            validate_value(condition, scope, arena)?;
            validate_statement(body, scope, arena)?;
            if let Some(else_body) = else_body {
                validate_statement(else_body, scope, arena)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Validates every top-level statement and, for function definitions, the
/// function's own body scope.
pub fn validate_module<'a>(root: &'a Scope<'a>, arena: &'a Arena<Type<'a>>) -> Result<(), CompileError> {
    for stmt in root.statements() {
        validate_statement(stmt, root, arena)?;
        if let Statement::FunctionDefinition { body, .. } = stmt {
            for inner in body.statements() {
                validate_statement(inner, body, arena)?;
            }
        }
    }
    Ok(())
}

fn serialize_or_unknown(ty: &Type) -> String {
    crate::serializer::serialize_type(ty)
}

fn unknown_symbol(name: &crate::token::Token) -> CompileError {
    CompileError::Parse {
        file: name.file.clone(),
        line: name.line,
        column: name.column,
        kind: ParseError::UnknownSymbol(name.text.to_string()),
    }
}

fn arity_mismatch(name: &crate::token::Token, expected: usize, found: usize) -> CompileError {
    CompileError::Parse {
        file: name.file.clone(),
        line: name.line,
        column: name.column,
        kind: ParseError::ArityMismatch { name: name.text.to_string(), expected, found },
    }
}

fn type_mismatch(name: &crate::token::Token, expected: &str, found: &str) -> CompileError {
    CompileError::Parse {
        file: name.file.clone(),
        line: name.line,
        column: name.column,
        kind: ParseError::TypeMismatch { expected: expected.to_string(), found: found.to_string() },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Tokenizer;
    use crate::parser::{parse_module, Arenas};
    use crate::preprocessor::Preprocessor;
    use crate::source::FsSourceLoader;
    use crate::string_joiner::join_string_literals;
    use std::rc::Rc;

    fn parse<'a>(arenas: &'a Arenas<'a>, src: &str) -> &'a Scope<'a> {
        let file: crate::token::FileLabel = Rc::from("<test>");
        let tokenizer = Tokenizer::tokenize(file.clone(), src.as_bytes()).unwrap();
        let mut loader = FsSourceLoader;
        let mut pp = Preprocessor::new(&mut loader, Vec::new());
        let preprocessed = pp.run(file.clone(), None, &tokenizer.tokens).unwrap();
        let joined = join_string_literals(preprocessed);
        parse_module(arenas, file, &joined).unwrap()
    }

    #[test]
    fn vararg_call_with_extra_args_validates() {
        let arenas = Arenas::default();
        let root = parse(&arenas, "int printf(char *fmt, ...); int main(){ printf(\"x\", 1, 2); return 0; }");
        assert!(validate_module(root, &arenas.types).is_ok());
    }

    #[test]
    fn arity_mismatch_is_rejected() {
        let arenas = Arenas::default();
        let root = parse(&arenas, "int f(int a); int main(){ f(1, 2); return 0; }");
        assert!(validate_module(root, &arenas.types).is_err());
    }

    #[test]
    fn matching_call_validates() {
        let arenas = Arenas::default();
        let root = parse(&arenas, "int add(int a, int b); int main(){ return add(1, 2); }");
        assert!(validate_module(root, &arenas.types).is_ok());
    }
}
