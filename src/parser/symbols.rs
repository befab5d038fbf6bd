//! Comma-separated declarator lists sharing one base type (spec §4.4),
//! grounded in `original_source/src/parser/symbol.c`'s declaration-parsing
//! loop.

use super::Parser;
use crate::error::CompileError;
use crate::scope::Scope;
use crate::symbol::{Symbol, SymbolDefinition, SymbolKind};

impl<'a, 't> Parser<'a, 't> {
    /// Parses `<specifiers> <declarator> [= init] [, <declarator> [= init]]*`
    /// (no trailing `;` — callers consume that themselves, since struct
    /// members and statement-level declarations terminate differently).
    /// Each resulting symbol is registered into `scope` as it's parsed, so
    /// e.g. `int x = x;` inside a shadowing inner scope sees the
    /// newly-declared `x` from the moment its name is read, matching the
    /// teacher's one-pass declare-then-initialize order.
    pub(super) fn parse_symbol_definitions(&mut self, scope: &'a Scope<'a>, with_initializers: bool) -> Result<Vec<SymbolDefinition<'a>>, CompileError> {
        let base = self.parse_decl_specifiers(scope)?;
        let mut out = Vec::new();
        loop {
            let (name, ty) = self.parse_declarator(scope, base)?;
            let initializer = if with_initializers && self.cursor.eat_symbol("=") {
                Some(self.parse_assignment_expr(scope)?)
            } else {
                None
            };
            let symbol = Symbol { name, kind: SymbolKind::Declaration, type_: Some(ty) };
            scope.add_symbol(self.arenas.symbols.alloc(Symbol { name: symbol.name.clone(), kind: symbol.kind, type_: symbol.type_ }));
            out.push(SymbolDefinition { symbol, initializer });
            if !self.cursor.eat_symbol(",") {
                break;
            }
        }
        Ok(out)
    }

    /// `typedef <specifiers> <declarator> [, <declarator>]*;` — registers
    /// each declared name as a *type* (not a symbol) in `scope`.
    pub(super) fn parse_typedef_list(&mut self, scope: &'a Scope<'a>) -> Result<Vec<Symbol<'a>>, CompileError> {
        let base = self.parse_decl_specifiers(scope)?;
        let mut out = Vec::new();
        loop {
            let (name, ty) = self.parse_declarator(scope, base)?;
            if let Some(name) = &name {
                let aliased = self.arenas.types.alloc(crate::types::Type {
                    name: Some(name.clone()),
                    ..copy_type_shell(ty)
                });
                scope.add_type(aliased);
            }
            out.push(Symbol { name, kind: SymbolKind::Declaration, type_: Some(ty) });
            if !self.cursor.eat_symbol(",") {
                break;
            }
        }
        Ok(out)
    }
}

/// Shallow-copies a type's qualifier bits and kind reference so a typedef
/// alias can carry its own `name` without duplicating the underlying
/// `TypeKind` tree.
fn copy_type_shell<'a>(ty: &'a crate::types::Type<'a>) -> crate::types::Type<'a> {
    crate::types::Type {
        is_thread_local: ty.is_thread_local,
        is_static: ty.is_static,
        is_const: ty.is_const,
        is_extern: ty.is_extern,
        is_unsigned: ty.is_unsigned,
        is_signed: ty.is_signed,
        size_mod: ty.size_mod,
        name: ty.name.clone(),
        kind: crate::types::TypeKind::Reference(ty),
    }
}
