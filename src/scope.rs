//! `Scope` (spec §4.5), grounded in `original_source/include/parser/stack.h`'s
//! `Stack`: a parent-pointer tree of symbol/type/statement lists.
//!
//! The teacher's `scope.rs` models lookup as a flat `Vec` of `HashMap`
//! frames that get popped when a block exits; this crate's arena-allocated
//! `Scope` nodes must instead stay valid for as long as the AST they're
//! embedded in (a `For`/`Block` statement holds `&'a Scope<'a>` directly),
//! so lookup walks `parent` links instead of an external stack.

use std::cell::RefCell;

use crate::arena::Arena;
use crate::statement::Statement;
use crate::symbol::{Symbol, SymbolKind};
use crate::token::Token;
use crate::types::{Type, TypeKind};

#[derive(Debug)]
pub struct Scope<'a> {
    pub parent: Option<&'a Scope<'a>>,
    symbols: RefCell<Vec<&'a Symbol<'a>>>,
    types: RefCell<Vec<&'a Type<'a>>>,
    statements: RefCell<Vec<&'a Statement<'a>>>,
}

impl<'a> Scope<'a> {
    pub fn new(parent: Option<&'a Scope<'a>>) -> Self {
        Scope {
            parent,
            symbols: RefCell::new(Vec::new()),
            types: RefCell::new(Vec::new()),
            statements: RefCell::new(Vec::new()),
        }
    }

    pub fn add_symbol(&self, symbol: &'a Symbol<'a>) {
        self.symbols.borrow_mut().push(symbol);
    }

    pub fn add_type(&self, ty: &'a Type<'a>) {
        self.types.borrow_mut().push(ty);
    }

    pub fn add_statement(&self, statement: &'a Statement<'a>) {
        self.statements.borrow_mut().push(statement);
    }

    pub fn statements(&self) -> Vec<&'a Statement<'a>> {
        self.statements.borrow().clone()
    }

    pub fn symbols(&self) -> Vec<&'a Symbol<'a>> {
        self.symbols.borrow().clone()
    }

    pub fn types(&self) -> Vec<&'a Type<'a>> {
        self.types.borrow().clone()
    }

    /// Walks this scope, then its parents, returning the innermost match.
    /// Within a single scope, the textually-first insertion wins (matches
    /// `Stack_findSymbol`'s forward `i=0..len` scan).
    pub fn find_symbol(&self, name: &Token) -> Option<&'a Symbol<'a>> {
        if let Some(found) = self.symbols.borrow().iter().find(|s| s.name.as_ref().map(|n| &*n.text) == Some(&*name.text)) {
            return Some(*found);
        }
        self.parent.and_then(|p| p.find_symbol(name))
    }

    pub fn find_type(&self, name: &Token) -> Option<&'a Type<'a>> {
        if let Some(found) = self.types.borrow().iter().find(|t| t.name.as_ref().map(|n| &*n.text) == Some(&*name.text)) {
            return Some(*found);
        }
        self.parent.and_then(|p| p.find_type(name))
    }

    /// Processes a symbol's type so it becomes usable by reference from
    /// other symbols, mirroring `Stack_ingestSymbolType`: registers a named
    /// struct/union/enum tag into this scope's type table (if not already
    /// present) and adds each enum variant as an `int`-typed symbol.
    /// Unwraps `Reference`/`Pointer`/`Array` to reach the underlying type,
    /// recurses into struct/union members, and otherwise does nothing —
    /// the original's switch falls through to its `default: return` arm
    /// for every other kind, including `Function` (parameter types are
    /// never ingested from a declared type this way).
    pub fn ingest_symbol_type(&self, ty: &'a Type<'a>, types_arena: &'a Arena<Type<'a>>, symbols_arena: &'a Arena<Symbol<'a>>) {
        match &ty.kind {
            TypeKind::Reference(inner) | TypeKind::Pointer(inner) => self.ingest_symbol_type(inner, types_arena, symbols_arena),
            TypeKind::Array { base, .. } => self.ingest_symbol_type(base, types_arena, symbols_arena),
            TypeKind::Struct { name, members } | TypeKind::Union { name, members } => {
                if let Some(name) = name {
                    if self.find_type(name).is_none() {
                        self.add_type(ty);
                    }
                }
                for member in members {
                    if let Some(member_ty) = member.type_ {
                        self.ingest_symbol_type(member_ty, types_arena, symbols_arena);
                    }
                }
            }
            TypeKind::Enum { name, members } => {
                if let Some(name) = name {
                    if self.find_type(name).is_none() {
                        self.add_type(ty);
                    }
                }
                for variant in members {
                    let int_ty = types_arena.alloc(Type::primitive("int"));
                    let sym = symbols_arena.alloc(Symbol { name: Some(variant.name.clone()), kind: SymbolKind::Declaration, type_: Some(int_ty) });
                    self.add_symbol(sym);
                }
            }
            _ => {}
        }
    }
}
