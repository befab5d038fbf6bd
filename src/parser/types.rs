//! Type-specifier and declarator parsing (spec §4.4), grounded in
//! `original_source/include/parser/type.h`'s `TYPEKIND` shapes.

use super::Parser;
use crate::error::{CompileError, ParseError};
use crate::scope::Scope;
use crate::symbol::{Symbol, SymbolKind};
use crate::token::{Token, TokenKind};
use crate::types::{EnumVariant, SizeModifier, Type, TypeKind};

const TYPE_SPECIFIER_KEYWORDS: &[&str] = &["void", "int", "float", "double", "char"];

impl<'a, 't> Parser<'a, 't> {
    /// True if the cursor is positioned at something that can start a type
    /// (a primitive keyword, a qualifier, `struct`/`union`/`enum`, or an
    /// identifier previously registered as a typedef in `scope`).
    pub(super) fn at_type_start(&mut self, scope: &'a Scope<'a>) -> bool {
        match self.peek() {
            Some(t) if t.kind == TokenKind::Keyword => {
                TYPE_SPECIFIER_KEYWORDS.contains(&&*t.text)
                    || matches!(&*t.text, "short" | "long" | "signed" | "unsigned" | "const" | "static" | "extern" | "thread_local" | "struct" | "union" | "enum")
            }
            Some(t) if t.kind == TokenKind::Symbol => scope.find_type(t).is_some(),
            _ => false,
        }
    }

    /// Parses declaration specifiers (qualifiers + base kind) into a
    /// single arena-allocated base `Type`, shared by every declarator in
    /// the statement (e.g. `int *a, b;` — `a` and `b` both wrap the same
    /// `int` base).
    pub(super) fn parse_decl_specifiers(&mut self, scope: &'a Scope<'a>) -> Result<&'a Type<'a>, CompileError> {
        let mut is_const = false;
        let mut is_static = false;
        let mut is_extern = false;
        let mut is_thread_local = false;
        let mut is_unsigned = false;
        let mut is_signed = false;
        let mut size_mod = SizeModifier::None;

        loop {
            if self.cursor.eat_keyword("const") {
                is_const = true;
            } else if self.cursor.eat_keyword("static") {
                is_static = true;
            } else if self.cursor.eat_keyword("extern") {
                is_extern = true;
            } else if self.cursor.eat_keyword("thread_local") {
                is_thread_local = true;
            } else if self.cursor.eat_keyword("unsigned") {
                is_unsigned = true;
            } else if self.cursor.eat_keyword("signed") {
                is_signed = true;
            } else if self.cursor.eat_keyword("short") {
                size_mod = SizeModifier::Short;
            } else if self.cursor.eat_keyword("long") {
                size_mod = if size_mod == SizeModifier::Long { SizeModifier::LongLong } else { SizeModifier::Long };
            } else {
                break;
            }
        }

        let kind = if self.cursor.is_keyword("struct") || self.cursor.is_keyword("union") {
            self.parse_struct_or_union(scope)?
        } else if self.cursor.is_keyword("enum") {
            self.parse_enum(scope)?
        } else if let Some(t) = self.peek() {
            if t.kind == TokenKind::Keyword && TYPE_SPECIFIER_KEYWORDS.contains(&&*t.text) {
                let name = t.clone();
                self.bump();
                return Ok(self.finish_base(name, None, is_const, is_static, is_extern, is_thread_local, is_unsigned, is_signed, size_mod, TypeKind::Primitive));
            } else if t.kind == TokenKind::Symbol {
                if let Some(found) = scope.find_type(t) {
                    let name = t.clone();
                    self.bump();
                    return Ok(self.finish_base(name, None, is_const, is_static, is_extern, is_thread_local, is_unsigned, is_signed, size_mod, TypeKind::Reference(found)));
                }
                return Err(self.unexpected("type specifier"));
            } else {
                return Err(self.unexpected("type specifier"));
            }
        } else {
            return Err(self.unexpected("type specifier"));
        };

        Ok(self.arenas.types.alloc(Type {
            is_thread_local,
            is_static,
            is_const,
            is_extern,
            is_unsigned,
            is_signed,
            size_mod,
            name: None,
            kind,
        }))
    }

    #[allow(clippy::too_many_arguments)]
    fn finish_base(
        &self,
        name: Token,
        override_name: Option<Token>,
        is_const: bool,
        is_static: bool,
        is_extern: bool,
        is_thread_local: bool,
        is_unsigned: bool,
        is_signed: bool,
        size_mod: SizeModifier,
        kind: TypeKind<'a>,
    ) -> &'a Type<'a> {
        self.arenas.types.alloc(Type {
            is_thread_local,
            is_static,
            is_const,
            is_extern,
            is_unsigned,
            is_signed,
            size_mod,
            name: Some(override_name.unwrap_or(name)),
            kind,
        })
    }

    fn parse_struct_or_union(&mut self, scope: &'a Scope<'a>) -> Result<TypeKind<'a>, CompileError> {
        let is_union = self.cursor.is_keyword("union");
        self.bump();
        let name = if matches!(self.peek(), Some(t) if super::Parser::is_ident_token(t)) {
            self.bump().cloned()
        } else {
            None
        };

        let members = if self.cursor.eat_symbol("{") {
            let mut members = Vec::new();
            while !self.cursor.is_symbol("}") {
                let member_symbols = self.parse_symbol_definitions(scope, false)?;
                self.expect_symbol(";")?;
                for def in member_symbols {
                    members.push(self.arenas.symbols.alloc(def.symbol));
                }
            }
            self.expect_symbol("}")?;
            members
        } else {
            Vec::new()
        };

        if is_union {
            Ok(TypeKind::Union { name, members })
        } else {
            Ok(TypeKind::Struct { name, members })
        }
    }

    fn parse_enum(&mut self, scope: &'a Scope<'a>) -> Result<TypeKind<'a>, CompileError> {
        self.bump();
        let name = if matches!(self.peek(), Some(t) if super::Parser::is_ident_token(t)) {
            self.bump().cloned()
        } else {
            None
        };

        let mut members = Vec::new();
        if self.cursor.eat_symbol("{") {
            while !self.cursor.is_symbol("}") {
                let variant_name = self.expect_symbol_ident()?;
                let value = if self.cursor.eat_symbol("=") {
                    Some(self.parse_expr(scope)?)
                } else {
                    None
                };
                members.push(EnumVariant { name: variant_name, value });
                if !self.cursor.eat_symbol(",") {
                    break;
                }
            }
            self.expect_symbol("}")?;
        }
        Ok(TypeKind::Enum { name, members })
    }

    fn expect_symbol_ident(&mut self) -> Result<Token, CompileError> {
        match self.peek() {
            Some(t) if super::Parser::is_ident_token(t) => {
                let t = t.clone();
                self.bump();
                Ok(t)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    /// Wraps `base` with whatever pointer/array/function declarator syntax
    /// follows, returning the declared name (if any, `None` for abstract
    /// declarators used e.g. inside casts) and the fully wrapped type.
    pub(super) fn parse_declarator(&mut self, scope: &'a Scope<'a>, base: &'a Type<'a>) -> Result<(Option<Token>, &'a Type<'a>), CompileError> {
        let mut pointer_depth = 0usize;
        while self.cursor.eat_symbol("*") {
            pointer_depth += 1;
            self.cursor.eat_keyword("const");
        }

        let mut wrapped = base;
        for _ in 0..pointer_depth {
            wrapped = self.arenas.types.alloc(Type::new(TypeKind::Pointer(wrapped)));
        }

        let (name, direct) = self.parse_direct_declarator(scope, wrapped)?;
        Ok((name, direct))
    }

    fn parse_direct_declarator(&mut self, scope: &'a Scope<'a>, base: &'a Type<'a>) -> Result<(Option<Token>, &'a Type<'a>), CompileError> {
        let (name, mut current) = if self.cursor.eat_symbol("(") {
            let (name, inner_base) = self.parse_declarator(scope, base)?;
            self.expect_symbol(")")?;
            (name, inner_base)
        } else if matches!(self.peek(), Some(t) if super::Parser::is_ident_token(t)) {
            let tok = self.bump().cloned();
            (tok, base)
        } else {
            (None, base)
        };

        loop {
            if self.cursor.eat_symbol("[") {
                let len = if self.cursor.is_symbol("]") { None } else { Some(self.parse_expr(scope)?) };
                self.expect_symbol("]")?;
                current = self.arenas.types.alloc(Type::new(TypeKind::Array { base: current, len, is_static: false }));
            } else if self.cursor.eat_symbol("(") {
                let args = self.parse_param_list(scope)?;
                self.expect_symbol(")")?;
                current = self.arenas.types.alloc(Type::new(TypeKind::Function { args, ret: current }));
            } else {
                break;
            }
        }
        Ok((name, current))
    }

    fn parse_param_list(&mut self, scope: &'a Scope<'a>) -> Result<Vec<&'a Symbol<'a>>, CompileError> {
        let mut params = Vec::new();
        if self.cursor.is_symbol(")") {
            return Ok(params);
        }
        loop {
            if self.cursor.eat_symbol("...") {
                params.push(self.arenas.symbols.alloc(Symbol { name: None, kind: SymbolKind::Vararg, type_: None }));
                break;
            }
            if self.cursor.is_keyword("void") {
                // bare `(void)` parameter list: one keyword, no declarator, no params.
                let save = self.cursor.checkpoint();
                self.bump();
                if self.cursor.is_symbol(")") && params.is_empty() {
                    break;
                }
                self.cursor.restore(save);
            }
            let base = self.parse_decl_specifiers(scope)?;
            let (name, ty) = self.parse_declarator(scope, base)?;
            params.push(self.arenas.symbols.alloc(Symbol { name, kind: SymbolKind::Declaration, type_: Some(ty) }));
            if !self.cursor.eat_symbol(",") {
                break;
            }
        }
        Ok(params)
    }

    /// `sizeof(type)` / cast-expression lookahead: tries to parse an
    /// abstract type starting at the current position, rolling back on
    /// failure so callers can fall through to expression parsing.
    pub(super) fn try_parse_abstract_type(&mut self, scope: &'a Scope<'a>) -> Option<&'a Type<'a>> {
        let checkpoint = self.cursor.checkpoint();
        if !self.at_type_start(scope) {
            return None;
        }
        match self.parse_decl_specifiers(scope).and_then(|base| self.parse_declarator(scope, base)) {
            Ok((_, ty)) => Some(ty),
            Err(_) => {
                self.cursor.restore(checkpoint);
                None
            }
        }
    }

    pub(super) fn error_unexpected_eof(&self) -> CompileError {
        CompileError::Parse {
            file: self.file.clone(),
            line: 0,
            column: 0,
            kind: ParseError::UnexpectedToken { expected: "more input".to_string(), found: "<end of input>".to_string() },
        }
    }
}
