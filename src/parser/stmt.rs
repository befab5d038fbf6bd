//! Statement dispatch and the top-level declaration driver (spec §4.4),
//! grounded in `original_source/src/parser/statement.c`'s per-keyword
//! dispatch switch.

use super::Parser;
use crate::error::CompileError;
use crate::scope::Scope;
use crate::statement::{GotoTarget, Statement};
use crate::symbol::{Symbol, SymbolKind};
use crate::token::TokenKind;

impl<'a, 't> Parser<'a, 't> {
    /// A top-level item is either a function definition (declarator
    /// followed by `{`) or a plain declaration (`;`-terminated). Both share
    /// the same declaration-specifier + declarator parse; only the
    /// terminator decides which shape results.
    pub(super) fn parse_top_level(&mut self, scope: &'a Scope<'a>) -> Result<Option<Statement<'a>>, CompileError> {
        if self.cursor.eat_symbol(";") {
            return Ok(None);
        }
        if self.cursor.eat_keyword("typedef") {
            let symbols = self.parse_typedef_list(scope)?;
            self.expect_symbol(";")?;
            return Ok(Some(Statement::Typedef(symbols)));
        }

        let base = self.parse_decl_specifiers(scope)?;
        let (name, ty) = self.parse_declarator(scope, base)?;

        if self.cursor.is_symbol("{") {
            let fn_symbol = Symbol { name, kind: SymbolKind::Declaration, type_: Some(ty) };
            scope.add_symbol(self.arenas.symbols.alloc(Symbol { name: fn_symbol.name.clone(), kind: fn_symbol.kind, type_: fn_symbol.type_ }));
            let fn_scope = self.new_scope(Some(scope));
            self.register_params(fn_scope, ty);
            self.parse_block_into(fn_scope)?;
            return Ok(Some(Statement::FunctionDefinition { symbol: fn_symbol, body: fn_scope }));
        }

        let initializer = if self.cursor.eat_symbol("=") { Some(self.parse_assignment_expr(scope)?) } else { None };
        let mut defs = vec![crate::symbol::SymbolDefinition { symbol: Symbol { name, kind: SymbolKind::Declaration, type_: Some(ty) }, initializer }];
        scope.ingest_symbol_type(ty, &self.arenas.types, &self.arenas.symbols);
        scope.add_symbol(self.arenas.symbols.alloc(Symbol { name: defs[0].symbol.name.clone(), kind: SymbolKind::Declaration, type_: defs[0].symbol.type_ }));
        while self.cursor.eat_symbol(",") {
            let (name, ty) = self.parse_declarator(scope, base)?;
            let initializer = if self.cursor.eat_symbol("=") { Some(self.parse_assignment_expr(scope)?) } else { None };
            scope.ingest_symbol_type(ty, &self.arenas.types, &self.arenas.symbols);
            scope.add_symbol(self.arenas.symbols.alloc(Symbol { name: name.clone(), kind: SymbolKind::Declaration, type_: Some(ty) }));
            defs.push(crate::symbol::SymbolDefinition { symbol: Symbol { name, kind: SymbolKind::Declaration, type_: Some(ty) }, initializer });
        }
        self.expect_symbol(";")?;
        Ok(Some(Statement::SymbolDefinition(defs)))
    }

    fn register_params(&mut self, fn_scope: &'a Scope<'a>, fn_type: &'a crate::types::Type<'a>) {
        if let crate::types::TypeKind::Function { args, .. } = &fn_type.kind {
            for arg in args {
                fn_scope.add_symbol(arg);
            }
        }
    }

    fn parse_block_into(&mut self, scope: &'a Scope<'a>) -> Result<(), CompileError> {
        self.expect_symbol("{")?;
        while !self.cursor.is_symbol("}") {
            let stmt = self.parse_statement(scope)?;
            scope.add_statement(self.arenas.statements.alloc(stmt));
        }
        self.expect_symbol("}")?;
        Ok(())
    }

    pub(super) fn parse_statement(&mut self, scope: &'a Scope<'a>) -> Result<Statement<'a>, CompileError> {
        if self.cursor.eat_symbol(";") {
            return Ok(Statement::Empty);
        }
        if self.cursor.is_symbol("{") {
            let child = self.new_scope(Some(scope));
            self.parse_block_into(child)?;
            return Ok(Statement::Block(child));
        }
        if self.cursor.eat_keyword("return") {
            let value = if self.cursor.is_symbol(";") { None } else { Some(self.parse_expr(scope)?) };
            self.expect_symbol(";")?;
            return Ok(Statement::Return(value));
        }
        if self.cursor.eat_keyword("break") {
            self.expect_symbol(";")?;
            return Ok(Statement::Break);
        }
        if self.cursor.eat_keyword("continue") {
            self.expect_symbol(";")?;
            return Ok(Statement::Continue);
        }
        if self.cursor.eat_keyword("default") {
            self.expect_symbol(":")?;
            return Ok(Statement::Default);
        }
        if self.cursor.eat_keyword("case") {
            let value = self.parse_expr(scope)?;
            self.expect_symbol(":")?;
            return Ok(Statement::SwitchCase(value));
        }
        if self.cursor.eat_keyword("goto") {
            let target = if self.cursor.eat_symbol("*") {
                GotoTarget::Computed(self.parse_expr(scope)?)
            } else {
                GotoTarget::Label(self.expect_label_ident()?)
            };
            self.expect_symbol(";")?;
            return Ok(Statement::Goto(target));
        }
        if self.cursor.eat_keyword("typedef") {
            let symbols = self.parse_typedef_list(scope)?;
            self.expect_symbol(";")?;
            return Ok(Statement::Typedef(symbols));
        }
        if self.cursor.eat_keyword("if") {
            return self.parse_if(scope);
        }
        if self.cursor.eat_keyword("while") {
            return self.parse_while(scope);
        }
        if self.cursor.eat_keyword("do") {
            return self.parse_do_while(scope);
        }
        if self.cursor.eat_keyword("for") {
            return self.parse_for(scope);
        }
        if self.cursor.eat_keyword("switch") {
            return self.parse_switch(scope);
        }

        // `label:` — a bare identifier immediately followed by `:` (and not
        // `::`, which this grammar doesn't have, or `?:`'s `:`, which only
        // ever appears after an already-consumed `?`).
        if matches!(self.peek(), Some(t) if Self::is_ident_token(t)) && matches!(self.cursor.peek_nth(1), Some(t) if t.kind == TokenKind::Symbol && &*t.text == ":") {
            let label = self.expect_label_ident()?;
            self.expect_symbol(":")?;
            return Ok(Statement::Label(label));
        }

        if self.at_type_start(scope) {
            let checkpoint = self.cursor.checkpoint();
            match self.parse_symbol_definitions(scope, true) {
                Ok(defs) => {
                    self.expect_symbol(";")?;
                    for def in &defs {
                        if let Some(ty) = def.symbol.type_ {
                            scope.ingest_symbol_type(ty, &self.arenas.types, &self.arenas.symbols);
                        }
                    }
                    return Ok(Statement::SymbolDefinition(defs));
                }
                Err(_) => self.cursor.restore(checkpoint),
            }
        }

        let value = self.parse_expr(scope)?;
        self.expect_symbol(";")?;
        Ok(Statement::Value(value))
    }

    fn expect_label_ident(&mut self) -> Result<crate::token::Token, CompileError> {
        match self.peek() {
            Some(t) if Self::is_ident_token(t) => {
                let t = t.clone();
                self.bump();
                Ok(t)
            }
            _ => Err(self.unexpected("label")),
        }
    }

    fn parse_if(&mut self, scope: &'a Scope<'a>) -> Result<Statement<'a>, CompileError> {
        self.expect_symbol("(")?;
        let condition = self.parse_expr(scope)?;
        self.expect_symbol(")")?;
        let body = self.arenas.statements.alloc(self.parse_statement(scope)?);
        let else_body = if self.cursor.eat_keyword("else") {
            Some(self.arenas.statements.alloc(self.parse_statement(scope)?))
        } else {
            None
        };
        Ok(Statement::If { condition, body, else_body })
    }

    fn parse_while(&mut self, scope: &'a Scope<'a>) -> Result<Statement<'a>, CompileError> {
        self.expect_symbol("(")?;
        let condition = self.parse_expr(scope)?;
        self.expect_symbol(")")?;
        let body = self.arenas.statements.alloc(self.parse_statement(scope)?);
        Ok(Statement::While { condition, body, do_while: false })
    }

    fn parse_do_while(&mut self, scope: &'a Scope<'a>) -> Result<Statement<'a>, CompileError> {
        let body = self.arenas.statements.alloc(self.parse_statement(scope)?);
        self.expect_keyword("while")?;
        self.expect_symbol("(")?;
        let condition = self.parse_expr(scope)?;
        self.expect_symbol(")")?;
        self.expect_symbol(";")?;
        Ok(Statement::While { condition, body, do_while: true })
    }

    fn parse_for(&mut self, scope: &'a Scope<'a>) -> Result<Statement<'a>, CompileError> {
        self.expect_symbol("(")?;
        let for_scope = self.new_scope(Some(scope));

        let init = if self.cursor.is_symbol(";") {
            None
        } else if self.at_type_start(for_scope) {
            let defs = self.parse_symbol_definitions(for_scope, true)?;
            for def in &defs {
                if let Some(ty) = def.symbol.type_ {
                    for_scope.ingest_symbol_type(ty, &self.arenas.types, &self.arenas.symbols);
                }
            }
            Some(self.arenas.statements.alloc(Statement::SymbolDefinition(defs)))
        } else {
            let value = self.parse_expr(for_scope)?;
            Some(self.arenas.statements.alloc(Statement::Value(value)))
        };
        self.expect_symbol(";")?;

        let condition = if self.cursor.is_symbol(";") { None } else { Some(self.parse_expr(for_scope)?) };
        self.expect_symbol(";")?;

        let step = if self.cursor.is_symbol(")") { None } else { Some(self.parse_expr(for_scope)?) };
        self.expect_symbol(")")?;

        let body = self.parse_statement(for_scope)?;
        for_scope.add_statement(self.arenas.statements.alloc(body));

        Ok(Statement::For { init, condition, step, scope: for_scope })
    }

    fn parse_switch(&mut self, scope: &'a Scope<'a>) -> Result<Statement<'a>, CompileError> {
        self.expect_symbol("(")?;
        let condition = self.parse_expr(scope)?;
        self.expect_symbol(")")?;
        self.expect_symbol("{")?;
        let mut body = Vec::new();
        while !self.cursor.is_symbol("}") {
            body.push(self.arenas.statements.alloc(self.parse_statement(scope)?));
        }
        self.expect_symbol("}")?;
        Ok(Statement::Switch { condition, body })
    }
}
