//! Conditional compilation, `#include`, and `#define` bookkeeping (spec §4.2).
//!
//! Grounded in `original_source/src/preprocessor/preprocessor.c`'s directive
//! dispatch loop and in `preprocessor.h`'s `PreprocessorIfStack` (whose
//! `inherited_doSkip`/`anyPathEvaluatedToTrue` fields this module actually
//! honors for nested conditionals — the original dispatch loop only
//! consults the innermost stack frame, which under-skips nested `#if`s
//! inside an already-false branch; this crate implements what the header
//! documents instead of that bug). Per spec.md Non-goals, `#define` bodies
//! are recorded but never re-substituted into the token stream.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::cursor::TokenCursor;
use crate::error::{CompileError, PreprocessorError};
use crate::lexer::Tokenizer;
use crate::source::SourceLoader;
use crate::token::{FileLabel, Token, TokenKind};

#[derive(Debug, Clone)]
pub struct Define {
    pub name: String,
    pub tokens: Vec<Token>,
}

enum FrameKind {
    If,
    ElseIf,
    Else,
}

struct Frame {
    kind: FrameKind,
    parent_active: bool,
    any_true: bool,
    active: bool,
}

pub struct Preprocessor<'l> {
    loader: &'l mut dyn SourceLoader,
    pub include_paths: Vec<PathBuf>,
    pub defines: Vec<Define>,
    already_included: HashSet<PathBuf>,
    stack: Vec<Frame>,
}

impl<'l> Preprocessor<'l> {
    pub fn new(loader: &'l mut dyn SourceLoader, include_paths: Vec<PathBuf>) -> Self {
        Preprocessor {
            loader,
            include_paths,
            defines: Vec::new(),
            already_included: HashSet::new(),
            stack: Vec::new(),
        }
    }

    pub fn with_defines(mut self, defines: impl IntoIterator<Item = (String, String)>) -> Self {
        for (name, value) in defines {
            let file: FileLabel = Rc::from("<command-line>");
            let tokens = if value.is_empty() {
                Vec::new()
            } else {
                Tokenizer::tokenize(file, value.as_bytes()).map(|t| t.tokens).unwrap_or_default()
            };
            self.defines.push(Define { name, tokens });
        }
        self
    }

    fn is_defined(&self, name: &str) -> bool {
        self.defines.iter().any(|d| d.name == name)
    }

    fn active(&self) -> bool {
        self.stack.last().map(|f| f.active).unwrap_or(true)
    }

    /// Runs the preprocessor over one file's tokens, recursing into
    /// `#include`d files, and returns the flattened output stream.
    pub fn run(&mut self, file: FileLabel, current_dir: Option<&Path>, tokens: &[Token]) -> Result<Vec<Token>, CompileError> {
        let mut out = Vec::new();
        let mut cur = TokenCursor::new(tokens);
        let base_depth = self.stack.len();

        while let Some(tok) = cur.peek().cloned() {
            if tok.kind == TokenKind::Symbol && &*tok.text == "#" {
                cur.next();
                self.directive(&file, current_dir, &mut cur, &mut out)?;
                continue;
            }
            cur.next();
            if self.active() {
                out.push(tok);
            }
        }

        if self.stack.len() != base_depth {
            return Err(CompileError::Preprocess {
                file,
                line: 0,
                column: 0,
                kind: PreprocessorError::UnterminatedIf,
            });
        }
        Ok(out)
    }

    fn directive(
        &mut self,
        file: &FileLabel,
        current_dir: Option<&Path>,
        cur: &mut TokenCursor,
        out: &mut Vec<Token>,
    ) -> Result<(), CompileError> {
        let directive_tok = cur.peek().cloned().ok_or_else(|| unexpected_eof(file))?;
        let name = directive_tok.text.to_string();

        match name.as_str() {
            "if" => {
                cur.next();
                let expr_tokens = collect_line(cur, directive_tok.line);
                let value = self.eval_tokens(file, &expr_tokens)?;
                let parent_active = self.active();
                self.stack.push(Frame { kind: FrameKind::If, parent_active, any_true: value, active: parent_active && value });
            }
            "elif" => {
                cur.next();
                let expr_tokens = collect_line(cur, directive_tok.line);
                let (parent_active, any_true_before) = match self.stack.last() {
                    Some(f) => (f.parent_active, f.any_true),
                    None => return Err(dangling(file, directive_tok.line, directive_tok.column, PreprocessorError::DanglingElif)),
                };
                let value = self.eval_tokens(file, &expr_tokens)?;
                let selected = !any_true_before && value;
                self.stack.push(Frame {
                    kind: FrameKind::ElseIf,
                    parent_active,
                    any_true: any_true_before || value,
                    active: parent_active && selected,
                });
            }
            "else" => {
                cur.next();
                let (parent_active, any_true_before) = match self.stack.last() {
                    Some(f) => (f.parent_active, f.any_true),
                    None => return Err(dangling(file, directive_tok.line, directive_tok.column, PreprocessorError::DanglingElse)),
                };
                let selected = !any_true_before;
                self.stack.push(Frame { kind: FrameKind::Else, parent_active, any_true: true, active: parent_active && selected });
            }
            "endif" => {
                cur.next();
                if self.stack.is_empty() {
                    return Err(dangling(file, directive_tok.line, directive_tok.column, PreprocessorError::DanglingEndif));
                }
                while let Some(frame) = self.stack.pop() {
                    if matches!(frame.kind, FrameKind::If) {
                        break;
                    }
                }
            }
            "ifdef" | "ifndef" => {
                cur.next();
                let name_tok = cur.next().cloned().ok_or_else(|| unexpected_eof(file))?;
                let defined = self.is_defined(&name_tok.text);
                let value = if name == "ifdef" { defined } else { !defined };
                let parent_active = self.active();
                self.stack.push(Frame { kind: FrameKind::If, parent_active, any_true: value, active: parent_active && value });
            }
            "include" => {
                cur.next();
                self.process_include(file, current_dir, cur, out)?;
            }
            "define" => {
                cur.next();
                self.process_define(cur, directive_tok.line);
            }
            "undef" => {
                cur.next();
                let name_tok = cur.next().cloned().ok_or_else(|| unexpected_eof(file))?;
                self.defines.retain(|d| d.name != &*name_tok.text);
            }
            "pragma" => {
                cur.next();
                if cur.is_symbol("once") || cur.is_keyword("once") {
                    cur.next();
                    if let Some(path) = current_dir.map(|d| d.join(&**file)).or_else(|| Some(PathBuf::from(&**file))) {
                        self.already_included.insert(path);
                    }
                } else {
                    let _ = collect_line(cur, directive_tok.line);
                }
            }
            other => {
                return Err(dangling(
                    file,
                    directive_tok.line,
                    directive_tok.column,
                    PreprocessorError::UnknownDirective(other.to_string()),
                ));
            }
        }
        Ok(())
    }

    fn process_define(&mut self, cur: &mut TokenCursor, directive_line: u32) {
        let Some(name_tok) = cur.next().cloned() else { return };
        let body = collect_line(cur, name_tok.line.max(directive_line));
        self.defines.push(Define { name: name_tok.text.to_string(), tokens: body });
    }

    fn process_include(
        &mut self,
        file: &FileLabel,
        current_dir: Option<&Path>,
        cur: &mut TokenCursor,
        out: &mut Vec<Token>,
    ) -> Result<(), CompileError> {
        let arg = cur.next().cloned().ok_or_else(|| unexpected_eof(file))?;
        let (is_local, name) = match arg.kind {
            TokenKind::PrepIncludeArgument => (false, arg.text[1..arg.text.len() - 1].to_string()),
            TokenKind::LiteralString => (true, arg.text[1..arg.text.len() - 1].to_string()),
            _ => {
                return Err(CompileError::Preprocess {
                    file: file.clone(),
                    line: arg.line,
                    column: arg.column,
                    kind: PreprocessorError::MalformedExpression("expected include argument".to_string()),
                });
            }
        };

        let source = if is_local {
            self.loader.resolve_local(current_dir, &name, &self.include_paths)
        } else {
            self.loader.resolve_system(&name, &self.include_paths)
        }
        .map_err(|_| CompileError::Preprocess {
            file: file.clone(),
            line: arg.line,
            column: arg.column,
            kind: PreprocessorError::IncludeNotFound(name.clone()),
        })?;

        if let Some(path) = &source.path {
            if self.already_included.contains(path) {
                return Ok(());
            }
        }

        let tokenizer = Tokenizer::tokenize(source.label.clone(), &source.bytes)?;
        let child_dir = source.path.as_deref().and_then(Path::parent).map(Path::to_path_buf);
        let nested = self.run(source.label, child_dir.as_deref(), &tokenizer.tokens)?;
        out.extend(nested);
        Ok(())
    }

    fn eval_tokens(&self, file: &FileLabel, tokens: &[Token]) -> Result<bool, CompileError> {
        if tokens.is_empty() {
            return Ok(false);
        }
        let mut p = ExprParser { preprocessor: self, file, tokens, pos: 0 };
        let value = p.parse_or()?;
        Ok(value != 0)
    }
}

fn unexpected_eof(file: &FileLabel) -> CompileError {
    CompileError::Preprocess {
        file: file.clone(),
        line: 0,
        column: 0,
        kind: PreprocessorError::MalformedExpression("unexpected end of input".to_string()),
    }
}

fn dangling(file: &FileLabel, line: u32, column: u32, kind: PreprocessorError) -> CompileError {
    CompileError::Preprocess { file: file.clone(), line, column, kind }
}

fn collect_line(cur: &mut TokenCursor, line: u32) -> Vec<Token> {
    let mut out = Vec::new();
    let mut line_num = line;
    while let Some(tok) = cur.peek() {
        if tok.line != line_num {
            break;
        }
        let tok = tok.clone();
        cur.next();
        if tok.kind == TokenKind::Symbol && &*tok.text == "\\" {
            if let Some(next) = cur.peek() {
                line_num = next.line;
            }
            continue;
        }
        out.push(tok);
    }
    out
}

/// Precedence-climbing evaluator for `#if`/`#elif` expressions:
/// `defined`, `!`, `&&`, `||`, comparisons, `+ - * / %`, parens, integer
/// literals and bare identifiers (0 unless present in `defines`).
struct ExprParser<'p, 'l, 'a> {
    preprocessor: &'p Preprocessor<'l>,
    file: &'a FileLabel,
    tokens: &'a [Token],
    pos: usize,
}

impl<'p, 'l, 'a> ExprParser<'p, 'l, 'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<&'a Token> {
        let t = self.tokens.get(self.pos);
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn is(&self, lexeme: &str) -> bool {
        matches!(self.peek(), Some(t) if &*t.text == lexeme)
    }

    fn eat(&mut self, lexeme: &str) -> bool {
        if self.is(lexeme) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn malformed(&self) -> CompileError {
        let (line, column) = self.peek().map(|t| (t.line, t.column)).unwrap_or((0, 0));
        CompileError::Preprocess {
            file: self.file.clone(),
            line,
            column,
            kind: PreprocessorError::MalformedExpression("unexpected token in #if expression".to_string()),
        }
    }

    fn parse_or(&mut self) -> Result<i64, CompileError> {
        let mut lhs = self.parse_and()?;
        while self.eat("||") {
            let rhs = self.parse_and()?;
            lhs = ((lhs != 0) || (rhs != 0)) as i64;
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<i64, CompileError> {
        let mut lhs = self.parse_equality()?;
        while self.eat("&&") {
            let rhs = self.parse_equality()?;
            lhs = ((lhs != 0) && (rhs != 0)) as i64;
        }
        Ok(lhs)
    }

    fn parse_equality(&mut self) -> Result<i64, CompileError> {
        let mut lhs = self.parse_relational()?;
        loop {
            if self.eat("==") {
                lhs = (lhs == self.parse_relational()?) as i64;
            } else if self.eat("!=") {
                lhs = (lhs != self.parse_relational()?) as i64;
            } else {
                break;
            }
        }
        Ok(lhs)
    }

    fn parse_relational(&mut self) -> Result<i64, CompileError> {
        let mut lhs = self.parse_additive()?;
        loop {
            if self.eat("<=") {
                lhs = (lhs <= self.parse_additive()?) as i64;
            } else if self.eat(">=") {
                lhs = (lhs >= self.parse_additive()?) as i64;
            } else if self.eat("<") {
                lhs = (lhs < self.parse_additive()?) as i64;
            } else if self.eat(">") {
                lhs = (lhs > self.parse_additive()?) as i64;
            } else {
                break;
            }
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> Result<i64, CompileError> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            if self.eat("+") {
                lhs += self.parse_multiplicative()?;
            } else if self.eat("-") {
                lhs -= self.parse_multiplicative()?;
            } else {
                break;
            }
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<i64, CompileError> {
        let mut lhs = self.parse_unary()?;
        loop {
            if self.eat("*") {
                lhs *= self.parse_unary()?;
            } else if self.eat("/") {
                let rhs = self.parse_unary()?;
                lhs = if rhs == 0 { 0 } else { lhs / rhs };
            } else if self.eat("%") {
                let rhs = self.parse_unary()?;
                lhs = if rhs == 0 { 0 } else { lhs % rhs };
            } else {
                break;
            }
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<i64, CompileError> {
        if self.eat("!") {
            return Ok((self.parse_unary()? == 0) as i64);
        }
        if self.eat("-") {
            return Ok(-self.parse_unary()?);
        }
        if self.eat("+") {
            return self.parse_unary();
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<i64, CompileError> {
        if self.is("defined") {
            self.bump();
            let parenthesized = self.eat("(");
            let name_tok = self.bump().ok_or_else(|| self.malformed())?;
            let name = name_tok.text.to_string();
            if parenthesized && !self.eat(")") {
                return Err(self.malformed());
            }
            return Ok(self.preprocessor.is_defined(&name) as i64);
        }
        if self.eat("(") {
            let value = self.parse_or()?;
            if !self.eat(")") {
                return Err(self.malformed());
            }
            return Ok(value);
        }
        let tok = self.bump().ok_or_else(|| self.malformed())?;
        if tok.kind == TokenKind::LiteralInteger {
            let digits: String = tok.text.chars().take_while(|c| c.is_ascii_hexdigit() || *c == 'x' || *c == 'X').collect();
            let parsed = if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
                i64::from_str_radix(hex, 16).unwrap_or(0)
            } else {
                digits.trim_start_matches('0').parse::<i64>().unwrap_or(if digits.is_empty() || digits.chars().all(|c| c == '0') { 0 } else { 0 })
            };
            return Ok(parsed);
        }
        if tok.kind == TokenKind::Symbol {
            return Ok(self.preprocessor.is_defined(&tok.text) as i64);
        }
        Err(self.malformed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::FsSourceLoader;

    fn preprocess(src: &str, defines: &[(&str, &str)]) -> Vec<Token> {
        let file: FileLabel = Rc::from("<test>");
        let tokenizer = Tokenizer::tokenize(file.clone(), src.as_bytes()).unwrap();
        let mut loader = FsSourceLoader;
        let owned: Vec<(String, String)> = defines.iter().map(|(n, v)| (n.to_string(), v.to_string())).collect();
        let mut pp = Preprocessor::new(&mut loader, Vec::new()).with_defines(owned);
        pp.run(file, None, &tokenizer.tokens).unwrap()
    }

    fn texts(tokens: &[Token]) -> Vec<String> {
        tokens.iter().map(|t| t.text.to_string()).collect()
    }

    #[test]
    fn simple_if_true_keeps_body() {
        let out = preprocess("#if 1\nint x;\n#endif\n", &[]);
        assert_eq!(texts(&out), vec!["int", "x", ";"]);
    }

    #[test]
    fn simple_if_false_drops_body() {
        let out = preprocess("#if 0\nint x;\n#endif\nint y;\n", &[]);
        assert_eq!(texts(&out), vec!["int", "y", ";"]);
    }

    #[test]
    fn else_branch_taken_when_if_false() {
        let out = preprocess("#if 0\nint x;\n#else\nint y;\n#endif\n", &[]);
        assert_eq!(texts(&out), vec!["int", "y", ";"]);
    }

    #[test]
    fn elif_chain_picks_first_true() {
        let out = preprocess("#if 0\na;\n#elif 0\nb;\n#elif 1\nc;\n#else\nd;\n#endif\n", &[]);
        assert_eq!(texts(&out), vec!["c", ";"]);
    }

    #[test]
    fn defined_reflects_define_table() {
        let out = preprocess("#if defined(FOO)\nint x;\n#endif\n", &[("FOO", "1")]);
        assert_eq!(texts(&out), vec!["int", "x", ";"]);
        let absent = preprocess("#if defined(BAR)\nint x;\n#endif\n", &[("FOO", "1")]);
        assert!(absent.is_empty());
    }

    #[test]
    fn ifdef_and_ifndef() {
        let out = preprocess("#ifdef FOO\na;\n#endif\n#ifndef FOO\nb;\n#endif\n", &[("FOO", "")]);
        assert_eq!(texts(&out), vec!["a", ";"]);
    }

    #[test]
    fn nested_if_inherits_parent_skip() {
        let out = preprocess("#if 0\n#if 1\nint x;\n#endif\n#endif\nint y;\n", &[]);
        assert_eq!(texts(&out), vec!["int", "y", ";"]);
    }

    #[test]
    fn logical_and_or_operators() {
        let out = preprocess("#if 1 && 0\na;\n#endif\n#if 1 || 0\nb;\n#endif\n", &[]);
        assert_eq!(texts(&out), vec!["b", ";"]);
    }

    #[test]
    fn comparison_and_arithmetic() {
        let out = preprocess("#if 2 + 3 == 5\na;\n#endif\n#if 1 > 2\nb;\n#endif\n", &[]);
        assert_eq!(texts(&out), vec!["a", ";"]);
    }

    #[test]
    fn define_directive_is_recorded_without_substitution() {
        let file: FileLabel = Rc::from("<test>");
        let tokenizer = Tokenizer::tokenize(file.clone(), b"#define FOO 42\nFOO;\n").unwrap();
        let mut loader = FsSourceLoader;
        let mut pp = Preprocessor::new(&mut loader, Vec::new());
        let out = pp.run(file, None, &tokenizer.tokens).unwrap();
        assert_eq!(texts(&out), vec!["FOO", ";"]);
        assert_eq!(pp.defines.len(), 1);
        assert_eq!(pp.defines[0].name, "FOO");
        assert_eq!(pp.defines[0].tokens.len(), 1);
    }

    #[test]
    fn undef_removes_define() {
        let file: FileLabel = Rc::from("<test>");
        let tokenizer = Tokenizer::tokenize(file.clone(), b"#define FOO\n#undef FOO\n#ifdef FOO\na;\n#endif\nb;\n").unwrap();
        let mut loader = FsSourceLoader;
        let mut pp = Preprocessor::new(&mut loader, Vec::new());
        let out = pp.run(file, None, &tokenizer.tokens).unwrap();
        assert_eq!(texts(&out), vec!["b", ";"]);
    }

    #[test]
    fn elif_without_if_is_fatal() {
        let file: FileLabel = Rc::from("<test>");
        let tokenizer = Tokenizer::tokenize(file.clone(), b"#elif 1\nint x;\n").unwrap();
        let mut loader = FsSourceLoader;
        let mut pp = Preprocessor::new(&mut loader, Vec::new());
        assert!(pp.run(file, None, &tokenizer.tokens).is_err());
    }

    #[test]
    fn unterminated_if_is_fatal() {
        let file: FileLabel = Rc::from("<test>");
        let tokenizer = Tokenizer::tokenize(file.clone(), b"#if 1\nint x;\n").unwrap();
        let mut loader = FsSourceLoader;
        let mut pp = Preprocessor::new(&mut loader, Vec::new());
        assert!(pp.run(file, None, &tokenizer.tokens).is_err());
    }

    #[test]
    fn include_splices_tokens_from_local_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("inc.h"), "int included;\n").unwrap();
        let main_path = dir.path().join("main.c");
        std::fs::write(&main_path, "#include \"inc.h\"\nint x;\n").unwrap();

        let mut loader = FsSourceLoader;
        let bytes = std::fs::read(&main_path).unwrap();
        let file: FileLabel = Rc::from(main_path.to_string_lossy().as_ref());
        let tokenizer = Tokenizer::tokenize(file.clone(), &bytes).unwrap();
        let mut pp = Preprocessor::new(&mut loader, Vec::new());
        let out = pp.run(file, Some(dir.path()), &tokenizer.tokens).unwrap();
        assert_eq!(texts(&out), vec!["int", "included", ";", "int", "x", ";"]);
    }
}
