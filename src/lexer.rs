//! Byte-stream tokenizer (spec §4.1).
//!
//! Grounded in the teacher's two-stage `LineLexer`/word-classification split:
//! stage A below (`Scanner`) produces raw lexemes with provenance; stage B
//! (`classify`) resolves keywords/symbols, fuses multi-character operators,
//! and splices in comments and `#include` arguments.

use std::rc::Rc;

use crate::error::{CompileError, LexError};
use crate::token::{FileLabel, Literal, NumericLiteralInfo, Token, TokenKind, is_keyword_lexeme};

const DELIMITERS: &[u8] = b"()[]{},;.:-+*~#'\"/!?%&=<>|";

fn is_delimiter(b: u8) -> bool {
    DELIMITERS.contains(&b)
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_digit_in_base(b: u8, base: u8) -> bool {
    match base {
        2 => b == b'0' || b == b'1',
        8 => (b'0'..=b'7').contains(&b),
        16 => b.is_ascii_hexdigit(),
        _ => b.is_ascii_digit(),
    }
}

fn is_suffix_byte(b: u8) -> bool {
    matches!(b, b'f' | b'F' | b'u' | b'U' | b'l' | b'L')
}

/// One raw lexeme before keyword/operator-fusion classification.
struct Raw {
    kind: TokenKind,
    text: String,
    line: u32,
    column: u32,
    literal: Option<Literal>,
}

/// Stage A: a byte-at-a-time cursor with spec's column/line bookkeeping
/// (tab width 1, deliberately; CR advances column without resetting line).
struct Scanner<'b> {
    bytes: &'b [u8],
    pos: usize,
    line: u32,
    column: u32,
    at_line_start: bool,
}

impl<'b> Scanner<'b> {
    fn new(bytes: &'b [u8]) -> Self {
        Scanner { bytes, pos: 0, line: 1, column: 1, at_line_start: true }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        match b {
            b' ' | b'\t' => self.column += 1,
            b'\r' => self.column += 1,
            b'\n' => {
                self.line += 1;
                self.column = 1;
            }
            _ => self.column += 1,
        }
        Some(b)
    }

    fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            match b {
                b' ' | b'\t' | b'\r' => {
                    self.advance();
                }
                b'\n' => {
                    self.advance();
                    self.at_line_start = true;
                }
                _ => break,
            }
        }
    }
}

pub struct Tokenizer {
    pub tokens: Vec<Token>,
}

impl Tokenizer {
    pub fn tokenize(file: FileLabel, bytes: &[u8]) -> Result<Tokenizer, CompileError> {
        let raws = scan(file.clone(), bytes)?;
        let tokens = classify(file, raws)?;
        Ok(Tokenizer { tokens })
    }
}

fn err(file: &FileLabel, line: u32, column: u32, kind: LexError) -> CompileError {
    CompileError::Lex { file: file.clone(), line, column, kind }
}

fn scan(file: FileLabel, bytes: &[u8]) -> Result<Vec<Raw>, CompileError> {
    let mut s = Scanner::new(bytes);
    let mut out = Vec::new();
    // Tracks whether the previous two emitted raws were `#` then `include`,
    // both starting their own line-logical directive, to splice in the
    // angle-bracket include argument.
    let mut awaiting_include_path = false;
    let mut saw_hash_include = false;

    loop {
        s.skip_whitespace();
        let Some(b) = s.peek() else { break };
        let (line, column) = (s.line, s.column);
        let line_start = s.at_line_start;
        s.at_line_start = false;

        if b == b'"' {
            let text = scan_string(&mut s, &file)?;
            out.push(Raw { kind: TokenKind::LiteralString, text: text.clone(), line, column, literal: Some(Literal::Str(text.into_bytes())) });
            awaiting_include_path = false;
            continue;
        }
        if b == b'\'' {
            let text = scan_char(&mut s, &file)?;
            out.push(Raw { kind: TokenKind::LiteralChar, text, line, column, literal: None });
            awaiting_include_path = false;
            continue;
        }
        if b == b'/' {
            if let Some(comment) = try_scan_comment(&mut s, &file)? {
                out.push(Raw { kind: TokenKind::Comment, text: comment, line, column, literal: None });
                continue;
            }
            s.advance();
            out.push(Raw { kind: TokenKind::Symbol, text: "/".to_string(), line, column, literal: None });
            awaiting_include_path = false;
            continue;
        }
        if b == b'<' && awaiting_include_path {
            let text = scan_include_argument(&mut s, &file)?;
            out.push(Raw { kind: TokenKind::PrepIncludeArgument, text, line, column, literal: None });
            awaiting_include_path = false;
            continue;
        }
        if b.is_ascii_digit() || (b == b'.' && matches!(s.peek_at(1), Some(d) if d.is_ascii_digit())) {
            let (text, info) = scan_number(&mut s, &file)?;
            let kind = if info.has_decimal_point || info.has_exponent { TokenKind::LiteralFloat } else { TokenKind::LiteralInteger };
            out.push(Raw { kind, text, line, column, literal: Some(Literal::Numeric(info)) });
            awaiting_include_path = false;
            continue;
        }
        if is_word_byte(b) {
            let start = s.pos;
            while matches!(s.peek(), Some(c) if is_word_byte(c)) {
                s.advance();
            }
            let text = String::from_utf8_lossy(&s.bytes[start..s.pos]).into_owned();
            let is_include_word = saw_hash_include && text == "include";
            out.push(Raw { kind: TokenKind::Symbol, text: text.clone(), line, column, literal: None });
            saw_hash_include = false;
            awaiting_include_path = is_include_word;
            continue;
        }
        if is_delimiter(b) {
            s.advance();
            out.push(Raw { kind: TokenKind::Symbol, text: (b as char).to_string(), line, column, literal: None });
            saw_hash_include = b == b'#' && line_start;
            awaiting_include_path = false;
            continue;
        }
        return Err(err(&file, line, column, LexError::UnrecognizedByte(b)));
    }

    Ok(out)
}

fn scan_string(s: &mut Scanner, file: &FileLabel) -> Result<String, CompileError> {
    let (line, column) = (s.line, s.column);
    let start = s.pos;
    s.advance(); // opening quote
    loop {
        match s.peek() {
            None => return Err(err(file, line, column, LexError::UnterminatedString)),
            Some(b'\\') => {
                s.advance();
                if s.peek().is_some() {
                    s.advance();
                }
            }
            Some(b'"') => {
                s.advance();
                break;
            }
            Some(_) => {
                s.advance();
            }
        }
    }
    Ok(String::from_utf8_lossy(&s.bytes[start..s.pos]).into_owned())
}

fn scan_char(s: &mut Scanner, file: &FileLabel) -> Result<String, CompileError> {
    let (line, column) = (s.line, s.column);
    let start = s.pos;
    s.advance(); // opening quote
    loop {
        match s.peek() {
            None => return Err(err(file, line, column, LexError::UnterminatedChar)),
            Some(b'\\') => {
                s.advance();
                if s.peek().is_some() {
                    s.advance();
                }
            }
            Some(b'\'') => {
                s.advance();
                break;
            }
            Some(_) => {
                s.advance();
            }
        }
    }
    Ok(String::from_utf8_lossy(&s.bytes[start..s.pos]).into_owned())
}

fn try_scan_comment(s: &mut Scanner, file: &FileLabel) -> Result<Option<String>, CompileError> {
    let (line, column) = (s.line, s.column);
    match s.peek_at(1) {
        Some(b'/') => {
            let start = s.pos;
            while matches!(s.peek(), Some(c) if c != b'\n') {
                s.advance();
            }
            Ok(Some(String::from_utf8_lossy(&s.bytes[start..s.pos]).into_owned()))
        }
        Some(b'*') => {
            let start = s.pos;
            s.advance();
            s.advance();
            loop {
                match (s.peek(), s.peek_at(1)) {
                    (None, _) => return Err(err(file, line, column, LexError::UnterminatedComment)),
                    (Some(b'*'), Some(b'/')) => {
                        s.advance();
                        s.advance();
                        break;
                    }
                    _ => {
                        s.advance();
                    }
                }
            }
            Ok(Some(String::from_utf8_lossy(&s.bytes[start..s.pos]).into_owned()))
        }
        _ => Ok(None),
    }
}

fn scan_include_argument(s: &mut Scanner, file: &FileLabel) -> Result<String, CompileError> {
    let (line, column) = (s.line, s.column);
    let start = s.pos;
    s.advance(); // '<'
    loop {
        match s.peek() {
            None | Some(b'\n') => return Err(err(file, line, column, LexError::UnterminatedIncludeArgument)),
            Some(b'>') => {
                s.advance();
                break;
            }
            Some(_) => {
                s.advance();
            }
        }
    }
    Ok(String::from_utf8_lossy(&s.bytes[start..s.pos]).into_owned())
}

fn scan_number(s: &mut Scanner, file: &FileLabel) -> Result<(String, NumericLiteralInfo), CompileError> {
    let start = s.pos;
    let mut info = NumericLiteralInfo { base: 10, ..Default::default() };

    if s.peek() == Some(b'0') && matches!(s.peek_at(1), Some(b'x') | Some(b'X')) {
        info.has_prefix = true;
        info.base = 16;
        s.advance();
        s.advance();
    } else if s.peek() == Some(b'0') && matches!(s.peek_at(1), Some(b'b') | Some(b'B')) {
        info.has_prefix = true;
        info.base = 2;
        s.advance();
        s.advance();
    } else if s.peek() == Some(b'0') && !matches!(s.peek_at(1), Some(b'.')) {
        info.has_prefix = true;
        info.base = 8;
    }

    while matches!(s.peek(), Some(b) if is_digit_in_base(b, info.base)) {
        info.has_leading_digits = true;
        s.advance();
    }

    if s.peek() == Some(b'.') {
        info.has_decimal_point = true;
        s.advance();
        while matches!(s.peek(), Some(b) if b.is_ascii_digit()) {
            info.has_trailing_digits = true;
            s.advance();
        }
    }

    if matches!(s.peek(), Some(b'e') | Some(b'E')) {
        let exp_line = s.line;
        let exp_col = s.column;
        s.advance();
        info.has_exponent = true;
        if matches!(s.peek(), Some(b'+') | Some(b'-')) {
            info.has_exponent_sign = true;
            s.advance();
        }
        let digits_start = s.pos;
        while matches!(s.peek(), Some(b) if b.is_ascii_digit()) {
            s.advance();
        }
        if s.pos == digits_start {
            return Err(err(file, exp_line, exp_col, LexError::MalformedNumericExponent));
        }
        info.has_exponent_digits = true;
    }

    while matches!(s.peek(), Some(b) if is_suffix_byte(b)) {
        info.has_suffix = true;
        s.advance();
    }

    let text = String::from_utf8_lossy(&s.bytes[start..s.pos]).into_owned();
    Ok((text, info))
}

fn classify(file: FileLabel, raws: Vec<Raw>) -> Result<Vec<Token>, CompileError> {
    // Pre-classify each raw into a Token, then fuse adjacent single-char
    // operator tokens into the multi-character operators of spec §4.1.
    let mut pre: Vec<Token> = Vec::with_capacity(raws.len());
    for r in &raws {
        let kind = match r.kind {
            TokenKind::Symbol if is_word_byte(r.text.as_bytes()[0]) && is_keyword_lexeme(&r.text) => {
                TokenKind::Keyword
            }
            other => other,
        };
        let mut tok = Token::new(kind, r.text.clone(), file.clone(), r.line, r.column);
        if let Some(lit) = &r.literal {
            tok = tok.with_literal(lit.clone());
        }
        pre.push(tok);
    }

    Ok(fuse_operators(pre))
}

const THREE_CHAR_OPS: &[&str] = &["<<=", ">>=", "..."];
const TWO_CHAR_OPS: &[&str] = &[
    "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "==", "!=", "<=", ">=",
    "&&", "||", "++", "--", "->", "<<", ">>",
];

fn adjacent(a: &Token, b: &Token) -> bool {
    a.line == b.line && a.column + a.text.chars().count() as u32 == b.column
}

fn fuse_operators(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        if tokens[i].kind == TokenKind::Symbol && i + 2 < tokens.len() {
            let three: String = format!("{}{}{}", tokens[i].text, tokens[i + 1].text, tokens[i + 2].text);
            if THREE_CHAR_OPS.contains(&three.as_str())
                && adjacent(&tokens[i], &tokens[i + 1])
                && adjacent(&tokens[i + 1], &tokens[i + 2])
            {
                let mut fused = tokens[i].clone();
                fused.text = Rc::from(three.as_str());
                out.push(fused);
                i += 3;
                continue;
            }
        }
        if tokens[i].kind == TokenKind::Symbol && i + 1 < tokens.len() {
            let two: String = format!("{}{}", tokens[i].text, tokens[i + 1].text);
            if TWO_CHAR_OPS.contains(&two.as_str()) && adjacent(&tokens[i], &tokens[i + 1]) {
                let mut fused = tokens[i].clone();
                fused.text = Rc::from(two.as_str());
                out.push(fused);
                i += 2;
                continue;
            }
        }
        out.push(tokens[i].clone());
        i += 1;
    }
    out
}
