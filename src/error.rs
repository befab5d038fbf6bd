//! Single diagnostic channel (spec §7): every failure collapses to one
//! `CompileError`, displayed as `file:line:col: message`.

use std::fmt;

use crate::token::FileLabel;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    UnrecognizedByte(u8),
    UnterminatedString,
    UnterminatedChar,
    UnterminatedComment,
    UnterminatedIncludeArgument,
    MalformedNumericExponent,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::UnrecognizedByte(b) => write!(f, "unrecognized byte 0x{b:02x}"),
            LexError::UnterminatedString => write!(f, "unterminated string literal"),
            LexError::UnterminatedChar => write!(f, "unterminated character literal"),
            LexError::UnterminatedComment => write!(f, "unterminated block comment"),
            LexError::UnterminatedIncludeArgument => write!(f, "unterminated include argument"),
            LexError::MalformedNumericExponent => write!(f, "malformed exponent in numeric literal"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreprocessorError {
    UnknownDirective(String),
    DanglingElif,
    DanglingElse,
    DanglingEndif,
    UnterminatedIf,
    MalformedExpression(String),
    IncludeNotFound(String),
}

impl fmt::Display for PreprocessorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreprocessorError::UnknownDirective(d) => write!(f, "unknown preprocessor directive '{d}'"),
            PreprocessorError::DanglingElif => write!(f, "#elif without matching #if"),
            PreprocessorError::DanglingElse => write!(f, "#else without matching #if"),
            PreprocessorError::DanglingEndif => write!(f, "#endif without matching #if"),
            PreprocessorError::UnterminatedIf => write!(f, "#if without matching #endif"),
            PreprocessorError::MalformedExpression(s) => write!(f, "malformed preprocessor expression: {s}"),
            PreprocessorError::IncludeNotFound(s) => write!(f, "include file not found: {s}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    UnexpectedToken { expected: String, found: String },
    UnknownType(String),
    UnknownSymbol(String),
    Redefinition(String),
    ArityMismatch { name: String, expected: usize, found: usize },
    TypeMismatch { expected: String, found: String },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnexpectedToken { expected, found } => {
                write!(f, "expected {expected}, found '{found}'")
            }
            ParseError::UnknownType(s) => write!(f, "unknown type '{s}'"),
            ParseError::UnknownSymbol(s) => write!(f, "unknown symbol '{s}'"),
            ParseError::Redefinition(s) => write!(f, "redefinition of '{s}'"),
            ParseError::ArityMismatch { name, expected, found } => write!(
                f,
                "'{name}' expects {expected} argument(s), found {found}"
            ),
            ParseError::TypeMismatch { expected, found } => {
                write!(f, "expected type {expected}, found {found}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    Io { path: String, message: String },
    Lex { file: FileLabel, line: u32, column: u32, kind: LexError },
    Preprocess { file: FileLabel, line: u32, column: u32, kind: PreprocessorError },
    Parse { file: FileLabel, line: u32, column: u32, kind: ParseError },
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Io { path, message } => write!(f, "{path}: {message}"),
            CompileError::Lex { file, line, column, kind } => {
                write!(f, "{file}:{line}:{column}: {kind}")
            }
            CompileError::Preprocess { file, line, column, kind } => {
                write!(f, "{file}:{line}:{column}: {kind}")
            }
            CompileError::Parse { file, line, column, kind } => {
                write!(f, "{file}:{line}:{column}: {kind}")
            }
        }
    }
}

impl std::error::Error for CompileError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn lex_error_formats_as_file_line_col_message() {
        let e = CompileError::Lex {
            file: Rc::from("main.c"),
            line: 3,
            column: 5,
            kind: LexError::UnterminatedString,
        };
        assert_eq!(e.to_string(), "main.c:3:5: unterminated string literal");
    }
}
