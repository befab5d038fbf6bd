pub mod arena;
pub mod cli;
pub mod cursor;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod preprocessor;
pub mod scope;
pub mod semantic;
pub mod serializer;
pub mod source;
pub mod statement;
pub mod string_joiner;
pub mod symbol;
pub mod token;
pub mod types;
pub mod value;
