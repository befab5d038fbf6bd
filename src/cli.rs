//! Command-line front end (spec §6), grounded in the `clap`-derive style
//! of the teacher's own `cli.rs`.

use std::path::PathBuf;

use clap::Parser;

use crate::error::CompileError;
use crate::lexer::Tokenizer;
use crate::parser::{parse_module, Arenas};
use crate::preprocessor::Preprocessor;
use crate::semantic::validate_module;
use crate::serializer::serialize_scope;
use crate::source::FsSourceLoader;
use crate::string_joiner::join_string_literals;
use crate::token::{FileLabel, Token};

#[derive(Parser)]
#[command(name = "cfront")]
#[command(about = "Lexer, preprocessor and scoped AST builder for a C translation unit")]
#[command(version)]
pub struct Cli {
    /// C source file to process
    pub input: PathBuf,

    /// Run the preprocessor phase
    #[arg(short = 'p', long = "preprocessor")]
    pub preprocessor: bool,

    /// Run the parser phase (implies tokenizing, and preprocessing if -p is also given)
    #[arg(short = 'a', long = "parse-ast")]
    pub parse_ast: bool,

    /// Register a pre-defined macro with an empty body
    #[arg(short = 'D', value_name = "NAME")]
    pub defines: Vec<String>,

    /// Append a directory to the include-search path
    #[arg(short = 'I', value_name = "DIR")]
    pub include_paths: Vec<PathBuf>,
}

/// Runs the full pipeline described by `cli`, printing whatever the
/// selected phase dumps to stdout. Every fatal stage collapses to one
/// `CompileError`, matching the single-diagnostic-then-abort policy of
/// spec §7.
pub fn run(cli: Cli) -> Result<(), CompileError> {
    let bytes = std::fs::read(&cli.input).map_err(|e| CompileError::Io { path: cli.input.display().to_string(), message: e.to_string() })?;
    let file: FileLabel = std::rc::Rc::from(cli.input.to_string_lossy().as_ref());

    let tokenized = Tokenizer::tokenize(file.clone(), &bytes)?;
    let mut tokens: Vec<Token> = tokenized.tokens;

    if cli.preprocessor {
        let mut loader = FsSourceLoader;
        let defines = cli.defines.iter().cloned().map(|name| (name, String::new()));
        let mut pp = Preprocessor::new(&mut loader, cli.include_paths.clone()).with_defines(defines);
        let current_dir = cli.input.parent().map(|p| p.to_path_buf());
        tokens = pp.run(file.clone(), current_dir.as_deref(), &tokens)?;
    }
    tokens = join_string_literals(tokens);

    if cli.parse_ast {
        let arenas = Arenas::default();
        let root = parse_module(&arenas, file, &tokens)?;
        validate_module(root, &arenas.types)?;
        print!("{}", serialize_scope(root));
        return Ok(());
    }

    for tok in &tokens {
        println!("{:?} {:?}", tok.kind, tok.text);
    }
    Ok(())
}
