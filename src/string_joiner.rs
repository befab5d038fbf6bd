//! Adjacent string-literal concatenation (spec §4.3), the phase between
//! the preprocessor and the parser.
//!
//! Grounded in `original_source/src/main.c`'s "phase 5": walk the token
//! stream once, and whenever a string literal directly follows another
//! string literal, merge their contents into a single literal instead of
//! emitting two. Comments carry no meaning past this point in the pipeline
//! and are dropped here rather than in the parser.

use crate::token::{Literal, Token, TokenKind};

pub fn join_string_literals(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    for tok in tokens {
        if tok.kind == TokenKind::Comment {
            continue;
        }
        if tok.kind == TokenKind::LiteralString {
            if let Some(prev) = out.last_mut() {
                if prev.kind == TokenKind::LiteralString {
                    merge_into(prev, &tok);
                    continue;
                }
            }
        }
        out.push(tok);
    }
    out
}

fn merge_into(prev: &mut Token, next: &Token) {
    let prev_inner = &prev.text[1..prev.text.len() - 1];
    let next_inner = &next.text[1..next.text.len() - 1];
    let joined = format!("\"{prev_inner}{next_inner}\"");

    let prev_bytes = match &prev.literal {
        Some(Literal::Str(b)) => b.clone(),
        _ => prev_inner.as_bytes().to_vec(),
    };
    let next_bytes = match &next.literal {
        Some(Literal::Str(b)) => b.clone(),
        _ => next_inner.as_bytes().to_vec(),
    };
    let mut merged_bytes = prev_bytes;
    merged_bytes.extend(next_bytes);

    prev.text = joined.into();
    prev.literal = Some(Literal::Str(merged_bytes));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Tokenizer;
    use std::rc::Rc;

    fn run(src: &str) -> Vec<Token> {
        let tokenizer = Tokenizer::tokenize(Rc::from("<test>"), src.as_bytes()).unwrap();
        join_string_literals(tokenizer.tokens)
    }

    #[test]
    fn adjacent_strings_merge_into_one_token() {
        let out = run(r#""foo" "bar";"#);
        let strings: Vec<&Token> = out.iter().filter(|t| t.kind == TokenKind::LiteralString).collect();
        assert_eq!(strings.len(), 1);
        assert_eq!(&*strings[0].text, r#""foobar""#);
    }

    #[test]
    fn non_adjacent_strings_stay_separate() {
        let out = run(r#""foo"; "bar";"#);
        let strings: Vec<&Token> = out.iter().filter(|t| t.kind == TokenKind::LiteralString).collect();
        assert_eq!(strings.len(), 2);
    }

    #[test]
    fn comments_are_dropped() {
        let out = run("int /* c */ x;");
        assert!(out.iter().all(|t| t.kind != TokenKind::Comment));
    }

    #[test]
    fn three_adjacent_strings_merge_in_order() {
        let out = run(r#""a" "b" "c";"#);
        let strings: Vec<&Token> = out.iter().filter(|t| t.kind == TokenKind::LiteralString).collect();
        assert_eq!(strings.len(), 1);
        assert_eq!(&*strings[0].text, r#""abc""#);
    }
}
