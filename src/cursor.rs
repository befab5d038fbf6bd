//! Rewindable view over a token stream (spec §4.1/§4.4).
//!
//! Grounded in `original_source/include/tokenizer.h`'s `TokenIter` plus its
//! `skip_comments` config flag: parsing code wants comments invisible, the
//! string joiner wants them visible (a joined string followed by a comment
//! must not be treated as adjacent to the next string literal).

use crate::token::{Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

pub struct TokenCursor<'t> {
    tokens: &'t [Token],
    pos: usize,
    skip_comments: bool,
}

impl<'t> TokenCursor<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        TokenCursor { tokens, pos: 0, skip_comments: true }
    }

    pub fn with_comments(tokens: &'t [Token]) -> Self {
        TokenCursor { tokens, pos: 0, skip_comments: false }
    }

    fn skip_to_visible(&mut self) {
        if self.skip_comments {
            while matches!(self.tokens.get(self.pos), Some(t) if t.kind == TokenKind::Comment) {
                self.pos += 1;
            }
        }
    }

    pub fn peek(&mut self) -> Option<&'t Token> {
        self.skip_to_visible();
        self.tokens.get(self.pos)
    }

    pub fn peek_nth(&mut self, n: usize) -> Option<&'t Token> {
        self.skip_to_visible();
        let mut idx = self.pos;
        let mut remaining = n;
        loop {
            if self.skip_comments {
                while matches!(self.tokens.get(idx), Some(t) if t.kind == TokenKind::Comment) {
                    idx += 1;
                }
            }
            let tok = self.tokens.get(idx)?;
            if remaining == 0 {
                return Some(tok);
            }
            remaining -= 1;
            idx += 1;
        }
    }

    pub fn next(&mut self) -> Option<&'t Token> {
        self.skip_to_visible();
        let tok = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(tok)
    }

    pub fn at_end(&mut self) -> bool {
        self.peek().is_none()
    }

    /// Records the current position for later `restore`. Cheap: a bare
    /// index, copied by value, never shared — backtracking never aliases
    /// two live cursors over the same mutable position.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.pos)
    }

    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.pos = checkpoint.0;
    }

    pub fn is_keyword(&mut self, lexeme: &str) -> bool {
        matches!(self.peek(), Some(t) if t.is_keyword(lexeme))
    }

    pub fn is_symbol(&mut self, lexeme: &str) -> bool {
        matches!(self.peek(), Some(t) if t.kind == TokenKind::Symbol && &*t.text == lexeme)
    }

    /// Consumes the current token if it's the given keyword; returns whether it matched.
    pub fn eat_keyword(&mut self, lexeme: &str) -> bool {
        if self.is_keyword(lexeme) {
            self.next();
            true
        } else {
            false
        }
    }

    pub fn eat_symbol(&mut self, lexeme: &str) -> bool {
        if self.is_symbol(lexeme) {
            self.next();
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Tokenizer;
    use std::rc::Rc;

    fn tokens(src: &str) -> Vec<Token> {
        Tokenizer::tokenize(Rc::from("<test>"), src.as_bytes()).unwrap().tokens
    }

    #[test]
    fn skips_comments_by_default() {
        let t = tokens("int /* c */ x;");
        let mut cur = TokenCursor::new(&t);
        assert!(cur.is_keyword("int"));
        cur.next();
        assert!(cur.peek().unwrap().text.as_ref() == "x");
    }

    #[test]
    fn comments_visible_when_requested() {
        let t = tokens("int /* c */ x;");
        let mut cur = TokenCursor::with_comments(&t);
        cur.next();
        assert_eq!(cur.peek().unwrap().kind, TokenKind::Comment);
    }

    #[test]
    fn checkpoint_restores_position() {
        let t = tokens("int x; int y;");
        let mut cur = TokenCursor::new(&t);
        let cp = cur.checkpoint();
        cur.next();
        cur.next();
        cur.restore(cp);
        assert_eq!(cur.peek().unwrap().text.as_ref(), "int");
    }

    #[test]
    fn peek_nth_looks_ahead_across_comments() {
        let t = tokens("int /* c */ x = 1;");
        let mut cur = TokenCursor::new(&t);
        assert_eq!(cur.peek_nth(1).unwrap().text.as_ref(), "x");
    }

    #[test]
    fn eat_keyword_and_symbol() {
        let t = tokens("int x;");
        let mut cur = TokenCursor::new(&t);
        assert!(cur.eat_keyword("int"));
        assert!(!cur.eat_keyword("int"));
        cur.next();
        assert!(cur.eat_symbol(";"));
    }
}
