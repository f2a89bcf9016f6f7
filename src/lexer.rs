//! Lexer for Rill
//!
//! The lexer converts source code into a stream of tokens.
//! It uses the `logos` crate for efficient lexing.
//!
//! Lexing never fails: a character no rule matches becomes a
//! [`TokenKind::Unknown`] token, and rejecting it is the parser's job.
//! End of input yields an `Eof` token, repeatably and without side effects.

use crate::span::Span;
use crate::token::{Token, TokenKind};
use logos::Logos;

/// The lexer for Rill
pub struct Lexer<'src> {
    source: &'src str,
    inner: logos::Lexer<'src, TokenKind>,
    peeked: Option<Token>,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source code
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            inner: TokenKind::lexer(source),
            peeked: None,
        }
    }

    /// Get the source code
    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Peek at the next token without consuming it
    pub fn peek(&mut self) -> &Token {
        if self.peeked.is_none() {
            self.peeked = Some(self.produce());
        }
        self.peeked.as_ref().unwrap()
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Token {
        if let Some(token) = self.peeked.take() {
            return token;
        }
        self.produce()
    }

    fn produce(&mut self) -> Token {
        match self.inner.next() {
            Some(Ok(kind)) => {
                let span = self.inner.span();
                Token::new(kind, Span::new(span.start, span.end))
            }
            Some(Err(())) => {
                let span = self.inner.span();
                Token::new(TokenKind::Unknown, Span::new(span.start, span.end))
            }
            None => {
                let pos = self.source.len();
                Token::new(TokenKind::Eof, Span::new(pos, pos))
            }
        }
    }

    /// Collect all tokens into a vector, ending with `Eof`
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }
        tokens
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            None
        } else {
            Some(token)
        }
    }
}

/// Helper function to lex source code
pub fn lex(source: &str) -> Vec<Token> {
    Lexer::new(source).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_kinds(source: &str) -> Vec<TokenKind> {
        lex(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_empty_source() {
        let kinds = token_kinds("");
        assert_eq!(kinds, vec![TokenKind::Eof]);
    }

    #[test]
    fn test_whitespace_only() {
        let kinds = token_kinds("   \t\n  ");
        assert_eq!(kinds, vec![TokenKind::Eof]);
    }

    #[test]
    fn test_numbers() {
        let kinds = token_kinds("42 3.14 0");
        assert_eq!(
            kinds,
            vec![
                TokenKind::IntLiteral,
                TokenKind::FloatLiteral,
                TokenKind::IntLiteral,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_number_boundary() {
        // The character terminating a literal scan must begin the next
        // token; "1+2" must not lose the "2".
        let kinds = token_kinds("1+2");
        assert_eq!(
            kinds,
            vec![
                TokenKind::IntLiteral,
                TokenKind::Plus,
                TokenKind::IntLiteral,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_numeric_payload_round_trip() {
        let source = "3.25";
        let tokens = lex(source);
        assert_eq!(tokens[0].kind, TokenKind::FloatLiteral);
        let value: f64 = tokens[0].text(source).parse().unwrap();
        assert_eq!(value, 3.25);
        assert_eq!(format!("{}", value), "3.25");
    }

    #[test]
    fn test_keywords() {
        let kinds = token_kinds("if else while for break continue return");
        assert_eq!(
            kinds,
            vec![
                TokenKind::If,
                TokenKind::Else,
                TokenKind::While,
                TokenKind::For,
                TokenKind::Break,
                TokenKind::Continue,
                TokenKind::Return,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_keyword_prefix_is_identifier() {
        // Exact-match, case-sensitive keyword recognition: "iffy" is one
        // identifier, never `if` followed by `fy`.
        let kinds = token_kinds("iffy If whilee");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Ident,
                TokenKind::Ident,
                TokenKind::Ident,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_identifiers_are_not_numeric_kinds() {
        // Identifiers lex as Ident, never as a numeric token kind.
        let source = "count";
        let tokens = lex(source);
        assert_eq!(tokens[0].kind, TokenKind::Ident);
        assert_eq!(tokens[0].text(source), "count");
    }

    #[test]
    fn test_type_keywords() {
        let kinds = token_kinds("int double void");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Int,
                TokenKind::Double,
                TokenKind::Void,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_operators() {
        let kinds = token_kinds("+ - * / % == != < > <= >= ! =");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Percent,
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::LtEq,
                TokenKind::GtEq,
                TokenKind::Not,
                TokenKind::Eq,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_comments() {
        let kinds = token_kinds("1 # comment\n2");
        assert_eq!(
            kinds,
            vec![TokenKind::IntLiteral, TokenKind::IntLiteral, TokenKind::Eof]
        );
    }

    #[test]
    fn test_comment_at_eof() {
        let kinds = token_kinds("# only a comment");
        assert_eq!(kinds, vec![TokenKind::Eof]);
    }

    #[test]
    fn test_unknown_character() {
        let kinds = token_kinds("1 @ 2");
        assert_eq!(
            kinds,
            vec![
                TokenKind::IntLiteral,
                TokenKind::Unknown,
                TokenKind::IntLiteral,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_eof_is_repeatable() {
        let mut lexer = Lexer::new("1");
        assert_eq!(lexer.next_token().kind, TokenKind::IntLiteral);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    }

    #[test]
    fn test_span_tracking() {
        let source = "int x = 42";
        let tokens = lex(source);
        assert_eq!(tokens[0].text(source), "int");
        assert_eq!(tokens[1].text(source), "x");
        assert_eq!(tokens[2].text(source), "=");
        assert_eq!(tokens[3].text(source), "42");
    }

    #[test]
    fn test_function_definition() {
        let source = "int add(int a, int b) { return a + b; }";
        let kinds = token_kinds(source);
        assert_eq!(
            kinds,
            vec![
                TokenKind::Int,
                TokenKind::Ident, // add
                TokenKind::LParen,
                TokenKind::Int,
                TokenKind::Ident, // a
                TokenKind::Comma,
                TokenKind::Int,
                TokenKind::Ident, // b
                TokenKind::RParen,
                TokenKind::LBrace,
                TokenKind::Return,
                TokenKind::Ident, // a
                TokenKind::Plus,
                TokenKind::Ident, // b
                TokenKind::Semicolon,
                TokenKind::RBrace,
                TokenKind::Eof
            ]
        );
    }
}
