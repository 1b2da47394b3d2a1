//! Lexer (tokenizer) for a single program line
//!
//! Converts one line of source text into a flat [`Token`] stream consumed by
//! the [`LineParser`](super::parse::LineParser). A `#` outside an identifier
//! starts a comment that runs to the end of the line. Identifiers are folded to
//! lowercase; `and`, `or`, `xor` and `not` are keywords.

use super::parse::{ParseError, ParseErrorKind};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(i32),
    Ident(String),

    // Arithmetic
    Plus,    // +
    Minus,   // -
    Star,    // *
    Slash,   // /
    Percent, // %

    // Comparison
    EqEq,  // ==
    NotEq, // != <>
    Lt,    // <
    Le,    // <=
    Gt,    // >
    Ge,    // >=

    // Logical
    And,  // and && &
    Or,   // or || |
    Xor,  // xor ^
    Not,  // not
    Bang, // !

    Assign, // =
    LParen,
    RParen,
    Comma,

    /// Printable ASCII the grammar has no use for; rejected by the parser
    Unknown(char),
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number(n) => write!(f, "number {}", n),
            TokenKind::Ident(s) => write!(f, "identifier '{}'", s),
            TokenKind::Plus => write!(f, "'+'"),
            TokenKind::Minus => write!(f, "'-'"),
            TokenKind::Star => write!(f, "'*'"),
            TokenKind::Slash => write!(f, "'/'"),
            TokenKind::Percent => write!(f, "'%'"),
            TokenKind::EqEq => write!(f, "'=='"),
            TokenKind::NotEq => write!(f, "'!='"),
            TokenKind::Lt => write!(f, "'<'"),
            TokenKind::Le => write!(f, "'<='"),
            TokenKind::Gt => write!(f, "'>'"),
            TokenKind::Ge => write!(f, "'>='"),
            TokenKind::And => write!(f, "'and'"),
            TokenKind::Or => write!(f, "'or'"),
            TokenKind::Xor => write!(f, "'xor'"),
            TokenKind::Not => write!(f, "'not'"),
            TokenKind::Bang => write!(f, "'!'"),
            TokenKind::Assign => write!(f, "'='"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::Unknown(c) => write!(f, "'{}'", c),
            TokenKind::Eof => write!(f, "end of line"),
        }
    }
}

/// A token and the character offset where it starts within the line
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

/// Lexer for one line of logic source
pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(line: &str) -> Self {
        Self {
            input: line.chars().collect(),
            position: 0,
        }
    }

    /// Tokenize the line. The last token is always [`TokenKind::Eof`].
    pub fn tokenize(&mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();
            let offset = self.position;

            let Some(c) = self.current() else {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    offset,
                });
                return Ok(tokens);
            };

            if !c.is_ascii() {
                return Err(ParseError::new(ParseErrorKind::InvalidCharacter, offset));
            }

            // Comment or line break: nothing after this belongs to the line
            if c == '#' || c == '\n' || c == '\r' {
                self.position = self.input.len();
                continue;
            }

            let kind = if c.is_ascii_digit() {
                self.number(offset)?
            } else if c.is_ascii_alphabetic() {
                self.identifier()
            } else {
                self.operator(c)
            };
            tokens.push(Token { kind, offset });
        }
    }

    fn number(&mut self, offset: usize) -> Result<TokenKind, ParseError> {
        let start = self.position;
        while self.current().is_some_and(|c| c.is_ascii_digit()) {
            self.position += 1;
        }
        let text: String = self.input[start..self.position].iter().collect();
        text.parse::<i32>()
            .map(TokenKind::Number)
            .map_err(|_| ParseError::new(ParseErrorKind::ParseError, offset))
    }

    fn identifier(&mut self) -> TokenKind {
        let start = self.position;
        while self
            .current()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
        {
            self.position += 1;
        }
        let word: String = self.input[start..self.position]
            .iter()
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match word.as_str() {
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            "xor" => TokenKind::Xor,
            "not" => TokenKind::Not,
            _ => TokenKind::Ident(word),
        }
    }

    fn operator(&mut self, c: char) -> TokenKind {
        let next = self.peek();
        let (kind, len) = match (c, next) {
            ('=', Some('=')) => (TokenKind::EqEq, 2),
            ('!', Some('=')) => (TokenKind::NotEq, 2),
            ('<', Some('>')) => (TokenKind::NotEq, 2),
            ('<', Some('=')) => (TokenKind::Le, 2),
            ('>', Some('=')) => (TokenKind::Ge, 2),
            ('&', Some('&')) => (TokenKind::And, 2),
            ('|', Some('|')) => (TokenKind::Or, 2),
            ('=', _) => (TokenKind::Assign, 1),
            ('!', _) => (TokenKind::Bang, 1),
            ('<', _) => (TokenKind::Lt, 1),
            ('>', _) => (TokenKind::Gt, 1),
            ('&', _) => (TokenKind::And, 1),
            ('|', _) => (TokenKind::Or, 1),
            ('^', _) => (TokenKind::Xor, 1),
            ('+', _) => (TokenKind::Plus, 1),
            ('-', _) => (TokenKind::Minus, 1),
            ('*', _) => (TokenKind::Star, 1),
            ('/', _) => (TokenKind::Slash, 1),
            ('%', _) => (TokenKind::Percent, 1),
            ('(', _) => (TokenKind::LParen, 1),
            (')', _) => (TokenKind::RParen, 1),
            (',', _) => (TokenKind::Comma, 1),
            (other, _) => (TokenKind::Unknown(other), 1),
        };
        self.position += len;
        kind
    }

    fn skip_whitespace(&mut self) {
        while self.current().is_some_and(|c| c == ' ' || c == '\t') {
            self.position += 1;
        }
    }

    fn current(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(line: &str) -> Vec<TokenKind> {
        Lexer::new(line)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_simple_tokens() {
        let tokens = kinds("R = inv(Y.re) + 12");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Ident("r".into()),
                TokenKind::Assign,
                TokenKind::Ident("inv".into()),
                TokenKind::LParen,
                TokenKind::Ident("y.re".into()),
                TokenKind::RParen,
                TokenKind::Plus,
                TokenKind::Number(12),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_operator_spellings() {
        let tokens = kinds("== != <> <= >= && || & | ^ and OR xor not !");
        assert_eq!(
            tokens,
            vec![
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::NotEq,
                TokenKind::Le,
                TokenKind::Ge,
                TokenKind::And,
                TokenKind::Or,
                TokenKind::And,
                TokenKind::Or,
                TokenKind::Xor,
                TokenKind::And,
                TokenKind::Or,
                TokenKind::Xor,
                TokenKind::Not,
                TokenKind::Bang,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_keyword_prefix_is_identifier() {
        assert_eq!(
            kinds("orange android"),
            vec![
                TokenKind::Ident("orange".into()),
                TokenKind::Ident("android".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comment_cuts_line() {
        let tokens = Lexer::new("a = 1 # ümlaut is fine here").tokenize().unwrap();
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[3].kind, TokenKind::Eof);
    }

    #[test]
    fn test_offsets() {
        let tokens = Lexer::new("  ab + 7").tokenize().unwrap();
        assert_eq!(tokens[0].offset, 2);
        assert_eq!(tokens[1].offset, 5);
        assert_eq!(tokens[2].offset, 7);
    }

    #[test]
    fn test_non_ascii_rejected() {
        let err = Lexer::new("a = b€").tokenize().unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidCharacter);
        assert_eq!(err.offset, 5);
    }

    #[test]
    fn test_number_overflow() {
        let err = Lexer::new("a = 99999999999").tokenize().unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::ParseError);
        assert_eq!(err.offset, 4);
    }
}
