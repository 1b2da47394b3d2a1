//! Expression parsing implementation
//!
//! One method per precedence level, lowest binding first. All binary levels
//! are left-associative, so `a > b > c` groups as `(a > b) > c`.
//!
//! ```text
//! or    := xor   (('or'|'||'|'|') xor)*
//! xor   := and   (('xor'|'^') and)*
//! and   := rel   (('and'|'&&'|'&') rel)*
//! rel   := add   (('!='|'<>'|'=='|'>='|'<='|'>'|'<') add)*
//! add   := mul   (('+'|'-') mul)*
//! mul   := unary (('*'|'/'|'%') unary)*
//! unary := '+' unary | '-' unary | '!' unary | 'not' or | primary
//! ```

use crate::interpreter::functions::Arity;
use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{LineParser, ParseError, ParseErrorKind};

impl LineParser<'_> {
    /// Parse expression (top-level entry point)
    pub(crate) fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_xor()?;
        while self.match_token(&TokenKind::Or) {
            let right = self.parse_xor()?;
            left = Expr::binary(BinOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_xor(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;
        while self.match_token(&TokenKind::Xor) {
            let right = self.parse_and()?;
            left = Expr::binary(BinOp::Xor, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_relational()?;
        while self.match_token(&TokenKind::And) {
            let right = self.parse_relational()?;
            left = Expr::binary(BinOp::And, left, right);
        }
        Ok(left)
    }

    /// Parse relational (== != <> < <= > >=), all on one level
    fn parse_relational(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_additive()?;

        loop {
            let op = match self.peek_kind() {
                TokenKind::NotEq => BinOp::Neq,
                TokenKind::EqEq => BinOp::Eq,
                TokenKind::Ge => BinOp::Ge,
                TokenKind::Le => BinOp::Le,
                TokenKind::Gt => BinOp::Gt,
                TokenKind::Lt => BinOp::Lt,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            left = Expr::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expr::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        self.enter()?;

        let expr = match self.peek_kind() {
            TokenKind::Plus => {
                self.advance();
                self.parse_unary()?
            }
            TokenKind::Minus => {
                self.advance();
                Expr::unary(UnOp::Neg, self.parse_unary()?)
            }
            TokenKind::Bang => {
                self.advance();
                Expr::unary(UnOp::Not, self.parse_unary()?)
            }
            // `not` negates everything to its right
            TokenKind::Not => {
                self.advance();
                Expr::unary(UnOp::Not, self.parse_expression()?)
            }
            _ => self.parse_primary()?,
        };

        self.leave();
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let offset = self.current_offset();

        match self.peek_kind().clone() {
            TokenKind::Number(n) => {
                self.advance();
                Ok(Expr::Const(n))
            }
            TokenKind::Ident(name) => {
                self.advance();
                if self.match_token(&TokenKind::LParen) {
                    self.parse_call(name, offset)
                } else if self.functions.contains(&name) {
                    Err(ParseError::new(
                        ParseErrorKind::MissingFunctionArguments,
                        offset,
                    ))
                } else {
                    self.reference(&name, offset);
                    Ok(Expr::VarRef(name))
                }
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                if !self.match_token(&TokenKind::RParen) {
                    return Err(self.error_here(ParseErrorKind::MissingClosingParenthesis));
                }
                Ok(expr)
            }
            _ => Err(ParseError::new(
                ParseErrorKind::UnexpectedCharacter,
                offset,
            )),
        }
    }

    /// Parse the argument list of `name(`, then resolve `name` in the table
    fn parse_call(&mut self, name: String, offset: usize) -> Result<Expr, ParseError> {
        let mut args = Vec::new();

        if !self.match_token(&TokenKind::RParen) {
            args.push(self.parse_expression()?);
            while self.match_token(&TokenKind::Comma) {
                args.push(self.parse_expression()?);
            }
            if !self.match_token(&TokenKind::RParen) {
                return Err(
                    self.error_here(ParseErrorKind::MissingClosingFunctionParenthesis)
                );
            }
        }

        let def = self
            .functions
            .get(&name)
            .ok_or(ParseError::new(ParseErrorKind::UnknownFunction, offset))?;

        if let Arity::Fixed(n) = def.arity {
            if n != args.len() {
                return Err(ParseError::new(
                    ParseErrorKind::InvalidNumberOfArguments,
                    offset,
                ));
            }
        }

        Ok(Expr::Call {
            name,
            builtin: def.builtin,
            args,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::functions::FunctionTable;
    use crate::parser::parse::LineParser;

    fn render(line: &str) -> String {
        let functions = FunctionTable::standard();
        let parsed = LineParser::parse(line, "", &functions).unwrap();
        assert!(parsed.is_valid(), "{:?}", parsed.error);
        parsed.root.to_string()
    }

    #[test]
    fn test_precedence() {
        assert_eq!(render("1 + 2 * 3"), "(1 + (2 * 3))");
        assert_eq!(render("a or b and c"), "(a or (b and c))");
        assert_eq!(render("a | b ^ c & d"), "(a or (b xor (c and d)))");
        assert_eq!(render("a + 1 > b - 1"), "((a + 1) > (b - 1))");
    }

    #[test]
    fn test_left_associativity() {
        assert_eq!(render("8 - 4 - 2"), "((8 - 4) - 2)");
        assert_eq!(render("a > b > c"), "((a > b) > c)");
        assert_eq!(render("a == b != c"), "((a == b) != c)");
    }

    #[test]
    fn test_unary_forms() {
        assert_eq!(render("-a * 2"), "((-a) * 2)");
        assert_eq!(render("--a"), "(-(-a))");
        assert_eq!(render("+a"), "a");
        assert_eq!(render("!a & b"), "((!a) and b)");
        assert_eq!(render("not a & b"), "(!(a and b))");
    }

    #[test]
    fn test_calls() {
        assert_eq!(render("max()"), "max()");
        assert_eq!(render("lim(a, 2, 9)"), "lim(a, 2, 9)");
        assert_eq!(render("INV(ton1(x, 3))"), "inv(ton1(x, 3))");
    }
}
