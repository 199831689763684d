pub mod token;

use std::collections::HashMap;

use crate::diagnostics::Diagnostics;
use crate::scanner::token::{Token, TokenType};

pub struct Scanner<'a> {
    source: Vec<char>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    line: usize,
    line_start: usize,
    keywords: HashMap<String, TokenType>,
    diagnostics: &'a mut Diagnostics,
}

impl<'a> Scanner<'a> {
    pub fn new(
        source: impl Into<String>,
        keywords: &HashMap<String, TokenType>,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        Scanner {
            source: source.into().chars().collect(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
            line_start: 0,
            keywords: keywords.clone(),
            diagnostics,
        }
    }

    /// Scan the whole source. Bad input produces diagnostics, not an early
    /// exit; the returned stream always ends with a single Eof token.
    pub fn scan_tokens(mut self) -> Vec<Token> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token();
        }

        let eof_column = self.current - self.line_start + 1;
        self.tokens
            .push(Token::new(TokenType::Eof, "", self.line, eof_column));
        self.tokens
    }

    fn scan_token(&mut self) {
        let c = self.advance();
        match c {
            '(' => self.add_token(TokenType::LeftParen),
            ')' => self.add_token(TokenType::RightParen),
            '{' => self.add_token(TokenType::LeftBrace),
            '}' => self.add_token(TokenType::RightBrace),
            '[' => self.add_token(TokenType::LeftBracket),
            ']' => self.add_token(TokenType::RightBracket),
            ',' => self.add_token(TokenType::Comma),
            '.' => self.add_token(TokenType::Dot),
            ':' => self.add_token(TokenType::Colon),
            '+' => self.add_token(TokenType::Plus),
            '-' => self.add_token(TokenType::Minus),
            '*' => self.add_token(TokenType::Star),
            '%' => self.add_token(TokenType::Percent),

            '!' => {
                let token_type = if self.match_char('=') {
                    TokenType::BangEqual
                } else {
                    TokenType::Bang
                };
                self.add_token(token_type);
            }
            '=' => {
                let token_type = if self.match_char('=') {
                    TokenType::EqualEqual
                } else {
                    TokenType::Equal
                };
                self.add_token(token_type);
            }
            '<' => {
                let token_type = if self.match_char('=') {
                    TokenType::LessEqual
                } else {
                    TokenType::Less
                };
                self.add_token(token_type);
            }
            '>' => {
                let token_type = if self.match_char('=') {
                    TokenType::GreaterEqual
                } else {
                    TokenType::Greater
                };
                self.add_token(token_type);
            }

            '/' => {
                if self.match_char('/') {
                    // Comment goes until end of line
                    while self.peek() != Some('\n') && !self.is_at_end() {
                        self.advance();
                    }
                } else {
                    self.add_token(TokenType::Slash);
                }
            }

            // Whitespace (not newlines)
            ' ' | '\r' | '\t' => {}

            '\n' => {
                self.line += 1;
                self.line_start = self.current;
            }

            '"' => self.handle_string(),

            c if c.is_ascii_digit() => self.handle_number(),

            c if c.is_ascii_alphabetic() || c == '_' => self.handle_identifier(),

            _ => {
                let column = self.column_of(self.start);
                self.diagnostics
                    .report(format!("Unexpected character: '{}'", c), self.line, column);
            }
        }
    }

    fn handle_string(&mut self) {
        // Anchor the diagnostic at the opening quote; the string may span lines
        let start_line = self.line;
        let start_column = self.column_of(self.start);

        while self.peek() != Some('"') && !self.is_at_end() {
            if self.peek() == Some('\n') {
                self.line += 1;
                self.line_start = self.current + 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            self.diagnostics.report_expected(
                "Unterminated string",
                start_line,
                start_column,
                Some("a closing \""),
                Some("end of file"),
            );
            return;
        }

        // Consume the closing "
        self.advance();

        // The literal excludes the quotation marks. The token is anchored at
        // the opening quote; self.line/line_start already moved past it when
        // the string spans lines
        let value = self.source[self.start + 1..self.current - 1]
            .iter()
            .collect::<String>();
        let lexeme: String = self.source[self.start..self.current].iter().collect();
        self.tokens.push(Token::new(
            TokenType::String(value),
            lexeme,
            start_line,
            start_column,
        ));
    }

    fn handle_number(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        // Only absorb the dot when a digit follows it
        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            self.advance(); // consume '.'

            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        let text: String = self.source[self.start..self.current].iter().collect();
        match text.parse::<f64>() {
            Ok(value) => self.add_token(TokenType::Number(value)),
            Err(_) => {
                let column = self.column_of(self.start);
                self.diagnostics
                    .report(format!("Invalid number: '{}'", text), self.line, column);
            }
        }
    }

    fn handle_identifier(&mut self) {
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.advance();
        }

        let text: String = self.source[self.start..self.current].iter().collect();

        // A spelling that matches the active language's keyword table becomes
        // the canonical keyword token; anything else is an identifier
        let token_type = self
            .keywords
            .get(&text)
            .cloned()
            .unwrap_or(TokenType::Identifier);

        self.add_token(token_type);
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) -> char {
        let ch = self.source[self.current];
        self.current += 1;
        ch
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.current).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.source.get(self.current + 1).copied()
    }

    fn match_char(&mut self, expected: char) -> bool {
        match self.peek() {
            Some(ch) if ch == expected => {
                self.current += 1;
                true
            }
            _ => false,
        }
    }

    fn column_of(&self, position: usize) -> usize {
        position - self.line_start + 1
    }

    fn add_token(&mut self, token_type: TokenType) {
        let lexeme: String = self.source[self.start..self.current].iter().collect();
        let column = self.column_of(self.start);
        self.tokens
            .push(Token::new(token_type, lexeme, self.line, column));
    }
}
