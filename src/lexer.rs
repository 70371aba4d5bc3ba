use crate::error::Span;

/// The optional directive a script may open with.
pub const HYPE_MARKER: &str = "!HYPE!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Single-character tokens
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Dot,
    Semicolon,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    // One or two character tokens
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    AndAnd,
    OrOr,

    // Literals
    Identifier,
    String,
    Number,

    // Keywords
    Pechat,     // print
    Esli,       // if
    Inache,     // else
    Dlya,       // for
    Poka,       // while
    Slomat,     // break
    Prodolzhit, // continue
    Vhod,       // read line
    Istina,     // true
    Lozh,       // false
    Nichto,     // null
    Son,        // sleep
    Chislo,     // to number
    Stroka,     // to string
    Logika,     // to boolean
    Prikol,     // function declaration

    // Special
    HypeMarker,
    Error,
    Eof,
}

fn keyword(text: &str) -> Option<TokenKind> {
    let kind = match text {
        "pechat" => TokenKind::Pechat,
        "esli" => TokenKind::Esli,
        "inache" => TokenKind::Inache,
        "dlya" => TokenKind::Dlya,
        "poka" => TokenKind::Poka,
        "slomat" => TokenKind::Slomat,
        "prodolzhit" => TokenKind::Prodolzhit,
        "vhod" => TokenKind::Vhod,
        "istina" => TokenKind::Istina,
        "lozh" => TokenKind::Lozh,
        "NICHTO" => TokenKind::Nichto,
        "son" => TokenKind::Son,
        "chislo" => TokenKind::Chislo,
        "stroka" => TokenKind::Stroka,
        "logika" => TokenKind::Logika,
        "prikol" => TokenKind::Prikol,
        _ => return None,
    };
    Some(kind)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Owned text for identifiers, strings and error tokens; `None` otherwise.
    pub lexeme: Option<String>,
    /// Payload of number tokens; zero otherwise.
    pub number: f64,
    pub line: usize,
    pub column: usize,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, line: usize, column: usize) -> Self {
        Self {
            kind,
            lexeme: None,
            number: 0.0,
            line,
            column,
            span,
        }
    }

    pub fn text(&self) -> &str {
        self.lexeme.as_deref().unwrap_or("")
    }
}

/// On-demand tokenizer. Each call to [`Lexer::next_token`] scans exactly one
/// token; once input is exhausted every further call yields `Eof`.
pub struct Lexer<'src> {
    source: &'src str,
    start: usize,
    current: usize,
    line: usize,
    column: usize,
    start_line: usize,
    start_column: usize,
    finished: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            start: 0,
            current: 0,
            line: 1,
            column: 1,
            start_line: 1,
            start_column: 1,
            finished: false,
        }
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();

        self.start = self.current;
        self.start_line = self.line;
        self.start_column = self.column;

        if self.is_at_end() {
            return self.make_token(TokenKind::Eof);
        }

        if self.source[self.current..].starts_with(HYPE_MARKER) {
            for _ in 0..HYPE_MARKER.len() {
                self.advance();
            }
            return self.make_token(TokenKind::HypeMarker);
        }

        let c = self.advance();
        match c {
            '(' => self.make_token(TokenKind::LeftParen),
            ')' => self.make_token(TokenKind::RightParen),
            '{' => self.make_token(TokenKind::LeftBrace),
            '}' => self.make_token(TokenKind::RightBrace),
            ',' => self.make_token(TokenKind::Comma),
            '.' => self.make_token(TokenKind::Dot),
            ';' => self.make_token(TokenKind::Semicolon),
            '+' => self.make_token(TokenKind::Plus),
            '-' => self.make_token(TokenKind::Minus),
            '*' => self.make_token(TokenKind::Star),
            '/' => self.make_token(TokenKind::Slash),
            '%' => self.make_token(TokenKind::Percent),
            '!' => {
                let kind = if self.match_char('=') {
                    TokenKind::BangEqual
                } else {
                    TokenKind::Bang
                };
                self.make_token(kind)
            }
            '=' => {
                let kind = if self.match_char('=') {
                    TokenKind::EqualEqual
                } else {
                    TokenKind::Equal
                };
                self.make_token(kind)
            }
            '>' => {
                let kind = if self.match_char('=') {
                    TokenKind::GreaterEqual
                } else {
                    TokenKind::Greater
                };
                self.make_token(kind)
            }
            '<' => {
                let kind = if self.match_char('=') {
                    TokenKind::LessEqual
                } else {
                    TokenKind::Less
                };
                self.make_token(kind)
            }
            '&' if self.match_char('&') => self.make_token(TokenKind::AndAnd),
            '|' if self.match_char('|') => self.make_token(TokenKind::OrOr),
            '"' => self.string(),
            c if c.is_ascii_digit() => self.number(),
            c if c.is_ascii_alphabetic() || c == '_' => self.identifier(),
            _ => {
                let text = self.source[self.start..self.current].to_string();
                self.make_token_with_text(TokenKind::Error, text)
            }
        }
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) -> char {
        match self.source[self.current..].chars().next() {
            Some(c) => {
                self.current += c.len_utf8();
                if c == '\n' {
                    self.line += 1;
                    self.column = 1;
                } else {
                    self.column += 1;
                }
                c
            }
            None => '\0',
        }
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    fn peek(&self) -> char {
        self.source[self.current..].chars().next().unwrap_or('\0')
    }

    fn peek_next(&self) -> char {
        let mut chars = self.source[self.current..].chars();
        chars.next();
        chars.next().unwrap_or('\0')
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                ' ' | '\r' | '\t' | '\n' => {
                    self.advance();
                }
                '/' if self.peek_next() == '/' => {
                    while self.peek() != '\n' && !self.is_at_end() {
                        self.advance();
                    }
                }
                '/' if self.peek_next() == '*' => {
                    self.advance();
                    self.advance();
                    while !self.is_at_end() && !(self.peek() == '*' && self.peek_next() == '/') {
                        self.advance();
                    }
                    // Unterminated block comments run to end of input.
                    if !self.is_at_end() {
                        self.advance();
                        self.advance();
                    }
                }
                _ => return,
            }
        }
    }

    fn string(&mut self) -> Token {
        let content_start = self.current;
        while !self.is_at_end() && self.peek() != '"' {
            // A backslash swallows whatever follows it; escapes stay verbatim.
            if self.peek() == '\\' && self.peek_next() != '\0' {
                self.advance();
            }
            self.advance();
        }
        let content = self.source[content_start..self.current].to_string();

        // Unterminated strings end at end of input without complaint.
        if !self.is_at_end() {
            self.advance();
        }

        self.make_token_with_text(TokenKind::String, content)
    }

    fn number(&mut self) -> Token {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if self.peek() == '.' {
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let text = &self.source[self.start..self.current];
        let value = text.parse::<f64>().unwrap_or(0.0);
        let mut token = self.make_token(TokenKind::Number);
        token.number = value;
        token
    }

    fn identifier(&mut self) -> Token {
        while self.peek().is_ascii_alphanumeric() || self.peek() == '_' {
            self.advance();
        }

        let text = &self.source[self.start..self.current];
        match keyword(text) {
            Some(kind) => self.make_token(kind),
            None => self.make_token_with_text(TokenKind::Identifier, text.to_string()),
        }
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(
            kind,
            Span::new(self.start, self.current),
            self.start_line,
            self.start_column,
        )
    }

    fn make_token_with_text(&self, kind: TokenKind, text: String) -> Token {
        let mut token = self.make_token(kind);
        token.lexeme = Some(text);
        token
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    /// Yields every token up to, but not including, `Eof`.
    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            self.finished = true;
            None
        } else {
            Some(token)
        }
    }
}
