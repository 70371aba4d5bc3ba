use crate::ast::{BinaryOp, Expr, FunctionDecl, Program, Stmt, UnaryOp};
use crate::error::{Diagnostic, DiagnosticKind, Span};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::value::Value;

/// Single-lookahead parser over a lazily scanned token stream.
///
/// Syntax errors never abort the parse. Each one is recorded and the parser
/// carries on with a placeholder, so a single run reports every problem it
/// stumbles over. Callers must check [`Parser::had_error`] before executing
/// the resulting program; a tree built with errors may be incomplete.
pub struct Parser<'src> {
    lexer: Lexer<'src>,
    current: Token,
    previous: Token,
    diagnostics: Vec<Diagnostic>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token();
        let previous = Token::new(TokenKind::Eof, Span::new(0, 0), 1, 1);
        Self {
            lexer,
            current,
            previous,
            diagnostics: Vec::new(),
        }
    }

    /// Parse `source` completely, returning either the program or every
    /// diagnostic found along the way.
    pub fn parse_source(source: &str) -> Result<Program, Vec<Diagnostic>> {
        let mut parser = Parser::new(source);
        let program = parser.parse();
        if parser.had_error() {
            Err(parser.diagnostics)
        } else {
            Ok(program)
        }
    }

    pub fn parse(&mut self) -> Program {
        // An opening `!HYPE!` directive is accepted and ignored.
        self.match_kind(TokenKind::HypeMarker);

        let mut statements = Vec::new();
        while !self.check(TokenKind::Eof) {
            statements.push(self.declaration());
        }

        tracing::debug!(
            statements = statements.len(),
            errors = self.diagnostics.len(),
            "parsed program"
        );
        Program { statements }
    }

    pub fn had_error(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    fn declaration(&mut self) -> Stmt {
        self.statement()
    }

    fn statement(&mut self) -> Stmt {
        if self.match_kind(TokenKind::LeftBrace) {
            self.block()
        } else if self.match_kind(TokenKind::Prikol) {
            self.function_declaration()
        } else if self.match_kind(TokenKind::Poka) {
            self.while_statement()
        } else if self.match_kind(TokenKind::Slomat) {
            self.consume(TokenKind::Semicolon, "; expected after 'slomat'");
            Stmt::Break
        } else if self.match_kind(TokenKind::Prodolzhit) {
            self.consume(TokenKind::Semicolon, "; expected after 'prodolzhit'");
            Stmt::Continue
        } else if self.match_kind(TokenKind::Esli) {
            self.if_statement()
        } else if self.match_kind(TokenKind::Dlya) {
            self.for_statement()
        } else if self.match_kind(TokenKind::Semicolon) {
            Stmt::Expression { expr: Expr::null() }
        } else {
            self.expression_statement()
        }
    }

    /// Parse the statements of a block whose `{` was already consumed.
    fn block(&mut self) -> Stmt {
        let mut statements = Vec::new();

        while !self.check(TokenKind::RightBrace) && !self.check(TokenKind::Eof) {
            statements.push(self.declaration());
        }

        self.consume_with_help(
            TokenKind::RightBrace,
            "} expected after block",
            "Blocks must be closed with '}' after the opening '{'.",
        );
        Stmt::Block { statements }
    }

    fn function_declaration(&mut self) -> Stmt {
        let start = self.previous.span.start;

        if !self.match_kind(TokenKind::Identifier) {
            self.error_at_current_with_help(
                "Function name expected after 'prikol'",
                "Declare functions as: prikol name(a, b) { ... }",
            );
            return Stmt::Expression { expr: Expr::null() };
        }
        let name = self.previous.text().to_string();

        self.consume(TokenKind::LeftParen, "( expected after function name");
        let mut params = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if !self.match_kind(TokenKind::Identifier) {
                    self.error_at_current("Parameter name expected");
                    break;
                }
                params.push(self.previous.text().to_string());
                if !self.match_kind(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen, ") expected after parameters");
        self.consume_with_help(
            TokenKind::LeftBrace,
            "{ expected to start function body",
            "Function bodies are always blocks: prikol name() { ... }",
        );

        let body = self.block();
        let span = Span::new(start, self.previous.span.end);
        Stmt::Function(FunctionDecl::new(name, params, body, span))
    }

    fn while_statement(&mut self) -> Stmt {
        self.consume(TokenKind::LeftParen, "( expected after 'poka'");
        let condition = self.expression();
        self.consume(TokenKind::RightParen, ") expected after while condition");

        let body = Box::new(self.statement());
        Stmt::While { condition, body }
    }

    fn if_statement(&mut self) -> Stmt {
        self.consume_with_help(
            TokenKind::LeftParen,
            "( expected after 'esli'",
            "Conditions are written in parentheses: esli (condition) { ... }",
        );
        let condition = self.expression();
        self.consume(TokenKind::RightParen, ") expected after condition");

        let then_branch = Box::new(self.statement());
        let else_branch = if self.match_kind(TokenKind::Inache) {
            Some(Box::new(self.statement()))
        } else {
            None
        };

        Stmt::If {
            condition,
            then_branch,
            else_branch,
        }
    }

    fn for_statement(&mut self) -> Stmt {
        self.consume(TokenKind::LeftParen, "( expected after 'dlya'");

        // The initializer is a plain expression, never a declaration.
        let initializer = if !self.check(TokenKind::Semicolon) {
            Some(Box::new(Stmt::Expression {
                expr: self.expression(),
            }))
        } else {
            None
        };
        self.consume(TokenKind::Semicolon, "; expected after for init");

        let condition = if !self.check(TokenKind::Semicolon) {
            Some(self.expression())
        } else {
            None
        };
        self.consume(TokenKind::Semicolon, "; expected after for condition");

        let increment = if !self.check(TokenKind::RightParen) {
            Some(self.expression())
        } else {
            None
        };
        self.consume(TokenKind::RightParen, ") expected after for clauses");

        let body = Box::new(self.statement());
        Stmt::For {
            initializer,
            condition,
            increment,
            body,
        }
    }

    fn expression_statement(&mut self) -> Stmt {
        let expr = self.expression();
        self.consume(TokenKind::Semicolon, "; expected after expression");
        Stmt::Expression { expr }
    }

    fn expression(&mut self) -> Expr {
        self.assignment()
    }

    fn assignment(&mut self) -> Expr {
        let expr = self.logic();

        if self.match_kind(TokenKind::Equal) {
            return match expr {
                Expr::Variable { name } => {
                    let value = self.assignment();
                    Expr::Assign {
                        name,
                        value: Box::new(value),
                    }
                }
                other => {
                    let equals = self.previous.clone();
                    self.error_at_with_help(
                        &equals,
                        "Invalid assignment target",
                        "Only a variable name can stand on the left of '='.",
                    );
                    other
                }
            };
        }

        expr
    }

    /// `&&` and `||` share one precedence level and associate to the left.
    fn logic(&mut self) -> Expr {
        let mut expr = self.equality();

        loop {
            let operator = if self.match_kind(TokenKind::AndAnd) {
                BinaryOp::And
            } else if self.match_kind(TokenKind::OrOr) {
                BinaryOp::Or
            } else {
                break;
            };
            let right = self.equality();
            expr = binary(expr, operator, right);
        }

        expr
    }

    fn equality(&mut self) -> Expr {
        let mut expr = self.comparison();

        loop {
            let operator = if self.match_kind(TokenKind::EqualEqual) {
                BinaryOp::Equal
            } else if self.match_kind(TokenKind::BangEqual) {
                BinaryOp::NotEqual
            } else {
                break;
            };
            let right = self.comparison();
            expr = binary(expr, operator, right);
        }

        expr
    }

    fn comparison(&mut self) -> Expr {
        let mut expr = self.term();

        loop {
            let operator = match self.current.kind {
                TokenKind::Greater => BinaryOp::Greater,
                TokenKind::GreaterEqual => BinaryOp::GreaterEqual,
                TokenKind::Less => BinaryOp::Less,
                TokenKind::LessEqual => BinaryOp::LessEqual,
                _ => break,
            };
            self.advance();
            let right = self.term();
            expr = binary(expr, operator, right);
        }

        expr
    }

    fn term(&mut self) -> Expr {
        let mut expr = self.factor();

        loop {
            let operator = match self.current.kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Subtract,
                _ => break,
            };
            self.advance();
            let right = self.factor();
            expr = binary(expr, operator, right);
        }

        expr
    }

    fn factor(&mut self) -> Expr {
        let mut expr = self.unary();

        loop {
            let operator = match self.current.kind {
                TokenKind::Star => BinaryOp::Multiply,
                TokenKind::Slash => BinaryOp::Divide,
                TokenKind::Percent => BinaryOp::Modulo,
                _ => break,
            };
            self.advance();
            let right = self.unary();
            expr = binary(expr, operator, right);
        }

        expr
    }

    fn unary(&mut self) -> Expr {
        let operator = match self.current.kind {
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Minus => UnaryOp::Negate,
            _ => return self.call(),
        };
        self.advance();

        let operand = self.unary();
        Expr::Unary {
            operator,
            operand: Box::new(operand),
        }
    }

    /// Call postfix. An argument list only applies while the expression so
    /// far is a bare name, so `f()()` leaves the second `(` unparsed.
    fn call(&mut self) -> Expr {
        let mut expr = self.primary();

        while self.check(TokenKind::LeftParen) {
            let callee = match expr {
                Expr::Variable { ref name } => name.clone(),
                _ => break,
            };
            self.advance();

            let mut args = Vec::new();
            if !self.check(TokenKind::RightParen) {
                loop {
                    args.push(self.expression());
                    if !self.match_kind(TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.consume_with_help(
                TokenKind::RightParen,
                ") expected after arguments",
                "Calls are closed with ')' after the arguments: f(a, b)",
            );

            expr = Expr::Call { callee, args };
        }

        expr
    }

    fn primary(&mut self) -> Expr {
        let builtin_name = match self.current.kind {
            TokenKind::Pechat => Some("pechat"),
            TokenKind::Vhod => Some("vhod"),
            TokenKind::Son => Some("son"),
            TokenKind::Chislo => Some("chislo"),
            TokenKind::Stroka => Some("stroka"),
            TokenKind::Logika => Some("logika"),
            _ => None,
        };
        if let Some(name) = builtin_name {
            self.advance();
            return Expr::Variable {
                name: name.to_string(),
            };
        }

        let value = match self.current.kind {
            TokenKind::Number => Value::Number(self.current.number),
            TokenKind::String => Value::String(self.current.text().to_string()),
            TokenKind::Istina => Value::Bool(true),
            TokenKind::Lozh => Value::Bool(false),
            TokenKind::Nichto => Value::Null,
            TokenKind::Identifier => {
                let name = self.current.text().to_string();
                self.advance();
                return Expr::Variable { name };
            }
            _ => {
                self.unexpected_token();
                return Expr::null();
            }
        };
        self.advance();
        Expr::Literal { value }
    }

    /// Report a token that cannot start an expression and step over it, so
    /// the parse always makes progress.
    fn unexpected_token(&mut self) {
        let token = self.current.clone();
        let (kind, help) = match token.kind {
            TokenKind::Error => (
                DiagnosticKind::InvalidCharacter,
                format!("'{}' is not part of the language.", token.text()),
            ),
            TokenKind::Eof => (
                DiagnosticKind::Syntax,
                "Reached end of input while expecting an expression.".to_string(),
            ),
            TokenKind::LeftParen => (
                DiagnosticKind::Syntax,
                "Parentheses only follow a function name; there is no grouping.".to_string(),
            ),
            _ => (
                DiagnosticKind::Syntax,
                "Expected a literal, a variable or a call here.".to_string(),
            ),
        };
        self.push_diagnostic(
            Diagnostic::new(kind, token.span.clone(), token.line, token.column, "Unexpected token".to_string())
                .with_help(help),
        );
        if token.kind != TokenKind::Eof {
            self.advance();
        }
    }

    fn advance(&mut self) {
        let next = self.lexer.next_token();
        self.previous = std::mem::replace(&mut self.current, next);
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn match_kind(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, kind: TokenKind, message: &str) {
        if !self.match_kind(kind) {
            self.error_at_current(message);
        }
    }

    fn consume_with_help(&mut self, kind: TokenKind, message: &str, help: &str) {
        if !self.match_kind(kind) {
            self.error_at_current_with_help(message, help);
        }
    }

    fn error_at_current(&mut self, message: &str) {
        let token = self.current.clone();
        self.push_diagnostic(Diagnostic::new(
            DiagnosticKind::Syntax,
            token.span,
            token.line,
            token.column,
            message.to_string(),
        ));
    }

    fn error_at_current_with_help(&mut self, message: &str, help: &str) {
        let token = self.current.clone();
        self.error_at_with_help(&token, message, help);
    }

    fn error_at_with_help(&mut self, token: &Token, message: &str, help: &str) {
        self.push_diagnostic(
            Diagnostic::new(
                DiagnosticKind::Syntax,
                token.span.clone(),
                token.line,
                token.column,
                message.to_string(),
            )
            .with_help(help),
        );
    }

    fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        tracing::debug!(
            line = diagnostic.line,
            column = diagnostic.column,
            message = %diagnostic.message,
            "syntax error"
        );
        self.diagnostics.push(diagnostic);
    }
}

fn binary(left: Expr, operator: BinaryOp, right: Expr) -> Expr {
    Expr::Binary {
        left: Box::new(left),
        operator,
        right: Box::new(right),
    }
}
