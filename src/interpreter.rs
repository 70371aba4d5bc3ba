use crate::ast::{BinaryOp, Expr, FunctionDecl, Program, Stmt, UnaryOp};
use crate::environment::{Environment, FunctionTable, ScopeId};
use crate::value::Value;
use std::io::{self, BufRead, Write};

/// Tree-walking interpreter.
///
/// Evaluation never fails: unknown names, unknown calls and operands of the
/// wrong type all degrade to Null or zero. `break` and `continue` travel as
/// sticky flags that the nearest enclosing loop consumes.
pub struct Interpreter<R = io::StdinLock<'static>, W = io::Stdout> {
    pub(crate) env: Environment,
    pub(crate) functions: FunctionTable,
    pending_break: bool,
    pending_continue: bool,
    pub(crate) input: R,
    pub(crate) output: W,
}

impl Interpreter {
    /// An interpreter reading from stdin and printing to stdout.
    pub fn new() -> Self {
        Self::with_io(io::stdin().lock(), io::stdout())
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: BufRead, W: Write> Interpreter<R, W> {
    pub fn with_io(input: R, output: W) -> Self {
        Self {
            env: Environment::new(),
            functions: FunctionTable::new(),
            pending_break: false,
            pending_continue: false,
            input,
            output,
        }
    }

    /// Run every top-level statement against the global scope.
    pub fn interpret(&mut self, program: &Program) {
        self.execute_list(&program.statements, Environment::GLOBAL);

        if let Err(error) = self.output.flush() {
            tracing::warn!(%error, "failed to flush script output");
        }
        tracing::debug!(
            functions = self.functions.len(),
            pending_break = self.pending_break,
            pending_continue = self.pending_continue,
            "program finished"
        );
    }

    pub fn global(&self, name: &str) -> Option<&Value> {
        self.env.get(Environment::GLOBAL, name)
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    pub fn pending_break(&self) -> bool {
        self.pending_break
    }

    pub fn pending_continue(&self) -> bool {
        self.pending_continue
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Run `body` inside a fresh scope under `parent`. The scope is released
    /// when `body` returns.
    pub(crate) fn with_scope<T>(&mut self, parent: ScopeId, body: impl FnOnce(&mut Self, ScopeId) -> T) -> T {
        let scope = self.env.push_scope(parent);
        let result = body(self, scope);
        self.env.pop_scope(scope);
        result
    }

    fn execute_list(&mut self, statements: &[Stmt], scope: ScopeId) {
        for statement in statements {
            self.execute(statement, scope);
            if self.pending_break || self.pending_continue {
                return;
            }
        }
    }

    pub fn execute(&mut self, stmt: &Stmt, scope: ScopeId) {
        match stmt {
            Stmt::Expression { expr } => {
                self.evaluate(expr, scope);
            }
            Stmt::Block { statements } => {
                self.with_scope(scope, |this, local| this.execute_list(statements, local));
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition, scope).is_truthy() {
                    self.execute(then_branch, scope);
                } else if let Some(else_stmt) = else_branch {
                    self.execute(else_stmt, scope);
                }
            }
            Stmt::While { condition, body } => loop {
                self.pending_continue = false;
                if !self.evaluate(condition, scope).is_truthy() {
                    break;
                }
                self.execute(body, scope);
                if self.pending_break {
                    self.pending_break = false;
                    break;
                }
            },
            Stmt::For {
                initializer,
                condition,
                increment,
                body,
            } => {
                // One scope serves every clause and every iteration.
                self.with_scope(scope, |this, local| {
                    if let Some(init) = initializer {
                        this.execute(init, local);
                    }

                    loop {
                        this.pending_continue = false;
                        if let Some(cond) = condition {
                            if !this.evaluate(cond, local).is_truthy() {
                                break;
                            }
                        }

                        this.execute(body, local);
                        if this.pending_break {
                            this.pending_break = false;
                            break;
                        }

                        if let Some(inc) = increment {
                            this.evaluate(inc, local);
                        }
                    }
                });
            }
            Stmt::Break => self.pending_break = true,
            Stmt::Continue => self.pending_continue = true,
            Stmt::Function(decl) => self.declare_function(decl),
        }
    }

    fn declare_function(&mut self, decl: &FunctionDecl) {
        match decl.take() {
            Some(function) => {
                tracing::debug!(
                    name = %decl.name,
                    params = function.params.len(),
                    at = decl.span.start,
                    "registered function"
                );
                self.functions.register(&decl.name, function);
            }
            // Already moved into the table by an earlier execution.
            None => tracing::trace!(name = %decl.name, "function declaration already consumed"),
        }
    }

    pub fn evaluate(&mut self, expr: &Expr, scope: ScopeId) -> Value {
        match expr {
            Expr::Literal { value } => value.clone(),
            Expr::Variable { name } => self.env.get(scope, name).cloned().unwrap_or(Value::Null),
            Expr::Assign { name, value } => {
                let value = self.evaluate(value, scope);
                self.env.assign_or_define(scope, name, value.clone());
                value
            }
            Expr::Binary {
                left,
                operator,
                right,
            } => {
                // Both sides are always evaluated; `&&` and `||` do not
                // short-circuit.
                let left_val = self.evaluate(left, scope);
                let right_val = self.evaluate(right, scope);
                evaluate_binary_op(*operator, left_val, right_val)
            }
            Expr::Unary { operator, operand } => {
                let operand_val = self.evaluate(operand, scope);
                evaluate_unary_op(*operator, operand_val)
            }
            Expr::Call { callee, args } => {
                let args: Vec<Value> = args.iter().map(|arg| self.evaluate(arg, scope)).collect();
                self.call(callee, args, scope)
            }
        }
    }

    /// Invoke a user function. Its scope hangs directly off the global
    /// scope, so the caller's locals are out of reach. Always yields Null.
    pub(crate) fn call_function(&mut self, name: &str, args: Vec<Value>) -> Value {
        let Some(function) = self.functions.lookup(name) else {
            tracing::trace!(name, "call to unknown function");
            return Value::Null;
        };

        tracing::trace!(name, args = args.len(), "call");
        self.with_scope(Environment::GLOBAL, |this, local| {
            // Missing arguments stay unbound; extra ones are dropped.
            for (param, value) in function.params.iter().zip(args) {
                this.env.set(local, param, value);
            }
            this.execute(&function.body, local);
        });
        Value::Null
    }
}

pub fn evaluate_binary_op(operator: BinaryOp, left: Value, right: Value) -> Value {
    match operator {
        BinaryOp::Add => {
            if matches!(left, Value::String(_)) || matches!(right, Value::String(_)) {
                Value::String(format!("{}{}", left, right))
            } else {
                Value::Number(left.as_number_or_zero() + right.as_number_or_zero())
            }
        }
        BinaryOp::Subtract => Value::Number(left.as_number_or_zero() - right.as_number_or_zero()),
        BinaryOp::Multiply => Value::Number(left.as_number_or_zero() * right.as_number_or_zero()),
        BinaryOp::Divide => Value::Number(left.as_number_or_zero() / right.as_number_or_zero()),
        BinaryOp::Modulo => {
            let dividend = left.as_number_or_zero() as i64;
            let divisor = right.as_number_or_zero() as i64;
            if divisor == 0 {
                Value::Number(f64::NAN)
            } else {
                Value::Number(dividend.wrapping_rem(divisor) as f64)
            }
        }
        BinaryOp::Greater => Value::Bool(left.as_number_or_zero() > right.as_number_or_zero()),
        BinaryOp::GreaterEqual => Value::Bool(left.as_number_or_zero() >= right.as_number_or_zero()),
        BinaryOp::Less => Value::Bool(left.as_number_or_zero() < right.as_number_or_zero()),
        BinaryOp::LessEqual => Value::Bool(left.as_number_or_zero() <= right.as_number_or_zero()),
        BinaryOp::Equal => Value::Bool(left.strict_eq(&right)),
        BinaryOp::NotEqual => Value::Bool(!left.strict_eq(&right)),
        BinaryOp::And => Value::Bool(left.is_truthy() && right.is_truthy()),
        BinaryOp::Or => Value::Bool(left.is_truthy() || right.is_truthy()),
    }
}

pub fn evaluate_unary_op(operator: UnaryOp, operand: Value) -> Value {
    match operator {
        UnaryOp::Negate => Value::Number(-operand.as_number_or_zero()),
        UnaryOp::Not => Value::Bool(!operand.is_truthy()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn num(n: f64) -> Value {
        Value::Number(n)
    }

    fn text(s: &str) -> Value {
        Value::String(s.to_string())
    }

    #[test]
    fn plus_concatenates_when_either_side_is_text() {
        assert_eq!(evaluate_binary_op(BinaryOp::Add, num(1.0), text("a")), text("1a"));
        assert_eq!(evaluate_binary_op(BinaryOp::Add, text("a"), Value::Null), text("anull"));
        assert_eq!(evaluate_binary_op(BinaryOp::Add, Value::Bool(true), text("")), text("true"));
        assert_eq!(evaluate_binary_op(BinaryOp::Add, num(0.5), num(2.0)), num(2.5));
    }

    #[test]
    fn arithmetic_treats_non_numbers_as_zero() {
        assert_eq!(evaluate_binary_op(BinaryOp::Add, Value::Bool(true), num(1.0)), num(1.0));
        assert_eq!(evaluate_binary_op(BinaryOp::Multiply, text("3"), num(4.0)), num(0.0));
        assert_eq!(evaluate_binary_op(BinaryOp::Subtract, Value::Null, num(4.0)), num(-4.0));
        assert_eq!(evaluate_unary_op(UnaryOp::Negate, text("5")), num(-0.0));
        assert_eq!(evaluate_binary_op(BinaryOp::Less, Value::Null, num(1.0)), Value::Bool(true));
    }

    #[test]
    fn division_follows_ieee() {
        assert_eq!(evaluate_binary_op(BinaryOp::Divide, num(1.0), num(0.0)), num(f64::INFINITY));
        match evaluate_binary_op(BinaryOp::Divide, num(0.0), num(0.0)) {
            Value::Number(n) => assert!(n.is_nan()),
            other => panic!("expected a number, got {:?}", other),
        }
    }

    #[test]
    fn modulo_truncates_operands() {
        assert_eq!(evaluate_binary_op(BinaryOp::Modulo, num(7.9), num(3.2)), num(1.0));
        assert_eq!(evaluate_binary_op(BinaryOp::Modulo, num(-7.0), num(3.0)), num(-1.0));
        match evaluate_binary_op(BinaryOp::Modulo, num(7.0), num(0.5)) {
            Value::Number(n) => assert!(n.is_nan()),
            other => panic!("expected a number, got {:?}", other),
        }
    }

    #[test]
    fn equality_and_inequality_agree() {
        let samples = [Value::Null, Value::Bool(false), num(0.0), num(1.0), text(""), text("1")];
        for left in &samples {
            for right in &samples {
                let eq = evaluate_binary_op(BinaryOp::Equal, left.clone(), right.clone());
                let ne = evaluate_binary_op(BinaryOp::NotEqual, left.clone(), right.clone());
                assert_eq!(eq, evaluate_unary_op(UnaryOp::Not, ne));
            }
            assert_eq!(
                evaluate_binary_op(BinaryOp::Equal, left.clone(), left.clone()),
                Value::Bool(true)
            );
        }
    }

    #[test]
    fn logical_operators_yield_booleans() {
        assert_eq!(evaluate_binary_op(BinaryOp::And, num(1.0), text("x")), Value::Bool(true));
        assert_eq!(evaluate_binary_op(BinaryOp::Or, Value::Null, num(0.0)), Value::Bool(false));
    }
}
