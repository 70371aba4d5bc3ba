//! Built-in operations, resolved by name before user functions.

use crate::environment::ScopeId;
use crate::interpreter::Interpreter;
use crate::value::{parse_integer_prefix, Value};
use std::io::{BufRead, Write};
use std::thread;
use std::time::Duration;

/// Prefix marking a string as the "address" of a variable.
pub const POINTER_PREFIX: char = '&';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Print,
    ReadLine,
    Sleep,
    ToNumber,
    ToString,
    ToBoolean,
    AddressOf,
    Deref,
    AssignThrough,
}

impl Builtin {
    pub fn from_name(name: &str) -> Option<Self> {
        let builtin = match name {
            "pechat" => Builtin::Print,
            "vhod" => Builtin::ReadLine,
            "son" => Builtin::Sleep,
            "chislo" => Builtin::ToNumber,
            "stroka" => Builtin::ToString,
            "logika" => Builtin::ToBoolean,
            "ukazatel" => Builtin::AddressOf,
            "znach" => Builtin::Deref,
            "prisvoit" => Builtin::AssignThrough,
            _ => return None,
        };
        Some(builtin)
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Print => "pechat",
            Builtin::ReadLine => "vhod",
            Builtin::Sleep => "son",
            Builtin::ToNumber => "chislo",
            Builtin::ToString => "stroka",
            Builtin::ToBoolean => "logika",
            Builtin::AddressOf => "ukazatel",
            Builtin::Deref => "znach",
            Builtin::AssignThrough => "prisvoit",
        }
    }
}

/// The variable name a pointer string refers to, if it is one.
fn pointee(value: Option<&Value>) -> Option<&str> {
    match value {
        Some(Value::String(s)) => s.strip_prefix(POINTER_PREFIX),
        _ => None,
    }
}

impl<R: BufRead, W: Write> Interpreter<R, W> {
    /// Dispatch a call by name: builtins first, then user functions.
    /// Unknown names evaluate to Null.
    pub(crate) fn call(&mut self, name: &str, args: Vec<Value>, scope: ScopeId) -> Value {
        let Some(builtin) = Builtin::from_name(name) else {
            return self.call_function(name, args);
        };

        match builtin {
            Builtin::Print => self.print(&args),
            Builtin::ReadLine => self.read_line(&args),
            Builtin::Sleep => self.sleep(&args),
            Builtin::ToNumber => Value::Number(args.first().map_or(0.0, Value::to_number)),
            Builtin::ToString => Value::String(args.first().map_or_else(String::new, Value::to_script_string)),
            Builtin::ToBoolean => Value::Bool(args.first().is_some_and(Value::is_truthy)),
            Builtin::AddressOf => match args.first() {
                Some(Value::String(name)) => Value::String(format!("{}{}", POINTER_PREFIX, name)),
                _ => Value::Null,
            },
            Builtin::Deref => match pointee(args.first()) {
                Some(target) => self.env.get(scope, target).cloned().unwrap_or(Value::Null),
                None => Value::Null,
            },
            Builtin::AssignThrough => {
                let mut args = args.into_iter();
                let pointer = args.next();
                match (pointee(pointer.as_ref()), args.next()) {
                    (Some(target), Some(value)) => {
                        self.env.assign_or_define(scope, target, value.clone());
                        value
                    }
                    _ => Value::Null,
                }
            }
        }
    }

    fn print(&mut self, args: &[Value]) -> Value {
        let line = args
            .iter()
            .map(Value::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        if let Err(error) = writeln!(self.output, "{}", line) {
            tracing::warn!(%error, "failed to write script output");
        }
        Value::Null
    }

    /// Read one line of input, showing an optional string prompt first.
    /// End of input with nothing read yields Null.
    fn read_line(&mut self, args: &[Value]) -> Value {
        if let Some(Value::String(prompt)) = args.first() {
            let written = write!(self.output, "{}", prompt).and_then(|_| self.output.flush());
            if let Err(error) = written {
                tracing::warn!(%error, "failed to write prompt");
            }
        }

        let mut buffer = Vec::new();
        match self.input.read_until(b'\n', &mut buffer) {
            Ok(0) => Value::Null,
            Ok(_) => {
                if buffer.last() == Some(&b'\n') {
                    buffer.pop();
                }
                Value::String(String::from_utf8_lossy(&buffer).into_owned())
            }
            Err(error) => {
                tracing::warn!(%error, "failed to read script input");
                Value::Null
            }
        }
    }

    /// Block for the given number of milliseconds; non-positive is a no-op.
    fn sleep(&mut self, args: &[Value]) -> Value {
        let millis = match args.first() {
            Some(Value::Number(n)) => *n as i64,
            Some(Value::String(s)) => parse_integer_prefix(s),
            _ => 0,
        };

        if millis > 0 {
            // Anything printed so far should be visible while we wait.
            if let Err(error) = self.output.flush() {
                tracing::warn!(%error, "failed to flush script output");
            }
            tracing::trace!(millis, "sleep");
            thread::sleep(Duration::from_millis(millis as u64));
        }
        Value::Null
    }
}
