use crate::error::RunError;
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

/// Read a script from disk and run it against stdin/stdout.
pub fn run_file(path: &Path) -> Result<(), RunError> {
    let source = fs::read_to_string(path).map_err(|source| RunError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let filename = path.to_string_lossy();
    run(&source, Some(filename.as_ref()))
}

pub fn run(source: &str, filename: Option<&str>) -> Result<(), RunError> {
    run_with_io(source, filename, io::stdin().lock(), io::stdout()).map(|_| ())
}

/// Parse `source` and, only if it is free of syntax errors, execute it.
///
/// Every diagnostic is reported to stderr before the error is returned.
/// On success the output sink is handed back.
pub fn run_with_io<R: BufRead, W: Write>(
    source: &str,
    filename: Option<&str>,
    input: R,
    output: W,
) -> Result<W, RunError> {
    let program = match Parser::parse_source(source) {
        Ok(program) => program,
        Err(diagnostics) => {
            for diagnostic in &diagnostics {
                diagnostic.report(source, filename);
            }
            return Err(RunError::Syntax {
                count: diagnostics.len(),
            });
        }
    };

    let mut interpreter = Interpreter::with_io(input, output);
    interpreter.interpret(&program);
    Ok(interpreter.into_output())
}
