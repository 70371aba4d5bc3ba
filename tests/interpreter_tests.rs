// End-to-end interpreter tests
//
// Each test runs a complete script through the runner with in-memory input
// and output and checks what the script printed.

use hypescript::ast::Stmt;
use hypescript::parser::Parser;
use hypescript::{run_with_io, Interpreter, RunError, Value};
use pretty_assertions::assert_eq;
use std::io;

fn run_with_input(source: &str, input: &str) -> String {
    let output = match run_with_io(source, None, input.as_bytes(), Vec::new()) {
        Ok(output) => output,
        Err(error) => panic!("script failed: {}", error),
    };
    String::from_utf8(output).expect("script output should be UTF-8")
}

fn run(source: &str) -> String {
    run_with_input(source, "")
}

fn interpret(source: &str) -> Interpreter<io::Empty, Vec<u8>> {
    let program = Parser::parse_source(source).expect("script should parse");
    let mut interpreter = Interpreter::with_io(io::empty(), Vec::new());
    interpreter.interpret(&program);
    interpreter
}

// ============================================================================
// Output and values
// ============================================================================

#[test]
fn hello_with_marker() {
    assert_eq!(run("!HYPE!\npechat(\"hype\");"), "hype\n");
}

#[test]
fn print_joins_arguments_with_spaces() {
    assert_eq!(run("pechat(1, \"two\", istina, NICHTO);"), "1 two true null\n");
    assert_eq!(run("pechat();"), "\n");
}

#[test]
fn plus_concatenates_mixed_operands() {
    assert_eq!(run("pechat(1 + \"a\");"), "1a\n");
    assert_eq!(run("pechat(\"n=\" + 2.5 + lozh);"), "n=2.5false\n");
}

#[test]
fn numbers_print_with_six_significant_digits() {
    assert_eq!(
        run("pechat(0.1 + 0.2, 1 / 3, 1000000, 123456, 0.0001, 0.00001);"),
        "0.3 0.333333 1e+06 123456 0.0001 1e-05\n"
    );
}

#[test]
fn division_and_modulo_by_zero() {
    assert_eq!(run("pechat(1 / 0, -1 / 0, 7 % 0);"), "inf -inf nan\n");
    assert_eq!(run("pechat(7 % 3, -7 % 3, 7.9 % 3.2);"), "1 -1 1\n");
}

#[test]
fn string_escapes_stay_verbatim() {
    assert_eq!(run("pechat(\"a\\nb\");"), "a\\nb\n");
}

#[test]
fn equality_is_type_strict() {
    assert_eq!(
        run("pechat(1 == \"1\", NICHTO == NICHTO, \"a\" != \"b\", 0 == lozh);"),
        "false true true false\n"
    );
}

#[test]
fn logic_operators_evaluate_both_sides() {
    let source = r#"
        prikol side() { pechat("side"); }
        x = lozh && side();
        y = istina || side();
        pechat(x, y);
    "#;
    assert_eq!(run(source), "side\nside\nfalse true\n");
}

#[test]
fn non_numbers_count_as_zero_in_comparisons() {
    assert_eq!(run("pechat(\"5\" > 1, NICHTO < 1, -istina);"), "false true -0\n");
}

// ============================================================================
// Conversions
// ============================================================================

#[test]
fn number_string_round_trip() {
    assert_eq!(run("x = 3.5; pechat(stroka(chislo(stroka(x))));"), "3.5\n");
}

#[test]
fn number_conversion_reads_a_prefix() {
    assert_eq!(
        run("pechat(chislo(\"12abc\"), chislo(\"abc\"), chislo(\"  -2.5e1\"), chislo(istina), chislo(NICHTO));"),
        "12 0 -25 1 0\n"
    );
}

#[test]
fn string_conversion_uses_keyword_spellings() {
    assert_eq!(
        run("pechat(stroka(istina), stroka(lozh), stroka(NICHTO), stroka(42), stroka());"),
        "istina lozh NICHTO 42 \n"
    );
}

#[test]
fn boolean_conversion_follows_truthiness() {
    assert_eq!(
        run("pechat(logika(\"\"), logika(\"0\"), logika(0), logika(2), logika(NICHTO), logika());"),
        "false true false true false false\n"
    );
}

// ============================================================================
// Control flow
// ============================================================================

#[test]
fn if_else_picks_a_branch() {
    let source = r#"
        x = 0;
        esli (x) pechat("yes"); inache pechat("no");
        esli ("text") { pechat("truthy"); }
    "#;
    assert_eq!(run(source), "no\ntruthy\n");
}

#[test]
fn while_counts() {
    assert_eq!(run("i = 0; poka (i < 3) { pechat(i); i = i + 1; }"), "0\n1\n2\n");
}

#[test]
fn continue_skips_the_rest_of_the_body() {
    let source = "dlya (i = 0; i < 3; i = i + 1) { esli (i == 1) prodolzhit; pechat(i); }";
    assert_eq!(run(source), "0\n2\n");
}

#[test]
fn continue_in_while_rechecks_the_condition() {
    let source = "i = 0; poka (i < 4) { i = i + 1; esli (i % 2 == 0) prodolzhit; pechat(i); }";
    assert_eq!(run(source), "1\n3\n");
}

#[test]
fn break_leaves_an_infinite_loop_after_one_pass() {
    let source = "poka (istina) { pechat(\"once\"); slomat; } pechat(\"after\");";
    assert_eq!(run(source), "once\nafter\n");
}

#[test]
fn break_only_leaves_the_innermost_loop() {
    let source = r#"
        dlya (i = 0; i < 2; i = i + 1) {
            dlya (j = 0; j < 5; j = j + 1) {
                esli (j == 1) slomat;
                pechat(i, j);
            }
        }
    "#;
    assert_eq!(run(source), "0 0\n1 0\n");
}

#[test]
fn for_without_condition_runs_until_break() {
    assert_eq!(run("dlya (i = 0; ; i = i + 1) { esli (i == 2) slomat; pechat(i); }"), "0\n1\n");
}

#[test]
fn stray_break_stops_the_program() {
    assert_eq!(run("pechat(1); slomat; pechat(2);"), "1\n");

    let interpreter = interpret("slomat;");
    assert!(interpreter.pending_break());
    assert!(!interpreter.pending_continue());
}

// ============================================================================
// Scoping
// ============================================================================

#[test]
fn block_locals_disappear_at_block_end() {
    assert_eq!(run("{ x = 1; } pechat(x);"), "null\n");
}

#[test]
fn blocks_assign_to_outer_variables() {
    assert_eq!(run("x = 1; { x = 2; { x = x + 1; } } pechat(x);"), "3\n");
}

#[test]
fn for_variable_is_local_to_the_loop() {
    assert_eq!(run("dlya (i = 0; i < 2; i = i + 1) {} pechat(i);"), "null\n");
}

#[test]
fn scopes_are_released_after_execution() {
    let interpreter = interpret("{ a = 1; { b = 2; } } dlya (i = 0; i < 3; i = i + 1) { c = i; }");
    assert_eq!(interpreter.environment().depth(), 1);
    assert_eq!(interpreter.global("a"), None);
    assert_eq!(interpreter.global("c"), None);
}

#[test]
fn globals_are_visible_after_run() {
    let interpreter = interpret("x = 1 + 2; y = \"s\";");
    assert_eq!(interpreter.global("x"), Some(&Value::Number(3.0)));
    assert_eq!(interpreter.global("y"), Some(&Value::String("s".to_string())));
    assert_eq!(interpreter.global("z"), None);
    assert!(interpreter.output().is_empty());
}

// ============================================================================
// Functions
// ============================================================================

#[test]
fn missing_arguments_are_null() {
    assert_eq!(run("prikol f(a) { pechat(a); } f(1); f();"), "1\nnull\n");
}

#[test]
fn extra_arguments_are_ignored() {
    assert_eq!(run("prikol f(a) { pechat(a); } f(1, 2, 3);"), "1\n");
}

#[test]
fn calls_always_yield_null() {
    assert_eq!(run("prikol f() { pechat(\"in\"); } pechat(f());"), "in\nnull\n");
    assert_eq!(run("pechat(nope(1));"), "null\n");
}

#[test]
fn functions_do_not_see_caller_locals() {
    let source = r#"
        prikol f() { pechat(y); }
        { y = 1; f(); }
    "#;
    assert_eq!(run(source), "null\n");
}

#[test]
fn functions_mutate_globals() {
    assert_eq!(run("g = 1; prikol f() { g = g + 1; } f(); f(); pechat(g);"), "3\n");
}

#[test]
fn function_locals_do_not_leak() {
    assert_eq!(run("prikol f() { fresh = 5; } f(); pechat(fresh);"), "null\n");
}

#[test]
fn parameters_shadow_globals() {
    let source = r#"
        prikol f(i) { i = 100; }
        dlya (i = 0; i < 2; i = i + 1) { f(i); pechat(i); }
        x = 7;
        prikol g(x) { x = 0; }
        g(1);
        pechat(x);
    "#;
    assert_eq!(run(source), "0\n1\n7\n");
}

#[test]
fn recursion() {
    let source = "prikol count(n) { esli (n > 0) { pechat(n); count(n - 1); } } count(3);";
    assert_eq!(run(source), "3\n2\n1\n");
}

#[test]
fn functions_must_be_declared_before_use() {
    assert_eq!(run("f(); prikol f() { pechat(\"late\"); } f();"), "late\n");
}

#[test]
fn later_declaration_wins() {
    let source = "prikol f() { pechat(1); } f(); prikol f() { pechat(2); } f();";
    assert_eq!(run(source), "1\n2\n");
}

#[test]
fn declaration_in_a_loop_registers_once() {
    let source = "dlya (i = 0; i < 3; i = i + 1) { prikol g() { pechat(\"g\"); } } g();";
    assert_eq!(run(source), "g\n");

    let interpreter = interpret(source);
    assert_eq!(interpreter.functions().len(), 1);
    assert!(interpreter.functions().lookup("g").is_some());
}

#[test]
fn executed_declarations_are_consumed() {
    let program = Parser::parse_source("prikol f(a) {} prikol never(b) {} slomat; never(1);")
        .expect("script should parse");
    let mut interpreter = Interpreter::with_io(io::empty(), Vec::new());
    interpreter.interpret(&program);

    let consumed: Vec<bool> = program
        .statements
        .iter()
        .filter_map(|stmt| match stmt {
            Stmt::Function(decl) => Some(decl.is_consumed()),
            _ => None,
        })
        .collect();
    assert_eq!(consumed, vec![true, true]);
    assert_eq!(interpreter.functions().len(), 2);
}

#[test]
fn builtins_take_precedence_over_user_functions() {
    assert_eq!(run("prikol znach(a) { pechat(\"mine\"); } pechat(znach(\"&q\"));"), "null\n");
}

// ============================================================================
// Pointers
// ============================================================================

#[test]
fn pointer_round_trip() {
    let source = r#"
        x = 1;
        p = ukazatel("x");
        prisvoit(p, 42);
        pechat(p, znach(p), x);
    "#;
    assert_eq!(run(source), "&x 42 42\n");
}

#[test]
fn assigning_through_a_pointer_defines_missing_variables() {
    assert_eq!(run("pechat(prisvoit(ukazatel(\"fresh\"), 7)); pechat(fresh);"), "7\n7\n");
}

#[test]
fn pointers_need_the_prefix() {
    assert_eq!(
        run("x = 1; pechat(znach(\"x\"), ukazatel(5), prisvoit(\"x\", 2), x);"),
        "null null null 1\n"
    );
}

#[test]
fn pointers_reach_globals_from_functions() {
    let source = r#"
        prikol bump(p) { prisvoit(p, znach(p) + 1); }
        n = 1;
        bump(ukazatel("n"));
        pechat(n);
    "#;
    assert_eq!(run(source), "2\n");
}

// ============================================================================
// Input and sleep
// ============================================================================

#[test]
fn read_line_with_prompt_and_end_of_input() {
    let source = "a = vhod(\"name? \"); b = vhod(); c = vhod(); pechat(a, b, c);";
    assert_eq!(run_with_input(source, "Ann\nBob"), "name? Ann Bob null\n");
}

#[test]
fn read_line_keeps_empty_lines() {
    assert_eq!(run_with_input("x = vhod(); pechat(x == \"\");", "\nrest\n"), "true\n");
}

#[test]
fn non_positive_sleep_returns_immediately() {
    assert_eq!(run("son(0); son(-5); son(\"0\"); son(); pechat(\"awake\");"), "awake\n");
}

#[test]
fn short_sleep_completes() {
    assert_eq!(run("pechat(son(1));"), "null\n");
}

// ============================================================================
// Syntax errors
// ============================================================================

#[test]
fn syntax_errors_prevent_execution() {
    let mut output: Vec<u8> = Vec::new();
    let result =
        run_with_io("pechat(1);\npechat(2)\n1 = 2;", Some("bad.hype"), io::empty(), &mut output).map(|_| ());

    assert!(matches!(result, Err(RunError::Syntax { count: 3 })));
    assert!(output.is_empty());
}
