//! End-to-end tests: source text through lexing, parsing, lowering, and
//! execution in the IR evaluator.

use rill::ir::{self, Value};
use rill::{compile, CompileError};

fn run(source: &str, func: &str, args: &[Value]) -> Value {
    let module = compile(source, "test").expect("program should compile");
    ir::Evaluator::new(&module)
        .run(func, args)
        .expect("program should run")
}

#[test]
fn arithmetic_with_precedence() {
    assert_eq!(
        run("int f() { return (1 + 2) * 3 - 10 / 2; }", "f", &[]),
        Value::Int(4)
    );
}

#[test]
fn fibonacci() {
    let source = r#"
        int fib(int n) {
            if (n < 2) { return n; }
            return fib(n - 1) + fib(n - 2);
        }
    "#;
    assert_eq!(run(source, "fib", &[Value::Int(15)]), Value::Int(610));
}

#[test]
fn double_arithmetic_and_promotion() {
    let source = r#"
        double average(int a, int b) {
            return (a + b) / 2.0;
        }
    "#;
    assert_eq!(
        run(source, "average", &[Value::Int(3), Value::Int(4)]),
        Value::Float(3.5)
    );
}

#[test]
fn for_loop_counts_five_iterations() {
    let source = r#"
        int count() {
            int n = 0;
            for i = 0, 5, 1 {
                n = n + 1;
            }
            return n;
        }
    "#;
    assert_eq!(run(source, "count", &[]), Value::Int(5));
}

#[test]
fn for_loop_sums_range() {
    let source = r#"
        int sum_below(int limit) {
            int total = 0;
            for i = 0, limit {
                total = total + i;
            }
            return total;
        }
    "#;
    assert_eq!(run(source, "sum_below", &[Value::Int(10)]), Value::Int(45));
}

#[test]
fn false_if_without_else_skips_then() {
    let source = r#"
        int f() {
            int x = 42;
            if (x > 100) {
                x = 0;
            }
            return x;
        }
    "#;
    assert_eq!(run(source, "f", &[]), Value::Int(42));
}

#[test]
fn else_if_chain() {
    let source = r#"
        int sign(int x) {
            if (x > 0) {
                return 1;
            } else if (x < 0) {
                return 0 - 1;
            } else {
                return 0;
            }
        }
    "#;
    assert_eq!(run(source, "sign", &[Value::Int(7)]), Value::Int(1));
    assert_eq!(run(source, "sign", &[Value::Int(-7)]), Value::Int(-1));
    assert_eq!(run(source, "sign", &[Value::Int(0)]), Value::Int(0));
}

#[test]
fn while_loop_with_break_and_continue() {
    let source = r#"
        int f() {
            int n = 0;
            int i = 0;
            while (1) {
                i = i + 1;
                if (i > 20) { break; }
                if (i % 3) { continue; }
                n = n + i;
            }
            return n;
        }
    "#;
    // 3 + 6 + 9 + 12 + 15 + 18
    assert_eq!(run(source, "f", &[]), Value::Int(63));
}

#[test]
fn functions_call_each_other() {
    let source = r#"
        int twice(int x) { return double_it(x); }
        int double_it(int x) { return x * 2; }
    "#;
    assert_eq!(run(source, "twice", &[Value::Int(21)]), Value::Int(42));
}

#[test]
fn shadowing_across_scopes() {
    let source = r#"
        int f() {
            int i = 100;
            int total = 0;
            for i = 0, 3 {
                total = total + i;
            }
            return total + i;
        }
    "#;
    // Loop uses its own i; outer i is untouched
    assert_eq!(run(source, "f", &[]), Value::Int(103));
}

#[test]
fn implicit_return_zero_on_fallthrough() {
    assert_eq!(run("int f() { int x = 9; }", "f", &[]), Value::Int(0));
}

#[test]
fn top_level_statements_form_main() {
    let module = compile("int x = 2; x = x + 3;", "test").unwrap();
    assert_eq!(ir::run_main(&module).unwrap(), Value::Int(0));
}

#[test]
fn unknown_function_is_a_compile_error() {
    let err = compile("int f() { return missing(); }", "test").unwrap_err();
    assert!(matches!(
        err,
        CompileError::Lower(ir::LowerError::UnknownFunction { .. })
    ));
}

#[test]
fn arity_mismatch_is_a_compile_error() {
    let source = "int g(int a, int b) { return a + b; } int f() { return g(1); }";
    let err = compile(source, "test").unwrap_err();
    assert!(matches!(
        err,
        CompileError::Lower(ir::LowerError::ArityMismatch {
            expected: 2,
            found: 1,
            ..
        })
    ));
}

#[test]
fn same_scope_redeclaration_is_a_compile_error() {
    let err = compile("int f() { int x = 1; int x = 2; return x; }", "test").unwrap_err();
    assert!(matches!(
        err,
        CompileError::Lower(ir::LowerError::DuplicateDeclaration { .. })
    ));
}

#[test]
fn syntax_error_is_reported_first() {
    // Both a syntax and a semantic problem; the parse error wins
    let err = compile("int f() { return missing( }", "test").unwrap_err();
    assert!(matches!(err, CompileError::Parse(_)));
}

#[test]
fn failed_compile_returns_no_module() {
    // An error anywhere aborts the whole translation unit
    let source = "int ok() { return 1; } int bad() { return nope; }";
    assert!(compile(source, "test").is_err());
}

#[test]
fn comments_are_skipped() {
    let source = r#"
        # computes the answer
        int f() {
            return 42; # trailing comment
        }
    "#;
    assert_eq!(run(source, "f", &[]), Value::Int(42));
}
