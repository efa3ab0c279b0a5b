#[cfg(test)]
mod interpreter_tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use rill_lang as rill;

    use rill::error::Diagnostics;
    use rill::interpreter::Interpreter;
    use rill::parser::Parser;
    use rill::resolver::Resolver;
    use rill::scanner::Scanner;
    use rill::token::Token;

    /// Full pipeline over one source buffer with print output captured.
    fn run(source: &str) -> (String, Diagnostics) {
        let mut diagnostics = Diagnostics::new();

        let out: Rc<RefCell<Vec<u8>>> = Rc::new(RefCell::new(Vec::new()));
        let mut interpreter = Interpreter::with_output(out.clone());

        let tokens: Vec<Token> = Scanner::new(source.as_bytes())
            .filter_map(Result::ok)
            .collect();

        let statements = Parser::new(&tokens, &mut diagnostics).parse();

        if !diagnostics.had_error() {
            Resolver::new(&mut interpreter, &mut diagnostics).resolve(&statements);
        }

        if !diagnostics.had_error() {
            if let Err(e) = interpreter.interpret(&statements) {
                diagnostics.report(&e);
            }
        }

        let output = String::from_utf8(out.borrow().clone()).expect("output is UTF-8");

        (output, diagnostics)
    }

    /// Run a source expected to finish without any error.
    fn output_of(source: &str) -> String {
        let (output, diagnostics) = run(source);

        assert!(
            !diagnostics.had_error() && !diagnostics.had_runtime_error(),
            "unexpected errors: {:?}",
            diagnostics.errors()
        );

        output
    }

    /// Run a source expected to hit a runtime error; returns (output, first error).
    fn runtime_error_of(source: &str) -> (String, String) {
        let (output, diagnostics) = run(source);

        assert!(
            diagnostics.had_runtime_error(),
            "expected a runtime error, got output {:?}",
            output
        );

        (output, diagnostics.errors()[0].clone())
    }

    // ── operators ───────────────────────────────────────────────────────────

    #[test]
    fn test_precedence_and_grouping() {
        assert_eq!(output_of("print 1 + 2 * 3;"), "7\n");
        assert_eq!(output_of("print (1 + 2) * 3;"), "9\n");
    }

    #[test]
    fn test_string_concatenation() {
        assert_eq!(output_of("print \"a\" + \"b\";"), "ab\n");
    }

    #[test]
    fn test_plus_rejects_mixed_operands() {
        let (_, err) = runtime_error_of("print \"a\" + 1;");
        assert!(err.contains("two numbers or two strings"));

        let (_, err) = runtime_error_of("print 1 + \"a\";");
        assert!(err.contains("two numbers or two strings"));
    }

    #[test]
    fn test_comparison_requires_numbers() {
        let (_, err) = runtime_error_of("print 1 < \"a\";");
        assert!(err.contains("Operands must be numbers"));
    }

    #[test]
    fn test_unary_minus_requires_a_number() {
        let (_, err) = runtime_error_of("print -\"a\";");
        assert!(err.contains("Operand must be a number"));
    }

    #[test]
    fn test_unary_bang_negates_truthiness() {
        assert_eq!(output_of("print !nil; print !0; print !\"\";"), "true\nfalse\nfalse\n");
    }

    #[test]
    fn test_division_follows_ieee() {
        assert_eq!(output_of("print 10 / 4;"), "2.5\n");
    }

    #[test]
    fn test_nan_compares_equal_to_nan() {
        assert_eq!(output_of("print (0 / 0) == (0 / 0);"), "true\n");
        assert_eq!(output_of("print (0 / 0) != (0 / 0);"), "false\n");
    }

    #[test]
    fn test_equality_is_type_then_value() {
        assert_eq!(output_of("print 1 == 1; print 1 == \"1\"; print nil == nil;"), "true\nfalse\ntrue\n");
    }

    #[test]
    fn test_logical_operators_return_the_operand_value() {
        assert_eq!(output_of("print nil or \"fallback\";"), "fallback\n");
        assert_eq!(output_of("print 0 and 1;"), "1\n");
        assert_eq!(output_of("print false and 2;"), "false\n");
        assert_eq!(output_of("print \"first\" or \"second\";"), "first\n");
    }

    #[test]
    fn test_logical_operators_short_circuit() {
        let source = "\
var x = 0;
fun bump() { x = x + 1; return true; }
false and bump();
true or bump();
print x;";

        assert_eq!(output_of(source), "0\n");
    }

    #[test]
    fn test_ternary_selects_by_truthiness() {
        assert_eq!(output_of("print true ? \"yes\" : \"no\";"), "yes\n");
        assert_eq!(output_of("print nil ? \"yes\" : \"no\";"), "no\n");
    }

    #[test]
    fn test_ternary_unselected_branch_is_never_evaluated() {
        let source = "\
var x = 0;
fun side() { x = 1; return \"no\"; }
print true ? \"yes\" : side();
print x;";

        assert_eq!(output_of(source), "yes\n0\n");
    }

    // ── variables and scoping ───────────────────────────────────────────────

    #[test]
    fn test_block_scoping_shadows_without_mutating_outer() {
        assert_eq!(
            output_of("var x = 1; { var x = 2; print x; } print x;"),
            "2\n1\n"
        );
    }

    #[test]
    fn test_assignment_is_an_expression_yielding_the_value() {
        assert_eq!(output_of("var a = 1; print a = 2; print a;"), "2\n2\n");
    }

    #[test]
    fn test_undefined_variable_read_is_a_runtime_error() {
        let (_, err) = runtime_error_of("print missing;");
        assert!(err.contains("Undefined variable 'missing'"));
    }

    #[test]
    fn test_undefined_variable_assignment_is_a_runtime_error() {
        let (_, err) = runtime_error_of("missing = 1;");
        assert!(err.contains("Undefined variable 'missing'"));
    }

    #[test]
    fn test_uninitialized_variable_defaults_to_nil() {
        assert_eq!(output_of("var a; print a;"), "nil\n");
    }

    #[test]
    fn test_references_resolve_lexically_not_dynamically() {
        let source = "\
var a = \"global\";
{
  fun show() { print a; }
  show();
  var a = \"block\";
  show();
}";

        // both calls see the global binding: the reference in `show` was
        // resolved before the block-local `a` existed
        assert_eq!(output_of(source), "global\nglobal\n");
    }

    // ── control flow ────────────────────────────────────────────────────────

    #[test]
    fn test_if_runs_exactly_one_branch() {
        assert_eq!(output_of("if (1 > 2) print \"a\"; else print \"b\";"), "b\n");
    }

    #[test]
    fn test_zero_and_empty_string_are_truthy() {
        assert_eq!(
            output_of("if (0) print \"zero\"; if (\"\") print \"empty\";"),
            "zero\nempty\n"
        );
    }

    #[test]
    fn test_while_reevaluates_condition_each_iteration() {
        assert_eq!(
            output_of("var i = 0; while (i < 3) { print i; i = i + 1; }"),
            "0\n1\n2\n"
        );
    }

    #[test]
    fn test_for_loop_desugars_and_runs() {
        assert_eq!(
            output_of("for (var i = 0; i < 3; i = i + 1) print i;"),
            "0\n1\n2\n"
        );
    }

    #[test]
    fn test_runtime_error_aborts_remaining_statements() {
        let (output, err) = runtime_error_of("print 1; print missing; print 2;");

        assert_eq!(output, "1\n");
        assert!(err.contains("Undefined variable"));
    }

    // ── functions and closures ──────────────────────────────────────────────

    #[test]
    fn test_function_call_and_return_value() {
        assert_eq!(
            output_of("fun add(a, b) { return a + b; } print add(1, 2);"),
            "3\n"
        );
    }

    #[test]
    fn test_function_without_return_yields_nil() {
        assert_eq!(output_of("fun f() {} print f();"), "nil\n");
    }

    #[test]
    fn test_return_unwinds_through_loops_and_blocks() {
        assert_eq!(
            output_of("fun f() { while (true) { { return \"done\"; } } } print f();"),
            "done\n"
        );
    }

    #[test]
    fn test_arity_mismatch_is_a_runtime_error() {
        let (_, err) = runtime_error_of("fun f(a, b) { return a + b; } f(1);");
        assert!(err.contains("Expected 2 arguments but got 1"));
    }

    #[test]
    fn test_calling_a_non_callable_is_a_runtime_error() {
        let (_, err) = runtime_error_of("\"abc\"();");
        assert!(err.contains("Can only call functions"));
    }

    #[test]
    fn test_function_values_print_their_name() {
        assert_eq!(output_of("fun f() {} print f;"), "<fn f>\n");
    }

    #[test]
    fn test_recursion() {
        assert_eq!(
            output_of("fun fib(n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); } print fib(10);"),
            "55\n"
        );
    }

    #[test]
    fn test_closure_counter_persists_between_calls() {
        let source = "\
fun makeCounter() {
  var i = 0;
  fun inc() { i = i + 1; return i; }
  return inc;
}
var c = makeCounter();
print c();
print c();";

        assert_eq!(output_of(source), "1\n2\n");
    }

    #[test]
    fn test_each_closure_instance_has_its_own_state() {
        let source = "\
fun makeCounter() {
  var i = 0;
  fun inc() { i = i + 1; return i; }
  return inc;
}
var c1 = makeCounter();
var c2 = makeCounter();
print c1();
print c1();
print c2();";

        assert_eq!(output_of(source), "1\n2\n1\n");
    }

    #[test]
    fn test_closure_sees_later_mutation_of_captured_scope() {
        let source = "\
var setter;
var getter;
{
  var shared = \"before\";
  fun set(v) { shared = v; }
  fun get() { return shared; }
  setter = set;
  getter = get;
}
setter(\"after\");
print getter();";

        assert_eq!(output_of(source), "after\n");
    }

    #[test]
    fn test_parameters_are_fresh_per_call() {
        let source = "\
fun show(a) { print a; }
show(1);
show(\"two\");";

        assert_eq!(output_of(source), "1\ntwo\n");
    }

    // ── natives and printing ────────────────────────────────────────────────

    #[test]
    fn test_clock_native_returns_a_number() {
        assert_eq!(output_of("print clock() >= 0;"), "true\n");
    }

    #[test]
    fn test_clock_rejects_arguments() {
        let (_, err) = runtime_error_of("clock(1);");
        assert!(err.contains("Expected 0 arguments but got 1"));
    }

    #[test]
    fn test_native_values_print_their_name() {
        assert_eq!(output_of("print clock;"), "<native fn clock>\n");
    }

    #[test]
    fn test_integral_numbers_print_without_fraction() {
        assert_eq!(output_of("print 0.5 * 2; print 2.5 + 0.25;"), "1\n2.75\n");
    }

    #[test]
    fn test_runtime_errors_carry_the_source_line() {
        let (_, err) = runtime_error_of("print 1;\nprint -\"a\";");
        assert!(err.contains("[line 2]"), "error was: {}", err);
    }
}
