#[cfg(test)]
mod resolver_tests {
    use rill_lang as rill;

    use rill::error::Diagnostics;
    use rill::interpreter::Interpreter;
    use rill::parser::Parser;
    use rill::resolver::Resolver;
    use rill::scanner::Scanner;
    use rill::token::Token;

    /// Scan + parse + resolve; parsing is expected to be clean so every
    /// reported error comes from the resolver.
    fn resolve_source(source: &str) -> Diagnostics {
        let tokens: Vec<Token> = Scanner::new(source.as_bytes())
            .filter_map(Result::ok)
            .collect();

        let mut diagnostics = Diagnostics::new();
        let statements = Parser::new(&tokens, &mut diagnostics).parse();

        assert!(
            !diagnostics.had_error(),
            "expected clean parse: {:?}",
            diagnostics.errors()
        );

        let mut interpreter = Interpreter::new();
        Resolver::new(&mut interpreter, &mut diagnostics).resolve(&statements);

        diagnostics
    }

    #[test]
    fn test_block_redeclaration_is_a_static_error() {
        let diagnostics = resolve_source("{ var a = 1; var a = 2; }");

        assert!(diagnostics.had_error());
        assert!(diagnostics.errors()[0].contains("already declared"));
    }

    #[test]
    fn test_global_redeclaration_is_permitted() {
        let diagnostics = resolve_source("var a = 1; var a = 2;");

        assert!(!diagnostics.had_error(), "{:?}", diagnostics.errors());
    }

    #[test]
    fn test_shadowing_in_nested_block_is_permitted() {
        let diagnostics = resolve_source("{ var a = 1; { var a = 2; } }");

        assert!(!diagnostics.had_error(), "{:?}", diagnostics.errors());
    }

    #[test]
    fn test_reading_variable_in_its_own_initializer_is_a_static_error() {
        let diagnostics = resolve_source("var a = 1; { var a = a; }");

        assert!(diagnostics.had_error());
        assert!(diagnostics.errors()[0].contains("own initializer"));
    }

    #[test]
    fn test_top_level_return_is_a_static_error() {
        let diagnostics = resolve_source("return 1;");

        assert!(diagnostics.had_error());
        assert!(diagnostics.errors()[0].contains("top-level"));
        assert!(diagnostics.errors()[0].contains(" at 'return'"));
    }

    #[test]
    fn test_return_inside_function_is_permitted() {
        let diagnostics = resolve_source("fun f() { return 1; }");

        assert!(!diagnostics.had_error(), "{:?}", diagnostics.errors());
    }

    #[test]
    fn test_nested_function_context_is_restored() {
        // inner function closes, outer return is still legal
        let ok = resolve_source("fun outer() { fun inner() { return 1; } return 2; }");
        assert!(!ok.had_error(), "{:?}", ok.errors());

        // and leaving the outer function restores the top-level rule
        let bad = resolve_source("fun f() { return 1; } return 2;");
        assert!(bad.had_error());
    }

    #[test]
    fn test_return_inside_loop_body_of_function_is_permitted() {
        let diagnostics = resolve_source("fun f() { while (true) { return 1; } }");

        assert!(!diagnostics.had_error(), "{:?}", diagnostics.errors());
    }

    #[test]
    fn test_parameter_redeclared_by_var_in_body_is_a_static_error() {
        let diagnostics = resolve_source("fun f(a) { var a = 2; }");

        assert!(diagnostics.had_error());
        assert!(diagnostics.errors()[0].contains("already declared"));
    }

    #[test]
    fn test_multiple_static_errors_all_surface_in_one_pass() {
        let diagnostics = resolve_source("return 1;\nreturn 2;");

        assert_eq!(diagnostics.errors().len(), 2);
    }
}
