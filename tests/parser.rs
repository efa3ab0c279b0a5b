#[cfg(test)]
mod parser_tests {
    use pretty_assertions::assert_eq;

    use rill_lang as rill;

    use rill::ast_printer::{AstPrinter, RpnPrinter};
    use rill::error::Diagnostics;
    use rill::expr::Expr;
    use rill::parser::Parser;
    use rill::scanner::Scanner;
    use rill::stmt::Stmt;
    use rill::token::Token;

    fn scan(source: &str) -> Vec<Token> {
        Scanner::new(source.as_bytes())
            .filter_map(Result::ok)
            .collect()
    }

    fn parse_expr(source: &str) -> Expr {
        let tokens = scan(source);
        let mut diagnostics = Diagnostics::new();

        let expr = Parser::new(&tokens, &mut diagnostics)
            .parse_expression()
            .expect("expression should parse");

        assert!(!diagnostics.had_error(), "{:?}", diagnostics.errors());

        expr
    }

    fn printed(source: &str) -> String {
        AstPrinter::print(&parse_expr(source))
    }

    fn parse_program(source: &str) -> (Vec<Stmt>, Diagnostics) {
        let tokens = scan(source);
        let mut diagnostics = Diagnostics::new();

        let statements = Parser::new(&tokens, &mut diagnostics).parse();

        (statements, diagnostics)
    }

    #[test]
    fn test_multiplication_binds_tighter_than_addition() {
        assert_eq!(printed("1 + 2 * 3"), "(1 + (2 * 3))");
    }

    #[test]
    fn test_grouping_overrides_precedence() {
        assert_eq!(printed("(1 + 2) * 3"), "((1 + 2) * 3)");
    }

    #[test]
    fn test_unary_binds_tighter_than_factor() {
        assert_eq!(printed("-1 * 2"), "((-1) * 2)");
        assert_eq!(printed("!true == false"), "((!true) == false)");
    }

    #[test]
    fn test_comparison_chains_left_associative() {
        assert_eq!(printed("1 < 2 == true"), "((1 < 2) == true)");
    }

    #[test]
    fn test_logical_or_binds_looser_than_and() {
        assert_eq!(printed("1 or 2 and 3"), "(1 or (2 and 3))");
    }

    #[test]
    fn test_ternary_is_right_associative() {
        assert_eq!(printed("1 ? 2 : 3 ? 4 : 5"), "(1 ? 2 : (3 ? 4 : 5))");
    }

    #[test]
    fn test_ternary_sits_between_assignment_and_or() {
        assert_eq!(printed("a = 1 or 2 ? 3 : 4"), "(a = ((1 or 2) ? 3 : 4))");
    }

    #[test]
    fn test_call_chains_left_associative() {
        assert_eq!(printed("f(1)(2, 3)"), "f(1)(2, 3)");
    }

    #[test]
    fn test_print_then_reparse_is_a_fixed_point() {
        let sources = [
            "1 + 2 * 3",
            "(1 + 2) * 3",
            "-(1 + 2) * 3 - 4 / 5",
            "1 + (2 + 3) * 4",
            "\"a\" + \"b\"",
            "1 < 2 ? 3 * 4 : 5 - 6",
        ];

        for source in sources {
            let first = printed(source);
            let second = printed(&first);

            assert_eq!(first, second, "round-trip diverged for {:?}", source);
        }
    }

    #[test]
    fn test_rpn_rendering() {
        let expr = parse_expr("(1 + 2) * (4 - 3)");

        assert_eq!(RpnPrinter::print(&expr), "1 2 + 4 3 - *");
    }

    #[test]
    fn test_invalid_assignment_target_is_an_error() {
        let tokens = scan("a + b = c");
        let mut diagnostics = Diagnostics::new();

        let expr = Parser::new(&tokens, &mut diagnostics).parse_expression();

        assert!(expr.is_none());
        assert!(diagnostics.had_error());
        assert!(diagnostics.errors()[0].contains("Invalid assignment target"));
    }

    #[test]
    fn test_synchronization_reports_every_bad_statement() {
        let source = "var 1 = 2;\nprint 3;\nvar = 5;\nprint 6;";

        let (statements, diagnostics) = parse_program(source);

        // both malformed declarations reported, both good prints survive
        assert_eq!(diagnostics.errors().len(), 2);
        assert_eq!(statements.len(), 2);
        assert!(statements.iter().all(|s| matches!(s, Stmt::Print(_))));
    }

    #[test]
    fn test_error_diagnostics_carry_line_and_location() {
        let (_, diagnostics) = parse_program("print 1");

        assert!(diagnostics.had_error());
        assert!(diagnostics.errors()[0].contains("[line 1]"));
        assert!(diagnostics.errors()[0].contains(" at end"));
    }

    #[test]
    fn test_for_desugars_into_block_and_while() {
        let (statements, diagnostics) =
            parse_program("for (var i = 0; i < 3; i = i + 1) print i;");

        assert!(!diagnostics.had_error(), "{:?}", diagnostics.errors());
        assert_eq!(statements.len(), 1);

        let Stmt::Block(items) = &statements[0] else {
            panic!("expected initializer block, got {:?}", statements[0]);
        };

        assert!(matches!(items[0], Stmt::Var { .. }));

        let Stmt::While { body, .. } = &items[1] else {
            panic!("expected while loop, got {:?}", items[1]);
        };

        let Stmt::Block(inner) = body.as_ref() else {
            panic!("expected loop body block, got {:?}", body);
        };

        assert!(matches!(inner[0], Stmt::Print(_)));
        assert!(matches!(inner[1], Stmt::Expression(_)));
    }

    #[test]
    fn test_for_without_clauses_defaults_condition_to_true() {
        let (statements, diagnostics) = parse_program("for (;;) print 1;");

        assert!(!diagnostics.had_error(), "{:?}", diagnostics.errors());
        assert_eq!(statements.len(), 1);
        assert!(matches!(statements[0], Stmt::While { .. }));
    }

    #[test]
    fn test_else_binds_to_nearest_if() {
        let (statements, diagnostics) =
            parse_program("if (1) if (2) print 3; else print 4;");

        assert!(!diagnostics.had_error(), "{:?}", diagnostics.errors());

        let Stmt::If {
            then_branch,
            else_branch,
            ..
        } = &statements[0]
        else {
            panic!("expected if, got {:?}", statements[0]);
        };

        // the outer if has no else; the inner one owns it
        assert!(else_branch.is_none());
        assert!(matches!(
            then_branch.as_ref(),
            Stmt::If {
                else_branch: Some(_),
                ..
            }
        ));
    }
}
