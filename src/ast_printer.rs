//! Debug renderers for expression trees.
//!
//! [`AstPrinter`] emits a fully parenthesized infix form that the parser
//! accepts back: printing a tree and reparsing the output yields a
//! semantically identical tree, and the printed form is a fixed point
//! (groupings are transparent, so explicit parentheses do not accumulate).
//! [`RpnPrinter`] emits a reverse-Polish rendering of the same tree.

use crate::expr::{Expr, LiteralValue};

/// Render a literal the way source code spells it. Integral numbers print
/// without a fraction so the output reparses to the same value.
fn literal(lit: &LiteralValue) -> String {
    match lit {
        LiteralValue::True => "true".into(),

        LiteralValue::False => "false".into(),

        LiteralValue::Nil => "nil".into(),

        LiteralValue::Str(s) => format!("\"{}\"", s),

        LiteralValue::Number(n) => {
            if n.fract() == 0.0 {
                format!("{:.0}", n)
            } else {
                n.to_string()
            }
        }
    }
}

/// Fully parenthesized infix renderer.
pub struct AstPrinter;

impl AstPrinter {
    pub fn print(expr: &Expr) -> String {
        match expr {
            Expr::Literal(lit) => literal(lit),

            // Transparent: explicit grouping carries no extra meaning over
            // the parentheses every compound form already prints.
            Expr::Grouping(inner) => Self::print(inner),

            Expr::Unary { operator, right } => {
                format!("({}{})", operator.lexeme, Self::print(right))
            }

            Expr::Binary {
                left,
                operator,
                right,
            }
            | Expr::Logical {
                left,
                operator,
                right,
            } => format!(
                "({} {} {})",
                Self::print(left),
                operator.lexeme,
                Self::print(right)
            ),

            Expr::Ternary {
                condition,
                then_branch,
                else_branch,
            } => format!(
                "({} ? {} : {})",
                Self::print(condition),
                Self::print(then_branch),
                Self::print(else_branch)
            ),

            Expr::Variable { name, .. } => name.lexeme.clone(),

            Expr::Assign { name, value, .. } => {
                format!("({} = {})", name.lexeme, Self::print(value))
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                let args: Vec<String> = arguments.iter().map(Self::print).collect();

                format!("{}({})", Self::print(callee), args.join(", "))
            }
        }
    }
}

/// Reverse-Polish renderer: operands first, operator last, groupings elided.
pub struct RpnPrinter;

impl RpnPrinter {
    pub fn print(expr: &Expr) -> String {
        match expr {
            Expr::Literal(lit) => literal(lit),

            Expr::Grouping(inner) => Self::print(inner),

            Expr::Unary { operator, right } => {
                format!("{} {}", Self::print(right), operator.lexeme)
            }

            Expr::Binary {
                left,
                operator,
                right,
            }
            | Expr::Logical {
                left,
                operator,
                right,
            } => format!(
                "{} {} {}",
                Self::print(left),
                Self::print(right),
                operator.lexeme
            ),

            Expr::Ternary {
                condition,
                then_branch,
                else_branch,
            } => format!(
                "{} {} {} ?:",
                Self::print(condition),
                Self::print(then_branch),
                Self::print(else_branch)
            ),

            Expr::Variable { name, .. } => name.lexeme.clone(),

            Expr::Assign { name, value, .. } => {
                format!("{} {} =", Self::print(value), name.lexeme)
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                let mut s = Self::print(callee);
                for arg in arguments {
                    s.push(' ');
                    s.push_str(&Self::print(arg));
                }
                s.push_str(" call");
                s
            }
        }
    }
}
