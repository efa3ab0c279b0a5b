//! Standalone scaffolding tool: emits the expression and statement enum
//! boilerplate from a name/field table, one output file per family. Pure
//! text generation; the language itself never calls into this.
//!
//! Usage: `generate_ast <output_dir>`

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// A variant field: name and Rust type. An empty name marks a single-field
/// tuple variant.
type Field = (&'static str, &'static str);

const EXPR_TYPES: &[(&str, &[Field])] = &[
    ("Literal", &[("", "LiteralValue")]),
    ("Grouping", &[("", "Box<Expr>")]),
    ("Unary", &[("operator", "Token"), ("right", "Box<Expr>")]),
    (
        "Binary",
        &[
            ("left", "Box<Expr>"),
            ("operator", "Token"),
            ("right", "Box<Expr>"),
        ],
    ),
    (
        "Logical",
        &[
            ("left", "Box<Expr>"),
            ("operator", "Token"),
            ("right", "Box<Expr>"),
        ],
    ),
    (
        "Ternary",
        &[
            ("condition", "Box<Expr>"),
            ("then_branch", "Box<Expr>"),
            ("else_branch", "Box<Expr>"),
        ],
    ),
    ("Variable", &[("name", "Token"), ("id", "usize")]),
    (
        "Assign",
        &[("name", "Token"), ("value", "Box<Expr>"), ("id", "usize")],
    ),
    (
        "Call",
        &[
            ("callee", "Box<Expr>"),
            ("paren", "Token"),
            ("arguments", "Vec<Expr>"),
        ],
    ),
];

const STMT_TYPES: &[(&str, &[Field])] = &[
    ("Expression", &[("", "Expr")]),
    ("Print", &[("", "Expr")]),
    (
        "Var",
        &[("name", "Token"), ("initializer", "Option<Expr>")],
    ),
    ("Block", &[("", "Vec<Stmt>")]),
    (
        "If",
        &[
            ("condition", "Expr"),
            ("then_branch", "Box<Stmt>"),
            ("else_branch", "Option<Box<Stmt>>"),
        ],
    ),
    ("While", &[("condition", "Expr"), ("body", "Box<Stmt>")]),
    ("Function", &[("", "Rc<FunctionDecl>")]),
    (
        "Return",
        &[("keyword", "Token"), ("value", "Option<Expr>")],
    ),
];

/// Render one enum definition from its type table.
fn define_ast(base_name: &str, types: &[(&str, &[Field])], uses: &str) -> String {
    let mut source = String::new();

    source.push_str("// Generated by generate_ast. Regenerate instead of editing in place.\n\n");
    source.push_str(uses);
    source.push_str("\n#[derive(Debug, Clone, PartialEq)]\n");
    source.push_str(&format!("pub enum {} {{\n", base_name));

    for (name, fields) in types {
        match *fields {
            // single anonymous field: tuple variant
            [("", ty)] => {
                source.push_str(&format!("    {}({}),\n", name, ty));
            }

            _ => {
                source.push_str(&format!("    {} {{\n", name));
                for (field, ty) in *fields {
                    source.push_str(&format!("        {}: {},\n", field, ty));
                }
                source.push_str("    },\n");
            }
        }
    }

    source.push_str("}\n");
    source
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: generate_ast <output_dir>");
        std::process::exit(64);
    }

    let output_dir = Path::new(&args[1]);
    fs::create_dir_all(output_dir)
        .context(format!("Failed to create output dir {:?}", output_dir))?;

    let expr_src = define_ast(
        "Expr",
        EXPR_TYPES,
        "use crate::expr::LiteralValue;\nuse crate::token::Token;\n",
    );

    let stmt_src = define_ast(
        "Stmt",
        STMT_TYPES,
        "use std::rc::Rc;\n\nuse crate::expr::Expr;\nuse crate::stmt::FunctionDecl;\nuse crate::token::Token;\n",
    );

    fs::write(output_dir.join("expr.rs"), expr_src).context("Failed to write expr.rs")?;
    fs::write(output_dir.join("stmt.rs"), stmt_src).context("Failed to write stmt.rs")?;

    println!("Wrote expr.rs and stmt.rs to {}", output_dir.display());

    Ok(())
}
