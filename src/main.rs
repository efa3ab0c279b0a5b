use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use rill_lang as rill;

use rill::ast_printer::{AstPrinter, RpnPrinter};
use rill::error::Diagnostics;
use rill::interpreter::Interpreter;
use rill::parser::Parser;
use rill::resolver::Resolver;
use rill::scanner::Scanner;
use rill::token::Token;

#[derive(ClapParser, Debug)]
#[command(version, about = "rill language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: Option<PathBuf>,

        /// Dump the token list as JSON instead of one token per line
        #[arg(long)]
        json: bool,
    },

    /// Parses input from a file as a single expression and prints its AST
    Parse {
        filename: Option<PathBuf>,

        /// Render in reverse-Polish form instead of infix
        #[arg(long)]
        rpn: bool,
    },

    /// Evaluates input from a file as a single expression and prints the result
    Evaluate { filename: Option<PathBuf> },

    /// Runs input from a file as a rill program
    Run { filename: Option<PathBuf> },

    /// Starts an interactive prompt
    Repl,
}

/// Reads the contents of a file into a Vec<u8>, rejecting non-UTF-8 input
/// up front (the scanner relies on it).
fn read_file(filename: PathBuf) -> Result<Vec<u8>> {
    info!("Reading file: {:?}", filename);
    let file = File::open(&filename).context(format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();

    let bytes = reader
        .read_to_end(&mut buf)
        .context(format!("Failed to read file {:?}", filename))?;

    std::str::from_utf8(&buf).context(format!("File {:?} is not valid UTF-8", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    Ok(buf)
}

fn init_logger() -> Result<()> {
    // Create or open the log file
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    // Configure env_logger to write to file with timestamp, module, and
    // source line
    Builder::new()
        .format(|buf, record| {
            // Strip 'rill_lang::' from module path
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("rill_lang::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{} {}:{}] - {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // Default to Debug, override with RUST_LOG
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

/// Scan the buffer, reporting lex errors and returning every good token.
fn scan(source: &[u8], diagnostics: &mut Diagnostics) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::new();

    for result in Scanner::new(source) {
        match result {
            Ok(token) => tokens.push(token),
            Err(e) => diagnostics.report(&e),
        }
    }

    tokens
}

/// Full pipeline over one buffer: scan, parse, resolve, interpret. Static
/// errors stop the pipeline before execution; a runtime error ends the
/// current buffer. All reporting goes through `diagnostics`.
fn run(source: &[u8], interpreter: &mut Interpreter, diagnostics: &mut Diagnostics) {
    let tokens = scan(source, diagnostics);

    let statements = Parser::new(&tokens, diagnostics).parse();

    if diagnostics.had_error() {
        debug!("Static errors reported; skipping resolution and execution");
        return;
    }

    Resolver::new(interpreter, diagnostics).resolve(&statements);

    if diagnostics.had_error() {
        debug!("Resolution errors reported; skipping execution");
        return;
    }

    if let Err(e) = interpreter.interpret(&statements) {
        diagnostics.report(&e);
    }
}

fn repl() -> Result<()> {
    let mut interpreter = Interpreter::new();
    let mut diagnostics = Diagnostics::new();

    let stdout = std::io::stdout();

    print!(
        "Welcome to rill {}.\n\n> ",
        env!("CARGO_PKG_VERSION")
    );
    stdout.lock().flush()?;

    for line in std::io::stdin().lock().lines() {
        let line = line?;

        match line.trim() {
            "/exit" | "/quit" => break,

            "/clear" => print!("\x1bc"),

            "" => {}

            _ => {
                run(line.as_bytes(), &mut interpreter, &mut diagnostics);

                // Errors on one line must not poison the next.
                diagnostics.reset();
            }
        }

        print!("> ");
        stdout.lock().flush()?;
    }

    Ok(())
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    // Initialize logger only if --log flag is provided
    if args.log {
        init_logger()?;
    } else {
        // Initialize a minimal logger to avoid "no logger" errors
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands {
        Commands::Tokenize { filename, json } => match filename {
            Some(filename) => {
                info!("Running Tokenize subcommand");
                let buf = read_file(filename)?;
                let mut diagnostics = Diagnostics::new();

                let tokens = scan(&buf, &mut diagnostics);

                if json {
                    println!("{}", serde_json::to_string_pretty(&tokens)?);
                } else {
                    for token in &tokens {
                        println!("{}", token);
                    }
                }

                if diagnostics.had_error() {
                    debug!("Tokenization failed, exiting with code 65");

                    std::process::exit(65);
                }

                info!("Tokenization completed successfully");
            }
            None => {
                info!("No filepath provided for Tokenize");

                println!("No input filepath was provided. Exiting...");

                std::process::exit(0);
            }
        },

        Commands::Parse { filename, rpn } => match filename {
            Some(filename) => {
                info!("Running Parse subcommand");
                let buf = read_file(filename)?;
                let mut diagnostics = Diagnostics::new();

                let tokens = scan(&buf, &mut diagnostics);
                let expr = Parser::new(&tokens, &mut diagnostics).parse_expression();

                match expr {
                    Some(expr) if !diagnostics.had_error() => {
                        let rendered = if rpn {
                            RpnPrinter::print(&expr)
                        } else {
                            AstPrinter::print(&expr)
                        };

                        debug!("AST: {}", rendered);
                        println!("{}", rendered);
                    }

                    _ => {
                        std::process::exit(65);
                    }
                }

                info!("Parse subcommand completed");
            }
            None => {
                info!("No filepath provided for Parse");
                println!("No input filepath was provided. Exiting...");
                std::process::exit(0);
            }
        },

        Commands::Evaluate { filename } => match filename {
            Some(filename) => {
                info!("Running Evaluate subcommand");

                let buf = read_file(filename)?;
                let mut diagnostics = Diagnostics::new();
                let mut interpreter = Interpreter::new();

                let tokens = scan(&buf, &mut diagnostics);
                let expr = Parser::new(&tokens, &mut diagnostics).parse_expression();

                match expr {
                    Some(expr) if !diagnostics.had_error() => {
                        match interpreter.evaluate(&expr) {
                            Ok(value) => {
                                debug!("Evaluated to: {}", value);
                                println!("{}", value);
                            }

                            Err(e) => {
                                diagnostics.report(&e);
                                std::process::exit(70);
                            }
                        }
                    }

                    _ => {
                        std::process::exit(65);
                    }
                }

                info!("Evaluate subcommand completed");
            }

            None => {
                info!("No filepath provided for Evaluate");
                println!("No input filepath was provided. Exiting...");
                std::process::exit(0);
            }
        },

        Commands::Run { filename } => match filename {
            Some(filename) => {
                info!("Running Run subcommand");
                let buf = read_file(filename)?;

                let mut diagnostics = Diagnostics::new();
                let mut interpreter = Interpreter::new();

                run(&buf, &mut interpreter, &mut diagnostics);

                if diagnostics.had_error() {
                    std::process::exit(65);
                }

                if diagnostics.had_runtime_error() {
                    std::process::exit(70);
                }

                info!("Program executed successfully");
            }

            None => {
                info!("No filepath provided for Run");
                println!("No input filepath was provided. Exiting...");
                std::process::exit(0);
            }
        },

        Commands::Repl => {
            info!("Starting REPL");
            repl()?;
        }
    }

    Ok(())
}
