//! Tree-walking evaluator.
//!
//! Statements execute against a chain of environments rooted at the globals.
//! Every statement dispatcher returns a [`Flow`] outcome so that `return`
//! unwinds as ordinary control flow: blocks and loops stop and propagate
//! `Flow::Return`, and only the function-call boundary unwraps it into a
//! value. Runtime errors travel separately through the crate `Result` and
//! abort the current `interpret` call.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::{SystemTime, SystemTimeError, UNIX_EPOCH};

use log::{debug, info};

use crate::environment::Environment;
use crate::error::{Result, RillError};
use crate::expr::{Expr, LiteralValue};
use crate::stmt::Stmt;
use crate::token::{Token, TokenType};
use crate::value::{Function, NativeFn, Value};

/// Outcome of executing one statement.
///
/// `Return` carries the value of an executed `return` statement upward until
/// a function-call boundary consumes it. It passes *through* block and loop
/// exits untouched.
#[derive(Debug)]
pub enum Flow {
    Normal,
    Return(Value),
}

/// The native `clock` binding: elapsed seconds as a float.
fn clock_native(
    _interpreter: &mut Interpreter,
    _args: &[Value],
) -> std::result::Result<Value, String> {
    debug!("Calling native function 'clock'");

    let timestamp: f64 = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e: SystemTimeError| format!("Clock error: {}", e))?
        .as_secs_f64();

    Ok(Value::Number(timestamp))
}

pub struct Interpreter {
    /// Process-lifetime global scope; also the root of every chain.
    globals: Rc<RefCell<Environment>>,

    /// Innermost environment of the statement currently executing.
    environment: Rc<RefCell<Environment>>,

    /// Resolver side-table: variable-occurrence identity to hop count.
    /// Written once before execution, read-only afterwards. A missing entry
    /// means the occurrence resolves against the globals.
    locals: HashMap<usize, usize>,

    /// Print destination. Stdout in the CLI; tests inject a buffer.
    out: Rc<RefCell<dyn Write>>,
}

impl Interpreter {
    /// Creates a new Interpreter printing to stdout, with the native
    /// `clock` function defined in the globals.
    pub fn new() -> Self {
        Self::with_output(Rc::new(RefCell::new(io::stdout())))
    }

    /// Creates a new Interpreter printing to the given writer.
    pub fn with_output(out: Rc<RefCell<dyn Write>>) -> Self {
        info!("Initializing Interpreter");

        let globals = Rc::new(RefCell::new(Environment::new()));

        debug!("Defining native function 'clock'");

        globals.borrow_mut().define(
            "clock",
            Value::Native(Rc::new(NativeFn {
                name: "clock",
                arity: 0,
                func: clock_native,
            })),
        );

        Self {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            out,
        }
    }

    /// Record a resolved local: `id` hops `depth` scopes at runtime.
    /// Called by the resolver; each occurrence is recorded at most once.
    pub fn note_local(&mut self, id: usize, depth: usize) {
        self.locals.insert(id, depth);
    }

    /// Interprets a list of statements (a "program").
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<()> {
        debug!("Interpreting {} statements", statements.len());

        for stmt in statements {
            // the resolver rejects top-level `return`, so the outcome here
            // is always Normal
            self.execute(stmt)?;
        }

        info!("Interpretation completed successfully");
        Ok(())
    }

    /// Executes a single statement.
    fn execute(&mut self, stmt: &Stmt) -> Result<Flow> {
        match stmt {
            Stmt::Expression(expr) => {
                let _ = self.evaluate(expr)?;
                Ok(Flow::Normal)
            }

            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                writeln!(&mut *self.out.borrow_mut(), "{}", value)?;
                Ok(Flow::Normal)
            }

            Stmt::Var { name, initializer } => {
                debug!("Defining variable '{}'", name.lexeme);

                let value = if let Some(expr) = initializer {
                    self.evaluate(expr)?
                } else {
                    Value::Nil
                };
                self.environment.borrow_mut().define(&name.lexeme, value);
                Ok(Flow::Normal)
            }

            Stmt::Block(statements) => {
                let environment = Environment::with_enclosing(Rc::clone(&self.environment));
                self.execute_block(statements, environment)
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if is_truthy(&self.evaluate(condition)?) {
                    self.execute(then_branch)
                } else if let Some(else_stmt) = else_branch {
                    self.execute(else_stmt)
                } else {
                    Ok(Flow::Normal)
                }
            }

            Stmt::While { condition, body } => {
                while is_truthy(&self.evaluate(condition)?) {
                    match self.execute(body)? {
                        Flow::Normal => {}
                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                }
                Ok(Flow::Normal)
            }

            Stmt::Function(decl) => {
                debug!("Defining function '{}'", decl.name.lexeme);

                // The *current* environment is the closure, so the function
                // sees later mutations of its defining scope.
                let function = Value::Function(Rc::new(Function {
                    declaration: Rc::clone(decl),
                    closure: Rc::clone(&self.environment),
                }));
                self.environment
                    .borrow_mut()
                    .define(&decl.name.lexeme, function);
                Ok(Flow::Normal)
            }

            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                Ok(Flow::Return(value))
            }
        }
    }

    /// Execute `statements` against a fresh environment, restoring the
    /// previous one on **every** exit path (completion, return, or error).
    fn execute_block(&mut self, statements: &[Stmt], environment: Environment) -> Result<Flow> {
        let previous: Rc<RefCell<Environment>> = Rc::clone(&self.environment);
        self.environment = Rc::new(RefCell::new(environment));

        let mut outcome: Result<Flow> = Ok(Flow::Normal);

        for stmt in statements {
            match self.execute(stmt) {
                Ok(Flow::Normal) => {}

                other => {
                    outcome = other;
                    break;
                }
            }
        }

        self.environment = previous;
        outcome
    }

    /// Evaluates an expression and returns a Value.
    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(literal) => Ok(literal_value(literal)),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => self.evaluate_unary(operator, right),

            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                // Short-circuit: the result is the deciding operand itself.
                let left_val = self.evaluate(left)?;

                if operator.token_type == TokenType::OR {
                    if is_truthy(&left_val) {
                        return Ok(left_val);
                    }
                } else if !is_truthy(&left_val) {
                    return Ok(left_val);
                }

                self.evaluate(right)
            }

            Expr::Ternary {
                condition,
                then_branch,
                else_branch,
            } => {
                // Only the selected branch is evaluated.
                if is_truthy(&self.evaluate(condition)?) {
                    self.evaluate(then_branch)
                } else {
                    self.evaluate(else_branch)
                }
            }

            Expr::Variable { name, id } => self.look_up_variable(name, *id),

            Expr::Assign { name, value, id } => {
                let value = self.evaluate(value)?;

                match self.locals.get(id) {
                    Some(&distance) => Environment::assign_at(
                        &self.environment,
                        distance,
                        &name.lexeme,
                        value.clone(),
                        name.line,
                    )?,

                    None => {
                        self.globals
                            .borrow_mut()
                            .assign(&name.lexeme, value.clone(), name.line)?
                    }
                }

                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                debug!("Evaluating function call");

                let callee_val = self.evaluate(callee)?;

                let mut args: Vec<Value> = Vec::with_capacity(arguments.len());
                for arg in arguments {
                    args.push(self.evaluate(arg)?);
                }

                self.invoke_callable(callee_val, paren, args)
            }
        }
    }

    /// Resolver-guided variable read: hop the recorded distance, or fall
    /// back to the globals when no distance was recorded.
    fn look_up_variable(&self, name: &Token, id: usize) -> Result<Value> {
        match self.locals.get(&id) {
            Some(&distance) => {
                Environment::get_at(&self.environment, distance, &name.lexeme, name.line)
            }

            None => self.globals.borrow().get(&name.lexeme, name.line),
        }
    }

    /// Evaluates a unary expression.
    fn evaluate_unary(&mut self, op: &Token, expr: &Expr) -> Result<Value> {
        let right_val = self.evaluate(expr)?;

        match op.token_type {
            TokenType::MINUS => {
                if let Value::Number(n) = right_val {
                    Ok(Value::Number(-n))
                } else {
                    Err(RillError::runtime(op.line, "Operand must be a number"))
                }
            }

            TokenType::BANG => Ok(Value::Bool(!is_truthy(&right_val))),

            _ => Err(RillError::runtime(op.line, "Invalid unary operator")),
        }
    }

    /// Evaluates a binary expression.
    fn evaluate_binary(&mut self, left: &Expr, op: &Token, right: &Expr) -> Result<Value> {
        let left_val = self.evaluate(left)?;
        let right_val = self.evaluate(right)?;

        match op.token_type {
            TokenType::PLUS => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
                _ => Err(RillError::runtime(
                    op.line,
                    "Operands must be two numbers or two strings",
                )),
            },

            TokenType::MINUS => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a - b)),
                _ => Err(RillError::runtime(op.line, "Operands must be numbers")),
            },

            TokenType::STAR => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a * b)),
                _ => Err(RillError::runtime(op.line, "Operands must be numbers")),
            },

            // IEEE semantics throughout: x/0 is an infinity and 0/0 is NaN,
            // which is what makes the NaN equality rule below observable.
            TokenType::SLASH => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a / b)),
                _ => Err(RillError::runtime(op.line, "Operands must be numbers")),
            },

            TokenType::EQUAL_EQUAL => Ok(Value::Bool(is_equal(&left_val, &right_val))),

            TokenType::BANG_EQUAL => Ok(Value::Bool(!is_equal(&left_val, &right_val))),

            TokenType::LESS => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a < b)),
                _ => Err(RillError::runtime(op.line, "Operands must be numbers")),
            },

            TokenType::LESS_EQUAL => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a <= b)),
                _ => Err(RillError::runtime(op.line, "Operands must be numbers")),
            },

            TokenType::GREATER => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a > b)),
                _ => Err(RillError::runtime(op.line, "Operands must be numbers")),
            },

            TokenType::GREATER_EQUAL => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a >= b)),
                _ => Err(RillError::runtime(op.line, "Operands must be numbers")),
            },

            _ => Err(RillError::runtime(op.line, "Invalid binary operator")),
        }
    }

    /// Invokes a callable (native or user-defined function).
    fn invoke_callable(&mut self, callee: Value, paren: &Token, args: Vec<Value>) -> Result<Value> {
        match callee {
            Value::Native(native) => {
                debug!("Calling native function '{}'", native.name);

                if args.len() != native.arity {
                    return Err(RillError::runtime(
                        paren.line,
                        format!("Expected {} arguments but got {}", native.arity, args.len()),
                    ));
                }

                (native.func)(self, &args).map_err(|msg| RillError::runtime(paren.line, msg))
            }

            Value::Function(function) => {
                debug!(
                    "Calling user-defined function '{}'",
                    function.declaration.name.lexeme
                );

                let arity: usize = function.declaration.params.len();
                if args.len() != arity {
                    return Err(RillError::runtime(
                        paren.line,
                        format!("Expected {} arguments but got {}", arity, args.len()),
                    ));
                }

                // Chain onto the captured closure, not the caller's
                // environment: lexical scoping.
                let mut environment = Environment::with_enclosing(Rc::clone(&function.closure));

                for (param, arg) in function.declaration.params.iter().zip(args) {
                    environment.define(&param.lexeme, arg);
                }

                match self.execute_block(&function.declaration.body, environment)? {
                    Flow::Return(value) => Ok(value),
                    Flow::Normal => Ok(Value::Nil),
                }
            }

            _ => Err(RillError::runtime(paren.line, "Can only call functions")),
        }
    }
}

/// Convert a parsed literal into its runtime value.
fn literal_value(literal: &LiteralValue) -> Value {
    match literal {
        LiteralValue::Number(n) => Value::Number(*n),
        LiteralValue::Str(s) => Value::String(s.clone()),
        LiteralValue::True => Value::Bool(true),
        LiteralValue::False => Value::Bool(false),
        LiteralValue::Nil => Value::Nil,
    }
}

/// Only `nil` and `false` are falsy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Nil => false,
        Value::Bool(b) => *b,
        _ => true,
    }
}

/// Type-then-value equality, with one deliberate deviation from the host's
/// float semantics: two NaN numbers compare equal to each other.
fn is_equal(left: &Value, right: &Value) -> bool {
    if let (Value::Number(a), Value::Number(b)) = (left, right) {
        if a.is_nan() && b.is_nan() {
            return true;
        }
    }

    left == right
}
