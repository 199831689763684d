pub mod environment;
pub mod value;

use std::cell::RefCell;
use std::rc::Rc;

use crate::diagnostics::Diagnostics;
use crate::interpreter::environment::Environment;
use crate::interpreter::value::{Function, Value};
use crate::parser::ast::{BinaryOp, Expr, ExprKind, Program, Stmt, StmtKind, UnaryOp};

#[derive(Debug, Clone)]
pub struct RuntimeError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

/// Non-local control transfer during execution. A `Return` is ordinary
/// control flow that unwinds to the nearest call boundary; only `Error`
/// represents an actual failure.
pub enum Interrupt {
    Return(Value),
    Error(RuntimeError),
}

pub struct Interpreter<'a> {
    env: Rc<RefCell<Environment>>,
    output: Vec<String>,
    diagnostics: &'a mut Diagnostics,
    on_output: Box<dyn FnMut(&str) + 'a>,
}

impl<'a> Interpreter<'a> {
    pub fn new(diagnostics: &'a mut Diagnostics) -> Self {
        Self::with_output(diagnostics, Box::new(|_| {}))
    }

    /// The sink is invoked synchronously once per print, in program order.
    pub fn with_output(
        diagnostics: &'a mut Diagnostics,
        on_output: Box<dyn FnMut(&str) + 'a>,
    ) -> Self {
        Interpreter {
            env: Rc::new(RefCell::new(Environment::new())),
            output: Vec::new(),
            diagnostics,
            on_output,
        }
    }

    /// Execute a program against a fresh global scope and return the ordered
    /// print output. The first runtime failure aborts the remaining
    /// statements and is recorded as a single runtime diagnostic.
    pub fn interpret(&mut self, program: &Program) -> Vec<String> {
        self.output.clear();

        for stmt in &program.body {
            match self.execute(stmt) {
                Ok(()) => {}
                // A 'return' outside any function stops the program quietly
                Err(Interrupt::Return(_)) => break,
                Err(Interrupt::Error(error)) => {
                    self.diagnostics
                        .report_runtime(error.message, error.line, error.column);
                    break;
                }
            }
        }

        self.output.clone()
    }

    fn execute(&mut self, stmt: &Stmt) -> Result<(), Interrupt> {
        match &stmt.kind {
            StmtKind::Var {
                name,
                initializer,
                is_const,
            } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Null,
                };
                self.env
                    .borrow_mut()
                    .define(name, value, *is_const)
                    .map_err(|message| self.error_at(stmt.line, stmt.column, message))?;
                Ok(())
            }

            StmtKind::Function { name, params, body } => {
                let function = Value::Function(Rc::new(Function {
                    name: name.clone(),
                    params: params.clone(),
                    body: Rc::clone(body),
                    // Captured now, at the declaration site
                    closure: Rc::clone(&self.env),
                }));
                self.env
                    .borrow_mut()
                    .define(name, function, false)
                    .map_err(|message| self.error_at(stmt.line, stmt.column, message))?;
                Ok(())
            }

            StmtKind::If {
                condition,
                consequent,
                alternate,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(consequent)
                } else if let Some(alternate) = alternate {
                    // The alternate is a block or another if (else-if chain)
                    self.execute(alternate)
                } else {
                    Ok(())
                }
            }

            StmtKind::While { condition, body } => {
                // The body is a block, so every iteration gets a fresh frame
                while self.evaluate(condition)?.is_truthy() {
                    self.execute(body)?;
                }
                Ok(())
            }

            StmtKind::Return(value) => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Null,
                };
                Err(Interrupt::Return(value))
            }

            StmtKind::Print(expr) => {
                let value = self.evaluate(expr)?;
                let text = value.to_string();
                self.output.push(text.clone());
                (self.on_output)(&text);
                Ok(())
            }

            StmtKind::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(())
            }

            StmtKind::Block(body) => {
                let child = Rc::new(RefCell::new(Environment::with_parent(Rc::clone(
                    &self.env,
                ))));
                self.execute_block(body, child)
            }
        }
    }

    /// Run statements with `env` installed as the active frame, restoring the
    /// previous frame on every exit path (normal, return, and failure).
    fn execute_block(
        &mut self,
        statements: &[Stmt],
        env: Rc<RefCell<Environment>>,
    ) -> Result<(), Interrupt> {
        let previous = std::mem::replace(&mut self.env, env);

        let mut result = Ok(());
        for stmt in statements {
            result = self.execute(stmt);
            if result.is_err() {
                break;
            }
        }

        self.env = previous;
        result
    }

    fn evaluate(&mut self, expr: &Expr) -> Result<Value, Interrupt> {
        match &expr.kind {
            ExprKind::Number(n) => Ok(Value::Num(*n)),
            ExprKind::Str(s) => Ok(Value::Str(s.clone())),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Null => Ok(Value::Null),

            ExprKind::Identifier(name) => self
                .env
                .borrow()
                .get(name)
                .map_err(|message| self.error(expr, message)),

            ExprKind::Assign { target, value } => {
                let value = self.evaluate(value)?;
                self.env
                    .borrow_mut()
                    .assign(target, value.clone())
                    .map_err(|message| self.error(expr, message))?;
                Ok(value)
            }

            ExprKind::Unary { operator, operand } => {
                let value = self.evaluate(operand)?;
                match operator {
                    UnaryOp::Minus => match value {
                        Value::Num(n) => Ok(Value::Num(-n)),
                        other => Err(self.error(
                            expr,
                            format!("Cannot apply '-' to {}", other.type_name()),
                        )),
                    },
                    UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
                }
            }

            ExprKind::Binary {
                operator,
                left,
                right,
            } => {
                // Both sides are always evaluated, including for 'and'/'or':
                // the logical operators do not short-circuit
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                self.apply_binary(*operator, left, right, expr)
            }

            ExprKind::Call { callee, arguments } => {
                let callee_value = self.evaluate(callee)?;

                let mut args = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    args.push(self.evaluate(argument)?);
                }

                let function = match &callee_value {
                    Value::Function(function) => Rc::clone(function),
                    _ => return Err(self.error(expr, "Can only call functions".to_string())),
                };

                if args.len() != function.params.len() {
                    return Err(self.error(
                        expr,
                        format!(
                            "Function '{}' expects {} arguments, but got {}",
                            function.name,
                            function.params.len(),
                            args.len()
                        ),
                    ));
                }

                // Parameters live in a child of the frame captured at the
                // declaration site, not of the caller's frame
                let call_env = Rc::new(RefCell::new(Environment::with_parent(Rc::clone(
                    &function.closure,
                ))));
                for (param, arg) in function.params.iter().zip(args) {
                    call_env
                        .borrow_mut()
                        .define(param, arg, false)
                        .map_err(|message| self.error(expr, message))?;
                }

                let StmtKind::Block(body) = &function.body.kind else {
                    return Err(self.error(
                        expr,
                        format!("Function '{}' has no block body", function.name),
                    ));
                };

                match self.execute_block(body, call_env) {
                    Ok(()) => Ok(Value::Null),
                    Err(Interrupt::Return(value)) => Ok(value),
                    Err(error) => Err(error),
                }
            }

            ExprKind::Index { object, index } => {
                let object = self.evaluate(object)?;
                let index = self.evaluate(index)?;

                let Value::Array(elements) = &object else {
                    return Err(self.error(expr, "Can only index into arrays".to_string()));
                };
                let Value::Num(n) = index else {
                    return Err(self.error(expr, "Array index must be a number".to_string()));
                };

                let elements = elements.borrow();
                if n < 0.0 || n >= elements.len() as f64 {
                    return Err(self.error(
                        expr,
                        format!(
                            "Array index {} out of bounds (array length: {})",
                            Value::Num(n),
                            elements.len()
                        ),
                    ));
                }

                Ok(elements[n as usize].clone())
            }

            ExprKind::Array(elements) => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.evaluate(element)?);
                }
                Ok(Value::Array(Rc::new(RefCell::new(values))))
            }
        }
    }

    fn apply_binary(
        &self,
        operator: BinaryOp,
        left: Value,
        right: Value,
        expr: &Expr,
    ) -> Result<Value, Interrupt> {
        match operator {
            BinaryOp::Add => match (&left, &right) {
                // String concatenation wins when either side is a string
                (Value::Str(_), _) | (_, Value::Str(_)) => {
                    Ok(Value::Str(format!("{}{}", left, right)))
                }
                (Value::Num(a), Value::Num(b)) => Ok(Value::Num(a + b)),
                _ => Err(self.type_error(operator, &left, &right, expr)),
            },
            BinaryOp::Sub => match (&left, &right) {
                (Value::Num(a), Value::Num(b)) => Ok(Value::Num(a - b)),
                _ => Err(self.type_error(operator, &left, &right, expr)),
            },
            BinaryOp::Mul => match (&left, &right) {
                (Value::Num(a), Value::Num(b)) => Ok(Value::Num(a * b)),
                _ => Err(self.type_error(operator, &left, &right, expr)),
            },
            BinaryOp::Div => match (&left, &right) {
                (Value::Num(_), Value::Num(b)) if *b == 0.0 => {
                    Err(self.error(expr, "Division by zero".to_string()))
                }
                (Value::Num(a), Value::Num(b)) => Ok(Value::Num(a / b)),
                _ => Err(self.type_error(operator, &left, &right, expr)),
            },
            BinaryOp::Rem => match (&left, &right) {
                (Value::Num(a), Value::Num(b)) => Ok(Value::Num(a % b)),
                _ => Err(self.type_error(operator, &left, &right, expr)),
            },
            BinaryOp::Greater => self.numeric_comparison(operator, &left, &right, expr, |a, b| a > b),
            BinaryOp::GreaterEqual => {
                self.numeric_comparison(operator, &left, &right, expr, |a, b| a >= b)
            }
            BinaryOp::Less => self.numeric_comparison(operator, &left, &right, expr, |a, b| a < b),
            BinaryOp::LessEqual => {
                self.numeric_comparison(operator, &left, &right, expr, |a, b| a <= b)
            }
            BinaryOp::Equal => Ok(Value::Bool(left == right)),
            BinaryOp::NotEqual => Ok(Value::Bool(left != right)),
            BinaryOp::And => Ok(Value::Bool(left.is_truthy() && right.is_truthy())),
            BinaryOp::Or => Ok(Value::Bool(left.is_truthy() || right.is_truthy())),
        }
    }

    fn numeric_comparison(
        &self,
        operator: BinaryOp,
        left: &Value,
        right: &Value,
        expr: &Expr,
        compare: fn(f64, f64) -> bool,
    ) -> Result<Value, Interrupt> {
        match (left, right) {
            (Value::Num(a), Value::Num(b)) => Ok(Value::Bool(compare(*a, *b))),
            _ => Err(self.type_error(operator, left, right, expr)),
        }
    }

    fn type_error(&self, operator: BinaryOp, left: &Value, right: &Value, expr: &Expr) -> Interrupt {
        self.error(
            expr,
            format!(
                "Cannot apply '{}' to {} and {}",
                operator,
                left.type_name(),
                right.type_name()
            ),
        )
    }

    fn error(&self, expr: &Expr, message: String) -> Interrupt {
        self.error_at(expr.line, expr.column, message)
    }

    fn error_at(&self, line: usize, column: usize, message: String) -> Interrupt {
        Interrupt::Error(RuntimeError {
            message,
            line,
            column,
        })
    }
}
