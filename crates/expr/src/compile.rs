//! Postfix to closure-tree compilation and evaluation.
//!
//! A single pass over the postfix program fills three tables: literal constants,
//! argument slots (one per free variable, in order of first appearance) and
//! compiled nodes. Every node is a boxed closure that captures only operand
//! indices into those tables, so evaluating an expression walks the node tree
//! once without touching the source text again.

use crate::builtins::{self, Builtin};
use crate::options::CompileOptions;
use crate::postfix::{to_postfix, BinaryOp, Instr, UnaryOp};
use crate::token::tokenize;
use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;
use strata_core::{Error, Result, Value};

type Eval = Box<dyn Fn(&Frame<'_>) -> Result<Value>>;

/// Where an operand lives during evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Operand {
    Constant(usize),
    Argument(usize),
    Node(usize),
}

struct Frame<'a> {
    constants: &'a [Value],
    arguments: &'a [Value],
    nodes: &'a [Eval],
}

impl Frame<'_> {
    fn get(&self, operand: Operand) -> Result<Value> {
        match operand {
            Operand::Constant(i) => Ok(self.constants[i].clone()),
            Operand::Argument(i) => Ok(self.arguments[i].clone()),
            Operand::Node(i) => (self.nodes[i])(self),
        }
    }
}

fn unary(op: UnaryOp, value: &Value) -> Result<Value> {
    match op {
        UnaryOp::Neg => value.try_neg(),
        UnaryOp::Pos => value.try_pos(),
        UnaryOp::Invert => value.try_invert(),
        UnaryOp::Not => Ok(Value::Boolean(!value.is_truthy())),
    }
}

fn ordering(op: BinaryOp, left: &Value, right: &Value) -> Result<bool> {
    let order = builtins::compare(op.symbol(), left, right)?;
    Ok(match (op, order) {
        (_, None) => false,
        (BinaryOp::Lt, Some(o)) => o == Ordering::Less,
        (BinaryOp::Le, Some(o)) => o != Ordering::Greater,
        (BinaryOp::Gt, Some(o)) => o == Ordering::Greater,
        (_, Some(o)) => o != Ordering::Less,
    })
}

fn is_nan(value: &Value) -> bool {
    matches!(value, Value::Float64(f) if f.is_nan())
}

fn equal(left: &Value, right: &Value) -> bool {
    !is_nan(left) && !is_nan(right) && left == right
}

/// Same kind and equal value; `1 is 1.0` is false.
fn identical(left: &Value, right: &Value) -> bool {
    left.type_name() == right.type_name() && equal(left, right)
}

fn binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value> {
    use BinaryOp::*;
    match op {
        Add => left.try_add(right),
        Sub => left.try_sub(right),
        Mul => left.try_mul(right),
        Div => left.try_div(right),
        FloorDiv => left.try_floor_div(right),
        Rem => left.try_rem(right),
        Pow => left.try_pow(right),
        BitAnd => left.try_bit_and(right),
        BitOr => left.try_bit_or(right),
        BitXor => left.try_bit_xor(right),
        Shl => left.try_shl(right),
        Shr => left.try_shr(right),
        Eq => Ok(Value::Boolean(equal(left, right))),
        Ne => Ok(Value::Boolean(!equal(left, right))),
        Lt | Le | Gt | Ge => ordering(op, left, right).map(Value::Boolean),
        In => right.try_contains(left).map(Value::Boolean),
        NotIn => right.try_contains(left).map(|found| Value::Boolean(!found)),
        Is => Ok(Value::Boolean(identical(left, right))),
        IsNot => Ok(Value::Boolean(!identical(left, right))),
        // short-circuit forms are compiled separately
        And => Ok(Value::Boolean(left.is_truthy() && right.is_truthy())),
        Or => Ok(Value::Boolean(left.is_truthy() || right.is_truthy())),
    }
}

struct Compiler<'o> {
    options: &'o CompileOptions,
    constants: Vec<Value>,
    fields: Vec<String>,
    nodes: Vec<Eval>,
    stack: Vec<Operand>,
}

impl<'o> Compiler<'o> {
    fn new(options: &'o CompileOptions) -> Self {
        Self {
            options,
            constants: Vec::new(),
            fields: Vec::new(),
            nodes: Vec::new(),
            stack: Vec::new(),
        }
    }

    fn constant(&mut self, value: Value) -> Operand {
        self.constants.push(value);
        Operand::Constant(self.constants.len() - 1)
    }

    fn argument(&mut self, name: &str) -> Operand {
        let index = match self.fields.iter().position(|f| f == name) {
            Some(index) => index,
            None => {
                self.fields.push(String::from(name));
                self.fields.len() - 1
            }
        };
        Operand::Argument(index)
    }

    fn node(&mut self, eval: Eval) -> Operand {
        self.nodes.push(eval);
        Operand::Node(self.nodes.len() - 1)
    }

    fn pop(&mut self) -> Result<Operand> {
        self.stack
            .pop()
            .ok_or_else(|| Error::compile("malformed expression", 0))
    }

    fn pop_many(&mut self, count: usize) -> Result<Vec<Operand>> {
        if self.stack.len() < count {
            return Err(Error::compile("malformed expression", 0));
        }
        Ok(self.stack.split_off(self.stack.len() - count))
    }

    fn name(&mut self, name: &str, position: usize) -> Result<Operand> {
        let Some((module, member)) = name.split_once('.') else {
            return Ok(self.argument(name));
        };
        if !self.options.allows_module(module) {
            return Err(Error::compile(
                format!("name '{}' is not allowed", name),
                position,
            ));
        }
        if let Some(value) = builtins::find_constant(module, member) {
            return Ok(self.constant(Value::Float64(value)));
        }
        let message = if builtins::find_member(module, member).is_some() {
            format!("function '{}' must be called", name)
        } else {
            format!("module '{}' has no member '{}'", module, member)
        };
        Err(Error::compile(message, position))
    }

    fn resolve_call(&self, name: &str, position: usize) -> Result<&'static Builtin> {
        let found = match name.split_once('.') {
            Some((module, member)) if self.options.allows_module(module) => {
                builtins::find_member(module, member)
            }
            Some(_) => None,
            None if self.options.allows_builtin(name) => builtins::find_builtin(name),
            None => None,
        };
        found.ok_or_else(|| Error::compile(format!("'{}' is not an allowed function", name), position))
    }

    fn instr(&mut self, instr: Instr) -> Result<()> {
        let operand = match instr {
            Instr::Constant(value) => self.constant(value),
            Instr::Name { name, position } => self.name(&name, position)?,
            Instr::Unary(op) => {
                let value = self.pop()?;
                self.node(Box::new(move |frame: &Frame<'_>| unary(op, &frame.get(value)?)))
            }
            Instr::Binary(BinaryOp::And) => {
                let right = self.pop()?;
                let left = self.pop()?;
                self.node(Box::new(move |frame: &Frame<'_>| {
                    if !frame.get(left)?.is_truthy() {
                        return Ok(Value::Boolean(false));
                    }
                    Ok(Value::Boolean(frame.get(right)?.is_truthy()))
                }))
            }
            Instr::Binary(BinaryOp::Or) => {
                let right = self.pop()?;
                let left = self.pop()?;
                self.node(Box::new(move |frame: &Frame<'_>| {
                    if frame.get(left)?.is_truthy() {
                        return Ok(Value::Boolean(true));
                    }
                    Ok(Value::Boolean(frame.get(right)?.is_truthy()))
                }))
            }
            Instr::Binary(op) => {
                let right = self.pop()?;
                let left = self.pop()?;
                self.node(Box::new(move |frame: &Frame<'_>| {
                    binary(op, &frame.get(left)?, &frame.get(right)?)
                }))
            }
            Instr::Call {
                name,
                argc,
                position,
            } => {
                let builtin = self.resolve_call(&name, position)?;
                if !builtin.arity.accepts(argc) {
                    return Err(Error::compile(
                        format!("{}() takes {}, {} given", name, builtin.arity.describe(), argc),
                        position,
                    ));
                }
                let args = self.pop_many(argc)?;
                let function = builtin.function;
                self.node(Box::new(move |frame: &Frame<'_>| {
                    let values = args
                        .iter()
                        .map(|arg| frame.get(*arg))
                        .collect::<Result<Vec<_>>>()?;
                    function(&values)
                }))
            }
            Instr::Tuple(count) => {
                let items = self.pop_many(count)?;
                self.node(Box::new(move |frame: &Frame<'_>| {
                    items
                        .iter()
                        .map(|item| frame.get(*item))
                        .collect::<Result<Vec<_>>>()
                        .map(Value::Tuple)
                }))
            }
        };
        self.stack.push(operand);
        Ok(())
    }
}

/// A compiled formula.
///
/// Free variables become the ordered parameter list (`fields`); calling the
/// expression binds one value per field, positionally or by name.
///
/// # Example
///
/// ```rust
/// use strata_core::Value;
/// use strata_expr::Expression;
///
/// let expr = Expression::compile("sum(a) - sum(b)").unwrap();
/// assert_eq!(expr.fields(), ["a", "b"]);
///
/// let a = Value::Tuple(vec![Value::from(1), Value::from(2)]);
/// let b = Value::Tuple(vec![Value::from(1)]);
/// assert_eq!(expr.call(&[a, b]).unwrap(), Value::from(2));
/// ```
pub struct Expression {
    source: String,
    fields: Vec<String>,
    constants: Vec<Value>,
    nodes: Vec<Eval>,
    root: Operand,
}

impl Expression {
    /// Compiles formula text with the default allow-list.
    pub fn compile(source: &str) -> Result<Self> {
        Self::compile_with(source, &CompileOptions::default())
    }

    /// Compiles formula text with the given allow-list.
    pub fn compile_with(source: &str, options: &CompileOptions) -> Result<Self> {
        let tokens = tokenize(source)?;
        let program = to_postfix(&tokens)?;

        let mut compiler = Compiler::new(options);
        for instr in program {
            compiler.instr(instr)?;
        }
        let root = compiler.pop()?;
        if !compiler.stack.is_empty() {
            return Err(Error::compile("malformed expression", 0));
        }

        tracing::trace!(
            expression = source,
            fields = compiler.fields.len(),
            nodes = compiler.nodes.len(),
            "compiled expression"
        );
        Ok(Self {
            source: String::from(source),
            fields: compiler.fields,
            constants: compiler.constants,
            nodes: compiler.nodes,
            root,
        })
    }

    /// Returns the formula text.
    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the free variables in order of first appearance.
    #[inline]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Returns the number of compiled nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Evaluates with one positional value per field.
    pub fn call(&self, arguments: &[Value]) -> Result<Value> {
        if arguments.len() != self.fields.len() {
            return Err(Error::arity(self.fields.len(), arguments.len()));
        }
        let frame = Frame {
            constants: &self.constants,
            arguments,
            nodes: &self.nodes,
        };
        frame.get(self.root)
    }

    /// Evaluates with leading positional values and the rest bound by name.
    pub fn call_with(&self, positional: &[Value], named: &[(&str, Value)]) -> Result<Value> {
        if positional.len() > self.fields.len() {
            return Err(Error::arity(self.fields.len(), positional.len()));
        }
        let mut slots: Vec<Option<Value>> = positional.iter().cloned().map(Some).collect();
        slots.resize(self.fields.len(), None);

        for (name, value) in named {
            let index = self
                .fields
                .iter()
                .position(|f| f == name)
                .ok_or_else(|| Error::evaluation(format!("unexpected argument '{}'", name)))?;
            if slots[index].is_some() {
                return Err(Error::evaluation(format!(
                    "multiple values for argument '{}'",
                    name
                )));
            }
            slots[index] = Some(value.clone());
        }

        let provided = slots.iter().filter(|s| s.is_some()).count();
        let arguments = slots
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| Error::arity(self.fields.len(), provided))?;
        self.call(&arguments)
    }
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expression")
            .field("source", &self.source)
            .field("fields", &self.fields)
            .field("nodes", &self.nodes.len())
            .finish()
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
