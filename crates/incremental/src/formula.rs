//! Functions applied by calculations.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use strata_core::{Error, Result, Value};
use strata_expr::{CompileOptions, Expression};

/// Native callable taking one value per declared parameter.
pub type NativeFn = Rc<dyn Fn(&[Value]) -> Result<Value>>;

/// A function with named parameters.
///
/// Calculations bind each parameter to a source column of the same name, or to
/// the column given by an input mapping.
#[derive(Clone)]
pub enum Formula {
    /// A Rust closure with declared parameter names.
    Native {
        parameters: Vec<String>,
        function: NativeFn,
    },
    /// A compiled expression; its free variables are the parameters.
    Expression(Rc<Expression>),
}

impl Formula {
    /// Compiles expression text with every builtin allowed.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(Formula::Expression(Rc::new(Expression::compile(text)?)))
    }

    /// Compiles expression text against an allow-list.
    pub fn parse_with(text: &str, options: &CompileOptions) -> Result<Self> {
        Ok(Formula::Expression(Rc::new(Expression::compile_with(
            text, options,
        )?)))
    }

    /// Wraps a closure.
    ///
    /// ```rust
    /// use strata_core::Value;
    /// use strata_incremental::Formula;
    ///
    /// let double = Formula::native(["x"], |args| args[0].try_mul(&Value::Int64(2)));
    /// assert_eq!(double.call(&[Value::Int64(4)]).unwrap(), Value::Int64(8));
    /// ```
    pub fn native<I, S, F>(parameters: I, function: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&[Value]) -> Result<Value> + 'static,
    {
        Formula::Native {
            parameters: parameters.into_iter().map(Into::into).collect(),
            function: Rc::new(function),
        }
    }

    /// Returns the parameter names in call order.
    pub fn parameters(&self) -> &[String] {
        match self {
            Formula::Native { parameters, .. } => parameters,
            Formula::Expression(expression) => expression.fields(),
        }
    }

    /// Calls the function with one argument per parameter.
    pub fn call(&self, arguments: &[Value]) -> Result<Value> {
        match self {
            Formula::Native {
                parameters,
                function,
            } => {
                if arguments.len() != parameters.len() {
                    return Err(Error::arity(parameters.len(), arguments.len()));
                }
                function(arguments)
            }
            Formula::Expression(expression) => expression.call(arguments),
        }
    }
}

impl From<Expression> for Formula {
    fn from(expression: Expression) -> Self {
        Formula::Expression(Rc::new(expression))
    }
}

impl fmt::Debug for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formula::Native { parameters, .. } => {
                f.debug_struct("Native").field("parameters", parameters).finish()
            }
            Formula::Expression(expression) => {
                f.debug_tuple("Expression").field(&expression.source()).finish()
            }
        }
    }
}
