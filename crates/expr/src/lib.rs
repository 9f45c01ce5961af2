//! Strata Expr - sandboxed formula compiler.
//!
//! Formulas are the text form of calculation functions, such as
//! `sum(a) - sum(b)` or `math.sqrt(x ** 2 + y ** 2)`. Compilation runs in three
//! stages:
//!
//! 1. `tokenize`: text to tokens
//! 2. `to_postfix`: shunting-yard conversion with a fixed precedence table
//! 3. closure compilation into an `Expression`
//!
//! Free variables become the expression's ordered parameter list, which
//! calculations bind to source columns by name. Only allow-listed modules and
//! builtins can be called (see `CompileOptions`); anything else is a compile
//! error.
//!
//! # Example
//!
//! ```rust
//! use strata_core::Value;
//! use strata_expr::Expression;
//!
//! let hypot = Expression::compile("math.sqrt(x ** 2 + y ** 2)").unwrap();
//! assert_eq!(hypot.fields(), ["x", "y"]);
//! assert_eq!(hypot.call(&[Value::from(3), Value::from(4)]).unwrap(), Value::from(5.0));
//!
//! assert!(Expression::compile("open('/etc/passwd')").is_err());
//! ```

#![no_std]

extern crate alloc;

mod builtins;
mod compile;
mod options;
mod postfix;
mod token;

pub use builtins::{builtin_names, MODULES};
pub use compile::Expression;
pub use options::CompileOptions;
pub use postfix::{to_postfix, BinaryOp, Instr, UnaryOp};
pub use token::{render, tokenize, Token, TokenKind};
