//! Compile-time allow-list configuration.

use crate::builtins::{builtin_names, MODULES};
use alloc::string::{String, ToString};
use alloc::vec::Vec;

/// Names a formula may reference.
///
/// The default allows the `math` module and every bare builtin. Narrowing the
/// list turns references to the removed names into compile errors; names that
/// have no implementation stay unreachable even if allowed.
///
/// ```rust
/// use strata_expr::{CompileOptions, Expression};
///
/// let strict = CompileOptions::sandboxed().allow_builtin("sum");
/// assert!(Expression::compile_with("sum(a) * 2", &strict).is_ok());
/// assert!(Expression::compile_with("math.sqrt(a)", &strict).is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompileOptions {
    modules: Vec<String>,
    builtins: Vec<String>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            modules: MODULES.iter().map(|m| m.to_string()).collect(),
            builtins: builtin_names().map(String::from).collect(),
        }
    }
}

impl CompileOptions {
    /// Creates the default allow-list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an allow-list that permits nothing but operators and fields.
    pub fn sandboxed() -> Self {
        Self {
            modules: Vec::new(),
            builtins: Vec::new(),
        }
    }

    /// Allows a module.
    pub fn allow_module(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.modules.contains(&name) {
            self.modules.push(name);
        }
        self
    }

    /// Allows a bare builtin.
    pub fn allow_builtin(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.builtins.contains(&name) {
            self.builtins.push(name);
        }
        self
    }

    /// Removes a module or builtin from the allow-list.
    pub fn deny(mut self, name: &str) -> Self {
        self.modules.retain(|m| m != name);
        self.builtins.retain(|b| b != name);
        self
    }

    /// Returns true if `name` may be used as a module prefix.
    pub fn allows_module(&self, name: &str) -> bool {
        self.modules.iter().any(|m| m == name)
    }

    /// Returns true if `name` may be called as a bare builtin.
    pub fn allows_builtin(&self, name: &str) -> bool {
        self.builtins.iter().any(|b| b == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_allows_everything_known() {
        let options = CompileOptions::default();
        assert!(options.allows_module("math"));
        for name in ["max", "min", "sum", "len", "abs", "round"] {
            assert!(options.allows_builtin(name));
        }
        assert!(!options.allows_module("os"));
        assert!(!options.allows_builtin("eval"));
    }

    #[test]
    fn test_deny_and_allow() {
        let options = CompileOptions::new().deny("math").deny("len");
        assert!(!options.allows_module("math"));
        assert!(!options.allows_builtin("len"));
        assert!(options.allows_builtin("sum"));

        let options = options.allow_module("math").allow_module("math");
        assert!(options.allows_module("math"));
        assert_eq!(options.modules.len(), 1);
    }
}
