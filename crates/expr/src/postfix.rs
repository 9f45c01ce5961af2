//! Infix to postfix conversion (shunting-yard).

use crate::token::{Token, TokenKind};
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use strata_core::{Error, Result, Value};

/// Unary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Pos,
    Invert,
    Not,
}

/// Binary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    NotIn,
    Is,
    IsNot,
    BitOr,
    BitXor,
    BitAnd,
    Shl,
    Shr,
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Rem,
    Pow,
}

impl UnaryOp {
    fn from_text(text: &str) -> Option<Self> {
        Some(match text {
            "-" => UnaryOp::Neg,
            "+" => UnaryOp::Pos,
            "~" => UnaryOp::Invert,
            "not" | "!" => UnaryOp::Not,
            _ => return None,
        })
    }

    fn precedence(self) -> u8 {
        match self {
            UnaryOp::Not => 5,
            UnaryOp::Neg | UnaryOp::Pos | UnaryOp::Invert => 13,
        }
    }

    /// Returns the operator's symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Pos => "+",
            UnaryOp::Invert => "~",
            UnaryOp::Not => "not",
        }
    }
}

impl BinaryOp {
    fn from_text(text: &str) -> Option<Self> {
        Some(match text {
            "or" => BinaryOp::Or,
            "and" => BinaryOp::And,
            "==" => BinaryOp::Eq,
            "!=" => BinaryOp::Ne,
            "<" => BinaryOp::Lt,
            "<=" => BinaryOp::Le,
            ">" => BinaryOp::Gt,
            ">=" => BinaryOp::Ge,
            "in" => BinaryOp::In,
            "not in" => BinaryOp::NotIn,
            "is" => BinaryOp::Is,
            "is not" => BinaryOp::IsNot,
            "|" => BinaryOp::BitOr,
            "^" => BinaryOp::BitXor,
            "&" => BinaryOp::BitAnd,
            "<<" => BinaryOp::Shl,
            ">>" => BinaryOp::Shr,
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "//" => BinaryOp::FloorDiv,
            "%" => BinaryOp::Rem,
            "**" => BinaryOp::Pow,
            _ => return None,
        })
    }

    fn precedence(self) -> u8 {
        use BinaryOp::*;
        match self {
            Or => 3,
            And => 4,
            Eq | Ne | Lt | Le | Gt | Ge | In | NotIn | Is | IsNot => 6,
            BitOr => 7,
            BitXor => 8,
            BitAnd => 9,
            Shl | Shr => 10,
            Add | Sub => 11,
            Mul | Div | FloorDiv | Rem => 12,
            Pow => 14,
        }
    }

    fn is_right_associative(self) -> bool {
        self == BinaryOp::Pow
    }

    /// Returns the operator's symbol.
    pub fn symbol(self) -> &'static str {
        use BinaryOp::*;
        match self {
            Or => "or",
            And => "and",
            Eq => "==",
            Ne => "!=",
            Lt => "<",
            Le => "<=",
            Gt => ">",
            Ge => ">=",
            In => "in",
            NotIn => "not in",
            Is => "is",
            IsNot => "is not",
            BitOr => "|",
            BitXor => "^",
            BitAnd => "&",
            Shl => "<<",
            Shr => ">>",
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            FloorDiv => "//",
            Rem => "%",
            Pow => "**",
        }
    }
}

/// One step of a postfix program.
#[derive(Clone, Debug, PartialEq)]
pub enum Instr {
    /// Push a literal.
    Constant(Value),
    /// Push a named value: a free variable or a module constant.
    Name { name: String, position: usize },
    Unary(UnaryOp),
    Binary(BinaryOp),
    /// Pop `argc` values and call `name` with them.
    Call {
        name: String,
        argc: usize,
        position: usize,
    },
    /// Pop `n` values into a tuple.
    Tuple(usize),
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instr::Constant(value) => write!(f, "{}", value),
            Instr::Name { name, .. } => write!(f, "{}", name),
            Instr::Unary(op) => write!(f, "{}(u)", op.symbol()),
            Instr::Binary(op) => write!(f, "{}", op.symbol()),
            Instr::Call { name, argc, .. } => write!(f, "{}/{}", name, argc),
            Instr::Tuple(n) => write!(f, "tuple/{}", n),
        }
    }
}

#[derive(Clone, Copy)]
enum Operator {
    Unary(UnaryOp),
    Binary(BinaryOp),
}

impl Operator {
    fn precedence(self) -> u8 {
        match self {
            Operator::Unary(op) => op.precedence(),
            Operator::Binary(op) => op.precedence(),
        }
    }

    fn into_instr(self) -> Instr {
        match self {
            Operator::Unary(op) => Instr::Unary(op),
            Operator::Binary(op) => Instr::Binary(op),
        }
    }
}

/// An open parenthesis, a call's argument list, or the whole expression.
struct Frame {
    call: Option<(String, usize)>,
    commas: usize,
    position: usize,
    top_level: bool,
}

enum Entry {
    Operator(Operator),
    Frame(Frame),
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Previous {
    Start,
    Open,
    Comma,
    Operator,
    Operand,
}

struct Converter {
    output: Vec<Instr>,
    stack: Vec<Entry>,
    previous: Previous,
}

impl Converter {
    fn new() -> Self {
        Self {
            output: Vec::new(),
            stack: alloc::vec![Entry::Frame(Frame {
                call: None,
                commas: 0,
                position: 0,
                top_level: true,
            })],
            previous: Previous::Start,
        }
    }

    fn expects_operand(&self) -> bool {
        self.previous != Previous::Operand
    }

    fn operand(&mut self, instr: Instr, position: usize) -> Result<()> {
        if !self.expects_operand() {
            return Err(Error::compile("expected an operator", position));
        }
        self.output.push(instr);
        self.previous = Previous::Operand;
        Ok(())
    }

    /// Moves operators to the output until the innermost frame.
    fn drain_operators(&mut self, min_precedence: Option<(u8, bool)>) {
        while let Some(Entry::Operator(top)) = self.stack.last() {
            let top = *top;
            if let Some((precedence, right_assoc)) = min_precedence {
                let pops = top.precedence() > precedence
                    || (top.precedence() == precedence && !right_assoc);
                if !pops {
                    break;
                }
            }
            self.stack.pop();
            self.output.push(top.into_instr());
        }
    }

    fn operator(&mut self, token: &Token) -> Result<()> {
        if self.expects_operand() {
            let op = UnaryOp::from_text(&token.text).ok_or_else(|| {
                Error::compile(format!("unexpected operator '{}'", token.text), token.position)
            })?;
            self.stack.push(Entry::Operator(Operator::Unary(op)));
        } else {
            let op = BinaryOp::from_text(&token.text).ok_or_else(|| {
                Error::compile(format!("'{}' is not a binary operator", token.text), token.position)
            })?;
            self.drain_operators(Some((op.precedence(), op.is_right_associative())));
            self.stack.push(Entry::Operator(Operator::Binary(op)));
        }
        self.previous = Previous::Operator;
        Ok(())
    }

    fn open(&mut self, call: Option<(String, usize)>, position: usize) -> Result<()> {
        if !self.expects_operand() {
            return Err(Error::compile("expected an operator before '('", position));
        }
        self.stack.push(Entry::Frame(Frame {
            call,
            commas: 0,
            position,
            top_level: false,
        }));
        self.previous = Previous::Open;
        Ok(())
    }

    fn innermost_frame(&mut self) -> Option<&mut Frame> {
        match self.stack.last_mut() {
            Some(Entry::Frame(frame)) => Some(frame),
            _ => None,
        }
    }

    fn comma(&mut self, position: usize) -> Result<()> {
        if self.expects_operand() {
            return Err(Error::compile("unexpected ','", position));
        }
        self.drain_operators(None);
        let frame = self
            .innermost_frame()
            .ok_or_else(|| Error::compile("unexpected ','", position))?;
        frame.commas += 1;
        self.previous = Previous::Comma;
        Ok(())
    }

    /// Closes the innermost frame: `)` or end of input.
    fn close(&mut self, position: usize, end_of_input: bool) -> Result<()> {
        let previous = self.previous;
        if previous == Previous::Operator || (previous == Previous::Start && end_of_input) {
            return Err(Error::compile("expected an operand", position));
        }
        self.drain_operators(None);
        let frame = match self.stack.pop() {
            Some(Entry::Frame(frame)) => frame,
            _ => return Err(Error::compile("unbalanced parentheses", position)),
        };
        if frame.top_level != end_of_input {
            let message = if end_of_input {
                "unclosed '('"
            } else {
                "unmatched ')'"
            };
            let at = if end_of_input { frame.position } else { position };
            return Err(Error::compile(message, at));
        }

        // count items: `()` has none, a trailing comma does not open another item
        let items = match previous {
            Previous::Open => 0,
            Previous::Comma => frame.commas,
            _ => frame.commas + 1,
        };
        match frame.call {
            Some((name, call_position)) => self.output.push(Instr::Call {
                name,
                argc: items,
                position: call_position,
            }),
            None if frame.commas > 0 || items == 0 => self.output.push(Instr::Tuple(items)),
            None => {}
        }
        self.previous = Previous::Operand;
        Ok(())
    }
}

fn literal(token: &Token) -> Result<Instr> {
    let value = match token.kind {
        TokenKind::String => Value::String(token.text.clone()),
        TokenKind::Number => parse_number(&token.text)
            .ok_or_else(|| Error::compile("invalid number literal", token.position))?,
        TokenKind::Name => match token.text.as_str() {
            "true" | "True" => Value::Boolean(true),
            "false" | "False" => Value::Boolean(false),
            "null" | "None" => Value::Null,
            _ => {
                return Ok(Instr::Name {
                    name: token.text.clone(),
                    position: token.position,
                })
            }
        },
        _ => return Err(Error::compile("expected a literal", token.position)),
    };
    Ok(Instr::Constant(value))
}

fn parse_number(text: &str) -> Option<Value> {
    let is_float = text.contains(['.', 'e', 'E']);
    if !is_float {
        if let Ok(i) = text.parse::<i64>() {
            return Some(Value::Int64(i));
        }
    }
    text.parse::<f64>().ok().map(Value::Float64)
}

/// Converts tokens to a postfix program.
///
/// A name directly followed by `(` opens a call; commas separate call arguments
/// or tuple items, including at the top level (`1, 2` is a two-tuple).
pub fn to_postfix(tokens: &[Token]) -> Result<Vec<Instr>> {
    let mut converter = Converter::new();
    let mut index = 0;
    while index < tokens.len() {
        let token = &tokens[index];
        match token.kind {
            TokenKind::Name if tokens.get(index + 1).map(|t| t.kind) == Some(TokenKind::LParen) => {
                converter.open(Some((token.text.clone(), token.position)), token.position)?;
                index += 1;
            }
            TokenKind::Number | TokenKind::String | TokenKind::Name => {
                converter.operand(literal(token)?, token.position)?;
            }
            TokenKind::Operator => converter.operator(token)?,
            TokenKind::LParen => converter.open(None, token.position)?,
            TokenKind::RParen => converter.close(token.position, false)?,
            TokenKind::Comma => converter.comma(token.position)?,
        }
        index += 1;
    }
    let end = tokens.last().map(|t| t.position + t.text.len()).unwrap_or(0);
    converter.close(end, true)?;
    Ok(converter.output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::tokenize;
    use alloc::string::ToString;
    use alloc::vec::Vec;

    fn postfix(input: &str) -> String {
        to_postfix(&tokenize(input).unwrap())
            .unwrap()
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn fails(input: &str) -> bool {
        tokenize(input).and_then(|t| to_postfix(&t)).is_err()
    }

    #[test]
    fn test_precedence() {
        assert_eq!(postfix("a + b * c"), "a b c * +");
        assert_eq!(postfix("(a + b) * c"), "a b + c *");
        assert_eq!(postfix("a - b - c"), "a b - c -");
        assert_eq!(postfix("a ** b ** c"), "a b c ** **");
        assert_eq!(postfix("a << 1 + 2"), "a 1 2 + <<");
        assert_eq!(postfix("a | b & c"), "a b c & |");
    }

    #[test]
    fn test_unary_operators() {
        assert_eq!(postfix("-a ** 2"), "a 2 ** -(u)");
        assert_eq!(postfix("2 ** -a"), "2 a -(u) **");
        assert_eq!(postfix("-a + b"), "a -(u) b +");
        assert_eq!(postfix("not a == b"), "a b == not(u)");
        assert_eq!(postfix("not a or b and c"), "a not(u) b c and or");
        assert_eq!(postfix("- - a"), "a -(u) -(u)");
    }

    #[test]
    fn test_calls_and_tuples() {
        assert_eq!(postfix("f()"), "f/0");
        assert_eq!(postfix("max(a, b + 1)"), "a b 1 + max/2");
        assert_eq!(postfix("f(g(x), y)"), "x g/1 y f/2");
        assert_eq!(postfix("1, 2"), "1 2 tuple/2");
        assert_eq!(postfix("(1,)"), "1 tuple/1");
        assert_eq!(postfix("()"), "tuple/0");
        assert_eq!(postfix("1,2,(3,4),5"), "1 2 3 4 tuple/2 5 tuple/4");
        assert_eq!(postfix("f(a,)"), "a f/1");
    }

    #[test]
    fn test_literals() {
        assert_eq!(postfix("true and null"), "true null and");
        assert_eq!(postfix("'x' in s"), "'x' s in");
        assert_eq!(postfix("1.0 + 2"), "1.0 2 +");
    }

    #[test]
    fn test_malformed() {
        assert!(fails("a +"));
        assert!(fails("* a"));
        assert!(fails("(a"));
        assert!(fails("a)"));
        assert!(fails("a b"));
        assert!(fails("f(,)"));
        assert!(fails("a not b"));
        assert!(fails("(a)(b)"));
    }
}
