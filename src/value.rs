//! Runtime values.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::ast::FunLiteral;
use crate::error::{Error, Result};
use crate::interpreter::Interpreter;

/// Host-provided function: receives the evaluator state and the evaluated
/// argument list, and validates its own arity and argument kinds.
pub type BuiltinFn = fn(&mut Interpreter, &[Value]) -> Result<Option<Value>>;

/// Closed union of every value the language can produce. Every value
/// carries exactly one kind; operators and builtins reject mismatched
/// kinds instead of coercing.
#[derive(Clone)]
pub enum Value {
    Bool(bool),
    Number(f64),
    Str(Rc<str>),
    List(Rc<Vec<Value>>),
    Record(Rc<HashMap<String, Value>>),
    /// User function: parameters and body only, no captured environment.
    /// Compared by identity.
    Fun(Rc<FunLiteral>),
    Builtin(BuiltinFn),
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(Rc::from(s.into().into_boxed_str()))
    }

    pub fn list(elements: Vec<Value>) -> Self {
        Value::List(Rc::new(elements))
    }

    pub fn record(fields: HashMap<String, Value>) -> Self {
        Value::Record(Rc::new(fields))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Record(_) => "record",
            Value::Fun(_) | Value::Builtin(_) => "fun",
        }
    }

    /// Structural equality. Mismatched kinds are a type error, except
    /// function-to-function comparisons, which are by identity and never
    /// fail: two distinct function values are simply unequal.
    pub fn try_eq(&self, other: &Value) -> Result<bool> {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => Ok(a == b),
            // Exact IEEE equality, no tolerance.
            (Value::Number(a), Value::Number(b)) => Ok(a == b),
            (Value::Str(a), Value::Str(b)) => Ok(a == b),
            (Value::List(a), Value::List(b)) => {
                if a.len() != b.len() {
                    return Ok(false);
                }
                for (x, y) in a.iter().zip(b.iter()) {
                    if !x.try_eq(y)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            (Value::Record(a), Value::Record(b)) => {
                if a.len() != b.len() {
                    return Ok(false);
                }
                // Equal counts plus a subset check imply equality.
                for (key, x) in a.iter() {
                    match b.get(key) {
                        Some(y) if x.try_eq(y)? => {}
                        _ => return Ok(false),
                    }
                }
                Ok(true)
            }
            (Value::Fun(a), Value::Fun(b)) => Ok(Rc::ptr_eq(a, b)),
            (Value::Builtin(a), Value::Builtin(b)) => Ok(*a as usize == *b as usize),
            (Value::Fun(_), Value::Builtin(_)) | (Value::Builtin(_), Value::Fun(_)) => Ok(false),
            (a, b) => Err(Error::Type(format!(
                "unable to compare {} and {}",
                a.kind(),
                b.kind()
            ))),
        }
    }

    /// Per-kind ordering: numbers numerically, strings lexicographically.
    /// Everything else has no order.
    pub fn try_lt(&self, other: &Value) -> Result<bool> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => Ok(a < b),
            (Value::Str(a), Value::Str(b)) => Ok(a < b),
            (a, b) => Err(Error::Type(format!(
                "unable to order {} and {}",
                a.kind(),
                b.kind()
            ))),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::List(elements) => {
                write!(f, "[")?;
                for (i, v) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
            Value::Record(fields) => {
                write!(f, "{{")?;
                let mut keys: Vec<&String> = fields.keys().collect();
                keys.sort();
                for (i, key) in keys.into_iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, " {key} = {}", fields[key])?;
                }
                write!(f, " }}")
            }
            Value::Fun(_) | Value::Builtin(_) => write!(f, "fun"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Number(n) => write!(f, "Number({n})"),
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::List(elements) => f.debug_tuple("List").field(elements).finish(),
            Value::Record(fields) => f.debug_tuple("Record").field(fields).finish(),
            Value::Fun(fun) => write!(f, "Fun({:?})", fun.name),
            Value::Builtin(_) => write!(f, "Builtin"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_equality_is_recursive() {
        let a = Value::list(vec![Value::Number(1.0), Value::string("x")]);
        let b = Value::list(vec![Value::Number(1.0), Value::string("x")]);
        assert!(a.try_eq(&b).unwrap());
        let c = Value::list(vec![Value::Number(1.0)]);
        assert!(!a.try_eq(&c).unwrap());
    }

    #[test]
    fn record_equality_by_count_and_subset() {
        let mut x = HashMap::new();
        x.insert("a".to_string(), Value::Number(1.0));
        let mut y = HashMap::new();
        y.insert("a".to_string(), Value::Number(1.0));
        assert!(Value::record(x.clone()).try_eq(&Value::record(y)).unwrap());
        let mut z = HashMap::new();
        z.insert("b".to_string(), Value::Number(1.0));
        assert!(!Value::record(x).try_eq(&Value::record(z)).unwrap());
    }

    #[test]
    fn mismatched_kinds_do_not_compare() {
        let err = Value::Number(1.0).try_eq(&Value::Bool(true)).unwrap_err();
        assert!(matches!(err, Error::Type(_)));
    }

    #[test]
    fn functions_compare_by_identity() {
        let fun = Rc::new(FunLiteral {
            name: None,
            params: vec![],
            body: vec![],
        });
        let a = Value::Fun(fun.clone());
        let b = Value::Fun(fun);
        assert!(a.try_eq(&b).unwrap());

        let other = Value::Fun(Rc::new(FunLiteral {
            name: None,
            params: vec![],
            body: vec![],
        }));
        assert!(!a.try_eq(&other).unwrap());
    }

    #[test]
    fn bools_have_no_ordering() {
        let err = Value::Bool(true).try_lt(&Value::Bool(false)).unwrap_err();
        assert!(matches!(err, Error::Type(_)));
    }
}
