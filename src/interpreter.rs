//! AST-walking evaluator.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::{Expr, FunLiteral, InfixOp, ListItem, PrefixOp, RecordItem, Stmt};
use crate::environment::{EnvRef, Environment};
use crate::error::{Error, Result};
use crate::parser;
use crate::value::{BuiltinFn, Value};

/// Control-flow result of evaluating a statement, matched exhaustively by
/// every caller. Errors travel separately and abort immediately.
#[derive(Clone, Debug)]
pub enum Flow {
    Normal,
    Break,
    Continue,
    Return(Option<Value>),
}

pub struct Interpreter {
    globals: EnvRef,
    env: EnvRef,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Fresh interpreter with an empty root environment.
    pub fn new() -> Self {
        let root = Rc::new(RefCell::new(Environment::new()));
        Self {
            globals: root.clone(),
            env: root,
        }
    }

    /// Install a named value into the root environment. This is the only
    /// extension point; the language has no import system.
    pub fn register_global(&mut self, name: impl Into<String>, value: Value) {
        self.globals.borrow_mut().define(name, value);
    }

    /// Evaluate a source text to its result value, if any.
    pub fn eval(&mut self, src: &str) -> Result<Option<Value>> {
        let program = parser::parse(src)?;
        self.eval_program(&program)
    }

    /// A `return` reaching the top level ends the program normally and its
    /// value becomes the program result. `break`/`continue` outside any
    /// loop are the one signal that converts into a host-visible error.
    pub fn eval_program(&mut self, program: &[Stmt]) -> Result<Option<Value>> {
        for stmt in program {
            match self.eval_stmt(stmt)? {
                Flow::Normal => {}
                Flow::Return(value) => return Ok(value),
                Flow::Break => return Err(Error::Runtime("break outside a loop".into())),
                Flow::Continue => return Err(Error::Runtime("continue outside a loop".into())),
            }
        }
        Ok(None)
    }

    /// Run a body; the first non-normal signal propagates unchanged.
    fn eval_block(&mut self, body: &[Stmt]) -> Result<Flow> {
        for stmt in body {
            match self.eval_stmt(stmt)? {
                Flow::Normal => {}
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    fn eval_stmt(&mut self, stmt: &Stmt) -> Result<Flow> {
        match stmt {
            Stmt::Break => Ok(Flow::Break),
            Stmt::Continue => Ok(Flow::Continue),
            Stmt::Return(None) => Ok(Flow::Return(None)),
            Stmt::Return(Some(expr)) => Ok(Flow::Return(self.eval_expr_opt(expr)?)),
            Stmt::While { cond, body } => self.eval_while(cond, body),
            Stmt::If {
                cond,
                then_body,
                else_body,
            } => {
                if self.eval_cond(cond, "if")? {
                    self.eval_block(then_body)
                } else if let Some(else_body) = else_body {
                    self.eval_block(else_body)
                } else {
                    Ok(Flow::Normal)
                }
            }
            Stmt::VarDecl { name, value } => {
                let value = self.eval_expr(value)?;
                self.env.borrow_mut().define(name.clone(), value);
                Ok(Flow::Normal)
            }
            Stmt::Assign { name, value } => {
                let value = self.eval_expr(value)?;
                // Overwrite the nearest existing binding; define in the
                // innermost frame only when the name is unbound everywhere.
                let bound = self.env.borrow_mut().assign(name, value.clone());
                if !bound {
                    self.env.borrow_mut().define(name.clone(), value);
                }
                Ok(Flow::Normal)
            }
            Stmt::Expr(expr) => {
                self.eval_expr_opt(expr)?;
                Ok(Flow::Normal)
            }
        }
    }

    fn eval_while(&mut self, cond: &Expr, body: &[Stmt]) -> Result<Flow> {
        'repeat: loop {
            if !self.eval_cond(cond, "while")? {
                break;
            }
            for stmt in body {
                match self.eval_stmt(stmt)? {
                    Flow::Normal => {}
                    // The loop itself finishes normally on break.
                    Flow::Break => break 'repeat,
                    // Continue ends this pass and restarts the condition.
                    Flow::Continue => break,
                    flow @ Flow::Return(_) => return Ok(flow),
                }
            }
        }
        Ok(Flow::Normal)
    }

    fn eval_cond(&mut self, cond: &Expr, what: &str) -> Result<bool> {
        match self.eval_expr(cond)? {
            Value::Bool(b) => Ok(b),
            v => Err(Error::Type(format!(
                "{what} condition must be bool, but got {}",
                v.kind()
            ))),
        }
    }

    /// Expression evaluation that tolerates a valueless call result.
    /// Expression statements and `return` go through here; operand
    /// positions use [`Self::eval_expr`] and treat "no value" as an error.
    fn eval_expr_opt(&mut self, expr: &Expr) -> Result<Option<Value>> {
        match expr {
            Expr::Call { callee, args } => self.eval_call(callee, args),
            _ => self.eval_expr(expr).map(Some),
        }
    }

    fn eval_expr(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Str(s) => Ok(Value::string(s.clone())),
            Expr::InterpStr { texts, values } => self.eval_interp(texts, values),
            Expr::Record(items) => self.eval_record_literal(items),
            Expr::List(items) => self.eval_list_literal(items),
            Expr::Fun(fun) => {
                let value = Value::Fun(Rc::new(fun.clone()));
                // A self-name binds where the literal is evaluated, so the
                // function can reach itself through the call-time chain.
                if let Some(name) = &fun.name {
                    self.env.borrow_mut().define(name.clone(), value.clone());
                }
                Ok(value)
            }
            Expr::Call { callee, args } => self
                .eval_call(callee, args)?
                .ok_or_else(|| Error::Type("function did not return a value".into())),
            Expr::Var(name) => self
                .env
                .borrow()
                .get(name)
                .ok_or_else(|| Error::Name(format!("no variable named '{name}'"))),
            Expr::Field { base, name } => match self.eval_expr(base)? {
                Value::Record(fields) => fields
                    .get(name)
                    .cloned()
                    .ok_or_else(|| Error::Name(format!("record does not have field '{name}'"))),
                v => Err(Error::Type(format!(
                    "unable to access field of {}",
                    v.kind()
                ))),
            },
            Expr::Index { base, index } => self.eval_index(base, index),
            Expr::Slice { base, start, end } => {
                self.eval_slice(base, start.as_deref(), end.as_deref())
            }
            Expr::Prefix {
                op: PrefixOp::Neg,
                expr,
            } => match self.eval_expr(expr)? {
                Value::Number(n) => Ok(Value::Number(-n)),
                v => Err(Error::Type(format!("unable to negate {}", v.kind()))),
            },
            Expr::Infix { op, left, right } => self.eval_infix(*op, left, right),
        }
    }

    fn eval_interp(&mut self, texts: &[String], values: &[Expr]) -> Result<Value> {
        let mut out = String::new();
        let mut texts = texts.iter();
        if let Some(first) = texts.next() {
            out.push_str(first);
        }
        for (value, text) in values.iter().zip(texts) {
            let v = self.eval_expr(value)?;
            out.push_str(&v.to_string());
            out.push_str(text);
        }
        Ok(Value::string(out))
    }

    /// Items apply in source order; later writers win whether they are
    /// direct fields or spread entries.
    fn eval_record_literal(&mut self, items: &[RecordItem]) -> Result<Value> {
        let mut fields = HashMap::new();
        for item in items {
            match item {
                RecordItem::Field(key, expr) => {
                    let value = self.eval_expr(expr)?;
                    fields.insert(key.clone(), value);
                }
                RecordItem::Spread(expr) => match self.eval_expr(expr)? {
                    Value::Record(spread) => {
                        for (key, value) in spread.iter() {
                            fields.insert(key.clone(), value.clone());
                        }
                    }
                    v => {
                        return Err(Error::Type(format!(
                            "unable to spread {} into a record",
                            v.kind()
                        )))
                    }
                },
            }
        }
        Ok(Value::record(fields))
    }

    fn eval_list_literal(&mut self, items: &[ListItem]) -> Result<Value> {
        let mut elements = Vec::new();
        for item in items {
            match item {
                ListItem::Expr(expr) => elements.push(self.eval_expr(expr)?),
                ListItem::Spread(expr) => match self.eval_expr(expr)? {
                    Value::List(spread) => elements.extend(spread.iter().cloned()),
                    v => {
                        return Err(Error::Type(format!(
                            "unable to spread {} into a list",
                            v.kind()
                        )))
                    }
                },
            }
        }
        Ok(Value::list(elements))
    }

    fn eval_call(&mut self, callee: &Expr, args: &[Expr]) -> Result<Option<Value>> {
        let fun = self.eval_expr(callee)?;
        let mut arg_values = Vec::with_capacity(args.len());
        for arg in args {
            arg_values.push(self.eval_expr(arg)?);
        }
        match fun {
            Value::Fun(fun) => self.call_user_fun(&fun, arg_values),
            Value::Builtin(f) => self.call_builtin(f, &arg_values),
            v => Err(Error::Type(format!("unable to call {}", v.kind()))),
        }
    }

    /// Push a frame whose parent is the frame active right now — the call
    /// site, not the definition site. Free variables in function bodies
    /// therefore resolve dynamically; functions capture nothing.
    fn push_frame(&mut self) -> EnvRef {
        let prev = self.env.clone();
        self.env = Rc::new(RefCell::new(Environment::with_parent(prev.clone())));
        prev
    }

    fn pop_frame(&mut self, prev: EnvRef) {
        self.env = prev;
    }

    fn call_user_fun(&mut self, fun: &FunLiteral, args: Vec<Value>) -> Result<Option<Value>> {
        if fun.params.len() != args.len() {
            return Err(Error::Type(format!(
                "expected {} arguments, but got {}",
                fun.params.len(),
                args.len()
            )));
        }

        let prev = self.push_frame();
        for (param, value) in fun.params.iter().zip(args) {
            self.env.borrow_mut().define(param.clone(), value);
        }
        let result = self.eval_block(&fun.body);
        // Popped on every exit path, error or not.
        self.pop_frame(prev);

        match result? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(None),
            Flow::Break => Err(Error::Runtime("break outside a loop".into())),
            Flow::Continue => Err(Error::Runtime("continue outside a loop".into())),
        }
    }

    fn call_builtin(&mut self, f: BuiltinFn, args: &[Value]) -> Result<Option<Value>> {
        // Frame pushed and popped for symmetry with user calls.
        let prev = self.push_frame();
        let result = f(self, args);
        self.pop_frame(prev);
        result
    }

    fn eval_infix(&mut self, op: InfixOp, left: &Expr, right: &Expr) -> Result<Value> {
        // Both operands always evaluate before the operator applies; there
        // is no short-circuiting, not even for `and`/`or`.
        let l = self.eval_expr(left)?;
        let r = self.eval_expr(right)?;

        match op {
            InfixOp::Add | InfixOp::Sub | InfixOp::Mul | InfixOp::Div | InfixOp::Mod => {
                self.eval_arith(op, &l, &r)
            }
            InfixOp::Eq => Ok(Value::Bool(l.try_eq(&r)?)),
            InfixOp::Lt => Ok(Value::Bool(l.try_lt(&r)?)),
            // Derived: equality is checked first.
            InfixOp::Le => Ok(Value::Bool(l.try_eq(&r)? || l.try_lt(&r)?)),
            InfixOp::And | InfixOp::Or => match (&l, &r) {
                (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(if op == InfixOp::And {
                    *a && *b
                } else {
                    *a || *b
                })),
                _ => Err(Error::Type(format!(
                    "unable to apply '{op}' to {} and {}",
                    l.kind(),
                    r.kind()
                ))),
            },
        }
    }

    fn eval_arith(&self, op: InfixOp, l: &Value, r: &Value) -> Result<Value> {
        let (a, b) = match (l, r) {
            (Value::Number(a), Value::Number(b)) => (*a, *b),
            _ => {
                return Err(Error::Type(format!(
                    "unable to apply '{op}' to {} and {}",
                    l.kind(),
                    r.kind()
                )))
            }
        };
        let n = match op {
            InfixOp::Add => a + b,
            InfixOp::Sub => a - b,
            InfixOp::Mul => a * b,
            InfixOp::Div => a / b,
            InfixOp::Mod => a % b,
            _ => unreachable!("non-arithmetic operator"),
        };
        Ok(Value::Number(n))
    }

    fn eval_index(&mut self, base: &Expr, index: &Expr) -> Result<Value> {
        let base = self.eval_expr(base)?;
        let index = match self.eval_expr(index)? {
            Value::Number(n) => n,
            v => {
                return Err(Error::Type(format!(
                    "index must be a number, but got {}",
                    v.kind()
                )))
            }
        };
        match base {
            Value::List(elements) => {
                let i = resolve_index(index, elements.len())?;
                Ok(elements[i].clone())
            }
            Value::Str(s) => {
                let runes: Vec<char> = s.chars().collect();
                let i = resolve_index(index, runes.len())?;
                Ok(Value::string(runes[i].to_string()))
            }
            v => Err(Error::Type(format!("unable to index {}", v.kind()))),
        }
    }

    fn eval_slice(
        &mut self,
        base: &Expr,
        start: Option<&Expr>,
        end: Option<&Expr>,
    ) -> Result<Value> {
        let base = self.eval_expr(base)?;
        let start = self.eval_slice_bound(start)?;
        let end = self.eval_slice_bound(end)?;
        match base {
            Value::List(elements) => {
                let (lo, hi) = resolve_slice(start, end, elements.len());
                Ok(Value::list(elements[lo..hi].to_vec()))
            }
            Value::Str(s) => {
                let runes: Vec<char> = s.chars().collect();
                let (lo, hi) = resolve_slice(start, end, runes.len());
                Ok(Value::string(runes[lo..hi].iter().collect::<String>()))
            }
            v => Err(Error::Type(format!("unable to slice {}", v.kind()))),
        }
    }

    fn eval_slice_bound(&mut self, bound: Option<&Expr>) -> Result<Option<f64>> {
        let Some(bound) = bound else {
            return Ok(None);
        };
        match self.eval_expr(bound)? {
            Value::Number(n) => Ok(Some(n)),
            v => Err(Error::Type(format!(
                "slice bound must be a number, but got {}",
                v.kind()
            ))),
        }
    }
}

/// Negative indices wrap once from the end; anything still outside
/// `[0, len)` is a range error.
fn resolve_index(n: f64, len: usize) -> Result<usize> {
    let mut i = n as i64;
    if i < 0 {
        i += len as i64;
    }
    if i < 0 || i >= len as i64 {
        return Err(Error::Range(format!(
            "index {n} out of range for length {len}"
        )));
    }
    Ok(i as usize)
}

/// Missing bounds default to the full range; negative bounds wrap once;
/// both are clamped into `[0, len]` and the start never exceeds the end.
fn resolve_slice(start: Option<f64>, end: Option<f64>, len: usize) -> (usize, usize) {
    let resolve = |bound: f64| {
        let mut i = bound as i64;
        if i < 0 {
            i += len as i64;
        }
        i.clamp(0, len as i64) as usize
    };
    let hi = end.map(resolve).unwrap_or(len);
    let lo = start.map(resolve).unwrap_or(0).min(hi);
    (lo, hi)
}
