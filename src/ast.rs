//! Abstract syntax tree, plus a `Display` that renders nodes back into
//! parseable source form.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrefixOp {
    Neg,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InfixOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Lt,
    Le,
    And,
    Or,
}

impl fmt::Display for InfixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            InfixOp::Add => "+",
            InfixOp::Sub => "-",
            InfixOp::Mul => "*",
            InfixOp::Div => "/",
            InfixOp::Mod => "mod",
            InfixOp::Eq => "==",
            InfixOp::Lt => "<",
            InfixOp::Le => "<=",
            InfixOp::And => "and",
            InfixOp::Or => "or",
        };
        f.write_str(op)
    }
}

/// An element of a list literal. Spreads are only legal here, so they are
/// part of the item type rather than a free-standing expression.
#[derive(Clone, Debug, PartialEq)]
pub enum ListItem {
    Expr(Expr),
    Spread(Expr),
}

/// An element of a record literal, applied in source order.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordItem {
    Field(String, Expr),
    Spread(Expr),
}

/// A function literal: parameter names and body only. Deliberately no
/// captured environment; free variables resolve through the frame chain
/// active at the call site.
#[derive(Clone, Debug, PartialEq)]
pub struct FunLiteral {
    /// Optional self-name, bound where the literal is evaluated so the
    /// function can call itself.
    pub name: Option<String>,
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Number(f64),
    Bool(bool),
    Str(String),
    /// Interleaved literal texts and embedded expressions. The lexer treats
    /// the whole `"..."` literal as one opaque run today, so parsed nodes
    /// carry a single text and no values.
    InterpStr {
        texts: Vec<String>,
        values: Vec<Expr>,
    },
    Record(Vec<RecordItem>),
    List(Vec<ListItem>),
    Fun(FunLiteral),
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Var(String),
    Field {
        base: Box<Expr>,
        name: String,
    },
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    Slice {
        base: Box<Expr>,
        start: Option<Box<Expr>>,
        end: Option<Box<Expr>>,
    },
    Prefix {
        op: PrefixOp,
        expr: Box<Expr>,
    },
    Infix {
        op: InfixOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Break,
    Continue,
    Return(Option<Expr>),
    While {
        cond: Expr,
        body: Vec<Stmt>,
    },
    If {
        cond: Expr,
        then_body: Vec<Stmt>,
        else_body: Option<Vec<Stmt>>,
    },
    VarDecl {
        name: String,
        value: Expr,
    },
    Assign {
        name: String,
        value: Expr,
    },
    Expr(Expr),
}

fn write_body(f: &mut fmt::Formatter<'_>, body: &[Stmt]) -> fmt::Result {
    for stmt in body {
        write!(f, " {stmt}")?;
    }
    Ok(())
}

fn write_quoted(f: &mut fmt::Formatter<'_>, marker: char, text: &str) -> fmt::Result {
    write!(f, "{marker}")?;
    write_escaped_inner(f, marker, text)?;
    write!(f, "{marker}")
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => write!(f, "{n}"),
            Expr::Bool(b) => write!(f, "{b}"),
            Expr::Str(s) => write_quoted(f, '\'', s),
            Expr::InterpStr { texts, values } => {
                write!(f, "\"")?;
                // Interleave without the outer markers; escapes still apply.
                let mut texts = texts.iter();
                if let Some(first) = texts.next() {
                    write_escaped_inner(f, '"', first)?;
                }
                for (value, text) in values.iter().zip(texts) {
                    write!(f, "{{{value}}}")?;
                    write_escaped_inner(f, '"', text)?;
                }
                write!(f, "\"")
            }
            Expr::Record(items) => {
                write!(f, "{{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    match item {
                        RecordItem::Field(key, value) => write!(f, " {key} = {value}")?,
                        RecordItem::Spread(expr) => write!(f, " ...{expr}")?,
                    }
                }
                write!(f, " }}")
            }
            Expr::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match item {
                        ListItem::Expr(expr) => write!(f, "{expr}")?,
                        ListItem::Spread(expr) => write!(f, "...{expr}")?,
                    }
                }
                write!(f, "]")
            }
            Expr::Fun(fun) => {
                write!(f, "fun")?;
                if let Some(name) = &fun.name {
                    write!(f, " {name}")?;
                }
                write!(f, "({})", fun.params.join(", "))?;
                write_body(f, &fun.body)?;
                write!(f, " end")
            }
            Expr::Call { callee, args } => {
                write!(f, "{callee}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
            Expr::Var(name) => write!(f, "{name}"),
            Expr::Field { base, name } => write!(f, "{base}.{name}"),
            Expr::Index { base, index } => write!(f, "{base}[{index}]"),
            Expr::Slice { base, start, end } => {
                write!(f, "{base}[")?;
                if let Some(start) = start {
                    write!(f, "{start}")?;
                }
                write!(f, ":")?;
                if let Some(end) = end {
                    write!(f, "{end}")?;
                }
                write!(f, "]")
            }
            Expr::Prefix { op: PrefixOp::Neg, expr } => write!(f, "-{expr}"),
            Expr::Infix { op, left, right } => {
                write!(f, "({left} {op} {right})")
            }
        }
    }
}

fn write_escaped_inner(f: &mut fmt::Formatter<'_>, marker: char, text: &str) -> fmt::Result {
    for r in text.chars() {
        match r {
            '\t' => write!(f, "\\t")?,
            '\r' => write!(f, "\\r")?,
            '\n' => write!(f, "\\n")?,
            '\u{8}' => write!(f, "\\b")?,
            '\\' => write!(f, "\\\\")?,
            r if r == marker => write!(f, "\\{marker}")?,
            r => write!(f, "{r}")?,
        }
    }
    Ok(())
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Break => write!(f, "break"),
            Stmt::Continue => write!(f, "continue"),
            Stmt::Return(None) => write!(f, "return"),
            Stmt::Return(Some(expr)) => write!(f, "return {expr}"),
            Stmt::While { cond, body } => {
                write!(f, "while {cond}")?;
                write_body(f, body)?;
                write!(f, " end")
            }
            Stmt::If {
                cond,
                then_body,
                else_body,
            } => {
                write!(f, "if {cond}")?;
                write_body(f, then_body)?;
                if let Some(else_body) = else_body {
                    write!(f, " else")?;
                    write_body(f, else_body)?;
                }
                write!(f, " end")
            }
            Stmt::VarDecl { name, value } => write!(f, "var {name} = {value}"),
            Stmt::Assign { name, value } => write!(f, "{name} = {value}"),
            Stmt::Expr(expr) => write!(f, "{expr}"),
        }
    }
}

/// Render a whole program as a single line of source.
pub fn program_to_string(program: &[Stmt]) -> String {
    program
        .iter()
        .map(Stmt::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
