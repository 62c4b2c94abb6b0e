//! Syntax tree for Gradle Kotlin DSL build scripts
//!
//! Covers the statement forms Android app modules use: nested configuration
//! blocks, property assignments, plugin and dependency calls, typed local
//! `val`s, imports, `if` guards, lambdas, null-safe chains and string
//! templates. Anything else is a [`ParseError`] with the line and column of
//! the offending token.

mod lexer;
mod parser;

pub use lexer::{tokenize, tokenize_counting_comments, Token, TokenKind};
pub use parser::parse_script;

use thiserror::Error;

/// Syntax error with a 1-based source position
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}, column {column}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}

impl From<ParseError> for buildspec_core::Error {
    fn from(err: ParseError) -> Self {
        buildspec_core::Error::parse(err.to_string()).with_source(err)
    }
}

/// A whole build script
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    pub statements: Vec<Stmt>,
    /// Comments dropped while tokenizing
    pub comments: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Set,
    Append,
    Remove,
}

impl AssignOp {
    pub fn symbol(self) -> &'static str {
        match self {
            AssignOp::Set => "=",
            AssignOp::Append => "+=",
            AssignOp::Remove => "-=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    And,
    Or,
    /// `?:`
    Elvis,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::LtEq => "<=",
            BinOp::GtEq => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::Elvis => "?:",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `a.b = value`, `a += value` or `a -= value`
    Assign {
        target: Vec<String>,
        op: AssignOp,
        value: Expr,
        line: usize,
    },
    /// `name { ... }`, `create("release") { ... }`, `subprojects { p -> ... }`
    Block {
        head: Vec<Segment>,
        params: Vec<String>,
        body: Vec<Stmt>,
        line: usize,
    },
    /// A bare call such as `id("com.android.application")`
    Expr { expr: Expr, line: usize },
    /// `val name: Type = value` or `val name by value`
    Val {
        name: String,
        ty: Option<String>,
        value: Expr,
        line: usize,
    },
    Import { path: String, line: usize },
    If {
        condition: Expr,
        then_body: Vec<Stmt>,
        else_body: Vec<Stmt>,
        line: usize,
    },
}

impl Stmt {
    pub fn line(&self) -> usize {
        match self {
            Stmt::Assign { line, .. }
            | Stmt::Block { line, .. }
            | Stmt::Expr { line, .. }
            | Stmt::Val { line, .. }
            | Stmt::Import { line, .. }
            | Stmt::If { line, .. } => *line,
        }
    }

    /// Short description used in diagnostics
    pub fn summary(&self) -> String {
        match self {
            Stmt::Assign { target, op: AssignOp::Set, .. } => {
                format!("assignment to `{}`", target.join("."))
            }
            Stmt::Assign { target, op, .. } => {
                format!("`{}` on `{}`", op.symbol(), target.join("."))
            }
            Stmt::Block { head, .. } => format!("block `{}`", Segment::render_chain(head)),
            Stmt::Expr { expr, .. } => format!("statement `{}`", expr.render()),
            Stmt::Val { name, .. } => format!("local `{}`", name),
            Stmt::Import { path, .. } => format!("import `{}`", path),
            Stmt::If { .. } => "`if` statement".to_string(),
        }
    }

    /// Single-line source rendering, used inside lambdas
    pub fn render(&self) -> String {
        match self {
            Stmt::Assign { target, op, value, .. } => {
                format!("{} {} {}", target.join("."), op.symbol(), value.render())
            }
            Stmt::Block { head, params, body, .. } => format!(
                "{} {}",
                Segment::render_chain(head),
                render_braced(params, body)
            ),
            Stmt::Expr { expr, .. } => expr.render(),
            Stmt::Val { name, ty: Some(ty), value, .. } => {
                format!("val {}: {} = {}", name, ty, value.render())
            }
            Stmt::Val { name, ty: None, value, .. } => format!("val {} = {}", name, value.render()),
            Stmt::Import { path, .. } => format!("import {}", path),
            Stmt::If { condition, then_body, else_body, .. } => {
                let mut out = format!("if ({}) {}", condition.render(), render_braced(&[], then_body));
                if !else_body.is_empty() {
                    out.push_str(" else ");
                    out.push_str(&render_braced(&[], else_body));
                }
                out
            }
        }
    }
}

fn render_braced(params: &[String], body: &[Stmt]) -> String {
    let mut out = String::from("{");
    if !params.is_empty() {
        out.push(' ');
        out.push_str(&params.join(", "));
        out.push_str(" ->");
    }
    let statements: Vec<String> = body.iter().map(Stmt::render).collect();
    if !statements.is_empty() {
        out.push(' ');
        out.push_str(&statements.join("; "));
    }
    out.push_str(" }");
    out
}

/// Call argument, optionally named (`plugin = "x"`)
#[derive(Debug, Clone, PartialEq)]
pub struct Arg {
    pub name: Option<String>,
    pub value: Expr,
}

/// `{ a, b -> ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct Lambda {
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
}

impl Lambda {
    pub fn render(&self) -> String {
        render_braced(&self.params, &self.body)
    }
}

/// One link in a dotted chain
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// A name, including any type arguments: `register<Delete>`
    Name(String),
    Call { name: String, args: Vec<Arg> },
    Index(Box<Expr>),
    /// `?.` before the next segment
    NullSafe,
    /// `!!`
    NotNull,
    /// Trailing lambda: `let { file(it) }`
    Lambda(Lambda),
}

impl Segment {
    pub fn name(&self) -> Option<&str> {
        match self {
            Segment::Name(name) | Segment::Call { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn args(&self) -> &[Arg] {
        match self {
            Segment::Call { args, .. } => args,
            _ => &[],
        }
    }

    pub fn render_chain(segments: &[Segment]) -> String {
        let mut out = String::new();
        let mut dot = false;
        for segment in segments {
            match segment {
                Segment::Name(name) => {
                    if dot {
                        out.push('.');
                    }
                    out.push_str(name);
                }
                Segment::Call { name, args } => {
                    if dot {
                        out.push('.');
                    }
                    out.push_str(name);
                    out.push('(');
                    let rendered: Vec<String> = args
                        .iter()
                        .map(|a| match &a.name {
                            Some(n) => format!("{} = {}", n, a.value.render()),
                            None => a.value.render(),
                        })
                        .collect();
                    out.push_str(&rendered.join(", "));
                    out.push(')');
                }
                Segment::Index(expr) => {
                    out.push('[');
                    out.push_str(&expr.render());
                    out.push(']');
                }
                Segment::NullSafe => out.push_str("?."),
                Segment::NotNull => out.push_str("!!"),
                Segment::Lambda(lambda) => {
                    out.push(' ');
                    out.push_str(&lambda.render());
                }
            }
            dot = !matches!(segment, Segment::NullSafe);
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Str(String),
    /// Interpolated string, as written including quotes
    Template(String),
    Int(i64),
    Bool(bool),
    Null,
    Chain(Vec<Segment>),
    Not(Box<Expr>),
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// `id("x") version "1.0"`
    Infix {
        lhs: Box<Expr>,
        function: String,
        rhs: Box<Expr>,
    },
    /// `value as Type` or `value as? Type`
    Cast {
        expr: Box<Expr>,
        ty: String,
        safe: bool,
    },
    Lambda(Lambda),
}

impl Expr {
    /// `flutter.compileSdkVersion` for a chain made only of names
    pub fn as_dotted(&self) -> Option<String> {
        match self {
            Expr::Chain(segments) => {
                let names: Option<Vec<&str>> = segments
                    .iter()
                    .map(|s| match s {
                        Segment::Name(n) => Some(n.as_str()),
                        _ => None,
                    })
                    .collect();
                names.map(|n| n.join("."))
            }
            _ => None,
        }
    }

    /// The single call of a one-segment chain: `platform("...")`
    pub fn as_call(&self) -> Option<(&str, &[Arg])> {
        match self {
            Expr::Chain(segments) => match segments.as_slice() {
                [Segment::Call { name, args }] => Some((name.as_str(), args.as_slice())),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Expr::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Source-like rendering
    pub fn render(&self) -> String {
        match self {
            Expr::Str(s) => quote(s),
            Expr::Template(source) => source.clone(),
            Expr::Int(v) => v.to_string(),
            Expr::Bool(b) => b.to_string(),
            Expr::Null => "null".to_string(),
            Expr::Chain(segments) => Segment::render_chain(segments),
            Expr::Not(inner) => format!("!{}", inner.render()),
            Expr::Binary { op, lhs, rhs } => {
                format!("{} {} {}", lhs.render(), op.symbol(), rhs.render())
            }
            Expr::Infix { lhs, function, rhs } => {
                format!("{} {} {}", lhs.render(), function, rhs.render())
            }
            Expr::Cast { expr, ty, safe } => {
                format!("{} {} {}", expr.render(), if *safe { "as?" } else { "as" }, ty)
            }
            Expr::Lambda(lambda) => lambda.render(),
        }
    }
}

/// Kotlin string literal for `text`
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '$' => out.push_str("\\$"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
