//! Recursive-descent parser producing a [`Script`]

use super::lexer::{tokenize_counting_comments, Token, TokenKind};
use super::{Arg, AssignOp, BinOp, Expr, Lambda, ParseError, Script, Segment, Stmt};

/// Parse Kotlin DSL source into a syntax tree
pub fn parse_script(source: &str) -> Result<Script, ParseError> {
    let (tokens, comments) = tokenize_counting_comments(source)?;
    let mut parser = Parser { tokens, pos: 0 };
    let statements = parser.statements()?;
    match parser.peek() {
        TokenKind::Eof => Ok(Script { statements, comments }),
        other => Err(parser.error_here(format!("unexpected {}", other.describe()))),
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn current(&self) -> &Token {
        // The token list always ends with Eof, and pos never moves past it.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &TokenKind {
        &self.current().kind
    }

    fn peek_at(&self, offset: usize) -> &TokenKind {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn error_here(&self, message: impl Into<String>) -> ParseError {
        let token = self.current();
        ParseError::new(token.line, token.column, message)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if *self.peek() == kind {
            Ok(self.advance())
        } else {
            Err(self.error_here(format!(
                "expected {}, found {}",
                kind.describe(),
                self.peek().describe()
            )))
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        match self.peek().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            other => Err(self.error_here(format!("expected identifier, found {}", other.describe()))),
        }
    }

    fn skip_newlines(&mut self) {
        while *self.peek() == TokenKind::Newline {
            self.advance();
        }
    }

    fn skip_separators(&mut self) {
        while matches!(self.peek(), TokenKind::Newline | TokenKind::Semi) {
            self.advance();
        }
    }

    /// Next token that is not a newline
    fn next_significant(&self) -> &TokenKind {
        let mut offset = 0;
        while *self.peek_at(offset) == TokenKind::Newline {
            offset += 1;
        }
        self.peek_at(offset)
    }

    fn statements(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut statements = Vec::new();
        loop {
            self.skip_separators();
            if matches!(self.peek(), TokenKind::RBrace | TokenKind::Eof) {
                return Ok(statements);
            }
            statements.push(self.statement()?);
            match self.peek() {
                TokenKind::Newline | TokenKind::Semi | TokenKind::RBrace | TokenKind::Eof => {}
                other => {
                    return Err(self.error_here(format!(
                        "expected end of statement, found {}",
                        other.describe()
                    )))
                }
            }
        }
    }

    /// `{ params -> statements }`
    fn lambda(&mut self) -> Result<Lambda, ParseError> {
        self.expect(TokenKind::LBrace)?;
        let params = self.lambda_params();
        let body = self.statements()?;
        self.expect(TokenKind::RBrace)?;
        Ok(Lambda { params, body })
    }

    /// `a, b ->` at the start of a lambda, or nothing
    fn lambda_params(&mut self) -> Vec<String> {
        let start = self.pos;
        self.skip_newlines();
        let mut params = Vec::new();
        loop {
            match self.peek().clone() {
                TokenKind::Arrow if params.is_empty() => {
                    self.advance();
                    return params;
                }
                TokenKind::Ident(name) => {
                    self.advance();
                    params.push(name);
                    match self.peek() {
                        TokenKind::Comma => {
                            self.advance();
                        }
                        TokenKind::Arrow => {
                            self.advance();
                            return params;
                        }
                        _ => break,
                    }
                }
                _ => break,
            }
        }
        self.pos = start;
        Vec::new()
    }

    fn statement(&mut self) -> Result<Stmt, ParseError> {
        let line = self.current().line;
        let TokenKind::Ident(word) = self.peek().clone() else {
            let expr = self.expr()?;
            return Ok(Stmt::Expr { expr, line });
        };
        match word.as_str() {
            "import" => return self.import(line),
            "val" | "var" => return self.val(line),
            "if" => return self.if_statement(line),
            _ => {}
        }

        let segments = self.chain(false)?;
        let op = match self.peek() {
            TokenKind::Assign => Some(AssignOp::Set),
            TokenKind::PlusAssign => Some(AssignOp::Append),
            TokenKind::MinusAssign => Some(AssignOp::Remove),
            _ => None,
        };
        if let Some(op) = op {
            let target = assign_target(&segments).ok_or_else(|| {
                ParseError::new(line, 1, "left side of assignment must be a property path")
            })?;
            self.advance();
            self.skip_newlines();
            let value = self.expr()?;
            return Ok(Stmt::Assign {
                target,
                op,
                value,
                line,
            });
        }

        if *self.peek() == TokenKind::LBrace {
            let Lambda { params, body } = self.lambda()?;
            return Ok(Stmt::Block {
                head: segments,
                params,
                body,
                line,
            });
        }

        let expr = self.casts(Expr::Chain(segments))?;
        let expr = self.operators(expr, 0)?;
        Ok(Stmt::Expr { expr, line })
    }

    fn import(&mut self, line: usize) -> Result<Stmt, ParseError> {
        self.advance();
        let mut path = self.expect_ident()?;
        while *self.peek() == TokenKind::Dot {
            self.advance();
            if *self.peek() == TokenKind::Star {
                self.advance();
                path.push_str(".*");
                break;
            }
            path.push('.');
            path.push_str(&self.expect_ident()?);
        }
        Ok(Stmt::Import { path, line })
    }

    fn val(&mut self, line: usize) -> Result<Stmt, ParseError> {
        self.advance();
        let name = self.expect_ident()?;
        let ty = if *self.peek() == TokenKind::Colon {
            self.advance();
            Some(self.type_name()?)
        } else {
            None
        };
        match self.peek() {
            TokenKind::Assign => {
                self.advance();
            }
            TokenKind::Ident(word) if word == "by" => {
                self.advance();
            }
            other => {
                return Err(self.error_here(format!("expected `=`, found {}", other.describe())))
            }
        }
        self.skip_newlines();
        let value = self.expr()?;
        Ok(Stmt::Val {
            name,
            ty,
            value,
            line,
        })
    }

    /// `Directory`, `java.io.File?`, `Map<String, List<Int>>`
    fn type_name(&mut self) -> Result<String, ParseError> {
        let mut ty = if *self.peek() == TokenKind::Star {
            self.advance();
            "*".to_string()
        } else {
            self.expect_ident()?
        };
        while *self.peek() == TokenKind::Dot {
            self.advance();
            ty.push('.');
            ty.push_str(&self.expect_ident()?);
        }
        if *self.peek() == TokenKind::Lt {
            self.advance();
            let mut args = vec![self.type_name()?];
            while *self.peek() == TokenKind::Comma {
                self.advance();
                args.push(self.type_name()?);
            }
            self.expect(TokenKind::Gt)?;
            ty.push('<');
            ty.push_str(&args.join(", "));
            ty.push('>');
        }
        if *self.peek() == TokenKind::Question {
            self.advance();
            ty.push('?');
        }
        Ok(ty)
    }

    /// `<Delete>` after a function name. Backtracks when the tokens read
    /// as a comparison instead.
    fn type_arguments(&mut self) -> Option<String> {
        let start = self.pos;
        self.advance();
        let mut args = Vec::new();
        loop {
            match self.type_name() {
                Ok(ty) => args.push(ty),
                Err(_) => break,
            }
            match self.peek() {
                TokenKind::Comma => {
                    self.advance();
                }
                TokenKind::Gt => {
                    self.advance();
                    if matches!(self.peek(), TokenKind::LParen | TokenKind::LBrace) {
                        return Some(format!("<{}>", args.join(", ")));
                    }
                    break;
                }
                _ => break,
            }
        }
        self.pos = start;
        None
    }

    fn if_statement(&mut self, line: usize) -> Result<Stmt, ParseError> {
        self.advance();
        self.expect(TokenKind::LParen)?;
        self.skip_newlines();
        let condition = self.expr()?;
        self.skip_newlines();
        self.expect(TokenKind::RParen)?;
        let then_body = self.branch()?;

        let else_body = if *self.next_significant() == TokenKind::Ident("else".to_string()) {
            self.skip_newlines();
            self.advance();
            self.branch()?
        } else {
            Vec::new()
        };

        Ok(Stmt::If {
            condition,
            then_body,
            else_body,
            line,
        })
    }

    fn branch(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.skip_newlines();
        if *self.peek() == TokenKind::LBrace {
            Ok(self.lambda()?.body)
        } else {
            Ok(vec![self.statement()?])
        }
    }

    /// A dotted chain. Trailing lambdas are only taken in expression
    /// position; at statement level `{` opens a block instead.
    fn chain(&mut self, trailing_lambdas: bool) -> Result<Vec<Segment>, ParseError> {
        let mut segments = vec![self.segment()?];
        loop {
            match self.peek() {
                TokenKind::Dot => {
                    self.advance();
                    segments.push(self.segment()?);
                }
                TokenKind::SafeDot => {
                    self.advance();
                    segments.push(Segment::NullSafe);
                    segments.push(self.segment()?);
                }
                TokenKind::NotNull => {
                    self.advance();
                    segments.push(Segment::NotNull);
                }
                TokenKind::LBracket => {
                    self.advance();
                    self.skip_newlines();
                    let index = self.expr()?;
                    self.skip_newlines();
                    self.expect(TokenKind::RBracket)?;
                    segments.push(Segment::Index(Box::new(index)));
                }
                TokenKind::LBrace
                    if trailing_lambdas
                        && matches!(segments.last(), Some(Segment::Name(_) | Segment::Call { .. })) =>
                {
                    segments.push(Segment::Lambda(self.lambda()?));
                }
                TokenKind::Newline
                    if matches!(self.next_significant(), TokenKind::Dot | TokenKind::SafeDot) =>
                {
                    self.skip_newlines();
                }
                _ => return Ok(segments),
            }
        }
    }

    fn segment(&mut self) -> Result<Segment, ParseError> {
        let mut name = self.expect_ident()?;
        if *self.peek() == TokenKind::Lt {
            if let Some(args) = self.type_arguments() {
                name.push_str(&args);
            }
        }
        if *self.peek() == TokenKind::LParen {
            let args = self.call_args()?;
            Ok(Segment::Call { name, args })
        } else {
            Ok(Segment::Name(name))
        }
    }

    fn call_args(&mut self) -> Result<Vec<Arg>, ParseError> {
        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();
        loop {
            self.skip_newlines();
            if *self.peek() == TokenKind::RParen {
                self.advance();
                return Ok(args);
            }

            let name = match (self.peek(), self.peek_at(1)) {
                (TokenKind::Ident(n), TokenKind::Assign) => {
                    let n = n.clone();
                    self.advance();
                    self.advance();
                    self.skip_newlines();
                    Some(n)
                }
                _ => None,
            };
            let value = self.expr()?;
            args.push(Arg { name, value });

            self.skip_newlines();
            match self.peek() {
                TokenKind::Comma => {
                    self.advance();
                }
                TokenKind::RParen => {}
                other => {
                    return Err(self.error_here(format!(
                        "expected `,` or `)`, found {}",
                        other.describe()
                    )))
                }
            }
        }
    }

    fn expr(&mut self) -> Result<Expr, ParseError> {
        let lhs = self.unary()?;
        self.operators(lhs, 0)
    }

    /// Fold operators binding at least as tight as `min` onto `lhs`
    fn operators(&mut self, mut lhs: Expr, min: u8) -> Result<Expr, ParseError> {
        while let Some((operator, precedence)) = self.operator() {
            if precedence < min {
                break;
            }
            self.skip_newlines();
            self.advance();
            self.skip_newlines();
            let rhs = self.unary()?;
            let rhs = self.operators(rhs, precedence + 1)?;
            lhs = match operator {
                Operator::Binary(op) => Expr::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                Operator::Infix(function) => Expr::Infix {
                    lhs: Box::new(lhs),
                    function,
                    rhs: Box::new(rhs),
                },
            };
        }
        Ok(lhs)
    }

    /// The operator after an operand, with its precedence
    fn operator(&self) -> Option<(Operator, u8)> {
        // `||`, `&&` and `?:` may open a continuation line
        let continued = match self.next_significant() {
            TokenKind::OrOr => Some(BinOp::Or),
            TokenKind::AndAnd => Some(BinOp::And),
            TokenKind::Elvis => Some(BinOp::Elvis),
            _ => None,
        };
        if let Some(op) = continued {
            return Some((Operator::Binary(op), precedence(op)));
        }

        let op = match self.peek() {
            TokenKind::Eq => BinOp::Eq,
            TokenKind::NotEq => BinOp::NotEq,
            TokenKind::Lt => BinOp::Lt,
            TokenKind::Gt => BinOp::Gt,
            TokenKind::LtEq => BinOp::LtEq,
            TokenKind::GtEq => BinOp::GtEq,
            TokenKind::Plus => BinOp::Add,
            TokenKind::Minus => BinOp::Sub,
            TokenKind::Star => BinOp::Mul,
            TokenKind::Slash => BinOp::Div,
            TokenKind::Percent => BinOp::Rem,
            TokenKind::Ident(name) if !KEYWORDS.contains(&name.as_str()) => {
                return Some((Operator::Infix(name.clone()), INFIX_PRECEDENCE));
            }
            _ => return None,
        };
        Some((Operator::Binary(op), precedence(op)))
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        match self.peek() {
            TokenKind::Not => {
                self.advance();
                Ok(Expr::Not(Box::new(self.unary()?)))
            }
            TokenKind::Minus => {
                self.advance();
                match self.advance().kind {
                    TokenKind::Int(v) => Ok(Expr::Int(-v)),
                    other => Err(self.error_here(format!(
                        "expected number after `-`, found {}",
                        other.describe()
                    ))),
                }
            }
            _ => {
                let expr = self.primary()?;
                self.casts(expr)
            }
        }
    }

    /// `as Type` and `as? Type` suffixes
    fn casts(&mut self, mut expr: Expr) -> Result<Expr, ParseError> {
        while *self.peek() == TokenKind::Ident("as".to_string()) {
            self.advance();
            let safe = *self.peek() == TokenKind::Question;
            if safe {
                self.advance();
            }
            let ty = self.type_name()?;
            expr = Expr::Cast {
                expr: Box::new(expr),
                ty,
                safe,
            };
        }
        Ok(expr)
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        match self.peek().clone() {
            TokenKind::Str(s) => {
                self.advance();
                Ok(Expr::Str(s))
            }
            TokenKind::Template(source) => {
                self.advance();
                Ok(Expr::Template(source))
            }
            TokenKind::Int(v) => {
                self.advance();
                Ok(Expr::Int(v))
            }
            TokenKind::LParen => {
                self.advance();
                self.skip_newlines();
                let inner = self.expr()?;
                self.skip_newlines();
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::LBrace => Ok(Expr::Lambda(self.lambda()?)),
            TokenKind::Ident(word) => match word.as_str() {
                "true" => {
                    self.advance();
                    Ok(Expr::Bool(true))
                }
                "false" => {
                    self.advance();
                    Ok(Expr::Bool(false))
                }
                "null" => {
                    self.advance();
                    Ok(Expr::Null)
                }
                _ => Ok(Expr::Chain(self.chain(true)?)),
            },
            other => Err(self.error_here(format!("expected expression, found {}", other.describe()))),
        }
    }
}

enum Operator {
    Binary(BinOp),
    /// Named infix call: `version`, `apply`, `to`
    Infix(String),
}

/// Words that end an expression rather than name an infix call
const KEYWORDS: [&str; 12] = [
    "else", "as", "is", "in", "by", "if", "val", "var", "import", "return", "when", "fun",
];

const INFIX_PRECEDENCE: u8 = 6;

fn precedence(op: BinOp) -> u8 {
    match op {
        BinOp::Or => 1,
        BinOp::And => 2,
        BinOp::Eq | BinOp::NotEq => 3,
        BinOp::Lt | BinOp::Gt | BinOp::LtEq | BinOp::GtEq => 4,
        BinOp::Elvis => 5,
        BinOp::Add | BinOp::Sub => 7,
        BinOp::Mul | BinOp::Div | BinOp::Rem => 8,
    }
}

fn assign_target(segments: &[Segment]) -> Option<Vec<String>> {
    segments
        .iter()
        .map(|s| match s {
            Segment::Name(name) => Some(name.clone()),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(source: &str) -> Stmt {
        let script = parse_script(source).unwrap();
        assert_eq!(script.statements.len(), 1, "{:?}", script.statements);
        script.statements.into_iter().next().unwrap()
    }

    #[test]
    fn test_assignment_with_reference() {
        match single("compileSdk = flutter.compileSdkVersion") {
            Stmt::Assign { target, op, value, .. } => {
                assert_eq!(target, vec!["compileSdk"]);
                assert_eq!(op, AssignOp::Set);
                assert_eq!(value.as_dotted().as_deref(), Some("flutter.compileSdkVersion"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_nested_blocks() {
        let stmt = single("android {\n  defaultConfig {\n    minSdk = 21\n  }\n}");
        let Stmt::Block { head, body, .. } = stmt else {
            panic!("expected block");
        };
        assert_eq!(head, vec![Segment::Name("android".into())]);
        let Stmt::Block { head, body, .. } = &body[0] else {
            panic!("expected inner block");
        };
        assert_eq!(head[0].name(), Some("defaultConfig"));
        assert!(matches!(&body[0], Stmt::Assign { value: Expr::Int(21), .. }));
    }

    #[test]
    fn test_block_with_call_head() {
        let stmt = single("create(\"release\") { keyAlias = \"upload\" }");
        let Stmt::Block { head, .. } = stmt else {
            panic!("expected block");
        };
        assert_eq!(head[0].name(), Some("create"));
        assert_eq!(head[0].args()[0].value.as_str(), Some("release"));
    }

    #[test]
    fn test_method_chain_value() {
        match single("signingConfig = signingConfigs.getByName(\"debug\")") {
            Stmt::Assign { value: Expr::Chain(segments), .. } => {
                assert_eq!(segments.len(), 2);
                assert_eq!(segments[1].name(), Some("getByName"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_nested_call_and_index() {
        let script = parse_script(
            "implementation(platform(\"com.google.firebase:firebase-bom:34.6.0\"))\nkeyAlias = props[\"keyAlias\"] as String",
        )
        .unwrap();
        assert_eq!(script.statements.len(), 2);
        let Stmt::Expr { expr, .. } = &script.statements[0] else {
            panic!("expected call");
        };
        let (name, args) = expr.as_call().unwrap();
        assert_eq!(name, "implementation");
        assert_eq!(args[0].value.as_call().unwrap().0, "platform");
        assert!(matches!(&script.statements[1], Stmt::Assign { value: Expr::Cast { .. }, .. }));
    }

    #[test]
    fn test_named_args_and_multiline_call() {
        let stmt = single("apply(\n  plugin = \"kotlin-android\",\n)");
        let Stmt::Expr { expr, .. } = stmt else {
            panic!("expected call");
        };
        let (_, args) = expr.as_call().unwrap();
        assert_eq!(args[0].name.as_deref(), Some("plugin"));
    }

    #[test]
    fn test_imports_vals_and_if() {
        let script = parse_script(
            "import java.util.Properties\nimport java.io.*\nval keystoreProperties = Properties()\nif (keystorePropertiesFile.exists() && !ci) {\n  keystoreProperties.load(stream)\n} else {\n  println(\"none\")\n}\n",
        )
        .unwrap();
        assert!(matches!(&script.statements[0], Stmt::Import { path, .. } if path == "java.util.Properties"));
        assert!(matches!(&script.statements[1], Stmt::Import { path, .. } if path == "java.io.*"));
        assert!(matches!(&script.statements[2], Stmt::Val { .. }));
        let Stmt::If { condition, then_body, else_body, .. } = &script.statements[3] else {
            panic!("expected if");
        };
        assert!(matches!(condition, Expr::Binary { op: BinOp::And, .. }));
        assert_eq!(then_body.len(), 1);
        assert_eq!(else_body.len(), 1);
    }

    #[test]
    fn test_semicolons_and_append() {
        let script = parse_script("a = 1; b += listOf(\"x\")").unwrap();
        assert_eq!(script.statements.len(), 2);
        assert!(matches!(&script.statements[1], Stmt::Assign { op: AssignOp::Append, .. }));
    }

    #[test]
    fn test_leading_dot_continuation() {
        let stmt = single("jvmTarget = JavaVersion.VERSION_17\n    .toString()");
        let Stmt::Assign { value: Expr::Chain(segments), .. } = stmt else {
            panic!("expected chain");
        };
        assert_eq!(segments.len(), 3);
    }

    #[test]
    fn test_unclosed_block_reports_position() {
        let err = parse_script("android {\n  namespace = \"a.b\"\n").unwrap_err();
        assert_eq!(err.line, 3);
        assert!(err.message.contains("`}`"));
    }

    #[test]
    fn test_stray_tokens_rejected() {
        let err = parse_script("minSdk = 21 22").unwrap_err();
        assert!(err.message.contains("end of statement"));
    }

    #[test]
    fn test_assignment_to_call_rejected() {
        assert!(parse_script("foo() = 1").is_err());
    }

    #[test]
    fn test_null_safe_let_with_trailing_lambda() {
        let stmt = single("storeFile = keystoreProperties[\"storeFile\"]?.let { file(it) }");
        let Stmt::Assign { target, value: Expr::Chain(segments), .. } = stmt else {
            panic!("expected chained assignment");
        };
        assert_eq!(target, vec!["storeFile"]);
        assert!(matches!(segments[1], Segment::Index(_)));
        assert_eq!(segments[2], Segment::NullSafe);
        assert_eq!(segments[3].name(), Some("let"));
        let Segment::Lambda(lambda) = &segments[4] else {
            panic!("expected trailing lambda");
        };
        assert!(lambda.params.is_empty());
        assert_eq!(lambda.body.len(), 1);
        assert_eq!(
            Segment::render_chain(&segments),
            "keystoreProperties[\"storeFile\"]?.let { file(it) }"
        );
    }

    #[test]
    fn test_flutter_root_build_file() {
        let script = parse_script(
            r#"allprojects {
    repositories {
        google()
        mavenCentral()
    }
}

val newBuildDir: Directory = rootProject.layout.buildDirectory.dir("../../build").get()
rootProject.layout.buildDirectory.value(newBuildDir)

subprojects {
    val newSubprojectBuildDir: Directory = newBuildDir.dir(project.name)
    project.layout.buildDirectory.value(newSubprojectBuildDir)
}
subprojects {
    project.evaluationDependsOn(":app")
}

tasks.register<Delete>("clean") {
    delete(rootProject.layout.buildDirectory)
}
"#,
        )
        .unwrap();
        assert_eq!(script.statements.len(), 6);
        assert!(matches!(
            &script.statements[1],
            Stmt::Val { ty: Some(ty), .. } if ty == "Directory"
        ));
        let Stmt::Block { head, .. } = &script.statements[5] else {
            panic!("expected block");
        };
        assert_eq!(head[1].name(), Some("register<Delete>"));
        assert_eq!(head[1].args()[0].value.as_str(), Some("clean"));
    }

    #[test]
    fn test_comparison_is_not_type_arguments() {
        let stmt = single("if (minSdk < 21 && b > c) { x = 1 }");
        let Stmt::If { condition, .. } = stmt else {
            panic!("expected if");
        };
        let Expr::Binary { op: BinOp::And, lhs, .. } = condition else {
            panic!("expected conjunction");
        };
        assert!(matches!(*lhs, Expr::Binary { op: BinOp::Lt, .. }));
    }

    #[test]
    fn test_operator_precedence() {
        let stmt = single("val code = props[\"code\"] as? String ?: base + 1 * 2");
        let Stmt::Val { value, .. } = stmt else {
            panic!("expected val");
        };
        let Expr::Binary { op: BinOp::Elvis, lhs, rhs } = value else {
            panic!("expected elvis at the top");
        };
        assert!(matches!(*lhs, Expr::Cast { safe: true, .. }));
        let Expr::Binary { op: BinOp::Add, rhs: product, .. } = *rhs else {
            panic!("expected sum");
        };
        assert!(matches!(*product, Expr::Binary { op: BinOp::Mul, .. }));
    }

    #[test]
    fn test_elvis_continues_on_next_line() {
        let stmt = single("val name = props[\"name\"]\n    ?: \"fallback\"");
        assert!(matches!(stmt, Stmt::Val { value: Expr::Binary { op: BinOp::Elvis, .. }, .. }));
    }

    #[test]
    fn test_infix_plugin_version() {
        let stmt = single("id(\"com.google.gms.google-services\") version \"4.4.2\" apply false");
        let Stmt::Expr { expr: Expr::Infix { lhs, function, rhs }, .. } = stmt else {
            panic!("expected infix call");
        };
        assert_eq!(function, "apply");
        assert_eq!(*rhs, Expr::Bool(false));
        assert!(matches!(*lhs, Expr::Infix { ref function, .. } if function == "version"));
    }

    #[test]
    fn test_block_lambda_params_and_remove() {
        let script = parse_script("subprojects { sub ->\n  sub.group = \"x\"\n}\nexcludes -= \"META-INF/*\"").unwrap();
        let Stmt::Block { params, body, .. } = &script.statements[0] else {
            panic!("expected block");
        };
        assert_eq!(params, &vec!["sub".to_string()]);
        assert_eq!(body.len(), 1);
        assert!(matches!(&script.statements[1], Stmt::Assign { op: AssignOp::Remove, .. }));
    }

    #[test]
    fn test_template_value_kept_verbatim() {
        let stmt = single("applicationId = \"com.radha.$flavor\"");
        let Stmt::Assign { value, .. } = stmt else {
            panic!("expected assignment");
        };
        assert_eq!(value, Expr::Template("\"com.radha.$flavor\"".into()));
        assert_eq!(value.render(), "\"com.radha.$flavor\"");
    }
}
