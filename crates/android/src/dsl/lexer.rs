//! Tokenizer for the Kotlin DSL subset used by Gradle build scripts

use super::ParseError;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    Str(String),
    /// String with `$name` or `${...}` interpolation, kept as written
    /// including its quotes
    Template(String),
    Int(i64),
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Dot,
    SafeDot,
    Comma,
    Semi,
    Colon,
    Assign,
    PlusAssign,
    MinusAssign,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Not,
    NotNull,
    Question,
    Elvis,
    Arrow,
    AndAnd,
    OrOr,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Newline,
    Eof,
}

impl TokenKind {
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Ident(name) => format!("identifier `{}`", name),
            TokenKind::Str(_) => "string literal".to_string(),
            TokenKind::Template(_) => "string template".to_string(),
            TokenKind::Int(v) => format!("number `{}`", v),
            TokenKind::LBrace => "`{`".to_string(),
            TokenKind::RBrace => "`}`".to_string(),
            TokenKind::LParen => "`(`".to_string(),
            TokenKind::RParen => "`)`".to_string(),
            TokenKind::LBracket => "`[`".to_string(),
            TokenKind::RBracket => "`]`".to_string(),
            TokenKind::Dot => "`.`".to_string(),
            TokenKind::SafeDot => "`?.`".to_string(),
            TokenKind::Comma => "`,`".to_string(),
            TokenKind::Semi => "`;`".to_string(),
            TokenKind::Colon => "`:`".to_string(),
            TokenKind::Assign => "`=`".to_string(),
            TokenKind::PlusAssign => "`+=`".to_string(),
            TokenKind::MinusAssign => "`-=`".to_string(),
            TokenKind::Eq => "`==`".to_string(),
            TokenKind::NotEq => "`!=`".to_string(),
            TokenKind::Lt => "`<`".to_string(),
            TokenKind::Gt => "`>`".to_string(),
            TokenKind::LtEq => "`<=`".to_string(),
            TokenKind::GtEq => "`>=`".to_string(),
            TokenKind::Not => "`!`".to_string(),
            TokenKind::NotNull => "`!!`".to_string(),
            TokenKind::Question => "`?`".to_string(),
            TokenKind::Elvis => "`?:`".to_string(),
            TokenKind::Arrow => "`->`".to_string(),
            TokenKind::AndAnd => "`&&`".to_string(),
            TokenKind::OrOr => "`||`".to_string(),
            TokenKind::Plus => "`+`".to_string(),
            TokenKind::Minus => "`-`".to_string(),
            TokenKind::Star => "`*`".to_string(),
            TokenKind::Slash => "`/`".to_string(),
            TokenKind::Percent => "`%`".to_string(),
            TokenKind::Newline => "end of line".to_string(),
            TokenKind::Eof => "end of file".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

/// Split source text into tokens. Comments are dropped; newlines are kept
/// because they terminate statements.
pub fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    tokenize_counting_comments(source).map(|(tokens, _)| tokens)
}

/// Like [`tokenize`], also returning how many comments were dropped
pub fn tokenize_counting_comments(source: &str) -> Result<(Vec<Token>, usize), ParseError> {
    let mut lexer = Lexer::new(source);
    lexer.run()?;
    Ok((lexer.tokens, lexer.comments))
}

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
    comments: usize,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            line: 1,
            column: 1,
            tokens: Vec::new(),
            comments: 0,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn peek_second(&self) -> Option<char> {
        let mut ahead = self.chars.clone();
        ahead.next();
        ahead.next()
    }

    fn push(&mut self, kind: TokenKind, line: usize, column: usize) {
        self.tokens.push(Token { kind, line, column });
    }

    fn run(&mut self) -> Result<(), ParseError> {
        while let Some(c) = self.peek() {
            let (line, column) = (self.line, self.column);
            match c {
                '\n' => {
                    self.bump();
                    self.push(TokenKind::Newline, line, column);
                }
                c if c.is_whitespace() => {
                    self.bump();
                }
                '/' if self.peek_second() == Some('/') => self.skip_line_comment(),
                '/' if self.peek_second() == Some('*') => self.skip_block_comment(line, column)?,
                '"' => {
                    let kind = self.string(line, column)?;
                    self.push(kind, line, column);
                }
                '`' => {
                    let name = self.backtick_ident(line, column)?;
                    self.push(TokenKind::Ident(name), line, column);
                }
                c if c.is_ascii_digit() => {
                    let value = self.number(line, column)?;
                    self.push(TokenKind::Int(value), line, column);
                }
                c if c.is_alphabetic() || c == '_' => {
                    let name = self.ident();
                    self.push(TokenKind::Ident(name), line, column);
                }
                _ => {
                    let kind = self.punct(c, line, column)?;
                    self.push(kind, line, column);
                }
            }
        }
        let (line, column) = (self.line, self.column);
        self.push(TokenKind::Eof, line, column);
        Ok(())
    }

    fn punct(&mut self, c: char, line: usize, column: usize) -> Result<TokenKind, ParseError> {
        self.bump();
        let next = self.peek();
        let kind = match (c, next) {
            ('{', _) => TokenKind::LBrace,
            ('}', _) => TokenKind::RBrace,
            ('(', _) => TokenKind::LParen,
            (')', _) => TokenKind::RParen,
            ('[', _) => TokenKind::LBracket,
            (']', _) => TokenKind::RBracket,
            ('.', _) => TokenKind::Dot,
            (',', _) => TokenKind::Comma,
            (';', _) => TokenKind::Semi,
            (':', _) => TokenKind::Colon,
            ('?', Some('.')) => {
                self.bump();
                TokenKind::SafeDot
            }
            ('?', Some(':')) => {
                self.bump();
                TokenKind::Elvis
            }
            ('?', _) => TokenKind::Question,
            ('=', Some('=')) => {
                self.bump();
                TokenKind::Eq
            }
            ('=', _) => TokenKind::Assign,
            ('+', Some('=')) => {
                self.bump();
                TokenKind::PlusAssign
            }
            ('+', _) => TokenKind::Plus,
            ('-', Some('=')) => {
                self.bump();
                TokenKind::MinusAssign
            }
            ('-', Some('>')) => {
                self.bump();
                TokenKind::Arrow
            }
            ('<', Some('=')) => {
                self.bump();
                TokenKind::LtEq
            }
            ('<', _) => TokenKind::Lt,
            ('>', Some('=')) => {
                self.bump();
                TokenKind::GtEq
            }
            ('>', _) => TokenKind::Gt,
            ('!', Some('!')) => {
                self.bump();
                TokenKind::NotNull
            }
            ('!', Some('=')) => {
                self.bump();
                TokenKind::NotEq
            }
            ('!', _) => TokenKind::Not,
            ('&', Some('&')) => {
                self.bump();
                TokenKind::AndAnd
            }
            ('|', Some('|')) => {
                self.bump();
                TokenKind::OrOr
            }
            ('-', _) => TokenKind::Minus,
            ('*', _) => TokenKind::Star,
            ('/', _) => TokenKind::Slash,
            ('%', _) => TokenKind::Percent,
            _ => {
                return Err(ParseError::new(
                    line,
                    column,
                    format!("unexpected character `{}`", c),
                ))
            }
        };
        Ok(kind)
    }

    fn skip_line_comment(&mut self) {
        self.comments += 1;
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.bump();
        }
    }

    fn skip_block_comment(&mut self, line: usize, column: usize) -> Result<(), ParseError> {
        self.comments += 1;
        self.bump();
        self.bump();
        let mut depth = 1usize;
        while depth > 0 {
            match self.bump() {
                Some('*') if self.peek() == Some('/') => {
                    self.bump();
                    depth -= 1;
                }
                Some('/') if self.peek() == Some('*') => {
                    self.bump();
                    depth += 1;
                }
                Some(_) => {}
                None => return Err(ParseError::new(line, column, "unterminated block comment")),
            }
        }
        Ok(())
    }

    fn string(&mut self, line: usize, column: usize) -> Result<TokenKind, ParseError> {
        self.bump();
        if self.peek() == Some('"') && self.peek_second() == Some('"') {
            self.bump();
            self.bump();
            return self.raw_string(line, column);
        }
        if self.peek() == Some('"') {
            self.bump();
            return Ok(TokenKind::Str(String::new()));
        }

        // `text` is the unescaped value, `source` the literal as written
        let mut text = String::new();
        let mut source = String::from('"');
        let mut templated = false;
        loop {
            match self.bump() {
                Some('"') => {
                    source.push('"');
                    return Ok(if templated {
                        TokenKind::Template(source)
                    } else {
                        TokenKind::Str(text)
                    });
                }
                Some('\\') => {
                    source.push('\\');
                    let escaped = match self.bump() {
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some('"') => '"',
                        Some('\\') => '\\',
                        Some('$') => '$',
                        Some('\'') => '\'',
                        Some(other) => {
                            return Err(ParseError::new(
                                self.line,
                                self.column,
                                format!("unsupported escape `\\{}`", other),
                            ))
                        }
                        None => break,
                    };
                    source.push(match escaped {
                        '\n' => 'n',
                        '\t' => 't',
                        '\r' => 'r',
                        other => other,
                    });
                    text.push(escaped);
                }
                Some('$') if self.peek() == Some('{') => {
                    templated = true;
                    source.push('$');
                    self.template_expression(&mut source, line, column)?;
                }
                Some('$') if self.peek().is_some_and(|c| c.is_alphabetic() || c == '_') => {
                    templated = true;
                    source.push('$');
                }
                Some('\n') | None => break,
                Some(c) => {
                    text.push(c);
                    source.push(c);
                }
            }
        }
        Err(ParseError::new(line, column, "unterminated string literal"))
    }

    /// Copy a `${...}` interpolation into `source`, braces included
    fn template_expression(
        &mut self,
        source: &mut String,
        line: usize,
        column: usize,
    ) -> Result<(), ParseError> {
        let mut depth = 0usize;
        let mut in_string = false;
        loop {
            let c = match self.bump() {
                Some('\n') | None => {
                    return Err(ParseError::new(line, column, "unterminated string template"))
                }
                Some(c) => c,
            };
            source.push(c);
            match c {
                '\\' if in_string => {
                    if let Some(escaped) = self.bump() {
                        source.push(escaped);
                    }
                }
                '"' => in_string = !in_string,
                '{' if !in_string => depth += 1,
                '}' if !in_string => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                _ => {}
            }
        }
    }

    fn raw_string(&mut self, line: usize, column: usize) -> Result<TokenKind, ParseError> {
        let mut text = String::new();
        let mut templated = false;
        loop {
            match self.bump() {
                Some('"') if self.peek() == Some('"') && self.peek_second() == Some('"') => {
                    self.bump();
                    self.bump();
                    return Ok(if templated {
                        TokenKind::Template(format!("\"\"\"{}\"\"\"", text))
                    } else {
                        TokenKind::Str(text)
                    });
                }
                Some('$') => {
                    if self.peek().is_some_and(|c| c == '{' || c.is_alphabetic() || c == '_') {
                        templated = true;
                    }
                    text.push('$');
                }
                Some(c) => text.push(c),
                None => return Err(ParseError::new(line, column, "unterminated raw string")),
            }
        }
    }

    fn backtick_ident(&mut self, line: usize, column: usize) -> Result<String, ParseError> {
        self.bump();
        let mut name = String::new();
        loop {
            match self.bump() {
                Some('`') => return Ok(name),
                Some('\n') | None => {
                    return Err(ParseError::new(line, column, "unterminated quoted identifier"))
                }
                Some(c) => name.push(c),
            }
        }
    }

    fn number(&mut self, line: usize, column: usize) -> Result<i64, ParseError> {
        let mut digits = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                digits.push(c);
            } else if c != '_' {
                break;
            }
            self.bump();
        }
        // Long suffix: 1L
        if self.peek() == Some('L') {
            self.bump();
        }
        digits
            .parse()
            .map_err(|_| ParseError::new(line, column, format!("number `{}` out of range", digits)))
    }

    fn ident(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                name.push(c);
                self.bump();
            } else {
                break;
            }
        }
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .filter(|k| *k != TokenKind::Newline)
            .collect()
    }

    #[test]
    fn test_assignment_tokens() {
        assert_eq!(
            kinds("minSdk = flutter.minSdkVersion // REQUIRED"),
            vec![
                TokenKind::Ident("minSdk".into()),
                TokenKind::Assign,
                TokenKind::Ident("flutter".into()),
                TokenKind::Dot,
                TokenKind::Ident("minSdkVersion".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_block_comment_nesting() {
        assert_eq!(
            kinds("/* outer /* inner */ still */ 42"),
            vec![TokenKind::Int(42), TokenKind::Eof]
        );
    }

    #[test]
    fn test_string_escapes_and_raw() {
        assert_eq!(
            kinds(r#""a\"b" """raw "quoted" text""" "#),
            vec![
                TokenKind::Str("a\"b".into()),
                TokenKind::Str("raw \"quoted\" text".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comment_count() {
        let (_, comments) =
            tokenize_counting_comments("a = 1 // one\n/* two /* nested */ */\nb = \"// not a comment\"").unwrap();
        assert_eq!(comments, 2);
    }

    #[test]
    fn test_positions() {
        let tokens = tokenize("a\n  b").unwrap();
        let b = tokens
            .iter()
            .find(|t| t.kind == TokenKind::Ident("b".into()))
            .unwrap();
        assert_eq!((b.line, b.column), (2, 3));
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("namespace = \"com.example").unwrap_err();
        assert_eq!(err.line, 1);
        assert_eq!(err.column, 13);
    }

    #[test]
    fn test_unexpected_character() {
        let err = tokenize("a = 1 @ 2").unwrap_err();
        assert!(err.message.contains('@'));
    }

    #[test]
    fn test_null_safety_operators() {
        assert_eq!(
            kinds("props[\"storeFile\"]?.let { file(it) } ?: x!!"),
            vec![
                TokenKind::Ident("props".into()),
                TokenKind::LBracket,
                TokenKind::Str("storeFile".into()),
                TokenKind::RBracket,
                TokenKind::SafeDot,
                TokenKind::Ident("let".into()),
                TokenKind::LBrace,
                TokenKind::Ident("file".into()),
                TokenKind::LParen,
                TokenKind::Ident("it".into()),
                TokenKind::RParen,
                TokenKind::RBrace,
                TokenKind::Elvis,
                TokenKind::Ident("x".into()),
                TokenKind::NotNull,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_type_punctuation() {
        assert_eq!(
            kinds("val d: Dir? = a as? B<C> -> 1 + 2 / 3 <= 4 >= 5 -= 6"),
            vec![
                TokenKind::Ident("val".into()),
                TokenKind::Ident("d".into()),
                TokenKind::Colon,
                TokenKind::Ident("Dir".into()),
                TokenKind::Question,
                TokenKind::Assign,
                TokenKind::Ident("a".into()),
                TokenKind::Ident("as".into()),
                TokenKind::Question,
                TokenKind::Ident("B".into()),
                TokenKind::Lt,
                TokenKind::Ident("C".into()),
                TokenKind::Gt,
                TokenKind::Arrow,
                TokenKind::Int(1),
                TokenKind::Plus,
                TokenKind::Int(2),
                TokenKind::Slash,
                TokenKind::Int(3),
                TokenKind::LtEq,
                TokenKind::Int(4),
                TokenKind::GtEq,
                TokenKind::Int(5),
                TokenKind::MinusAssign,
                TokenKind::Int(6),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_string_templates_keep_source() {
        assert_eq!(
            kinds(r#""com.radha.$flavor" "v${props["name"]}.x" "\$plain" "$ 5""#),
            vec![
                TokenKind::Template("\"com.radha.$flavor\"".into()),
                TokenKind::Template(r#""v${props["name"]}.x""#.into()),
                TokenKind::Str("$plain".into()),
                TokenKind::Str("$ 5".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_unterminated_template() {
        let err = tokenize("a = \"${b\"\nc = 1").unwrap_err();
        assert_eq!((err.line, err.column), (1, 5));
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("!a && b || c != d == e += -1"),
            vec![
                TokenKind::Not,
                TokenKind::Ident("a".into()),
                TokenKind::AndAnd,
                TokenKind::Ident("b".into()),
                TokenKind::OrOr,
                TokenKind::Ident("c".into()),
                TokenKind::NotEq,
                TokenKind::Ident("d".into()),
                TokenKind::Eq,
                TokenKind::Ident("e".into()),
                TokenKind::PlusAssign,
                TokenKind::Minus,
                TokenKind::Int(1),
                TokenKind::Eof,
            ]
        );
    }
}
