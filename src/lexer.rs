//! Lexer: classifies runs of source runes into tokens.

use std::fmt;

use crate::error::{Error, Result};
use crate::scanner::{Scanner, Span};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Eof,
    Number,
    Ident,
    /// `'...'` quoted string literal.
    Str,
    /// `"..."` interpolated-form literal. Lexed as one opaque run; the
    /// parser decides what to do with it.
    Interp,
    Comment,

    // Keywords
    Fun,
    Return,
    End,
    While,
    If,
    Else,
    True,
    False,
    In,
    Mod,
    And,
    Or,
    Break,
    Continue,
    Var,

    // Symbols
    Assign,
    Eq,
    Le,
    Lt,
    Comma,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Plus,
    Minus,
    Star,
    Slash,
    Dot,
    Colon,
    Ellipsis,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Eof => "eof",
            TokenKind::Number => "number",
            TokenKind::Ident => "identifier",
            TokenKind::Str => "string",
            TokenKind::Interp => "interpolated string",
            TokenKind::Comment => "comment",
            TokenKind::Fun => "'fun'",
            TokenKind::Return => "'return'",
            TokenKind::End => "'end'",
            TokenKind::While => "'while'",
            TokenKind::If => "'if'",
            TokenKind::Else => "'else'",
            TokenKind::True => "'true'",
            TokenKind::False => "'false'",
            TokenKind::In => "'in'",
            TokenKind::Mod => "'mod'",
            TokenKind::And => "'and'",
            TokenKind::Or => "'or'",
            TokenKind::Break => "'break'",
            TokenKind::Continue => "'continue'",
            TokenKind::Var => "'var'",
            TokenKind::Assign => "'='",
            TokenKind::Eq => "'=='",
            TokenKind::Le => "'<='",
            TokenKind::Lt => "'<'",
            TokenKind::Comma => "','",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Dot => "'.'",
            TokenKind::Colon => "':'",
            TokenKind::Ellipsis => "'...'",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

fn symbol_kind(r: char) -> Option<TokenKind> {
    let kind = match r {
        '=' => TokenKind::Assign,
        '<' => TokenKind::Lt,
        ',' => TokenKind::Comma,
        '(' => TokenKind::LParen,
        ')' => TokenKind::RParen,
        '[' => TokenKind::LBracket,
        ']' => TokenKind::RBracket,
        '{' => TokenKind::LBrace,
        '}' => TokenKind::RBrace,
        '+' => TokenKind::Plus,
        '-' => TokenKind::Minus,
        '*' => TokenKind::Star,
        '/' => TokenKind::Slash,
        '.' => TokenKind::Dot,
        ':' => TokenKind::Colon,
        _ => return None,
    };
    Some(kind)
}

fn keyword_kind(text: &str) -> Option<TokenKind> {
    let kind = match text {
        "fun" => TokenKind::Fun,
        "return" => TokenKind::Return,
        "end" => TokenKind::End,
        "while" => TokenKind::While,
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "in" => TokenKind::In,
        "mod" => TokenKind::Mod,
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        "break" => TokenKind::Break,
        "continue" => TokenKind::Continue,
        "var" => TokenKind::Var,
        _ => return None,
    };
    Some(kind)
}

fn is_ident_letter(r: char) -> bool {
    r.is_alphanumeric() || r == '_'
}

pub struct Lexer {
    s: Scanner,
}

impl Lexer {
    pub fn new(text: &str) -> Self {
        Self {
            s: Scanner::new(text),
        }
    }

    /// Produce the next token, or fail with a lex error.
    pub fn next(&mut self) -> Result<Token> {
        self.skip_whitespace_and_comments();

        if self.s.is_eof() {
            return Ok(self.new_token(TokenKind::Eof));
        }

        if self.s.peek(3) == "..." {
            self.s.advance(3);
            return Ok(self.new_token(TokenKind::Ellipsis));
        }

        if self.s.peek(2) == "<=" {
            self.s.advance(2);
            return Ok(self.new_token(TokenKind::Le));
        }

        if self.s.peek(2) == "==" {
            self.s.advance(2);
            return Ok(self.new_token(TokenKind::Eq));
        }

        let r = match self.s.current() {
            Some(r) => r,
            None => return Ok(self.new_token(TokenKind::Eof)),
        };

        if let Some(kind) = symbol_kind(r) {
            self.s.advance(1);
            return Ok(self.new_token(kind));
        }

        if r.is_ascii_digit() {
            return Ok(self.number());
        }

        if r == '\'' {
            return self.literal(TokenKind::Str);
        }

        if r == '"' {
            return self.literal(TokenKind::Interp);
        }

        if is_ident_letter(r) {
            return Ok(self.ident());
        }

        Err(Error::Lex(format!("unexpected character '{r}'")))
    }

    fn new_token(&mut self, kind: TokenKind) -> Token {
        let (text, span) = self.s.flush();
        Token { kind, text, span }
    }

    /// Skip runs of whitespace and comments until no further progress.
    fn skip_whitespace_and_comments(&mut self) {
        while !self.s.is_eof() {
            let mut read = self.skip_whitespace();
            read += self.skip_comment();
            if read == 0 {
                break;
            }
        }
    }

    fn skip_whitespace(&mut self) -> usize {
        while self.s.current().is_some_and(char::is_whitespace) {
            self.s.skip(1);
        }
        let (_, span) = self.s.flush();
        span.hi - span.lo
    }

    fn skip_comment(&mut self) -> usize {
        if self.s.peek(2) == "//" {
            return self.comment(2, "\n");
        }
        if self.s.peek(2) == "/*" {
            return self.comment(2, "*/");
        }
        0
    }

    /// Block comments do not nest.
    fn comment(&mut self, open_len: usize, close: &str) -> usize {
        self.s.skip(open_len);
        let close_len = close.chars().count();
        while !self.s.is_eof() && self.s.peek(close_len) != close {
            self.s.skip(1);
        }
        self.s.skip(close_len);
        let (_, span) = self.s.flush();
        span.hi - span.lo
    }

    /// Integer part, then at most one `.` with a fractional digit run.
    /// No exponents; a leading sign is the parser's prefix operator.
    fn number(&mut self) -> Token {
        while self.s.current().is_some_and(|r| r.is_ascii_digit()) {
            self.s.advance(1);
        }
        if self.s.current() == Some('.') {
            self.s.advance(1);
            while self.s.current().is_some_and(|r| r.is_ascii_digit()) {
                self.s.advance(1);
            }
        }
        self.new_token(TokenKind::Number)
    }

    fn literal(&mut self, kind: TokenKind) -> Result<Token> {
        let marker = self.s.current();
        self.s.skip(1);

        while !self.s.is_eof() && self.s.current() != marker {
            if self.s.current() == Some('\\') {
                self.escape_sequence();
            } else {
                self.s.advance(1);
            }
        }

        if self.s.is_eof() {
            let (_, span) = self.s.flush();
            return Err(Error::Lex(format!(
                "unexpected eof while reading string literal at {}",
                span.hi
            )));
        }

        self.s.skip(1); // closing marker

        Ok(self.new_token(kind))
    }

    fn escape_sequence(&mut self) {
        self.s.skip(1); // backslash

        let Some(r) = self.s.current() else {
            return;
        };
        match r {
            't' => self.s.replace('\t'),
            'r' => self.s.replace('\r'),
            'n' => self.s.replace('\n'),
            'b' => self.s.replace('\u{8}'),
            // Any other escaped rune is copied literally.
            _ => self.s.replace(r),
        }
    }

    fn ident(&mut self) -> Token {
        while self.s.current().is_some_and(is_ident_letter) {
            self.s.advance(1);
        }
        let mut tok = self.new_token(TokenKind::Ident);
        if let Some(kind) = keyword_kind(&tok.text) {
            tok.kind = kind;
        }
        tok
    }
}
