//! Tokenizer for the script language.
//!
//! Produces a flat token stream where block structure is expressed through
//! `Indent`/`Dedent` tokens and logical lines end in `Newline`. Line breaks
//! inside brackets are ignored.

use super::error::{ErrorKind, ScriptError, ScriptResult};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Int(i64),
    Float(f64),
    Str(String),
    Name(String),

    // Keywords
    If,
    Elif,
    Else,
    While,
    For,
    In,
    Not,
    And,
    Or,
    Is,
    Def,
    Return,
    Break,
    Continue,
    Pass,
    Global,
    True,
    False,
    None,

    // Operators
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    SlashSlash,
    Percent,
    Ampersand,
    Pipe,
    Caret,
    Tilde,
    LessLess,
    GreaterGreater,
    EqEq,
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,

    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Colon,
    Semicolon,
    Dot,

    // Layout
    Newline,
    Indent,
    Dedent,
    Eof,
}

fn keyword(word: &str) -> Option<Token> {
    let token = match word {
        "if" => Token::If,
        "elif" => Token::Elif,
        "else" => Token::Else,
        "while" => Token::While,
        "for" => Token::For,
        "in" => Token::In,
        "not" => Token::Not,
        "and" => Token::And,
        "or" => Token::Or,
        "is" => Token::Is,
        "def" => Token::Def,
        "return" => Token::Return,
        "break" => Token::Break,
        "continue" => Token::Continue,
        "pass" => Token::Pass,
        "global" => Token::Global,
        "True" => Token::True,
        "False" => Token::False,
        "None" => Token::None,
        _ => return None,
    };
    Some(token)
}

/// A token and the 1-based line it starts on
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub line: usize,
}

const TAB_STOP: usize = 8;

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    bracket_depth: usize,
    indents: Vec<usize>,
    tokens: Vec<Spanned>,
}

/// Tokenize a whole program
pub fn tokenize(source: &str) -> ScriptResult<Vec<Spanned>> {
    let mut lexer = Lexer {
        chars: source.chars().collect(),
        pos: 0,
        line: 1,
        bracket_depth: 0,
        indents: vec![0],
        tokens: Vec::new(),
    };
    lexer.run()?;
    Ok(lexer.tokens)
}

impl Lexer {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
        }
        Some(ch)
    }

    fn push(&mut self, token: Token) {
        self.tokens.push(Spanned {
            token,
            line: self.line,
        });
    }

    fn run(&mut self) -> ScriptResult<()> {
        let mut at_line_start = true;
        loop {
            if at_line_start && self.bracket_depth == 0 {
                if !self.indentation()? {
                    break;
                }
                at_line_start = false;
            }
            let Some(ch) = self.peek() else { break };
            match ch {
                '\n' => {
                    if self.bracket_depth == 0 {
                        self.push(Token::Newline);
                        at_line_start = true;
                    }
                    self.bump();
                }
                ' ' | '\t' | '\r' | '\x0c' => {
                    self.bump();
                }
                '#' => self.skip_comment(),
                '\\' if self.peek_at(1) == Some('\n') => {
                    self.bump();
                    self.bump();
                }
                '0'..='9' => self.number()?,
                '.' if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => self.number()?,
                '"' | '\'' => self.string(ch)?,
                c if c.is_alphabetic() || c == '_' => self.identifier(),
                _ => self.operator(ch)?,
            }
        }

        // An unclosed bracket leaves the line open so the parser reports EOF
        if self.bracket_depth == 0
            && self
                .tokens
                .last()
                .is_some_and(|t| !matches!(t.token, Token::Newline | Token::Dedent))
        {
            self.push(Token::Newline);
        }
        while self.indents.len() > 1 {
            self.indents.pop();
            self.push(Token::Dedent);
        }
        self.push(Token::Eof);
        Ok(())
    }

    /// Measure the indentation of the next non-blank line and emit layout tokens.
    /// Returns false at end of input.
    fn indentation(&mut self) -> ScriptResult<bool> {
        loop {
            let mut width = 0;
            while let Some(ch) = self.peek() {
                match ch {
                    ' ' => width += 1,
                    '\t' => width = (width / TAB_STOP + 1) * TAB_STOP,
                    '\x0c' | '\r' => {}
                    _ => break,
                }
                self.bump();
            }
            match self.peek() {
                None => return Ok(false),
                Some('\n') => {
                    self.bump();
                    continue;
                }
                Some('#') => {
                    self.skip_comment();
                    continue;
                }
                Some(_) => {}
            }

            let current = self.indents.last().copied().unwrap_or(0);
            if width > current {
                self.indents.push(width);
                self.push(Token::Indent);
            } else if width < current {
                while self.indents.last().is_some_and(|&w| w > width) {
                    self.indents.pop();
                    self.push(Token::Dedent);
                }
                if self.indents.last() != Some(&width) {
                    return Err(ScriptError::indentation(
                        "unindent does not match any outer indentation level",
                        self.line,
                    ));
                }
            }
            return Ok(true);
        }
    }

    fn skip_comment(&mut self) {
        while self.peek().is_some_and(|c| c != '\n') {
            self.bump();
        }
    }

    fn identifier(&mut self) {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
        {
            self.bump();
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        let token = keyword(&word).unwrap_or(Token::Name(word));
        self.push(token);
    }

    /// Integer (decimal, `0x`, `0b`, `0o`) or float literal
    fn number(&mut self) -> ScriptResult<()> {
        let line = self.line;
        if self.peek() == Some('0') {
            let radix = match self.peek_at(1) {
                Some('x' | 'X') => Some(16),
                Some('b' | 'B') => Some(2),
                Some('o' | 'O') => Some(8),
                _ => None,
            };
            if let Some(radix) = radix {
                self.pos += 2;
                let start = self.pos;
                while self.peek().is_some_and(|c| c.is_digit(radix)) {
                    self.bump();
                }
                let digits: String = self.chars[start..self.pos].iter().collect();
                if digits.is_empty() {
                    return Err(ScriptError::syntax("invalid number literal", line));
                }
                let value = i64::from_str_radix(&digits, radix).map_err(|_| {
                    ScriptError::new(ErrorKind::OverflowError, "integer literal too large")
                })?;
                self.push(Token::Int(value));
                return Ok(());
            }
        }

        let start = self.pos;
        let mut is_float = false;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        if self.peek() == Some('.') {
            is_float = true;
            self.bump();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
            }
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let sign = usize::from(matches!(self.peek_at(1), Some('+' | '-')));
            if self.peek_at(1 + sign).is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                self.pos += 1 + sign;
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.bump();
                }
            }
        }
        if self.peek().is_some_and(|c| c.is_alphabetic() || c == '_') {
            return Err(ScriptError::syntax("invalid decimal literal", line));
        }

        let text: String = self.chars[start..self.pos].iter().collect();
        let token = if is_float {
            text.parse::<f64>()
                .map(Token::Float)
                .map_err(|_| ScriptError::syntax("invalid number literal", line))?
        } else {
            text.parse::<i64>().map(Token::Int).map_err(|_| {
                ScriptError::new(ErrorKind::OverflowError, "integer literal too large")
            })?
        };
        self.push(token);
        Ok(())
    }

    /// Single, double or triple quoted string with backslash escapes
    fn string(&mut self, quote: char) -> ScriptResult<()> {
        let line = self.line;
        let triple = self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote);
        self.pos += if triple { 3 } else { 1 };

        let mut value = String::new();
        loop {
            let Some(ch) = self.bump() else {
                return Err(ScriptError::syntax("unterminated string literal", line));
            };
            match ch {
                c if c == quote && !triple => break,
                c if c == quote && self.peek() == Some(quote) && self.peek_at(1) == Some(quote) => {
                    self.pos += 2;
                    break;
                }
                '\n' if !triple => {
                    return Err(ScriptError::syntax("unterminated string literal", line));
                }
                '\\' => {
                    let Some(escaped) = self.bump() else {
                        return Err(ScriptError::syntax("unterminated string literal", line));
                    };
                    match escaped {
                        'n' => value.push('\n'),
                        't' => value.push('\t'),
                        'r' => value.push('\r'),
                        '0' => value.push('\0'),
                        '\\' => value.push('\\'),
                        '\'' => value.push('\''),
                        '"' => value.push('"'),
                        '\n' => {}
                        other => {
                            value.push('\\');
                            value.push(other);
                        }
                    }
                }
                c => value.push(c),
            }
        }
        self.tokens.push(Spanned {
            token: Token::Str(value),
            line,
        });
        Ok(())
    }

    fn operator(&mut self, ch: char) -> ScriptResult<()> {
        let next = self.peek_at(1);
        let third = self.peek_at(2);
        let (token, width) = match (ch, next) {
            ('*', Some('*')) => (Token::StarStar, 2),
            ('*', Some('=')) => (Token::StarAssign, 2),
            ('/', Some('/')) => (Token::SlashSlash, 2),
            ('/', Some('=')) => (Token::SlashAssign, 2),
            ('+', Some('=')) => (Token::PlusAssign, 2),
            ('-', Some('=')) => (Token::MinusAssign, 2),
            ('<', Some('<')) => (Token::LessLess, 2),
            ('>', Some('>')) => (Token::GreaterGreater, 2),
            ('<', Some('=')) => (Token::LessEq, 2),
            ('>', Some('=')) => (Token::GreaterEq, 2),
            ('=', Some('=')) => (Token::EqEq, 2),
            ('!', Some('=')) => (Token::NotEq, 2),
            ('+', _) => (Token::Plus, 1),
            ('-', _) => (Token::Minus, 1),
            ('*', _) => (Token::Star, 1),
            ('/', _) => (Token::Slash, 1),
            ('%', _) => (Token::Percent, 1),
            ('&', _) => (Token::Ampersand, 1),
            ('|', _) => (Token::Pipe, 1),
            ('^', _) => (Token::Caret, 1),
            ('~', _) => (Token::Tilde, 1),
            ('<', _) => (Token::Less, 1),
            ('>', _) => (Token::Greater, 1),
            ('=', _) => (Token::Assign, 1),
            ('(', _) => (Token::LParen, 1),
            (')', _) => (Token::RParen, 1),
            ('[', _) => (Token::LBracket, 1),
            (']', _) => (Token::RBracket, 1),
            (',', _) => (Token::Comma, 1),
            (':', _) => (Token::Colon, 1),
            (';', _) => (Token::Semicolon, 1),
            ('.', _) => (Token::Dot, 1),
            _ => {
                return Err(ScriptError::syntax(
                    format!("invalid character '{}'", ch),
                    self.line,
                ));
            }
        };
        // `a **= b` and friends are not supported; reject rather than mis-tokenize
        if width == 2 && matches!(token, Token::StarStar | Token::SlashSlash) && third == Some('=') {
            return Err(ScriptError::syntax("invalid syntax", self.line));
        }
        match token {
            Token::LParen | Token::LBracket => self.bracket_depth += 1,
            Token::RParen | Token::RBracket => {
                self.bracket_depth = self.bracket_depth.saturating_sub(1)
            }
            _ => {}
        }
        self.push(token);
        self.pos += width;
        Ok(())
    }
}
