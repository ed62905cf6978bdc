use crate::MemoryError;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Token {
    /// Bare word, as written.
    Word(String),
    /// Double-quoted identifier, unescaped.
    Quoted(String),
    /// Single-quoted string literal, unescaped.
    Str(String),
    Number(String),
    Placeholder,
    /// `=`, `<`, `<=`, `>`, `>=`
    Op(&'static str),
    Symbol(char),
    Eof,
}

pub(crate) struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub(crate) const fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    pub(crate) fn tokenize(mut self) -> Result<Vec<Token>, MemoryError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token == Token::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.input[self.pos..].chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
        &self.input[start..self.pos]
    }

    fn next_token(&mut self) -> Result<Token, MemoryError> {
        self.take_while(char::is_whitespace);

        let Some(ch) = self.peek() else {
            return Ok(Token::Eof);
        };

        if ch.is_ascii_alphabetic() || ch == '_' {
            let word = self.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
            return Ok(Token::Word(word.to_string()));
        }

        let negative = ch == '-' && self.peek_second().is_some_and(|c| c.is_ascii_digit());
        if ch.is_ascii_digit() || negative {
            let start = self.pos;
            self.bump();
            self.take_while(|c| c.is_ascii_digit() || c == '.');
            return Ok(Token::Number(self.input[start..self.pos].to_string()));
        }

        self.bump();
        let token = match ch {
            '"' => Token::Quoted(self.quoted('"')?),
            '\'' => Token::Str(self.quoted('\'')?),
            '?' => Token::Placeholder,
            '=' => Token::Op("="),
            '<' if self.peek() == Some('=') => {
                self.bump();
                Token::Op("<=")
            }
            '>' if self.peek() == Some('=') => {
                self.bump();
                Token::Op(">=")
            }
            '<' => Token::Op("<"),
            '>' => Token::Op(">"),
            other => Token::Symbol(other),
        };

        Ok(token)
    }

    // body of a quoted token; the delimiter doubled is an escaped delimiter
    fn quoted(&mut self, delim: char) -> Result<String, MemoryError> {
        let mut out = String::new();
        loop {
            match self.bump() {
                Some(c) if c == delim => {
                    if self.peek() == Some(delim) {
                        self.bump();
                        out.push(delim);
                    } else {
                        return Ok(out);
                    }
                }
                Some(c) => out.push(c),
                None => {
                    return Err(MemoryError::Syntax(format!(
                        "unterminated {delim}-quoted token"
                    )));
                }
            }
        }
    }
}
