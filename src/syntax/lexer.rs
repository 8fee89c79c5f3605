//! Lexer for Shell Source
//!
//! Tokenizes input into operators, words, comments and newlines. A word
//! token keeps the exact source slice it was read from, quoting and
//! expansions included; the word parser later splits it into parts.
//! Here-document bodies are captured out of band and referenced from the
//! `<<`/`<<-` operator token that announced them.

use super::ast::Pos;
use super::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Eof,

    Newline,
    Semi,        // ;
    Amp,         // &
    DSemi,       // ;;
    SemiAnd,     // ;&
    SemiSemiAnd, // ;;&

    Pipe,    // |
    PipeAmp, // |&
    AndAnd,  // &&
    OrOr,    // ||

    Less,      // <
    Great,     // >
    DGreat,    // >>
    DLess,     // <<
    DLessDash, // <<-
    TLess,     // <<<
    LessAnd,   // <&
    GreatAnd,  // >&
    LessGreat, // <>
    Clobber,   // >|
    AndGreat,  // &>
    AndDGreat, // &>>

    LParen, // (
    RParen, // )

    /// The body of a `(( ... ))` section, delimiters excluded.
    ArithSpan,

    Word,
    Comment,
}

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Exact source slice; for `ArithSpan` the text between `((` and `))`,
    /// for `Comment` the text including the `#` marker.
    pub raw: String,
    pub start: Pos,
    pub end: Pos,
    /// Word tokens only: whether the word contains quoting, escapes or
    /// expansions. A quoted word is never a reserved word.
    pub quoted: bool,
    /// `<<`/`<<-` tokens only: index of the captured here-document body.
    pub heredoc: Option<usize>,
}

impl Token {
    fn new(kind: TokenKind, raw: impl Into<String>, start: Pos, end: Pos) -> Self {
        Self {
            kind,
            raw: raw.into(),
            start,
            end,
            quoted: false,
            heredoc: None,
        }
    }
}

/// A captured here-document body.
#[derive(Debug, Clone, PartialEq)]
pub struct HeredocBody {
    pub content: String,
    pub start: Pos,
    pub end: Pos,
}

/// Here-document waiting for its body after the next newline.
#[derive(Debug, Clone)]
struct PendingHeredoc {
    delimiter: String,
    strip_tabs: bool,
    index: usize,
}

/// Strip quoting characters from a here-document delimiter word.
fn unquote_delimiter(raw: &str) -> String {
    raw.chars().filter(|c| !matches!(c, '\'' | '"' | '\\')).collect()
}

pub struct Lexer {
    input: Vec<char>,
    pos: usize,
    offset: usize,
    line: usize,
    col: usize,
    tokens: Vec<Token>,
    heredocs: Vec<HeredocBody>,
    pending_heredocs: Vec<PendingHeredoc>,
    /// Set after `<<`/`<<-`; the next word is a here-document delimiter.
    awaiting_delimiter: Option<bool>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self::new_at(input, Pos::new(0, 1, 1))
    }

    /// Lex a slice of a larger source, keeping absolute positions. Used when
    /// re-parsing the body of a command substitution.
    pub fn new_at(input: &str, base: Pos) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
            offset: base.offset(),
            line: base.line(),
            col: base.col(),
            tokens: Vec::new(),
            heredocs: Vec::new(),
            pending_heredocs: Vec::new(),
            awaiting_delimiter: None,
        }
    }

    /// Tokenize the entire input.
    pub fn tokenize(mut self) -> Result<(Vec<Token>, Vec<HeredocBody>), ParseError> {
        loop {
            self.skip_blanks();
            let Some(c) = self.current() else { break };

            let token = match c {
                '\n' => {
                    let start = self.cur();
                    self.advance();
                    let token = Token::new(TokenKind::Newline, "\n", start, self.cur());
                    self.tokens.push(token);
                    self.awaiting_delimiter = None;
                    self.read_pending_heredocs()?;
                    continue;
                }
                '#' => self.read_comment(),
                ';' | '&' | '|' | '<' | '>' | '(' | ')' => self.read_operator()?,
                _ => self.read_word()?,
            };

            if let Some(strip_tabs) = self.awaiting_delimiter.take() {
                if token.kind == TokenKind::Word {
                    let mut token = token;
                    let index = self.heredocs.len();
                    self.heredocs.push(HeredocBody {
                        content: String::new(),
                        start: Pos::default(),
                        end: Pos::default(),
                    });
                    self.pending_heredocs.push(PendingHeredoc {
                        delimiter: unquote_delimiter(&token.raw),
                        strip_tabs,
                        index,
                    });
                    // Point the operator token at the body it announced.
                    if let Some(op) = self
                        .tokens
                        .iter_mut()
                        .rev()
                        .find(|t| matches!(t.kind, TokenKind::DLess | TokenKind::DLessDash))
                    {
                        op.heredoc = Some(index);
                    }
                    token.heredoc = Some(index);
                    self.tokens.push(token);
                    continue;
                }
            }

            if matches!(token.kind, TokenKind::DLess | TokenKind::DLessDash) {
                self.awaiting_delimiter = Some(token.kind == TokenKind::DLessDash);
            }
            self.tokens.push(token);
        }

        if !self.pending_heredocs.is_empty() {
            // Input ended on the line that announced the here-document.
            self.read_pending_heredocs()?;
        }

        let eof = self.cur();
        self.tokens.push(Token::new(TokenKind::Eof, "", eof, eof));
        Ok((self.tokens, self.heredocs))
    }

    fn cur(&self) -> Pos {
        Pos::new(self.offset, self.line, self.col)
    }

    fn current(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn peek(&self, n: usize) -> Option<char> {
        self.input.get(self.pos + n).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.current()?;
        self.pos += 1;
        self.offset += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn error(&self, message: impl Into<String>, pos: Pos) -> ParseError {
        ParseError {
            filename: String::new(),
            pos,
            message: message.into(),
            incomplete: self.current().is_none(),
        }
    }

    /// Skip spaces, tabs, carriage returns and escaped newlines.
    fn skip_blanks(&mut self) {
        loop {
            match self.current() {
                Some(' ') | Some('\t') | Some('\r') => {
                    self.advance();
                }
                Some('\\') if self.peek(1) == Some('\n') => {
                    self.advance();
                    self.advance();
                }
                _ => break,
            }
        }
    }

    fn read_comment(&mut self) -> Token {
        let start = self.cur();
        let sidx = self.pos;
        while let Some(c) = self.current() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
        let raw: String = self.input[sidx..self.pos].iter().collect();
        Token::new(TokenKind::Comment, raw, start, self.cur())
    }

    fn read_operator(&mut self) -> Result<Token, ParseError> {
        let start = self.cur();
        let c = self.current().unwrap_or('\0');
        let next = self.peek(1);
        let third = self.peek(2);

        let (kind, len) = match c {
            ';' => match (next, third) {
                (Some(';'), Some('&')) => (TokenKind::SemiSemiAnd, 3),
                (Some(';'), _) => (TokenKind::DSemi, 2),
                (Some('&'), _) => (TokenKind::SemiAnd, 2),
                _ => (TokenKind::Semi, 1),
            },
            '&' => match (next, third) {
                (Some('&'), _) => (TokenKind::AndAnd, 2),
                (Some('>'), Some('>')) => (TokenKind::AndDGreat, 3),
                (Some('>'), _) => (TokenKind::AndGreat, 2),
                _ => (TokenKind::Amp, 1),
            },
            '|' => match next {
                Some('|') => (TokenKind::OrOr, 2),
                Some('&') => (TokenKind::PipeAmp, 2),
                _ => (TokenKind::Pipe, 1),
            },
            '<' => match (next, third) {
                (Some('<'), Some('<')) => (TokenKind::TLess, 3),
                (Some('<'), Some('-')) => (TokenKind::DLessDash, 3),
                (Some('<'), _) => (TokenKind::DLess, 2),
                (Some('&'), _) => (TokenKind::LessAnd, 2),
                (Some('>'), _) => (TokenKind::LessGreat, 2),
                _ => (TokenKind::Less, 1),
            },
            '>' => match next {
                Some('>') => (TokenKind::DGreat, 2),
                Some('&') => (TokenKind::GreatAnd, 2),
                Some('|') => (TokenKind::Clobber, 2),
                _ => (TokenKind::Great, 1),
            },
            '(' => {
                if next == Some('(') {
                    return self.read_arith_span();
                }
                (TokenKind::LParen, 1)
            }
            ')' => (TokenKind::RParen, 1),
            _ => (TokenKind::Word, 1),
        };

        let sidx = self.pos;
        for _ in 0..len {
            self.advance();
        }
        let raw: String = self.input[sidx..self.pos].iter().collect();
        Ok(Token::new(kind, raw, start, self.cur()))
    }

    /// Capture `(( ... ))` as a single token holding the body text. Parens
    /// must balance and the section must close with a double `)`; anything
    /// else re-reads the first paren as a plain `(`.
    fn read_arith_span(&mut self) -> Result<Token, ParseError> {
        let start = self.cur();
        let mark = (self.pos, self.offset, self.line, self.col);
        self.advance();
        self.advance();
        let sidx = self.pos;
        let mut depth = 2usize;
        let mut last_close = 0usize;

        while let Some(c) = self.current() {
            match c {
                '(' => {
                    depth += 1;
                    self.advance();
                }
                ')' => {
                    depth -= 1;
                    let at = self.pos;
                    self.advance();
                    if depth == 0 {
                        if last_close + 1 != at {
                            break;
                        }
                        let raw: String = self.input[sidx..at - 1].iter().collect();
                        return Ok(Token::new(TokenKind::ArithSpan, raw, start, self.cur()));
                    }
                    last_close = at;
                }
                '\'' => self.scan_single_quote(false)?,
                '"' => self.scan_double_quote()?,
                '\\' => {
                    self.advance();
                    self.advance();
                }
                _ => {
                    self.advance();
                }
            }
        }

        // Not an arithmetic section after all; rewind and emit `(`.
        (self.pos, self.offset, self.line, self.col) = mark;
        self.advance();
        Ok(Token::new(TokenKind::LParen, "(", start, self.cur()))
    }

    fn read_word(&mut self) -> Result<Token, ParseError> {
        let start = self.cur();
        let sidx = self.pos;
        let mut quoted = false;

        while let Some(c) = self.current() {
            match c {
                ' ' | '\t' | '\r' | '\n' | ';' | '&' | '|' | '(' | ')' | '<' | '>' => break,
                '\\' => {
                    quoted = true;
                    self.advance();
                    self.advance();
                }
                '\'' => {
                    quoted = true;
                    self.scan_single_quote(false)?;
                }
                '"' => {
                    quoted = true;
                    self.scan_double_quote()?;
                }
                '`' => {
                    quoted = true;
                    self.scan_backquote()?;
                }
                '$' => {
                    quoted = true;
                    self.scan_dollar()?;
                }
                _ => {
                    self.advance();
                }
            }
        }

        let raw: String = self.input[sidx..self.pos].iter().collect();
        let mut token = Token::new(TokenKind::Word, raw, start, self.cur());
        token.quoted = quoted;
        Ok(token)
    }

    fn scan_single_quote(&mut self, escapes: bool) -> Result<(), ParseError> {
        let start = self.cur();
        self.advance();
        while let Some(c) = self.current() {
            match c {
                '\\' if escapes => {
                    self.advance();
                    self.advance();
                }
                '\'' => {
                    self.advance();
                    return Ok(());
                }
                _ => {
                    self.advance();
                }
            }
        }
        Err(self.error("unclosed single quote", start))
    }

    fn scan_double_quote(&mut self) -> Result<(), ParseError> {
        let start = self.cur();
        self.advance();
        while let Some(c) = self.current() {
            match c {
                '\\' => {
                    self.advance();
                    self.advance();
                }
                '"' => {
                    self.advance();
                    return Ok(());
                }
                '$' => self.scan_dollar()?,
                '`' => self.scan_backquote()?,
                _ => {
                    self.advance();
                }
            }
        }
        Err(self.error("unclosed double quote", start))
    }

    fn scan_backquote(&mut self) -> Result<(), ParseError> {
        let start = self.cur();
        self.advance();
        while let Some(c) = self.current() {
            match c {
                '\\' => {
                    self.advance();
                    self.advance();
                }
                '`' => {
                    self.advance();
                    return Ok(());
                }
                _ => {
                    self.advance();
                }
            }
        }
        Err(self.error("unclosed backquote substitution", start))
    }

    /// Scan past a `$`-introduced construct so that a word token spans it
    /// whole. Bare `$name` needs no help; the name characters are ordinary.
    fn scan_dollar(&mut self) -> Result<(), ParseError> {
        self.advance();
        match self.current() {
            Some('\'') => self.scan_single_quote(true),
            Some('"') => self.scan_double_quote(),
            Some('(') => self.scan_balanced_parens(),
            Some('{') => self.scan_balanced_braces(),
            _ => Ok(()),
        }
    }

    fn scan_balanced_parens(&mut self) -> Result<(), ParseError> {
        let start = self.cur();
        self.advance();
        let mut depth = 1usize;
        while let Some(c) = self.current() {
            match c {
                '(' => {
                    depth += 1;
                    self.advance();
                }
                ')' => {
                    depth -= 1;
                    self.advance();
                    if depth == 0 {
                        return Ok(());
                    }
                }
                '\\' => {
                    self.advance();
                    self.advance();
                }
                '\'' => self.scan_single_quote(false)?,
                '"' => self.scan_double_quote()?,
                '`' => self.scan_backquote()?,
                _ => {
                    self.advance();
                }
            }
        }
        Err(self.error("unclosed command substitution", start))
    }

    fn scan_balanced_braces(&mut self) -> Result<(), ParseError> {
        let start = self.cur();
        self.advance();
        let mut depth = 1usize;
        while let Some(c) = self.current() {
            match c {
                '{' => {
                    depth += 1;
                    self.advance();
                }
                '}' => {
                    depth -= 1;
                    self.advance();
                    if depth == 0 {
                        return Ok(());
                    }
                }
                '\\' => {
                    self.advance();
                    self.advance();
                }
                '\'' => self.scan_single_quote(false)?,
                '"' => self.scan_double_quote()?,
                '`' => self.scan_backquote()?,
                '$' => self.scan_dollar()?,
                _ => {
                    self.advance();
                }
            }
        }
        Err(self.error("unclosed parameter expansion", start))
    }

    /// Consume here-document bodies queued up before the newline just read.
    fn read_pending_heredocs(&mut self) -> Result<(), ParseError> {
        let pending: Vec<PendingHeredoc> = self.pending_heredocs.drain(..).collect();
        for heredoc in pending {
            let body_start = self.cur();
            let mut content = String::new();
            let mut body_end = self.cur();
            let mut closed = false;

            while self.current().is_some() {
                let line_start = self.cur();
                let lidx = self.pos;
                while let Some(c) = self.current() {
                    if c == '\n' {
                        break;
                    }
                    self.advance();
                }
                let line: String = self.input[lidx..self.pos].iter().collect();
                let candidate = if heredoc.strip_tabs {
                    line.trim_start_matches('\t')
                } else {
                    line.as_str()
                };
                if candidate == heredoc.delimiter {
                    body_end = line_start;
                    closed = true;
                    self.advance();
                    break;
                }
                content.push_str(&line);
                if self.current() == Some('\n') {
                    content.push('\n');
                    self.advance();
                }
                body_end = self.cur();
            }

            if !closed {
                return Err(self.error(
                    format!("unclosed here-document \"{}\"", heredoc.delimiter),
                    body_start,
                ));
            }
            self.heredocs[heredoc.index] = HeredocBody {
                content,
                start: body_start,
                end: body_end,
            };
        }
        Ok(())
    }
}
