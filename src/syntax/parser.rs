//! Statement Parser
//!
//! Recursive-descent parser over the token stream. Builds statements,
//! compound commands and redirects; word internals are handled by the word
//! parser. The parser never keeps state between runs; one `Parser` value is
//! built per source text (or per substitution body).

use super::ast::{
    ArithmCmd, ArithmExpr, ArrayElem, ArrayExpr, Assign, BinCmdOp, BinTestOp, BinaryCmd,
    BinaryTest, Block, CallExpr, CaseClause, CaseItem, CaseOp, Command, Comment, CoprocClause,
    CStyleLoop, DeclClause, File, ForClause, FuncDecl, IfClause, LetClause, Lit, Loop, ParenTest,
    Pos, Redirect, RedirOp, Stmt, Subshell, TestClause, TestExpr, TimeClause, UnTestOp, UnaryTest,
    WhileClause, Word, WordIter,
};
use super::lexer::{HeredocBody, Lexer, Token, TokenKind};
use super::word::parse_word;
use super::{LangVariant, ParseError, ParserOptions};

/// Cap on recursion through substitutions and nested expansions.
pub(crate) const MAX_NESTING_DEPTH: usize = 100;

/// Reserved words that introduce a compound command.
const DECL_KEYWORDS: &[&str] = &["declare", "local", "export", "readonly", "typeset", "nameref"];

fn is_valid_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Byte index of the matching `]` for the `[` at `open_idx`, or None.
fn find_close_bracket(s: &str, open_idx: usize) -> Option<usize> {
    let mut depth = 0i32;
    for (i, c) in s.char_indices() {
        if i < open_idx {
            continue;
        }
        match c {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split an assignment word into its pieces: name, optional subscript,
/// append flag and the byte offset where the value starts. Returns None if
/// the word is not an assignment.
fn split_assignment(raw: &str) -> Option<(&str, Option<(usize, &str)>, bool, usize)> {
    let mut name_end = 0;
    for (i, c) in raw.char_indices() {
        if i == 0 {
            if !(c.is_ascii_alphabetic() || c == '_') {
                return None;
            }
        } else if !(c.is_ascii_alphanumeric() || c == '_') {
            name_end = i;
            break;
        }
        name_end = i + c.len_utf8();
    }
    if name_end == 0 {
        return None;
    }

    let mut rest_at = name_end;
    let mut index = None;
    if raw[rest_at..].starts_with('[') {
        let close = find_close_bracket(raw, rest_at)?;
        index = Some((rest_at + 1, &raw[rest_at + 1..close]));
        rest_at = close + 1;
    }

    let append = raw[rest_at..].starts_with("+=");
    if append {
        rest_at += 2;
    } else if raw[rest_at..].starts_with('=') {
        rest_at += 1;
    } else {
        return None;
    }

    Some((&raw[..name_end], index, append, rest_at))
}

/// Parse a whole source file. Always yields a file; on failure the file
/// holds whatever statements were completed before the error.
pub(crate) fn parse_file(
    src: &str,
    name: &str,
    options: &ParserOptions,
) -> (File, Option<ParseError>) {
    let mut file = File {
        name: name.to_string(),
        ..Default::default()
    };

    let (tokens, heredocs) = match Lexer::new(src).tokenize() {
        Ok(pair) => pair,
        Err(mut err) => {
            err.filename = name.to_string();
            return (file, Some(err));
        }
    };

    let mut parser = Parser::new(tokens, heredocs, options, 0);
    let (stmts, last, err) = parser.parse_program();
    file.stmts = stmts;
    file.last = last;

    if let Some(first) = file.stmts.first() {
        file.pos = first
            .comments
            .first()
            .map(|c| c.pos)
            .filter(|p| p.offset() < first.pos.offset())
            .unwrap_or(first.pos);
    } else if let Some(first) = file.last.first() {
        file.pos = first.pos;
    }
    let stmt_end = file.stmts.last().map(|s| s.end).unwrap_or_default();
    let comment_end = file.last.last().map(|c| c.end).unwrap_or_default();
    file.end = if comment_end.offset() > stmt_end.offset() {
        comment_end
    } else {
        stmt_end
    };

    let err = err.map(|mut e| {
        e.filename = name.to_string();
        e
    });
    (file, err)
}

/// Parse the body of a command substitution at its own source offset.
pub(crate) fn parse_nested(
    src: &str,
    base: Pos,
    options: &ParserOptions,
    depth: usize,
) -> Result<Vec<Stmt>, ParseError> {
    if depth > MAX_NESTING_DEPTH {
        return Err(ParseError {
            filename: String::new(),
            pos: base,
            message: "substitutions nested too deeply".into(),
            incomplete: false,
        });
    }
    let (tokens, heredocs) = Lexer::new_at(src, base).tokenize()?;
    let mut parser = Parser::new(tokens, heredocs, options, depth);
    let (stmts, _, err) = parser.parse_program();
    match err {
        Some(err) => Err(err),
        None => Ok(stmts),
    }
}

struct Parser<'a> {
    tokens: Vec<Token>,
    heredocs: Vec<HeredocBody>,
    pos: usize,
    options: &'a ParserOptions,
    depth: usize,
    pending_comments: Vec<Comment>,
    recovered: u32,
    stopped: bool,
}

impl<'a> Parser<'a> {
    fn new(
        tokens: Vec<Token>,
        heredocs: Vec<HeredocBody>,
        options: &'a ParserOptions,
        depth: usize,
    ) -> Self {
        Self {
            tokens,
            heredocs,
            pos: 0,
            options,
            depth,
            pending_comments: Vec::new(),
            recovered: 0,
            stopped: false,
        }
    }

    fn tok(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.pos.min(last)]
    }

    fn kind(&self) -> TokenKind {
        self.tok().kind
    }

    fn next_tok(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + 1).min(last)]
    }

    fn advance_tok(&mut self) -> Token {
        let token = self.tok().clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn at_end(&self) -> bool {
        self.stopped || self.kind() == TokenKind::Eof
    }

    /// The raw text of the current token if it is an unquoted word.
    fn lit(&self) -> Option<&str> {
        let token = self.tok();
        if token.kind == TokenKind::Word && !token.quoted {
            Some(&token.raw)
        } else {
            None
        }
    }

    fn is_lit(&self, s: &str) -> bool {
        self.lit() == Some(s)
    }

    fn err(&self, message: impl Into<String>, pos: Pos) -> ParseError {
        ParseError {
            filename: String::new(),
            pos,
            message: message.into(),
            incomplete: self.kind() == TokenKind::Eof,
        }
    }

    fn expect_lit(&mut self, s: &str) -> Result<Token, ParseError> {
        if self.is_lit(s) {
            Ok(self.advance_tok())
        } else {
            Err(self.err(format!("expected \"{}\"", s), self.tok().start))
        }
    }

    fn word_of(&self, token: &Token) -> Result<Word, ParseError> {
        parse_word(&token.raw, token.start, self.options, self.depth)
    }

    fn comment_of(token: &Token) -> Comment {
        let text = token.raw.strip_prefix('#').unwrap_or(&token.raw).to_string();
        Comment {
            text,
            hash: token.start,
            pos: token.start,
            end: token.end,
        }
    }

    /// Skip newlines and comments; kept comments queue up for the next
    /// statement (or for whoever drains them at the end of a list).
    fn skip_separators(&mut self) {
        loop {
            match self.kind() {
                TokenKind::Newline => {
                    self.advance_tok();
                }
                TokenKind::Comment => {
                    let token = self.advance_tok();
                    if self.options.keep_comments {
                        self.pending_comments.push(Self::comment_of(&token));
                    }
                }
                _ => break,
            }
        }
    }

    fn take_pending_comments(&mut self) -> Vec<Comment> {
        std::mem::take(&mut self.pending_comments)
    }

    fn hits_stop_marker(&self) -> bool {
        match &self.options.stop_at {
            Some(marker) if !marker.is_empty() => {
                self.kind() == TokenKind::Word && self.tok().raw.starts_with(marker.as_str())
            }
            _ => false,
        }
    }

    /// Whether the current token terminates a statement list.
    fn list_done(&self, stop: &[&str]) -> bool {
        match self.kind() {
            TokenKind::Eof | TokenKind::RParen => true,
            TokenKind::DSemi | TokenKind::SemiAnd | TokenKind::SemiSemiAnd => true,
            TokenKind::Word => match self.lit() {
                Some(raw) => stop.contains(&raw),
                None => false,
            },
            _ => false,
        }
    }

    /// Consume a statement terminator and trailing same-line comment.
    fn finish_stmt(&mut self, stmt: &mut Stmt) {
        match self.kind() {
            TokenKind::Semi => {
                let token = self.advance_tok();
                stmt.semicolon = token.start;
            }
            TokenKind::Amp => {
                let token = self.advance_tok();
                stmt.semicolon = token.start;
                stmt.background = true;
            }
            TokenKind::PipeAmp if self.options.variant == LangVariant::MirBSDKorn => {
                let token = self.advance_tok();
                stmt.semicolon = token.start;
                stmt.coprocess = true;
            }
            _ => {}
        }
        if self.kind() == TokenKind::Comment {
            let token = self.advance_tok();
            if self.options.keep_comments {
                stmt.comments.push(Self::comment_of(&token));
            }
        }
    }

    /// Skip ahead to the next statement boundary after a parse error.
    fn resync(&mut self, stop: &[&str]) {
        loop {
            if self.at_end() || self.list_done(stop) {
                return;
            }
            match self.kind() {
                TokenKind::Newline | TokenKind::Semi => {
                    self.advance_tok();
                    return;
                }
                _ => {
                    self.advance_tok();
                }
            }
        }
    }

    /// Top-level statement loop; keeps partial results on error.
    fn parse_program(&mut self) -> (Vec<Stmt>, Vec<Comment>, Option<ParseError>) {
        let mut stmts = Vec::new();
        let err = loop {
            self.skip_separators();
            if self.at_end() {
                break None;
            }
            if self.list_done(&[]) {
                break Some(self.err(
                    format!("unexpected token \"{}\"", self.tok().raw),
                    self.tok().start,
                ));
            }
            if self.hits_stop_marker() {
                self.stopped = true;
                break None;
            }
            let before = self.pos;
            match self.parse_stmt() {
                Ok(mut stmt) => {
                    self.finish_stmt(&mut stmt);
                    stmts.push(stmt);
                }
                Err(err) => {
                    if self.recovered < self.options.recover_errors {
                        self.recovered += 1;
                        self.resync(&[]);
                        continue;
                    }
                    break Some(err);
                }
            }
            if self.pos == before {
                break None;
            }
        };
        (stmts, self.take_pending_comments(), err)
    }

    fn parse_stmt_list(&mut self, stop: &[&str]) -> Result<Vec<Stmt>, ParseError> {
        let mut stmts = Vec::new();
        loop {
            self.skip_separators();
            if self.at_end() || self.list_done(stop) {
                break;
            }
            if self.hits_stop_marker() {
                self.stopped = true;
                break;
            }
            let before = self.pos;
            match self.parse_stmt() {
                Ok(mut stmt) => {
                    self.finish_stmt(&mut stmt);
                    stmts.push(stmt);
                }
                Err(err) => {
                    if self.recovered < self.options.recover_errors {
                        self.recovered += 1;
                        self.resync(stop);
                        continue;
                    }
                    return Err(err);
                }
            }
            if self.pos == before {
                break;
            }
        }
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        let comments = self.take_pending_comments();
        let mut stmt = self.parse_and_or()?;
        let mut all = comments;
        all.append(&mut stmt.comments);
        stmt.comments = all;
        Ok(stmt)
    }

    fn wrap_cmd(cmd: Command, pos: Pos, end: Pos) -> Stmt {
        let mut stmt = Stmt::new(pos);
        stmt.cmd = Some(cmd);
        stmt.end = end;
        stmt
    }

    fn parse_and_or(&mut self) -> Result<Stmt, ParseError> {
        let mut x = self.parse_pipeline()?;
        loop {
            let op = match self.kind() {
                TokenKind::AndAnd => BinCmdOp::AndStmt,
                TokenKind::OrOr => BinCmdOp::OrStmt,
                _ => break,
            };
            let op_pos = self.tok().start;
            self.advance_tok();
            self.skip_separators();
            let y = self.parse_pipeline()?;
            let pos = x.pos;
            let end = y.end;
            x = Self::wrap_cmd(
                Command::Binary(Box::new(BinaryCmd {
                    op,
                    op_pos,
                    x,
                    y,
                    pos,
                    end,
                })),
                pos,
                end,
            );
        }
        Ok(x)
    }

    fn parse_pipeline(&mut self) -> Result<Stmt, ParseError> {
        if self.is_lit("!") {
            let bang = self.advance_tok();
            if matches!(
                self.kind(),
                TokenKind::Semi | TokenKind::Amp | TokenKind::Newline | TokenKind::Eof
                    | TokenKind::RParen
            ) {
                let mut stmt = Stmt::new(bang.start);
                stmt.negated = true;
                stmt.end = bang.end;
                return Ok(stmt);
            }
            let mut stmt = self.parse_pipeline()?;
            stmt.negated = true;
            stmt.pos = bang.start;
            return Ok(stmt);
        }

        if self.is_lit("time") {
            let time = self.advance_tok();
            let posix_format = if self.is_lit("-p") {
                self.advance_tok();
                true
            } else {
                false
            };
            let inner = if matches!(
                self.kind(),
                TokenKind::Semi | TokenKind::Amp | TokenKind::Newline | TokenKind::Eof
                    | TokenKind::RParen
            ) {
                None
            } else {
                Some(Box::new(self.parse_pipeline()?))
            };
            let end = inner.as_ref().map(|s| s.end).unwrap_or(time.end);
            let pos = time.start;
            return Ok(Self::wrap_cmd(
                Command::Time(TimeClause {
                    posix_format,
                    stmt: inner,
                    pos,
                    end,
                }),
                pos,
                end,
            ));
        }

        let mut x = self.parse_cmd_unit()?;
        loop {
            let op = match self.kind() {
                TokenKind::Pipe => BinCmdOp::Pipe,
                TokenKind::PipeAmp => match self.options.variant {
                    LangVariant::Bash | LangVariant::Bats => BinCmdOp::PipeAll,
                    LangVariant::Posix => {
                        return Err(self.err("|& is not valid in posix mode", self.tok().start))
                    }
                    // mksh: `|&` ends the statement as a coprocess marker.
                    LangVariant::MirBSDKorn => break,
                },
                _ => break,
            };
            let op_pos = self.tok().start;
            self.advance_tok();
            self.skip_separators();
            let y = self.parse_cmd_unit()?;
            let pos = x.pos;
            let end = y.end;
            x = Self::wrap_cmd(
                Command::Binary(Box::new(BinaryCmd {
                    op,
                    op_pos,
                    x,
                    y,
                    pos,
                    end,
                })),
                pos,
                end,
            );
        }
        Ok(x)
    }

    fn parse_cmd_unit(&mut self) -> Result<Stmt, ParseError> {
        let start = self.tok().start;
        let mut stmt = Stmt::new(start);

        while self.peek_redirect() {
            let redirect = self.parse_redirect()?;
            stmt.end = redirect.end;
            stmt.redirs.push(redirect);
        }

        let lit = self.lit().map(String::from);
        let cmd = match self.kind() {
            TokenKind::LParen => Some(self.parse_subshell()?),
            TokenKind::ArithSpan => Some(self.parse_arith_cmd()?),
            TokenKind::Word => match lit.as_deref() {
                Some("if") => Some(self.parse_if().map(|c| Command::If(Box::new(c)))?),
                Some("while") => Some(self.parse_while(false)?),
                Some("until") => Some(self.parse_while(true)?),
                Some("for") => Some(self.parse_for(false)?),
                Some("select") => Some(self.parse_for(true)?),
                Some("case") => Some(self.parse_case()?),
                Some("{") => Some(self.parse_block()?),
                Some("[[") if self.options.variant != LangVariant::Posix => {
                    Some(self.parse_test_clause()?)
                }
                Some("function") => Some(self.parse_function_keyword()?),
                Some("coproc") => Some(self.parse_coproc()?),
                Some("let") => Some(self.parse_let()?),
                Some(kw) if DECL_KEYWORDS.contains(&kw) => Some(self.parse_decl()?),
                Some(name)
                    if is_valid_name(name) && self.next_tok().kind == TokenKind::LParen =>
                {
                    Some(self.parse_function_short()?)
                }
                _ => Some(self.parse_call(&mut stmt)?),
            },
            _ => {
                if stmt.redirs.is_empty() {
                    return Err(self.err("expected a command", self.tok().start));
                }
                None
            }
        };

        while self.peek_redirect() {
            let redirect = self.parse_redirect()?;
            stmt.end = redirect.end;
            stmt.redirs.push(redirect);
        }

        if let Some(cmd) = &cmd {
            if cmd.end().offset() > stmt.end.offset() {
                stmt.end = cmd.end();
            }
        }
        stmt.cmd = cmd;
        Ok(stmt)
    }

    fn peek_redirect(&self) -> bool {
        match self.kind() {
            TokenKind::Less
            | TokenKind::Great
            | TokenKind::DGreat
            | TokenKind::DLess
            | TokenKind::DLessDash
            | TokenKind::TLess
            | TokenKind::LessAnd
            | TokenKind::GreatAnd
            | TokenKind::LessGreat
            | TokenKind::Clobber
            | TokenKind::AndGreat
            | TokenKind::AndDGreat => true,
            TokenKind::Word => {
                let token = self.tok();
                let next = self.next_tok();
                token.raw.chars().all(|c| c.is_ascii_digit())
                    && token.end.offset() == next.start.offset()
                    && matches!(
                        next.kind,
                        TokenKind::Less
                            | TokenKind::Great
                            | TokenKind::DGreat
                            | TokenKind::DLess
                            | TokenKind::DLessDash
                            | TokenKind::TLess
                            | TokenKind::LessAnd
                            | TokenKind::GreatAnd
                            | TokenKind::LessGreat
                            | TokenKind::Clobber
                    )
            }
            _ => false,
        }
    }

    fn redir_op(kind: TokenKind) -> Option<RedirOp> {
        Some(match kind {
            TokenKind::Less => RedirOp::Less,
            TokenKind::Great => RedirOp::Great,
            TokenKind::DGreat => RedirOp::DGreat,
            TokenKind::DLess => RedirOp::DLess,
            TokenKind::DLessDash => RedirOp::DLessDash,
            TokenKind::TLess => RedirOp::TLess,
            TokenKind::LessAnd => RedirOp::LessAnd,
            TokenKind::GreatAnd => RedirOp::GreatAnd,
            TokenKind::LessGreat => RedirOp::LessGreat,
            TokenKind::Clobber => RedirOp::Clobber,
            TokenKind::AndGreat => RedirOp::AndGreat,
            TokenKind::AndDGreat => RedirOp::AndDGreat,
            _ => return None,
        })
    }

    fn parse_redirect(&mut self) -> Result<Redirect, ParseError> {
        let start = self.tok().start;
        let mut n = None;
        if self.kind() == TokenKind::Word {
            let token = self.advance_tok();
            n = Some(Lit {
                value: token.raw.clone(),
                value_pos: token.start,
                value_end: token.end,
            });
        }

        let op_tok = self.advance_tok();
        let op = match Self::redir_op(op_tok.kind) {
            Some(op) => op,
            None => return Err(self.err("expected a redirection operator", op_tok.start)),
        };

        if self.kind() != TokenKind::Word {
            return Err(self.err(
                format!("{} must be followed by a word", op),
                self.tok().start,
            ));
        }
        let word_tok = self.advance_tok();
        let word = self.word_of(&word_tok)?;

        let hdoc = match op_tok.heredoc {
            Some(index) => {
                let body = &self.heredocs[index];
                let parts = if body.content.is_empty() {
                    Vec::new()
                } else {
                    vec![super::ast::WordPart::Lit(Lit {
                        value: body.content.clone(),
                        value_pos: body.start,
                        value_end: body.end,
                    })]
                };
                Some(Word {
                    parts,
                    pos: body.start,
                    end: body.end,
                })
            }
            None => None,
        };

        Ok(Redirect {
            op,
            op_pos: op_tok.start,
            n,
            word: Some(word),
            hdoc,
            pos: start,
            end: word_tok.end,
        })
    }

    fn parse_call(&mut self, stmt: &mut Stmt) -> Result<Command, ParseError> {
        let start = self.tok().start;
        let mut assigns = Vec::new();
        let mut args = Vec::new();
        let mut end = start;

        loop {
            if self.peek_redirect() {
                let redirect = self.parse_redirect()?;
                end = redirect.end;
                stmt.redirs.push(redirect);
                continue;
            }
            match self.kind() {
                TokenKind::Word => {
                    let token = self.advance_tok();
                    if args.is_empty() && split_assignment(&token.raw).is_some() {
                        let assign = self.parse_assign(token)?;
                        end = assign.end;
                        assigns.push(assign);
                    } else {
                        let word = self.word_of(&token)?;
                        end = word.end;
                        args.push(word);
                    }
                }
                _ => break,
            }
        }

        Ok(Command::Call(CallExpr {
            assigns,
            args,
            pos: start,
            end,
        }))
    }

    fn parse_assign(&mut self, token: Token) -> Result<Assign, ParseError> {
        let Some((name, index, append, value_at)) = split_assignment(&token.raw) else {
            return Err(self.err("expected an assignment", token.start));
        };

        let name_lit = Lit {
            value: name.to_string(),
            value_pos: token.start,
            value_end: token.start.advanced_by(name),
        };
        let index_expr = match index {
            Some((at, raw)) => {
                let base = token.start.advanced_by(&token.raw[..at]);
                Some(ArithmExpr::Word(parse_word(
                    raw,
                    base,
                    self.options,
                    self.depth,
                )?))
            }
            None => None,
        };

        let value_raw = &token.raw[value_at..];
        let mut assign = Assign {
            append,
            naked: false,
            name: Some(name_lit),
            index: index_expr,
            value: None,
            array: None,
            pos: token.start,
            end: token.end,
        };

        // `a=(1 2 3)`: the paren group follows the word token directly.
        if value_raw.is_empty()
            && self.kind() == TokenKind::LParen
            && token.end.offset() == self.tok().start.offset()
        {
            let lparen = self.advance_tok();
            let mut elems = Vec::new();
            loop {
                self.skip_separators();
                if self.kind() == TokenKind::RParen || self.at_end() {
                    break;
                }
                if self.kind() != TokenKind::Word {
                    return Err(self.err("expected an array element", self.tok().start));
                }
                let elem_tok = self.advance_tok();
                let value = self.word_of(&elem_tok)?;
                elems.push(ArrayElem {
                    index: None,
                    value,
                    comments: self.take_pending_comments(),
                    pos: elem_tok.start,
                    end: elem_tok.end,
                });
            }
            if self.kind() != TokenKind::RParen {
                return Err(self.err("expected \")\" to close array", self.tok().start));
            }
            let rparen = self.advance_tok();
            assign.array = Some(ArrayExpr {
                elems,
                lparen: lparen.start,
                rparen: rparen.start,
                pos: lparen.start,
                end: rparen.end,
            });
            assign.end = rparen.end;
        } else {
            let base = token.start.advanced_by(&token.raw[..value_at]);
            assign.value = Some(parse_word(value_raw, base, self.options, self.depth)?);
        }
        Ok(assign)
    }

    fn parse_if(&mut self) -> Result<IfClause, ParseError> {
        let kw = self.advance_tok();
        let cond = self.parse_stmt_list(&["then"])?;
        let cond_last = self.take_pending_comments();
        let then_tok = self.expect_lit("then")?;
        let then = self.parse_stmt_list(&["elif", "else", "fi"])?;
        let then_last = self.take_pending_comments();

        let mut clause = IfClause {
            cond,
            then_pos: then_tok.start,
            then,
            else_branch: None,
            fi_pos: Pos::default(),
            cond_last,
            then_last,
            last: Vec::new(),
            pos: kw.start,
            end: then_tok.end,
        };

        if self.is_lit("elif") {
            let inner = self.parse_if()?;
            clause.end = inner.end;
            clause.else_branch = Some(Box::new(inner));
            return Ok(clause);
        }

        if self.is_lit("else") {
            let else_tok = self.advance_tok();
            let body = self.parse_stmt_list(&["fi"])?;
            let last = self.take_pending_comments();
            let fi_tok = self.expect_lit("fi")?;
            let els = IfClause {
                cond: Vec::new(),
                then_pos: Pos::default(),
                then: body,
                else_branch: None,
                fi_pos: fi_tok.start,
                cond_last: Vec::new(),
                then_last: Vec::new(),
                last,
                pos: else_tok.start,
                end: fi_tok.end,
            };
            clause.else_branch = Some(Box::new(els));
            clause.fi_pos = fi_tok.start;
            clause.end = fi_tok.end;
            return Ok(clause);
        }

        let fi_tok = self.expect_lit("fi")?;
        clause.last = self.take_pending_comments();
        clause.fi_pos = fi_tok.start;
        clause.end = fi_tok.end;
        Ok(clause)
    }

    fn parse_while(&mut self, until: bool) -> Result<Command, ParseError> {
        let kw = self.advance_tok();
        let cond = self.parse_stmt_list(&["do"])?;
        let do_tok = self.expect_lit("do")?;
        let body = self.parse_stmt_list(&["done"])?;
        let done_tok = self.expect_lit("done")?;
        Ok(Command::While(WhileClause {
            until,
            while_pos: kw.start,
            do_pos: do_tok.start,
            done_pos: done_tok.start,
            cond,
            body,
            pos: kw.start,
            end: done_tok.end,
        }))
    }

    fn parse_for(&mut self, select: bool) -> Result<Command, ParseError> {
        let kw = self.advance_tok();

        let head = if self.kind() == TokenKind::ArithSpan {
            let span = self.advance_tok();
            let head = self.parse_cstyle_head(&span)?;
            if self.kind() == TokenKind::Semi {
                self.advance_tok();
            }
            head
        } else {
            if self.kind() != TokenKind::Word || !is_valid_name(&self.tok().raw) {
                return Err(self.err("expected a loop variable name", self.tok().start));
            }
            let name_tok = self.advance_tok();
            let name = Lit {
                value: name_tok.raw.clone(),
                value_pos: name_tok.start,
                value_end: name_tok.end,
            };
            let mut items = Vec::new();
            let mut iter_end = name_tok.end;
            if self.is_lit("in") {
                self.advance_tok();
                while self.kind() == TokenKind::Word {
                    let token = self.advance_tok();
                    let word = self.word_of(&token)?;
                    iter_end = word.end;
                    items.push(word);
                }
            }
            if self.kind() == TokenKind::Semi {
                self.advance_tok();
            }
            Loop::WordIter(WordIter {
                name,
                items,
                pos: name_tok.start,
                end: iter_end,
            })
        };

        self.skip_separators();
        self.expect_lit("do")?;
        let body = self.parse_stmt_list(&["done"])?;
        let done_tok = self.expect_lit("done")?;
        Ok(Command::For(ForClause {
            select,
            head,
            body,
            pos: kw.start,
            end: done_tok.end,
        }))
    }

    fn parse_cstyle_head(&mut self, span: &Token) -> Result<Loop, ParseError> {
        let base = span.start.advanced_by("((");
        let raw = &span.raw;
        let first = super::word::find_top_level(raw, 0, ';')
            .ok_or_else(|| self.err("expected \";\" in C-style loop", span.start))?;
        let second = super::word::find_top_level(raw, first + 1, ';')
            .ok_or_else(|| self.err("expected \";\" in C-style loop", span.start))?;

        let section = |from: usize, to: usize| -> Result<Option<ArithmExpr>, ParseError> {
            let text = &raw[from..to];
            if text.trim().is_empty() {
                return Ok(None);
            }
            let word = parse_word(text, base.advanced_by(&raw[..from]), self.options, self.depth)?;
            Ok(Some(ArithmExpr::Word(word)))
        };

        let init = section(0, first)?;
        let cond = section(first + 1, second)?;
        let post = section(second + 1, raw.len())?;
        Ok(Loop::CStyle(CStyleLoop {
            init,
            cond,
            post,
            pos: span.start,
            end: span.end,
        }))
    }

    fn parse_case(&mut self) -> Result<Command, ParseError> {
        let kw = self.advance_tok();
        if self.kind() != TokenKind::Word {
            return Err(self.err("expected a word after \"case\"", self.tok().start));
        }
        let word_tok = self.advance_tok();
        let word = self.word_of(&word_tok)?;
        self.skip_separators();
        self.expect_lit("in")?;

        let mut items = Vec::new();
        loop {
            self.skip_separators();
            if self.is_lit("esac") || self.at_end() {
                break;
            }
            let comments = self.take_pending_comments();
            let item_start = self.tok().start;
            if self.kind() == TokenKind::LParen {
                self.advance_tok();
            }

            let mut patterns = Vec::new();
            loop {
                if self.kind() != TokenKind::Word {
                    return Err(self.err("expected a pattern in case item", self.tok().start));
                }
                let pat_tok = self.advance_tok();
                patterns.push(self.word_of(&pat_tok)?);
                if self.kind() == TokenKind::Pipe {
                    self.advance_tok();
                } else {
                    break;
                }
            }
            if self.kind() != TokenKind::RParen {
                return Err(self.err("expected \")\" after case pattern", self.tok().start));
            }
            let rparen = self.advance_tok();

            let stmts = self.parse_stmt_list(&["esac"])?;
            let (op, op_pos, item_end) = match self.kind() {
                TokenKind::DSemi => {
                    let token = self.advance_tok();
                    (CaseOp::Break, token.start, token.end)
                }
                TokenKind::SemiAnd => {
                    let token = self.advance_tok();
                    (CaseOp::Fallthrough, token.start, token.end)
                }
                TokenKind::SemiSemiAnd => {
                    let token = self.advance_tok();
                    (CaseOp::Resume, token.start, token.end)
                }
                _ => {
                    let end = stmts.last().map(|s| s.end).unwrap_or(rparen.end);
                    (CaseOp::Break, Pos::default(), end)
                }
            };
            items.push(CaseItem {
                op,
                op_pos,
                patterns,
                stmts,
                comments,
                pos: item_start,
                end: item_end,
            });
        }

        let last = self.take_pending_comments();
        let esac_tok = self.expect_lit("esac")?;
        Ok(Command::Case(CaseClause {
            word,
            items,
            last,
            pos: kw.start,
            end: esac_tok.end,
        }))
    }

    fn parse_block(&mut self) -> Result<Command, ParseError> {
        let lbrace = self.advance_tok();
        let stmts = self.parse_stmt_list(&["}"])?;
        let rbrace = self.expect_lit("}")?;
        Ok(Command::Block(Block {
            stmts,
            lbrace: lbrace.start,
            rbrace: rbrace.start,
            pos: lbrace.start,
            end: rbrace.end,
        }))
    }

    fn parse_subshell(&mut self) -> Result<Command, ParseError> {
        let lparen = self.advance_tok();
        let stmts = self.parse_stmt_list(&[])?;
        if self.kind() != TokenKind::RParen {
            return Err(self.err("expected \")\" to close subshell", self.tok().start));
        }
        let rparen = self.advance_tok();
        Ok(Command::Subshell(Subshell {
            stmts,
            pos: lparen.start,
            end: rparen.end,
        }))
    }

    fn parse_test_clause(&mut self) -> Result<Command, ParseError> {
        let open = self.advance_tok();
        let x = self.parse_test_or()?;
        let close = self.expect_lit("]]")?;
        Ok(Command::Test(TestClause {
            x,
            pos: open.start,
            end: close.end,
        }))
    }

    fn parse_test_or(&mut self) -> Result<TestExpr, ParseError> {
        let mut x = self.parse_test_and()?;
        while self.kind() == TokenKind::OrOr {
            let op_pos = self.advance_tok().start;
            self.skip_separators();
            let y = self.parse_test_and()?;
            let pos = x.pos();
            let end = y.end();
            x = TestExpr::Binary(Box::new(BinaryTest {
                op: BinTestOp::Or,
                op_pos,
                x,
                y,
                pos,
                end,
            }));
        }
        Ok(x)
    }

    fn parse_test_and(&mut self) -> Result<TestExpr, ParseError> {
        let mut x = self.parse_test_unary()?;
        while self.kind() == TokenKind::AndAnd {
            let op_pos = self.advance_tok().start;
            self.skip_separators();
            let y = self.parse_test_unary()?;
            let pos = x.pos();
            let end = y.end();
            x = TestExpr::Binary(Box::new(BinaryTest {
                op: BinTestOp::And,
                op_pos,
                x,
                y,
                pos,
                end,
            }));
        }
        Ok(x)
    }

    fn parse_test_unary(&mut self) -> Result<TestExpr, ParseError> {
        if self.is_lit("!") {
            let bang = self.advance_tok();
            let x = self.parse_test_unary()?;
            let end = x.end();
            return Ok(TestExpr::Unary(Box::new(UnaryTest {
                op: UnTestOp::Not,
                op_pos: bang.start,
                x,
                pos: bang.start,
                end,
            })));
        }
        if self.kind() == TokenKind::LParen {
            let lparen = self.advance_tok();
            let x = self.parse_test_or()?;
            if self.kind() != TokenKind::RParen {
                return Err(self.err("expected \")\" in test expression", self.tok().start));
            }
            let rparen = self.advance_tok();
            return Ok(TestExpr::Paren(Box::new(ParenTest {
                x,
                pos: lparen.start,
                end: rparen.end,
            })));
        }
        if let Some(raw) = self.lit() {
            if raw != "!" && raw.starts_with('-') {
                if let Some(op) = UnTestOp::from_token(raw) {
                    let op_tok = self.advance_tok();
                    let x = self.parse_test_word()?;
                    let end = x.end();
                    return Ok(TestExpr::Unary(Box::new(UnaryTest {
                        op,
                        op_pos: op_tok.start,
                        x,
                        pos: op_tok.start,
                        end,
                    })));
                }
            }
        }

        let x = self.parse_test_word()?;
        let op = match self.kind() {
            TokenKind::Word => self.lit().and_then(BinTestOp::from_token),
            TokenKind::Less => Some(BinTestOp::Lt),
            TokenKind::Great => Some(BinTestOp::Gt),
            _ => None,
        };
        if let Some(op) = op {
            let op_pos = self.advance_tok().start;
            let y = self.parse_test_word()?;
            let pos = x.pos();
            let end = y.end();
            return Ok(TestExpr::Binary(Box::new(BinaryTest {
                op,
                op_pos,
                x,
                y,
                pos,
                end,
            })));
        }
        Ok(x)
    }

    fn parse_test_word(&mut self) -> Result<TestExpr, ParseError> {
        if self.kind() != TokenKind::Word || self.is_lit("]]") {
            return Err(self.err("expected an operand in test expression", self.tok().start));
        }
        let token = self.advance_tok();
        Ok(TestExpr::Word(self.word_of(&token)?))
    }

    fn parse_arith_cmd(&mut self) -> Result<Command, ParseError> {
        let span = self.advance_tok();
        let mut body = span.raw.as_str();
        let mut body_at = 0usize;
        let mut unsigned = false;
        if self.options.variant == LangVariant::MirBSDKorn {
            let trimmed = body.trim_start();
            if trimmed.starts_with('#') {
                body_at = span.raw.len() - trimmed.len() + 1;
                body = &span.raw[body_at..];
                unsigned = true;
            }
        }
        let x = if body.trim().is_empty() {
            None
        } else {
            let base = span.start.advanced_by("((").advanced_by(&span.raw[..body_at]);
            Some(ArithmExpr::Word(parse_word(
                body,
                base,
                self.options,
                self.depth,
            )?))
        };
        Ok(Command::ArithmCmd(ArithmCmd {
            unsigned,
            x,
            left: span.start,
            right: span.end,
            pos: span.start,
            end: span.end,
        }))
    }

    fn parse_function_keyword(&mut self) -> Result<Command, ParseError> {
        let kw = self.advance_tok();
        if self.kind() != TokenKind::Word || !is_valid_name(&self.tok().raw) {
            return Err(self.err("expected a function name", self.tok().start));
        }
        let name_tok = self.advance_tok();
        if self.kind() == TokenKind::LParen {
            self.advance_tok();
            if self.kind() != TokenKind::RParen {
                return Err(self.err("expected \")\" after function name", self.tok().start));
            }
            self.advance_tok();
        }
        self.finish_function(kw.start, name_tok, true)
    }

    fn parse_function_short(&mut self) -> Result<Command, ParseError> {
        let name_tok = self.advance_tok();
        self.advance_tok(); // (
        if self.kind() != TokenKind::RParen {
            return Err(self.err("expected \")\" after function name", self.tok().start));
        }
        self.advance_tok();
        self.finish_function(name_tok.start, name_tok, false)
    }

    fn finish_function(
        &mut self,
        pos: Pos,
        name_tok: Token,
        rsrv_word: bool,
    ) -> Result<Command, ParseError> {
        self.skip_separators();
        let body = self.parse_cmd_unit()?;
        let end = body.end;
        Ok(Command::FuncDecl(Box::new(FuncDecl {
            rsrv_word,
            name: Lit {
                value: name_tok.raw.clone(),
                value_pos: name_tok.start,
                value_end: name_tok.end,
            },
            body,
            pos,
            end,
        })))
    }

    fn parse_coproc(&mut self) -> Result<Command, ParseError> {
        let kw = self.advance_tok();
        let name = if self.kind() == TokenKind::Word && is_valid_name(&self.tok().raw) {
            let next = self.next_tok();
            let compound_next = match next.kind {
                TokenKind::LParen | TokenKind::ArithSpan => true,
                TokenKind::Word => {
                    matches!(
                        next.raw.as_str(),
                        "{" | "if" | "while" | "until" | "for" | "case" | "[["
                    )
                }
                _ => false,
            };
            if compound_next {
                let token = self.advance_tok();
                Some(self.word_of(&token)?)
            } else {
                None
            }
        } else {
            None
        };
        let stmt = self.parse_cmd_unit()?;
        let pos = kw.start;
        let end = stmt.end;
        Ok(Command::Coproc(Box::new(CoprocClause {
            name,
            stmt,
            pos,
            end,
        })))
    }

    fn parse_let(&mut self) -> Result<Command, ParseError> {
        let kw = self.advance_tok();
        let mut exprs = Vec::new();
        let mut end = kw.end;
        while self.kind() == TokenKind::Word {
            let token = self.advance_tok();
            let word = self.word_of(&token)?;
            end = word.end;
            exprs.push(ArithmExpr::Word(word));
        }
        if exprs.is_empty() {
            return Err(self.err("expected an expression after \"let\"", self.tok().start));
        }
        Ok(Command::Let(LetClause {
            exprs,
            pos: kw.start,
            end,
        }))
    }

    fn parse_decl(&mut self) -> Result<Command, ParseError> {
        let kw = self.advance_tok();
        let variant = Lit {
            value: kw.raw.clone(),
            value_pos: kw.start,
            value_end: kw.end,
        };
        let mut args = Vec::new();
        let mut end = kw.end;
        while self.kind() == TokenKind::Word && !self.peek_redirect() {
            let token = self.advance_tok();
            if split_assignment(&token.raw).is_some() {
                let assign = self.parse_assign(token)?;
                end = assign.end;
                args.push(assign);
            } else {
                let word = self.word_of(&token)?;
                end = word.end;
                args.push(Assign {
                    append: false,
                    naked: true,
                    name: None,
                    index: None,
                    value: Some(word),
                    array: None,
                    pos: token.start,
                    end: token.end,
                });
            }
        }
        Ok(Command::Decl(DeclClause {
            variant,
            args,
            pos: kw.start,
            end,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{parse, ParserOptions};

    fn parse_ok(src: &str) -> File {
        let options = ParserOptions {
            keep_comments: true,
            ..Default::default()
        };
        let (file, err) = parse(src, "test.sh", &options);
        assert!(err.is_none(), "unexpected error: {:?}", err);
        file
    }

    fn parse_err(src: &str) -> ParseError {
        let (_, err) = parse(src, "test.sh", &ParserOptions::default());
        err.expect("expected a parse error")
    }

    fn first_cmd(file: &File) -> &Command {
        file.stmts[0].cmd.as_ref().expect("statement has a command")
    }

    #[test]
    fn test_parse_empty() {
        let file = parse_ok("");
        assert_eq!(file.stmts.len(), 0);
    }

    #[test]
    fn test_parse_simple_command() {
        let file = parse_ok("echo hello world");
        assert_eq!(file.stmts.len(), 1);
        match first_cmd(&file) {
            Command::Call(call) => {
                assert_eq!(call.args.len(), 3);
                assert!(call.assigns.is_empty());
            }
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_assignments_before_command() {
        let file = parse_ok("FOO=1 BAR=two cmd");
        match first_cmd(&file) {
            Command::Call(call) => {
                assert_eq!(call.assigns.len(), 2);
                assert_eq!(call.assigns[0].name.as_ref().unwrap().value, "FOO");
                assert_eq!(call.args.len(), 1);
            }
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_append_assignment() {
        let file = parse_ok("PATH+=:/opt/bin");
        match first_cmd(&file) {
            Command::Call(call) => {
                assert!(call.assigns[0].append);
            }
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_array_assignment() {
        let file = parse_ok("arr=(a b c)");
        match first_cmd(&file) {
            Command::Call(call) => {
                let array = call.assigns[0].array.as_ref().expect("array literal");
                assert_eq!(array.elems.len(), 3);
            }
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_pipeline() {
        let file = parse_ok("a | b | c");
        assert_eq!(file.stmts.len(), 1);
        match first_cmd(&file) {
            Command::Binary(bin) => assert_eq!(bin.op, BinCmdOp::Pipe),
            other => panic!("expected binary, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_and_or_list() {
        let file = parse_ok("a && b || c");
        match first_cmd(&file) {
            Command::Binary(bin) => {
                assert_eq!(bin.op, BinCmdOp::OrStmt);
                match bin.x.cmd.as_ref().unwrap() {
                    Command::Binary(inner) => assert_eq!(inner.op, BinCmdOp::AndStmt),
                    other => panic!("expected nested binary, got {:?}", other),
                }
            }
            other => panic!("expected binary, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_negated() {
        let file = parse_ok("! grep -q foo bar");
        assert!(file.stmts[0].negated);
    }

    #[test]
    fn test_parse_background() {
        let file = parse_ok("sleep 5 &");
        assert!(file.stmts[0].background);
        assert!(file.stmts[0].semicolon.is_valid());
    }

    #[test]
    fn test_statement_order_is_source_order() {
        let file = parse_ok("a; b; c");
        assert_eq!(file.stmts.len(), 3);
        assert!(file.stmts[0].pos.offset() < file.stmts[1].pos.offset());
        assert!(file.stmts[1].pos.offset() < file.stmts[2].pos.offset());
    }

    #[test]
    fn test_parse_if_without_else() {
        let file = parse_ok("if a; then b; fi");
        match first_cmd(&file) {
            Command::If(clause) => {
                assert_eq!(clause.cond.len(), 1);
                assert_eq!(clause.then.len(), 1);
                assert!(clause.else_branch.is_none());
                assert!(clause.fi_pos.is_valid());
            }
            other => panic!("expected if, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_if_with_else() {
        let file = parse_ok("if a; then b; else c; fi");
        match first_cmd(&file) {
            Command::If(clause) => {
                let els = clause.else_branch.as_ref().expect("else branch");
                assert!(els.cond.is_empty());
                assert_eq!(els.then.len(), 1);
                assert!(!els.then_pos.is_valid());
            }
            other => panic!("expected if, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_elif_chain() {
        let file = parse_ok("if a; then b; elif c; then d; else e; fi");
        match first_cmd(&file) {
            Command::If(clause) => {
                let elif = clause.else_branch.as_ref().expect("elif");
                assert_eq!(elif.cond.len(), 1);
                let els = elif.else_branch.as_ref().expect("else");
                assert!(els.cond.is_empty());
            }
            other => panic!("expected if, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_while_loop() {
        let file = parse_ok("while true; do work; done");
        match first_cmd(&file) {
            Command::While(clause) => {
                assert!(!clause.until);
                assert_eq!(clause.cond.len(), 1);
                assert_eq!(clause.body.len(), 1);
            }
            other => panic!("expected while, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_until_loop() {
        let file = parse_ok("until done_yet; do wait; done");
        match first_cmd(&file) {
            Command::While(clause) => assert!(clause.until),
            other => panic!("expected until, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_for_words() {
        let file = parse_ok("for x in a b c; do echo $x; done");
        match first_cmd(&file) {
            Command::For(clause) => match &clause.head {
                Loop::WordIter(iter) => {
                    assert_eq!(iter.name.value, "x");
                    assert_eq!(iter.items.len(), 3);
                }
                other => panic!("expected word iteration, got {:?}", other),
            },
            other => panic!("expected for, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_for_cstyle() {
        let file = parse_ok("for ((i = 0; i < 3; i++)); do echo $i; done");
        match first_cmd(&file) {
            Command::For(clause) => match &clause.head {
                Loop::CStyle(head) => {
                    assert!(head.init.is_some());
                    assert!(head.cond.is_some());
                    assert!(head.post.is_some());
                }
                other => panic!("expected C-style head, got {:?}", other),
            },
            other => panic!("expected for, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_for_cstyle_empty_sections() {
        let file = parse_ok("for ((;;)); do break; done");
        match first_cmd(&file) {
            Command::For(clause) => match &clause.head {
                Loop::CStyle(head) => {
                    assert!(head.init.is_none());
                    assert!(head.cond.is_none());
                    assert!(head.post.is_none());
                }
                other => panic!("expected C-style head, got {:?}", other),
            },
            other => panic!("expected for, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_select() {
        let file = parse_ok("select opt in a b; do echo $opt; done");
        match first_cmd(&file) {
            Command::For(clause) => assert!(clause.select),
            other => panic!("expected select, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_case() {
        let file = parse_ok("case $x in a|b) one;; c) two;& *) rest;; esac");
        match first_cmd(&file) {
            Command::Case(clause) => {
                assert_eq!(clause.items.len(), 3);
                assert_eq!(clause.items[0].patterns.len(), 2);
                assert_eq!(clause.items[0].op, CaseOp::Break);
                assert_eq!(clause.items[1].op, CaseOp::Fallthrough);
            }
            other => panic!("expected case, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_subshell() {
        let file = parse_ok("(cd /tmp && ls)");
        match first_cmd(&file) {
            Command::Subshell(sub) => assert_eq!(sub.stmts.len(), 1),
            other => panic!("expected subshell, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_block() {
        let file = parse_ok("{ a; b; }");
        match first_cmd(&file) {
            Command::Block(block) => assert_eq!(block.stmts.len(), 2),
            other => panic!("expected block, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_function_short_form() {
        let file = parse_ok("greet() { echo hi; }");
        match first_cmd(&file) {
            Command::FuncDecl(decl) => {
                assert!(!decl.rsrv_word);
                assert_eq!(decl.name.value, "greet");
                assert!(matches!(decl.body.cmd, Some(Command::Block(_))));
            }
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_function_keyword_form() {
        let file = parse_ok("function greet { echo hi; }");
        match first_cmd(&file) {
            Command::FuncDecl(decl) => assert!(decl.rsrv_word),
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_test_clause() {
        let file = parse_ok("[[ -f /etc/passwd && $x == y ]]");
        match first_cmd(&file) {
            Command::Test(clause) => match &clause.x {
                TestExpr::Binary(bin) => {
                    assert_eq!(bin.op, BinTestOp::And);
                    assert!(matches!(bin.x, TestExpr::Unary(_)));
                    assert!(matches!(bin.y, TestExpr::Binary(_)));
                }
                other => panic!("expected binary test, got {:?}", other),
            },
            other => panic!("expected test clause, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_arith_cmd() {
        let file = parse_ok("((x = 1 + 2))");
        match first_cmd(&file) {
            Command::ArithmCmd(cmd) => {
                assert!(!cmd.unsigned);
                assert!(cmd.x.is_some());
            }
            other => panic!("expected arithmetic command, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_redirects() {
        let file = parse_ok("cmd <in >out 2>err");
        let stmt = &file.stmts[0];
        assert_eq!(stmt.redirs.len(), 3);
        assert_eq!(stmt.redirs[0].op, RedirOp::Less);
        assert_eq!(stmt.redirs[1].op, RedirOp::Great);
        let third = &stmt.redirs[2];
        assert_eq!(third.op, RedirOp::Great);
        assert_eq!(third.n.as_ref().unwrap().value, "2");
    }

    #[test]
    fn test_parse_heredoc() {
        let file = parse_ok("cat <<EOF\nline one\nline two\nEOF\n");
        let redirect = &file.stmts[0].redirs[0];
        assert_eq!(redirect.op, RedirOp::DLess);
        let hdoc = redirect.hdoc.as_ref().expect("heredoc body");
        match &hdoc.parts[0] {
            crate::syntax::ast::WordPart::Lit(lit) => {
                assert_eq!(lit.value, "line one\nline two\n");
            }
            other => panic!("expected literal body, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_redirect_only_statement() {
        let file = parse_ok(">出力");
        let stmt = &file.stmts[0];
        assert!(stmt.cmd.is_none());
        assert_eq!(stmt.redirs.len(), 1);
    }

    #[test]
    fn test_parse_decl_clause() {
        let file = parse_ok("declare -x FOO=bar");
        match first_cmd(&file) {
            Command::Decl(decl) => {
                assert_eq!(decl.variant.value, "declare");
                assert_eq!(decl.args.len(), 2);
                assert!(decl.args[0].naked);
                assert!(!decl.args[1].naked);
            }
            other => panic!("expected declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_let_clause() {
        let file = parse_ok("let x=1 y=2");
        match first_cmd(&file) {
            Command::Let(clause) => assert_eq!(clause.exprs.len(), 2),
            other => panic!("expected let, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_time_clause() {
        let file = parse_ok("time -p sleep 1");
        match first_cmd(&file) {
            Command::Time(clause) => {
                assert!(clause.posix_format);
                assert!(clause.stmt.is_some());
            }
            other => panic!("expected time, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_coproc() {
        let file = parse_ok("coproc worker { do_work; }");
        match first_cmd(&file) {
            Command::Coproc(clause) => {
                assert!(clause.name.is_some());
                assert!(matches!(clause.stmt.cmd, Some(Command::Block(_))));
            }
            other => panic!("expected coproc, got {:?}", other),
        }
    }

    #[test]
    fn test_comments_attach_to_statements() {
        let file = parse_ok("# leading\necho hi # trailing\n# stray\n");
        assert_eq!(file.stmts[0].comments.len(), 2);
        assert_eq!(file.stmts[0].comments[0].text, " leading");
        assert_eq!(file.stmts[0].comments[1].text, " trailing");
        assert_eq!(file.last.len(), 1);
        assert_eq!(file.last[0].text, " stray");
    }

    #[test]
    fn test_comments_dropped_when_not_kept() {
        let options = ParserOptions::default();
        let (file, err) = parse("# leading\necho hi\n", "t", &options);
        assert!(err.is_none());
        assert!(file.stmts[0].comments.is_empty());
    }

    #[test]
    fn test_unterminated_if_reports_error() {
        let err = parse_err("if a; then");
        assert!(!err.message.is_empty());
        assert!(err.pos.offset() >= 10);
        assert!(err.incomplete);
    }

    #[test]
    fn test_error_keeps_partial_tree() {
        let options = ParserOptions::default();
        let (file, err) = parse("echo ok\nif broken; then", "t", &options);
        assert!(err.is_some());
        assert_eq!(file.stmts.len(), 1);
    }

    #[test]
    fn test_recover_errors_skips_bad_statement() {
        let options = ParserOptions {
            recover_errors: 1,
            ..Default::default()
        };
        let (file, err) = parse("cmd <\necho ok\n", "t", &options);
        assert!(err.is_none());
        assert_eq!(file.stmts.len(), 1);
    }

    #[test]
    fn test_recover_errors_budget_exhausted() {
        let options = ParserOptions {
            recover_errors: 1,
            ..Default::default()
        };
        let (_, err) = parse("cmd <\nother >\necho ok\n", "t", &options);
        assert!(err.is_some());
    }

    #[test]
    fn test_stop_at_marker() {
        let options = ParserOptions {
            stop_at: Some("$$".to_string()),
            ..Default::default()
        };
        let (file, err) = parse("echo before\n$$ echo after\n", "t", &options);
        assert!(err.is_none());
        assert_eq!(file.stmts.len(), 1);
    }

    #[test]
    fn test_pipe_amp_is_pipe_in_bash() {
        let file = parse_ok("a |& b");
        match first_cmd(&file) {
            Command::Binary(bin) => assert_eq!(bin.op, BinCmdOp::PipeAll),
            other => panic!("expected binary, got {:?}", other),
        }
    }

    #[test]
    fn test_pipe_amp_is_coproc_in_mksh() {
        let options = ParserOptions {
            variant: LangVariant::MirBSDKorn,
            ..Default::default()
        };
        let (file, err) = parse("a |&\n", "t", &options);
        assert!(err.is_none());
        assert!(file.stmts[0].coprocess);
    }

    #[test]
    fn test_pipe_amp_rejected_in_posix() {
        let options = ParserOptions {
            variant: LangVariant::Posix,
            ..Default::default()
        };
        let (_, err) = parse("a |& b\n", "t", &options);
        assert!(err.unwrap().message.contains("posix"));
    }

    #[test]
    fn test_command_substitution_inside_script() {
        let file = parse_ok("echo $(date +%s)");
        match first_cmd(&file) {
            Command::Call(call) => assert_eq!(call.args.len(), 2),
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_end_positions_are_monotonic() {
        let file = parse_ok("if a; then b; fi\nfor x in 1 2; do echo $x; done\n");
        for stmt in &file.stmts {
            assert!(stmt.end.offset() >= stmt.pos.offset());
            let cmd = stmt.cmd.as_ref().unwrap();
            assert!(cmd.end().offset() >= cmd.pos().offset());
        }
    }

    #[test]
    fn test_keywords_as_arguments_stay_words() {
        let file = parse_ok("echo if then fi");
        match first_cmd(&file) {
            Command::Call(call) => assert_eq!(call.args.len(), 4),
            other => panic!("expected call, got {:?}", other),
        }
    }
}
