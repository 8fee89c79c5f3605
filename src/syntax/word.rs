//! Word Parsing
//!
//! Splits the raw text of a word token into its ordered parts: literals,
//! quoted strings, parameter expansions, command and arithmetic
//! substitutions. The raw text is an exact source slice, so every part
//! keeps absolute positions; command substitution bodies are re-parsed
//! through the statement parser at their own offset.

use super::ast::{
    ArithmExp, ArithmExpr, CmdSubst, DblQuoted, ExpOperator, Expansion, Lit, ParamExp, Pos,
    Replace, SglQuoted, Slice, Word, WordPart,
};
use super::parser::parse_nested;
use super::{ParseError, ParserOptions};

pub(crate) fn parse_word(
    raw: &str,
    base: Pos,
    options: &ParserOptions,
    depth: usize,
) -> Result<Word, ParseError> {
    if depth > super::parser::MAX_NESTING_DEPTH {
        return Err(ParseError {
            filename: String::new(),
            pos: base,
            message: "expansions nested too deeply".into(),
            incomplete: false,
        });
    }
    WordScanner::new(raw, base, options, depth).parse()
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_special_param(c: char) -> bool {
    matches!(c, '@' | '*' | '#' | '?' | '-' | '$' | '!')
}

/// Find the matching close bracket for the opener at byte index `open_idx`,
/// skipping quoted sections and escapes. Returns the byte index of the
/// closer.
fn find_matching(content: &str, open_idx: usize, open: char, close: char) -> Option<usize> {
    let mut depth = 0i32;
    let mut skip = false;
    let mut in_single = false;
    let mut in_double = false;
    for (i, c) in content.char_indices() {
        if i < open_idx {
            continue;
        }
        if skip {
            skip = false;
            continue;
        }
        match c {
            '\\' if !in_single => skip = true,
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            c if c == open && !in_single && !in_double => depth += 1,
            c if c == close && !in_single && !in_double => {
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

/// Find `target` at bracket depth zero, outside quotes, at or after `from`.
pub(crate) fn find_top_level(content: &str, from: usize, target: char) -> Option<usize> {
    let mut depth = 0i32;
    let mut skip = false;
    let mut in_single = false;
    let mut in_double = false;
    for (i, c) in content.char_indices() {
        if i < from {
            continue;
        }
        if skip {
            skip = false;
            continue;
        }
        if c == target && depth == 0 && !in_single && !in_double {
            return Some(i);
        }
        match c {
            '\\' if !in_single => skip = true,
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            '[' | '(' | '{' if !in_single && !in_double => depth += 1,
            ']' | ')' | '}' if !in_single && !in_double => depth -= 1,
            _ => {}
        }
    }
    None
}

struct WordScanner<'a> {
    chars: Vec<char>,
    idx: usize,
    offset: usize,
    line: usize,
    col: usize,
    options: &'a ParserOptions,
    depth: usize,
}

impl<'a> WordScanner<'a> {
    fn new(raw: &str, base: Pos, options: &'a ParserOptions, depth: usize) -> Self {
        Self {
            chars: raw.chars().collect(),
            idx: 0,
            offset: base.offset(),
            line: base.line(),
            col: base.col(),
            options,
            depth,
        }
    }

    fn cur(&self) -> Pos {
        Pos::new(self.offset, self.line, self.col)
    }

    fn current(&self) -> Option<char> {
        self.chars.get(self.idx).copied()
    }

    fn peek(&self, n: usize) -> Option<char> {
        self.chars.get(self.idx + n).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.current()?;
        self.idx += 1;
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

    /// Whether the `$` at the current position introduces an expansion
    /// rather than a literal dollar sign.
    fn dollar_starts_part(&self, in_dquotes: bool) -> bool {
        match self.peek(1) {
            Some('\'') | Some('"') => !in_dquotes,
            Some('(') | Some('{') => true,
            Some(c) => is_name_start(c) || c.is_ascii_digit() || is_special_param(c),
            None => false,
        }
    }

    fn parse(mut self) -> Result<Word, ParseError> {
        let start = self.cur();
        let mut parts: Vec<WordPart> = Vec::new();
        let mut lit = String::new();
        let mut lit_start = start;

        macro_rules! flush {
            () => {
                if !lit.is_empty() {
                    parts.push(WordPart::Lit(Lit {
                        value: std::mem::take(&mut lit),
                        value_pos: lit_start,
                        value_end: self.cur(),
                    }));
                }
            };
        }

        while let Some(c) = self.current() {
            match c {
                '\'' => {
                    flush!();
                    let part = self.read_single_quoted(false, self.cur())?;
                    parts.push(part);
                }
                '"' => {
                    flush!();
                    let part = self.read_double_quoted(false, self.cur())?;
                    parts.push(part);
                }
                '`' => {
                    flush!();
                    let part = self.read_backquoted()?;
                    parts.push(part);
                }
                '$' if self.dollar_starts_part(false) => {
                    flush!();
                    let part = self.read_dollar(false)?;
                    parts.push(part);
                }
                '\\' => {
                    let p = self.cur();
                    self.advance();
                    if self.current() == Some('\n') {
                        // Line continuation disappears from the word.
                        self.advance();
                    } else {
                        if lit.is_empty() {
                            lit_start = p;
                        }
                        lit.push('\\');
                        if let Some(c2) = self.advance() {
                            lit.push(c2);
                        }
                    }
                }
                _ => {
                    if lit.is_empty() {
                        lit_start = self.cur();
                    }
                    lit.push(c);
                    self.advance();
                }
            }
        }
        flush!();

        Ok(Word {
            parts,
            pos: start,
            end: self.cur(),
        })
    }

    /// `'...'`, or `$'...'` when `dollar` (escaped quotes allowed there).
    fn read_single_quoted(&mut self, dollar: bool, start: Pos) -> Result<WordPart, ParseError> {
        let left = self.cur();
        self.advance();
        let mut value = String::new();
        loop {
            match self.current() {
                Some('\\') if dollar => {
                    value.push('\\');
                    self.advance();
                    if let Some(c) = self.advance() {
                        value.push(c);
                    }
                }
                Some('\'') => {
                    let right = self.cur();
                    self.advance();
                    return Ok(WordPart::SglQuoted(SglQuoted {
                        dollar,
                        value,
                        left,
                        right,
                        pos: start,
                        end: self.cur(),
                    }));
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
                None => return Err(self.error("unclosed single quote", left)),
            }
        }
    }

    fn read_double_quoted(&mut self, dollar: bool, start: Pos) -> Result<WordPart, ParseError> {
        let left = self.cur();
        self.advance();
        let mut parts: Vec<WordPart> = Vec::new();
        let mut lit = String::new();
        let mut lit_start = self.cur();

        macro_rules! flush {
            () => {
                if !lit.is_empty() {
                    parts.push(WordPart::Lit(Lit {
                        value: std::mem::take(&mut lit),
                        value_pos: lit_start,
                        value_end: self.cur(),
                    }));
                }
            };
        }

        loop {
            match self.current() {
                Some('"') => {
                    flush!();
                    let right = self.cur();
                    self.advance();
                    return Ok(WordPart::DblQuoted(DblQuoted {
                        dollar,
                        parts,
                        left,
                        right,
                        pos: start,
                        end: self.cur(),
                    }));
                }
                Some('\\') => {
                    let p = self.cur();
                    self.advance();
                    if self.current() == Some('\n') {
                        self.advance();
                    } else {
                        if lit.is_empty() {
                            lit_start = p;
                        }
                        lit.push('\\');
                        if let Some(c) = self.advance() {
                            lit.push(c);
                        }
                    }
                }
                Some('$') if self.dollar_starts_part(true) => {
                    flush!();
                    parts.push(self.read_dollar(true)?);
                }
                Some('`') => {
                    flush!();
                    parts.push(self.read_backquoted()?);
                }
                Some(c) => {
                    if lit.is_empty() {
                        lit_start = self.cur();
                    }
                    lit.push(c);
                    self.advance();
                }
                None => return Err(self.error("unclosed double quote", left)),
            }
        }
    }

    fn read_backquoted(&mut self) -> Result<WordPart, ParseError> {
        let start = self.cur();
        self.advance();
        let inner_base = self.cur();
        let mut inner = String::new();
        loop {
            match self.current() {
                Some('\\') => {
                    inner.push('\\');
                    self.advance();
                    if let Some(c) = self.advance() {
                        inner.push(c);
                    }
                }
                Some('`') => {
                    let right = self.cur();
                    self.advance();
                    let stmts = parse_nested(&inner, inner_base, self.options, self.depth + 1)?;
                    return Ok(WordPart::CmdSubst(CmdSubst {
                        stmts,
                        temp_file: false,
                        reply_var: false,
                        left: start,
                        right,
                        pos: start,
                        end: self.cur(),
                    }));
                }
                Some(c) => {
                    inner.push(c);
                    self.advance();
                }
                None => return Err(self.error("unclosed backquote substitution", start)),
            }
        }
    }

    fn read_dollar(&mut self, in_dquotes: bool) -> Result<WordPart, ParseError> {
        let start = self.cur();
        self.advance();
        match self.current() {
            Some('\'') if !in_dquotes => self.read_single_quoted(true, start),
            Some('"') if !in_dquotes => self.read_double_quoted(true, start),
            Some('(') => self.read_substitution(start),
            Some('{') => self.read_braced_param(start),
            _ => self.read_short_param(start),
        }
    }

    /// `$name`, `$1`, `$?` and friends. Exactly one digit in the short form.
    fn read_short_param(&mut self, start: Pos) -> Result<WordPart, ParseError> {
        let value_pos = self.cur();
        let mut value = String::new();
        match self.current() {
            Some(c) if is_name_start(c) => {
                while let Some(c) = self.current() {
                    if !is_name_char(c) {
                        break;
                    }
                    value.push(c);
                    self.advance();
                }
            }
            Some(c) if c.is_ascii_digit() || is_special_param(c) => {
                value.push(c);
                self.advance();
            }
            _ => return Err(self.error("expected a parameter name after $", start)),
        }
        let value_end = self.cur();
        Ok(WordPart::ParamExp(ParamExp {
            short: true,
            excl: false,
            length: false,
            width: false,
            param: Lit {
                value,
                value_pos,
                value_end,
            },
            index: None,
            slice: None,
            repl: None,
            exp: None,
            pos: start,
            end: self.cur(),
        }))
    }

    /// `$( ... )` or `$(( ... ))`, decided by whether the captured body is
    /// itself fully parenthesized (the greedy arithmetic reading).
    fn read_substitution(&mut self, start: Pos) -> Result<WordPart, ParseError> {
        let lparen = self.cur();
        self.advance();
        let inner_base = self.cur();
        let mut inner = String::new();
        let mut depth = 1usize;
        let right;
        loop {
            match self.current() {
                Some('(') => {
                    depth += 1;
                    inner.push('(');
                    self.advance();
                }
                Some(')') => {
                    depth -= 1;
                    if depth == 0 {
                        right = self.cur();
                        self.advance();
                        break;
                    }
                    inner.push(')');
                    self.advance();
                }
                Some('\\') => {
                    inner.push('\\');
                    self.advance();
                    if let Some(c) = self.advance() {
                        inner.push(c);
                    }
                }
                Some('\'') => self.cap_single_quoted(&mut inner)?,
                Some('"') => self.cap_double_quoted(&mut inner)?,
                Some('`') => self.cap_backquoted(&mut inner)?,
                Some(c) => {
                    inner.push(c);
                    self.advance();
                }
                None => return Err(self.error("unclosed command substitution", lparen)),
            }
        }

        if inner.len() >= 2 && inner.starts_with('(') && inner.ends_with(')') {
            let body = &inner[1..inner.len() - 1];
            let body_base = inner_base.advanced_by("(");
            let x = if body.trim().is_empty() {
                None
            } else {
                let word = parse_word(body, body_base, self.options, self.depth + 1)?;
                Some(Box::new(ArithmExpr::Word(word)))
            };
            return Ok(WordPart::ArithmExp(ArithmExp {
                bracket: false,
                unsigned: false,
                x,
                left: start,
                right,
                pos: start,
                end: self.cur(),
            }));
        }

        let stmts = parse_nested(&inner, inner_base, self.options, self.depth + 1)?;
        Ok(WordPart::CmdSubst(CmdSubst {
            stmts,
            temp_file: false,
            reply_var: false,
            left: start,
            right,
            pos: start,
            end: self.cur(),
        }))
    }

    /// `${ ... }`: capture the body, then pick it apart.
    fn read_braced_param(&mut self, start: Pos) -> Result<WordPart, ParseError> {
        let lbrace = self.cur();
        self.advance();
        let content_base = self.cur();
        let mut content = String::new();
        let mut depth = 1usize;
        loop {
            match self.current() {
                Some('{') => {
                    depth += 1;
                    content.push('{');
                    self.advance();
                }
                Some('}') => {
                    depth -= 1;
                    if depth == 0 {
                        self.advance();
                        break;
                    }
                    content.push('}');
                    self.advance();
                }
                Some('\\') => {
                    content.push('\\');
                    self.advance();
                    if let Some(c) = self.advance() {
                        content.push(c);
                    }
                }
                Some('\'') => self.cap_single_quoted(&mut content)?,
                Some('"') => self.cap_double_quoted(&mut content)?,
                Some('`') => self.cap_backquoted(&mut content)?,
                Some('$') if self.peek(1) == Some('(') => {
                    content.push('$');
                    self.advance();
                    self.cap_parens(&mut content)?;
                }
                Some(c) => {
                    content.push(c);
                    self.advance();
                }
                None => return Err(self.error("unclosed parameter expansion", lbrace)),
            }
        }
        let end = self.cur();
        self.parse_param_content(&content, content_base, start, end)
    }

    fn parse_param_content(
        &self,
        content: &str,
        cbase: Pos,
        start: Pos,
        end: Pos,
    ) -> Result<WordPart, ParseError> {
        let at = |i: usize| cbase.advanced_by(&content[..i]);
        let mut i = 0usize;
        let mut excl = false;
        let mut length = false;
        let mut width = false;

        if content.is_empty() {
            return Err(self.error("empty parameter expansion", start));
        }

        if content.starts_with('!') && content.len() > 1 {
            excl = true;
            i += 1;
        }
        match content[i..].chars().next() {
            Some('#') if content[i..].len() > 1 => {
                length = true;
                i += 1;
            }
            Some('%') if content[i..].len() > 1 => {
                width = true;
                i += 1;
            }
            _ => {}
        }

        // Parameter name: a name run, a digit run, or one special character.
        let name_start_idx = i;
        let rest = &content[i..];
        let first = rest.chars().next();
        match first {
            Some(c) if is_name_start(c) => {
                for c in rest.chars() {
                    if !is_name_char(c) {
                        break;
                    }
                    i += c.len_utf8();
                }
            }
            Some(c) if c.is_ascii_digit() => {
                for c in rest.chars() {
                    if !c.is_ascii_digit() {
                        break;
                    }
                    i += c.len_utf8();
                }
            }
            Some(c) if is_special_param(c) => {
                i += c.len_utf8();
            }
            _ => return Err(self.error("invalid parameter name", at(i))),
        }
        let mut param = Lit {
            value: content[name_start_idx..i].to_string(),
            value_pos: at(name_start_idx),
            value_end: at(i),
        };

        // `${!prefix*}` and `${!prefix@}` name listings keep the glob as
        // part of the parameter.
        if excl && (&content[i..] == "*" || &content[i..] == "@") {
            param.value.push_str(&content[i..]);
            i = content.len();
            param.value_end = at(i);
        }

        // Subscript.
        let mut index = None;
        if content[i..].starts_with('[') {
            let close = find_matching(content, i, '[', ']')
                .ok_or_else(|| self.error("unclosed subscript in parameter expansion", at(i)))?;
            let inner = &content[i + 1..close];
            let word = parse_word(inner, at(i + 1), self.options, self.depth + 1)?;
            index = Some(Box::new(ArithmExpr::Word(word)));
            i = close + 1;
        }

        let mut slice = None;
        let mut repl = None;
        let mut exp = None;

        if i < content.len() {
            let rest = &content[i..];
            if rest.starts_with(':')
                && !matches!(
                    rest[1..].chars().next(),
                    Some('+') | Some('-') | Some('=') | Some('?')
                )
            {
                // `${a:offset}` or `${a:offset:length}`.
                let off_start = i + 1;
                let off_end = find_top_level(content, off_start, ':').unwrap_or(content.len());
                let offset =
                    parse_word(&content[off_start..off_end], at(off_start), self.options, self.depth + 1)?;
                let len_word = if off_end < content.len() {
                    let ls = off_end + 1;
                    Some(ArithmExpr::Word(parse_word(
                        &content[ls..],
                        at(ls),
                        self.options,
                        self.depth + 1,
                    )?))
                } else {
                    None
                };
                slice = Some(Box::new(Slice {
                    offset: ArithmExpr::Word(offset),
                    length: len_word,
                }));
            } else if rest.starts_with('/') {
                // `${a/pat/repl}`, `${a//pat/repl}`.
                let all = rest[1..].starts_with('/');
                let pat_start = i + if all { 2 } else { 1 };
                let pat_end = find_top_level(content, pat_start, '/').unwrap_or(content.len());
                let orig =
                    parse_word(&content[pat_start..pat_end], at(pat_start), self.options, self.depth + 1)?;
                let with = if pat_end < content.len() {
                    let ws = pat_end + 1;
                    Some(parse_word(&content[ws..], at(ws), self.options, self.depth + 1)?)
                } else {
                    None
                };
                repl = Some(Box::new(Replace { all, orig, with }));
            } else if let Some((op, oplen)) = ExpOperator::leading(rest) {
                let ws = i + oplen;
                let word = parse_word(&content[ws..], at(ws), self.options, self.depth + 1)?;
                exp = Some(Box::new(Expansion {
                    op,
                    word: Some(word),
                }));
            } else {
                return Err(self.error("unsupported parameter expansion operator", at(i)));
            }
        }

        Ok(WordPart::ParamExp(ParamExp {
            short: false,
            excl,
            length,
            width,
            param,
            index,
            slice,
            repl,
            exp,
            pos: start,
            end,
        }))
    }

    // Verbatim capture helpers used while collecting substitution bodies.

    fn cap_single_quoted(&mut self, out: &mut String) -> Result<(), ParseError> {
        let start = self.cur();
        out.push('\'');
        self.advance();
        while let Some(c) = self.current() {
            out.push(c);
            self.advance();
            if c == '\'' {
                return Ok(());
            }
        }
        Err(self.error("unclosed single quote", start))
    }

    fn cap_double_quoted(&mut self, out: &mut String) -> Result<(), ParseError> {
        let start = self.cur();
        out.push('"');
        self.advance();
        while let Some(c) = self.current() {
            match c {
                '\\' => {
                    out.push('\\');
                    self.advance();
                    if let Some(c2) = self.advance() {
                        out.push(c2);
                    }
                }
                '"' => {
                    out.push('"');
                    self.advance();
                    return Ok(());
                }
                '`' => self.cap_backquoted(out)?,
                _ => {
                    out.push(c);
                    self.advance();
                }
            }
        }
        Err(self.error("unclosed double quote", start))
    }

    fn cap_backquoted(&mut self, out: &mut String) -> Result<(), ParseError> {
        let start = self.cur();
        out.push('`');
        self.advance();
        while let Some(c) = self.current() {
            match c {
                '\\' => {
                    out.push('\\');
                    self.advance();
                    if let Some(c2) = self.advance() {
                        out.push(c2);
                    }
                }
                '`' => {
                    out.push('`');
                    self.advance();
                    return Ok(());
                }
                _ => {
                    out.push(c);
                    self.advance();
                }
            }
        }
        Err(self.error("unclosed backquote substitution", start))
    }

    fn cap_parens(&mut self, out: &mut String) -> Result<(), ParseError> {
        let start = self.cur();
        out.push('(');
        self.advance();
        let mut depth = 1usize;
        while let Some(c) = self.current() {
            match c {
                '(' => {
                    depth += 1;
                    out.push('(');
                    self.advance();
                }
                ')' => {
                    depth -= 1;
                    out.push(')');
                    self.advance();
                    if depth == 0 {
                        return Ok(());
                    }
                }
                '\\' => {
                    out.push('\\');
                    self.advance();
                    if let Some(c2) = self.advance() {
                        out.push(c2);
                    }
                }
                '\'' => self.cap_single_quoted(out)?,
                '"' => self.cap_double_quoted(out)?,
                '`' => self.cap_backquoted(out)?,
                _ => {
                    out.push(c);
                    self.advance();
                }
            }
        }
        Err(self.error("unclosed command substitution", start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::ast::Command;

    fn word(raw: &str) -> Word {
        let options = ParserOptions::default();
        parse_word(raw, Pos::new(0, 1, 1), &options, 0).expect("word parse failed")
    }

    #[test]
    fn test_plain_literal() {
        let w = word("abc");
        assert_eq!(w.parts.len(), 1);
        match &w.parts[0] {
            WordPart::Lit(lit) => {
                assert_eq!(lit.value, "abc");
                assert_eq!(lit.value_pos.offset(), 0);
                assert_eq!(lit.value_end.offset(), 3);
            }
            other => panic!("expected literal, got {:?}", other),
        }
    }

    #[test]
    fn test_mixed_quoting_preserves_order() {
        let w = word("a'b c'd");
        assert_eq!(w.parts.len(), 3);
        assert!(matches!(&w.parts[0], WordPart::Lit(l) if l.value == "a"));
        assert!(matches!(&w.parts[1], WordPart::SglQuoted(q) if q.value == "b c"));
        assert!(matches!(&w.parts[2], WordPart::Lit(l) if l.value == "d"));
    }

    #[test]
    fn test_short_param() {
        let w = word("$name");
        match &w.parts[0] {
            WordPart::ParamExp(p) => {
                assert!(p.short);
                assert_eq!(p.param.value, "name");
                assert_eq!(w.end.offset(), 5);
            }
            other => panic!("expected param, got {:?}", other),
        }
    }

    #[test]
    fn test_special_params() {
        for raw in ["$?", "$#", "$@", "$1"] {
            let w = word(raw);
            match &w.parts[0] {
                WordPart::ParamExp(p) => assert_eq!(p.param.value, &raw[1..]),
                other => panic!("expected param for {}, got {:?}", raw, other),
            }
        }
    }

    #[test]
    fn test_braced_param() {
        let w = word("${name}");
        match &w.parts[0] {
            WordPart::ParamExp(p) => {
                assert!(!p.short);
                assert_eq!(p.param.value, "name");
                assert_eq!(p.end.offset(), 7);
            }
            other => panic!("expected param, got {:?}", other),
        }
    }

    #[test]
    fn test_param_length() {
        let w = word("${#name}");
        match &w.parts[0] {
            WordPart::ParamExp(p) => {
                assert!(p.length);
                assert_eq!(p.param.value, "name");
            }
            other => panic!("expected param, got {:?}", other),
        }
    }

    #[test]
    fn test_param_default_expansion() {
        let w = word("${x:-fallback}");
        match &w.parts[0] {
            WordPart::ParamExp(p) => {
                let exp = p.exp.as_ref().expect("expansion");
                assert_eq!(exp.op, ExpOperator::DefaultUnsetOrNull);
                let inner = exp.word.as_ref().expect("operand word");
                assert!(matches!(&inner.parts[0], WordPart::Lit(l) if l.value == "fallback"));
            }
            other => panic!("expected param, got {:?}", other),
        }
    }

    #[test]
    fn test_param_slice() {
        let w = word("${x:1:2}");
        match &w.parts[0] {
            WordPart::ParamExp(p) => {
                let slice = p.slice.as_ref().expect("slice");
                assert!(slice.length.is_some());
            }
            other => panic!("expected param, got {:?}", other),
        }
    }

    #[test]
    fn test_param_replace() {
        let w = word("${x//a/b}");
        match &w.parts[0] {
            WordPart::ParamExp(p) => {
                let repl = p.repl.as_ref().expect("replace");
                assert!(repl.all);
                assert!(repl.with.is_some());
            }
            other => panic!("expected param, got {:?}", other),
        }
    }

    #[test]
    fn test_param_subscript() {
        let w = word("${arr[2]}");
        match &w.parts[0] {
            WordPart::ParamExp(p) => {
                assert_eq!(p.param.value, "arr");
                assert!(p.index.is_some());
            }
            other => panic!("expected param, got {:?}", other),
        }
    }

    #[test]
    fn test_command_substitution() {
        let w = word("$(echo hi)");
        match &w.parts[0] {
            WordPart::CmdSubst(c) => {
                assert_eq!(c.stmts.len(), 1);
                assert!(matches!(c.stmts[0].cmd, Some(Command::Call(_))));
                assert_eq!(c.right.offset(), 9);
            }
            other => panic!("expected substitution, got {:?}", other),
        }
    }

    #[test]
    fn test_backquote_substitution() {
        let w = word("`echo hi`");
        match &w.parts[0] {
            WordPart::CmdSubst(c) => assert_eq!(c.stmts.len(), 1),
            other => panic!("expected substitution, got {:?}", other),
        }
    }

    #[test]
    fn test_arithmetic_expansion() {
        let w = word("$((1 + 2))");
        match &w.parts[0] {
            WordPart::ArithmExp(a) => {
                let x = a.x.as_ref().expect("body");
                assert!(matches!(**x, ArithmExpr::Word(_)));
                assert_eq!(a.end.offset(), 10);
            }
            other => panic!("expected arithmetic expansion, got {:?}", other),
        }
    }

    #[test]
    fn test_double_quoted_with_expansion() {
        let w = word(r#""hi $x!""#);
        match &w.parts[0] {
            WordPart::DblQuoted(q) => {
                assert_eq!(q.parts.len(), 3);
                assert!(matches!(&q.parts[0], WordPart::Lit(l) if l.value == "hi "));
                assert!(matches!(&q.parts[1], WordPart::ParamExp(_)));
                assert!(matches!(&q.parts[2], WordPart::Lit(l) if l.value == "!"));
            }
            other => panic!("expected double quoted, got {:?}", other),
        }
    }

    #[test]
    fn test_dollar_single_quote() {
        let w = word(r"$'a\'b'");
        match &w.parts[0] {
            WordPart::SglQuoted(q) => {
                assert!(q.dollar);
                assert_eq!(q.value, r"a\'b");
            }
            other => panic!("expected single quoted, got {:?}", other),
        }
    }

    #[test]
    fn test_literal_dollar() {
        let w = word("a$");
        assert_eq!(w.parts.len(), 1);
        assert!(matches!(&w.parts[0], WordPart::Lit(l) if l.value == "a$"));
    }

    #[test]
    fn test_escape_kept_in_literal() {
        let w = word(r"a\ b");
        assert_eq!(w.parts.len(), 1);
        assert!(matches!(&w.parts[0], WordPart::Lit(l) if l.value == r"a\ b"));
    }

    #[test]
    fn test_nested_substitution_in_quotes() {
        let w = word(r#""$(echo "x y")""#);
        match &w.parts[0] {
            WordPart::DblQuoted(q) => {
                assert_eq!(q.parts.len(), 1);
                assert!(matches!(&q.parts[0], WordPart::CmdSubst(_)));
            }
            other => panic!("expected double quoted, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_word() {
        let w = word("");
        assert!(w.parts.is_empty());
        assert_eq!(w.pos, w.end);
    }
}
