//! Syntax Tree Types
//!
//! Node types for the shell syntax tree produced by the parser. Nodes are
//! grouped into five closed families (commands, word parts, test
//! expressions, arithmetic expressions, loop headers); everything else is a
//! concrete struct reached from a statement.

use std::fmt;

// =============================================================================
// POSITIONS
// =============================================================================

/// A source location: 0-based byte offset, 1-based line and column.
///
/// The zero value (all fields 0) means "no position", e.g. the semicolon
/// position of a statement that was terminated by a newline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pos {
    offset: usize,
    line: usize,
    col: usize,
}

impl Pos {
    pub fn new(offset: usize, line: usize, col: usize) -> Self {
        Self { offset, line, col }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn col(&self) -> usize {
        self.col
    }

    /// A position is valid once it points at a real line.
    pub fn is_valid(&self) -> bool {
        self.line > 0
    }

    /// The position reached after scanning `s` from this position.
    pub fn advanced_by(mut self, s: &str) -> Pos {
        for c in s.chars() {
            self.offset += c.len_utf8();
            if c == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
        self
    }
}

// =============================================================================
// FILE & STATEMENTS
// =============================================================================

/// Root node: one parsed source file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct File {
    pub name: String,
    pub stmts: Vec<Stmt>,
    /// Comments after the last statement.
    pub last: Vec<Comment>,
    pub pos: Pos,
    pub end: Pos,
}

/// A comment from `#` to the end of its line.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    /// Text after the `#` marker.
    pub text: String,
    /// Position of the `#` itself.
    pub hash: Pos,
    pub pos: Pos,
    pub end: Pos,
}

/// A statement: one command with its execution flags and redirects.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub comments: Vec<Comment>,
    /// May be absent for a statement made of redirects alone.
    pub cmd: Option<Command>,
    /// Position of the trailing `;`, `&` or `|&`; invalid if none.
    pub semicolon: Pos,
    pub negated: bool,
    pub background: bool,
    pub coprocess: bool,
    pub redirs: Vec<Redirect>,
    pub pos: Pos,
    pub end: Pos,
}

impl Stmt {
    pub fn new(pos: Pos) -> Self {
        Self {
            comments: Vec::new(),
            cmd: None,
            semicolon: Pos::default(),
            negated: false,
            background: false,
            coprocess: false,
            redirs: Vec::new(),
            pos,
            end: pos,
        }
    }
}

/// I/O redirection attached to a statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Redirect {
    pub op: RedirOp,
    pub op_pos: Pos,
    /// Numeric file descriptor prefix, e.g. the `2` in `2>err`.
    pub n: Option<Lit>,
    /// Target word; for here-documents this is the delimiter word.
    pub word: Option<Word>,
    /// Here-document body.
    pub hdoc: Option<Word>,
    pub pos: Pos,
    pub end: Pos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirOp {
    Less,      // <
    Great,     // >
    DGreat,    // >>
    GreatAnd,  // >&
    LessAnd,   // <&
    LessGreat, // <>
    Clobber,   // >|
    AndGreat,  // &>
    AndDGreat, // &>>
    TLess,     // <<<
    DLess,     // <<
    DLessDash, // <<-
}

impl fmt::Display for RedirOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Less => write!(f, "<"),
            Self::Great => write!(f, ">"),
            Self::DGreat => write!(f, ">>"),
            Self::GreatAnd => write!(f, ">&"),
            Self::LessAnd => write!(f, "<&"),
            Self::LessGreat => write!(f, "<>"),
            Self::Clobber => write!(f, ">|"),
            Self::AndGreat => write!(f, "&>"),
            Self::AndDGreat => write!(f, "&>>"),
            Self::TLess => write!(f, "<<<"),
            Self::DLess => write!(f, "<<"),
            Self::DLessDash => write!(f, "<<-"),
        }
    }
}

// =============================================================================
// COMMANDS
// =============================================================================

/// Union of all command kinds a statement can hold.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Call(CallExpr),
    Binary(Box<BinaryCmd>),
    If(Box<IfClause>),
    While(WhileClause),
    For(ForClause),
    Case(CaseClause),
    Block(Block),
    Subshell(Subshell),
    FuncDecl(Box<FuncDecl>),
    Test(TestClause),
    ArithmCmd(ArithmCmd),
    Decl(DeclClause),
    Let(LetClause),
    Time(TimeClause),
    Coproc(Box<CoprocClause>),
}

impl Command {
    pub fn pos(&self) -> Pos {
        match self {
            Self::Call(n) => n.pos,
            Self::Binary(n) => n.pos,
            Self::If(n) => n.pos,
            Self::While(n) => n.pos,
            Self::For(n) => n.pos,
            Self::Case(n) => n.pos,
            Self::Block(n) => n.pos,
            Self::Subshell(n) => n.pos,
            Self::FuncDecl(n) => n.pos,
            Self::Test(n) => n.pos,
            Self::ArithmCmd(n) => n.pos,
            Self::Decl(n) => n.pos,
            Self::Let(n) => n.pos,
            Self::Time(n) => n.pos,
            Self::Coproc(n) => n.pos,
        }
    }

    pub fn end(&self) -> Pos {
        match self {
            Self::Call(n) => n.end,
            Self::Binary(n) => n.end,
            Self::If(n) => n.end,
            Self::While(n) => n.end,
            Self::For(n) => n.end,
            Self::Case(n) => n.end,
            Self::Block(n) => n.end,
            Self::Subshell(n) => n.end,
            Self::FuncDecl(n) => n.end,
            Self::Test(n) => n.end,
            Self::ArithmCmd(n) => n.end,
            Self::Decl(n) => n.end,
            Self::Let(n) => n.end,
            Self::Time(n) => n.end,
            Self::Coproc(n) => n.end,
        }
    }
}

/// Simple command: assignments, name and arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub assigns: Vec<Assign>,
    pub args: Vec<Word>,
    pub pos: Pos,
    pub end: Pos,
}

/// Two statements joined by `&&`, `||`, `|` or `|&`.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryCmd {
    pub op: BinCmdOp,
    pub op_pos: Pos,
    pub x: Stmt,
    pub y: Stmt,
    pub pos: Pos,
    pub end: Pos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinCmdOp {
    AndStmt, // &&
    OrStmt,  // ||
    Pipe,    // |
    PipeAll, // |&
}

impl fmt::Display for BinCmdOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AndStmt => write!(f, "&&"),
            Self::OrStmt => write!(f, "||"),
            Self::Pipe => write!(f, "|"),
            Self::PipeAll => write!(f, "|&"),
        }
    }
}

/// `if`/`elif`/`else` chain. An `elif` or `else` branch is itself an
/// `IfClause`; a plain `else` has an empty `cond` and an invalid `then_pos`.
/// An absent branch is `None`, which is distinct from a branch with an empty
/// body.
#[derive(Debug, Clone, PartialEq)]
pub struct IfClause {
    pub cond: Vec<Stmt>,
    pub then_pos: Pos,
    pub then: Vec<Stmt>,
    pub else_branch: Option<Box<IfClause>>,
    /// Position of `fi`; only set on the clause that directly precedes it.
    pub fi_pos: Pos,
    pub cond_last: Vec<Comment>,
    pub then_last: Vec<Comment>,
    pub last: Vec<Comment>,
    pub pos: Pos,
    pub end: Pos,
}

/// `while` or `until` loop.
#[derive(Debug, Clone, PartialEq)]
pub struct WhileClause {
    pub until: bool,
    pub while_pos: Pos,
    pub do_pos: Pos,
    pub done_pos: Pos,
    pub cond: Vec<Stmt>,
    pub body: Vec<Stmt>,
    pub pos: Pos,
    pub end: Pos,
}

/// `for` or `select` loop; the header is one of the `Loop` kinds.
#[derive(Debug, Clone, PartialEq)]
pub struct ForClause {
    pub select: bool,
    pub head: Loop,
    pub body: Vec<Stmt>,
    pub pos: Pos,
    pub end: Pos,
}

/// `case` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseClause {
    pub word: Word,
    pub items: Vec<CaseItem>,
    pub last: Vec<Comment>,
    pub pos: Pos,
    pub end: Pos,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseItem {
    pub op: CaseOp,
    /// Position of the terminator; invalid for the last item when it is
    /// closed by `esac` directly.
    pub op_pos: Pos,
    pub patterns: Vec<Word>,
    pub stmts: Vec<Stmt>,
    pub comments: Vec<Comment>,
    pub pos: Pos,
    pub end: Pos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseOp {
    Break,       // ;;
    Fallthrough, // ;&
    Resume,      // ;;&
}

impl fmt::Display for CaseOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Break => write!(f, ";;"),
            Self::Fallthrough => write!(f, ";&"),
            Self::Resume => write!(f, ";;&"),
        }
    }
}

/// Command group: `{ ...; }`
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub lbrace: Pos,
    pub rbrace: Pos,
    pub pos: Pos,
    pub end: Pos,
}

/// Subshell: `( ... )`
#[derive(Debug, Clone, PartialEq)]
pub struct Subshell {
    pub stmts: Vec<Stmt>,
    pub pos: Pos,
    pub end: Pos,
}

/// Function declaration, either `name() body` or `function name body`.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    pub rsrv_word: bool,
    pub name: Lit,
    pub body: Stmt,
    pub pos: Pos,
    pub end: Pos,
}

/// Conditional command: `[[ expr ]]`
#[derive(Debug, Clone, PartialEq)]
pub struct TestClause {
    pub x: TestExpr,
    pub pos: Pos,
    pub end: Pos,
}

/// Arithmetic command: `(( expr ))`
#[derive(Debug, Clone, PartialEq)]
pub struct ArithmCmd {
    /// mksh `((# expr))`.
    pub unsigned: bool,
    pub x: Option<ArithmExpr>,
    pub left: Pos,
    pub right: Pos,
    pub pos: Pos,
    pub end: Pos,
}

/// Declaration builtin: `declare`, `local`, `export`, `readonly`,
/// `typeset` or `nameref`, with its arguments parsed as assignments.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclClause {
    pub variant: Lit,
    pub args: Vec<Assign>,
    pub pos: Pos,
    pub end: Pos,
}

/// `let` builtin; each argument is an arithmetic expression.
#[derive(Debug, Clone, PartialEq)]
pub struct LetClause {
    pub exprs: Vec<ArithmExpr>,
    pub pos: Pos,
    pub end: Pos,
}

/// `time [-p]` prefix applied to a statement.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeClause {
    pub posix_format: bool,
    pub stmt: Option<Box<Stmt>>,
    pub pos: Pos,
    pub end: Pos,
}

/// `coproc [name] stmt`.
#[derive(Debug, Clone, PartialEq)]
pub struct CoprocClause {
    pub name: Option<Word>,
    pub stmt: Stmt,
    pub pos: Pos,
    pub end: Pos,
}

// =============================================================================
// ASSIGNMENTS
// =============================================================================

/// Variable assignment: `NAME=value`, `NAME+=value`, `NAME=(a b)`, or a
/// naked declaration argument (no name, only a value word).
#[derive(Debug, Clone, PartialEq)]
pub struct Assign {
    pub append: bool,
    pub naked: bool,
    pub name: Option<Lit>,
    pub index: Option<ArithmExpr>,
    pub value: Option<Word>,
    pub array: Option<ArrayExpr>,
    pub pos: Pos,
    pub end: Pos,
}

/// Array literal: `(a b c)`
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayExpr {
    pub elems: Vec<ArrayElem>,
    pub lparen: Pos,
    pub rparen: Pos,
    pub pos: Pos,
    pub end: Pos,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayElem {
    pub index: Option<ArithmExpr>,
    pub value: Word,
    pub comments: Vec<Comment>,
    pub pos: Pos,
    pub end: Pos,
}

// =============================================================================
// WORDS
// =============================================================================

/// A word is an ordered sequence of parts; concatenation is significant.
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub parts: Vec<WordPart>,
    pub pos: Pos,
    pub end: Pos,
}

/// Union of all word part kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum WordPart {
    Lit(Lit),
    SglQuoted(SglQuoted),
    DblQuoted(DblQuoted),
    ParamExp(ParamExp),
    CmdSubst(CmdSubst),
    ArithmExp(ArithmExp),
}

impl WordPart {
    pub fn pos(&self) -> Pos {
        match self {
            Self::Lit(n) => n.value_pos,
            Self::SglQuoted(n) => n.pos,
            Self::DblQuoted(n) => n.pos,
            Self::ParamExp(n) => n.pos,
            Self::CmdSubst(n) => n.pos,
            Self::ArithmExp(n) => n.pos,
        }
    }

    pub fn end(&self) -> Pos {
        match self {
            Self::Lit(n) => n.value_end,
            Self::SglQuoted(n) => n.end,
            Self::DblQuoted(n) => n.end,
            Self::ParamExp(n) => n.end,
            Self::CmdSubst(n) => n.end,
            Self::ArithmExp(n) => n.end,
        }
    }
}

/// Literal text, kept exactly as written (escapes included).
#[derive(Debug, Clone, PartialEq)]
pub struct Lit {
    pub value: String,
    pub value_pos: Pos,
    pub value_end: Pos,
}

/// Single-quoted string: `'...'` or `$'...'`.
#[derive(Debug, Clone, PartialEq)]
pub struct SglQuoted {
    pub dollar: bool,
    pub value: String,
    pub left: Pos,
    pub right: Pos,
    pub pos: Pos,
    pub end: Pos,
}

/// Double-quoted string: `"..."` or `$"..."`.
#[derive(Debug, Clone, PartialEq)]
pub struct DblQuoted {
    pub dollar: bool,
    pub parts: Vec<WordPart>,
    pub left: Pos,
    pub right: Pos,
    pub pos: Pos,
    pub end: Pos,
}

/// Parameter expansion: `$name` or `${...}`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamExp {
    /// `$a` as opposed to `${a}`.
    pub short: bool,
    /// `${!a}` indirection.
    pub excl: bool,
    /// `${#a}` length.
    pub length: bool,
    /// `${%a}` width (mksh).
    pub width: bool,
    pub param: Lit,
    pub index: Option<Box<ArithmExpr>>,
    pub slice: Option<Box<Slice>>,
    pub repl: Option<Box<Replace>>,
    pub exp: Option<Box<Expansion>>,
    pub pos: Pos,
    pub end: Pos,
}

/// `${a:offset}` or `${a:offset:length}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub offset: ArithmExpr,
    pub length: Option<ArithmExpr>,
}

/// `${a/pattern/replacement}`; `all` for `//`.
#[derive(Debug, Clone, PartialEq)]
pub struct Replace {
    pub all: bool,
    pub orig: Word,
    pub with: Option<Word>,
}

/// `${a:-b}` and the rest of the operator family.
#[derive(Debug, Clone, PartialEq)]
pub struct Expansion {
    pub op: ExpOperator,
    pub word: Option<Word>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpOperator {
    AlternateUnset,       // +
    AlternateUnsetOrNull, // :+
    DefaultUnset,         // -
    DefaultUnsetOrNull,   // :-
    ErrorUnset,           // ?
    ErrorUnsetOrNull,     // :?
    AssignUnset,          // =
    AssignUnsetOrNull,    // :=
    RemSmallSuffix,       // %
    RemLargeSuffix,       // %%
    RemSmallPrefix,       // #
    RemLargePrefix,       // ##
    UpperFirst,           // ^
    UpperAll,             // ^^
    LowerFirst,           // ,
    LowerAll,             // ,,
}

impl ExpOperator {
    /// Longest-match lookup at the start of `s`.
    pub fn leading(s: &str) -> Option<(Self, usize)> {
        const TWO: &[(&str, ExpOperator)] = &[
            (":+", ExpOperator::AlternateUnsetOrNull),
            (":-", ExpOperator::DefaultUnsetOrNull),
            (":?", ExpOperator::ErrorUnsetOrNull),
            (":=", ExpOperator::AssignUnsetOrNull),
            ("%%", ExpOperator::RemLargeSuffix),
            ("##", ExpOperator::RemLargePrefix),
            ("^^", ExpOperator::UpperAll),
            (",,", ExpOperator::LowerAll),
        ];
        const ONE: &[(&str, ExpOperator)] = &[
            ("+", ExpOperator::AlternateUnset),
            ("-", ExpOperator::DefaultUnset),
            ("?", ExpOperator::ErrorUnset),
            ("=", ExpOperator::AssignUnset),
            ("%", ExpOperator::RemSmallSuffix),
            ("#", ExpOperator::RemSmallPrefix),
            ("^", ExpOperator::UpperFirst),
            (",", ExpOperator::LowerFirst),
        ];
        for (text, op) in TWO {
            if s.starts_with(text) {
                return Some((*op, 2));
            }
        }
        for (text, op) in ONE {
            if s.starts_with(text) {
                return Some((*op, 1));
            }
        }
        None
    }
}

impl fmt::Display for ExpOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::AlternateUnset => "+",
            Self::AlternateUnsetOrNull => ":+",
            Self::DefaultUnset => "-",
            Self::DefaultUnsetOrNull => ":-",
            Self::ErrorUnset => "?",
            Self::ErrorUnsetOrNull => ":?",
            Self::AssignUnset => "=",
            Self::AssignUnsetOrNull => ":=",
            Self::RemSmallSuffix => "%",
            Self::RemLargeSuffix => "%%",
            Self::RemSmallPrefix => "#",
            Self::RemLargePrefix => "##",
            Self::UpperFirst => "^",
            Self::UpperAll => "^^",
            Self::LowerFirst => ",",
            Self::LowerAll => ",,",
        };
        write!(f, "{}", s)
    }
}

/// Command substitution: `$(...)` or backquotes.
#[derive(Debug, Clone, PartialEq)]
pub struct CmdSubst {
    pub stmts: Vec<Stmt>,
    /// mksh `${ foo; }`.
    pub temp_file: bool,
    /// mksh `${|foo;}`.
    pub reply_var: bool,
    pub left: Pos,
    pub right: Pos,
    pub pos: Pos,
    pub end: Pos,
}

/// Arithmetic expansion: `$(( expr ))`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArithmExp {
    /// Deprecated `$[ expr ]` form.
    pub bracket: bool,
    pub unsigned: bool,
    pub x: Option<Box<ArithmExpr>>,
    pub left: Pos,
    pub right: Pos,
    pub pos: Pos,
    pub end: Pos,
}

// =============================================================================
// TEST EXPRESSIONS
// =============================================================================

/// Union of test expression kinds inside `[[ ]]`.
#[derive(Debug, Clone, PartialEq)]
pub enum TestExpr {
    Binary(Box<BinaryTest>),
    Unary(Box<UnaryTest>),
    Paren(Box<ParenTest>),
    Word(Word),
}

impl TestExpr {
    pub fn pos(&self) -> Pos {
        match self {
            Self::Binary(n) => n.pos,
            Self::Unary(n) => n.pos,
            Self::Paren(n) => n.pos,
            Self::Word(n) => n.pos,
        }
    }

    pub fn end(&self) -> Pos {
        match self {
            Self::Binary(n) => n.end,
            Self::Unary(n) => n.end,
            Self::Paren(n) => n.end,
            Self::Word(n) => n.end,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryTest {
    pub op: BinTestOp,
    pub op_pos: Pos,
    pub x: TestExpr,
    pub y: TestExpr,
    pub pos: Pos,
    pub end: Pos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinTestOp {
    And,   // &&
    Or,    // ||
    Match, // =~
    EqEq,  // == (also accepts =)
    Ne,    // !=
    Lt,    // <
    Gt,    // >
    NumEq, // -eq
    NumNe, // -ne
    NumLt, // -lt
    NumLe, // -le
    NumGt, // -gt
    NumGe, // -ge
    Nt,    // -nt
    Ot,    // -ot
    Ef,    // -ef
}

impl BinTestOp {
    pub fn from_token(s: &str) -> Option<Self> {
        Some(match s {
            "=~" => Self::Match,
            "==" | "=" => Self::EqEq,
            "!=" => Self::Ne,
            "<" => Self::Lt,
            ">" => Self::Gt,
            "-eq" => Self::NumEq,
            "-ne" => Self::NumNe,
            "-lt" => Self::NumLt,
            "-le" => Self::NumLe,
            "-gt" => Self::NumGt,
            "-ge" => Self::NumGe,
            "-nt" => Self::Nt,
            "-ot" => Self::Ot,
            "-ef" => Self::Ef,
            _ => return None,
        })
    }
}

impl fmt::Display for BinTestOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::And => "&&",
            Self::Or => "||",
            Self::Match => "=~",
            Self::EqEq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::NumEq => "-eq",
            Self::NumNe => "-ne",
            Self::NumLt => "-lt",
            Self::NumLe => "-le",
            Self::NumGt => "-gt",
            Self::NumGe => "-ge",
            Self::Nt => "-nt",
            Self::Ot => "-ot",
            Self::Ef => "-ef",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryTest {
    pub op: UnTestOp,
    pub op_pos: Pos,
    pub x: TestExpr,
    pub pos: Pos,
    pub end: Pos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnTestOp {
    Not,          // !
    Exists,       // -e
    RegFile,      // -f
    Dir,          // -d
    CharSpecial,  // -c
    BlockSpecial, // -b
    NamedPipe,    // -p
    Socket,       // -S
    Symlink,      // -L
    Sticky,       // -k
    GidSet,       // -g
    UidSet,       // -u
    GroupOwned,   // -G
    UserOwned,    // -O
    Modified,     // -N
    Readable,     // -r
    Writable,     // -w
    Executable,   // -x
    NonEmptyFile, // -s
    FdTerminal,   // -t
    EmptyStr,     // -z
    NonEmptyStr,  // -n
    OptSet,       // -o
    VarSet,       // -v
}

impl UnTestOp {
    pub fn from_token(s: &str) -> Option<Self> {
        Some(match s {
            "!" => Self::Not,
            "-e" => Self::Exists,
            "-f" => Self::RegFile,
            "-d" => Self::Dir,
            "-c" => Self::CharSpecial,
            "-b" => Self::BlockSpecial,
            "-p" => Self::NamedPipe,
            "-S" => Self::Socket,
            "-L" | "-h" => Self::Symlink,
            "-k" => Self::Sticky,
            "-g" => Self::GidSet,
            "-u" => Self::UidSet,
            "-G" => Self::GroupOwned,
            "-O" => Self::UserOwned,
            "-N" => Self::Modified,
            "-r" => Self::Readable,
            "-w" => Self::Writable,
            "-x" => Self::Executable,
            "-s" => Self::NonEmptyFile,
            "-t" => Self::FdTerminal,
            "-z" => Self::EmptyStr,
            "-n" => Self::NonEmptyStr,
            "-o" => Self::OptSet,
            "-v" => Self::VarSet,
            _ => return None,
        })
    }
}

impl fmt::Display for UnTestOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Not => "!",
            Self::Exists => "-e",
            Self::RegFile => "-f",
            Self::Dir => "-d",
            Self::CharSpecial => "-c",
            Self::BlockSpecial => "-b",
            Self::NamedPipe => "-p",
            Self::Socket => "-S",
            Self::Symlink => "-L",
            Self::Sticky => "-k",
            Self::GidSet => "-g",
            Self::UidSet => "-u",
            Self::GroupOwned => "-G",
            Self::UserOwned => "-O",
            Self::Modified => "-N",
            Self::Readable => "-r",
            Self::Writable => "-w",
            Self::Executable => "-x",
            Self::NonEmptyFile => "-s",
            Self::FdTerminal => "-t",
            Self::EmptyStr => "-z",
            Self::NonEmptyStr => "-n",
            Self::OptSet => "-o",
            Self::VarSet => "-v",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParenTest {
    pub x: TestExpr,
    pub pos: Pos,
    pub end: Pos,
}

// =============================================================================
// ARITHMETIC EXPRESSIONS
// =============================================================================

/// Union of arithmetic expression kinds.
///
/// The recognizer captures arithmetic bodies as opaque words; the binary,
/// unary and parenthesized forms exist so that trees built by other
/// producers of this AST still flatten without loss of span information.
#[derive(Debug, Clone, PartialEq)]
pub enum ArithmExpr {
    Binary(Box<BinaryArithm>),
    Unary(Box<UnaryArithm>),
    Paren(Box<ParenArithm>),
    Word(Word),
}

impl ArithmExpr {
    pub fn pos(&self) -> Pos {
        match self {
            Self::Binary(n) => n.pos,
            Self::Unary(n) => n.pos,
            Self::Paren(n) => n.pos,
            Self::Word(n) => n.pos,
        }
    }

    pub fn end(&self) -> Pos {
        match self {
            Self::Binary(n) => n.end,
            Self::Unary(n) => n.end,
            Self::Paren(n) => n.end,
            Self::Word(n) => n.end,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryArithm {
    pub op: String,
    pub op_pos: Pos,
    pub x: ArithmExpr,
    pub y: ArithmExpr,
    pub pos: Pos,
    pub end: Pos,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryArithm {
    pub op: String,
    /// Postfix, as in `i++`.
    pub post: bool,
    pub x: ArithmExpr,
    pub pos: Pos,
    pub end: Pos,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParenArithm {
    pub x: ArithmExpr,
    pub pos: Pos,
    pub end: Pos,
}

// =============================================================================
// LOOP HEADERS
// =============================================================================

/// Union of `for` loop headers.
#[derive(Debug, Clone, PartialEq)]
pub enum Loop {
    WordIter(WordIter),
    CStyle(CStyleLoop),
}

impl Loop {
    pub fn pos(&self) -> Pos {
        match self {
            Self::WordIter(n) => n.pos,
            Self::CStyle(n) => n.pos,
        }
    }

    pub fn end(&self) -> Pos {
        match self {
            Self::WordIter(n) => n.end,
            Self::CStyle(n) => n.end,
        }
    }
}

/// `for name in items`.
#[derive(Debug, Clone, PartialEq)]
pub struct WordIter {
    pub name: Lit,
    pub items: Vec<Word>,
    pub pos: Pos,
    pub end: Pos,
}

/// `for ((init; cond; post))`.
#[derive(Debug, Clone, PartialEq)]
pub struct CStyleLoop {
    pub init: Option<ArithmExpr>,
    pub cond: Option<ArithmExpr>,
    pub post: Option<ArithmExpr>,
    pub pos: Pos,
    pub end: Pos,
}
