//! Tagged Node Types
//!
//! The uniform output shape of the flattening layer. Every node carries a
//! `type` discriminant string as its first field and a start/end position
//! pair; consumers on the far side of the boundary dispatch on `type`, not
//! on structural shape. Optional child nodes serialize as `null`; child
//! sequences always serialize as arrays, empty included.

use serde::Serialize;

/// Wire position record: 0-based byte offset, 1-based line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub col: usize,
}

// =============================================================================
// FILE & STATEMENTS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct File {
    pub r#type: &'static str,
    pub name: String,
    pub stmts: Vec<Stmt>,
    pub last: Vec<Comment>,
    pub pos: Position,
    pub end: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub r#type: &'static str,
    pub text: String,
    pub hash: Position,
    pub pos: Position,
    pub end: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stmt {
    pub r#type: &'static str,
    pub comments: Vec<Comment>,
    pub cmd: Option<CommandNode>,
    pub negated: bool,
    pub background: bool,
    pub coprocess: bool,
    pub redirs: Vec<Redirect>,
    pub semicolon_pos: Position,
    pub pos: Position,
    pub end: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Redirect {
    pub r#type: &'static str,
    pub op: String,
    pub op_pos: Position,
    pub n: Option<Lit>,
    pub word: Option<Word>,
    pub hdoc: Option<Word>,
    pub pos: Position,
    pub end: Position,
}

// =============================================================================
// COMMAND FAMILY
// =============================================================================

/// One tagged command node; the discriminant lives on the inner struct.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CommandNode {
    Call(CallExpr),
    Binary(BinaryCmd),
    Block(Block),
    Subshell(Subshell),
    If(IfClause),
    While(WhileClause),
    For(ForClause),
    Case(CaseClause),
    FuncDecl(FuncDecl),
    Test(TestClause),
    Arithm(ArithmCmd),
    Decl(DeclClause),
    Let(LetClause),
    Time(TimeClause),
    Coproc(CoprocClause),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallExpr {
    pub r#type: &'static str,
    pub assigns: Vec<Assign>,
    pub args: Vec<Word>,
    pub pos: Position,
    pub end: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assign {
    pub r#type: &'static str,
    pub append: bool,
    pub naked: bool,
    pub name: Option<Lit>,
    pub index: Option<Box<ArithmExprNode>>,
    pub value: Option<Word>,
    pub array: Option<ArrayExpr>,
    pub pos: Position,
    pub end: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrayExpr {
    pub r#type: &'static str,
    pub elems: Vec<ArrayElem>,
    pub lparen: Position,
    pub rparen: Position,
    pub pos: Position,
    pub end: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrayElem {
    pub r#type: &'static str,
    pub index: Option<Box<ArithmExprNode>>,
    pub value: Word,
    pub comments: Vec<Comment>,
    pub pos: Position,
    pub end: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BinaryCmd {
    pub r#type: &'static str,
    pub op: String,
    pub op_pos: Position,
    pub x: Box<Stmt>,
    pub y: Box<Stmt>,
    pub pos: Position,
    pub end: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub r#type: &'static str,
    pub stmts: Vec<Stmt>,
    pub lbrace: Position,
    pub rbrace: Position,
    pub pos: Position,
    pub end: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subshell {
    pub r#type: &'static str,
    pub stmts: Vec<Stmt>,
    pub pos: Position,
    pub end: Position,
}

/// An `elif` or `else` branch is itself an `IfClause` under `else`; a
/// missing branch is `null`, which consumers must keep distinct from a
/// branch with an empty body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IfClause {
    pub r#type: &'static str,
    pub cond: Vec<Stmt>,
    pub then: Vec<Stmt>,
    pub r#else: Option<Box<IfClause>>,
    pub then_pos: Position,
    pub fi_pos: Position,
    pub cond_last: Vec<Comment>,
    pub then_last: Vec<Comment>,
    pub last: Vec<Comment>,
    pub pos: Position,
    pub end: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WhileClause {
    pub r#type: &'static str,
    pub until: bool,
    pub cond: Vec<Stmt>,
    pub r#do: Vec<Stmt>,
    pub while_pos: Position,
    pub do_pos: Position,
    pub done_pos: Position,
    pub pos: Position,
    pub end: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForClause {
    pub r#type: &'static str,
    pub select: bool,
    pub r#loop: LoopNode,
    pub r#do: Vec<Stmt>,
    pub pos: Position,
    pub end: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseClause {
    pub r#type: &'static str,
    pub word: Word,
    pub items: Vec<CaseItem>,
    pub last: Vec<Comment>,
    pub pos: Position,
    pub end: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseItem {
    pub r#type: &'static str,
    pub op: String,
    pub op_pos: Position,
    pub patterns: Vec<Word>,
    pub stmts: Vec<Stmt>,
    pub comments: Vec<Comment>,
    pub pos: Position,
    pub end: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FuncDecl {
    pub r#type: &'static str,
    pub rsrv_word: bool,
    pub name: Lit,
    pub body: Box<Stmt>,
    pub pos: Position,
    pub end: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestClause {
    pub r#type: &'static str,
    pub x: Box<TestExprNode>,
    pub pos: Position,
    pub end: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArithmCmd {
    pub r#type: &'static str,
    pub unsigned: bool,
    pub x: Option<Box<ArithmExprNode>>,
    pub left: Position,
    pub right: Position,
    pub pos: Position,
    pub end: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclClause {
    pub r#type: &'static str,
    pub variant: Lit,
    pub args: Vec<Assign>,
    pub pos: Position,
    pub end: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LetClause {
    pub r#type: &'static str,
    pub exprs: Vec<ArithmExprNode>,
    pub pos: Position,
    pub end: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeClause {
    pub r#type: &'static str,
    pub posix_format: bool,
    pub stmt: Option<Box<Stmt>>,
    pub pos: Position,
    pub end: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoprocClause {
    pub r#type: &'static str,
    pub name: Option<Word>,
    pub stmt: Box<Stmt>,
    pub pos: Position,
    pub end: Position,
}

// =============================================================================
// WORD FAMILY
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub r#type: &'static str,
    pub parts: Vec<WordPartNode>,
    pub pos: Position,
    pub end: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WordPartNode {
    Lit(Lit),
    SglQuoted(SglQuoted),
    DblQuoted(DblQuoted),
    ParamExp(ParamExp),
    CmdSubst(CmdSubst),
    Unhandled(Unhandled),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lit {
    pub r#type: &'static str,
    pub value: String,
    pub value_pos: Position,
    pub value_end: Position,
    pub pos: Position,
    pub end: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SglQuoted {
    pub r#type: &'static str,
    pub dollar: bool,
    pub value: String,
    pub left: Position,
    pub right: Position,
    pub pos: Position,
    pub end: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DblQuoted {
    pub r#type: &'static str,
    pub dollar: bool,
    pub parts: Vec<WordPartNode>,
    pub left: Position,
    pub right: Position,
    pub pos: Position,
    pub end: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamExp {
    pub r#type: &'static str,
    pub short: bool,
    pub excl: bool,
    pub length: bool,
    pub width: bool,
    pub param: Lit,
    pub index: Option<Box<ArithmExprNode>>,
    pub slice: Option<Slice>,
    pub repl: Option<Replace>,
    pub exp: Option<Expansion>,
    pub pos: Position,
    pub end: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Slice {
    pub r#type: &'static str,
    pub offset: Box<ArithmExprNode>,
    pub length: Option<Box<ArithmExprNode>>,
    pub pos: Position,
    pub end: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Replace {
    pub r#type: &'static str,
    pub all: bool,
    pub orig: Word,
    pub with: Option<Word>,
    pub pos: Position,
    pub end: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Expansion {
    pub r#type: &'static str,
    pub op: String,
    pub word: Option<Word>,
    pub pos: Position,
    pub end: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CmdSubst {
    pub r#type: &'static str,
    pub temp_file: bool,
    pub reply_var: bool,
    pub stmts: Vec<Stmt>,
    pub pos: Position,
    pub end: Position,
}

// =============================================================================
// TEST & ARITHMETIC FAMILIES, LOOP HEADERS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TestExprNode {
    Binary(BinaryTest),
    Unary(UnaryTest),
    Paren(ParenTest),
    Word(Word),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BinaryTest {
    pub r#type: &'static str,
    pub op: String,
    pub op_pos: Position,
    pub x: Box<TestExprNode>,
    pub y: Box<TestExprNode>,
    pub pos: Position,
    pub end: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnaryTest {
    pub r#type: &'static str,
    pub op: String,
    pub op_pos: Position,
    pub x: Box<TestExprNode>,
    pub pos: Position,
    pub end: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParenTest {
    pub r#type: &'static str,
    pub x: Box<TestExprNode>,
    pub pos: Position,
    pub end: Position,
}

/// Arithmetic operands surface either as words or as the span-only
/// fallback; the inner structure of arithmetic is not modeled here.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ArithmExprNode {
    Word(Word),
    Unhandled(Unhandled),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LoopNode {
    WordIter(WordIter),
    CStyle(CStyleLoop),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordIter {
    pub r#type: &'static str,
    pub name: Lit,
    pub items: Vec<Word>,
    pub pos: Position,
    pub end: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CStyleLoop {
    pub r#type: &'static str,
    pub init: Option<Box<ArithmExprNode>>,
    pub cond: Option<Box<ArithmExprNode>>,
    pub post: Option<Box<ArithmExprNode>>,
    pub pos: Position,
    pub end: Position,
}

/// Catch-all for node kinds the flattening layer does not model; only the
/// source span survives, so nothing is ever dropped silently.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Unhandled {
    pub r#type: &'static str,
    pub pos: Position,
    pub end: Position,
}
