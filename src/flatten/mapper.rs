//! Node Tagger & Tree Mapper
//!
//! Converts the recursive syntax tree into the uniform tagged shape,
//! bottom-up. One function per node family dispatches exhaustively on the
//! concrete variant; node kinds the output layer does not model fall back
//! to the span-only `Unhandled` tag instead of failing. Absent child nodes
//! stay absent (`Option` maps through), and child sequences are mapped in
//! order without deduplication.

use crate::syntax::ast;

use super::pos::map_pos;
use super::types::{
    ArithmCmd, ArithmExprNode, ArrayElem, ArrayExpr, Assign, BinaryCmd, BinaryTest, Block,
    CStyleLoop, CallExpr, CaseClause, CaseItem, CmdSubst, CommandNode, Comment, CoprocClause,
    DblQuoted, DeclClause, Expansion, File, ForClause, FuncDecl, IfClause, LetClause, Lit,
    LoopNode, ParamExp, ParenTest, Redirect, Replace, SglQuoted, Slice, Stmt, Subshell,
    TestClause, TestExprNode, TimeClause, UnaryTest, Unhandled, WhileClause, Word, WordIter,
    WordPartNode,
};

fn unhandled(pos: ast::Pos, end: ast::Pos) -> Unhandled {
    Unhandled {
        r#type: "Unhandled",
        pos: map_pos(pos),
        end: map_pos(end),
    }
}

/// Map a whole syntax tree into one tagged file.
pub fn map_file(file: &ast::File) -> File {
    File {
        r#type: "File",
        name: file.name.clone(),
        stmts: map_stmts(&file.stmts),
        last: map_comments(&file.last),
        pos: map_pos(file.pos),
        end: map_pos(file.end),
    }
}

pub fn map_stmts(stmts: &[ast::Stmt]) -> Vec<Stmt> {
    stmts.iter().map(map_stmt).collect()
}

pub fn map_stmt(stmt: &ast::Stmt) -> Stmt {
    Stmt {
        r#type: "Stmt",
        comments: map_comments(&stmt.comments),
        cmd: stmt.cmd.as_ref().map(map_command),
        negated: stmt.negated,
        background: stmt.background,
        coprocess: stmt.coprocess,
        redirs: map_redirects(&stmt.redirs),
        semicolon_pos: map_pos(stmt.semicolon),
        pos: map_pos(stmt.pos),
        end: map_pos(stmt.end),
    }
}

pub fn map_comments(comments: &[ast::Comment]) -> Vec<Comment> {
    comments.iter().map(map_comment).collect()
}

fn map_comment(comment: &ast::Comment) -> Comment {
    Comment {
        r#type: "Comment",
        text: comment.text.clone(),
        hash: map_pos(comment.hash),
        pos: map_pos(comment.pos),
        end: map_pos(comment.end),
    }
}

pub fn map_redirects(redirects: &[ast::Redirect]) -> Vec<Redirect> {
    redirects
        .iter()
        .map(|r| Redirect {
            r#type: "Redirect",
            op: r.op.to_string(),
            op_pos: map_pos(r.op_pos),
            n: r.n.as_ref().map(map_lit),
            word: r.word.as_ref().map(map_word),
            hdoc: r.hdoc.as_ref().map(map_word),
            pos: map_pos(r.pos),
            end: map_pos(r.end),
        })
        .collect()
}

pub fn map_lit(lit: &ast::Lit) -> Lit {
    Lit {
        r#type: "Lit",
        value: lit.value.clone(),
        value_pos: map_pos(lit.value_pos),
        value_end: map_pos(lit.value_end),
        pos: map_pos(lit.value_pos),
        end: map_pos(lit.value_end),
    }
}

pub fn map_word(word: &ast::Word) -> Word {
    Word {
        r#type: "Word",
        parts: word.parts.iter().map(map_word_part).collect(),
        pos: map_pos(word.pos),
        end: map_pos(word.end),
    }
}

pub fn map_words(words: &[ast::Word]) -> Vec<Word> {
    words.iter().map(map_word).collect()
}

/// Tag one word part. Arithmetic expansion is not modeled on the output
/// side; its span survives through the fallback.
pub fn map_word_part(part: &ast::WordPart) -> WordPartNode {
    match part {
        ast::WordPart::Lit(n) => WordPartNode::Lit(map_lit(n)),
        ast::WordPart::SglQuoted(n) => WordPartNode::SglQuoted(SglQuoted {
            r#type: "SglQuoted",
            dollar: n.dollar,
            value: n.value.clone(),
            left: map_pos(n.left),
            right: map_pos(n.right),
            pos: map_pos(n.pos),
            end: map_pos(n.end),
        }),
        ast::WordPart::DblQuoted(n) => WordPartNode::DblQuoted(DblQuoted {
            r#type: "DblQuoted",
            dollar: n.dollar,
            parts: n.parts.iter().map(map_word_part).collect(),
            left: map_pos(n.left),
            right: map_pos(n.right),
            pos: map_pos(n.pos),
            end: map_pos(n.end),
        }),
        ast::WordPart::ParamExp(n) => WordPartNode::ParamExp(ParamExp {
            r#type: "ParamExp",
            short: n.short,
            excl: n.excl,
            length: n.length,
            width: n.width,
            param: map_lit(&n.param),
            index: n.index.as_deref().map(|x| Box::new(map_arithm_expr(x))),
            slice: n.slice.as_deref().map(map_slice),
            repl: n.repl.as_deref().map(map_replace),
            exp: n.exp.as_deref().map(map_expansion),
            pos: map_pos(n.pos),
            end: map_pos(n.end),
        }),
        ast::WordPart::CmdSubst(n) => WordPartNode::CmdSubst(CmdSubst {
            r#type: "CmdSubst",
            temp_file: n.temp_file,
            reply_var: n.reply_var,
            stmts: map_stmts(&n.stmts),
            pos: map_pos(n.pos),
            end: map_pos(n.end),
        }),
        ast::WordPart::ArithmExp(n) => WordPartNode::Unhandled(unhandled(n.pos, n.end)),
    }
}

fn map_slice(slice: &ast::Slice) -> Slice {
    let end = slice
        .length
        .as_ref()
        .map(|l| l.end())
        .unwrap_or_else(|| slice.offset.end());
    Slice {
        r#type: "Slice",
        offset: Box::new(map_arithm_expr(&slice.offset)),
        length: slice.length.as_ref().map(|l| Box::new(map_arithm_expr(l))),
        pos: map_pos(slice.offset.pos()),
        end: map_pos(end),
    }
}

fn map_replace(replace: &ast::Replace) -> Replace {
    let end = replace
        .with
        .as_ref()
        .map(|w| w.end)
        .unwrap_or(replace.orig.end);
    Replace {
        r#type: "Replace",
        all: replace.all,
        orig: map_word(&replace.orig),
        with: replace.with.as_ref().map(map_word),
        pos: map_pos(replace.orig.pos),
        end: map_pos(end),
    }
}

fn map_expansion(expansion: &ast::Expansion) -> Expansion {
    let (pos, end) = match &expansion.word {
        Some(word) => (word.pos, word.end),
        None => (ast::Pos::default(), ast::Pos::default()),
    };
    Expansion {
        r#type: "Expansion",
        op: expansion.op.to_string(),
        word: expansion.word.as_ref().map(map_word),
        pos: map_pos(pos),
        end: map_pos(end),
    }
}

/// Tag one test expression; every variant of the family is modeled.
pub fn map_test_expr(expr: &ast::TestExpr) -> TestExprNode {
    match expr {
        ast::TestExpr::Binary(n) => TestExprNode::Binary(BinaryTest {
            r#type: "BinaryTest",
            op: n.op.to_string(),
            op_pos: map_pos(n.op_pos),
            x: Box::new(map_test_expr(&n.x)),
            y: Box::new(map_test_expr(&n.y)),
            pos: map_pos(n.pos),
            end: map_pos(n.end),
        }),
        ast::TestExpr::Unary(n) => TestExprNode::Unary(UnaryTest {
            r#type: "UnaryTest",
            op: n.op.to_string(),
            op_pos: map_pos(n.op_pos),
            x: Box::new(map_test_expr(&n.x)),
            pos: map_pos(n.pos),
            end: map_pos(n.end),
        }),
        ast::TestExpr::Paren(n) => TestExprNode::Paren(ParenTest {
            r#type: "ParenTest",
            x: Box::new(map_test_expr(&n.x)),
            pos: map_pos(n.pos),
            end: map_pos(n.end),
        }),
        ast::TestExpr::Word(w) => TestExprNode::Word(map_word(w)),
    }
}

/// Tag one arithmetic expression. Only word operands are modeled; the
/// binary, unary and parenthesized forms keep their span via the fallback.
pub fn map_arithm_expr(expr: &ast::ArithmExpr) -> ArithmExprNode {
    match expr {
        ast::ArithmExpr::Word(w) => ArithmExprNode::Word(map_word(w)),
        other => ArithmExprNode::Unhandled(unhandled(other.pos(), other.end())),
    }
}

pub fn map_arithm_exprs(exprs: &[ast::ArithmExpr]) -> Vec<ArithmExprNode> {
    exprs.iter().map(map_arithm_expr).collect()
}

fn map_opt_arithm(expr: &Option<ast::ArithmExpr>) -> Option<Box<ArithmExprNode>> {
    expr.as_ref().map(|x| Box::new(map_arithm_expr(x)))
}

/// Tag one loop header.
pub fn map_loop(head: &ast::Loop) -> LoopNode {
    match head {
        ast::Loop::WordIter(n) => LoopNode::WordIter(WordIter {
            r#type: "WordIter",
            name: map_lit(&n.name),
            items: map_words(&n.items),
            pos: map_pos(n.pos),
            end: map_pos(n.end),
        }),
        ast::Loop::CStyle(n) => LoopNode::CStyle(CStyleLoop {
            r#type: "CStyleLoop",
            init: map_opt_arithm(&n.init),
            cond: map_opt_arithm(&n.cond),
            post: map_opt_arithm(&n.post),
            pos: map_pos(n.pos),
            end: map_pos(n.end),
        }),
    }
}

pub fn map_assigns(assigns: &[ast::Assign]) -> Vec<Assign> {
    assigns
        .iter()
        .map(|a| Assign {
            r#type: "Assign",
            append: a.append,
            naked: a.naked,
            name: a.name.as_ref().map(map_lit),
            index: a.index.as_ref().map(|x| Box::new(map_arithm_expr(x))),
            value: a.value.as_ref().map(map_word),
            array: a.array.as_ref().map(map_array),
            pos: map_pos(a.pos),
            end: map_pos(a.end),
        })
        .collect()
}

fn map_array(array: &ast::ArrayExpr) -> ArrayExpr {
    ArrayExpr {
        r#type: "ArrayExpr",
        elems: array
            .elems
            .iter()
            .map(|e| ArrayElem {
                r#type: "ArrayElem",
                index: e.index.as_ref().map(|x| Box::new(map_arithm_expr(x))),
                value: map_word(&e.value),
                comments: map_comments(&e.comments),
                pos: map_pos(e.pos),
                end: map_pos(e.end),
            })
            .collect(),
        lparen: map_pos(array.lparen),
        rparen: map_pos(array.rparen),
        pos: map_pos(array.pos),
        end: map_pos(array.end),
    }
}

fn map_case_items(items: &[ast::CaseItem]) -> Vec<CaseItem> {
    items
        .iter()
        .map(|item| CaseItem {
            r#type: "CaseItem",
            op: item.op.to_string(),
            op_pos: map_pos(item.op_pos),
            patterns: map_words(&item.patterns),
            stmts: map_stmts(&item.stmts),
            comments: map_comments(&item.comments),
            pos: map_pos(item.pos),
            end: map_pos(item.end),
        })
        .collect()
}

fn map_if_clause(clause: &ast::IfClause) -> IfClause {
    IfClause {
        r#type: "IfClause",
        cond: map_stmts(&clause.cond),
        then: map_stmts(&clause.then),
        r#else: clause
            .else_branch
            .as_deref()
            .map(|branch| Box::new(map_if_clause(branch))),
        then_pos: map_pos(clause.then_pos),
        fi_pos: map_pos(clause.fi_pos),
        cond_last: map_comments(&clause.cond_last),
        then_last: map_comments(&clause.then_last),
        last: map_comments(&clause.last),
        pos: map_pos(clause.pos),
        end: map_pos(clause.end),
    }
}

/// Tag one command node; the family is a closed set, so the dispatch is
/// exhaustive by construction.
pub fn map_command(cmd: &ast::Command) -> CommandNode {
    match cmd {
        ast::Command::Call(n) => CommandNode::Call(CallExpr {
            r#type: "CallExpr",
            assigns: map_assigns(&n.assigns),
            args: map_words(&n.args),
            pos: map_pos(n.pos),
            end: map_pos(n.end),
        }),
        ast::Command::Binary(n) => CommandNode::Binary(BinaryCmd {
            r#type: "BinaryCmd",
            op: n.op.to_string(),
            op_pos: map_pos(n.op_pos),
            x: Box::new(map_stmt(&n.x)),
            y: Box::new(map_stmt(&n.y)),
            pos: map_pos(n.pos),
            end: map_pos(n.end),
        }),
        ast::Command::Block(n) => CommandNode::Block(Block {
            r#type: "Block",
            stmts: map_stmts(&n.stmts),
            lbrace: map_pos(n.lbrace),
            rbrace: map_pos(n.rbrace),
            pos: map_pos(n.pos),
            end: map_pos(n.end),
        }),
        ast::Command::Subshell(n) => CommandNode::Subshell(Subshell {
            r#type: "Subshell",
            stmts: map_stmts(&n.stmts),
            pos: map_pos(n.pos),
            end: map_pos(n.end),
        }),
        ast::Command::If(n) => CommandNode::If(map_if_clause(n)),
        ast::Command::While(n) => CommandNode::While(WhileClause {
            r#type: "WhileClause",
            until: n.until,
            cond: map_stmts(&n.cond),
            r#do: map_stmts(&n.body),
            while_pos: map_pos(n.while_pos),
            do_pos: map_pos(n.do_pos),
            done_pos: map_pos(n.done_pos),
            pos: map_pos(n.pos),
            end: map_pos(n.end),
        }),
        ast::Command::For(n) => CommandNode::For(ForClause {
            r#type: "ForClause",
            select: n.select,
            r#loop: map_loop(&n.head),
            r#do: map_stmts(&n.body),
            pos: map_pos(n.pos),
            end: map_pos(n.end),
        }),
        ast::Command::Case(n) => CommandNode::Case(CaseClause {
            r#type: "CaseClause",
            word: map_word(&n.word),
            items: map_case_items(&n.items),
            last: map_comments(&n.last),
            pos: map_pos(n.pos),
            end: map_pos(n.end),
        }),
        ast::Command::FuncDecl(n) => CommandNode::FuncDecl(FuncDecl {
            r#type: "FuncDecl",
            rsrv_word: n.rsrv_word,
            name: map_lit(&n.name),
            body: Box::new(map_stmt(&n.body)),
            pos: map_pos(n.pos),
            end: map_pos(n.end),
        }),
        ast::Command::Test(n) => CommandNode::Test(TestClause {
            r#type: "TestClause",
            x: Box::new(map_test_expr(&n.x)),
            pos: map_pos(n.pos),
            end: map_pos(n.end),
        }),
        ast::Command::ArithmCmd(n) => CommandNode::Arithm(ArithmCmd {
            r#type: "ArithmCmd",
            unsigned: n.unsigned,
            x: map_opt_arithm(&n.x),
            left: map_pos(n.left),
            right: map_pos(n.right),
            pos: map_pos(n.pos),
            end: map_pos(n.end),
        }),
        ast::Command::Decl(n) => CommandNode::Decl(DeclClause {
            r#type: "DeclClause",
            variant: map_lit(&n.variant),
            args: map_assigns(&n.args),
            pos: map_pos(n.pos),
            end: map_pos(n.end),
        }),
        ast::Command::Let(n) => CommandNode::Let(LetClause {
            r#type: "LetClause",
            exprs: map_arithm_exprs(&n.exprs),
            pos: map_pos(n.pos),
            end: map_pos(n.end),
        }),
        ast::Command::Time(n) => CommandNode::Time(TimeClause {
            r#type: "TimeClause",
            posix_format: n.posix_format,
            stmt: n.stmt.as_deref().map(|s| Box::new(map_stmt(s))),
            pos: map_pos(n.pos),
            end: map_pos(n.end),
        }),
        ast::Command::Coproc(n) => CommandNode::Coproc(CoprocClause {
            r#type: "CoprocClause",
            name: n.name.as_ref().map(map_word),
            stmt: Box::new(map_stmt(&n.stmt)),
            pos: map_pos(n.pos),
            end: map_pos(n.end),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{parse, ParserOptions};
    use serde_json::Value;

    fn mapped(src: &str) -> File {
        let options = ParserOptions {
            keep_comments: true,
            ..Default::default()
        };
        let (file, err) = parse(src, "test.sh", &options);
        assert!(err.is_none(), "unexpected error: {:?}", err);
        map_file(&file)
    }

    fn to_value(src: &str) -> Value {
        serde_json::to_value(mapped(src)).expect("serialization failed")
    }

    /// Walk every object in the serialized tree.
    fn walk(value: &Value, check: &mut dyn FnMut(&serde_json::Map<String, Value>)) {
        match value {
            Value::Object(map) => {
                check(map);
                for child in map.values() {
                    walk(child, check);
                }
            }
            Value::Array(items) => {
                for item in items {
                    walk(item, check);
                }
            }
            _ => {}
        }
    }

    #[test]
    fn test_file_is_tagged() {
        let value = to_value("echo hi");
        assert_eq!(value["type"], "File");
        assert_eq!(value["name"], "test.sh");
        assert_eq!(value["stmts"][0]["type"], "Stmt");
        assert_eq!(value["stmts"][0]["cmd"]["type"], "CallExpr");
    }

    #[test]
    fn test_every_node_has_nonempty_discriminant() {
        let value = to_value(
            "x=1 a=(1 2) cmd arg <in >out 2>err\n\
             if a; then b; elif c; then d; else e; fi\n\
             for i in 1 2; do echo ${i:-0}; done\n\
             while [[ -f x && a == b ]]; do (sub); done\n\
             case $x in a|b) y;; esac\n\
             f() { time grep x | sort; }\n\
             declare -i n=$((1 + 2))\n\
             let n+=1 & coproc w { cat; }\n",
        );
        let mut count = 0;
        walk(&value, &mut |map| {
            if let Some(t) = map.get("type") {
                count += 1;
                assert!(
                    t.as_str().map(|s| !s.is_empty()).unwrap_or(false),
                    "empty type discriminant in {:?}",
                    map
                );
            }
        });
        assert!(count > 40, "expected a rich tree, saw {} nodes", count);
    }

    #[test]
    fn test_end_offsets_are_monotonic() {
        let value = to_value(
            "if a; then b; fi\nfor x in 1 2; do echo \"$x${y:-d}\"; done\ncat <<EOF\nbody\nEOF\n",
        );
        walk(&value, &mut |map| {
            if let (Some(pos), Some(end)) = (map.get("pos"), map.get("end")) {
                let pos_offset = pos["offset"].as_u64().unwrap();
                let end_offset = end["offset"].as_u64().unwrap();
                assert!(
                    end_offset >= pos_offset,
                    "end {} before pos {} in {:?}",
                    end_offset,
                    pos_offset,
                    map
                );
            }
        });
    }

    #[test]
    fn test_statements_keep_source_order() {
        let value = to_value("a; b; c");
        let stmts = value["stmts"].as_array().unwrap();
        assert_eq!(stmts.len(), 3);
        let offsets: Vec<u64> = stmts
            .iter()
            .map(|s| s["pos"]["offset"].as_u64().unwrap())
            .collect();
        assert!(offsets[0] < offsets[1] && offsets[1] < offsets[2]);
    }

    #[test]
    fn test_absent_else_is_null() {
        let value = to_value("if a; then b; fi");
        assert!(value["stmts"][0]["cmd"]["else"].is_null());
    }

    #[test]
    fn test_present_else_is_if_clause() {
        let value = to_value("if a; then b; else c; fi");
        let els = &value["stmts"][0]["cmd"]["else"];
        assert_eq!(els["type"], "IfClause");
        assert_eq!(els["cond"].as_array().unwrap().len(), 0);
        assert_eq!(els["then"].as_array().unwrap().len(), 1);
        assert!(els["else"].is_null());
    }

    #[test]
    fn test_empty_sequences_stay_arrays() {
        let value = to_value("echo hi");
        let stmt = &value["stmts"][0];
        assert!(stmt["redirs"].as_array().unwrap().is_empty());
        assert!(stmt["comments"].as_array().unwrap().is_empty());
        assert!(value["last"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_word_parts_keep_concatenation_order() {
        let value = to_value("echo pre'mid'$post");
        let parts = value["stmts"][0]["cmd"]["args"][1]["parts"]
            .as_array()
            .unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0]["type"], "Lit");
        assert_eq!(parts[1]["type"], "SglQuoted");
        assert_eq!(parts[2]["type"], "ParamExp");
    }

    #[test]
    fn test_arithmetic_expansion_falls_back_to_unhandled() {
        let value = to_value("echo $((1 + 2))");
        let part = &value["stmts"][0]["cmd"]["args"][1]["parts"][0];
        assert_eq!(part["type"], "Unhandled");
        let pos = part["pos"]["offset"].as_u64().unwrap();
        let end = part["end"]["offset"].as_u64().unwrap();
        assert_eq!(pos, 5);
        assert_eq!(end, 15);
    }

    #[test]
    fn test_unmodeled_arithmetic_variants_fall_back_to_unhandled() {
        use crate::syntax::ast::{ArithmExpr, BinaryArithm, Lit as AstLit, Pos, Word as AstWord, WordPart};

        let lit = |value: &str, at: usize| {
            ArithmExpr::Word(AstWord {
                parts: vec![WordPart::Lit(AstLit {
                    value: value.into(),
                    value_pos: Pos::new(at, 1, at + 1),
                    value_end: Pos::new(at + 1, 1, at + 2),
                })],
                pos: Pos::new(at, 1, at + 1),
                end: Pos::new(at + 1, 1, at + 2),
            })
        };
        let expr = ArithmExpr::Binary(Box::new(BinaryArithm {
            op: "+".into(),
            op_pos: Pos::new(2, 1, 3),
            x: lit("1", 0),
            y: lit("2", 4),
            pos: Pos::new(0, 1, 1),
            end: Pos::new(5, 1, 6),
        }));

        match map_arithm_expr(&expr) {
            ArithmExprNode::Unhandled(node) => {
                assert_eq!(node.r#type, "Unhandled");
                assert_eq!(node.pos.offset, 0);
                assert_eq!(node.end.offset, 5);
            }
            other => panic!("expected fallback, got {:?}", other),
        }
    }

    #[test]
    fn test_test_expr_word_is_fully_mapped() {
        let value = to_value("[[ word ]]");
        let x = &value["stmts"][0]["cmd"]["x"];
        assert_eq!(x["type"], "Word");
        assert_eq!(x["parts"][0]["value"], "word");
    }

    #[test]
    fn test_redirect_shape() {
        let value = to_value("cmd 2>err <<EOF\nbody\nEOF\n");
        let redirs = value["stmts"][0]["redirs"].as_array().unwrap();
        assert_eq!(redirs[0]["op"], ">");
        assert_eq!(redirs[0]["n"]["value"], "2");
        assert_eq!(redirs[1]["op"], "<<");
        assert_eq!(redirs[1]["hdoc"]["parts"][0]["value"], "body\n");
        assert!(redirs[0]["hdoc"].is_null());
    }

    #[test]
    fn test_comments_survive_with_hash_position() {
        let value = to_value("# top\necho hi\n");
        let comment = &value["stmts"][0]["comments"][0];
        assert_eq!(comment["type"], "Comment");
        assert_eq!(comment["text"], " top");
        assert_eq!(comment["hash"]["offset"], 0);
    }

    #[test]
    fn test_loop_headers() {
        let value = to_value("for x in a b; do :; done\nfor ((i = 0; ; i++)); do :; done\n");
        let first = &value["stmts"][0]["cmd"]["loop"];
        assert_eq!(first["type"], "WordIter");
        assert_eq!(first["items"].as_array().unwrap().len(), 2);
        let second = &value["stmts"][1]["cmd"]["loop"];
        assert_eq!(second["type"], "CStyleLoop");
        assert!(second["cond"].is_null());
        assert!(!second["init"].is_null());
        assert!(!second["post"].is_null());
    }

    #[test]
    fn test_camel_case_field_names() {
        let value = to_value("a=1; time -p x |& y");
        let stmt = &value["stmts"][0];
        assert!(stmt.get("semicolonPos").is_some());
        let time_cmd = &value["stmts"][1]["cmd"];
        assert_eq!(time_cmd["type"], "TimeClause");
        assert_eq!(time_cmd["posixFormat"], true);
        assert_eq!(time_cmd["stmt"]["cmd"]["type"], "BinaryCmd");
        assert_eq!(time_cmd["stmt"]["cmd"]["op"], "|&");
        assert!(time_cmd["stmt"]["cmd"].get("opPos").is_some());
    }
}
