//! Parser tests

use crate::ast::{Expression, Statement};
use crate::ident::{Arena, Identifier, Value, types};
use crate::parser::parse;

fn parse_ok(source: &str) -> (Statement, Arena) {
    let mut arena = Arena::new();
    let root = parse(source, &mut arena).expect("parse should succeed");
    (root, arena)
}

fn parse_err(source: &str) -> crate::error::SilError {
    let mut arena = Arena::new();
    parse(source, &mut arena).expect_err("parse should fail")
}

fn leaf<'a>(arena: &'a Arena, expr: &Expression) -> &'a Identifier {
    let handle = expr.handle().expect("expected a leaf");
    arena.get(handle).unwrap()
}

/// Surface names (or string forms for constants) of a flat group
fn words(arena: &Arena, expr: &Expression) -> Vec<String> {
    expr.children()
        .iter()
        .map(|child| {
            let ident = leaf(arena, child);
            if ident.is_constant() {
                ident.to_text().unwrap()
            } else {
                ident.surface().to_string()
            }
        })
        .collect()
}

// ============================================
// Literals
// ============================================

#[test]
fn test_parse_int_literal() {
    let (root, arena) = parse_ok("42");
    let ident = leaf(&arena, &root.body[0].head.children()[0]);
    assert!(ident.is_constant());
    assert_eq!(ident.ty(), types::INT);
    assert_eq!(ident.to_text().unwrap(), "42");
}

#[test]
fn test_parse_double_literal() {
    let (root, arena) = parse_ok("3.5");
    let ident = leaf(&arena, &root.body[0].head.children()[0]);
    assert_eq!(ident.ty(), types::DOUBLE);
    assert_eq!(ident.to_text().unwrap(), "3.5");
}

#[test]
fn test_parse_strings() {
    let (root, arena) = parse_ok("print \"a b\\n\" 'c'");
    let head = &root.body[0].head;
    assert_eq!(words(&arena, head), vec!["print", "a b\n", "c"]);
    let s = leaf(&arena, &head.children()[1]);
    assert_eq!(s.ty(), types::STRING);
    assert!(matches!(s.value(), Value::Str(_)));
}

#[test]
fn test_names_stay_undefined() {
    let (root, arena) = parse_ok("decas x :: int");
    let head = &root.body[0].head;
    assert_eq!(words(&arena, head), vec!["decas", "x", "::", "int"]);
    assert!(head.children().iter().all(|c| leaf(&arena, c).is_undefined()));
}

#[test]
fn test_escaped_space_joins_word() {
    let (root, arena) = parse_ok("a\\ b c");
    assert_eq!(words(&arena, &root.body[0].head), vec!["a b", "c"]);
}

// ============================================
// Statements and blocks
// ============================================

#[test]
fn test_empty_input() {
    let (root, _) = parse_ok("");
    assert_eq!(root.body.len(), 1);
    assert!(root.body[0].head.is_empty());
}

#[test]
fn test_one_statement_per_line() {
    let (root, arena) = parse_ok("a\nb c\n");
    assert_eq!(root.body.len(), 2);
    assert_eq!(words(&arena, &root.body[1].head), vec!["b", "c"]);
}

#[test]
fn test_line_continuation() {
    let (root, arena) = parse_ok("a \\\n b");
    assert_eq!(root.body.len(), 1);
    assert_eq!(words(&arena, &root.body[0].head), vec!["a", "b"]);
}

#[test]
fn test_block_head_and_body() {
    let (root, arena) = parse_ok("if x {\nprint x\n}\n");
    let block = &root.body[0];
    assert!(block.is_block());
    assert_eq!(words(&arena, &block.head), vec!["if", "x"]);
    // the line break after `{` leaves an empty statement
    assert_eq!(block.body.len(), 2);
    assert!(block.body[0].head.is_empty());
    assert_eq!(words(&arena, &block.body[1].head), vec!["print", "x"]);
}

#[test]
fn test_closing_brace_flushes_pending_line() {
    let (root, arena) = parse_ok("{ a b }");
    let block = &root.body[0];
    assert_eq!(block.body.len(), 1);
    assert_eq!(words(&arena, &block.body[0].head), vec!["a", "b"]);
}

#[test]
fn test_else_after_closing_brace() {
    let (root, arena) = parse_ok("if c {\na\n} else {\nb\n}\n");
    assert_eq!(root.body.len(), 3);
    assert_eq!(words(&arena, &root.body[0].head), vec!["if", "c"]);
    assert_eq!(words(&arena, &root.body[1].head), vec!["else"]);
    assert!(root.body[2].head.is_empty());
}

#[test]
fn test_nested_blocks() {
    let (root, _) = parse_ok("{\n{\nx\n}\n}\n");
    let outer = &root.body[0];
    let inner = outer.body.iter().find(|s| s.is_block()).unwrap();
    assert!(inner.body.iter().any(|s| !s.head.is_empty()));
}

// ============================================
// Groups and indexing
// ============================================

#[test]
fn test_paren_group() {
    let (root, arena) = parse_ok("a (b c) d");
    let head = &root.body[0].head;
    assert_eq!(head.children().len(), 3);
    assert_eq!(words(&arena, &head.children()[1]), vec!["b", "c"]);
}

#[test]
fn test_index_sugar() {
    let (root, arena) = parse_ok("a[0]");
    let head = &root.body[0].head;
    assert_eq!(head.children().len(), 1);
    let index = &head.children()[0];
    assert_eq!(index.children().len(), 3);
    assert_eq!(leaf(&arena, &index.children()[0]).surface(), "a");
    assert_eq!(leaf(&arena, &index.children()[1]).surface(), "!!");
    assert_eq!(words(&arena, &index.children()[2]), vec!["0"]);
}

#[test]
fn test_index_previous_sibling() {
    let (root, arena) = parse_ok("(f x)[1]");
    let index = &root.body[0].head.children()[0];
    assert_eq!(words(&arena, &index.children()[0]), vec!["f", "x"]);
    assert_eq!(leaf(&arena, &index.children()[1]).surface(), "!!");
}

#[test]
fn test_chained_index() {
    let (root, arena) = parse_ok("a[0][1]");
    let outer = &root.body[0].head.children()[0];
    let inner = &outer.children()[0];
    assert_eq!(leaf(&arena, &inner.children()[0]).surface(), "a");
    assert_eq!(words(&arena, &outer.children()[2]), vec!["1"]);
}

// ============================================
// Syntax errors
// ============================================

#[test]
fn test_no_space_after_string() {
    let err = parse_err("x = 1\nprint \"a\"b");
    assert!(err.is_syntax());
    assert!(err.to_string().contains("No space after string sequence"));
    assert!(err.to_string().contains("line 2, col 7"));
}

#[test]
fn test_string_then_paren_is_error() {
    assert!(parse_err("print \"a\")").is_syntax());
}

#[test]
fn test_unterminated_quote() {
    assert!(parse_err("print 'abc\n'").is_syntax());
}

#[test]
fn test_unmatched_closers() {
    assert!(parse_err("a )").to_string().contains("unmatched ')'"));
    assert!(parse_err("a ]").to_string().contains("unmatched ']'"));
    assert!(parse_err("}").to_string().contains("unmatched '}'"));
}

#[test]
fn test_unclosed_paren_at_end_of_line() {
    let err = parse_err("(a\nb)");
    assert!(err.to_string().contains("'(' not closed"));
}

#[test]
fn test_unclosed_brace() {
    let err = parse_err("if x {\nprint x\n");
    assert!(err.to_string().contains("'{' not closed"));
}

#[test]
fn test_index_without_target() {
    assert!(parse_err("[0]").is_syntax());
}

#[test]
fn test_brace_inside_paren() {
    assert!(parse_err("(a { b })").is_syntax());
}
