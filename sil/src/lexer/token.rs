//! Token definitions

use logos::{Lexer, Logos};

/// Source token
#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Token {
    #[regex(r"[ \t\r\f]+")]
    Space,
    #[token("\n")]
    Newline,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,

    /// `\` followed by a line break joins two lines
    #[regex(r"\\\r?\n")]
    LineContinuation,
    /// `\` followed by any other character takes it literally
    #[regex(r"\\[^\n]", |lex| lex.slice().chars().nth(1))]
    Escaped(char),

    #[regex(r#""([^"\\\n]|\\[^\n])*""#, unquote)]
    DoubleQuoted(String),
    #[regex(r#"'([^'\\\n]|\\[^\n])*'"#, unquote)]
    SingleQuoted(String),

    /// Anything else up to whitespace, a bracket or a backslash. A word
    /// cannot start with a quote but may contain one.
    #[regex(r#"[^ \t\r\f\n(){}\[\]\\"'][^ \t\r\f\n(){}\[\]\\]*"#, |lex| lex.slice().to_string())]
    Word(String),
}

/// Strip the quotes and resolve escapes. Unknown escapes vanish.
fn unquote(lex: &mut Lexer<Token>) -> String {
    let slice = lex.slice();
    let inner = &slice[1..slice.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(c @ ('\\' | '"' | '\'')) => out.push(c),
            _ => {}
        }
    }
    out
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Space => write!(f, "whitespace"),
            Token::Newline => write!(f, "newline"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::LineContinuation => write!(f, "line continuation"),
            Token::Escaped(c) => write!(f, "\\{c}"),
            Token::DoubleQuoted(s) => write!(f, "\"{s}\""),
            Token::SingleQuoted(s) => write!(f, "'{s}'"),
            Token::Word(w) => write!(f, "{w}"),
        }
    }
}
