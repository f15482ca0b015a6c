//! Lexer implementation using logos

mod token;

pub use token::Token;

use crate::ast::Span;
use crate::error::{Result, SilError};
use logos::Logos;

/// Tokenize source code
pub fn tokenize(source: &str) -> Result<Vec<(Token, Span)>> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);

    while let Some(result) = lexer.next() {
        let span = Span::new(lexer.span().start, lexer.span().end);
        match result {
            Ok(token) => tokens.push((token, span)),
            Err(()) => {
                let slice = lexer.slice();
                let message = if slice.starts_with(['"', '\'']) {
                    "Quotation not closed before end of line".to_string()
                } else {
                    format!("unexpected character: {slice:?}")
                };
                return Err(SilError::syntax(message, span, source));
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source).unwrap().into_iter().map(|(t, _)| t).collect()
    }

    fn word(w: &str) -> Token {
        Token::Word(w.to_string())
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").unwrap().is_empty());
    }

    #[test]
    fn test_words_and_spaces() {
        assert_eq!(
            kinds("decas x :: int\n"),
            vec![
                word("decas"),
                Token::Space,
                word("x"),
                Token::Space,
                word("::"),
                Token::Space,
                word("int"),
                Token::Newline,
            ]
        );
    }

    #[test]
    fn test_brackets_split_words() {
        assert_eq!(
            kinds("a[0](b)"),
            vec![
                word("a"),
                Token::LBracket,
                word("0"),
                Token::RBracket,
                Token::LParen,
                word("b"),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            kinds(r#""a\tb\n\"c\"\q""#),
            vec![Token::DoubleQuoted("a\tb\n\"c\"".to_string())]
        );
        assert_eq!(kinds(r"'it\'s'"), vec![Token::SingleQuoted("it's".to_string())]);
    }

    #[test]
    fn test_quote_inside_word_is_literal() {
        assert_eq!(kinds("don't"), vec![word("don't")]);
    }

    #[test]
    fn test_escape_and_continuation() {
        assert_eq!(
            kinds("a\\ b\\\nc"),
            vec![word("a"), Token::Escaped(' '), word("b"), Token::LineContinuation, word("c")]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("print \"abc\nx").unwrap_err();
        assert!(err.is_syntax());
        assert!(err.to_string().contains("line 1, col 7"));
    }
}
