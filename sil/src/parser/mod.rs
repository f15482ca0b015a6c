//! Parser: token stream to statement tree
//!
//! A single left-to-right pass. Unquoted words accumulate in a buffer and
//! become identifiers when whitespace or a bracket ends them. A newline
//! closes the current expression and appends it as a statement to the
//! innermost open block.

#[cfg(test)]
mod tests;

use crate::ast::{Expression, Span, Statement};
use crate::error::{Result, SilError};
use crate::ident::{Arena, Identifier};
use crate::interp::INDEX_OPERATOR;
use crate::lexer::{Token, tokenize};
use std::borrow::Cow;

/// What opened a nested expression group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Opener {
    Paren,
    /// `target !! (...)` built for `target[...]`
    Index,
    /// the `(...)` inside an index
    IndexArgs,
}

impl Opener {
    fn open(self) -> &'static str {
        match self {
            Opener::Paren => "(",
            Opener::Index | Opener::IndexArgs => "[",
        }
    }

    fn close(self) -> &'static str {
        match self {
            Opener::Paren => ")",
            Opener::Index | Opener::IndexArgs => "]",
        }
    }
}

/// Parse source into its root block. Every literal and name becomes an
/// arena slot.
pub fn parse(source: &str, arena: &mut Arena) -> Result<Statement> {
    let source: Cow<'_, str> = if source.ends_with('\n') {
        Cow::Borrowed(source)
    } else {
        Cow::Owned(format!("{source}\n"))
    };
    let tokens = tokenize(&source)?;
    let mut parser = Parser::new(&source, arena);
    for (token, span) in tokens {
        parser.token(token, span)?;
    }
    parser.finish()
}

struct Parser<'a> {
    source: &'a str,
    arena: &'a mut Arena,
    /// unquoted word being accumulated
    word: Option<(String, Span)>,
    /// expression of the current line
    line: Expression,
    nested: Vec<(Expression, Opener, Span)>,
    root: Statement,
    blocks: Vec<(Statement, Span)>,
    /// span of a string literal that must be followed by whitespace
    after_quote: Option<Span>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, arena: &'a mut Arena) -> Self {
        Parser {
            source,
            arena,
            word: None,
            line: Expression::default(),
            nested: Vec::new(),
            root: Statement::default(),
            blocks: Vec::new(),
            after_quote: None,
        }
    }

    fn error(&self, message: impl Into<String>, span: Span) -> SilError {
        SilError::syntax(message, span, self.source)
    }

    fn token(&mut self, token: Token, span: Span) -> Result<()> {
        if let Some(quote) = self.after_quote.take()
            && !matches!(token, Token::Space | Token::Newline | Token::LineContinuation)
        {
            return Err(self.error("No space after string sequence", quote.merge(span)));
        }

        match token {
            Token::Word(word) => self.append(&word, span),
            Token::Escaped(c) => self.append(c.encode_utf8(&mut [0; 4]), span),
            Token::Space | Token::LineContinuation => self.flush(),
            Token::Newline => self.end_line()?,
            Token::DoubleQuoted(text) | Token::SingleQuoted(text) => {
                self.flush();
                self.push_leaf(Identifier::string(text));
                self.after_quote = Some(span);
            }
            Token::LParen => {
                self.flush();
                self.nested.push((Expression::default(), Opener::Paren, span));
            }
            Token::RParen => {
                self.flush();
                self.close(Opener::Paren, span)?;
            }
            Token::LBracket => self.open_index(span)?,
            Token::RBracket => {
                self.flush();
                self.close(Opener::IndexArgs, span)?;
                self.close(Opener::Index, span)?;
            }
            Token::LBrace => self.open_block(span)?,
            Token::RBrace => self.close_block(span)?,
        }
        Ok(())
    }

    fn append(&mut self, text: &str, span: Span) {
        match &mut self.word {
            Some((buffer, buffer_span)) => {
                buffer.push_str(text);
                *buffer_span = buffer_span.merge(span);
            }
            None => self.word = Some((text.to_string(), span)),
        }
    }

    /// Innermost open expression
    fn top(&mut self) -> &mut Expression {
        match self.nested.last_mut() {
            Some((expr, _, _)) => expr,
            None => &mut self.line,
        }
    }

    fn current_block(&mut self) -> &mut Statement {
        match self.blocks.last_mut() {
            Some((block, _)) => block,
            None => &mut self.root,
        }
    }

    fn push_leaf(&mut self, ident: Identifier) {
        let handle = self.arena.push(ident);
        self.top().push(Expression::leaf(handle));
    }

    fn flush(&mut self) {
        if let Some((word, _)) = self.word.take() {
            self.push_leaf(Identifier::from_text(&word));
        }
    }

    fn close(&mut self, expected: Opener, span: Span) -> Result<()> {
        match self.nested.pop() {
            Some((expr, opener, _)) if opener == expected => {
                self.top().push(expr);
                Ok(())
            }
            _ => Err(self.error(format!("unmatched '{}'", expected.close()), span)),
        }
    }

    /// `target[` starts `target !! (`; the target is the pending word or,
    /// failing that, the previous sibling
    fn open_index(&mut self, span: Span) -> Result<()> {
        let target = match self.word.take() {
            Some((word, _)) => Expression::leaf(self.arena.push(Identifier::from_text(&word))),
            None => match self.top().pop() {
                Some(expr) => expr,
                None => return Err(self.error("'[' without an indexed expression", span)),
            },
        };
        let operator = Expression::leaf(self.arena.push(Identifier::from_text(INDEX_OPERATOR)));
        self.nested.push((Expression::group(vec![target, operator]), Opener::Index, span));
        self.nested.push((Expression::default(), Opener::IndexArgs, span));
        Ok(())
    }

    fn ensure_no_open_group(&self) -> Result<()> {
        match self.nested.last() {
            Some((_, opener, span)) => Err(self.error(
                format!("'{}' not closed before end of line", opener.open()),
                *span,
            )),
            None => Ok(()),
        }
    }

    fn end_line(&mut self) -> Result<()> {
        self.flush();
        self.ensure_no_open_group()?;
        let line = std::mem::take(&mut self.line);
        self.current_block().push(Statement::new(line));
        Ok(())
    }

    /// The expression pending on this line becomes the block's head
    fn open_block(&mut self, span: Span) -> Result<()> {
        self.flush();
        self.ensure_no_open_group()?;
        let head = std::mem::take(&mut self.line);
        self.blocks.push((Statement::new(head), span));
        Ok(())
    }

    fn close_block(&mut self, span: Span) -> Result<()> {
        self.flush();
        self.ensure_no_open_group()?;
        let Some((mut block, _)) = self.blocks.pop() else {
            return Err(self.error("unmatched '}'", span));
        };
        let line = std::mem::take(&mut self.line);
        if !line.is_empty() {
            block.push(Statement::new(line));
        }
        self.current_block().push(block);
        Ok(())
    }

    fn finish(mut self) -> Result<Statement> {
        self.flush();
        self.ensure_no_open_group()?;
        if let Some((_, span)) = self.blocks.last() {
            return Err(self.error("'{' not closed before end of input", *span));
        }
        let line = std::mem::take(&mut self.line);
        if !line.is_empty() {
            self.root.push(Statement::new(line));
        }
        Ok(self.root)
    }
}
