//! Expression and statement trees
//!
//! The parser builds these; the evaluator walks them. Leaves refer to
//! identifiers by arena handle, so a tree is only meaningful together with
//! the interpreter that parsed it.

mod span;

pub use span::*;

use crate::ident::Handle;

/// A leaf (one identifier) or a group of child expressions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    Leaf(Handle),
    Group(Vec<Expression>),
}

impl Default for Expression {
    fn default() -> Self {
        Expression::Group(Vec::new())
    }
}

impl Expression {
    pub fn leaf(handle: Handle) -> Self {
        Expression::Leaf(handle)
    }

    pub fn group(children: Vec<Expression>) -> Self {
        Expression::Group(children)
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Expression::Leaf(_))
    }

    pub fn handle(&self) -> Option<Handle> {
        match self {
            Expression::Leaf(h) => Some(*h),
            Expression::Group(_) => None,
        }
    }

    /// Children of a group; a leaf has none
    pub fn children(&self) -> &[Expression] {
        match self {
            Expression::Leaf(_) => &[],
            Expression::Group(children) => children,
        }
    }

    /// An empty group, as produced by a blank line
    pub fn is_empty(&self) -> bool {
        matches!(self, Expression::Group(children) if children.is_empty())
    }

    /// Append a child. A leaf is first demoted into a one-element group.
    pub fn push(&mut self, child: Expression) -> &mut Self {
        if let Expression::Leaf(h) = *self {
            *self = Expression::Group(vec![Expression::Leaf(h)]);
        }
        if let Expression::Group(children) = self {
            children.push(child);
        }
        self
    }

    /// Remove and return the last child of a group
    pub fn pop(&mut self) -> Option<Expression> {
        match self {
            Expression::Leaf(_) => None,
            Expression::Group(children) => children.pop(),
        }
    }
}

/// A head expression plus, for blocks, the statements inside the braces
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statement {
    pub head: Expression,
    pub body: Vec<Statement>,
}

impl Statement {
    pub fn new(head: Expression) -> Self {
        Statement {
            head,
            body: Vec::new(),
        }
    }

    pub fn push(&mut self, stmt: Statement) -> &mut Self {
        self.body.push(stmt);
        self
    }

    /// A statement is a block exactly when it has children
    pub fn is_block(&self) -> bool {
        !self.body.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(i: u32) -> Handle {
        Handle::from_raw(i, 0)
    }

    #[test]
    fn test_push_onto_leaf_demotes() {
        let mut e = Expression::leaf(h(1));
        e.push(Expression::leaf(h(2)));
        assert_eq!(
            e,
            Expression::group(vec![Expression::leaf(h(1)), Expression::leaf(h(2))])
        );
    }

    #[test]
    fn test_push_onto_empty_group() {
        let mut e = Expression::default();
        assert!(e.is_empty());
        e.push(Expression::leaf(h(3)));
        assert_eq!(e.children().len(), 1);
        assert!(!e.is_leaf());
    }

    #[test]
    fn test_block_iff_children() {
        let mut s = Statement::default();
        assert!(!s.is_block());
        s.push(Statement::default());
        assert!(s.is_block());
    }
}
