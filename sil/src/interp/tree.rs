//! Parse tree rendering

use super::Interpreter;
use super::error::InterpResult;
use crate::ast::{Expression, Statement};
use crate::ident::Identifier;
use crate::ident::types::*;
use serde::Serialize;

const INDENT: &str = "  ";

/// A parsed statement with its leaves looked up, ready for display or
/// serialization
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TreeNode {
    Statement { expr: ExprNode },
    Block { head: ExprNode, body: Vec<TreeNode> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ExprNode {
    Identifier(LeafNode),
    #[serde(rename = "string")]
    Str(LeafNode),
    Number(LeafNode),
    Constant(LeafNode),
    Expression { children: Vec<ExprNode> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeafNode {
    #[serde(rename = "type")]
    pub ty: String,
    pub text: String,
}

impl TreeNode {
    /// Indented text form, two spaces per level
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(0, &mut out);
        out
    }

    fn render_into(&self, depth: usize, out: &mut String) {
        let indent = INDENT.repeat(depth);
        match self {
            TreeNode::Statement { expr } => {
                out.push_str(&format!("{indent}Statement:\n"));
                expr.render_into(depth + 1, out);
            }
            TreeNode::Block { head, body } => {
                out.push_str(&format!("{indent}Block:\n"));
                head.render_into(depth + 1, out);
                for child in body {
                    child.render_into(depth + 1, out);
                }
            }
        }
    }
}

impl ExprNode {
    fn render_into(&self, depth: usize, out: &mut String) {
        let indent = INDENT.repeat(depth);
        let (label, leaf) = match self {
            ExprNode::Identifier(leaf) => ("Identifier", leaf),
            ExprNode::Str(leaf) => ("String", leaf),
            ExprNode::Number(leaf) => ("Number", leaf),
            ExprNode::Constant(leaf) => ("Constant", leaf),
            ExprNode::Expression { children } => {
                out.push_str(&format!("{indent}Expression:\n"));
                for child in children {
                    child.render_into(depth + 1, out);
                }
                return;
            }
        };
        out.push_str(&format!("{indent}{label}: {}\n", leaf.text));
    }
}

fn leaf_node(ident: &Identifier) -> InterpResult<ExprNode> {
    if !ident.is_constant() {
        return Ok(ExprNode::Identifier(LeafNode {
            ty: ident.ty().to_string(),
            text: ident.surface().to_string(),
        }));
    }
    let leaf = LeafNode {
        ty: ident.ty().to_string(),
        text: ident.to_text()?,
    };
    Ok(match ident.ty() {
        STRING => ExprNode::Str(leaf),
        INT | DOUBLE => ExprNode::Number(leaf),
        _ => ExprNode::Constant(leaf),
    })
}

impl Interpreter {
    /// Look up every leaf of a parsed statement
    pub fn parse_tree(&self, stmt: &Statement) -> InterpResult<TreeNode> {
        let head = self.expression_node(&stmt.head)?;
        if !stmt.is_block() {
            return Ok(TreeNode::Statement { expr: head });
        }
        let body = stmt
            .body
            .iter()
            .map(|child| self.parse_tree(child))
            .collect::<InterpResult<Vec<_>>>()?;
        Ok(TreeNode::Block { head, body })
    }

    /// Indented text dump of a parsed statement
    pub fn statement_tree(&self, stmt: &Statement) -> InterpResult<String> {
        Ok(self.parse_tree(stmt)?.render())
    }

    fn expression_node(&self, expr: &Expression) -> InterpResult<ExprNode> {
        match expr {
            Expression::Leaf(handle) => leaf_node(self.identifier(*handle)?),
            Expression::Group(children) => {
                let children = children
                    .iter()
                    .map(|child| self.expression_node(child))
                    .collect::<InterpResult<Vec<_>>>()?;
                Ok(ExprNode::Expression { children })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_tree() {
        let mut interp = Interpreter::with_output(std::io::sink());
        let root = interp.parse("println \"hi\" 42 x").unwrap();
        let tree = interp.statement_tree(&root).unwrap();
        insta::assert_snapshot!(tree, @r"
        Block:
          Expression:
          Statement:
            Expression:
              Identifier: println
              String: hi
              Number: 42
              Identifier: x
        ");
    }

    #[test]
    fn test_json_tree() {
        let mut interp = Interpreter::with_output(std::io::sink());
        let root = interp.parse("x = 1.5").unwrap();
        let tree = interp.parse_tree(&root).unwrap();
        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(json["kind"], "block");
        let expr = &json["body"][0]["expr"];
        assert_eq!(expr["kind"], "expression");
        assert_eq!(expr["children"][0]["kind"], "identifier");
        assert_eq!(expr["children"][2]["kind"], "number");
        assert_eq!(expr["children"][2]["type"], "double");
        assert_eq!(expr["children"][2]["text"], "1.5");
    }

    #[test]
    fn test_string_leaf_kind() {
        let mut interp = Interpreter::with_output(std::io::sink());
        let root = interp.parse("print 'a'").unwrap();
        let json = serde_json::to_value(interp.parse_tree(&root).unwrap()).unwrap();
        assert_eq!(json["body"][0]["expr"]["children"][1]["kind"], "string");
    }
}
