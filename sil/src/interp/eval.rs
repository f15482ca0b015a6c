//! Tree-walking evaluator
//!
//! Groups are scanned right to left. A function leaf consumes the operands
//! gathered so far; an infix function that has gathered exactly one operand
//! also pulls in its left neighbour. There is no precedence table, so
//! `1 + 2 * 3` is `1 + (2 * 3)`.

use super::Interpreter;
use super::builtins::{self, Builtin};
use super::error::{InterpResult, RuntimeError};
use crate::ast::{Expression, Statement};
use crate::ident::{Callable, Handle};

/// Stack space left before growing (128KB)
const STACK_RED_ZONE: usize = 128 * 1024;
/// Size of each new stack segment (4MB)
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

/// Shape of a block or statement head
enum Head<'a> {
    If(&'a [Expression]),
    ElseIf(&'a [Expression]),
    Else,
    Loop(&'a [Expression]),
    Plain,
}

impl Interpreter {
    /// Evaluate an expression to an ordered sequence of handles
    pub fn eval(&mut self, expr: &Expression) -> InterpResult<Vec<Handle>> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || match expr {
            Expression::Leaf(handle) => Ok(vec![self.resolve_leaf(*handle)?]),
            Expression::Group(children) => self.eval_sequence(children),
        })
    }

    /// Undefined leaves are looked up by name; everything else stands for
    /// itself
    fn resolve_leaf(&mut self, handle: Handle) -> InterpResult<Handle> {
        let ident = self.arena.get(handle)?;
        if ident.is_undefined() {
            let name = ident.surface().to_string();
            self.scopes.resolve(&mut self.arena, &name)
        } else {
            Ok(handle)
        }
    }

    /// Evaluate sibling expressions as one group
    pub fn eval_sequence(&mut self, children: &[Expression]) -> InterpResult<Vec<Handle>> {
        // operands in right-to-left order
        let mut pending: Vec<Expression> = Vec::new();
        let mut i = children.len();
        while i > 0 {
            i -= 1;
            let Expression::Leaf(leaf) = children[i] else {
                pending.push(children[i].clone());
                continue;
            };
            let callee = self.resolve_leaf(leaf)?;
            let ident = self.arena.get(callee)?;
            if !ident.is_function() {
                pending.push(Expression::Leaf(callee));
                continue;
            }

            let mut args = Vec::with_capacity(pending.len() + 2);
            args.push(Expression::Leaf(callee));
            let infix = ident.is_infix() && pending.len() == 1 && i > 0;
            if infix {
                i -= 1;
                args.push(children[i].clone());
            }
            args.extend(pending.drain(..).rev());

            let results = self.call(&args, infix)?;
            pending.extend(results.into_iter().rev().map(Expression::Leaf));
        }

        let mut out = Vec::with_capacity(pending.len());
        for expr in pending.iter().rev() {
            match expr {
                Expression::Leaf(handle) => out.push(*handle),
                group => out.extend(self.eval(group)?),
            }
        }
        Ok(out)
    }

    /// Invoke `args[0]` with the remaining operands. `infix` is set when
    /// `args[1]` was pulled in from the left of the callee.
    pub fn call(&mut self, args: &[Expression], infix: bool) -> InterpResult<Vec<Handle>> {
        let callee = args
            .first()
            .and_then(Expression::handle)
            .ok_or_else(|| RuntimeError::not_callable("(group)"))?;
        let ident = self.arena.get(callee)?;
        match ident.callable().cloned() {
            Some(Callable::Builtin(builtin)) => builtins::dispatch(self, builtin, args, infix),
            Some(Callable::Native(native)) => native(self, args),
            None => Err(RuntimeError::not_callable(ident.surface())),
        }
    }

    /// Run a statement: a block runs its children in a fresh scope, anything
    /// else evaluates its head
    pub fn run(&mut self, stmt: &Statement) -> InterpResult<()> {
        let mut chain = None;
        self.run_statement(stmt, &mut chain)
    }

    /// Run top-level statements in the current scope, so their declarations
    /// outlive the call
    pub fn run_toplevel(&mut self, root: &Statement) -> InterpResult<()> {
        let mut chain = None;
        if !root.head.is_empty() {
            self.eval(&root.head)?;
        }
        for stmt in &root.body {
            self.run_statement(stmt, &mut chain)?;
        }
        Ok(())
    }

    /// Run statements in a new scope that is torn down afterwards, even if a
    /// statement fails
    fn run_scoped(&mut self, body: &[Statement]) -> InterpResult<()> {
        self.scopes.enter();
        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            let mut chain = None;
            body.iter()
                .try_for_each(|stmt| self.run_statement(stmt, &mut chain))
        });
        let teardown = self.scopes.leave(&mut self.arena);
        result.and(teardown)
    }

    /// `chain` is `Some(taken)` while an `if` / `else if` ladder is open in
    /// the enclosing block
    fn run_statement(&mut self, stmt: &Statement, chain: &mut Option<bool>) -> InterpResult<()> {
        if stmt.head.is_empty() && !stmt.is_block() {
            return Ok(());
        }
        match self.classify(&stmt.head)? {
            Head::If(cond) => {
                let taken = self.condition(cond)?;
                if taken {
                    self.run_scoped(&stmt.body)?;
                }
                *chain = Some(taken);
            }
            Head::ElseIf(cond) => {
                let done = chain.ok_or_else(RuntimeError::else_without_if)?;
                if !done {
                    let taken = self.condition(cond)?;
                    if taken {
                        self.run_scoped(&stmt.body)?;
                    }
                    *chain = Some(taken);
                }
            }
            Head::Else => {
                let done = chain.take().ok_or_else(RuntimeError::else_without_if)?;
                if !done {
                    self.run_scoped(&stmt.body)?;
                }
            }
            Head::Loop(cond) => {
                *chain = None;
                while self.condition(cond)? {
                    self.run_scoped(&stmt.body)?;
                }
            }
            Head::Plain => {
                *chain = None;
                if !stmt.head.is_empty() {
                    self.eval(&stmt.head)?;
                }
                if stmt.is_block() {
                    self.run_scoped(&stmt.body)?;
                }
            }
        }
        Ok(())
    }

    fn classify<'a>(&mut self, head: &'a Expression) -> InterpResult<Head<'a>> {
        let parts = match head {
            Expression::Leaf(_) => std::slice::from_ref(head),
            Expression::Group(children) => children.as_slice(),
        };
        let word = |interp: &mut Self, expr: Option<&Expression>| -> InterpResult<Option<Builtin>> {
            let Some(Expression::Leaf(leaf)) = expr else {
                return Ok(None);
            };
            let handle = interp.resolve_leaf(*leaf)?;
            let ident = interp.arena.get(handle)?;
            Ok(if ident.is_control() { ident.builtin() } else { None })
        };

        Ok(match word(self, parts.first())? {
            Some(Builtin::If) => Head::If(&parts[1..]),
            Some(Builtin::Loop) => Head::Loop(&parts[1..]),
            Some(Builtin::Else) => match word(self, parts.get(1))? {
                Some(Builtin::If) => Head::ElseIf(&parts[2..]),
                _ => Head::Else,
            },
            _ => Head::Plain,
        })
    }

    /// Evaluate a condition in a scope of its own, so the values it creates
    /// are gone once its truth is read. It must yield exactly one value.
    fn condition(&mut self, cond: &[Expression]) -> InterpResult<bool> {
        self.scopes.enter();
        let result = self.eval_sequence(cond).and_then(|values| {
            let [value] = values[..] else {
                return Err(RuntimeError::condition(values.len()));
            };
            self.arena.get(value)?.truthy()
        });
        let teardown = self.scopes.leave(&mut self.arena);
        let taken = result?;
        teardown?;
        Ok(taken)
    }
}
