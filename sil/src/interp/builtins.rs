//! Builtin table and native builtin behaviors
//!
//! Builtins are ordinary identifiers installed in the global frame of the
//! default namespace. Function builtins carry a [`Builtin`] id that is
//! resolved once at install time; calls dispatch on it with a `match`.

use super::Interpreter;
use super::error::{InterpResult, RuntimeError};
use crate::ast::Expression;
use crate::ident::types::*;
use crate::ident::{ArithOp, Callable, CmpOp, Definition, Handle, Identifier, LogicOp, Value};

/// Every natively implemented builtin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Declare,
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
    Not,
    Index,
    Print,
    Println,
    Push,
    Dump,
    Include,
    If,
    Else,
    Loop,
}

struct Entry {
    name: &'static str,
    builtin: Builtin,
    infix: bool,
    ty: &'static str,
}

const fn infix(name: &'static str, builtin: Builtin) -> Entry {
    Entry {
        name,
        builtin,
        infix: true,
        ty: ANY,
    }
}

const fn prefix(name: &'static str, builtin: Builtin) -> Entry {
    Entry {
        name,
        builtin,
        infix: false,
        ty: VOID,
    }
}

const FUNCTIONS: &[Entry] = &[
    infix("decas", Builtin::Declare),
    infix("::", Builtin::Declare),
    infix("=", Builtin::Assign),
    infix("+", Builtin::Add),
    infix("-", Builtin::Sub),
    infix("*", Builtin::Mul),
    infix("/", Builtin::Div),
    infix("+=", Builtin::AddAssign),
    infix("-=", Builtin::SubAssign),
    infix("*=", Builtin::MulAssign),
    infix("/=", Builtin::DivAssign),
    infix("==", Builtin::Eq),
    infix("!=", Builtin::Ne),
    infix("<", Builtin::Lt),
    infix(">", Builtin::Gt),
    infix("<=", Builtin::Le),
    infix(">=", Builtin::Ge),
    infix("&&", Builtin::And),
    infix("||", Builtin::Or),
    infix("!!", Builtin::Index),
    prefix("!", Builtin::Not),
    prefix("print", Builtin::Print),
    prefix("println", Builtin::Println),
    prefix("push", Builtin::Push),
    prefix("dump", Builtin::Dump),
    prefix("include", Builtin::Include),
];

const CONTROLS: &[(&str, Builtin)] = &[
    ("if", Builtin::If),
    ("else", Builtin::Else),
    ("loop", Builtin::Loop),
];

const TYPE_NAMES: &[&str] = &[INT, DOUBLE, BOOL, STRING, ARRAY, MAP];

/// Surface name of the index operator the parser emits for `a[i]`
pub const INDEX_OPERATOR: &str = "!!";

/// Install types, constants, control words and builtin functions into the
/// current frame
pub(super) fn install(interp: &mut Interpreter) {
    for name in TYPE_NAMES {
        interp.define(Identifier::type_name(name));
    }
    for (name, value) in [("true", true), ("false", false)] {
        interp.define(Identifier::boolean(value).with_surface(name));
    }
    for &(name, builtin) in CONTROLS {
        interp.define(
            Identifier::new()
                .with_surface(name)
                .with_def(Definition::Control)
                .with_type(VOID)
                .with_value(Value::Callable(Callable::Builtin(builtin))),
        );
    }
    for entry in FUNCTIONS {
        interp.define(Identifier::function(
            entry.name,
            entry.ty,
            entry.infix,
            Callable::Builtin(entry.builtin),
        ));
    }
    tracing::debug!(functions = FUNCTIONS.len(), "registered builtins");
}

/// Run a builtin. `args[0]` is the callee; `infix` is set when it pulled
/// its left neighbour.
pub(super) fn dispatch(
    interp: &mut Interpreter,
    builtin: Builtin,
    args: &[Expression],
    infix: bool,
) -> InterpResult<Vec<Handle>> {
    tracing::trace!(?builtin, operands = args.len().saturating_sub(1), "dispatch");
    match builtin {
        Builtin::Declare if infix => declare(interp, args),
        Builtin::Declare => declare_prefix(interp, args),
        Builtin::Assign => assign(interp, args),
        Builtin::Add => arithmetic(interp, ArithOp::Add, args),
        Builtin::Sub => arithmetic(interp, ArithOp::Sub, args),
        Builtin::Mul => arithmetic(interp, ArithOp::Mul, args),
        Builtin::Div => arithmetic(interp, ArithOp::Div, args),
        Builtin::AddAssign => compound(interp, ArithOp::Add, args),
        Builtin::SubAssign => compound(interp, ArithOp::Sub, args),
        Builtin::MulAssign => compound(interp, ArithOp::Mul, args),
        Builtin::DivAssign => compound(interp, ArithOp::Div, args),
        Builtin::Eq => compare(interp, CmpOp::Eq, args),
        Builtin::Ne => compare(interp, CmpOp::Ne, args),
        Builtin::Lt => compare(interp, CmpOp::Lt, args),
        Builtin::Gt => compare(interp, CmpOp::Gt, args),
        Builtin::Le => compare(interp, CmpOp::Le, args),
        Builtin::Ge => compare(interp, CmpOp::Ge, args),
        Builtin::And => logic(interp, LogicOp::And, args),
        Builtin::Or => logic(interp, LogicOp::Or, args),
        Builtin::Not => not(interp, args),
        Builtin::Index => index(interp, args),
        Builtin::Print => print(interp, args, false),
        Builtin::Println => print(interp, args, true),
        Builtin::Dump => dump(interp, args),
        Builtin::Include => include(interp, args),
        // TODO: element append once array payloads are writable through `!!`
        Builtin::Push => Ok(Vec::new()),
        // control words only act as block heads
        Builtin::If | Builtin::Else | Builtin::Loop => Ok(Vec::new()),
    }
}

/// Evaluate every operand after the callee, in order
fn operands(interp: &mut Interpreter, args: &[Expression]) -> InterpResult<Vec<Handle>> {
    let mut out = Vec::new();
    for arg in args.iter().skip(1) {
        out.extend(interp.eval(arg)?);
    }
    Ok(out)
}

/// Evaluate `args[1]` as the left side and the rest as the right side,
/// pairing them element-wise
fn pairs(interp: &mut Interpreter, args: &[Expression]) -> InterpResult<Vec<(Handle, Handle)>> {
    let left = match args.get(1) {
        Some(arg) => interp.eval(arg)?,
        None => Vec::new(),
    };
    let mut right = Vec::new();
    for arg in args.iter().skip(2) {
        right.extend(interp.eval(arg)?);
    }
    if left.len() != right.len() {
        return Err(RuntimeError::length_mismatch(left.len(), right.len()));
    }
    Ok(left.into_iter().zip(right).collect())
}

fn describe(ident: &Identifier) -> String {
    if ident.surface().is_empty() {
        format!("{} of type {}", ident.def(), ident.ty())
    } else {
        format!("{} '{}'", ident.def(), ident.surface())
    }
}

fn ensure_assignable(ident: &Identifier) -> InterpResult<()> {
    if ident.is_variable() {
        Ok(())
    } else {
        Err(RuntimeError::assign_target(ident.surface(), &ident.def().to_string()))
    }
}

/// `targets :: type`: the right side must be exactly one type name
fn declare(interp: &mut Interpreter, args: &[Expression]) -> InterpResult<Vec<Handle>> {
    let Some((last, targets)) = args.split_first().and_then(|(_, rest)| rest.split_last()) else {
        return Ok(Vec::new());
    };
    let right = interp.eval(last)?;
    let [rhs] = right[..] else {
        return Err(RuntimeError::type_arity(right.len()));
    };
    let rhs_ident = interp.identifier(rhs)?;
    if !rhs_ident.is_type() {
        return Err(RuntimeError::not_a_type(&describe(rhs_ident)));
    }
    let ty = rhs_ident.surface().to_string();

    let mut targets_out = Vec::new();
    for target in targets {
        targets_out.extend(interp.eval(target)?);
    }
    let mut declared = Vec::with_capacity(targets_out.len());
    for handle in targets_out {
        declared.push(declare_as(interp, handle, &ty)?);
    }
    Ok(declared)
}

/// Prefix `decas`, as in `decas a b :: int`.
///
/// `::` has already declared the trailing targets by the time this runs.
/// Variables declared in the current scope pass through; undefined names
/// take the type of the last of them.
fn declare_prefix(interp: &mut Interpreter, args: &[Expression]) -> InterpResult<Vec<Handle>> {
    let operands = operands(interp, args)?;
    let depth = interp.depth();
    let mut ty = None;
    for &handle in operands.iter().rev() {
        let ident = interp.identifier(handle)?;
        if ident.is_variable() && ident.scope() == depth {
            ty = Some(ident.ty().to_string());
            break;
        }
    }

    let mut declared = Vec::with_capacity(operands.len());
    for handle in operands {
        let ident = interp.identifier(handle)?;
        if ident.is_variable() && ident.scope() == depth {
            declared.push(handle);
            continue;
        }
        let Some(ty) = ty.as_deref() else {
            return Err(RuntimeError::not_a_type(&describe(ident)));
        };
        declared.push(declare_as(interp, handle, ty)?);
    }
    Ok(declared)
}

/// Declare the name behind `handle` as a variable of type `ty` in the
/// current scope
fn declare_as(interp: &mut Interpreter, handle: Handle, ty: &str) -> InterpResult<Handle> {
    let ident = interp.identifier(handle)?;
    if !(ident.is_undefined() || ident.is_variable()) {
        return Err(RuntimeError::invalid_target(&describe(ident)));
    }
    let variable = Identifier::new()
        .with_surface(ident.surface())
        .into_variable(ty, 0);
    interp.declare_identifier(variable)
}

/// Overwrite each left variable with the matching right value, cast to the
/// variable's declared type
fn assign(interp: &mut Interpreter, args: &[Expression]) -> InterpResult<Vec<Handle>> {
    let mut out = Vec::new();
    for (l, r) in pairs(interp, args)? {
        let target = interp.identifier(l)?;
        ensure_assignable(target)?;
        // element-wise array and map assignment is not supported yet
        if matches!(target.ty(), ARRAY | MAP) {
            continue;
        }
        let value = interp.identifier(r)?.cast_to(target.ty())?.value().clone();
        interp.identifier_mut(l)?.set_value(value);
        out.push(l);
    }
    Ok(out)
}

fn arithmetic(interp: &mut Interpreter, op: ArithOp, args: &[Expression]) -> InterpResult<Vec<Handle>> {
    let mut out = Vec::new();
    for (l, r) in pairs(interp, args)? {
        let result = interp.identifier(l)?.arith(op, interp.identifier(r)?)?;
        out.push(interp.push_identifier(result));
    }
    Ok(out)
}

/// `l op= r` stores `l op r` back into `l` as `l`'s type
fn compound(interp: &mut Interpreter, op: ArithOp, args: &[Expression]) -> InterpResult<Vec<Handle>> {
    let mut out = Vec::new();
    for (l, r) in pairs(interp, args)? {
        let target = interp.identifier(l)?;
        ensure_assignable(target)?;
        let value = target
            .arith(op, interp.identifier(r)?)?
            .cast_to(target.ty())?
            .value()
            .clone();
        interp.identifier_mut(l)?.set_value(value);
        out.push(l);
    }
    Ok(out)
}

fn compare(interp: &mut Interpreter, op: CmpOp, args: &[Expression]) -> InterpResult<Vec<Handle>> {
    let mut out = Vec::new();
    for (l, r) in pairs(interp, args)? {
        let result = interp.identifier(l)?.compare(op, interp.identifier(r)?)?;
        out.push(interp.push_identifier(result));
    }
    Ok(out)
}

fn logic(interp: &mut Interpreter, op: LogicOp, args: &[Expression]) -> InterpResult<Vec<Handle>> {
    let mut out = Vec::new();
    for (l, r) in pairs(interp, args)? {
        let result = interp.identifier(l)?.logic(op, interp.identifier(r)?)?;
        out.push(interp.push_identifier(result));
    }
    Ok(out)
}

fn not(interp: &mut Interpreter, args: &[Expression]) -> InterpResult<Vec<Handle>> {
    let mut out = Vec::new();
    for handle in operands(interp, args)? {
        let negated = !interp.identifier(handle)?.truthy()?;
        out.push(interp.push_identifier(Identifier::boolean(negated)));
    }
    Ok(out)
}

/// `a !! i`: operands are evaluated and paired but no element is looked up
fn index(interp: &mut Interpreter, args: &[Expression]) -> InterpResult<Vec<Handle>> {
    pairs(interp, args)?;
    Ok(Vec::new())
}

fn print(interp: &mut Interpreter, args: &[Expression], newline: bool) -> InterpResult<Vec<Handle>> {
    for arg in args.iter().skip(1) {
        for handle in interp.eval(arg)? {
            let text = interp.identifier(handle)?.to_text()?;
            interp.write_output(&text)?;
        }
    }
    if newline {
        interp.write_output("\n")?;
    }
    interp.flush_output()?;
    Ok(Vec::new())
}

fn dump(interp: &mut Interpreter, args: &[Expression]) -> InterpResult<Vec<Handle>> {
    for arg in args.iter().skip(1) {
        for handle in interp.eval(arg)? {
            let ident = interp.identifier(handle)?;
            let line = format!(
                "(id: {handle}, {} :: {} = {}) ",
                ident.surface(),
                ident.ty(),
                ident.to_text()?
            );
            interp.write_output(&line)?;
        }
        interp.write_output("\n")?;
    }
    interp.flush_output()?;
    Ok(Vec::new())
}

/// `include path [as alias] ...`
///
/// A bare word contributes its own spelling; anything else its string form.
fn include(interp: &mut Interpreter, args: &[Expression]) -> InterpResult<Vec<Handle>> {
    let mut words = Vec::new();
    for handle in operands(interp, args)? {
        let ident = interp.identifier(handle)?;
        let word = if ident.is_undefined() {
            ident.surface().to_string()
        } else {
            ident.to_text()?
        };
        words.push(word);
    }

    let mut words = words.into_iter().peekable();
    while let Some(path) = words.next() {
        let alias = match words.next_if(|w| w == "as") {
            Some(_) => words.next().unwrap_or_else(|| path.clone()),
            None => path.clone(),
        };
        interp.include_module(&path, &alias, args)?;
    }
    Ok(Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_names_unique() {
        let mut names: Vec<_> = FUNCTIONS.iter().map(|e| e.name).collect();
        names.extend(CONTROLS.iter().map(|(n, _)| *n));
        names.extend(TYPE_NAMES);
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn test_installed_at_global_scope() {
        let mut interp = Interpreter::with_output(std::io::sink());
        let plus = interp.ident_of("+").unwrap();
        let ident = interp.identifier(plus).unwrap();
        assert!(ident.is_function());
        assert!(ident.is_infix());
        assert_eq!(ident.scope(), 0);
        assert_eq!(ident.builtin(), Some(Builtin::Add));

        let print = interp.ident_of("print").unwrap();
        assert!(!interp.identifier(print).unwrap().is_infix());

        let int = interp.ident_of("int").unwrap();
        assert!(interp.identifier(int).unwrap().is_type());

        let lp = interp.ident_of("loop").unwrap();
        let ident = interp.identifier(lp).unwrap();
        assert!(ident.is_control());
        assert_eq!(ident.builtin(), Some(Builtin::Loop));
    }

    #[test]
    fn test_decas_aliases_declare() {
        let mut interp = Interpreter::with_output(std::io::sink());
        for name in ["decas", "::"] {
            let h = interp.ident_of(name).unwrap();
            assert_eq!(interp.identifier(h).unwrap().builtin(), Some(Builtin::Declare));
        }
    }
}
