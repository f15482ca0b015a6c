//! Casts and operators on identifiers
//!
//! Every operator produces a fresh constant. Numeric promotion follows the
//! identifiers' declared types, not their payloads.

use super::types::*;
use super::{Identifier, Value};
use crate::interp::{InterpResult, RuntimeError};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicOp {
    And,
    Or,
}

/// Shortest decimal form that round-trips (`1.5`, `3.5`, `2`)
pub fn format_double(v: f64) -> String {
    format!("{v}")
}

impl Identifier {
    fn int_payload(&self) -> i64 {
        match self.value() {
            Value::Int(i) => *i,
            Value::Double(d) => *d as i64,
            Value::Bool(b) => *b as i64,
            _ => 0,
        }
    }

    fn double_payload(&self) -> f64 {
        match self.value() {
            Value::Double(d) => *d,
            Value::Int(i) => *i as f64,
            Value::Bool(b) => f64::from(u8::from(*b)),
            _ => 0.0,
        }
    }

    fn bool_payload(&self) -> bool {
        match self.value() {
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Double(d) => *d != 0.0,
            _ => false,
        }
    }

    fn str_payload(&self) -> &str {
        match self.value() {
            Value::Str(s) => s,
            _ => "",
        }
    }

    /// Convert to a constant of type `to`.
    ///
    /// Conversions between `int`, `double`, `bool` and `string` are defined
    /// explicitly; a string that is not numeric fails to become a number.
    /// Any other pair yields the zero value of `to`.
    pub fn cast_to(&self, to: &str) -> InterpResult<Identifier> {
        let value = if self.ty() == to {
            self.value().clone()
        } else {
            match (self.ty(), to) {
                (INT, DOUBLE) => Value::Double(self.int_payload() as f64),
                (INT, BOOL) => Value::Bool(self.int_payload() != 0),
                (INT, STRING) => Value::Str(self.int_payload().to_string()),
                (DOUBLE, INT) => Value::Int(self.double_payload() as i64),
                (DOUBLE, BOOL) => Value::Bool(self.double_payload() != 0.0),
                (DOUBLE, STRING) => Value::Str(format_double(self.double_payload())),
                (BOOL, INT) => Value::Int(self.bool_payload() as i64),
                (BOOL, DOUBLE) => Value::Double(f64::from(u8::from(self.bool_payload()))),
                (BOOL, STRING) => Value::Str(self.bool_payload().to_string()),
                (STRING, INT) => Value::Int(parse_int(self.str_payload())?),
                (STRING, DOUBLE) => Value::Double(parse_double(self.str_payload())?),
                (STRING, BOOL) => Value::Bool(!self.str_payload().is_empty()),
                _ => Value::zero(to),
            }
        };
        Ok(Identifier::constant(to, value))
    }

    /// String form used by `print`
    pub fn to_text(&self) -> InterpResult<String> {
        match self.cast_to(STRING)?.value() {
            Value::Str(s) => Ok(s.clone()),
            _ => Ok(String::new()),
        }
    }

    pub fn truthy(&self) -> InterpResult<bool> {
        Ok(self.cast_to(BOOL)?.bool_payload())
    }

    /// `+` promotes string > double > int; `- * /` promote double > int
    pub fn arith(&self, op: ArithOp, rhs: &Identifier) -> InterpResult<Identifier> {
        if op == ArithOp::Add && (self.ty() == STRING || rhs.ty() == STRING) {
            let joined = self.to_text()? + &rhs.to_text()?;
            return Ok(Identifier::string(joined));
        }
        if self.ty() == DOUBLE || rhs.ty() == DOUBLE {
            let l = self.cast_to(DOUBLE)?.double_payload();
            let r = rhs.cast_to(DOUBLE)?.double_payload();
            let v = match op {
                ArithOp::Add => l + r,
                ArithOp::Sub => l - r,
                ArithOp::Mul => l * r,
                ArithOp::Div => l / r,
            };
            return Ok(Identifier::double(v));
        }
        let l = self.cast_to(INT)?.int_payload();
        let r = rhs.cast_to(INT)?.int_payload();
        let v = match op {
            ArithOp::Add => l.wrapping_add(r),
            ArithOp::Sub => l.wrapping_sub(r),
            ArithOp::Mul => l.wrapping_mul(r),
            ArithOp::Div => {
                if r == 0 {
                    return Err(RuntimeError::division_by_zero());
                }
                l.wrapping_div(r)
            }
        };
        Ok(Identifier::int(v))
    }

    /// Comparison with the same promotion as `+`
    pub fn compare(&self, op: CmpOp, rhs: &Identifier) -> InterpResult<Identifier> {
        let ordering = if self.ty() == STRING || rhs.ty() == STRING {
            Some(self.to_text()?.cmp(&rhs.to_text()?))
        } else if self.ty() == DOUBLE || rhs.ty() == DOUBLE {
            let l = self.cast_to(DOUBLE)?.double_payload();
            let r = rhs.cast_to(DOUBLE)?.double_payload();
            l.partial_cmp(&r)
        } else {
            let l = self.cast_to(INT)?.int_payload();
            let r = rhs.cast_to(INT)?.int_payload();
            Some(l.cmp(&r))
        };
        let holds = match (op, ordering) {
            (CmpOp::Ne, None) => true,
            (_, None) => false,
            (CmpOp::Eq, Some(o)) => o == Ordering::Equal,
            (CmpOp::Ne, Some(o)) => o != Ordering::Equal,
            (CmpOp::Lt, Some(o)) => o == Ordering::Less,
            (CmpOp::Gt, Some(o)) => o == Ordering::Greater,
            (CmpOp::Le, Some(o)) => o != Ordering::Greater,
            (CmpOp::Ge, Some(o)) => o != Ordering::Less,
        };
        Ok(Identifier::boolean(holds))
    }

    pub fn logic(&self, op: LogicOp, rhs: &Identifier) -> InterpResult<Identifier> {
        let l = self.truthy()?;
        let r = rhs.truthy()?;
        let v = match op {
            LogicOp::And => l && r,
            LogicOp::Or => l || r,
        };
        Ok(Identifier::boolean(v))
    }
}

fn parse_int(text: &str) -> InterpResult<i64> {
    let t = text.trim();
    if let Ok(v) = t.parse::<i64>() {
        return Ok(v);
    }
    match t.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v as i64),
        _ => Err(RuntimeError::numeric_cast(text, INT)),
    }
}

fn parse_double(text: &str) -> InterpResult<f64> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| RuntimeError::numeric_cast(text, DOUBLE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::ErrorKind;

    fn text(id: &Identifier) -> String {
        id.to_text().unwrap()
    }

    #[test]
    fn test_cast_int_to_string() {
        assert_eq!(text(&Identifier::int(42)), "42");
    }

    #[test]
    fn test_cast_double_to_string() {
        assert_eq!(text(&Identifier::double(3.5)), "3.5");
        assert_eq!(text(&Identifier::double(1.5)), "1.5");
    }

    #[test]
    fn test_cast_bool() {
        assert_eq!(text(&Identifier::boolean(true)), "true");
        let one = Identifier::boolean(true).cast_to(INT).unwrap();
        assert!(matches!(one.value(), Value::Int(1)));
        assert!(!Identifier::int(0).truthy().unwrap());
        assert!(Identifier::string("x").truthy().unwrap());
    }

    #[test]
    fn test_cast_string_to_number() {
        let i = Identifier::string("12").cast_to(INT).unwrap();
        assert!(matches!(i.value(), Value::Int(12)));
        let d = Identifier::string(" 2.25 ").cast_to(DOUBLE).unwrap();
        assert!(matches!(d.value(), Value::Double(v) if *v == 2.25));
        let t = Identifier::string("7.9").cast_to(INT).unwrap();
        assert!(matches!(t.value(), Value::Int(7)));
    }

    #[test]
    fn test_cast_non_numeric_string_fails() {
        let err = Identifier::string("abc").cast_to(INT).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NumericCast);
        assert!(Identifier::string("abc").cast_to(DOUBLE).is_err());
    }

    #[test]
    fn test_undefined_pair_is_zero() {
        let name = Identifier::from_text("foo");
        assert_eq!(text(&name), "");
        let arr = Identifier::constant(ARRAY, Value::zero(ARRAY));
        let n = arr.cast_to(INT).unwrap();
        assert!(matches!(n.value(), Value::Int(0)));
    }

    #[test]
    fn test_add_promotion() {
        let r = Identifier::int(1).arith(ArithOp::Add, &Identifier::int(2)).unwrap();
        assert_eq!(r.ty(), INT);
        assert_eq!(text(&r), "3");
        let r = Identifier::int(1).arith(ArithOp::Add, &Identifier::double(0.5)).unwrap();
        assert_eq!(r.ty(), DOUBLE);
        assert_eq!(text(&r), "1.5");
        let r = Identifier::string("n=").arith(ArithOp::Add, &Identifier::int(4)).unwrap();
        assert_eq!(r.ty(), STRING);
        assert_eq!(text(&r), "n=4");
    }

    #[test]
    fn test_division() {
        let r = Identifier::int(7).arith(ArithOp::Div, &Identifier::int(2)).unwrap();
        assert_eq!(text(&r), "3");
        let r = Identifier::double(7.0).arith(ArithOp::Div, &Identifier::int(2)).unwrap();
        assert_eq!(text(&r), "3.5");
        let err = Identifier::int(1).arith(ArithOp::Div, &Identifier::int(0)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DivisionByZero);
    }

    #[test]
    fn test_sub_does_not_concatenate() {
        let err = Identifier::string("a").arith(ArithOp::Sub, &Identifier::int(1)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NumericCast);
    }

    #[test]
    fn test_compare() {
        let t = Identifier::int(1).compare(CmpOp::Lt, &Identifier::double(1.5)).unwrap();
        assert_eq!(t.ty(), BOOL);
        assert!(t.truthy().unwrap());
        let f = Identifier::string("b").compare(CmpOp::Lt, &Identifier::string("a")).unwrap();
        assert!(!f.truthy().unwrap());
        let e = Identifier::int(2).compare(CmpOp::Eq, &Identifier::double(2.0)).unwrap();
        assert!(e.truthy().unwrap());
    }

    #[test]
    fn test_logic() {
        let r = Identifier::int(1).logic(LogicOp::And, &Identifier::int(0)).unwrap();
        assert!(!r.truthy().unwrap());
        let r = Identifier::int(1).logic(LogicOp::Or, &Identifier::int(0)).unwrap();
        assert!(r.truthy().unwrap());
    }
}
