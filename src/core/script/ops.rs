//! Operator semantics: arithmetic, bitwise, comparison, indexing

use std::cmp::Ordering;

use super::ast::{BinOp, CmpOp, UnaryOp};
use super::error::{ErrorKind, ScriptError, ScriptResult};
use super::value::{MAX_SEQUENCE_LEN, Value};

fn unsupported(op: BinOp, left: &Value, right: &Value) -> ScriptError {
    ScriptError::type_error(format!(
        "unsupported operand type(s) for {}: '{}' and '{}'",
        op.symbol(),
        left.type_name(),
        right.type_name()
    ))
}

fn too_large() -> ScriptError {
    ScriptError::new(ErrorKind::MemoryError, "result too large")
}

pub fn binary(op: BinOp, left: &Value, right: &Value) -> ScriptResult<Value> {
    match op {
        BinOp::Add => add(left, right),
        BinOp::Mul => multiply(left, right),
        BinOp::Sub | BinOp::Div | BinOp::FloorDiv | BinOp::Mod | BinOp::Pow => {
            arithmetic(op, left, right)
        }
        BinOp::BitAnd | BinOp::BitOr | BinOp::BitXor | BinOp::Shl | BinOp::Shr => {
            bitwise(op, left, right)
        }
    }
}

fn add(left: &Value, right: &Value) -> ScriptResult<Value> {
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => {
            if a.len() + b.len() > MAX_SEQUENCE_LEN {
                return Err(too_large());
            }
            Ok(Value::str(format!("{}{}", a, b)))
        }
        (Value::List(a), Value::List(b)) => {
            let mut items = a.borrow().clone();
            items.extend(b.borrow().iter().cloned());
            Ok(Value::list(items))
        }
        (Value::Str(_), other) => Err(ScriptError::type_error(format!(
            "can only concatenate str (not \"{}\") to str",
            other.type_name()
        ))),
        (Value::List(_), other) => Err(ScriptError::type_error(format!(
            "can only concatenate list (not \"{}\") to list",
            other.type_name()
        ))),
        _ => arithmetic(BinOp::Add, left, right),
    }
}

fn multiply(left: &Value, right: &Value) -> ScriptResult<Value> {
    match (left, right) {
        (Value::Str(s), n) | (n, Value::Str(s)) if n.as_int().is_some() => {
            let count = repeat_count(s.len(), n.as_int().unwrap_or(0))?;
            Ok(Value::str(s.repeat(count)))
        }
        (Value::List(items), n) | (n, Value::List(items)) if n.as_int().is_some() => {
            let items = items.borrow();
            let count = repeat_count(items.len(), n.as_int().unwrap_or(0))?;
            let mut out = Vec::with_capacity(items.len() * count);
            for _ in 0..count {
                out.extend(items.iter().cloned());
            }
            Ok(Value::list(out))
        }
        _ => arithmetic(BinOp::Mul, left, right),
    }
}

fn repeat_count(len: usize, times: i64) -> ScriptResult<usize> {
    let times = usize::try_from(times).unwrap_or(0);
    match len.checked_mul(times) {
        Some(total) if total <= MAX_SEQUENCE_LEN => Ok(times),
        _ => Err(too_large()),
    }
}

fn arithmetic(op: BinOp, left: &Value, right: &Value) -> ScriptResult<Value> {
    if let (Some(a), Some(b)) = (left.as_int(), right.as_int()) {
        return int_arithmetic(op, a, b);
    }
    match (left.as_float(), right.as_float()) {
        (Some(a), Some(b)) => float_arithmetic(op, a, b),
        _ => Err(unsupported(op, left, right)),
    }
}

fn int_arithmetic(op: BinOp, a: i64, b: i64) -> ScriptResult<Value> {
    let checked = |result: Option<i64>| result.map(Value::Int).ok_or_else(ScriptError::overflow);
    match op {
        BinOp::Add => checked(a.checked_add(b)),
        BinOp::Sub => checked(a.checked_sub(b)),
        BinOp::Mul => checked(a.checked_mul(b)),
        BinOp::Div => {
            if b == 0 {
                return Err(ScriptError::zero_division("division by zero"));
            }
            Ok(Value::Float(a as f64 / b as f64))
        }
        BinOp::FloorDiv | BinOp::Mod => {
            if b == 0 {
                return Err(ScriptError::zero_division(
                    "integer division or modulo by zero",
                ));
            }
            let (quotient, remainder) = match (a.checked_div(b), a.checked_rem(b)) {
                (Some(q), Some(r)) => (q, r),
                _ => return Err(ScriptError::overflow()),
            };
            // Round toward negative infinity; the remainder takes the divisor's sign
            let adjust = remainder != 0 && (remainder < 0) != (b < 0);
            if op == BinOp::FloorDiv {
                Ok(Value::Int(if adjust { quotient - 1 } else { quotient }))
            } else {
                Ok(Value::Int(if adjust { remainder + b } else { remainder }))
            }
        }
        BinOp::Pow => {
            if b < 0 {
                if a == 0 {
                    return Err(ScriptError::zero_division(
                        "0.0 cannot be raised to a negative power",
                    ));
                }
                return Ok(Value::Float((a as f64).powf(b as f64)));
            }
            match u32::try_from(b) {
                Ok(exp) => checked(a.checked_pow(exp)),
                Err(_) if matches!(a, 0 | 1) => Ok(Value::Int(a)),
                Err(_) if a == -1 => Ok(Value::Int(if b % 2 == 0 { 1 } else { -1 })),
                Err(_) => Err(ScriptError::overflow()),
            }
        }
        _ => Err(unsupported(op, &Value::Int(a), &Value::Int(b))),
    }
}

fn float_arithmetic(op: BinOp, a: f64, b: f64) -> ScriptResult<Value> {
    let result = match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::Div => {
            if b == 0.0 {
                return Err(ScriptError::zero_division("float division by zero"));
            }
            a / b
        }
        BinOp::FloorDiv => {
            if b == 0.0 {
                return Err(ScriptError::zero_division("float floor division by zero"));
            }
            (a / b).floor()
        }
        BinOp::Mod => {
            if b == 0.0 {
                return Err(ScriptError::zero_division("float modulo"));
            }
            let r = a % b;
            if r != 0.0 && (r < 0.0) != (b < 0.0) { r + b } else { r }
        }
        BinOp::Pow => {
            if a == 0.0 && b < 0.0 {
                return Err(ScriptError::zero_division(
                    "0.0 cannot be raised to a negative power",
                ));
            }
            if a < 0.0 && b.fract() != 0.0 {
                return Err(ScriptError::value_error(
                    "negative number cannot be raised to a fractional power",
                ));
            }
            a.powf(b)
        }
        _ => return Err(unsupported(op, &Value::Float(a), &Value::Float(b))),
    };
    Ok(Value::Float(result))
}

fn bitwise(op: BinOp, left: &Value, right: &Value) -> ScriptResult<Value> {
    if let (Value::Bool(a), Value::Bool(b)) = (left, right) {
        match op {
            BinOp::BitAnd => return Ok(Value::Bool(a & b)),
            BinOp::BitOr => return Ok(Value::Bool(a | b)),
            BinOp::BitXor => return Ok(Value::Bool(a ^ b)),
            _ => {}
        }
    }
    let (Some(a), Some(b)) = (left.as_int(), right.as_int()) else {
        return Err(unsupported(op, left, right));
    };
    let result = match op {
        BinOp::BitAnd => a & b,
        BinOp::BitOr => a | b,
        BinOp::BitXor => a ^ b,
        BinOp::Shl | BinOp::Shr if b < 0 => {
            return Err(ScriptError::value_error("negative shift count"));
        }
        BinOp::Shl => {
            if a == 0 {
                0
            } else {
                let shift = u32::try_from(b).ok().filter(|s| *s < 64);
                match shift.map(|s| (a << s, s)) {
                    Some((shifted, s)) if shifted >> s == a => shifted,
                    _ => return Err(ScriptError::overflow()),
                }
            }
        }
        BinOp::Shr => {
            if b >= 64 {
                if a < 0 { -1 } else { 0 }
            } else {
                a >> b
            }
        }
        _ => return Err(unsupported(op, left, right)),
    };
    Ok(Value::Int(result))
}

pub fn unary(op: UnaryOp, operand: &Value) -> ScriptResult<Value> {
    let bad = || {
        ScriptError::type_error(format!(
            "bad operand type for unary {}: '{}'",
            op.symbol(),
            operand.type_name()
        ))
    };
    match (op, operand) {
        (UnaryOp::Neg | UnaryOp::Pos, Value::Float(f)) => {
            Ok(Value::Float(if op == UnaryOp::Neg { -f } else { *f }))
        }
        (UnaryOp::Neg, v) => {
            let n = v.as_int().ok_or_else(bad)?;
            n.checked_neg().map(Value::Int).ok_or_else(ScriptError::overflow)
        }
        (UnaryOp::Pos, v) => v.as_int().map(Value::Int).ok_or_else(bad),
        (UnaryOp::Invert, v) => v.as_int().map(|n| Value::Int(!n)).ok_or_else(bad),
    }
}

pub fn compare(op: CmpOp, left: &Value, right: &Value) -> ScriptResult<bool> {
    let ordered = |wanted: &[Ordering]| -> ScriptResult<bool> {
        Ok(wanted.contains(&left.compare(right, op.symbol())?))
    };
    match op {
        CmpOp::Eq => left.equals(right),
        CmpOp::NotEq => left.equals(right).map(|eq| !eq),
        CmpOp::Lt => ordered(&[Ordering::Less]),
        CmpOp::Le => ordered(&[Ordering::Less, Ordering::Equal]),
        CmpOp::Gt => ordered(&[Ordering::Greater]),
        CmpOp::Ge => ordered(&[Ordering::Greater, Ordering::Equal]),
        CmpOp::In => contains(right, left),
        CmpOp::NotIn => contains(right, left).map(|found| !found),
        CmpOp::Is => Ok(left.is_same(right)),
        CmpOp::IsNot => Ok(!left.is_same(right)),
    }
}

fn contains(container: &Value, item: &Value) -> ScriptResult<bool> {
    match container {
        Value::Str(haystack) => match item {
            Value::Str(needle) => Ok(haystack.contains(&**needle)),
            other => Err(ScriptError::type_error(format!(
                "'in <string>' requires string as left operand, not {}",
                other.type_name()
            ))),
        },
        Value::List(items) => {
            for value in items.borrow().iter() {
                if value.equals(item)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Value::Range { start, stop, step } => {
            let n = match item {
                Value::Float(f) if f.fract() == 0.0 => *f as i64,
                other => match other.as_int() {
                    Some(n) => n,
                    None => return Ok(false),
                },
            };
            let (n, start, stop, step) = (n as i128, *start as i128, *stop as i128, *step as i128);
            let inside = if step > 0 {
                start <= n && n < stop
            } else {
                stop < n && n <= start
            };
            Ok(inside && (n - start) % step == 0)
        }
        other => Err(ScriptError::type_error(format!(
            "argument of type '{}' is not iterable",
            other.type_name()
        ))),
    }
}

fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let index = if index < 0 { index + len } else { index };
    if (0..len).contains(&index) {
        usize::try_from(index).ok()
    } else {
        None
    }
}

pub fn index(target: &Value, index: &Value) -> ScriptResult<Value> {
    let as_index = |kind: &str| {
        index.as_int().ok_or_else(|| {
            ScriptError::type_error(format!(
                "{} indices must be integers, not '{}'",
                kind,
                index.type_name()
            ))
        })
    };
    match target {
        Value::List(items) => {
            let i = as_index("list")?;
            let items = items.borrow();
            normalize_index(i, items.len())
                .and_then(|i| items.get(i).cloned())
                .ok_or_else(|| ScriptError::index_error("list index out of range"))
        }
        Value::Str(s) => {
            let i = as_index("string")?;
            normalize_index(i, s.chars().count())
                .and_then(|i| s.chars().nth(i))
                .map(|c| Value::str(c.to_string()))
                .ok_or_else(|| ScriptError::index_error("string index out of range"))
        }
        Value::Range { .. } => {
            let i = as_index("range")?;
            target
                .range_item(i)
                .map(Value::Int)
                .ok_or_else(|| ScriptError::index_error("range object index out of range"))
        }
        other => Err(ScriptError::type_error(format!(
            "'{}' object is not subscriptable",
            other.type_name()
        ))),
    }
}

/// Clamp optional slice bounds to `0..=len`
fn slice_bounds(len: usize, start: Option<i64>, stop: Option<i64>) -> (usize, usize) {
    let len_i = i64::try_from(len).unwrap_or(i64::MAX);
    let clamp = |v: i64| {
        let v = if v < 0 { v.saturating_add(len_i) } else { v };
        usize::try_from(v.clamp(0, len_i)).unwrap_or(0)
    };
    let start = start.map_or(0, clamp);
    let stop = stop.map_or(len, clamp);
    (start, stop.max(start))
}

pub fn slice(target: &Value, start: Option<i64>, stop: Option<i64>) -> ScriptResult<Value> {
    match target {
        Value::Str(s) => {
            let (from, to) = slice_bounds(s.chars().count(), start, stop);
            Ok(Value::str(
                s.chars().skip(from).take(to - from).collect::<String>(),
            ))
        }
        Value::List(items) => {
            let items = items.borrow();
            let (from, to) = slice_bounds(items.len(), start, stop);
            Ok(Value::list(items[from..to].to_vec()))
        }
        Value::Range { .. } => {
            let items = target.iter_items()?;
            let (from, to) = slice_bounds(items.len(), start, stop);
            Ok(Value::list(items[from..to].to_vec()))
        }
        other => Err(ScriptError::type_error(format!(
            "'{}' object is not subscriptable",
            other.type_name()
        ))),
    }
}

pub fn set_index(target: &Value, index: &Value, value: Value) -> ScriptResult<()> {
    match target {
        Value::List(items) => {
            let i = index.as_int().ok_or_else(|| {
                ScriptError::type_error(format!(
                    "list indices must be integers, not '{}'",
                    index.type_name()
                ))
            })?;
            let mut items = items.borrow_mut();
            let slot = normalize_index(i, items.len())
                .and_then(|i| items.get_mut(i))
                .ok_or_else(|| ScriptError::index_error("list assignment index out of range"))?;
            *slot = value;
            Ok(())
        }
        other => Err(ScriptError::type_error(format!(
            "'{}' object does not support item assignment",
            other.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(n: i64) -> Value {
        Value::Int(n)
    }

    fn eval(op: BinOp, a: Value, b: Value) -> ScriptResult<Value> {
        binary(op, &a, &b)
    }

    #[test]
    fn test_division_variants() {
        assert!(matches!(eval(BinOp::Div, int(7), int(2)), Ok(Value::Float(f)) if f == 3.5));
        assert!(matches!(eval(BinOp::FloorDiv, int(-7), int(2)), Ok(Value::Int(-4))));
        assert!(matches!(eval(BinOp::Mod, int(-7), int(2)), Ok(Value::Int(1))));
        assert!(matches!(eval(BinOp::Mod, int(7), int(-2)), Ok(Value::Int(-1))));
    }

    #[test]
    fn test_zero_division_messages() {
        let err = eval(BinOp::Div, int(1), int(0)).unwrap_err();
        assert_eq!(err.to_string(), "ZeroDivisionError: division by zero");
        let err = eval(BinOp::Mod, int(1), int(0)).unwrap_err();
        assert_eq!(err.message, "integer division or modulo by zero");
        let err = eval(BinOp::Div, Value::Float(1.0), int(0)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ZeroDivisionError);
    }

    #[test]
    fn test_overflow_is_reported() {
        let err = eval(BinOp::Mul, int(i64::MAX), int(2)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::OverflowError);
        let err = eval(BinOp::Shl, int(1), int(70)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::OverflowError);
    }

    #[test]
    fn test_power() {
        assert!(matches!(eval(BinOp::Pow, int(2), int(10)), Ok(Value::Int(1024))));
        assert!(matches!(eval(BinOp::Pow, int(2), int(-1)), Ok(Value::Float(f)) if f == 0.5));
    }

    #[test]
    fn test_sequence_operators() {
        let joined = eval(BinOp::Add, Value::str("ab"), Value::str("c")).unwrap();
        assert_eq!(joined.to_string(), "abc");
        let repeated = eval(BinOp::Mul, int(3), Value::str("-")).unwrap();
        assert_eq!(repeated.to_string(), "---");
        let list = eval(BinOp::Mul, Value::list(vec![int(0)]), int(2)).unwrap();
        assert_eq!(list.to_string(), "[0, 0]");
        let err = eval(BinOp::Add, Value::str("a"), int(1)).unwrap_err();
        assert_eq!(err.message, "can only concatenate str (not \"int\") to str");
        let err = eval(BinOp::Mul, Value::str("a"), int(i64::MAX)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MemoryError);
    }

    #[test]
    fn test_mixed_operands_are_type_errors() {
        let err = eval(BinOp::Sub, Value::str("a"), int(1)).unwrap_err();
        assert_eq!(
            err.message,
            "unsupported operand type(s) for -: 'str' and 'int'"
        );
    }

    #[test]
    fn test_membership() {
        assert!(compare(CmpOp::In, &Value::str("ell"), &Value::str("hello")).unwrap());
        let range = Value::Range {
            start: 0,
            stop: 10,
            step: 3,
        };
        assert!(compare(CmpOp::In, &int(9), &range).unwrap());
        assert!(compare(CmpOp::NotIn, &int(4), &range).unwrap());
        assert!(compare(CmpOp::In, &int(1), &int(1)).is_err());
    }

    #[test]
    fn test_indexing_and_slicing() {
        let list = Value::list(vec![int(1), int(2), int(3)]);
        assert!(matches!(index(&list, &int(-1)), Ok(Value::Int(3))));
        let err = index(&list, &int(3)).unwrap_err();
        assert_eq!(err.to_string(), "IndexError: list index out of range");
        assert_eq!(slice(&list, Some(1), None).unwrap().to_string(), "[2, 3]");
        assert_eq!(
            slice(&Value::str("héllo"), Some(-4), Some(-1))
                .unwrap()
                .to_string(),
            "éll"
        );
        set_index(&list, &int(0), int(9)).unwrap();
        assert_eq!(list.to_string(), "[9, 2, 3]");
        assert!(set_index(&Value::str("x"), &int(0), int(1)).is_err());
    }

    #[test]
    fn test_unary() {
        assert!(matches!(unary(UnaryOp::Neg, &Value::Bool(true)), Ok(Value::Int(-1))));
        assert!(matches!(unary(UnaryOp::Invert, &int(5)), Ok(Value::Int(-6))));
        let err = unary(UnaryOp::Neg, &Value::str("x")).unwrap_err();
        assert_eq!(err.message, "bad operand type for unary -: 'str'");
    }
}
