//! Runtime values of the script language

use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use super::ast::FunctionDef;
use super::error::{ErrorKind, ScriptError, ScriptResult};

/// Longest sequence a script may build in one step
pub const MAX_SEQUENCE_LEN: usize = 10_000_000;

/// Deepest list nesting that `==`, ordering and printing will walk
const MAX_VALUE_DEPTH: usize = 200;

/// Built-in functions available in every program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Print,
    Input,
    Len,
    Str,
    Int,
    Float,
    Bool,
    Range,
    Abs,
    Min,
    Max,
    Append,
}

impl Builtin {
    pub const ALL: [Builtin; 12] = [
        Builtin::Print,
        Builtin::Input,
        Builtin::Len,
        Builtin::Str,
        Builtin::Int,
        Builtin::Float,
        Builtin::Bool,
        Builtin::Range,
        Builtin::Abs,
        Builtin::Min,
        Builtin::Max,
        Builtin::Append,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Print => "print",
            Builtin::Input => "input",
            Builtin::Len => "len",
            Builtin::Str => "str",
            Builtin::Int => "int",
            Builtin::Float => "float",
            Builtin::Bool => "bool",
            Builtin::Range => "range",
            Builtin::Abs => "abs",
            Builtin::Min => "min",
            Builtin::Max => "max",
            Builtin::Append => "append",
        }
    }
}

/// A user-defined function with its defaults already evaluated
#[derive(Debug)]
pub struct Function {
    pub def: Rc<FunctionDef>,
    pub defaults: Vec<Option<Value>>,
}

/// Storage behind a list value, shared by every name bound to the list.
///
/// Dropping it releases nested lists from a work queue, so a list nested a
/// million levels deep is freed without recursing.
#[derive(Default)]
pub struct ListItems(RefCell<Vec<Value>>);

impl ListItems {
    pub fn new(items: Vec<Value>) -> Self {
        Self(RefCell::new(items))
    }
}

impl Deref for ListItems {
    type Target = RefCell<Vec<Value>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Drop for ListItems {
    fn drop(&mut self) {
        let mut pending = std::mem::take(self.0.get_mut());
        while let Some(value) = pending.pop() {
            if let Value::List(list) = value {
                // still shared elsewhere: dropping the handle is enough
                if let Ok(mut inner) = Rc::try_unwrap(list) {
                    pending.append(inner.0.get_mut());
                }
            }
        }
    }
}

impl fmt::Debug for ListItems {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(items) => write!(f, "ListItems(len={})", items.len()),
            Err(_) => f.write_str("ListItems(<borrowed>)"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    List(Rc<ListItems>),
    Range { start: i64, stop: i64, step: i64 },
    Function(Rc<Function>),
    Builtin(Builtin),
}

impl Value {
    pub fn str(text: impl Into<Rc<str>>) -> Self {
        Value::Str(text.into())
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(ListItems::new(items)))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "NoneType",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Range { .. } => "range",
            Value::Function(_) => "function",
            Value::Builtin(_) => "builtin_function_or_method",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.borrow().is_empty(),
            Value::Range { .. } => self.range_len().unwrap_or(0) > 0,
            Value::Function(_) | Value::Builtin(_) => true,
        }
    }

    /// Integer view of ints and bools
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    /// Float view of any number
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            other => other.as_int().map(|n| n as f64),
        }
    }

    fn range_len(&self) -> Option<i64> {
        let Value::Range { start, stop, step } = *self else {
            return None;
        };
        let span = if step > 0 {
            stop.saturating_sub(start)
        } else {
            start.saturating_sub(stop)
        };
        if span <= 0 {
            return Some(0);
        }
        let step = step.unsigned_abs() as i64;
        Some((span - 1) / step + 1)
    }

    /// Number of items, for values that have a length
    pub fn len(&self) -> ScriptResult<usize> {
        match self {
            Value::Str(s) => Ok(s.chars().count()),
            Value::List(items) => Ok(items.borrow().len()),
            Value::Range { .. } => Ok(self.range_len().unwrap_or(0) as usize),
            other => Err(ScriptError::type_error(format!(
                "object of type '{}' has no len()",
                other.type_name()
            ))),
        }
    }

    /// Snapshot of the items an iteration over this value visits
    pub fn iter_items(&self) -> ScriptResult<Vec<Value>> {
        match self {
            Value::Str(s) => Ok(s.chars().map(|c| Value::str(c.to_string())).collect()),
            Value::List(items) => Ok(items.borrow().clone()),
            Value::Range { start, step, .. } => {
                let len = self.range_len().unwrap_or(0);
                if len as usize > MAX_SEQUENCE_LEN {
                    return Err(ScriptError::new(ErrorKind::MemoryError, "range too large"));
                }
                Ok((0..len).map(|i| Value::Int(start + i * step)).collect())
            }
            other => Err(ScriptError::type_error(format!(
                "'{}' object is not iterable",
                other.type_name()
            ))),
        }
    }

    /// Item `i` of a range, without materialising it
    pub fn range_item(&self, index: i64) -> Option<i64> {
        let Value::Range { start, step, .. } = *self else {
            return None;
        };
        let len = self.range_len()?;
        let index = if index < 0 { index + len } else { index };
        (0..len).contains(&index).then(|| start + index * step)
    }

    /// Equality as `==` sees it: numbers compare across int, float and bool
    pub fn equals(&self, other: &Value) -> ScriptResult<bool> {
        self.equals_at(other, 0)
    }

    fn equals_at(&self, other: &Value, depth: usize) -> ScriptResult<bool> {
        Ok(match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                if Rc::ptr_eq(a, b) {
                    return Ok(true);
                }
                if depth >= MAX_VALUE_DEPTH {
                    return Err(comparison_too_deep());
                }
                let (a, b) = (a.borrow(), b.borrow());
                if a.len() != b.len() {
                    return Ok(false);
                }
                for (x, y) in a.iter().zip(b.iter()) {
                    if !x.equals_at(y, depth + 1)? {
                        return Ok(false);
                    }
                }
                true
            }
            (
                Value::Range { start, stop, step },
                Value::Range {
                    start: s2,
                    stop: e2,
                    step: st2,
                },
            ) => (start, stop, step) == (s2, e2, st2),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            (Value::Float(_), _) | (_, Value::Float(_)) => {
                match (self.as_float(), other.as_float()) {
                    (Some(a), Some(b)) => a == b,
                    _ => false,
                }
            }
            _ => match (self.as_int(), other.as_int()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        })
    }

    /// Identity as `is` sees it
    pub fn is_same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::None, Value::None) => true,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => Rc::ptr_eq(a, b) || a == b,
            _ => false,
        }
    }

    /// Ordering for `<`-style comparisons, `min` and `max`
    pub fn compare(&self, other: &Value, op: &str) -> ScriptResult<Ordering> {
        self.compare_at(other, op, 0)
    }

    fn compare_at(&self, other: &Value, op: &str, depth: usize) -> ScriptResult<Ordering> {
        let unsupported = || {
            ScriptError::type_error(format!(
                "'{}' not supported between instances of '{}' and '{}'",
                op,
                self.type_name(),
                other.type_name()
            ))
        };
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => Ok(a.cmp(b)),
            (Value::List(a), Value::List(b)) => {
                if depth >= MAX_VALUE_DEPTH {
                    return Err(comparison_too_deep());
                }
                let (a, b) = (a.borrow().clone(), b.borrow().clone());
                for (x, y) in a.iter().zip(b.iter()) {
                    if !x.equals_at(y, depth + 1)? {
                        return x.compare_at(y, op, depth + 1);
                    }
                }
                Ok(a.len().cmp(&b.len()))
            }
            (Value::Float(_), _) | (_, Value::Float(_)) => {
                match (self.as_float(), other.as_float()) {
                    (Some(a), Some(b)) => a.partial_cmp(&b).ok_or_else(unsupported),
                    _ => Err(unsupported()),
                }
            }
            _ => match (self.as_int(), other.as_int()) {
                (Some(a), Some(b)) => Ok(a.cmp(&b)),
                _ => Err(unsupported()),
            },
        }
    }

    /// Text shown by `repr()` and inside containers
    pub fn repr(&self) -> String {
        match self {
            Value::Str(s) => repr_str(s),
            other => other.to_string(),
        }
    }
}

fn comparison_too_deep() -> ScriptError {
    ScriptError::new(
        ErrorKind::RecursionError,
        "maximum recursion depth exceeded in comparison",
    )
}

/// Writes `items` as `[a, b]`. A list already being written, or one past the
/// depth limit, shows as `[...]`.
fn write_list(
    f: &mut fmt::Formatter<'_>,
    list: &Rc<ListItems>,
    open: &mut Vec<*const ListItems>,
) -> fmt::Result {
    let ptr = Rc::as_ptr(list);
    if open.contains(&ptr) || open.len() >= MAX_VALUE_DEPTH {
        return f.write_str("[...]");
    }
    let Ok(items) = list.try_borrow() else {
        return f.write_str("[...]");
    };
    open.push(ptr);
    f.write_str("[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        match item {
            Value::List(inner) => write_list(f, inner, open)?,
            Value::Str(s) => f.write_str(&repr_str(s))?,
            other => write!(f, "{}", other)?,
        }
    }
    open.pop();
    f.write_str("]")
}

/// Quote a string the way the interactive prompt would
fn repr_str(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Float formatting: shortest round-trip digits, always showing a fraction or exponent
pub fn format_float(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let magnitude = f.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        // Rust prints `1e20` / `1.5e-7`; show a signed, two-digit exponent instead
        let formatted = format!("{:e}", f);
        let Some((mantissa, exponent)) = formatted.split_once('e') else {
            return formatted;
        };
        let (sign, digits) = match exponent.strip_prefix('-') {
            Some(digits) => ('-', digits),
            None => ('+', exponent),
        };
        return format!("{}e{}{:0>2}", mantissa, sign, digits);
    }
    let formatted = format!("{}", f);
    if formatted.contains('.') {
        formatted
    } else {
        format!("{}.0", formatted)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => f.write_str("None"),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => f.write_str(&format_float(*x)),
            Value::Str(s) => f.write_str(s),
            Value::List(items) => write_list(f, items, &mut Vec::new()),
            Value::Range { start, stop, step } => {
                if *step == 1 {
                    write!(f, "range({}, {})", start, stop)
                } else {
                    write!(f, "range({}, {}, {})", start, stop, step)
                }
            }
            Value::Function(func) => write!(f, "<function {}>", func.def.name),
            Value::Builtin(b) => write!(f, "<built-in function {}>", b.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let list = Value::list(vec![
            Value::Int(1),
            Value::str("a"),
            Value::None,
            Value::Float(2.0),
        ]);
        assert_eq!(list.to_string(), "[1, 'a', None, 2.0]");
        assert_eq!(Value::Bool(true).to_string(), "True");
        assert_eq!(
            Value::Range {
                start: 0,
                stop: 5,
                step: 1
            }
            .to_string(),
            "range(0, 5)"
        );
    }

    #[test]
    fn test_float_format() {
        assert_eq!(format_float(0.5), "0.5");
        assert_eq!(format_float(3.0), "3.0");
        assert_eq!(format_float(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_float(1e20), "1e+20");
        assert_eq!(format_float(1.5e-7), "1.5e-07");
        assert_eq!(format_float(-0.0), "-0.0");
        assert_eq!(format_float(f64::INFINITY), "inf");
    }

    #[test]
    fn test_repr_quotes() {
        assert_eq!(Value::str("it's").repr(), "\"it's\"");
        assert_eq!(Value::str("a\nb").repr(), "'a\\nb'");
    }

    #[test]
    fn test_numeric_equality_crosses_types() {
        assert!(Value::Int(1).equals(&Value::Float(1.0)).unwrap());
        assert!(Value::Bool(true).equals(&Value::Int(1)).unwrap());
        assert!(!Value::Int(1).equals(&Value::str("1")).unwrap());
    }

    fn self_containing(head: i64) -> Value {
        let list = Value::list(vec![Value::Int(head)]);
        if let Value::List(items) = &list {
            items.borrow_mut().push(list.clone());
        }
        list
    }

    #[test]
    fn test_self_containing_list_prints_ellipsis() {
        let list = self_containing(1);
        assert_eq!(list.to_string(), "[1, [...]]");

        let outer = Value::list(vec![list.clone(), list]);
        assert_eq!(outer.to_string(), "[[1, [...]], [1, [...]]]");
    }

    #[test]
    fn test_cyclic_equality_is_recursion_error() {
        let a = self_containing(1);
        assert!(a.equals(&a).unwrap());

        let err = a.equals(&self_containing(1)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::RecursionError);
        let err = a.compare(&self_containing(1), "<").unwrap_err();
        assert_eq!(err.kind, ErrorKind::RecursionError);
        // differing heads decide before the cycle is walked
        assert!(!a.equals(&self_containing(2)).unwrap());
    }

    #[test]
    fn test_deeply_nested_list_prints_and_drops() {
        let mut nested = Value::list(Vec::new());
        for _ in 0..1_000_000 {
            nested = Value::list(vec![nested]);
        }
        let text = nested.to_string();
        assert!(text.starts_with("[[[["));
        assert!(text.contains("[...]"));
        drop(nested);
    }

    #[test]
    fn test_compare_mixed_types_is_type_error() {
        let err = Value::Int(1).compare(&Value::str("a"), "<").unwrap_err();
        assert_eq!(
            err.message,
            "'<' not supported between instances of 'int' and 'str'"
        );
    }

    #[test]
    fn test_range_len_and_items() {
        let r = Value::Range {
            start: 10,
            stop: 0,
            step: -3,
        };
        assert_eq!(r.len().unwrap(), 4);
        assert_eq!(r.range_item(-1), Some(1));
        assert_eq!(r.range_item(4), None);
        assert!(
            !Value::Range {
                start: 3,
                stop: 3,
                step: 1
            }
            .is_truthy()
        );
    }
}
