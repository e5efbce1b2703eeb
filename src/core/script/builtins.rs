//! Built-in functions and the methods of `list` and `str`

use std::cmp::Ordering;

use super::error::{ErrorKind, ScriptError, ScriptResult};
use super::eval::Host;
use super::value::{Builtin, Value};

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

fn exactly(name: &str, args: &[Value], n: usize) -> ScriptResult<()> {
    if args.len() == n {
        return Ok(());
    }
    let count = if n == 1 {
        "one argument".to_string()
    } else {
        format!("{} argument{}", n, plural(n))
    };
    Err(ScriptError::type_error(format!(
        "{}() takes exactly {} ({} given)",
        name,
        count,
        args.len()
    )))
}

fn at_most(name: &str, args: &[Value], n: usize) -> ScriptResult<()> {
    if args.len() <= n {
        return Ok(());
    }
    Err(ScriptError::type_error(format!(
        "{}() takes at most {} argument{} ({} given)",
        name,
        n,
        plural(n),
        args.len()
    )))
}

fn integer_arg(value: &Value) -> ScriptResult<i64> {
    value.as_int().ok_or_else(|| {
        ScriptError::type_error(format!(
            "'{}' object cannot be interpreted as an integer",
            value.type_name()
        ))
    })
}

/// Call a built-in function
pub fn call(
    host: &mut dyn Host,
    builtin: Builtin,
    args: Vec<Value>,
    kwargs: Vec<(String, Value)>,
) -> ScriptResult<Value> {
    let name = builtin.name();
    if builtin != Builtin::Print && !kwargs.is_empty() {
        return Err(ScriptError::type_error(format!(
            "{}() takes no keyword arguments",
            name
        )));
    }

    match builtin {
        Builtin::Print => print(host, &args, kwargs),
        Builtin::Input => {
            at_most(name, &args, 1)?;
            let prompt = args.first().map(Value::to_string).unwrap_or_default();
            host.read_line(&prompt).map(Value::str)
        }
        Builtin::Len => {
            exactly(name, &args, 1)?;
            let len = args[0].len()?;
            Ok(Value::Int(i64::try_from(len).unwrap_or(i64::MAX)))
        }
        Builtin::Str => {
            at_most(name, &args, 1)?;
            Ok(Value::str(
                args.first().map(Value::to_string).unwrap_or_default(),
            ))
        }
        Builtin::Int => {
            at_most(name, &args, 1)?;
            args.first().map_or(Ok(Value::Int(0)), to_int)
        }
        Builtin::Float => {
            at_most(name, &args, 1)?;
            args.first().map_or(Ok(Value::Float(0.0)), to_float)
        }
        Builtin::Bool => {
            at_most(name, &args, 1)?;
            Ok(Value::Bool(args.first().is_some_and(Value::is_truthy)))
        }
        Builtin::Range => range(&args),
        Builtin::Abs => {
            exactly(name, &args, 1)?;
            match &args[0] {
                Value::Float(f) => Ok(Value::Float(f.abs())),
                other => {
                    let n = other.as_int().ok_or_else(|| {
                        ScriptError::type_error(format!(
                            "bad operand type for abs(): '{}'",
                            other.type_name()
                        ))
                    })?;
                    n.checked_abs()
                        .map(Value::Int)
                        .ok_or_else(ScriptError::overflow)
                }
            }
        }
        Builtin::Min => extreme(name, args, Ordering::Less),
        Builtin::Max => extreme(name, args, Ordering::Greater),
        Builtin::Append => {
            exactly(name, &args, 2)?;
            match &args[0] {
                Value::List(items) => {
                    items.borrow_mut().push(args[1].clone());
                    Ok(Value::None)
                }
                other => Err(ScriptError::type_error(format!(
                    "append() argument 1 must be list, not {}",
                    other.type_name()
                ))),
            }
        }
    }
}

/// `print(*args, sep=" ", end="\n")`
fn print(host: &mut dyn Host, args: &[Value], kwargs: Vec<(String, Value)>) -> ScriptResult<Value> {
    let mut sep = " ".to_string();
    let mut end = "\n".to_string();
    for (key, value) in kwargs {
        let slot = match key.as_str() {
            "sep" => &mut sep,
            "end" => &mut end,
            other => {
                return Err(ScriptError::type_error(format!(
                    "'{}' is an invalid keyword argument for print()",
                    other
                )));
            }
        };
        match value {
            Value::Str(s) => *slot = s.to_string(),
            Value::None => {}
            other => {
                return Err(ScriptError::type_error(format!(
                    "{} must be None or a string, not {}",
                    key,
                    other.type_name()
                )));
            }
        }
    }

    let mut line = args
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(&sep);
    line.push_str(&end);
    host.write(&line);
    Ok(Value::None)
}

fn to_int(value: &Value) -> ScriptResult<Value> {
    match value {
        Value::Int(n) => Ok(Value::Int(*n)),
        Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
        Value::Float(f) => {
            if f.is_nan() {
                return Err(ScriptError::value_error("cannot convert float NaN to integer"));
            }
            if f.is_infinite() {
                return Err(ScriptError::new(
                    ErrorKind::OverflowError,
                    "cannot convert float infinity to integer",
                ));
            }
            let truncated = f.trunc();
            if truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
                return Err(ScriptError::overflow());
            }
            Ok(Value::Int(truncated as i64))
        }
        Value::Str(s) => s.trim().parse::<i64>().map(Value::Int).map_err(|_| {
            ScriptError::value_error(format!(
                "invalid literal for int() with base 10: {}",
                value.repr()
            ))
        }),
        other => Err(ScriptError::type_error(format!(
            "int() argument must be a string or a number, not '{}'",
            other.type_name()
        ))),
    }
}

fn to_float(value: &Value) -> ScriptResult<Value> {
    match value {
        Value::Str(s) => s.trim().parse::<f64>().map(Value::Float).map_err(|_| {
            ScriptError::value_error(format!(
                "could not convert string to float: {}",
                value.repr()
            ))
        }),
        other => other.as_float().map(Value::Float).ok_or_else(|| {
            ScriptError::type_error(format!(
                "float() argument must be a string or a number, not '{}'",
                other.type_name()
            ))
        }),
    }
}

fn range(args: &[Value]) -> ScriptResult<Value> {
    let ints = args.iter().map(integer_arg).collect::<ScriptResult<Vec<_>>>()?;
    let (start, stop, step) = match ints[..] {
        [stop] => (0, stop, 1),
        [start, stop] => (start, stop, 1),
        [start, stop, step] => (start, stop, step),
        [] => {
            return Err(ScriptError::type_error(
                "range expected at least 1 argument, got 0",
            ));
        }
        _ => {
            return Err(ScriptError::type_error(format!(
                "range expected at most 3 arguments, got {}",
                args.len()
            )));
        }
    };
    if step == 0 {
        return Err(ScriptError::value_error("range() arg 3 must not be zero"));
    }
    Ok(Value::Range { start, stop, step })
}

/// `min`/`max`: the item whose ordering against every other is `wanted` or equal
fn extreme(name: &str, args: Vec<Value>, wanted: Ordering) -> ScriptResult<Value> {
    let items = match args.len() {
        0 => {
            return Err(ScriptError::type_error(format!(
                "{} expected at least 1 argument, got 0",
                name
            )));
        }
        1 => args[0].iter_items()?,
        _ => args,
    };
    let op = if wanted == Ordering::Less { "<" } else { ">" };
    let mut iter = items.into_iter();
    let Some(mut best) = iter.next() else {
        return Err(ScriptError::value_error(format!(
            "{}() arg is an empty sequence",
            name
        )));
    };
    for item in iter {
        if item.compare(&best, op)? == wanted {
            best = item;
        }
    }
    Ok(best)
}

/// Call `receiver.name(args)`
pub fn call_method(receiver: &Value, name: &str, args: Vec<Value>) -> ScriptResult<Value> {
    match (receiver, name) {
        (Value::List(items), "append") => {
            exactly(name, &args, 1)?;
            items.borrow_mut().extend(args);
            Ok(Value::None)
        }
        (Value::List(items), "pop") => {
            at_most(name, &args, 1)?;
            let mut items = items.borrow_mut();
            if items.is_empty() {
                return Err(ScriptError::index_error("pop from empty list"));
            }
            let len = i64::try_from(items.len()).unwrap_or(i64::MAX);
            let index = match args.first() {
                Some(v) => integer_arg(v)?,
                None => len - 1,
            };
            let index = if index < 0 { index + len } else { index };
            match usize::try_from(index).ok().filter(|i| *i < items.len()) {
                Some(i) => Ok(items.remove(i)),
                None => Err(ScriptError::index_error("pop index out of range")),
            }
        }
        (Value::Str(s), "upper") => {
            exactly(name, &args, 0)?;
            Ok(Value::str(s.to_uppercase()))
        }
        (Value::Str(s), "lower") => {
            exactly(name, &args, 0)?;
            Ok(Value::str(s.to_lowercase()))
        }
        (Value::Str(s), "strip") => {
            exactly(name, &args, 0)?;
            Ok(Value::str(s.trim()))
        }
        (Value::Str(s), "split") => {
            at_most(name, &args, 1)?;
            let parts: Vec<Value> = match args.first() {
                None | Some(Value::None) => s.split_whitespace().map(Value::str).collect(),
                Some(Value::Str(sep)) if sep.is_empty() => {
                    return Err(ScriptError::value_error("empty separator"));
                }
                Some(Value::Str(sep)) => s.split(&**sep).map(Value::str).collect(),
                Some(other) => {
                    return Err(ScriptError::type_error(format!(
                        "must be str or None, not {}",
                        other.type_name()
                    )));
                }
            };
            Ok(Value::list(parts))
        }
        (Value::Str(sep), "join") => {
            exactly(name, &args, 1)?;
            let mut parts = Vec::new();
            for (i, item) in args[0].iter_items()?.into_iter().enumerate() {
                match item {
                    Value::Str(part) => parts.push(part.to_string()),
                    other => {
                        return Err(ScriptError::type_error(format!(
                            "sequence item {}: expected str instance, {} found",
                            i,
                            other.type_name()
                        )));
                    }
                }
            }
            Ok(Value::str(parts.join(&**sep)))
        }
        (other, _) => Err(ScriptError::new(
            ErrorKind::AttributeError,
            format!("'{}' object has no attribute '{}'", other.type_name(), name),
        )),
    }
}
