//! Tree-walking interpreter

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use super::ast::{BinOp, CmpOp, Expr, FunctionDef, Program, Stmt, StmtKind, Target};
use super::builtins;
use super::error::{ErrorKind, ScriptError, ScriptResult};
use super::ops;
use super::value::{Builtin, Function, Value};

/// What a running script can ask of its environment
pub trait Host {
    /// Text written by `print`
    fn write(&mut self, text: &str);

    /// Answer to `input(prompt)`, without the trailing newline
    fn read_line(&mut self, prompt: &str) -> ScriptResult<String>;
}

/// Nested user function calls allowed before `RecursionError`
pub const DEFAULT_RECURSION_LIMIT: usize = 200;

enum Flow {
    Normal,
    Break,
    Continue,
    Return(Value),
}

struct Frame {
    def: Rc<FunctionDef>,
    locals: HashMap<String, Value>,
    declared_global: HashSet<String>,
}

pub struct Interpreter<'h> {
    host: &'h mut dyn Host,
    globals: HashMap<String, Value>,
    frames: Vec<Frame>,
    recursion_limit: usize,
}

impl<'h> Interpreter<'h> {
    pub fn new(host: &'h mut dyn Host) -> Self {
        let globals = Builtin::ALL
            .iter()
            .map(|b| (b.name().to_string(), Value::Builtin(*b)))
            .collect();
        Self {
            host,
            globals,
            frames: Vec::new(),
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }

    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    /// Value of a module-level variable
    pub fn global(&self, name: &str) -> Option<&Value> {
        self.globals.get(name)
    }

    pub fn run(&mut self, program: &Program) -> ScriptResult<()> {
        self.exec_block(&program.body).map(|_| ())
    }

    // ==================== Statements ====================

    fn exec_block(&mut self, body: &[Stmt]) -> ScriptResult<Flow> {
        for stmt in body {
            let flow = self.exec(stmt)?;
            if !matches!(flow, Flow::Normal) {
                return Ok(flow);
            }
        }
        Ok(Flow::Normal)
    }

    fn exec(&mut self, stmt: &Stmt) -> ScriptResult<Flow> {
        self.exec_kind(&stmt.kind)
            .map_err(|err| err.at_line(stmt.line))
    }

    fn exec_kind(&mut self, kind: &StmtKind) -> ScriptResult<Flow> {
        match kind {
            StmtKind::Expr(expr) => {
                self.eval(expr)?;
            }
            StmtKind::Assign { target, value } => {
                let value = self.eval(value)?;
                self.assign(target, value)?;
            }
            StmtKind::AugAssign { target, op, value } => self.augmented(target, *op, value)?,
            StmtKind::If {
                branches,
                otherwise,
            } => {
                for (cond, body) in branches {
                    if self.eval(cond)?.is_truthy() {
                        return self.exec_block(body);
                    }
                }
                if let Some(body) = otherwise {
                    return self.exec_block(body);
                }
            }
            StmtKind::While { cond, body } => {
                while self.eval(cond)?.is_truthy() {
                    match self.exec_block(body)? {
                        Flow::Break => break,
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                        Flow::Normal | Flow::Continue => {}
                    }
                }
            }
            StmtKind::For { var, iter, body } => return self.exec_for(var, iter, body),
            StmtKind::Def(def) => {
                let mut defaults = Vec::with_capacity(def.params.len());
                for param in &def.params {
                    defaults.push(match &param.default {
                        Some(expr) => Some(self.eval(expr)?),
                        None => None,
                    });
                }
                let function = Function {
                    def: Rc::clone(def),
                    defaults,
                };
                self.store(&def.name, Value::Function(Rc::new(function)));
            }
            StmtKind::Return(expr) => {
                let value = match expr {
                    Some(expr) => self.eval(expr)?,
                    None => Value::None,
                };
                return Ok(Flow::Return(value));
            }
            StmtKind::Global(names) => {
                if let Some(frame) = self.frames.last_mut() {
                    frame.declared_global.extend(names.iter().cloned());
                }
            }
            StmtKind::Break => return Ok(Flow::Break),
            StmtKind::Continue => return Ok(Flow::Continue),
            StmtKind::Pass => {}
        }
        Ok(Flow::Normal)
    }

    fn exec_for(&mut self, var: &str, iter: &Expr, body: &[Stmt]) -> ScriptResult<Flow> {
        let iterable = self.eval(iter)?;
        // Ranges are walked lazily so `range(10**9)` does not allocate
        let items: Box<dyn Iterator<Item = Value>> = match &iterable {
            Value::Range { .. } => {
                let len = iterable.len()?;
                let range = iterable.clone();
                Box::new((0..len).filter_map(move |i| {
                    range.range_item(i64::try_from(i).ok()?).map(Value::Int)
                }))
            }
            other => Box::new(other.iter_items()?.into_iter()),
        };
        for item in items {
            self.store(var, item);
            match self.exec_block(body)? {
                Flow::Break => break,
                Flow::Return(value) => return Ok(Flow::Return(value)),
                Flow::Normal | Flow::Continue => {}
            }
        }
        Ok(Flow::Normal)
    }

    fn assign(&mut self, target: &Target, value: Value) -> ScriptResult<()> {
        match target {
            Target::Name(name) => {
                self.store(name, value);
                Ok(())
            }
            Target::Index { target, index } => {
                let container = self.eval(target)?;
                let index = self.eval(index)?;
                ops::set_index(&container, &index, value)
            }
        }
    }

    fn augmented(&mut self, target: &Target, op: BinOp, value: &Expr) -> ScriptResult<()> {
        match target {
            Target::Name(name) => {
                let current = self.lookup(name)?;
                let rhs = self.eval(value)?;
                // `xs += ys` extends the list in place
                if let (BinOp::Add, Value::List(items), Value::List(more)) = (op, &current, &rhs) {
                    let more = more.borrow().clone();
                    items.borrow_mut().extend(more);
                    return Ok(());
                }
                let result = ops::binary(op, &current, &rhs)?;
                self.store(name, result);
                Ok(())
            }
            Target::Index { target, index } => {
                let container = self.eval(target)?;
                let index = self.eval(index)?;
                let current = ops::index(&container, &index)?;
                let rhs = self.eval(value)?;
                let result = ops::binary(op, &current, &rhs)?;
                ops::set_index(&container, &index, result)
            }
        }
    }

    // ==================== Variables ====================

    fn lookup(&self, name: &str) -> ScriptResult<Value> {
        if let Some(frame) = self.frames.last() {
            if !frame.declared_global.contains(name) {
                if let Some(value) = frame.locals.get(name) {
                    return Ok(value.clone());
                }
                if frame.def.local_names.contains(name) {
                    return Err(ScriptError::unbound_local(name));
                }
            }
        }
        self.globals
            .get(name)
            .cloned()
            .ok_or_else(|| ScriptError::name_error(name))
    }

    fn store(&mut self, name: &str, value: Value) {
        match self.frames.last_mut() {
            Some(frame) if !frame.declared_global.contains(name) => {
                frame.locals.insert(name.to_string(), value);
            }
            _ => {
                self.globals.insert(name.to_string(), value);
            }
        }
    }

    // ==================== Expressions ====================

    fn eval(&mut self, expr: &Expr) -> ScriptResult<Value> {
        match expr {
            Expr::Int(n) => Ok(Value::Int(*n)),
            Expr::Float(f) => Ok(Value::Float(*f)),
            Expr::Str(s) => Ok(Value::Str(Rc::clone(s))),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::None => Ok(Value::None),
            Expr::List(items) => self.eval_list(items),
            Expr::Name(name) => self.lookup(name),
            Expr::Unary { op, operand } => {
                let value = self.eval(operand)?;
                ops::unary(*op, &value)
            }
            Expr::Binary { op, left, right } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                ops::binary(*op, &left, &right)
            }
            Expr::Chain { first, rest } => {
                let mut acc = self.eval(first)?;
                for (op, operand) in rest {
                    let right = self.eval(operand)?;
                    acc = ops::binary(*op, &acc, &right)?;
                }
                Ok(acc)
            }
            Expr::Compare { first, rest } => self.eval_compare(first, rest),
            Expr::And(operands) => self.eval_bool_op(operands, false),
            Expr::Or(operands) => self.eval_bool_op(operands, true),
            Expr::Not(operand) => Ok(Value::Bool(!self.eval(operand)?.is_truthy())),
            Expr::Conditional {
                cond,
                then,
                otherwise,
            } => {
                if self.eval(cond)?.is_truthy() {
                    self.eval(then)
                } else {
                    self.eval(otherwise)
                }
            }
            Expr::Index { target, index } => {
                let target = self.eval(target)?;
                let index = self.eval(index)?;
                ops::index(&target, &index)
            }
            Expr::Slice {
                target,
                start,
                stop,
            } => self.eval_slice(target, start.as_deref(), stop.as_deref()),
            Expr::Call {
                callee,
                args,
                kwargs,
            } => self.eval_call(callee, args, kwargs),
            Expr::Method {
                receiver,
                name,
                args,
            } => {
                let receiver = self.eval(receiver)?;
                let args = self.eval_list_items(args)?;
                builtins::call_method(&receiver, name, args)
            }
        }
    }

    fn eval_list_items(&mut self, items: &[Expr]) -> ScriptResult<Vec<Value>> {
        items.iter().map(|item| self.eval(item)).collect()
    }

    fn eval_list(&mut self, items: &[Expr]) -> ScriptResult<Value> {
        self.eval_list_items(items).map(Value::list)
    }

    /// Short-circuits on the first operand whose truth equals `stop_on`
    fn eval_bool_op(&mut self, operands: &[Expr], stop_on: bool) -> ScriptResult<Value> {
        let mut last = Value::None;
        for operand in operands {
            last = self.eval(operand)?;
            if last.is_truthy() == stop_on {
                break;
            }
        }
        Ok(last)
    }

    fn eval_compare(&mut self, first: &Expr, rest: &[(CmpOp, Expr)]) -> ScriptResult<Value> {
        let mut left = self.eval(first)?;
        for (op, expr) in rest {
            let right = self.eval(expr)?;
            if !ops::compare(*op, &left, &right)? {
                return Ok(Value::Bool(false));
            }
            left = right;
        }
        Ok(Value::Bool(true))
    }

    fn eval_slice(
        &mut self,
        target: &Expr,
        start: Option<&Expr>,
        stop: Option<&Expr>,
    ) -> ScriptResult<Value> {
        let target = self.eval(target)?;
        let start = self.slice_bound(start)?;
        let stop = self.slice_bound(stop)?;
        ops::slice(&target, start, stop)
    }

    fn slice_bound(&mut self, bound: Option<&Expr>) -> ScriptResult<Option<i64>> {
        let Some(expr) = bound else {
            return Ok(None);
        };
        match self.eval(expr)? {
            Value::None => Ok(None),
            value => value.as_int().map(Some).ok_or_else(|| {
                ScriptError::type_error("slice indices must be integers or None")
            }),
        }
    }

    fn eval_call(
        &mut self,
        callee: &Expr,
        args: &[Expr],
        kwargs: &[(String, Expr)],
    ) -> ScriptResult<Value> {
        let callee = self.eval(callee)?;
        let args = self.eval_list_items(args)?;
        let mut keyword_values = Vec::with_capacity(kwargs.len());
        for (name, expr) in kwargs {
            keyword_values.push((name.clone(), self.eval(expr)?));
        }
        match callee {
            Value::Builtin(builtin) => builtins::call(&mut *self.host, builtin, args, keyword_values),
            Value::Function(function) => self.call_function(&function, args, keyword_values),
            other => Err(ScriptError::type_error(format!(
                "'{}' object is not callable",
                other.type_name()
            ))),
        }
    }

    fn call_function(
        &mut self,
        function: &Function,
        args: Vec<Value>,
        kwargs: Vec<(String, Value)>,
    ) -> ScriptResult<Value> {
        if self.frames.len() >= self.recursion_limit {
            return Err(ScriptError::new(
                ErrorKind::RecursionError,
                "maximum recursion depth exceeded",
            ));
        }
        let locals = bind_arguments(function, args, kwargs)?;
        self.frames.push(Frame {
            def: Rc::clone(&function.def),
            locals,
            declared_global: HashSet::new(),
        });
        let result = self.exec_block(&function.def.body);
        self.frames.pop();
        match result? {
            Flow::Return(value) => Ok(value),
            _ => Ok(Value::None),
        }
    }
}

/// Match call arguments to parameters, filling defaults
fn bind_arguments(
    function: &Function,
    args: Vec<Value>,
    kwargs: Vec<(String, Value)>,
) -> ScriptResult<HashMap<String, Value>> {
    let def = &function.def;
    let params = &def.params;
    if args.len() > params.len() {
        let was = if args.len() == 1 { "was" } else { "were" };
        return Err(ScriptError::type_error(format!(
            "{}() takes {} positional argument{} but {} {} given",
            def.name,
            params.len(),
            if params.len() == 1 { "" } else { "s" },
            args.len(),
            was
        )));
    }

    let mut slots: Vec<Option<Value>> = args.into_iter().map(Some).collect();
    slots.resize(params.len(), None);

    for (name, value) in kwargs {
        let Some(index) = params.iter().position(|p| p.name == name) else {
            return Err(ScriptError::type_error(format!(
                "{}() got an unexpected keyword argument '{}'",
                def.name, name
            )));
        };
        if slots[index].is_some() {
            return Err(ScriptError::type_error(format!(
                "{}() got multiple values for argument '{}'",
                def.name, name
            )));
        }
        slots[index] = Some(value);
    }

    let mut missing = Vec::new();
    let mut locals = HashMap::with_capacity(params.len());
    for ((param, slot), default) in params.iter().zip(slots).zip(&function.defaults) {
        match slot.or_else(|| default.clone()) {
            Some(value) => {
                locals.insert(param.name.clone(), value);
            }
            None => missing.push(format!("'{}'", param.name)),
        }
    }
    if !missing.is_empty() {
        return Err(ScriptError::type_error(format!(
            "{}() missing {} required positional argument{}: {}",
            def.name,
            missing.len(),
            if missing.len() == 1 { "" } else { "s" },
            join_names(&missing)
        )));
    }
    Ok(locals)
}

/// `'a'`, `'a' and 'b'`, `'a', 'b', and 'c'`
fn join_names(names: &[String]) -> String {
    match names {
        [] => String::new(),
        [one] => one.clone(),
        [first, second] => format!("{} and {}", first, second),
        [init @ .., last] => format!("{}, and {}", init.join(", "), last),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::script::parse;

    #[derive(Default)]
    struct Capture {
        output: String,
    }

    impl Host for Capture {
        fn write(&mut self, text: &str) {
            self.output.push_str(text);
        }

        fn read_line(&mut self, _prompt: &str) -> ScriptResult<String> {
            Err(ScriptError::eof())
        }
    }

    fn run(source: &str) -> Result<String, ScriptError> {
        let program = parse(source)?;
        let mut host = Capture::default();
        Interpreter::new(&mut host).run(&program)?;
        Ok(host.output)
    }

    #[test]
    fn test_print_hello() {
        assert_eq!(run("print(\"hi\")").unwrap(), "hi\n");
    }

    #[test]
    fn test_arithmetic_output() {
        assert_eq!(
            run("print(7 // 2, 7 / 2, 2 ** 10, -7 % 3, 0xff & 0b1010)").unwrap(),
            "3 3.5 1024 2 10\n"
        );
    }

    #[test]
    fn test_control_flow() {
        let source = "\
total = 0
for i in range(10):
    if i % 2 == 0:
        continue
    if i > 7:
        break
    total += i
n = 3
while n:
    n -= 1
else_branch = 'odd' if total % 2 else 'even'
print(total, n, else_branch)
";
        assert_eq!(run(source).unwrap(), "16 0 even\n");
    }

    #[test]
    fn test_long_operator_runs() {
        let sum = format!("print({})", vec!["1"; 5_000].join(" + "));
        assert_eq!(run(&sum).unwrap(), "5000\n");

        let mixed = format!("x = 2\nprint({} - 1)", vec!["x * 3"; 3_000].join(" + "));
        assert_eq!(run(&mixed).unwrap(), "17999\n");

        assert_eq!(
            run("print(0 or '' or 3 or 4, 1 and 2 and 0 and 5, 1 and 2, None or 0)").unwrap(),
            "3 0 2 0\n"
        );
        // the operand after a short-circuit is never evaluated
        assert_eq!(run("print(0 and undefined, 1 or undefined)").unwrap(), "0 1\n");
    }

    #[test]
    fn test_functions_defaults_and_keywords() {
        let source = "\
def greet(name, greeting='Hello'):
    return greeting + ', ' + name

print(greet('Ada'))
print(greet(greeting='Hi', name='Bob'))
";
        assert_eq!(run(source).unwrap(), "Hello, Ada\nHi, Bob\n");
    }

    #[test]
    fn test_recursion() {
        let source = "\
def fib(n):
    if n < 2:
        return n
    return fib(n - 1) + fib(n - 2)
print(fib(15))
";
        assert_eq!(run(source).unwrap(), "610\n");
    }

    #[test]
    fn test_locals_and_globals() {
        let source = "\
count = 0
def bump():
    global count
    count += 1
def shadow():
    count = 100
    return count
bump()
bump()
print(shadow(), count)
";
        assert_eq!(run(source).unwrap(), "100 2\n");
    }

    #[test]
    fn test_assigned_name_is_local_for_the_whole_body() {
        let source = "\
x = 1
def bump():
    x = x + 1
    return x
bump()
";
        let err = run(source).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnboundLocalError);
        assert_eq!(
            err.to_string(),
            "UnboundLocalError: cannot access local variable 'x' where it is not associated with a value"
        );
        assert_eq!(err.line, Some(3));

        // reads without a binding still reach the global, and loops bind too
        let source = "\
x = 5
def read():
    return x * 2
def loop():
    for i in range(3):
        pass
    return i
print(read(), loop())
";
        assert_eq!(run(source).unwrap(), "10 2\n");

        let source = "\
def later():
    if False:
        y = 1
    return y
later()
";
        let err = run(source).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnboundLocalError);
        assert_eq!(err.line, Some(4));
    }

    #[test]
    fn test_lists_are_shared() {
        let source = "\
xs = [1, 2]
ys = xs
ys.append(3)
xs += [4]
xs[0] = 'a'
print(xs, len(ys), 3 in xs, xs[1:3])
";
        assert_eq!(run(source).unwrap(), "['a', 2, 3, 4] 4 True [2, 3]\n");
    }

    #[test]
    fn test_errors() {
        let err = run("1/0").unwrap_err();
        assert_eq!(err.to_string(), "ZeroDivisionError: division by zero");
        assert_eq!(err.line, Some(1));

        let err = run("x = 1\nprint(y)").unwrap_err();
        assert_eq!(err.to_string(), "NameError: name 'y' is not defined");
        assert_eq!(err.line, Some(2));

        let err = run("def f(a, b):\n    return a\nf(1)").unwrap_err();
        assert_eq!(
            err.message,
            "f() missing 1 required positional argument: 'b'"
        );

        let err = run("f = 3\nf()").unwrap_err();
        assert_eq!(err.message, "'int' object is not callable");

        let err = run("input('? ')").unwrap_err();
        assert_eq!(err.to_string(), "EOFError: EOF when reading a line");
    }

    #[test]
    fn test_output_before_error_is_kept_by_host() {
        let program = parse("print('a')\nprint(1 + 'b')").unwrap();
        let mut host = Capture::default();
        let err = Interpreter::new(&mut host).run(&program).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeError);
        assert_eq!(host.output, "a\n");
    }

    #[test]
    fn test_recursion_limit() {
        let program = parse("def down(n):\n    return down(n + 1)\ndown(0)").unwrap();
        let mut host = Capture::default();
        let err = Interpreter::new(&mut host)
            .with_recursion_limit(25)
            .run(&program)
            .unwrap_err();
        assert_eq!(err.to_string(), "RecursionError: maximum recursion depth exceeded");
    }

    #[test]
    fn test_globals_visible_after_run() {
        let program = parse("x = 2 ** 5").unwrap();
        let mut host = Capture::default();
        let mut interpreter = Interpreter::new(&mut host);
        interpreter.run(&program).unwrap();
        assert!(matches!(interpreter.global("x"), Some(Value::Int(32))));
    }

    #[test]
    fn test_join_names() {
        let names: Vec<String> = ["'a'", "'b'", "'c'"].iter().map(|s| s.to_string()).collect();
        assert_eq!(join_names(&names[..1]), "'a'");
        assert_eq!(join_names(&names[..2]), "'a' and 'b'");
        assert_eq!(join_names(&names), "'a', 'b', and 'c'");
    }
}
