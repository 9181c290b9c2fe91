//! Default host builtins. Each validates its own arity and argument
//! kinds; the evaluator does not pre-check builtin signatures.

use crate::error::{Error, Result};
use crate::interpreter::Interpreter;
use crate::value::Value;

/// Register every default builtin into the root environment.
pub fn install(interp: &mut Interpreter) {
    interp.register_global("not", Value::Builtin(builtin_not));
    interp.register_global("print", Value::Builtin(builtin_print));
    interp.register_global("type", Value::Builtin(builtin_type));
    interp.register_global("bool", Value::Builtin(builtin_bool));
    interp.register_global("number", Value::Builtin(builtin_number));
    interp.register_global("ceil", Value::Builtin(builtin_ceil));
    interp.register_global("floor", Value::Builtin(builtin_floor));
    interp.register_global("string", Value::Builtin(builtin_string));
    interp.register_global("len", Value::Builtin(builtin_len));
}

fn one_arg<'a>(name: &str, args: &'a [Value]) -> Result<&'a Value> {
    match args {
        [arg] => Ok(arg),
        _ => Err(Error::Type(format!(
            "{name}() takes 1 argument, but got {}",
            args.len()
        ))),
    }
}

fn number_arg(name: &str, args: &[Value]) -> Result<f64> {
    match one_arg(name, args)? {
        Value::Number(n) => Ok(*n),
        v => Err(Error::Type(format!(
            "argument for {name}() is expected number, but got {}",
            v.kind()
        ))),
    }
}

fn builtin_not(_: &mut Interpreter, args: &[Value]) -> Result<Option<Value>> {
    match one_arg("not", args)? {
        Value::Bool(b) => Ok(Some(Value::Bool(!b))),
        v => Err(Error::Type(format!(
            "argument for not() is expected bool, but got {}",
            v.kind()
        ))),
    }
}

fn builtin_print(_: &mut Interpreter, args: &[Value]) -> Result<Option<Value>> {
    let mut line = String::new();
    for arg in args {
        line.push_str(&arg.to_string());
    }
    println!("{line}");
    Ok(None)
}

fn builtin_type(_: &mut Interpreter, args: &[Value]) -> Result<Option<Value>> {
    let arg = one_arg("type", args)?;
    Ok(Some(Value::string(arg.kind())))
}

fn builtin_bool(_: &mut Interpreter, args: &[Value]) -> Result<Option<Value>> {
    let b = match one_arg("bool", args)? {
        Value::Bool(b) => *b,
        Value::Number(n) => *n != 0.0,
        Value::Str(s) => &**s == "true",
        Value::Fun(_) | Value::Builtin(_) => true,
        v => {
            return Err(Error::Type(format!(
                "unable to convert {} to bool",
                v.kind()
            )))
        }
    };
    Ok(Some(Value::Bool(b)))
}

fn builtin_number(_: &mut Interpreter, args: &[Value]) -> Result<Option<Value>> {
    let n = match one_arg("number", args)? {
        Value::Bool(true) => 1.0,
        Value::Bool(false) => 0.0,
        Value::Number(n) => *n,
        Value::Str(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| Error::Type(format!("unable to convert '{s}' to number")))?,
        v => {
            return Err(Error::Type(format!(
                "unable to convert {} to number",
                v.kind()
            )))
        }
    };
    Ok(Some(Value::Number(n)))
}

fn builtin_ceil(_: &mut Interpreter, args: &[Value]) -> Result<Option<Value>> {
    let n = number_arg("ceil", args)?;
    Ok(Some(Value::Number(n.ceil())))
}

fn builtin_floor(_: &mut Interpreter, args: &[Value]) -> Result<Option<Value>> {
    let n = number_arg("floor", args)?;
    Ok(Some(Value::Number(n.floor())))
}

fn builtin_string(_: &mut Interpreter, args: &[Value]) -> Result<Option<Value>> {
    let arg = one_arg("string", args)?;
    Ok(Some(Value::string(arg.to_string())))
}

fn builtin_len(_: &mut Interpreter, args: &[Value]) -> Result<Option<Value>> {
    let n = match one_arg("len", args)? {
        // Length counts code points, matching index and slice positions.
        Value::Str(s) => s.chars().count(),
        Value::List(elements) => elements.len(),
        Value::Record(fields) => fields.len(),
        v => {
            return Err(Error::Type(format!(
                "argument for len() is expected string, list or record, but got {}",
                v.kind()
            )))
        }
    };
    Ok(Some(Value::Number(n as f64)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_parses_strings_and_rejects_garbage() {
        let mut interp = Interpreter::new();
        let v = builtin_number(&mut interp, &[Value::string("2.5")]).unwrap();
        assert!(matches!(v, Some(Value::Number(n)) if n == 2.5));
        let err = builtin_number(&mut interp, &[Value::string("nope")]).unwrap_err();
        assert!(matches!(err, Error::Type(_)));
    }

    #[test]
    fn len_counts_code_points() {
        let mut interp = Interpreter::new();
        let v = builtin_len(&mut interp, &[Value::string("héllo")]).unwrap();
        assert!(matches!(v, Some(Value::Number(n)) if n == 5.0));
    }

    #[test]
    fn arity_is_checked() {
        let mut interp = Interpreter::new();
        let err = builtin_not(&mut interp, &[]).unwrap_err();
        assert!(matches!(err, Error::Type(_)));
    }
}
