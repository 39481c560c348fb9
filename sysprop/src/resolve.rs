//! `${...}` expression resolution against the property store.
//!
//! Supported forms, any number per string, embedded in literal text:
//! - `${name}`: value of `name`, an error if unset
//! - `${name:default}`: value of `name`, else `default`
//! - `${a,b}`: first of `a`, `b` that is set
//! - `$${`: a literal `${`

use keel_core::{OperationError, OperationResult, Value};

use crate::store::PropertyStore;

const EXPRESSION: &str = r"\$\$\{|\$\{([^}:]*)(?::([^}]*))?\}";

/// Resolve a stored attribute value to the string to apply. Undefined
/// resolves to `None`.
pub fn resolve_value(value: &Value, store: &dyn PropertyStore) -> OperationResult<Option<String>> {
    match value {
        Value::Undefined => Ok(None),
        Value::Expression(expression) => resolve_expression(expression, store).map(Some),
        other => Ok(other.to_plain_string()),
    }
}

/// Replace every expression in `expression` with its value.
pub fn resolve_expression(expression: &str, store: &dyn PropertyStore) -> OperationResult<String> {
    let re = regex_lite::Regex::new(EXPRESSION)
        .map_err(|e| OperationError::internal(format!("Invalid expression pattern: {}", e)))?;

    let mut resolved = String::with_capacity(expression.len());
    let mut last = 0;
    for caps in re.captures_iter(expression) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        push_literal(&mut resolved, &expression[last..whole.start()], expression)?;
        last = whole.end();

        if whole.as_str() == "$${" {
            resolved.push_str("${");
            continue;
        }

        let names = caps.get(1).map_or("", |m| m.as_str());
        let default = caps.get(2).map(|m| m.as_str());
        resolved.push_str(&lookup(names, default, store, expression)?);
    }
    push_literal(&mut resolved, &expression[last..], expression)?;
    Ok(resolved)
}

fn lookup(
    names: &str,
    default: Option<&str>,
    store: &dyn PropertyStore,
    expression: &str,
) -> OperationResult<String> {
    let names: Vec<&str> = names.split(',').map(str::trim).collect();
    if names.iter().any(|name| name.is_empty()) {
        return Err(OperationError::resolution(
            expression,
            "empty property name",
        ));
    }
    if let Some(value) = names.iter().find_map(|name| store.get(name)) {
        return Ok(value);
    }
    default.map(str::to_string).ok_or_else(|| {
        OperationError::resolution(expression, format!("no such property: {}", names.join(",")))
    })
}

/// Literal text between expressions may not open another one.
fn push_literal(out: &mut String, literal: &str, expression: &str) -> OperationResult<()> {
    if literal.contains("${") {
        return Err(OperationError::resolution(
            expression,
            "unterminated expression",
        ));
    }
    out.push_str(literal);
    Ok(())
}
