//! Attribute validation helpers shared by operation handlers.
//!
//! `validate_attributes` checks every declared attribute before anything is
//! applied, so a failing attribute never leaves a half-populated model.

use keel_core::{Attributes, OperationError, OperationResult, Value, ValueType};

use crate::types::AttrDef;

/// Marker that turns a string into an expression when the attribute allows it.
const EXPRESSION_START: &str = "${";

/// Validate a single value against its definition.
///
/// Returns the value to store: defaults are applied to undefined input and
/// strings containing `${` become expressions when the attribute allows them.
pub fn validate_attribute(def: &AttrDef, value: Option<&Value>) -> OperationResult<Value> {
    let value = match value {
        Some(v) if v.is_defined() => v.clone(),
        _ => match &def.default {
            Some(default) => default.clone(),
            None if def.required => {
                return Err(OperationError::validation(format!(
                    "Missing required attribute: {}",
                    def.name
                )))
            }
            None if !def.nullable => {
                return Err(OperationError::validation(format!(
                    "Attribute {} may not be undefined",
                    def.name
                )))
            }
            None => return Ok(Value::Undefined),
        },
    };

    let value = normalize_expression(def, value)?;

    // Check type compatibility
    let actual = value.value_type();
    if !types_compatible(def.value_type, actual) {
        return Err(OperationError::validation(format!(
            "Invalid attribute type: expected {}, got {} for {}",
            def.value_type,
            value.type_name(),
            def.name
        )));
    }

    // Constraints apply to literals; expressions are checked once resolved.
    if !value.is_expression() {
        validate_range(def, &value)?;
        validate_allowed(def, &value)?;
        validate_length(def, &value)?;
        validate_pattern(def, &value)?;
    }

    Ok(value)
}

/// Validate every definition against `params`, rejecting parameters with no
/// definition. Returns the complete set of values to apply.
pub fn validate_attributes(defs: &[AttrDef], params: &Attributes) -> OperationResult<Attributes> {
    check_unknown_parameters(defs, params)?;

    let mut validated = Attributes::new();
    for def in defs {
        let value = validate_attribute(def, params.get(&def.name))?;
        if value.is_defined() {
            validated.insert(def.name.clone(), value);
        }
    }
    Ok(validated)
}

/// Reject parameters that no definition declares.
pub fn check_unknown_parameters(defs: &[AttrDef], params: &Attributes) -> OperationResult<()> {
    for name in params.keys() {
        if !defs.iter().any(|d| &d.name == name) {
            return Err(OperationError::validation(format!(
                "Unknown parameter: {}",
                name
            )));
        }
    }
    Ok(())
}

/// Check a request against declared parameters: nothing undeclared, nothing
/// required missing. Types are left to the handler that consumes them.
pub fn check_parameters(defs: &[AttrDef], params: &Attributes) -> OperationResult<()> {
    check_unknown_parameters(defs, params)?;
    for def in defs {
        let supplied = params.get(&def.name).is_some_and(Value::is_defined);
        if def.required && def.default.is_none() && !supplied {
            return Err(OperationError::validation(format!(
                "Missing required parameter: {}",
                def.name
            )));
        }
    }
    Ok(())
}

/// Validate range constraints (min/max) for an Int value.
pub fn validate_range(def: &AttrDef, value: &Value) -> OperationResult<()> {
    let Some(n) = value.as_int() else {
        return Ok(());
    };

    let below = def.min.is_some_and(|min| n < min);
    let above = def.max.is_some_and(|max| n > max);
    if below || above {
        let range_desc = match (def.min, def.max) {
            (Some(min), Some(max)) => format!(" [{}..{}]", min, max),
            (Some(min), None) => format!(" [>= {}]", min),
            (None, Some(max)) => format!(" [<= {}]", max),
            (None, None) => String::new(),
        };
        return Err(OperationError::validation(format!(
            "Range constraint violated: {} value {} is out of range{}",
            def.name, n, range_desc
        )));
    }
    Ok(())
}

fn validate_allowed(def: &AttrDef, value: &Value) -> OperationResult<()> {
    match &def.allowed_values {
        Some(allowed) if !allowed.contains(value) => Err(OperationError::validation(format!(
            "Invalid value {} for {}: not one of the allowed values",
            value, def.name
        ))),
        _ => Ok(()),
    }
}

fn validate_length(def: &AttrDef, value: &Value) -> OperationResult<()> {
    let Some(s) = value.as_str() else {
        return Ok(());
    };
    let len = s.chars().count();
    if def.length_min.is_some_and(|min| len < min) || def.length_max.is_some_and(|max| len > max)
    {
        return Err(OperationError::validation(format!(
            "Length of {} ({}) is outside the allowed bounds",
            def.name, len
        )));
    }
    Ok(())
}

fn validate_pattern(def: &AttrDef, value: &Value) -> OperationResult<()> {
    let (Some(pattern), Some(s)) = (&def.match_pattern, value.as_str()) else {
        return Ok(());
    };
    let re = regex_lite::Regex::new(pattern).map_err(|e| {
        OperationError::internal(format!("Invalid pattern for {}: {}", def.name, e))
    })?;
    if !re.is_match(s) {
        return Err(OperationError::validation(format!(
            "Value of {} does not match pattern {}",
            def.name, pattern
        )));
    }
    Ok(())
}

fn normalize_expression(def: &AttrDef, value: Value) -> OperationResult<Value> {
    match value {
        Value::String(s) if def.allow_expression && s.contains(EXPRESSION_START) => {
            Ok(Value::Expression(s))
        }
        Value::Expression(_) if !def.allow_expression => Err(OperationError::validation(
            format!("Expressions are not allowed for {}", def.name),
        )),
        other => Ok(other),
    }
}

/// Check if a value of type `actual` may be stored where `expected` is declared.
pub fn types_compatible(expected: ValueType, actual: Option<ValueType>) -> bool {
    match actual {
        // Undefined is compatible with anything; nullability is checked separately
        None => true,
        Some(actual) => actual == expected,
    }
}
