//! Argument validation: checks user-supplied `key=value` pairs against a
//! service's declared argument schema and coerces them to typed values.
//!
//! Validation is total and side-effect-free; it never touches the filesystem
//! or the network.

use std::collections::BTreeMap;

use crate::error::{DecoyError, Result};
use crate::manifest::{ArgSpec, ArgType, ArgValue};

/// Validated, type-coerced arguments keyed by parameter name.
///
/// Satisfies the owning schema in full: every required parameter present,
/// every value coerced to its declared type. Built fresh per run invocation.
pub type RuntimeArguments = BTreeMap<String, ArgValue>;

const TRUE_TOKENS: [&str; 3] = ["true", "1", "yes"];
const FALSE_TOKENS: [&str; 3] = ["false", "0", "no"];

/// Split raw `key=value` strings into a map, rejecting malformed tokens.
pub fn parse_raw_args(raw: &[String]) -> Result<BTreeMap<String, String>> {
    let mut out = BTreeMap::new();
    for token in raw {
        match token.split_once('=') {
            Some((key, value)) if !key.is_empty() => {
                out.insert(key.to_string(), value.to_string());
            }
            _ => {
                return Err(DecoyError::BadValue {
                    key: token.clone(),
                    value: String::new(),
                    expected: "key=value",
                })
            }
        }
    }
    Ok(out)
}

pub fn validate(schema: &[ArgSpec], raw: &BTreeMap<String, String>) -> Result<RuntimeArguments> {
    if let Some(unknown) = raw.keys().find(|k| !schema.iter().any(|s| &s.name == *k)) {
        return Err(DecoyError::UnknownArgument(unknown.clone()));
    }

    let mut validated = RuntimeArguments::new();
    for spec in schema {
        match raw.get(&spec.name) {
            Some(value) => {
                validated.insert(spec.name.clone(), coerce(spec, value)?);
            }
            None if spec.required => {
                return Err(DecoyError::MissingArgument(spec.name.clone()));
            }
            None => {
                if let Some(default) = &spec.default {
                    validated.insert(spec.name.clone(), default.clone());
                }
            }
        }
    }
    Ok(validated)
}

fn coerce(spec: &ArgSpec, value: &str) -> Result<ArgValue> {
    match spec.kind {
        ArgType::Int => value
            .parse::<i64>()
            .map(ArgValue::Int)
            .map_err(|_| DecoyError::BadValue {
                key: spec.name.clone(),
                value: value.to_string(),
                expected: "integer",
            }),
        ArgType::Bool => {
            let lower = value.to_ascii_lowercase();
            if TRUE_TOKENS.contains(&lower.as_str()) {
                Ok(ArgValue::Bool(true))
            } else if FALSE_TOKENS.contains(&lower.as_str()) {
                Ok(ArgValue::Bool(false))
            } else {
                Err(DecoyError::BadValue {
                    key: spec.name.clone(),
                    value: value.to_string(),
                    expected: "boolean",
                })
            }
        }
        ArgType::String => Ok(ArgValue::Str(value.to_string())),
    }
}
