//! Label sets and name validation.

use std::borrow::Cow;

use crate::error::{ReqMeterError, Result};

/// Fixed-shape label record.
///
/// `NAMES` is the declared label order; `values` must return exactly one
/// value per name, in the same order. Implementors get infallible increments
/// on [`Counter`](super::Counter) because the shape is checked by the type.
pub trait LabelSet: Send + Sync + 'static {
    const NAMES: &'static [&'static str];

    fn values(&self) -> Vec<Cow<'_, str>>;
}

/// Metric names: `[a-zA-Z_:][a-zA-Z0-9_:]*`.
pub fn validate_metric_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let ok = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
        }
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        Err(ReqMeterError::InvalidName(format!("metric name {name:?}")))
    }
}

/// Label names: `[a-zA-Z_][a-zA-Z0-9_]*`, `__` prefix reserved.
pub fn validate_label_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let ok = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if !ok || name.starts_with("__") {
        return Err(ReqMeterError::InvalidName(format!("label name {name:?}")));
    }
    Ok(())
}

/// Validate a declared label list: each name valid and unique.
pub fn validate_label_names(names: &[&str]) -> Result<()> {
    for (i, name) in names.iter().enumerate() {
        validate_label_name(name)?;
        if names[..i].contains(name) {
            return Err(ReqMeterError::InvalidName(format!(
                "label name {name:?} declared twice"
            )));
        }
    }
    Ok(())
}

/// Order caller-supplied pairs by the declared names.
///
/// Fails when a pair names an undeclared label, repeats a label, or a
/// declared label is missing.
pub(crate) fn ordered_values(
    declared: &[String],
    labels: &[(&str, &str)],
) -> Result<Vec<String>> {
    let mut slots: Vec<Option<String>> = vec![None; declared.len()];
    for (k, v) in labels {
        let idx = declared
            .iter()
            .position(|d| d == k)
            .ok_or_else(|| ReqMeterError::InvalidLabel(format!("undeclared label {k:?}")))?;
        if slots[idx].replace((*v).to_string()).is_some() {
            return Err(ReqMeterError::InvalidLabel(format!("label {k:?} given twice")));
        }
    }
    slots
        .into_iter()
        .zip(declared)
        .map(|(slot, name)| {
            slot.ok_or_else(|| ReqMeterError::InvalidLabel(format!("missing label {name:?}")))
        })
        .collect()
}
