//! Strategy parameter specs and validated parameter bags.
//!
//! Each strategy declares `ParamSpec`s; raw key→value input is checked against
//! them at invocation time. Unknown keys and out-of-bound values are rejected,
//! never clamped or silently dropped. The same specs drive grid enumeration
//! for the selector's parameter optimization.

use std::collections::BTreeMap;

use super::error::StratlabError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Number,
    Text,
    Flag,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum ParamValue {
    Number(f64),
    Text(String),
    Flag(bool),
}

impl ParamValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ParamValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            ParamValue::Flag(b) => Some(*b),
            _ => None,
        }
    }
}

/// Declared parameter: name, kind, default, and optional numeric bounds.
/// `step` additionally marks the parameter as searchable during optimization.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub default: ParamValue,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
}

impl ParamSpec {
    pub fn number(name: &'static str, default: f64) -> Self {
        ParamSpec {
            name,
            kind: ParamKind::Number,
            default: ParamValue::Number(default),
            min: None,
            max: None,
            step: None,
        }
    }

    pub fn text(name: &'static str, default: &str) -> Self {
        ParamSpec {
            name,
            kind: ParamKind::Text,
            default: ParamValue::Text(default.to_string()),
            min: None,
            max: None,
            step: None,
        }
    }

    pub fn flag(name: &'static str, default: bool) -> Self {
        ParamSpec {
            name,
            kind: ParamKind::Flag,
            default: ParamValue::Flag(default),
            min: None,
            max: None,
            step: None,
        }
    }

    pub fn bounded(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn stepped(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }
}

/// Validated parameter bag. Only keys declared by the strategy's specs exist
/// here; absent keys fall back to spec defaults at read time via the typed
/// accessors.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Params {
    values: BTreeMap<String, ParamValue>,
}

impl Params {
    /// Validate raw input against the declared specs.
    pub fn validate(
        raw: &BTreeMap<String, ParamValue>,
        specs: &[ParamSpec],
    ) -> Result<Params, StratlabError> {
        let mut values = BTreeMap::new();

        for (key, value) in raw {
            let spec = specs.iter().find(|s| s.name == key).ok_or_else(|| {
                StratlabError::Validation {
                    reason: format!("unknown parameter: {key}"),
                }
            })?;

            let matches_kind = matches!(
                (spec.kind, value),
                (ParamKind::Number, ParamValue::Number(_))
                    | (ParamKind::Text, ParamValue::Text(_))
                    | (ParamKind::Flag, ParamValue::Flag(_))
            );
            if !matches_kind {
                return Err(StratlabError::Validation {
                    reason: format!("parameter {key} has the wrong type"),
                });
            }

            if let ParamValue::Number(n) = value {
                if let Some(min) = spec.min {
                    if *n < min {
                        return Err(StratlabError::Validation {
                            reason: format!("parameter {key}={n} below minimum {min}"),
                        });
                    }
                }
                if let Some(max) = spec.max {
                    if *n > max {
                        return Err(StratlabError::Validation {
                            reason: format!("parameter {key}={n} above maximum {max}"),
                        });
                    }
                }
            }

            values.insert(key.clone(), value.clone());
        }

        Ok(Params { values })
    }

    pub fn from_values(values: BTreeMap<String, ParamValue>) -> Params {
        Params { values }
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Numeric value of `name`, or the spec default.
    pub fn number_or(&self, specs: &[ParamSpec], name: &str) -> f64 {
        self.values
            .get(name)
            .and_then(ParamValue::as_number)
            .or_else(|| {
                specs
                    .iter()
                    .find(|s| s.name == name)
                    .and_then(|s| s.default.as_number())
            })
            .unwrap_or(0.0)
    }

    /// Text value of `name`, or the spec default.
    pub fn text_or<'a>(&'a self, specs: &'a [ParamSpec], name: &str) -> &'a str {
        self.values
            .get(name)
            .and_then(ParamValue::as_text)
            .or_else(|| {
                specs
                    .iter()
                    .find(|s| s.name == name)
                    .and_then(|s| s.default.as_text())
            })
            .unwrap_or("")
    }

    /// Flag value of `name`, or the spec default.
    pub fn flag_or(&self, specs: &[ParamSpec], name: &str) -> bool {
        self.values
            .get(name)
            .and_then(ParamValue::as_flag)
            .or_else(|| {
                specs
                    .iter()
                    .find(|s| s.name == name)
                    .and_then(|s| s.default.as_flag())
            })
            .unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.values.iter()
    }
}

impl std::fmt::Display for Params {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (key, value) in &self.values {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            match value {
                ParamValue::Number(n) => write!(f, "{key}={n}")?,
                ParamValue::Text(s) => write!(f, "{key}={s}")?,
                ParamValue::Flag(b) => write!(f, "{key}={b}")?,
            }
        }
        Ok(())
    }
}

/// Enumerate the optimization grid for a set of specs: the cartesian product
/// of each searchable numeric range (min..=max by step). Specs without a full
/// min/max/step triple contribute only their default.
pub fn enumerate_grid(specs: &[ParamSpec]) -> Vec<Params> {
    let mut axes: Vec<(&'static str, Vec<ParamValue>)> = Vec::new();

    for spec in specs {
        let values = match (spec.kind, spec.min, spec.max, spec.step) {
            (ParamKind::Number, Some(min), Some(max), Some(step)) if step > 0.0 => {
                let mut vals = Vec::new();
                let mut v = min;
                while v <= max + 1e-9 {
                    vals.push(ParamValue::Number(v.min(max)));
                    v += step;
                }
                vals
            }
            _ => vec![spec.default.clone()],
        };
        axes.push((spec.name, values));
    }

    let mut grid: Vec<BTreeMap<String, ParamValue>> = vec![BTreeMap::new()];
    for (name, values) in axes {
        let mut next = Vec::with_capacity(grid.len() * values.len());
        for combo in &grid {
            for value in &values {
                let mut c = combo.clone();
                c.insert(name.to_string(), value.clone());
                next.push(c);
            }
        }
        grid = next;
    }

    grid.into_iter().map(Params::from_values).collect()
}
