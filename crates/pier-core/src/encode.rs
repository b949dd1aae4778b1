//! Serializes outcomes and arbitrary sandbox values to the text wire
//! format.

use anyhow::{ensure, Result};
use serde_json::{Map, Number, Value};

use pier_domain::ResolutionOutcome;

/// A value handed back by the sandbox runtime, as seen at the host
/// boundary. Plain data maps one-to-one onto JSON; the remaining variants
/// have no native representation and go through the fallback chain in
/// [`dump_output`].
#[derive(Debug, Clone, PartialEq)]
pub enum SandboxValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Seq(Vec<SandboxValue>),
    Map(Vec<(String, SandboxValue)>),
    /// A value from the runtime's numeric-array library.
    Array(NumericArray),
    /// A value from the runtime's foreign-object bridge.
    Foreign(ForeignValue),
    /// Anything else; carries the value's debug representation.
    Opaque(String),
}

/// Dense numeric array with a row-major shape.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericArray {
    shape: Vec<usize>,
    data: Vec<f64>,
}

impl NumericArray {
    pub fn new(shape: Vec<usize>, data: Vec<f64>) -> Result<Self> {
        ensure!(
            shape.iter().product::<usize>() == data.len(),
            "shape {shape:?} does not describe {} elements",
            data.len()
        );
        Ok(Self { shape, data })
    }

    pub fn scalar(value: f64) -> Self {
        Self {
            shape: vec![1],
            data: vec![value],
        }
    }

    /// Nested-sequence conversion, row major.
    fn to_nested(&self) -> Value {
        nested(&self.shape, &self.data)
    }

    /// Scalar extraction for one-element arrays.
    fn item(&self) -> f64 {
        self.data[0]
    }
}

fn nested(shape: &[usize], data: &[f64]) -> Value {
    match shape.split_first() {
        None | Some((_, [])) => Value::Array(data.iter().copied().map(number).collect()),
        Some((first, rest)) => {
            let stride = data.len() / first.max(&1);
            Value::Array(
                data.chunks(stride.max(1))
                    .map(|chunk| nested(rest, chunk))
                    .collect(),
            )
        }
    }
}

/// Opaque handle from the runtime's foreign-object bridge; `to_host`
/// recovers the host-side value, which may itself contain further bridged
/// values.
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignValue(Box<SandboxValue>);

impl ForeignValue {
    pub fn new(value: SandboxValue) -> Self {
        Self(Box::new(value))
    }

    pub fn to_host(&self) -> &SandboxValue {
        &self.0
    }
}

/// Encode a sandbox value for transport.
///
/// `Null` has no wire representation at all; a string is already
/// serialized and passes through unchanged; everything else becomes
/// two-space-indented JSON, with the fallback chain (array to nested
/// sequence or extracted scalar, bridge object to host value, otherwise
/// debug text) applied recursively, not just at the top level.
pub fn dump_output(value: &SandboxValue) -> Result<Option<String>> {
    match value {
        SandboxValue::Null => Ok(None),
        SandboxValue::Str(text) => Ok(Some(text.clone())),
        other => Ok(Some(serde_json::to_string_pretty(&encode_value(other))?)),
    }
}

/// Encode a resolution outcome for transport.
pub fn dump_outcome(outcome: &ResolutionOutcome) -> Result<String> {
    Ok(serde_json::to_string_pretty(outcome)?)
}

fn encode_value(value: &SandboxValue) -> Value {
    match value {
        SandboxValue::Null => Value::Null,
        SandboxValue::Bool(flag) => Value::Bool(*flag),
        SandboxValue::Int(n) => Value::Number((*n).into()),
        SandboxValue::Float(f) => number(*f),
        SandboxValue::Str(text) => Value::String(text.clone()),
        SandboxValue::Seq(items) => Value::Array(items.iter().map(encode_value).collect()),
        SandboxValue::Map(entries) => Value::Object(
            entries
                .iter()
                .map(|(key, item)| (key.clone(), encode_value(item)))
                .collect::<Map<_, _>>(),
        ),
        SandboxValue::Array(array) => {
            if array.data.len() == 1 {
                number(array.item())
            } else {
                array.to_nested()
            }
        }
        SandboxValue::Foreign(foreign) => encode_value(foreign.to_host()),
        SandboxValue::Opaque(repr) => Value::String(repr.clone()),
    }
}

fn number(value: f64) -> Value {
    Number::from_f64(value).map_or_else(|| Value::String(value.to_string()), Value::Number)
}
