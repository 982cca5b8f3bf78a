//! Core value types and configuration for Chronograph.
//!
//! This module provides the property value union, query direction,
//! temporal edge observation record, and the serializable database
//! configuration.

use crate::error::{GraphError, Result};
use serde::{Deserialize, Serialize};

/// A property value attached to a vertex or edge at a point in time.
///
/// The value space is a closed union of primitives; nested or composite
/// values are rejected at ingestion time with
/// [`GraphError::InvalidPropertyType`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Prop {
    Str(String),
    I64(i64),
    F64(f64),
    Bool(bool),
}

impl Prop {
    /// Converts a dynamic JSON value into a property value.
    ///
    /// This is the ingestion boundary for untyped input: `null`, arrays,
    /// objects and numbers that fit neither `i64` nor `f64` are rejected,
    /// and the named entity is left untouched by the caller.
    pub fn from_json(name: &str, value: &serde_json::Value) -> Result<Prop> {
        match value {
            serde_json::Value::String(s) => Ok(Prop::Str(s.clone())),
            serde_json::Value::Bool(b) => Ok(Prop::Bool(*b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Prop::I64(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Prop::F64(f))
                } else {
                    Err(GraphError::InvalidPropertyType {
                        name: name.to_string(),
                        found: format!("number {n} out of range"),
                    })
                }
            }
            serde_json::Value::Null => Err(GraphError::InvalidPropertyType {
                name: name.to_string(),
                found: "null".to_string(),
            }),
            serde_json::Value::Array(_) => Err(GraphError::InvalidPropertyType {
                name: name.to_string(),
                found: "array".to_string(),
            }),
            serde_json::Value::Object(_) => Err(GraphError::InvalidPropertyType {
                name: name.to_string(),
                found: "object".to_string(),
            }),
        }
    }
}

impl From<&str> for Prop {
    fn from(value: &str) -> Self {
        Prop::Str(value.to_string())
    }
}

impl From<String> for Prop {
    fn from(value: String) -> Self {
        Prop::Str(value)
    }
}

impl From<i64> for Prop {
    fn from(value: i64) -> Self {
        Prop::I64(value)
    }
}

impl From<i32> for Prop {
    fn from(value: i32) -> Self {
        Prop::I64(value as i64)
    }
}

impl From<f64> for Prop {
    fn from(value: f64) -> Self {
        Prop::F64(value)
    }
}

impl From<bool> for Prop {
    fn from(value: bool) -> Self {
        Prop::Bool(value)
    }
}

/// Which adjacency relation a degree or neighbour query consults.
///
/// `BOTH` is the union of `IN` and `OUT`; a self-loop is counted once in
/// each, so `degree(v, BOTH) == in_degree(v) + out_degree(v)` always
/// holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    OUT,
    IN,
    BOTH,
}

/// A single temporal edge observation: one timestamped (src, dst)
/// ingestion event.
///
/// Multiple observations may exist for the same (src, dst) pair; each
/// `add_edge` call materializes one. `time` is `None` in aggregate
/// contexts where a single record stands for the whole pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemporalEdge {
    pub src: u64,
    pub dst: u64,
    pub time: Option<i64>,
    /// True when src and dst resolve to different shards.
    pub is_remote: bool,
}

/// Database configuration.
///
/// Easily serializable and loadable from JSON while keeping complexity
/// minimal.
///
/// # Example
///
/// ```rust
/// use chronograph::Config;
///
/// let config = Config::default();
/// assert_eq!(config.num_shards, 1);
///
/// let config = Config::from_json(r#"{ "num_shards": 4 }"#).unwrap();
/// assert_eq!(config.num_shards, 4);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Number of shards vertices are partitioned across. Fixed for the
    /// store's lifetime; shard membership is a pure function of vertex id.
    #[serde(default = "Config::default_num_shards")]
    pub num_shards: usize,
}

impl Config {
    const fn default_num_shards() -> usize {
        1
    }

    pub fn with_num_shards(num_shards: usize) -> Self {
        Self { num_shards }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.num_shards == 0 {
            return Err(GraphError::ConfigurationError(
                "num_shards must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Load configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)
            .map_err(|e| GraphError::ConfigurationError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration as a JSON string.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| GraphError::ConfigurationError(e.to_string()))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            num_shards: Self::default_num_shards(),
        }
    }
}
