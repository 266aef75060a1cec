//! Reads a reporting period from JSON.
//!
//! Loading happens in two steps so the two failure modes stay distinct: the text
//! is first parsed as untyped JSON (anything that is not JSON fails here), then
//! deserialized into [`ReportData`], where absent keys and ill-typed values are
//! reported by name.

use crate::data::ReportData;
use crate::error::ModelError;
use log::debug;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

const INLINE_ORIGIN: &str = "inline report data";

impl ReportData {
    /// Loads and validates the data file at `path`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ModelError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Read {} bytes of report data from {}", source.len(), path.display());
        Self::parse(&source, &format!("'{}'", path.display()))
    }

    pub fn from_json_str(source: &str) -> Result<Self, ModelError> {
        Self::parse(source, INLINE_ORIGIN)
    }

    pub fn from_value(value: Value) -> Result<Self, ModelError> {
        Self::from_value_in(value, INLINE_ORIGIN)
    }

    /// Checks the invariants deserialization alone cannot express.
    pub fn validate(&self) -> Result<(), ModelError> {
        if let Some(effort) = self.roadmap.iter().find(|effort| effort.steps.is_empty()) {
            return Err(ModelError::EmptyEffort {
                effort: effort.description.clone(),
            });
        }
        Ok(())
    }

    fn parse(source: &str, origin: &str) -> Result<Self, ModelError> {
        let value: Value = serde_json::from_str(source).map_err(|source| ModelError::Json {
            origin: origin.to_string(),
            source,
        })?;
        Self::from_value_in(value, origin)
    }

    fn from_value_in(value: Value, origin: &str) -> Result<Self, ModelError> {
        let data = ReportData::deserialize(value).map_err(|e| ModelError::from_serde(origin, e))?;
        data.validate()?;
        Ok(data)
    }
}
