//! Node-kind catalog - the external source of available node kinds
//!
//! Consumed as a static list at graph-construction time. The engine
//! never consults it; the kind tag stored on a node stays an opaque
//! string.

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// One available node kind: an identifier plus a display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindRecord {
    pub id: String,
    pub name: String,
}

/// The four kinds the reference performer knows fixed messages for.
pub fn builtin_catalog() -> Vec<KindRecord> {
    [
        ("data-source", "Data Source"),
        ("transformer", "Transformer"),
        ("model", "Model"),
        ("sink", "Sink"),
    ]
    .into_iter()
    .map(|(id, name)| KindRecord {
        id: id.to_string(),
        name: name.to_string(),
    })
    .collect()
}

/// Parse a fetched catalog payload (a JSON array of records).
pub fn parse_catalog(json: &str) -> Result<Vec<KindRecord>> {
    Ok(serde_json::from_str(json)?)
}
