use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use stocksnap_core::{StoreStats, UtcDateTime};
use uuid::Uuid;

/// Request identifier (UUID v4) attached to every command output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Which snapshot answered the command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotMeta {
    pub captured_at: UtcDateTime,
    pub record_count: usize,
    pub fresh: bool,
}

/// Command metadata. Field order is fixed for deterministic output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metadata {
    pub request_id: RequestId,
    pub generated_at: UtcDateTime,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<SnapshotMeta>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl Metadata {
    pub fn new(latency_ms: u64, store: &StoreStats) -> Self {
        let snapshot = store.captured_at.map(|captured_at| SnapshotMeta {
            captured_at,
            record_count: store.record_count,
            fresh: store.fresh,
        });

        Self {
            request_id: RequestId::new_v4(),
            generated_at: UtcDateTime::now(),
            latency_ms,
            snapshot,
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn push_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }
}

/// Top-level JSON document printed by every command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub meta: Metadata,
    pub data: Value,
}

impl Envelope {
    pub fn new(meta: Metadata, data: Value) -> Self {
        Self { meta, data }
    }

    pub fn has_errors(&self) -> bool {
        !self.meta.errors.is_empty()
    }
}
