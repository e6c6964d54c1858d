use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CallStats {
    pub rx: u64,
    pub tx: u64,
    pub duration: String,
    pub time_to_first_byte: String,
}

/// One call reported by `/ws/trace`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TraceMessage {
    pub time: String,
    pub client: String,
    pub host: String,
    pub api: String,
    pub path: String,
    pub query: String,
    pub status_code: u16,
    pub status_msg: String,
    pub call_stats: CallStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceCall {
    S3,
    Internal,
    Storage,
    Os,
}

impl TraceCall {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::S3 => "s3",
            Self::Internal => "internal",
            Self::Storage => "storage",
            Self::Os => "os",
        }
    }
}

/// Filters sent as the `/ws/trace` query string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TraceFilter {
    /// Empty means every call type.
    pub calls: Vec<TraceCall>,
    pub threshold: u64,
    pub only_errors: bool,
    pub status_code: Option<u16>,
    pub method: String,
    pub func_name: String,
    pub path: String,
}

impl TraceFilter {
    pub fn calls_param(&self) -> String {
        if self.calls.is_empty() {
            return "all".to_string();
        }
        self.calls
            .iter()
            .map(|call| call.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("calls", self.calls_param()),
            ("threshold", self.threshold.to_string()),
            (
                "onlyErrors",
                if self.only_errors { "yes" } else { "no" }.to_string(),
            ),
            (
                "statusCode",
                self.status_code.map(|c| c.to_string()).unwrap_or_default(),
            ),
            ("method", self.method.clone()),
            ("funcname", self.func_name.clone()),
            ("path", self.path.clone()),
        ]
    }
}

/// Health colour of scanned items, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HealthColor {
    Green,
    Yellow,
    Red,
    Grey,
}

impl HealthColor {
    pub const ORDER: [HealthColor; 4] = [Self::Green, Self::Yellow, Self::Red, Self::Grey];
}

/// Progress message pushed by `/ws/heal/{bucket}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HealStatus {
    /// Seconds since the heal sequence started.
    pub heal_duration: f64,
    pub bytes_scanned: u64,
    pub objects_scanned: u64,
    pub items_scanned: u64,
    pub objects_healed: u64,
    pub items_healed: u64,
    pub health_before_cols: BTreeMap<HealthColor, u64>,
    pub health_after_cols: BTreeMap<HealthColor, u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HealOptions {
    pub bucket: String,
    pub prefix: String,
    pub recursive: bool,
    pub force_start: bool,
    pub force_stop: bool,
}

impl HealOptions {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("prefix", self.prefix.clone()),
            ("recursive", self.recursive.to_string()),
            ("force-start", self.force_start.to_string()),
            ("force-stop", self.force_stop.to_string()),
        ]
    }
}
