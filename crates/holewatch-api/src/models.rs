// Wire types for the upstream JSON payloads.

use serde::Deserialize;

/// One record of the killboard's per-system kill list.
///
/// The older API shape used `killID` / `killTime`; the current one uses
/// `killmail_id` / `killmail_time` and may omit the time entirely.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KillSummary {
    #[serde(rename = "killID", alias = "killmail_id")]
    pub kill_id: u64,
    #[serde(rename = "killTime", alias = "killmail_time", default)]
    pub kill_time: Option<String>,
}

/// One signature entry of the scout feed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Signature {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    pub out_system_name: String,
    pub in_system_name: String,
    #[serde(default)]
    pub wh_type: Option<String>,
}
