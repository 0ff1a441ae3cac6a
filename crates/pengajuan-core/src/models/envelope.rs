use serde::{Deserialize, Serialize};

/// Response wrapper used by every backend endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default, alias = "Status")]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    pub data: T,
}

impl<T> Envelope<T> {
    /// `status == "success"` (any case) and, when present, `code == 200`
    pub fn is_success(&self) -> bool {
        let status_ok = self
            .status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("success"));
        status_ok && self.code.map_or(true, |c| c == 200)
    }
}

/// Reply to a create/update/delete call, where `data` is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default, alias = "Status")]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl Ack {
    pub fn message_or(&self, default: &str) -> String {
        self.message.clone().unwrap_or_else(|| default.to_string())
    }
}
