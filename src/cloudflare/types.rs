use serde::{Deserialize, Serialize};

/// Cloudflare's response envelope, shared by every v4 endpoint.
#[derive(Debug, Deserialize)]
pub struct CfEnvelope<T> {
    pub success: Option<bool>,
    #[serde(default)]
    pub errors: Vec<CfMessage>,
    pub result: Option<T>,
    pub result_info: Option<CfResultInfo>,
}

#[derive(Debug, Deserialize)]
pub struct CfMessage {
    #[allow(dead_code)]
    #[serde(default)]
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct CfResultInfo {
    #[allow(dead_code)]
    #[serde(default)]
    pub page: u32,
    pub total_pages: Option<u32>,
}

/// A zone as listed for the token's account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    pub name: String,
}

/// One DNS record, trimmed to the fields the dashboard shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub record_type: String, // "A", "CNAME", "TXT", ...
    pub name: String,
    pub content: String,
    pub ttl: u32, // 1 = automatic
    #[serde(default)]
    pub proxied: bool,
}

/// Payload for creating a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecord {
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub content: String,
    #[serde(default = "automatic_ttl")]
    pub ttl: u32,
    #[serde(default)]
    pub proxied: bool,
}

fn automatic_ttl() -> u32 {
    1
}
