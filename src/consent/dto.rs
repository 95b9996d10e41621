use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of `POST /consent`: the per-category choices plus the policy version
/// the visitor saw and the client-side timestamp of the choice.
#[derive(Debug, Deserialize)]
pub struct ConsentRequest {
    pub consent: serde_json::Value,
    pub version: Option<String>,
    pub timestamp: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConsentResponse {
    pub success: bool,
    pub consent_id: Uuid,
}
