use axum::{extract::State, http::HeaderMap, Json};
use sha2::{Digest, Sha256};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;
use crate::visitors::service::header_client_ip;

use super::dto::{ConsentRequest, ConsentResponse};
use super::repo::{self, NewConsent};

/// One-way digest of the originating IP. Only this hex string is stored for
/// the audit trail; the raw address never reaches the table.
fn hash_ip(ip: &str) -> String {
    let digest = Sha256::digest(ip.as_bytes());
    digest.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

#[instrument(skip(state, headers, payload))]
pub async fn record(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ConsentRequest>,
) -> Result<Json<ConsentResponse>, ApiError> {
    let mut categories = match payload.consent {
        serde_json::Value::Object(map) => map,
        _ => {
            return Err(ApiError::Validation(
                "consent must be an object of category booleans".into(),
            ))
        }
    };
    // Essential cookies cannot be declined.
    categories.insert("essential".into(), serde_json::Value::Bool(true));
    let categories = serde_json::Value::Object(categories);

    let id = Uuid::new_v4();
    let user_agent = headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let ip_hash = hash_ip(&header_client_ip(&headers));

    let consent = NewConsent {
        id,
        categories: &categories,
        policy_version: payload.version.as_deref().unwrap_or("1"),
        client_timestamp: payload.timestamp.as_deref().unwrap_or_default(),
        user_agent,
        ip_hash: &ip_hash,
    };
    repo::upsert(&state.db, &consent).await?;

    info!(consent_id = %id, "consent recorded");
    Ok(Json(ConsentResponse {
        success: true,
        consent_id: id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ip_hash_is_64_hex_chars_and_stable() {
        let a = hash_ip("203.0.113.7");
        let b = hash_ip("203.0.113.7");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(!a.contains("203.0.113.7"));
    }

    #[test]
    fn different_ips_hash_differently() {
        assert_ne!(hash_ip("203.0.113.7"), hash_ip("203.0.113.8"));
    }
}
