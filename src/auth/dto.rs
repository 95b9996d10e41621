use serde::{Deserialize, Serialize};

use crate::auth::repo::AdminUser;

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Response returned by login and whoami.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub user: AdminUser,
}

impl AuthResponse {
    pub fn new(user: AdminUser) -> Self {
        Self { success: true, user }
    }
}
