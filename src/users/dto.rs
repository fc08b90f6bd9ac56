use serde::{Deserialize, Serialize};

use super::repo::User;

/// Request body for registration. There is deliberately no `is_admin`
/// field here; clients cannot grant themselves the role.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// Public part of a user returned to clients. Never carries the digest.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub email: String,
    pub is_admin: bool,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            is_admin: u.is_admin,
        }
    }
}
