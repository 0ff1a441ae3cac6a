use serde::{Deserialize, Serialize};

use super::{is_truthy, lenient};

/// User account as listed in settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub nama: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub username: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub id_role: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub nama_role: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub aktif: String,
}

impl User {
    pub fn is_active(&self) -> bool {
        is_truthy(&self.aktif)
    }
}

/// Body for creating or updating a user. `password` is left out of updates
/// that keep the current password.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserForm {
    pub nama: String,
    pub username: String,
    pub id_role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub aktif: String,
}

/// `GET /settings/users` payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserList {
    #[serde(default)]
    pub users: Vec<User>,
}

/// `GET /settings/users/{id}` payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDetail {
    pub users: User,
}
