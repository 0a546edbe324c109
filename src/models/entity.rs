use serde::{Deserialize, Serialize};

/// A tenant organization (hospital, clinic).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct NewEntity {
    pub name: String,
    pub address: String,
    pub created_by: Option<i64>,
}

/// Membership of a user in an entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEntity {
    pub id: i64,
    pub user_id: i64,
    pub entity_id: i64,
}
