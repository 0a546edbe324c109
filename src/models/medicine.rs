use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicineCategory {
    pub id: i64,
    pub name: String,
    pub name_translations: Option<serde_json::Value>,
    pub description: String,
    pub entity_id: i64,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct NewMedicineCategory {
    pub name: String,
    pub name_translations: Option<serde_json::Value>,
    pub description: String,
    pub entity_id: i64,
    pub created_by: Option<i64>,
}

/// Catalog entry scoped to one entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medicine {
    pub id: i64,
    pub name: String,
    pub name_translations: Option<serde_json::Value>,
    pub category_id: i64,
    pub entity_id: i64,
    pub description: String,
    pub price: f64,
    pub quantity: i64,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct NewMedicine {
    pub name: String,
    pub name_translations: Option<serde_json::Value>,
    pub category_id: i64,
    pub entity_id: i64,
    pub description: String,
    pub price: f64,
    pub quantity: i64,
    pub created_by: Option<i64>,
}
