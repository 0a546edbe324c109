use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeCategory {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub is_active: bool,
}

/// Doctor or other staff member belonging to one entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub date_of_birth: NaiveDate,
    pub entity_id: i64,
    pub employee_category_id: i64,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub date_of_birth: NaiveDate,
    pub entity_id: i64,
    pub employee_category_id: i64,
    pub created_by: Option<i64>,
}
