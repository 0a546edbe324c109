use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomCategory {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct NewRoomCategory {
    pub name: String,
    pub price: f64,
    pub created_by: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: i64,
    pub room_number: String,
    pub room_category_id: i64,
    pub price: f64,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct NewRoom {
    pub room_number: String,
    pub room_category_id: i64,
    pub price: f64,
    pub created_by: Option<i64>,
}

/// One stay of a patient in a room. Active while the patient is admitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomOccupancy {
    pub id: i64,
    pub room_id: i64,
    pub patient_id: Option<i64>,
    pub admit_date: DateTime<Utc>,
    pub discharge_date: Option<DateTime<Utc>>,
    pub price_per_day: f64,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct NewRoomOccupancy {
    pub room_id: i64,
    pub patient_id: Option<i64>,
    pub admit_date: DateTime<Utc>,
    pub price_per_day: f64,
    pub created_by: Option<i64>,
}

/// Room joined with its category name and current occupancy.
#[derive(Debug, Clone)]
pub struct RoomStatusRow {
    pub room: Room,
    pub category_name: String,
    pub occupied: bool,
}
