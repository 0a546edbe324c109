#[derive(Debug, Default)]
pub struct AppointmentFilter {
    pub entity_id: Option<i64>,
    pub active_only: bool,
}

#[derive(Debug, Default)]
pub struct EmployeeFilter {
    pub entity_id: Option<i64>,
    pub employee_category_id: Option<i64>,
}

#[derive(Debug, Default)]
pub struct PatientFilter {
    pub entity_id: Option<i64>,
    pub active_only: bool,
}

#[derive(Debug, Default)]
pub struct MedicineFilter {
    pub entity_id: Option<i64>,
    pub active_only: bool,
}
