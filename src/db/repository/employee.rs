use rusqlite::{params, Connection, OptionalExtension};

use super::parse_date;
use crate::db::DatabaseError;
use crate::models::*;

const EMPLOYEE_COLUMNS: &str = "id, first_name, last_name, email, phone_number, date_of_birth,
     entity_id, employee_category_id, is_active";

// Internal row type for Employee mapping
struct EmployeeRow {
    id: i64,
    first_name: String,
    last_name: String,
    email: String,
    phone_number: String,
    date_of_birth: String,
    entity_id: i64,
    employee_category_id: i64,
    is_active: i32,
}

fn employee_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<EmployeeRow, rusqlite::Error> {
    Ok(EmployeeRow {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        email: row.get(3)?,
        phone_number: row.get(4)?,
        date_of_birth: row.get(5)?,
        entity_id: row.get(6)?,
        employee_category_id: row.get(7)?,
        is_active: row.get(8)?,
    })
}

fn employee_from_row(row: EmployeeRow) -> Result<Employee, DatabaseError> {
    Ok(Employee {
        id: row.id,
        first_name: row.first_name,
        last_name: row.last_name,
        email: row.email,
        phone_number: row.phone_number,
        date_of_birth: parse_date("date_of_birth", &row.date_of_birth)?,
        entity_id: row.entity_id,
        employee_category_id: row.employee_category_id,
        is_active: row.is_active != 0,
    })
}

pub fn insert_employee(conn: &Connection, emp: &NewEmployee) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO employee (first_name, last_name, email, phone_number, date_of_birth,
         entity_id, employee_category_id, created_by, updated_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
        params![
            emp.first_name,
            emp.last_name,
            emp.email,
            emp.phone_number,
            emp.date_of_birth.to_string(),
            emp.entity_id,
            emp.employee_category_id,
            emp.created_by,
        ],
    )
    .map_err(DatabaseError::from_write)?;
    Ok(conn.last_insert_rowid())
}

pub fn get_employee(conn: &Connection, id: i64) -> Result<Option<Employee>, DatabaseError> {
    let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employee WHERE id = ?1");
    let row = conn
        .query_row(&sql, params![id], employee_row_from_rusqlite)
        .optional()?;
    row.map(employee_from_row).transpose()
}

pub fn find_employee_by_email(conn: &Connection, email: &str) -> Result<Option<Employee>, DatabaseError> {
    let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employee WHERE email = ?1");
    let row = conn
        .query_row(&sql, params![email], employee_row_from_rusqlite)
        .optional()?;
    row.map(employee_from_row).transpose()
}

/// Employees matching the filter, ordered by id.
pub fn list_employees(conn: &Connection, filter: &EmployeeFilter) -> Result<Vec<Employee>, DatabaseError> {
    let sql = format!(
        "SELECT {EMPLOYEE_COLUMNS} FROM employee
         WHERE (?1 IS NULL OR entity_id = ?1)
           AND (?2 IS NULL OR employee_category_id = ?2)
         ORDER BY id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        params![filter.entity_id, filter.employee_category_id],
        employee_row_from_rusqlite,
    )?;

    let mut employees = Vec::new();
    for row in rows {
        employees.push(employee_from_row(row?)?);
    }
    Ok(employees)
}

pub fn get_employee_category(conn: &Connection, id: i64) -> Result<Option<EmployeeCategory>, DatabaseError> {
    let category = conn
        .query_row(
            "SELECT id, name, description, is_active FROM employee_category WHERE id = ?1",
            params![id],
            |row| {
                Ok(EmployeeCategory {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    description: row.get(2)?,
                    is_active: row.get::<_, i32>(3)? != 0,
                })
            },
        )
        .optional()?;
    Ok(category)
}

pub fn list_employee_categories(conn: &Connection) -> Result<Vec<EmployeeCategory>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, description, is_active FROM employee_category
         WHERE is_active = 1 ORDER BY id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(EmployeeCategory {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            is_active: row.get::<_, i32>(3)? != 0,
        })
    })?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}
