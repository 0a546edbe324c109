pub mod appointment;
pub mod employee;
pub mod entity;
pub mod enums;
pub mod filters;
pub mod medicine;
pub mod patient;
pub mod prescription;
pub mod room;
pub mod user;
pub mod visit;

pub use appointment::*;
pub use employee::*;
pub use entity::*;
pub use filters::*;
pub use medicine::*;
pub use patient::*;
pub use prescription::*;
pub use room::*;
pub use user::*;
pub use visit::*;
