//! HR module: employee records.
//!
//! The service enforces email uniqueness on create and otherwise delegates to
//! an [`EmployeeRepository`]. HTTP wiring lives in the server crate.

mod error;
mod model;
mod repository;
mod service;

pub use error::{HrError, HrResult, RepositoryError};
pub use model::{Employee, EmployeePatch, NewEmployee};
pub use repository::{EmployeeRepository, SeaOrmEmployeeRepository};
pub use service::{EmployeeService, HrEmployeeService};
