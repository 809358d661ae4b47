// Employee module
// Owner-scoped employee records with optional profile images

pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub use error::EmployeeError;
pub use handlers::{
    add_employee_handler, delete_employee_handler, get_all_employees_handler,
    update_employee_handler,
};
pub use models::{
    Course, Designation, Employee, EmployeeForm, EmployeeListResponse, EmployeePatch,
    EmployeeResponse, EmployeeUpload, Gender, NumberedEmployee,
};
pub use repository::{EmployeeRepository, InMemoryEmployeeRepository, PgEmployeeRepository};
pub use service::EmployeeService;
