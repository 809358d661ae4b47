use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::StoreError;
use crate::employees::models::{Employee, EmployeeRow};

const EMPLOYEE_COLUMNS: &str =
    "id, owner_id, name, email, mobile, designation, gender, course, date, image, created_at";

/// Persistence contract for employees.
///
/// Every lookup and mutation is scoped by owner: a record owned by another
/// account behaves exactly like a missing one. Email and mobile uniqueness are
/// enforced by the store and reported as `StoreError::Duplicate`.
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    async fn insert(&self, employee: &Employee) -> Result<Employee, StoreError>;

    /// All employees of `owner_id`, oldest first
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Employee>, StoreError>;

    async fn find_owned(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Employee>, StoreError>;

    /// Persist the mutable fields of `employee`; `None` if it no longer exists
    async fn update(&self, employee: &Employee) -> Result<Option<Employee>, StoreError>;

    /// Delete and return the record; `None` if absent or not owned
    async fn delete_owned(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Employee>, StoreError>;
}

/// Repository for employee rows in PostgreSQL
#[derive(Clone)]
pub struct PgEmployeeRepository {
    pool: PgPool,
}

impl PgEmployeeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn course_texts(employee: &Employee) -> Vec<String> {
    employee.course.iter().map(|c| c.as_str().to_string()).collect()
}

#[async_trait]
impl EmployeeRepository for PgEmployeeRepository {
    async fn insert(&self, employee: &Employee) -> Result<Employee, StoreError> {
        let row = sqlx::query_as::<_, EmployeeRow>(&format!(
            r#"
            INSERT INTO employees
                (id, owner_id, name, email, mobile, designation, gender, course, date, image, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            EMPLOYEE_COLUMNS
        ))
        .bind(employee.id)
        .bind(employee.owner_id)
        .bind(&employee.name)
        .bind(&employee.email)
        .bind(&employee.mobile)
        .bind(employee.designation.as_str())
        .bind(employee.gender.as_str())
        .bind(course_texts(employee))
        .bind(employee.date)
        .bind(&employee.image)
        .bind(employee.created_at)
        .fetch_one(&self.pool)
        .await?;

        Employee::try_from(row)
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Employee>, StoreError> {
        let rows = sqlx::query_as::<_, EmployeeRow>(&format!(
            "SELECT {} FROM employees WHERE owner_id = $1 ORDER BY created_at, id",
            EMPLOYEE_COLUMNS
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Employee::try_from).collect()
    }

    async fn find_owned(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Employee>, StoreError> {
        let row = sqlx::query_as::<_, EmployeeRow>(&format!(
            "SELECT {} FROM employees WHERE id = $1 AND owner_id = $2",
            EMPLOYEE_COLUMNS
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Employee::try_from).transpose()
    }

    async fn update(&self, employee: &Employee) -> Result<Option<Employee>, StoreError> {
        let row = sqlx::query_as::<_, EmployeeRow>(&format!(
            r#"
            UPDATE employees
            SET name = $1,
                email = $2,
                mobile = $3,
                designation = $4,
                gender = $5,
                course = $6,
                date = $7,
                image = $8
            WHERE id = $9 AND owner_id = $10
            RETURNING {}
            "#,
            EMPLOYEE_COLUMNS
        ))
        .bind(&employee.name)
        .bind(&employee.email)
        .bind(&employee.mobile)
        .bind(employee.designation.as_str())
        .bind(employee.gender.as_str())
        .bind(course_texts(employee))
        .bind(employee.date)
        .bind(&employee.image)
        .bind(employee.id)
        .bind(employee.owner_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Employee::try_from).transpose()
    }

    async fn delete_owned(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Employee>, StoreError> {
        let row = sqlx::query_as::<_, EmployeeRow>(&format!(
            "DELETE FROM employees WHERE id = $1 AND owner_id = $2 RETURNING {}",
            EMPLOYEE_COLUMNS
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Employee::try_from).transpose()
    }
}

/// Employee repository kept in process memory
#[derive(Default)]
pub struct InMemoryEmployeeRepository {
    employees: RwLock<HashMap<Uuid, Employee>>,
}

impl InMemoryEmployeeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uniqueness check; must run under the write lock
    fn check_unique(employees: &HashMap<Uuid, Employee>, candidate: &Employee) -> Result<(), StoreError> {
        for other in employees.values().filter(|e| e.id != candidate.id) {
            if other.email == candidate.email {
                return Err(StoreError::Duplicate { field: "email" });
            }
            if other.mobile == candidate.mobile {
                return Err(StoreError::Duplicate { field: "mobile" });
            }
        }
        Ok(())
    }
}

#[async_trait]
impl EmployeeRepository for InMemoryEmployeeRepository {
    async fn insert(&self, employee: &Employee) -> Result<Employee, StoreError> {
        let mut employees = self.employees.write().await;
        Self::check_unique(&employees, employee)?;
        employees.insert(employee.id, employee.clone());
        Ok(employee.clone())
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Employee>, StoreError> {
        let employees = self.employees.read().await;
        let mut owned: Vec<Employee> = employees
            .values()
            .filter(|e| e.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(owned)
    }

    async fn find_owned(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Employee>, StoreError> {
        let employees = self.employees.read().await;
        Ok(employees
            .get(&id)
            .filter(|e| e.owner_id == owner_id)
            .cloned())
    }

    async fn update(&self, employee: &Employee) -> Result<Option<Employee>, StoreError> {
        let mut employees = self.employees.write().await;
        let exists = employees
            .get(&employee.id)
            .is_some_and(|e| e.owner_id == employee.owner_id);
        if !exists {
            return Ok(None);
        }

        Self::check_unique(&employees, employee)?;
        employees.insert(employee.id, employee.clone());
        Ok(Some(employee.clone()))
    }

    async fn delete_owned(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Employee>, StoreError> {
        let mut employees = self.employees.write().await;
        let owned = employees.get(&id).is_some_and(|e| e.owner_id == owner_id);
        Ok(if owned { employees.remove(&id) } else { None })
    }
}
