use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::blob::{BlobStore, ImageUpload};
use crate::employees::{
    error::EmployeeError,
    models::{Course, Designation, Employee, EmployeeForm, EmployeePatch, Gender, NumberedEmployee},
    repository::EmployeeRepository,
};
use crate::validation::{validate_employee_email, validate_mobile};

/// Validate the provided form fields and convert them into typed changes.
///
/// Fields are checked in a fixed order (email, mobile, designation, gender,
/// course, date) and the first failure is reported.
pub fn parse_form(form: EmployeeForm) -> Result<EmployeePatch, EmployeeError> {
    let invalid = |msg: &str| EmployeeError::ValidationError(msg.to_string());

    if let Some(email) = &form.email {
        validate_employee_email(email).map_err(|_| invalid("Invalid email"))?;
    }
    if let Some(mobile) = &form.mobile {
        validate_mobile(mobile).map_err(|_| invalid("Invalid mobile number"))?;
    }

    let designation = form
        .designation
        .as_deref()
        .map(str::parse::<Designation>)
        .transpose()
        .map_err(|_| invalid("Designation must be one of HR, Manager, Sales"))?;
    let gender = form
        .gender
        .as_deref()
        .map(str::parse::<Gender>)
        .transpose()
        .map_err(|_| invalid("Gender must be Male or Female"))?;

    let course = if form.course.is_empty() {
        None
    } else {
        let mut parsed = Vec::with_capacity(form.course.len());
        for text in &form.course {
            let course = text
                .parse::<Course>()
                .map_err(|_| invalid("Course must be one of MCA, BCA, BSC"))?;
            if !parsed.contains(&course) {
                parsed.push(course);
            }
        }
        Some(parsed)
    };

    let date = form
        .date
        .as_deref()
        .map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d"))
        .transpose()
        .map_err(|_| invalid("Date must be in YYYY-MM-DD format"))?;

    Ok(EmployeePatch {
        name: form.name,
        email: form.email,
        mobile: form.mobile,
        designation,
        gender,
        course,
        date,
    })
}

/// Service for employee records, always scoped to the calling account
pub struct EmployeeService {
    employees: Arc<dyn EmployeeRepository>,
    blobs: Arc<dyn BlobStore>,
}

impl EmployeeService {
    pub fn new(employees: Arc<dyn EmployeeRepository>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { employees, blobs }
    }

    /// Create an employee owned by `owner_id`
    ///
    /// # Validation
    /// - name, email, mobile, designation, gender and at least one course are required
    /// - email and mobile must be well formed
    /// - email and mobile must not already belong to another employee
    pub async fn create_employee(
        &self,
        owner_id: Uuid,
        form: EmployeeForm,
        image: Option<ImageUpload>,
    ) -> Result<Employee, EmployeeError> {
        if !form.is_complete() {
            return Err(EmployeeError::ValidationError(
                "All fields are required".to_string(),
            ));
        }
        let patch = parse_form(form)?;

        let image = match image {
            Some(upload) => Some(self.blobs.put(&upload).await?),
            None => None,
        };

        // is_complete guarantees every required field is set
        let (
            Some(name),
            Some(email),
            Some(mobile),
            Some(designation),
            Some(gender),
            Some(course),
        ) = (
            patch.name,
            patch.email,
            patch.mobile,
            patch.designation,
            patch.gender,
            patch.course,
        )
        else {
            self.discard_blob(image.as_deref()).await;
            return Err(EmployeeError::ValidationError(
                "All fields are required".to_string(),
            ));
        };

        let employee = Employee {
            id: Uuid::new_v4(),
            owner_id,
            name,
            email,
            mobile,
            designation,
            gender,
            course,
            date: patch.date,
            image,
            created_at: Utc::now(),
        };

        match self.employees.insert(&employee).await {
            Ok(created) => {
                info!("Account {} added employee {}", owner_id, created.id);
                Ok(created)
            }
            Err(e) => {
                self.discard_blob(employee.image.as_deref()).await;
                Err(e.into())
            }
        }
    }

    /// List the caller's employees, oldest first, each with its 1-based rank
    pub async fn list_employees(&self, owner_id: Uuid) -> Result<Vec<NumberedEmployee>, EmployeeError> {
        let employees = self.employees.list_by_owner(owner_id).await?;

        Ok(employees
            .into_iter()
            .enumerate()
            .map(|(index, employee)| NumberedEmployee {
                no: index + 1,
                employee,
            })
            .collect())
    }

    /// Apply a partial update to one of the caller's employees
    ///
    /// Only the provided fields change. A new image replaces the old one, whose
    /// blob is then removed.
    pub async fn update_employee(
        &self,
        id: Uuid,
        owner_id: Uuid,
        form: EmployeeForm,
        image: Option<ImageUpload>,
    ) -> Result<Employee, EmployeeError> {
        let mut employee = self
            .employees
            .find_owned(id, owner_id)
            .await?
            .ok_or(EmployeeError::NotFound)?;

        if form.is_empty() && image.is_none() {
            return Err(EmployeeError::ValidationError(
                "At least one field is required for update".to_string(),
            ));
        }

        parse_form(form)?.apply(&mut employee);

        let stored = match image {
            Some(upload) => Some(self.blobs.put(&upload).await?),
            None => None,
        };
        let previous_image = match &stored {
            Some(reference) => employee.image.replace(reference.clone()),
            None => None,
        };

        let updated = match self.employees.update(&employee).await {
            Ok(Some(updated)) => updated,
            Ok(None) => {
                self.discard_blob(stored.as_deref()).await;
                return Err(EmployeeError::NotFound);
            }
            Err(e) => {
                self.discard_blob(stored.as_deref()).await;
                return Err(e.into());
            }
        };

        self.discard_blob(previous_image.as_deref()).await;
        info!("Account {} updated employee {}", owner_id, id);
        Ok(updated)
    }

    /// Delete one of the caller's employees along with its image
    pub async fn delete_employee(&self, id: Uuid, owner_id: Uuid) -> Result<Employee, EmployeeError> {
        let deleted = self
            .employees
            .delete_owned(id, owner_id)
            .await?
            .ok_or(EmployeeError::NotFound)?;

        self.discard_blob(deleted.image.as_deref()).await;
        info!("Account {} deleted employee {}", owner_id, id);
        Ok(deleted)
    }

    /// Best-effort blob removal; failures are logged and swallowed
    async fn discard_blob(&self, reference: Option<&str>) {
        if let Some(reference) = reference {
            if let Err(e) = self.blobs.remove(reference).await {
                warn!("Failed to remove blob {}: {}", reference, e);
            }
        }
    }
}
