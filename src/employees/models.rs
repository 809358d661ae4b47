use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::StoreError;

/// Error for a value outside one of the enumerated employee fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:tt),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            /// Case-insensitive; the stored spelling is canonical
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                $(
                    if s.eq_ignore_ascii_case($text) {
                        return Ok($name::$variant);
                    }
                )+
                Err(UnknownVariant(s.to_string()))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

text_enum!(
    /// Job designation
    Designation { Hr => "HR", Manager => "Manager", Sales => "Sales" }
);

text_enum!(Gender { Male => "Male", Female => "Female" });

text_enum!(
    /// Degree course
    Course { Mca => "MCA", Bca => "BCA", Bsc => "BSC" }
);

/// Employee domain model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Employee {
    pub id: Uuid,
    /// Account that created the record; never changes
    pub owner_id: Uuid,
    #[schema(example = "Ravi Kumar")]
    pub name: String,
    #[schema(example = "ravi@example.com")]
    pub email: String,
    #[schema(example = "9876543210")]
    pub mobile: String,
    pub designation: Designation,
    pub gender: Gender,
    pub course: Vec<Course>,
    pub date: Option<NaiveDate>,
    /// Blob store reference of the profile image
    #[schema(example = "uploads/2f1c8a8e-5d0b-4b8e-9a57-3f0a4c1d2e3f.png")]
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Row shape of the `employees` table
#[derive(Debug, Clone, FromRow)]
pub struct EmployeeRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub designation: String,
    pub gender: String,
    pub course: Vec<String>,
    pub date: Option<NaiveDate>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<EmployeeRow> for Employee {
    type Error = StoreError;

    fn try_from(row: EmployeeRow) -> Result<Self, Self::Error> {
        let corrupt = |field: &str, e: UnknownVariant| {
            StoreError::Corrupt(format!("employee {} has {} '{}'", row.id, field, e.0))
        };

        let designation = row.designation.parse().map_err(|e| corrupt("designation", e))?;
        let gender = row.gender.parse().map_err(|e| corrupt("gender", e))?;
        let course = row
            .course
            .iter()
            .map(|c| c.parse::<Course>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| corrupt("course", e))?;

        Ok(Employee {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            email: row.email,
            mobile: row.mobile,
            designation,
            gender,
            course,
            date: row.date,
            image: row.image,
            created_at: row.created_at,
        })
    }
}

/// Employee fields as submitted by a client, before validation.
///
/// Blank values count as absent. Unknown form fields (including any attempt
/// to name an owner) are dropped while parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub designation: Option<String>,
    pub gender: Option<String>,
    pub course: Vec<String>,
    pub date: Option<String>,
}

impl EmployeeForm {
    /// Record one form field. `course` may repeat or hold a comma-separated list.
    pub fn set(&mut self, field: &str, value: String) {
        let value = value.trim().to_string();
        if value.is_empty() {
            return;
        }
        match field {
            "name" => self.name = Some(value),
            "email" => self.email = Some(value),
            "mobile" => self.mobile = Some(value),
            "designation" => self.designation = Some(value),
            "gender" => self.gender = Some(value),
            "course" | "course[]" => self.course.extend(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string),
            ),
            "date" => self.date = Some(value),
            _ => {}
        }
    }

    /// True when every field required to create an employee is present
    pub fn is_complete(&self) -> bool {
        self.name.is_some()
            && self.email.is_some()
            && self.mobile.is_some()
            && self.designation.is_some()
            && self.gender.is_some()
            && !self.course.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        *self == EmployeeForm::default()
    }
}

/// A validated set of employee field changes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeePatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub designation: Option<Designation>,
    pub gender: Option<Gender>,
    pub course: Option<Vec<Course>>,
    pub date: Option<NaiveDate>,
}

impl EmployeePatch {
    /// Overlay the provided fields onto `employee`, leaving the rest untouched
    pub fn apply(self, employee: &mut Employee) {
        if let Some(name) = self.name {
            employee.name = name;
        }
        if let Some(email) = self.email {
            employee.email = email;
        }
        if let Some(mobile) = self.mobile {
            employee.mobile = mobile;
        }
        if let Some(designation) = self.designation {
            employee.designation = designation;
        }
        if let Some(gender) = self.gender {
            employee.gender = gender;
        }
        if let Some(course) = self.course {
            employee.course = course;
        }
        if let Some(date) = self.date {
            employee.date = Some(date);
        }
    }
}

/// Multipart body accepted by the add and update endpoints (documentation only)
#[derive(Debug, ToSchema)]
pub struct EmployeeUpload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    #[schema(example = "HR")]
    pub designation: Option<String>,
    #[schema(example = "Female")]
    pub gender: Option<String>,
    /// Repeat the field or send a comma-separated list, e.g. `MCA,BSC`
    #[schema(example = "MCA")]
    pub course: Option<String>,
    #[schema(example = "2024-05-01")]
    pub date: Option<String>,
    /// `.jpg`, `.jpeg` or `.png`, at most 5 MB
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<Vec<u8>>,
}

/// An employee together with its position in the owner's list
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NumberedEmployee {
    /// 1-based rank by creation time, computed at read time
    pub no: usize,
    #[serde(flatten)]
    pub employee: Employee,
}

/// Response for a single employee
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EmployeeResponse {
    pub message: String,
    pub employee: Employee,
}

/// Response for the employee list
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EmployeeListResponse {
    pub message: String,
    pub employees: Vec<NumberedEmployee>,
}
