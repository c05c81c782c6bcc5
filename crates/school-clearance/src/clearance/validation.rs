use super::decision::DecisionRequest;
use super::domain::{ClearanceItemFields, DepartmentFields};

/// Minimum length, in characters, of names and officer identity fields.
pub const MIN_NAME_CHARS: usize = 2;

/// Rejections raised before any store call is made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Missing { field: &'static str },
    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },
}

/// Trim every text field and drop blank optional descriptions.
pub fn department_fields(fields: DepartmentFields) -> Result<DepartmentFields, ValidationError> {
    Ok(DepartmentFields {
        name: named("name", &fields.name)?,
        description: optional_text(fields.description),
        officer_name: named("officer_name", &fields.officer_name)?,
        officer_title: named("officer_title", &fields.officer_title)?,
    })
}

pub fn item_fields(fields: ClearanceItemFields) -> Result<ClearanceItemFields, ValidationError> {
    let department_id = required("department_id", fields.department_id.as_str())?;
    Ok(ClearanceItemFields {
        department_id: department_id.into(),
        name: named("name", &fields.name)?,
        description: optional_text(fields.description),
    })
}

pub fn decision(request: DecisionRequest) -> Result<DecisionRequest, ValidationError> {
    let student_id = required("student_id", request.student_id.as_str())?;
    let department_id = required("department_id", request.department_id.as_str())?;
    let academic_year = match request.academic_year {
        Some(year) => Some(required("academic_year", &year)?),
        None => None,
    };

    Ok(DecisionRequest {
        student_id: student_id.into(),
        department_id: department_id.into(),
        status: request.status,
        remarks: optional_text(request.remarks),
        academic_year,
    })
}

pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

fn required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Missing { field });
    }
    Ok(trimmed.to_string())
}

fn named(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = required(field, value)?;
    if trimmed.chars().count() < MIN_NAME_CHARS {
        return Err(ValidationError::TooShort {
            field,
            min: MIN_NAME_CHARS,
        });
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clearance::domain::{ClearanceStatus, DepartmentId, StudentId};

    fn library() -> DepartmentFields {
        DepartmentFields {
            name: "  Library ".to_string(),
            description: Some("   ".to_string()),
            officer_name: "Grace Mensah".to_string(),
            officer_title: "Head Librarian".to_string(),
        }
    }

    #[test]
    fn department_fields_are_trimmed() {
        let fields = department_fields(library()).expect("valid department");
        assert_eq!(fields.name, "Library");
        assert_eq!(fields.description, None);
    }

    #[test]
    fn single_character_officer_title_is_rejected() {
        let mut fields = library();
        fields.officer_title = " X ".to_string();
        assert_eq!(
            department_fields(fields),
            Err(ValidationError::TooShort {
                field: "officer_title",
                min: MIN_NAME_CHARS
            })
        );
    }

    #[test]
    fn blank_department_name_is_missing() {
        let mut fields = library();
        fields.name = "   ".to_string();
        assert_eq!(
            department_fields(fields),
            Err(ValidationError::Missing { field: "name" })
        );
    }

    #[test]
    fn item_requires_department_reference() {
        let fields = ClearanceItemFields {
            department_id: DepartmentId::new(""),
            name: "Return books".to_string(),
            description: None,
        };
        assert_eq!(
            item_fields(fields),
            Err(ValidationError::Missing {
                field: "department_id"
            })
        );
    }

    #[test]
    fn decision_blank_remarks_become_none() {
        let request = DecisionRequest {
            student_id: StudentId::new(" stu-1 "),
            department_id: DepartmentId::new("dept-1"),
            status: ClearanceStatus::Cleared,
            remarks: Some("  ".to_string()),
            academic_year: Some(" 2026 ".to_string()),
        };
        let request = decision(request).expect("valid decision");
        assert_eq!(request.student_id.as_str(), "stu-1");
        assert_eq!(request.remarks, None);
        assert_eq!(request.academic_year.as_deref(), Some("2026"));
    }
}
