pub mod project_models;
pub mod todo_models;
pub mod user_models;

/// Status given to projects and todos created without one.
pub const DEFAULT_STATUS: &str = "not_started";

/// Collects "<Field> can't be blank" for every blank field, in order.
pub fn require_present(errors: &mut Vec<String>, fields: &[(&str, &str)]) {
    for (label, value) in fields {
        if value.trim().is_empty() {
            errors.push(format!("{label} can't be blank"));
        }
    }
}

/// Presence rules shared by projects and todos.
pub fn validate_fields(title: &str, description: &str, status: &str) -> Vec<String> {
    let mut errors = Vec::new();
    require_present(
        &mut errors,
        &[
            ("Title", title),
            ("Description", description),
            ("Status", status),
        ],
    );
    errors
}

pub fn now() -> chrono::NaiveDateTime {
    chrono::Utc::now().naive_utc()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_blank_field_is_reported() {
        let mut errors = Vec::new();
        require_present(
            &mut errors,
            &[("Title", ""), ("Description", "   "), ("Status", "done")],
        );
        assert_eq!(
            errors,
            vec!["Title can't be blank", "Description can't be blank"]
        );
    }
}
