//! Pure request validation. Each function checks one request shape and
//! returns either the validated input or a list of per-field errors; no
//! workflow is ever invoked with unchecked data.

use domain::{SortBy, SortOrder, TodoPriority, TodoStatus};
use time::OffsetDateTime;
use todo_feature::ListTodosQuery;

use crate::error::FieldError;
use crate::routes::auth::{LoginBody, RegisterBody, UpdateProfileBody};
use crate::routes::todos::{CreateTodoBody, ListTodosParams, UpdateTodoBody};

#[derive(Debug)]
pub struct ValidRegister {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug)]
pub struct ValidLogin {
    pub email: String,
    pub password: String,
}

#[derive(Debug)]
pub struct ValidCreateTodo {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<TodoPriority>,
    pub due_date: Option<OffsetDateTime>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ValidUpdateTodo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TodoStatus>,
    pub priority: Option<TodoPriority>,
    pub due_date: Option<Option<OffsetDateTime>>,
    pub tags: Option<Vec<String>>,
}

pub fn validate_register(body: &RegisterBody) -> Result<ValidRegister, Vec<FieldError>> {
    let mut errors = Vec::new();

    let username = body.username.as_deref().unwrap_or_default();
    if username.chars().count() < 3
        || username.chars().count() > 30
        || !username.chars().all(|c| c.is_ascii_alphanumeric())
    {
        errors.push(FieldError::new(
            "username",
            "username must be 3-30 alphanumeric characters",
        ));
    }

    let email = body.email.as_deref().unwrap_or_default();
    if !is_valid_email(email) {
        errors.push(FieldError::new("email", "email must be a valid email"));
    }

    let password = body.password.as_deref().unwrap_or_default();
    if password.chars().count() < 6 {
        errors.push(FieldError::new(
            "password",
            "password must be at least 6 characters",
        ));
    }

    if body.confirm_password.as_deref() != Some(password) {
        errors.push(FieldError::new(
            "confirmPassword",
            "confirmPassword must match password",
        ));
    }

    if errors.is_empty() {
        Ok(ValidRegister {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        })
    } else {
        Err(errors)
    }
}

pub fn validate_login(body: &LoginBody) -> Result<ValidLogin, Vec<FieldError>> {
    let mut errors = Vec::new();

    let email = body.email.as_deref().unwrap_or_default();
    if email.is_empty() {
        errors.push(FieldError::new("email", "email is required"));
    }

    let password = body.password.as_deref().unwrap_or_default();
    if password.is_empty() {
        errors.push(FieldError::new("password", "password is required"));
    }

    if errors.is_empty() {
        Ok(ValidLogin {
            email: email.to_string(),
            password: password.to_string(),
        })
    } else {
        Err(errors)
    }
}

pub fn validate_update_profile(body: &UpdateProfileBody) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    if let Some(username) = &body.username {
        if username.chars().count() < 3
            || username.chars().count() > 30
            || !username.chars().all(|c| c.is_ascii_alphanumeric())
        {
            errors.push(FieldError::new(
                "username",
                "username must be 3-30 alphanumeric characters",
            ));
        }
    }

    if let Some(email) = &body.email {
        if !is_valid_email(email) {
            errors.push(FieldError::new("email", "email must be a valid email"));
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

pub fn validate_create_todo(body: &CreateTodoBody) -> Result<ValidCreateTodo, Vec<FieldError>> {
    let mut errors = Vec::new();

    let title = body.title.as_deref().unwrap_or_default();
    if title.is_empty() || title.chars().count() > 200 {
        errors.push(FieldError::new("title", "title must be 1-200 characters"));
    }

    if let Some(description) = &body.description {
        if description.chars().count() > 1000 {
            errors.push(FieldError::new(
                "description",
                "description must be at most 1000 characters",
            ));
        }
    }

    let priority = match &body.priority {
        Some(raw) => match TodoPriority::from_str(raw) {
            Some(priority) => Some(priority),
            None => {
                errors.push(FieldError::new(
                    "priority",
                    "priority must be one of low, medium, high",
                ));
                None
            }
        },
        None => None,
    };

    if let Some(due_date) = body.due_date {
        if due_date <= OffsetDateTime::now_utc() {
            errors.push(FieldError::new("dueDate", "dueDate must be in the future"));
        }
    }

    if errors.is_empty() {
        Ok(ValidCreateTodo {
            title: title.to_string(),
            description: body.description.clone(),
            priority,
            due_date: body.due_date,
            tags: body.tags.clone(),
        })
    } else {
        Err(errors)
    }
}

pub fn validate_update_todo(body: &UpdateTodoBody) -> Result<ValidUpdateTodo, Vec<FieldError>> {
    let mut errors = Vec::new();

    if body.title.is_none()
        && body.description.is_none()
        && body.status.is_none()
        && body.priority.is_none()
        && body.due_date.is_none()
        && body.tags.is_none()
    {
        errors.push(FieldError::new("body", "at least one field is required"));
    }

    if let Some(title) = &body.title {
        if title.is_empty() || title.chars().count() > 200 {
            errors.push(FieldError::new("title", "title must be 1-200 characters"));
        }
    }

    if let Some(description) = &body.description {
        if description.chars().count() > 1000 {
            errors.push(FieldError::new(
                "description",
                "description must be at most 1000 characters",
            ));
        }
    }

    let status = match &body.status {
        Some(raw) => match TodoStatus::from_str(raw) {
            Some(status) => Some(status),
            None => {
                errors.push(FieldError::new(
                    "status",
                    "status must be one of pending, in_progress, completed",
                ));
                None
            }
        },
        None => None,
    };

    let priority = match &body.priority {
        Some(raw) => match TodoPriority::from_str(raw) {
            Some(priority) => Some(priority),
            None => {
                errors.push(FieldError::new(
                    "priority",
                    "priority must be one of low, medium, high",
                ));
                None
            }
        },
        None => None,
    };

    if errors.is_empty() {
        Ok(ValidUpdateTodo {
            title: body.title.clone(),
            description: body.description.clone(),
            status,
            priority,
            due_date: body.due_date,
            tags: body.tags.clone(),
        })
    } else {
        Err(errors)
    }
}

pub fn validate_list(params: &ListTodosParams) -> Result<ListTodosQuery, Vec<FieldError>> {
    let mut errors = Vec::new();
    let mut query = ListTodosQuery::default();

    if let Some(page) = params.page {
        query.page = page;
    }
    if let Some(limit) = params.limit {
        query.limit = limit;
    }

    if let Some(raw) = &params.status {
        match TodoStatus::from_str(raw) {
            Some(status) => query.status = Some(status),
            None => errors.push(FieldError::new(
                "status",
                "status must be one of pending, in_progress, completed",
            )),
        }
    }

    if let Some(raw) = &params.priority {
        match TodoPriority::from_str(raw) {
            Some(priority) => query.priority = Some(priority),
            None => errors.push(FieldError::new(
                "priority",
                "priority must be one of low, medium, high",
            )),
        }
    }

    query.search = params.search.clone().filter(|s| !s.is_empty());

    if let Some(raw) = &params.sort_by {
        match parse_sort_by(raw) {
            Some(sort_by) => query.sort_by = sort_by,
            None => errors.push(FieldError::new(
                "sortBy",
                "sortBy must be one of createdAt, updatedAt, dueDate, priority, title",
            )),
        }
    }

    if let Some(raw) = &params.sort_order {
        match parse_sort_order(raw) {
            Some(sort_order) => query.sort_order = sort_order,
            None => errors.push(FieldError::new("sortOrder", "sortOrder must be ASC or DESC")),
        }
    }

    if errors.is_empty() { Ok(query) } else { Err(errors) }
}

fn parse_sort_by(raw: &str) -> Option<SortBy> {
    match raw {
        "createdAt" => Some(SortBy::CreatedAt),
        "updatedAt" => Some(SortBy::UpdatedAt),
        "dueDate" => Some(SortBy::DueDate),
        "priority" => Some(SortBy::Priority),
        "title" => Some(SortBy::Title),
        _ => None,
    }
}

fn parse_sort_order(raw: &str) -> Option<SortOrder> {
    if raw.eq_ignore_ascii_case("asc") {
        Some(SortOrder::Asc)
    } else if raw.eq_ignore_ascii_case("desc") {
        Some(SortOrder::Desc)
    } else {
        None
    }
}

/// Minimal structural email check: local part, one '@', dotted domain
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}
