//! Form validation run before any gateway call.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{NewComment, NewPost, PostPatch, resolve_slug, slugify};
use crate::error::DomainError;

/// A single field-level problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// All field problems found in one form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormErrors(Vec<FieldError>);

impl FormErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn into_result(self) -> Result<(), DomainError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DomainError::InvalidForm(self))
        }
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.iter().map(|e| e.message.as_str()).collect();
        f.write_str(&messages.join("; "))
    }
}

/// Registration form input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrationForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Login form input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// `^[^\s@]+@[^\s@]+\.[^\s@]+$`
pub fn is_valid_email(email: &str) -> bool {
    let valid_part = |s: &str| !s.is_empty() && !s.chars().any(|c| c.is_whitespace() || c == '@');

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if !valid_part(local) || domain.contains('@') {
        return false;
    }
    // Some dot must split the domain into two non-empty halves.
    domain
        .match_indices('.')
        .any(|(i, _)| valid_part(&domain[..i]) && valid_part(&domain[i + 1..]))
}

fn check_email(errors: &mut FormErrors, email: &str) {
    if email.is_empty() {
        errors.add("email", "Email is required");
    } else if !is_valid_email(email) {
        errors.add("email", "Please enter a valid email");
    }
}

pub fn validate_registration(form: &RegistrationForm) -> Result<(), DomainError> {
    let mut errors = FormErrors::default();
    check_email(&mut errors, &form.email);

    let password = &form.password;
    if password.is_empty() {
        errors.add("password", "Password is required");
    } else if password.chars().count() < 8 {
        errors.add("password", "Password must be at least 8 characters");
    } else if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.add(
            "password",
            "Password must contain at least one lowercase letter",
        );
    } else if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.add(
            "password",
            "Password must contain at least one uppercase letter",
        );
    } else if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.add("password", "Password must contain at least one number");
    }

    if form.confirm_password.is_empty() {
        errors.add("confirm_password", "Please confirm your password");
    } else if form.password != form.confirm_password {
        errors.add("confirm_password", "Passwords do not match");
    }

    errors.into_result()
}

pub fn validate_login(form: &LoginForm) -> Result<(), DomainError> {
    let mut errors = FormErrors::default();
    check_email(&mut errors, &form.email);
    if form.password.is_empty() {
        errors.add("password", "Password is required");
    } else if form.password.chars().count() < 6 {
        errors.add("password", "Password must be at least 6 characters");
    }
    errors.into_result()
}

/// Visible text of an HTML fragment: tags dropped, whitespace collapsed.
pub fn html_text(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => {
                in_tag = true;
                text.push(' ');
            }
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text.replace("&nbsp;", " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn validate_new_post(post: &NewPost) -> Result<(), DomainError> {
    if post.title.trim().is_empty() || html_text(&post.content).is_empty() {
        return Err(DomainError::Validation(
            "Please fill in both title and content".to_string(),
        ));
    }
    if resolve_slug(post).is_empty() {
        return Err(DomainError::Validation(
            "The title must contain at least one letter or digit to build a slug".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_post_patch(patch: &PostPatch) -> Result<(), DomainError> {
    if patch.is_empty() {
        return Err(DomainError::Validation("Nothing to update".to_string()));
    }
    if patch.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(DomainError::Validation("Title cannot be empty".to_string()));
    }
    if patch
        .content
        .as_deref()
        .is_some_and(|c| html_text(c).is_empty())
    {
        return Err(DomainError::Validation("Content cannot be empty".to_string()));
    }
    if patch.slug.as_deref().is_some_and(|s| slugify(s).is_empty()) {
        return Err(DomainError::Validation("Slug cannot be empty".to_string()));
    }
    Ok(())
}

pub fn validate_new_comment(comment: &NewComment) -> Result<(), DomainError> {
    let mut errors = FormErrors::default();
    if comment.author_name.trim().is_empty() {
        errors.add("author_name", "Name is required");
    }
    if comment.content.trim().is_empty() {
        errors.add("content", "Comment cannot be empty");
    }
    if let Some(email) = comment.author_email.as_deref().map(str::trim)
        && !email.is_empty()
        && !is_valid_email(email)
    {
        errors.add("author_email", "Please enter a valid email");
    }
    errors.into_result()
}
