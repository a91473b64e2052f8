//! Submitted form bodies and their cleaning into validated drafts.
//!
//! A form is echoed back to the client together with its errors when it
//! fails validation, so every form is both `Deserialize` and `Serialize`.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::comment::{Comment, CommentDraft};
use crate::domain::error::{FieldErrors, REQUIRED};
use crate::domain::post::{Post, PostDraft};
use crate::domain::user::{ProfileDraft, RegistrationDraft, User};

const TITLE_MAX: usize = 256;
const NAME_MAX: usize = 150;
const EMAIL_MAX: usize = 254;
const PASSWORD_MIN: usize = 8;

pub const INVALID_EMAIL: &str = "Enter a valid email address.";
pub const INVALID_USERNAME: &str = "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.";

/// What a template receives as `form`: the field values and any errors.
#[derive(Debug, Clone, Serialize)]
pub struct FormContext<T> {
    pub data: T,
    pub errors: FieldErrors,
}

impl<T> FormContext<T> {
    pub fn unbound(data: T) -> Self {
        Self {
            data,
            errors: FieldErrors::new(),
        }
    }

    pub fn invalid(data: T, errors: FieldErrors) -> Self {
        Self { data, errors }
    }
}

fn required(errors: &mut FieldErrors, field: &str, value: &str) -> bool {
    if value.is_empty() {
        errors.add(field, REQUIRED);
        false
    } else {
        true
    }
}

fn max_length(errors: &mut FieldErrors, field: &str, value: &str, max: usize) {
    let len = value.chars().count();
    if len > max {
        errors.add(
            field,
            format!("Ensure this value has at most {max} characters (it has {len})."),
        );
    }
}

static USERNAME_RE: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]+$"));

static EMAIL_RE: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^[-!#$%&'*+/=?^_`{}|~0-9A-Za-z]+(?:\.[-!#$%&'*+/=?^_`{}|~0-9A-Za-z]+)*",
        r"@(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,63}$",
    ))
});

fn is_match(pattern: &LazyLock<Result<Regex, regex::Error>>, value: &str) -> bool {
    pattern.as_ref().is_ok_and(|re| re.is_match(value))
}

fn valid_username(value: &str) -> bool {
    is_match(&USERNAME_RE, value)
}

fn valid_email(value: &str) -> bool {
    is_match(&EMAIL_RE, value)
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub pub_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub category: Option<Uuid>,
    #[serde(default)]
    pub location: Option<Uuid>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "default_true")]
    pub is_published: bool,
}

impl Default for PostForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            text: String::new(),
            pub_date: None,
            category: None,
            location: None,
            image: None,
            is_published: true,
        }
    }
}

impl From<&Post> for PostForm {
    fn from(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            text: post.text.clone(),
            pub_date: Some(post.pub_date),
            category: post.category_id,
            location: post.location_id,
            image: post.image.clone(),
            is_published: post.is_published,
        }
    }
}

impl PostForm {
    pub fn clean(&self) -> Result<PostDraft, FieldErrors> {
        let mut errors = FieldErrors::new();
        let title = self.title.trim();
        if required(&mut errors, "title", title) {
            max_length(&mut errors, "title", title, TITLE_MAX);
        }
        let text = self.text.trim();
        required(&mut errors, "text", text);
        if self.pub_date.is_none() {
            errors.add("pub_date", REQUIRED);
        }
        if self.category.is_none() {
            errors.add("category", REQUIRED);
        }

        match (self.pub_date, self.category) {
            (Some(pub_date), Some(category_id)) if errors.is_empty() => Ok(PostDraft {
                title: title.to_owned(),
                text: text.to_owned(),
                pub_date,
                category_id,
                location_id: self.location,
                image: self
                    .image
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_owned),
                is_published: self.is_published,
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub text: String,
}

impl From<&Comment> for CommentForm {
    fn from(comment: &Comment) -> Self {
        Self {
            text: comment.text.clone(),
        }
    }
}

impl CommentForm {
    pub fn clean(&self) -> Result<CommentDraft, FieldErrors> {
        let mut errors = FieldErrors::new();
        let text = self.text.trim();
        required(&mut errors, "text", text);
        errors.into_result().map(|()| CommentDraft {
            text: text.to_owned(),
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
}

impl From<&User> for ProfileForm {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
        }
    }
}

fn clean_username(errors: &mut FieldErrors, username: &str) {
    if required(errors, "username", username) {
        max_length(errors, "username", username, NAME_MAX);
        if !valid_username(username) {
            errors.add("username", INVALID_USERNAME);
        }
    }
}

fn clean_email(errors: &mut FieldErrors, email: &str) {
    if !email.is_empty() {
        max_length(errors, "email", email, EMAIL_MAX);
        if !valid_email(email) {
            errors.add("email", INVALID_EMAIL);
        }
    }
}

impl ProfileForm {
    pub fn clean(&self) -> Result<ProfileDraft, FieldErrors> {
        let mut errors = FieldErrors::new();
        let username = self.username.trim();
        clean_username(&mut errors, username);
        let first_name = self.first_name.trim();
        max_length(&mut errors, "first_name", first_name, NAME_MAX);
        let last_name = self.last_name.trim();
        max_length(&mut errors, "last_name", last_name, NAME_MAX);
        let email = self.email.trim();
        clean_email(&mut errors, email);

        errors.into_result().map(|()| ProfileDraft {
            username: username.to_owned(),
            email: email.to_owned(),
            first_name: first_name.to_owned(),
            last_name: last_name.to_owned(),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl RegisterRequest {
    pub fn clean(&self) -> Result<RegistrationDraft, FieldErrors> {
        let mut errors = FieldErrors::new();
        let username = self.username.trim();
        clean_username(&mut errors, username);
        let email = self.email.trim();
        clean_email(&mut errors, email);
        if required(&mut errors, "password", &self.password)
            && self.password.chars().count() < PASSWORD_MIN
        {
            errors.add(
                "password",
                format!(
                    "This password is too short. It must contain at least {PASSWORD_MIN} characters."
                ),
            );
        }

        errors.into_result().map(|()| RegistrationDraft {
            username: username.to_owned(),
            email: email.to_owned(),
            password: self.password.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_form() -> PostForm {
        PostForm {
            title: "  Title  ".into(),
            text: "Body".into(),
            pub_date: Some(Utc::now()),
            category: Some(Uuid::new_v4()),
            ..PostForm::default()
        }
    }

    #[test]
    fn post_form_trims_and_defaults_to_published() {
        let draft = post_form().clean().unwrap();
        assert_eq!(draft.title, "Title");
        assert!(draft.is_published);
        assert!(draft.image.is_none());
    }

    #[test]
    fn post_form_reports_every_missing_field() {
        let errors = PostForm::default().clean().unwrap_err();
        for field in ["title", "text", "pub_date", "category"] {
            assert_eq!(errors.get(field), Some(&[REQUIRED.to_string()][..]), "{field}");
        }
        assert!(errors.get("location").is_none());
    }

    #[test]
    fn post_title_length_is_limited() {
        let mut form = post_form();
        form.title = "x".repeat(257);
        let errors = form.clean().unwrap_err();
        assert_eq!(
            errors.get("title").unwrap()[0],
            "Ensure this value has at most 256 characters (it has 257)."
        );
    }

    #[test]
    fn blank_comment_is_rejected() {
        assert!(CommentForm { text: "   ".into() }.clean().is_err());
        assert_eq!(
            CommentForm { text: " hi ".into() }.clean().unwrap().text,
            "hi"
        );
    }

    #[test]
    fn profile_form_checks_username_and_email() {
        let form = ProfileForm {
            username: "bad name!".into(),
            email: "not-an-email".into(),
            ..ProfileForm::default()
        };
        let errors = form.clean().unwrap_err();
        assert_eq!(errors.get("username").unwrap()[0], INVALID_USERNAME);
        assert_eq!(errors.get("email").unwrap()[0], INVALID_EMAIL);

        let ok = ProfileForm {
            username: "leo.t+1".into(),
            email: String::new(),
            ..ProfileForm::default()
        };
        assert!(ok.clean().is_ok());
    }

    #[test]
    fn email_domain_must_be_well_formed() {
        for bad in [
            "user@example..com",
            "user@example.com.",
            "user@.example.com",
            "user@example",
            "us..er@example.com",
            "user name@example.com",
        ] {
            assert!(!valid_email(bad), "{bad}");
        }
        for good in ["user@example.com", "first.last+tag@mail.example.co"] {
            assert!(valid_email(good), "{good}");
        }
    }

    #[test]
    fn username_allows_unicode_letters_and_the_usual_symbols() {
        assert!(valid_username("Łukasz_99"));
        assert!(valid_username("a@b.c+d-e"));
        assert!(!valid_username("with space"));
        assert!(!valid_username("semi;colon"));
    }

    #[test]
    fn registration_requires_a_long_enough_password() {
        let request = RegisterRequest {
            username: "reader".into(),
            email: "reader@example.com".into(),
            password: "short".into(),
        };
        assert!(request.clean().unwrap_err().get("password").is_some());
    }
}
