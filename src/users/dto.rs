use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::Audit;
use crate::dto::nullable;
use crate::error::ApiResult;
use crate::users::repo_types::User;
use crate::validate;

fn default_true() -> bool {
    true
}

fn check_full_name(full_name: Option<&str>) -> ApiResult<()> {
    match full_name {
        Some(n) => validate::max_len("full_name", n, 255),
        None => Ok(()),
    }
}

/// Admin-side user creation.
#[derive(Debug, Deserialize)]
pub struct UserCreate {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_superuser: bool,
}

impl UserCreate {
    pub fn normalize(&mut self) {
        self.email = validate::normalize_email(&self.email);
    }

    pub fn validate(&self) -> ApiResult<()> {
        validate::email(&self.email)?;
        validate::password("password", &self.password)?;
        check_full_name(self.full_name.as_deref())
    }
}

/// Public signup payload; role flags are not accepted here.
#[derive(Debug, Deserialize)]
pub struct UserRegister {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

impl From<UserRegister> for UserCreate {
    fn from(r: UserRegister) -> Self {
        Self {
            email: r.email,
            password: r.password,
            full_name: r.full_name,
            is_active: true,
            is_superuser: false,
        }
    }
}

/// Admin-side partial update. A `password` here is hashed before storage.
#[derive(Debug, Default, Deserialize)]
pub struct UserUpdate {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub full_name: Option<Option<String>>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub is_superuser: Option<bool>,
}

impl UserUpdate {
    pub fn normalize(&mut self) {
        if let Some(email) = self.email.as_mut() {
            *email = validate::normalize_email(email);
        }
    }

    pub fn validate(&self) -> ApiResult<()> {
        if let Some(e) = &self.email {
            validate::email(e)?;
        }
        if let Some(p) = &self.password {
            validate::password("password", p)?;
        }
        check_full_name(self.full_name.as_ref().and_then(|n| n.as_deref()))
    }

    /// Applies everything except the password, which the service hashes first.
    pub fn apply(self, user: &mut User) {
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(full_name) = self.full_name {
            user.full_name = full_name;
        }
        if let Some(is_active) = self.is_active {
            user.is_active = is_active;
        }
        if let Some(is_superuser) = self.is_superuser {
            user.is_superuser = is_superuser;
        }
    }
}

/// Self-service profile update.
#[derive(Debug, Default, Deserialize)]
pub struct UserUpdateMe {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub full_name: Option<Option<String>>,
}

impl From<UserUpdateMe> for UserUpdate {
    fn from(me: UserUpdateMe) -> Self {
        Self {
            email: me.email,
            full_name: me.full_name,
            ..Default::default()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdatePassword {
    pub current_password: String,
    pub new_password: String,
}

impl UpdatePassword {
    pub fn validate(&self) -> ApiResult<()> {
        validate::password("new_password", &self.new_password)
    }
}

#[derive(Debug, Serialize)]
pub struct UserPublic {
    pub id: Uuid,
    pub email: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub full_name: Option<String>,
    #[serde(flatten)]
    pub audit: Audit,
}

impl From<User> for UserPublic {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            is_active: u.is_active,
            is_superuser: u.is_superuser,
            full_name: u.full_name,
            audit: u.audit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "a@x.com".into(),
            hashed_password: "$argon2id$stub".into(),
            is_active: true,
            is_superuser: false,
            full_name: Some("Alice".into()),
            audit: Audit::created(None, audit::now()),
        }
    }

    #[test]
    fn create_defaults_and_normalizes_email() {
        let mut input: UserCreate =
            serde_json::from_str(r#"{"email": "  A@X.com ", "password": "longenough1"}"#).unwrap();
        input.normalize();
        assert_eq!(input.email, "a@x.com");
        assert!(input.is_active);
        assert!(!input.is_superuser);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn create_rejects_short_password_and_bad_email() {
        let short: UserCreate =
            serde_json::from_str(r#"{"email": "a@x.com", "password": "short"}"#).unwrap();
        assert!(short.validate().is_err());
        let bad: UserCreate =
            serde_json::from_str(r#"{"email": "not-an-email", "password": "longenough1"}"#)
                .unwrap();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn signup_cannot_grant_superuser() {
        let reg: UserRegister = serde_json::from_str(
            r#"{"email": "a@x.com", "password": "longenough1", "is_superuser": true}"#,
        )
        .unwrap();
        let create = UserCreate::from(reg);
        assert!(!create.is_superuser);
        assert!(create.is_active);
    }

    #[test]
    fn update_apply_leaves_password_alone() {
        let original = user();
        let mut u = original.clone();
        let patch: UserUpdate =
            serde_json::from_str(r#"{"password": "newpassword1", "full_name": null}"#).unwrap();
        patch.apply(&mut u);
        assert_eq!(u.hashed_password, original.hashed_password);
        assert_eq!(u.full_name, None);
        assert_eq!(u.email, original.email);
    }

    #[test]
    fn public_view_has_no_password_fields() {
        let json = serde_json::to_value(UserPublic::from(user())).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("hashed_password"));
        assert!(!obj.contains_key("password"));
        assert_eq!(obj["email"], "a@x.com");
        assert!(obj.contains_key("created_at"));
    }
}
