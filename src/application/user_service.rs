use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::UserRepository;
use crate::domain::user::{UserInput, UserPatch, UserView};

pub struct UserService<R> {
    repo: R,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_user(&self, input: UserInput) -> Result<UserView, DomainError> {
        validate_field("Username", &input.username)?;
        validate_field("Password", &input.password)?;
        validate_field("Email", &input.email)?;
        self.repo.create(input)
    }

    pub fn list_users(&self) -> Result<Vec<UserView>, DomainError> {
        self.repo.find_all()
    }

    pub fn get_user(&self, id: Uuid) -> Result<Option<UserView>, DomainError> {
        self.repo.find_by_id(id)
    }

    /// Applies only the fields present on the patch; everything else keeps
    /// its stored value. Supplied fields must be non-empty.
    pub fn update_user(&self, id: Uuid, patch: UserPatch) -> Result<UserView, DomainError> {
        let mut user = self
            .repo
            .find_by_id(id)?
            .ok_or_else(|| DomainError::not_found("User", id))?;

        if let Some(username) = patch.username {
            validate_field("Username", &username)?;
            user.username = username;
        }
        if let Some(password) = patch.password {
            validate_field("Password", &password)?;
            user.password = password;
        }
        if let Some(email) = patch.email {
            validate_field("Email", &email)?;
            user.email = email;
        }

        self.repo.update(user)
    }

    pub fn delete_user(&self, id: Uuid) -> Result<(), DomainError> {
        if self.repo.delete(id)? {
            Ok(())
        } else {
            Err(DomainError::not_found("User", id))
        }
    }
}

fn validate_field(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::InvalidInput(format!(
            "{} cannot be empty",
            field
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::memory::InMemoryUserRepository;

    fn service() -> UserService<InMemoryUserRepository> {
        UserService::new(InMemoryUserRepository::default())
    }

    fn input(username: &str) -> UserInput {
        UserInput {
            username: username.to_string(),
            password: "hunter2".to_string(),
            email: format!("{}@example.com", username),
        }
    }

    #[test]
    fn create_and_get_roundtrip() {
        let svc = service();
        let created = svc.create_user(input("alice")).expect("create failed");

        let found = svc
            .get_user(created.id)
            .expect("get failed")
            .expect("user should exist");
        assert_eq!(found.username, "alice");
        assert_eq!(found.email, "alice@example.com");
    }

    #[test]
    fn create_rejects_empty_username() {
        let err = service().create_user(input("  ")).unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn update_applies_only_present_fields() {
        let svc = service();
        let created = svc.create_user(input("bob")).expect("create failed");

        let updated = svc
            .update_user(
                created.id,
                UserPatch {
                    email: Some("bob@corp.example".to_string()),
                    ..Default::default()
                },
            )
            .expect("update failed");

        assert_eq!(updated.username, "bob");
        assert_eq!(updated.password, "hunter2");
        assert_eq!(updated.email, "bob@corp.example");
    }

    #[test]
    fn update_rejects_empty_supplied_field() {
        let svc = service();
        let created = svc.create_user(input("carol")).expect("create failed");

        let err = svc
            .update_user(
                created.id,
                UserPatch {
                    password: Some("".to_string()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn update_unknown_id_is_not_found() {
        let err = service()
            .update_user(Uuid::new_v4(), UserPatch::default())
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn delete_removes_user() {
        let svc = service();
        let created = svc.create_user(input("dave")).expect("create failed");

        svc.delete_user(created.id).expect("delete failed");
        assert!(svc.get_user(created.id).expect("get failed").is_none());
    }

    #[test]
    fn delete_unknown_id_is_not_found() {
        let err = service().delete_user(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }
}
