use crate::database::models::User;
use crate::database::{DatabaseError, Repository};

/// Local user records for identities vouched for by the external provider
pub struct UserService<'a> {
    repo: &'a dyn Repository,
}

impl<'a> UserService<'a> {
    pub fn new(repo: &'a dyn Repository) -> Self {
        Self { repo }
    }

    /// Look up the user by email, creating one on first login. New users are
    /// named after the local part of their email address.
    pub async fn get_or_create(&self, email: &str) -> Result<User, DatabaseError> {
        if let Some(user) = self.repo.find_user_by_email(email).await? {
            return Ok(user);
        }

        let name = Self::name_from_email(email);
        self.repo.create_user(email, &name).await
    }

    fn name_from_email(email: &str) -> String {
        match email.split_once('@') {
            Some((local, _)) if !local.is_empty() => local.to_string(),
            _ => email.to_string(),
        }
    }
}
