//! User service for usermail.
//!
//! CRUD operations with validation. Every successful insert, update and
//! delete queues a notification mail to the account's address; queueing
//! never fails and delivery problems never reach the caller.

use tracing::info;

use crate::db::{Database, ListRequest, NewUser, Page, User, UserRepository, UserUpdate};
use crate::mail::{MailSender, MessageType, Placeholders};
use crate::{Result, UsermailError};

use super::password::hash_password;
use super::validation::{
    validate_email, validate_first_name, validate_id, validate_last_name, validate_password,
    validate_username, ValidationError,
};

/// Request to create a user.
#[derive(Debug, Clone)]
pub struct NewUserRequest {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Plain-text password; hashed before storage.
    pub password: String,
}

impl NewUserRequest {
    /// Create a new user request.
    pub fn new(
        username: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    fn validate(&self) -> std::result::Result<(), ValidationError> {
        validate_username(self.username.trim())?;
        validate_first_name(&self.first_name)?;
        validate_last_name(&self.last_name)?;
        validate_email(self.email.trim())?;
        validate_password(&self.password)?;
        Ok(())
    }
}

/// Service for user operations.
pub struct UserService<'a> {
    db: &'a Database,
    mail: MailSender,
}

impl<'a> UserService<'a> {
    /// Create a new UserService with the given database reference and mail queue.
    pub fn new(db: &'a Database, mail: MailSender) -> Self {
        Self { db, mail }
    }

    fn repo(&self) -> UserRepository<'_> {
        UserRepository::new(self.db.pool())
    }

    /// Create a user and queue a welcome mail.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A field is missing or malformed
    /// - The email or username belongs to another live account
    pub async fn insert(&self, request: NewUserRequest) -> Result<User> {
        request.validate()?;

        let email = request.email.trim();
        let username = request.username.trim();
        let repo = self.repo();

        if repo.get_by_email(email).await?.is_some() {
            return Err(UsermailError::Conflict("email".to_string()));
        }
        if repo.get_by_username(username).await?.is_some() {
            return Err(UsermailError::Conflict("username".to_string()));
        }

        let password_hash = hash_password(&request.password)?;
        let new_user = NewUser::new(
            username,
            request.first_name.trim(),
            request.last_name.trim(),
            email,
            password_hash,
        );
        let user = repo.create(&new_user).await?;
        info!("User {} created (id {})", user.username, user.id);

        self.notify(&user.email, &user, MessageType::Welcome);
        Ok(user)
    }

    /// Update a live user and queue an account-update mail.
    ///
    /// The mail goes to the email address held before the update and
    /// carries the updated names.
    ///
    /// Only the fields set in `update` change; a new password is hashed
    /// before storage.
    pub async fn update(&self, id: i64, update: UserUpdate) -> Result<User> {
        validate_id(id)?;
        let update = normalize_update(update)?;

        let repo = self.repo();
        let existing = self.get_live(id).await?;

        if let Some(ref email) = update.email {
            if let Some(other) = repo.get_by_email(email).await? {
                if other.id != existing.id {
                    return Err(UsermailError::Conflict("email".to_string()));
                }
            }
        }
        if let Some(ref username) = update.username {
            if let Some(other) = repo.get_by_username(username).await? {
                if other.id != existing.id {
                    return Err(UsermailError::Conflict("username".to_string()));
                }
            }
        }

        let password_hash = update.password.as_deref().map(hash_password).transpose()?;
        let update = match password_hash {
            Some(hash) => update.password(hash),
            None => update,
        };

        let user = repo
            .update(id, &update)
            .await?
            .ok_or_else(|| UsermailError::NotFound("user".to_string()))?;
        info!("User {} updated (id {})", user.username, user.id);

        // Sent to the address the account had before this change
        self.notify(&existing.email, &user, MessageType::AccountUpdate);
        Ok(user)
    }

    /// Soft-delete a live user and queue an account-deletion mail.
    ///
    /// Returns the user as it was before deletion.
    pub async fn delete(&self, id: i64) -> Result<User> {
        validate_id(id)?;
        let user = self.get_live(id).await?;

        if !self.repo().soft_delete(id).await? {
            return Err(UsermailError::NotFound("user".to_string()));
        }
        info!("User {} deleted (id {})", user.username, user.id);

        self.notify(&user.email, &user, MessageType::AccountDelete);
        Ok(user)
    }

    /// Get a user by ID.
    ///
    /// Soft-deleted users are reported as not found.
    pub async fn get_by_id(&self, id: i64) -> Result<User> {
        validate_id(id)?;
        self.repo()
            .get_by_id(id)
            .await?
            .filter(|u| !u.is_deleted)
            .ok_or_else(|| UsermailError::NotFound("user".to_string()))
    }

    /// Get a live user by email.
    pub async fn get_by_email(&self, email: &str) -> Result<User> {
        let email = email.trim();
        validate_email(email)?;
        self.repo()
            .get_by_email(email)
            .await?
            .ok_or_else(|| UsermailError::NotFound("user".to_string()))
    }

    /// List all live users.
    pub async fn list_all(&self) -> Result<Vec<User>> {
        self.repo().list_all().await
    }

    /// List live users with search, sorting and paging.
    pub async fn list(&self, request: &ListRequest) -> Result<Page<User>> {
        self.repo().list(request).await
    }

    async fn get_live(&self, id: i64) -> Result<User> {
        let user = self
            .repo()
            .get_by_id(id)
            .await?
            .filter(|u| !u.is_deleted)
            .ok_or_else(|| UsermailError::NotFound("user".to_string()))?;
        if !user.is_live() {
            return Err(ValidationError::UserNotActive.into());
        }
        Ok(user)
    }

    fn notify(&self, recipient: &str, user: &User, message_type: MessageType) {
        let mut placeholders = Placeholders::new();
        placeholders.insert("FirstName".to_string(), user.first_name.clone());
        placeholders.insert("LastName".to_string(), user.last_name.clone());
        self.mail
            .enqueue_mail(recipient, message_type, placeholders);
    }
}

/// Trim and validate the fields set in an update.
fn normalize_update(update: UserUpdate) -> Result<UserUpdate> {
    let username = update.username.map(|s| s.trim().to_string());
    let first_name = update.first_name.map(|s| s.trim().to_string());
    let last_name = update.last_name.map(|s| s.trim().to_string());
    let email = update.email.map(|s| s.trim().to_string());

    if let Some(ref username) = username {
        validate_username(username)?;
    }
    if let Some(ref first_name) = first_name {
        validate_first_name(first_name)?;
    }
    if let Some(ref last_name) = last_name {
        validate_last_name(last_name)?;
    }
    if let Some(ref email) = email {
        validate_email(email)?;
    }
    if let Some(ref password) = update.password {
        validate_password(password)?;
    }

    Ok(UserUpdate {
        username,
        first_name,
        last_name,
        email,
        password: update.password,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::mail::MailQueue;

    async fn setup() -> (Database, Arc<MailQueue>) {
        let db = Database::open_in_memory().await.unwrap();
        (db, Arc::new(MailQueue::new()))
    }

    fn ada() -> NewUserRequest {
        NewUserRequest::new("ada", "Ada", "Lovelace", "ada@example.com", "analytical1")
    }

    #[tokio::test]
    async fn test_insert_hashes_password() {
        let (db, queue) = setup().await;
        let service = UserService::new(&db, MailSender::new(queue));

        let user = service.insert(ada()).await.unwrap();
        assert!(user.password.starts_with("$argon2id$"));
        assert!(crate::user::verify_password("analytical1", &user.password).is_ok());
    }

    #[tokio::test]
    async fn test_insert_trims_fields() {
        let (db, queue) = setup().await;
        let service = UserService::new(&db, MailSender::new(queue));

        let request = NewUserRequest::new(" ada ", " Ada ", "Lovelace ", " ada@example.com", "analytical1");
        let user = service.insert(request).await.unwrap();
        assert_eq!(user.username, "ada");
        assert_eq!(user.first_name, "Ada");
        assert_eq!(user.email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_update_rejects_blank_name() {
        let (db, queue) = setup().await;
        let service = UserService::new(&db, MailSender::new(queue));
        let user = service.insert(ada()).await.unwrap();

        let result = service
            .update(user.id, UserUpdate::new().first_name("  "))
            .await;
        assert!(matches!(result, Err(UsermailError::Validation(_))));
    }

    #[test]
    fn test_normalize_update() {
        let update = normalize_update(UserUpdate::new().email(" grace@example.com ")).unwrap();
        assert_eq!(update.email.as_deref(), Some("grace@example.com"));
        assert!(normalize_update(UserUpdate::new().email("nope")).is_err());
        assert!(normalize_update(UserUpdate::new().password("short")).is_err());
    }
}
