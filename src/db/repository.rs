//! User repository for usermail.
//!
//! This module provides CRUD and paged listing for users.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::user::{NewUser, User, UserUpdate};
use crate::{Result, UsermailError};

const USER_COLUMNS: &str = "id, username, first_name, last_name, email, password, is_active, \
                            is_deleted, created_at, updated_at, deleted_at";

/// Default page size for listings.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Upper bound on page size for listings.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Column a user listing can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    FirstName,
    LastName,
    Email,
}

impl SortField {
    /// Parse a sort key as sent by clients (`FirstName`, `last_name`, ...).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('_', "").as_str() {
            "firstname" => Some(SortField::FirstName),
            "lastname" => Some(SortField::LastName),
            "email" => Some(SortField::Email),
            _ => None,
        }
    }

    fn column(&self) -> &'static str {
        match self {
            SortField::FirstName => "first_name",
            SortField::LastName => "last_name",
            SortField::Email => "email",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

impl SortOrder {
    /// Only an explicit "asc" sorts ascending.
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("asc") {
            SortOrder::Ascending
        } else {
            SortOrder::Descending
        }
    }

    fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }
}

/// Paging, search and sort parameters for user listings.
#[derive(Debug, Clone)]
pub struct ListRequest {
    /// 1-based page number.
    pub page_number: u32,
    /// Items per page.
    pub page_size: u32,
    /// Substring matched against first name, last name and email.
    pub search: Option<String>,
    /// Sort column; `None` sorts by id ascending.
    pub sort_by: Option<SortField>,
    /// Sort direction, used only with `sort_by`.
    pub sort_order: SortOrder,
}

impl Default for ListRequest {
    fn default() -> Self {
        Self {
            page_number: 1,
            page_size: DEFAULT_PAGE_SIZE,
            search: None,
            sort_by: None,
            sort_order: SortOrder::default(),
        }
    }
}

impl ListRequest {
    /// Create a request for the given page.
    pub fn page(page_number: u32, page_size: u32) -> Self {
        Self {
            page_number,
            page_size,
            ..Self::default()
        }
    }

    /// Set the search term.
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Set the sort column and direction.
    pub fn with_sort(mut self, field: SortField, order: SortOrder) -> Self {
        self.sort_by = Some(field);
        self.sort_order = order;
        self
    }

    fn normalized(&self) -> (u32, u32) {
        let page_number = self.page_number.max(1);
        let page_size = self.page_size.clamp(1, MAX_PAGE_SIZE);
        (page_number, page_size)
    }
}

/// One page of results.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_number: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub total_items: u64,
}

/// Repository for user CRUD operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user in the database.
    ///
    /// Returns the created user with the assigned ID.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        let result = sqlx::query(
            "INSERT INTO users (username, first_name, last_name, email, password)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&new_user.username)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(&new_user.email)
        .bind(&new_user.password)
        .execute(self.pool)
        .await
        .map_err(|e| UsermailError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| UsermailError::NotFound("user".to_string()))
    }

    /// Get a user by ID, including soft-deleted rows.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| UsermailError::Database(e.to_string()))?;

        Ok(user)
    }

    /// Get a live user by email (case-insensitive).
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ? COLLATE NOCASE AND is_deleted = 0"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| UsermailError::Database(e.to_string()))?;

        Ok(user)
    }

    /// Get a live user by username (case-insensitive).
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ? COLLATE NOCASE AND is_deleted = 0"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| UsermailError::Database(e.to_string()))?;

        Ok(user)
    }

    /// Update a user by ID.
    ///
    /// Only fields that are set in the update will be modified. A supplied
    /// password must already be hashed. Returns the updated user, or None if
    /// not found.
    pub async fn update(&self, id: i64, update: &UserUpdate) -> Result<Option<User>> {
        if update.is_empty() {
            return self.get_by_id(id).await;
        }

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE users SET ");
        let mut separated = query.separated(", ");

        if let Some(ref username) = update.username {
            separated.push("username = ");
            separated.push_bind_unseparated(username.clone());
        }
        if let Some(ref first_name) = update.first_name {
            separated.push("first_name = ");
            separated.push_bind_unseparated(first_name.clone());
        }
        if let Some(ref last_name) = update.last_name {
            separated.push("last_name = ");
            separated.push_bind_unseparated(last_name.clone());
        }
        if let Some(ref email) = update.email {
            separated.push("email = ");
            separated.push_bind_unseparated(email.clone());
        }
        if let Some(ref password) = update.password {
            separated.push("password = ");
            separated.push_bind_unseparated(password.clone());
        }
        separated.push("updated_at = datetime('now')");

        query.push(" WHERE id = ");
        query.push_bind(id);

        let result = query
            .build()
            .execute(self.pool)
            .await
            .map_err(|e| UsermailError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// Soft-delete a user by ID.
    ///
    /// Returns true if a live user was deleted, false otherwise.
    pub async fn soft_delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE users
             SET is_deleted = 1, is_active = 0, deleted_at = datetime('now')
             WHERE id = ? AND is_deleted = 0",
        )
        .bind(id)
        .execute(self.pool)
        .await
        .map_err(|e| UsermailError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// List all live users ordered by ID.
    pub async fn list_all(&self) -> Result<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE is_deleted = 0 ORDER BY id");
        let users = sqlx::query_as::<_, User>(&sql)
            .fetch_all(self.pool)
            .await
            .map_err(|e| UsermailError::Database(e.to_string()))?;

        Ok(users)
    }

    /// List live users with search, sorting and paging.
    pub async fn list(&self, request: &ListRequest) -> Result<Page<User>> {
        let (page_number, page_size) = request.normalized();
        let search = request
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let mut count_query: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT COUNT(*) FROM users WHERE is_deleted = 0");
        push_search(&mut count_query, search);
        let total_items: i64 = count_query
            .build_query_scalar()
            .fetch_one(self.pool)
            .await
            .map_err(|e| UsermailError::Database(e.to_string()))?;

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {USER_COLUMNS} FROM users WHERE is_deleted = 0"
        ));
        push_search(&mut query, search);
        match request.sort_by {
            Some(field) => {
                query.push(format!(
                    " ORDER BY {} {}, id ASC",
                    field.column(),
                    request.sort_order.keyword()
                ));
            }
            None => {
                query.push(" ORDER BY id ASC");
            }
        }
        query.push(" LIMIT ");
        query.push_bind(i64::from(page_size));
        query.push(" OFFSET ");
        query.push_bind(i64::from(page_number - 1) * i64::from(page_size));

        let items = query
            .build_query_as::<User>()
            .fetch_all(self.pool)
            .await
            .map_err(|e| UsermailError::Database(e.to_string()))?;

        let total_items = total_items.max(0) as u64;
        let total_pages = total_items.div_ceil(u64::from(page_size)) as u32;

        Ok(Page {
            items,
            page_number,
            page_size,
            total_pages,
            total_items,
        })
    }

    /// Count live users.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE is_deleted = 0")
            .fetch_one(self.pool)
            .await
            .map_err(|e| UsermailError::Database(e.to_string()))?;
        Ok(count)
    }
}

fn push_search(query: &mut QueryBuilder<'_, Sqlite>, search: Option<&str>) {
    if let Some(term) = search {
        let pattern = format!("%{term}%");
        query.push(" AND (first_name LIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR last_name LIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR email LIKE ");
        query.push_bind(pattern);
        query.push(")");
    }
}
