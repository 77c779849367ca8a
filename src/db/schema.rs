//! Database schema and migrations for usermail.
//!
//! Migrations are applied in order; the schema_version table records which
//! ones have run.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: Users
    r#"
CREATE TABLE users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    username    TEXT NOT NULL,
    first_name  TEXT NOT NULL,
    last_name   TEXT NOT NULL,
    email       TEXT NOT NULL,
    password    TEXT NOT NULL,           -- Argon2 hash
    is_active   INTEGER NOT NULL DEFAULT 1,
    is_deleted  INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at  TEXT,
    deleted_at  TEXT
);

-- Uniqueness only applies to live accounts so a deleted address can register again
CREATE UNIQUE INDEX idx_users_username_live ON users(username COLLATE NOCASE) WHERE is_deleted = 0;
CREATE UNIQUE INDEX idx_users_email_live ON users(email COLLATE NOCASE) WHERE is_deleted = 0;
"#,
    // v2: Blocked recipients
    r#"
CREATE TABLE blocked_emails (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    email       TEXT NOT NULL UNIQUE,    -- normalized (trimmed, lowercase)
    retry_count INTEGER NOT NULL DEFAULT 1,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);
"#,
];
