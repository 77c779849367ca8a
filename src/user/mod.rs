//! User module for usermail.
//!
//! This module provides password hashing, input validation and the user
//! service that feeds the mail queue.

mod password;
mod service;
pub mod validation;

pub use password::{hash_password, verify_password, PasswordError};
pub use service::{NewUserRequest, UserService};
pub use validation::{validate_email, ValidationError};
