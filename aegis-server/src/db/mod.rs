//! Database module for Aegis Server
//!
//! Contains entities, repositories, and database utilities.

pub mod user;

pub use user::{CreateUser, User, UserRepository, UserResponse};
