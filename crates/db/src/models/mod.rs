//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts where rows are created directly
//! - An update DTO (all `Option` fields) where rows are patched

pub mod audit;
pub mod comment;
pub mod council;
pub mod message;
pub mod notification;
pub mod progress;
pub mod project;
pub mod role;
pub mod score;
pub mod system_config;
pub mod user;
