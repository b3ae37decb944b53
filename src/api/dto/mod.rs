//! Data Transfer Objects for REST request/response serialization.
//!
//! Domain types stay free of OpenAPI derives; each endpoint maps them into
//! the DTOs declared here.

pub mod common_dto;
pub mod lobby_dto;
pub mod reminder_dto;
pub mod snapshot_dto;
pub mod stats_dto;

pub use common_dto::*;
pub use lobby_dto::*;
pub use reminder_dto::*;
pub use snapshot_dto::*;
pub use stats_dto::*;
