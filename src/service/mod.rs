//! Service layer: pipeline orchestration.
//!
//! [`SchedulerContext`] drives each tick through the [`LobbyService`],
//! [`ReminderMatcher`] and [`Aggregator`]; the HTTP layer reads through the
//! same services and mutates reminders via [`ReminderService`].

pub mod aggregator;
pub mod lobby_service;
pub mod matcher;
pub mod reminder_service;
pub mod scheduler;

pub use aggregator::Aggregator;
pub use lobby_service::LobbyService;
pub use matcher::{MatchReport, ReminderMatcher, find_matches};
pub use reminder_service::ReminderService;
pub use scheduler::{SchedulerConfig, SchedulerContext, TickReport};
