//! `PgStore` implementations of the store traits, one file per table group.

pub mod club_repository;
pub mod membership_repository;
pub mod message_repository;
pub mod event_repository;
pub mod poll_repository;
pub mod vote_repository;
