//! Storage seams consumed by the ledgers and the poll engine.
//!
//! Inserts guarded by a uniqueness constraint return `Ok(true)` when a row
//! was written and `Ok(false)` when the constraint rejected it. Callers must
//! treat `false` as authoritative even if an earlier read said otherwise.

use crate::db::models::{Club, Event, Membership, Message, Poll, PollOption};
use async_trait::async_trait;
use uuid::Uuid;

pub type StoreResult<T> = Result<T, sqlx::Error>;

#[async_trait]
pub trait ClubStore: Send + Sync {
    /// Inserts the club together with its founding membership.
    /// Returns `false` if the club name is already taken.
    async fn insert_club(&self, club: &Club, founder: &Membership) -> StoreResult<bool>;

    async fn get_club(&self, club_id: Uuid) -> StoreResult<Option<Club>>;

    /// Newest first.
    async fn list_clubs(&self) -> StoreResult<Vec<Club>>;

    /// Overwrites the stored club. Returns `false` if the new name belongs
    /// to another club.
    async fn update_club(&self, club: &Club) -> StoreResult<bool>;

    /// Deletes the club and everything that belongs to it: memberships,
    /// events and their attendees, polls with options and votes, messages.
    async fn delete_club(&self, club_id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait MembershipStore: Send + Sync {
    async fn find_membership(&self, club_id: Uuid, user_id: Uuid)
    -> StoreResult<Option<Membership>>;

    async fn insert_membership(&self, membership: &Membership) -> StoreResult<bool>;

    /// Returns `false` if there was nothing to delete.
    async fn delete_membership(&self, club_id: Uuid, user_id: Uuid) -> StoreResult<bool>;

    /// Oldest membership first.
    async fn list_memberships(&self, club_id: Uuid) -> StoreResult<Vec<Membership>>;

    async fn count_members(&self, club_id: Uuid) -> StoreResult<i64>;
}

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn insert_event(&self, event: &Event) -> StoreResult<()>;

    async fn get_event(&self, event_id: Uuid) -> StoreResult<Option<Event>>;

    /// Ordered by start date.
    async fn list_events(&self, club_id: Uuid) -> StoreResult<Vec<Event>>;

    async fn is_attending(&self, event_id: Uuid, user_id: Uuid) -> StoreResult<bool>;

    async fn insert_attendee(&self, event_id: Uuid, user_id: Uuid) -> StoreResult<bool>;

    async fn list_attendees(&self, event_id: Uuid) -> StoreResult<Vec<Uuid>>;
}

#[async_trait]
pub trait PollStore: Send + Sync {
    /// Inserts the poll and its initial options atomically.
    async fn insert_poll(&self, poll: &Poll, options: &[PollOption]) -> StoreResult<()>;

    async fn get_poll(&self, poll_id: Uuid) -> StoreResult<Option<Poll>>;

    /// Newest first.
    async fn list_polls(&self, club_id: Uuid) -> StoreResult<Vec<Poll>>;

    /// Appends an option after the existing ones.
    async fn insert_option(&self, option: &PollOption) -> StoreResult<()>;

    async fn get_option(&self, option_id: Uuid) -> StoreResult<Option<PollOption>>;

    /// Options of a poll in insertion order, voters included.
    async fn list_options(&self, poll_id: Uuid) -> StoreResult<Vec<PollOption>>;

    async fn update_poll(&self, poll: &Poll) -> StoreResult<()>;

    /// Deletes the poll with its options and votes.
    async fn delete_poll(&self, poll_id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait VoteStore: Send + Sync {
    /// Adds `user_id` to the option's voter set.
    async fn insert_vote(&self, poll_id: Uuid, option_id: Uuid, user_id: Uuid)
    -> StoreResult<bool>;
}

#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn insert_message(&self, message: &Message) -> StoreResult<()>;

    /// Newest first.
    async fn list_messages(&self, club_id: Uuid) -> StoreResult<Vec<Message>>;
}

#[async_trait]
pub trait Store:
    ClubStore + MembershipStore + EventStore + PollStore + VoteStore + MessageStore
{
    async fn health_check(&self) -> StoreResult<()>;
}
