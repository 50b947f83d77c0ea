//! In-process store with the same uniqueness rules as the PostgreSQL schema.
//!
//! Every operation takes the table lock once, so each conditional insert is
//! a single atomic step just like `INSERT ... ON CONFLICT DO NOTHING`.

use crate::db::models::{Club, Event, Membership, Message, Poll, PollOption};
use crate::db::store::{
    ClubStore, EventStore, MembershipStore, MessageStore, PollStore, Store, StoreResult, VoteStore,
};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    clubs: Vec<Club>,
    memberships: Vec<Membership>,
    events: Vec<Event>,
    attendees: Vec<(Uuid, Uuid)>,
    polls: Vec<Poll>,
    options: Vec<PollOption>,
    votes: HashMap<Uuid, Vec<Uuid>>,
    vote_keys: BTreeSet<(Uuid, Uuid)>,
    messages: Vec<Message>,
}

impl Tables {
    fn remove_polls(&mut self, doomed: impl Fn(&Poll) -> bool) -> usize {
        let poll_ids: Vec<Uuid> = self.polls.iter().filter(|&p| doomed(p)).map(|p| p.id).collect();
        let option_ids: Vec<Uuid> = self
            .options
            .iter()
            .filter(|o| poll_ids.contains(&o.poll_id))
            .map(|o| o.id)
            .collect();

        self.polls.retain(|p| !poll_ids.contains(&p.id));
        self.options.retain(|o| !option_ids.contains(&o.id));
        for option_id in &option_ids {
            self.votes.remove(option_id);
        }
        self.vote_keys.retain(|(option_id, _)| !option_ids.contains(option_id));
        poll_ids.len()
    }

    fn with_voters(&self, option: &PollOption) -> PollOption {
        PollOption {
            voters: self.votes.get(&option.id).cloned().unwrap_or_default(),
            ..option.clone()
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClubStore for MemoryStore {
    async fn insert_club(&self, club: &Club, founder: &Membership) -> StoreResult<bool> {
        let mut tables = self.tables.lock().await;
        if tables.clubs.iter().any(|c| c.name == club.name) {
            return Ok(false);
        }
        tables.clubs.push(club.clone());
        tables.memberships.push(founder.clone());
        Ok(true)
    }

    async fn get_club(&self, club_id: Uuid) -> StoreResult<Option<Club>> {
        let tables = self.tables.lock().await;
        Ok(tables.clubs.iter().find(|c| c.id == club_id).cloned())
    }

    async fn list_clubs(&self) -> StoreResult<Vec<Club>> {
        let tables = self.tables.lock().await;
        let mut clubs = tables.clubs.clone();
        clubs.reverse();
        clubs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(clubs)
    }

    async fn update_club(&self, club: &Club) -> StoreResult<bool> {
        let mut tables = self.tables.lock().await;
        if tables.clubs.iter().any(|c| c.id != club.id && c.name == club.name) {
            return Ok(false);
        }
        if let Some(stored) = tables.clubs.iter_mut().find(|c| c.id == club.id) {
            *stored = club.clone();
        }
        Ok(true)
    }

    async fn delete_club(&self, club_id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.lock().await;
        let before = tables.clubs.len();
        tables.clubs.retain(|c| c.id != club_id);
        if tables.clubs.len() == before {
            return Ok(false);
        }

        let event_ids: Vec<Uuid> = tables
            .events
            .iter()
            .filter(|e| e.club_id == club_id)
            .map(|e| e.id)
            .collect();
        tables.memberships.retain(|m| m.club_id != club_id);
        tables.events.retain(|e| e.club_id != club_id);
        tables.attendees.retain(|(event_id, _)| !event_ids.contains(event_id));
        tables.messages.retain(|m| m.club_id != club_id);
        tables.remove_polls(|p| p.club_id == club_id);
        Ok(true)
    }
}

#[async_trait]
impl MembershipStore for MemoryStore {
    async fn find_membership(
        &self,
        club_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<Membership>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .memberships
            .iter()
            .find(|m| m.club_id == club_id && m.user_id == user_id)
            .cloned())
    }

    async fn insert_membership(&self, membership: &Membership) -> StoreResult<bool> {
        let mut tables = self.tables.lock().await;
        let exists = tables
            .memberships
            .iter()
            .any(|m| m.club_id == membership.club_id && m.user_id == membership.user_id);
        if exists {
            return Ok(false);
        }
        tables.memberships.push(membership.clone());
        Ok(true)
    }

    async fn delete_membership(&self, club_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.lock().await;
        let before = tables.memberships.len();
        tables
            .memberships
            .retain(|m| !(m.club_id == club_id && m.user_id == user_id));
        Ok(tables.memberships.len() < before)
    }

    async fn list_memberships(&self, club_id: Uuid) -> StoreResult<Vec<Membership>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .memberships
            .iter()
            .filter(|m| m.club_id == club_id)
            .cloned()
            .collect())
    }

    async fn count_members(&self, club_id: Uuid) -> StoreResult<i64> {
        let tables = self.tables.lock().await;
        Ok(tables.memberships.iter().filter(|m| m.club_id == club_id).count() as i64)
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn insert_event(&self, event: &Event) -> StoreResult<()> {
        self.tables.lock().await.events.push(event.clone());
        Ok(())
    }

    async fn get_event(&self, event_id: Uuid) -> StoreResult<Option<Event>> {
        let tables = self.tables.lock().await;
        Ok(tables.events.iter().find(|e| e.id == event_id).cloned())
    }

    async fn list_events(&self, club_id: Uuid) -> StoreResult<Vec<Event>> {
        let tables = self.tables.lock().await;
        let mut events: Vec<Event> = tables
            .events
            .iter()
            .filter(|e| e.club_id == club_id)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.start_date);
        Ok(events)
    }

    async fn is_attending(&self, event_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let tables = self.tables.lock().await;
        Ok(tables.attendees.contains(&(event_id, user_id)))
    }

    async fn insert_attendee(&self, event_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.lock().await;
        if tables.attendees.contains(&(event_id, user_id)) {
            return Ok(false);
        }
        tables.attendees.push((event_id, user_id));
        Ok(true)
    }

    async fn list_attendees(&self, event_id: Uuid) -> StoreResult<Vec<Uuid>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .attendees
            .iter()
            .filter(|(e, _)| *e == event_id)
            .map(|(_, u)| *u)
            .collect())
    }
}

#[async_trait]
impl PollStore for MemoryStore {
    async fn insert_poll(&self, poll: &Poll, options: &[PollOption]) -> StoreResult<()> {
        let mut tables = self.tables.lock().await;
        tables.polls.push(poll.clone());
        tables.options.extend(options.iter().map(|o| PollOption {
            voters: Vec::new(),
            ..o.clone()
        }));
        Ok(())
    }

    async fn get_poll(&self, poll_id: Uuid) -> StoreResult<Option<Poll>> {
        let tables = self.tables.lock().await;
        Ok(tables.polls.iter().find(|p| p.id == poll_id).cloned())
    }

    async fn list_polls(&self, club_id: Uuid) -> StoreResult<Vec<Poll>> {
        let tables = self.tables.lock().await;
        let mut polls: Vec<Poll> = tables
            .polls
            .iter()
            .filter(|p| p.club_id == club_id)
            .cloned()
            .collect();
        polls.reverse();
        polls.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(polls)
    }

    async fn insert_option(&self, option: &PollOption) -> StoreResult<()> {
        self.tables.lock().await.options.push(PollOption {
            voters: Vec::new(),
            ..option.clone()
        });
        Ok(())
    }

    async fn get_option(&self, option_id: Uuid) -> StoreResult<Option<PollOption>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .options
            .iter()
            .find(|o| o.id == option_id)
            .map(|o| tables.with_voters(o)))
    }

    async fn list_options(&self, poll_id: Uuid) -> StoreResult<Vec<PollOption>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .options
            .iter()
            .filter(|o| o.poll_id == poll_id)
            .map(|o| tables.with_voters(o))
            .collect())
    }

    async fn update_poll(&self, poll: &Poll) -> StoreResult<()> {
        let mut tables = self.tables.lock().await;
        if let Some(stored) = tables.polls.iter_mut().find(|p| p.id == poll.id) {
            *stored = poll.clone();
        }
        Ok(())
    }

    async fn delete_poll(&self, poll_id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.lock().await;
        Ok(tables.remove_polls(|p| p.id == poll_id) > 0)
    }
}

#[async_trait]
impl VoteStore for MemoryStore {
    async fn insert_vote(
        &self,
        _poll_id: Uuid,
        option_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<bool> {
        let mut tables = self.tables.lock().await;
        if !tables.vote_keys.insert((option_id, user_id)) {
            return Ok(false);
        }
        tables.votes.entry(option_id).or_default().push(user_id);
        Ok(true)
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn insert_message(&self, message: &Message) -> StoreResult<()> {
        self.tables.lock().await.messages.push(message.clone());
        Ok(())
    }

    async fn list_messages(&self, club_id: Uuid) -> StoreResult<Vec<Message>> {
        let tables = self.tables.lock().await;
        let mut messages: Vec<Message> = tables
            .messages
            .iter()
            .filter(|m| m.club_id == club_id)
            .cloned()
            .collect();
        messages.reverse();
        messages.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(messages)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{MessageKind, Role};
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn deleting_a_club_cascades_like_the_schema() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let owner = Uuid::new_v4();
        let club = Club {
            id: Uuid::new_v4(),
            name: "Choir".into(),
            description: String::new(),
            logo: None,
            is_public: true,
            created_at: now,
        };
        let founder = Membership {
            club_id: club.id,
            user_id: owner,
            role: Role::Admin,
            joined_at: now,
        };
        assert!(store.insert_club(&club, &founder).await.unwrap());

        let event = Event {
            id: Uuid::new_v4(),
            club_id: club.id,
            title: "Rehearsal".into(),
            description: String::new(),
            start_date: now,
            end_date: now + Duration::hours(2),
            created_by: owner,
            location: None,
        };
        store.insert_event(&event).await.unwrap();
        store.insert_attendee(event.id, owner).await.unwrap();

        let poll = Poll {
            id: Uuid::new_v4(),
            club_id: club.id,
            question: "Key?".into(),
            created_by: owner,
            created_at: now,
            ends_at: now + Duration::days(1),
        };
        let option = PollOption {
            id: Uuid::new_v4(),
            poll_id: poll.id,
            text: "D minor".into(),
            voters: Vec::new(),
        };
        store.insert_poll(&poll, &[option.clone()]).await.unwrap();
        store.insert_vote(poll.id, option.id, owner).await.unwrap();

        store
            .insert_message(&Message {
                id: Uuid::new_v4(),
                club_id: club.id,
                user_id: owner,
                content: "hi".into(),
                kind: MessageKind::Text,
                timestamp: now,
            })
            .await
            .unwrap();

        assert!(store.delete_club(club.id).await.unwrap());

        assert!(store.get_club(club.id).await.unwrap().is_none());
        assert_eq!(store.count_members(club.id).await.unwrap(), 0);
        assert!(store.get_event(event.id).await.unwrap().is_none());
        assert!(store.list_attendees(event.id).await.unwrap().is_empty());
        assert!(store.get_poll(poll.id).await.unwrap().is_none());
        assert!(store.get_option(option.id).await.unwrap().is_none());
        assert!(store.list_messages(club.id).await.unwrap().is_empty());

        let tables = store.tables.lock().await;
        assert!(tables.vote_keys.is_empty());
        assert!(tables.votes.is_empty());
        drop(tables);

        assert!(!store.delete_club(club.id).await.unwrap());
    }
}
