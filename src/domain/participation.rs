use crate::db::models::Event;
use crate::db::store::Store;
use crate::error::ClubError;
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub location: Option<String>,
}

impl NewEvent {
    fn validate(&self) -> Result<(), ClubError> {
        if self.title.trim().is_empty() {
            return Err(ClubError::invalid("title must not be empty"));
        }
        if self.title.chars().count() > 255 {
            return Err(ClubError::invalid("title must be at most 255 characters"));
        }
        if self.end_date < self.start_date {
            return Err(ClubError::invalid("endDate must not be before startDate"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct EventWithAttendees {
    pub event: Event,
    pub attendees: Vec<Uuid>,
}

/// Club events and who attends them. There is no leave operation.
#[derive(Clone)]
pub struct ParticipationLedger {
    store: Arc<dyn Store>,
}

impl ParticipationLedger {
    pub fn new(store: Arc<dyn Store>) -> Self {
        ParticipationLedger { store }
    }

    async fn require_club(&self, club_id: Uuid) -> Result<(), ClubError> {
        match self.store.get_club(club_id).await? {
            Some(_) => Ok(()),
            None => Err(ClubError::NotFound("Club")),
        }
    }

    async fn event_in_club(&self, club_id: Uuid, event_id: Uuid) -> Result<Event, ClubError> {
        self.require_club(club_id).await?;
        self.store
            .get_event(event_id)
            .await?
            .filter(|e| e.club_id == club_id)
            .ok_or(ClubError::NotFound("Event"))
    }

    pub async fn create_event(
        &self,
        club_id: Uuid,
        creator: Uuid,
        new_event: NewEvent,
    ) -> Result<EventWithAttendees, ClubError> {
        new_event.validate()?;
        self.require_club(club_id).await?;

        let event = Event {
            id: Uuid::new_v4(),
            club_id,
            title: new_event.title.trim().to_string(),
            description: new_event.description,
            start_date: new_event.start_date,
            end_date: new_event.end_date,
            created_by: creator,
            location: new_event.location,
        };
        self.store.insert_event(&event).await?;

        info!(club_id = %club_id, event_id = %event.id, "event created");
        Ok(EventWithAttendees {
            event,
            attendees: Vec::new(),
        })
    }

    pub async fn list_events(&self, club_id: Uuid) -> Result<Vec<EventWithAttendees>, ClubError> {
        self.require_club(club_id).await?;

        let events = self.store.list_events(club_id).await?;
        let store = &self.store;
        let attendees = try_join_all(events.iter().map(|e| store.list_attendees(e.id))).await?;

        Ok(events
            .into_iter()
            .zip(attendees)
            .map(|(event, attendees)| EventWithAttendees { event, attendees })
            .collect())
    }

    pub async fn get_event(
        &self,
        club_id: Uuid,
        event_id: Uuid,
    ) -> Result<EventWithAttendees, ClubError> {
        let event = self.event_in_club(club_id, event_id).await?;
        let attendees = self.store.list_attendees(event.id).await?;
        Ok(EventWithAttendees { event, attendees })
    }

    /// Records `user_id` as attending; a second join is rejected.
    pub async fn join_event(
        &self,
        club_id: Uuid,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), ClubError> {
        let event = self.event_in_club(club_id, event_id).await?;

        if self.store.is_attending(event.id, user_id).await? {
            return Err(ClubError::AlreadyAttending);
        }
        if !self.store.insert_attendee(event.id, user_id).await? {
            return Err(ClubError::AlreadyAttending);
        }

        info!(event_id = %event.id, user_id = %user_id, "joined event");
        Ok(())
    }
}
