//! Poll lifecycle: creation, option addition, voting and tallying.
//!
//! A vote is membership of a user in one option's voter set. The engine
//! rejects the same (option, user) pair twice but lets a user vote for
//! several options of one poll. Votes after `ends_at` are accepted unless
//! [`PollPolicy::reject_votes_after_close`] is set.

use crate::db::models::{Poll, PollOption, PollStatus};
use crate::db::store::Store;
use crate::error::ClubError;
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use std::sync::Arc;
use uuid::Uuid;

const MAX_TEXT_LEN: usize = 255;

#[derive(Debug, Clone, Copy, Default)]
pub struct PollPolicy {
    pub reject_votes_after_close: bool,
}

#[derive(Debug, Clone)]
pub struct NewPoll {
    pub question: String,
    pub ends_at: DateTime<Utc>,
    pub options: Vec<String>,
}

fn validate_text(field: &str, text: &str) -> Result<(), ClubError> {
    if text.trim().is_empty() {
        return Err(ClubError::invalid(format!("{field} must not be empty")));
    }
    if text.chars().count() > MAX_TEXT_LEN {
        return Err(ClubError::invalid(format!(
            "{field} must be at most {MAX_TEXT_LEN} characters"
        )));
    }
    Ok(())
}

/// Partial update of a poll; options are managed through `add_option`.
#[derive(Debug, Clone, Default)]
pub struct PollUpdate {
    pub question: Option<String>,
    pub ends_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct PollDetails {
    pub poll: Poll,
    pub options: Vec<PollOption>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionTally {
    pub option_id: Uuid,
    pub text: String,
    pub votes: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tally {
    pub poll_id: Uuid,
    pub options: Vec<OptionTally>,
    /// Sum over options; a user who voted twice counts twice.
    pub total_votes: i64,
}

impl Tally {
    pub fn votes_for(&self, text: &str) -> Option<i64> {
        self.options.iter().find(|o| o.text == text).map(|o| o.votes)
    }
}

impl PollDetails {
    pub fn tally(&self) -> Tally {
        let options: Vec<OptionTally> = self
            .options
            .iter()
            .map(|o| OptionTally {
                option_id: o.id,
                text: o.text.clone(),
                votes: o.votes(),
            })
            .collect();
        let total_votes = options.iter().map(|o| o.votes).sum();

        Tally {
            poll_id: self.poll.id,
            options,
            total_votes,
        }
    }

    pub fn status(&self) -> PollStatus {
        self.poll.status_at(Utc::now())
    }
}

#[derive(Clone)]
pub struct PollEngine {
    store: Arc<dyn Store>,
    policy: PollPolicy,
}

impl PollEngine {
    pub fn new(store: Arc<dyn Store>, policy: PollPolicy) -> Self {
        PollEngine { store, policy }
    }

    async fn require_club(&self, club_id: Uuid) -> Result<(), ClubError> {
        self.store
            .get_club(club_id)
            .await?
            .map(|_| ())
            .ok_or(ClubError::NotFound("Club"))
    }

    async fn poll_in_club(&self, club_id: Uuid, poll_id: Uuid) -> Result<Poll, ClubError> {
        self.require_club(club_id).await?;
        self.store
            .get_poll(poll_id)
            .await?
            .filter(|p| p.club_id == club_id)
            .ok_or(ClubError::NotFound("Poll"))
    }

    async fn details(&self, poll: Poll) -> Result<PollDetails, ClubError> {
        let options = self.store.list_options(poll.id).await?;
        Ok(PollDetails { poll, options })
    }

    pub async fn create_poll(
        &self,
        club_id: Uuid,
        creator: Uuid,
        new_poll: NewPoll,
    ) -> Result<PollDetails, ClubError> {
        validate_text("question", &new_poll.question)?;
        for text in &new_poll.options {
            validate_text("option text", text)?;
        }
        self.require_club(club_id).await?;

        let poll = Poll {
            id: Uuid::new_v4(),
            club_id,
            question: new_poll.question.trim().to_string(),
            created_by: creator,
            created_at: Utc::now(),
            ends_at: new_poll.ends_at,
        };
        let options: Vec<PollOption> = new_poll
            .options
            .iter()
            .map(|text| PollOption {
                id: Uuid::new_v4(),
                poll_id: poll.id,
                text: text.trim().to_string(),
                voters: Vec::new(),
            })
            .collect();

        self.store.insert_poll(&poll, &options).await?;

        info!(club_id = %club_id, poll_id = %poll.id, options = options.len(), "poll created");
        Ok(PollDetails { poll, options })
    }

    pub async fn get_poll(&self, club_id: Uuid, poll_id: Uuid) -> Result<PollDetails, ClubError> {
        let poll = self.poll_in_club(club_id, poll_id).await?;
        self.details(poll).await
    }

    /// Newest poll first.
    pub async fn list_polls(&self, club_id: Uuid) -> Result<Vec<PollDetails>, ClubError> {
        self.require_club(club_id).await?;
        let polls = self.store.list_polls(club_id).await?;
        try_join_all(polls.into_iter().map(|poll| self.details(poll))).await
    }

    /// Appends an option. Any authenticated caller may do this.
    pub async fn add_option(
        &self,
        club_id: Uuid,
        poll_id: Uuid,
        text: &str,
    ) -> Result<PollOption, ClubError> {
        validate_text("text", text)?;
        let poll = self.poll_in_club(club_id, poll_id).await?;

        let option = PollOption {
            id: Uuid::new_v4(),
            poll_id: poll.id,
            text: text.trim().to_string(),
            voters: Vec::new(),
        };
        self.store.insert_option(&option).await?;

        info!(poll_id = %poll.id, option_id = %option.id, "poll option added");
        Ok(option)
    }

    pub async fn update_poll(
        &self,
        club_id: Uuid,
        poll_id: Uuid,
        update: PollUpdate,
    ) -> Result<PollDetails, ClubError> {
        let mut poll = self.poll_in_club(club_id, poll_id).await?;
        if let Some(question) = update.question {
            validate_text("question", &question)?;
            poll.question = question.trim().to_string();
        }
        if let Some(ends_at) = update.ends_at {
            poll.ends_at = ends_at;
        }
        self.store.update_poll(&poll).await?;

        info!(poll_id = %poll.id, "poll updated");
        self.details(poll).await
    }

    /// Removes the poll along with its options and votes.
    pub async fn delete_poll(&self, club_id: Uuid, poll_id: Uuid) -> Result<(), ClubError> {
        let poll = self.poll_in_club(club_id, poll_id).await?;
        if !self.store.delete_poll(poll.id).await? {
            return Err(ClubError::NotFound("Poll"));
        }

        info!(poll_id = %poll.id, "poll deleted");
        Ok(())
    }

    /// Adds `user_id` to the chosen option's voter set and returns the
    /// option with its updated voters.
    ///
    /// `option_id` is the raw value sent by the client: absent or blank is
    /// `MissingOption`, anything that is not an option of this poll is
    /// `InvalidOption`.
    pub async fn vote(
        &self,
        club_id: Uuid,
        poll_id: Uuid,
        option_id: Option<&str>,
        user_id: Uuid,
    ) -> Result<PollOption, ClubError> {
        let poll = self.poll_in_club(club_id, poll_id).await?;
        let raw = option_id
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .ok_or(ClubError::MissingOption)?;
        let option_id = Uuid::parse_str(raw).map_err(|_| ClubError::InvalidOption)?;

        let option = self
            .store
            .get_option(option_id)
            .await?
            .filter(|o| o.poll_id == poll.id)
            .ok_or(ClubError::InvalidOption)?;

        if self.policy.reject_votes_after_close
            && poll.status_at(Utc::now()) == PollStatus::Closed
        {
            return Err(ClubError::PollClosed);
        }

        if option.voters.contains(&user_id) {
            return Err(ClubError::DuplicateVote);
        }
        if !self.store.insert_vote(poll.id, option.id, user_id).await? {
            return Err(ClubError::DuplicateVote);
        }

        info!(poll_id = %poll.id, option_id = %option.id, user_id = %user_id, "vote recorded");
        self.store
            .get_option(option.id)
            .await?
            .ok_or(ClubError::InvalidOption)
    }

    pub async fn tally(&self, club_id: Uuid, poll_id: Uuid) -> Result<Tally, ClubError> {
        Ok(self.get_poll(club_id, poll_id).await?.tally())
    }
}
