use crate::db::models::{Club, Membership, Role};
use crate::db::store::Store;
use crate::error::ClubError;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

const MAX_NAME_LEN: usize = 255;

#[derive(Debug, Clone)]
pub struct NewClub {
    pub name: String,
    pub description: String,
    pub logo: Option<String>,
    pub is_public: bool,
}

/// Partial update; `None` leaves the field as it is.
#[derive(Debug, Clone, Default)]
pub struct ClubUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub logo: Option<String>,
    pub is_public: Option<bool>,
}

fn validate_club(name: &str, logo: Option<&str>) -> Result<(), ClubError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ClubError::invalid("name must not be empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ClubError::invalid("name must be at most 255 characters"));
    }
    if let Some(logo) = logo {
        if !(logo.starts_with("http://") || logo.starts_with("https://")) {
            return Err(ClubError::invalid("logo must be an http(s) URL"));
        }
    }
    Ok(())
}

/// Which users belong to which club, and the clubs themselves.
#[derive(Clone)]
pub struct MembershipLedger {
    store: Arc<dyn Store>,
}

impl MembershipLedger {
    pub fn new(store: Arc<dyn Store>) -> Self {
        MembershipLedger { store }
    }

    /// Creates a club; the creator becomes its first admin.
    pub async fn create_club(&self, creator: Uuid, new_club: NewClub) -> Result<Club, ClubError> {
        validate_club(&new_club.name, new_club.logo.as_deref())?;

        let now = Utc::now();
        let club = Club {
            id: Uuid::new_v4(),
            name: new_club.name.trim().to_string(),
            description: new_club.description,
            logo: new_club.logo,
            is_public: new_club.is_public,
            created_at: now,
        };
        let founder = Membership {
            club_id: club.id,
            user_id: creator,
            role: Role::Admin,
            joined_at: now,
        };

        if !self.store.insert_club(&club, &founder).await? {
            return Err(ClubError::ClubNameTaken);
        }

        info!(club_id = %club.id, creator = %creator, "club created");
        Ok(club)
    }

    pub async fn get_club(&self, club_id: Uuid) -> Result<Club, ClubError> {
        self.store
            .get_club(club_id)
            .await?
            .ok_or(ClubError::NotFound("Club"))
    }

    pub async fn update_club(&self, club_id: Uuid, update: ClubUpdate) -> Result<Club, ClubError> {
        let mut club = self.get_club(club_id).await?;
        if let Some(name) = update.name {
            club.name = name.trim().to_string();
        }
        if let Some(description) = update.description {
            club.description = description;
        }
        if let Some(logo) = update.logo {
            club.logo = Some(logo);
        }
        if let Some(is_public) = update.is_public {
            club.is_public = is_public;
        }
        validate_club(&club.name, club.logo.as_deref())?;

        if !self.store.update_club(&club).await? {
            return Err(ClubError::ClubNameTaken);
        }

        info!(club_id = %club.id, "club updated");
        Ok(club)
    }

    /// Removes the club together with its memberships, events, polls and
    /// messages.
    pub async fn delete_club(&self, club_id: Uuid) -> Result<(), ClubError> {
        if !self.store.delete_club(club_id).await? {
            return Err(ClubError::NotFound("Club"));
        }

        info!(club_id = %club_id, "club deleted");
        Ok(())
    }

    pub async fn list_clubs(&self) -> Result<Vec<Club>, ClubError> {
        Ok(self.store.list_clubs().await?)
    }

    pub async fn member_count(&self, club_id: Uuid) -> Result<i64, ClubError> {
        Ok(self.store.count_members(club_id).await?)
    }

    pub async fn members(&self, club_id: Uuid) -> Result<Vec<Membership>, ClubError> {
        self.get_club(club_id).await?;
        Ok(self.store.list_memberships(club_id).await?)
    }

    /// Adds `user_id` to the club as a plain member.
    ///
    /// The lookup only produces the friendly error; the conditional insert
    /// is what keeps two racing joins from both succeeding.
    pub async fn join(&self, club_id: Uuid, user_id: Uuid) -> Result<Membership, ClubError> {
        self.get_club(club_id).await?;

        if self.store.find_membership(club_id, user_id).await?.is_some() {
            return Err(ClubError::AlreadyMember);
        }

        let membership = Membership {
            club_id,
            user_id,
            role: Role::Member,
            joined_at: Utc::now(),
        };
        if !self.store.insert_membership(&membership).await? {
            return Err(ClubError::AlreadyMember);
        }

        info!(club_id = %club_id, user_id = %user_id, "joined club");
        Ok(membership)
    }

    pub async fn leave(&self, club_id: Uuid, user_id: Uuid) -> Result<(), ClubError> {
        self.get_club(club_id).await?;

        if !self.store.delete_membership(club_id, user_id).await? {
            return Err(ClubError::NotMember);
        }

        info!(club_id = %club_id, user_id = %user_id, "left club");
        Ok(())
    }
}
