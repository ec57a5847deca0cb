use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::EditLease;
use crate::error::{MediaListError, Result};
use crate::session::{Session, SessionStore};

#[derive(Debug, Clone)]
pub struct User {
    username: String,
    pub full_name: String,
    pub email: String,
    password_hash: String,
    is_new: bool,
    pub(crate) lease: EditLease,
}

/// Public view of a user; never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub username: String,
    pub fullname: String,
    pub email: String,
}

impl User {
    pub fn new(username: &str) -> Result<Self> {
        if username.trim().is_empty() {
            return Err(MediaListError::Validation(
                "User name must not be empty.".to_string(),
            ));
        }

        Ok(Self {
            username: username.to_string(),
            full_name: String::new(),
            email: String::new(),
            password_hash: String::new(),
            is_new: true,
            lease: EditLease::default(),
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub(crate) fn mark_stored(&mut self) {
        self.is_new = false;
    }

    pub fn set_password(&mut self, password: &str, cost: u32) -> Result<()> {
        self.password_hash = bcrypt::hash(password, cost)?;
        Ok(())
    }

    pub fn verify_password(&self, password: &str) -> Result<bool> {
        if self.password_hash.is_empty() {
            return Ok(false);
        }
        Ok(bcrypt::verify(password, &self.password_hash)?)
    }

    pub fn begin_edit(&mut self, sessions: &SessionStore, session: &Session) -> Result<()> {
        self.lease.begin(sessions, session)
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            username: self.username.clone(),
            fullname: self.full_name.clone(),
            email: self.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaType {
    #[default]
    Movie,
    Series,
    Game,
}

impl MediaType {
    /// Case-insensitive; anything unrecognised is a movie.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "series" => MediaType::Series,
            "game" => MediaType::Game,
            _ => MediaType::Movie,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MediaDraft {
    pub title: String,
    pub description: String,
    pub media_type: MediaType,
    pub release_year: u32,
    pub genres: Vec<String>,
    pub age_restriction: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaEntry {
    pub id: u64,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub release_year: u32,
    pub genres: Vec<String>,
    pub age_restriction: u32,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    pub(crate) lease: EditLease,
}

impl MediaEntry {
    pub(crate) fn from_draft(id: u64, draft: MediaDraft, created_by: String) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            media_type: draft.media_type,
            release_year: draft.release_year,
            genres: draft.genres,
            age_restriction: draft.age_restriction,
            created_by,
            created_at: Utc::now(),
            lease: EditLease::default(),
        }
    }

    pub fn begin_edit(&mut self, sessions: &SessionStore, session: &Session) -> Result<()> {
        self.lease.begin(sessions, session)
    }
}

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, Default)]
pub struct RatingDraft {
    pub media_id: u64,
    pub value: u8,
    pub comment: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: u64,
    pub username: String,
    pub media_id: u64,
    pub value: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    pub(crate) lease: EditLease,
}

impl Rating {
    pub(crate) fn from_draft(id: u64, draft: RatingDraft, username: String) -> Self {
        Self {
            id,
            username,
            media_id: draft.media_id,
            value: draft.value,
            comment: draft.comment,
            created_at: Utc::now(),
            lease: EditLease::default(),
        }
    }

    pub fn begin_edit(&mut self, sessions: &SessionStore, session: &Session) -> Result<()> {
        self.lease.begin(sessions, session)
    }
}

pub fn validate_rating_value(value: i64) -> Result<u8> {
    u8::try_from(value)
        .ok()
        .filter(|v| (MIN_RATING..=MAX_RATING).contains(v))
        .ok_or_else(|| {
            MediaListError::Validation(format!(
                "Field 'value' must be between {MIN_RATING} and {MAX_RATING}."
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MIN_HASH_COST;

    #[test]
    fn test_user_new_rejects_blank_name() {
        assert!(User::new("   ").is_err());
        let user = User::new("alice").unwrap();
        assert_eq!(user.username(), "alice");
        assert!(user.is_new());
    }

    #[test]
    fn test_verify_password() {
        let mut user = User::new("alice").unwrap();
        user.set_password("secret", MIN_HASH_COST).unwrap();

        assert!(user.verify_password("secret").unwrap());
        assert!(!user.verify_password("wrong").unwrap());
    }

    #[test]
    fn test_user_without_password_never_verifies() {
        let user = User::new("alice").unwrap();
        assert!(!user.verify_password("").unwrap());
    }

    #[test]
    fn test_media_type_parse_lenient() {
        assert_eq!(MediaType::parse_lenient("SERIES"), MediaType::Series);
        assert_eq!(MediaType::parse_lenient("game"), MediaType::Game);
        assert_eq!(MediaType::parse_lenient("podcast"), MediaType::Movie);
    }

    #[test]
    fn test_media_entry_json_shape() {
        let draft = MediaDraft {
            title: "Alien".to_string(),
            genres: vec!["horror".to_string()],
            release_year: 1979,
            age_restriction: 16,
            ..MediaDraft::default()
        };
        let entry = MediaEntry::from_draft(3, draft, "alice".to_string());
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["id"], 3);
        assert_eq!(json["type"], "Movie");
        assert_eq!(json["releaseYear"], 1979);
        assert_eq!(json["ageRestriction"], 16);
        assert_eq!(json["createdBy"], "alice");
        assert!(json["createdAt"].is_string());
        assert!(json.get("lease").is_none());
    }

    #[test]
    fn test_rating_value_bounds() {
        assert_eq!(validate_rating_value(1).unwrap(), 1);
        assert_eq!(validate_rating_value(5).unwrap(), 5);
        assert!(validate_rating_value(0).is_err());
        assert!(validate_rating_value(6).is_err());
        assert!(validate_rating_value(-3).is_err());
    }
}
