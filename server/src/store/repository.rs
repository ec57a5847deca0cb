use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::{Arc, Mutex};

use super::models::{MediaDraft, MediaEntry, Rating, RatingDraft, User};
use super::table::{lock, EntityTable};
use crate::error::{MediaListError, Result};
use crate::session::SessionStore;

#[derive(Clone)]
pub struct UserStore {
    // username -> User
    users: Arc<DashMap<String, User>>,
    hash_cost: u32,
}

impl UserStore {
    pub fn new(hash_cost: u32) -> Self {
        Self {
            users: Arc::new(DashMap::new()),
            hash_cost,
        }
    }

    pub fn hash_cost(&self) -> u32 {
        self.hash_cost
    }

    pub fn get(&self, username: &str) -> Option<User> {
        self.users.get(username).map(|entry| entry.value().clone())
    }

    pub fn list(&self) -> Vec<User> {
        let mut users: Vec<User> = self.users.iter().map(|entry| entry.value().clone()).collect();
        users.sort_by(|a, b| a.username().cmp(b.username()));
        users
    }

    pub fn verify_credentials(&self, username: &str, password: &str) -> Result<bool> {
        match self.get(username) {
            Some(user) => user.verify_password(password),
            None => Ok(false),
        }
    }

    /// Stores a new user anonymously, or writes back an existing one under
    /// its open edit lease (owner or admin).
    pub fn save(&self, sessions: &SessionStore, user: &mut User) -> Result<()> {
        if user.is_new() {
            match self.users.entry(user.username().to_string()) {
                Entry::Occupied(_) => {
                    return Err(MediaListError::Conflict(format!(
                        "User '{}' already exists.",
                        user.username()
                    )));
                }
                Entry::Vacant(slot) => {
                    user.mark_stored();
                    user.lease.end();
                    slot.insert(user.clone());
                }
            }
            log::info!("Registered user {}", user.username());
            return Ok(());
        }

        user.lease.ensure_owner_or_admin(sessions, user.username())?;
        user.lease.end();

        let mut stored = self
            .users
            .get_mut(user.username())
            .ok_or(MediaListError::NotFound("User not found."))?;
        *stored = user.clone();
        Ok(())
    }

    pub fn delete(&self, sessions: &SessionStore, user: &mut User) -> Result<()> {
        user.lease.ensure_owner_or_admin(sessions, user.username())?;
        user.lease.end();

        self.users
            .remove(user.username())
            .ok_or(MediaListError::NotFound("User not found."))?;
        let closed = sessions.close_user(user.username());
        log::info!("Deleted user {} ({} sessions closed)", user.username(), closed);
        Ok(())
    }
}

#[derive(Clone)]
pub struct MediaStore {
    table: Arc<Mutex<EntityTable<MediaEntry>>>,
}

impl MediaStore {
    pub fn new() -> Self {
        Self {
            table: Arc::new(Mutex::new(EntityTable::new())),
        }
    }

    pub fn create(&self, draft: MediaDraft, created_by: &str) -> Result<MediaEntry> {
        if created_by.trim().is_empty() {
            return Err(MediaListError::Validation(
                "Creator username must not be empty.".to_string(),
            ));
        }
        if draft.title.trim().is_empty() {
            return Err(MediaListError::Validation("Title is required.".to_string()));
        }

        let entry = lock(&self.table)
            .insert_with(|id| MediaEntry::from_draft(id, draft, created_by.to_string()));
        log::info!("Created media entry {} by {}", entry.id, entry.created_by);
        Ok(entry)
    }

    pub fn get(&self, id: u64) -> Option<MediaEntry> {
        lock(&self.table).get(id)
    }

    pub fn exists(&self, id: u64) -> bool {
        lock(&self.table).contains(id)
    }

    pub fn list(&self) -> Vec<MediaEntry> {
        lock(&self.table).values()
    }

    pub fn save(&self, sessions: &SessionStore, entry: &mut MediaEntry) -> Result<()> {
        entry.lease.ensure_owner_or_admin(sessions, &entry.created_by)?;
        if entry.title.trim().is_empty() {
            return Err(MediaListError::Validation("Title is required.".to_string()));
        }
        entry.lease.end();

        if !lock(&self.table).replace(entry.id, entry.clone()) {
            return Err(MediaListError::NotFound("Not found."));
        }
        Ok(())
    }

    pub fn delete(&self, sessions: &SessionStore, entry: &mut MediaEntry) -> Result<()> {
        entry.lease.ensure_owner_or_admin(sessions, &entry.created_by)?;
        entry.lease.end();

        lock(&self.table)
            .remove(entry.id)
            .ok_or(MediaListError::NotFound("Not found."))?;
        log::info!("Deleted media entry {}", entry.id);
        Ok(())
    }

    pub fn len(&self) -> usize {
        lock(&self.table).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MediaStore {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub struct RatingStore {
    table: Arc<Mutex<EntityTable<Rating>>>,
}

impl RatingStore {
    pub fn new() -> Self {
        Self {
            table: Arc::new(Mutex::new(EntityTable::new())),
        }
    }

    pub fn create(&self, draft: RatingDraft, username: &str) -> Rating {
        let rating =
            lock(&self.table).insert_with(|id| Rating::from_draft(id, draft, username.to_string()));
        log::info!(
            "Created rating {} for media {} by {}",
            rating.id,
            rating.media_id,
            rating.username
        );
        rating
    }

    pub fn get(&self, id: u64) -> Option<Rating> {
        lock(&self.table).get(id)
    }

    pub fn save(&self, sessions: &SessionStore, rating: &mut Rating) -> Result<()> {
        rating.lease.ensure_owner_or_admin(sessions, &rating.username)?;
        rating.lease.end();

        if !lock(&self.table).replace(rating.id, rating.clone()) {
            return Err(MediaListError::NotFound("Rating not found."));
        }
        Ok(())
    }

    pub fn delete(&self, sessions: &SessionStore, rating: &mut Rating) -> Result<()> {
        rating.lease.ensure_owner_or_admin(sessions, &rating.username)?;
        rating.lease.end();

        lock(&self.table)
            .remove(rating.id)
            .ok_or(MediaListError::NotFound("Rating not found."))?;
        log::info!("Deleted rating {}", rating.id);
        Ok(())
    }

    pub fn len(&self) -> usize {
        lock(&self.table).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for RatingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MIN_HASH_COST;
    use crate::session::Session;
    use std::collections::HashSet;
    use std::time::Duration;

    fn stores() -> (SessionStore, UserStore, MediaStore) {
        let users = UserStore::new(MIN_HASH_COST);
        let sessions = SessionStore::new(users.clone(), "admin", Duration::from_secs(1800));
        (sessions, users, MediaStore::new())
    }

    fn login(sessions: &SessionStore, username: &str) -> Session {
        sessions.open(username)
    }

    #[test]
    fn test_register_then_duplicate_conflicts() {
        let (sessions, users, _) = stores();

        let mut alice = User::new("alice").unwrap();
        users.save(&sessions, &mut alice).unwrap();
        assert!(!alice.is_new());

        let mut again = User::new("alice").unwrap();
        assert!(matches!(
            users.save(&sessions, &mut again),
            Err(MediaListError::Conflict(_))
        ));
        assert_eq!(users.list().len(), 1);
    }

    #[test]
    fn test_update_existing_user_requires_owner_or_admin() {
        let (sessions, users, _) = stores();
        let mut alice = User::new("alice").unwrap();
        users.save(&sessions, &mut alice).unwrap();

        let bob = login(&sessions, "bob");
        let mut edited = users.get("alice").unwrap();
        edited.begin_edit(&sessions, &bob).unwrap();
        edited.full_name = "Mallory".to_string();
        assert!(matches!(
            users.save(&sessions, &mut edited),
            Err(MediaListError::Forbidden(_))
        ));

        let owner = login(&sessions, "alice");
        let mut edited = users.get("alice").unwrap();
        edited.begin_edit(&sessions, &owner).unwrap();
        edited.full_name = "Alice A.".to_string();
        users.save(&sessions, &mut edited).unwrap();

        assert_eq!(users.get("alice").unwrap().full_name, "Alice A.");
    }

    #[test]
    fn test_save_without_begin_edit_is_unauthorized() {
        let (sessions, users, _) = stores();
        let mut alice = User::new("alice").unwrap();
        users.save(&sessions, &mut alice).unwrap();

        let mut stored = users.get("alice").unwrap();
        assert!(matches!(
            users.delete(&sessions, &mut stored),
            Err(MediaListError::InvalidSession)
        ));
    }

    #[test]
    fn test_deleting_user_closes_their_sessions() {
        let (sessions, users, _) = stores();
        let mut alice = User::new("alice").unwrap();
        users.save(&sessions, &mut alice).unwrap();

        let stale = login(&sessions, "alice");
        let admin = login(&sessions, "admin");
        let mut stored = users.get("alice").unwrap();
        stored.begin_edit(&sessions, &admin).unwrap();
        users.delete(&sessions, &mut stored).unwrap();

        assert!(users.get("alice").is_none());
        assert!(sessions.get(stale.token()).is_none());
        assert!(sessions.contains(admin.token()));
    }

    #[test]
    fn test_media_create_get_delete() {
        let (sessions, _, media) = stores();
        let draft = MediaDraft {
            title: "Dune".to_string(),
            ..MediaDraft::default()
        };
        let created = media.create(draft, "alice").unwrap();
        let fetched = media.get(created.id).unwrap();
        assert_eq!(fetched.title, "Dune");
        assert_eq!(fetched.created_by, "alice");

        let admin = login(&sessions, "admin");
        let mut entry = fetched;
        entry.begin_edit(&sessions, &admin).unwrap();
        media.delete(&sessions, &mut entry).unwrap();

        assert!(media.get(created.id).is_none());
        assert!(!entry.lease.is_open());
    }

    #[test]
    fn test_media_create_requires_title() {
        let (_, _, media) = stores();
        let result = media.create(MediaDraft::default(), "alice");
        assert!(matches!(result, Err(MediaListError::Validation(_))));
        assert!(media.is_empty());
    }

    #[test]
    fn test_concurrent_media_creates_assign_distinct_ids() {
        let media = MediaStore::new();
        let threads: Vec<_> = (0..16)
            .map(|t| {
                let media = media.clone();
                std::thread::spawn(move || {
                    (0..25)
                        .map(|i| {
                            let draft = MediaDraft {
                                title: format!("title-{t}-{i}"),
                                ..MediaDraft::default()
                            };
                            media.create(draft, "alice").unwrap().id
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let ids: HashSet<u64> = threads
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect();

        assert_eq!(ids.len(), 400);
        assert_eq!(media.len(), 400);
        assert_eq!(ids.iter().min(), Some(&1));
        assert_eq!(ids.iter().max(), Some(&400));
    }

    #[test]
    fn test_rating_owner_can_update_others_cannot() {
        let (sessions, _, _) = stores();
        let ratings = RatingStore::new();
        let draft = RatingDraft {
            media_id: 1,
            value: 4,
            comment: "good".to_string(),
        };
        let created = ratings.create(draft, "alice");

        let bob = login(&sessions, "bob");
        let mut rating = ratings.get(created.id).unwrap();
        rating.begin_edit(&sessions, &bob).unwrap();
        rating.value = 1;
        assert!(ratings.save(&sessions, &mut rating).is_err());
        assert_eq!(ratings.get(created.id).unwrap().value, 4);

        let alice = login(&sessions, "alice");
        let mut rating = ratings.get(created.id).unwrap();
        rating.begin_edit(&sessions, &alice).unwrap();
        rating.value = 2;
        ratings.save(&sessions, &mut rating).unwrap();
        assert_eq!(ratings.get(created.id).unwrap().value, 2);
    }
}
