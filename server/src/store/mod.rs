pub mod models;
pub mod repository;
pub(crate) mod table;

pub use models::{
    validate_rating_value, MediaDraft, MediaEntry, MediaType, Rating, RatingDraft, User,
    UserProfile, MAX_RATING, MIN_RATING,
};
pub use repository::{MediaStore, RatingStore, UserStore};
