pub(crate) mod fields;
pub mod media;
pub mod ratings;
pub mod sessions;
pub mod users;
pub mod version;

pub use media::MediaHandler;
pub use ratings::RatingHandler;
pub use sessions::SessionHandler;
pub use users::UserHandler;
pub use version::{VersionHandler, VERSION};
