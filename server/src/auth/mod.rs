pub mod guard;
pub mod lease;

pub use guard::{
    require_admin, require_owner_or_admin, require_valid_session, ADMIN_REQUIRED,
    OWNER_OR_ADMIN_REQUIRED,
};
pub use lease::EditLease;
