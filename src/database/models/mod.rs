pub mod trail;
pub mod user;

pub use trail::{NewTrail, Trail, TrailChanges, TrailDetails, TrailLogEntry};
pub use user::{User, EXTERNAL_AUTH_PASSWORD};
