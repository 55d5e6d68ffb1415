pub mod extract;
pub mod payload;

pub use extract::{ValidForm, ValidJson, ValidPath};
pub use payload::{TokenForm, TrailPayload};
