// Public handlers: no bearer token required.

pub mod root;
pub mod token;
pub mod trails;
pub mod users;
