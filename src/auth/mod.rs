pub mod bearer;

pub use bearer::{authorize, bearer_token, TeamAccess, BEARER_PREFIX};
