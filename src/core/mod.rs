//! Face/emotion correlation engine and the types it works on.

pub mod correlation;
pub mod detection;
pub mod schema;
pub mod validation;
