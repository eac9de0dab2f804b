//! Auth-domain models shared by the session and gateway layers.

pub mod credential;

pub use credential::*;
