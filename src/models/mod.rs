pub mod admin;
pub mod enums;
pub mod organ_match;
pub mod profile;
pub mod request;

pub use admin::*;
pub use organ_match::*;
pub use profile::*;
pub use request::*;
