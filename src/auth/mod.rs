mod claims;
mod extractors;

pub use claims::{verify_token, Claims};
pub use extractors::{AuthIdentity, Identity};
