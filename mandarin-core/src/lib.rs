pub mod client;
pub mod edit;
pub mod endpoints;
pub mod error;
pub mod intro;
pub mod loader;
pub mod model;
pub mod profile;

pub use client::{Credential, MandarinClient};
pub use endpoints::ProfileApi;
pub use error::ProfileError;
pub use intro::{Gender, IntroFields};
pub use profile::{ProfileShape, ProfileViewModel};
