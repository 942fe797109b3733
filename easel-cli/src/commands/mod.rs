pub mod artwork;
pub mod provider;
pub mod target;
