pub mod export;
pub mod preferences;
