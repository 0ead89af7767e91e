pub mod config;
pub mod document;
pub mod duplicate;
pub mod hash;
pub mod locale;
pub mod similarity;
