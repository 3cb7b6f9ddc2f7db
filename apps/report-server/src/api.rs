pub mod meta;
pub mod reports;
