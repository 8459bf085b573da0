pub mod acquire;
pub mod clean;
pub mod config;
pub mod fetch;
pub mod integrate;
pub mod load;
pub mod normalize;
pub mod output;
pub mod records;
pub mod validate;
