pub mod mpa;
pub mod user;
