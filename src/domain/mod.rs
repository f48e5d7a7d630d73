//! Domain types shared by forms, media intake and the API client.

pub mod business;
pub mod media;
pub mod session;
pub mod types;
