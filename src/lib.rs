pub mod app;
pub mod chat;
pub mod config;
pub mod error;
pub mod extract;
pub mod matchmaking;
pub mod profiles;
pub mod projects;
pub mod relay;
pub mod skills;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;
