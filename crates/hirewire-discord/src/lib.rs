//! `hirewire-discord` — Discord surface for the interview bot.
//!
//! A serenity client with a prefix-command handler, plus a background
//! delivery task that posts scheduler output to the configured channel.

pub mod adapter;
pub mod commands;
pub mod delivery;
pub mod handler;
pub mod send;

pub use adapter::DiscordAdapter;
