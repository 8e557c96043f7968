//! TaskSimplifier — webhook mail bot core.

pub mod config;
pub mod engine;
pub mod error;
pub mod mailer;
pub mod reminder;
pub mod replies;
pub mod session;
pub mod staging;
pub mod telegram;
pub mod update;
pub mod validate;
pub mod webhook;
