//! gemrelay — a local HTTP relay in front of the Gemini generative-language API.

pub mod cli;
pub mod config;
pub mod gateway;
pub mod logging;
pub mod providers;
