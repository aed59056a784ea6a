//! # Survey Bot
//!
//! A Telegram bot that walks users through a configured survey.
//!
//! ## Features
//! - Number, range, choice, multiple choice and free text questions
//! - Answer validation with a retry prompt on bad input
//! - Optional questions that can be skipped with /skip
//! - Completed surveys written to Google Sheets, Google Forms or JSON files
//! - Health endpoints for container orchestration

/// Telegram commands, handlers and effect execution
pub mod bot;
/// Configuration management and environment variables
pub mod config;
/// Background services like the health server
pub mod services;
/// Destinations for completed surveys
pub mod sinks;
/// Questions, sessions and the conversation state machine
pub mod survey;
/// Utility functions for formatting, feedback and logging
pub mod utils;
