//! Education resource service.
//!
//! Exposes `GET /fetch_resources`, which prompts a generative-content
//! provider for scholarships, career opportunities, mentorship programs and
//! skill-development resources and relays the JSON it returns.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
