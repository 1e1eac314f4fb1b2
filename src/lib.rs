//! Outreach — drafts practice outreach messages on behalf of doctors.
//!
//! The drafting pipeline reads the prior conversation between a doctor and a
//! practice, classifies the practice's latest reply, picks a message
//! template, renders it, and optionally polishes it through an ordered chain
//! of generative providers. Every stage degrades gracefully: a missing thread
//! is a first-time application and a failed provider chain returns the
//! rendered template untouched.
//!
//! See `DESIGN.md` for the architecture notes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod credentials;
pub mod logging;
pub mod providers;
pub mod store;

pub mod drafting;
