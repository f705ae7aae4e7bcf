//! Core of smart-volume-adjust
//!
//! Picks which stream or device on an audio server should have its volume
//! changed, computes the new volume, and describes the outcome. Talking to a
//! real server is left to implementations of [`domain::AudioGateway`].

pub mod domain;
