//! Interaction controller for a drag-to-rotate 3D carousel.
//!
//! The [`ring`] module holds the state machine itself: layout, drag rotation
//! with a spring settle, focus selection and overlay presence. [`sys`] hosts
//! one carousel in a small daemon driven over a Unix socket.

pub mod config;
pub mod events;
pub mod macros;
pub mod ring;
pub mod sys;
