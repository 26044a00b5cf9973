//! Core types and trait definitions for the Roster service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement [`repository::Repository`] and
//! [`repository::SessionFactory`]; the HTTP layer depends only on those
//! traits.

pub mod credential;
pub mod entity;
pub mod error;
pub mod repository;
pub mod resource;
pub mod user;

pub use error::{Classify, Error, ErrorKind, Result};
