//! Data and rules behind the EtetFamily memory-book site: the family tree,
//! gallery, map and timeline fixtures, the contact form validator, and the
//! scoring rules of the quiz, trivia and memory games.

use static_toml::static_toml;
use thiserror::Error;

pub mod contact;
pub mod data;
pub mod family;
pub mod gallery;
pub mod game;
pub mod map;
pub mod timeline;

pub use data::store::Fixtures;

static_toml! {
    pub static CONFIG = include_toml!("config.toml");
}

/// Failure of a lookup or derivation over the fixture store.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum QueryError {
    #[error("no {kind} with id '{id}'")]
    NotFound { kind: &'static str, id: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
