//! CLI module for monotable
//!
//! Every command takes a table document path, loads it through
//! [`config::load_table`], and renders the result with [`output`] helpers.

pub mod config;
pub mod error;
pub mod output;

pub mod check;
pub mod entities;
pub mod indexes;
pub mod show;
