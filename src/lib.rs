//! Motionboard library.
//!
//! An API backend for a threaded animation-sharing board. Threads, replies,
//! users, and animation assets are persisted as flat key/value pairs in a
//! namespaced store with list-by-prefix support; ordering, uniqueness, and
//! foreign-key resolution are built from key naming conventions alone.

pub mod auth;
pub mod config;
pub mod constants;
pub mod error;
pub mod frames;
pub mod kv;
pub mod models;
pub mod params;
pub mod posts;
pub mod web;
