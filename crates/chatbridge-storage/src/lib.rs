//! Preference persistence for chatbridge.

pub mod db;
