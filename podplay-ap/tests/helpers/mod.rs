//! Test helper modules for podplay-ap integration tests
//!
//! - ScriptedHandle: media handle whose starts are resolved by the test
//! - Harness: engine + store wired to a ScriptedHandle
//! - episode builders

#![allow(dead_code)]

pub mod harness;
pub mod scripted_handle;

pub use harness::{drain, episode, episode_without_source, Harness};
pub use scripted_handle::{HandleScript, ScriptedHandle};
