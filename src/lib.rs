//! ffplan decides, per media file, whether a video needs re-encoding to
//! meet a quality/container policy and, when it does, synthesizes the
//! exact NVENC encoder arguments.
//!
//! The engine itself is a pure transformation from a probe snapshot
//! ([`probe::MediaDescriptor`]) and a policy ([`config::PolicyConfig`])
//! to a [`engine::Decision`]. Probing, process execution and queueing
//! belong to the enclosing host.

pub mod cli;
pub mod config;
pub mod engine;
pub mod probe;
