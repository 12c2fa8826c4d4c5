//! Publish files to an object storage bucket and prune the stale ones.
//!
//! The [`pipeline`] module holds the two operations (publish and sync-delete)
//! behind the [`pipeline::Backend`] trait, [`s3`] provides a backend for S3
//! compatible services and [`cli`] wires both into the `s3pub` binary.

pub mod cli;
pub mod pipeline;
pub mod s3;
