//! `s3pub` command line: settings and credentials files, flags, and the
//! publish / sync actions on top of [`crate::pipeline`] and [`crate::s3`].

mod config;
pub use self::config::{KeyFile, load_settings};

pub mod actions;
pub mod source;

mod start;
pub use self::start::{build, get_config_path, start};

pub mod commands;
mod dispatch;
