use crate::cli::commands::{validator_is_dir, validator_key_value};
use clap::{Arg, Command};

pub fn command() -> Command {
    Command::new("publish")
        .about("Upload the files of <dir> whose MD5 differs from the stored object")
        .arg(
            Arg::new("dir")
                .help("/path/to/build/output")
                .required(true)
                .value_parser(validator_is_dir())
                .num_args(1),
        )
        .arg(
            Arg::new("force")
                .help("Upload even when the stored MD5 matches")
                .long("force")
                .short('f')
                .num_args(0),
        )
        .arg(
            Arg::new("simulate")
                .help("Log what would be uploaded, send nothing")
                .long("simulate")
                .short('s')
                .num_args(0),
        )
        .arg(
            Arg::new("public")
                .help("Make the uploaded objects publicly readable")
                .long("public")
                .short('p')
                .num_args(0),
        )
        .arg(
            Arg::new("meta")
                .help("Object metadata, example: \"cache-control=no-cache;build=42\"")
                .long("meta")
                .short('m')
                .value_parser(validator_key_value())
                .num_args(1),
        )
        .arg(
            Arg::new("detach")
                .help("Don't wait for the uploads, only log their outcome")
                .long("detach")
                .num_args(0),
        )
}
