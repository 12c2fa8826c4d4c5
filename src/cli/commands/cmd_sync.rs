use crate::cli::commands::validator_is_dir;
use clap::{Arg, Command};

pub fn command() -> Command {
    Command::new("sync")
        .about("Delete the objects that are not in <dir> and older than the retention")
        .arg(
            Arg::new("dir")
                .help("/path/to/build/output")
                .required(true)
                .value_parser(validator_is_dir())
                .num_args(1),
        )
        .arg(
            Arg::new("simulate")
                .help("Log what would be deleted, delete nothing")
                .long("simulate")
                .short('s')
                .num_args(0),
        )
        .arg(
            Arg::new("days")
                .help("Retention in days, objects younger than this are kept [default: 7]")
                .long("days")
                .short('d')
                .value_parser(clap::value_parser!(u32).range(1..))
                .num_args(1),
        )
}
