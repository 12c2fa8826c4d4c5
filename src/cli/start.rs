use crate::{
    cli::{KeyFile, actions::Action, commands, dispatch, load_settings},
    pipeline::Config,
    s3::S3,
};
use anyhow::{Context, Result};
use chrono::Local;
use clap::ArgMatches;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

/// `~/.config/s3pub`
///
/// # Errors
/// Will return an error if the directory can not be created
pub fn get_config_path() -> Result<PathBuf> {
    let home_dir = dirs::home_dir().map_or_else(|| PathBuf::from("/tmp"), |h| h);

    let config_path = Path::new(&home_dir).join(".config").join("s3pub");
    fs::create_dir_all(&config_path)
        .context(format!("unable to create: {}", &config_path.display()))?;

    Ok(config_path)
}

/// # Errors
/// Will return an error if the settings or key file can not be loaded or a
/// required option is missing
pub fn start() -> Result<(S3, Action, Config)> {
    let config_path = get_config_path()?;

    // start the command line interface
    let cmd = commands::new(&config_path);

    // get the matches
    let matches = cmd.get_matches();

    let verbosity_level = match matches.get_count("verbose") {
        0 | 1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };

    env_logger::Builder::new()
        .filter_level(verbosity_level)
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {}",
                Local::now().format("%H:%M:%S"),
                record.args()
            )
        })
        .init();

    log::debug!("config path: {}", config_path.display());

    build(&matches, &config_path)
}

/// Settings file, then flags, then the key file
///
/// # Errors
/// Will return an error if the settings or key file can not be loaded or a
/// required option is missing
pub fn build(matches: &ArgMatches, config_path: &Path) -> Result<(S3, Action, Config)> {
    // explicit -c or the default settings file when present
    let settings_file = matches.get_one::<PathBuf>("config").cloned().or_else(|| {
        let default = config_path.join("s3pub.yml");
        default.is_file().then_some(default)
    });

    let mut config = match &settings_file {
        Some(path) => {
            log::debug!("settings file: {}", path.display());
            load_settings(path)?
        }
        None => Config::default(),
    };

    let action = dispatch::dispatch(matches, &mut config)?;

    config.validate()?;

    let key_file = KeyFile::new(Path::new(&config.key_filename))?;
    let s3 = key_file.s3(&config)?;

    log::debug!("S3:\n{s3}");
    log::debug!("config: {config:#?}, action: {action:#?}");

    Ok((s3, action, config))
}
