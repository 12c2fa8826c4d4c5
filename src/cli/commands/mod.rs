pub mod cmd_publish;
pub mod cmd_sync;

use clap::{
    Arg, ColorChoice, Command,
    builder::ValueParser,
    builder::styling::{AnsiColor, Effects, Styles},
};
use regex::Regex;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::LazyLock,
};

// <https://docs.aws.amazon.com/AmazonS3/latest/userguide/bucketnamingrules.html>
static BUCKET_NAME: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9._-]{1,220}[a-z0-9]$").ok());

pub fn validator_key_value() -> ValueParser {
    ValueParser::from(move |s: &str| -> std::result::Result<String, String> {
        for pair in s.split(';').filter(|pair| !pair.trim().is_empty()) {
            match pair.split_once('=') {
                Some((key, _)) if !key.trim().is_empty() => (),
                _ => return Err(String::from("metadata format is key1=value1;key2=value2")),
            }
        }
        Ok(s.to_string())
    })
}

pub fn validator_bucket() -> ValueParser {
    ValueParser::from(move |s: &str| -> std::result::Result<String, String> {
        match BUCKET_NAME.as_ref() {
            Some(re) if re.is_match(s) => Ok(s.to_string()),
            _ => Err(format!("Invalid bucket name: '{s}'")),
        }
    })
}

pub fn validator_is_file() -> ValueParser {
    ValueParser::from(move |s: &str| -> std::result::Result<PathBuf, String> {
        if let Ok(metadata) = fs::metadata(s) {
            if metadata.is_file() {
                return Ok(PathBuf::from(s));
            }
        }

        Err(format!("Invalid file path or file does not exist: '{s}'"))
    })
}

pub fn validator_is_dir() -> ValueParser {
    ValueParser::from(move |s: &str| -> std::result::Result<PathBuf, String> {
        if let Ok(metadata) = fs::metadata(s) {
            if metadata.is_dir() {
                return Ok(PathBuf::from(s));
            }
        }

        Err(format!("Invalid path or directory does not exist: '{s}'"))
    })
}

pub fn new(config_path: &Path) -> Command {
    // get settings file path (default: ~/.config/s3pub/s3pub.yml)
    let settings_file_path = config_path.join("s3pub.yml");

    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("s3pub")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Publish a directory to a bucket, skipping unchanged files, and prune stale objects")
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
            .help(format!("Settings file [default: {}]", settings_file_path.display()))
            .long("config")
            .short('c')
            .global(true)
            .num_args(1)
            .value_parser(validator_is_file())
            .value_name("s3pub.yml")
        )
        .arg(
            Arg::new("verbose")
            .help("Verbosity level, -v logs every check, -vv debug")
            .short('v')
            .long("verbose")
            .global(true)
            .action(clap::ArgAction::Count)
        )
        .arg(
            Arg::new("number")
            .help("Number of max concurrent requests [default: physical cpus - 2]")
            .short('n')
            .long("number")
            .global(true)
            .value_parser(clap::value_parser!(u8).range(1..=255))
            .num_args(1)
        )
        .arg(
            Arg::new("bucket")
            .help("Bucket name")
            .long("bucket")
            .short('b')
            .env("S3PUB_BUCKET")
            .global(true)
            .value_parser(validator_bucket())
            .num_args(1)
        )
        .arg(
            Arg::new("key-filename")
            .help("Credentials file (access_key, secret_key, endpoint, region)")
            .long("key-filename")
            .short('k')
            .env("S3PUB_KEY_FILENAME")
            .global(true)
            .value_parser(validator_is_file())
            .value_name("key.yml")
            .num_args(1)
        )
        .arg(
            Arg::new("project-id")
            .help("Project id, sent as x-goog-project-id")
            .long("project-id")
            .env("S3PUB_PROJECT_ID")
            .global(true)
            .num_args(1)
        )
        .arg(
            Arg::new("strict")
            .help("Fail on backend errors instead of logging them")
            .long("strict")
            .global(true)
            .num_args(0)
        )
        .subcommand(cmd_publish::command())
        .subcommand(cmd_sync::command())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::io::Write;
    use tempfile::{Builder, TempDir};

    fn get_config() -> Result<TempDir> {
        let tmp_dir = Builder::new().prefix("test-s3pub-").tempdir()?;
        let mut settings = fs::File::create(tmp_dir.path().join("s3pub.yml"))?;
        settings.write_all(b"bucket: assets\n")?;
        fs::File::create(tmp_dir.path().join("key.yml"))?;
        fs::create_dir(tmp_dir.path().join("dist"))?;
        Ok(tmp_dir)
    }

    fn matches(tmp_dir: &TempDir, args: &[&str]) -> clap::error::Result<clap::ArgMatches> {
        temp_env::with_vars_unset(
            ["S3PUB_BUCKET", "S3PUB_KEY_FILENAME", "S3PUB_PROJECT_ID"],
            || new(tmp_dir.path()).try_get_matches_from(args),
        )
    }

    #[test]
    fn test_publish_defaults() -> Result<()> {
        let tmp_dir = get_config()?;
        let dist = tmp_dir.path().join("dist");
        let m = matches(&tmp_dir, &["s3pub", "publish", dist.to_str().unwrap()])?;

        let (name, sub_m) = m.subcommand().unwrap();
        assert_eq!(name, "publish");
        assert_eq!(sub_m.get_one::<PathBuf>("dir"), Some(&dist));
        assert!(!sub_m.get_flag("force"));
        assert!(!sub_m.get_flag("simulate"));
        assert!(!sub_m.get_flag("public"));
        assert!(!sub_m.get_flag("detach"));
        assert_eq!(sub_m.get_one::<String>("meta"), None);
        assert_eq!(m.get_count("verbose"), 0);
        assert_eq!(m.get_one::<u8>("number"), None);
        assert_eq!(m.get_one::<PathBuf>("config"), None);
        Ok(())
    }

    #[test]
    fn test_publish_flags() -> Result<()> {
        let tmp_dir = get_config()?;
        let dist = tmp_dir.path().join("dist");
        let key = tmp_dir.path().join("key.yml");
        let m = matches(
            &tmp_dir,
            &[
                "s3pub",
                "-vv",
                "-n",
                "8",
                "publish",
                dist.to_str().unwrap(),
                "--force",
                "--public",
                "--meta",
                "cache-control=no-cache;build=42",
                "--bucket",
                "assets",
                "--key-filename",
                key.to_str().unwrap(),
                "--project-id",
                "web",
                "--strict",
            ],
        )?;

        assert_eq!(m.get_count("verbose"), 2);
        assert_eq!(m.get_one::<u8>("number"), Some(&8));
        let sub_m = m.subcommand_matches("publish").unwrap();
        assert!(sub_m.get_flag("force"));
        assert!(sub_m.get_flag("public"));
        assert_eq!(
            sub_m.get_one::<String>("meta").map(String::as_str),
            Some("cache-control=no-cache;build=42")
        );
        assert_eq!(
            sub_m.get_one::<String>("bucket").map(String::as_str),
            Some("assets")
        );
        assert_eq!(sub_m.get_one::<PathBuf>("key-filename"), Some(&key));
        assert!(sub_m.get_flag("strict"));
        Ok(())
    }

    #[test]
    fn test_sync_days() -> Result<()> {
        let tmp_dir = get_config()?;
        let dist = tmp_dir.path().join("dist");
        let m = matches(
            &tmp_dir,
            &["s3pub", "sync", dist.to_str().unwrap(), "--days", "30", "-s"],
        )?;
        let sub_m = m.subcommand_matches("sync").unwrap();
        assert_eq!(sub_m.get_one::<u32>("days"), Some(&30));
        assert!(sub_m.get_flag("simulate"));
        Ok(())
    }

    #[test]
    fn test_sync_days_zero() -> Result<()> {
        let tmp_dir = get_config()?;
        let dist = tmp_dir.path().join("dist");
        let m = matches(
            &tmp_dir,
            &["s3pub", "sync", dist.to_str().unwrap(), "--days", "0"],
        );
        assert!(m.is_err());
        Ok(())
    }

    #[test]
    fn test_config_file() -> Result<()> {
        let tmp_dir = get_config()?;
        let dist = tmp_dir.path().join("dist");
        let settings = tmp_dir.path().join("s3pub.yml");
        let m = matches(
            &tmp_dir,
            &[
                "s3pub",
                "-c",
                settings.to_str().unwrap(),
                "sync",
                dist.to_str().unwrap(),
            ],
        )?;
        assert_eq!(m.get_one::<PathBuf>("config"), Some(&settings));

        let m = matches(
            &tmp_dir,
            &["s3pub", "-c", "/nonexistent/s3pub.yml", "sync", dist.to_str().unwrap()],
        );
        assert!(m.is_err());
        Ok(())
    }

    #[test]
    fn test_missing_dir() -> Result<()> {
        let tmp_dir = get_config()?;
        let m = matches(&tmp_dir, &["s3pub", "publish", "/nonexistent/dist"]);
        assert!(m.is_err());
        let m = matches(&tmp_dir, &["s3pub", "publish"]);
        assert!(m.is_err());
        Ok(())
    }

    #[test]
    fn test_invalid_meta() -> Result<()> {
        let tmp_dir = get_config()?;
        let dist = tmp_dir.path().join("dist");
        let m = matches(
            &tmp_dir,
            &["s3pub", "publish", dist.to_str().unwrap(), "--meta", "no-value"],
        );
        assert!(m.is_err());
        Ok(())
    }

    #[test]
    fn test_number_range() -> Result<()> {
        let tmp_dir = get_config()?;
        let dist = tmp_dir.path().join("dist");
        for n in ["0", "256", "x"] {
            let m = matches(&tmp_dir, &["s3pub", "-n", n, "sync", dist.to_str().unwrap()]);
            assert!(m.is_err(), "{n}");
        }
        Ok(())
    }

    #[test]
    fn test_validator_bucket() -> Result<()> {
        let tmp_dir = get_config()?;
        let dist = tmp_dir.path().join("dist");
        for bucket in ["Assets", "a", "-assets", "my bucket"] {
            let m = matches(
                &tmp_dir,
                &["s3pub", "sync", dist.to_str().unwrap(), "--bucket", bucket],
            );
            assert!(m.is_err(), "{bucket}");
        }
        let m = matches(
            &tmp_dir,
            &["s3pub", "sync", dist.to_str().unwrap(), "--bucket", "www.example.com"],
        );
        assert!(m.is_ok());
        Ok(())
    }

    #[test]
    fn test_subcommand_required() -> Result<()> {
        let tmp_dir = get_config()?;
        assert!(matches(&tmp_dir, &["s3pub"]).is_err());
        assert!(matches(&tmp_dir, &["s3pub", "ls"]).is_err());
        Ok(())
    }
}
