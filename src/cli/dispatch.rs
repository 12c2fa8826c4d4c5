use crate::{cli::actions::Action, pipeline::{Config, UploadMode}};
use anyhow::{Context, Result, anyhow};
use clap::ArgMatches;
use colored::Colorize;
use std::{collections::BTreeMap, path::PathBuf};

// apply the flags on top of the settings file and return the Action for the subcommand
pub fn dispatch(matches: &ArgMatches, config: &mut Config) -> Result<Action> {
    let (name, sub_m) = matches.subcommand().context(format!(
        "subcommand missing, For more information try {}",
        "--help".green()
    ))?;

    apply_globals(sub_m, config);

    let dir = sub_m
        .get_one::<PathBuf>("dir")
        .cloned()
        .context("directory missing")?;

    match name {
        "publish" => {
            if sub_m.get_flag("force") {
                config.force = true;
            }

            if sub_m.get_flag("simulate") {
                config.simulate = true;
            }

            if sub_m.get_flag("public") {
                config.public = true;
            }

            if sub_m.get_flag("detach") {
                config.upload_mode = UploadMode::Detach;
            }

            if let Some(meta) = sub_m.get_one::<String>("meta") {
                config.metadata.extend(parse_meta(meta));
            }

            Ok(Action::Publish { dir })
        }

        "sync" => {
            if sub_m.get_flag("simulate") {
                config.simulate = true;
            }

            if let Some(days) = sub_m.get_one::<u32>("days") {
                config.days = Some(i64::from(*days));
            }

            Ok(Action::Sync { dir })
        }

        other => Err(anyhow!("unknown subcommand: {other}")),
    }
}

fn apply_globals(matches: &ArgMatches, config: &mut Config) {
    if let Some(bucket) = matches.get_one::<String>("bucket") {
        config.bucket.clone_from(bucket);
    }

    if let Some(key_filename) = matches.get_one::<PathBuf>("key-filename") {
        config.key_filename = key_filename.display().to_string();
    }

    if let Some(project_id) = matches.get_one::<String>("project-id") {
        config.project_id.clone_from(project_id);
    }

    if let Some(number) = matches.get_one::<u8>("number") {
        config.concurrency = usize::from(*number);
    }

    if matches.get_flag("strict") {
        config.strict = true;
    }

    if matches.get_count("verbose") > 0 {
        config.verbose = true;
    }
}

// key1=value1;key2=value2
fn parse_meta(meta: &str) -> BTreeMap<String, String> {
    meta.split(';')
        .filter_map(|pair| pair.split_once('='))
        .filter(|(key, _)| !key.trim().is_empty())
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect()
}
