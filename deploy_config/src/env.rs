use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Selects which dotenv file is loaded: `.<name>.env`.
pub const DEPLOY_ENV_ENV_VAR: &str = "DEPLOY_ENV";
/// Command-line spelling of the same selector.
pub const DEPLOY_ENV_FLAG: &str = "--env";

/// `.<name>.env`, or plain `.env` without a selector.
pub fn env_file_name(env_name: Option<&str>) -> String {
    match env_name {
        Some(name) if !name.is_empty() => format!(".{name}.env"),
        _ => String::from(".env"),
    }
}

/// Load the one dotenv file for `env_name`, searching from the working
/// directory upwards.
///
/// A missing file is not an error; the process environment may already carry
/// everything the config references. Variables already set are never
/// overwritten, so call this once, before anything reads the environment.
pub fn load_env(env_name: Option<&str>) -> Option<PathBuf> {
    dotenv::from_filename(env_file_name(env_name)).ok()
}

/// Load the one dotenv file for `env_name` from `dir` only.
pub fn load_env_from(dir: &Path, env_name: Option<&str>) -> Option<PathBuf> {
    let path = dir.join(env_file_name(env_name));
    dotenv::from_path(&path).ok().map(|_| path)
}

/// The env file selector: `--env <name>` / `--env=<name>` on the command
/// line wins over [`DEPLOY_ENV_ENV_VAR`].
///
/// Must be known before the flags are parsed, since the selected file can
/// provide their fallbacks.
pub fn selected_env_name<I, S>(args: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    env_name_from_args(args)
        .or_else(|| std::env::var(DEPLOY_ENV_ENV_VAR).ok())
        .filter(|name| !name.is_empty())
}

fn env_name_from_args<I, S>(args: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut args = args.into_iter();
    let mut found = None;
    while let Some(arg) = args.next() {
        let arg = arg.as_ref();
        if arg == "--" {
            break;
        }
        if arg == DEPLOY_ENV_FLAG {
            found = args.next().map(|v| v.as_ref().to_owned());
        } else if let Some(value) = arg
            .strip_prefix(DEPLOY_ENV_FLAG)
            .and_then(|rest| rest.strip_prefix('='))
        {
            found = Some(value.to_owned());
        }
    }
    found
}

/// Replace every `${VAR}` in `raw` with the value from the process environment.
pub fn interpolate(raw: &str) -> Result<String, ConfigError> {
    interpolate_with(raw, |name| std::env::var(name).ok())
}

/// Replace every `${VAR}` in `raw` using `lookup`.
///
/// Unset variables become the empty string, so a network whose secret is not
/// exported only fails once it is actually selected.
pub fn interpolate_with<F>(raw: &str, lookup: F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            return Err(ConfigError::BadPlaceholder(raw.to_owned()));
        };

        let name = after[..end].trim();
        if let Some(value) = lookup(name) {
            out.push_str(&value);
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);

    Ok(out)
}

/// Walk a parsed TOML tree and interpolate every string in place.
pub(crate) fn interpolate_value(value: &mut toml::Value) -> Result<(), ConfigError> {
    match value {
        toml::Value::String(s) => {
            if s.contains("${") {
                *s = interpolate(s)?;
            }
        }
        toml::Value::Array(items) => {
            for item in items {
                interpolate_value(item)?;
            }
        }
        toml::Value::Table(table) => {
            for (_, item) in table.iter_mut() {
                interpolate_value(item)?;
            }
        }
        _ => {}
    }
    Ok(())
}
