use std::collections::BTreeMap;

use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct SolidityConfig {
    #[serde(default)]
    pub compilers: Vec<CompilerProfile>,
    /// source path -> compiler used for that file only
    #[serde(default)]
    pub overrides: BTreeMap<String, CompilerProfile>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct CompilerProfile {
    pub version: String,
    #[serde(default)]
    pub settings: CompilerSettings,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct CompilerSettings {
    #[serde(default)]
    pub optimizer: OptimizerSettings,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct OptimizerSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_runs")]
    pub runs: u32,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            runs: default_runs(),
        }
    }
}

fn default_runs() -> u32 {
    200
}

impl CompilerProfile {
    pub fn semver(&self) -> Result<Version, ConfigError> {
        Version::parse(self.version.trim()).map_err(|source| ConfigError::InvalidVersion {
            version: self.version.clone(),
            source,
        })
    }
}

impl SolidityConfig {
    /// The first declared compiler is the default.
    pub fn default_compiler(&self) -> Result<&CompilerProfile, ConfigError> {
        self.compilers.first().ok_or(ConfigError::NoCompilers)
    }

    /// Compiler for a given source file: its override if any, else the default.
    pub fn compiler_for_source(&self, source_path: &str) -> Result<&CompilerProfile, ConfigError> {
        match self.overrides.get(source_path) {
            Some(profile) => Ok(profile),
            None => self.default_compiler(),
        }
    }

    /// Highest declared compiler satisfying a `pragma solidity` requirement,
    /// e.g. `^0.8.0` or `>=0.5.0 <0.6.0`.
    pub fn compiler_for_pragma(&self, pragma: &str) -> Result<Option<&CompilerProfile>, ConfigError> {
        let req = parse_pragma(pragma)?;

        let mut best: Option<(Version, &CompilerProfile)> = None;
        for profile in &self.compilers {
            let version = profile.semver()?;
            if !req.matches(&version) {
                continue;
            }
            if best.as_ref().map_or(true, |(v, _)| version > *v) {
                best = Some((version, profile));
            }
        }

        Ok(best.map(|(_, profile)| profile))
    }
}

/// Solidity separates comparators with whitespace, semver wants commas.
fn parse_pragma(pragma: &str) -> Result<VersionReq, ConfigError> {
    let cleaned = pragma
        .trim()
        .trim_start_matches("pragma")
        .trim()
        .trim_start_matches("solidity")
        .trim()
        .trim_end_matches(';')
        .trim();

    let mut comparators: Vec<String> = Vec::new();
    for token in cleaned.split_whitespace() {
        // `>= 0.5.0` style: glue a lone operator onto the next token
        match comparators.last_mut() {
            Some(last) if last.chars().all(|c| "<>=^~".contains(c)) => last.push_str(token),
            _ => comparators.push(token.to_owned()),
        }
    }
    let joined = comparators.join(", ");

    VersionReq::parse(&joined).map_err(|source| ConfigError::InvalidVersion {
        version: pragma.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(version: &str) -> CompilerProfile {
        CompilerProfile {
            version: version.to_owned(),
            settings: CompilerSettings {
                optimizer: OptimizerSettings {
                    enabled: true,
                    runs: 200,
                },
            },
        }
    }

    fn config() -> SolidityConfig {
        SolidityConfig {
            compilers: vec![profile("0.8.20"), profile("0.5.16"), profile("0.8.9")],
            overrides: BTreeMap::from([(
                String::from("contracts/legacy/Pair.sol"),
                profile("0.5.16"),
            )]),
        }
    }

    #[test]
    fn test_default_is_first() {
        assert_eq!(config().default_compiler().unwrap().version, "0.8.20");
        let empty = SolidityConfig::default();
        assert!(matches!(empty.default_compiler(), Err(ConfigError::NoCompilers)));
    }

    #[test]
    fn test_override_by_source() {
        let config = config();
        assert_eq!(
            config.compiler_for_source("contracts/legacy/Pair.sol").unwrap().version,
            "0.5.16"
        );
        assert_eq!(
            config.compiler_for_source("contracts/Token.sol").unwrap().version,
            "0.8.20"
        );
    }

    #[test]
    fn test_pragma_picks_highest_match() {
        let config = config();
        let chosen = config.compiler_for_pragma("^0.8.0").unwrap().unwrap();
        assert_eq!(chosen.version, "0.8.20");

        let chosen = config
            .compiler_for_pragma("pragma solidity >=0.5.0 <0.6.0;")
            .unwrap()
            .unwrap();
        assert_eq!(chosen.version, "0.5.16");

        let chosen = config.compiler_for_pragma(">= 0.5.0 < 0.6.0").unwrap().unwrap();
        assert_eq!(chosen.version, "0.5.16");
    }

    #[test]
    fn test_pragma_without_match() {
        assert!(config().compiler_for_pragma("^0.7.0").unwrap().is_none());
    }

    #[test]
    fn test_bad_pragma() {
        let err = config().compiler_for_pragma("banana").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidVersion { .. }));
    }
}
