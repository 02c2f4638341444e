use crate::{Profile, Result, Soc, cargo};

use serde::{Deserialize, Serialize};
use std::{fs, path::Path, process::Command, str::FromStr};
use target_lexicon::{Architecture, Triple};

#[derive(Debug, Serialize, Deserialize)]
pub struct Build {
    pub buildflags: Option<Vec<String>>,
    pub rustflags: Option<Vec<String>>,
    pub target: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub features: Option<Vec<String>>,
    pub soc: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Configuration {
    pub build: Option<Build>,
    pub config: Option<Config>,
}

impl Configuration {
    /// The compilation target, if the file names one.
    pub fn target(&self) -> Option<&str> {
        self.build.as_ref().map(|b| b.target.as_str())
    }
}

pub fn read_config(filename: &Path) -> Result<Configuration> {
    let contents = fs::read_to_string(filename)
        .map_err(|e| format!("Could not read file `{}`: {e}", filename.display()))?;
    parse_config(&contents)
        .map_err(|e| format!("ConfigFile: Unable to load data from `{}`\n{e}", filename.display()).into())
}

/// Custom `.json` targets are taken on trust; triples must be 32-bit MIPS.
pub fn check_target(target: &str) -> Result<()> {
    if target.ends_with(".json") {
        return Ok(());
    }
    let triple = Triple::from_str(target).map_err(|e| format!("bad target `{target}`: {e}"))?;
    match triple.architecture {
        Architecture::Mips32(_) => Ok(()),
        arch => Err(format!("target `{target}` is {arch}, not 32-bit MIPS").into()),
    }
}

pub fn parse_config(contents: &str) -> std::result::Result<Configuration, toml::de::Error> {
    toml::from_str(contents)
}

/// Build a cargo command for `task` that compiles the board crate for the
/// configured SoC.  `soc` overrides the SoC named in the file.
pub fn generate_args(
    task: &str,
    config: &Configuration,
    soc: Option<Soc>,
    profile: Profile,
    wks_path: &Path,
) -> Result<Command> {
    let mut rustflags: Vec<String> = Vec::new();
    let mut cmd = Command::new(cargo());
    cmd.current_dir(wks_path);
    cmd.arg(task);

    if let Profile::Release = profile {
        cmd.arg("--release");
    }

    // Tests and lints run on the host.
    let cross = task != "clippy" && task != "test";
    if let Some(build) = &config.build {
        if cross {
            cmd.arg("-p").arg("ramips");
            let target = &build.target;
            check_target(target)?;
            if target.ends_with(".json") {
                cmd.arg("--target").arg(wks_path.join(target));
            } else {
                cmd.arg("--target").arg(target);
            }

            if let Some(flags) = &build.buildflags {
                cmd.args(flags);
            }

            if let Some(flags) = &build.rustflags {
                rustflags.extend(flags.iter().cloned());
            }
        }
    }

    let soc = match (soc, &config.config) {
        (Some(soc), _) => soc,
        (None, Some(c)) => c.soc.parse::<Soc>()?,
        (None, None) => return Err("no SoC given and config has no [config] soc".into()),
    };
    let mut features = vec![format!("ramips/{soc}")];
    if let Some(extra) = config.config.as_ref().and_then(|c| c.features.as_ref()) {
        features.extend(extra.iter().map(|f| format!("ramips/{f}")));
    }
    cmd.arg("--no-default-features");
    cmd.arg(format!("--features={}", features.join(",")));

    if !rustflags.is_empty() {
        let flat = rustflags.join(" ");
        cmd.arg("--config");
        cmd.arg(format!("build.rustflags='{}'", flat));
    }

    Ok(cmd)
}
