mod config;

use std::{
    env, fmt, fs,
    path::{Path, PathBuf},
    process::{self, Command},
    str::FromStr,
};

use crate::config::{Configuration, generate_args, read_config};

type DynError = Box<dyn std::error::Error>;
type Result<T> = std::result::Result<T, DynError>;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Profile {
    Debug,
    Release,
}

impl Profile {
    fn dir(self) -> &'static str {
        match self {
            Profile::Debug => "debug",
            Profile::Release => "release",
        }
    }
}

/// Must match the features of the ramips crate.
#[derive(Clone, Copy, Debug, PartialEq, clap::ValueEnum)]
enum Soc {
    Mt7620,
    Rt3883,
    Mt7621,
    Rt305x,
    Rt63365e,
}

impl fmt::Display for Soc {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", format!("{self:?}").to_lowercase())
    }
}

impl FromStr for Soc {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        <Soc as clap::ValueEnum>::from_str(s, true).map_err(|_| format!("unsupported SoC `{s}`"))
    }
}

struct BuildParams {
    profile: Profile,
    verbose: bool,
    soc: Option<Soc>,
    config: Option<PathBuf>,
}

impl BuildParams {
    fn new(matches: &clap::ArgMatches) -> Self {
        let profile = if matches.get_flag("release") { Profile::Release } else { Profile::Debug };
        let verbose = matches.get_flag("verbose");
        let soc = matches.try_get_one::<Soc>("soc").ok().flatten().copied();
        let config = matches.try_get_one::<PathBuf>("config").ok().flatten().cloned();

        Self { profile, verbose, soc, config }
    }

    /// Explicit `--config`, else the file for `--soc`, else the default board.
    fn config_path(&self) -> PathBuf {
        match (&self.config, self.soc) {
            (Some(path), _) => path.clone(),
            (None, soc) => {
                let soc = soc.unwrap_or(Soc::Mt7621);
                workspace().join("lib").join("config").join(format!("{soc}.toml"))
            }
        }
    }

    fn configuration(&self) -> Result<Configuration> {
        read_config(&self.config_path())
    }

    fn command(&self, task: &str, config: &Configuration) -> Result<Command> {
        let cmd = generate_args(task, config, self.soc, self.profile, &workspace())?;
        if self.verbose {
            println!("Executing {cmd:?}");
        }
        Ok(cmd)
    }

    fn target(&self, config: &Configuration) -> String {
        let configured = config.target().unwrap_or("mipsel-unknown-none");
        let name = Path::new(configured)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(configured)
            .to_string();
        env_or("TARGET", &name)
    }
}

fn main() {
    let build_args = || {
        [
            clap::arg!(--release "Build release version").conflicts_with("debug"),
            clap::arg!(--debug "Build debug version (default)").conflicts_with("release"),
            clap::arg!(--verbose "Print commands"),
            clap::arg!(--soc <soc> "SoC to build for")
                .required(false)
                .value_parser(clap::builder::EnumValueParser::<Soc>::new()),
            clap::arg!(--config <file> "Board configuration file")
                .required(false)
                .value_parser(clap::value_parser!(PathBuf)),
        ]
    };
    let matches = clap::Command::new("xtask")
        .version("0.1.0")
        .about("Build support for the ramips loader board shim")
        .subcommand(clap::Command::new("build").about("Builds the board library").args(build_args()))
        .subcommand(
            clap::Command::new("dist")
                .about("Builds and collects the library for the loader")
                .args(build_args()),
        )
        .subcommand(clap::Command::new("test").about("Runs unit tests").args(build_args()))
        .subcommand(clap::Command::new("clippy").about("Runs clippy").args(build_args()))
        .subcommand(clap::Command::new("clean").about("Cargo clean"))
        .get_matches();

    if let Err(e) = match matches.subcommand() {
        Some(("build", m)) => build(&BuildParams::new(m)),
        Some(("dist", m)) => dist(&BuildParams::new(m)),
        Some(("test", m)) => test(&BuildParams::new(m)),
        Some(("clippy", m)) => clippy(&BuildParams::new(m)),
        Some(("clean", _)) => clean(),
        _ => Err("bad subcommand".into()),
    } {
        eprintln!("{e}");
        process::exit(1);
    }
}

fn env_or(var: &str, default: &str) -> String {
    let default = default.to_string();
    env::var(var).unwrap_or(default)
}

fn cargo() -> String {
    env_or("CARGO", "cargo")
}

fn objcopy() -> String {
    env_or("OBJCOPY", "llvm-objcopy")
}

/// Copy the built archive into place, dropping debug info the loader image
/// has no room for.
fn strip_command(built: &Path, out: &Path) -> Command {
    let mut cmd = Command::new(objcopy());
    cmd.arg("--strip-debug").arg(built).arg(out);
    cmd
}

fn build(build_params: &BuildParams) -> Result<()> {
    let config = build_params.configuration()?;
    let status = build_params.command("build", &config)?.status()?;
    if !status.success() {
        return Err("build failed".into());
    }
    Ok(())
}

fn dist(build_params: &BuildParams) -> Result<()> {
    build(build_params)?;

    let config = build_params.configuration()?;
    let soc = match build_params.soc {
        Some(soc) => soc,
        None => match &config.config {
            Some(c) => c.soc.parse::<Soc>()?,
            None => Soc::Mt7621,
        },
    };
    let built = workspace()
        .join("target")
        .join(build_params.target(&config))
        .join(build_params.profile.dir())
        .join("libramips.a");
    let outdir = workspace().join("target").join("dist").join(soc.to_string());
    fs::create_dir_all(&outdir)?;
    let out = outdir.join("libboard.a");
    if !built.exists() {
        return Err(format!("{} not found", built.display()).into());
    }
    let mut cmd = strip_command(&built, &out);
    cmd.current_dir(workspace());
    if build_params.verbose {
        println!("Executing {cmd:?}");
    }
    let status = cmd.status()?;
    if !status.success() {
        return Err("objcopy failed".into());
    }
    Ok(())
}

fn test(build_params: &BuildParams) -> Result<()> {
    let config = build_params.configuration()?;
    let mut cmd = build_params.command("test", &config)?;
    cmd.arg("--workspace");
    let status = cmd.status()?;
    if !status.success() {
        return Err("test failed".into());
    }
    Ok(())
}

fn clippy(build_params: &BuildParams) -> Result<()> {
    let config = build_params.configuration()?;
    let status = build_params.command("clippy", &config)?.status()?;
    if !status.success() {
        return Err("clippy failed".into());
    }
    Ok(())
}

fn clean() -> Result<()> {
    let status = Command::new(cargo()).current_dir(workspace()).arg("clean").status()?;
    if !status.success() {
        return Err("clean failed".into());
    }
    Ok(())
}

fn workspace() -> PathBuf {
    Path::new(&env!("CARGO_MANIFEST_DIR")).ancestors().nth(1).unwrap().to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn soc_names_match_crate_features() {
        let names: Vec<String> =
            [Soc::Mt7620, Soc::Rt3883, Soc::Mt7621, Soc::Rt305x, Soc::Rt63365e]
                .iter()
                .map(|s| s.to_string())
                .collect();
        assert_eq!(names, ["mt7620", "rt3883", "mt7621", "rt305x", "rt63365e"]);
        assert_eq!("RT305X".parse::<Soc>(), Ok(Soc::Rt305x));
        assert!("mt7628".parse::<Soc>().is_err());
    }

    #[test]
    fn dist_strips_into_place() {
        let cmd = strip_command(
            Path::new("target/mipsel-unknown-none/release/libramips.a"),
            Path::new("target/dist/mt7621/libboard.a"),
        );
        let args: Vec<String> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(
            args,
            [
                "--strip-debug",
                "target/mipsel-unknown-none/release/libramips.a",
                "target/dist/mt7621/libboard.a",
            ]
        );
        let program = cmd.get_program().to_string_lossy().into_owned();
        match env::var("OBJCOPY") {
            Ok(objcopy) => assert_eq!(program, objcopy),
            Err(_) => assert_eq!(program, "llvm-objcopy"),
        }
    }

    #[test]
    fn every_soc_has_a_config() {
        for soc in [Soc::Mt7620, Soc::Rt3883, Soc::Mt7621, Soc::Rt305x, Soc::Rt63365e] {
            let params = BuildParams {
                profile: Profile::Debug,
                verbose: false,
                soc: Some(soc),
                config: None,
            };
            let config = params.configuration().unwrap();
            assert_eq!(config.config.unwrap().soc, soc.to_string());
        }
    }

    #[test]
    fn target_dir_from_json_target() {
        let params = BuildParams { profile: Profile::Debug, verbose: false, soc: None, config: None };
        let config =
            config::parse_config("[build]\ntarget = \"lib/mips-unknown-none.json\"\n").unwrap();
        if env::var("TARGET").is_err() {
            assert_eq!(params.target(&config), "mips-unknown-none");
        }
    }
}
