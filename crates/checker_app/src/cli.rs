use std::path::PathBuf;

use crate::logging::LogDestination;

pub const USAGE: &str = "\
portalchecker - check the MyUCSC portal for new messages and charges

USAGE:
    portalchecker [OPTIONS]

OPTIONS:
    --print-only         Print notifications to stdout instead of mailing them
    --config <PATH>      Config file (default: ./portalchecker.config)
    --data-dir <PATH>    Directory for history files and the run log (default: .)
    --log <DEST>         Diagnostic log destination: term, file or both (default: term)
    -h, --help           Show this help
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub print_only: bool,
    pub config_path: PathBuf,
    pub data_dir: PathBuf,
    pub log_destination: LogDestination,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            print_only: false,
            config_path: PathBuf::from("portalchecker.config"),
            data_dir: PathBuf::from("."),
            log_destination: LogDestination::Terminal,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Invocation {
    Run(Options),
    Help,
}

pub fn parse(mut args: impl Iterator<Item = String>) -> Result<Invocation, String> {
    let mut options = Options::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Invocation::Help),
            "--print-only" => options.print_only = true,
            "--config" => {
                options.config_path = PathBuf::from(expect_value(&mut args, "--config")?);
            }
            "--data-dir" => {
                options.data_dir = PathBuf::from(expect_value(&mut args, "--data-dir")?);
            }
            "--log" => {
                options.log_destination = match expect_value(&mut args, "--log")?.as_str() {
                    "term" => LogDestination::Terminal,
                    "file" => LogDestination::File,
                    "both" => LogDestination::Both,
                    other => return Err(format!("unknown --log destination `{other}`")),
                };
            }
            other => return Err(format!("unknown argument `{other}`")),
        }
    }
    Ok(Invocation::Run(options))
}

fn expect_value(
    args: &mut impl Iterator<Item = String>,
    flag: &str,
) -> Result<String, String> {
    args.next().ok_or_else(|| format!("{flag} needs a value"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(args: &[&str]) -> Options {
        match parse(args.iter().map(|a| a.to_string())).unwrap() {
            Invocation::Run(options) => options,
            Invocation::Help => panic!("expected run options"),
        }
    }

    #[test]
    fn defaults_when_no_arguments() {
        let options = parse_ok(&[]);
        assert_eq!(options, Options::default());
    }

    #[test]
    fn print_only_and_paths() {
        let options = parse_ok(&["--print-only", "--config", "/tmp/c", "--data-dir", "/tmp/d"]);
        assert!(options.print_only);
        assert_eq!(options.config_path, PathBuf::from("/tmp/c"));
        assert_eq!(options.data_dir, PathBuf::from("/tmp/d"));
    }

    #[test]
    fn log_destination_values() {
        assert_eq!(
            parse_ok(&["--log", "both"]).log_destination,
            LogDestination::Both
        );
        assert!(parse(["--log", "syslog"].iter().map(|a| a.to_string())).is_err());
    }

    #[test]
    fn help_short_circuits() {
        let parsed = parse(["--help"].iter().map(|a| a.to_string())).unwrap();
        assert_eq!(parsed, Invocation::Help);
    }

    #[test]
    fn missing_flag_value_is_an_error() {
        assert!(parse(["--config"].iter().map(|a| a.to_string())).is_err());
    }
}
