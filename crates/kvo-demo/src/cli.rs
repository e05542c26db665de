#![forbid(unsafe_code)]

//! Command-line argument parsing for the birthday demo.
//!
//! Parses args manually to keep the binary lean. Supports environment
//! variable overrides via the `KVO_DEMO_*` prefix.

use std::env;
use std::process;

use kvo_runtime::NotifyPolicy;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
kvo-demo: one subject, two observers, one birthday

USAGE:
    kvo-demo [OPTIONS]

OPTIONS:
    --name=NAME          Subject name (default: Brucey)
    --age=N              Initial age (default: 17)
    --birthdays=N        Number of mutations to perform (default: 1)
    --set=N              Set the age to N on each mutation instead of adding one
    --cancel=WHO         Cancel an observer before mutating: 'walker', 'groomer', or 'none' (default: none)
    --notify=POLICY      'always' or 'on-change' (default: always)
    --strict             Reject a blank name or negative age
    --help, -h           Show this help message
    --version, -V        Show version

ENVIRONMENT VARIABLES:
    KVO_DEMO_NAME        Override --name
    KVO_DEMO_AGE         Override --age
    KVO_DEMO_BIRTHDAYS   Override --birthdays
    KVO_DEMO_SET         Override --set
    KVO_DEMO_CANCEL      Override --cancel
    KVO_DEMO_NOTIFY      Override --notify
    KVO_DEMO_STRICT      Override --strict (1/true to enable)
    KVO_LOG              Log filter for stderr diagnostics (default: warn)";

/// Which stock observer, if any, to cancel before mutating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Cancel {
    #[default]
    None,
    Walker,
    Groomer,
}

impl Cancel {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => Some(Self::None),
            "walker" => Some(Self::Walker),
            "groomer" => Some(Self::Groomer),
            _ => None,
        }
    }
}

fn parse_policy(value: &str) -> Option<NotifyPolicy> {
    match value.trim().to_ascii_lowercase().as_str() {
        "always" => Some(NotifyPolicy::Always),
        "on-change" | "onchange" => Some(NotifyPolicy::OnChange),
        _ => None,
    }
}

fn parse_flag(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    /// Subject name.
    pub name: String,
    /// Initial value of the observed attribute.
    pub age: i64,
    /// How many mutations to perform.
    pub birthdays: u32,
    /// Fixed value to assign on each mutation (None = increment).
    pub set: Option<i64>,
    /// Observer to cancel before the first mutation.
    pub cancel: Cancel,
    pub notify: NotifyPolicy,
    /// Validate the subject on construction.
    pub strict: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ParseError {
    Help,
    Version,
    InvalidValue { flag: &'static str, value: String },
    UnknownArg(String),
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            name: "Brucey".into(),
            age: 17,
            birthdays: 1,
            set: None,
            cancel: Cancel::None,
            notify: NotifyPolicy::Always,
            strict: false,
        }
    }
}

impl Opts {
    /// Parse command-line arguments and environment variables.
    ///
    /// Environment variables take precedence over defaults but are overridden
    /// by explicit command-line flags.
    pub fn parse() -> Self {
        match Self::parse_from_env_and_args(env::args().skip(1), |key| env::var(key).ok()) {
            Ok(opts) => opts,
            Err(ParseError::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Err(ParseError::Version) => {
                println!("kvo-demo {VERSION}");
                process::exit(0);
            }
            Err(ParseError::InvalidValue { flag, value }) => {
                eprintln!("Invalid {flag} value: {value}");
                process::exit(1);
            }
            Err(ParseError::UnknownArg(arg)) => {
                eprintln!("Unknown argument: {arg}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }

    fn parse_from_env_and_args<I, S, F>(args: I, get_env: F) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Fn(&str) -> Option<String>,
    {
        let mut opts = Self::default();

        // Apply environment variable defaults first
        if let Some(val) = get_env("KVO_DEMO_NAME") {
            opts.name = val;
        }
        if let Some(val) = get_env("KVO_DEMO_AGE")
            && let Ok(n) = val.trim().parse()
        {
            opts.age = n;
        }
        if let Some(val) = get_env("KVO_DEMO_BIRTHDAYS")
            && let Ok(n) = val.trim().parse()
        {
            opts.birthdays = n;
        }
        if let Some(val) = get_env("KVO_DEMO_SET")
            && let Ok(n) = val.trim().parse()
        {
            opts.set = Some(n);
        }
        if let Some(val) = get_env("KVO_DEMO_CANCEL")
            && let Some(cancel) = Cancel::parse(&val)
        {
            opts.cancel = cancel;
        }
        if let Some(val) = get_env("KVO_DEMO_NOTIFY")
            && let Some(policy) = parse_policy(&val)
        {
            opts.notify = policy;
        }
        if let Some(val) = get_env("KVO_DEMO_STRICT") {
            opts.strict = parse_flag(&val);
        }

        for arg in args {
            let arg = arg.as_ref();
            match arg {
                "--help" | "-h" => return Err(ParseError::Help),
                "--version" | "-V" => return Err(ParseError::Version),
                "--strict" => opts.strict = true,
                _ => {
                    let Some((flag, value)) = arg.split_once('=') else {
                        return Err(ParseError::UnknownArg(arg.to_string()));
                    };
                    match flag {
                        "--name" => opts.name = value.to_string(),
                        "--age" => opts.age = parse_number("--age", value)?,
                        "--birthdays" => opts.birthdays = parse_number("--birthdays", value)?,
                        "--set" => opts.set = Some(parse_number("--set", value)?),
                        "--cancel" => {
                            opts.cancel = Cancel::parse(value).ok_or_else(|| {
                                ParseError::InvalidValue {
                                    flag: "--cancel",
                                    value: value.to_string(),
                                }
                            })?;
                        }
                        "--notify" => {
                            opts.notify =
                                parse_policy(value).ok_or_else(|| ParseError::InvalidValue {
                                    flag: "--notify",
                                    value: value.to_string(),
                                })?;
                        }
                        _ => return Err(ParseError::UnknownArg(arg.to_string())),
                    }
                }
            }
        }

        Ok(opts)
    }
}

fn parse_number<N: std::str::FromStr>(flag: &'static str, value: &str) -> Result<N, ParseError> {
    value.trim().parse().map_err(|_| ParseError::InvalidValue {
        flag,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn parse_with(args: &[&str], env: &[(&str, &str)]) -> Result<Opts, ParseError> {
        let map: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Opts::parse_from_env_and_args(args.iter().copied(), |key| map.get(key).cloned())
    }

    #[test]
    fn defaults_reproduce_the_classic_scenario() {
        let opts = parse_with(&[], &[]).unwrap();
        assert_eq!(opts, Opts::default());
        assert_eq!(opts.name, "Brucey");
        assert_eq!(opts.age, 17);
        assert_eq!(opts.birthdays, 1);
        assert_eq!(opts.cancel, Cancel::None);
        assert_eq!(opts.notify, NotifyPolicy::Always);
    }

    #[test]
    fn flags_are_parsed() {
        let opts = parse_with(
            &[
                "--name=Rex",
                "--age=3",
                "--birthdays=2",
                "--set=9",
                "--cancel=walker",
                "--notify=on-change",
                "--strict",
            ],
            &[],
        )
        .unwrap();
        assert_eq!(opts.name, "Rex");
        assert_eq!(opts.age, 3);
        assert_eq!(opts.birthdays, 2);
        assert_eq!(opts.set, Some(9));
        assert_eq!(opts.cancel, Cancel::Walker);
        assert_eq!(opts.notify, NotifyPolicy::OnChange);
        assert!(opts.strict);
    }

    #[test]
    fn env_applies_and_flags_win() {
        let opts = parse_with(
            &["--age=5"],
            &[
                ("KVO_DEMO_NAME", "Fido"),
                ("KVO_DEMO_AGE", "40"),
                ("KVO_DEMO_CANCEL", "Groomer"),
                ("KVO_DEMO_STRICT", "true"),
            ],
        )
        .unwrap();
        assert_eq!(opts.name, "Fido");
        assert_eq!(opts.age, 5);
        assert_eq!(opts.cancel, Cancel::Groomer);
        assert!(opts.strict);
    }

    #[test]
    fn unparsable_env_is_ignored() {
        let opts = parse_with(&[], &[("KVO_DEMO_AGE", "old"), ("KVO_DEMO_NOTIFY", "never")]).unwrap();
        assert_eq!(opts.age, 17);
        assert_eq!(opts.notify, NotifyPolicy::Always);
    }

    #[test]
    fn invalid_flag_values_are_reported() {
        assert_eq!(
            parse_with(&["--age=old"], &[]),
            Err(ParseError::InvalidValue {
                flag: "--age",
                value: "old".into(),
            })
        );
        assert!(matches!(
            parse_with(&["--cancel=vet"], &[]),
            Err(ParseError::InvalidValue { flag: "--cancel", .. })
        ));
        assert!(matches!(
            parse_with(&["--birthdays=-1"], &[]),
            Err(ParseError::InvalidValue { flag: "--birthdays", .. })
        ));
    }

    #[test]
    fn negative_age_parses() {
        let opts = parse_with(&["--age=-2"], &[]).unwrap();
        assert_eq!(opts.age, -2);
    }

    #[test]
    fn unknown_and_meta_args() {
        assert_eq!(
            parse_with(&["--bogus"], &[]),
            Err(ParseError::UnknownArg("--bogus".into()))
        );
        assert_eq!(
            parse_with(&["--color=red"], &[]),
            Err(ParseError::UnknownArg("--color=red".into()))
        );
        assert_eq!(parse_with(&["-h"], &[]), Err(ParseError::Help));
        assert_eq!(parse_with(&["--version"], &[]), Err(ParseError::Version));
    }
}
