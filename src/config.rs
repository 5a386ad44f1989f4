use std::fmt;
use std::ops::BitOr;
use std::path::Path;

use crate::cli::{
    multi_value, single_value, ATTEMPTS_ARG, DELAY_ARG, FORMAT_ARG, OUTPUT_ARG, PARALLEL_ARG,
    TIMEOUT_ARG, URLS_ARG, URLS_FILE_ARG,
};
use crate::error::ConfigError;
use crate::host::load_hosts_from_file;

pub const DEFAULT_DELAY_MS: u64 = 0;
pub const DEFAULT_TIMEOUT_MS: u64 = 200;
pub const DEFAULT_ATTEMPTS: i64 = 1;
pub const DEFAULT_OUTPUT_NAME: &str = "output";
pub const DEFAULT_PARALLEL: usize = 1;

/// Set of enabled report formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputFormats(u8);

impl OutputFormats {
    pub const NONE: OutputFormats = OutputFormats(0);
    pub const TXT: OutputFormats = OutputFormats(1);
    pub const XML: OutputFormats = OutputFormats(2);
    pub const HTML: OutputFormats = OutputFormats(4);
    pub const CONSOLE: OutputFormats = OutputFormats(8);

    pub fn contains(self, other: OutputFormats) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Case-insensitive lookup of a single format name. `none` is a valid
    /// name that selects nothing.
    pub fn from_name(name: &str) -> Option<OutputFormats> {
        match name.to_ascii_lowercase().as_str() {
            "none" => Some(Self::NONE),
            "txt" => Some(Self::TXT),
            "xml" => Some(Self::XML),
            "html" => Some(Self::HTML),
            "console" => Some(Self::CONSOLE),
            _ => None,
        }
    }

    /// Unrecognized names are dropped.
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> OutputFormats {
        names
            .into_iter()
            .filter_map(|name| {
                let format = Self::from_name(name);
                if format.is_none() {
                    log::debug!("ignoring unknown format '{}'", name);
                }
                format
            })
            .fold(Self::NONE, |acc, f| acc | f)
    }
}

impl BitOr for OutputFormats {
    type Output = OutputFormats;

    fn bitor(self, rhs: OutputFormats) -> OutputFormats {
        OutputFormats(self.0 | rhs.0)
    }
}

impl fmt::Display for OutputFormats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = [
            (Self::CONSOLE, "console"),
            (Self::TXT, "txt"),
            (Self::XML, "xml"),
            (Self::HTML, "html"),
        ]
        .into_iter()
        .filter(|(flag, _)| self.contains(*flag))
        .map(|(_, name)| name)
        .collect();
        if names.is_empty() {
            write!(f, "none")
        } else {
            write!(f, "{}", names.join(","))
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub endpoints: Vec<String>,
    pub delay_ms: u64,
    pub timeout_ms: u64,
    /// Range-checked by the probe runner, not here.
    pub attempts: i64,
    pub formats: OutputFormats,
    pub output_name: String,
    pub parallel: usize,
}

impl Config {
    /// Builds a configuration from the raw probe arguments.
    pub fn from_args(args: &[String]) -> Result<Self, ConfigError> {
        let endpoints = parse_endpoints(args)?;

        let delay_ms = non_negative(DELAY_ARG, parse_int(args, DELAY_ARG)?)?.unwrap_or(DEFAULT_DELAY_MS);
        let timeout_ms =
            non_negative(TIMEOUT_ARG, parse_int(args, TIMEOUT_ARG)?)?.unwrap_or(DEFAULT_TIMEOUT_MS);
        let attempts = parse_int(args, ATTEMPTS_ARG)?.unwrap_or(DEFAULT_ATTEMPTS);

        let parallel = match parse_int(args, PARALLEL_ARG)? {
            None => DEFAULT_PARALLEL,
            Some(n) if n < 1 => return Err(ConfigError::NotPositive(PARALLEL_ARG, n)),
            Some(n) => usize::try_from(n).unwrap_or(usize::MAX),
        };

        let formats = match multi_value(args, FORMAT_ARG) {
            None => OutputFormats::CONSOLE,
            Some(names) => OutputFormats::from_names(names),
        };

        let output_name = single_value(args, OUTPUT_ARG)?
            .unwrap_or(DEFAULT_OUTPUT_NAME)
            .to_string();

        Ok(Config {
            endpoints,
            delay_ms,
            timeout_ms,
            attempts,
            formats,
            output_name,
            parallel,
        })
    }
}

fn parse_endpoints(args: &[String]) -> Result<Vec<String>, ConfigError> {
    let urls = multi_value(args, URLS_ARG);
    let file = single_value(args, URLS_FILE_ARG)?;

    match (urls, file) {
        (Some(_), Some(_)) => Err(ConfigError::ConflictingEndpointSources(URLS_ARG, URLS_FILE_ARG)),
        (None, None) => Err(ConfigError::MissingEndpointSource(URLS_ARG, URLS_FILE_ARG)),
        (Some(urls), None) => {
            if urls.is_empty() {
                return Err(ConfigError::NoEndpoints(URLS_ARG));
            }
            Ok(urls.into_iter().map(String::from).collect())
        }
        (None, Some(path)) => {
            if !path.ends_with(".txt") || !Path::new(path).is_file() {
                return Err(ConfigError::InvalidEndpointsFile(URLS_FILE_ARG, path.to_string()));
            }
            let hosts = load_hosts_from_file(path)
                .map_err(|e| ConfigError::Io(path.to_string(), e))?;
            if hosts.is_empty() {
                return Err(ConfigError::NoEndpoints(URLS_FILE_ARG));
            }
            Ok(hosts)
        }
    }
}

fn parse_int(args: &[String], flag: &'static str) -> Result<Option<i64>, ConfigError> {
    single_value(args, flag)?
        .map(|v| {
            v.parse::<i64>()
                .map_err(|_| ConfigError::InvalidInteger(flag, v.to_string()))
        })
        .transpose()
}

fn non_negative(flag: &'static str, value: Option<i64>) -> Result<Option<u64>, ConfigError> {
    match value {
        Some(v) if v < 0 => Err(ConfigError::Negative(flag, v)),
        Some(v) => Ok(Some(v as u64)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn argv(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn defaults_apply_when_only_urls_given() {
        let config = Config::from_args(&argv("--urls 10.0.0.1 example.com")).unwrap();
        assert_eq!(config.endpoints, vec!["10.0.0.1", "example.com"]);
        assert_eq!(config.delay_ms, 0);
        assert_eq!(config.timeout_ms, 200);
        assert_eq!(config.attempts, 1);
        assert_eq!(config.formats, OutputFormats::CONSOLE);
        assert_eq!(config.output_name, "output");
        assert_eq!(config.parallel, 1);
    }

    #[test]
    fn flags_are_order_insensitive() {
        let config = Config::from_args(&argv(
            "--attempts 3 --format TXT xml -o report --urls a b --timeout-ms 50 --delay-ms 10",
        ))
        .unwrap();
        assert_eq!(config.endpoints, vec!["a", "b"]);
        assert_eq!(config.attempts, 3);
        assert_eq!(config.timeout_ms, 50);
        assert_eq!(config.delay_ms, 10);
        assert_eq!(config.formats, OutputFormats::TXT | OutputFormats::XML);
        assert_eq!(config.output_name, "report");
    }

    #[test]
    fn unknown_formats_are_dropped() {
        let config = Config::from_args(&argv("--urls a --format bogus txt")).unwrap();
        assert_eq!(config.formats, OutputFormats::TXT);

        let config = Config::from_args(&argv("--urls a --format bogus")).unwrap();
        assert!(config.formats.is_empty());
    }

    #[test]
    fn attempts_below_one_pass_parsing() {
        let config = Config::from_args(&argv("--urls a --attempts 0")).unwrap();
        assert_eq!(config.attempts, 0);
    }

    #[test]
    fn non_integer_values_are_rejected() {
        let err = Config::from_args(&argv("--urls a --timeout-ms fast")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidInteger(TIMEOUT_ARG, _)));
        assert!(err.to_string().contains("--timeout-ms must be a valid integer"));
    }

    #[test]
    fn negative_delay_is_rejected() {
        let err = Config::from_args(&argv("--urls a --delay-ms -5")).unwrap_err();
        assert!(matches!(err, ConfigError::Negative(DELAY_ARG, -5)));
    }

    #[test]
    fn endpoint_source_is_required() {
        let err = Config::from_args(&argv("--attempts 2")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEndpointSource(..)));
    }

    #[test]
    fn both_endpoint_sources_conflict() {
        let err = Config::from_args(&argv("--urls a --urls-file hosts.txt")).unwrap_err();
        assert!(matches!(err, ConfigError::ConflictingEndpointSources(..)));
    }

    #[test]
    fn empty_urls_list_is_rejected() {
        let err = Config::from_args(&argv("--urls --attempts 2")).unwrap_err();
        assert!(matches!(err, ConfigError::NoEndpoints(URLS_ARG)));
    }

    #[test]
    fn urls_file_must_be_existing_txt() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.txt");
        let args = vec![URLS_FILE_ARG.to_string(), missing.display().to_string()];
        assert!(matches!(
            Config::from_args(&args).unwrap_err(),
            ConfigError::InvalidEndpointsFile(..)
        ));

        let csv = dir.path().join("hosts.csv");
        std::fs::write(&csv, "10.0.0.1\n").unwrap();
        let args = vec![URLS_FILE_ARG.to_string(), csv.display().to_string()];
        assert!(matches!(
            Config::from_args(&args).unwrap_err(),
            ConfigError::InvalidEndpointsFile(..)
        ));
    }

    #[test]
    fn urls_file_is_read_line_by_line() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        writeln!(file, "10.0.0.1").unwrap();
        writeln!(file, "# gateway").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "example.com").unwrap();

        let args = vec![
            URLS_FILE_ARG.to_string(),
            file.path().display().to_string(),
            FORMAT_ARG.to_string(),
            "html".to_string(),
        ];
        let config = Config::from_args(&args).unwrap();
        assert_eq!(config.endpoints, vec!["10.0.0.1", "example.com"]);
        assert_eq!(config.formats, OutputFormats::HTML);
    }

    #[test]
    fn parallel_must_be_positive() {
        let err = Config::from_args(&argv("--urls a --parallel 0")).unwrap_err();
        assert!(matches!(err, ConfigError::NotPositive(PARALLEL_ARG, 0)));
        let config = Config::from_args(&argv("--urls a b --parallel 4")).unwrap();
        assert_eq!(config.parallel, 4);
    }

    #[test]
    fn formats_display_lists_enabled_names() {
        assert_eq!((OutputFormats::XML | OutputFormats::CONSOLE).to_string(), "console,xml");
        assert_eq!(OutputFormats::NONE.to_string(), "none");
    }
}
