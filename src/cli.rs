use clap::{ArgAction, Parser};

pub const URLS_ARG: &str = "--urls";
pub const URLS_FILE_ARG: &str = "--urls-file";
pub const DELAY_ARG: &str = "--delay-ms";
pub const TIMEOUT_ARG: &str = "--timeout-ms";
pub const ATTEMPTS_ARG: &str = "--attempts";
pub const FORMAT_ARG: &str = "--format";
pub const OUTPUT_ARG: &str = "-o";
pub const PARALLEL_ARG: &str = "--parallel";

/// Every flag the probe arguments understand. Multi-value reads stop at any of these.
pub const KNOWN_FLAGS: &[&str] = &[
    URLS_ARG,
    URLS_FILE_ARG,
    DELAY_ARG,
    TIMEOUT_ARG,
    ATTEMPTS_ARG,
    FORMAT_ARG,
    OUTPUT_ARG,
    PARALLEL_ARG,
];

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Probe endpoints with ICMP echo and report reachability and round-trip times",
    after_help = "PROBE ARGUMENTS:
    --urls <ENDPOINT>...     Endpoints to probe
    --urls-file <PATH>       .txt file with one endpoint per line
    --delay-ms <MS>          Delay before the first probe [default: 0]
    --timeout-ms <MS>        Timeout of a single attempt [default: 200]
    --attempts <N>           Attempts per endpoint [default: 1]
    --format [FMT]...        console, txt, xml, html [default: console]
    -o <NAME>                Report file base name [default: output]
    --parallel <N>           Endpoints probed concurrently [default: 1]

-v/--verbose must come before the probe arguments; anything after the first
probe argument is read as probe input."
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Probe arguments, see below
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, num_args = 0..)]
    pub args: Vec<String>,
}

impl Cli {
    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

/// Position of `flag` in `args`, if present.
pub fn find_flag(args: &[String], flag: &str) -> Option<usize> {
    args.iter().position(|a| a == flag)
}

/// Collects tokens from `start` until the first token that exactly equals a
/// member of `stop` or the end of input. Returns the values and the index of
/// the first token not consumed.
pub fn scan<'a>(args: &'a [String], start: usize, stop: &[&str]) -> (Vec<&'a str>, usize) {
    let mut values = Vec::new();
    let mut i = start;
    while i < args.len() && !stop.contains(&args[i].as_str()) {
        values.push(args[i].as_str());
        i += 1;
    }
    (values, i)
}

/// Values following `flag`, or `None` if the flag is absent.
pub fn multi_value<'a>(args: &'a [String], flag: &str) -> Option<Vec<&'a str>> {
    find_flag(args, flag).map(|i| scan(args, i + 1, KNOWN_FLAGS).0)
}

/// The token right after `flag`. `Ok(None)` if the flag is absent.
pub fn single_value<'a>(
    args: &'a [String],
    flag: &'static str,
) -> Result<Option<&'a str>, crate::error::ConfigError> {
    match find_flag(args, flag) {
        None => Ok(None),
        Some(i) => args
            .get(i + 1)
            .map(|v| Some(v.as_str()))
            .ok_or(crate::error::ConfigError::MissingValue(flag)),
    }
}
