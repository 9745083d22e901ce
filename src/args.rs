//! Command-line argument parsing and processing.
//!
//! Turns `std::env::args()` into a [`CliAction`]. Parsing never fails hard:
//! anything unrecognised is reported and mapped to
//! [`CliAction::ShowHelpDueToError`].

use crate::common::constants::DEFAULT_SIMULATION_MULTIPLIER;

/// Flags shared by every command that opens a session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionOptions {
    pub debug_enabled: bool,
    pub config_dir: Option<String>,
    /// `--lat`, overriding the configured latitude.
    pub latitude: Option<f64>,
    /// `--lon`, overriding the configured longitude.
    pub longitude: Option<f64>,
    /// `--log <path>`: write output to a file instead of the terminal.
    pub log_file: Option<String>,
}

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Live prayer-time screen: schedule, countdown and Qibla pointer
    Run(SessionOptions),
    /// Print the next prayer and time remaining once
    Next(SessionOptions),
    /// Print the Qibla bearing once
    Qibla(SessionOptions),
    /// Run the live screen against an accelerated clock
    Simulate {
        options: SessionOptions,
        start_time: String,
        end_time: String,
        multiplier: f64,
    },

    /// Display help information and exit
    ShowHelp,
    /// Display version information and exit
    ShowVersion,
    /// Show help due to unknown arguments and exit
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

enum Command {
    Run,
    Next,
    Qibla,
    Simulate,
}

impl ParsedArgs {
    /// Parse command-line arguments into a structured result.
    ///
    /// The first element is the program name and is skipped. Flags may appear
    /// before or after the command; `--help` and `--version` win over
    /// everything else.
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args_vec: Vec<String> = args
            .into_iter()
            .skip(1)
            .map(|s| s.as_ref().to_string())
            .collect();

        if args_vec
            .iter()
            .any(|arg| arg == "--version" || arg == "-V" || arg == "-v")
        {
            return ParsedArgs {
                action: CliAction::ShowVersion,
            };
        }
        if args_vec.iter().any(|arg| arg == "--help" || arg == "-h") {
            return ParsedArgs {
                action: CliAction::ShowHelp,
            };
        }

        let mut options = SessionOptions::default();
        let mut command: Option<Command> = None;
        let mut simulate_start: Option<String> = None;
        let mut simulate_end: Option<String> = None;
        let mut simulate_multiplier: Option<f64> = None;
        let mut unknown_arg_found = false;

        let mut i = 0;
        while i < args_vec.len() {
            let arg = args_vec[i].as_str();
            // Value of a flag that takes one argument
            let value = args_vec.get(i + 1).filter(|v| !v.starts_with("--"));

            match arg {
                "--debug" | "-d" => options.debug_enabled = true,
                "--config" | "-c" => match value {
                    Some(dir) => {
                        options.config_dir = Some(dir.clone());
                        i += 1;
                    }
                    None => {
                        log_warning!("Missing directory for --config. Usage: --config <directory>");
                        unknown_arg_found = true;
                    }
                },
                "--log" | "-l" => match value {
                    Some(path) => {
                        options.log_file = Some(path.clone());
                        i += 1;
                    }
                    None => {
                        log_warning!("Missing path for --log. Usage: --log <file>");
                        unknown_arg_found = true;
                    }
                },
                "--lat" | "--lon" => match value.map(|v| v.parse::<f64>()) {
                    Some(Ok(degrees)) => {
                        if arg == "--lat" {
                            options.latitude = Some(degrees);
                        } else {
                            options.longitude = Some(degrees);
                        }
                        i += 1;
                    }
                    _ => {
                        log_warning!("{arg} requires a number of degrees");
                        unknown_arg_found = true;
                    }
                },
                "--from" | "--to" => match value {
                    Some(time) => {
                        if arg == "--from" {
                            simulate_start = Some(time.clone());
                        } else {
                            simulate_end = Some(time.clone());
                        }
                        i += 1;
                    }
                    None => {
                        log_warning!("{arg} requires a time. Use \"YYYY-MM-DD HH:MM:SS\"");
                        unknown_arg_found = true;
                    }
                },
                "--multiplier" | "-m" => match value.map(|v| v.parse::<f64>()) {
                    Some(Ok(m)) if m.is_finite() && m > 0.0 => {
                        simulate_multiplier = Some(m);
                        i += 1;
                    }
                    _ => {
                        log_warning!("--multiplier requires a positive number");
                        unknown_arg_found = true;
                    }
                },
                _ if !arg.starts_with('-') && command.is_none() => {
                    command = match arg {
                        "run" => Some(Command::Run),
                        "next" | "n" => Some(Command::Next),
                        "qibla" | "q" => Some(Command::Qibla),
                        "simulate" | "sim" => Some(Command::Simulate),
                        _ => {
                            log_warning!("Unknown command: {arg}");
                            unknown_arg_found = true;
                            None
                        }
                    };
                }
                _ if !arg.starts_with('-') => {
                    log_error!("Cannot use multiple commands at once: '{arg}'");
                    unknown_arg_found = true;
                }
                _ => {
                    log_warning!("Unknown argument: {arg}");
                    unknown_arg_found = true;
                }
            }
            i += 1;
        }

        if unknown_arg_found {
            return ParsedArgs {
                action: CliAction::ShowHelpDueToError,
            };
        }

        let is_simulate = matches!(command, Some(Command::Simulate));
        if !is_simulate && (simulate_start.is_some() || simulate_end.is_some()) {
            log_warning!("--from and --to are only valid with 'miqat simulate'");
            return ParsedArgs {
                action: CliAction::ShowHelpDueToError,
            };
        }

        let action = match command.unwrap_or(Command::Run) {
            Command::Run => CliAction::Run(options),
            Command::Next => CliAction::Next(options),
            Command::Qibla => CliAction::Qibla(options),
            Command::Simulate => match (simulate_start, simulate_end) {
                (Some(start_time), Some(end_time)) => CliAction::Simulate {
                    options,
                    start_time,
                    end_time,
                    multiplier: simulate_multiplier.unwrap_or(DEFAULT_SIMULATION_MULTIPLIER),
                },
                _ => {
                    log_warning!(
                        "Usage: miqat simulate --from \"YYYY-MM-DD HH:MM:SS\" --to \"YYYY-MM-DD HH:MM:SS\" [--multiplier N]"
                    );
                    CliAction::ShowHelpDueToError
                }
            },
        };

        ParsedArgs { action }
    }

    /// Convenience method to parse from std::env::args()
    pub fn from_env() -> ParsedArgs {
        Self::parse(std::env::args())
    }
}

/// Displays version information using custom logging style.
pub fn display_version_info() {
    log_version!();
    log_pipe!();
    println!("┗ {}", env!("CARGO_PKG_DESCRIPTION"));
}

/// Displays custom help message using logger methods.
pub fn display_help() {
    log_version!();
    log_block_start!(env!("CARGO_PKG_DESCRIPTION"));
    log_block_start!("Usage:");
    log_indented!("miqat [OPTIONS] [COMMAND]");
    log_block_start!("Options:");
    log_indented!("    --lat <degrees>    Latitude of the prayer location");
    log_indented!("    --lon <degrees>    Longitude of the prayer location");
    log_indented!("-c, --config <dir>     Use custom configuration directory");
    log_indented!("-l, --log <file>       Write output to a file");
    log_indented!("-d, --debug            Enable detailed debug output");
    log_indented!("-h, --help             Print help information");
    log_indented!("-V, --version          Print version information");
    log_block_start!("Commands:");
    log_indented!("run                    Live schedule, countdown and Qibla (default)");
    log_indented!("next, n                Print the next prayer and time remaining");
    log_indented!("qibla, q               Print the Qibla bearing");
    log_indented!("simulate, sim          Run the live screen with simulated time");
    log_indented!("                       --from <time> --to <time> [--multiplier N]");
    log_end!();
}
