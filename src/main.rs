//! Main application entry point.
//!
//! Parses the command line, applies process-wide settings (debug output,
//! config directory, file logging) and dispatches to the live screen or a
//! one-shot command. Engine failures are shown where they happen; anything
//! else is reported here with its cause chain.

use anyhow::Result;

use miqat::args::{self, CliAction, ParsedArgs, SessionOptions};
use miqat::common::constants::{EXIT_FAILURE, EXIT_SUCCESS};
use miqat::logger::{Log, LoggerGuard};
use miqat::{EngineError, Miqat, commands, config};
use miqat::{log_end, log_error, log_indented, log_pipe};

fn main() {
    let code = run(ParsedArgs::from_env().action);
    std::process::exit(code);
}

fn run(action: CliAction) -> i32 {
    match action {
        CliAction::ShowVersion => {
            args::display_version_info();
            EXIT_SUCCESS
        }
        CliAction::ShowHelp => {
            args::display_help();
            EXIT_SUCCESS
        }
        CliAction::ShowHelpDueToError => {
            args::display_help();
            EXIT_FAILURE
        }
        CliAction::Run(options) => {
            with_options(&options, || Miqat::new(options.clone()).run())
        }
        CliAction::Next(options) => {
            with_options(&options, || commands::next::handle_next_command(&options))
        }
        CliAction::Qibla(options) => {
            with_options(&options, || commands::qibla::handle_qibla_command(&options))
        }
        CliAction::Simulate {
            options,
            start_time,
            end_time,
            multiplier,
        } => with_options(&options, || {
            commands::simulate::handle_simulate_command(
                &options,
                &start_time,
                &end_time,
                multiplier,
            )?;
            Miqat::new(options.clone()).without_headers().run()
        }),
    }
}

/// Apply the session flags, run `f`, and turn its outcome into an exit code.
///
/// The file logger (if any) is flushed before returning.
fn with_options(options: &SessionOptions, f: impl FnOnce() -> Result<()>) -> i32 {
    Log::set_debug_enabled(options.debug_enabled);

    let _logger_guard: Option<LoggerGuard> = match prepare(options) {
        Ok(guard) => guard,
        Err(e) => {
            report_failure(&e);
            return EXIT_FAILURE;
        }
    };

    match f() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            report_failure(&e);
            EXIT_FAILURE
        }
    }
}

fn prepare(options: &SessionOptions) -> Result<Option<LoggerGuard>> {
    config::set_config_dir(options.config_dir.clone())?;

    options
        .log_file
        .as_ref()
        .map(|path| {
            println!("Writing output to {path}");
            Log::start_file_logging(path.clone())
        })
        .transpose()
}

fn report_failure(error: &anyhow::Error) {
    // Engine failures were already shown in place of the schedule
    if error.downcast_ref::<EngineError>().is_some() {
        return;
    }

    log_pipe!();
    log_error!("{error}");
    for cause in error.chain().skip(1) {
        log_indented!("{cause}");
    }
    log_end!();
}
