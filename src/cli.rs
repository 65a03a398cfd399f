use std::env;
use std::process;

use crate::config::StartOrder;

/// Prints usage instructions for the program.
pub fn print_usage() {
    println!(
        "Usage: {} [-h] [-v] [-l logfile] [-c config_file] [-d delay_ms] [-o consumer-first|producer-first|random] [-r]",
        crate::PROGRAM_NAME
    );
}

/// Options given on the command line
///
/// Fields left as `None` fall back to the config file, then to defaults.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Args {
    /// Path to log file (None for stderr)
    pub log_file: Option<String>,
    /// Path to JSON config file
    pub config_file: Option<String>,
    /// Producer delay override in milliseconds
    pub producer_delay_ms: Option<u64>,
    /// Start order override
    pub start_order: Option<StartOrder>,
}

/// What the command line asks for
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Run(Args),
    Help,
    Version,
}

/// Parses an argument list (without the program name)
///
/// # Errors
/// A message describing the first bad argument
pub fn parse_from<I>(args: I) -> Result<Command, String>
where
    I: IntoIterator<Item = String>,
{
    let mut parsed = Args::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" => return Ok(Command::Help),
            "-v" => return Ok(Command::Version),
            "-l" => {
                parsed.log_file = Some(
                    args.next()
                        .ok_or_else(|| "Missing log file argument".to_string())?,
                )
            }
            "-c" => {
                parsed.config_file = Some(
                    args.next()
                        .ok_or_else(|| "Missing config file argument".to_string())?,
                )
            }
            "-d" => {
                let value = args
                    .next()
                    .ok_or_else(|| "Missing delay argument".to_string())?;
                parsed.producer_delay_ms = Some(value.parse::<u64>().map_err(|_| {
                    "Delay must be a non-negative number of milliseconds".to_string()
                })?);
            }
            "-o" => {
                let value = args
                    .next()
                    .ok_or_else(|| "Missing start order argument".to_string())?;
                parsed.start_order = Some(value.parse::<StartOrder>().map_err(|e| e.to_string())?);
            }
            "-r" => parsed.start_order = Some(StartOrder::Random),
            _ => return Err(format!("Unexpected argument: {}", arg)),
        }
    }

    Ok(Command::Run(parsed))
}

/// Parses the process command line
///
/// Prints usage and exits for `-h`, prints the version and exits for `-v`,
/// and exits with status 1 after printing usage on any bad argument.
pub fn parse_args() -> Args {
    match parse_from(env::args().skip(1)) {
        Ok(Command::Run(args)) => args,
        Ok(Command::Help) => {
            print_usage();
            process::exit(0);
        }
        Ok(Command::Version) => {
            println!("{} version {}", crate::PROGRAM_NAME, crate::PROGRAM_VERSION);
            process::exit(0);
        }
        Err(message) => {
            eprintln!("Error: {}", message);
            print_usage();
            process::exit(1);
        }
    }
}
