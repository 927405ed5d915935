//! Command dispatch logic for gh-harvest

use super::{HarvestArgs, InitArgs, init_config, process_harvest};
use crate::{Host, Result};
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use clap::{Parser, Subcommand};

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "gh-harvest", version, author, long_about = None)]
#[command(about = "Collect GitHub profiles, repositories, and latest commits into a CSV file")]
#[command(styles = CLAP_STYLES)]
struct Cli {
    #[command(subcommand)]
    command: HarvestSubcommand,
}

#[derive(Subcommand, Debug)]
enum HarvestSubcommand {
    /// Fetch every user listed in the input CSV and write the flattened results
    Harvest(Box<HarvestArgs>),
    /// Generate a default configuration file
    Init(InitArgs),
}

/// Dispatch command-line arguments to the appropriate handler
///
/// # Arguments
///
/// * `args` - An iterator of command-line arguments (typically from `std::env::args()`)
///
/// # Errors
///
/// Returns an error if the executed command fails. Invalid arguments make clap print
/// usage and exit the process.
pub async fn run<I, T, H>(host: &mut H, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
    H: Host,
{
    match &Cli::parse_from(args).command {
        HarvestSubcommand::Harvest(harvest_args) => process_harvest(host, harvest_args).await,
        HarvestSubcommand::Init(init_args) => init_config(host, init_args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_harvest_subcommand_parses() {
        let cli = Cli::try_parse_from(["gh-harvest", "harvest", "users.csv", "out.csv", "--max-workers", "4"]).unwrap();
        let HarvestSubcommand::Harvest(args) = cli.command else {
            panic!("expected harvest subcommand");
        };
        assert_eq!(args.input, "users.csv");
        assert_eq!(args.output, "out.csv");
        assert_eq!(args.max_workers, Some(4));
    }

    #[test]
    fn test_missing_input_is_rejected() {
        assert!(Cli::try_parse_from(["gh-harvest", "harvest"]).is_err());
    }
}
