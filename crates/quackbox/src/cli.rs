//! Command line parsing

use anyhow::{Result, anyhow, bail};
use std::path::PathBuf;

pub const USAGE: &str = "\
Usage: quackbox [--config PATH] <COMMAND>

Commands:
  refresh       Scan the games directory and update the catalog
  list          Print the catalog without scanning
  show ID       Print one entry without scanning
  launch ID     Start a game and count the play
  watch         Refresh whenever the games directory changes
  config        Print the effective configuration
  config --write PATH
                Save the effective configuration as TOML to PATH

Options:
  --config PATH  Configuration file (default: ~/.config/quackbox/config.toml,
                 then /etc/quackbox/config.toml)
  --help, -h     Show this help message

Environment variables:
  QUACKBOX_PATHS__GAMES_DIR     Games directory
  QUACKBOX_PATHS__COVER_DIR     Cover image directory
  QUACKBOX_PATHS__CATALOG_FILE  Catalog file
  RUST_LOG                      Log filter (overrides log_level)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Refresh,
    List,
    Show(String),
    Launch(String),
    Watch,
    /// Print, or save to the given path
    Config(Option<PathBuf>),
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub config_path: Option<PathBuf>,
    pub command: Command,
}

pub fn parse_args<I>(args: I) -> Result<CliArgs>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut config_path = None;
    let mut command = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = args
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a path argument"))?;
                config_path = Some(PathBuf::from(path));
            }
            "--help" | "-h" => {
                command = Some(Command::Help);
            }
            "--write" | "-w" => {
                let path = args
                    .next()
                    .ok_or_else(|| anyhow!("--write requires a path argument"))?;
                match command {
                    Some(Command::Config(None)) => {
                        command = Some(Command::Config(Some(PathBuf::from(path))));
                    }
                    _ => bail!("--write only applies to the config command"),
                }
            }
            _ if command.is_some() => bail!("unexpected argument: {}", arg),
            "refresh" => command = Some(Command::Refresh),
            "list" => command = Some(Command::List),
            "watch" => command = Some(Command::Watch),
            "config" => command = Some(Command::Config(None)),
            "show" | "launch" => {
                let id = args
                    .next()
                    .ok_or_else(|| anyhow!("{} requires a game id", arg))?;
                command = Some(if arg == "show" {
                    Command::Show(id)
                } else {
                    Command::Launch(id)
                });
            }
            other => bail!("unknown command: {}", other),
        }
    }

    Ok(CliArgs {
        config_path,
        command: command.unwrap_or(Command::Help),
    })
}
