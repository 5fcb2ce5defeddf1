#![doc = include_str!("../README.md")]

mod cmd;

use {
    crate::cmd::MainCmd,
    anyhow::{Context, Result},
    argh::FromArgs,
    std::{env, process},
};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let cmd = parse_args();
    cmd.run().context("failed to link entry script")
}

/// Parse command line arguments.
///
/// Argument errors print the diagnostic and usage line to stdout and exit
/// with status 1, `--help` exits with status 0.
fn parse_args() -> MainCmd {
    let args = env::args().collect::<Vec<_>>();
    let args = args.iter().map(String::as_str).collect::<Vec<_>>();
    let (cmd_name, rest) = args
        .split_first()
        .map_or(("lualink", &[][..]), |(name, rest)| (*name, rest));

    MainCmd::from_args(&[cmd_name], rest).unwrap_or_else(|early_exit| {
        println!("{}", early_exit.output);
        match early_exit.status {
            Ok(()) => process::exit(0),
            Err(()) => {
                println!("Usage: {cmd_name} <entry-file> <output-file>");
                process::exit(1)
            }
        }
    })
}
