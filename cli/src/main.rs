mod commands;
mod terminal;

use std::io::{self, IsTerminal};

use clap::CommandFactory;
use commands::{CommandLine, scan};
use terminal::{print, progress};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    if commands.lacks_targets(io::stdin().is_terminal()) {
        CommandLine::command().print_help()?;
        return Ok(());
    }

    progress::init_logging();
    print::banner(commands.quiet);

    scan::scan(&commands).await
}
