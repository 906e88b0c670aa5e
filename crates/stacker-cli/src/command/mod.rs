use clap::{Parser, Subcommand};

use self::{check_config::CheckConfigArg, shapes::ShapesArg, simulate::SimulateArg};

mod check_config;
mod shapes;
mod simulate;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Load and validate a configuration file
    CheckConfig(#[clap(flatten)] CheckConfigArg),
    /// Run a scripted game headlessly and print the result
    Simulate(#[clap(flatten)] SimulateArg),
    /// Print the standard shape table
    Shapes(#[clap(flatten)] ShapesArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode.unwrap_or(Mode::Simulate(SimulateArg::default())) {
        Mode::CheckConfig(arg) => check_config::run(&arg)?,
        Mode::Simulate(arg) => simulate::run(&arg)?,
        Mode::Shapes(arg) => shapes::run(&arg)?,
    }
    Ok(())
}
