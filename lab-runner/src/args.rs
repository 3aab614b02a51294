use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "lab-runner")]
#[command(author, version, about = "Generates Vagrant labs of servers and virtual switches", long_about = None)]
pub struct Cli {
    /// Verbose logging
    #[arg(long, short, action = ArgAction::SetTrue)]
    pub verbose: bool,

    /// Lab description file (TOML, or YAML with a .yaml/.yml extension)
    #[arg(long, short, default_value = common::config::DEFAULT_LAB_FILE)]
    pub file: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Write the lab's Vagrantfile
    Generate(GenerateArgs),
    /// List the flavours hosts can use
    Flavours,
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Output file, overrides `output` from the lab file
    #[arg(long, short)]
    pub output: Option<String>,

    /// Print the Vagrantfile instead of writing it
    #[arg(long, action = ArgAction::SetTrue)]
    pub stdout: bool,
}
