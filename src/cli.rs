mod burrow;
mod home_assistant;
mod poll;
mod sunpower;

use clap::{Parser, Subcommand};

pub use self::{burrow::BurrowArgs, poll::PollArgs};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Main command: poll the cloud and publish the sensor states.
    #[clap(name = "poll")]
    Poll(Box<PollArgs>),

    /// Development tools.
    #[clap(name = "burrow")]
    Burrow(Box<BurrowArgs>),
}
