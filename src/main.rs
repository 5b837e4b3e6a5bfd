#![doc = include_str!("../README.md")]

mod api;
mod cli;
mod core;
mod error;
mod prelude;
mod tables;

use clap::{Parser, crate_version};

use crate::{
    cli::{Args, Command},
    prelude::*,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().without_time().compact().init();
    info!(version = crate_version!(), "starting…");

    match Args::parse().command {
        Command::Poll(args) => args.run().await?,
        Command::Burrow(args) => args.run().await?,
    }

    info!("done!");
    Ok(())
}
