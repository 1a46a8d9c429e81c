// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! LATCH - task tracking with a hardened auth core
//!
//! Main binary entry point for the LATCH API server.

use anyhow::Result;
use clap::Parser;

use latch_bin::cli::{Cli, Commands, RunArgs};
use latch_bin::logging::init_logging;
use latch_bin::runtime::ServerRuntime;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level, cli.log_format);

    match cli.command.unwrap_or(Commands::Run(RunArgs::default())) {
        Commands::Run(args) => {
            let runtime = ServerRuntime::from_args(&args)?;
            runtime.run().await?;
        }
        Commands::Version => {
            println!("latch v{}", latch_core::VERSION);
            println!("LATCH task-tracking API server");
        }
    }

    Ok(())
}
