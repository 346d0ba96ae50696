// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::telemetry::setup_tracing;
use crate::{context, list, ping, show, stats, submit, verify};
use anyhow::{Context, Result};
use clap::{command, ArgAction, Parser, Subcommand};
use dfb_config::validation::{Score, ValidUrl};
use dfb_config::{load_config, AppConfig};
use dfb_workflow::StatusFilter;
use tracing::{info, instrument, Level};

#[derive(Parser, Debug)]
#[command(name = "datefeedback")]
#[command(about = "Submit encrypted date feedback and reveal ratings on-chain", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,

    /// Indicate error levels by adding additional `-v` arguments. Eg. `datefeedback -vvv` will
    /// give you trace level output
    #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true
    )]
    pub verbose: u8,

    /// Silence all output. This argument cannot be used alongside `-v`
    #[arg(
        short,
        long,
        action = ArgAction::SetTrue,
        conflicts_with = "verbose",
        global = true
    )]
    quiet: bool,

    /// Name of the configured chain to use. Defaults to the `chain` entry or the first chain.
    #[arg(long, global = true)]
    pub chain: Option<String>,

    /// Set the Open Telemetry collector grpc endpoint. Eg. http://localhost:4317
    #[arg(long = "otel", global = true)]
    pub otel: Option<ValidUrl>,
}

impl Cli {
    pub fn log_level(&self) -> Level {
        if self.quiet {
            Level::ERROR
        } else {
            match self.verbose {
                0 => Level::WARN,  //
                1 => Level::INFO,  // -v
                2 => Level::DEBUG, // -vv
                _ => Level::TRACE, // -vvv
            }
        }
    }

    #[instrument(skip_all)]
    pub async fn execute(self) -> Result<()> {
        let config = self.load_config().context(
            "Could not load configuration. Create datefeedback.config.yaml or pass --config",
        )?;

        setup_tracing(&config, self.log_level())?;
        info!("Config loaded from: {:?}", config.config_file());

        let workflow = context::connect(&config).await?;
        let mut state = context::new_state(&config);

        match self.command {
            Commands::List {
                filter,
                search,
                mine,
                json,
            } => {
                list::execute(
                    &workflow,
                    &mut state,
                    list::ListOptions {
                        filter,
                        search,
                        mine,
                        json,
                    },
                )
                .await?
            }
            Commands::Show { id, json } => show::execute(&workflow, &mut state, id, json).await?,
            Commands::Stats => stats::execute(&workflow, &mut state).await?,
            Commands::Submit {
                partner,
                score,
                tags,
                public_value1,
                public_value2,
            } => {
                submit::execute(
                    &workflow,
                    &mut state,
                    submit::SubmitArgs {
                        partner,
                        score,
                        tags,
                        public_value1,
                        public_value2,
                    },
                )
                .await?
            }
            Commands::Verify { id } => verify::execute(&workflow, &mut state, id).await?,
            Commands::Ping => ping::execute(&workflow, &mut state).await?,
        }

        Ok(())
    }

    pub fn load_config(&self) -> Result<AppConfig> {
        let config = load_config(
            self.config.clone(),
            self.chain.clone(),
            self.otel.clone().map(Into::into),
        )?;
        Ok(config)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List feedback records
    List {
        /// Only show records with this status: all, verified or pending
        #[arg(long, default_value_t = StatusFilter::All)]
        filter: StatusFilter,

        /// Case-insensitive match on partner name or tags
        #[arg(long, short)]
        search: Option<String>,

        /// Only show records created by the configured wallet
        #[arg(long)]
        mine: bool,

        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a single record
    Show {
        /// Record identifier, eg. feedback-3f2a...
        id: String,

        /// Print the record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print totals and the average public score
    Stats,

    /// Encrypt a rating and submit it as new feedback
    Submit {
        /// Name of the date partner
        #[arg(long, short)]
        partner: String,

        /// Rating between 1 and 10. Encrypted before it leaves this machine.
        #[arg(long)]
        score: Score,

        /// Comma separated tags, eg. "Coffee, Museum"
        #[arg(long, short, default_value = "")]
        tags: String,

        /// Public value stored in clear next to the ciphertext
        #[arg(long = "public-value1", default_value_t = 0)]
        public_value1: u64,

        /// Second public value stored in clear next to the ciphertext
        #[arg(long = "public-value2", default_value_t = 0)]
        public_value2: u64,
    },

    /// Decrypt a record's rating and verify it on-chain
    Verify {
        /// Record identifier
        id: String,
    },

    /// Check that the contract is reachable and available
    Ping,
}
