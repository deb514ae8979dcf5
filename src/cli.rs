use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;

use crate::analysis::MetricsEngine;
use crate::auth::Token;
use crate::config::{AppFilter, EngineConfig, StalenessThresholds};
use crate::providers::argocd::ArgoCdProvider;

#[derive(Parser)]
#[command(name = "argolens")]
#[command(author, version, about = "Argo CD Delivery Metrics Tool", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output file path (defaults to stdout)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Pretty print JSON output
    #[arg(short, long, global = true, default_value_t = false)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect DORA metrics and operational insights from an Argo CD
    /// instance
    Argocd {
        /// Argo CD API token
        #[arg(short, long, env = "ARGOCD_TOKEN")]
        token: Option<String>,

        /// Argo CD instance URL
        #[arg(short, long)]
        url: String,

        /// Cluster label used in the report
        #[arg(short, long, default_value = "default")]
        cluster: String,

        /// Analysis window in days
        #[arg(short, long, default_value_t = 30)]
        days: i64,

        /// Number of parallel detail fetches
        #[arg(short, long, default_value_t = 20)]
        workers: usize,

        /// Log a progress line every N processed applications
        #[arg(long, default_value_t = 50)]
        progress_interval: usize,

        /// Minutes after which a Running/Progressing sync counts as stuck
        #[arg(long, default_value_t = 30)]
        stuck_threshold: i64,

        /// Staleness thresholds in days: critical, warning, info
        #[arg(long, default_value_t = 180)]
        stale_critical_days: i64,

        #[arg(long, default_value_t = 90)]
        stale_warning_days: i64,

        #[arg(long, default_value_t = 30)]
        stale_info_days: i64,

        /// Only analyze applications whose namespace contains one of
        /// these values (repeatable)
        #[arg(short = 'n', long = "namespace")]
        namespaces: Vec<String>,

        /// Only analyze applications in these projects (repeatable)
        #[arg(short = 'P', long = "project")]
        projects: Vec<String>,

        /// Skip applications whose namespace contains one of these
        /// values (repeatable)
        #[arg(long = "exclude-namespace")]
        exclude_namespaces: Vec<String>,
    },
}

impl Cli {
    pub async fn execute(&self) -> Result<()> {
        match &self.command {
            Commands::Argocd {
                token,
                url,
                cluster,
                days,
                workers,
                progress_interval,
                stuck_threshold,
                stale_critical_days,
                stale_warning_days,
                stale_info_days,
                namespaces,
                projects,
                exclude_namespaces,
            } => {
                info!("Collecting delivery metrics for cluster: {cluster}");

                let config = EngineConfig {
                    days: *days,
                    workers: *workers,
                    progress_interval: *progress_interval,
                    stuck_sync_threshold_minutes: *stuck_threshold,
                    staleness: StalenessThresholds {
                        critical_days: *stale_critical_days,
                        warning_days: *stale_warning_days,
                        info_days: *stale_info_days,
                    },
                    filter: AppFilter {
                        namespaces: namespaces.clone(),
                        projects: projects.clone(),
                        exclude_namespaces: exclude_namespaces.clone(),
                    },
                };

                let provider =
                    ArgoCdProvider::new(url, token.as_deref().map(Token::from))?;
                let engine = MetricsEngine::new(provider, config, cluster.clone());
                let report = engine.run().await?;

                // Serialize to JSON
                let json_output = if self.pretty {
                    serde_json::to_string_pretty(&report)?
                } else {
                    serde_json::to_string(&report)?
                };

                // Write to output
                if let Some(output_path) = &self.output {
                    std::fs::write(output_path, json_output)?;
                    info!("Report written to: {}", output_path.display());
                } else {
                    println!("{}", json_output);
                }

                Ok(())
            }
        }
    }
}
