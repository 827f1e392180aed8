mod catalog_cmd;
mod config;
mod rubric_cmd;
mod serve_cmd;
#[cfg(test)]
mod test_util;
mod tui;

use std::sync::Arc;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use cynllun_core::gateway::anthropic::AnthropicGateway;

use config::CynllunConfig;

#[derive(Parser)]
#[command(name = "cynllun", about = "Lesson-plan wizard for the Curriculum for Wales 2022")]
struct Cli {
    /// Generation-service API key (overrides ANTHROPIC_API_KEY env var)
    #[arg(long, global = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a cynllun config file
    Init {
        /// Generation-service API key to store
        #[arg(long, default_value = "")]
        key: String,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Launch the interactive lesson-plan wizard
    Wizard,
    /// Serve the HTTP API (generate, register, rubric)
    Serve {
        /// Bind address
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
        /// Port to listen on
        #[arg(long, default_value_t = 18801)]
        port: u16,
    },
    /// Generate an analytic rubric in one shot
    Rubric {
        /// Area of Learning id (e.g. science-tech)
        #[arg(long)]
        area: Option<String>,
        /// Progression step number (1-5)
        #[arg(long)]
        step: Option<u8>,
        /// Statement of What Matters id (repeatable)
        #[arg(long = "statement")]
        statements: Vec<String>,
        /// Custom learning outcomes
        #[arg(long)]
        outcomes: Option<String>,
        /// Task description
        #[arg(long)]
        task: Option<String>,
        /// Text file with additional context
        #[arg(long)]
        upload: Option<std::path::PathBuf>,
    },
    /// Explore the curriculum reference catalog
    Catalog {
        /// Filter: purposes, areas, statements, skills, teaching, assessment
        category: Option<String>,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Execute the `cynllun init` command: write the config file.
fn cmd_init(key: &str, force: bool) -> Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        service: config::ServiceSection {
            api_key: key.to_string(),
            model: String::new(),
        },
        leads: config::LeadsSection::default(),
    };
    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    if key.is_empty() {
        println!("  service.api_key is empty -- set it (or ANTHROPIC_API_KEY) before generating.");
    }
    println!("Next: run `cynllun wizard` to start planning.");
    Ok(())
}

fn build_gateway(resolved: &CynllunConfig) -> AnthropicGateway {
    // An absent key becomes an empty one: the gateway reports it as a
    // configuration failure at call time, so the wizard and server still
    // work for everything that does not generate.
    let gateway = AnthropicGateway::new(resolved.api_key.clone().unwrap_or_default());
    match &resolved.model {
        Some(model) => gateway.with_model(model),
        None => gateway,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { key, force } => {
            cmd_init(&key, force)?;
        }
        Commands::Wizard => {
            let resolved = CynllunConfig::resolve(cli.api_key.as_deref());
            let gateway = Arc::new(build_gateway(&resolved));
            tui::run_wizard(gateway, resolved.lead_store).await?;
        }
        Commands::Serve { bind, port } => {
            let resolved = CynllunConfig::resolve(cli.api_key.as_deref());
            let gateway = Arc::new(build_gateway(&resolved));
            serve_cmd::run_serve(gateway, resolved.lead_store, &bind, port).await?;
        }
        Commands::Rubric {
            area,
            step,
            statements,
            outcomes,
            task,
            upload,
        } => {
            let resolved = CynllunConfig::resolve(cli.api_key.as_deref());
            let gateway = Arc::new(build_gateway(&resolved));
            let args = rubric_cmd::RubricArgs {
                area,
                step,
                statements,
                outcomes,
                task,
                upload,
            };
            rubric_cmd::run_rubric(gateway, args).await?;
        }
        Commands::Catalog { category } => {
            catalog_cmd::run_catalog(category.as_deref())?;
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
        }
    }

    Ok(())
}
