use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shared::{
    domain::{BehaviorMode, ElementId, FileRole},
    protocol::STATUS_SUCCESS,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use wizard_core::{HttpWizardApi, MemoryPage, UploadFile, WizardController, WizardPage};

mod config;
mod terminal;

use config::{load_settings, Settings};
use terminal::TerminalPage;

type Controller = WizardController<HttpWizardApi, TerminalPage>;

#[derive(Parser, Debug)]
#[command(about = "Upload, validate and submit documents through the wizard server")]
struct Args {
    /// Config file; defaults to ./wizard.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    server_url: Option<String>,
    /// `submit-gated` or `cache-persist`.
    #[arg(long)]
    mode: Option<BehaviorMode>,
    #[arg(long)]
    provider: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a source document and a terminology table, optionally submitting them.
    Run {
        #[arg(long)]
        md: PathBuf,
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        submit: bool,
    },
    /// Check connectivity to the configured LLM provider.
    TestApi,
    /// Show what the server has cached from earlier sessions.
    Cache,
}

fn apply_cli_overrides(settings: &mut Settings, args: &Args) {
    if let Some(v) = &args.server_url {
        settings.server_url = v.clone();
    }
    if let Some(v) = args.mode {
        settings.mode = v;
    }
    if let Some(v) = &args.provider {
        settings.llm_provider = v.clone();
    }
}

async fn select_and_validate(
    controller: &Controller,
    role: FileRole,
    path: PathBuf,
) -> Result<()> {
    let file = UploadFile::from_path(&path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    controller
        .with_page_mut(|page| page.select_file(role, file))
        .await;
    controller.on_file_changed(role).await;
    controller.on_validate_clicked(role).await;
    Ok(())
}

async fn print_summary(controller: &Controller) {
    let files = controller.snapshot().await;
    let submit = controller.elements().submit();
    let (provider, submit_enabled) = controller
        .with_page(|page| {
            (
                page.value(ElementId::LlmProvider).unwrap_or_default(),
                page.inner().is_enabled(submit),
            )
        })
        .await;

    println!("md:       {}", files.md.as_deref().unwrap_or("-"));
    println!("csv:      {}", files.csv.as_deref().unwrap_or("-"));
    println!("provider: {}", if provider.is_empty() { "-" } else { provider.as_str() });
    if controller.mode() == BehaviorMode::SubmitGated {
        println!("{submit}: {}", if submit_enabled { "enabled" } else { "disabled" });
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref())?;
    apply_cli_overrides(&mut settings, &args);
    info!(server_url = %settings.server_url, mode = %settings.mode, "starting upload wizard");

    let api = HttpWizardApi::with_timeout(&settings.server_url, settings.request_timeout())
        .context("failed to build wizard http client")?;
    let page =
        TerminalPage::new(MemoryPage::complete().with_provider(settings.llm_provider.clone()));
    let controller = WizardController::new(api, page, settings.mode)?;

    controller.load_cached_state_on_startup().await;

    match args.command {
        Command::Run { md, csv, submit } => {
            select_and_validate(&controller, FileRole::Md, md).await?;
            select_and_validate(&controller, FileRole::Csv, csv).await?;
            if submit {
                match controller.on_submit_clicked().await {
                    Ok(target) => println!("result: {target}"),
                    Err(err) => {
                        warn!(error = %err, "submit failed");
                        print_summary(&controller).await;
                        return Err(err.into());
                    }
                }
            }
            print_summary(&controller).await;
        }
        Command::TestApi => {
            let response = controller.test_api_connection().await?;
            if let Some(results) = response.test_results {
                println!("{}", serde_json::to_string_pretty(&results)?);
            }
            if response.status != STATUS_SUCCESS {
                anyhow::bail!(
                    "API test failed: {}",
                    response.error.unwrap_or_else(|| response.status.clone())
                );
            }
        }
        Command::Cache => print_summary(&controller).await,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{apply_cli_overrides, Args, Command};
    use crate::config::Settings;
    use clap::Parser;
    use shared::domain::BehaviorMode;

    #[test]
    fn cli_flags_override_loaded_settings() {
        let args = Args::try_parse_from([
            "wizard_cli",
            "--server-url",
            "http://127.0.0.1:9000",
            "--mode",
            "cache-persist",
            "--provider",
            "deepseek",
            "cache",
        ])
        .expect("parse");
        let mut settings = Settings::default();
        apply_cli_overrides(&mut settings, &args);

        assert_eq!(settings.server_url, "http://127.0.0.1:9000");
        assert_eq!(settings.mode, BehaviorMode::CachePersist);
        assert_eq!(settings.llm_provider, "deepseek");
        assert!(matches!(args.command, Command::Cache));
    }

    #[test]
    fn run_requires_both_files() {
        assert!(Args::try_parse_from(["wizard_cli", "run", "--md", "a.md"]).is_err());

        let args = Args::try_parse_from([
            "wizard_cli", "run", "--md", "a.md", "--csv", "terms.csv", "--submit",
        ])
        .expect("parse");
        assert!(matches!(args.command, Command::Run { submit: true, .. }));
    }

    #[test]
    fn rejects_unknown_mode() {
        assert!(Args::try_parse_from(["wizard_cli", "--mode", "sideways", "cache"]).is_err());
    }
}
