use std::io::Read;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use lintrack::cli::{Cli, Command, TargetArgs};
use lintrack::config::LintrackConfig;
use lintrack::github::{GitHubClient, IssueTracker};
use lintrack::reconcile::{IssueLocator, LabelSpec, Reconciler, RepoRef, RunContext};
use lintrack::ui::Printer;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let printer = Printer::new(cli.json);
    match run(&cli, &printer).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            printer.error(&err);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: &Cli, printer: &Printer) -> Result<()> {
    let config = LintrackConfig::load(cli.config.as_deref())?;

    match &cli.command {
        Command::Sync {
            target,
            run_number,
            content,
            title,
            label_color,
            assignee,
            close,
            force_create,
        } => {
            let label = LabelSpec::new(
                target.label_name.as_deref().unwrap_or(&config.label_name),
                label_color.as_deref().unwrap_or(&config.label_color),
            )?;
            let ctx = RunContext {
                repo: target.repo.parse()?,
                title: title.clone().unwrap_or_else(|| config.issue_title.clone()),
                label,
                assignee: assignee.clone().filter(|a| !a.is_empty()),
                content: read_content(content.as_deref())?,
                run_number: *run_number,
                should_close: *close,
                force_create: *force_create,
            };
            ctx.validate()?;

            let client = connect(&config)?;
            let creator = resolve_creator(&client, target, &config).await?;
            let result = Reconciler::new(&client).reconcile(&ctx, &creator).await?;
            printer.sync(&ctx.repo, ctx.run_number, &result);
        }
        Command::Find { target } => {
            let repo: RepoRef = target.repo.parse()?;
            let label = target
                .label_name
                .clone()
                .unwrap_or_else(|| config.label_name.clone());

            let client = connect(&config)?;
            let creator = resolve_creator(&client, target, &config).await?;
            let lookup = IssueLocator::new(&client)
                .locate(&repo, &creator, &label)
                .await?;
            printer.find(&repo, lookup.record.as_ref(), &lookup.open_candidates);
        }
    }
    Ok(())
}

fn connect(config: &LintrackConfig) -> Result<GitHubClient> {
    if config.token.is_empty() {
        tracing::warn!("no GitHub token configured; requests will be unauthenticated");
    }
    Ok(GitHubClient::with_base_url(
        config.token.clone(),
        &config.api_url,
        config.request_timeout(),
    )?)
}

async fn resolve_creator(
    client: &GitHubClient,
    target: &TargetArgs,
    config: &LintrackConfig,
) -> Result<String> {
    if let Some(creator) = target.creator.clone().or_else(|| config.username.clone()) {
        return Ok(creator);
    }
    let login = client
        .authenticated_user()
        .await
        .context("unable to determine the authenticated user")?;
    tracing::debug!(%login, "resolved creator identity from token");
    Ok(login)
}

fn read_content(path: Option<&Path>) -> Result<String> {
    match path {
        None => Ok(String::new()),
        Some(path) if path == Path::new("-") => {
            let mut content = String::new();
            std::io::stdin()
                .read_to_string(&mut content)
                .context("unable to read scan report from stdin")?;
            Ok(content)
        }
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("unable to read scan report {}", path.display())),
    }
}
