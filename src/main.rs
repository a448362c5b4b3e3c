//! papertrail - CLI entry point.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use octocrab::Octocrab;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use papertrail::config::{ActionContext, ContextInputs};
use papertrail::error::{GenerationError, InputError, RunError};
use papertrail::git::SystemGit;
use papertrail::github::{
    Acquisition, DiffSource, GitHubContentStore, GitHubDiffSource, JsonFileDiffSource,
    build_client, get_github_token,
};
use papertrail::llm::{GenerationParams, Provider, build_generator};
use papertrail::output::{error_annotation, set_output};
use papertrail::papertrail::{LocalFileStore, LogStore};
use papertrail::{GenerationMode, Pipeline, Sink};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Append a section to the papertrail file
    Append,
    /// Rewrite the pushed commit's message and force-push
    Amend,
}

/// Summarize each pushed commit with an LLM and keep a running papertrail.
#[derive(Parser, Debug)]
#[command(name = "papertrail")]
#[command(about = "Summarize each pushed commit with an LLM and keep a running papertrail")]
#[command(version)]
struct Cli {
    /// Credential for the text-generation service
    #[arg(long, env = "PAPERTRAIL_LLM_API_KEY", hide_env_values = true)]
    llm_api_key: Option<String>,

    /// Text-generation backend
    #[arg(long, env = "PAPERTRAIL_LLM_PROVIDER", value_enum, default_value_t = Provider::Anthropic)]
    provider: Provider,

    /// Model identifier (defaults per provider)
    #[arg(long, env = "PAPERTRAIL_LLM_MODEL")]
    model: Option<String>,

    /// Token budget for the reply
    #[arg(long, default_value_t = GenerationParams::DEFAULT_MAX_TOKENS)]
    max_tokens: u32,

    /// Sampling temperature
    #[arg(long, default_value_t = GenerationParams::DEFAULT_TEMPERATURE)]
    temperature: f32,

    /// Generate offline stub text instead of calling the service
    #[arg(long, env = "PAPERTRAIL_STUB_LLM")]
    stub: bool,

    /// GitHub token (falls back to GH_TOKEN, then `gh auth token`)
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    repo_token: Option<String>,

    /// Papertrail file path within the repository
    #[arg(long, env = "PAPERTRAIL_PATH", default_value = "papertrail.md")]
    path: String,

    /// Repository as owner/repo
    #[arg(long, env = "GITHUB_REPOSITORY")]
    repository: Option<String>,

    /// Commit to process
    #[arg(long, env = "GITHUB_SHA")]
    sha: Option<String>,

    /// Pushed ref, e.g. refs/heads/main
    #[arg(long, env = "GITHUB_REF")]
    git_ref: Option<String>,

    /// Push event payload
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    event_path: Option<PathBuf>,

    /// Step output file
    #[arg(long, env = "GITHUB_OUTPUT")]
    output_file: Option<PathBuf>,

    /// How changed files are fetched
    #[arg(long, env = "PAPERTRAIL_ACQUISITION", value_enum, default_value_t = Acquisition::Auto)]
    acquisition: Acquisition,

    /// Read changed files from a JSON file instead of the GitHub API
    #[arg(long, env = "PAPERTRAIL_FILES_JSON")]
    files_json: Option<PathBuf>,

    /// Write the papertrail to the local filesystem instead of the contents API
    #[arg(long, env = "PAPERTRAIL_LOCAL")]
    local: bool,

    /// Append to the papertrail or amend the pushed commit
    #[arg(long, env = "PAPERTRAIL_MODE", value_enum, default_value_t = Mode::Append)]
    mode: Mode,

    /// Confirm that amend mode may force-push
    #[arg(long, env = "PAPERTRAIL_ALLOW_FORCE_PUSH")]
    allow_force_push: bool,

    /// Remote to force-push to in amend mode
    #[arg(long, default_value = "origin")]
    remote: String,

    /// Extra append attempts after a conflicting concurrent edit
    #[arg(long, env = "PAPERTRAIL_CONFLICT_RETRIES", default_value_t = 0)]
    conflict_retries: u32,

    /// Print the section instead of writing it
    #[arg(long)]
    dry_run: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = ?e, "papertrail run failed");
            println!("{}", error_annotation(&format!("Action failed: {e}")));
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli) -> Result<()> {
    debug!(
        provider = %cli.provider,
        stub = cli.stub,
        llm_api_key_set = cli.llm_api_key.is_some(),
        repo_token_set = cli.repo_token.is_some(),
        path = %cli.path,
        "Inputs"
    );

    let context = ActionContext::resolve(&ContextInputs {
        repository: cli.repository.as_deref(),
        sha: cli.sha.as_deref(),
        git_ref: cli.git_ref.as_deref(),
        event_path: cli.event_path.as_deref(),
    })
    .map_err(RunError::from)?;

    let mut client = None;
    let sink = sink(&cli, &context, &mut client)?;
    let generation = generation_mode(&cli)?;
    let source: Box<dyn DiffSource> = match &cli.files_json {
        Some(path) => Box::new(JsonFileDiffSource::new(path)),
        None => Box::new(GitHubDiffSource::new(
            github(&cli, &mut client)?,
            &context.owner,
            &context.repo,
            &context.sha,
            context.before.as_deref(),
            cli.acquisition,
        )),
    };

    let pipeline = Pipeline {
        source,
        generation,
        sink,
    };

    info!("Processing commit {} in {}", context.sha, context.full_name());
    let outcome = pipeline.run(&context).await?;

    if cli.dry_run {
        println!("{}", outcome.section.trim_start());
    }
    if let Some(sha) = &outcome.amended_sha {
        info!("Commit rewritten as {sha}");
    }

    let output_file = cli.output_file.as_deref();
    set_output(output_file, "summary", &outcome.text.summary)
        .context("Failed to write step output")?;
    set_output(output_file, "message", &outcome.text.message)
        .context("Failed to write step output")?;

    Ok(())
}

/// Authenticated GitHub client, built on first use.
fn github(cli: &Cli, cached: &mut Option<Octocrab>) -> Result<Octocrab, RunError> {
    if let Some(client) = cached {
        return Ok(client.clone());
    }
    let token = get_github_token(cli.repo_token.as_deref())?;
    let client = build_client(&token)?;
    *cached = Some(client.clone());
    Ok(client)
}

fn generation_mode(cli: &Cli) -> Result<GenerationMode, RunError> {
    if cli.stub {
        info!("Stub mode: generating text offline");
        return Ok(GenerationMode::Stub);
    }

    let api_key = cli
        .llm_api_key
        .clone()
        .filter(|k| !k.trim().is_empty())
        .ok_or(InputError::MissingCredential("llm-api-key"))?;

    let mut params = GenerationParams::for_provider(cli.provider);
    if let Some(model) = &cli.model {
        params.model = model.clone();
    }
    params.max_tokens = cli.max_tokens;
    params.temperature = cli.temperature;

    let generator = build_generator(cli.provider, api_key).map_err(GenerationError::from)?;
    Ok(GenerationMode::Live { generator, params })
}

fn sink(
    cli: &Cli,
    context: &ActionContext,
    client: &mut Option<Octocrab>,
) -> Result<Sink, RunError> {
    if cli.dry_run {
        return Ok(Sink::DryRun);
    }

    let branch = || {
        context
            .branch
            .clone()
            .ok_or(InputError::MissingContext("branch (a refs/heads/ ref)"))
    };

    match cli.mode {
        Mode::Amend => {
            if !cli.allow_force_push {
                return Err(InputError::ForcePushNotConfirmed.into());
            }
            Ok(Sink::Amend {
                git: Box::new(SystemGit::default()),
                remote: cli.remote.clone(),
                branch: branch()?,
            })
        }
        Mode::Append => {
            let store: Box<dyn LogStore> = if cli.local {
                Box::new(LocalFileStore::new(Path::new(".")))
            } else {
                Box::new(GitHubContentStore::new(
                    github(cli, client)?,
                    &context.owner,
                    &context.repo,
                    &branch()?,
                ))
            };
            Ok(Sink::Papertrail {
                store,
                path: cli.path.clone(),
                conflict_retries: cli.conflict_retries,
            })
        }
    }
}
