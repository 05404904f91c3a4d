//! Command runners for the one-shot subcommands

use std::env;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use tracing::debug;

use crate::application::ports::{
    CompletionClient, ConfigStore, DocumentReader, SpeechRecognizer, TopicRepository,
};
use crate::application::{CallGuard, SessionSettings, StudyError, StudySession, TopicStore};
use crate::domain::artifact::Artifact;
use crate::domain::config::{AppConfig, PdfReaderKind, ServerConfig, StoreKind};
use crate::domain::identity::Identity;
use crate::domain::topic::TopicCount;
use crate::infrastructure::{
    AnthropicClient, CompletionDocumentReader, FileTopicRepository, HttpTopicRepository,
    ScriptedRecognizer, ServerDocumentReader, XdgConfigStore,
};

use super::args::{Cli, Commands};
use super::config_cmd::validate_config_value;
use super::practice::run_practice;
use super::presenter::Presenter;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
pub const BASE_URL_ENV: &str = "ANTHROPIC_BASE_URL";
pub const TOKEN_ENV: &str = "STUDY_VOICE_TOKEN";
pub const SERVER_ENV: &str = "STUDY_VOICE_SERVER";

pub(crate) type SharedCompletion = Arc<dyn CompletionClient>;
pub(crate) type SharedDocuments = Arc<dyn DocumentReader>;
pub(crate) type SharedRepository = Arc<dyn TopicRepository>;

/// Study session wired to the configured adapters
pub(crate) type CliSession<S> =
    StudySession<SharedCompletion, SharedDocuments, S, SharedRepository>;

/// Run a study subcommand with the merged configuration
pub async fn run(command: Commands, config: AppConfig) -> ExitCode {
    match command {
        Commands::Upload { file } => run_upload(&config, &file).await,
        Commands::Topics => run_topics(&config).await,
        Commands::Discard => run_discard(&config).await,
        Commands::Explain { topic, text, file } => run_explain(&config, &topic, text, file).await,
        Commands::Practice { topic } => run_practice(&config, &topic).await,
        Commands::Config { .. } => {
            Presenter::new().error("config is handled before the study commands");
            ExitCode::from(EXIT_USAGE_ERROR)
        }
    }
}

/// Turn the global flags into a partial config, validating each value
pub fn config_overrides(cli: &Cli) -> Result<AppConfig, String> {
    let checked = |key: &str, value: &Option<String>| -> Result<Option<String>, String> {
        match value {
            Some(v) => validate_config_value(key, v)
                .map(|_| Some(v.trim().to_string()))
                .map_err(|e| e.to_string()),
            None => Ok(None),
        }
    };

    Ok(AppConfig {
        identity: checked("identity", &cli.identity)?,
        mastery_policy: checked("mastery_policy", &cli.policy)?,
        timeout: checked("timeout", &cli.timeout)?,
        model: checked("model", &cli.model)?,
        topic_count: cli.strict.then(|| TopicCount::Exact.to_string()),
        ..AppConfig::empty()
    })
}

/// Config taken from environment variables, looked up through `var`
pub fn env_config(lookup: impl Fn(&str) -> Option<String>) -> AppConfig {
    let var = |name: &str| lookup(name).filter(|s| !s.trim().is_empty());
    let url = var(SERVER_ENV);
    let token = var(TOKEN_ENV);
    AppConfig {
        api_key: var(API_KEY_ENV),
        server: (url.is_some() || token.is_some()).then_some(ServerConfig { url, token }),
        ..AppConfig::empty()
    }
}

/// Load and merge configuration from file, env, and CLI
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = match store.load().await {
        Ok(config) => config,
        Err(e) => {
            Presenter::new().warn(&format!("Ignoring config file: {}", e));
            AppConfig::empty()
        }
    };
    let env_config = env_config(|name| env::var(name).ok());

    // Merge: defaults < file < env < cli
    AppConfig::defaults()
        .merge(file_config)
        .merge(env_config)
        .merge(cli_config)
}

/// API key from the merged config
pub fn require_api_key(config: &AppConfig) -> Result<String, String> {
    config
        .api_key
        .clone()
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| {
            format!(
                "Missing API key. Set {} environment variable or run 'study-voice config set api_key <key>'",
                API_KEY_ENV
            )
        })
}

pub(crate) fn identity_from(config: &AppConfig) -> Identity {
    let identity = Identity::new(config.identity_or_default());
    match config.server_token() {
        Some(token) => identity.with_token(token),
        None => identity,
    }
}

fn build_completion(config: &AppConfig, api_key: String) -> SharedCompletion {
    let mut client = AnthropicClient::with_model(api_key, config.model_or_default());
    if let Some(base) = env::var(BASE_URL_ENV).ok().filter(|s| !s.trim().is_empty()) {
        debug!(base_url = %base, "using completion base URL from environment");
        client = client.with_base_url(base);
    }
    Arc::new(client)
}

fn build_documents(config: &AppConfig, completion: &SharedCompletion) -> SharedDocuments {
    match config.pdf_reader_or_default() {
        PdfReaderKind::Server => Arc::new(ServerDocumentReader::new(config.server_url_or_default())),
        PdfReaderKind::Completion => Arc::new(CompletionDocumentReader::new(Arc::clone(completion))),
    }
}

pub(crate) fn build_repository(config: &AppConfig) -> SharedRepository {
    match config.store_or_default() {
        StoreKind::File => Arc::new(FileTopicRepository::new()),
        StoreKind::Http => Arc::new(HttpTopicRepository::new(config.server_url_or_default())),
    }
}

/// Wire a study session to the configured adapters
pub(crate) fn build_session<S: SpeechRecognizer>(
    config: &AppConfig,
    recognizer: S,
) -> Result<CliSession<S>, String> {
    let api_key = require_api_key(config)?;
    let completion = build_completion(config, api_key);
    let documents = build_documents(config, &completion);
    Ok(StudySession::new(
        identity_from(config),
        completion,
        documents,
        recognizer,
        build_repository(config),
        SessionSettings::from_config(config),
    ))
}

/// Read a file into an artifact, rejecting unsupported types up front
pub(crate) async fn read_artifact(path: &Path) -> Result<Artifact, String> {
    let data = tokio::fs::read(path)
        .await
        .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
    let artifact = Artifact::from_path_bytes(path, data);
    artifact.kind().map_err(|e| e.to_string())?;
    Ok(artifact)
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Await a call; Ctrl-C cancels the collaborator calls it is waiting on
pub(crate) async fn cancel_on_ctrl_c<F: Future>(canceller: CallGuard, call: F) -> F::Output {
    tokio::pin!(call);
    loop {
        tokio::select! {
            output = &mut call => return output,
            signal = tokio::signal::ctrl_c() => {
                if signal.is_err() {
                    return call.await;
                }
                debug!("interrupt received, cancelling outstanding calls");
                canceller.cancel_outstanding();
            }
        }
    }
}

/// Explain why a topic could not be selected
pub(crate) fn report_selection_error<S: SpeechRecognizer>(
    presenter: &Presenter,
    session: &CliSession<S>,
    error: &StudyError,
) {
    presenter.error(&error.to_string());
    if matches!(error, StudyError::UnknownTopic(_)) && !session.topics().is_empty() {
        presenter.info(&format!("Available topics: {}", session.topics().names().join(", ")));
    }
}

async fn run_upload(config: &AppConfig, file: &Path) -> ExitCode {
    let mut presenter = Presenter::new();

    let artifact = match read_artifact(file).await {
        Ok(a) => a,
        Err(e) => {
            presenter.error(&e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    let mut session = match build_session(config, ScriptedRecognizer::default()) {
        Ok(s) => s,
        Err(e) => {
            presenter.error(&e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    presenter.busy(&format!("Deriving topics from {}...", file_label(file)));
    let canceller = session.canceller();
    match cancel_on_ctrl_c(canceller, session.upload(&artifact)).await {
        Ok(outcome) => {
            presenter.done(&format!("Derived {} topics", outcome.topic_count));
            presenter.topic_list(session.topics());
            if let Some(e) = outcome.save_error {
                presenter.warn(&format!("Topics could not be saved: {}", e));
            }
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            presenter.failed("Could not derive topics");
            presenter.error(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

async fn run_topics(config: &AppConfig) -> ExitCode {
    let presenter = Presenter::new();
    let store = TopicStore::new(build_repository(config), CallGuard::new(config.timeout_or_default()));
    let topics = store.load(&identity_from(config)).await;
    presenter.topic_list(&topics);
    ExitCode::from(EXIT_SUCCESS)
}

async fn run_discard(config: &AppConfig) -> ExitCode {
    let presenter = Presenter::new();
    let identity = identity_from(config);
    let store = TopicStore::new(build_repository(config), CallGuard::new(config.timeout_or_default()));
    match store.clear(&identity).await {
        Ok(()) => {
            presenter.success(&format!("Discarded topics for {}", identity));
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            presenter.error(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

async fn run_explain(
    config: &AppConfig,
    topic: &str,
    texts: Vec<String>,
    files: Vec<PathBuf>,
) -> ExitCode {
    let mut presenter = Presenter::new();
    if texts.is_empty() && files.is_empty() {
        presenter.error("Nothing to explain. Pass --text and/or --file.");
        return ExitCode::from(EXIT_USAGE_ERROR);
    }

    let mut artifacts = Vec::with_capacity(files.len());
    for path in &files {
        match read_artifact(path).await {
            Ok(a) => artifacts.push((file_label(path), a)),
            Err(e) => {
                presenter.error(&e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    }

    let spoken = !texts.is_empty();
    let mut session = match build_session(config, ScriptedRecognizer::from_texts(texts)) {
        Ok(s) => s,
        Err(e) => {
            presenter.error(&e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    if session.restore().await.is_empty() {
        presenter.error("No topics yet. Upload study material with `study-voice upload <file>`.");
        return ExitCode::from(EXIT_ERROR);
    }
    if let Err(e) = session.select(topic).await.map(|_| ()) {
        report_selection_error(&presenter, &session, &e);
        return ExitCode::from(EXIT_ERROR);
    }

    if let Err(e) = capture_explanation(&mut presenter, &mut session, spoken, &artifacts).await {
        presenter.error(&e.to_string());
        return ExitCode::from(EXIT_ERROR);
    }

    presenter.busy("Evaluating your explanation...");
    let canceller = session.canceller();
    match cancel_on_ctrl_c(canceller, session.submit()).await {
        Ok(Some(outcome)) => {
            presenter.idle();
            presenter.verdict(&outcome.result, outcome.mastery);
            if let Some(e) = outcome.save_error {
                presenter.warn(&format!("Mastery could not be saved: {}", e));
            }
            ExitCode::from(EXIT_SUCCESS)
        }
        Ok(None) => {
            presenter.failed("Your explanation is empty");
            ExitCode::from(EXIT_ERROR)
        }
        Err(e) => {
            presenter.failed("Evaluation failed");
            presenter.error(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

async fn capture_explanation(
    presenter: &mut Presenter,
    session: &mut CliSession<ScriptedRecognizer>,
    spoken: bool,
    artifacts: &[(String, Artifact)],
) -> Result<(), StudyError> {
    let capture = session.capture_mut()?;
    if spoken {
        capture.start().await?;
        let committed = capture.listen_to_end().await.map_err(|e| StudyError::Capture(e.into()))?;
        debug!(segments = committed.len(), "explanation captured");
    }
    for (label, artifact) in artifacts {
        presenter.busy(&format!("Reading {}...", label));
        match capture.ingest_file(artifact).await {
            Ok(()) => presenter.done(&format!("Added {}", label)),
            Err(e) => {
                presenter.failed(&format!("Could not read {}", label));
                return Err(e.into());
            }
        }
    }
    Ok(())
}
