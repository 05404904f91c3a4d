//! Interactive practice loop

use std::path::PathBuf;
use std::process::ExitCode;

use crate::application::ports::CaptureError;
use crate::application::CaptureUpdate;
use crate::domain::config::AppConfig;
use crate::infrastructure::{ConsoleInput, ConsoleRecognizer};

use super::app::{
    build_session, cancel_on_ctrl_c, read_artifact, report_selection_error, CliSession,
    EXIT_ERROR, EXIT_SUCCESS,
};
use super::presenter::Presenter;

const HELP: &str = "\
Commands:
  :speak        start explaining; an empty line or Ctrl-C stops listening
  :file <path>  add a file (.txt, .pdf, image) to your explanation
  :submit       send your explanation for evaluation
  :clear        discard the current explanation
  :show         show the topic and your explanation so far
  :help         show this help
  :quit         leave practice";

/// One line typed at the practice prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PracticeCommand {
    Speak,
    File(PathBuf),
    Submit,
    Clear,
    Show,
    Help,
    Quit,
    Empty,
    /// Text typed outside of `:speak`
    Text(String),
    Unknown(String),
}

impl PracticeCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }
        let Some(command) = line.strip_prefix(':') else {
            return Self::Text(line.to_string());
        };
        let (name, arg) = match command.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (command, ""),
        };
        match name.to_lowercase().as_str() {
            "speak" | "s" => Self::Speak,
            "file" | "f" if !arg.is_empty() => Self::File(PathBuf::from(arg)),
            "submit" => Self::Submit,
            "clear" => Self::Clear,
            "show" => Self::Show,
            "help" | "h" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            _ => Self::Unknown(line.to_string()),
        }
    }
}

type PracticeSession = CliSession<ConsoleRecognizer>;

enum ListenStep {
    Update(Result<Option<CaptureUpdate>, CaptureError>),
    Interrupted,
}

/// Practise one topic until the user quits
pub async fn run_practice(config: &AppConfig, topic: &str) -> ExitCode {
    let mut presenter = Presenter::new();
    let input = ConsoleInput::stdin();
    let mut session = match build_session(config, ConsoleRecognizer::new(input.clone())) {
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
    if let Some(selected) = session.selected_topic() {
        presenter.topic_detail(selected);
    }
    presenter.info("Type :speak to start explaining, :help for all commands.");

    loop {
        presenter.prompt("> ");
        let line = tokio::select! {
            line = input.next_line() => line,
            _ = tokio::signal::ctrl_c() => Ok(None),
        };
        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                presenter.error(&format!("Cannot read input: {}", e));
                session.deselect().await;
                return ExitCode::from(EXIT_ERROR);
            }
        };

        match PracticeCommand::parse(&line) {
            PracticeCommand::Speak => listen(&presenter, &mut session).await,
            PracticeCommand::File(path) => add_file(&mut presenter, &mut session, path).await,
            PracticeCommand::Submit => submit(&mut presenter, &mut session).await,
            PracticeCommand::Clear => match session.capture_mut() {
                Ok(capture) => match capture.clear() {
                    Ok(()) => presenter.info("Explanation cleared"),
                    Err(e) => presenter.error(&e.to_string()),
                },
                Err(e) => presenter.error(&e.to_string()),
            },
            PracticeCommand::Show => show(&presenter, &session),
            PracticeCommand::Help => presenter.output(HELP),
            PracticeCommand::Quit => break,
            PracticeCommand::Empty => {}
            PracticeCommand::Text(_) => {
                presenter.info("Use :speak to start explaining, or :help for commands.")
            }
            PracticeCommand::Unknown(command) => {
                presenter.warn(&format!("Unknown command: {}. Try :help.", command))
            }
        }
    }

    session.deselect().await;
    ExitCode::from(EXIT_SUCCESS)
}

async fn listen(presenter: &Presenter, session: &mut PracticeSession) {
    let capture = match session.capture_mut() {
        Ok(c) => c,
        Err(e) => return presenter.error(&e.to_string()),
    };
    if let Err(e) = capture.start().await {
        return presenter.error(&e.to_string());
    }
    presenter.info("Listening. An empty line or Ctrl-C stops.");

    loop {
        let step = tokio::select! {
            update = capture.next_update() => ListenStep::Update(update),
            _ = tokio::signal::ctrl_c() => ListenStep::Interrupted,
        };
        match step {
            ListenStep::Update(Ok(Some(CaptureUpdate::Interim(text)))) => presenter.interim(&text),
            ListenStep::Update(Ok(Some(CaptureUpdate::Committed(_)))) => {}
            ListenStep::Update(Ok(Some(CaptureUpdate::Ended))) | ListenStep::Update(Ok(None)) => {
                break
            }
            ListenStep::Update(Err(e)) => {
                presenter.error(&e.to_string());
                break;
            }
            ListenStep::Interrupted => {
                if let Err(e) = capture.stop().await {
                    presenter.error(&e.to_string());
                }
                break;
            }
        }
    }

    let segments = capture.transcript().segments().len();
    presenter.success(&format!(
        "Stopped listening ({} segment{} so far)",
        segments,
        if segments == 1 { "" } else { "s" }
    ));
}

async fn add_file(presenter: &mut Presenter, session: &mut PracticeSession, path: PathBuf) {
    let artifact = match read_artifact(&path).await {
        Ok(a) => a,
        Err(e) => return presenter.error(&e),
    };
    let capture = match session.capture_mut() {
        Ok(c) => c,
        Err(e) => return presenter.error(&e.to_string()),
    };
    presenter.busy(&format!("Reading {}...", path.display()));
    match capture.ingest_file(&artifact).await {
        Ok(()) => presenter.done(&format!("Added {} to your explanation", path.display())),
        Err(e) => {
            presenter.failed(&format!("Could not read {}", path.display()));
            presenter.error(&e.to_string());
        }
    }
}

async fn submit(presenter: &mut Presenter, session: &mut PracticeSession) {
    presenter.busy("Evaluating your explanation...");
    let canceller = session.canceller();
    match cancel_on_ctrl_c(canceller, session.submit()).await {
        Ok(Some(outcome)) => {
            presenter.idle();
            presenter.verdict(&outcome.result, outcome.mastery);
            if let Some(e) = outcome.save_error {
                presenter.warn(&format!("Mastery could not be saved: {}", e));
            }
        }
        Ok(None) => {
            presenter.idle();
            presenter.info("Nothing to submit yet. Use :speak or :file first.");
        }
        Err(e) => {
            presenter.failed("Evaluation failed");
            presenter.error(&e.to_string());
            presenter.info("Your explanation was kept; :submit to retry.");
        }
    }
}

fn show(presenter: &Presenter, session: &PracticeSession) {
    if let Some(topic) = session.selected_topic() {
        presenter.topic_detail(topic);
    }
    if let Some(capture) = session.capture() {
        let transcript = capture.transcript();
        if transcript.is_blank() {
            presenter.info(&format!("Explanation ({}): (empty)", capture.state()));
        } else {
            presenter.info(&format!("Explanation ({}):", capture.state()));
            presenter.output(&transcript.text());
        }
    }
}
