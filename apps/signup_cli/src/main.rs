use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::Parser;
use shared::domain::FormField;
use signup_core::{
    load_settings, load_settings_from, FormController, FormEvent, SubmitRejection, SubmitResult,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::error::RecvError,
    task::JoinHandle,
};
use tracing_subscriber::EnvFilter;

mod commands;
mod render;

use commands::{parse_command, CommandError, UiCommand, HELP};
use render::render_view;

#[derive(Parser, Debug)]
#[command(about = "Fill in and submit the account registration form")]
struct Args {
    /// Settings file; defaults to ./signup.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    endpoint: Option<String>,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    password: Option<String>,
    #[arg(long)]
    show_password: bool,
    /// Submit the prefilled form once and exit instead of reading commands.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = match &args.config {
        Some(path) => load_settings_from(path)
            .with_context(|| format!("failed to load settings from '{}'", path.display()))?,
        None => load_settings(),
    };
    if let Some(endpoint) = &args.endpoint {
        if !settings.set_endpoint(endpoint) {
            bail!("invalid --endpoint '{endpoint}': expected an http(s) url");
        }
    }

    let controller = Arc::new(
        FormController::from_settings(&settings).context("failed to initialize signup client")?,
    );
    prefill(&controller, &args);

    if args.once {
        run_once(&controller).await
    } else {
        run_interactive(controller).await
    }
}

fn prefill(controller: &FormController, args: &Args) {
    let values = [
        (FormField::Name, &args.name),
        (FormField::Email, &args.email),
        (FormField::Password, &args.password),
    ];
    for (field, value) in values {
        if let Some(value) = value {
            controller.update_field(field, value.as_str());
        }
    }
    if args.show_password {
        controller.toggle_visibility();
    }
}

async fn run_once(controller: &FormController) -> Result<()> {
    match controller.submit().await {
        SubmitResult::Completed(outcome) if outcome.is_success() => {
            println!("{}", outcome.message());
            Ok(())
        }
        SubmitResult::Completed(outcome) => bail!("{}", outcome.message()),
        SubmitResult::Cancelled => bail!("submission cancelled"),
        SubmitResult::Rejected(rejection) => bail!("submission rejected: {rejection:?}"),
    }
}

async fn run_interactive(controller: Arc<FormController>) -> Result<()> {
    println!("{}\n\n{HELP}", render_view(&controller.view()));

    let render_task = spawn_renderer(controller.clone());
    let mut submissions: Vec<JoinHandle<()>> = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(CommandError::Empty) => continue,
            Err(err) => {
                eprintln!("{err}");
                continue;
            }
        };

        match command {
            UiCommand::SetField { field, value } => controller.update_field(field, value),
            UiCommand::ToggleVisibility => {
                controller.toggle_visibility();
            }
            UiCommand::Submit if controller.is_submitting() => {
                eprintln!("a submission is already in progress");
            }
            UiCommand::Submit => {
                submissions.retain(|handle| !handle.is_finished());
                submissions.push(spawn_submission(controller.clone()));
            }
            UiCommand::Show => println!("{}", render_view(&controller.view())),
            UiCommand::Help => println!("{HELP}"),
            UiCommand::Quit => break,
        }
    }

    controller.teardown();
    for handle in submissions {
        let _ = handle.await;
    }
    render_task.abort();
    Ok(())
}

fn spawn_submission(controller: Arc<FormController>) -> JoinHandle<()> {
    tokio::spawn(async move {
        match controller.submit().await {
            SubmitResult::Rejected(SubmitRejection::AlreadySubmitting) => {
                eprintln!("a submission is already in progress");
            }
            SubmitResult::Rejected(SubmitRejection::TornDown) | SubmitResult::Cancelled => {}
            SubmitResult::Completed(_) => {}
        }
    })
}

fn spawn_renderer(controller: Arc<FormController>) -> JoinHandle<()> {
    let mut events = controller.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(FormEvent::StateChanged(state)) => {
                    println!("\n{}", render_view(&state.view(controller.messages())));
                }
                Ok(FormEvent::SubmissionFinished {
                    id, finished_at, ..
                }) => {
                    tracing::debug!(submission = %id, %finished_at, "submission finished");
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "renderer lagged behind form events");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}
