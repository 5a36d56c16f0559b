//! Terminal front-end for the task list
//!
//! Reads one command per line from stdin and prints the list after every
//! state change. Pass `--offline` to run against an in-memory collection.
//!
//! Run with: `TASKLIST_USER_ID=42 cargo run --bin tasklist`

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tasklist::types::{FilterMode, Todo, TodoId, UserId};
use tasklist::{Config, InMemoryTodoApi, TodoController, TodoError, TodoView};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const HELP: &str = "\
commands:
  add <title>          create a todo
  edit <id> <title>    rename (blank title deletes)
  toggle <id>          flip completed
  rm <id>              delete
  all                  toggle all
  clear                delete completed
  filter <mode>        all | active | completed | #/active ...
  dismiss              hide the error
  ls                   print the list
  quit";

/// A parsed input line
enum Command {
    Add(String),
    Edit(TodoId, String),
    Toggle(TodoId),
    Remove(TodoId),
    ToggleAll,
    Clear,
    Filter(FilterMode),
    Dismiss,
    List,
    Help,
    Quit,
}

fn parse_id(raw: &str) -> Result<TodoId> {
    raw.parse::<u64>()
        .map(TodoId::new)
        .with_context(|| format!("not a todo id: {raw}"))
}

fn parse(line: &str) -> Result<Command> {
    let line = line.trim();
    let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    Ok(match verb {
        "add" => Command::Add(rest.to_string()),
        "edit" => {
            let (id, title) = rest.split_once(' ').unwrap_or((rest, ""));
            Command::Edit(parse_id(id)?, title.to_string())
        },
        "toggle" => Command::Toggle(parse_id(rest)?),
        "rm" => Command::Remove(parse_id(rest)?),
        "all" => Command::ToggleAll,
        "clear" => Command::Clear,
        "filter" => Command::Filter(rest.parse()?),
        "dismiss" => Command::Dismiss,
        "ls" | "" => Command::List,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => anyhow::bail!("unknown command: {other} (try `help`)"),
    })
}

fn render_todo(todo: &Todo, view: &TodoView) -> String {
    let mark = if todo.completed { "x" } else { " " };
    let busy = if view.is_processing(todo.id) { " …" } else { "" };
    format!("  [{mark}] {:>4}  {}{busy}", todo.id.get(), todo.title)
}

fn render(view: &TodoView) {
    if let Some(message) = view.error_message() {
        println!("! {message}");
    }
    for todo in &view.visible {
        println!("{}", render_todo(todo, view));
    }
    if let Some(placeholder) = &view.placeholder {
        println!("  [ ]    …  {}", placeholder.title);
    }
    if view.show_footer() {
        let filters: Vec<String> = FilterMode::ALL
            .iter()
            .map(|mode| {
                if *mode == view.filter {
                    format!("[{mode}]")
                } else {
                    mode.to_string()
                }
            })
            .collect();
        let clear = if view.can_clear_completed() { "  (clear)" } else { "" };
        println!("  {}  {}{clear}", view.items_left_label(), filters.join(" "));
    }
}

/// Runs one command; returns `false` when the loop should stop
async fn execute(controller: &TodoController, command: Command) -> Result<bool> {
    match command {
        Command::Add(title) => match controller.add(title).await {
            Ok(todo) => println!("added {}", todo.id),
            Err(TodoError::Failed { title, .. }) => println!("not saved: {title}"),
            Err(TodoError::Rejected) => {},
            Err(error) => return Err(error.into()),
        },
        Command::Edit(id, title) => {
            if let Err(error) = controller.rename(id, &title).await {
                println!("{error}");
            }
        },
        Command::Toggle(id) => {
            if let Err(error) = controller.toggle(id).await {
                println!("{error}");
            }
        },
        Command::Remove(id) => controller.delete(id).await?.wait().await,
        Command::ToggleAll => controller.toggle_all().await?.wait().await,
        Command::Clear => controller.delete_completed().await?.wait().await,
        Command::Filter(mode) => controller.set_filter(mode).await?,
        Command::Dismiss => controller.dismiss_error().await?,
        Command::List => {},
        Command::Help => println!("{HELP}"),
        Command::Quit => return Ok(false),
    }
    Ok(true)
}

fn offline_api(user_id: UserId) -> InMemoryTodoApi {
    InMemoryTodoApi::with_todos(vec![
        Todo::new(TodoId::new(1), user_id, "Read the docs", true),
        Todo::new(TodoId::new(2), user_id, "Write a todo app", false),
        Todo::new(TodoId::new(3), user_id, "Ship it", false),
    ])
    .with_latency(Duration::from_millis(150))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if present)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tasklist=info,tasklist_runtime=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let offline = std::env::args().any(|arg| arg == "--offline");

    let controller = if offline {
        let config = Config::from_env().unwrap_or_else(|_| Config::new(UserId::new(1)));
        tracing::info!(user_id = %config.user_id, "Running against in-memory todos");
        TodoController::with_api(Arc::new(offline_api(config.user_id)), &config)
    } else {
        let config = Config::from_env().context("configuration")?;
        tracing::info!(url = %config.api_base_url, user_id = %config.user_id, "Connecting");
        TodoController::from_config(&config)?
    };

    controller.start().await?.wait().await;
    render(&controller.view().await);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse(&line) {
            Ok(command) => command,
            Err(error) => {
                println!("{error}");
                continue;
            },
        };
        if !execute(&controller, command).await? {
            break;
        }
        render(&controller.view().await);
    }

    controller
        .shutdown(Duration::from_secs(5))
        .await
        .context("shutdown")?;
    Ok(())
}
