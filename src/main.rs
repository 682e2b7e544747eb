use clap::{value_parser, Arg, ArgMatches, Command};
use color_eyre::Result;
use std::sync::Arc;

mod adapters;
mod application;
mod domain;
mod ports;

use adapters::{
    api::{BluebottleClient, BluebottleRepository},
    cache::MokaCacheAdapter,
    config::{FileConfigStore, TOKEN_ENV},
    tui::{run_tui, App},
};
use application::{AppError, Repositories, StateManager, TaskService};
use domain::{Skill, SkillId, Task, TaskId, TaskOrdering, TaskSearch, TaskStatus};
use ports::ConfigStore;

fn task_id_arg() -> Arg {
    Arg::new("task_id")
        .help("Task ID")
        .required(true)
        .index(1)
}

fn cli() -> Command {
    Command::new("bluebottle-tasks")
        .version("0.1.0")
        .about("A terminal client for the Bluebottle task board")
        .long_about("Browse, search and manage volunteer tasks from the terminal.\n\nWithout a subcommand the interactive interface starts.")
        .arg(
            Arg::new("token")
                .long("token")
                .value_name("TOKEN")
                .help("API token (can also be set via BLUEBOTTLE_TOKEN env var)")
                .global(true),
        )
        .arg(
            Arg::new("api_url")
                .long("api-url")
                .value_name("URL")
                .help("API base URL (can also be set via BLUEBOTTLE_API_URL env var)")
                .global(true),
        )
        .subcommand(
            Command::new("tasks")
                .about("Task operations")
                .subcommand(
                    Command::new("search")
                        .about("Search tasks and print one page as JSON")
                        .arg(Arg::new("text").long("text").value_name("TEXT"))
                        .arg(Arg::new("skill").long("skill").value_name("SKILL_ID"))
                        .arg(
                            Arg::new("status")
                                .long("status")
                                .value_name("STATUS")
                                .help("open, in progress, closed, realized or any")
                                .default_value("open"),
                        )
                        .arg(
                            Arg::new("ordering")
                                .long("ordering")
                                .value_name("ORDERING")
                                .value_parser(["newest", "deadline"])
                                .default_value("newest"),
                        )
                        .arg(
                            Arg::new("page")
                                .long("page")
                                .value_name("PAGE")
                                .value_parser(value_parser!(u32).range(1..))
                                .default_value("1"),
                        ),
                )
                .subcommand(
                    Command::new("get")
                        .about("Get a specific task by ID")
                        .arg(task_id_arg()),
                )
                .subcommand(
                    Command::new("members")
                        .about("List the members of a task")
                        .arg(task_id_arg()),
                )
                .subcommand(
                    Command::new("files")
                        .about("List the files attached to a task")
                        .arg(task_id_arg()),
                ),
        )
        .subcommand(
            Command::new("skills")
                .about("Skill operations")
                .subcommand(Command::new("list").about("List skills as JSON")),
        )
}

fn search_from_matches(matches: &ArgMatches) -> Result<TaskSearch> {
    let status = match matches.get_one::<String>("status").map(String::as_str) {
        None | Some("any") | Some("") => None,
        Some(status) => Some(status.parse::<TaskStatus>()?),
    };
    let ordering = match matches.get_one::<String>("ordering") {
        Some(ordering) => ordering.parse::<TaskOrdering>()?,
        None => TaskOrdering::default(),
    };

    Ok(TaskSearch {
        text: matches.get_one::<String>("text").cloned().unwrap_or_default(),
        skill: matches
            .get_one::<String>("skill")
            .map(|s| SkillId::from(s.as_str())),
        ordering,
        status,
        page: matches.get_one::<u32>("page").copied().unwrap_or(1),
    })
}

fn task_id(matches: &ArgMatches) -> Option<TaskId> {
    matches
        .get_one::<String>("task_id")
        .map(|id| TaskId::from(id.as_str()))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn fail(what: &str, error: impl std::fmt::Display) -> ! {
    eprintln!("Failed to {what}: {error}");
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("bluebottle-tasks.log")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let matches = cli().get_matches();

    let config_store = Arc::new(FileConfigStore::new()?);
    let mut config = config_store.load_config().await?;

    let mut changed = false;
    if let Some(token) = matches.get_one::<String>("token") {
        config.api_token = Some(token.clone());
        changed = true;
    }
    if let Some(api_url) = matches.get_one::<String>("api_url") {
        config.api_base_url = api_url.trim_end_matches('/').to_string();
        changed = true;
    }

    if config.api_token.is_none() {
        eprintln!("No API token found!");
        eprintln!();
        eprintln!("To get started:");
        eprintln!("1. Copy your API token from your profile page on the platform");
        eprintln!("2. Run: export {TOKEN_ENV}=your_token_here");
        eprintln!(
            "3. Or run: {} --token your_token_here",
            std::env::args()
                .next()
                .unwrap_or_else(|| "bluebottle-tasks".to_string())
        );
        eprintln!();
        return Err(AppError::AuthenticationRequired.into());
    }

    if changed {
        config_store.save_config(&config).await?;
    }

    tracing::info!("Using API at {}", config.api_base_url);
    let client = BluebottleClient::new(config.api_base_url.clone(), config.api_token.clone())?;
    let repositories = Repositories::from_shared(Arc::new(BluebottleRepository::new(client)));

    let task_cache = Arc::new(MokaCacheAdapter::<TaskId, Task>::new(
        config.cache_ttl_seconds,
        1000,
    ));
    let skill_cache = Arc::new(MokaCacheAdapter::<String, Vec<Skill>>::new(
        config.cache_ttl_seconds,
        16,
    ));

    let task_service = Arc::new(TaskService::new(
        repositories.clone(),
        task_cache,
        skill_cache,
    ));

    let state_manager = Arc::new(StateManager::new(
        task_service,
        repositories,
        config_store,
    ));

    match matches.subcommand() {
        Some(("tasks", tasks_matches)) => match tasks_matches.subcommand() {
            Some(("search", search_matches)) => {
                let query = search_from_matches(search_matches)?;
                match state_manager.search_tasks(query).await {
                    Ok(search) => print_json(&serde_json::json!({
                        "query": search.query(),
                        "range_start": search.range_start(),
                        "range_end": search.range_end(),
                        "total": search.results().total,
                        "has_next_page": search.has_next_page(),
                        "has_previous_page": search.has_previous_page(),
                        "results": search.results().items,
                    }))?,
                    Err(e) => fail("search tasks", e),
                }
            }
            Some(("get", get_matches)) => {
                if let Some(id) = task_id(get_matches) {
                    match state_manager.get_task(&id).await {
                        Ok(task) => print_json(&task)?,
                        Err(e) => fail("get task", e),
                    }
                }
            }
            Some(("members", members_matches)) => {
                if let Some(id) = task_id(members_matches) {
                    match state_manager.get_task_members(&id).await {
                        Ok(members) => print_json(&members)?,
                        Err(e) => fail("list members", e),
                    }
                }
            }
            Some(("files", files_matches)) => {
                if let Some(id) = task_id(files_matches) {
                    match state_manager.get_task_files(&id).await {
                        Ok(files) => print_json(&files)?,
                        Err(e) => fail("list files", e),
                    }
                }
            }
            _ => fail("run command", "unknown tasks subcommand"),
        },
        Some(("skills", skills_matches)) => match skills_matches.subcommand() {
            Some(("list", _)) => match state_manager.list_skills(false).await {
                Ok(skills) => print_json(&skills)?,
                Err(e) => fail("list skills", e),
            },
            _ => fail("run command", "unknown skills subcommand"),
        },
        None => {
            if let Err(e) = state_manager.initialize().await {
                match e {
                    AppError::AuthenticationRequired => {
                        eprintln!("Authentication required: the API token was rejected");
                    }
                    other => eprintln!("Could not connect: {other}"),
                }
                std::process::exit(1);
            }

            let search = state_manager.search_tasks(TaskSearch::default()).await?;
            let app = App::new(state_manager, search);

            if let Err(e) = run_tui(app).await {
                eprintln!("Application error: {e}");
                std::process::exit(1);
            }
        }
        _ => fail("run command", "unknown command"),
    }

    Ok(())
}
