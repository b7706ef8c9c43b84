use celestia_client::normalize::analysis::unwrap_analysis;
use celestia_client::normalize::EditedItem;
use celestia_client::{
    parse_meal_plan, parse_recipe, render_safe, AnalysisData, App, AppStore, ChatSession,
    ClientConfig, GoogleProfile, ImageSource, MealFilter, MealPlanPayload, MealPlanPreferences,
    MealSort, NutritionPeriod, Step, Toast, ToastKind,
};
use clap::{Parser, Subcommand};
use log::{debug, warn};
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::io::{BufRead, Read, Write};
use std::path::{Path, PathBuf};
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Parser)]
#[command(
    name = "celestia",
    version,
    about = "Command-line front end for the Celestia nutrition tracker"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Backend base URL (overrides host-based selection and celestia.toml)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// File holding the persisted session keys
    #[arg(long, global = true)]
    session_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Check that the backend is reachable
    Health,
    /// Sign in with a Google ID token
    Login {
        /// The ID token issued by Google Sign-In
        #[arg(long)]
        credential: String,
    },
    /// Forget the stored user and session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Analyze a meal from a photo or a description
    Analyze {
        /// Photo of the meal
        #[arg(long, conflicts_with = "text", required_unless_present = "text")]
        image: Option<PathBuf>,
        /// Description of the meal, e.g. "2 idli with sambar"
        #[arg(long)]
        text: Option<String>,
        /// Answers to clarification questions, in order
        #[arg(long = "answer")]
        answers: Vec<String>,
        /// Skip clarification questions
        #[arg(long)]
        skip: bool,
    },
    /// Re-run an analysis over hand-corrected items ("name" or "name=quantity")
    Reanalyze {
        /// Analysis JSON file, or - for stdin
        analysis: PathBuf,
        #[arg(long = "item", required = true)]
        items: Vec<String>,
        #[arg(long, default_value = "")]
        clarifications: String,
    },
    /// Generate a recipe for an analysed meal
    Recipe {
        /// Analysis JSON file, or - for stdin
        analysis: PathBuf,
    },
    /// Suggest healthier swaps for an analysed meal
    Swaps { analysis: PathBuf },
    /// Nutrition insights for an analysed meal
    Insights { analysis: PathBuf },
    /// Generate a personalized meal plan
    MealPlan {
        #[arg(long, default_value_t = 7)]
        days: u32,
        #[arg(long, default_value_t = 3)]
        meals_per_day: u32,
        #[arg(long, default_value = "")]
        cuisine: String,
        #[arg(long, default_value = "")]
        diet: String,
        #[arg(long)]
        calories: Option<u32>,
        #[arg(long, default_value = "")]
        budget: String,
    },
    /// Talk to the AI health coach. Without a message, starts a conversation.
    Chat { message: Vec<String> },
    /// Dashboard insights for the signed-in user
    Dashboard,
    /// Nutrition trends over a period (7d, 1m, 3m)
    Nutrition {
        #[arg(long, default_value = "7d")]
        period: NutritionPeriod,
    },
    /// Logged meals with statistics
    History {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        from: Option<chrono::NaiveDate>,
        #[arg(long)]
        to: Option<chrono::NaiveDate>,
        /// newest, oldest, calories-high or calories-low
        #[arg(long, default_value = "newest")]
        sort: MealSort,
    },
    /// Parse a markdown recipe file without contacting the backend
    ParseRecipe { file: PathBuf },
    /// Parse a plain-text meal plan file without contacting the backend
    ParseMealPlan { file: PathBuf },
    /// Render a JSON document the way the client displays it
    Render { file: PathBuf },
}

/// Prints every toast in the order it was shown, on stderr
struct ToastPrinter {
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl ToastPrinter {
    fn spawn(store: &AppStore) -> Self {
        Self::with_sink(store, print_toast)
    }

    fn with_sink(store: &AppStore, sink: impl Fn(&Toast) + Send + 'static) -> Self {
        let mut rx = store.toasts();
        let (stop, mut stopped) = oneshot::channel();
        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    received = rx.recv() => match received {
                        Ok(toast) => sink(&toast),
                        Err(RecvError::Lagged(missed)) => {
                            warn!("{} notifications were dropped", missed)
                        }
                        Err(RecvError::Closed) => break,
                    },
                    _ = &mut stopped => {
                        loop {
                            match rx.try_recv() {
                                Ok(toast) => sink(&toast),
                                Err(TryRecvError::Lagged(_)) => continue,
                                Err(_) => break,
                            }
                        }
                        break;
                    }
                }
            }
        });
        ToastPrinter { stop, task }
    }

    /// Print whatever is still queued and stop
    async fn finish(self) {
        let _ = self.stop.send(());
        if let Err(e) = self.task.await {
            debug!("Toast printer ended abnormally: {}", e);
        }
    }
}

fn print_toast(toast: &Toast) {
    let label = match toast.kind {
        ToastKind::Info => "info",
        ToastKind::Success => "ok",
        ToastKind::Warning => "warning",
        ToastKind::Error => "error",
    };
    eprintln!("[{}] {}", label, toast.message);
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn required<T>(value: Option<T>, what: &str) -> CliResult<T> {
    value.ok_or_else(|| format!("{} did not complete", what).into())
}

async fn read_input(path: &Path) -> CliResult<String> {
    if path == Path::new("-") {
        let content = tokio::task::spawn_blocking(|| {
            let mut content = String::new();
            std::io::stdin().read_to_string(&mut content).map(|_| content)
        })
        .await??;
        Ok(content)
    } else {
        Ok(tokio::fs::read_to_string(path).await?)
    }
}

/// Accepts the output of `celestia analyze` or any analysis envelope
async fn load_analysis(path: &Path) -> CliResult<AnalysisData> {
    let raw: Value = serde_json::from_str(&read_input(path).await?)?;
    unwrap_analysis(&raw).ok_or_else(|| "File does not contain analysis data".into())
}

async fn prompt(question: &str) -> CliResult<String> {
    eprint!("{} ", question);
    std::io::stderr().flush()?;
    let line = tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line).map(|_| line)
    })
    .await??;
    Ok(line.trim().to_string())
}

fn edited_item(spec: &str) -> EditedItem {
    match spec.split_once('=') {
        Some((name, quantity)) => EditedItem {
            name: name.trim().to_string(),
            quantity: Some(quantity.trim().to_string()),
        },
        None => EditedItem {
            name: spec.trim().to_string(),
            quantity: None,
        },
    }
}

async fn analyze(
    app: &App,
    image: Option<PathBuf>,
    text: Option<String>,
    answers: Vec<String>,
    skip: bool,
) -> CliResult<()> {
    let flow = app.analysis_flow();
    let mut step = match (image, text) {
        (Some(path), _) => flow.submit_image(&ImageSource::Path(path)).await,
        (None, Some(text)) => flow.submit_text(&text).await,
        (None, None) => return Err("Provide --image or --text".into()),
    };

    while step == Step::Questions {
        step = if skip {
            flow.skip_questions().await
        } else if !answers.is_empty() {
            flow.submit_answers(&answers).await
        } else {
            let mut collected = Vec::new();
            for question in flow.questions() {
                collected.push(prompt(&question).await?);
            }
            flow.submit_answers(&collected).await
        };
        if !answers.is_empty() && step == Step::Questions {
            break;
        }
    }

    let results = required(flow.results().filter(|_| step == Step::Results), "Analysis")?;
    print_json(&results)
}

async fn chat(app: &App, message: Vec<String>) -> CliResult<()> {
    let mut session = ChatSession::new();
    let message = message.join(" ");

    if !message.trim().is_empty() {
        let reply = required(app.chat(&mut session, &message).await, "Chat")?;
        println!("{}", reply.message);
        for suggestion in reply.quick_replies() {
            println!("  > {}", suggestion);
        }
        return Ok(());
    }

    loop {
        let line = prompt("you:").await?;
        if line.is_empty() || line == "exit" || line == "quit" {
            return Ok(());
        }
        if let Some(reply) = app.chat(&mut session, &line).await {
            println!("coach: {}", reply.message);
            for suggestion in reply.quick_replies() {
                println!("  > {}", suggestion);
            }
        }
    }
}

impl Command {
    /// Commands that work on local files or local state only
    fn is_local(&self) -> bool {
        matches!(
            self,
            Command::ParseRecipe { .. }
                | Command::ParseMealPlan { .. }
                | Command::Render { .. }
                | Command::Health
                | Command::Logout
        )
    }
}

async fn run(command: Command, app: &App) -> CliResult<()> {
    if !command.is_local() && !app.start().await {
        return Err(format!("Backend at {} is offline", app.api().base_url()).into());
    }

    match command {
        Command::ParseRecipe { file } => print_json(&parse_recipe(&read_input(&file).await?)),
        Command::ParseMealPlan { file } => {
            print_json(&parse_meal_plan(&read_input(&file).await?))
        }
        Command::Render { file } => {
            let value: Value = serde_json::from_str(&read_input(&file).await?)?;
            println!("{}", render_safe(&value));
            Ok(())
        }
        Command::Health => {
            if app.test_connection().await {
                println!("online ({})", app.api().base_url());
                Ok(())
            } else {
                Err(format!("Backend at {} is offline", app.api().base_url()).into())
            }
        }
        Command::Logout => {
            app.logout();
            Ok(())
        }
        Command::Login { credential } => {
            let profile = GoogleProfile::from_credential(&credential)?;
            print_json(&required(app.login(&profile).await, "Sign-in")?)
        }
        Command::Whoami => match app.store().user() {
            Some(user) => print_json(&user),
            None => Err("Not signed in".into()),
        },
        Command::Analyze {
            image,
            text,
            answers,
            skip,
        } => analyze(app, image, text, answers, skip).await,
        Command::Reanalyze {
            analysis,
            items,
            clarifications,
        } => {
            let analysis = load_analysis(&analysis).await?;
            let flow = app.analysis_flow();
            flow.show_results(analysis);
            let items = items.iter().map(|s| edited_item(s)).collect();
            flow.apply_edits(items, &clarifications).await;
            print_json(&required(flow.results(), "Reanalysis")?)
        }
        Command::Recipe { analysis } => {
            let analysis = load_analysis(&analysis).await?;
            print_json(&required(app.generate_recipe(&analysis).await, "Recipe")?)
        }
        Command::Swaps { analysis } => {
            let analysis = load_analysis(&analysis).await?;
            print_json(&required(app.healthy_swaps(&analysis).await, "Healthy swaps")?)
        }
        Command::Insights { analysis } => {
            let analysis = load_analysis(&analysis).await?;
            print_json(&required(
                app.nutrition_insights(&analysis).await,
                "Nutrition insights",
            )?)
        }
        Command::MealPlan {
            days,
            meals_per_day,
            cuisine,
            diet,
            calories,
            budget,
        } => {
            let preferences = MealPlanPreferences {
                days,
                meals_per_day,
                cuisine,
                dietary_restrictions: diet,
                calorie_target: calories,
                budget,
            };
            match required(app.meal_plan(&preferences).await, "Meal plan")? {
                MealPlanPayload::Structured(plan) => print_json(&plan),
                MealPlanPayload::Parsed(plan) => print_json(&plan),
            }
        }
        Command::Chat { message } => chat(app, message).await,
        Command::Dashboard => print_json(&required(app.dashboard().await, "Dashboard")?),
        Command::Nutrition { period } => {
            print_json(&required(app.nutrition(period).await, "Nutrition dashboard")?)
        }
        Command::History {
            search,
            from,
            to,
            sort,
        } => {
            let filter = MealFilter {
                search,
                date_from: from,
                date_to: to,
                sort,
            };
            let (meals, stats) = required(app.history(&filter).await, "History")?;
            print_json(&serde_json::json!({ "stats": stats, "meals": meals }))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let cli = Cli::parse();
    let mut builder = App::builder().config(ClientConfig::load()?);
    if let Some(url) = &cli.base_url {
        builder = builder.base_url(url.clone());
    }
    if let Some(path) = &cli.session_file {
        builder = builder.storage_path(path.clone());
    }
    let app = builder.build()?;
    debug!("Using backend {}", app.api().base_url());

    let toasts = ToastPrinter::spawn(app.store());
    let result = run(cli.command, &app).await;
    toasts.finish().await;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn test_toast_printer_keeps_intermediate_toasts() {
        let store = AppStore::default();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let printer = ToastPrinter::with_sink(&store, move |toast: &Toast| {
            sink.lock().unwrap().push(toast.message.clone());
        });

        store.notify("Generating recipe...", ToastKind::Info);
        store.notify("Recipe generated!", ToastKind::Success);
        store.notify("Saved", ToastKind::Info);
        printer.finish().await;

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["Generating recipe...", "Recipe generated!", "Saved"]
        );
    }

    #[tokio::test]
    async fn test_read_input_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recipe.md");
        std::fs::write(&path, "## Upma\n### Ingredients\n- rava").unwrap();

        let content = read_input(&path).await.unwrap();
        assert_eq!(parse_recipe(&content).title, "Upma");
    }

    #[test]
    fn test_edited_item_spec() {
        let item = edited_item(" rice = 1 cup ");
        assert_eq!(item.name, "rice");
        assert_eq!(item.quantity.as_deref(), Some("1 cup"));
        assert_eq!(edited_item("dal").quantity, None);
    }
}
