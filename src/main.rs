mod history;
mod problems;
mod session;
mod ui;

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;

use history::{FileStore, HistoryStore};
use problems::{generator_for, Category};
use session::{Session, SessionResult};
use ui::Terminal;

const TOTAL_PROBLEMS: usize = 20;
const DIGIT_BOUND: u32 = 2;
const FACTOR_BOUND: i64 = 12;
const DATA_DIR_NAME: &str = "mathdrill";

#[derive(Parser)]
#[command(name = "mathdrill")]
#[command(about = "A terminal math drill game with per-category score history")]
#[command(version)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one quiz for a category and save the score
    Play {
        /// Category: addition, subtraction, multiplication, division
        category: String,

        /// Number of problems in the run
        #[arg(long, short, default_value_t = TOTAL_PROBLEMS)]
        count: usize,
    },

    /// Show saved results for a category
    History {
        /// Category: addition, subtraction, multiplication, division
        category: String,

        /// Maximum entries to show (0 = all stored)
        #[arg(long, short, default_value_t = 10)]
        limit: usize,
    },

    /// List playable categories
    Categories,
}

// JSON output wrapper for CLI
#[derive(Debug, Serialize)]
struct JsonOutput<T: Serialize> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T: Serialize> JsonOutput<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

fn data_dir() -> PathBuf {
    if let Ok(path) = std::env::var("MATHDRILL_DIR") {
        return PathBuf::from(path);
    }

    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DATA_DIR_NAME)
}

fn parse_category(input: &str) -> Result<Category, String> {
    Category::from_str(input).ok_or_else(|| {
        format!(
            "unknown category '{}'; use addition, subtraction, multiplication, or division",
            input
        )
    })
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let store = FileStore::new(data_dir())?;

    match cli.command {
        Some(Commands::Play { category, count }) => {
            let category = parse_category(&category)?;
            let mut terminal = Terminal::new();
            let result = play_round(&mut terminal, category, count)?;
            store.save_result(&result)?;
            terminal.show_results(&result)?;
        }

        Some(Commands::History { category, limit }) => match parse_category(&category) {
            Ok(category) => {
                let results = store.get_results(category, limit)?;
                if cli.json {
                    println!("{}", serde_json::to_string(&JsonOutput::ok(&results))?);
                } else if results.is_empty() {
                    println!("No history available for {}.", category.label());
                } else {
                    print_history_table(category, &results);
                }
            }
            Err(e) if cli.json => {
                println!("{}", serde_json::to_string(&JsonOutput::<()>::err(e))?);
            }
            Err(e) => return Err(e.into()),
        },

        Some(Commands::Categories) => {
            if cli.json {
                let keys: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
                println!("{}", serde_json::to_string(&JsonOutput::ok(keys))?);
            } else {
                println!("{:<16} KEY", "CATEGORY");
                println!("{}", "-".repeat(28));
                for category in Category::ALL {
                    println!("{:<16} {}", category.label(), category.as_str());
                }
            }
        }

        None => {
            let mut terminal = Terminal::new();
            menu_loop(&mut terminal, &store)?;
        }
    }

    Ok(())
}

fn menu_loop(terminal: &mut Terminal, store: &dyn HistoryStore) -> Result<(), Box<dyn Error>> {
    terminal.clear()?;
    println!("Welcome to Math Drill!");
    println!("======================");
    println!("Practice your math skills with timed challenges!");

    loop {
        println!();
        let mut options: Vec<String> = Category::ALL
            .iter()
            .map(|c| format!("Play {}", c.label()))
            .collect();
        options.extend(
            Category::ALL
                .iter()
                .map(|c| format!("View {} History", c.label())),
        );
        options.push("Exit".to_string());
        let option_refs: Vec<&str> = options.iter().map(String::as_str).collect();

        match terminal.menu(&option_refs)? {
            choice @ 0..=3 => {
                let category = Category::ALL[choice];
                let result = play_round(terminal, category, TOTAL_PROBLEMS)?;
                if let Err(e) = store.save_result(&result) {
                    terminal.message(&format!("Failed to save result: {}", e));
                }
                terminal.show_results(&result)?;
            }
            choice @ 4..=7 => {
                let category = Category::ALL[choice - 4];
                let results = store.get_results(category, history::MAX_LOG_ENTRIES)?;
                terminal.show_history(category, &results)?;
            }
            _ => {
                println!("Thanks for playing!");
                return Ok(());
            }
        }
    }
}

fn play_round(
    terminal: &mut Terminal,
    category: Category,
    count: usize,
) -> Result<SessionResult, Box<dyn Error>> {
    let mut generator = generator_for(category, DIGIT_BOUND, FACTOR_BOUND)?;

    terminal.clear()?;
    println!("Starting {} Drill", generator.name());
    println!("You will be given {} problems to solve.", count);
    terminal.pause("Press Enter to start...")?;

    let mut session = Session::new(generator.as_ref(), count);
    session.start();

    for i in 0..count {
        let problem = generator.generate();
        let answer = terminal.prompt_answer(&problem, i + 1, count)?;

        let correct = answer == problem.answer;
        session.record_answer(correct);

        if correct {
            terminal.message("Correct!");
        } else {
            terminal.message(&format!(
                "Incorrect. The correct answer is {}.",
                problem.answer
            ));
        }
    }

    session.end();
    Ok(session.result())
}

fn print_history_table(category: Category, results: &[SessionResult]) {
    println!("History for {}:", category.label());
    println!(
        "{:<4} {:<8} {:<8} {:<7} COMPLETED",
        "#", "SCORE", "PERCENT", "TIME"
    );
    println!("{}", "-".repeat(50));
    for (i, result) in results.iter().enumerate() {
        println!(
            "{:<4} {:<8} {:<8} {:<7} {}",
            i + 1,
            format!("{}/{}", result.correct_count, result.total_count),
            format!("{:.1}%", result.percent_correct()),
            ui::format_duration(result.duration),
            result.completed_at.format("%b %d, %Y %H:%M")
        );
    }
}
