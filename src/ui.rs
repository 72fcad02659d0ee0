use std::io::{self, BufRead, Write};
use std::time::Duration;

use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{Clear, ClearType},
};

use crate::problems::{Category, Problem};
use crate::session::SessionResult;

/// Line-oriented terminal front end: numbered menus, typed answers,
/// re-prompt on bad input. Malformed input never escapes this layer.
#[derive(Default)]
pub struct Terminal;

impl Terminal {
    pub fn new() -> Self {
        Self
    }

    fn read_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        let bytes = io::stdin().lock().read_line(&mut line)?;
        if bytes == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed"));
        }
        Ok(line.trim().to_string())
    }

    pub fn clear(&mut self) -> io::Result<()> {
        execute!(io::stdout(), Clear(ClearType::All), MoveTo(0, 0))
    }

    pub fn message(&mut self, message: &str) {
        println!("{}", message);
    }

    pub fn pause(&mut self, prompt: &str) -> io::Result<()> {
        println!("\n{}", prompt);
        self.read_line().map(|_| ())
    }

    /// Shows numbered options and returns the zero-based selection.
    pub fn menu(&mut self, options: &[&str]) -> io::Result<usize> {
        loop {
            for (i, option) in options.iter().enumerate() {
                println!("{}. {}", i + 1, option);
            }
            print!("\nEnter your choice (1-{}): ", options.len());
            io::stdout().flush()?;

            let input = self.read_line()?;
            match input.parse::<usize>() {
                Ok(choice) if (1..=options.len()).contains(&choice) => return Ok(choice - 1),
                _ => println!("Invalid choice, try again.\n"),
            }
        }
    }

    pub fn prompt_answer(
        &mut self,
        problem: &Problem,
        index: usize,
        total: usize,
    ) -> io::Result<i64> {
        println!("\nProblem {} of {}:", index, total);
        loop {
            print!("{} = ? ", problem.question);
            io::stdout().flush()?;

            let input = self.read_line()?;
            match input.parse::<i64>() {
                Ok(answer) => return Ok(answer),
                Err(_) => println!("Please enter a whole number."),
            }
        }
    }

    pub fn show_results(&mut self, result: &SessionResult) -> io::Result<()> {
        self.clear()?;
        println!("Drill Results:");
        println!("--------------");
        println!("Category: {}", result.category.label());
        println!(
            "Score: {} / {} ({:.1}%)",
            result.correct_count,
            result.total_count,
            result.percent_correct()
        );
        println!("Time: {}", format_duration(result.duration));
        self.pause("Press Enter to continue...")
    }

    pub fn show_history(&mut self, category: Category, results: &[SessionResult]) -> io::Result<()> {
        self.clear()?;
        if results.is_empty() {
            println!("No history available.");
            return self.pause("Press Enter to continue...");
        }

        println!("History for {}:", category.label());
        println!("-------------------");
        for (i, result) in results.iter().enumerate() {
            println!(
                "{}. Score: {}/{} ({:.1}%) - Time: {} - {}",
                i + 1,
                result.correct_count,
                result.total_count,
                result.percent_correct(),
                format_duration(result.duration),
                result.completed_at.format("%b %d, %Y %H:%M")
            );
        }
        self.pause("Press Enter to continue...")
    }
}

/// MM:SS rendering; minutes run past 99 for very long sessions.
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}
