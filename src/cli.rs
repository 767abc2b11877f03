use std::{
    io::{self, Write},
    path::PathBuf,
};

use chrono::NaiveDate;
use clap::{Args, CommandFactory, Parser, Subcommand};

use crate::{
    config::{self, Config},
    constants::{APP_NAME, HABITS},
    domain::{self, checklist, grid, hobby, summary},
    error::{Result, TrackerError},
    keys::{self, Month},
    logging,
    storage::{self, FileStore, KvStore},
};

mod render;

#[derive(Parser, Debug)]
#[command(name = "cherry")]
#[command(about = "Daily checklists, habit minutes and hobby logs", long_about = None)]
pub struct Cli {
    #[arg(long, global = true, help = "Directory holding tracker data")]
    data_dir: Option<PathBuf>,

    #[arg(long, global = true, help = "Path to config.json")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(about = "Today's checklist and this month's minutes")]
    Dashboard,

    #[command(subcommand, about = "Manage the daily checklist")]
    Check(CheckCommand),

    #[command(subcommand, about = "Monthly minutes per habit")]
    Grid(GridCommand),

    #[command(subcommand, about = "Log time spent on hobbies")]
    Hobby(HobbyCommand),

    #[command(about = "Per-habit totals and daily averages for a month")]
    Summary {
        #[command(flatten)]
        month: MonthArgs,
    },

    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(help = "Shell type (bash, zsh, fish)")]
        shell: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    #[command(about = "Show the checklist for a day")]
    List {
        #[command(flatten)]
        date: DateArgs,
    },

    #[command(about = "Add an item to the checklist")]
    Add {
        #[arg(help = "Item text")]
        text: String,
    },

    #[command(about = "Remove an item from the checklist")]
    Remove {
        #[arg(help = "Item text")]
        text: String,
    },

    #[command(about = "Mark an item done for a day")]
    Done {
        #[arg(help = "Item text")]
        item: String,

        #[arg(long, help = "Mark the item not done instead")]
        undo: bool,

        #[command(flatten)]
        date: DateArgs,
    },

    #[command(about = "Clear the checklist for a day")]
    Clear {
        #[command(flatten)]
        date: DateArgs,
    },
}

#[derive(Subcommand, Debug)]
pub enum GridCommand {
    #[command(about = "Show the month as a bar grid")]
    Show {
        #[command(flatten)]
        month: MonthArgs,

        #[arg(long, help = "Minutes that fill a bar")]
        max: Option<u32>,
    },

    #[command(about = "Set minutes for a habit on a day (0 clears)")]
    Set {
        #[arg(help = "Habit name")]
        habit: String,

        #[arg(help = "Day of month")]
        day: u32,

        #[arg(help = "Minutes", allow_negative_numbers = true)]
        minutes: i64,

        #[command(flatten)]
        month: MonthArgs,
    },

    #[command(about = "Clear all minutes for a month")]
    Clear {
        #[command(flatten)]
        month: MonthArgs,
    },

    #[command(about = "Export a month as CSV")]
    Export {
        #[command(flatten)]
        month: MonthArgs,

        #[arg(long, short, help = "Output path", conflicts_with = "stdout")]
        out: Option<PathBuf>,

        #[arg(long, help = "Write CSV to stdout")]
        stdout: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum HobbyCommand {
    #[command(about = "Show hobby entries for a day")]
    List {
        #[command(flatten)]
        date: DateArgs,
    },

    #[command(about = "Log a hobby entry")]
    Add {
        #[arg(help = "Hobby type")]
        kind: String,

        #[arg(help = "Minutes spent", allow_negative_numbers = true)]
        mins: i64,

        #[arg(long, short, default_value = "", help = "Optional note")]
        note: String,

        #[command(flatten)]
        date: DateArgs,
    },

    #[command(about = "Delete a hobby entry by its index")]
    Remove {
        #[arg(help = "Entry index as shown by `hobby list`")]
        index: usize,

        #[command(flatten)]
        date: DateArgs,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct DateArgs {
    #[arg(long, value_parser = keys::parse_date, help = "Date as YYYY-MM-DD (default: today)")]
    date: Option<NaiveDate>,
}

impl DateArgs {
    fn resolve(&self) -> NaiveDate {
        self.date.unwrap_or_else(keys::today)
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct MonthArgs {
    #[arg(long, help = "Year (default: current)")]
    year: Option<i32>,

    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12), help = "Month 1-12 (default: current)")]
    month: Option<u32>,
}

impl MonthArgs {
    fn resolve(&self) -> Result<Month> {
        let current = Month::current()?;
        let year = self.year.unwrap_or(current.year);
        let month0 = self.month.map(|m| m - 1).unwrap_or(current.month0);
        Month::new(year, month0)
    }
}

pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

pub fn dashboard(store: &dyn KvStore) -> Result<()> {
    let today = keys::today();
    let items = checklist::get_items(store);
    let day = checklist::get_day(store, today);

    if day.is_empty() {
        println!("Checklist {}", keys::today_key());
        println!("No checklist yet for today.");
    } else {
        print_lines(&render::checklist_lines(today, &items, &day));
    }

    let month = Month::of(today)?;
    let record = grid::get_month(store, month);
    println!();
    println!(
        "{} this month ({})",
        render::format_minutes(summary::month_total(&record)),
        month
    );

    let hobbies = hobby::get_day(store, today);
    if !hobbies.is_empty() {
        println!(
            "{} hobby entries today, {}",
            hobbies.len(),
            render::format_minutes(hobbies.total_minutes())
        );
    }
    Ok(())
}

pub fn run_check(store: &mut dyn KvStore, command: CheckCommand) -> Result<()> {
    match command {
        CheckCommand::List { date } => {
            let date = date.resolve();
            let items = checklist::get_items(store);
            let day = checklist::get_day(store, date);
            print_lines(&render::checklist_lines(date, &items, &day));
        }
        CheckCommand::Add { text } => {
            let items = checklist::add_item(store, &text)?;
            println!("Added '{}' ({} items)", text.trim(), items.len());
        }
        CheckCommand::Remove { text } => {
            let before = checklist::get_items(store).len();
            let items = checklist::remove_item(store, &text)?;
            if items.len() < before {
                println!("Removed '{}'", text);
            } else {
                println!("'{}' is not on the checklist", text);
            }
        }
        CheckCommand::Done { item, undo, date } => {
            let date = date.resolve();
            let items = checklist::get_items(store);
            if !items.contains(&item) {
                return Err(TrackerError::UnknownChecklistItem(item));
            }
            let day = checklist::toggle(store, date, &item, !undo)?;
            print_lines(&render::checklist_lines(date, &items, &day));
        }
        CheckCommand::Clear { date } => {
            let date = date.resolve();
            checklist::clear_day(store, date)?;
            println!("Cleared checklist for {}", date);
        }
    }
    Ok(())
}

pub fn run_grid(store: &mut dyn KvStore, config: &Config, command: GridCommand) -> Result<()> {
    match command {
        GridCommand::Show { month, max } => {
            let month = month.resolve()?;
            let max_minutes = max.unwrap_or(config.max_minutes);
            if max_minutes == 0 {
                return Err(TrackerError::Config(
                    "--max must be greater than zero".to_string(),
                ));
            }
            let record = grid::get_month(store, month);
            print_lines(&render::grid_lines(&record, month, max_minutes));
            if record.is_empty() {
                println!("No minutes logged for {}", month);
            } else {
                println!("{} logged cells", record.len());
            }
        }
        GridCommand::Set {
            habit,
            day,
            minutes,
            month,
        } => {
            let month = month.resolve()?;
            let habit = domain::resolve_habit(&habit)?;
            let record = grid::set_minutes(store, month, habit, day, minutes)?;
            println!(
                "{} on {}-{:02}: {}",
                habit,
                month,
                day,
                render::format_minutes(record.get(habit, day) as u64)
            );
        }
        GridCommand::Clear { month } => {
            let month = month.resolve()?;
            grid::clear_month(store, month)?;
            println!("Cleared all minutes for {}", month);
        }
        GridCommand::Export { month, out, stdout } => {
            let month = month.resolve()?;
            let rows = grid::export_rows(store, month);

            if stdout {
                let mut handle = io::stdout().lock();
                grid::write_csv(&rows, &mut handle)?;
                handle.flush().map_err(|e| TrackerError::io("<stdout>", e))?;
                return Ok(());
            }

            let path = out.unwrap_or_else(|| PathBuf::from(grid::export_file_name(month)));
            let mut buffer = Vec::new();
            grid::write_csv(&rows, &mut buffer)?;
            let text = String::from_utf8_lossy(&buffer);
            storage::write_text_file(&path, &text)?;
            println!("Exported {} habits to {}", HABITS.len(), path.display());
        }
    }
    Ok(())
}

pub fn run_hobby(store: &mut dyn KvStore, command: HobbyCommand) -> Result<()> {
    match command {
        HobbyCommand::List { date } => {
            let date = date.resolve();
            print_lines(&render::hobby_lines(date, &hobby::get_day(store, date)));
        }
        HobbyCommand::Add {
            kind,
            mins,
            note,
            date,
        } => {
            let date = date.resolve();
            let log = hobby::add_entry(store, date, &kind, mins, &note)?;
            print_lines(&render::hobby_lines(date, &log));
        }
        HobbyCommand::Remove { index, date } => {
            let date = date.resolve();
            match hobby::remove_entry(store, date, index)? {
                Some(entry) => println!(
                    "Deleted {} ({}) from {}",
                    entry.kind,
                    render::format_minutes(entry.mins as u64),
                    date
                ),
                None => println!("No entry at index {} on {}", index, date),
            }
        }
    }
    Ok(())
}

pub fn run_summary(store: &dyn KvStore, month: MonthArgs) -> Result<()> {
    let month = month.resolve()?;
    let record = grid::get_month(store, month);
    print_lines(&render::summary_lines(
        month,
        &summary::summarize(&record, month),
    ));
    Ok(())
}

pub fn print_completions(shell: &str) -> Result<()> {
    use clap_complete::Shell;
    let shell = match shell {
        "bash" => Shell::Bash,
        "zsh" => Shell::Zsh,
        "fish" => Shell::Fish,
        _ => {
            return Err(TrackerError::Config(format!(
                "Unsupported shell: {}. Use bash, zsh, or fish.",
                shell
            )));
        }
    };
    clap_complete::generate(shell, &mut Cli::command(), APP_NAME, &mut io::stdout());
    Ok(())
}

fn execute(cli: Cli) -> Result<()> {
    if let Command::Completions { shell } = &cli.command {
        return print_completions(shell);
    }

    let mut config = config::load_config(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = Some(dir);
    }
    logging::init_logging(&config.log_level);

    let mut store = FileStore::open(config.resolve_data_dir())?;
    tracing::debug!(data_dir = %store.root().display(), "resolved data directory");

    match cli.command {
        Command::Dashboard => dashboard(&store),
        Command::Check(command) => run_check(&mut store, command),
        Command::Grid(command) => run_grid(&mut store, &config, command),
        Command::Hobby(command) => run_hobby(&mut store, command),
        Command::Summary { month } => run_summary(&store, month),
        Command::Completions { .. } => Ok(()),
    }
}

pub fn run_cli() {
    let cli = Cli::parse();
    if let Err(e) = execute(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
