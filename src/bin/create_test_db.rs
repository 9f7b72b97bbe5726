use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime, macros::time};

use expense_tracker::{NewRecord, UserId, count_records, create_record, initialize_db};

/// A utility for creating a test database for the REST API server of expense_tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The user the sample records belong to, as issued by the identity provider.
    #[arg(long, short)]
    user_id: String,

    /// How many days of sample records to create, ending today.
    #[arg(long, short, default_value_t = 30)]
    days: u16,
}

const SAMPLE_EXPENSES: [(&str, f64, &str); 5] = [
    ("Coffee", 4.5, "Food"),
    ("Bus fare", 2.8, "Transportation"),
    ("Groceries", 63.2, "Food"),
    ("Cinema ticket", 18.0, "Entertainment"),
    ("Power bill", 112.75, "Bills"),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    let Some(user_id) = UserId::new(&args.user_id) else {
        eprintln!("User ID must not be empty.");
        exit(1);
    };

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating sample records for {user_id}...");

    let today = OffsetDateTime::now_utc().date();
    for day in 0..args.days {
        let date = today - Duration::days(i64::from(day));
        // Skip some days so that not every day has spending.
        if day % 4 == 3 {
            continue;
        }

        let (text, amount, category) = SAMPLE_EXPENSES[usize::from(day) % SAMPLE_EXPENSES.len()];
        let record = NewRecord {
            text: text.to_owned(),
            amount,
            category: category.to_owned(),
            date: date.with_time(time!(12:00)).assume_utc(),
        };

        create_record(record, &user_id, &conn)?;
    }

    println!("Created {} records.", count_records(&user_id, &conn)?);
    println!("Success!");

    Ok(())
}
