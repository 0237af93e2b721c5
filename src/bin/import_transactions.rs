use std::{error::Error, fs, path::Path, process::exit};

use clap::Parser;
use rusqlite::Connection;

use finboard::{import_transactions, initialize_db, parse_records};

/// A utility for loading transactions from a JSON file into the database.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// File path to a JSON array of transactions.
    #[arg(long)]
    json: String,

    /// Delete all existing transactions before importing.
    #[arg(long)]
    clear: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt().init();

    let args = Args::parse();

    let json_path = Path::new(&args.json);
    if !json_path.is_file() {
        eprintln!("File does not exist at {json_path:#?}!");
        exit(1);
    }

    println!("Reading transactions from {json_path:#?}");
    let records = parse_records(&fs::read_to_string(json_path)?)?;

    let conn = Connection::open(&args.db_path)?;
    initialize_db(&conn)?;

    let count = import_transactions(records, args.clear, &conn)?;
    println!("Successfully inserted {count} transactions");

    Ok(())
}
