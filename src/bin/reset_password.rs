use std::{error::Error, io::ErrorKind, path::PathBuf, process::exit};

use clap::Parser;
use rusqlite::Connection;

use finboard::{PasswordHash, ValidatedPassword, get_user_by_email, update_password};

/// A utility for setting a new password for a user, looked up by email.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: PathBuf,

    /// The email of the user whose password should be reset.
    #[arg(long)]
    email: String,

    /// The bcrypt cost used to hash the new password.
    #[arg(long, default_value_t = PasswordHash::DEFAULT_COST)]
    cost: u32,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt().init();

    let args = Args::parse();
    if !args.db_path.is_file() {
        eprintln!("No database at {:#?}", args.db_path);
        exit(1);
    }

    let mut conn = Connection::open(&args.db_path)?;
    let user = get_user_by_email(&args.email, &conn).map_err(|error| {
        tracing::error!("could not load user {}: {error}", args.email);
        format!("no user with the email {}", args.email)
    })?;

    println!("Resetting password for {}", user.email);
    let Some(password_hash) = read_new_password(args.cost)? else {
        println!("No password entered, nothing was changed.");
        return Ok(());
    };

    let transaction = conn.transaction()?;
    update_password(&user.email, &password_hash, &transaction)?;
    transaction.commit()?;

    println!("Password updated for {}", user.email);

    Ok(())
}

/// Ask for a new password until it is valid and confirmed, then hash it.
///
/// Returns `Ok(None)` if stdin is closed before a password is confirmed.
fn read_new_password(cost: u32) -> Result<Option<PasswordHash>, Box<dyn Error>> {
    loop {
        let Some(password) = prompt("New password: ")? else {
            return Ok(None);
        };

        let validated = match ValidatedPassword::new(&password) {
            Ok(validated) => validated,
            Err(error) => {
                eprintln!("{error}");
                continue;
            }
        };

        let Some(confirmation) = prompt("Confirm new password: ")? else {
            return Ok(None);
        };
        if confirmation != password {
            eprintln!("The passwords did not match.");
            continue;
        }

        return Ok(Some(PasswordHash::new(validated, cost)?));
    }
}

fn prompt(label: &str) -> Result<Option<String>, std::io::Error> {
    match rpassword::prompt_password(label) {
        Ok(password) => Ok(Some(password)),
        Err(error) if error.kind() == ErrorKind::UnexpectedEof => Ok(None),
        Err(error) => Err(error),
    }
}
