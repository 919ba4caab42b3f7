//! # Seed Data Generator
//!
//! Creates an admin account and the starter catalog for development.
//!
//! ## Usage
//! ```bash
//! # Admin credentials from the environment (or .env)
//! SEED_ADMIN_EMAIL=admin@newworld.local SEED_ADMIN_PASSWORD=changeme123 \
//!     cargo run -p newworld-api --bin seed
//!
//! # Custom database and stock level
//! cargo run -p newworld-api --bin seed -- --db ./data/newworld.db --quantity 50
//! ```
//!
//! ## What It Writes
//! - One `admin` user (`SEED_ADMIN_USERNAME`, default `admin`), skipped if
//!   the e-mail is already registered
//! - The seven catalog offers, each with `--quantity` units (default 20),
//!   upserted by name so re-running resets their stock

use std::env;

use newworld_api::password::hash_password;
use newworld_core::supplies::starter_catalog;
use newworld_core::validation::validate_registration;
use newworld_core::Role;
use newworld_db::{Database, DbConfig, NewUser};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let args: Vec<String> = env::args().collect();

    let mut quantity: i64 = 20;
    let mut db_path = env::var("DATABASE_PATH").unwrap_or_else(|_| "./newworld.db".to_string());

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--quantity" | "-q" => {
                if i + 1 < args.len() {
                    quantity = args[i + 1].parse().unwrap_or(20);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("New World Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -q, --quantity <N>  Stock per offer (default: 20)");
                println!("  -d, --db <PATH>     Database file path (default: $DATABASE_PATH or ./newworld.db)");
                println!("  -h, --help          Show this help message");
                println!();
                println!("Environment:");
                println!("  SEED_ADMIN_EMAIL, SEED_ADMIN_PASSWORD (required), SEED_ADMIN_USERNAME");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 New World Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!("Quantity: {}", quantity);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Admin account
    let email = env::var("SEED_ADMIN_EMAIL").map_err(|_| "SEED_ADMIN_EMAIL is not set")?;
    let password = env::var("SEED_ADMIN_PASSWORD").map_err(|_| "SEED_ADMIN_PASSWORD is not set")?;
    let username = env::var("SEED_ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());

    validate_registration(&username, &email, &password)?;

    if db.users().get_by_email(&email).await?.is_some() {
        println!("⚠ {} is already registered, leaving it unchanged", email);
    } else {
        let password_hash = hash_password(password).await?;
        let admin = db
            .users()
            .create(&NewUser {
                username,
                email,
                password_hash,
                role: Role::Admin,
            })
            .await?;
        println!("✓ Admin created (id {})", admin.id);
    }

    // Catalog
    let offers = db.offers().upsert_many(&starter_catalog(quantity)).await?;
    for offer in &offers {
        println!("  {:<12} {:>4} × {}", offer.name, offer.quantity, offer.price());
    }
    println!("✓ {} offers written", offers.len());

    db.close().await;
    Ok(())
}
