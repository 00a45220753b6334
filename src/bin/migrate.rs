use anyhow::{Result, anyhow};
use lottery_bot::config::database_url_from_env;
use lottery_bot::database::connection::{sqlite_file_path, DatabaseManager};
use std::env;
use std::io;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize basic logging for the migration
    env_logger::init();
    
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("migrate");
    
    match command {
        "migrate" | "up" => run_migrations().await,
        "check" => check_database().await,
        "reset" => reset_database().await,
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        _ => {
            eprintln!("Unknown command: {command}");
            print_help();
            std::process::exit(1);
        }
    }
}

async fn run_migrations() -> Result<()> {
    println!("🎁 Lottery Bot - Database Migration Tool");
    println!("========================================");
    
    // Only the database location is needed here, not the bot token
    dotenvy::dotenv().ok();
    let database_url = database_url_from_env();
    
    println!("📊 Database URL: {}", mask_url(&database_url));
    println!("🚀 Running database migrations...");
    
    // Creates the data directory and the SQLite file when missing
    let db_manager = DatabaseManager::new(&database_url).await
        .map_err(|e| anyhow!("Failed to connect to database: {}", e))?;
    
    match db_manager.run_migrations().await {
        Ok(_) => {
            println!("✅ Migrations completed successfully!");
            println!("\n🎯 Your Lottery Bot database is ready!");
        }
        Err(e) => {
            eprintln!("❌ Migration failed: {e}");
            std::process::exit(1);
        }
    }
    
    Ok(())
}

async fn check_database() -> Result<()> {
    println!("🔍 Checking database connection and schema...");
    
    dotenvy::dotenv().ok();
    let database_url = database_url_from_env();
    
    println!("📊 Database URL: {}", mask_url(&database_url));
    
    let db_manager = DatabaseManager::new(&database_url).await
        .map_err(|e| anyhow!("Failed to connect to database: {}", e))?;
    
    match db_manager.table_names().await {
        Ok(tables) => {
            println!("✅ Database connection successful!");
            println!("📋 Found tables:");
            for table in tables {
                println!("  • {table}");
            }
        }
        Err(e) => {
            println!("⚠️  Database check failed: {e}");
            println!("💡 Try running 'migrate up' to create the schema");
        }
    }
    
    Ok(())
}

async fn reset_database() -> Result<()> {
    println!("⚠️  WARNING: This will delete ALL data in the database!");
    println!("🤔 Are you sure you want to continue? (yes/no)");
    
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    
    if input.trim().to_lowercase() != "yes" {
        println!("❌ Reset cancelled.");
        return Ok(());
    }
    
    dotenvy::dotenv().ok();
    let database_url = database_url_from_env();
    
    // For SQLite, we can just delete the file
    match sqlite_file_path(&database_url) {
        Some(db_path) => {
            if db_path.exists() {
                std::fs::remove_file(db_path)?;
                println!("🗑️  Deleted database file: {}", db_path.display());
            }
        }
        None => return Err(anyhow!("Reset is only supported for file-backed SQLite databases")),
    }
    
    // Run migrations to recreate the schema
    println!("🔄 Recreating database schema...");
    run_migrations().await?;
    
    println!("✅ Database reset completed!");
    
    Ok(())
}

fn mask_url(url: &str) -> String {
    // Don't show full paths in production logs
    match sqlite_file_path(url).and_then(|path| path.file_name()) {
        Some(filename) => format!("sqlite:.../{}", filename.to_string_lossy()),
        None => url.to_string(),
    }
}

fn print_help() {
    println!("🎁 Lottery Bot - Database Migration Tool");
    println!();
    println!("USAGE:");
    println!("    migrate [COMMAND]");
    println!();
    println!("COMMANDS:");
    println!("    migrate, up    Run database migrations (default)");
    println!("    check          Check database connection and schema");
    println!("    reset          Reset database (SQLite only) - DESTRUCTIVE!");
    println!("    help           Show this help message");
    println!();
    println!("ENVIRONMENT:");
    println!("    DATABASE_URL   Database connection string (default: sqlite:./data/lotteries.db)");
    println!();
    println!("EXAMPLES:");
    println!("    migrate                    # Run migrations");
    println!("    migrate check              # Check database status");
    println!("    migrate reset              # Reset database (careful!)");
    println!();
}
