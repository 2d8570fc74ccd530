//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `catalog_core` linkage.
//! - Confirm storage bootstrap by migrating an in-memory store and writing
//!   one entry, with core logging active.

use catalog_core::db::migrations::current_user_version;
use catalog_core::db::open_db_in_memory;
use catalog_core::{default_log_level, init_logging, SqliteTipoRepository, TipoService};
use std::process::ExitCode;

const LOG_DIR_NAME: &str = "catalog_cli_logs";

fn main() -> ExitCode {
    println!("catalog_core ping={}", catalog_core::ping());
    println!("catalog_core version={}", catalog_core::core_version());

    let log_dir = std::env::temp_dir().join(LOG_DIR_NAME);
    match log_dir.to_str().map(|dir| init_logging(default_log_level(), dir)) {
        Some(Ok(())) => println!("catalog_core log_dir={}", log_dir.display()),
        Some(Err(err)) => eprintln!("catalog_core logging_error={err}"),
        None => eprintln!("catalog_core logging_error=log dir is not valid UTF-8"),
    }

    match probe_store() {
        Ok((schema_version, rows)) => {
            println!("catalog_core schema_version={schema_version}");
            println!("catalog_core tipos={rows}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("catalog_core store_probe_error={err}");
            ExitCode::FAILURE
        }
    }
}

fn probe_store() -> Result<(u32, u64), Box<dyn std::error::Error>> {
    let conn = open_db_in_memory()?;
    let schema_version = current_user_version(&conn)?;
    let service = TipoService::new(SqliteTipoRepository::try_new(&conn)?);
    service.create_tipo("smoke", "catalog_cli")?;
    Ok((schema_version, service.count()?))
}
