//! Interactive mode for the server.
//!
//! Prompts for bind address, port, and database file before starting the
//! server.

use std::path::PathBuf;

use dialoguer::{Confirm, Input};

use crate::ServerConfig;

/// Prompts for each setting, offering `defaults` as the initial values.
#[must_use]
pub fn prompt_config(defaults: ServerConfig) -> ServerConfig {
    let bind_addr: String = Input::new()
        .with_prompt("Bind address")
        .default(defaults.bind_addr.clone())
        .interact_text()
        .unwrap_or(defaults.bind_addr);

    let port: u16 = Input::new()
        .with_prompt("Port")
        .default(defaults.port)
        .interact_text()
        .unwrap_or(defaults.port);

    let database_path: String = Input::new()
        .with_prompt("Database file")
        .default(defaults.database_path.display().to_string())
        .interact_text()
        .unwrap_or_else(|_| defaults.database_path.display().to_string());

    ServerConfig {
        bind_addr,
        port,
        database_path: PathBuf::from(database_path),
        static_dir: defaults.static_dir,
    }
}

/// Runs the server in interactive mode.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the underlying server fails to
/// start.
#[allow(clippy::future_not_send)]
pub async fn run(defaults: ServerConfig) -> std::io::Result<()> {
    println!("Crime Browser Server");
    println!();

    let config = prompt_config(defaults);

    if !Confirm::new()
        .with_prompt(format!(
            "Start server on {}:{} using {}?",
            config.bind_addr,
            config.port,
            config.database_path.display()
        ))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    super::run_server(config).await
}
