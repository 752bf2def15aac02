// src/cli/menu.rs
use console::style;
use inquire::{Confirm, Select, Text};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::commands;
use crate::core::AppState;

const MENU_ITEMS: [&str; 5] = [
    "List users",
    "Confirm a registration",
    "Reset a password",
    "Delete a user",
    "Quit",
];

/// Interactive administrator menu; runs until Quit or Ctrl+C.
pub async fn run_cli_menu(state: AppState, should_exit: Arc<AtomicBool>) -> anyhow::Result<()> {
    println!(
        "{}",
        style("FamilyTree administration").bold().underlined()
    );

    while !should_exit.load(Ordering::SeqCst) {
        let choice = match Select::new("Action:", MENU_ITEMS.to_vec()).prompt() {
            Ok(choice) => choice,
            Err(_) => break, // Esc / Ctrl+C in the prompt
        };

        let result = match choice {
            "List users" => {
                let pattern = Text::new("Name pattern (empty for all):")
                    .prompt()
                    .unwrap_or_default();
                let pattern = pattern.trim();
                let pattern = (!pattern.is_empty()).then_some(pattern);
                commands::list_users(&state, pattern).await
            }
            "Confirm a registration" => match Text::new("Username:").prompt() {
                Ok(username) if !username.trim().is_empty() => {
                    commands::confirm_user(&state, username.trim()).await
                }
                _ => Ok(()),
            },
            "Reset a password" => match Text::new("Username:").prompt() {
                Ok(username) if !username.trim().is_empty() => {
                    commands::reset_password(&state, username.trim()).await
                }
                _ => Ok(()),
            },
            "Delete a user" => match Text::new("Username:").prompt() {
                Ok(username) if !username.trim().is_empty() => {
                    let username = username.trim().to_string();
                    let confirmed = Confirm::new(&format!("Really delete '{}'?", username))
                        .with_default(false)
                        .prompt()
                        .unwrap_or(false);
                    if confirmed {
                        commands::delete_user(&state, &username).await
                    } else {
                        Ok(())
                    }
                }
                _ => Ok(()),
            },
            _ => break,
        };

        if let Err(e) = result {
            println!("{} {}", style("Error:").red(), e);
        }
    }

    Ok(())
}
