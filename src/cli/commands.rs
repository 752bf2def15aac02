// src/cli/commands.rs
use anyhow::{bail, Context};
use clap::Subcommand;
use console::style;

use crate::core::AppState;
use crate::mailer::OutboundMail;
use crate::models::{UserFilter, UserUpdate};
use crate::utils;

#[derive(Subcommand, Debug, Clone)]
pub enum CliCommand {
    /// List registered users, optionally filtered by a name substring
    ListUsers {
        pattern: Option<String>,
    },
    /// Promote a pending registration to blog,edit
    ConfirmUser {
        username: String,
    },
    /// Reset a user's password and e-mail the new one
    ResetPassword {
        username: String,
    },
    /// Delete a user account
    DeleteUser {
        username: String,
    },
}

pub async fn run(command: &CliCommand, state: &AppState) -> anyhow::Result<()> {
    match command {
        CliCommand::ListUsers { pattern } => list_users(state, pattern.as_deref()).await,
        CliCommand::ConfirmUser { username } => confirm_user(state, username).await,
        CliCommand::ResetPassword { username } => reset_password(state, username).await,
        CliCommand::DeleteUser { username } => delete_user(state, username).await,
    }
}

pub async fn list_users(state: &AppState, pattern: Option<&str>) -> anyhow::Result<()> {
    let filter = UserFilter {
        username_pattern: pattern.map(String::from),
        offset: 0,
        limit: 100,
        ..Default::default()
    };
    let users = state
        .db
        .get_filtered_users(&filter)
        .await
        .context("listing users")?;

    if users.is_empty() {
        println!("{}", style("No matching users.").yellow());
        return Ok(());
    }

    println!(
        "{:<6} {:<24} {:<32} {}",
        style("id").bold(),
        style("username").bold(),
        style("email").bold(),
        style("auth").bold()
    );
    for user in &users {
        println!(
            "{:<6} {:<24} {:<32} {}",
            user.id,
            utils::truncate_string(&user.username, 24),
            utils::truncate_string(&user.email, 32),
            user.auth
        );
    }
    println!("{} user(s)", users.len());
    Ok(())
}

async fn find_user(state: &AppState, username: &str) -> anyhow::Result<crate::models::UserRecord> {
    match state.db.find_user_by_username(username).await? {
        Some(user) => Ok(user),
        None => bail!("no account named '{}'", username),
    }
}

pub async fn confirm_user(state: &AppState, username: &str) -> anyhow::Result<()> {
    let user = find_user(state, username).await?;
    let update = UserUpdate {
        auth: Some("blog,edit".to_string()),
        ..Default::default()
    };
    state
        .db
        .update_user(user.id, &update)
        .await
        .context("confirming user")?;
    println!("{} '{}' confirmed", style("OK").green(), username);
    Ok(())
}

pub async fn reset_password(state: &AppState, username: &str) -> anyhow::Result<()> {
    let user = find_user(state, username).await?;

    let new_password = utils::random_password(10);
    let hash = state
        .auth
        .hash_password(&new_password)
        .map_err(|e| anyhow::anyhow!("hashing password: {}", e))?;
    state
        .db
        .set_password_hash(user.id, &hash)
        .await
        .context("storing password")?;

    let mail = OutboundMail::to_one(
        &user.email,
        &format!("[FamilyTree] New password for {}", user.username),
        &format!(
            "<p>The password on account '{}' has been reset to:</p>\
             <p><b>{}</b></p>",
            user.username, new_password
        ),
    );
    let sent = state.mailer.send(&mail).await?;

    if sent {
        println!(
            "{} new password e-mailed to {}",
            style("OK").green(),
            user.email
        );
    } else {
        // no relay configured, so the operator needs the password here
        println!(
            "{} no mail relay; new password for '{}' is: {}",
            style("NOTE").yellow(),
            username,
            new_password
        );
    }
    Ok(())
}

pub async fn delete_user(state: &AppState, username: &str) -> anyhow::Result<()> {
    let user = find_user(state, username).await?;
    state
        .db
        .delete_user(user.id)
        .await
        .context("deleting user")?;
    println!("{} '{}' deleted", style("OK").green(), username);
    Ok(())
}
