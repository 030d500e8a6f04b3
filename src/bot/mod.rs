//! Bot layer - Discord-specific interface and command handlers
//!
//! This module exposes the ledger to operators through slash commands. Commands are
//! thin: they parse arguments, build an [`Operator`] from the invoking user and call
//! into `core`.

/// Discord command implementations (assets, operations, reports, dictionary, general)
pub mod commands;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;

use crate::{
    config::{catalog::LedgerSettings, operators},
    core::operation::Operator,
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use tracing::{error, info, instrument};

/// Shared data available to all bot commands.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Ledger tunables from config.toml
    pub settings: LedgerSettings,
}

impl BotData {
    /// Creates a new `BotData` instance.
    #[must_use]
    pub const fn new(database: DatabaseConnection, settings: LedgerSettings) -> Self {
        Self { database, settings }
    }
}

/// Poise context used by every command
pub type Context<'a> = poise::Context<'a, BotData, Error>;

/// Builds the operator for the invoking user.
///
/// The display name comes from the `OPERATOR_NAME_<n>` mapping when the user id is
/// configured, otherwise from the Discord username.
#[must_use]
pub fn operator_for(ctx: Context<'_>) -> Operator {
    let author = ctx.author();
    let id = author.id.to_string();
    let name = operators::get_operator_name(&id).unwrap_or_else(|| author.name.clone());
    Operator { name, id: Some(id) }
}

fn is_code_separator(c: char) -> bool {
    c == ',' || c == '，' || c.is_whitespace()
}

/// Splits a comma or whitespace separated list of asset codes.
#[must_use]
pub fn parse_codes(input: &str) -> Vec<String> {
    input
        .split(is_code_separator)
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_string)
        .collect()
}

/// Splits a partially typed code list into the text up to and including its last
/// separator and the code still being typed.
#[must_use]
pub fn split_last_code(partial: &str) -> (&str, &str) {
    match partial.char_indices().rev().find(|&(_, c)| is_code_separator(c)) {
        Some((index, c)) => partial.split_at(index + c.len_utf8()),
        None => ("", partial),
    }
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {:?}", ctx.command().name, error);
            if let Err(e) = ctx.say(format!("❌ {error}")).await {
                error!("Failed to send error message: {}", e);
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

/// Connects to Discord and serves commands until the client stops.
#[instrument(skip_all)]
pub async fn run_bot(token: String, data: BotData) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::ping(),
                commands::help(),
                commands::asset(),
                commands::requisition(),
                commands::borrow(),
                commands::return_assets(),
                commands::transfer(),
                commands::scrap(),
                commands::dispose(),
                commands::history(),
                commands::stagnant(),
                commands::dashboard(),
                commands::rollup(),
                commands::dictionary(),
                commands::contract(),
                commands::purchase_order(),
            ],
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();

    info!("Starting Discord client...");
    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await?;
    client.start().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_codes() {
        assert_eq!(
            parse_codes("AST-001, AST-002，AST-003  AST-004,,"),
            vec!["AST-001", "AST-002", "AST-003", "AST-004"]
        );
        assert!(parse_codes("  ,  ").is_empty());
    }

    #[test]
    fn test_split_last_code_uses_every_separator() {
        assert_eq!(split_last_code("AST-0"), ("", "AST-0"));
        assert_eq!(split_last_code("AST-001,AST-0"), ("AST-001,", "AST-0"));
        assert_eq!(split_last_code("AST-001，AST-0"), ("AST-001，", "AST-0"));
        assert_eq!(split_last_code("AST-001 AST-0"), ("AST-001 ", "AST-0"));
        assert_eq!(split_last_code("AST-001, "), ("AST-001, ", ""));

        let (prefix, current) = split_last_code("AST-001，AST-002 AST-0");
        let mut codes = parse_codes(prefix);
        codes.push(current.to_string());
        assert_eq!(codes, vec!["AST-001", "AST-002", "AST-0"]);
    }
}
