//! General Discord commands - ping and help.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::Context,
        errors::Result,
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: Context<'_>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: Context<'_>) -> Result<()> {
        let help_text = "**Asset Ledger Help**\n\
        Asset codes can be given as a comma separated list (`AST-001, AST-002`).\n\n\
        **Lifecycle**\n\
        • `/requisition <codes> <employee> [dept] [floor room spot] [form_no]` - Issue in-stock assets.\n\
        • `/borrow <codes> <employee> <days> ...` - Lend in-stock assets for a number of days.\n\
        • `/return <codes> [returned_by] [resignation]` - Bring in-use assets back to stock.\n\
        • `/transfer <codes> <employee> ...` - Move in-use assets to another holder.\n\
        • `/scrap <codes> [reason]` - Write assets off.\n\
        • `/dispose <codes> [reason]` - Clear scrapped assets.\n\
        A batch is applied only when every listed asset is eligible.\n\n\
        **Assets**\n\
        • `/asset add|from_dictionary|info|list|fault` - Register and inspect assets.\n\
        • `/history <code>` - Flow history, newest first.\n\
        • `/dictionary list [search] [project]` - Browse equipment templates.\n\
        • `/contract list|info` - Procurement contracts and their suppliers.\n\n\
        **Reports**\n\
        • `/stagnant [days] [from] [to]` - In-stock assets with no activity.\n\
        • `/dashboard` - Totals, lifespan and scrap candidates.\n\
        • `/rollup <primary> [secondary]` - Category, brand and model rollups.\n\
        • `/purchase_order [order]` - Issued and in-stock counts per purchase order.\n\n\
        • `/ping` - Checks if the bot is responsive.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
