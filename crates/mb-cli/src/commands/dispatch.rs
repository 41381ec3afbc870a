use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Chapter { action } => commands::chapter::handle(&action, ctx, flags).await,
        Commands::Mentor { action } => commands::mentor::handle(&action, ctx, flags).await,
        Commands::Student { action } => commands::student::handle(&action, ctx, flags).await,
        Commands::Assign(args) => commands::assignment::handle_assign(&args, ctx, flags).await,
        Commands::Unassign(args) => commands::assignment::handle_unassign(&args, ctx, flags).await,
        Commands::Session { action } => commands::session::handle(&action, ctx, flags).await,
        Commands::Report { action } => commands::report::handle(&action, ctx, flags).await,
        Commands::Attendance(args) => commands::attendance::handle(&args, ctx, flags).await,
        Commands::Goal { action } => commands::goal::handle(&action, ctx, flags).await,
        Commands::Term { action } => commands::term::handle(&action, ctx, flags).await,
        Commands::Compliance { action } => commands::compliance::handle(&action, ctx, flags).await,
        Commands::Guardian { action } => commands::contact::handle_guardian(&action, ctx, flags).await,
        Commands::Teacher { action } => commands::contact::handle_teacher(&action, ctx, flags).await,
        Commands::Eoi { action } => commands::contact::handle_eoi(&action, ctx, flags).await,
        Commands::Import { action } => commands::transfer::handle_import(&action, ctx, flags).await,
        Commands::Export { action } => commands::transfer::handle_export(&action, ctx, flags).await,
        Commands::Remind { action } => commands::remind::handle(&action, ctx, flags).await,
        Commands::Audit(args) => commands::audit::handle(&args, ctx, flags).await,
        Commands::Init(_) => unreachable!("init is pre-dispatched in main"),
    }
}
