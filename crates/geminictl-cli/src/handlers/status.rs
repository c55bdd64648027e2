use crate::context::ExecutionContext;
use crate::tui;
use anyhow::{Context, Result, bail};
use geminictl_resolver::Tiers;
use geminictl_storage::Cache;
use is_terminal::IsTerminal;

/// Launch the interactive status view.
pub fn handle(ctx: &ExecutionContext, reset_registry: bool, deep: bool) -> Result<()> {
    if !std::io::stdout().is_terminal() {
        bail!("status requires an interactive terminal");
    }

    let mut cache = Cache::new(ctx.cache_path().to_path_buf());
    if reset_registry {
        cache.clear();
        let _ = cache.save();
    } else {
        cache.load().context("Failed to load identity cache")?;
    }

    // Startup GC: drop cache entries whose project no longer exists on disk.
    let ids = geminictl_storage::list_project_ids(ctx.storage_root())
        .context("Failed to enumerate storage root")?;
    if cache.retain_known(&ids) {
        let _ = cache.save();
    }

    let mut app = tui::App::new(ctx.storage_root().to_path_buf(), cache)
        .context("Failed to scan storage")?;

    let tiers = Tiers::standard(deep).context("Failed to build scan tiers")?;
    app.start_resolver(tiers);

    tui::run(app)
}
