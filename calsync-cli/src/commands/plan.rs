use anyhow::Result;
use calsync_core::SyncConfig;

use crate::SyncArgs;
use crate::render::{render_calendar, render_plan};
use crate::target::SyncTarget;
use crate::utils::tui::create_spinner;

pub async fn run(config: &SyncConfig, args: &SyncArgs, verbose: bool) -> Result<()> {
    let target = SyncTarget::resolve(config, args)?;
    let heading = render_calendar(target.name, target.profile);

    let spinner = create_spinner(heading.clone());
    let result = calsync_core::sync::plan(
        &target.profile.remote,
        &target.range,
        &target.profile.domain,
        target.events,
    )
    .await;
    spinner.finish_and_clear();

    println!("{heading}");
    let plan = result?;
    println!("{}", render_plan(&plan, verbose));

    let (created, updated, deleted) = plan.counts();
    println!("\nPlanned: {created} to create, {updated} to update, {deleted} to delete");

    Ok(())
}
