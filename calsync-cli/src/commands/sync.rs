use anyhow::Result;
use calsync_core::SyncConfig;

use crate::SyncArgs;
use crate::render::{render_calendar, render_report};
use crate::target::SyncTarget;
use crate::utils::tui::create_spinner;

pub async fn run(config: &SyncConfig, args: &SyncArgs, verbose: bool) -> Result<()> {
    let target = SyncTarget::resolve(config, args)?;
    let heading = render_calendar(target.name, target.profile);

    let spinner = create_spinner(heading.clone());
    let result = calsync_core::sync::sync(
        &target.profile.remote,
        &target.range,
        &target.profile.domain,
        target.events,
    )
    .await;
    spinner.finish_and_clear();

    println!("{heading}");
    let report = result?;
    println!("{}", render_report(&report, verbose));

    let failed = report.failed().count();
    if failed > 0 {
        anyhow::bail!("{failed} of {} operations failed", report.outcomes.len());
    }

    Ok(())
}
