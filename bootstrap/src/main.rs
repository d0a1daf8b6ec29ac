//! tmii-dashboard - 在终端中打印各列表的第一页

use anyhow::Context;
use tmii_bootstrap::{Dashboard, RuntimeConfig, init_runtime};
use tmii_common::PageResult;
use tmii_domain_core::Resource;
use tracing::info;

fn summarize<R: Resource>(page: &PageResult<R>) {
    println!(
        "{:<14} page {}/{} ({} total)",
        R::KIND.to_string(),
        page.page,
        page.total_pages,
        page.count
    );
    for item in &page.items {
        println!("  {}", item.id());
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = RuntimeConfig::default()
        .load()
        .context("Failed to load config")?;
    init_runtime(&config);

    let dashboard = Dashboard::build(&config)?;
    info!(
        theme = ?dashboard.settings.current().theme,
        mock = dashboard.is_mock(),
        "Dashboard ready"
    );

    dashboard.load_all().await?;
    summarize(&*dashboard.members.load().await?);
    summarize(&*dashboard.users.load().await?);
    summarize(&*dashboard.transactions.load().await?);

    Ok(())
}
