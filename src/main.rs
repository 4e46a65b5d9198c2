use anyhow::Result;

use bug_report_submit::app::App;
use bug_report_submit::config::Config;
use bug_report_submit::utils::logging;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let config = Config::load()?;

    App::initialize(config).await?.run().await?;

    Ok(())
}
