use anyhow::Result;
use bfj_mix_bridge::utils::logging;
use bfj_mix_bridge::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env()?;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    let mut app = App::initialize(config).await?;
    app.run().await?;

    Ok(())
}
