use anyhow::Result;
use omr_lan_check::utils::logging;
use omr_lan_check::{App, Config};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    // 加载配置
    let config = Config::from_env();

    // 初始化并运行应用
    let _report = App::initialize(config).await?.run().await?;

    Ok(())
}
