use anyhow::Result;
use book_extractor::{logger, App, CancellationToken, Config};
use tracing::{error, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load().await?;

    // 初始化日志
    logger::init(config.verbose_logging);

    // Ctrl-C 后停止派发新页面
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("收到中断信号，停止派发新页面...");
            signal_cancel.cancel();
        }
    });

    // 初始化并运行应用
    let app = App::initialize(config, cancel)?;
    if let Err(e) = app.run().await {
        error!("❌ {:#}", e);
        return Err(e);
    }

    Ok(())
}
