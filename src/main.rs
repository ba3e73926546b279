use anyhow::Result;
use seo_bulk_writer::app::App;
use seo_bulk_writer::{logger, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logger::init_with_verbose(config.verbose_logging);

    // 第一个参数可以覆盖批次文件路径
    let batch_file = std::env::args().nth(1);

    // 初始化并运行应用
    let report = App::initialize(config)?.run(batch_file.as_deref()).await?;

    if report.summary.failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}
