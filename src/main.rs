use anyhow::Result;
use essay_download::config::Config;
use essay_download::orchestrator::App;
use essay_download::utils::logging;

fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    // 加载配置
    let config = Config::from_env();

    // 初始化并运行应用
    App::initialize(config)?.run()?;

    Ok(())
}
