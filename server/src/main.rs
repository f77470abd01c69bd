use qrmenu_server::{Config, Server, ServerState, init_logger_with_file, print_banner};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 环境与日志
    dotenv::dotenv().ok();
    let config = Config::from_env();
    config.ensure_work_dir_structure()?;
    init_logger_with_file(None, config.log_dir().to_str());

    print_banner();
    tracing::info!("🍽️  QR menu server starting...");

    // 2. 初始化服务器状态
    let state = ServerState::initialize(&config).await;

    // 3. 启动 HTTP 服务器
    let server = Server::with_state(config, state);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
