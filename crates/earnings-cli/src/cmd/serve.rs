use anyhow::Result;
use earnings_server::AppState;
use std::path::Path;

pub fn run(root: &Path, host: Option<String>, port: Option<u16>) -> Result<()> {
    let config = super::load_config(root)?;
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    let state = AppState::new(root.to_path_buf(), config);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(serve_until_ctrl_c(state, host, port))
}

async fn serve_until_ctrl_c(state: AppState, host: String, port: u16) -> Result<()> {
    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    let actual = listener.local_addr()?;
    println!("earnings API → http://{actual}  (PID {})", std::process::id());

    tokio::select! {
        res = earnings_server::serve_on(state, listener) => res,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
            Ok(())
        }
    }
}
