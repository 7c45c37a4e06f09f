use rustyroute::handler::responses;
use rustyroute::{Handler, Request, Router, Server, ServerConfig};
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "rustyroute.toml".to_string());
    let config = ServerConfig::load(&config_path);

    let server_name = config.server_name.clone();
    let router = Router::build(|r| {
        r.bind("/", Handler::func(move |_: &Request| responses::welcome(&server_name)));
        r.mount("/static/", &config.static_files_root)?;
        Ok(())
    })
    .map_err(|err| {
        error!(error = %err, "invalid routing table");
        std::io::Error::new(std::io::ErrorKind::InvalidInput, err)
    })?;

    let server = Server::new(config, router);
    async_std::task::block_on(server.run())
}
