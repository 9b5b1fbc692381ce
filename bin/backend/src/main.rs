//! Dealroom server binary: wires up logging and signal handling, then
//! runs the `actix-web` application until interrupted.

#[tokio::main]
async fn main() {
    dealroom_core::init_logging();
    dealroom_core::install_ctrlc();
    let config = dealroom_server::Config::from_env();
    if let Err(err) = dealroom_server::run(config).await {
        log::error!("server exited with error: {err:#}");
        std::process::exit(1);
    }
}
