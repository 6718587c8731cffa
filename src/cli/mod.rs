pub mod clean;
pub mod repl;
pub mod request;
pub mod serve;
pub mod watch;

use std::sync::Arc;

use crate::config::{process_env, BackendConfig, FileConfig, Settings};
use crate::error::Result;
use crate::logging;
use crate::suggest::{http_client, Backend, Suggester};

/// Settings plus the backend chosen for this run.
pub struct Startup {
    pub settings: Settings,
    pub suggester: Arc<dyn Suggester>,
}

/// Resolve settings from the config file and environment, then initialise logging.
pub fn load_settings() -> Result<Settings> {
    Ok(load_layers()?.1)
}

/// Everything a suggesting command needs. Unknown backends and missing
/// credentials are reported here, before any request is served.
pub fn load() -> Result<Startup> {
    let (file, settings) = load_layers()?;

    let backend = BackendConfig::resolve(&file, &process_env)?;
    tracing::debug!("backend: {:?}", backend);

    let http = http_client(settings.http_timeout)?;
    let suggester: Arc<dyn Suggester> = Arc::new(Backend::from_config(&backend, http));

    Ok(Startup {
        settings,
        suggester,
    })
}

fn load_layers() -> Result<(FileConfig, Settings)> {
    let file = FileConfig::load()?;
    let settings = Settings::resolve(&file, &process_env);
    logging::init(settings.log_level);
    Ok((file, settings))
}
