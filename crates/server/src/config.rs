#![forbid(unsafe_code)]

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Clone, Debug, Parser)]
#[command(name = "mims_server", about = "Incident reporting HTTP service")]
pub struct Args {
    /// Address the HTTP listener binds to.
    #[arg(long, env = "MIMS_HTTP_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// Directory holding the SQLite database.
    #[arg(long, env = "MIMS_STORAGE_DIR", default_value = "./mims_data")]
    pub storage_dir: PathBuf,

    /// YAML reference data applied before the listener starts.
    #[arg(long, env = "MIMS_SEED_FILE")]
    pub seed: Option<PathBuf>,
}
