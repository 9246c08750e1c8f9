use std::env;
use std::path::Path;

use crate::constants::envvars;

/// Load `./.env`, then `$SNAP_COMMON/.env` if present. Runs before logging is set up.
pub fn load_dotenv() {
    if dotenv::dotenv().is_ok() {
        eprintln!("Loaded local .env");
    }
    let Ok(snap_common) = env::var(envvars::SNAP_COMMON) else {
        return;
    };
    let path = Path::new(&snap_common).join(".env");
    if dotenv::from_path(&path).is_ok() {
        eprintln!("Loaded {}", path.display());
    }
}
