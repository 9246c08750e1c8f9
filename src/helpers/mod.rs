mod backoff_retry;
mod init_logging;
mod load_dotenv;
mod time;

pub use backoff_retry::backoff_retry;
pub use init_logging::init_logging;
pub use load_dotenv::load_dotenv;
pub use time::now_iso;

pub mod base_path;

use getrandom::getrandom;

pub fn rand_hex(bytes: usize) -> String {
    let mut rand = vec![0u8; bytes];
    if let Err(e) = getrandom(&mut rand) {
        log::warn!("Could not obtain random bytes: {e}");
    }
    hex::encode(rand)
}
