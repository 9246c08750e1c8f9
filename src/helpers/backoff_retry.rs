use std::fmt::Display;
use std::time::Duration;

use backoff::{retry_notify, Error, ExponentialBackoff};

/// Retry with exponential backoff, giving up after `max_elapsed`
pub fn backoff_retry<F, T, E>(fn_to_try: F, max_elapsed: Option<Duration>) -> Result<T, Error<E>>
where
    F: FnMut() -> Result<T, Error<E>>,
    E: Display,
{
    let notify = |err, dur: Duration| {
        log::warn!(
            "Temporary error after {:.1}s: {}",
            dur.as_secs_f32(),
            err
        );
    };

    let policy = ExponentialBackoff {
        max_elapsed_time: max_elapsed,
        ..ExponentialBackoff::default()
    };
    retry_notify(policy, fn_to_try, notify)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permanent_error_is_not_retried() {
        let mut calls = 0;
        let res: Result<(), Error<String>> = backoff_retry(
            || {
                calls += 1;
                Err(Error::permanent("broken".to_string()))
            },
            Some(Duration::from_secs(1)),
        );
        assert!(res.is_err());
        assert_eq!(calls, 1);
    }

    #[test]
    fn transient_error_recovers() {
        let mut calls = 0;
        let res: Result<u8, Error<String>> = backoff_retry(
            || {
                calls += 1;
                if calls < 3 {
                    Err(Error::transient("not yet".to_string()))
                } else {
                    Ok(7)
                }
            },
            Some(Duration::from_secs(10)),
        );
        assert_eq!(res.unwrap(), 7);
        assert_eq!(calls, 3);
    }
}
