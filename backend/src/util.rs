use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
#[error("Retry failed")]
pub struct RetryFailed;

pub fn retry<T, E, F>(mut times: u32, f: F) -> Result<T, RetryFailed>
where
    F: Fn() -> Result<T, E>,
    E: std::error::Error + std::fmt::Display,
{
    loop {
        match f() {
            Ok(value) => return Ok(value),
            Err(err) if times == 0 => {
                warn!("No more retry attempts. Error: {}", err);
                return Err(RetryFailed);
            }
            Err(err) => {
                warn!("Retry triggered. Error: {}", err);
                times -= 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Error, Debug)]
    #[error("flaky")]
    struct Flaky;

    #[test]
    fn test_retry_succeeds_after_failure() {
        let calls = Cell::new(0);
        let result = retry(1, || {
            calls.set(calls.get() + 1);
            if calls.get() < 2 {
                Err(Flaky)
            } else {
                Ok(calls.get())
            }
        });
        assert_eq!(result.unwrap(), 2);
    }

    #[test]
    fn test_retry_gives_up() {
        let calls = Cell::new(0);
        let result: Result<(), RetryFailed> = retry(2, || {
            calls.set(calls.get() + 1);
            Err(Flaky)
        });
        assert!(result.is_err());
        assert_eq!(calls.get(), 3);
    }
}
