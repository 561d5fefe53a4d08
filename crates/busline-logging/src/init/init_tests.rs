#![allow(non_snake_case)]

use super::*;

// The global subscriber can be installed once per process, so both calls
// live in one test.
#[test]
fn init_logging___second_call___already_installed() {
    let first = init_logging(LogLevel::Warn);
    let second = init_logging(LogLevel::Debug);

    assert!(first.is_ok());
    assert!(matches!(second, Err(LoggingError::AlreadyInstalled)));
    assert!(ReloadHandle::global().is_initialized());
    assert_eq!(ReloadHandle::global().level(), LogLevel::Warn);

    ReloadHandle::global().reload_level(LogLevel::Error).unwrap();
    assert_eq!(ReloadHandle::global().level(), LogLevel::Error);
}
