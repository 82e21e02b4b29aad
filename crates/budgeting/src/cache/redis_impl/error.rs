//! Redis error mapping.

use budgeting_core::broker::BrokerError;
use budgeting_core::cache::CacheError;

fn is_connection_error(err: &redis::RedisError) -> bool {
    err.is_connection_refusal() || err.is_timeout() || err.is_connection_dropped()
}

/// Maps Redis errors to CacheError.
pub fn map_redis_error(err: redis::RedisError) -> CacheError {
    if is_connection_error(&err) {
        CacheError::ConnectionFailed(err.to_string())
    } else {
        CacheError::OperationFailed(err.to_string())
    }
}

/// Maps Redis errors to BrokerError.
pub fn map_redis_broker_error(err: redis::RedisError) -> BrokerError {
    if is_connection_error(&err) {
        BrokerError::ConnectionFailed(err.to_string())
    } else {
        BrokerError::OperationFailed(err.to_string())
    }
}
