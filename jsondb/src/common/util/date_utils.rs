use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the unix epoch, or 0 if the clock is before it.
#[inline]
pub fn get_current_time_or_zero() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_current_time() {
        let current_time = get_current_time_or_zero();
        assert!(current_time > 0);
    }

    #[test]
    fn test_current_time_does_not_go_backwards_between_calls() {
        let first = get_current_time_or_zero();
        let second = get_current_time_or_zero();
        assert!(second >= first);
    }
}
