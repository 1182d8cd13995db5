//! Engine configuration.

/// Configuration for a Juggler engine.
#[derive(Debug, Clone)]
pub struct Config {
    /// Initial value of the sequence counter.
    ///
    /// The first transaction receives `first_sequence + 1`.
    pub first_sequence: u64,

    /// Capacity reserved for each transaction's touched set.
    pub touched_capacity: usize,

    /// Capacity reserved for the active transaction list.
    pub active_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            first_sequence: 0,
            touched_capacity: 2,
            active_capacity: 16,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the initial value of the sequence counter.
    #[must_use]
    pub const fn first_sequence(mut self, value: u64) -> Self {
        self.first_sequence = value;
        self
    }

    /// Sets the capacity reserved for each touched set.
    #[must_use]
    pub const fn touched_capacity(mut self, capacity: usize) -> Self {
        self.touched_capacity = capacity;
        self
    }

    /// Sets the capacity reserved for the active transaction list.
    #[must_use]
    pub const fn active_capacity(mut self, capacity: usize) -> Self {
        self.active_capacity = capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.first_sequence, 0);
        assert_eq!(config.touched_capacity, 2);
        assert_eq!(config.active_capacity, 16);
    }

    #[test]
    fn builder_pattern() {
        let config = Config::new()
            .first_sequence(100)
            .touched_capacity(8)
            .active_capacity(64);

        assert_eq!(config.first_sequence, 100);
        assert_eq!(config.touched_capacity, 8);
        assert_eq!(config.active_capacity, 64);
    }
}
