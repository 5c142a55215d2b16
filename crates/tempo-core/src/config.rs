use serde::{Deserialize, Serialize};

/// Focus session policy settings.
///
/// Sessions may only be started with one of the configured durations; the
/// countdown and completion machinery are duration-agnostic.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct FocusConfig {
    /// Durations (in whole minutes) a session may be started with.
    #[serde(default = "default_durations")]
    pub allowed_durations: Vec<u32>,
    /// Duration used when the caller does not pick one.
    #[serde(default = "default_duration")]
    pub default_duration: u32,
    /// Bounded wait for a completion (`end`) call before it is surfaced as a
    /// transient failure. Policy value, not a contract.
    #[serde(default = "default_end_timeout_secs")]
    pub end_timeout_secs: u64,
}

fn default_durations() -> Vec<u32> {
    vec![15, 25, 50]
}

fn default_duration() -> u32 {
    25
}

fn default_end_timeout_secs() -> u64 {
    10
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            allowed_durations: default_durations(),
            default_duration: default_duration(),
            end_timeout_secs: default_end_timeout_secs(),
        }
    }
}

impl FocusConfig {
    /// Returns true if `duration_minutes` is one of the configured durations.
    pub fn allows_duration(&self, duration_minutes: u32) -> bool {
        self.allowed_durations.contains(&duration_minutes)
    }
}
