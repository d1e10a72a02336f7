//! Common test data and constants

use action_manager::ActionResult;
use chrono::Utc;

/// Managed hosts written by `TestConfigBuilder::standard()`
pub mod hosts {
    pub const HYPERVISOR: i64 = 1;
    pub const HYPERVISOR_NAME: &str = "hypervisor-1";
    pub const HYPERVISOR_KEY: &str = "hypervisor-api-key";

    pub const MINION: i64 = 2;
    pub const MINION_NAME: &str = "minion-2";
    pub const MINION_KEY: &str = "minion-api-key";

    pub const UNKNOWN: i64 = 99;
}

/// Networks present on the hypervisor at startup
pub mod networks {
    pub const DEFAULT: &str = "default";
    pub const ISOLATED: &str = "isolated";
    pub const MISSING: &str = "does-not-exist";

    pub const DEFINITION: &str = "<network><name>lab</name><bridge name='virbr9'/></network>";
}

pub mod states {
    pub const PACKAGES: &str = "packages.update";
    pub const SSH: &str = "services.ssh";
}

pub fn names(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|k| k.to_string()).collect()
}

pub fn result_for(action_id: i64, host_id: i64, success: bool, output: &str) -> ActionResult {
    ActionResult {
        action_id,
        host_id,
        success,
        output: output.to_string(),
        return_code: Some(if success { 0 } else { 1 }),
        completed_at: Utc::now(),
    }
}
