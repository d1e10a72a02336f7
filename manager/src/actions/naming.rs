//! Display names for actions
//!
//! Names are `"<label>: <comma-joined keys>"` and depend only on the action's
//! type, its payload and the keys, so the same inputs always give the same name.

use super::{ActionDetails, NetworkState};
use crate::constants::labels;

pub fn label_for(details: &ActionDetails) -> &'static str {
    match details {
        ActionDetails::StateApplication { .. } => labels::APPLY_STATES,
        ActionDetails::NetworkCreate { .. } => labels::NETWORK_CREATE,
        ActionDetails::NetworkStateChange { state, .. } => match state {
            NetworkState::Start => labels::NETWORK_START,
            NetworkState::Stop => labels::NETWORK_STOP,
            NetworkState::Delete => labels::NETWORK_DELETE,
        },
    }
}

pub fn display_name<S: AsRef<str>>(details: &ActionDetails, keys: &[S]) -> String {
    let joined = keys
        .iter()
        .map(|k| k.as_ref())
        .collect::<Vec<_>>()
        .join(",");
    format!("{}: {}", label_for(details), joined)
}
