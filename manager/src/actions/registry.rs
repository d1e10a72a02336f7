//! Action type registry
//!
//! Read-only mapping from type tag to the constructor of its empty details.

use chrono::Utc;

use super::{Action, ActionDetails, ActionStatus, ActionType, NetworkState};

type DetailsConstructor = fn() -> ActionDetails;

static ACTION_TYPES: &[(ActionType, DetailsConstructor)] = &[
    (ActionType::ApplyStates, empty_state_application),
    (ActionType::NetworkCreate, empty_network_create),
    (ActionType::NetworkStateChange, empty_network_state_change),
];

fn empty_state_application() -> ActionDetails {
    ActionDetails::StateApplication { states: Vec::new() }
}

fn empty_network_create() -> ActionDetails {
    ActionDetails::NetworkCreate {
        network_name: String::new(),
        definition: String::new(),
    }
}

fn empty_network_state_change() -> ActionDetails {
    ActionDetails::NetworkStateChange {
        network_name: String::new(),
        state: NetworkState::Start,
    }
}

/// Instantiates an empty, unsaved action of the requested type with its
/// matching details attached.
pub fn create_action(action_type: ActionType) -> Action {
    let details = ACTION_TYPES
        .iter()
        .find(|(registered, _)| *registered == action_type)
        .map(|(_, constructor)| constructor())
        // Every ActionType variant is listed above
        .unwrap_or_else(empty_state_application);

    let now = Utc::now();
    Action {
        id: None,
        action_type,
        name: String::new(),
        status: ActionStatus::Created,
        created_at: now,
        earliest: now,
        targets: Vec::new(),
        details,
    }
}
