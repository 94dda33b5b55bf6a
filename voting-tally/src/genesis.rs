// Copyright (C) Microsoft Corporation. All rights reserved.

//! `setup-genesis`: emits the `app_state` JSON fragment for inclusion
//! in the consensus engine's genesis file, per spec.md §4.4/§6.
//! Grounded on `original_source/scripts/admin_cli.py`'s `setup_genesis`
//! command.

use serde_json::json;

/// Returns the `app_state` fragment as a pretty-printed JSON string,
/// e.g. `{"voting_end_height":10}`.
pub fn setup_genesis(end_height: u64) -> String {
    json!({ "voting_end_height": end_height }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_the_expected_fragment() {
        let fragment = setup_genesis(10);
        let value: serde_json::Value = serde_json::from_str(&fragment).unwrap();
        assert_eq!(value["voting_end_height"], 10);
    }
}
