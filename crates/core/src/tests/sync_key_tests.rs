// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{create_test_key, create_test_state};
use crate::{CoreError, SyncKey};
use schoolhub_domain::WorkCategory;

#[test]
fn test_sync_key_rendering() {
    assert_eq!(SyncKey::Management.to_string(), "management");
    assert_eq!(SyncKey::roster("Basic 1A").to_string(), "roster:Basic 1A");
    assert_eq!(
        SyncKey::assessment(WorkCategory::HomeWork, &create_test_key("Basic 1A", "Math"))
            .to_string(),
        "homeWork:2024/2025|1ST TERM|MONTH 1|1|Basic 1A|Math"
    );
}

#[test]
fn test_sync_key_parsing() {
    let parsed: SyncKey = "criterionWork:2024/2025|1ST TERM|MONTH 1|1|Basic 1A|Literacy"
        .parse()
        .unwrap();

    assert_eq!(
        parsed,
        SyncKey::assessment(
            WorkCategory::CriterionWork,
            &create_test_key("Basic 1A", "Literacy")
        )
    );
    assert_eq!("management".parse::<SyncKey>(), Ok(SyncKey::Management));
    assert_eq!(
        "roster:Basic 1A".parse::<SyncKey>(),
        Ok(SyncKey::roster("Basic 1A"))
    );
}

#[test]
fn test_invalid_sync_keys_are_rejected() {
    for raw in ["", "roster:", "artWork:a|b|c|d|e|f", "classWork:a|b|c", "nonsense"] {
        assert_eq!(
            raw.parse::<SyncKey>(),
            Err(CoreError::InvalidSyncKey(raw.to_string())),
            "{raw}"
        );
    }
}

#[test]
fn test_sync_keys_serialize_as_strings() {
    let keys: Vec<SyncKey> = vec![SyncKey::Management, SyncKey::roster("Basic 1A")];

    let json: String = serde_json::to_string(&keys).unwrap();
    let back: Vec<SyncKey> = serde_json::from_str(&json).unwrap();

    assert_eq!(json, r#"["management","roster:Basic 1A"]"#);
    assert_eq!(back, keys);
}

#[test]
fn test_all_for_covers_whole_document() {
    let keys: Vec<SyncKey> = SyncKey::all_for(&create_test_state());

    assert!(keys.contains(&SyncKey::Management));
    assert!(keys.contains(&SyncKey::roster("Basic 1A")));
    assert_eq!(keys.len(), 4);
}
