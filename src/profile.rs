//! The two browsing profiles and their storage partitions.
//!
//! Each profile window gets its own webview data directory (and, on macOS, its
//! own data store identifier), so cookies, cache and local storage never leak
//! between "Personal" and "Work".

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::ShellError;

pub const PERSONAL_LABEL: &str = "Personal";
pub const WORK_LABEL: &str = "Work";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileId {
    Primary,
    Secondary,
}

impl ProfileId {
    pub const ALL: [ProfileId; 2] = [ProfileId::Primary, ProfileId::Secondary];

    /// Tauri window label
    pub fn window_label(self) -> &'static str {
        match self {
            ProfileId::Primary => "primary",
            ProfileId::Secondary => "secondary",
        }
    }

    pub fn from_window_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.window_label() == label)
    }

    pub fn other(self) -> Self {
        match self {
            ProfileId::Primary => ProfileId::Secondary,
            ProfileId::Secondary => ProfileId::Primary,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            ProfileId::Primary => 0,
            ProfileId::Secondary => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSpec {
    pub id: ProfileId,
    /// Storage partition name; also the data directory name
    pub partition: String,
    pub display_name: String,
}

impl ProfileSpec {
    pub fn data_directory(&self, data_root: &Path) -> PathBuf {
        data_root.join("profiles").join(&self.partition)
    }

    /// Stable WKWebView data store id derived from the partition name.
    #[cfg_attr(not(any(target_os = "macos", test)), allow(dead_code))]
    pub fn data_store_identifier(&self) -> [u8; 16] {
        Uuid::new_v5(&Uuid::NAMESPACE_OID, self.partition.as_bytes()).into_bytes()
    }
}

pub fn default_profiles() -> [ProfileSpec; 2] {
    [
        ProfileSpec {
            id: ProfileId::Primary,
            partition: "one".to_string(),
            display_name: PERSONAL_LABEL.to_string(),
        },
        ProfileSpec {
            id: ProfileId::Secondary,
            partition: "two".to_string(),
            display_name: WORK_LABEL.to_string(),
        },
    ]
}

/// Partition names end up as directory names, so keep them conservative.
fn is_safe_partition(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| matches!(b, b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_'))
}

/// Partitions must be well-formed and distinct, and the profiles must be
/// listed in `ProfileId` order.
pub fn validate_profiles(profiles: &[ProfileSpec; 2]) -> Result<(), ShellError> {
    let mut seen = HashSet::new();
    for (spec, expected) in profiles.iter().zip(ProfileId::ALL) {
        if spec.id != expected {
            return Err(ShellError::InvalidProfile(format!(
                "expected {:?} profile, found {:?}",
                expected, spec.id
            )));
        }
        if !is_safe_partition(&spec.partition) {
            return Err(ShellError::InvalidProfile(format!(
                "invalid partition name {:?}",
                spec.partition
            )));
        }
        if !seen.insert(spec.partition.to_lowercase()) {
            return Err(ShellError::InvalidProfile(format!(
                "partition {:?} is used by both profiles",
                spec.partition
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profiles_are_valid_and_isolated() {
        let profiles = default_profiles();
        validate_profiles(&profiles).unwrap();

        let root = Path::new("/data");
        assert_ne!(
            profiles[0].data_directory(root),
            profiles[1].data_directory(root)
        );
        assert_ne!(
            profiles[0].data_store_identifier(),
            profiles[1].data_store_identifier()
        );
    }

    #[test]
    fn test_data_store_identifier_is_stable() {
        let profiles = default_profiles();
        assert_eq!(
            profiles[0].data_store_identifier(),
            default_profiles()[0].data_store_identifier()
        );
    }

    #[test]
    fn test_duplicate_partition_rejected() {
        let mut profiles = default_profiles();
        profiles[1].partition = "ONE".to_string();
        assert!(matches!(
            validate_profiles(&profiles),
            Err(ShellError::InvalidProfile(_))
        ));
    }

    #[test]
    fn test_unsafe_partition_rejected() {
        for bad in ["", "../etc", "a b", "x/y"] {
            let mut profiles = default_profiles();
            profiles[0].partition = bad.to_string();
            assert!(validate_profiles(&profiles).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_profile_order_enforced() {
        let mut profiles = default_profiles();
        profiles.swap(0, 1);
        assert!(validate_profiles(&profiles).is_err());
    }

    #[test]
    fn test_window_labels_round_trip() {
        for id in ProfileId::ALL {
            assert_eq!(ProfileId::from_window_label(id.window_label()), Some(id));
            assert_eq!(id.other().other(), id);
        }
        assert_eq!(ProfileId::from_window_label("popup"), None);
    }

    #[test]
    fn test_macos_bundle_requires_per_profile_data_stores() {
        // Data store identifiers are ignored before macOS 14, which would put
        // both profiles in the shared default store.
        let config: serde_json::Value =
            serde_json::from_str(include_str!("../tauri.conf.json")).unwrap();
        let minimum = config["bundle"]["macOS"]["minimumSystemVersion"]
            .as_str()
            .unwrap();
        let major: u32 = minimum.split('.').next().unwrap().parse().unwrap();
        assert!(major >= 14, "minimumSystemVersion {minimum} allows shared storage");
    }
}
