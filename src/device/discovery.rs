//! One-shot device discovery.

use tracing::{debug, info, warn};

use super::{DeviceEnumerator, DeviceHandle};
use crate::mapping::MappingTable;

/// Probe every candidate and keep the devices exposing at least one button
/// the mapping table knows about.
///
/// Candidates that cannot be opened or inspected are logged and skipped.
/// An empty result is the caller's problem: there is nothing to monitor.
pub fn discover<E: DeviceEnumerator>(
    enumerator: &E,
    table: &MappingTable,
) -> Vec<DeviceHandle<E::Source>> {
    info!("Searching for mouse devices...");

    let mut selected = Vec::new();
    for probe in enumerator.probe() {
        match probe {
            Ok(handle) if handle.info.supports_any(table.codes()) => {
                info!(
                    device = %handle.info.path.display(),
                    name = %handle.info.name,
                    "Found suitable device"
                );
                selected.push(handle);
            }
            Ok(handle) => {
                debug!(device = %handle.info.path.display(), "No recognized buttons, skipping");
            }
            Err(e) => warn!("Could not check device: {}", e),
        }
    }

    selected
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::path::PathBuf;

    use super::*;
    use crate::device::mock::{info, MockEnumerator};
    use crate::mapping::MappingProfile;

    fn selected_paths(enumerator: &MockEnumerator, table: &MappingTable) -> BTreeSet<PathBuf> {
        discover(enumerator, table)
            .into_iter()
            .map(|h| h.info.path)
            .collect()
    }

    fn system() -> MockEnumerator {
        MockEnumerator::new()
            .with_device(info("/dev/input/event0", "AT Keyboard", &[1, 29, 46, 47]), vec![])
            .with_device(info("/dev/input/event3", "Thumb Mouse", &[272, 273, 275, 276]), vec![])
            .with_unreadable("/dev/input/event4")
            .with_device(info("/dev/input/event5", "Three Button Mouse", &[272, 273, 274]), vec![])
    }

    #[test]
    fn test_selects_devices_with_recognized_buttons() {
        let table = MappingProfile::SymbolicV2.table();
        let paths = selected_paths(&system(), &table);
        let expected: BTreeSet<PathBuf> = ["/dev/input/event3", "/dev/input/event5"]
            .into_iter()
            .map(PathBuf::from)
            .collect();
        assert_eq!(paths, expected);
    }

    #[test]
    fn test_filter_follows_active_table() {
        // v1 has no middle button, so the three-button mouse is not eligible.
        let table = MappingProfile::ScanCodeV1.table();
        let paths = selected_paths(&system(), &table);
        assert_eq!(paths.len(), 1);
        assert!(paths.contains(&PathBuf::from("/dev/input/event3")));
    }

    #[test]
    fn test_discovery_is_idempotent() {
        let table = MappingProfile::SymbolicV2.table();
        let enumerator = system();
        assert_eq!(
            selected_paths(&enumerator, &table),
            selected_paths(&enumerator, &table)
        );
    }

    #[test]
    fn test_no_eligible_devices() {
        let table = MappingProfile::SymbolicV2.table();
        let enumerator = MockEnumerator::new()
            .with_device(info("/dev/input/event0", "AT Keyboard", &[1, 29]), vec![])
            .with_unreadable("/dev/input/event1");
        assert!(discover(&enumerator, &table).is_empty());
    }
}
