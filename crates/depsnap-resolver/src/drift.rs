//! Differences between a recorded snapshot and a fresh one.

use std::collections::BTreeSet;
use std::fmt;

use depsnap_core::snapshot::Snapshot;

/// Every dependency entry that differs between two snapshots.
#[derive(Debug, Default)]
pub struct DriftReport {
    pub entries: Vec<DriftEntry>,
}

/// A single differing dependency entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriftEntry {
    /// Present now, absent from the recorded snapshot.
    Added { name: String, value: String },
    /// Recorded, but no longer present.
    Removed { name: String, value: String },
    Changed {
        name: String,
        from: String,
        to: String,
    },
}

impl DriftEntry {
    pub fn name(&self) -> &str {
        match self {
            Self::Added { name, .. } | Self::Removed { name, .. } | Self::Changed { name, .. } => {
                name
            }
        }
    }
}

impl DriftReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare the dependency maps of `expected` and `actual`, sorted by name.
    pub fn compare(expected: &Snapshot, actual: &Snapshot) -> Self {
        let before = expected.dependencies.entries();
        let after = actual.dependencies.entries();
        let names: BTreeSet<&String> = before.keys().chain(after.keys()).collect();

        let mut report = Self::new();
        for name in names {
            let entry = match (before.get(name), after.get(name)) {
                (Some(from), Some(to)) if from != to => DriftEntry::Changed {
                    name: name.clone(),
                    from: from.clone(),
                    to: to.clone(),
                },
                (None, Some(value)) => DriftEntry::Added {
                    name: name.clone(),
                    value: value.clone(),
                },
                (Some(value), None) => DriftEntry::Removed {
                    name: name.clone(),
                    value: value.clone(),
                },
                _ => continue,
            };
            report.add(entry);
        }
        report
    }

    pub fn add(&mut self, entry: DriftEntry) {
        self.entries.push(entry);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl fmt::Display for DriftReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return write!(f, "No drift.");
        }
        writeln!(f, "Drift ({}):", self.entries.len())?;
        for entry in &self.entries {
            writeln!(f, "  {entry}")?;
        }
        Ok(())
    }
}

impl fmt::Display for DriftEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added { name, value } => write!(f, "+ {name} {value}"),
            Self::Removed { name, value } => write!(f, "- {name} {value}"),
            Self::Changed { name, from, to } => write!(f, "~ {name} {from} -> {to}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depsnap_core::package::PackageIdentity;
    use depsnap_core::snapshot::SnapshotDependencies;

    fn snapshot(deps: &[(&str, &str)]) -> Snapshot {
        Snapshot::new(
            &PackageIdentity::new("app", "1.0.0"),
            SnapshotDependencies::Resolved(
                deps.iter()
                    .map(|(n, v)| (n.to_string(), v.to_string()))
                    .collect(),
            ),
        )
    }

    #[test]
    fn empty_report() {
        let s = snapshot(&[("lib-a", "1.2.0")]);
        let report = DriftReport::compare(&s, &s.clone());
        assert!(report.is_empty());
        assert_eq!(report.len(), 0);
        assert_eq!(report.to_string(), "No drift.");
    }

    #[test]
    fn added_removed_changed_sorted_by_name() {
        let expected = snapshot(&[("b", "1.0.0"), ("c", "2.0.0")]);
        let actual = snapshot(&[("a", "0.1.0"), ("c", "2.1.0")]);
        let report = DriftReport::compare(&expected, &actual);
        assert_eq!(
            report.entries,
            vec![
                DriftEntry::Added {
                    name: "a".into(),
                    value: "0.1.0".into()
                },
                DriftEntry::Removed {
                    name: "b".into(),
                    value: "1.0.0".into()
                },
                DriftEntry::Changed {
                    name: "c".into(),
                    from: "2.0.0".into(),
                    to: "2.1.0".into()
                },
            ]
        );
        let s = report.to_string();
        assert!(s.starts_with("Drift (3):"));
        assert!(s.contains("~ c 2.0.0 -> 2.1.0"));
        assert_eq!(report.entries[1].name(), "b");
    }
}
