//! The four jstat views sampled by the exporter.
//!
//! Each category knows the jstat flag that produces it and the fixed token
//! positions that are exported as gauges. The positions are 0-indexed into a
//! whitespace-split data row (the header row is never parsed).

use std::fmt;

/// A single exported column: token position, gauge name and help text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GaugeField {
    pub position: usize,
    pub name: &'static str,
    pub help: &'static str,
}

const fn field(position: usize, name: &'static str, help: &'static str) -> GaugeField {
    GaugeField {
        position,
        name,
        help,
    }
}

const CAPACITY_FIELDS: &[GaugeField] = &[
    field(1, "newMax", "NGCMX: Maximum new generation capacity (kB)"),
    field(2, "newCommit", "NGC: Current new generation capacity (kB)"),
    field(7, "oldMax", "OGCMX: Maximum old generation capacity (kB)"),
    field(8, "oldCommit", "OGC: Current old generation capacity (kB)"),
    field(11, "metaMax", "MCMX: Maximum metaspace capacity (kB)"),
    field(12, "metaCommit", "MC: Metaspace capacity (kB)"),
];

const OLD_GEN_FIELDS: &[GaugeField] = &[
    field(1, "metaUsed", "MU: Metaspace utilization (kB)"),
    field(5, "oldUsed", "OU: Old space utilization (kB)"),
];

const YOUNG_GEN_FIELDS: &[GaugeField] = &[
    field(2, "sv0Used", "S0U: Survivor space 0 utilization (kB)"),
    field(3, "sv1Used", "S1U: Survivor space 1 utilization (kB)"),
    field(8, "edenUsed", "EU: Eden space utilization (kB)"),
];

const FULL_GC_FIELDS: &[GaugeField] = &[
    field(14, "fgcTimes", "FGC: Number of full GC events"),
    field(15, "fgcSec", "FGCT: Full garbage collection time (s)"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatCategory {
    Capacity,
    OldGen,
    YoungGen,
    FullGc,
}

impl StatCategory {
    /// All categories, in scrape order.
    pub const ALL: [StatCategory; 4] = [
        StatCategory::Capacity,
        StatCategory::OldGen,
        StatCategory::YoungGen,
        StatCategory::FullGc,
    ];

    /// The jstat option selecting this view.
    pub fn flag(self) -> &'static str {
        match self {
            StatCategory::Capacity => "-gccapacity",
            StatCategory::OldGen => "-gcold",
            StatCategory::YoungGen => "-gcnew",
            StatCategory::FullGc => "-gc",
        }
    }

    /// Short label used in logs and self-metrics.
    pub fn label(self) -> &'static str {
        &self.flag()[1..]
    }

    pub fn fields(self) -> &'static [GaugeField] {
        match self {
            StatCategory::Capacity => CAPACITY_FIELDS,
            StatCategory::OldGen => OLD_GEN_FIELDS,
            StatCategory::YoungGen => YOUNG_GEN_FIELDS,
            StatCategory::FullGc => FULL_GC_FIELDS,
        }
    }

    /// Minimum token count a data row needs for every field to be present.
    pub fn min_tokens(self) -> usize {
        self.fields()
            .iter()
            .map(|f| f.position + 1)
            .max()
            .unwrap_or(0)
    }
}

impl fmt::Display for StatCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_match_jstat_options() {
        assert_eq!(StatCategory::Capacity.flag(), "-gccapacity");
        assert_eq!(StatCategory::OldGen.flag(), "-gcold");
        assert_eq!(StatCategory::YoungGen.flag(), "-gcnew");
        assert_eq!(StatCategory::FullGc.flag(), "-gc");
        assert_eq!(StatCategory::FullGc.label(), "gc");
    }

    #[test]
    fn test_field_positions_are_pinned() {
        let positions = |c: StatCategory| c.fields().iter().map(|f| f.position).collect::<Vec<_>>();

        assert_eq!(positions(StatCategory::Capacity), vec![1, 2, 7, 8, 11, 12]);
        assert_eq!(positions(StatCategory::OldGen), vec![1, 5]);
        assert_eq!(positions(StatCategory::YoungGen), vec![2, 3, 8]);
        assert_eq!(positions(StatCategory::FullGc), vec![14, 15]);
    }

    #[test]
    fn test_gauge_names_are_unique() {
        let mut names: Vec<&str> = StatCategory::ALL
            .iter()
            .flat_map(|c| c.fields().iter().map(|f| f.name))
            .collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
        assert_eq!(total, 13);
    }

    #[test]
    fn test_min_tokens() {
        assert_eq!(StatCategory::Capacity.min_tokens(), 13);
        assert_eq!(StatCategory::OldGen.min_tokens(), 6);
        assert_eq!(StatCategory::YoungGen.min_tokens(), 9);
        assert_eq!(StatCategory::FullGc.min_tokens(), 16);
    }
}
