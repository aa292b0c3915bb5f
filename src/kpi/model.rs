//! KPI records and the month-indexed mapping returned to clients.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Number of KPI measurements stored per driver-month.
pub const KPI_COUNT: usize = 9;

/// One stored row for a (driver, year, month).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KpiRow {
    pub month: i64,
    /// kpi_1..kpi_9 in column order.
    pub values: [i64; KPI_COUNT],
}

impl KpiRow {
    /// Build a row from nullable store values; absent values become 0.
    pub fn from_nullable(month: i64, values: [Option<i64>; KPI_COUNT]) -> Self {
        Self {
            month,
            values: values.map(|v| v.unwrap_or(0)),
        }
    }
}

/// Month (as string key) to KPI values, kept in insertion order.
///
/// Serializes as a JSON object. Re-inserting a month overwrites its values
/// without moving it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonthlyKpis {
    entries: Vec<(String, [i64; KPI_COUNT])>,
}

impl MonthlyKpis {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the mapping from rows in the order the store produced them.
    pub fn from_rows<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = &'a KpiRow>,
    {
        let mut data = Self::new();
        for row in rows {
            data.insert(row.month.to_string(), row.values);
        }
        data
    }

    pub fn insert(&mut self, month: String, values: [i64; KPI_COUNT]) {
        match self.entries.iter_mut().find(|(m, _)| *m == month) {
            Some(entry) => entry.1 = values,
            None => self.entries.push((month, values)),
        }
    }

    pub fn get(&self, month: &str) -> Option<&[i64; KPI_COUNT]> {
        self.entries
            .iter()
            .find(|(m, _)| m == month)
            .map(|(_, values)| values)
    }

    pub fn months(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(m, _)| m.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for MonthlyKpis {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (month, values) in &self.entries {
            map.serialize_entry(month, values)?;
        }
        map.end()
    }
}
