//! Column mapping types

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical job fields a spreadsheet column can map to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CanonicalField {
    Property,
    UnitSize,
    Date,
    ServiceType,
    Extras,
    Notes,
    Technician,
    Completed,
}

impl CanonicalField {
    /// All fields, in heuristic matching order
    pub const ALL: [CanonicalField; 8] = [
        CanonicalField::Property,
        CanonicalField::UnitSize,
        CanonicalField::Date,
        CanonicalField::ServiceType,
        CanonicalField::Extras,
        CanonicalField::Notes,
        CanonicalField::Technician,
        CanonicalField::Completed,
    ];

    /// Fields without which a file cannot be imported
    pub const MANDATORY: [CanonicalField; 2] = [CanonicalField::Property, CanonicalField::UnitSize];

    pub fn name(self) -> &'static str {
        match self {
            CanonicalField::Property => "property",
            CanonicalField::UnitSize => "unit",
            CanonicalField::Date => "date",
            CanonicalField::ServiceType => "type",
            CanonicalField::Extras => "extras",
            CanonicalField::Notes => "notes",
            CanonicalField::Technician => "technician",
            CanonicalField::Completed => "completed",
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Column index per canonical field (`None` = column absent)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnMapping {
    pub property: Option<usize>,
    pub unit: Option<usize>,
    pub date: Option<usize>,
    pub service_type: Option<usize>,
    pub extras: Option<usize>,
    pub notes: Option<usize>,
    pub technician: Option<usize>,
    pub completed: Option<usize>,
}

impl ColumnMapping {
    pub fn get(&self, field: CanonicalField) -> Option<usize> {
        match field {
            CanonicalField::Property => self.property,
            CanonicalField::UnitSize => self.unit,
            CanonicalField::Date => self.date,
            CanonicalField::ServiceType => self.service_type,
            CanonicalField::Extras => self.extras,
            CanonicalField::Notes => self.notes,
            CanonicalField::Technician => self.technician,
            CanonicalField::Completed => self.completed,
        }
    }

    pub fn set(&mut self, field: CanonicalField, index: Option<usize>) {
        let slot = match field {
            CanonicalField::Property => &mut self.property,
            CanonicalField::UnitSize => &mut self.unit,
            CanonicalField::Date => &mut self.date,
            CanonicalField::ServiceType => &mut self.service_type,
            CanonicalField::Extras => &mut self.extras,
            CanonicalField::Notes => &mut self.notes,
            CanonicalField::Technician => &mut self.technician,
            CanonicalField::Completed => &mut self.completed,
        };
        *slot = index;
    }

    /// Mandatory fields that are still unresolved
    pub fn missing_mandatory(&self) -> Vec<CanonicalField> {
        CanonicalField::MANDATORY
            .iter()
            .copied()
            .filter(|f| self.get(*f).is_none())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_mandatory().is_empty()
    }
}

/// Wire form exchanged with the external mapping service: `-1` marks an
/// absent column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireColumnMapping {
    pub property: i64,
    pub unit: i64,
    pub date: i64,
    #[serde(rename = "type")]
    pub service_type: i64,
    pub extras: i64,
    pub notes: i64,
    pub technician: i64,
    pub completed: i64,
}

impl WireColumnMapping {
    /// Convert to a mapping, dropping negative or out-of-range indices
    pub fn into_mapping(self, column_count: usize) -> ColumnMapping {
        let index = |raw: i64| -> Option<usize> {
            usize::try_from(raw).ok().filter(|i| *i < column_count)
        };
        ColumnMapping {
            property: index(self.property),
            unit: index(self.unit),
            date: index(self.date),
            service_type: index(self.service_type),
            extras: index(self.extras),
            notes: index(self.notes),
            technician: index(self.technician),
            completed: index(self.completed),
        }
    }
}

impl From<ColumnMapping> for WireColumnMapping {
    fn from(mapping: ColumnMapping) -> Self {
        let raw = |index: Option<usize>| index.map_or(-1, |i| i as i64);
        Self {
            property: raw(mapping.property),
            unit: raw(mapping.unit),
            date: raw(mapping.date),
            service_type: raw(mapping.service_type),
            extras: raw(mapping.extras),
            notes: raw(mapping.notes),
            technician: raw(mapping.technician),
            completed: raw(mapping.completed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_mandatory_lists_both() {
        let mapping = ColumnMapping::default();
        assert_eq!(
            mapping.missing_mandatory(),
            vec![CanonicalField::Property, CanonicalField::UnitSize]
        );
        assert!(!mapping.is_complete());
    }

    #[test]
    fn test_wire_mapping_drops_negative_and_out_of_range() {
        let wire = WireColumnMapping {
            property: 0,
            unit: 7,
            date: -1,
            service_type: 2,
            extras: -1,
            notes: -1,
            technician: -1,
            completed: -1,
        };
        let mapping = wire.into_mapping(3);
        assert_eq!(mapping.property, Some(0));
        assert_eq!(mapping.unit, None);
        assert_eq!(mapping.date, None);
        assert_eq!(mapping.service_type, Some(2));
    }

    #[test]
    fn test_wire_mapping_from_mapping_uses_minus_one() {
        let mut mapping = ColumnMapping::default();
        mapping.set(CanonicalField::UnitSize, Some(4));
        let wire = WireColumnMapping::from(mapping);
        assert_eq!(wire.unit, 4);
        assert_eq!(wire.property, -1);
    }
}
