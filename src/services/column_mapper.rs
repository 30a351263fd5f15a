//! Column mapping: header heuristics with an optional external fallback
//!
//! Headers are matched against bilingual (English/Spanish) substring
//! patterns. When the mandatory property and unit columns cannot be found,
//! an injected `ColumnMappingService` is asked instead. The service is
//! optional; without it the mapper runs in heuristics-only mode.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::error::MappingServiceError;
use crate::types::{CanonicalField, CellValue, ColumnMapping};

/// External column-mapping capability (AI classifier, rules service, ...)
#[async_trait]
pub trait ColumnMappingService: Send + Sync {
    /// Map raw headers to canonical fields, using one sample data row
    async fn map_columns(
        &self,
        headers: &[String],
        sample_row: &[String],
    ) -> Result<ColumnMapping, MappingServiceError>;

    /// Get service name for logging
    fn name(&self) -> &str;
}

/// Substring patterns per field, tried in order
fn patterns(field: CanonicalField) -> &'static [&'static str] {
    match field {
        CanonicalField::Property => &["property", "propiedad", "community", "comunidad", "complex", "complejo"],
        CanonicalField::UnitSize => &["unit", "unidad", "apt", "apartamento", "size", "tamaño"],
        CanonicalField::Date => &["date", "fecha", "day", "día"],
        CanonicalField::ServiceType => &["type", "tipo", "service", "servicio", "work", "trabajo"],
        CanonicalField::Extras => &["extra", "adicional"],
        CanonicalField::Notes => &["note", "nota", "comment", "comentario"],
        CanonicalField::Technician => &[
            "tech", "técnico", "tecnico", "employee", "empleado", "painter", "pintor", "cleaner",
            "assigned", "asignado",
        ],
        CanonicalField::Completed => &[
            "complete", "completado", "done", "hecho", "finished", "terminado", "status", "estado",
        ],
    }
}

/// Match headers against the field patterns.
///
/// Fields are resolved in `CanonicalField::ALL` order; the first unclaimed
/// header containing any of a field's patterns wins and is not reused for
/// later fields.
pub fn map_by_heuristics(headers: &[String]) -> ColumnMapping {
    let normalized: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
    let mut claimed = vec![false; normalized.len()];
    let mut mapping = ColumnMapping::default();

    for field in CanonicalField::ALL {
        let found = normalized.iter().enumerate().find(|(i, header)| {
            !claimed[*i]
                && !header.is_empty()
                && patterns(field).iter().any(|p| header.contains(p))
        });
        if let Some((index, _)) = found {
            claimed[index] = true;
            mapping.set(field, Some(index));
        }
    }

    mapping
}

/// Column mapper: heuristics first, then the external service if any
pub struct ColumnMapper {
    service: Option<Box<dyn ColumnMappingService>>,
    timeout: Duration,
}

impl ColumnMapper {
    /// Heuristics-only mapper
    pub fn heuristics_only() -> Self {
        Self {
            service: None,
            timeout: Duration::from_secs(crate::defaults::DEFAULT_MAPPER_TIMEOUT_SECS),
        }
    }

    pub fn with_service(service: Box<dyn ColumnMappingService>, timeout: Duration) -> Self {
        Self {
            service: Some(service),
            timeout,
        }
    }

    pub fn has_service(&self) -> bool {
        self.service.is_some()
    }

    /// Resolve a mapping for one file.
    ///
    /// Returns the best mapping found; callers check `missing_mandatory()`
    /// to decide whether the file can be imported. Service failures are
    /// logged and never propagated.
    pub async fn map(&self, headers: &[CellValue], sample_row: &[CellValue]) -> ColumnMapping {
        let headers: Vec<String> = headers.iter().map(CellValue::as_text).collect();
        let mut mapping = map_by_heuristics(&headers);

        if mapping.is_complete() {
            debug!("Heuristics mapped all required columns");
            return mapping;
        }

        let Some(service) = &self.service else {
            debug!("Heuristics incomplete and no mapping service configured");
            return mapping;
        };

        let sample: Vec<String> = sample_row.iter().map(CellValue::as_text).collect();
        info!(
            "Heuristics missing {:?}, asking {} for a column mapping",
            mapping.missing_mandatory(),
            service.name()
        );

        let result = match tokio::time::timeout(self.timeout, service.map_columns(&headers, &sample)).await {
            Ok(result) => result,
            Err(_) => Err(MappingServiceError::Timeout(self.timeout.as_secs())),
        };

        match result {
            Ok(suggested) => {
                for field in CanonicalField::ALL {
                    if let Some(index) = suggested.get(field).filter(|i| *i < headers.len()) {
                        mapping.set(field, Some(index));
                    }
                }
            }
            Err(e) => {
                warn!("Column mapping service {} failed: {}", service.name(), e);
            }
        }

        mapping
    }
}

// =============================================================================
// MOCK SERVICE
// =============================================================================

/// Deterministic mapping service for tests and offline development.
///
/// Returns the configured mapping, fails, or sleeps past any sane timeout.
pub struct MockColumnMapper {
    behavior: MockBehavior,
}

enum MockBehavior {
    Returns(ColumnMapping),
    Fails,
    Hangs,
}

impl MockColumnMapper {
    pub fn returning(mapping: ColumnMapping) -> Self {
        Self {
            behavior: MockBehavior::Returns(mapping),
        }
    }

    pub fn failing() -> Self {
        Self {
            behavior: MockBehavior::Fails,
        }
    }

    pub fn hanging() -> Self {
        Self {
            behavior: MockBehavior::Hangs,
        }
    }
}

#[async_trait]
impl ColumnMappingService for MockColumnMapper {
    async fn map_columns(
        &self,
        _headers: &[String],
        _sample_row: &[String],
    ) -> Result<ColumnMapping, MappingServiceError> {
        match &self.behavior {
            MockBehavior::Returns(mapping) => Ok(*mapping),
            MockBehavior::Fails => Err(MappingServiceError::Unmappable),
            MockBehavior::Hangs => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(MappingServiceError::Unavailable("hung".to_string()))
            }
        }
    }

    fn name(&self) -> &str {
        "MockColumnMapper"
    }
}
