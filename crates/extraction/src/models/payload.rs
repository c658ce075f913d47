use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Body returned by `POST /biserver/extract-and-separate`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionResponse {
    pub success: bool,
    pub message: Option<String>,
    pub stats: ExtractionStats,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionStats {
    pub extracted: ExtractedStats,
    pub saved: SavedStats,
    pub valores: ValueStats,
    pub corrections: CorrectionStats,
}

/// Counts reported for the raw download and SIGTAP filtering
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractedStats {
    pub total: u64,
    pub removed: u64,
    pub removed_sem_registro: u64,
    pub converted: u64,
}

impl ExtractedStats {
    /// Records dropped for not matching a BPA record type
    ///
    /// Older backends only fill `removed_sem_registro`.
    pub fn removed_count(&self) -> u64 {
        if self.removed > 0 {
            self.removed
        } else {
            self.removed_sem_registro
        }
    }
}

/// Records persisted per category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SavedStats {
    pub bpa_i: u64,
    pub bpa_c: u64,
}

impl SavedStats {
    pub fn total(&self) -> u64 {
        self.bpa_i + self.bpa_c
    }
}

/// Estimated value in BRL
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueStats {
    pub bpa_i: f64,
    pub bpa_c: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectionStats {
    pub bpai: Option<CorrectionSummary>,
    pub bpac: Option<CorrectionSummary>,
}

/// Output of the backend's correction rules for one category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectionSummary {
    pub corrected: u64,
    pub deleted: u64,
    pub correction_types: BTreeMap<String, u64>,
}

impl CorrectionSummary {
    /// `corrigidos=N, removidos=M`
    pub fn describe(&self) -> String {
        format!("corrigidos={}, removidos={}", self.corrected, self.deleted)
    }

    /// The `limit` most frequent correction types, rendered `tipo=count, ...`
    ///
    /// Returns `None` when no types were reported.
    pub fn top_types(&self, limit: usize) -> Option<String> {
        let mut types: Vec<(&String, &u64)> = self.correction_types.iter().collect();
        // BTreeMap iteration is sorted by name, the stable sort keeps that for ties
        types.sort_by(|a, b| b.1.cmp(a.1));
        let top = types
            .into_iter()
            .take(limit)
            .map(|(name, count)| format!("{}={}", name, count))
            .collect::<Vec<_>>()
            .join(", ");
        if top.is_empty() { None } else { Some(top) }
    }
}

/// Body of a non-2xx response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorBody {
    pub detail: Option<String>,
}

/// Body returned by `GET /biserver/test-connection`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionTestResponse {
    pub success: bool,
    pub mock: bool,
    pub message: Option<String>,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_response() {
        let body = r#"{
            "success": true,
            "message": "Extração concluída",
            "stats": {
                "extracted": {"total": 500, "removed": 20, "converted": 4},
                "saved": {"bpa_i": 300, "bpa_c": 180},
                "valores": {"bpa_i": 40000.0, "bpa_c": 5230.5, "total": 45230.50},
                "corrections": {
                    "bpai": {"corrected": 12, "deleted": 2, "correction_types": {"cns_invalido": 5, "cbo_ajustado": 7}},
                    "bpac": {"corrected": 1, "deleted": 0}
                }
            },
            "errors": ["BPA-I #4: data inválida"]
        }"#;

        let response: ExtractionResponse = serde_json::from_str(body).unwrap();
        assert!(response.success);
        assert_eq!(response.stats.extracted.total, 500);
        assert_eq!(response.stats.extracted.removed_count(), 20);
        assert_eq!(response.stats.saved.total(), 480);
        assert_eq!(response.stats.valores.total, 45230.50);
        let bpai = response.stats.corrections.bpai.as_ref().unwrap();
        assert_eq!(bpai.describe(), "corrigidos=12, removidos=2");
        assert_eq!(response.stats.corrections.bpac.as_ref().unwrap().correction_types.len(), 0);
        assert_eq!(response.errors.len(), 1);
    }

    #[test]
    fn test_missing_sections_default_to_zero() {
        let response: ExtractionResponse = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert_eq!(response.stats.extracted.total, 0);
        assert_eq!(response.stats.saved.total(), 0);
        assert!(response.stats.corrections.bpai.is_none());
        assert!(response.message.is_none());
        assert!(response.errors.is_empty());
    }

    #[test]
    fn test_removed_falls_back_to_sem_registro() {
        let stats: ExtractedStats =
            serde_json::from_str(r#"{"total": 10, "removed_sem_registro": 3}"#).unwrap();
        assert_eq!(stats.removed_count(), 3);
    }

    #[test]
    fn test_top_types_orders_by_count_then_name() {
        let summary = CorrectionSummary {
            corrected: 0,
            deleted: 0,
            correction_types: [
                ("idade".to_string(), 2),
                ("cbo".to_string(), 9),
                ("cns".to_string(), 2),
                ("sexo".to_string(), 1),
            ]
            .into_iter()
            .collect(),
        };
        assert_eq!(summary.top_types(3).as_deref(), Some("cbo=9, cns=2, idade=2"));
        assert_eq!(CorrectionSummary::default().top_types(3), None);
    }

    #[test]
    fn test_error_and_connection_bodies() {
        let body: ErrorBody = serde_json::from_str(r#"{"detail": "timeout upstream"}"#).unwrap();
        assert_eq!(body.detail.as_deref(), Some("timeout upstream"));

        let status: ConnectionTestResponse =
            serde_json::from_str(r#"{"success": true, "mock": true, "message": "Modo mock"}"#).unwrap();
        assert!(status.success && status.mock);
    }
}
