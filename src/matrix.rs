//! Distance matrix model, validation and cost extraction.

use serde::{Deserialize, Serialize};

use crate::error::{OptimizeError, ProviderError};
use crate::traits::{DepartureTime, DistanceMatrixProvider, TravelMode};

/// Transit costs indexed by `[from][to]`. `None` marks an arc that cannot be
/// traversed.
pub type CostMatrix = Vec<Vec<Option<u64>>>;

/// Per-element status code as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ElementStatus {
    Ok,
    NotFound,
    ZeroResults,
    MaxRouteLengthExceeded,
    Other(String),
}

impl From<String> for ElementStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "OK" => ElementStatus::Ok,
            "NOT_FOUND" => ElementStatus::NotFound,
            "ZERO_RESULTS" => ElementStatus::ZeroResults,
            "MAX_ROUTE_LENGTH_EXCEEDED" => ElementStatus::MaxRouteLengthExceeded,
            _ => ElementStatus::Other(value),
        }
    }
}

impl From<ElementStatus> for String {
    fn from(value: ElementStatus) -> Self {
        match value {
            ElementStatus::Ok => "OK".to_string(),
            ElementStatus::NotFound => "NOT_FOUND".to_string(),
            ElementStatus::ZeroResults => "ZERO_RESULTS".to_string(),
            ElementStatus::MaxRouteLengthExceeded => "MAX_ROUTE_LENGTH_EXCEEDED".to_string(),
            ElementStatus::Other(code) => code,
        }
    }
}

/// A display text plus its numeric value (metres or seconds).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextValue {
    pub text: String,
    pub value: u64,
}

/// One origin/destination cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixElement {
    pub status: ElementStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<TextValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<TextValue>,
}

impl MatrixElement {
    /// A successful cell with both distance and duration.
    pub fn ok(distance_m: u64, duration_secs: u64, duration_text: impl Into<String>) -> Self {
        Self {
            status: ElementStatus::Ok,
            distance: Some(TextValue {
                text: format!("{} m", distance_m),
                value: distance_m,
            }),
            duration: Some(TextValue {
                text: duration_text.into(),
                value: duration_secs,
            }),
        }
    }

    /// A cell with the given status and no payload.
    pub fn with_status(status: ElementStatus) -> Self {
        Self {
            status,
            distance: None,
            duration: None,
        }
    }

    fn cost(&self, metric: CostMetric) -> Option<u64> {
        if self.status != ElementStatus::Ok {
            return None;
        }
        match metric {
            CostMetric::Distance => self.distance.as_ref().map(|d| d.value),
            CostMetric::Duration => self.duration.as_ref().map(|d| d.value),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixRow {
    pub elements: Vec<MatrixElement>,
}

/// Which numeric field of a cell drives the transit cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CostMetric {
    #[default]
    Distance,
    Duration,
}

/// Origin x destination matrix as returned by a provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistanceMatrix {
    #[serde(default)]
    pub origin_addresses: Vec<String>,
    #[serde(default)]
    pub destination_addresses: Vec<String>,
    #[serde(default)]
    pub rows: Vec<MatrixRow>,
}

impl DistanceMatrix {
    pub fn from_rows(rows: Vec<Vec<MatrixElement>>) -> Self {
        Self {
            origin_addresses: Vec::new(),
            destination_addresses: Vec::new(),
            rows: rows.into_iter().map(|elements| MatrixRow { elements }).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn element(&self, from: usize, to: usize) -> Option<&MatrixElement> {
        self.rows.get(from).and_then(|row| row.elements.get(to))
    }

    /// Check shape and reachability against the requested destinations.
    ///
    /// Fails with [`OptimizeError::Unreachable`] for the first origin whose
    /// every element is `ZERO_RESULTS`.
    pub fn validate(&self, destinations: &[String]) -> Result<(), OptimizeError> {
        let expected = destinations.len();
        let square = self.rows.len() == expected
            && self.rows.iter().all(|row| row.elements.len() == expected);
        if !square {
            let widths = self
                .rows
                .iter()
                .map(|row| row.elements.len().to_string())
                .collect::<Vec<_>>()
                .join(",");
            return Err(OptimizeError::MalformedMatrix {
                expected,
                found: format!("{} rows [{}]", self.rows.len(), widths),
            });
        }

        for (origin, row) in destinations.iter().zip(&self.rows) {
            let unreachable = !row.elements.is_empty()
                && row
                    .elements
                    .iter()
                    .all(|element| element.status == ElementStatus::ZeroResults);
            if unreachable {
                return Err(OptimizeError::Unreachable {
                    origin: origin.clone(),
                });
            }
        }

        Ok(())
    }

    /// Reshape into a plain cost array. The diagonal is always zero.
    pub fn cost_matrix(&self, metric: CostMetric) -> CostMatrix {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                row.elements
                    .iter()
                    .enumerate()
                    .map(|(j, element)| if i == j { Some(0) } else { element.cost(metric) })
                    .collect()
            })
            .collect()
    }

    /// Display text of the duration on edge `from -> to`, if present.
    pub fn duration_text(&self, from: usize, to: usize) -> Option<&str> {
        self.element(from, to)
            .and_then(|element| element.duration.as_ref())
            .map(|duration| duration.text.as_str())
    }
}

/// In-memory provider returning a fixed matrix regardless of request.
#[derive(Debug, Clone)]
pub struct StaticMatrix {
    matrix: DistanceMatrix,
}

impl StaticMatrix {
    pub fn new(matrix: DistanceMatrix) -> Self {
        Self { matrix }
    }
}

impl DistanceMatrixProvider for StaticMatrix {
    fn matrix_for(
        &self,
        _destinations: &[String],
        _mode: TravelMode,
        _departure: DepartureTime,
    ) -> Result<DistanceMatrix, ProviderError> {
        Ok(self.matrix.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn zero() -> MatrixElement {
        MatrixElement::with_status(ElementStatus::ZeroResults)
    }

    #[test]
    fn test_parse_provider_row() {
        let json = r#"{
            "origin_addresses": ["A"],
            "destination_addresses": ["A"],
            "rows": [{"elements": [
                {"status": "OK", "distance": {"text": "1 km", "value": 1000},
                 "duration": {"text": "3 mins", "value": 180}}
            ]}]
        }"#;
        let matrix: DistanceMatrix = serde_json::from_str(json).unwrap();
        let element = matrix.element(0, 0).unwrap();
        assert_eq!(element.status, ElementStatus::Ok);
        assert_eq!(element.duration.as_ref().unwrap().value, 180);
        assert_eq!(matrix.duration_text(0, 0), Some("3 mins"));
    }

    #[test]
    fn test_unknown_status_kept_verbatim() {
        let element: MatrixElement = serde_json::from_str(r#"{"status": "SOMETHING_NEW"}"#).unwrap();
        assert_eq!(element.status, ElementStatus::Other("SOMETHING_NEW".to_string()));
        assert!(element.duration.is_none());
    }

    #[test]
    fn test_validate_reports_first_unreachable_origin() {
        let matrix = DistanceMatrix::from_rows(vec![
            vec![MatrixElement::ok(0, 0, "0 mins"), MatrixElement::ok(10, 60, "1 min"), MatrixElement::ok(10, 60, "1 min")],
            vec![zero(), zero(), zero()],
            vec![zero(), zero(), zero()],
        ]);
        let err = matrix.validate(&names(&["A", "B", "C"])).unwrap_err();
        match err {
            OptimizeError::Unreachable { origin } => assert_eq!(origin, "B"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_validate_partial_zero_results_is_fine() {
        let matrix = DistanceMatrix::from_rows(vec![
            vec![MatrixElement::ok(0, 0, "0 mins"), zero()],
            vec![MatrixElement::ok(10, 60, "1 min"), MatrixElement::ok(0, 0, "0 mins")],
        ]);
        assert!(matrix.validate(&names(&["A", "B"])).is_ok());
    }

    #[test]
    fn test_validate_rejects_non_square() {
        let matrix = DistanceMatrix::from_rows(vec![vec![MatrixElement::ok(0, 0, "0 mins")]]);
        let err = matrix.validate(&names(&["A", "B"])).unwrap_err();
        assert!(matches!(err, OptimizeError::MalformedMatrix { expected: 2, .. }));
    }

    #[test]
    fn test_cost_matrix_marks_unusable_arcs() {
        let matrix = DistanceMatrix::from_rows(vec![
            vec![zero(), MatrixElement::ok(500, 60, "1 min")],
            vec![MatrixElement::with_status(ElementStatus::NotFound), zero()],
        ]);
        let costs = matrix.cost_matrix(CostMetric::Distance);
        assert_eq!(costs, vec![vec![Some(0), Some(500)], vec![None, Some(0)]]);

        let durations = matrix.cost_matrix(CostMetric::Duration);
        assert_eq!(durations[0][1], Some(60));
    }
}
