//! Result frame models

use serde::{Deserialize, Serialize};

/// A named series or table produced for one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultFrame {
    /// Query this frame answers
    pub ref_id: String,
    /// Series or table name
    pub name: String,
    /// Frame payload
    #[serde(flatten)]
    pub data: FrameData,
}

/// Frame payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FrameData {
    /// `(value, epoch_millis)` pairs; missing values are `None`
    TimeSeries { datapoints: Vec<(Option<f64>, i64)> },
    /// Columnar table
    Table {
        columns: Vec<TableColumn>,
        rows: Vec<Vec<serde_json::Value>>,
    },
}

/// Column of a table frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableColumn {
    pub text: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none", default)]
    pub column_type: Option<String>,
}

impl TableColumn {
    pub fn new(text: impl Into<String>, column_type: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            column_type: Some(column_type.into()),
        }
    }
}

impl ResultFrame {
    /// Create a time-series frame
    pub fn time_series(
        ref_id: impl Into<String>,
        name: impl Into<String>,
        datapoints: Vec<(Option<f64>, i64)>,
    ) -> Self {
        Self {
            ref_id: ref_id.into(),
            name: name.into(),
            data: FrameData::TimeSeries { datapoints },
        }
    }

    /// Create a table frame
    pub fn table(
        ref_id: impl Into<String>,
        name: impl Into<String>,
        columns: Vec<TableColumn>,
        rows: Vec<Vec<serde_json::Value>>,
    ) -> Self {
        Self {
            ref_id: ref_id.into(),
            name: name.into(),
            data: FrameData::Table { columns, rows },
        }
    }
}

/// One emission of query results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Frames in backend order
    pub data: Vec<ResultFrame>,
    /// Emission key, used by live backends to identify the stream
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub key: Option<String>,
}

impl QueryResponse {
    /// A response with no frames
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(data: Vec<ResultFrame>) -> Self {
        Self { data, key: None }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Concatenate the frames of several responses, keeping each
    /// response's frames in order. Keys are dropped.
    pub fn merge(responses: impl IntoIterator<Item = QueryResponse>) -> Self {
        Self::new(responses.into_iter().flat_map(|r| r.data).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// `refId` of every frame, in order
    pub fn ref_ids(&self) -> Vec<&str> {
        self.data.iter().map(|f| f.ref_id.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn merge_keeps_order_within_each_response() {
        let first = QueryResponse::new(vec![
            ResultFrame::time_series("A", "cpu", vec![]),
            ResultFrame::time_series("B", "mem", vec![]),
        ])
        .with_key("ai");
        let second = QueryResponse::new(vec![ResultFrame::time_series("C", "disk", vec![])]);

        let merged = QueryResponse::merge([first, QueryResponse::empty(), second]);
        assert_eq!(merged.ref_ids(), vec!["A", "B", "C"]);
        assert_eq!(merged.key, None);
    }

    #[test]
    fn time_series_frame_serializes_with_type_tag() {
        let frame = ResultFrame::time_series("A", "Percentage CPU", vec![(Some(1.5), 1000), (None, 2000)]);
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "refId": "A",
                "name": "Percentage CPU",
                "type": "time_series",
                "datapoints": [[1.5, 1000], [null, 2000]]
            })
        );
    }

    #[test]
    fn table_frame_deserializes() {
        let frame: ResultFrame = serde_json::from_value(serde_json::json!({
            "refId": "B",
            "name": "PrimaryResult",
            "type": "table",
            "columns": [{ "text": "Computer", "type": "string" }, { "text": "Count" }],
            "rows": [["vm-1", 3]]
        }))
        .unwrap();

        match frame.data {
            FrameData::Table { columns, rows } => {
                assert_eq!(columns[0], TableColumn::new("Computer", "string"));
                assert_eq!(columns[1].column_type, None);
                assert_eq!(rows.len(), 1);
            }
            other => panic!("expected table, got {:?}", other),
        }
    }
}
