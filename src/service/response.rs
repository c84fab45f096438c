use serde::{Deserialize, Serialize};

use crate::result::column::Column;

// Shapes taken from the Athena API reference:
// https://docs.aws.amazon.com/athena/latest/APIReference/API_Operations.html

#[derive(Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct QueryExecutionContext<'a> {
    pub database: &'a str,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ResultConfiguration<'a> {
    pub output_location: &'a str,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct StartQueryExecutionInput<'a> {
    pub query_string: &'a str,
    pub query_execution_context: QueryExecutionContext<'a>,
    pub result_configuration: ResultConfiguration<'a>,

    /// Idempotency token, 32 to 128 characters.
    pub client_request_token: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_group: Option<&'a str>,

    #[serde(skip_serializing_if = "no_parameters")]
    pub execution_parameters: &'a [String],
}

fn no_parameters(params: &&[String]) -> bool {
    params.is_empty()
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct StartQueryExecutionOutput {
    pub query_execution_id: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct GetQueryExecutionInput<'a> {
    pub query_execution_id: &'a str,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
#[allow(dead_code)]
pub(crate) struct QueryExecutionStatus {
    pub state: String,
    pub state_change_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
#[allow(dead_code)]
pub(crate) struct QueryExecution {
    pub query_execution_id: Option<String>,
    pub status: QueryExecutionStatus,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct GetQueryExecutionOutput {
    pub query_execution: QueryExecution,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct GetQueryResultsInput<'a> {
    pub query_execution_id: &'a str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<&'a str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct Datum {
    pub var_char_value: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct RowData {
    #[serde(default)]
    pub data: Vec<Datum>,
}

impl RowData {
    pub fn into_values(self) -> Vec<Option<String>> {
        self.data.into_iter().map(|d| d.var_char_value).collect()
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ResultSetMetadata {
    #[serde(default)]
    pub column_info: Vec<Column>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ResultSetData {
    #[serde(default)]
    pub rows: Vec<RowData>,
    #[serde(default)]
    pub result_set_metadata: ResultSetMetadata,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct GetQueryResultsOutput {
    #[serde(default)]
    pub result_set: ResultSetData,
    pub next_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_input_skips_empty_optionals() {
        let input = StartQueryExecutionInput {
            query_string: "SELECT 1",
            query_execution_context: QueryExecutionContext { database: "produccion" },
            result_configuration: ResultConfiguration {
                output_location: "s3://bucket/out/",
            },
            client_request_token: "token".into(),
            work_group: None,
            execution_parameters: &[],
        };

        let json = serde_json::to_value(&input).expect("failed to serialise");
        assert_eq!(
            json,
            serde_json::json!({
                "QueryString": "SELECT 1",
                "QueryExecutionContext": { "Database": "produccion" },
                "ResultConfiguration": { "OutputLocation": "s3://bucket/out/" },
                "ClientRequestToken": "token",
            })
        );
    }

    #[test]
    fn decodes_results_with_missing_cells() {
        let output: GetQueryResultsOutput = serde_json::from_str(
            r#"{
                "ResultSet": {
                    "Rows": [
                        {"Data": [{"VarCharValue": "pedido"}, {"VarCharValue": "ayudante"}]},
                        {"Data": [{"VarCharValue": "1"}, {}]}
                    ],
                    "ResultSetMetadata": {"ColumnInfo": [
                        {"Name": "pedido", "Type": "bigint"},
                        {"Name": "ayudante", "Type": "varchar"}
                    ]}
                },
                "UpdateCount": 0
            }"#,
        )
        .expect("failed to decode");

        assert!(output.next_token.is_none());
        assert_eq!(output.result_set.result_set_metadata.column_info.len(), 2);
        let rows: Vec<_> = output
            .result_set
            .rows
            .into_iter()
            .map(RowData::into_values)
            .collect();
        assert_eq!(rows[1], vec![Some("1".to_string()), None]);
    }
}
