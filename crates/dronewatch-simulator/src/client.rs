//! GraphQL client for report submission.

use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::{Value, json};

const INGEST_MUTATION: &str = r"
    mutation IngestReport($report: JSON!) {
        ingestReport(report: $report) {
            reportId
            violationCount
        }
    }
";

/// How the service answered one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    Ingested { report_id: String, violations: u64 },
    Duplicate,
    Rejected { code: String, message: String },
}

impl IngestOutcome {
    /// Interpret a GraphQL response body.
    #[must_use]
    pub fn from_response(body: &Value) -> Self {
        if let Some(error) = body["errors"].as_array().and_then(|errors| errors.first()) {
            let code = error["extensions"]["code"]
                .as_str()
                .unwrap_or("UNKNOWN")
                .to_string();
            if code == "DUPLICATE_REPORT" {
                return Self::Duplicate;
            }
            return Self::Rejected {
                code,
                message: error["message"].as_str().unwrap_or_default().to_string(),
            };
        }

        let ingested = &body["data"]["ingestReport"];
        match ingested["reportId"].as_str() {
            Some(report_id) => Self::Ingested {
                report_id: report_id.to_string(),
                violations: ingested["violationCount"].as_u64().unwrap_or_default(),
            },
            None => Self::Rejected {
                code: "EMPTY_RESPONSE".to_string(),
                message: body.to_string(),
            },
        }
    }
}

/// Posts reports to the `ingestReport` mutation.
pub struct IngestClient {
    http: Client,
    api_url: String,
}

impl IngestClient {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_url: api_url.into(),
        }
    }

    /// # Errors
    ///
    /// Fails on transport errors or a non-JSON response.
    pub async fn submit(&self, report: &Value) -> Result<IngestOutcome> {
        let response = self
            .http
            .post(&self.api_url)
            .json(&json!({
                "query": INGEST_MUTATION,
                "variables": { "report": report }
            }))
            .send()
            .await
            .with_context(|| format!("POST {}", self.api_url))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .with_context(|| format!("API returned status {status} without a JSON body"))?;
        Ok(IngestOutcome::from_response(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcomes() {
        let ok = json!({"data": {"ingestReport": {"reportId": "D1_2025-01-10_x", "violationCount": 3}}});
        assert_eq!(
            IngestOutcome::from_response(&ok),
            IngestOutcome::Ingested {
                report_id: "D1_2025-01-10_x".into(),
                violations: 3
            }
        );

        let dup = json!({"data": null, "errors": [{"message": "exists", "extensions": {"code": "DUPLICATE_REPORT"}}]});
        assert_eq!(IngestOutcome::from_response(&dup), IngestOutcome::Duplicate);

        let bad = json!({"errors": [{"message": "validation failed", "extensions": {"code": "VALIDATION_ERROR"}}]});
        assert!(matches!(
            IngestOutcome::from_response(&bad),
            IngestOutcome::Rejected { code, .. } if code == "VALIDATION_ERROR"
        ));
    }
}
