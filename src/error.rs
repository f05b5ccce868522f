use thiserror::Error;

/// Failures talking to the web search provider.
///
/// The candidate resolver recovers from all of these by skipping the
/// query variant that produced them.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("search API returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("malformed search response: {0}")]
    Malformed(String),
}

/// Failures fetching a profile from the enrichment provider.
#[derive(Error, Debug)]
pub enum EnrichmentError {
    #[error("enrichment request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("enrichment API returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("enrichment response has no `person` payload")]
    MissingPayload,

    #[error("malformed enrichment response: {0}")]
    Malformed(String),

    #[error("no enrichment API key configured (set [enrichment] api_key or enable offline mode)")]
    MissingApiKey,
}

/// The model output did not match the summary schema.
///
/// Never leaves the summary generator: it is replaced by the fallback summary.
#[derive(Error, Debug)]
pub enum SchemaParseError {
    #[error("no JSON object found in model output")]
    NoJsonObject,

    #[error("model output does not match the summary schema: {0}")]
    Invalid(#[from] serde_json::Error),
}

/// Errors surfaced by the pipeline entry points.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("no profile found for '{0}'")]
    NoProfileFound(String),

    #[error("no candidate was selected")]
    SelectionCancelled,

    #[error(transparent)]
    Enrichment(#[from] EnrichmentError),
}
