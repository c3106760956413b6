//! Error taxonomy for the dashboard core.
//!
//! Every remote operation returns a `PlatformError` variant instead of
//! panicking or collapsing into a generic failure. The raw response body from
//! the platform is kept verbatim in `detail` so the presentation layer can
//! show a short summary (the Display form) with the full remote text below
//! it. All variants are `Clone` because partial-success results carry them
//! alongside data.

use thiserror::Error;

pub type PlatformResult<T> = Result<T, PlatformError>;

/// Which listing endpoint an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Project,
    Dataset,
    Space,
    Deployment,
    Job,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Project => "project",
            ResourceKind::Dataset => "dataset",
            ResourceKind::Space => "space",
            ResourceKind::Deployment => "deployment",
            ResourceKind::Job => "job",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which step of the three-step dataset load failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadStage {
    Metadata,
    Attachment,
    Parse,
}

impl LoadStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadStage::Metadata => "metadata",
            LoadStage::Attachment => "attachment",
            LoadStage::Parse => "parse",
        }
    }
}

impl std::fmt::Display for LoadStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PlatformError {
    #[error("authentication failed")]
    Auth { detail: String },

    #[error("listing {kind}s failed")]
    Listing { kind: ResourceKind, detail: String },

    #[error("dataset load failed at the {stage} step")]
    DatasetLoad { stage: LoadStage, detail: String },

    #[error("deployment resolution failed")]
    Deployment { detail: String },

    #[error("prediction request failed")]
    Prediction { detail: String },

    /// A response violated a named shape contract: the binary-classification
    /// scoring layout (first row, last two slots = class then probability in
    /// [0,1]) or a known asset kind.
    #[error("response shape mismatch")]
    ResponseShape { detail: String },

    #[error("job trigger failed")]
    JobTrigger { detail: String },
}

impl PlatformError {
    pub fn auth(detail: impl Into<String>) -> Self {
        PlatformError::Auth { detail: detail.into() }
    }

    pub fn listing(kind: ResourceKind, detail: impl Into<String>) -> Self {
        PlatformError::Listing { kind, detail: detail.into() }
    }

    pub fn dataset(stage: LoadStage, detail: impl Into<String>) -> Self {
        PlatformError::DatasetLoad { stage, detail: detail.into() }
    }

    pub fn deployment(detail: impl Into<String>) -> Self {
        PlatformError::Deployment { detail: detail.into() }
    }

    pub fn prediction(detail: impl Into<String>) -> Self {
        PlatformError::Prediction { detail: detail.into() }
    }

    pub fn shape(detail: impl Into<String>) -> Self {
        PlatformError::ResponseShape { detail: detail.into() }
    }

    pub fn job_trigger(detail: impl Into<String>) -> Self {
        PlatformError::JobTrigger { detail: detail.into() }
    }

    /// Raw remote response body (or local parser text), unmodified.
    pub fn detail(&self) -> &str {
        match self {
            PlatformError::Auth { detail }
            | PlatformError::Listing { detail, .. }
            | PlatformError::DatasetLoad { detail, .. }
            | PlatformError::Deployment { detail }
            | PlatformError::Prediction { detail }
            | PlatformError::ResponseShape { detail }
            | PlatformError::JobTrigger { detail } => detail,
        }
    }
}

/// Errors from the pure chart-data builders. No remote text is involved, so
/// these carry structured fields instead of a detail blob.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum VizError {
    #[error("not enough data to build this chart")]
    EmptyInput,

    #[error("column {name} not found")]
    UnknownColumn { name: String },

    #[error("column {name} is not {expected}")]
    ColumnType { name: String, expected: &'static str },

    #[error("cannot form {requested} bins: only {distinct} distinct quantile edges")]
    InsufficientCardinality { requested: usize, distinct: usize },

    #[error("array length mismatch: expected {expected}, got {got}")]
    LengthMismatch { expected: usize, got: usize },
}

impl VizError {
    pub fn unknown_column(name: impl Into<String>) -> Self {
        VizError::UnknownColumn { name: name.into() }
    }

    pub fn column_type(name: impl Into<String>, expected: &'static str) -> Self {
        VizError::ColumnType { name: name.into(), expected }
    }
}

/// Errors from the prediction-form state machine.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FormError {
    #[error("cannot {action} while {state}")]
    Transition { action: &'static str, state: &'static str },

    #[error("row {idx} out of range ({rows} rows)")]
    RowOutOfRange { idx: usize, rows: usize },

    #[error("field {name} is not part of the active payload")]
    UnknownField { name: String },

    #[error("field {name} expects a number")]
    NotNumeric { name: String },

    #[error("value {value:?} was never observed in column {name}")]
    ValueNotObserved { name: String, value: String },
}

/// Either side of a one-call form submission: the machine refused the
/// transition, or the scoring request itself failed.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SubmitError {
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Scoring(#[from] PlatformError),
}

/// Workflow guards on the session context. Each message doubles as the hint
/// shown when a page is opened out of order.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SessionError {
    #[error("authenticate first")]
    NotAuthenticated,

    #[error("select a {kind} first")]
    MissingSelection { kind: ResourceKind },

    #[error("load a dataset first")]
    NoTable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_is_kept_verbatim() {
        let body = "{\"trace\":\"abc\",\"errors\":[{\"code\":\"invalid_grant\"}]}";
        let err = PlatformError::auth(body);
        assert_eq!(err.detail(), body);
        assert_eq!(err.to_string(), "authentication failed");
    }

    #[test]
    fn listing_display_names_the_kind() {
        let err = PlatformError::listing(ResourceKind::Space, "boom");
        assert_eq!(err.to_string(), "listing spaces failed");
        assert_eq!(err.detail(), "boom");
    }

    #[test]
    fn load_stage_is_tagged() {
        let err = PlatformError::dataset(LoadStage::Attachment, "404 not found");
        match err {
            PlatformError::DatasetLoad { stage, .. } => assert_eq!(stage, LoadStage::Attachment),
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn shape_is_distinct_from_prediction() {
        let shape = PlatformError::shape("row too short");
        let pred = PlatformError::prediction("500 oops");
        assert_ne!(
            std::mem::discriminant(&shape),
            std::mem::discriminant(&pred)
        );
    }

    #[test]
    fn viz_errors_render_their_fields() {
        let err = VizError::InsufficientCardinality { requested: 10, distinct: 1 };
        assert_eq!(
            err.to_string(),
            "cannot form 10 bins: only 1 distinct quantile edges"
        );
        let err = VizError::column_type("age", "numeric");
        assert_eq!(err.to_string(), "column age is not numeric");
    }
}
