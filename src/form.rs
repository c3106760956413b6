//! Prediction form state machine.
//!
//! The form walks a fixed lifecycle: no selection, row selected, prediction
//! in flight, prediction shown. A selected row seeds an editable payload
//! from the table; edits are validated against the column the field came
//! from. The probability pair follows one rule with no exceptions: the
//! previous probability moves only when a new prediction succeeds, so the
//! displayed delta always compares two real model answers.

use serde_json::Value;

use crate::error::{FormError, PlatformResult, SubmitError};
use crate::platform::{AuthToken, DeploymentDetails, Prediction, Scorer};
use crate::platform::scoring::filter_by_schema;
use crate::table::{Cell, Column, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    NoSelection,
    RowSelected,
    Predicting,
    Predicted,
}

impl FormState {
    fn describe(&self) -> &'static str {
        match self {
            FormState::NoSelection => "no row is selected",
            FormState::RowSelected => "a row is selected",
            FormState::Predicting => "a prediction is in flight",
            FormState::Predicted => "a prediction is shown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Numeric,
    Categorical,
}

/// One editable input. Categorical fields carry the distinct values seen in
/// their column, which is exactly the dropdown the page renders.
#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub name: String,
    pub kind: FieldKind,
    pub choices: Vec<String>,
    pub value: Cell,
}

#[derive(Debug, Clone)]
pub struct PredictionForm {
    state: FormState,
    /// Names the model's input schema declares, when known. The submitted
    /// payload is filtered down to these.
    input_fields: Option<Vec<String>>,
    selected_row: Option<usize>,
    fields: Vec<FormField>,
    current: Option<f64>,
    previous: Option<f64>,
    label: Option<Value>,
    last_error: Option<String>,
}

impl PredictionForm {
    pub fn new(input_fields: Option<Vec<String>>) -> Self {
        Self {
            state: FormState::NoSelection,
            input_fields,
            selected_row: None,
            fields: Vec::new(),
            current: None,
            previous: None,
            label: None,
            last_error: None,
        }
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn selected_row(&self) -> Option<usize> {
        self.selected_row
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn current_probability(&self) -> Option<f64> {
        self.current
    }

    pub fn previous_probability(&self) -> Option<f64> {
        self.previous
    }

    /// Change against the prediction before this one, once both exist.
    pub fn delta(&self) -> Option<f64> {
        Some(self.current? - self.previous?)
    }

    pub fn predicted_label(&self) -> Option<&Value> {
        self.label.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Seeds the payload from a table row, keeping only the columns the
    /// model's input schema declares (all of them when no schema is known).
    /// Allowed whenever no request is in flight; reselecting keeps the
    /// probability pair so the delta survives browsing other rows.
    pub fn select_row(&mut self, table: &Table, idx: usize) -> Result<(), FormError> {
        if self.state == FormState::Predicting {
            return Err(self.refuse("select a row"));
        }
        if idx >= table.n_rows() {
            return Err(FormError::RowOutOfRange {
                idx,
                rows: table.n_rows(),
            });
        }
        self.fields = table
            .columns()
            .iter()
            .filter(|column| match &self.input_fields {
                Some(schema) => schema.iter().any(|f| f == column.name()),
                None => true,
            })
            .map(|column| field_from_column(column, idx))
            .collect();
        self.selected_row = Some(idx);
        self.state = FormState::RowSelected;
        self.last_error = None;
        Ok(())
    }

    /// Applies one edit. Numeric fields parse the text as a float;
    /// categorical fields only accept values their column has actually
    /// held. An empty string clears the field.
    pub fn edit_field(&mut self, name: &str, raw: &str) -> Result<(), FormError> {
        if self.state != FormState::RowSelected && self.state != FormState::Predicted {
            return Err(self.refuse("edit a field"));
        }
        let field = self
            .fields
            .iter_mut()
            .find(|f| f.name == name)
            .ok_or_else(|| FormError::UnknownField {
                name: name.to_string(),
            })?;

        let raw = raw.trim();
        field.value = if raw.is_empty() {
            Cell::Null
        } else {
            match field.kind {
                FieldKind::Numeric => {
                    let parsed: f64 = raw.parse().map_err(|_| FormError::NotNumeric {
                        name: name.to_string(),
                    })?;
                    Cell::Num(parsed)
                }
                FieldKind::Categorical => {
                    if !field.choices.iter().any(|c| c == raw) {
                        return Err(FormError::ValueNotObserved {
                            name: name.to_string(),
                            value: raw.to_string(),
                        });
                    }
                    Cell::Text(raw.to_string())
                }
            }
        };
        Ok(())
    }

    /// Moves to the in-flight state and returns the payload to score,
    /// already filtered to the model's input schema.
    pub fn begin_submit(&mut self) -> Result<Vec<(String, Value)>, FormError> {
        if self.state != FormState::RowSelected && self.state != FormState::Predicted {
            return Err(self.refuse("submit"));
        }
        self.state = FormState::Predicting;
        let full: Vec<(String, Value)> = self
            .fields
            .iter()
            .map(|f| (f.name.clone(), f.value.to_json()))
            .collect();
        Ok(filter_by_schema(&full, self.input_fields.as_deref()))
    }

    /// Lands the in-flight request. Success rotates the probability pair and
    /// shows the result; failure returns to the selected row with both
    /// probabilities untouched and the failure text on display.
    pub fn complete(&mut self, outcome: PlatformResult<Prediction>) -> Result<(), FormError> {
        if self.state != FormState::Predicting {
            return Err(self.refuse("record an outcome"));
        }
        match outcome {
            Ok(prediction) => {
                self.previous = self.current;
                self.current = Some(prediction.probability);
                self.label = Some(prediction.label);
                self.last_error = None;
                self.state = FormState::Predicted;
            }
            Err(err) => {
                self.last_error = Some(err.detail().to_string());
                self.state = FormState::RowSelected;
            }
        }
        Ok(())
    }

    /// One scoring round trip through the machine. The scoring outcome is
    /// recorded on the form either way, then handed back.
    pub async fn submit<S: Scorer + ?Sized>(
        &mut self,
        scorer: &S,
        token: &AuthToken,
        deployment: &DeploymentDetails,
    ) -> Result<Prediction, SubmitError> {
        let payload = self.begin_submit()?;
        let outcome = scorer.score(token, deployment, &payload).await;
        let returned = outcome.clone();
        self.complete(outcome)?;
        Ok(returned?)
    }

    fn refuse(&self, action: &'static str) -> FormError {
        FormError::Transition {
            action,
            state: self.state.describe(),
        }
    }
}

fn field_from_column(column: &Column, idx: usize) -> FormField {
    match column {
        Column::Numeric { name, .. } => FormField {
            name: name.clone(),
            kind: FieldKind::Numeric,
            choices: Vec::new(),
            value: column.cell(idx),
        },
        Column::Categorical { name, .. } => FormField {
            name: name.clone(),
            kind: FieldKind::Categorical,
            choices: column.observed_values(),
            value: column.cell(idx),
        },
    }
}
