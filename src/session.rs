//! Per-session context.
//!
//! Everything a dashboard session accumulates lives here explicitly: the
//! bearer token, the picked project/dataset/space/deployment/job, and the
//! one loaded table. Pages read through the `require_*` guards, which turn
//! an out-of-order visit into a clear instruction instead of a panic.
//!
//! Selection rules: picking a new project drops the project-scoped picks
//! (dataset, job); picking a new space drops the deployment. The loaded
//! table is never dropped implicitly, only `install_table` replaces it.

use crate::error::{ResourceKind, SessionError};
use crate::logging::{self, obj, v_num, v_str, Domain, Level};
use crate::platform::{AuthToken, Resource};
use crate::table::Table;

/// A table tied to the dataset it was loaded from, fingerprinted so repeat
/// loads of the same content are recognizable in the logs.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub dataset_id: String,
    pub table: Table,
    pub fingerprint: String,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    token: Option<AuthToken>,
    project: Option<Resource>,
    dataset: Option<Resource>,
    space: Option<Resource>,
    deployment: Option<Resource>,
    job: Option<Resource>,
    loaded: Option<LoadedTable>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Authentication
    // ------------------------------------------------------------------

    pub fn set_token(&mut self, token: AuthToken) {
        self.token = Some(token);
        logging::log(Level::Info, Domain::Session, "session_authenticated", obj(&[]));
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn require_token(&self) -> Result<&AuthToken, SessionError> {
        self.token.as_ref().ok_or(SessionError::NotAuthenticated)
    }

    // ------------------------------------------------------------------
    // Selections
    // ------------------------------------------------------------------

    pub fn select_project(&mut self, project: Resource) {
        self.log_pick(ResourceKind::Project, &project);
        self.dataset = None;
        self.job = None;
        self.project = Some(project);
    }

    pub fn select_dataset(&mut self, dataset: Resource) {
        self.log_pick(ResourceKind::Dataset, &dataset);
        self.dataset = Some(dataset);
    }

    pub fn select_space(&mut self, space: Resource) {
        self.log_pick(ResourceKind::Space, &space);
        self.deployment = None;
        self.space = Some(space);
    }

    pub fn select_deployment(&mut self, deployment: Resource) {
        self.log_pick(ResourceKind::Deployment, &deployment);
        self.deployment = Some(deployment);
    }

    pub fn select_job(&mut self, job: Resource) {
        self.log_pick(ResourceKind::Job, &job);
        self.job = Some(job);
    }

    pub fn project(&self) -> Option<&Resource> {
        self.project.as_ref()
    }

    pub fn dataset(&self) -> Option<&Resource> {
        self.dataset.as_ref()
    }

    pub fn space(&self) -> Option<&Resource> {
        self.space.as_ref()
    }

    pub fn deployment(&self) -> Option<&Resource> {
        self.deployment.as_ref()
    }

    pub fn job(&self) -> Option<&Resource> {
        self.job.as_ref()
    }

    pub fn require_project(&self) -> Result<&Resource, SessionError> {
        Self::require(&self.project, ResourceKind::Project)
    }

    pub fn require_dataset(&self) -> Result<&Resource, SessionError> {
        Self::require(&self.dataset, ResourceKind::Dataset)
    }

    pub fn require_space(&self) -> Result<&Resource, SessionError> {
        Self::require(&self.space, ResourceKind::Space)
    }

    pub fn require_deployment(&self) -> Result<&Resource, SessionError> {
        Self::require(&self.deployment, ResourceKind::Deployment)
    }

    pub fn require_job(&self) -> Result<&Resource, SessionError> {
        Self::require(&self.job, ResourceKind::Job)
    }

    fn require(slot: &Option<Resource>, kind: ResourceKind) -> Result<&Resource, SessionError> {
        slot.as_ref().ok_or(SessionError::MissingSelection { kind })
    }

    // ------------------------------------------------------------------
    // Loaded table
    // ------------------------------------------------------------------

    pub fn install_table(&mut self, dataset_id: impl Into<String>, table: Table) {
        let dataset_id = dataset_id.into();
        let fingerprint = table.fingerprint();
        logging::log(
            Level::Info,
            Domain::Session,
            "table_installed",
            obj(&[
                ("dataset_id", v_str(&dataset_id)),
                ("rows", v_num(table.n_rows() as f64)),
                ("cols", v_num(table.n_cols() as f64)),
                ("fingerprint", v_str(&fingerprint[..16])),
            ]),
        );
        self.loaded = Some(LoadedTable {
            dataset_id,
            table,
            fingerprint,
        });
    }

    pub fn loaded(&self) -> Option<&LoadedTable> {
        self.loaded.as_ref()
    }

    pub fn require_table(&self) -> Result<&Table, SessionError> {
        self.loaded
            .as_ref()
            .map(|l| &l.table)
            .ok_or(SessionError::NoTable)
    }

    fn log_pick(&self, kind: ResourceKind, pick: &Resource) {
        logging::log(
            Level::Debug,
            Domain::Session,
            "selection_changed",
            obj(&[
                ("kind", v_str(kind.as_str())),
                ("label", v_str(&pick.label())),
            ]),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn res(name: &str, id: &str) -> Resource {
        Resource::new(name, id)
    }

    fn small_table() -> Table {
        Table::from_csv_str("a\n1\n2\n").unwrap()
    }

    #[test]
    fn guards_name_the_missing_piece() {
        let session = Session::new();
        assert_eq!(
            session.require_token().unwrap_err(),
            SessionError::NotAuthenticated
        );
        assert_eq!(
            session.require_project().unwrap_err(),
            SessionError::MissingSelection {
                kind: ResourceKind::Project
            }
        );
        assert_eq!(session.require_table().unwrap_err(), SessionError::NoTable);
        assert_eq!(
            session.require_project().unwrap_err().to_string(),
            "select a project first"
        );
    }

    #[test]
    fn project_change_drops_project_scoped_picks() {
        let mut session = Session::new();
        session.select_project(res("alpha", "p1"));
        session.select_dataset(res("churn.csv", "d1"));
        session.select_job(res("retrain", "j1"));

        session.select_project(res("beta", "p2"));
        assert_eq!(session.project().unwrap().id, "p2");
        assert!(session.dataset().is_none());
        assert!(session.job().is_none());
    }

    #[test]
    fn space_change_drops_the_deployment() {
        let mut session = Session::new();
        session.select_space(res("prod", "s1"));
        session.select_deployment(res("churn-predictor", "dep1"));

        session.select_space(res("staging", "s2"));
        assert!(session.deployment().is_none());
    }

    #[test]
    fn table_survives_selection_changes() {
        let mut session = Session::new();
        session.select_project(res("alpha", "p1"));
        session.install_table("d1", small_table());

        session.select_project(res("beta", "p2"));
        assert!(session.require_table().is_ok());
        assert_eq!(session.loaded().unwrap().dataset_id, "d1");
    }

    #[test]
    fn installing_again_replaces_the_table() {
        let mut session = Session::new();
        session.install_table("d1", small_table());
        let first = session.loaded().unwrap().fingerprint.clone();

        session.install_table("d2", Table::from_csv_str("b\n9\n").unwrap());
        let loaded = session.loaded().unwrap();
        assert_eq!(loaded.dataset_id, "d2");
        assert_ne!(loaded.fingerprint, first);
    }

    #[test]
    fn token_guard_passes_after_authentication() {
        let mut session = Session::new();
        session.set_token(AuthToken::new("abc"));
        assert!(session.is_authenticated());
        assert_eq!(session.require_token().unwrap().bearer(), "Bearer abc");
    }
}
