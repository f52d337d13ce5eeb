//! In-memory entity store for audit projects, requests and evidence
//!
//! All mutations are synchronous. Each one validates its inputs before
//! touching any collection, so a failed call leaves the store unchanged.

use chrono::NaiveDate;

use crate::deadline::today;
use crate::error::{EntityKind, StoreError, StoreResult};
use crate::ids::IdCounter;
use crate::integrity::{
    cascade_project_requests, clear_evidence_backlinks, enforce_fulfillment, unlink_evidence,
};
use crate::models::{
    AuditProject, Evidence, EvidenceDraft, Request, RequestDraft, Snapshot, EVIDENCE_ID_PREFIX,
    PROJECT_ID_PREFIX, REQUEST_ID_PREFIX,
};

/// A request's linked evidence id, resolved against the evidence bank
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkedEvidence<'a> {
    Found(&'a Evidence),
    /// The id is linked but no such evidence exists
    Missing(&'a str),
}

/// Owns the three collections and their id counters
#[derive(Debug, Clone)]
pub struct AuditStore {
    projects: Vec<AuditProject>,
    requests: Vec<Request>,
    evidence: Vec<Evidence>,
    project_ids: IdCounter,
    request_ids: IdCounter,
    evidence_ids: IdCounter,
    clock: fn() -> NaiveDate,
}

impl Default for AuditStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::from_snapshot(Snapshot::default())
    }

    /// Creates a store seeded with `snapshot`, deriving each id counter from
    /// the highest id already present
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut store = Self {
            projects: Vec::new(),
            requests: Vec::new(),
            evidence: Vec::new(),
            project_ids: IdCounter::new(PROJECT_ID_PREFIX, 2),
            request_ids: IdCounter::new(REQUEST_ID_PREFIX, 3),
            evidence_ids: IdCounter::new(EVIDENCE_ID_PREFIX, 3),
            clock: today,
        };
        store.replace_snapshot(snapshot);
        store
    }

    /// Uses `clock` instead of the system date for fulfillment dates
    pub fn with_clock(mut self, clock: fn() -> NaiveDate) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces all three collections. Counters are raised to cover the new
    /// ids but never lowered, so ids issued earlier stay retired.
    ///
    /// Incoming requests go through the same fulfillment rule as created ones.
    pub fn replace_snapshot(&mut self, snapshot: Snapshot) {
        let Snapshot {
            audit_projects,
            mut requests,
            evidence,
        } = snapshot;

        let today = (self.clock)();
        for request in &mut requests {
            enforce_fulfillment(request, today);
        }

        self.project_ids
            .observe(audit_projects.iter().map(|p| p.id.as_str()));
        self.request_ids.observe(requests.iter().map(|r| r.id.as_str()));
        self.evidence_ids.observe(evidence.iter().map(|e| e.id.as_str()));

        self.projects = audit_projects;
        self.requests = requests;
        self.evidence = evidence;

        log::debug!(
            "Loaded {} projects, {} requests, {} evidence (counters at {}, {}, {})",
            self.projects.len(),
            self.requests.len(),
            self.evidence.len(),
            self.project_ids.last(),
            self.request_ids.last(),
            self.evidence_ids.last()
        );
    }

    /// Clones the current collections
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            audit_projects: self.projects.clone(),
            requests: self.requests.clone(),
            evidence: self.evidence.clone(),
        }
    }

    pub fn projects(&self) -> &[AuditProject] {
        &self.projects
    }

    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    pub fn evidence(&self) -> &[Evidence] {
        &self.evidence
    }

    pub fn get_project(&self, id: &str) -> Option<&AuditProject> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn get_request(&self, id: &str) -> Option<&Request> {
        self.requests.iter().find(|r| r.id == id)
    }

    pub fn get_evidence(&self, id: &str) -> Option<&Evidence> {
        self.evidence.iter().find(|e| e.id == id)
    }

    /// Requests of one project, in collection order
    pub fn requests_for_project<'a>(&'a self, project_id: &'a str) -> impl Iterator<Item = &'a Request> + 'a {
        self.requests
            .iter()
            .filter(move |r| r.audit_project_id == project_id)
    }

    /// Resolves each linked evidence id of `request`
    pub fn linked_evidence<'a>(&'a self, request: &'a Request) -> Vec<LinkedEvidence<'a>> {
        request
            .bukti_terkait
            .iter()
            .map(|id| match self.get_evidence(id) {
                Some(ev) => LinkedEvidence::Found(ev),
                None => LinkedEvidence::Missing(id.as_str()),
            })
            .collect()
    }

    // =========================================================================
    // Projects
    // =========================================================================

    /// Creates a project with the next `PROJ-NN` id
    pub fn create_project(&mut self, name: &str) -> StoreResult<AuditProject> {
        let name = validate_project_name(name)?;

        let project = AuditProject {
            id: self.project_ids.allocate()?,
            name,
        };
        self.projects.push(project.clone());

        log::info!("Created project {} ({})", project.id, project.name);
        Ok(project)
    }

    /// Renames a project. Its id and requests are untouched.
    pub fn update_project(&mut self, id: &str, name: &str) -> StoreResult<()> {
        let name = validate_project_name(name)?;
        let project = self
            .projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Project, id))?;

        project.name = name;
        log::info!("Renamed project {} to {}", id, project.name);
        Ok(())
    }

    /// Deletes a project together with all of its requests
    pub fn delete_project(&mut self, id: &str) -> StoreResult<()> {
        let pos = self
            .projects
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Project, id))?;

        self.projects.remove(pos);
        let removed = cascade_project_requests(&mut self.requests, id);

        log::info!("Deleted project {} and {} of its requests", id, removed);
        Ok(())
    }

    // =========================================================================
    // Requests
    // =========================================================================

    /// Creates a request under `target_project_id` with the next `PRM-NNN` id
    pub fn create_request(&mut self, draft: RequestDraft, target_project_id: &str) -> StoreResult<Request> {
        if self.get_project(target_project_id).is_none() {
            return Err(StoreError::InvalidReference {
                kind: EntityKind::Project,
                id: target_project_id.to_string(),
            });
        }

        let mut request = Request::from_draft(
            self.request_ids.allocate()?,
            target_project_id.to_string(),
            draft,
        );
        enforce_fulfillment(&mut request, (self.clock)());
        self.requests.push(request.clone());

        log::info!(
            "Created request {} in {} ({})",
            request.id,
            request.audit_project_id,
            request.status.as_str()
        );
        Ok(request)
    }

    /// Replaces the request with the same id. Returns the stored version,
    /// which may differ from the input after status normalization.
    pub fn update_request(&mut self, request: Request) -> StoreResult<Request> {
        let today = (self.clock)();
        let slot = self
            .requests
            .iter_mut()
            .find(|r| r.id == request.id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Request, &request.id))?;

        *slot = request;
        enforce_fulfillment(slot, today);

        log::info!("Updated request {} ({})", slot.id, slot.status.as_str());
        Ok(slot.clone())
    }

    /// Deletes a request and clears the back-link on any evidence pointing at it
    pub fn delete_request(&mut self, id: &str) -> StoreResult<()> {
        let pos = self
            .requests
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Request, id))?;

        self.requests.remove(pos);
        let cleared = clear_evidence_backlinks(&mut self.evidence, id);

        log::info!("Deleted request {} (cleared {} evidence back-links)", id, cleared);
        Ok(())
    }

    // =========================================================================
    // Evidence
    // =========================================================================

    /// Adds evidence with the next `BKT-NNN` id
    pub fn create_evidence(&mut self, draft: EvidenceDraft) -> StoreResult<Evidence> {
        let evidence = Evidence::from_draft(self.evidence_ids.allocate()?, draft);
        self.evidence.push(evidence.clone());

        log::info!("Created evidence {} ({})", evidence.id, evidence.kategori);
        Ok(evidence)
    }

    /// Replaces the evidence with the same id
    pub fn update_evidence(&mut self, evidence: Evidence) -> StoreResult<()> {
        let slot = self
            .evidence
            .iter_mut()
            .find(|e| e.id == evidence.id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Evidence, &evidence.id))?;

        *slot = evidence;
        log::info!("Updated evidence {}", slot.id);
        Ok(())
    }

    /// Deletes evidence and unlinks it from every request
    pub fn delete_evidence(&mut self, id: &str) -> StoreResult<()> {
        let pos = self
            .evidence
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Evidence, id))?;

        self.evidence.remove(pos);
        let report = unlink_evidence(&mut self.requests, id);

        log::info!(
            "Deleted evidence {} (unlinked from {} requests, {} reverted to pending)",
            id,
            report.unlinked,
            report.reverted
        );
        Ok(())
    }
}

fn validate_project_name(name: &str) -> StoreResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(StoreError::Validation("project name is required".to_string()));
    }
    Ok(trimmed.to_string())
}
