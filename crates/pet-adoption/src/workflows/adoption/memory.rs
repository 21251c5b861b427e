use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::domain::{AdoptionRequestId, FormSessionId, PetId, UserId};
use super::ledger::AdoptionRequest;
use super::repository::{AdoptionRepository, RepositoryError};
use super::session::FormSession;

#[derive(Debug, Default)]
struct StoreState {
    sessions: HashMap<FormSessionId, FormSession>,
    sessions_by_owner: HashMap<(UserId, PetId), FormSessionId>,
    requests: HashMap<AdoptionRequestId, AdoptionRequest>,
    requests_by_session: HashMap<FormSessionId, AdoptionRequestId>,
}

/// Process-local repository. Every operation runs under one lock, which makes each
/// read-validate-write atomic.
#[derive(Debug, Default, Clone)]
pub struct InMemoryAdoptionRepository {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryAdoptionRepository {
    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }

    pub fn session_count(&self) -> usize {
        self.lock().map(|state| state.sessions.len()).unwrap_or(0)
    }

    pub fn request_count(&self) -> usize {
        self.lock().map(|state| state.requests.len()).unwrap_or(0)
    }
}

impl AdoptionRepository for InMemoryAdoptionRepository {
    fn insert_session(&self, session: FormSession) -> Result<FormSession, RepositoryError> {
        let mut state = self.lock()?;
        let key = (session.adopter_id, session.pet_id);
        if state.sessions_by_owner.contains_key(&key) || state.sessions.contains_key(&session.id)
        {
            return Err(RepositoryError::Conflict);
        }
        state.sessions_by_owner.insert(key, session.id.clone());
        state.sessions.insert(session.id.clone(), session.clone());
        Ok(session)
    }

    fn find_session(
        &self,
        adopter_id: UserId,
        pet_id: PetId,
    ) -> Result<Option<FormSession>, RepositoryError> {
        let state = self.lock()?;
        Ok(state
            .sessions_by_owner
            .get(&(adopter_id, pet_id))
            .and_then(|id| state.sessions.get(id))
            .cloned())
    }

    fn update_session(
        &self,
        mut session: FormSession,
        expected_version: u64,
    ) -> Result<FormSession, RepositoryError> {
        let mut state = self.lock()?;
        let stored = state
            .sessions
            .get_mut(&session.id)
            .ok_or(RepositoryError::NotFound)?;
        if stored.version != expected_version {
            return Err(RepositoryError::Conflict);
        }
        session.version = expected_version + 1;
        *stored = session.clone();
        Ok(session)
    }

    fn complete_session(
        &self,
        mut session: FormSession,
        expected_version: u64,
        request: AdoptionRequest,
    ) -> Result<(FormSession, AdoptionRequest), RepositoryError> {
        let mut state = self.lock()?;
        let stored_version = state
            .sessions
            .get(&session.id)
            .map(|stored| stored.version)
            .ok_or(RepositoryError::NotFound)?;
        if stored_version != expected_version
            || state.requests_by_session.contains_key(&session.id)
            || state.requests.contains_key(&request.id)
        {
            return Err(RepositoryError::Conflict);
        }

        session.version = expected_version + 1;
        state
            .requests_by_session
            .insert(session.id.clone(), request.id.clone());
        state.requests.insert(request.id.clone(), request.clone());
        state.sessions.insert(session.id.clone(), session.clone());
        Ok((session, request))
    }

    fn insert_request(&self, request: AdoptionRequest) -> Result<AdoptionRequest, RepositoryError> {
        let mut state = self.lock()?;
        if state.requests_by_session.contains_key(&request.session_id)
            || state.requests.contains_key(&request.id)
        {
            return Err(RepositoryError::Conflict);
        }
        state
            .requests_by_session
            .insert(request.session_id.clone(), request.id.clone());
        state.requests.insert(request.id.clone(), request.clone());
        Ok(request)
    }

    fn fetch_request(
        &self,
        id: &AdoptionRequestId,
    ) -> Result<Option<AdoptionRequest>, RepositoryError> {
        let state = self.lock()?;
        Ok(state.requests.get(id).cloned())
    }

    fn requests_for_pet(&self, pet_id: PetId) -> Result<Vec<AdoptionRequest>, RepositoryError> {
        let state = self.lock()?;
        Ok(state
            .requests
            .values()
            .filter(|request| request.pet_id == pet_id)
            .cloned()
            .collect())
    }
}
