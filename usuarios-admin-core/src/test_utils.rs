//! Test helpers
//!
//! In-memory API and notifier mocks shared by the module tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use usuarios_admin_api::{
    ApiError, DEFAULT_SECTOR, ListQuery, Pagination, Result, RevalidateResponse, UserStatus,
    Usuario, UsuarioApi, UsuarioDraft, UsuariosPage,
};

use crate::notify::{Notification, Notifier};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub fn usuario(id: &str, name: &str, estado: UserStatus) -> Usuario {
    Usuario {
        id: id.to_string(),
        usuario: name.to_string(),
        estado,
        sector: DEFAULT_SECTOR,
    }
}

// ===== MockUsuarioApi =====

/// One call received by [`MockUsuarioApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    List(ListQuery),
    Get(String),
    Create(String),
    Update(String),
    Delete(String),
    Revalidate(String),
}

pub struct MockUsuarioApi {
    sector: i64,
    usuarios: Mutex<Vec<Usuario>>,
    calls: Mutex<Vec<ApiCall>>,
    /// Consumed one per `list` call.
    list_failures: Mutex<VecDeque<ApiError>>,
    /// Consumed one per `list` call.
    list_delays: Mutex<VecDeque<Duration>>,
    /// If Some, the next create/update/delete returns this error.
    mutation_failure: Mutex<Option<ApiError>>,
    revalidate_fails: AtomicBool,
}

impl MockUsuarioApi {
    pub fn new() -> Self {
        Self {
            sector: DEFAULT_SECTOR,
            usuarios: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            list_failures: Mutex::new(VecDeque::new()),
            list_delays: Mutex::new(VecDeque::new()),
            mutation_failure: Mutex::new(None),
            revalidate_fails: AtomicBool::new(false),
        }
    }

    /// Store seeded with ids `1..=count`, alternating status.
    pub fn with_usuarios(count: usize) -> Self {
        let api = Self::new();
        {
            let mut usuarios = lock(&api.usuarios);
            for i in 1..=count {
                let estado = if i % 2 == 0 {
                    UserStatus::Inactive
                } else {
                    UserStatus::Active
                };
                usuarios.push(usuario(&i.to_string(), &format!("usuario{i}"), estado));
            }
        }
        api
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        lock(&self.calls).clone()
    }

    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }

    pub fn list_queries(&self) -> Vec<ListQuery> {
        lock(&self.calls)
            .iter()
            .filter_map(|call| match call {
                ApiCall::List(query) => Some(query.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn stored(&self, id: &str) -> Option<Usuario> {
        lock(&self.usuarios).iter().find(|u| u.id == id).cloned()
    }

    pub fn fail_next_list(&self, error: ApiError) {
        lock(&self.list_failures).push_back(error);
    }

    pub fn delay_lists(&self, delays: impl IntoIterator<Item = Duration>) {
        lock(&self.list_delays).extend(delays);
    }

    pub fn fail_next_mutation(&self, error: ApiError) {
        *lock(&self.mutation_failure) = Some(error);
    }

    pub fn fail_revalidate(&self, fail: bool) {
        self.revalidate_fails.store(fail, Ordering::SeqCst);
    }

    fn record(&self, call: ApiCall) {
        lock(&self.calls).push(call);
    }

    fn take_mutation_failure(&self) -> Result<()> {
        match lock(&self.mutation_failure).take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn not_found(id: &str) -> ApiError {
        ApiError::HttpStatus {
            status: 404,
            raw_message: Some(format!("Usuario {id} no encontrado")),
        }
    }
}

#[async_trait]
impl UsuarioApi for MockUsuarioApi {
    async fn list(&self, query: &ListQuery) -> Result<UsuariosPage> {
        self.record(ApiCall::List(query.clone()));
        let delay = lock(&self.list_delays).pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = lock(&self.list_failures).pop_front() {
            return Err(error);
        }

        let search = query
            .search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());
        let matching: Vec<Usuario> = lock(&self.usuarios)
            .iter()
            .filter(|u| query.estado.is_none_or(|estado| u.estado == estado))
            .filter(|u| {
                search.as_ref().is_none_or(|s| {
                    u.usuario.to_lowercase().contains(s) || u.id.to_lowercase().contains(s)
                })
            })
            .cloned()
            .collect();

        let page = query.page.max(1);
        let limit = query.limit.max(1);
        let start = usize::try_from(u64::from(page - 1) * u64::from(limit)).unwrap_or(usize::MAX);
        let data = matching
            .iter()
            .skip(start)
            .take(limit as usize)
            .cloned()
            .collect();
        Ok(UsuariosPage {
            data,
            pagination: Pagination::new(page, query.limit, matching.len() as u64),
        })
    }

    async fn get(&self, id: &str) -> Result<Usuario> {
        self.record(ApiCall::Get(id.to_string()));
        self.stored(id).ok_or_else(|| ApiError::NotFound { id: id.to_string() })
    }

    async fn create(&self, draft: &UsuarioDraft) -> Result<Usuario> {
        let id = draft.id.clone().unwrap_or_default();
        self.record(ApiCall::Create(id.clone()));
        self.take_mutation_failure()?;

        let mut usuarios = lock(&self.usuarios);
        if usuarios.iter().any(|u| u.id == id) {
            return Err(ApiError::HttpStatus {
                status: 409,
                raw_message: Some("El usuario ya existe".to_string()),
            });
        }
        let created = Usuario {
            id,
            usuario: draft.usuario.clone(),
            estado: draft.estado,
            sector: self.sector,
        };
        usuarios.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: &str, draft: &UsuarioDraft) -> Result<Usuario> {
        self.record(ApiCall::Update(id.to_string()));
        self.take_mutation_failure()?;

        let mut usuarios = lock(&self.usuarios);
        let existing = usuarios
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| Self::not_found(id))?;
        existing.usuario.clone_from(&draft.usuario);
        existing.estado = draft.estado;
        existing.sector = self.sector;
        Ok(existing.clone())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.record(ApiCall::Delete(id.to_string()));
        self.take_mutation_failure()?;

        let mut usuarios = lock(&self.usuarios);
        let before = usuarios.len();
        usuarios.retain(|u| u.id != id);
        if usuarios.len() == before {
            return Err(Self::not_found(id));
        }
        Ok(())
    }

    async fn revalidate(&self, path: &str) -> Result<RevalidateResponse> {
        self.record(ApiCall::Revalidate(path.to_string()));
        if self.revalidate_fails.load(Ordering::SeqCst) {
            return Err(ApiError::NetworkError {
                detail: "revalidation endpoint unreachable".to_string(),
            });
        }
        Ok(RevalidateResponse {
            message: format!("Revalidated {path}"),
            timestamp: None,
        })
    }
}

// ===== RecordingNotifier =====

#[derive(Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn notifications(&self) -> Vec<Notification> {
        lock(&self.notifications).clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        lock(&self.notifications).push(notification);
    }
}
