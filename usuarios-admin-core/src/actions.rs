//! Create/update/delete with notification and refresh side effects

use std::sync::Arc;
use std::time::Duration;

use usuarios_admin_api::{ApiError, Usuario, UsuarioApi, UsuarioDraft};

use crate::error::{CoreError, CoreResult};
use crate::notify::{Notification, Notifier};
use crate::refresh::RefreshChannel;

/// Success callback.
pub type SuccessCallback = Arc<dyn Fn() + Send + Sync>;
/// Error callback, receives the message that was shown to the user.
pub type ErrorCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Wait between a successful mutation and the refresh, per operation.
/// Zero disables it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SettleDelays {
    pub create: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl SettleDelays {
    /// Same delay after every operation.
    pub fn uniform(delay: Duration) -> Self {
        Self {
            create: delay,
            update: delay,
            delete: delay,
        }
    }
}

/// Tunables for the post-mutation flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationSettings {
    pub settle_delays: SettleDelays,
    /// Path handed to the revalidation endpoint.
    pub revalidate_path: String,
}

impl Default for MutationSettings {
    fn default() -> Self {
        Self {
            settle_delays: SettleDelays::default(),
            revalidate_path: "/".to_string(),
        }
    }
}

/// How a mutation ended. Failures have already been notified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    Succeeded,
    Failed { message: String },
}

impl MutationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

#[derive(Clone, Copy)]
enum MutationKind<'a> {
    Create,
    Update,
    /// Carries the display name of the deleted record.
    Delete(&'a str),
}

impl MutationKind<'_> {
    fn success_message(self) -> String {
        match self {
            Self::Create => "Usuario creado exitosamente".to_string(),
            Self::Update => "Usuario actualizado exitosamente".to_string(),
            Self::Delete(name) => format!("Usuario \"{name}\" eliminado exitosamente"),
        }
    }

    fn settle_delay(self, delays: &SettleDelays) -> Duration {
        match self {
            Self::Create => delays.create,
            Self::Update => delays.update,
            Self::Delete(_) => delays.delete,
        }
    }

    fn fallback_error(self) -> &'static str {
        match self {
            Self::Create => "Error al crear el usuario",
            Self::Update => "Error al actualizar el usuario",
            Self::Delete(_) => "Error al eliminar el usuario",
        }
    }

    /// Verb used in the missing-id message.
    fn verb(self) -> &'static str {
        match self {
            Self::Create => "crear",
            Self::Update => "actualizar",
            Self::Delete(_) => "eliminar",
        }
    }
}

/// Mutation layer.
///
/// Never returns an error: every failure is turned into an error
/// notification and a [`MutationOutcome::Failed`].
pub struct MutationActions {
    api: Arc<dyn UsuarioApi>,
    refresh: Arc<RefreshChannel>,
    notifier: Arc<dyn Notifier>,
    settings: MutationSettings,
    on_success: Option<SuccessCallback>,
    on_error: Option<ErrorCallback>,
}

impl MutationActions {
    pub fn new(
        api: Arc<dyn UsuarioApi>,
        refresh: Arc<RefreshChannel>,
        notifier: Arc<dyn Notifier>,
        settings: MutationSettings,
    ) -> Self {
        Self {
            api,
            refresh,
            notifier,
            settings,
            on_success: None,
            on_error: None,
        }
    }

    #[must_use]
    pub fn with_on_success(mut self, callback: SuccessCallback) -> Self {
        self.on_success = Some(callback);
        self
    }

    #[must_use]
    pub fn with_on_error(mut self, callback: ErrorCallback) -> Self {
        self.on_error = Some(callback);
        self
    }

    pub fn settings(&self) -> &MutationSettings {
        &self.settings
    }

    pub async fn create(&self, draft: &UsuarioDraft) -> MutationOutcome {
        let kind = MutationKind::Create;
        let result: CoreResult<()> = async {
            require_id(draft.id.as_deref(), kind)?;
            self.api.create(draft).await?;
            Ok(())
        }
        .await;
        self.finish(kind, result).await
    }

    pub async fn update(&self, id: &str, draft: &UsuarioDraft) -> MutationOutcome {
        let kind = MutationKind::Update;
        let result: CoreResult<()> = async {
            let id = require_id(Some(id), kind)?;
            self.api.update(id, draft).await?;
            Ok(())
        }
        .await;
        self.finish(kind, result).await
    }

    pub async fn delete(&self, usuario: &Usuario) -> MutationOutcome {
        let kind = MutationKind::Delete(&usuario.usuario);
        let result: CoreResult<()> = async {
            let id = require_id(Some(usuario.id.as_str()), kind)?;
            self.api.delete(id).await?;
            Ok(())
        }
        .await;
        self.finish(kind, result).await
    }

    async fn finish(&self, kind: MutationKind<'_>, result: CoreResult<()>) -> MutationOutcome {
        match result {
            Ok(()) => {
                self.notifier
                    .notify(Notification::success(kind.success_message()));
                self.after_success(kind.settle_delay(&self.settings.settle_delays)).await;
                MutationOutcome::Succeeded
            }
            Err(e) => {
                if e.is_expected() {
                    log::warn!("{} failed: {e}", kind.fallback_error());
                } else {
                    log::error!("{} failed: {e}", kind.fallback_error());
                }
                let message = user_message(&e, kind);
                self.notifier.notify(Notification::error(message.clone()));
                if let Some(callback) = &self.on_error {
                    callback(&message);
                }
                MutationOutcome::Failed { message }
            }
        }
    }

    /// Revalidate, settle, refresh, then the success callback.
    async fn after_success(&self, settle_delay: Duration) {
        if let Err(e) = self.api.revalidate(&self.settings.revalidate_path).await {
            log::warn!("Cache revalidation failed: {e}");
        }
        if !settle_delay.is_zero() {
            tokio::time::sleep(settle_delay).await;
        }
        self.refresh.invoke().await;
        if let Some(callback) = &self.on_success {
            callback();
        }
    }
}

fn require_id<'a>(id: Option<&'a str>, kind: MutationKind<'_>) -> CoreResult<&'a str> {
    match id.map(str::trim) {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(CoreError::MissingId(kind.verb().to_string())),
    }
}

/// Message shown to the user: the server's own message when it sent one.
fn user_message(error: &CoreError, kind: MutationKind<'_>) -> String {
    match error {
        CoreError::Api(ApiError::HttpStatus {
            raw_message: Some(message),
            ..
        }) => message.clone(),
        CoreError::Api(ApiError::HttpStatus {
            raw_message: None, ..
        }) => kind.fallback_error().to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use usuarios_admin_api::UserStatus;

    use crate::notify::Severity;
    use crate::test_utils::{ApiCall, MockUsuarioApi, RecordingNotifier, usuario};

    struct Harness {
        api: Arc<MockUsuarioApi>,
        refresh: Arc<RefreshChannel>,
        notifier: Arc<RecordingNotifier>,
        refreshes: Arc<AtomicUsize>,
    }

    impl Harness {
        async fn new() -> Self {
            let api = Arc::new(MockUsuarioApi::with_usuarios(3));
            let refresh = Arc::new(RefreshChannel::new());
            let refreshes = Arc::new(AtomicUsize::new(0));
            let counter = Arc::clone(&refreshes);
            refresh
                .register(move || {
                    let counter = Arc::clone(&counter);
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                    }
                })
                .await;
            Self {
                api,
                refresh,
                notifier: Arc::new(RecordingNotifier::default()),
                refreshes,
            }
        }

        fn actions(&self, settings: MutationSettings) -> MutationActions {
            MutationActions::new(
                Arc::clone(&self.api) as Arc<dyn UsuarioApi>,
                Arc::clone(&self.refresh),
                Arc::clone(&self.notifier) as Arc<dyn Notifier>,
                settings,
            )
        }
    }

    fn draft(id: &str, name: &str) -> UsuarioDraft {
        UsuarioDraft {
            id: Some(id.to_string()),
            usuario: name.to_string(),
            estado: UserStatus::Active,
        }
    }

    #[tokio::test]
    async fn create_success_notifies_revalidates_and_refreshes() {
        let h = Harness::new().await;
        let outcome = h
            .actions(MutationSettings::default())
            .create(&draft("77", "nuevo"))
            .await;

        assert_eq!(outcome, MutationOutcome::Succeeded);
        assert_eq!(
            h.api.calls(),
            vec![ApiCall::Create("77".into()), ApiCall::Revalidate("/".into())]
        );
        assert_eq!(h.refreshes.load(Ordering::SeqCst), 1);
        let notes = h.notifier.notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].severity, Severity::Success);
        assert_eq!(notes[0].detail, "Usuario creado exitosamente");
        assert_eq!(h.api.stored("77").map(|u| u.sector), Some(5000));
    }

    #[tokio::test]
    async fn update_without_id_fails_fast() {
        let h = Harness::new().await;
        let outcome = h
            .actions(MutationSettings::default())
            .update("  ", &draft("1", "x"))
            .await;

        assert_eq!(
            outcome,
            MutationOutcome::Failed {
                message: "El ID del usuario es requerido para actualizar.".into()
            }
        );
        assert!(h.api.calls().is_empty());
        assert_eq!(h.refreshes.load(Ordering::SeqCst), 0);
        assert_eq!(h.notifier.notifications()[0].severity, Severity::Error);
    }

    #[tokio::test]
    async fn server_message_is_surfaced() {
        let h = Harness::new().await;
        h.api.fail_next_mutation(ApiError::HttpStatus {
            status: 409,
            raw_message: Some("El usuario ya existe".into()),
        });
        let outcome = h
            .actions(MutationSettings::default())
            .create(&draft("1", "dup"))
            .await;

        assert_eq!(
            outcome,
            MutationOutcome::Failed {
                message: "El usuario ya existe".into()
            }
        );
        assert_eq!(h.notifier.notifications()[0].detail, "El usuario ya existe");
        assert_eq!(h.refreshes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn bare_status_uses_fallback_message() {
        let h = Harness::new().await;
        h.api.fail_next_mutation(ApiError::HttpStatus {
            status: 500,
            raw_message: None,
        });
        let outcome = h
            .actions(MutationSettings::default())
            .delete(&usuario("1", "a", UserStatus::Active))
            .await;
        assert_eq!(
            outcome,
            MutationOutcome::Failed {
                message: "Error al eliminar el usuario".into()
            }
        );
    }

    #[tokio::test]
    async fn revalidation_failure_does_not_fail_mutation() {
        let h = Harness::new().await;
        h.api.fail_revalidate(true);
        let outcome = h
            .actions(MutationSettings::default())
            .update("2", &draft("2", "renombrado"))
            .await;
        assert!(outcome.is_success());
        assert_eq!(h.refreshes.load(Ordering::SeqCst), 1);
        assert_eq!(h.notifier.notifications().len(), 1);
    }

    #[tokio::test]
    async fn callbacks_fire_on_their_branch() {
        let h = Harness::new().await;
        let successes = Arc::new(AtomicUsize::new(0));
        let errors = Arc::new(AtomicUsize::new(0));
        let s = Arc::clone(&successes);
        let e = Arc::clone(&errors);
        let actions = h
            .actions(MutationSettings::default())
            .with_on_success(Arc::new(move || {
                s.fetch_add(1, Ordering::SeqCst);
            }))
            .with_on_error(Arc::new(move |_| {
                e.fetch_add(1, Ordering::SeqCst);
            }));

        actions.update("1", &draft("1", "ok")).await;
        h.api.fail_next_mutation(ApiError::NetworkError {
            detail: "down".into(),
        });
        actions.update("1", &draft("1", "ko")).await;

        assert_eq!(successes.load(Ordering::SeqCst), 1);
        assert_eq!(errors.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn delete_success_names_the_record() {
        let h = Harness::new().await;
        let outcome = h
            .actions(MutationSettings::default())
            .delete(&usuario("2", "usuario2", UserStatus::Inactive))
            .await;

        assert!(outcome.is_success());
        assert_eq!(h.api.calls()[0], ApiCall::Delete("2".into()));
        assert_eq!(
            h.notifier.notifications()[0].detail,
            "Usuario \"usuario2\" eliminado exitosamente"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn settle_delay_depends_on_operation() {
        let h = Harness::new().await;
        let settings = MutationSettings {
            settle_delays: SettleDelays {
                create: Duration::from_secs(5),
                update: Duration::from_secs(2),
                delete: Duration::from_secs(2),
            },
            ..MutationSettings::default()
        };
        let actions = h.actions(settings);

        let start = tokio::time::Instant::now();
        actions.create(&draft("50", "nuevo")).await;
        assert!(start.elapsed() >= Duration::from_secs(5));
        assert_eq!(h.refreshes.load(Ordering::SeqCst), 1);

        let start = tokio::time::Instant::now();
        actions.delete(&usuario("1", "a", UserStatus::Active)).await;
        let waited = start.elapsed();
        assert!(waited >= Duration::from_secs(2));
        assert!(waited < Duration::from_secs(5));
        assert_eq!(h.refreshes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_mutation_skips_settle_delay() {
        let h = Harness::new().await;
        h.api.fail_next_mutation(ApiError::NetworkError {
            detail: "down".into(),
        });
        let actions = h.actions(MutationSettings {
            settle_delays: SettleDelays::uniform(Duration::from_secs(5)),
            ..MutationSettings::default()
        });

        let start = tokio::time::Instant::now();
        actions.update("1", &draft("1", "x")).await;
        assert!(start.elapsed() < Duration::from_secs(5));
        assert_eq!(h.refreshes.load(Ordering::SeqCst), 0);
    }
}
