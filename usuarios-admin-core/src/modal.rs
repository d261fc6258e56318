//! Create/edit modal state

use usuarios_admin_api::Usuario;

/// What the modal is currently showing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ModalSession {
    #[default]
    Closed,
    Create,
    Edit(Usuario),
}

#[derive(Debug, Clone, Default)]
pub struct ModalController {
    session: ModalSession,
}

impl ModalController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> &ModalSession {
        &self.session
    }

    pub fn is_open(&self) -> bool {
        self.session != ModalSession::Closed
    }

    /// The record being edited, if any.
    pub fn editing(&self) -> Option<&Usuario> {
        match &self.session {
            ModalSession::Edit(usuario) => Some(usuario),
            _ => None,
        }
    }

    pub fn open_create(&mut self) {
        self.session = ModalSession::Create;
    }

    pub fn open_edit(&mut self, usuario: Usuario) {
        self.session = ModalSession::Edit(usuario);
    }

    pub fn close(&mut self) {
        self.session = ModalSession::Closed;
    }

    /// Close only if the modal is editing `id`. Returns whether it closed.
    pub fn close_if_editing(&mut self, id: &str) -> bool {
        if self.editing().is_some_and(|u| u.id == id) {
            self.close();
            true
        } else {
            false
        }
    }
}
