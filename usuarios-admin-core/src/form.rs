//! Usuario form: field values, per-field errors and validation

use std::fmt;

use serde::Serialize;
use usuarios_admin_api::{UserStatus, Usuario, UsuarioDraft};

/// Whether the form creates a new usuario or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Id,
    Usuario,
    Estado,
}

/// Raw field values as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormValues {
    pub id: String,
    pub usuario: String,
    pub estado: String,
}

impl Default for FormValues {
    fn default() -> Self {
        Self {
            id: String::new(),
            usuario: String::new(),
            estado: UserStatus::default().as_str().to_string(),
        }
    }
}

impl FormValues {
    fn from_usuario(usuario: &Usuario) -> Self {
        Self {
            id: usuario.id.clone(),
            usuario: usuario.usuario.clone(),
            estado: usuario.estado.as_str().to_string(),
        }
    }
}

/// Per-field error messages. A `None` field is valid.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FormErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usuario: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estado: Option<String>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.usuario.is_none() && self.estado.is_none()
    }

    pub fn get(&self, field: FormField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    fn slot(&self, field: FormField) -> &Option<String> {
        match field {
            FormField::Id => &self.id,
            FormField::Usuario => &self.usuario,
            FormField::Estado => &self.estado,
        }
    }

    fn slot_mut(&mut self, field: FormField) -> &mut Option<String> {
        match field {
            FormField::Id => &mut self.id,
            FormField::Usuario => &mut self.usuario,
            FormField::Estado => &mut self.estado,
        }
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = [
            ("id", &self.id),
            ("usuario", &self.usuario),
            ("estado", &self.estado),
        ];
        let mut first = true;
        for (name, message) in fields {
            if let Some(message) = message {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{name}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Validation strictness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidationRules {
    /// Id must be digits only.
    pub numeric_id: bool,
    /// Minimum trimmed length of the name.
    pub min_name_len: usize,
    /// Name limited to ASCII letters, digits, `-` and `_`.
    pub restrict_name_charset: bool,
}

impl ValidationRules {
    /// Required fields only.
    pub fn basic() -> Self {
        Self::default()
    }

    pub fn strict() -> Self {
        Self {
            numeric_id: true,
            min_name_len: 3,
            restrict_name_charset: true,
        }
    }

    /// Validate `values`. The id is only checked when creating.
    pub fn validate(&self, mode: FormMode, values: &FormValues) -> FormErrors {
        let mut errors = FormErrors::default();

        if mode == FormMode::Create {
            let id = values.id.trim();
            if id.is_empty() {
                errors.id = Some("El ID es requerido".to_string());
            } else if self.numeric_id && !id.chars().all(|c| c.is_ascii_digit()) {
                errors.id = Some("El ID debe contener solo números".to_string());
            }
        }

        let name = values.usuario.trim();
        if name.is_empty() {
            errors.usuario = Some("El nombre de usuario es requerido".to_string());
        } else if name.chars().count() < self.min_name_len {
            errors.usuario = Some(format!(
                "El nombre de usuario debe tener al menos {} caracteres",
                self.min_name_len
            ));
        } else if self.restrict_name_charset
            && !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            errors.usuario = Some(
                "El nombre de usuario solo puede contener letras, números, guiones y guiones bajos"
                    .to_string(),
            );
        }

        if UserStatus::parse(&values.estado).is_none() {
            errors.estado = Some("Estado inválido".to_string());
        }

        errors
    }
}

/// Form bound to the modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsuarioForm {
    mode: FormMode,
    rules: ValidationRules,
    initial: FormValues,
    values: FormValues,
    errors: FormErrors,
}

impl UsuarioForm {
    /// Empty form: blank id and name, status `ACTIVO`.
    pub fn new_create(rules: ValidationRules) -> Self {
        Self::with_values(FormMode::Create, rules, FormValues::default())
    }

    /// Form seeded from `usuario`; the id is read-only.
    pub fn new_edit(usuario: &Usuario, rules: ValidationRules) -> Self {
        Self::with_values(FormMode::Edit, rules, FormValues::from_usuario(usuario))
    }

    fn with_values(mode: FormMode, rules: ValidationRules, values: FormValues) -> Self {
        Self {
            mode,
            rules,
            initial: values.clone(),
            values,
            errors: FormErrors::default(),
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    /// Whether the field can be edited in the current mode.
    pub fn is_editable(&self, field: FormField) -> bool {
        !(self.mode == FormMode::Edit && field == FormField::Id)
    }

    /// Change a field and clear its error. Ignored for read-only fields.
    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        if !self.is_editable(field) {
            log::debug!("Ignoring change to read-only field {field:?}");
            return;
        }
        let value = value.into();
        match field {
            FormField::Id => self.values.id = value,
            FormField::Usuario => self.values.usuario = value,
            FormField::Estado => self.values.estado = value,
        }
        *self.errors.slot_mut(field) = None;
    }

    /// Run validation and store the result. Returns whether the form is valid.
    pub fn validate(&mut self) -> bool {
        self.errors = self.rules.validate(self.mode, &self.values);
        self.errors.is_empty()
    }

    /// Validate and build the draft to send.
    pub fn submit(&mut self) -> Result<UsuarioDraft, FormErrors> {
        if !self.validate() {
            return Err(self.errors.clone());
        }
        let estado = UserStatus::parse(&self.values.estado).unwrap_or_default();
        let id = self.values.id.trim();
        Ok(UsuarioDraft {
            id: (!id.is_empty()).then(|| id.to_string()),
            usuario: self.values.usuario.trim().to_string(),
            estado,
        })
    }

    /// Back to the seeded values, errors cleared.
    pub fn reset(&mut self) {
        self.values = self.initial.clone();
        self.errors = FormErrors::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::usuario;

    #[test]
    fn create_defaults() {
        let form = UsuarioForm::new_create(ValidationRules::basic());
        assert_eq!(form.values(), &FormValues::default());
        assert_eq!(form.values().estado, "ACTIVO");
        assert!(form.is_editable(FormField::Id));
    }

    #[test]
    fn empty_create_reports_required_fields() {
        let mut form = UsuarioForm::new_create(ValidationRules::basic());
        let errors = form.submit().unwrap_err();
        assert_eq!(errors.id.as_deref(), Some("El ID es requerido"));
        assert_eq!(
            errors.usuario.as_deref(),
            Some("El nombre de usuario es requerido")
        );
        assert_eq!(errors.estado, None);
        assert_eq!(form.errors(), &errors);
    }

    #[test]
    fn changing_a_field_clears_only_its_error() {
        let mut form = UsuarioForm::new_create(ValidationRules::basic());
        form.validate();
        form.set_field(FormField::Usuario, "a");
        assert_eq!(form.errors().get(FormField::Usuario), None);
        assert!(form.errors().get(FormField::Id).is_some());
    }

    #[test]
    fn edit_mode_ignores_id_and_skips_its_validation() {
        let record = usuario("42", "ana", UserStatus::Inactive);
        let mut form = UsuarioForm::new_edit(&record, ValidationRules::strict());
        form.set_field(FormField::Id, "99");
        assert_eq!(form.values().id, "42");

        let draft = form.submit().unwrap();
        assert_eq!(draft.id.as_deref(), Some("42"));
        assert_eq!(draft.estado, UserStatus::Inactive);
    }

    #[test]
    fn strict_rules() {
        let rules = ValidationRules::strict();
        let values = FormValues {
            id: "12a".into(),
            usuario: "ab".into(),
            estado: "ACTIVO".into(),
        };
        let errors = rules.validate(FormMode::Create, &values);
        assert_eq!(errors.id.as_deref(), Some("El ID debe contener solo números"));
        assert!(errors.usuario.as_deref().is_some_and(|m| m.contains('3')));

        let values = FormValues {
            id: "12".into(),
            usuario: "ana maria".into(),
            estado: "ACTIVO".into(),
        };
        let errors = rules.validate(FormMode::Create, &values);
        assert_eq!(errors.id, None);
        assert!(errors.usuario.is_some());

        let values = FormValues {
            usuario: "ana_maria-1".into(),
            ..values
        };
        assert!(rules.validate(FormMode::Create, &values).is_empty());
    }

    #[test]
    fn basic_rules_accept_short_names() {
        let values = FormValues {
            id: "x".into(),
            usuario: "a b".into(),
            estado: "INACTIVO".into(),
        };
        assert!(
            ValidationRules::basic()
                .validate(FormMode::Create, &values)
                .is_empty()
        );
    }

    #[test]
    fn unknown_status_is_rejected() {
        let mut form = UsuarioForm::new_create(ValidationRules::basic());
        form.set_field(FormField::Id, "1");
        form.set_field(FormField::Usuario, "ana");
        form.set_field(FormField::Estado, "BORRADO");
        let errors = form.submit().unwrap_err();
        assert_eq!(errors.estado.as_deref(), Some("Estado inválido"));
    }

    #[test]
    fn submit_trims_values() {
        let mut form = UsuarioForm::new_create(ValidationRules::basic());
        form.set_field(FormField::Id, " 7 ");
        form.set_field(FormField::Usuario, "  ana ");
        let draft = form.submit().unwrap();
        assert_eq!(draft.id.as_deref(), Some("7"));
        assert_eq!(draft.usuario, "ana");
    }

    #[test]
    fn reset_restores_seed() {
        let record = usuario("5", "bea", UserStatus::Active);
        let mut form = UsuarioForm::new_edit(&record, ValidationRules::basic());
        form.set_field(FormField::Usuario, "");
        form.validate();
        form.reset();
        assert_eq!(form.values().usuario, "bea");
        assert!(form.errors().is_empty());
    }

    #[test]
    fn errors_display_lists_fields() {
        let errors = FormErrors {
            id: Some("a".into()),
            usuario: None,
            estado: Some("b".into()),
        };
        assert_eq!(errors.to_string(), "id: a; estado: b");
    }
}
