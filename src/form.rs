//! Registration form state: masking, per-field validation, and submission.
//!
//! [`FormController`] is built from whatever form markup is currently in the
//! page, so a view that was just swapped in can be bound again from scratch.

use crate::validation::{FieldConstraints, FieldId, validation_message};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

pub const SUCCESS_ACK: &str = "Formulário enviado com sucesso! 🎉";

static FORM_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("form").expect("valid form selector"));
static CONTROL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("input, select, textarea").expect("valid control selector"));
static SELECTED_OPTION: Lazy<Selector> =
    Lazy::new(|| Selector::parse("option[selected]").expect("valid option selector"));

#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub enum FieldStatus {
    #[default]
    Pristine,
    Valid,
    Invalid(String),
}

impl FieldStatus {
    /// CSS state class applied to the control.
    pub fn css_class(&self) -> Option<&'static str> {
        match self {
            FieldStatus::Pristine => None,
            FieldStatus::Valid => Some("success"),
            FieldStatus::Invalid(_) => Some("error"),
        }
    }

    /// Text for the `<field>-error` element.
    pub fn message(&self) -> &str {
        match self {
            FieldStatus::Invalid(message) => message,
            _ => "",
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, FieldStatus::Invalid(_))
    }
}

#[derive(Debug, Clone)]
pub struct Field {
    id: FieldId,
    constraints: FieldConstraints,
    initial: String,
    value: String,
    status: FieldStatus,
}

impl Field {
    pub fn new(id: FieldId, constraints: FieldConstraints, initial: impl Into<String>) -> Self {
        let initial = initial.into();
        Self {
            id,
            constraints,
            value: initial.clone(),
            initial,
            status: FieldStatus::Pristine,
        }
    }

    pub fn id(&self) -> FieldId {
        self.id
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn status(&self) -> &FieldStatus {
        &self.status
    }

    fn validate(&mut self) -> &FieldStatus {
        let validity = self.constraints.check(self.id, &self.value);
        self.status = match validation_message(self.id, &validity) {
            Some(message) => FieldStatus::Invalid(message),
            None => FieldStatus::Valid,
        };
        &self.status
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum SubmitOutcome {
    Accepted,
    /// Blocked; `first_invalid` should receive focus.
    Rejected { first_invalid: FieldId, message: String },
}

impl SubmitOutcome {
    /// Text of the blocking acknowledgment shown to the user.
    pub fn acknowledgment(&self) -> &str {
        match self {
            SubmitOutcome::Accepted => SUCCESS_ACK,
            SubmitOutcome::Rejected { message, .. } => message,
        }
    }
}

/// A page that can attach [`FormController`] behavior to its form markup.
pub trait FormHost {
    /// Binds masks, validation and submit handling to the form `form_id`.
    ///
    /// Idempotent: returns `false` when the form is absent or already bound.
    fn setup_form(&mut self, form_id: &str) -> bool;
}

#[derive(Debug, Clone)]
pub struct FormController {
    form_id: String,
    fields: Vec<Field>,
}

impl FormController {
    pub fn new(form_id: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            form_id: form_id.into(),
            fields,
        }
    }

    /// Builds a controller from the form with id `form_id` inside `html`.
    ///
    /// Controls whose id is not a known field are left alone; `None` when the
    /// form is absent.
    pub fn from_markup(html: &str, form_id: &str) -> Option<Self> {
        let document = Html::parse_fragment(html);
        let form = document
            .select(&FORM_SELECTOR)
            .find(|form| form.value().id() == Some(form_id))?;
        let fields = form
            .select(&CONTROL_SELECTOR)
            .filter_map(|control| {
                let id = control.value().id()?.parse::<FieldId>().ok()?;
                let element = control.value();
                let constraints =
                    FieldConstraints::from_attributes(element.name(), |name| element.attr(name));
                Some(Field::new(id, constraints, initial_value(control)))
            })
            .collect::<Vec<_>>();
        tracing::debug!(form_id, fields = fields.len(), "form controller built from markup");
        Some(Self::new(form_id, fields))
    }

    pub fn form_id(&self) -> &str {
        &self.form_id
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, id: FieldId) -> Option<&Field> {
        self.fields.iter().find(|field| field.id == id)
    }

    fn field_mut(&mut self, id: FieldId) -> Option<&mut Field> {
        self.fields.iter_mut().find(|field| field.id == id)
    }

    /// Applies the field's mask to `raw`. A field that already shows a
    /// state is re-validated live.
    pub fn input(&mut self, id: FieldId, raw: &str) -> Option<&Field> {
        let field = self.field_mut(id)?;
        field.value = match id.mask() {
            Some(mask) => mask.apply(raw),
            None => raw.to_string(),
        };
        if field.status != FieldStatus::Pristine {
            field.validate();
        }
        Some(field)
    }

    pub fn blur(&mut self, id: FieldId) -> Option<&FieldStatus> {
        let field = self.field_mut(id)?;
        Some(field.validate())
    }

    /// Validates every field. On success the form is reset.
    pub fn submit(&mut self) -> SubmitOutcome {
        let mut first_invalid = None;
        for field in &mut self.fields {
            let id = field.id;
            if let FieldStatus::Invalid(message) = field.validate() {
                first_invalid.get_or_insert((id, message.clone()));
            }
        }
        match first_invalid {
            Some((first_invalid, message)) => {
                tracing::debug!(form_id = %self.form_id, field = %first_invalid, "submission blocked");
                SubmitOutcome::Rejected {
                    first_invalid,
                    message,
                }
            }
            None => {
                tracing::info!(form_id = %self.form_id, "registration accepted");
                self.reset();
                SubmitOutcome::Accepted
            }
        }
    }

    /// Restores initial values and clears every indicator.
    pub fn reset(&mut self) {
        for field in &mut self.fields {
            field.value = field.initial.clone();
            field.status = FieldStatus::Pristine;
        }
    }
}

fn initial_value(control: ElementRef<'_>) -> String {
    let element = control.value();
    match element.name() {
        "select" => control
            .select(&SELECTED_OPTION)
            .next()
            .and_then(|option| option.value().attr("value"))
            .unwrap_or_default()
            .to_string(),
        "textarea" => control.text().collect(),
        _ => element.attr("value").unwrap_or_default().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORM: &str = r#"
        <section>
          <form id="formCadastro" novalidate>
            <input id="nome" name="nome" required minlength="3">
            <span id="nome-error"></span>
            <input id="email" type="email" required>
            <input id="telefone" type="tel" required maxlength="15">
            <input id="nascimento" type="date" required>
            <input id="cpf" required maxlength="14">
            <input id="cep" maxlength="9">
            <input id="endereco" required>
            <input id="cidade" required>
            <select id="estado" required>
              <option value="" selected>Selecione</option>
              <option value="SP">São Paulo</option>
            </select>
            <select id="perfil" required>
              <option value="">Selecione</option>
              <option value="voluntario">Voluntário</option>
            </select>
            <input id="newsletter" type="checkbox">
            <button type="submit">Enviar</button>
          </form>
        </section>"#;

    fn controller() -> FormController {
        FormController::from_markup(FORM, "formCadastro").expect("form present")
    }

    fn fill_valid(form: &mut FormController) {
        form.input(FieldId::Nome, "Maria da Silva");
        form.input(FieldId::Email, "maria@exemplo.com.br");
        form.input(FieldId::Telefone, "11987654321");
        form.input(FieldId::Nascimento, "1990-05-17");
        form.input(FieldId::Cpf, "12345678901");
        form.input(FieldId::Endereco, "Av. Paulista, 1000");
        form.input(FieldId::Cidade, "São Paulo");
        form.input(FieldId::Estado, "SP");
        form.input(FieldId::Perfil, "voluntario");
    }

    #[test]
    fn reads_known_fields_in_document_order() {
        let form = controller();
        let ids: Vec<_> = form.fields().iter().map(Field::id).collect();
        assert_eq!(
            ids,
            vec![
                FieldId::Nome,
                FieldId::Email,
                FieldId::Telefone,
                FieldId::Nascimento,
                FieldId::Cpf,
                FieldId::Cep,
                FieldId::Endereco,
                FieldId::Cidade,
                FieldId::Estado,
                FieldId::Perfil,
            ]
        );
    }

    #[test]
    fn absent_form_yields_none() {
        assert!(FormController::from_markup(FORM, "outroForm").is_none());
        assert!(FormController::from_markup("<p>sem formulário</p>", "formCadastro").is_none());
    }

    #[test]
    fn input_applies_masks() {
        let mut form = controller();
        assert_eq!(form.input(FieldId::Cpf, "12345678901").unwrap().value(), "123.456.789-01");
        assert_eq!(
            form.input(FieldId::Telefone, "11987654321").unwrap().value(),
            "(11) 98765-4321"
        );
        assert_eq!(form.input(FieldId::Cep, "01310000").unwrap().value(), "01310-000");
        assert_eq!(form.input(FieldId::Nome, "Ana").unwrap().value(), "Ana");
    }

    #[test]
    fn blur_sets_state_and_input_revalidates_live() {
        let mut form = controller();
        form.input(FieldId::Cpf, "123");
        assert_eq!(form.field(FieldId::Cpf).unwrap().status(), &FieldStatus::Pristine);

        let status = form.blur(FieldId::Cpf).unwrap();
        assert_eq!(status.message(), "O CPF deve conter 11 dígitos.");
        assert_eq!(status.css_class(), Some("error"));

        let field = form.input(FieldId::Cpf, "12345678901").unwrap();
        assert_eq!(field.status(), &FieldStatus::Valid);
        assert_eq!(field.status().css_class(), Some("success"));
    }

    #[test]
    fn invalid_submission_points_at_first_invalid_field() {
        let mut form = controller();
        fill_valid(&mut form);
        form.input(FieldId::Email, "maria@");
        form.input(FieldId::Cpf, "123");

        let outcome = form.submit();
        assert_eq!(
            outcome,
            SubmitOutcome::Rejected {
                first_invalid: FieldId::Email,
                message: "Por favor, insira um e-mail válido.".to_string(),
            }
        );
        assert!(form.field(FieldId::Cpf).unwrap().status().is_invalid());
        assert_eq!(form.field(FieldId::Nome).unwrap().status(), &FieldStatus::Valid);
        assert_eq!(form.field(FieldId::Nome).unwrap().value(), "Maria da Silva");
    }

    #[test]
    fn valid_submission_acknowledges_and_resets() {
        let mut form = controller();
        fill_valid(&mut form);

        let outcome = form.submit();
        assert_eq!(outcome, SubmitOutcome::Accepted);
        assert_eq!(outcome.acknowledgment(), SUCCESS_ACK);
        for field in form.fields() {
            assert_eq!(field.status(), &FieldStatus::Pristine);
            assert_eq!(field.status().css_class(), None);
        }
        assert_eq!(form.field(FieldId::Cpf).unwrap().value(), "");
    }

    #[test]
    fn optional_cep_may_stay_empty_but_not_partial() {
        let mut form = controller();
        fill_valid(&mut form);
        form.input(FieldId::Cep, "0131");
        assert!(matches!(
            form.submit(),
            SubmitOutcome::Rejected { first_invalid: FieldId::Cep, .. }
        ));
    }
}
