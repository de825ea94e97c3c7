//! Field constraints modeled after the browser's constraint validation API,
//! plus the pt-BR messages shown next to each field.

use crate::mask::{self, MaskKind};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Registration form fields, in document order.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum FieldId {
    Nome,
    Email,
    Telefone,
    Nascimento,
    Cpf,
    Cep,
    Endereco,
    Cidade,
    Estado,
    Perfil,
}

impl FieldId {
    pub const ALL: [FieldId; 10] = [
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
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldId::Nome => "nome",
            FieldId::Email => "email",
            FieldId::Telefone => "telefone",
            FieldId::Nascimento => "nascimento",
            FieldId::Cpf => "cpf",
            FieldId::Cep => "cep",
            FieldId::Endereco => "endereco",
            FieldId::Cidade => "cidade",
            FieldId::Estado => "estado",
            FieldId::Perfil => "perfil",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FieldId::Nome => "Nome",
            FieldId::Email => "E-mail",
            FieldId::Telefone => "Telefone",
            FieldId::Nascimento => "Data de nascimento",
            FieldId::Cpf => "CPF",
            FieldId::Cep => "CEP",
            FieldId::Endereco => "Endereço",
            FieldId::Cidade => "Cidade",
            FieldId::Estado => "Estado",
            FieldId::Perfil => "Perfil",
        }
    }

    /// Id of the inline message element that sits next to the field.
    pub fn error_element_id(self) -> String {
        format!("{}-error", self.as_str())
    }

    pub fn mask(self) -> Option<MaskKind> {
        match self {
            FieldId::Cpf => Some(MaskKind::Cpf),
            FieldId::Telefone => Some(MaskKind::Phone),
            FieldId::Cep => Some(MaskKind::Cep),
            _ => None,
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldId {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        FieldId::ALL
            .into_iter()
            .find(|field| field.as_str() == value)
            .ok_or_else(|| format!("unknown field {value:?}"))
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum InputKind {
    #[default]
    Text,
    Email,
    Tel,
    Date,
    Select,
}

impl InputKind {
    fn from_markup(tag: &str, type_attr: Option<&str>) -> Self {
        if tag.eq_ignore_ascii_case("select") {
            return InputKind::Select;
        }
        match type_attr.map(str::to_ascii_lowercase).as_deref() {
            Some("email") => InputKind::Email,
            Some("tel") => InputKind::Tel,
            Some("date") => InputKind::Date,
            _ => InputKind::Text,
        }
    }
}

/// Which checks failed for a value. Mirrors `ValidityState`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub struct Validity {
    pub value_missing: bool,
    pub type_mismatch: bool,
    pub pattern_mismatch: bool,
    pub too_short: bool,
    pub too_long: bool,
    pub range_overflow: bool,
    /// Identifier completeness (CPF, phone, CEP digit counts).
    pub custom_error: bool,
}

impl Validity {
    pub fn is_valid(&self) -> bool {
        *self == Validity::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FieldConstraints {
    pub kind: InputKind,
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Regex>,
    /// Upper bound for date inputs, as `YYYY-MM-DD`.
    pub max: Option<String>,
}

impl FieldConstraints {
    /// Reads constraints from an element's tag name and attributes.
    ///
    /// An uncompilable `pattern` is ignored, as browsers do.
    pub fn from_attributes<'a>(tag: &str, attr: impl Fn(&str) -> Option<&'a str>) -> Self {
        let parse_len = |name: &str| attr(name).and_then(|v| v.trim().parse::<usize>().ok());
        let pattern = attr("pattern").and_then(|source| {
            match Regex::new(&format!("^(?:{source})$")) {
                Ok(re) => Some(re),
                Err(err) => {
                    tracing::debug!(pattern = source, %err, "ignoring invalid pattern attribute");
                    None
                }
            }
        });
        Self {
            kind: InputKind::from_markup(tag, attr("type")),
            required: attr("required").is_some(),
            min_length: parse_len("minlength"),
            max_length: parse_len("maxlength"),
            pattern,
            max: attr("max").map(str::to_string),
        }
    }

    /// Constraints used by the registration page when no markup is at hand.
    pub fn default_for(field: FieldId) -> Self {
        let required = !matches!(field, FieldId::Cep);
        let kind = match field {
            FieldId::Email => InputKind::Email,
            FieldId::Telefone => InputKind::Tel,
            FieldId::Nascimento => InputKind::Date,
            FieldId::Estado | FieldId::Perfil => InputKind::Select,
            _ => InputKind::Text,
        };
        Self {
            kind,
            required,
            min_length: matches!(field, FieldId::Nome).then_some(3),
            max_length: field.mask().map(MaskKind::display_len),
            pattern: None,
            max: None,
        }
    }

    pub fn check(&self, field: FieldId, value: &str) -> Validity {
        let trimmed = value.trim();
        let mut validity = Validity::default();
        if trimmed.is_empty() {
            validity.value_missing = self.required;
            return validity;
        }

        let len = value.chars().count();
        validity.too_short = self.min_length.is_some_and(|min| len < min);
        validity.too_long = self.max_length.is_some_and(|max| len > max);
        validity.pattern_mismatch = self
            .pattern
            .as_ref()
            .is_some_and(|re| self.kind != InputKind::Select && !re.is_match(value));

        match self.kind {
            InputKind::Email => validity.type_mismatch = !EMAIL_RE.is_match(trimmed),
            InputKind::Date => match parse_iso_date(trimmed) {
                Some(_) => {
                    validity.range_overflow =
                        self.max.as_deref().is_some_and(|max| trimmed > max.trim());
                }
                None => validity.type_mismatch = true,
            },
            _ => {}
        }

        validity.custom_error = match field {
            FieldId::Cpf => mask::digit_count(value) != mask::CPF_DIGITS,
            FieldId::Telefone => mask::digit_count(value) < mask::PHONE_MIN_DIGITS,
            FieldId::Cep => mask::digit_count(value) != mask::CEP_DIGITS,
            _ => false,
        };
        validity
    }
}

/// Message for the first failing check, or `None` when the value is valid.
pub fn validation_message(field: FieldId, validity: &Validity) -> Option<String> {
    let label = field.label();
    let message = if validity.value_missing {
        match field {
            FieldId::Estado | FieldId::Perfil => format!("Selecione uma opção de {label}."),
            _ => format!("Por favor, preencha o campo {label}."),
        }
    } else if validity.type_mismatch {
        match field {
            FieldId::Email => "Por favor, insira um e-mail válido.".to_string(),
            _ => format!("{label}: informe uma data válida."),
        }
    } else if validity.custom_error {
        match field {
            FieldId::Cpf => "O CPF deve conter 11 dígitos.".to_string(),
            FieldId::Telefone => "Telefone incompleto.".to_string(),
            FieldId::Cep => "CEP inválido.".to_string(),
            _ => format!("{label} inválido."),
        }
    } else if validity.range_overflow {
        match field {
            FieldId::Nascimento => "A data de nascimento não pode estar no futuro.".to_string(),
            _ => format!("{label}: valor acima do permitido."),
        }
    } else if validity.too_short {
        format!("{label} está muito curto.")
    } else if validity.too_long {
        format!("{label} está muito longo.")
    } else if validity.pattern_mismatch {
        format!("O formato de {label} não é válido.")
    } else {
        return None;
    };
    Some(message)
}

fn parse_iso_date(value: &str) -> Option<(u32, u32, u32)> {
    let mut parts = value.split('-');
    let (year, month, day) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() || year.len() != 4 || month.len() != 2 || day.len() != 2 {
        return None;
    }
    if ![year, month, day]
        .iter()
        .all(|part| part.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }
    let year: u32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    let day: u32 = day.parse().ok()?;
    let leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
    let days_in_month = match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if leap => 29,
        2 => 28,
        _ => return None,
    };
    (1..=days_in_month).contains(&day).then_some((year, month, day))
}
