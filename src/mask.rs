//! Live input masks for Brazilian identifiers.
//!
//! Every mask drops non-digit characters, caps the digit count, and inserts
//! punctuation progressively so the value can be reformatted on each keystroke.

use std::fmt;
use std::str::FromStr;

pub const CPF_DIGITS: usize = 11;
pub const PHONE_DIGITS: usize = 11;
pub const PHONE_MIN_DIGITS: usize = 10;
pub const CEP_DIGITS: usize = 8;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum MaskKind {
    Cpf,
    Phone,
    Cep,
}

impl MaskKind {
    pub fn apply(self, raw: &str) -> String {
        match self {
            MaskKind::Cpf => cpf(raw),
            MaskKind::Phone => phone(raw),
            MaskKind::Cep => cep(raw),
        }
    }

    /// Length of a fully formatted value, usable as the input's `maxlength`.
    pub fn display_len(self) -> usize {
        match self {
            MaskKind::Cpf => 14,
            MaskKind::Phone => 15,
            MaskKind::Cep => 9,
        }
    }
}

impl fmt::Display for MaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaskKind::Cpf => write!(f, "cpf"),
            MaskKind::Phone => write!(f, "telefone"),
            MaskKind::Cep => write!(f, "cep"),
        }
    }
}

impl FromStr for MaskKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cpf" => Ok(MaskKind::Cpf),
            "telefone" | "phone" | "tel" => Ok(MaskKind::Phone),
            "cep" => Ok(MaskKind::Cep),
            other => Err(format!("unknown mask {other:?} (expected cpf, telefone or cep)")),
        }
    }
}

/// Keeps only ASCII digits.
pub fn digits(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

pub fn digit_count(raw: &str) -> usize {
    raw.chars().filter(char::is_ascii_digit).count()
}

/// `12345678901` → `123.456.789-01`
pub fn cpf(raw: &str) -> String {
    let mut out = String::with_capacity(14);
    for (i, c) in digits(raw).chars().take(CPF_DIGITS).enumerate() {
        match i {
            3 | 6 => out.push('.'),
            9 => out.push('-'),
            _ => {}
        }
        out.push(c);
    }
    out
}

/// `11987654321` → `(11) 98765-4321`
///
/// The area code is only wrapped once a local digit follows it.
pub fn phone(raw: &str) -> String {
    let digits: Vec<char> = digits(raw).chars().take(PHONE_DIGITS).collect();
    if digits.len() <= 2 {
        return digits.into_iter().collect();
    }
    let mut out = String::with_capacity(15);
    out.push('(');
    out.extend(&digits[..2]);
    out.push_str(") ");
    for (i, c) in digits[2..].iter().enumerate() {
        if i == 5 {
            out.push('-');
        }
        out.push(*c);
    }
    out
}

/// `01310000` → `01310-000`
pub fn cep(raw: &str) -> String {
    let mut out = String::with_capacity(9);
    for (i, c) in digits(raw).chars().take(CEP_DIGITS).enumerate() {
        if i == 5 {
            out.push('-');
        }
        out.push(c);
    }
    out
}
