use crate::error::ValidationError;
use crate::protocol::{Patch, Settings};

pub const NAME_MAX_LEN: usize = 4;
pub const TEMPO_MIN: i32 = 40;
pub const TEMPO_MAX: i32 = 240;
/// HT16K33 supports 16 dimming steps.
pub const BRIGHTNESS_MAX: u8 = 15;

pub fn validate(name: &str, tempo: i32) -> Result<Patch, ValidationError> {
    validate_name(name)?;
    validate_tempo(tempo)?;
    Ok(Patch::new(name, tempo))
}

pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::Name("name must not be empty".to_string()));
    }
    if name.chars().count() > NAME_MAX_LEN {
        return Err(ValidationError::Name(format!(
            "name must be at most {NAME_MAX_LEN} characters"
        )));
    }
    if let Some(bad) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == ' '))
    {
        return Err(ValidationError::Name(format!(
            "name may only contain A-Z, a-z, 0-9 and spaces (found {bad:?})"
        )));
    }
    Ok(())
}

pub fn validate_tempo(tempo: i32) -> Result<(), ValidationError> {
    if !(TEMPO_MIN..=TEMPO_MAX).contains(&tempo) {
        return Err(ValidationError::Tempo(format!(
            "tempo must be between {TEMPO_MIN} and {TEMPO_MAX} (got {tempo})"
        )));
    }
    Ok(())
}

pub fn validate_settings(settings: &Settings) -> Result<(), ValidationError> {
    if settings.brightness > BRIGHTNESS_MAX {
        return Err(ValidationError::Brightness(format!(
            "brightness must be between 0 and {BRIGHTNESS_MAX} (got {})",
            settings.brightness
        )));
    }
    Ok(())
}

/// A single-field edit of an existing patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
    Name(String),
    Tempo(i32),
}

impl FieldEdit {
    /// Builds an edit from a field key and raw input text. Tempo text is
    /// coerced to an integer.
    pub fn parse(field: &str, value: &str) -> Result<Self, ValidationError> {
        match field.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(FieldEdit::Name(value.to_string())),
            "tempo" => value
                .trim()
                .parse::<i32>()
                .map(FieldEdit::Tempo)
                .map_err(|_| ValidationError::Tempo(format!("tempo must be an integer (got {value:?})"))),
            other => Err(ValidationError::UnknownField(other.to_string())),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            FieldEdit::Name(name) => validate_name(name),
            FieldEdit::Tempo(tempo) => validate_tempo(*tempo),
        }
    }

    pub fn apply(&self, patch: &mut Patch) {
        match self {
            FieldEdit::Name(name) => patch.name = name.clone(),
            FieldEdit::Tempo(tempo) => patch.tempo = *tempo,
        }
    }
}
