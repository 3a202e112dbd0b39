use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpriteKeyError {
    #[error("sprite key must not be empty")]
    Empty,
    #[error("sprite key must be relative to the asset root")]
    Absolute,
    #[error("sprite key segment {index} is empty")]
    EmptySegment { index: usize },
    #[error("sprite key segment '{segment}' would leave its directory")]
    RelativeSegment { segment: String },
    #[error("sprite key contains invalid character '{character}'")]
    InvalidCharacter { character: char },
}

/// Zone visual assets are relative sprite keys such as `zones/pharmacy`;
/// the host resolves them under its asset root. Segments are `/`-separated
/// and limited to lowercase ASCII, digits, `_` and `-`.
pub fn validate_sprite_key(key: &str) -> Result<(), SpriteKeyError> {
    if key.is_empty() {
        return Err(SpriteKeyError::Empty);
    }
    if key.starts_with('/') {
        return Err(SpriteKeyError::Absolute);
    }
    for (index, segment) in key.split('/').enumerate() {
        validate_segment(index, segment)?;
    }
    Ok(())
}

fn validate_segment(index: usize, segment: &str) -> Result<(), SpriteKeyError> {
    match segment {
        "" => Err(SpriteKeyError::EmptySegment { index }),
        "." | ".." => Err(SpriteKeyError::RelativeSegment {
            segment: segment.to_string(),
        }),
        _ => match segment.chars().find(|ch| !is_key_char(*ch)) {
            Some(character) => Err(SpriteKeyError::InvalidCharacter { character }),
            None => Ok(()),
        },
    }
}

fn is_key_char(ch: char) -> bool {
    ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '-')
}
