pub type ArtboardResult<T> = Result<T, ArtboardError>;

#[derive(thiserror::Error, Debug)]
pub enum ArtboardError {
    #[error("invalid scene: {0}")]
    InvalidScene(String),

    #[error("template not found: '{0}'")]
    TemplateNotFound(String),

    #[error("no render target: export requested without a capture surface")]
    NoRenderTarget,

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("timeout: export stage '{stage}' exceeded its ceiling")]
    Timeout { stage: &'static str },

    #[error("busy: an export is already in progress")]
    Busy,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ArtboardError {
    pub fn invalid_scene(msg: impl Into<String>) -> Self {
        Self::InvalidScene(msg.into())
    }

    pub fn template_not_found(id: impl Into<String>) -> Self {
        Self::TemplateNotFound(id.into())
    }

    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    pub fn timeout(stage: &'static str) -> Self {
        Self::Timeout { stage }
    }

    /// Stable, non-technical message for end users.
    ///
    /// The full error detail is for logs only; callers surface this string
    /// instead of the raw `Display` output.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidScene(_) => "This design could not be loaded.",
            Self::TemplateNotFound(_) => "The requested template does not exist.",
            Self::NoRenderTarget => "There is nothing to export yet.",
            Self::Encoding(_) => "The design could not be converted to a file.",
            Self::Timeout { .. } => "The export took too long and was cancelled.",
            Self::Busy => "An export is already in progress.",
            Self::Other(_) => "Something went wrong during export.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            ArtboardError::invalid_scene("x")
                .to_string()
                .contains("invalid scene:")
        );
        assert!(
            ArtboardError::template_not_found("t1")
                .to_string()
                .contains("template not found:")
        );
        assert!(
            ArtboardError::encoding("x")
                .to_string()
                .contains("encoding error:")
        );
        assert!(
            ArtboardError::timeout("capturing")
                .to_string()
                .contains("capturing")
        );
    }

    #[test]
    fn user_messages_hide_internal_detail() {
        let err = ArtboardError::encoding("jpeg writer exploded at byte 1234");
        assert!(!err.user_message().contains("1234"));
        assert!(!err.user_message().contains("jpeg"));
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = ArtboardError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
