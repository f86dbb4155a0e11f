//! Text-generation collaborator seam.
//!
//! The canvas only ever sees this trait: UI chrome hands it a prompt and
//! gets text or an error back, never blocking the interaction loop. The
//! real backend lives in the embedding; `CannedGenerator` serves tests
//! and offline runs.

use crate::error::IoError;

pub trait TextGenerator {
    fn generate(&self, prompt: &str) -> Result<String, IoError>;
}

/// Offline stand-in that echoes a fixed reply, or fails when constructed
/// empty — exercising both arms of the caller's error surface.
#[derive(Debug, Default)]
pub struct CannedGenerator {
    pub reply: Option<String>,
}

impl CannedGenerator {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
        }
    }
}

impl TextGenerator for CannedGenerator {
    fn generate(&self, prompt: &str) -> Result<String, IoError> {
        match &self.reply {
            Some(reply) => Ok(reply.clone()),
            None => Err(IoError::Generation(format!(
                "no backend configured (prompt was {} chars)",
                prompt.len()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canned_generator_replies_or_errors() {
        let generator = CannedGenerator::replying("starlight");
        assert_eq!(generator.generate("hello").unwrap(), "starlight");

        let generator = CannedGenerator::default();
        assert!(matches!(
            generator.generate("hello"),
            Err(IoError::Generation(_))
        ));
    }
}
