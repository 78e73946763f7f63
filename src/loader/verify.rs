use super::surface::{ContentAccess, Surface};
use crate::error::LoadError;
use crate::models::ProjectDescriptor;

/// Check that a surface which signalled `load` actually shows something.
///
/// Cross-origin documents cannot be inspected and pass optimistically: a
/// working demo reported as broken is worse than the reverse.
pub fn verify(surface: &dyn Surface, project: &ProjectDescriptor) -> Result<(), LoadError> {
    match surface.content() {
        ContentAccess::Absent => Err(LoadError::VerificationFailed(format!(
            "content of {} is not reachable",
            project.key
        ))),
        ContentAccess::Blocked => {
            tracing::debug!(
                "Cannot inspect {} (cross-origin), assuming it loaded",
                project.key
            );
            Ok(())
        }
        ContentAccess::Accessible(document) => {
            if document.body_html().trim().is_empty() {
                Err(LoadError::VerificationFailed(format!(
                    "{} rendered an empty body",
                    project.key
                )))
            } else {
                Ok(())
            }
        }
    }
}
