use crate::errors::{CompileFault, FrontendError};
use crate::frontend::{CompilationSession, ErrorList, Phase};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Compiles `session` up to [`Phase::BOUNDARY`].
///
/// Errors in the sources are the normal outcome and come back as `Ok`. A
/// frontend bug, including a panic inside the frontend, is an `Internal`
/// fault; anything else is `Unexpected`. Faults carry the messages collected
/// so far.
pub fn compile<S>(session: &mut S) -> Result<ErrorList, CompileFault>
where
    S: CompilationSession + ?Sized,
{
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| session.compile(Phase::BOUNDARY)));
    let partial = session.messages().to_vec();

    match outcome {
        Ok(Ok(())) | Ok(Err(FrontendError::MultipleErrors(_))) => Ok(partial),
        Ok(Err(FrontendError::Internal(reason))) => Err(CompileFault::Internal { reason, partial }),
        Ok(Err(other)) => Err(CompileFault::Unexpected { reason: other.to_string(), partial }),
        Err(payload) => {
            Err(CompileFault::Internal { reason: panic_reason(payload.as_ref()), partial })
        }
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("frontend panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("frontend panicked: {}", message)
    } else {
        "frontend panicked".to_string()
    }
}
