use std::convert::Infallible;

use crate::formatter::{FmtConclusion, RunFormatter};

/// A formatter that discards every event.
#[derive(Debug, Default, Clone)]
pub struct NoFormatter;

impl RunFormatter for NoFormatter {
    type Error = Infallible;

    fn fmt_conclusion(&mut self, _: FmtConclusion<'_>) -> Result<(), Self::Error> {
        Ok(())
    }
}
