use crate::problem::StructuredError;
use crate::request::Request;
use crate::validator::{self, Constraint};

use super::Stage;

/// Where [`Validate`] reads its input mapping from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Source {
    /// The JSON body; non-objects read as empty.
    Body,
    /// The `cookie` headers.
    Cookies,
}

/// Rejects the request with a 400 `ValidationError` when `rules` fail.
pub struct Validate {
    source: Source,
    rules: Vec<(&'static str, Constraint)>,
}

impl Validate {
    pub fn body(rules: &[(&'static str, Constraint)]) -> Self {
        Self { source: Source::Body, rules: rules.to_vec() }
    }

    pub fn cookies(rules: &[(&'static str, Constraint)]) -> Self {
        Self { source: Source::Cookies, rules: rules.to_vec() }
    }
}

impl Stage for Validate {
    fn run(&self, req: &mut Request) -> Result<(), StructuredError> {
        let input = match self.source {
            Source::Body => req.body_map(),
            Source::Cookies => req.cookies(),
        };
        validator::validate(&input, &self.rules)?;
        Ok(())
    }
}
