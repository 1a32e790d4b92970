use crate::ip;
use crate::problem::StructuredError;
use crate::request::{Request, RequestMetadata};

use super::Stage;

/// Attaches [`RequestMetadata`] to every request. Never rejects.
#[derive(Clone, Copy, Debug)]
pub struct InjectMetadata {
    trust_proxy: bool,
}

impl InjectMetadata {
    /// `trust_proxy` enables `x-real-ip` / `x-forwarded-for`.
    pub fn new(trust_proxy: bool) -> Self {
        Self { trust_proxy }
    }
}

impl Stage for InjectMetadata {
    fn run(&self, req: &mut Request) -> Result<(), StructuredError> {
        let client_ip = ip::extract(req, self.trust_proxy);
        req.set_metadata(RequestMetadata { client_ip });
        Ok(())
    }
}
