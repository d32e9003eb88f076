use std::future::Future;

use crate::Error;

mod http;
mod response;

pub use http::HttpGeoLookup;
pub use response::GeoResponse;

/// Raw outcome of one lookup request: the upstream status and body.
#[derive(Debug, Clone)]
pub struct LookupReply {
    pub status: u16,
    pub body: String,
}

impl LookupReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Something that can ask a geolocation service about an address.
pub trait GeoLookup: Send + Sync {
    fn fetch(&self, ip: &str) -> impl Future<Output = Result<LookupReply, Error>> + Send;
}
