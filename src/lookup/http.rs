use std::time::Duration;

use isahc::{HttpClient, Request, config::Configurable, prelude::AsyncReadResponseExt};

use crate::{Error, config::Lookup};

use super::{GeoLookup, LookupReply};

pub struct HttpGeoLookup {
    client: HttpClient,
    endpoint: String,
    api_key: String,
}

impl HttpGeoLookup {
    pub fn new(endpoint: &str, api_key: &str, timeout: Duration) -> Result<Self, Error> {
        let client = HttpClient::builder()
            .timeout(timeout)
            .default_header(
                "user-agent",
                format!("iptracker/{}", env!("CARGO_PKG_VERSION")),
            )
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('?').to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn from_config(lookup: &Lookup) -> Result<Self, Error> {
        Self::new(&lookup.endpoint, &lookup.api_key, lookup.timeout())
    }

    fn url(&self, ip: &str) -> String {
        format!(
            "{endpoint}?apikey={key}&ip={ip}",
            endpoint = self.endpoint,
            key = self.api_key,
        )
    }
}

impl GeoLookup for HttpGeoLookup {
    async fn fetch(&self, ip: &str) -> Result<LookupReply, Error> {
        let request = Request::get(self.url(ip))
            .body(())
            .map_err(isahc::Error::from)?;
        let mut response = self.client.send_async(request).await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!("lookup {} -> {}", ip, status);
        Ok(LookupReply { status, body })
    }
}
