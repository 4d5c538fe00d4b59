//! ipinfo.io-compatible lookup client.

use std::time::Duration;

use log::debug;
use serde::Deserialize;

use super::{parse_location, Coordinates, GeoLocator};
use crate::error_handling::GeolocationError;

/// Subset of the ipinfo `/{ip}/json` response we use.
#[derive(Debug, Deserialize)]
struct IpInfoResponse {
    /// `"latitude,longitude"`
    loc: Option<String>,
}

/// Looks addresses up at `{base_url}/{ip}/json`.
pub struct IpInfoLocator {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    timeout: Duration,
}

impl IpInfoLocator {
    /// `client` should carry the lookup timeout; `timeout` is only used to
    /// label timeout errors.
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Self {
        IpInfoLocator {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            timeout,
        }
    }

    fn lookup_url(&self, address: &str) -> String {
        format!("{}/{}/json", self.base_url, address)
    }

    fn classify(&self, e: reqwest::Error) -> GeolocationError {
        if e.is_timeout() {
            GeolocationError::Timeout(self.timeout)
        } else if e.is_decode() {
            GeolocationError::Malformed(e.to_string())
        } else {
            GeolocationError::Request(e)
        }
    }
}

impl GeoLocator for IpInfoLocator {
    async fn locate(&self, address: &str) -> Result<Coordinates, GeolocationError> {
        let mut request = self.client.get(self.lookup_url(address));
        if let Some(token) = &self.token {
            request = request.query(&[("token", token)]);
        }

        let response = request.send().await.map_err(|e| self.classify(e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(GeolocationError::Status(status.as_u16()));
        }

        let body: IpInfoResponse = response.json().await.map_err(|e| self.classify(e))?;
        debug!("ipinfo response for {address}: loc={:?}", body.loc);
        let loc = body.loc.ok_or(GeolocationError::MissingLocation)?;
        parse_location(&loc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httptest::{matchers::*, responders::*, Expectation, Server};

    fn locator(server: &Server, token: Option<&str>) -> IpInfoLocator {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(500))
            .build()
            .expect("Failed to create client");
        IpInfoLocator::new(
            client,
            format!("http://{}/", server.addr()),
            token.map(str::to_string),
            Duration::from_millis(500),
        )
    }

    #[tokio::test]
    async fn test_locate_success() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/8.8.8.8/json")).respond_with(
                status_code(200).body(
                    r#"{"ip":"8.8.8.8","city":"Mountain View","loc":"37.4056,-122.0775"}"#,
                ),
            ),
        );

        let coords = locator(&server, None).locate("8.8.8.8").await.unwrap();
        assert_eq!(coords.latitude, 37.4056);
        assert_eq!(coords.longitude, -122.0775);
    }

    #[tokio::test]
    async fn test_locate_sends_token() {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("GET", "/1.1.1.1/json"),
                request::query(url_decoded(contains(("token", "secret")))),
            ])
            .respond_with(status_code(200).body(r#"{"loc":"-33.8688,151.2093"}"#)),
        );

        let coords = locator(&server, Some("secret"))
            .locate("1.1.1.1")
            .await
            .unwrap();
        assert_eq!(coords.latitude, -33.8688);
    }

    #[tokio::test]
    async fn test_locate_missing_loc() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/10.0.0.1/json"))
                .respond_with(status_code(200).body(r#"{"ip":"10.0.0.1","bogon":true}"#)),
        );

        let err = locator(&server, None).locate("10.0.0.1").await.unwrap_err();
        assert!(matches!(err, GeolocationError::MissingLocation));
    }

    #[tokio::test]
    async fn test_locate_non_2xx() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/8.8.4.4/json"))
                .respond_with(status_code(429).body(r#"{"error":"rate limited"}"#)),
        );

        let err = locator(&server, None).locate("8.8.4.4").await.unwrap_err();
        assert!(matches!(err, GeolocationError::Status(429)));
    }

    #[tokio::test]
    async fn test_locate_malformed_body() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/9.9.9.9/json"))
                .respond_with(status_code(200).body("<html>oops</html>")),
        );

        let err = locator(&server, None).locate("9.9.9.9").await.unwrap_err();
        assert!(matches!(err, GeolocationError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_locate_timeout() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/4.4.4.4/json")).respond_with(
                delay_and_then(
                    Duration::from_secs(2),
                    status_code(200).body(r#"{"loc":"1,1"}"#),
                ),
            ),
        );

        let err = locator(&server, None).locate("4.4.4.4").await.unwrap_err();
        assert!(matches!(err, GeolocationError::Timeout(_)));
    }
}
