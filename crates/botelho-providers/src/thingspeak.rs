//! ThingSpeak channel updates for occupancy history.

use botelho_core::Occupancy;
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};
use crate::fetch::Fetcher;

/// Default update endpoint.
pub const DEFAULT_UPDATE_URL: &str = "https://api.thingspeak.com/update";

/// The three channel fields pushed per sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccupancySample {
    /// 1 if any known person is present.
    pub anyone: u8,
    /// Known people.
    pub known: usize,
    /// Unattributed devices.
    pub unknown: u32,
}

impl From<&Occupancy> for OccupancySample {
    fn from(occupancy: &Occupancy) -> Self {
        Self {
            anyone: u8::from(occupancy.has_known()),
            known: occupancy.known_count(),
            unknown: occupancy.unknown_devices,
        }
    }
}

/// Writes samples to a ThingSpeak channel.
#[derive(Debug, Clone)]
pub struct ThingSpeakClient {
    fetcher: Fetcher,
    update_url: String,
    write_key: String,
}

impl ThingSpeakClient {
    /// Creates a client; fails if `write_key` is empty.
    pub fn new(
        fetcher: Fetcher,
        update_url: impl Into<String>,
        write_key: impl Into<String>,
    ) -> ProviderResult<Self> {
        let write_key = write_key.into();
        if write_key.trim().is_empty() {
            return Err(ProviderError::configuration("ThingSpeak write key is empty")
                .with_provider("thingspeak"));
        }
        Ok(Self {
            fetcher,
            update_url: update_url.into(),
            write_key,
        })
    }

    /// The update URL for `sample`, including the write key.
    pub fn update_url(&self, sample: OccupancySample) -> String {
        format!(
            "{}?api_key={}&field1={}&field2={}&field3={}",
            self.update_url,
            urlencoding::encode(&self.write_key),
            sample.anyone,
            sample.known,
            sample.unknown
        )
    }

    /// Pushes one sample. The response body is ThingSpeak's entry id, or
    /// `0` when the update was rejected.
    pub async fn push(&self, sample: OccupancySample) -> ProviderResult<()> {
        let body = self
            .fetcher
            .get_text(&self.update_url(sample))
            .await
            .map_err(|e| e.with_provider("thingspeak"))?;
        debug!(
            anyone = sample.anyone,
            known = sample.known,
            unknown = sample.unknown,
            entry = %body.trim(),
            "pushed occupancy sample"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;
    use crate::fetch::FetchConfig;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> Fetcher {
        Fetcher::new(&FetchConfig::default()).unwrap()
    }

    #[test]
    fn sample_from_occupancy() {
        let occ = Occupancy::new(vec!["alice".into(), "bob".into()], 3);
        assert_eq!(
            OccupancySample::from(&occ),
            OccupancySample {
                anyone: 1,
                known: 2,
                unknown: 3
            }
        );
        assert_eq!(OccupancySample::from(&Occupancy::default()).anyone, 0);
    }

    #[test]
    fn empty_key_is_rejected() {
        let err = ThingSpeakClient::new(fetcher(), DEFAULT_UPDATE_URL, " ").unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::Configuration);
    }

    #[test]
    fn builds_update_url() {
        let client = ThingSpeakClient::new(fetcher(), DEFAULT_UPDATE_URL, "KEY").unwrap();
        let url = client.update_url(OccupancySample {
            anyone: 1,
            known: 2,
            unknown: 0,
        });
        assert_eq!(
            url,
            "https://api.thingspeak.com/update?api_key=KEY&field1=1&field2=2&field3=0"
        );
    }

    #[tokio::test]
    async fn pushes_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/update"))
            .and(query_param("api_key", "KEY"))
            .and(query_param("field1", "0"))
            .and(query_param("field2", "0"))
            .and(query_param("field3", "4"))
            .respond_with(ResponseTemplate::new(200).set_body_string("17"))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            ThingSpeakClient::new(fetcher(), format!("{}/update", server.uri()), "KEY").unwrap();
        client
            .push(OccupancySample::from(&Occupancy::new(Vec::new(), 4)))
            .await
            .unwrap();
    }
}
