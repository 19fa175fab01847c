//! HTTP(S) fetcher on top of `reqwless` and the embassy-net stack.

use embassy_net::dns::DnsSocket;
use embassy_net::tcp::client::TcpClient;
use embassy_time::{with_timeout, Duration};
use reqwless::client::{HttpClient, TlsConfig, TlsVerify};
use reqwless::request::{Method, RequestBuilder};

use crate::api::aggregate::parse_aggregate;
use crate::api::calendar::{calendar_url, parse_calendar};
use crate::api::thingspeak::update_url;
use crate::api::weather::{parse_weather, weather_url};
use crate::api::{check_status, Fetcher};
use crate::config::{
    AGGREGATE_URL, GCAL_JSON_URL, HTTP_TIMEOUT_MS, OWM_API_KEY, OWM_BASE_URL, OWM_LANG, OWM_LAT,
    OWM_LON, OWM_UNITS, THINGSPEAK_BASE_URL, THINGSPEAK_WRITE_KEY,
};
use crate::data::{AggregateSnapshot, EventList, WeatherSnapshot};
use crate::error::{FetchError, TransportKind};

pub const TLS_BUF_SIZE: usize = 16 * 1024;
pub const TCP_BUF_SIZE: usize = 1024;

pub type Tcp<'d> = TcpClient<'d, 1, TCP_BUF_SIZE, TCP_BUF_SIZE>;

/// Buffers borrowed for the lifetime of the fetcher; one request at a time.
pub struct HttpFetcher<'d> {
    tcp: &'d Tcp<'d>,
    dns: &'d DnsSocket<'d>,
    tls_read: &'d mut [u8],
    tls_write: &'d mut [u8],
    rx: &'d mut [u8],
    seed: u64,
}

impl<'d> HttpFetcher<'d> {
    pub fn new(
        tcp: &'d Tcp<'d>,
        dns: &'d DnsSocket<'d>,
        tls_read: &'d mut [u8],
        tls_write: &'d mut [u8],
        rx: &'d mut [u8],
        seed: u64,
    ) -> Self {
        Self {
            tcp,
            dns,
            tls_read,
            tls_write,
            rx,
            seed,
        }
    }

    /// GET `url` and hand the body to `decode`, all within the request budget.
    async fn get<T>(
        &mut self,
        url: &str,
        decode: impl FnOnce(&[u8]) -> Result<T, FetchError>,
    ) -> Result<T, FetchError> {
        if url.is_empty() {
            return Err(TransportKind::InvalidUrl.into());
        }
        debug!("GET {}", url);

        match with_timeout(Duration::from_millis(HTTP_TIMEOUT_MS), self.exchange(url)).await {
            Ok(Ok(body)) => decode(body),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(TransportKind::Timeout.into()),
        }
    }

    async fn exchange(&mut self, url: &str) -> Result<&[u8], FetchError> {
        self.seed = self.seed.wrapping_add(1);
        let tls = TlsConfig::new(self.seed, self.tls_read, self.tls_write, TlsVerify::None);
        let mut client = HttpClient::new_with_tls(self.tcp, self.dns, tls);

        let request = client
            .request(Method::GET, url)
            .await
            .map_err(|_| TransportKind::Connect)?;
        let mut request = request.headers(&[
            ("User-Agent", "infodash"),
            ("Accept", "application/json"),
        ]);

        let response = request
            .send(self.rx)
            .await
            .map_err(|_| TransportKind::Io)?;
        check_status(response.status.0)?;

        response.body().read_to_end().await.map(|b| &*b).map_err(|e| match e {
            reqwless::Error::BufferTooSmall => TransportKind::BodyTooLarge.into(),
            _ => TransportKind::Io.into(),
        })
    }
}

impl Fetcher for HttpFetcher<'_> {
    async fn fetch_weather(&mut self) -> Result<WeatherSnapshot, FetchError> {
        if OWM_API_KEY.is_empty() {
            return Err(TransportKind::InvalidUrl.into());
        }
        let url = weather_url(OWM_BASE_URL, OWM_LAT, OWM_LON, OWM_UNITS, OWM_LANG, OWM_API_KEY)
            .ok_or(TransportKind::InvalidUrl)?;
        self.get(&url, parse_weather).await
    }

    async fn fetch_calendar(&mut self, max_items: usize) -> Result<EventList, FetchError> {
        if GCAL_JSON_URL.is_empty() {
            return Err(TransportKind::InvalidUrl.into());
        }
        let url = calendar_url(GCAL_JSON_URL, max_items).ok_or(TransportKind::InvalidUrl)?;
        self.get(&url, |body| parse_calendar(body, max_items)).await
    }

    async fn fetch_aggregate(&mut self) -> Result<AggregateSnapshot, FetchError> {
        self.get(AGGREGATE_URL, parse_aggregate).await
    }

    async fn publish_aggregate(&mut self, aggregate: &AggregateSnapshot) -> Result<(), FetchError> {
        let Some(key) = THINGSPEAK_WRITE_KEY else {
            return Ok(());
        };
        let url = update_url(THINGSPEAK_BASE_URL, key, aggregate).ok_or(TransportKind::InvalidUrl)?;
        self.get(&url, |_| Ok(())).await?;
        info!("thingspeak updated");
        Ok(())
    }
}
