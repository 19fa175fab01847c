//! OpenWeatherMap "current weather" request and decoder.

use core::fmt::Write;

use heapless::String;
use serde::Deserialize;

use crate::api::reject_array;
use crate::data::{bounded, WeatherSnapshot};
use crate::error::FetchError;

pub type Url = String<256>;

/// Build the request URL. Returns `None` if the result would not fit.
pub fn weather_url(
    base: &str,
    lat: &str,
    lon: &str,
    units: &str,
    lang: &str,
    api_key: &str,
) -> Option<Url> {
    let mut url = Url::new();
    write!(
        url,
        "{base}?lat={lat}&lon={lon}&units={units}&lang={lang}&appid={api_key}"
    )
    .ok()?;
    Some(url)
}

#[derive(Deserialize)]
struct WireWeather {
    main: WireMain,
    #[serde(default)]
    weather: alloc::vec::Vec<WireCondition>,
}

#[derive(Deserialize)]
struct WireMain {
    temp: f32,
    humidity: f32,
}

#[derive(Deserialize)]
struct WireCondition {
    #[serde(default)]
    icon: alloc::string::String,
    #[serde(default)]
    description: alloc::string::String,
}

/// Decode a response body. `main.temp` and `main.humidity` are required;
/// the condition list may be empty.
pub fn parse_weather(body: &[u8]) -> Result<WeatherSnapshot, FetchError> {
    reject_array(body)?;
    let wire: WireWeather = serde_json::from_slice(body)?;

    let mut snapshot = WeatherSnapshot {
        temperature: wire.main.temp,
        humidity: wire.main.humidity,
        ..WeatherSnapshot::default()
    };
    if let Some(first) = wire.weather.first() {
        snapshot.icon = bounded(&first.icon);
        snapshot.description = bounded(&first.description);
    }
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::WeatherIcon;
    use crate::error::PayloadKind;

    const SAMPLE: &str = r#"{
        "coord": {"lon": 106.7009, "lat": 10.7769},
        "weather": [{"id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d"}],
        "main": {"temp": 31.5, "feels_like": 36.2, "pressure": 1008, "humidity": 62},
        "name": "Ho Chi Minh City"
    }"#;

    #[test]
    fn url_carries_all_query_parameters() {
        let url = weather_url(
            "https://api.openweathermap.org/data/2.5/weather",
            "10.7769",
            "106.7009",
            "metric",
            "en",
            "KEY",
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.openweathermap.org/data/2.5/weather?lat=10.7769&lon=106.7009&units=metric&lang=en&appid=KEY"
        );
    }

    #[test]
    fn decodes_provider_payload() {
        let w = parse_weather(SAMPLE.as_bytes()).unwrap();
        assert_eq!(w.temperature, 31.5);
        assert_eq!(w.humidity, 62.0);
        assert_eq!(w.icon.as_str(), "04d");
        assert_eq!(w.description.as_str(), "broken clouds");
        assert_eq!(w.condition(), WeatherIcon::Cloudy);
    }

    #[test]
    fn empty_condition_list_is_allowed() {
        let w = parse_weather(br#"{"main":{"temp":20,"humidity":50},"weather":[]}"#).unwrap();
        assert_eq!(w.icon.as_str(), "");
        assert_eq!(w.condition(), WeatherIcon::Unknown);
    }

    #[test]
    fn missing_main_is_a_shape_error() {
        let err = parse_weather(br#"{"weather":[]}"#).unwrap_err();
        assert_eq!(err, FetchError::Payload(PayloadKind::Shape));
    }

    #[test]
    fn array_body_is_a_shape_error() {
        let err = parse_weather(br#"[{"temp":20,"humidity":50}, []]"#).unwrap_err();
        assert_eq!(err, FetchError::Payload(PayloadKind::Shape));
    }

    #[test]
    fn truncated_body_is_a_syntax_error() {
        let err = parse_weather(br#"{"main":{"temp":20,"#).unwrap_err();
        assert_eq!(err, FetchError::Payload(PayloadKind::Syntax));
    }
}
