//! Error types for infodash.
//!
//! All variants carry only fixed-size data so they can be copied through the
//! scheduler and logged with `defmt` without allocation.

/// Why a remote fetch failed.
///
/// The scheduler treats every variant the same way (retry sooner, keep the
/// cached value); the distinction only matters for diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FetchError {
    /// Connection, DNS, TLS or timeout failure - no usable response.
    Transport(TransportKind),
    /// The server answered with a non-success HTTP status.
    Protocol(u16),
    /// The body was not the JSON shape we expect.
    Payload(PayloadKind),
}

/// Where the transport gave up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportKind {
    /// DNS, TCP connect or TLS handshake failed.
    Connect,
    /// Request write or response read failed mid-way.
    Io,
    /// The whole-request budget elapsed.
    Timeout,
    /// Response larger than the receive buffer.
    BodyTooLarge,
    /// Endpoint not configured, or the URL did not fit its buffer.
    InvalidUrl,
}

/// What was wrong with the payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PayloadKind {
    /// Not valid JSON.
    Syntax,
    /// Valid JSON but a required field is missing or has the wrong type.
    Shape,
    /// A date/time field could not be normalised to UTC.
    Timestamp,
}

/// Top-level error type used across the application.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A refresh timer was configured with `retry >= normal`.
    InvalidInterval,

    /// I²C transaction to the display failed (fatal at start-up).
    Display,

    /// Wi-Fi controller or network stack could not be brought up.
    Network,

    /// No NTP server answered.
    TimeSync,
}

// Convenience conversions

impl From<TransportKind> for FetchError {
    fn from(kind: TransportKind) -> Self {
        FetchError::Transport(kind)
    }
}

impl From<PayloadKind> for FetchError {
    fn from(kind: PayloadKind) -> Self {
        FetchError::Payload(kind)
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        use serde_json::error::Category;
        match e.classify() {
            Category::Data => FetchError::Payload(PayloadKind::Shape),
            Category::Io | Category::Syntax | Category::Eof => {
                FetchError::Payload(PayloadKind::Syntax)
            }
        }
    }
}
