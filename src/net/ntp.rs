//! SNTP time sync.
//!
//! Servers in [`NTP_SERVERS`] are tried in order; the first answer anchors
//! [`super::WALL_CLOCK`]. After a success the task sleeps for the resync
//! period, after a total failure only for the retry period.

use core::net::{IpAddr, SocketAddr};

use embassy_net::dns::DnsQueryType;
use embassy_net::udp::{PacketMetadata, UdpSocket};
use embassy_net::Stack;
use embassy_time::{with_timeout, Duration, Instant, Timer};
use sntpc::{get_time, NtpContext, NtpTimestampGenerator};

use crate::config::{NTP_RESYNC_SECS, NTP_RETRY_SECS, NTP_SERVERS, NTP_TIMEOUT_MS};
use crate::error::Error;

use super::WALL_CLOCK;

const NTP_PORT: u16 = 123;

/// Local transmit timestamps for SNTP, counted from task start.
#[derive(Clone, Copy)]
struct MonotonicStamp {
    start: Instant,
}

impl MonotonicStamp {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl NtpTimestampGenerator for MonotonicStamp {
    fn init(&mut self) {
        self.start = Instant::now();
    }

    fn timestamp_sec(&self) -> u64 {
        self.start.elapsed().as_secs()
    }

    fn timestamp_subsec_micros(&self) -> u32 {
        (self.start.elapsed().as_micros() % 1_000_000) as u32
    }
}

#[embassy_executor::task]
pub async fn ntp_task(stack: Stack<'static>) -> ! {
    loop {
        stack.wait_config_up().await;

        let pause = match query(stack).await {
            Ok(unix_secs) => {
                let now_ms = Instant::now().as_millis();
                WALL_CLOCK.lock(|cell| {
                    let mut clock = cell.get();
                    clock.sync(unix_secs, now_ms);
                    cell.set(clock);
                });
                info!("ntp: synced, unix {}", unix_secs);
                NTP_RESYNC_SECS
            }
            Err(e) => {
                warn!("ntp: {}", e);
                NTP_RETRY_SECS
            }
        };

        Timer::after(Duration::from_secs(pause)).await;
    }
}

/// Ask each configured server in turn; UTC epoch seconds from the first reply.
async fn query(stack: Stack<'_>) -> Result<i64, Error> {
    let mut rx_meta = [PacketMetadata::EMPTY; 4];
    let mut rx_buf = [0u8; 512];
    let mut tx_meta = [PacketMetadata::EMPTY; 4];
    let mut tx_buf = [0u8; 512];
    let mut socket = UdpSocket::new(stack, &mut rx_meta, &mut rx_buf, &mut tx_meta, &mut tx_buf);
    socket.bind(NTP_PORT).map_err(|_| Error::Network)?;

    for server in NTP_SERVERS {
        let addrs = match stack.dns_query(server, DnsQueryType::A).await {
            Ok(addrs) => addrs,
            Err(e) => {
                warn!("ntp: dns {} failed: {}", server, e);
                continue;
            }
        };
        let Some(addr) = addrs.first() else {
            warn!("ntp: {} has no A record", server);
            continue;
        };
        let addr: IpAddr = (*addr).into();

        let context = NtpContext::new(MonotonicStamp::new());
        let budget = Duration::from_millis(NTP_TIMEOUT_MS);
        match with_timeout(budget, get_time(SocketAddr::new(addr, NTP_PORT), &socket, context)).await {
            Ok(Ok(reply)) => return Ok(i64::from(reply.sec())),
            Ok(Err(_)) => warn!("ntp: {} answered badly", server),
            Err(_) => warn!("ntp: {} timed out", server),
        }
    }

    Err(Error::TimeSync)
}
