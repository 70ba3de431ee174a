// ABOUTME: Long-running SMPP receiver demo built on the self-healing session
// ABOUTME: Logs every status change and inbound deliver_sm until the run duration elapses

//! # Long-Running SMPP Receiver
//!
//! Binds as receiver (or transceiver with `--to`/`--from`), prints every
//! inbound message and lets the session rebind on its own after failures.
//!
//! ## Usage
//!
//! ```bash
//! # Receive only
//! cargo run --example long_running_receiver -- --system-id test --password secret
//!
//! # Transceiver that also submits a message every two minutes
//! cargo run --example long_running_receiver -- \
//!   --system-id test --password secret \
//!   --to 123456789 --from 987654321 \
//!   --sms-interval 120
//! ```

use argh::FromArgs;
use smpp_client::client::{BindCredentials, ClientBuilder, KeepAliveConfig, SessionState};
use smpp_client::datatypes::{CommandId, DataCoding, FieldName, Text, TlvTag};
use smpp_client::pdu::Pdu;
use std::error::Error;
use std::time::Duration;
use tokio::time::{interval, sleep};
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Long-running SMPP receiver
#[derive(FromArgs)]
struct CliArgs {
    /// whether or not to enable debugging
    #[argh(switch, short = 'd')]
    debugging: bool,

    /// the system id
    #[argh(option)]
    system_id: Option<String>,

    /// the password
    #[argh(option)]
    password: Option<String>,

    /// the hostname of IP address of the SMSC (default: localhost)
    #[argh(option)]
    host: Option<String>,

    /// the port to use when connecting to the SMSC (default: 2775)
    #[argh(option, short = 'p')]
    port: Option<u32>,

    /// keep-alive interval in seconds (default: 30)
    #[argh(option)]
    keep_alive_interval: Option<u64>,

    /// keep-alive timeout in seconds (default: three intervals)
    #[argh(option)]
    keep_alive_timeout: Option<u64>,

    /// seconds between rebind attempts (default: 5)
    #[argh(option)]
    bind_interval: Option<u64>,

    /// how long to run in seconds (default: 300)
    #[argh(option)]
    run_duration: Option<u64>,

    /// interval between SMS sends in seconds (default: 60)
    #[argh(option)]
    sms_interval: Option<u64>,

    /// the recipient telephone number (binds as transceiver when given with --from)
    #[argh(option, short = 't')]
    to: Option<String>,

    /// the telephone number that the message will be from
    #[argh(option, short = 'f')]
    from: Option<String>,
}

fn on_inbound(pdu: Pdu) {
    if pdu.command_id() != CommandId::DeliverSm {
        info!("inbound {} seq={}", pdu.command_id(), pdu.sequence_number());
        return;
    }
    let from = pdu.get_str(FieldName::SourceAddr).unwrap_or_default();
    let text = match pdu.short_message().map(Text::to_string_lossy) {
        Some(Ok(text)) => text,
        Some(Err(e)) => format!("<{e}>"),
        None => String::new(),
    };
    match pdu.tlvs().get_cstring(TlvTag::RECEIPTED_MESSAGE_ID) {
        Some(id) => info!("delivery receipt for {id} from {from}: {text}"),
        None => info!("message from {from}: {text}"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli_args: CliArgs = argh::from_env();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if cli_args.debugging { Level::DEBUG } else { Level::INFO })
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let host = cli_args.host.unwrap_or_else(|| "localhost".to_owned());
    let port = cli_args.port.unwrap_or(2775);
    let run_duration = Duration::from_secs(cli_args.run_duration.unwrap_or(300));
    let sms_interval = Duration::from_secs(cli_args.sms_interval.unwrap_or(60));

    let mut keep_alive =
        KeepAliveConfig::new(Duration::from_secs(cli_args.keep_alive_interval.unwrap_or(30)));
    if let Some(timeout) = cli_args.keep_alive_timeout {
        keep_alive = keep_alive.with_timeout(Duration::from_secs(timeout));
    }

    let credentials = BindCredentials::new(
        cli_args.system_id.unwrap_or_default(),
        cli_args.password.unwrap_or_default(),
    );
    let builder = ClientBuilder::new(format!("{host}:{port}"), credentials)
        .keep_alive(keep_alive)
        .bind_interval(Duration::from_secs(cli_args.bind_interval.unwrap_or(5)));

    info!("Connecting to {host}:{port} for {} seconds", run_duration.as_secs());

    let route = cli_args.to.zip(cli_args.from);
    let Some((to, from)) = route else {
        let receiver = builder.receiver(on_inbound);
        let mut status = receiver.bind();
        let deadline = sleep(run_duration);
        tokio::pin!(deadline);
        loop {
            tokio::select! {
                _ = &mut deadline => break,
                next = status.next() => match next {
                    Some(status) => log_status(status.state(), status.error()),
                    None => break,
                },
            }
        }
        receiver.close().await?;
        info!("Final keep-alive statistics: {:?}", receiver.keep_alive_status());
        return Ok(());
    };

    let transceiver = builder.transceiver(on_inbound);
    let mut status = transceiver.bind();
    let deadline = sleep(run_duration);
    tokio::pin!(deadline);
    let mut sms_timer = interval(sms_interval);
    let mut message_count = 0;

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            next = status.next() => match next {
                Some(status) => log_status(status.state(), status.error()),
                None => break,
            },
            _ = sms_timer.tick() => {
                if status.latest().state() != SessionState::Connected {
                    continue;
                }
                message_count += 1;
                let mut sm = Pdu::new_submit_sm();
                sm.set(FieldName::SourceAddr, from.as_str())?
                    .set(FieldName::DestinationAddr, to.as_str())?
                    .set(FieldName::RegisteredDelivery, 1u8)?
                    .set(
                        FieldName::ShortMessage,
                        Text::encode(DataCoding::SmscDefault, &format!("Test message #{message_count}"))?,
                    )?;
                match transceiver.submit(&sm).await {
                    Ok(resp) => info!(
                        "Message {message_count} accepted, id {}",
                        resp.get_str(FieldName::MessageId).unwrap_or_default()
                    ),
                    Err(e) => error!("Message {message_count} failed: {e}"),
                }
            }
        }
    }

    transceiver.close().await?;
    info!("Final keep-alive statistics: {:?}", transceiver.keep_alive_status());
    info!("Total SMS messages sent: {message_count}");
    Ok(())
}

fn log_status(state: SessionState, error: Option<&smpp_client::SmppError>) {
    match error {
        Some(e) => warn!("session {state:?}: {e}"),
        None => info!("session {state:?}"),
    }
}
