//! Wire-level reference vectors and end-to-end session tests against a
//! scripted SMSC on a loopback socket.

use crate::client::{
    BindCredentials, ClientBuilder, ConnStatus, KeepAliveConfig, SessionState, SmppError,
    StatusStream,
};
use crate::datatypes::{CommandId, CommandStatus, DataCoding, FieldName, Text, TlvTag};
use crate::pdu::Pdu;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::{Instant, timeout};

mod wire_vectors {
    use super::*;

    const BIND_TRANSMITTER: [u8; 42] = [
        0x00, 0x00, 0x00, 0x2A, 0x00, 0x00, 0x00, 0x02, // length, bind_transmitter
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, // status, sequence
        0x73, 0x6D, 0x70, 0x70, 0x63, 0x6C, 0x69, 0x65, // "smppclie"
        0x6E, 0x74, 0x31, 0x00, 0x70, 0x61, 0x73, 0x73, // "nt1\0pass"
        0x77, 0x6F, 0x72, 0x64, 0x00, 0x00, 0x34, 0x00, // "word\0", system_type, version, ton
        0x00, 0x00, // npi, address_range
    ];

    const DELIVER_SM: [u8; 54] = [
        0x00, 0x00, 0x00, 0x36, 0x00, 0x00, 0x00, 0x05, // length, deliver_sm
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, // status, sequence
        0x00, 0x00, 0x00, 0x31, 0x32, 0x33, 0x00, 0x00, // service_type, ton, npi, "123\0", ton
        0x00, 0x34, 0x35, 0x36, 0x00, 0x00, 0x00, 0x00, // npi, "456\0", esm_class, protocol_id, priority
        0x00, 0x00, 0x00, 0x00, 0x03, 0x00, 0x04, 0x74, // times, registered_delivery, replace, coding, default_msg_id, length, "t"
        0x65, 0x73, 0x74, 0x00, 0x1e, 0x00, 0x07, 0x4d, // "est", receipted_message_id
        0x53, 0x47, 0x5f, 0x49, 0x44, 0x00, // "SG_ID\0"
    ];

    #[test]
    fn bind_transmitter_matches_reference_bytes() {
        let mut pdu = Pdu::with_sequence(CommandId::BindTransmitter, 1);
        pdu.set(FieldName::SystemId, "smppclient1")
            .unwrap()
            .set(FieldName::Password, "password")
            .unwrap()
            .set(FieldName::InterfaceVersion, 0x34u8)
            .unwrap();

        let wire = pdu.serialize().unwrap();
        assert_eq!(wire.as_ref(), &BIND_TRANSMITTER[..]);

        let parsed = Pdu::decode(&wire).unwrap();
        assert_eq!(parsed.header().command_length, 0x2A);
        assert_eq!(parsed.command_id(), CommandId::BindTransmitter);
        assert_eq!(parsed.sequence_number(), 1);
        assert_eq!(parsed.get_str(FieldName::SystemId), Some("smppclient1"));
        assert_eq!(parsed.get_str(FieldName::Password), Some("password"));
        assert_eq!(parsed.get_u8(FieldName::InterfaceVersion), Some(0x34));
    }

    #[test]
    fn deliver_sm_matches_reference_bytes() {
        let mut pdu = Pdu::with_sequence(CommandId::DeliverSm, 1);
        pdu.set(FieldName::SourceAddr, "123")
            .unwrap()
            .set(FieldName::DestinationAddr, "456")
            .unwrap()
            .set(FieldName::ShortMessage, Text::encode(DataCoding::Latin1, "test").unwrap())
            .unwrap();
        pdu.tlvs_mut()
            .set_cstring(TlvTag::RECEIPTED_MESSAGE_ID, "MSG_ID")
            .unwrap();

        let wire = pdu.serialize().unwrap();
        assert_eq!(wire.as_ref(), &DELIVER_SM[..]);

        let parsed = Pdu::decode(&DELIVER_SM).unwrap();
        assert_eq!(parsed.header().command_length, 0x36);
        assert_eq!(parsed.command_id(), CommandId::DeliverSm);
        assert_eq!(parsed.sequence_number(), 1);
        assert_eq!(parsed.get_str(FieldName::SourceAddr), Some("123"));
        assert_eq!(parsed.get_str(FieldName::DestinationAddr), Some("456"));
        assert_eq!(parsed.data_coding(), DataCoding::Latin1);
        let text = parsed.short_message().unwrap();
        assert_eq!(text.to_string_lossy().unwrap(), "test");
        assert_eq!(
            parsed.tlvs().get_cstring(TlvTag::RECEIPTED_MESSAGE_ID),
            Some("MSG_ID")
        );
    }

    #[test]
    fn truncated_reference_pdu_is_rejected() {
        assert!(Pdu::decode(&DELIVER_SM[..40]).is_err());
        // header claims more than the body holds
        let mut short = DELIVER_SM;
        short[3] = 0x37;
        assert!(Pdu::decode(&short).is_err());
    }

    #[test]
    fn unterminated_cstring_is_rejected() {
        // "smppclient1\0" is intact, the password never terminates
        let mut data = BIND_TRANSMITTER[..28].to_vec();
        data.extend_from_slice(b"pass");
        data[3] = 32;
        assert!(Pdu::decode(&data).is_err());
    }
}

mod session {
    use super::*;

    const WAIT: Duration = Duration::from_secs(5);

    async fn read_pdu(socket: &mut TcpStream) -> std::io::Result<Pdu> {
        let mut frame = vec![0u8; 16];
        socket.read_exact(&mut frame).await?;
        let length = u32::from_be_bytes([frame[0], frame[1], frame[2], frame[3]]) as usize;
        frame.resize(length, 0);
        socket.read_exact(&mut frame[16..]).await?;
        Pdu::decode(&frame)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    async fn write_pdu(socket: &mut TcpStream, pdu: &Pdu) {
        socket.write_all(&pdu.serialize().unwrap()).await.unwrap();
    }

    /// Accepts one connection and completes its bind with `status`.
    async fn accept_bind(
        listener: &TcpListener,
        expect: CommandId,
        status: CommandStatus,
    ) -> TcpStream {
        let (mut socket, _) = timeout(WAIT, listener.accept()).await.unwrap().unwrap();
        let bind = timeout(WAIT, read_pdu(&mut socket)).await.unwrap().unwrap();
        assert_eq!(bind.command_id(), expect);
        assert_eq!(bind.get_str(FieldName::SystemId), Some("esme"));

        let mut resp = bind.response().unwrap();
        resp.set_command_status(status);
        resp.set(FieldName::SystemId, "fake-smsc").unwrap();
        write_pdu(&mut socket, &resp).await;
        socket
    }

    async fn wait_state(status: &mut StatusStream, state: SessionState) -> ConnStatus {
        timeout(WAIT, status.wait_for(state))
            .await
            .unwrap_or_else(|_| panic!("never reached {state:?}"))
            .unwrap()
    }

    async fn listen() -> (TcpListener, ClientBuilder) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let builder = ClientBuilder::new(addr, BindCredentials::new("esme", "secret"))
            .keep_alive(KeepAliveConfig::disabled())
            .bind_interval(Duration::from_millis(200))
            .response_timeout(Duration::from_secs(2));
        (listener, builder)
    }

    #[tokio::test]
    async fn close_before_bind_is_not_connected() {
        let (_listener, builder) = listen().await;
        let tx = builder.transmitter();
        assert!(matches!(tx.close().await, Err(SmppError::NotConnected)));
        assert!(matches!(
            tx.send(&Pdu::new_enquire_link()).await,
            Err(SmppError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn rejected_bind_is_retried() {
        let (listener, builder) = listen().await;
        let tx = builder.transmitter();
        let mut status = tx.bind();

        let mut attempts = Vec::new();
        for _ in 0..3 {
            let _socket =
                accept_bind(&listener, CommandId::BindTransmitter, CommandStatus::BindFailed).await;
            attempts.push(Instant::now());
            let down = wait_state(&mut status, SessionState::Disconnected).await;
            assert!(matches!(
                down.error(),
                Some(SmppError::Protocol(CommandStatus::BindFailed))
            ));
        }
        // every rejection waits out the bind interval before dialling again
        for pair in attempts.windows(2) {
            let gap = pair[1] - pair[0];
            assert!(gap >= Duration::from_millis(200), "rebound after {gap:?}");
        }

        tx.close().await.unwrap();
        assert_eq!(status.latest().state(), SessionState::Closed);
        assert!(matches!(tx.close().await, Err(SmppError::AlreadyClosed)));
    }

    #[tokio::test]
    async fn wrong_bind_response_is_a_failure() {
        let (listener, builder) = listen().await;
        let rx = builder.receiver(|_: Pdu| {});
        let mut status = rx.bind();

        let (mut socket, _) = timeout(WAIT, listener.accept()).await.unwrap().unwrap();
        let bind = read_pdu(&mut socket).await.unwrap();
        assert_eq!(bind.command_id(), CommandId::BindReceiver);
        let wrong = Pdu::new_bind_transmitter_resp_seq(bind.sequence_number());
        write_pdu(&mut socket, &wrong).await;

        let down = wait_state(&mut status, SessionState::Disconnected).await;
        assert!(matches!(
            down.error(),
            Some(SmppError::UnexpectedPdu {
                expected: CommandId::BindReceiverResp,
                actual: CommandId::BindTransmitterResp,
            })
        ));
        rx.close().await.unwrap();
    }

    #[tokio::test]
    async fn bind_twice_opens_one_connection() {
        let (listener, builder) = listen().await;
        let tx = builder.transmitter();
        let mut first = tx.bind();
        let mut second = tx.bind();

        let _socket = accept_bind(&listener, CommandId::BindTransmitter, CommandStatus::Ok).await;
        wait_state(&mut first, SessionState::Connected).await;
        wait_state(&mut second, SessionState::Connected).await;

        let _third = tx.bind();
        assert!(
            timeout(Duration::from_millis(300), listener.accept())
                .await
                .is_err()
        );
        tx.close().await.unwrap();
    }

    #[tokio::test]
    async fn silent_smsc_trips_the_heartbeat() {
        let (listener, builder) = listen().await;
        let tx = builder
            .keep_alive(
                KeepAliveConfig::new(Duration::from_millis(50))
                    .with_timeout(Duration::from_millis(150)),
            )
            .bind_interval(Duration::from_secs(30))
            .transmitter();
        let mut status = tx.bind();

        let mut socket =
            accept_bind(&listener, CommandId::BindTransmitter, CommandStatus::Ok).await;
        wait_state(&mut status, SessionState::Connected).await;

        let down = wait_state(&mut status, SessionState::Disconnected).await;
        assert!(matches!(down.error(), Some(SmppError::HeartbeatTimeout(_))));

        // enquire_links were sent, then the transport was closed
        let mut pings = 0;
        loop {
            match timeout(WAIT, read_pdu(&mut socket)).await.unwrap() {
                Ok(pdu) => {
                    assert_eq!(pdu.command_id(), CommandId::EnquireLink);
                    pings += 1;
                }
                Err(_) => break,
            }
        }
        assert!(pings >= 1);
        tx.close().await.unwrap();
    }

    #[tokio::test]
    async fn answered_heartbeat_keeps_the_session() {
        let (listener, builder) = listen().await;
        let tx = builder
            .keep_alive(
                KeepAliveConfig::new(Duration::from_millis(50))
                    .with_timeout(Duration::from_millis(150)),
            )
            .transmitter();
        let mut status = tx.bind();

        let mut socket =
            accept_bind(&listener, CommandId::BindTransmitter, CommandStatus::Ok).await;
        wait_state(&mut status, SessionState::Connected).await;

        for _ in 0..8 {
            let ping = timeout(WAIT, read_pdu(&mut socket)).await.unwrap().unwrap();
            assert_eq!(ping.command_id(), CommandId::EnquireLink);
            write_pdu(&mut socket, &ping.response().unwrap()).await;
        }
        assert_eq!(status.latest().state(), SessionState::Connected);
        let keep_alive = tx.keep_alive_status();
        assert!(keep_alive.total_pings >= 7);
        assert!(keep_alive.total_pongs >= 7);
        tx.close().await.unwrap();
    }

    #[tokio::test]
    async fn deliver_sm_is_acknowledged_then_dispatched() {
        let (listener, builder) = listen().await;
        let (seen, mut inbox) = mpsc::unbounded_channel();
        let rx = builder.receiver(move |pdu: Pdu| {
            let _ = seen.send(pdu);
        });
        let mut status = rx.bind();

        let mut socket = accept_bind(&listener, CommandId::BindReceiver, CommandStatus::Ok).await;
        wait_state(&mut status, SessionState::Connected).await;

        let mut deliver = Pdu::with_sequence(CommandId::DeliverSm, 77);
        deliver
            .set(FieldName::SourceAddr, "123")
            .unwrap()
            .set(FieldName::ShortMessage, Text::encode(DataCoding::Latin1, "olá").unwrap())
            .unwrap();
        write_pdu(&mut socket, &deliver).await;

        let ack = timeout(WAIT, read_pdu(&mut socket)).await.unwrap().unwrap();
        assert_eq!(ack.command_id(), CommandId::DeliverSmResp);
        assert_eq!(ack.sequence_number(), 77);

        let delivered = timeout(WAIT, inbox.recv()).await.unwrap().unwrap();
        assert_eq!(delivered.sequence_number(), 77);
        assert_eq!(delivered.get_str(FieldName::SourceAddr), Some("123"));
        let text = delivered.short_message().unwrap().to_string_lossy().unwrap();
        assert_eq!(text, "olá");

        rx.close().await.unwrap();
    }

    #[tokio::test]
    async fn panicking_handler_does_not_stop_the_read_loop() {
        let (listener, builder) = listen().await;
        let (seen, mut inbox) = mpsc::unbounded_channel();
        let rx = builder.receiver(move |pdu: Pdu| {
            if pdu.sequence_number() == 1 {
                panic!("handler failure");
            }
            let _ = seen.send(pdu.sequence_number());
        });
        let mut status = rx.bind();

        let mut socket = accept_bind(&listener, CommandId::BindReceiver, CommandStatus::Ok).await;
        wait_state(&mut status, SessionState::Connected).await;

        for seq in [1, 2] {
            let mut deliver = Pdu::with_sequence(CommandId::DeliverSm, seq);
            deliver.set(FieldName::SourceAddr, "123").unwrap();
            write_pdu(&mut socket, &deliver).await;

            let ack = timeout(WAIT, read_pdu(&mut socket)).await.unwrap().unwrap();
            assert_eq!(ack.command_id(), CommandId::DeliverSmResp);
            assert_eq!(ack.sequence_number(), seq);
        }

        assert_eq!(timeout(WAIT, inbox.recv()).await.unwrap(), Some(2));
        assert_eq!(status.latest().state(), SessionState::Connected);

        rx.close().await.unwrap();
    }

    #[tokio::test]
    async fn session_answers_smsc_housekeeping() {
        let (listener, builder) = listen().await;
        let (seen, mut inbox) = mpsc::unbounded_channel();
        let trx = builder.transceiver(move |pdu: Pdu| {
            let _ = seen.send(pdu);
        });
        let mut status = trx.bind();

        let mut socket =
            accept_bind(&listener, CommandId::BindTransceiver, CommandStatus::Ok).await;
        wait_state(&mut status, SessionState::Connected).await;

        write_pdu(&mut socket, &Pdu::with_sequence(CommandId::EnquireLink, 5)).await;
        let pong = timeout(WAIT, read_pdu(&mut socket)).await.unwrap().unwrap();
        assert_eq!(pong.command_id(), CommandId::EnquireLinkResp);
        assert_eq!(pong.sequence_number(), 5);

        // reserved command_id 0x00000010
        let unknown = [
            0x00, 0x00, 0x00, 0x10, 0x00, 0x00, 0x00, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x06,
        ];
        socket.write_all(&unknown).await.unwrap();
        let nack = timeout(WAIT, read_pdu(&mut socket)).await.unwrap().unwrap();
        assert_eq!(nack.command_id(), CommandId::GenericNack);
        assert_eq!(nack.command_status(), CommandStatus::InvalidCommandId);
        assert_eq!(nack.sequence_number(), 6);

        assert_eq!(status.latest().state(), SessionState::Connected);
        assert!(inbox.try_recv().is_err());
        trx.close().await.unwrap();
    }

    #[tokio::test]
    async fn submit_waits_for_its_response() {
        let (listener, builder) = listen().await;
        let tx = builder.transmitter();
        let mut status = tx.bind();

        let mut socket =
            accept_bind(&listener, CommandId::BindTransmitter, CommandStatus::Ok).await;
        wait_state(&mut status, SessionState::Connected).await;

        let smsc = tokio::spawn(async move {
            let submit = read_pdu(&mut socket).await.unwrap();
            assert_eq!(submit.command_id(), CommandId::SubmitSm);
            assert_eq!(submit.get_str(FieldName::DestinationAddr), Some("5678"));
            let mut resp = submit.response().unwrap();
            resp.set(FieldName::MessageId, "msg-1").unwrap();
            write_pdu(&mut socket, &resp).await;

            let submit = read_pdu(&mut socket).await.unwrap();
            let mut resp = submit.response().unwrap();
            resp.set_command_status(CommandStatus::InvalidDestinationAddress);
            write_pdu(&mut socket, &resp).await;
            socket
        });

        let mut sm = Pdu::new_submit_sm();
        sm.set(FieldName::DestinationAddr, "5678")
            .unwrap()
            .set(FieldName::ShortMessage, Text::encode(DataCoding::SmscDefault, "hi").unwrap())
            .unwrap();
        assert_eq!(tx.submit_message_id(&sm).await.unwrap(), "msg-1");

        let rejected = Pdu::new_submit_sm();
        assert!(matches!(
            tx.submit(&rejected).await,
            Err(SmppError::Protocol(CommandStatus::InvalidDestinationAddress))
        ));
        assert!(matches!(
            tx.submit(&Pdu::new_alert_notification()).await,
            Err(SmppError::NotARequest(CommandId::AlertNotification))
        ));

        let _socket = smsc.await.unwrap();
        tx.close().await.unwrap();
    }

    #[tokio::test]
    async fn unanswered_submit_times_out() {
        let (listener, builder) = listen().await;
        let tx = builder.response_timeout(Duration::from_millis(200)).transmitter();
        let mut status = tx.bind();

        let _socket = accept_bind(&listener, CommandId::BindTransmitter, CommandStatus::Ok).await;
        wait_state(&mut status, SessionState::Connected).await;

        assert!(matches!(
            tx.submit(&Pdu::new_submit_sm()).await,
            Err(SmppError::Timeout)
        ));
        tx.close().await.unwrap();
    }

    #[tokio::test]
    async fn smsc_unbind_triggers_rebind() {
        let (listener, builder) = listen().await;
        let tx = builder.transmitter();
        let mut status = tx.bind();

        let mut socket =
            accept_bind(&listener, CommandId::BindTransmitter, CommandStatus::Ok).await;
        wait_state(&mut status, SessionState::Connected).await;

        write_pdu(&mut socket, &Pdu::with_sequence(CommandId::Unbind, 9)).await;
        let resp = timeout(WAIT, read_pdu(&mut socket)).await.unwrap().unwrap();
        assert_eq!(resp.command_id(), CommandId::UnbindResp);
        assert_eq!(resp.sequence_number(), 9);

        let down = wait_state(&mut status, SessionState::Disconnected).await;
        assert!(matches!(down.error(), Some(SmppError::ConnectionClosed)));

        let _socket = accept_bind(&listener, CommandId::BindTransmitter, CommandStatus::Ok).await;
        wait_state(&mut status, SessionState::Connected).await;
        tx.close().await.unwrap();
    }

    #[tokio::test]
    async fn close_unbinds_and_stops_retrying() {
        let (listener, builder) = listen().await;
        let tx = builder.transmitter();
        let mut status = tx.bind();

        let mut socket =
            accept_bind(&listener, CommandId::BindTransmitter, CommandStatus::Ok).await;
        wait_state(&mut status, SessionState::Connected).await;

        tx.close().await.unwrap();
        let unbind = timeout(WAIT, read_pdu(&mut socket)).await.unwrap().unwrap();
        assert_eq!(unbind.command_id(), CommandId::Unbind);
        assert!(timeout(WAIT, read_pdu(&mut socket)).await.unwrap().is_err());

        assert_eq!(status.latest().state(), SessionState::Closed);
        assert!(
            timeout(Duration::from_millis(500), listener.accept())
                .await
                .is_err()
        );
        assert!(matches!(
            tx.send(&Pdu::new_enquire_link()).await,
            Err(SmppError::NotConnected)
        ));
    }
}
