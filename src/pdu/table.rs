// ABOUTME: Ordered mandatory-field tables for every PDU this client understands
// ABOUTME: The same table drives serialization and parsing of a PDU body

use crate::datatypes::{CommandId, FieldKind, FieldName};

type Table = &'static [(FieldName, FieldKind)];

const fn cstr(max: usize) -> FieldKind {
    FieldKind::CString { max }
}

/// One opaque octet (bit fields and flags)
const OCTET: FieldKind = FieldKind::Octets(1);

const BIND: Table = &[
    (FieldName::SystemId, cstr(16)),
    (FieldName::Password, cstr(9)),
    (FieldName::SystemType, cstr(13)),
    (FieldName::InterfaceVersion, FieldKind::U8),
    (FieldName::AddrTon, FieldKind::U8),
    (FieldName::AddrNpi, FieldKind::U8),
    (FieldName::AddressRange, cstr(41)),
];

const BIND_RESP: Table = &[(FieldName::SystemId, cstr(16))];

const OUTBIND: Table = &[
    (FieldName::SystemId, cstr(16)),
    (FieldName::Password, cstr(9)),
];

/// submit_sm and deliver_sm share one layout.
const SHORT_MESSAGE: Table = &[
    (FieldName::ServiceType, cstr(6)),
    (FieldName::SourceAddrTon, FieldKind::U8),
    (FieldName::SourceAddrNpi, FieldKind::U8),
    (FieldName::SourceAddr, cstr(21)),
    (FieldName::DestAddrTon, FieldKind::U8),
    (FieldName::DestAddrNpi, FieldKind::U8),
    (FieldName::DestinationAddr, cstr(21)),
    (FieldName::EsmClass, OCTET),
    (FieldName::ProtocolId, OCTET),
    (FieldName::PriorityFlag, OCTET),
    (FieldName::ScheduleDeliveryTime, cstr(17)),
    (FieldName::ValidityPeriod, cstr(17)),
    (FieldName::RegisteredDelivery, OCTET),
    (FieldName::ReplaceIfPresentFlag, OCTET),
    (FieldName::DataCoding, FieldKind::U8),
    (FieldName::SmDefaultMsgId, FieldKind::U8),
    (FieldName::SmLength, FieldKind::U8),
    (FieldName::ShortMessage, FieldKind::ShortMessage),
];

const MESSAGE_ID: Table = &[(FieldName::MessageId, cstr(65))];

const DATA_SM: Table = &[
    (FieldName::ServiceType, cstr(6)),
    (FieldName::SourceAddrTon, FieldKind::U8),
    (FieldName::SourceAddrNpi, FieldKind::U8),
    (FieldName::SourceAddr, cstr(65)),
    (FieldName::DestAddrTon, FieldKind::U8),
    (FieldName::DestAddrNpi, FieldKind::U8),
    (FieldName::DestinationAddr, cstr(65)),
    (FieldName::EsmClass, OCTET),
    (FieldName::RegisteredDelivery, OCTET),
    (FieldName::DataCoding, FieldKind::U8),
];

const QUERY_SM: Table = &[
    (FieldName::MessageId, cstr(65)),
    (FieldName::SourceAddrTon, FieldKind::U8),
    (FieldName::SourceAddrNpi, FieldKind::U8),
    (FieldName::SourceAddr, cstr(21)),
];

const QUERY_SM_RESP: Table = &[
    (FieldName::MessageId, cstr(65)),
    (FieldName::FinalDate, cstr(17)),
    (FieldName::MessageState, FieldKind::U8),
    (FieldName::ErrorCode, FieldKind::U8),
];

const CANCEL_SM: Table = &[
    (FieldName::ServiceType, cstr(6)),
    (FieldName::MessageId, cstr(65)),
    (FieldName::SourceAddrTon, FieldKind::U8),
    (FieldName::SourceAddrNpi, FieldKind::U8),
    (FieldName::SourceAddr, cstr(21)),
    (FieldName::DestAddrTon, FieldKind::U8),
    (FieldName::DestAddrNpi, FieldKind::U8),
    (FieldName::DestinationAddr, cstr(21)),
];

const ALERT_NOTIFICATION: Table = &[
    (FieldName::SourceAddrTon, FieldKind::U8),
    (FieldName::SourceAddrNpi, FieldKind::U8),
    (FieldName::SourceAddr, cstr(65)),
    (FieldName::EsmeAddrTon, FieldKind::U8),
    (FieldName::EsmeAddrNpi, FieldKind::U8),
    (FieldName::EsmeAddr, cstr(65)),
];

/// The mandatory fields of `command_id`, in wire order.
pub fn field_table(command_id: CommandId) -> &'static [(FieldName, FieldKind)] {
    match command_id {
        CommandId::BindReceiver | CommandId::BindTransmitter | CommandId::BindTransceiver => BIND,
        CommandId::BindReceiverResp
        | CommandId::BindTransmitterResp
        | CommandId::BindTransceiverResp => BIND_RESP,
        CommandId::Outbind => OUTBIND,
        CommandId::SubmitSm | CommandId::DeliverSm => SHORT_MESSAGE,
        CommandId::SubmitSmResp | CommandId::DeliverSmResp | CommandId::DataSmResp => MESSAGE_ID,
        CommandId::DataSm => DATA_SM,
        CommandId::QuerySm => QUERY_SM,
        CommandId::QuerySmResp => QUERY_SM_RESP,
        CommandId::CancelSm => CANCEL_SM,
        CommandId::AlertNotification => ALERT_NOTIFICATION,
        CommandId::GenericNack
        | CommandId::Unbind
        | CommandId::UnbindResp
        | CommandId::CancelSmResp
        | CommandId::EnquireLink
        | CommandId::EnquireLinkResp => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_names_are_unique_per_table() {
        let ids = [
            CommandId::BindTransmitter,
            CommandId::SubmitSm,
            CommandId::DataSm,
            CommandId::QuerySmResp,
            CommandId::CancelSm,
            CommandId::AlertNotification,
        ];
        for id in ids {
            let table = field_table(id);
            for (i, (name, _)) in table.iter().enumerate() {
                assert!(
                    table[i + 1..].iter().all(|(other, _)| other != name),
                    "{name} repeated in {id}"
                );
            }
        }
    }

    #[test]
    fn sm_length_directly_precedes_short_message() {
        let table = field_table(CommandId::DeliverSm);
        let n = table.len();
        assert_eq!(table[n - 2].0, FieldName::SmLength);
        assert_eq!(table[n - 1].1, FieldKind::ShortMessage);
    }

    #[test]
    fn header_only_pdus_have_no_body() {
        assert!(field_table(CommandId::EnquireLink).is_empty());
        assert!(field_table(CommandId::GenericNack).is_empty());
        assert_eq!(field_table(CommandId::BindReceiverResp).len(), 1);
    }
}
