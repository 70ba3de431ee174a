// ABOUTME: Macros that generate the named PDU constructors on `Pdu`
// ABOUTME: Requests draw a fresh sequence number, responses reuse the caller's

/// Generates `new_*` constructors for request PDUs.
///
/// Each constructor presets the command_id and takes the next value from
/// the sequence allocator; every mandatory field is left unset.
macro_rules! request_constructors {
    ($($fn_name:ident => $command_id:ident,)*) => {
        $(
            #[doc = concat!("Creates an empty `", stringify!($command_id), "` with the next sequence number.")]
            pub fn $fn_name() -> Self {
                Self::new($crate::datatypes::CommandId::$command_id)
            }
        )*
    };
}

/// Generates `new_*_resp_seq` constructors for response PDUs.
///
/// The caller supplies the sequence number of the request being answered.
macro_rules! response_constructors {
    ($($fn_name:ident => $command_id:ident,)*) => {
        $(
            #[doc = concat!("Creates an empty `", stringify!($command_id), "` answering `sequence_number`.")]
            pub fn $fn_name(sequence_number: u32) -> Self {
                Self::with_sequence($crate::datatypes::CommandId::$command_id, sequence_number)
            }
        )*
    };
}

pub(crate) use {request_constructors, response_constructors};
