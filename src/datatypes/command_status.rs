use num_enum::{FromPrimitive, IntoPrimitive};
use std::fmt;

macro_rules! command_statuses {
    ($($(#[$doc:meta])* $variant:ident = $value:literal, $name:literal;)*) => {
        /// The command_status of a PDU header: zero in requests, the outcome
        /// in responses.
        ///
        /// Codes outside the SMPP v3.4 table (reserved, extension and SMSC
        /// vendor ranges) are carried in [`CommandStatus::Other`] so they
        /// survive a decode/encode cycle.
        #[derive(FromPrimitive, IntoPrimitive)]
        #[repr(u32)]
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
        pub enum CommandStatus {
            Ok = 0x0000_0000,
            $($(#[$doc])* $variant = $value,)*
            #[num_enum(catch_all)]
            Other(u32),
        }

        impl CommandStatus {
            /// The `ESME_R*` constant name, `None` for codes outside the table.
            pub fn name(&self) -> Option<&'static str> {
                match self {
                    CommandStatus::Ok => Some("ESME_ROK"),
                    $(CommandStatus::$variant => Some($name),)*
                    CommandStatus::Other(_) => None,
                }
            }
        }
    };
}

command_statuses! {
    InvalidMsgLength = 0x0000_0001, "ESME_RINVMSGLEN";
    InvalidCommandLength = 0x0000_0002, "ESME_RINVCMDLEN";
    InvalidCommandId = 0x0000_0003, "ESME_RINVCMDID";
    /// The PDU is not allowed in the current bind state
    IncorrectBindStatus = 0x0000_0004, "ESME_RINVBNDSTS";
    AlreadyBound = 0x0000_0005, "ESME_RALYBND";
    InvalidPriorityFlag = 0x0000_0006, "ESME_RINVPRTFLG";
    InvalidRegisteredDeliveryFlag = 0x0000_0007, "ESME_RINVREGDLVFLG";
    SystemError = 0x0000_0008, "ESME_RSYSERR";
    InvalidSourceAddress = 0x0000_000A, "ESME_RINVSRCADR";
    InvalidDestinationAddress = 0x0000_000B, "ESME_RINVDSTADR";
    InvalidMessageId = 0x0000_000C, "ESME_RINVMSGID";
    BindFailed = 0x0000_000D, "ESME_RBINDFAIL";
    InvalidPassword = 0x0000_000E, "ESME_RINVPASWD";
    InvalidSystemId = 0x0000_000F, "ESME_RINVSYSID";
    CancelSmFailed = 0x0000_0011, "ESME_RCANCELFAIL";
    ReplaceSmFailed = 0x0000_0013, "ESME_RREPLACEFAIL";
    MessageQueueFull = 0x0000_0014, "ESME_RMSGQFUL";
    InvalidServiceType = 0x0000_0015, "ESME_RINVSERTYP";
    InvalidNumberOfDestinations = 0x0000_0033, "ESME_RINVNUMDESTS";
    InvalidDistributionListName = 0x0000_0034, "ESME_RINVDLNAME";
    InvalidDestinationFlag = 0x0000_0040, "ESME_RINVDESTFLAG";
    /// submit_sm with replace_if_present_flag set was refused
    InvalidSubmitWithReplace = 0x0000_0042, "ESME_RINVSUBREP";
    InvalidEsmClass = 0x0000_0043, "ESME_RINVESMCLASS";
    CannotSubmitToDistributionList = 0x0000_0044, "ESME_RCNTSUBDL";
    SubmitFailed = 0x0000_0045, "ESME_RSUBMITFAIL";
    InvalidSourceTon = 0x0000_0048, "ESME_RINVSRCTON";
    InvalidSourceNpi = 0x0000_0049, "ESME_RINVSRCNPI";
    InvalidDestinationTon = 0x0000_0050, "ESME_RINVDSTTON";
    InvalidDestinationNpi = 0x0000_0051, "ESME_RINVDSTNPI";
    InvalidSystemType = 0x0000_0053, "ESME_RINVSYSTYP";
    InvalidReplaceIfPresentFlag = 0x0000_0054, "ESME_RINVREPFLAG";
    InvalidNumberOfMessages = 0x0000_0055, "ESME_RINVNUMMSGS";
    /// The ESME exceeded its allowed message rate
    Throttled = 0x0000_0058, "ESME_RTHROTTLED";
    InvalidScheduledDeliveryTime = 0x0000_0061, "ESME_RINVSCHED";
    InvalidExpiryTime = 0x0000_0062, "ESME_RINVEXPIRY";
    InvalidPredefinedMessageId = 0x0000_0063, "ESME_RINVDFTMSGID";
    ReceiverTemporaryAppError = 0x0000_0064, "ESME_RX_T_APPN";
    ReceiverPermanentAppError = 0x0000_0065, "ESME_RX_P_APPN";
    ReceiverRejectMessage = 0x0000_0066, "ESME_RX_R_APPN";
    QuerySmFailed = 0x0000_0067, "ESME_RQUERYFAIL";
    InvalidOptionalPart = 0x0000_00C0, "ESME_RINVOPTPARSTREAM";
    OptionalParameterNotAllowed = 0x0000_00C1, "ESME_ROPTPARNOTALLWD";
    InvalidParameterLength = 0x0000_00C2, "ESME_RINVPARLEN";
    MissingOptionalParameter = 0x0000_00C3, "ESME_RMISSINGOPTPARAM";
    InvalidOptionalParameterValue = 0x0000_00C4, "ESME_RINVOPTPARAMVAL";
    /// Used in data_sm_resp
    DeliveryFailure = 0x0000_00FE, "ESME_RDELIVERYFAILURE";
    UnknownError = 0x0000_00FF, "ESME_RUNKNOWNERR";
}

impl CommandStatus {
    pub fn is_ok(&self) -> bool {
        *self == CommandStatus::Ok
    }

    /// Raw wire value
    pub fn code(&self) -> u32 {
        u32::from(*self)
    }
}

// num_enum reads `#[default]` on a variant and rejects it next to `catch_all`
impl Default for CommandStatus {
    fn default() -> Self {
        CommandStatus::Ok
    }
}

impl fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name} ({:#010x})", self.code()),
            None => write!(f, "status {:#010x}", self.code()),
        }
    }
}
