mod command_id;
mod command_status;
mod data_coding;
mod field;
mod interface_version;
mod numeric_plan_indicator;
mod tlv;
mod type_of_number;

pub use command_id::CommandId;
pub use command_status::CommandStatus;
pub use data_coding::DataCoding;
pub use field::{Field, FieldKind, FieldMap, FieldName, MAX_SHORT_MESSAGE, Text};
pub use interface_version::InterfaceVersion;
pub use numeric_plan_indicator::NumericPlanIndicator;
pub use tlv::{Tlv, TlvMap, TlvTag};
pub use type_of_number::TypeOfNumber;
