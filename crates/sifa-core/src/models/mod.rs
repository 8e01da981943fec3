pub mod field;
pub mod profile;
pub mod schedule;
pub mod suggestion;

pub use field::{Choice, Field, FieldId, Input, SelectOption, TextValue, ids};
pub use profile::FormProfile;
pub use schedule::ScheduleEntry;
pub use suggestion::{
    LOCAL_SOURCE, ProductDetails, Provider, Suggestion, UNKNOWN_SOURCE, parse_results,
};
