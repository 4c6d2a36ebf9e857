#![forbid(unsafe_code)]
//! TutorSwap domain records, shared by the routing, data, and shell crates.
//!
//! ```compile_fail
//! use tutorswap_model::AppointmentKind;
//!
//! fn exhaustive_match(k: AppointmentKind) -> &'static str {
//!     match k {
//!         AppointmentKind::Online => "online",
//!         AppointmentKind::InPerson => "in-person",
//!     }
//! }
//! ```

mod drafts;
mod ident;
mod page;
mod record;

pub use drafts::{AppointmentDraft, Credentials, OutgoingMessage, SignupForm};
pub use ident::{RecordId, Revision, ValidationError, RECORD_ID_MAX_LEN};
pub use page::{PageLinks, Paginated, USERS_PAGE_SIZE};
pub use record::{group_conversations, Appointment, AppointmentKind, Conversations, Message, User};

pub const CRATE_NAME: &str = "tutorswap-model";
