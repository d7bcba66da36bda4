pub mod app_user;
pub mod request;
pub mod response;
pub mod session;

pub use app_user::{AppUser, ChatUser};
pub use request::RequestRecord;
pub use response::{ResponseRecord, ScheduleEntry};
pub use session::{FormAnswers, FormSession, FormState, Question};
