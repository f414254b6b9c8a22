pub mod contact;
pub mod invoice;
pub mod project;
pub mod task;
pub mod timeslip;
pub mod user;

pub use contact::Contact;
pub use invoice::{Invoice, InvoiceItem};
pub use project::Project;
pub use task::Task;
pub use timeslip::Timeslip;
pub use user::User;
