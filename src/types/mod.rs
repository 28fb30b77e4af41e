mod entry;
mod user;

pub use entry::{Entry, EntryFilter, EntryInput, EntryKind};
pub use user::User;
