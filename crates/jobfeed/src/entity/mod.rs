//! SeaORM entity definitions for the jobfeed database schema.

pub mod feed_cursor;
pub mod job;
pub mod job_category;
pub mod job_contact;
pub mod job_location;
pub mod job_occupation;
pub mod prelude;
pub mod system_parameter;
