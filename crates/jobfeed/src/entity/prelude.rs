//! Common re-exports for convenient entity usage.

pub use super::feed_cursor::{
    ActiveModel as FeedCursorActiveModel, Column as FeedCursorColumn, Entity as FeedCursor,
    Model as FeedCursorModel,
};
pub use super::job::{
    ActiveModel as JobActiveModel, Column as JobColumn, Entity as Job, Model as JobModel,
};
pub use super::job_category::{
    ActiveModel as JobCategoryActiveModel, Column as JobCategoryColumn, Entity as JobCategory,
    Model as JobCategoryModel,
};
pub use super::job_contact::{
    ActiveModel as JobContactActiveModel, Column as JobContactColumn, Entity as JobContact,
    Model as JobContactModel,
};
pub use super::job_location::{
    ActiveModel as JobLocationActiveModel, Column as JobLocationColumn, Entity as JobLocation,
    Model as JobLocationModel,
};
pub use super::job_occupation::{
    ActiveModel as JobOccupationActiveModel, Column as JobOccupationColumn,
    Entity as JobOccupation, Model as JobOccupationModel,
};
pub use super::system_parameter::{
    ActiveModel as SystemParameterActiveModel, Column as SystemParameterColumn,
    Entity as SystemParameter, Model as SystemParameterModel,
};
