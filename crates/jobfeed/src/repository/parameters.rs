use chrono::Utc;
use sea_orm::{DatabaseConnection, EntityTrait, Set, sea_query::OnConflict};

use crate::entity::system_parameter::{self, Column, Entity as SystemParameter};

use super::errors::Result;

/// Insert or overwrite a system parameter.
pub async fn set_parameter(db: &DatabaseConnection, key: &str, value: &str) -> Result<()> {
    let model = system_parameter::ActiveModel {
        key: Set(key.to_string()),
        value: Set(value.to_string()),
        updated_at: Set(Utc::now().fixed_offset()),
    };

    SystemParameter::insert(model)
        .on_conflict(
            OnConflict::column(Column::Key)
                .update_columns([Column::Value, Column::UpdatedAt])
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    Ok(())
}

/// Read a system parameter's value.
pub async fn get_parameter(db: &DatabaseConnection, key: &str) -> Result<Option<String>> {
    Ok(SystemParameter::find_by_id(key.to_string())
        .one(db)
        .await?
        .map(|p| p.value))
}
