//! Guest-task lookup: `PA_bsc_Tarea_Invitado(pUserName varchar(30), pTarea smallint)`.

use crate::response::ResponseEnvelope;
use crate::service::{ProcedureExecutor, RowExt};
use crate::sql::{ProcedureParam, SqlType};
use serde::Serialize;
use sqlx::postgres::PgRow;
use std::sync::Arc;

pub const GUEST_TASK_PROCEDURE: &str = "PA_bsc_Tarea_Invitado";
pub const USER_NAME_MAX_LEN: usize = 30;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserModel {
    pub tarea_user_name: Option<i32>,
    pub email: Option<String>,
    pub user_name: Option<String>,
}

impl UserModel {
    /// First two columns by name, the user name by position.
    pub fn map_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(UserModel {
            tarea_user_name: row.value_or_default("Tarea_UserName")?,
            email: row.value_or_default("EMail")?,
            user_name: row.value_at_or_default(2)?,
        })
    }
}

#[derive(Clone)]
pub struct ExampleService {
    executor: Arc<ProcedureExecutor>,
}

impl ExampleService {
    pub fn new(executor: Arc<ProcedureExecutor>) -> Self {
        ExampleService { executor }
    }

    pub async fn guest_tasks(&self, user: &str, task: i16) -> ResponseEnvelope<Vec<UserModel>> {
        let params = [
            ProcedureParam::input("@pUserName", SqlType::VarChar(Some(USER_NAME_MAX_LEN as u32)), user),
            ProcedureParam::input("@pTarea", SqlType::SmallInt, task),
        ];
        self.executor
            .execute(GUEST_TASK_PROCEDURE, UserModel::map_row, &params)
            .await
    }
}
