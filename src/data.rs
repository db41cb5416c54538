use crate::error::StudentsResult;
use sqlx::SqliteConnection;

pub mod student;

pub trait DataType: Sized {
    type Id;
    type FormForAdding;

    async fn get_from_db_by_id(id: Self::Id, conn: &mut SqliteConnection) -> StudentsResult<Option<Self>>;
    async fn get_all(conn: &mut SqliteConnection) -> StudentsResult<Vec<Self>>;
    async fn insert_into_database(to_be_added: &Self::FormForAdding, conn: &mut SqliteConnection) -> StudentsResult<Self::Id>;
    /// Returns whether a row with that id existed.
    async fn replace_in_database(id: Self::Id, replacement: &Self::FormForAdding, conn: &mut SqliteConnection) -> StudentsResult<bool>;
    /// Returns whether a row with that id existed.
    async fn remove_from_database(id: Self::Id, conn: &mut SqliteConnection) -> StudentsResult<bool>;
}
