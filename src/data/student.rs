use crate::{
    data::DataType,
    error::{EmptyFieldSnafu, MakeQuerySnafu, StudentsResult},
};
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, ensure};
use sqlx::SqliteConnection;

#[derive(Serialize, Deserialize, sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub id: i64,
    pub firstname: String,
    pub lastname: String,
    pub gender: String,
    pub age: i64,
}

/// Every mutable field of a [`Student`], as submitted on create and update.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StudentForm {
    pub firstname: String,
    pub lastname: String,
    pub gender: String,
    pub age: i64,
}

impl StudentForm {
    pub fn validate(&self) -> StudentsResult<()> {
        ensure!(
            !self.firstname.trim().is_empty(),
            EmptyFieldSnafu { field: "firstname" }
        );
        ensure!(
            !self.lastname.trim().is_empty(),
            EmptyFieldSnafu { field: "lastname" }
        );
        Ok(())
    }
}

impl DataType for Student {
    type Id = i64;
    type FormForAdding = StudentForm;

    async fn get_from_db_by_id(id: Self::Id, conn: &mut SqliteConnection) -> StudentsResult<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT id, firstname, lastname, gender, age FROM students WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(conn)
        .await
        .context(MakeQuerySnafu)
    }

    async fn get_all(conn: &mut SqliteConnection) -> StudentsResult<Vec<Self>> {
        sqlx::query_as::<_, Self>("SELECT id, firstname, lastname, gender, age FROM students")
            .fetch_all(conn)
            .await
            .context(MakeQuerySnafu)
    }

    async fn insert_into_database(
        to_be_added: &Self::FormForAdding,
        conn: &mut SqliteConnection,
    ) -> StudentsResult<Self::Id> {
        let StudentForm {
            firstname,
            lastname,
            gender,
            age,
        } = to_be_added;

        sqlx::query_scalar(
            "INSERT INTO students (firstname, lastname, gender, age) VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(firstname)
        .bind(lastname)
        .bind(gender)
        .bind(age)
        .fetch_one(conn)
        .await
        .context(MakeQuerySnafu)
    }

    async fn replace_in_database(
        id: Self::Id,
        replacement: &Self::FormForAdding,
        conn: &mut SqliteConnection,
    ) -> StudentsResult<bool> {
        let StudentForm {
            firstname,
            lastname,
            gender,
            age,
        } = replacement;

        let result = sqlx::query(
            "UPDATE students SET firstname = ?, lastname = ?, gender = ?, age = ? WHERE id = ?",
        )
        .bind(firstname)
        .bind(lastname)
        .bind(gender)
        .bind(age)
        .bind(id)
        .execute(conn)
        .await
        .context(MakeQuerySnafu)?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove_from_database(id: Self::Id, conn: &mut SqliteConnection) -> StudentsResult<bool> {
        let result = sqlx::query("DELETE FROM students WHERE id = ?")
            .bind(id)
            .execute(conn)
            .await
            .context(MakeQuerySnafu)?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::StudentsError, state::test_support::fresh_state};

    fn ada() -> StudentForm {
        StudentForm {
            firstname: "Ada".to_string(),
            lastname: "Lovelace".to_string(),
            gender: "F".to_string(),
            age: 36,
        }
    }

    #[test]
    fn blank_names_are_rejected() {
        let mut form = ada();
        form.lastname = "   ".to_string();
        assert!(matches!(
            form.validate(),
            Err(StudentsError::EmptyField { field: "lastname" })
        ));

        form.firstname = String::new();
        assert!(matches!(
            form.validate(),
            Err(StudentsError::EmptyField { field: "firstname" })
        ));

        assert!(ada().validate().is_ok());
    }

    #[tokio::test]
    async fn inserted_student_reads_back() {
        let (state, _dir) = fresh_state().await;
        let mut conn = state.get_connection().await.unwrap();

        let id = Student::insert_into_database(&ada(), &mut conn).await.unwrap();
        let student = Student::get_from_db_by_id(id, &mut conn).await.unwrap();

        assert_eq!(
            student,
            Some(Student {
                id,
                firstname: "Ada".to_string(),
                lastname: "Lovelace".to_string(),
                gender: "F".to_string(),
                age: 36,
            })
        );
    }

    #[tokio::test]
    async fn ids_are_assigned_by_the_store() {
        let (state, _dir) = fresh_state().await;
        let mut conn = state.get_connection().await.unwrap();

        let first = Student::insert_into_database(&ada(), &mut conn).await.unwrap();
        let second = Student::insert_into_database(&ada(), &mut conn).await.unwrap();
        assert_ne!(first, second);

        let all = Student::get_all(&mut conn).await.unwrap();
        let ids: Vec<i64> = all.iter().map(|student| student.id).collect();
        assert_eq!(all.len(), 2);
        assert!(ids.contains(&first) && ids.contains(&second));
    }

    #[tokio::test]
    async fn replace_and_remove_report_missing_rows() {
        let (state, _dir) = fresh_state().await;
        let mut conn = state.get_connection().await.unwrap();

        assert!(!Student::replace_in_database(42, &ada(), &mut conn).await.unwrap());
        assert!(!Student::remove_from_database(42, &mut conn).await.unwrap());

        let id = Student::insert_into_database(&ada(), &mut conn).await.unwrap();
        let mut older = ada();
        older.age = 37;
        assert!(Student::replace_in_database(id, &older, &mut conn).await.unwrap());
        assert_eq!(
            Student::get_from_db_by_id(id, &mut conn).await.unwrap().map(|s| s.age),
            Some(37)
        );

        assert!(Student::remove_from_database(id, &mut conn).await.unwrap());
        assert_eq!(Student::get_from_db_by_id(id, &mut conn).await.unwrap(), None);
    }
}
