//! Handlers for the `/students` resource.
//!
//! | Method   | Path             | Success                              |
//! |----------|------------------|--------------------------------------|
//! | `GET`    | `/students/`     | `200`, array of students             |
//! | `POST`   | `/students/`     | `201`, `{"result": "..."}`           |
//! | `GET`    | `/students/{id}` | `200`, one student                   |
//! | `PUT`    | `/students/{id}` | `200`, the submitted fields          |
//! | `DELETE` | `/students/{id}` | `200`, `{"result": "..."}`           |
//!
//! A missing id answers `404 {"message": "Student not found"}` on every `{id}` route.

use crate::{
    data::{
        DataType,
        student::{Student, StudentForm},
    },
    error::{
        InvalidFormBodySnafu, InvalidJsonBodySnafu, InvalidMultipartBodySnafu,
        InvalidStudentIdSnafu, MissingFieldSnafu, MissingStudentSnafu, MultipartSnafu,
        ParseAgeSnafu, StudentsError, StudentsResult,
    },
    state::StudentsState,
};
use axum::{
    Form, Json,
    extract::{FromRequest, Multipart, Path, Request, State, rejection::PathRejection},
    http::{StatusCode, header},
};
use serde::Serialize;
use snafu::{OptionExt, ResultExt, ensure};
use std::collections::HashMap;

#[derive(Serialize, Debug)]
pub struct ResultMessage {
    pub result: String,
}

/// A validated [`StudentForm`], read from a JSON, urlencoded or multipart body.
pub struct StudentPayload(pub StudentForm);

impl<S: Send + Sync> FromRequest<S> for StudentPayload {
    type Rejection = StudentsError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|content_type| content_type.to_str().ok())
            .unwrap_or_default();
        let is_form = content_type.starts_with("application/x-www-form-urlencoded");
        let is_multipart = content_type.starts_with("multipart/form-data");

        let form = if is_form {
            let Form(form) = Form::<StudentForm>::from_request(req, state)
                .await
                .context(InvalidFormBodySnafu)?;
            form
        } else if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .context(InvalidMultipartBodySnafu)?;
            form_from_multipart(multipart).await?
        } else {
            let Json(form) = Json::<StudentForm>::from_request(req, state)
                .await
                .context(InvalidJsonBodySnafu)?;
            form
        };

        form.validate()?;
        Ok(Self(form))
    }
}

async fn form_from_multipart(mut multipart: Multipart) -> StudentsResult<StudentForm> {
    let mut fields = HashMap::new();
    while let Some(field) = multipart.next_field().await.context(MultipartSnafu)? {
        let Some(name) = field.name().map(ToString::to_string) else {
            continue;
        };
        let value = field.text().await.context(MultipartSnafu)?;
        fields.insert(name, value);
    }

    let mut take =
        |field: &'static str| fields.remove(field).context(MissingFieldSnafu { field });

    let firstname = take("firstname")?;
    let lastname = take("lastname")?;
    let gender = take("gender")?;
    let age = take("age")?;
    let age = age.trim().parse().context(ParseAgeSnafu { original: age })?;

    Ok(StudentForm {
        firstname,
        lastname,
        gender,
        age,
    })
}

pub async fn get_students(State(state): State<StudentsState>) -> StudentsResult<Json<Vec<Student>>> {
    let students = Student::get_all(&mut *state.get_connection().await?).await?;
    debug!(count = students.len(), "Listed students");
    Ok(Json(students))
}

pub async fn post_student(
    State(state): State<StudentsState>,
    StudentPayload(form): StudentPayload,
) -> StudentsResult<(StatusCode, Json<ResultMessage>)> {
    let id = Student::insert_into_database(&form, &mut *state.get_connection().await?).await?;
    info!(id, "Created student");

    Ok((
        StatusCode::CREATED,
        Json(ResultMessage {
            result: format!("Student with id: {id} created successfully"),
        }),
    ))
}

pub async fn get_student(
    State(state): State<StudentsState>,
    id: Result<Path<i64>, PathRejection>,
) -> StudentsResult<Json<Student>> {
    let Path(id) = id.context(InvalidStudentIdSnafu)?;

    let student = Student::get_from_db_by_id(id, &mut *state.get_connection().await?)
        .await?
        .context(MissingStudentSnafu { id })?;
    debug!(id, "Fetched student");
    Ok(Json(student))
}

pub async fn put_student(
    State(state): State<StudentsState>,
    id: Result<Path<i64>, PathRejection>,
    payload: StudentsResult<StudentPayload>,
) -> StudentsResult<Json<StudentForm>> {
    let Path(id) = id.context(InvalidStudentIdSnafu)?;
    let StudentPayload(form) = payload?;

    let existed =
        Student::replace_in_database(id, &form, &mut *state.get_connection().await?).await?;
    ensure!(existed, MissingStudentSnafu { id });
    info!(id, "Updated student");

    Ok(Json(form))
}

pub async fn delete_student(
    State(state): State<StudentsState>,
    id: Result<Path<i64>, PathRejection>,
) -> StudentsResult<Json<ResultMessage>> {
    let Path(id) = id.context(InvalidStudentIdSnafu)?;

    let existed = Student::remove_from_database(id, &mut *state.get_connection().await?).await?;
    ensure!(existed, MissingStudentSnafu { id });
    info!(id, "Deleted student");

    Ok(Json(ResultMessage {
        result: format!("The student with id: {id} has been deleted"),
    }))
}
