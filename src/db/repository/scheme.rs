use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::Scheme;

struct SchemeRow {
    scheme_name: String,
    description: String,
    ministry: Option<String>,
    benefits: Option<String>,
}

pub fn list_schemes(conn: &Connection) -> Result<Vec<Scheme>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT scheme_name, description, ministry, benefits FROM schemes ORDER BY scheme_name",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(SchemeRow {
            scheme_name: row.get(0)?,
            description: row.get(1)?,
            ministry: row.get(2)?,
            benefits: row.get(3)?,
        })
    })?;

    let mut schemes = Vec::new();
    for row in rows {
        schemes.push(scheme_from_row(row?)?);
    }
    Ok(schemes)
}

pub fn get_scheme(conn: &Connection, name: &str) -> Result<Option<Scheme>, DatabaseError> {
    let result = conn.query_row(
        "SELECT scheme_name, description, ministry, benefits FROM schemes WHERE scheme_name = ?1",
        params![name],
        |row| {
            Ok(SchemeRow {
                scheme_name: row.get(0)?,
                description: row.get(1)?,
                ministry: row.get(2)?,
                benefits: row.get(3)?,
            })
        },
    );

    match result {
        Ok(row) => Ok(Some(scheme_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Insert a new scheme. Fails with `ConstraintViolation` if the name is taken.
pub fn insert_scheme(conn: &Connection, scheme: &Scheme) -> Result<(), DatabaseError> {
    if get_scheme(conn, &scheme.scheme_name)?.is_some() {
        return Err(DatabaseError::ConstraintViolation(format!(
            "Scheme with name '{}' already exists",
            scheme.scheme_name
        )));
    }

    conn.execute(
        "INSERT INTO schemes (scheme_name, description, ministry, benefits)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            scheme.scheme_name,
            scheme.description,
            scheme.ministry,
            encode_benefits(scheme)?,
        ],
    )?;
    Ok(())
}

/// Replace the scheme stored under `name`. The body may rename it.
pub fn update_scheme(conn: &Connection, name: &str, scheme: &Scheme) -> Result<(), DatabaseError> {
    let result = conn.execute(
        "UPDATE schemes SET scheme_name = ?2, description = ?3, ministry = ?4, benefits = ?5
         WHERE scheme_name = ?1",
        params![
            name,
            scheme.scheme_name,
            scheme.description,
            scheme.ministry,
            encode_benefits(scheme)?,
        ],
    );

    match result {
        Ok(0) => Err(DatabaseError::NotFound {
            entity_type: "Scheme".into(),
            id: name.to_string(),
        }),
        Ok(_) => Ok(()),
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Err(DatabaseError::ConstraintViolation(format!(
                "Scheme with name '{}' already exists",
                scheme.scheme_name
            )))
        }
        Err(e) => Err(e.into()),
    }
}

pub fn delete_scheme(conn: &Connection, name: &str) -> Result<(), DatabaseError> {
    let rows = conn.execute("DELETE FROM schemes WHERE scheme_name = ?1", params![name])?;
    if rows == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Scheme".into(),
            id: name.to_string(),
        });
    }
    Ok(())
}

fn encode_benefits(scheme: &Scheme) -> Result<Option<String>, DatabaseError> {
    scheme
        .benefits
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(DatabaseError::from)
}

fn scheme_from_row(row: SchemeRow) -> Result<Scheme, DatabaseError> {
    let benefits = row
        .benefits
        .as_deref()
        .map(serde_json::from_str::<Vec<String>>)
        .transpose()?;

    Ok(Scheme {
        scheme_name: row.scheme_name,
        description: row.description,
        ministry: row.ministry,
        benefits,
    })
}
