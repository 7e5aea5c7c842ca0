use locations::database::DatabaseError;

pub mod location;

pub(crate) fn convert_error(why: sqlx::Error) -> DatabaseError {
    match why {
        sqlx::Error::RowNotFound => DatabaseError::NotFound,
        sqlx::Error::Database(ref db_error) if db_error.is_unique_violation() => {
            DatabaseError::UniqueViolation(constraint_name(db_error.constraint()))
        }
        sqlx::Error::Database(ref db_error)
            if db_error.is_foreign_key_violation() =>
        {
            DatabaseError::ForeignKeyViolation(constraint_name(db_error.constraint()))
        }
        _ => DatabaseError::Other(Box::new(why)),
    }
}

fn constraint_name(constraint: Option<&str>) -> String {
    constraint.unwrap_or("unknown").to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_rows_are_not_found() {
        assert!(matches!(
            convert_error(sqlx::Error::RowNotFound),
            DatabaseError::NotFound
        ));
    }

    #[test]
    fn unrelated_errors_are_passed_through() {
        match convert_error(sqlx::Error::PoolTimedOut) {
            DatabaseError::Other(why) => {
                assert_eq!(why.to_string(), sqlx::Error::PoolTimedOut.to_string())
            }
            why => panic!("unexpected error: {why}"),
        }
    }

    #[test]
    fn unknown_constraints_get_a_placeholder_name() {
        assert_eq!(constraint_name(None), "unknown");
        assert_eq!(
            constraint_name(Some("locations_location_number_key")),
            "locations_location_number_key"
        );
    }
}
