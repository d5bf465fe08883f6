use std::sync::Arc;

use async_trait::async_trait;
use entity::employees;
use sea_orm::{
    ActiveModelTrait,
    ActiveValue::{NotSet, Set, Unchanged},
    ColumnTrait, ConnectionTrait, DatabaseBackend, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Statement, Value,
};

use crate::{Employee, NewEmployee, RepositoryError};

const FIND_BY_NAME_PG: &str = "SELECT id, first_name, last_name, email FROM employees \
     WHERE first_name = $1 AND last_name = $2 ORDER BY id LIMIT 1";
const FIND_BY_NAME_SQLITE: &str = "SELECT id, first_name, last_name, email FROM employees \
     WHERE first_name = ? AND last_name = ? ORDER BY id LIMIT 1";

/// Persistence collaborator for employee records.
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    /// Persists a new row; the store assigns the id.
    async fn insert(&self, employee: &NewEmployee) -> Result<Employee, RepositoryError>;
    /// Rewrites the row with `employee.id`.
    async fn update(&self, employee: &Employee) -> Result<Employee, RepositoryError>;
    /// All rows in insertion order.
    async fn find_all(&self) -> Result<Vec<Employee>, RepositoryError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Employee>, RepositoryError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Employee>, RepositoryError>;
    /// Deleting a missing id is a no-op.
    async fn delete_by_id(&self, id: i64) -> Result<(), RepositoryError>;
    async fn find_by_name(
        &self,
        first_name: &str,
        last_name: &str,
    ) -> Result<Option<Employee>, RepositoryError>;
    /// Same lookup as [`find_by_name`](Self::find_by_name), issued as raw SQL.
    async fn find_by_name_native(
        &self,
        first_name: &str,
        last_name: &str,
    ) -> Result<Option<Employee>, RepositoryError>;
}

#[derive(Clone)]
pub struct SeaOrmEmployeeRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmEmployeeRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EmployeeRepository for SeaOrmEmployeeRepository {
    async fn insert(&self, employee: &NewEmployee) -> Result<Employee, RepositoryError> {
        let model = employees::ActiveModel {
            id: NotSet,
            first_name: Set(employee.first_name.clone()),
            last_name: Set(employee.last_name.clone()),
            email: Set(employee.email.clone()),
        }
        .insert(self.db.as_ref())
        .await?;
        Ok(model.into())
    }

    async fn update(&self, employee: &Employee) -> Result<Employee, RepositoryError> {
        let result = employees::ActiveModel {
            id: Unchanged(employee.id),
            first_name: Set(employee.first_name.clone()),
            last_name: Set(employee.last_name.clone()),
            email: Set(employee.email.clone()),
        }
        .update(self.db.as_ref())
        .await;
        match result {
            Ok(model) => Ok(model.into()),
            Err(DbErr::RecordNotUpdated) => Err(RepositoryError::NotFound(employee.id)),
            Err(err) => Err(err.into()),
        }
    }

    async fn find_all(&self) -> Result<Vec<Employee>, RepositoryError> {
        let rows = employees::Entity::find()
            .order_by_asc(employees::Column::Id)
            .all(self.db.as_ref())
            .await?;
        Ok(rows.into_iter().map(Employee::from).collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Employee>, RepositoryError> {
        let model = employees::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;
        Ok(model.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Employee>, RepositoryError> {
        let model = employees::Entity::find()
            .filter(employees::Column::Email.eq(email))
            .order_by_asc(employees::Column::Id)
            .one(self.db.as_ref())
            .await?;
        Ok(model.map(Into::into))
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), RepositoryError> {
        employees::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await?;
        Ok(())
    }

    async fn find_by_name(
        &self,
        first_name: &str,
        last_name: &str,
    ) -> Result<Option<Employee>, RepositoryError> {
        let model = employees::Entity::find()
            .filter(employees::Column::FirstName.eq(first_name))
            .filter(employees::Column::LastName.eq(last_name))
            .order_by_asc(employees::Column::Id)
            .one(self.db.as_ref())
            .await?;
        Ok(model.map(Into::into))
    }

    async fn find_by_name_native(
        &self,
        first_name: &str,
        last_name: &str,
    ) -> Result<Option<Employee>, RepositoryError> {
        let backend = self.db.get_database_backend();
        let sql = match backend {
            DatabaseBackend::Postgres => FIND_BY_NAME_PG,
            _ => FIND_BY_NAME_SQLITE,
        };
        let model = employees::Entity::find()
            .from_raw_sql(Statement::from_sql_and_values(
                backend,
                sql,
                [Value::from(first_name), Value::from(last_name)],
            ))
            .one(self.db.as_ref())
            .await?;
        Ok(model.map(Into::into))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    async fn repository() -> SeaOrmEmployeeRepository {
        let conn = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&conn, None).await.unwrap();
        SeaOrmEmployeeRepository::new(Arc::new(conn))
    }

    fn henry() -> NewEmployee {
        NewEmployee::new("Henry", "x", "test@gmail.com")
    }

    #[tokio::test]
    async fn insert_assigns_an_id() {
        let repo = repository().await;
        let saved = repo.insert(&henry()).await.unwrap();
        assert!(saved.id > 0);
        assert_eq!(saved.first_name, "Henry");
        assert_eq!(saved.email, "test@gmail.com");
    }

    #[tokio::test]
    async fn find_all_keeps_insertion_order() {
        let repo = repository().await;
        assert!(repo.find_all().await.unwrap().is_empty());

        let first = repo.insert(&henry()).await.unwrap();
        // The table itself accepts duplicate emails.
        let second = repo.insert(&henry()).await.unwrap();

        let all = repo.find_all().await.unwrap();
        assert_eq!(all, vec![first, second]);
    }

    #[tokio::test]
    async fn lookups_by_id_and_email() {
        let repo = repository().await;
        let saved = repo.insert(&henry()).await.unwrap();

        assert_eq!(repo.find_by_id(saved.id).await.unwrap(), Some(saved.clone()));
        assert_eq!(
            repo.find_by_email("test@gmail.com").await.unwrap(),
            Some(saved.clone())
        );
        assert_eq!(repo.find_by_id(saved.id + 100).await.unwrap(), None);
        assert_eq!(repo.find_by_email("nobody@gmail.com").await.unwrap(), None);
    }

    #[tokio::test]
    async fn update_rewrites_fields() {
        let repo = repository().await;
        let mut saved = repo.insert(&henry()).await.unwrap();
        saved.email = "henry@gmail.com".into();
        saved.first_name = "henry2".into();

        let updated = repo.update(&saved).await.unwrap();
        assert_eq!(updated, saved);
        assert_eq!(repo.find_by_id(saved.id).await.unwrap(), Some(saved));
    }

    #[tokio::test]
    async fn update_of_missing_row_is_not_found() {
        let repo = repository().await;
        let ghost = Employee {
            id: 42,
            first_name: "No".into(),
            last_name: "One".into(),
            email: "ghost@gmail.com".into(),
        };
        let err = repo.update(&ghost).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(42)));
    }

    #[tokio::test]
    async fn delete_removes_row_and_tolerates_missing_ids() {
        let repo = repository().await;
        let saved = repo.insert(&henry()).await.unwrap();

        repo.delete_by_id(saved.id).await.unwrap();
        assert_eq!(repo.find_by_id(saved.id).await.unwrap(), None);

        repo.delete_by_id(saved.id).await.unwrap();
        repo.delete_by_id(9_999).await.unwrap();
    }

    #[tokio::test]
    async fn name_lookups_agree() {
        let repo = repository().await;
        let saved = repo.insert(&henry()).await.unwrap();
        repo.insert(&NewEmployee::new("Ada", "Lovelace", "ada@gmail.com"))
            .await
            .unwrap();

        let built = repo.find_by_name("Henry", "x").await.unwrap();
        let native = repo.find_by_name_native("Henry", "x").await.unwrap();
        assert_eq!(built, Some(saved.clone()));
        assert_eq!(native, Some(saved));

        assert_eq!(repo.find_by_name("Henry", "y").await.unwrap(), None);
        assert_eq!(repo.find_by_name_native("Henry", "y").await.unwrap(), None);
    }
}
