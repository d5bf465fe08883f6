use async_trait::async_trait;
use tracing::{info, instrument, warn};

use crate::{Employee, EmployeeRepository, HrError, HrResult, NewEmployee};

/// Employee operations exposed to the HTTP boundary.
#[async_trait]
pub trait EmployeeService: Send + Sync {
    /// Persists a new employee unless one with the same email exists.
    async fn create(&self, employee: NewEmployee) -> HrResult<Employee>;
    async fn list(&self) -> HrResult<Vec<Employee>>;
    async fn find_by_id(&self, id: i64) -> HrResult<Option<Employee>>;
    /// Persists an already merged employee. The email is not re-checked.
    async fn update(&self, employee: Employee) -> HrResult<Employee>;
    async fn delete(&self, id: i64) -> HrResult<()>;
}

/// Stateless service over an injected repository.
pub struct HrEmployeeService<R> {
    repository: R,
}

impl<R: EmployeeRepository> HrEmployeeService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<R: EmployeeRepository> EmployeeService for HrEmployeeService<R> {
    #[instrument(name = "employees.create", skip_all, fields(email = %employee.email))]
    async fn create(&self, employee: NewEmployee) -> HrResult<Employee> {
        // Check-then-insert; concurrent creates with one email can both pass.
        if self
            .repository
            .find_by_email(&employee.email)
            .await?
            .is_some()
        {
            warn!("employee email already taken");
            return Err(HrError::AlreadyExists {
                email: employee.email,
            });
        }
        let saved = self.repository.insert(&employee).await?;
        info!(id = saved.id, "employee created");
        Ok(saved)
    }

    #[instrument(name = "employees.list", skip_all)]
    async fn list(&self) -> HrResult<Vec<Employee>> {
        Ok(self.repository.find_all().await?)
    }

    #[instrument(name = "employees.find_by_id", skip(self))]
    async fn find_by_id(&self, id: i64) -> HrResult<Option<Employee>> {
        Ok(self.repository.find_by_id(id).await?)
    }

    #[instrument(name = "employees.update", skip_all, fields(id = employee.id))]
    async fn update(&self, employee: Employee) -> HrResult<Employee> {
        Ok(self.repository.update(&employee).await?)
    }

    #[instrument(name = "employees.delete", skip(self))]
    async fn delete(&self, id: i64) -> HrResult<()> {
        self.repository.delete_by_id(id).await?;
        info!("employee deleted");
        Ok(())
    }
}
