//! In-memory repository for unit testing and local development.
//!
//! All entities live in `RwLock`-guarded maps; every operation takes the
//! lock once, so each call is atomic on its own, matching the
//! single-document atomicity the repository contract promises.

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::api::{
    Branch, BranchId, Employee, EmployeeId, FinalizedSchedule, RoleConfig, Shift, ShiftId,
};
use crate::db::repository::error::{ErrorContext, RepositoryError, RepositoryResult};
use crate::db::repository::{
    BranchRepository, EmployeeRepository, FinalizationRepository, FullRepository, HoursUpdate,
    ShiftFilter, ShiftPatch, ShiftRepository,
};
use crate::models::week;

#[derive(Default)]
struct Store {
    branches: HashMap<BranchId, Branch>,
    /// Branch creation order, oldest first.
    branch_order: Vec<BranchId>,
    employees: HashMap<EmployeeId, Employee>,
    shifts: HashMap<ShiftId, Shift>,
    finalized: HashMap<(EmployeeId, NaiveDate), FinalizedSchedule>,
}

/// In-memory implementation of the full repository.
#[derive(Default)]
pub struct LocalRepository {
    store: RwLock<Store>,
}

impl LocalRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BranchRepository for LocalRepository {
    async fn create_branch(&self, branch: &Branch) -> RepositoryResult<()> {
        if !branch.roles_are_unique() {
            return Err(RepositoryError::validation_with_context(
                "role names must be unique within a branch",
                ErrorContext::new("create_branch").with_entity_id(&branch.id),
            ));
        }
        let mut store = self.store.write();
        store.branches.insert(branch.id.clone(), branch.clone());
        store.branch_order.push(branch.id.clone());
        Ok(())
    }

    async fn list_branches(&self) -> RepositoryResult<Vec<Branch>> {
        let store = self.store.read();
        Ok(store
            .branch_order
            .iter()
            .rev()
            .filter_map(|id| store.branches.get(id).cloned())
            .collect())
    }

    async fn get_branch(&self, id: &BranchId) -> RepositoryResult<Branch> {
        self.store
            .read()
            .branches
            .get(id)
            .cloned()
            .ok_or_else(|| branch_not_found(id, "get_branch"))
    }

    async fn delete_branch(&self, id: &BranchId) -> RepositoryResult<()> {
        let mut store = self.store.write();
        if store.branches.remove(id).is_none() {
            return Err(branch_not_found(id, "delete_branch"));
        }
        store.branch_order.retain(|b| b != id);
        Ok(())
    }

    async fn update_branch_roles(
        &self,
        id: &BranchId,
        roles: &[RoleConfig],
    ) -> RepositoryResult<Branch> {
        let mut names: Vec<String> = roles.iter().map(|r| r.name.to_lowercase()).collect();
        names.sort();
        names.dedup();
        if names.len() != roles.len() {
            return Err(RepositoryError::validation_with_context(
                "role names must be unique within a branch",
                ErrorContext::new("update_branch_roles").with_entity_id(id),
            ));
        }

        let mut store = self.store.write();
        store
            .branches
            .get_mut(id)
            .ok_or_else(|| branch_not_found(id, "update_branch_roles"))?
            .roles = roles.to_vec();

        // Propagate the new rates to matching roles everywhere and to the
        // employees holding them (original-system semantics).
        for role_config in roles {
            for branch in store.branches.values_mut() {
                for role in branch
                    .roles
                    .iter_mut()
                    .filter(|r| r.name.eq_ignore_ascii_case(&role_config.name))
                {
                    role.hourly_rate = role_config.hourly_rate;
                }
            }
            for employee in store
                .employees
                .values_mut()
                .filter(|e| e.role.eq_ignore_ascii_case(&role_config.name))
            {
                employee.rate = role_config.hourly_rate;
            }
        }

        Ok(store.branches[id].clone())
    }

    async fn update_branch_settings(
        &self,
        id: &BranchId,
        max_hours_per_day: Option<u32>,
        regular_employees_max_hours_per_week: Option<u32>,
    ) -> RepositoryResult<Branch> {
        let mut store = self.store.write();
        let branch = store
            .branches
            .get_mut(id)
            .ok_or_else(|| branch_not_found(id, "update_branch_settings"))?;
        if let Some(hours) = max_hours_per_day {
            branch.max_hours_per_day = hours;
        }
        if let Some(hours) = regular_employees_max_hours_per_week {
            branch.regular_employees_max_hours_per_week = hours;
        }
        Ok(branch.clone())
    }
}

#[async_trait]
impl EmployeeRepository for LocalRepository {
    async fn add_employee(&self, employee: &Employee) -> RepositoryResult<()> {
        let mut store = self.store.write();
        if store
            .employees
            .values()
            .any(|e| e.email.eq_ignore_ascii_case(&employee.email))
        {
            return Err(RepositoryError::Duplicate {
                message: format!("email {} already registered", employee.email),
                context: ErrorContext::new("add_employee").with_entity("employee"),
            });
        }
        store.employees.insert(employee.id.clone(), employee.clone());
        Ok(())
    }

    async fn list_employees(&self, branch_id: &BranchId) -> RepositoryResult<Vec<Employee>> {
        Ok(self
            .store
            .read()
            .employees
            .values()
            .filter(|e| e.branch_id == *branch_id)
            .cloned()
            .collect())
    }

    async fn get_employee(&self, id: &EmployeeId) -> RepositoryResult<Employee> {
        self.store
            .read()
            .employees
            .get(id)
            .cloned()
            .ok_or_else(|| employee_not_found(id, "get_employee"))
    }

    async fn delete_employee(&self, id: &EmployeeId) -> RepositoryResult<()> {
        let mut store = self.store.write();
        store
            .employees
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| employee_not_found(id, "delete_employee"))
    }

    async fn count_employees_in_role(
        &self,
        branch_id: &BranchId,
        role: &str,
    ) -> RepositoryResult<usize> {
        Ok(self
            .store
            .read()
            .employees
            .values()
            .filter(|e| e.branch_id == *branch_id && e.role.eq_ignore_ascii_case(role))
            .count())
    }

    async fn bulk_update_hours(&self, updates: &[HoursUpdate]) -> RepositoryResult<Vec<Employee>> {
        let mut store = self.store.write();
        let mut updated = Vec::new();
        for update in updates {
            if let Some(employee) = store.employees.get_mut(&update.employee_id) {
                employee.hours_per_week = update.hours_per_week;
                updated.push(employee.clone());
            }
        }
        Ok(updated)
    }
}

#[async_trait]
impl ShiftRepository for LocalRepository {
    async fn create_shift(&self, shift: &Shift) -> RepositoryResult<()> {
        self.store
            .write()
            .shifts
            .insert(shift.id.clone(), shift.clone());
        Ok(())
    }

    async fn list_shifts(&self, filter: &ShiftFilter) -> RepositoryResult<Vec<Shift>> {
        let mut shifts: Vec<Shift> = self
            .store
            .read()
            .shifts
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        shifts.sort_by(|a, b| (a.date, a.start_time).cmp(&(b.date, b.start_time)));
        Ok(shifts)
    }

    async fn get_shift(&self, id: &ShiftId) -> RepositoryResult<Shift> {
        self.store
            .read()
            .shifts
            .get(id)
            .cloned()
            .ok_or_else(|| shift_not_found(id, "get_shift"))
    }

    async fn delete_shift(&self, id: &ShiftId) -> RepositoryResult<bool> {
        Ok(self.store.write().shifts.remove(id).is_some())
    }

    async fn update_shift(&self, id: &ShiftId, patch: &ShiftPatch) -> RepositoryResult<Shift> {
        let mut store = self.store.write();

        let new_branch = match &patch.branch_id {
            Some(branch_id) => Some(
                store
                    .branches
                    .get(branch_id)
                    .cloned()
                    .ok_or_else(|| branch_not_found(branch_id, "update_shift"))?,
            ),
            None => None,
        };

        let shift = store
            .shifts
            .get_mut(id)
            .ok_or_else(|| shift_not_found(id, "update_shift"))?;

        if let Some(start) = patch.start_time {
            shift.start_time = start;
        }
        if let Some(end) = patch.end_time {
            shift.end_time = end;
        }
        if let Some(ref role) = patch.role {
            shift.role = role.clone();
        }
        if let Some(branch) = new_branch {
            shift.branch_id = branch.id.clone();
            shift.branch_name = branch.name.clone();
            shift.branch_location = branch.location.clone();
        }
        shift.refresh_duration();
        Ok(shift.clone())
    }

    async fn replace_shift(&self, shift: &Shift) -> RepositoryResult<()> {
        let mut store = self.store.write();
        if !store.shifts.contains_key(&shift.id) {
            return Err(shift_not_found(&shift.id, "replace_shift"));
        }
        store.shifts.insert(shift.id.clone(), shift.clone());
        Ok(())
    }
}

#[async_trait]
impl FinalizationRepository for LocalRepository {
    async fn upsert_finalized(
        &self,
        employee_id: &EmployeeId,
        week_start: NaiveDate,
    ) -> RepositoryResult<FinalizedSchedule> {
        let record = FinalizedSchedule {
            employee_id: employee_id.clone(),
            week_start,
            finalized: true,
        };
        self.store
            .write()
            .finalized
            .insert((employee_id.clone(), week_start), record.clone());
        Ok(record)
    }

    async fn delete_finalized(
        &self,
        employee_id: &EmployeeId,
        week_start: NaiveDate,
    ) -> RepositoryResult<usize> {
        let mut store = self.store.write();
        let mut removed = 0;
        // Clear records keyed by any day of the Sunday week, so drifted
        // week_start values cannot strand a finalized lock.
        for day in week::week_dates(week_start) {
            if store.finalized.remove(&(employee_id.clone(), day)).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn list_finalized(
        &self,
        week_start: NaiveDate,
    ) -> RepositoryResult<Vec<FinalizedSchedule>> {
        Ok(self
            .store
            .read()
            .finalized
            .values()
            .filter(|f| f.finalized && week::in_week(f.week_start, week_start))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl FullRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(true)
    }
}

fn branch_not_found(id: &BranchId, operation: &str) -> RepositoryError {
    RepositoryError::not_found_with_context(
        format!("branch {} not found", id),
        ErrorContext::new(operation).with_entity("branch").with_entity_id(id),
    )
}

fn employee_not_found(id: &EmployeeId, operation: &str) -> RepositoryError {
    RepositoryError::not_found_with_context(
        format!("employee {} not found", id),
        ErrorContext::new(operation)
            .with_entity("employee")
            .with_entity_id(id),
    )
}

fn shift_not_found(id: &ShiftId, operation: &str) -> RepositoryError {
    RepositoryError::not_found_with_context(
        format!("shift {} not found", id),
        ErrorContext::new(operation).with_entity("shift").with_entity_id(id),
    )
}
