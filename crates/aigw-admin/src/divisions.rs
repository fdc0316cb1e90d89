//! Division registry: creating and relabelling divisions under an
//! organization.

use aigw_auth::{AuthConfig, Permissions};
use aigw_core::error::{GatewayError, GatewayResult};
use aigw_core::models::scope::{CreateScopeLabel, ScopeInfo, ScopeLabel, ScopeType};
use aigw_core::models::user::User;
use aigw_core::repository::ScopeLabelRepository;
use tracing::info;

pub struct DivisionService<L> {
    labels: L,
    auth: AuthConfig,
}

impl<L: ScopeLabelRepository> DivisionService<L> {
    pub fn new(labels: L, auth: AuthConfig) -> Self {
        Self { labels, auth }
    }

    /// Divisions registered under `organization`.
    pub async fn list(&self, organization: &ScopeInfo) -> GatewayResult<Vec<ScopeLabel>> {
        Ok(self
            .labels
            .list()
            .await?
            .into_iter()
            .filter(|l| l.scope.scope_type == ScopeType::Division)
            .filter(|l| l.parent.as_ref() == Some(organization))
            .collect())
    }

    pub async fn create(
        &self,
        actor: &User,
        organization: &ScopeInfo,
        division_id: &str,
        label: &str,
    ) -> GatewayResult<ScopeLabel> {
        if organization.scope_type != ScopeType::Organization {
            return Err(GatewayError::InvalidScope(format!(
                "divisions belong to an organization, not {organization}"
            )));
        }
        let permissions = Permissions::new(Some(actor), &self.auth);
        permissions.require(
            permissions.can_create_division_in(organization),
            &format!("create division in {organization}"),
        )?;
        if self.auth.is_new_division_id(division_id.trim()) {
            return Err(GatewayError::Validation {
                message: format!("'{division_id}' is not a usable division id"),
            });
        }
        let label = require_label(label)?;

        let division = ScopeInfo::division(division_id.trim());
        match self.labels.get(&division).await {
            Ok(_) => {
                return Err(GatewayError::AlreadyExists {
                    entity: format!("division {}", division.scope_id),
                });
            }
            Err(GatewayError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        let created = self
            .labels
            .upsert(CreateScopeLabel {
                scope: division,
                label,
                parent: Some(organization.clone()),
            })
            .await?;
        info!(actor = %actor.id, division = %created.scope, organization = %organization, "Division created");
        Ok(created)
    }

    /// Relabels a division. Allowed to admins of the division and of its
    /// parent organization.
    pub async fn rename(
        &self,
        actor: &User,
        division: &ScopeInfo,
        label: &str,
    ) -> GatewayResult<ScopeLabel> {
        let label = require_label(label)?;
        let existing = self.labels.get(division).await?;

        let permissions = Permissions::new(Some(actor), &self.auth);
        let allowed = permissions.can_edit(division)
            || existing.parent.as_ref().is_some_and(|p| permissions.can_edit(p));
        permissions.require(allowed, &format!("rename {division}"))?;

        self.labels
            .upsert(CreateScopeLabel {
                scope: existing.scope,
                label,
                parent: existing.parent,
            })
            .await
    }
}

fn require_label(label: &str) -> GatewayResult<String> {
    let label = label.trim();
    if label.is_empty() {
        return Err(GatewayError::Validation {
            message: "division label must not be empty".into(),
        });
    }
    Ok(label.to_string())
}
