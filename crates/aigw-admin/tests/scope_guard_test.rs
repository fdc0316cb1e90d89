//! Admin scope guard and scope switcher against in-memory SurrealDB.

use aigw_admin::{
    AdminConfig, AdminScopeGuard, GuardDecision, ScopeSwitcher, selected_scope,
};
use aigw_core::error::GatewayError;
use aigw_core::models::scope::{CreateScopeLabel, ScopeInfo};
use aigw_core::models::user::{CreateUser, User, UserRoleAssignment, UserRoleType};
use aigw_core::repository::{ScopeLabelRepository, UserRepository};
use aigw_db::repository::{SurrealScopeLabelRepository, SurrealUserRepository};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

type Users = SurrealUserRepository<Db>;
type Labels = SurrealScopeLabelRepository<Db>;

async fn setup() -> (Users, Labels) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    aigw_db::run_migrations(&db).await.unwrap();

    let labels = SurrealScopeLabelRepository::new(db.clone());
    let org = ScopeInfo::organization("org1");
    for (scope, label, parent) in [
        (org.clone(), "Acme", None),
        (ScopeInfo::division("div1"), "Research", Some(org.clone())),
        (ScopeInfo::division("div2"), "Operations", Some(org)),
    ] {
        labels
            .upsert(CreateScopeLabel {
                scope,
                label: label.into(),
                parent,
            })
            .await
            .unwrap();
    }

    (SurrealUserRepository::new(db), labels)
}

async fn user_with_roles(users: &Users, roles: &[(ScopeInfo, UserRoleType)]) -> User {
    let user = users
        .create(CreateUser {
            username: "alice".into(),
            email: "alice@example.com".into(),
        })
        .await
        .unwrap();
    for (scope, role) in roles {
        users
            .assign_role(user.id, UserRoleAssignment::new(scope.clone(), *role))
            .await
            .unwrap();
    }
    user
}

#[tokio::test]
async fn user_without_admin_roles_goes_home() {
    let (users, labels) = setup().await;
    let user = user_with_roles(
        &users,
        &[
            (ScopeInfo::division("div1"), UserRoleType::Member),
            (ScopeInfo::division("div2"), UserRoleType::Maintainer),
        ],
    )
    .await;
    let (scope, selector) = selected_scope();
    let guard = AdminScopeGuard::new(users, labels, selector, AdminConfig::default());

    let decision = guard.activate(Some(user.id), "/admin").await;

    assert_eq!(
        decision,
        GuardDecision::Redirect {
            to: "/home".into(),
            replace_url: false,
        }
    );
    assert_eq!(scope.current(), None);
}

#[tokio::test]
async fn anonymous_and_unknown_users_go_home() {
    let (users, labels) = setup().await;
    let (scope, selector) = selected_scope();
    let guard = AdminScopeGuard::new(users, labels, selector, AdminConfig::default());

    for user_id in [None, Some(Uuid::new_v4())] {
        let decision = guard.activate(user_id, "/admin/division/div1").await;
        assert!(matches!(decision, GuardDecision::Redirect { ref to, .. } if to == "/home"));
    }
    assert_eq!(scope.current(), None);
}

#[tokio::test]
async fn bare_admin_url_selects_broadest_scope() {
    let (users, labels) = setup().await;
    let user = user_with_roles(
        &users,
        &[
            (ScopeInfo::division("div1"), UserRoleType::Admin),
            (ScopeInfo::organization("org1"), UserRoleType::Admin),
        ],
    )
    .await;
    let (scope, selector) = selected_scope();
    let guard = AdminScopeGuard::new(users, labels, selector, AdminConfig::default());

    let decision = guard.activate(Some(user.id), "/admin").await;

    // The scope is selected by the time the redirect is returned.
    assert_eq!(scope.current(), Some(ScopeInfo::organization("org1")));
    assert_eq!(
        decision,
        GuardDecision::Redirect {
            to: "/admin/organization/org1".into(),
            replace_url: true,
        }
    );
}

#[tokio::test]
async fn route_naming_an_admin_scope_is_allowed() {
    let (users, labels) = setup().await;
    let user = user_with_roles(
        &users,
        &[
            (ScopeInfo::organization("org1"), UserRoleType::SuperAdmin),
            (ScopeInfo::division("div1"), UserRoleType::Admin),
        ],
    )
    .await;
    let (scope, selector) = selected_scope();
    let guard = AdminScopeGuard::new(users, labels, selector, AdminConfig::default());

    let decision = guard
        .activate(Some(user.id), "/admin/division/div1/providers")
        .await;

    assert_eq!(decision, GuardDecision::Allow);
    assert_eq!(scope.current(), Some(ScopeInfo::division("div1")));
}

#[tokio::test]
async fn foreign_scope_is_rewritten_keeping_the_section() {
    let (users, labels) = setup().await;
    let user = user_with_roles(&users, &[(ScopeInfo::division("div1"), UserRoleType::Admin)]).await;
    let (scope, selector) = selected_scope();
    let guard = AdminScopeGuard::new(users, labels, selector, AdminConfig::default());

    let decision = guard
        .activate(Some(user.id), "/admin/division/div2/models")
        .await;

    assert_eq!(
        decision,
        GuardDecision::Redirect {
            to: "/admin/division/div1/models".into(),
            replace_url: true,
        }
    );
    assert_eq!(scope.current(), Some(ScopeInfo::division("div1")));
}

#[tokio::test]
async fn legacy_scope_query_token_is_honoured() {
    let (users, labels) = setup().await;
    let user = user_with_roles(
        &users,
        &[
            (ScopeInfo::organization("org1"), UserRoleType::Admin),
            (ScopeInfo::division("div2"), UserRoleType::Admin),
        ],
    )
    .await;
    let (scope, selector) = selected_scope();
    let guard = AdminScopeGuard::new(users, labels, selector, AdminConfig::default());

    let decision = guard
        .activate(Some(user.id), "/admin/users?scope=division:div2")
        .await;

    assert_eq!(decision, GuardDecision::Allow);
    assert_eq!(scope.current(), Some(ScopeInfo::division("div2")));
}

#[tokio::test]
async fn division_ordering_follows_labels() {
    let (users, labels) = setup().await;
    // "Operations" sorts before "Research".
    let user = user_with_roles(
        &users,
        &[
            (ScopeInfo::division("div1"), UserRoleType::Admin),
            (ScopeInfo::division("div2"), UserRoleType::Admin),
        ],
    )
    .await;
    let (scope, selector) = selected_scope();
    let guard = AdminScopeGuard::new(users, labels, selector, AdminConfig::default());

    guard.activate(Some(user.id), "/admin/api-keys").await;

    assert_eq!(scope.current(), Some(ScopeInfo::division("div2")));
}

#[tokio::test]
async fn switcher_moves_to_an_available_scope() {
    let (users, labels) = setup().await;
    let user = user_with_roles(
        &users,
        &[
            (ScopeInfo::organization("org1"), UserRoleType::Admin),
            (ScopeInfo::division("div1"), UserRoleType::Admin),
        ],
    )
    .await;
    let (scope, selector) = selected_scope();
    let switcher = ScopeSwitcher::new(users, labels, selector, AdminConfig::default());

    let options = switcher.options(Some(user.id)).await;
    let labels: Vec<_> = options.iter().map(|o| o.label.as_str()).collect();
    assert_eq!(labels, vec!["Acme", "Research"]);

    let path = switcher
        .switch_scope(
            Some(user.id),
            ScopeInfo::division("div1"),
            "/admin/organization/org1/providers",
        )
        .await
        .unwrap();
    assert_eq!(path, "/admin/division/div1/providers");
    assert_eq!(scope.current(), Some(ScopeInfo::division("div1")));
}

#[tokio::test]
async fn switcher_refuses_foreign_scope() {
    let (users, labels) = setup().await;
    let user = user_with_roles(&users, &[(ScopeInfo::division("div1"), UserRoleType::Admin)]).await;
    let (scope, selector) = selected_scope();
    selector.set(Some(ScopeInfo::division("div1")));
    let switcher = ScopeSwitcher::new(users, labels, selector, AdminConfig::default());

    let err = switcher
        .switch_scope(Some(user.id), ScopeInfo::division("div2"), "/admin")
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::AuthorizationDenied { .. }));
    assert_eq!(scope.current(), Some(ScopeInfo::division("div1")));
}
