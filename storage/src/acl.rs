use std::fmt;
use std::str::FromStr;

use crate::http::access_controls::AccessControl;

/// The access permission granted to an [`Entity`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[default]
    Reader,
    Writer,
    Owner,
}

/// The team of a project an ACL entry can be granted to.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub enum ProjectRole {
    Owners,
    Editors,
    Viewers,
}

impl ProjectRole {
    fn as_str(&self) -> &'static str {
        match self {
            ProjectRole::Owners => "owners",
            ProjectRole::Editors => "editors",
            ProjectRole::Viewers => "viewers",
        }
    }
}

/// The grantee of an ACL entry.
///
/// The wire form is the entity string of the JSON API:
/// * `allUsers`
/// * `allAuthenticatedUsers`
/// * `user-{email}`
/// * `group-{email}`
/// * `domain-{domain}`
/// * `project-{team}-{projectId}`
///
/// Anything else is kept verbatim in [`Entity::Other`].
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Entity {
    AllUsers,
    AllAuthenticatedUsers,
    User(String),
    Group(String),
    Domain(String),
    Project(ProjectRole, String),
    Other(String),
}

impl Entity {
    pub fn user(email: impl Into<String>) -> Self {
        Entity::User(email.into())
    }

    pub fn project(role: ProjectRole, project_id: impl Into<String>) -> Self {
        Entity::Project(role, project_id.into())
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Entity::AllUsers => f.write_str("allUsers"),
            Entity::AllAuthenticatedUsers => f.write_str("allAuthenticatedUsers"),
            Entity::User(email) => write!(f, "user-{email}"),
            Entity::Group(email) => write!(f, "group-{email}"),
            Entity::Domain(domain) => write!(f, "domain-{domain}"),
            Entity::Project(role, project_id) => write!(f, "project-{}-{project_id}", role.as_str()),
            Entity::Other(raw) => f.write_str(raw),
        }
    }
}

impl FromStr for Entity {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let entity = match s {
            "allUsers" => Entity::AllUsers,
            "allAuthenticatedUsers" => Entity::AllAuthenticatedUsers,
            _ => {
                if let Some(email) = s.strip_prefix("user-") {
                    Entity::User(email.to_string())
                } else if let Some(email) = s.strip_prefix("group-") {
                    Entity::Group(email.to_string())
                } else if let Some(domain) = s.strip_prefix("domain-") {
                    Entity::Domain(domain.to_string())
                } else if let Some(team) = s.strip_prefix("project-") {
                    parse_project(team).unwrap_or_else(|| Entity::Other(s.to_string()))
                } else {
                    Entity::Other(s.to_string())
                }
            }
        };
        Ok(entity)
    }
}

fn parse_project(team: &str) -> Option<Entity> {
    let (role, project_id) = team.split_once('-')?;
    let role = match role {
        "owners" => ProjectRole::Owners,
        "editors" => ProjectRole::Editors,
        "viewers" => ProjectRole::Viewers,
        _ => return None,
    };
    if project_id.is_empty() {
        return None;
    }
    Some(Entity::Project(role, project_id.to_string()))
}

impl From<&str> for Entity {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(entity) => entity,
            Err(never) => match never {},
        }
    }
}

/// An access-control entry.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Acl {
    entity: Entity,
    role: Role,
}

impl Acl {
    pub fn new(entity: Entity, role: Role) -> Self {
        Self { entity, role }
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn role(&self) -> Role {
        self.role
    }
}

impl From<&Acl> for AccessControl {
    fn from(acl: &Acl) -> Self {
        AccessControl {
            entity: acl.entity.to_string(),
            role: acl.role,
            ..Default::default()
        }
    }
}

impl From<AccessControl> for Acl {
    fn from(ac: AccessControl) -> Self {
        Acl::new(Entity::from(ac.entity.as_str()), ac.role)
    }
}

pub(crate) fn to_wire(acl: &Option<Vec<Acl>>) -> Option<Vec<AccessControl>> {
    acl.as_ref().map(|v| v.iter().map(AccessControl::from).collect())
}

pub(crate) fn from_wire(acl: Option<Vec<AccessControl>>) -> Option<Vec<Acl>> {
    acl.map(|v| v.into_iter().map(Acl::from).collect())
}
